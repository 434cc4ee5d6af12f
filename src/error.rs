//! Error types.
//!
//! One enum per concern, all folded into [`Error`] so command handlers can
//! propagate with `?` and `main` can attach hints by variant.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Association(#[from] AssociationError),

    #[error(transparent)]
    Project(#[from] ProjectError),

    #[error(transparent)]
    Document(#[from] DocumentError),

    #[error(transparent)]
    Manifest(#[from] ManifestError),

    #[error("domain validation failed")]
    ValidationFailed,

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

/// Configuration file and settings errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("invalid config file: {0}")]
    Parse(#[source] toml::de::Error),

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("missing required setting: {0}")]
    Missing(&'static str),
}

/// Domain resolution errors.
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("unsupported type {0} for domains (expected an array or a comma-separated string)")]
    InvalidInputType(String),

    #[error("no domains specified: pass --domains or --app-link-subdomain with a key")]
    Empty,
}

/// Association file retrieval, verification and parsing errors.
#[derive(Error, Debug)]
pub enum AssociationError {
    #[error("[{domain}] Failed to retrieve apple-app-site-association file")]
    Retrieval { domain: String },

    #[error("[{domain}] Failed to verify signed apple-app-site-association file: {reason}")]
    Envelope { domain: String, reason: String },

    #[error("[{domain}] {reason}")]
    Parse { domain: String, reason: String },

    #[error("[{domain}] Multiple appIDs found in apple-app-site-association file: {app_ids:?}")]
    AmbiguousOwner { domain: String, app_ids: Vec<String> },

    #[error("[{domain}] Invalid appID {app_id:?}: expected TEAM.BUNDLE")]
    InvalidAppId { domain: String, app_id: String },

    #[error("http client error: {0}")]
    Transport(String),
}

impl AssociationError {
    /// Domain the error was reported for, if any.
    pub fn domain(&self) -> Option<&str> {
        match self {
            Self::Retrieval { domain }
            | Self::Envelope { domain, .. }
            | Self::Parse { domain, .. }
            | Self::AmbiguousOwner { domain, .. }
            | Self::InvalidAppId { domain, .. } => Some(domain),
            Self::Transport(_) => None,
        }
    }
}

/// Project model errors.
#[derive(Error, Debug)]
pub enum ProjectError {
    #[error("target not found: {0}")]
    TargetNotFound(String),

    #[error("no application target found in project")]
    NoApplicationTarget,

    #[error("build setting {setting} not set for target {target} ({configuration})")]
    SettingMissing {
        target: String,
        setting: String,
        configuration: String,
    },

    #[error("project file not found: {0}")]
    NotFound(PathBuf),

    #[error("failed to read project file {path}: {reason}")]
    Load { path: PathBuf, reason: String },

    #[error("failed to save project file {path}: {reason}")]
    Save { path: PathBuf, reason: String },
}

/// Property-list document errors.
#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("document not found: {0}")]
    NotFound(PathBuf),

    #[error("failed to parse {path}: {reason}")]
    Parse { path: PathBuf, reason: String },

    #[error("failed to write {path}: {reason}")]
    Write { path: PathBuf, reason: String },

    #[error("unexpected structure in {path}: {reason}")]
    InvalidShape { path: PathBuf, reason: String },
}

/// Android manifest errors.
#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("failed to find an activity in the Android manifest")]
    ActivityNotFound,

    #[error("activity {0} not found in the Android manifest")]
    NamedActivityNotFound(String),

    #[error("no <application> element in the Android manifest")]
    ApplicationNotFound,

    #[error("failed to parse Android manifest: {0}")]
    Parse(String),

    #[error("failed to write Android manifest: {0}")]
    Write(String),
}

pub type Result<T> = std::result::Result<T, Error>;
