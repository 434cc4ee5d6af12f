//! Configuration file management.
//!
//! Reads the optional `.linksmith.toml` in the working directory and merges
//! it with command-line values into [`Settings`]. Command-line values (and
//! `LINKSMITH_*` environment variables, bound by the CLI) take precedence
//! over the file, which takes precedence over built-in defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::association::TransportConfig;
use crate::core::constants::{self, RELEASE_CONFIGURATION};
use crate::core::domains::{self, Credentials, DomainInput, DomainSet, EmptyDomainPolicy};
use crate::core::identity::MatchPolicy;
use crate::core::manifest::ActivitySelector;
use crate::core::project::TargetSelector;
use crate::error::{ConfigError, Result};

/// Contents of `.linksmith.toml`. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub live_key: Option<String>,
    pub test_key: Option<String>,
    pub app_link_subdomain: Option<String>,
    /// An array of domains or a comma-separated string.
    pub domains: Option<toml::Value>,
    pub uri_scheme: Option<String>,
    /// Project description file.
    pub project: Option<PathBuf>,
    pub target: Option<String>,
    pub configuration: Option<String>,
    pub android_manifest: Option<PathBuf>,
    pub activity: Option<String>,
    pub remove_existing: Option<bool>,
    /// `all` or `any`.
    pub policy: Option<String>,
    pub allow_empty_domains: Option<bool>,
    pub timeout_ms: Option<u64>,
    /// Concurrent association file fetches.
    pub jobs: Option<usize>,
}

impl Config {
    /// Path to the configuration file in the current directory
    pub fn config_path() -> PathBuf {
        PathBuf::from(constants::CONFIG_FILE)
    }

    /// Load `.linksmith.toml` from the current directory, or defaults when
    /// it doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ReadFile` or `ConfigError::Parse`.
    pub fn load() -> Result<Self> {
        Self::load_from(Self::config_path())
    }

    /// Load a configuration file, or defaults when it doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ReadFile` or `ConfigError::Parse`.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        debug!(path = %path.display(), "loading config");
        let contents = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        Self::parse(&contents)
    }

    /// # Errors
    ///
    /// Returns `ConfigError::Parse` for malformed TOML.
    pub fn parse(contents: &str) -> Result<Self> {
        let config: Self = toml::from_str(contents).map_err(ConfigError::Parse)?;
        Ok(config)
    }

    /// Configured explicit domains.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidInputType` when `domains` is neither an
    /// array nor a string.
    pub fn domains(&self) -> Result<Option<DomainInput>> {
        self.domains.as_ref().map(DomainInput::from_toml).transpose()
    }
}

/// Values given on the command line (or through `LINKSMITH_*` variables).
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub live_key: Option<String>,
    pub test_key: Option<String>,
    pub app_link_subdomain: Option<String>,
    /// Comma-separated domains.
    pub domains: Option<String>,
    pub uri_scheme: Option<String>,
    pub project: Option<PathBuf>,
    pub target: Option<String>,
    pub configuration: Option<String>,
    pub android_manifest: Option<PathBuf>,
    pub activity: Option<String>,
    pub remove_existing: bool,
    pub policy: Option<String>,
    pub allow_empty_domains: bool,
    pub timeout_ms: Option<u64>,
    pub jobs: Option<usize>,
}

/// Merged, validated settings for a run.
#[derive(Debug, Clone)]
pub struct Settings {
    pub credentials: Credentials,
    pub app_link_subdomain: Option<String>,
    /// Explicit domains followed by generated ones, deduplicated.
    pub domains: DomainSet,
    /// Whether any explicit domains were given.
    pub explicit_domains: bool,
    pub uri_scheme: Option<String>,
    pub project: Option<PathBuf>,
    pub target: TargetSelector,
    pub configuration: String,
    pub android_manifest: Option<PathBuf>,
    pub activity: ActivitySelector,
    pub remove_existing: bool,
    pub policy: MatchPolicy,
    pub empty_domains: EmptyDomainPolicy,
    pub timeout_ms: u64,
    pub jobs: usize,
}

/// Default number of concurrent association file fetches.
pub const DEFAULT_JOBS: usize = 4;

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl Settings {
    /// Merge command-line values over the configuration file.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidInputType` for a malformed `domains`
    /// value, `ConfigError::InvalidValue` for an unknown policy or a zero
    /// timeout.
    pub fn resolve(overrides: Overrides, config: Config) -> Result<Self> {
        let credentials = Credentials::new(
            non_empty(overrides.live_key.or(config.live_key.clone())),
            non_empty(overrides.test_key.or(config.test_key.clone())),
        );
        let app_link_subdomain =
            non_empty(overrides.app_link_subdomain.or(config.app_link_subdomain.clone()));

        let explicit = match overrides.domains {
            Some(flag) => Some(DomainInput::Delimited(flag)),
            None => config.domains()?,
        };
        let explicit_domains = explicit.as_ref().is_some_and(|d| !d.domains().is_empty());
        let domains = domains::resolve(
            explicit.as_ref(),
            app_link_subdomain.as_deref(),
            &credentials,
        );

        let policy = match overrides.policy.or(config.policy) {
            Some(value) => value.parse::<MatchPolicy>().map_err(|reason| ConfigError::InvalidValue {
                field: "policy",
                reason,
            })?,
            None => MatchPolicy::default(),
        };

        let timeout_ms = overrides
            .timeout_ms
            .or(config.timeout_ms)
            .unwrap_or(TransportConfig::default().timeout_ms);
        if timeout_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "timeout_ms",
                reason: "must be greater than zero".to_string(),
            }
            .into());
        }

        let empty_domains =
            if overrides.allow_empty_domains || config.allow_empty_domains.unwrap_or(false) {
                EmptyDomainPolicy::Accept
            } else {
                EmptyDomainPolicy::Reject
            };

        let settings = Self {
            credentials,
            app_link_subdomain,
            domains,
            explicit_domains,
            uri_scheme: non_empty(overrides.uri_scheme.or(config.uri_scheme)),
            project: overrides.project.or(config.project),
            target: TargetSelector::from_name(overrides.target.or(config.target).as_deref()),
            configuration: overrides
                .configuration
                .or(config.configuration)
                .unwrap_or_else(|| RELEASE_CONFIGURATION.to_string()),
            android_manifest: overrides.android_manifest.or(config.android_manifest),
            activity: ActivitySelector::from_name(
                overrides.activity.or(config.activity).as_deref(),
            ),
            remove_existing: overrides.remove_existing || config.remove_existing.unwrap_or(false),
            policy,
            empty_domains,
            timeout_ms,
            jobs: overrides.jobs.or(config.jobs).unwrap_or(DEFAULT_JOBS).max(1),
        };

        debug!(
            domains = %settings.domains,
            keys = settings.credentials.count(),
            configuration = %settings.configuration,
            policy = %settings.policy,
            "settings resolved"
        );
        Ok(settings)
    }

    /// The resolved domains, subject to the empty-domain policy.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Empty` when no domains resolved and empty sets
    /// are rejected.
    pub fn require_domains(&self) -> Result<DomainSet> {
        self.domains.clone().require_non_empty(self.empty_domains)
    }

    pub fn transport_config(&self) -> TransportConfig {
        TransportConfig {
            timeout_ms: self.timeout_ms,
            ..TransportConfig::default()
        }
    }
}
