//! TOML project description.
//!
//! A plain-text stand-in for a native project file, listing targets, their
//! build settings per configuration, and project file members:
//!
//! ```toml
//! files = ["MyApp/Info.plist"]
//!
//! [[targets]]
//! name = "MyApp"
//! kind = "application"
//!
//! [targets.settings]
//! INFOPLIST_FILE = "MyApp/Info.plist"
//!
//! [targets.configurations.Release]
//! PRODUCT_BUNDLE_IDENTIFIER = "com.example.MyApp"
//! ```
//!
//! Per-configuration values override the target's base `settings`.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{Project, TargetInfo, TargetKind};
use crate::core::constants::RELEASE_CONFIGURATION;
use crate::core::store;
use crate::core::types::ConfigurationName;
use crate::error::{ProjectError, Result};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct Description {
    #[serde(default)]
    files: Vec<PathBuf>,
    #[serde(default)]
    targets: Vec<TargetEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct TargetEntry {
    name: String,
    #[serde(default)]
    kind: TargetKind,
    #[serde(default)]
    settings: BTreeMap<String, String>,
    #[serde(default)]
    configurations: BTreeMap<ConfigurationName, BTreeMap<String, String>>,
}

/// A project loaded from a TOML description file.
#[derive(Debug, Clone)]
pub struct SettingsFile {
    path: PathBuf,
    directory: PathBuf,
    description: Description,
}

impl SettingsFile {
    /// Load a project description.
    ///
    /// # Errors
    ///
    /// Returns `ProjectError::NotFound` if the file doesn't exist, or
    /// `ProjectError::Load` if it can't be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!(path = %path.display(), "loading project");

        if !path.exists() {
            return Err(ProjectError::NotFound(path.to_path_buf()).into());
        }
        let load_error = |reason: String| ProjectError::Load {
            path: path.to_path_buf(),
            reason,
        };
        let contents = std::fs::read_to_string(path).map_err(|e| load_error(e.to_string()))?;
        let description: Description =
            toml::from_str(&contents).map_err(|e| load_error(e.to_string()))?;

        debug!(targets = description.targets.len(), "project loaded");

        Ok(Self {
            path: path.to_path_buf(),
            directory: parent_directory(path),
            description,
        })
    }

    /// Parse a description held in memory. `path` is used for saving and to
    /// anchor relative paths.
    ///
    /// # Errors
    ///
    /// Returns `ProjectError::Load` when the TOML is malformed.
    pub fn parse(path: impl Into<PathBuf>, contents: &str) -> Result<Self> {
        let path = path.into();
        let description: Description = toml::from_str(contents).map_err(|e| ProjectError::Load {
            path: path.clone(),
            reason: e.to_string(),
        })?;
        Ok(Self {
            directory: parent_directory(&path),
            path,
            description,
        })
    }

    /// Project file members.
    pub fn files(&self) -> &[PathBuf] {
        &self.description.files
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn target(&self, name: &str) -> Result<&TargetEntry> {
        self.description
            .targets
            .iter()
            .find(|t| t.name == name)
            .ok_or_else(|| ProjectError::TargetNotFound(name.to_string()).into())
    }

    fn target_mut(&mut self, name: &str) -> Result<&mut TargetEntry> {
        self.description
            .targets
            .iter_mut()
            .find(|t| t.name == name)
            .ok_or_else(|| ProjectError::TargetNotFound(name.to_string()).into())
    }
}

fn parent_directory(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

impl Project for SettingsFile {
    fn directory(&self) -> &Path {
        &self.directory
    }

    fn targets(&self) -> Vec<TargetInfo> {
        self.description
            .targets
            .iter()
            .map(|t| TargetInfo {
                name: t.name.clone(),
                kind: t.kind,
            })
            .collect()
    }

    fn configurations(&self, target: &str) -> Result<Vec<ConfigurationName>> {
        let entry = self.target(target)?;
        if entry.configurations.is_empty() {
            return Ok(vec![RELEASE_CONFIGURATION.to_string()]);
        }
        Ok(entry.configurations.keys().cloned().collect())
    }

    fn build_setting(
        &self,
        target: &str,
        name: &str,
        configuration: &str,
    ) -> Result<Option<String>> {
        let entry = self.target(target)?;
        let value = entry
            .configurations
            .get(configuration)
            .and_then(|settings| settings.get(name))
            .or_else(|| entry.settings.get(name))
            .cloned();
        Ok(value)
    }

    fn set_build_setting(&mut self, target: &str, name: &str, value: &str) -> Result<()> {
        let entry = self.target_mut(target)?;
        debug!(target_name = %entry.name, setting = name, value, "setting build setting");
        if entry.configurations.is_empty() {
            entry.settings.insert(name.to_string(), value.to_string());
        } else {
            for settings in entry.configurations.values_mut() {
                settings.insert(name.to_string(), value.to_string());
            }
        }
        Ok(())
    }

    fn add_file(&mut self, path: &Path) -> Result<bool> {
        if self.description.files.iter().any(|f| f == path) {
            return Ok(false);
        }
        debug!(path = %path.display(), "adding file to project");
        self.description.files.push(path.to_path_buf());
        Ok(true)
    }

    fn save(&self) -> Result<()> {
        debug!(path = %self.path.display(), "saving project");
        let save_error = |reason: String| ProjectError::Save {
            path: self.path.clone(),
            reason,
        };
        let contents =
            toml::to_string_pretty(&self.description).map_err(|e| save_error(e.to_string()))?;
        store::write_atomic(&self.path, contents.as_bytes())
            .map_err(|e| save_error(e.to_string()))?;
        Ok(())
    }
}
