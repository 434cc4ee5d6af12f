//! Project model.
//!
//! Abstracts the native project file: targets, per-configuration build
//! settings, file membership and persistence. Reading and writing the native
//! format is left to implementations of [`Project`].
//!
//! ## Build setting expansion
//!
//! [`resolve_setting`] expands `$(NAME)` and `${NAME}` references
//! recursively. `SRCROOT` expands to `.` and `TARGET_NAME` to the target
//! name unless set explicitly. Unresolvable references are left verbatim.

mod settings_file;

pub use settings_file::SettingsFile;

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::types::{ConfigurationName, TargetName};
use crate::error::{ProjectError, Result};

/// Maximum nesting of build setting references.
const MAX_EXPANSION_DEPTH: usize = 16;

/// Product type of a build target.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TargetKind {
    #[default]
    Application,
    AppExtension,
    UnitTest,
    UiTest,
    Framework,
    Other,
}

impl TargetKind {
    pub fn is_extension(self) -> bool {
        matches!(self, Self::AppExtension)
    }

    pub fn is_test(self) -> bool {
        matches!(self, Self::UnitTest | Self::UiTest)
    }
}

/// A target as listed by the project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetInfo {
    pub name: TargetName,
    pub kind: TargetKind,
}

/// A project document holding build targets and their settings.
pub trait Project {
    /// Directory that relative paths in build settings are resolved against.
    fn directory(&self) -> &Path;

    /// All targets in declaration order.
    fn targets(&self) -> Vec<TargetInfo>;

    /// Build configuration names for a target.
    ///
    /// # Errors
    ///
    /// Returns `ProjectError::TargetNotFound` for an unknown target.
    fn configurations(&self, target: &str) -> Result<Vec<ConfigurationName>>;

    /// Unexpanded value of a build setting.
    ///
    /// # Errors
    ///
    /// Returns `ProjectError::TargetNotFound` for an unknown target.
    fn build_setting(&self, target: &str, name: &str, configuration: &str)
        -> Result<Option<String>>;

    /// Set a build setting on every configuration of a target.
    ///
    /// # Errors
    ///
    /// Returns `ProjectError::TargetNotFound` for an unknown target.
    fn set_build_setting(&mut self, target: &str, name: &str, value: &str) -> Result<()>;

    /// Add a file (relative to [`Project::directory`]) to the project.
    ///
    /// Returns `false` when the file was already a member.
    ///
    /// # Errors
    ///
    /// Returns an error if the project rejects the file.
    fn add_file(&mut self, path: &Path) -> Result<bool>;

    /// Persist the project.
    ///
    /// # Errors
    ///
    /// Returns `ProjectError::Save` when the project cannot be written.
    fn save(&self) -> Result<()>;
}

/// How to choose the target to operate on.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TargetSelector {
    /// The target with exactly this name.
    Named(TargetName),
    /// The first target that is neither an extension nor a test bundle.
    #[default]
    FirstApplication,
}

impl TargetSelector {
    /// Explicit name when given, otherwise the application heuristic.
    pub fn from_name(name: Option<&str>) -> Self {
        name.map_or(Self::FirstApplication, |n| Self::Named(n.to_string()))
    }

    /// Resolve to a target name.
    ///
    /// # Errors
    ///
    /// Returns `ProjectError::TargetNotFound` or
    /// `ProjectError::NoApplicationTarget`.
    pub fn select(&self, project: &dyn Project) -> Result<TargetName> {
        let targets = project.targets();
        let found = match self {
            Self::Named(name) => targets
                .into_iter()
                .find(|t| &t.name == name)
                .ok_or_else(|| ProjectError::TargetNotFound(name.clone()))?,
            Self::FirstApplication => targets
                .into_iter()
                .find(|t| !t.kind.is_extension() && !t.kind.is_test())
                .ok_or(ProjectError::NoApplicationTarget)?,
        };
        debug!(target_name = %found.name, strategy = %self, "selected target");
        Ok(found.name)
    }
}

impl fmt::Display for TargetSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named(name) => write!(f, "named {name}"),
            Self::FirstApplication => write!(f, "first application"),
        }
    }
}

/// Resolve a build setting with reference expansion.
///
/// # Errors
///
/// Returns `ProjectError::TargetNotFound` for an unknown target.
pub fn resolve_setting(
    project: &dyn Project,
    target: &str,
    name: &str,
    configuration: &str,
) -> Result<Option<String>> {
    resolve_at_depth(project, target, name, configuration, 0)
}

/// Resolve a build setting that must be present.
///
/// # Errors
///
/// Returns `ProjectError::SettingMissing` when the setting is not defined.
pub fn require_setting(
    project: &dyn Project,
    target: &str,
    name: &str,
    configuration: &str,
) -> Result<String> {
    resolve_setting(project, target, name, configuration)?
        .filter(|v| !v.is_empty())
        .ok_or_else(|| {
            ProjectError::SettingMissing {
                target: target.to_string(),
                setting: name.to_string(),
                configuration: configuration.to_string(),
            }
            .into()
        })
}

/// Absolute location of a path-valued build setting, if set.
///
/// # Errors
///
/// Returns `ProjectError::TargetNotFound` for an unknown target.
pub fn resolve_path_setting(
    project: &dyn Project,
    target: &str,
    name: &str,
    configuration: &str,
) -> Result<Option<PathBuf>> {
    Ok(resolve_setting(project, target, name, configuration)?
        .filter(|v| !v.is_empty())
        .map(|relative| project.directory().join(relative)))
}

fn resolve_at_depth(
    project: &dyn Project,
    target: &str,
    name: &str,
    configuration: &str,
    depth: usize,
) -> Result<Option<String>> {
    let raw = match project.build_setting(target, name, configuration)? {
        Some(value) => value,
        None => match name {
            "SRCROOT" => ".".to_string(),
            "TARGET_NAME" => target.to_string(),
            _ => return Ok(None),
        },
    };

    if depth >= MAX_EXPANSION_DEPTH {
        return Ok(Some(raw));
    }

    let mut lookup = |reference: &str| -> Result<Option<String>> {
        let (macro_name, modifier) = match reference.split_once(':') {
            Some((n, m)) => (n, Some(m)),
            None => (reference, None),
        };
        let Some(value) = resolve_at_depth(project, target, macro_name, configuration, depth + 1)?
        else {
            return Ok(None);
        };
        Ok(match modifier {
            None => Some(value),
            Some(m) => apply_modifier(&value, m),
        })
    };

    expand_references(&raw, &mut lookup).map(Some)
}

/// Replace `$(NAME)` / `${NAME}` references using `lookup`.
fn expand_references(
    value: &str,
    lookup: &mut dyn FnMut(&str) -> Result<Option<String>>,
) -> Result<String> {
    let mut out = String::with_capacity(value.len());
    let mut rest = value;

    while let Some(start) = rest.find('$') {
        out.push_str(&rest[..start]);
        let after = &rest[start + 1..];
        let close = match after.chars().next() {
            Some('(') => ')',
            Some('{') => '}',
            _ => {
                out.push('$');
                rest = after;
                continue;
            }
        };

        let body = &after[1..];
        match body.find(close) {
            Some(end) if !body[..end].contains(['(', ')', '{', '}']) => {
                let reference = &body[..end];
                let literal = &rest[start..start + end + 3];
                match lookup(reference)? {
                    Some(expanded) => out.push_str(&expanded),
                    None => out.push_str(literal),
                }
                rest = &body[end + 1..];
            }
            _ => {
                out.push('$');
                rest = after;
            }
        }
    }

    out.push_str(rest);
    Ok(out)
}

fn apply_modifier(value: &str, modifier: &str) -> Option<String> {
    match modifier {
        "rfc1034identifier" => Some(
            value
                .chars()
                .map(|c| {
                    if c.is_ascii_alphanumeric() || c == '-' || c == '.' {
                        c
                    } else {
                        '-'
                    }
                })
                .collect(),
        ),
        "lower" => Some(value.to_lowercase()),
        "upper" => Some(value.to_uppercase()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    /// Single-configuration project held in memory.
    struct Fixture {
        dir: PathBuf,
        targets: Vec<TargetInfo>,
        settings: BTreeMap<String, String>,
    }

    impl Fixture {
        fn new(settings: &[(&str, &str)]) -> Self {
            Self {
                dir: PathBuf::from("/work/ios"),
                targets: vec![
                    TargetInfo {
                        name: "Widget".into(),
                        kind: TargetKind::AppExtension,
                    },
                    TargetInfo {
                        name: "AppTests".into(),
                        kind: TargetKind::UnitTest,
                    },
                    TargetInfo {
                        name: "My App".into(),
                        kind: TargetKind::Application,
                    },
                ],
                settings: settings
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
            }
        }
    }

    impl Project for Fixture {
        fn directory(&self) -> &Path {
            &self.dir
        }
        fn targets(&self) -> Vec<TargetInfo> {
            self.targets.clone()
        }
        fn configurations(&self, _target: &str) -> Result<Vec<ConfigurationName>> {
            Ok(vec!["Release".into()])
        }
        fn build_setting(&self, _t: &str, name: &str, _c: &str) -> Result<Option<String>> {
            Ok(self.settings.get(name).cloned())
        }
        fn set_build_setting(&mut self, _t: &str, name: &str, value: &str) -> Result<()> {
            self.settings.insert(name.into(), value.into());
            Ok(())
        }
        fn add_file(&mut self, _path: &Path) -> Result<bool> {
            Ok(true)
        }
        fn save(&self) -> Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_first_application_skips_extensions_and_tests() {
        let project = Fixture::new(&[]);
        let name = TargetSelector::FirstApplication.select(&project).unwrap();
        assert_eq!(name, "My App");
    }

    #[test]
    fn test_named_selector_bypasses_heuristic() {
        let project = Fixture::new(&[]);
        let name = TargetSelector::Named("Widget".into()).select(&project).unwrap();
        assert_eq!(name, "Widget");
        assert!(TargetSelector::Named("Nope".into()).select(&project).is_err());
    }

    #[test]
    fn test_expands_nested_references() {
        let project = Fixture::new(&[
            ("INFOPLIST_FILE", "$(SRCROOT)/${PRODUCT_NAME}/Info.plist"),
            ("PRODUCT_NAME", "$(TARGET_NAME)"),
        ]);
        let value = resolve_setting(&project, "My App", "INFOPLIST_FILE", "Release").unwrap();
        assert_eq!(value.as_deref(), Some("./My App/Info.plist"));
    }

    #[test]
    fn test_unresolved_reference_left_verbatim() {
        let project = Fixture::new(&[("CODE_SIGN_ENTITLEMENTS", "$(UNKNOWN)/App.entitlements")]);
        let value =
            resolve_setting(&project, "My App", "CODE_SIGN_ENTITLEMENTS", "Release").unwrap();
        assert_eq!(value.as_deref(), Some("$(UNKNOWN)/App.entitlements"));
    }

    #[test]
    fn test_rfc1034_modifier() {
        let project = Fixture::new(&[(
            "PRODUCT_BUNDLE_IDENTIFIER",
            "com.example.$(PRODUCT_NAME:rfc1034identifier)",
        ), ("PRODUCT_NAME", "My App")]);
        let value =
            resolve_setting(&project, "My App", "PRODUCT_BUNDLE_IDENTIFIER", "Release").unwrap();
        assert_eq!(value.as_deref(), Some("com.example.My-App"));
    }

    #[test]
    fn test_self_reference_terminates() {
        let project = Fixture::new(&[("LOOP", "x$(LOOP)")]);
        let value = resolve_setting(&project, "My App", "LOOP", "Release").unwrap();
        assert!(value.unwrap().starts_with("xxxx"));
    }

    #[test]
    fn test_require_setting_reports_missing() {
        let project = Fixture::new(&[]);
        let err = require_setting(&project, "My App", "DEVELOPMENT_TEAM", "Release").unwrap_err();
        assert!(err.to_string().contains("DEVELOPMENT_TEAM"));
    }

    #[test]
    fn test_dollar_without_reference_is_literal() {
        let project = Fixture::new(&[("PRICE", "$5 and $(")]);
        let value = resolve_setting(&project, "My App", "PRICE", "Release").unwrap();
        assert_eq!(value.as_deref(), Some("$5 and $("));
    }
}
