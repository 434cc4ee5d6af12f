//! Shared test infrastructure.
//!
//! Each [`Test`] owns a temporary working directory holding whatever
//! project, Info.plist, entitlements and manifest fixtures the test writes.

#![allow(dead_code)]

pub mod assertions;
pub mod commands;
pub mod fixtures;

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

pub struct Test {
    pub dir: TempDir,
}

impl Test {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("failed to create temp dir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn file(&self, relative: &str) -> PathBuf {
        self.dir.path().join(relative)
    }

    /// Write a file relative to the working directory, creating parents.
    pub fn write(&self, relative: &str, contents: &str) -> PathBuf {
        let path = self.file(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("failed to create parent dir");
        }
        fs::write(&path, contents).expect("failed to write fixture");
        path
    }

    pub fn read(&self, relative: &str) -> String {
        fs::read_to_string(self.file(relative)).expect("failed to read file")
    }

    /// An iOS project: `project.toml` plus `MyApp/Info.plist`.
    pub fn ios_project(&self) -> &Self {
        self.write("project.toml", fixtures::PROJECT_TOML);
        self.write(fixtures::INFO_PLIST_PATH, fixtures::INFO_PLIST);
        self
    }

    /// An Android project directory at `android/`.
    pub fn android_project(&self) -> &Self {
        self.write(fixtures::ANDROID_MANIFEST_PATH, fixtures::MANIFEST);
        self
    }

    /// An entitlements document for `MyApp`, registered in the project.
    pub fn entitlements(&self, domains: &[&str]) -> &Self {
        let entries: String = domains
            .iter()
            .map(|d| format!("        <string>applinks:{d}</string>\n"))
            .collect();
        let document = format!(
            "{}<dict>\n    <key>com.apple.developer.associated-domains</key>\n    <array>\n{entries}    </array>\n</dict>\n</plist>\n",
            fixtures::PLIST_HEADER
        );
        self.write(fixtures::ENTITLEMENTS_PATH, &document);
        let project = self
            .read("project.toml")
            .replace(
                "[targets.settings]\n",
                "[targets.settings]\nCODE_SIGN_ENTITLEMENTS = \"MyApp/MyApp.entitlements\"\n",
            );
        self.write("project.toml", &project);
        self
    }

    /// `.linksmith.toml` in the working directory.
    pub fn config(&self, contents: &str) -> &Self {
        self.write(".linksmith.toml", contents);
        self
    }
}
