//! Type aliases for domain concepts.
//!
//! Provides semantic type aliases to make function signatures more descriptive.

/// A host name claimed for Universal Links / App Links (e.g. `example.com`).
pub type Domain = String;

/// An authorized application identifier of the form `TEAM.BUNDLE`.
pub type AppId = String;

/// A build configuration name (e.g. `Release`).
pub type ConfigurationName = String;

/// A build target name.
pub type TargetName = String;
