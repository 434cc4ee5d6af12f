//! Owner command.
//!
//! Reads a domain's association file and reports the single app it lists.
//! With `--apply`, the team and bundle identifiers are written to every
//! configuration of the project target.

use crate::cli::{output, settings};
use crate::core::association::AssociationClient;
use crate::core::config::Overrides;
use crate::core::identity::{apply_owner, IdentityMatcher};
use crate::core::project::{Project, SettingsFile};
use crate::error::{ConfigError, Result};

/// Identify (and optionally apply) a domain's owner.
pub fn execute(domain: &str, apply: bool, overrides: Overrides) -> Result<()> {
    let settings = settings(overrides)?;
    let client = AssociationClient::https(&settings.transport_config())?;
    let owner = IdentityMatcher::new(client).identify_owner(domain)?;

    output::header(domain);
    output::kv("team  ", &owner.team);
    output::kv("bundle", &owner.bundle);

    if !apply {
        return Ok(());
    }

    let path = settings
        .project
        .as_ref()
        .ok_or(ConfigError::Missing("project"))?;
    let mut project = SettingsFile::load(path)?;
    let target = settings.target.select(&project)?;
    apply_owner(&mut project, &target, &owner)?;
    project.save()?;

    output::blank();
    output::success(&format!("{} set on target {target}", output::cmd(&owner.to_string())));
    Ok(())
}
