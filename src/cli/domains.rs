//! Domains command.
//!
//! Prints the resolved domain set: explicit domains first, then the
//! generated app.link domains, deduplicated.

use crate::cli::{output, settings};
use crate::core::config::Overrides;
use crate::error::Result;

/// Print the resolved domains.
pub fn execute(overrides: Overrides, json: bool) -> Result<()> {
    let settings = settings(overrides)?;
    let domains = settings.require_domains()?;

    if json {
        let rendered = serde_json::to_string_pretty(&domains)
            .map_err(|e| crate::error::Error::Other(e.to_string()))?;
        println!("{rendered}");
        return Ok(());
    }

    if domains.is_empty() {
        output::dimmed("no domains");
        return Ok(());
    }
    for domain in &domains {
        println!("{domain}");
    }
    Ok(())
}
