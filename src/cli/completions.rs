//! Completions command.
//!
//! Writes a completion script for the requested shell to stdout.

use std::io;

use clap::CommandFactory;
use clap_complete::generate;
use tracing::debug;

use crate::cli::{Cli, Shell};
use crate::error::Result;

/// Generate shell completions.
pub fn execute(shell: Shell) -> Result<()> {
    let mut cmd = Cli::command();
    let bin = cmd.get_name().to_string();
    debug!(%shell, "generating completions");
    generate(shell, &mut cmd, bin, &mut io::stdout().lock());
    Ok(())
}
