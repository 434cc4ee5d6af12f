//! Linksmith - configure and validate Universal Links and App Links.

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use linksmith::cli::output;
use linksmith::cli::{execute, Cli};
use linksmith::error::{ConfigError, DomainError, Error, ManifestError, ProjectError};

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_env("LINKSMITH_LOG").unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("linksmith=debug")
        } else {
            EnvFilter::new("linksmith=warn")
        }
    });

    let json = std::env::var("LINKSMITH_LOG_FORMAT").is_ok_and(|f| f.eq_ignore_ascii_case("json"));
    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(false)
                    .without_time()
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}

fn hint(error: &Error) -> Option<&'static str> {
    match error {
        Error::Domain(DomainError::Empty) => {
            Some("pass --domains, or --app-link-subdomain with --live-key/--test-key")
        }
        Error::Config(ConfigError::Missing("project")) => {
            Some("pass --project <file> or set project in .linksmith.toml")
        }
        Error::Config(ConfigError::Missing("live_key or test_key")) => {
            Some("pass --live-key and/or --test-key")
        }
        Error::Project(ProjectError::NoApplicationTarget) => Some("pass --target <name>"),
        Error::Manifest(ManifestError::ActivityNotFound) => Some("pass --activity <name>"),
        Error::ValidationFailed => Some("run with --verbose for request details"),
        _ => None,
    }
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = execute(cli.command) {
        output::error(&e.to_string());
        if let Some(hint) = hint(&e) {
            output::hint(hint);
        }
        std::process::exit(1);
    }
}
