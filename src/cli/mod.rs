//! Command-line interface.

pub mod completions;
pub mod domains;
pub mod output;
pub mod owner;
pub mod setup;
pub mod validate;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

pub use clap_complete::Shell;

use crate::core::config::{Config, Overrides, Settings};
use crate::error::Result;

/// Linksmith - configure and validate Universal Links and App Links.
#[derive(Parser)]
#[command(
    name = "linksmith",
    about = "Configure and validate Universal Links and App Links",
    version
)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true, env = "LINKSMITH_VERBOSE")]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Where link domains come from.
#[derive(Args, Debug, Clone, Default)]
pub struct DomainArgs {
    /// Live SDK key
    #[arg(long, env = "LINKSMITH_LIVE_KEY", hide_env_values = true)]
    pub live_key: Option<String>,

    /// Test SDK key
    #[arg(long, env = "LINKSMITH_TEST_KEY", hide_env_values = true)]
    pub test_key: Option<String>,

    /// Subdomain for generated app.link domains (e.g. myapp)
    #[arg(long, env = "LINKSMITH_APP_LINK_SUBDOMAIN")]
    pub app_link_subdomain: Option<String>,

    /// Comma-separated link domains
    #[arg(short = 'D', long, env = "LINKSMITH_DOMAINS")]
    pub domains: Option<String>,

    /// Accept an empty domain set instead of failing
    #[arg(long, env = "LINKSMITH_ALLOW_EMPTY_DOMAINS")]
    pub allow_empty_domains: bool,
}

impl DomainArgs {
    fn apply(&self, overrides: &mut Overrides) {
        overrides.live_key.clone_from(&self.live_key);
        overrides.test_key.clone_from(&self.test_key);
        overrides.app_link_subdomain.clone_from(&self.app_link_subdomain);
        overrides.domains.clone_from(&self.domains);
        overrides.allow_empty_domains = self.allow_empty_domains;
    }
}

/// The project to read settings from.
#[derive(Args, Debug, Clone, Default)]
pub struct ProjectArgs {
    /// Project description file
    #[arg(short, long, env = "LINKSMITH_PROJECT")]
    pub project: Option<PathBuf>,

    /// Build target (default: first application target)
    #[arg(short, long, env = "LINKSMITH_TARGET")]
    pub target: Option<String>,

    /// Build configuration
    #[arg(short, long, env = "LINKSMITH_CONFIGURATION")]
    pub configuration: Option<String>,
}

impl ProjectArgs {
    fn apply(&self, overrides: &mut Overrides) {
        overrides.project.clone_from(&self.project);
        overrides.target.clone_from(&self.target);
        overrides.configuration.clone_from(&self.configuration);
    }
}

/// Association file retrieval and verdict aggregation.
#[derive(Args, Debug, Clone, Default)]
pub struct NetworkArgs {
    /// Request timeout in milliseconds
    #[arg(long, env = "LINKSMITH_TIMEOUT_MS")]
    pub timeout_ms: Option<u64>,

    /// Concurrent association file fetches
    #[arg(short, long, env = "LINKSMITH_JOBS")]
    pub jobs: Option<usize>,

    /// How domain verdicts combine: all | any
    #[arg(long, env = "LINKSMITH_POLICY", value_parser = ["all", "any"])]
    pub policy: Option<String>,
}

impl NetworkArgs {
    fn apply(&self, overrides: &mut Overrides) {
        overrides.timeout_ms = self.timeout_ms;
        overrides.jobs = self.jobs;
        overrides.policy.clone_from(&self.policy);
    }
}

/// Arguments for `setup`.
#[derive(Args, Debug, Clone, Default)]
pub struct SetupArgs {
    #[command(flatten)]
    pub domains: DomainArgs,

    #[command(flatten)]
    pub project: ProjectArgs,

    #[command(flatten)]
    pub network: NetworkArgs,

    /// Custom URI scheme to register
    #[arg(long, env = "LINKSMITH_URI_SCHEME")]
    pub uri_scheme: Option<String>,

    /// AndroidManifest.xml, or an Android project directory
    #[arg(long, env = "LINKSMITH_ANDROID_MANIFEST")]
    pub android_manifest: Option<PathBuf>,

    /// Activity that receives links (default: first singleTask activity)
    #[arg(long, env = "LINKSMITH_ACTIVITY")]
    pub activity: Option<String>,

    /// Replace existing domains and intent filters instead of adding to them
    #[arg(long, env = "LINKSMITH_REMOVE_EXISTING")]
    pub remove_existing: bool,

    /// Skip association file validation
    #[arg(long)]
    pub no_validate: bool,

    /// Apply changes even if validation fails
    #[arg(short, long)]
    pub force: bool,
}

impl SetupArgs {
    pub fn overrides(&self) -> Overrides {
        let mut overrides = Overrides::default();
        self.domains.apply(&mut overrides);
        self.project.apply(&mut overrides);
        self.network.apply(&mut overrides);
        overrides.uri_scheme.clone_from(&self.uri_scheme);
        overrides.android_manifest.clone_from(&self.android_manifest);
        overrides.activity.clone_from(&self.activity);
        overrides.remove_existing = self.remove_existing;
        overrides
    }
}

/// Arguments for `validate`.
#[derive(Args, Debug, Clone, Default)]
pub struct ValidateArgs {
    #[command(flatten)]
    pub domains: DomainArgs,

    #[command(flatten)]
    pub project: ProjectArgs,

    #[command(flatten)]
    pub network: NetworkArgs,
}

impl ValidateArgs {
    pub fn overrides(&self) -> Overrides {
        let mut overrides = Overrides::default();
        self.domains.apply(&mut overrides);
        self.project.apply(&mut overrides);
        self.network.apply(&mut overrides);
        overrides
    }
}

/// Top-level commands.
#[derive(Subcommand)]
pub enum Command {
    /// Add keys, link domains and routing to iOS and Android projects
    Setup(SetupArgs),

    /// Validate that link domains are associated with the project's app
    Validate(ValidateArgs),

    /// Show the app a domain's association file belongs to
    Owner {
        /// Domain to inspect
        domain: String,

        /// Write the team and bundle identifiers into the project
        #[arg(long)]
        apply: bool,

        #[command(flatten)]
        project: ProjectArgs,

        #[command(flatten)]
        network: NetworkArgs,
    },

    /// Print the resolved link domains
    Domains {
        #[command(flatten)]
        domains: DomainArgs,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Merge overrides with `.linksmith.toml`.
///
/// # Errors
///
/// Returns configuration or domain input errors.
pub fn settings(overrides: Overrides) -> Result<Settings> {
    Settings::resolve(overrides, Config::load()?)
}

/// Execute a command.
pub fn execute(command: Command) -> Result<()> {
    match command {
        Command::Setup(args) => setup::execute(&args),
        Command::Validate(args) => validate::execute(&args),
        Command::Owner {
            domain,
            apply,
            project,
            network,
        } => {
            let mut overrides = Overrides::default();
            project.apply(&mut overrides);
            network.apply(&mut overrides);
            owner::execute(&domain, apply, overrides)
        }
        Command::Domains { domains: args, json } => {
            let mut overrides = Overrides::default();
            args.apply(&mut overrides);
            domains::execute(overrides, json)
        }
        Command::Completions { shell } => completions::execute(shell),
    }
}
