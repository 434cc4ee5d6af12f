//! Validate command.
//!
//! Checks that every link domain's association file lists the project's
//! appID. With explicit domains, the entitlements list must also match them
//! exactly; without, the domains claimed in the entitlements are checked.

use tracing::{debug, info};

use crate::cli::{output, settings, ValidateArgs};
use crate::core::association::AssociationClient;
use crate::core::config::Settings;
use crate::core::domains::DomainSet;
use crate::core::identity::{
    match_explicit_domain_list, DomainOutcome, IdentityMatcher, ProjectIdentity, Validation,
};
use crate::core::project::{Project, SettingsFile};
use crate::core::property_list::read_associated_domains;
use crate::core::store::DocumentStore;
use crate::error::{ConfigError, Error, Result};

/// Validate Universal Link configuration.
pub fn execute(args: &ValidateArgs) -> Result<()> {
    let settings = settings(args.overrides())?;
    let path = settings
        .project
        .as_ref()
        .ok_or(ConfigError::Missing("project"))?;
    let project = SettingsFile::load(path)?;
    let target = settings.target.select(&project)?;

    let store = DocumentStore::new();
    let claimed = read_associated_domains(&store, &project, &target, &settings.configuration)?;
    debug!(target_name = %target, claimed = claimed.len(), "read entitlements");

    let mut list_matches = true;
    let domains = if settings.explicit_domains {
        list_matches = match_explicit_domain_list(settings.domains.as_slice(), &claimed);
        settings.domains.clone()
    } else {
        claimed.iter().collect::<DomainSet>()
    }
    .require_non_empty(settings.empty_domains)?;

    if !list_matches {
        output::warn("associated domains in the project do not match the expected domains");
        output::kv("expected", &settings.domains);
        output::kv("project ", claimed.join(","));
    }

    let validation = check(&project, &target, &settings, &domains)?;
    report(&validation);

    if list_matches && validation.valid {
        output::blank();
        output::success("Universal Link configuration passed validation");
        Ok(())
    } else {
        Err(Error::ValidationFailed)
    }
}

/// Validate `domains` against the target's team and bundle identifiers.
///
/// # Errors
///
/// Returns an error when the HTTP client can't be built or the target lacks
/// `DEVELOPMENT_TEAM` / `PRODUCT_BUNDLE_IDENTIFIER`.
pub fn check(
    project: &dyn Project,
    target: &str,
    settings: &Settings,
    domains: &DomainSet,
) -> Result<Validation> {
    let client = AssociationClient::https(&settings.transport_config())?;
    let matcher = IdentityMatcher::new(client)
        .with_policy(settings.policy)
        .with_jobs(settings.jobs);
    let source = ProjectIdentity::new(project, target);

    info!(domains = %domains, policy = %settings.policy, "validating domains");
    matcher.validate_parallel(domains, &source, &settings.configuration)
}

/// Print per-domain verdicts followed by every diagnostic.
pub fn report(validation: &Validation) {
    output::section("Domains");
    for (domain, outcome) in &validation.outcomes {
        match outcome {
            DomainOutcome::Valid => output::verdict(domain, true),
            DomainOutcome::Invalid => output::verdict(domain, false),
            DomainOutcome::Skipped => output::dimmed(&format!("  - {domain} (skipped)")),
        }
    }

    if !validation.diagnostics.is_empty() {
        output::section("Problems");
        for diagnostic in &validation.diagnostics {
            output::list_item(diagnostic);
        }
    }
}
