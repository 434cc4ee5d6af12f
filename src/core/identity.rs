//! Domain ownership validation.
//!
//! A domain is valid for an app when its association file lists the app's
//! `TEAM.BUNDLE` identifier. [`IdentityMatcher`] checks every domain in a set,
//! accumulating per-domain diagnostics instead of stopping at the first
//! failure, and aggregates the verdicts with a [`MatchPolicy`].

use std::fmt;
use std::str::FromStr;
use std::thread;

use tracing::{debug, info, warn};

use crate::core::association::{AssociationClient, EnvelopeVerifier, Transport};
use crate::core::constants::{DEVELOPMENT_TEAM, PRODUCT_BUNDLE_IDENTIFIER};
use crate::core::diagnostics::Diagnostics;
use crate::core::domains::{is_test_link_domain, DomainSet};
use crate::core::project::{require_setting, Project};
use crate::core::types::{AppId, Domain};
use crate::error::{AssociationError, Result};

/// An app's team and bundle identifiers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppIdentity {
    pub team: String,
    pub bundle: String,
}

impl AppIdentity {
    pub fn new(team: impl Into<String>, bundle: impl Into<String>) -> Self {
        Self {
            team: team.into(),
            bundle: bundle.into(),
        }
    }

    /// Split an appID at its first `.`.
    ///
    /// Returns `None` unless both parts are non-empty.
    pub fn from_app_id(app_id: &str) -> Option<Self> {
        let (team, bundle) = app_id.split_once('.')?;
        if team.is_empty() || bundle.is_empty() {
            return None;
        }
        Some(Self::new(team, bundle))
    }

    pub fn app_id(&self) -> AppId {
        format!("{}.{}", self.team, self.bundle)
    }
}

impl fmt::Display for AppIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.team, self.bundle)
    }
}

/// Supplies the identity expected for a build configuration.
pub trait IdentitySource {
    /// # Errors
    ///
    /// Returns an error when the identity cannot be determined.
    fn identity(&self, configuration: &str) -> Result<AppIdentity>;
}

impl IdentitySource for AppIdentity {
    fn identity(&self, _configuration: &str) -> Result<AppIdentity> {
        Ok(self.clone())
    }
}

/// Identity read from a project target's build settings.
pub struct ProjectIdentity<'a> {
    project: &'a dyn Project,
    target: &'a str,
}

impl<'a> ProjectIdentity<'a> {
    pub fn new(project: &'a dyn Project, target: &'a str) -> Self {
        Self { project, target }
    }
}

impl IdentitySource for ProjectIdentity<'_> {
    fn identity(&self, configuration: &str) -> Result<AppIdentity> {
        let team = require_setting(self.project, self.target, DEVELOPMENT_TEAM, configuration)?;
        let bundle = require_setting(
            self.project,
            self.target,
            PRODUCT_BUNDLE_IDENTIFIER,
            configuration,
        )?;
        Ok(AppIdentity::new(team, bundle))
    }
}

/// How per-domain verdicts combine into the overall result.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MatchPolicy {
    /// Every checked domain must be valid.
    #[default]
    All,
    /// At least one checked domain must be valid.
    Any,
}

impl FromStr for MatchPolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "all" => Ok(Self::All),
            "any" => Ok(Self::Any),
            other => Err(format!("unknown policy {other:?} (expected \"all\" or \"any\")")),
        }
    }
}

impl fmt::Display for MatchPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => write!(f, "all"),
            Self::Any => write!(f, "any"),
        }
    }
}

/// Verdict for a single domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DomainOutcome {
    Valid,
    Invalid,
    /// Not checked (test link domains serve placeholder files).
    Skipped,
}

/// Result of validating a domain set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Validation {
    pub valid: bool,
    pub outcomes: Vec<(Domain, DomainOutcome)>,
    pub diagnostics: Diagnostics,
}

impl Validation {
    fn aggregate(
        outcomes: Vec<(Domain, DomainOutcome)>,
        diagnostics: Diagnostics,
        policy: MatchPolicy,
    ) -> Self {
        let mut checked = outcomes
            .iter()
            .filter(|(_, o)| *o != DomainOutcome::Skipped)
            .peekable();
        // Nothing to check is a pass under either policy.
        let valid = checked.peek().is_none()
            || match policy {
                MatchPolicy::All => checked.all(|(_, o)| *o == DomainOutcome::Valid),
                MatchPolicy::Any => checked.any(|(_, o)| *o == DomainOutcome::Valid),
            };
        Self {
            valid,
            outcomes,
            diagnostics,
        }
    }

    pub fn outcome(&self, domain: &str) -> Option<DomainOutcome> {
        self.outcomes
            .iter()
            .find(|(d, _)| d == domain)
            .map(|(_, o)| *o)
    }
}

/// Validates domains against an app identity.
pub struct IdentityMatcher<T, V> {
    client: AssociationClient<T, V>,
    policy: MatchPolicy,
    jobs: usize,
}

impl<T: Transport, V: EnvelopeVerifier> IdentityMatcher<T, V> {
    pub fn new(client: AssociationClient<T, V>) -> Self {
        Self {
            client,
            policy: MatchPolicy::default(),
            jobs: 1,
        }
    }

    pub fn with_policy(mut self, policy: MatchPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn client(&self) -> &AssociationClient<T, V> {
        &self.client
    }

    /// Check a single domain, returning its verdict and diagnostics.
    pub fn check_domain(
        &self,
        domain: &str,
        expected: &AppIdentity,
    ) -> (DomainOutcome, Diagnostics) {
        let mut diagnostics = Diagnostics::new();
        if is_test_link_domain(domain) {
            debug!(domain, "skipping test link domain");
            return (DomainOutcome::Skipped, diagnostics);
        }

        let Some(app_ids) = self.client.app_ids(domain, &mut diagnostics) else {
            warn!(domain, "no appIDs retrieved");
            return (DomainOutcome::Invalid, diagnostics);
        };

        let expected_id = expected.app_id();
        if app_ids.contains(&expected_id) {
            info!(domain, app_id = %expected_id, "domain valid");
            (DomainOutcome::Valid, diagnostics)
        } else {
            warn!(domain, expected = %expected_id, "appID not listed");
            diagnostics.push(
                domain,
                format!(
                    "appIDs from apple-app-site-association file: {}. Expected: {expected_id}",
                    app_ids.join(", ")
                ),
            );
            (DomainOutcome::Invalid, diagnostics)
        }
    }

    /// Validate every domain sequentially.
    ///
    /// # Errors
    ///
    /// Returns an error only when the expected identity cannot be resolved;
    /// per-domain failures are reported in [`Validation::diagnostics`].
    pub fn validate(
        &self,
        domains: &DomainSet,
        source: &dyn IdentitySource,
        configuration: &str,
    ) -> Result<Validation> {
        let expected = source.identity(configuration)?;
        debug!(expected = %expected, domains = domains.len(), "validating domains");

        let results = domains
            .iter()
            .map(|domain| {
                let (outcome, diagnostics) = self.check_domain(domain, &expected);
                (domain.clone(), outcome, diagnostics)
            })
            .collect();
        Ok(self.finish(results))
    }

    fn finish(&self, results: Vec<(Domain, DomainOutcome, Diagnostics)>) -> Validation {
        let mut diagnostics = Diagnostics::new();
        let outcomes = results
            .into_iter()
            .map(|(domain, outcome, local)| {
                diagnostics.extend(local);
                (domain, outcome)
            })
            .collect();
        Validation::aggregate(outcomes, diagnostics, self.policy)
    }

    /// Fetch a domain's association file and split its only appID.
    ///
    /// # Errors
    ///
    /// Returns retrieval, envelope or parse errors, `AssociationError::AmbiguousOwner`
    /// when more than one appID is listed, or `AssociationError::InvalidAppId`.
    pub fn identify_owner(&self, domain: &str) -> Result<AppIdentity> {
        let payload = self.client.fetch(domain)?;
        let mut app_ids = crate::core::association::parse_identifiers(domain, &payload)?;
        if app_ids.len() > 1 {
            return Err(AssociationError::AmbiguousOwner {
                domain: domain.to_string(),
                app_ids,
            }
            .into());
        }
        let app_id = app_ids.pop().ok_or_else(|| AssociationError::Parse {
            domain: domain.to_string(),
            reason: "No appID found in apple-app-site-association file.".to_string(),
        })?;
        AppIdentity::from_app_id(&app_id).ok_or_else(|| {
            AssociationError::InvalidAppId {
                domain: domain.to_string(),
                app_id,
            }
            .into()
        })
    }
}

impl<T, V> IdentityMatcher<T, V>
where
    T: Transport + Sync,
    V: EnvelopeVerifier + Sync,
{
    /// Number of worker threads for [`IdentityMatcher::validate_parallel`].
    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs.max(1);
        self
    }

    /// Validate domains on up to `jobs` threads.
    ///
    /// Each domain collects its own diagnostics; results are merged in domain
    /// order, so the output matches [`IdentityMatcher::validate`].
    ///
    /// # Errors
    ///
    /// Returns an error only when the expected identity cannot be resolved.
    pub fn validate_parallel(
        &self,
        domains: &DomainSet,
        source: &dyn IdentitySource,
        configuration: &str,
    ) -> Result<Validation> {
        if self.jobs <= 1 || domains.len() <= 1 {
            return self.validate(domains, source, configuration);
        }

        let expected = source.identity(configuration)?;
        let chunk_size = domains.len().div_ceil(self.jobs);
        debug!(
            expected = %expected,
            domains = domains.len(),
            jobs = self.jobs,
            "validating domains in parallel"
        );

        let results: Vec<(Domain, DomainOutcome, Diagnostics)> = thread::scope(|scope| {
            let handles: Vec<_> = domains
                .as_slice()
                .chunks(chunk_size)
                .map(|chunk| {
                    let expected = &expected;
                    scope.spawn(move || {
                        chunk
                            .iter()
                            .map(|domain| {
                                let (outcome, diagnostics) = self.check_domain(domain, expected);
                                (domain.clone(), outcome, diagnostics)
                            })
                            .collect::<Vec<_>>()
                    })
                })
                .collect();

            handles
                .into_iter()
                .flat_map(|handle| match handle.join() {
                    Ok(results) => results,
                    Err(panic) => std::panic::resume_unwind(panic),
                })
                .collect()
        });

        Ok(self.finish(results))
    }
}

/// Whether two domain lists contain the same domains, ignoring order.
pub fn match_explicit_domain_list(expected: &[Domain], actual: &[Domain]) -> bool {
    expected.len() == actual.len()
        && expected.iter().all(|d| actual.contains(d))
        && actual.iter().all(|d| expected.contains(d))
}

/// Write an identity to every configuration of a target.
///
/// # Errors
///
/// Returns `ProjectError::TargetNotFound` for an unknown target.
pub fn apply_owner(project: &mut dyn Project, target: &str, identity: &AppIdentity) -> Result<()> {
    info!(target_name = target, team = %identity.team, bundle = %identity.bundle, "applying owner");
    project.set_build_setting(target, DEVELOPMENT_TEAM, &identity.team)?;
    project.set_build_setting(target, PRODUCT_BUNDLE_IDENTIFIER, &identity.bundle)?;
    Ok(())
}
