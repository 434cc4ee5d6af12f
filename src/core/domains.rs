//! Domain resolution.
//!
//! Computes the ordered, deduplicated set of domains an app claims from
//! explicit configuration and the generated `app.link` subdomains.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::constants::{LIVE_LINK_SUFFIX, TEST_LINK_SUFFIX};
use crate::core::types::Domain;
use crate::error::{DomainError, Result};

/// Explicit domains as supplied by configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainInput {
    /// Already split into individual domains.
    List(Vec<String>),
    /// A single comma-separated string.
    Delimited(String),
}

impl DomainInput {
    /// Convert a configuration value.
    ///
    /// Arrays are stringified element-wise. Strings are treated as
    /// comma-separated lists.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidInputType` for any other value type.
    pub fn from_toml(value: &toml::Value) -> Result<Self> {
        match value {
            toml::Value::String(s) => Ok(Self::Delimited(s.clone())),
            toml::Value::Array(items) => Ok(Self::List(
                items
                    .iter()
                    .map(|item| match item {
                        toml::Value::String(s) => s.clone(),
                        other => other.to_string(),
                    })
                    .collect(),
            )),
            other => Err(DomainError::InvalidInputType(other.type_str().to_string()).into()),
        }
    }

    /// Individual domains in the order given.
    pub fn domains(&self) -> Vec<Domain> {
        match self {
            Self::List(items) => items.clone(),
            Self::Delimited(s) => s
                .split(',')
                .map(str::trim)
                .filter(|d| !d.is_empty())
                .map(String::from)
                .collect(),
        }
    }
}

/// SDK keys. Presence gates the generated link domains.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub live: Option<String>,
    pub test: Option<String>,
}

impl Credentials {
    pub fn new(live: Option<String>, test: Option<String>) -> Self {
        Self { live, test }
    }

    /// Whether neither key is present.
    pub fn is_empty(&self) -> bool {
        self.live.is_none() && self.test.is_none()
    }

    /// Number of keys present.
    pub fn count(&self) -> usize {
        usize::from(self.live.is_some()) + usize::from(self.test.is_some())
    }
}

/// What to do when resolution produces no domains.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EmptyDomainPolicy {
    /// Fail with `DomainError::Empty`.
    #[default]
    Reject,
    /// Accept an empty set.
    Accept,
}

/// An ordered set of domains.
///
/// Preserves the order of first occurrence; comparison is exact and
/// case-sensitive.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct DomainSet(Vec<Domain>);

impl DomainSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a domain unless already present. Returns whether it was added.
    pub fn insert(&mut self, domain: impl Into<Domain>) -> bool {
        let domain = domain.into();
        if self.0.contains(&domain) {
            return false;
        }
        self.0.push(domain);
        true
    }

    pub fn contains(&self, domain: &str) -> bool {
        self.0.iter().any(|d| d == domain)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Domain> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[Domain] {
        &self.0
    }

    pub fn into_vec(self) -> Vec<Domain> {
        self.0
    }

    /// Apply the empty-set policy.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Empty` when the set is empty and the policy rejects it.
    pub fn require_non_empty(self, policy: EmptyDomainPolicy) -> Result<Self> {
        if self.is_empty() && policy == EmptyDomainPolicy::Reject {
            return Err(DomainError::Empty.into());
        }
        Ok(self)
    }
}

impl<S: Into<Domain>> FromIterator<S> for DomainSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = Self::new();
        for domain in iter {
            set.insert(domain);
        }
        set
    }
}

impl<'a> IntoIterator for &'a DomainSet {
    type Item = &'a Domain;
    type IntoIter = std::slice::Iter<'a, Domain>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for DomainSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join(", "))
    }
}

/// Generated link domains for a subdomain.
///
/// Each pair is included only when its key is present; with no subdomain or
/// no keys the result is empty.
pub fn app_link_domains(subdomain: Option<&str>, credentials: &Credentials) -> Vec<Domain> {
    let Some(sub) = subdomain else {
        return Vec::new();
    };

    let mut domains = Vec::with_capacity(4);
    if credentials.live.is_some() {
        domains.push(format!("{sub}.{LIVE_LINK_SUFFIX}"));
        domains.push(format!("{sub}-alternate.{LIVE_LINK_SUFFIX}"));
    }
    if credentials.test.is_some() {
        domains.push(format!("{sub}.{TEST_LINK_SUFFIX}"));
        domains.push(format!("{sub}-alternate.{TEST_LINK_SUFFIX}"));
    }
    domains
}

/// Resolve the full domain set: explicit domains first, then generated ones.
pub fn resolve(
    explicit: Option<&DomainInput>,
    subdomain: Option<&str>,
    credentials: &Credentials,
) -> DomainSet {
    let explicit = explicit.map(DomainInput::domains).unwrap_or_default();
    let generated = app_link_domains(subdomain, credentials);
    explicit.into_iter().chain(generated).collect()
}

/// Whether a domain is a generated test link domain.
///
/// Association files for these are intentionally blank placeholders.
pub fn is_test_link_domain(domain: &str) -> bool {
    domain
        .strip_suffix(TEST_LINK_SUFFIX)
        .is_some_and(|prefix| prefix.ends_with('.') && prefix.len() > 1)
}
