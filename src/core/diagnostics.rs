//! Diagnostics collector.
//!
//! Domain-scoped failure messages accumulated across a validation run and
//! reported together at the end.

use std::fmt;

/// A single domain-qualified diagnostic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    domain: String,
    message: String,
}

impl Diagnostic {
    pub fn new(domain: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            message: message.into(),
        }
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.domain, self.message)
    }
}

/// Ordered list of diagnostics, passed explicitly through validating calls.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a message for a domain.
    pub fn push(&mut self, domain: &str, message: impl Into<String>) {
        self.entries.push(Diagnostic::new(domain, message));
    }

    /// Record an error that already carries its domain prefix.
    pub fn record(&mut self, domain: &str, error: &crate::error::AssociationError) {
        let rendered = error.to_string();
        let prefix = format!("[{domain}] ");
        let message = rendered
            .strip_prefix(&prefix)
            .map(String::from)
            .unwrap_or(rendered);
        self.push(domain, message);
    }

    /// Append all entries from another collector, preserving order.
    pub fn extend(&mut self, other: Diagnostics) {
        self.entries.extend(other.entries);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter()
    }

    /// Entries reported for one domain.
    pub fn for_domain<'a>(&'a self, domain: &'a str) -> impl Iterator<Item = &'a Diagnostic> {
        self.entries.iter().filter(move |d| d.domain == domain)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
