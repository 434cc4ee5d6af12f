//! Association file retrieval and parsing.
//!
//! Fetches `apple-app-site-association` from each domain over HTTPS, opens
//! signed envelopes, and extracts the authorized appIDs.
//!
//! ## Retrieval
//!
//! Candidate paths are tried in order (`/.well-known/...` then the root).
//! A non-success status, a redirect, or a failed request moves on to the next
//! candidate. The first success wins; its declared content type decides
//! whether the body is a signed envelope or the JSON payload itself.

mod envelope;
mod transport;

pub use envelope::{CmsVerifier, EnvelopeVerifier};
pub use transport::{
    HttpResponse, HttpsTransport, Transport, TransportConfig, DEFAULT_MAX_RESPONSE_BYTES,
    DEFAULT_TIMEOUT_MS,
};

use serde_json::Value;
use tracing::{debug, info, warn};
use url::Url;

use crate::core::constants::{APPLINKS, ASSOCIATION_PATHS, SIGNED_CONTENT_TYPE};
use crate::core::diagnostics::Diagnostics;
use crate::core::types::AppId;
use crate::error::{AssociationError, Result};

/// Fetches and authenticates association files.
pub struct AssociationClient<T = HttpsTransport, V = CmsVerifier> {
    transport: T,
    verifier: V,
}

impl AssociationClient {
    /// Client using the HTTPS transport and CMS verifier.
    ///
    /// # Errors
    ///
    /// Returns `AssociationError::Transport` when the HTTP client cannot be built.
    pub fn https(config: &TransportConfig) -> Result<Self> {
        Ok(Self::new(HttpsTransport::new(config)?, CmsVerifier))
    }
}

impl<T: Transport, V: EnvelopeVerifier> AssociationClient<T, V> {
    pub fn new(transport: T, verifier: V) -> Self {
        Self {
            transport,
            verifier,
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Retrieve the association payload for a domain.
    ///
    /// # Errors
    ///
    /// Returns `AssociationError::Retrieval` when no candidate path succeeds and
    /// `AssociationError::Envelope` when the winning response has no content
    /// type or its signed envelope fails verification.
    pub fn fetch(&self, domain: &str) -> Result<Vec<u8>> {
        for path in ASSOCIATION_PATHS {
            let Some(url) = candidate_url(domain, path) else {
                warn!(domain, "domain is not a valid host name");
                break;
            };

            let response = match self.transport.get(&url) {
                Ok(response) => response,
                Err(e) => {
                    info!(url = %url, error = %e, "request failed, trying next location");
                    continue;
                }
            };

            if !response.is_success() {
                info!(
                    url = %url,
                    status = response.status,
                    reason = %response.reason,
                    "could not retrieve association file, ignoring"
                );
                continue;
            }

            let payload = self.payload(domain, &response)?;
            info!(
                url = %url,
                status = response.status,
                content_type = response.content_type.as_deref().unwrap_or_default(),
                "retrieved association file"
            );
            return Ok(payload);
        }

        Err(AssociationError::Retrieval {
            domain: domain.to_string(),
        }
        .into())
    }

    /// Fetch and extract appIDs, recording any failure in `diagnostics`.
    ///
    /// Returns `None` when nothing usable was found.
    pub fn app_ids(&self, domain: &str, diagnostics: &mut Diagnostics) -> Option<Vec<AppId>> {
        let payload = match self.fetch(domain) {
            Ok(payload) => payload,
            Err(crate::error::Error::Association(e)) => {
                diagnostics.record(domain, &e);
                return None;
            }
            Err(e) => {
                diagnostics.push(domain, e.to_string());
                return None;
            }
        };

        let ids = extract_identifiers(domain, &payload, diagnostics);
        if ids.is_empty() {
            None
        } else {
            Some(ids)
        }
    }

    fn payload(&self, domain: &str, response: &HttpResponse) -> Result<Vec<u8>> {
        let Some(content_type) = response.content_type.as_deref() else {
            return Err(AssociationError::Envelope {
                domain: domain.to_string(),
                reason: "response does not contain a Content-Type header".to_string(),
            }
            .into());
        };

        if !content_type
            .to_ascii_lowercase()
            .contains(SIGNED_CONTENT_TYPE)
        {
            return Ok(response.body.clone());
        }

        debug!(domain, "verifying signed association file");
        self.verifier
            .open(&response.body, response.peer_certificate.as_deref())
            .map_err(|reason| {
                AssociationError::Envelope {
                    domain: domain.to_string(),
                    reason,
                }
                .into()
            })
    }
}

/// The URL of `path` on `domain`, or `None` when `domain` is not a bare
/// host. Internationalized names are accepted in their punycode form.
fn candidate_url(domain: &str, path: &str) -> Option<Url> {
    let url = Url::parse(&format!("https://{domain}{path}")).ok()?;
    let bare_host = url.host_str().is_some_and(|host| !host.is_empty())
        && url.username().is_empty()
        && url.password().is_none()
        && url.port().is_none()
        && url.query().is_none()
        && url.fragment().is_none();
    (bare_host && url.path() == path).then_some(url)
}

/// Parse a payload into its distinct appIDs, in document order.
///
/// # Errors
///
/// Returns `AssociationError::Parse` with a distinct message for malformed
/// JSON, a missing `applinks` object, missing `details`, or no appIDs.
pub fn parse_identifiers(domain: &str, payload: &[u8]) -> Result<Vec<AppId>> {
    let parse_error = |reason: String| AssociationError::Parse {
        domain: domain.to_string(),
        reason,
    };

    let document: Value = serde_json::from_slice(payload).map_err(|e| {
        parse_error(format!(
            "Failed to parse apple-app-site-association file: {e}"
        ))
    })?;

    let applinks = document.get(APPLINKS).ok_or_else(|| {
        parse_error(format!(
            "No {APPLINKS} found in apple-app-site-association file."
        ))
    })?;

    let details = applinks.get("details").ok_or_else(|| {
        parse_error(format!(
            "No details found for {APPLINKS} in apple-app-site-association file."
        ))
    })?;

    let Some(details) = details.as_array() else {
        return Err(parse_error(format!(
            "{APPLINKS} details in apple-app-site-association file is not an array."
        ))
        .into());
    };

    let mut ids: Vec<AppId> = Vec::new();
    for detail in details {
        let single = detail.get("appID").and_then(Value::as_str);
        let multiple = detail
            .get("appIDs")
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
            .filter_map(Value::as_str);
        for id in single.into_iter().chain(multiple) {
            if !ids.iter().any(|existing| existing == id) {
                ids.push(id.to_string());
            }
        }
    }

    if ids.is_empty() {
        return Err(
            parse_error("No appID found in apple-app-site-association file.".to_string()).into(),
        );
    }

    debug!(domain, count = ids.len(), "extracted appIDs");
    Ok(ids)
}

/// Extract appIDs, appending a diagnostic on failure.
///
/// Returns an empty list when the payload is unusable.
pub fn extract_identifiers(
    domain: &str,
    payload: &[u8],
    diagnostics: &mut Diagnostics,
) -> Vec<AppId> {
    match parse_identifiers(domain, payload) {
        Ok(ids) => ids,
        Err(crate::error::Error::Association(e)) => {
            diagnostics.record(domain, &e);
            Vec::new()
        }
        Err(e) => {
            diagnostics.push(domain, e.to_string());
            Vec::new()
        }
    }
}
