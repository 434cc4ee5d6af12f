//! HTTPS transport for association file retrieval.

use std::io::Read;
use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;
use reqwest::redirect::Policy;
use reqwest::tls::TlsInfo;
use tracing::debug;
use url::Url;

use crate::error::{AssociationError, Result};

/// Default request timeout in milliseconds.
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;

/// Default upper bound on association file size.
pub const DEFAULT_MAX_RESPONSE_BYTES: usize = 512 * 1024;

/// A completed GET request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub reason: String,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
    /// DER encoding of the certificate presented by the server.
    pub peer_certificate: Option<Vec<u8>>,
}

impl HttpResponse {
    /// A 200 response with the given content type and body.
    pub fn ok(content_type: Option<&str>, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status: 200,
            reason: "OK".to_string(),
            content_type: content_type.map(String::from),
            body: body.into(),
            peer_certificate: None,
        }
    }

    /// A bodiless response with the given status.
    pub fn with_status(status: u16, reason: &str) -> Self {
        Self {
            status,
            reason: reason.to_string(),
            ..Self::default()
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Secure transport used to fetch association files.
pub trait Transport {
    /// Perform a GET request. Redirects must not be followed.
    ///
    /// # Errors
    ///
    /// Returns `AssociationError::Transport` when no response was received.
    fn get(&self, url: &Url) -> Result<HttpResponse>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn get(&self, url: &Url) -> Result<HttpResponse> {
        (**self).get(url)
    }
}

/// Transport settings.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub timeout_ms: u64,
    pub max_response_bytes: usize,
    pub user_agent: String,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_TIMEOUT_MS,
            max_response_bytes: DEFAULT_MAX_RESPONSE_BYTES,
            user_agent: concat!("linksmith/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Blocking HTTPS transport backed by reqwest and rustls.
pub struct HttpsTransport {
    client: Client,
    max_response_bytes: usize,
}

impl HttpsTransport {
    /// Build a transport.
    ///
    /// # Errors
    ///
    /// Returns `AssociationError::Transport` when the client cannot be built.
    pub fn new(config: &TransportConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .user_agent(config.user_agent.clone())
            .redirect(Policy::none())
            .https_only(true)
            .tls_info(true)
            .build()
            .map_err(|e| AssociationError::Transport(e.to_string()))?;
        Ok(Self {
            client,
            max_response_bytes: config.max_response_bytes,
        })
    }
}

impl Transport for HttpsTransport {
    fn get(&self, url: &Url) -> Result<HttpResponse> {
        debug!(url = %url, "GET");

        let mut response = self
            .client
            .get(url.as_str())
            .send()
            .map_err(|e| AssociationError::Transport(e.to_string()))?;

        let status = response.status();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(String::from);
        let peer_certificate = response
            .extensions()
            .get::<TlsInfo>()
            .and_then(TlsInfo::peer_certificate)
            .map(<[u8]>::to_vec);
        let body = read_limited(&mut response, self.max_response_bytes)?;

        Ok(HttpResponse {
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or_default().to_string(),
            content_type,
            body,
            peer_certificate,
        })
    }
}

/// Read a body, failing once it exceeds `max_bytes`.
fn read_limited(reader: &mut impl Read, max_bytes: usize) -> Result<Vec<u8>> {
    let limit = u64::try_from(max_bytes).unwrap_or(u64::MAX).saturating_add(1);
    let mut body = Vec::new();
    reader
        .by_ref()
        .take(limit)
        .read_to_end(&mut body)
        .map_err(|e| AssociationError::Transport(e.to_string()))?;
    if body.len() > max_bytes {
        return Err(AssociationError::Transport(format!(
            "response exceeds {max_bytes} bytes"
        ))
        .into());
    }
    Ok(body)
}
