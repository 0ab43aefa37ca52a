//! HTTP implementation of [`Transport`] backed by `reqwest`.
//!
//! All transports created by one [`HttpTransportFactory`] share a single
//! `reqwest::Client`, so connection reuse and the session cookie set by the
//! login endpoint are shared across pool slots.

// ============================================================================
// Imports
// ============================================================================

use std::time::Duration;

use async_trait::async_trait;
use tracing::trace;
use url::Url;

use crate::error::{Error, Result};

use super::connection::{
    Method, Transport, TransportError, TransportFactory, TransportRequest, TransportResponse,
};

// ============================================================================
// Constants
// ============================================================================

/// Timeout used until the pool sets one.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

// ============================================================================
// HttpTransport
// ============================================================================

/// One reusable HTTP request object.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    /// Shared client.
    client: reqwest::Client,
    /// Base URL request paths are resolved against.
    base_url: Url,
    /// Per-call timeout.
    timeout: Duration,
    /// Status of the last settled call.
    last_status: Option<u16>,
}

impl HttpTransport {
    /// Creates a transport for the given client and base URL.
    #[must_use]
    pub fn new(client: reqwest::Client, base_url: Url) -> Self {
        Self {
            client,
            base_url,
            timeout: DEFAULT_TIMEOUT,
            last_status: None,
        }
    }

    /// Returns the base URL.
    #[inline]
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolves a request path against the base URL.
    fn resolve(&self, path: &str) -> std::result::Result<Url, TransportError> {
        self.base_url
            .join(path)
            .map_err(|e| TransportError::new(format!("invalid request path {path:?}: {e}")))
    }
}

#[async_trait]
impl Transport for HttpTransport {
    fn set_timeout(&mut self, timeout: Duration) {
        self.timeout = timeout;
    }

    async fn send(
        &mut self,
        request: TransportRequest,
    ) -> std::result::Result<TransportResponse, TransportError> {
        let url = self.resolve(&request.path)?;
        let method = match request.method {
            Method::Post => reqwest::Method::POST,
        };

        let mut builder = self
            .client
            .request(method, url)
            .timeout(self.timeout)
            .body(request.body);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        self.last_status = None;
        let response = builder
            .send()
            .await
            .map_err(|e| TransportError::new(e.to_string()))?;

        let status = response.status().as_u16();
        self.last_status = Some(status);

        let body = response
            .bytes()
            .await
            .map_err(|e| TransportError::new(e.to_string()))?;

        trace!(path = %request.path, status, len = body.len(), "HTTP call settled");
        Ok(TransportResponse::new(status, body.to_vec()))
    }

    fn status(&self) -> Option<u16> {
        self.last_status
    }
}

// ============================================================================
// HttpTransportFactory
// ============================================================================

/// Creates [`HttpTransport`]s sharing one client.
#[derive(Debug, Clone)]
pub struct HttpTransportFactory {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpTransportFactory {
    /// Creates a factory for the given base URL.
    ///
    /// The client keeps cookies so the session survives across slots.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidUrl`] if the base URL cannot be parsed
    /// - [`Error::Config`] if the HTTP client cannot be built
    pub fn new(base_url: &str) -> Result<Self> {
        let base_url = Url::parse(base_url)?;
        let client = reqwest::Client::builder()
            .cookie_store(true)
            .build()
            .map_err(|e| Error::config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client, base_url })
    }

    /// Creates a factory reusing an existing client.
    #[must_use]
    pub fn with_client(client: reqwest::Client, base_url: Url) -> Self {
        Self { client, base_url }
    }
}

impl TransportFactory for HttpTransportFactory {
    fn create(&self) -> Result<Box<dyn Transport>> {
        Ok(Box::new(HttpTransport::new(
            self.client.clone(),
            self.base_url.clone(),
        )))
    }
}

// ============================================================================
// Tests
// ============================================================================
