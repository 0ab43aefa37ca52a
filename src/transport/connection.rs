//! Transport contract required by the request pool.
//!
//! A [`Transport`] is one reusable request object: it fires a single
//! binary `POST`, resolves with the response status and bytes, and can be
//! reused for the next call once the previous one has settled. The pool
//! owns transports; callers only ever see them through a
//! [`Lease`](super::Lease).
//!
//! # Outcomes
//!
//! | Transport result | Pool classification |
//! |------------------|---------------------|
//! | `Ok` with 2xx status | success |
//! | `Ok` with 401 | session expired |
//! | `Ok` with other status | error |
//! | `Err(TransportError)` | error |
//! | no result within timeout | timeout |

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::error::Result;

// ============================================================================
// Constants
// ============================================================================

/// Status code reported when the session has expired.
pub const STATUS_UNAUTHORIZED: u16 = 401;

// ============================================================================
// Method
// ============================================================================

/// HTTP method of a pooled call.
///
/// The dashboard API only accepts `POST`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Method {
    /// `POST`.
    #[default]
    Post,
}

impl Method {
    /// Returns the method name.
    #[inline]
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Post => "POST",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// TransportRequest
// ============================================================================

/// A single outbound call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportRequest {
    /// Request path, e.g. `/_/get-logs`.
    pub path: String,
    /// HTTP method.
    pub method: Method,
    /// Fixed pool headers.
    pub headers: Vec<(String, String)>,
    /// Encoded message.
    pub body: Vec<u8>,
}

impl TransportRequest {
    /// Creates a `POST` request with no headers.
    #[inline]
    #[must_use]
    pub fn post(path: impl Into<String>, body: Vec<u8>) -> Self {
        Self {
            path: path.into(),
            method: Method::Post,
            headers: Vec::new(),
            body,
        }
    }

    /// Adds the given headers.
    #[inline]
    #[must_use]
    pub fn with_headers(mut self, headers: Vec<(String, String)>) -> Self {
        self.headers = headers;
        self
    }
}

// ============================================================================
// TransportResponse
// ============================================================================

/// Status and body of a settled call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response bytes.
    pub body: Vec<u8>,
}

impl TransportResponse {
    /// Creates a response.
    #[inline]
    #[must_use]
    pub fn new(status: u16, body: Vec<u8>) -> Self {
        Self { status, body }
    }

    /// Returns `true` for a 2xx status.
    #[inline]
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Returns `true` for the session-expired status.
    #[inline]
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        self.status == STATUS_UNAUTHORIZED
    }
}

// ============================================================================
// TransportError
// ============================================================================

/// Transport-level failure without a usable response.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct TransportError {
    /// Description of the failure.
    pub message: String,
}

impl TransportError {
    /// Creates a transport error.
    #[inline]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

// ============================================================================
// Transport
// ============================================================================

/// A reusable request object.
///
/// Implementations must tolerate having an in-flight `send` future dropped
/// (the pool does this on timeout) and be ready for the next call
/// afterwards.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Sets the timeout for subsequent calls.
    ///
    /// The pool also enforces the timeout itself, so implementations
    /// without a native timeout may ignore this.
    fn set_timeout(&mut self, _timeout: Duration) {}

    /// Fires the request and waits for it to settle.
    async fn send(
        &mut self,
        request: TransportRequest,
    ) -> std::result::Result<TransportResponse, TransportError>;

    /// Returns the status of the last settled call, if any.
    fn status(&self) -> Option<u16>;
}

// ============================================================================
// TransportFactory
// ============================================================================

/// Creates transports for new pool slots.
pub trait TransportFactory: Send + Sync {
    /// Creates a fresh transport.
    ///
    /// # Errors
    ///
    /// Returns an error if the transport cannot be constructed.
    fn create(&self) -> Result<Box<dyn Transport>>;
}

impl<F> TransportFactory for F
where
    F: Fn() -> Result<Box<dyn Transport>> + Send + Sync,
{
    fn create(&self) -> Result<Box<dyn Transport>> {
        self()
    }
}

// ============================================================================
// Tests
// ============================================================================
