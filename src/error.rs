//! Error types for the dashboard runtime.
//!
//! This module defines all error types used throughout the crate.
//!
//! # Usage
//!
//! All fallible operations return [`Result<T>`] which uses [`Error`]:
//!
//! ```ignore
//! use dashboard_runtime::{Result, ViewRouter};
//!
//! async fn open_logs(router: &ViewRouter) -> Result<()> {
//!     router.navigate_by_url("/logs?since=1h", true).await?;
//!     Ok(())
//! }
//! ```
//!
//! # Error Categories
//!
//! | Category | Variants |
//! |----------|----------|
//! | Configuration | [`Error::Config`], [`Error::DuplicateView`], [`Error::InvalidPattern`] |
//! | Navigation | [`Error::ViewNotFound`], [`Error::NoRouteMatch`], [`Error::InvalidUrl`] |
//! | Transport | [`Error::RequestTimeout`], [`Error::Status`], [`Error::Transport`] |
//! | Pool | [`Error::LeaseReclaimed`], [`Error::PoolClosed`] |
//! | Authentication | [`Error::SessionExpired`], [`Error::LoginRejected`] |
//! | Application | [`Error::Application`], [`Error::Codec`] |
//! | External | [`Error::Json`] |

// ============================================================================
// Imports
// ============================================================================

use std::result::Result as StdResult;

use thiserror::Error;

// ============================================================================
// Result Alias
// ============================================================================

/// Result type alias using crate [`enum@Error`].
///
/// All fallible operations in this crate return this type.
pub type Result<T> = StdResult<T, Error>;

// ============================================================================
// Error Enum
// ============================================================================

/// Main error type for the crate.
///
/// Each variant includes relevant context for debugging.
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Configuration error.
    ///
    /// Returned when pool or dashboard options are invalid.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration error.
        message: String,
    },

    /// A view with the same name is already registered.
    ///
    /// Only returned by [`ViewRouter::try_register_view`](crate::ViewRouter::try_register_view).
    #[error("View already registered: {name:?}")]
    DuplicateView {
        /// The conflicting view name.
        name: String,
    },

    /// A view URL pattern failed to compile.
    #[error("Invalid URL pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    // ========================================================================
    // Navigation Errors
    // ========================================================================
    /// No view is registered under the requested name.
    #[error("View not found: {name:?}")]
    ViewNotFound {
        /// The requested view name.
        name: String,
    },

    /// No registered view pattern matches the path.
    #[error("No view matches path: {path:?}")]
    NoRouteMatch {
        /// The resolved path (after default-route substitution).
        path: String,
    },

    /// The navigation URL could not be parsed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // ========================================================================
    // Transport Errors
    // ========================================================================
    /// The call did not complete within the lease timeout.
    ///
    /// The pool has already reclaimed the slot.
    #[error("Request to {path} timed out after {timeout_ms}ms")]
    RequestTimeout {
        /// Request path.
        path: String,
        /// Milliseconds waited before timeout.
        timeout_ms: u64,
    },

    /// The server answered with a non-success status.
    #[error("Request to {path} failed with status {status}")]
    Status {
        /// Request path.
        path: String,
        /// HTTP status code.
        status: u16,
    },

    /// Transport-level failure (connection refused, reset, ...).
    #[error("Transport error: {message}")]
    Transport {
        /// Description of the failure.
        message: String,
    },

    // ========================================================================
    // Pool Errors
    // ========================================================================
    /// The lease was already reclaimed by the pool.
    #[error("Lease {lease_id} was reclaimed by the pool")]
    LeaseReclaimed {
        /// Correlation id of the lease.
        lease_id: uuid::Uuid,
    },

    /// The pool has been closed.
    #[error("Request pool closed")]
    PoolClosed,

    // ========================================================================
    // Authentication Errors
    // ========================================================================
    /// The server reported an expired session (401).
    ///
    /// The slot is reclaimed and the re-authentication modal is opened.
    /// The interrupted call is not replayed.
    #[error("Session expired while calling {path}")]
    SessionExpired {
        /// Request path that hit the expired session.
        path: String,
    },

    /// The login endpoint rejected the credentials.
    #[error("Login rejected: {message}")]
    LoginRejected {
        /// Message reported by the server.
        message: String,
    },

    // ========================================================================
    // Application Errors
    // ========================================================================
    /// Error message carried inside an otherwise successful response.
    #[error("Application error: {message}")]
    Application {
        /// Decoded error message.
        message: String,
    },

    /// A message could not be encoded or decoded.
    #[error("Codec error: {message}")]
    Codec {
        /// Description of the codec failure.
        message: String,
    },

    // ========================================================================
    // External Errors
    // ========================================================================
    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

// ============================================================================
// Error Constructors
// ============================================================================

impl Error {
    /// Creates a configuration error.
    #[inline]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Creates a duplicate view error.
    #[inline]
    pub fn duplicate_view(name: impl Into<String>) -> Self {
        Self::DuplicateView { name: name.into() }
    }

    /// Creates a view not found error.
    #[inline]
    pub fn view_not_found(name: impl Into<String>) -> Self {
        Self::ViewNotFound { name: name.into() }
    }

    /// Creates a no route match error.
    #[inline]
    pub fn no_route_match(path: impl Into<String>) -> Self {
        Self::NoRouteMatch { path: path.into() }
    }

    /// Creates a request timeout error.
    #[inline]
    pub fn request_timeout(path: impl Into<String>, timeout_ms: u64) -> Self {
        Self::RequestTimeout {
            path: path.into(),
            timeout_ms,
        }
    }

    /// Creates a status error.
    #[inline]
    pub fn status(path: impl Into<String>, status: u16) -> Self {
        Self::Status {
            path: path.into(),
            status,
        }
    }

    /// Creates a transport error.
    #[inline]
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Creates a session expired error.
    #[inline]
    pub fn session_expired(path: impl Into<String>) -> Self {
        Self::SessionExpired { path: path.into() }
    }

    /// Creates a login rejected error.
    #[inline]
    pub fn login_rejected(message: impl Into<String>) -> Self {
        Self::LoginRejected {
            message: message.into(),
        }
    }

    /// Creates an application error.
    #[inline]
    pub fn application(message: impl Into<String>) -> Self {
        Self::Application {
            message: message.into(),
        }
    }

    /// Creates a codec error.
    #[inline]
    pub fn codec(message: impl Into<String>) -> Self {
        Self::Codec {
            message: message.into(),
        }
    }
}

// ============================================================================
// Error Predicates
// ============================================================================

impl Error {
    /// Returns `true` if this is a timeout error.
    #[inline]
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::RequestTimeout { .. })
    }

    /// Returns `true` if no view could be resolved for a navigation.
    #[inline]
    #[must_use]
    pub fn is_navigation_miss(&self) -> bool {
        matches!(self, Self::ViewNotFound { .. } | Self::NoRouteMatch { .. })
    }

    /// Returns `true` if the request pool handled this failure itself.
    ///
    /// For these errors the slot has already been reclaimed and the
    /// caller should treat the call as abandoned.
    #[inline]
    #[must_use]
    pub fn is_infrastructure(&self) -> bool {
        matches!(
            self,
            Self::RequestTimeout { .. }
                | Self::Status { .. }
                | Self::Transport { .. }
                | Self::SessionExpired { .. }
        )
    }

    /// Returns `true` if this error is recoverable.
    ///
    /// Recoverable errors may succeed when the caller re-issues the call.
    #[inline]
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::RequestTimeout { .. } | Self::Transport { .. } | Self::SessionExpired { .. }
        )
    }
}

// ============================================================================
// Tests
// ============================================================================
