//! Request pool configuration.
//!
//! # Example
//!
//! ```ignore
//! use std::time::Duration;
//! use dashboard_runtime::PoolOptions;
//!
//! let options = PoolOptions::new()
//!     .with_slots(1, 3)
//!     .with_timeout(Duration::from_secs(30));
//!
//! options.validate()?;
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::protocol::{JSON_CONTENT_TYPE, LOGIN_PATH};

// ============================================================================
// Constants
// ============================================================================

/// Default minimum number of slots kept by the pool.
pub const DEFAULT_MIN_SLOTS: usize = 1;

/// Default maximum number of slots.
pub const DEFAULT_MAX_SLOTS: usize = 3;

/// Default per-lease timeout in milliseconds.
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

/// Content type of every pooled call, matching the runtime's message codec.
pub const CONTENT_TYPE: &str = JSON_CONTENT_TYPE;

/// Same-origin marker header.
pub const REQUESTED_WITH: (&str, &str) = ("X-Requested-With", "XMLHttpRequest");

// ============================================================================
// PoolOptions
// ============================================================================

/// Request pool configuration options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolOptions {
    /// Slots created up front and never shrunk below.
    pub min_slots: usize,

    /// Hard upper bound on slots.
    pub max_slots: usize,

    /// Per-lease timeout in milliseconds.
    pub timeout_ms: u64,

    /// Headers sent with every call.
    pub headers: Vec<(String, String)>,

    /// Path of the login endpoint used by the login modal.
    pub login_path: String,
}

impl Default for PoolOptions {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Constructors
// ============================================================================

impl PoolOptions {
    /// Creates options with the stock defaults.
    #[must_use]
    pub fn new() -> Self {
        Self {
            min_slots: DEFAULT_MIN_SLOTS,
            max_slots: DEFAULT_MAX_SLOTS,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            headers: default_headers(),
            login_path: LOGIN_PATH.to_string(),
        }
    }
}

/// The fixed headers: content type and same-origin marker.
#[must_use]
pub fn default_headers() -> Vec<(String, String)> {
    vec![
        ("Content-Type".to_string(), CONTENT_TYPE.to_string()),
        (REQUESTED_WITH.0.to_string(), REQUESTED_WITH.1.to_string()),
    ]
}

// ============================================================================
// Builder Methods
// ============================================================================

impl PoolOptions {
    /// Sets the minimum and maximum slot counts.
    #[inline]
    #[must_use]
    pub fn with_slots(mut self, min: usize, max: usize) -> Self {
        self.min_slots = min;
        self.max_slots = max;
        self
    }

    /// Sets the per-lease timeout.
    #[inline]
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Sets the login endpoint path.
    #[inline]
    #[must_use]
    pub fn with_login_path(mut self, path: impl Into<String>) -> Self {
        self.login_path = path.into();
        self
    }

    /// Adds a header sent with every call, replacing one of the same name.
    #[inline]
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        self.headers.retain(|(k, _)| !k.eq_ignore_ascii_case(&name));
        self.headers.push((name, value.into()));
        self
    }
}

// ============================================================================
// Accessors & Validation
// ============================================================================

impl PoolOptions {
    /// Returns the per-lease timeout.
    #[inline]
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Validates the options.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if `max_slots` is zero, `min_slots`
    /// exceeds `max_slots`, or the timeout is zero.
    pub fn validate(&self) -> Result<()> {
        if self.max_slots == 0 {
            return Err(Error::config("max_slots must be at least 1"));
        }
        if self.min_slots > self.max_slots {
            return Err(Error::config(format!(
                "min_slots ({}) exceeds max_slots ({})",
                self.min_slots, self.max_slots
            )));
        }
        if self.timeout_ms == 0 {
            return Err(Error::config("timeout_ms must be greater than zero"));
        }
        if !self.login_path.starts_with('/') {
            return Err(Error::config(format!(
                "login_path must be absolute, got {:?}",
                self.login_path
            )));
        }
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
