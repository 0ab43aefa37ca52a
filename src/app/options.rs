//! Dashboard configuration.
//!
//! Options can be built in code or loaded from JSON. Missing fields take
//! their defaults:
//!
//! ```json
//! {
//!   "base_url": "https://admin.example.com/",
//!   "default_route": "",
//!   "pool": { "max_slots": 3, "timeout_ms": 30000 }
//! }
//! ```

// ============================================================================
// Imports
// ============================================================================

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{Error, Result};
use crate::protocol::CURRENT_USER_PATH;
use crate::router::RouterOptions;
use crate::transport::PoolOptions;

// ============================================================================
// Constants
// ============================================================================

/// Default origin the dashboard API is served from.
pub const DEFAULT_BASE_URL: &str = "http://localhost/";

// ============================================================================
// DashboardOptions
// ============================================================================

/// Top-level dashboard configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardOptions {
    /// Origin request paths are resolved against.
    pub base_url: String,

    /// Path of the session handshake endpoint.
    pub current_user_path: String,

    /// Router settings (container id, default route).
    #[serde(flatten)]
    pub router: RouterOptions,

    /// Request pool settings.
    pub pool: PoolOptions,
}

impl Default for DashboardOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl DashboardOptions {
    /// Creates options with the stock defaults.
    #[must_use]
    pub fn new() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            current_user_path: CURRENT_USER_PATH.to_string(),
            router: RouterOptions::default(),
            pool: PoolOptions::default(),
        }
    }

    /// Parses and validates options from JSON.
    ///
    /// # Errors
    ///
    /// - [`Error::Json`] if the document is malformed
    /// - Any error from [`validate`](Self::validate)
    pub fn from_json(json: &str) -> Result<Self> {
        let options: Self = serde_json::from_str(json)?;
        options.validate()?;
        Ok(options)
    }
}

// ============================================================================
// Builder Methods
// ============================================================================

impl DashboardOptions {
    #[inline]
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Sets the id of the element views render into.
    #[inline]
    #[must_use]
    pub fn with_container(mut self, container: impl Into<String>) -> Self {
        self.router.container = container.into();
        self
    }

    /// Sets the path matched for an empty or root location.
    #[inline]
    #[must_use]
    pub fn with_default_route(mut self, route: impl Into<String>) -> Self {
        self.router.default_route = route.into();
        self
    }

    #[inline]
    #[must_use]
    pub fn with_pool(mut self, pool: PoolOptions) -> Self {
        self.pool = pool;
        self
    }
}

// ============================================================================
// Validation
// ============================================================================

impl DashboardOptions {
    /// Validates the options.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidUrl`] if `base_url` does not parse
    /// - [`Error::Config`] if a path is relative, the container id is
    ///   empty, or the pool options are invalid
    pub fn validate(&self) -> Result<()> {
        Url::parse(&self.base_url)?;

        if !self.current_user_path.starts_with('/') {
            return Err(Error::config(format!(
                "current_user_path must be absolute, got {:?}",
                self.current_user_path
            )));
        }
        if self.router.container.is_empty() {
            return Err(Error::config("container must not be empty"));
        }

        self.pool.validate()
    }
}

// ============================================================================
// Tests
// ============================================================================
