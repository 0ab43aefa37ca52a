//! Builder pattern for dashboard configuration.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use dashboard_runtime::{Dashboard, DashboardOptions};
//!
//! let dashboard = Dashboard::builder()
//!     .options(DashboardOptions::new().with_base_url("https://admin.example.com/"))
//!     .auth_prompt(Arc::new(LoginDialog::new()))
//!     .build()?;
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;

use crate::error::Result;
use crate::router::{History, MemoryHistory, ViewRouter};
use crate::transport::{
    AuthPrompt, BusyIndicator, HttpTransportFactory, PoolHooks, RequestPool, TransportFactory,
};

use super::core::Dashboard;
use super::options::DashboardOptions;

// ============================================================================
// DashboardBuilder
// ============================================================================

/// Builder for configuring a [`Dashboard`].
///
/// Use [`Dashboard::builder()`] to create a new builder. Anything not set
/// falls back to a default: HTTP transports against `base_url`, an
/// in-memory history at `/`, a [`BusyFlag`](crate::transport::BusyFlag)
/// and no login prompt.
#[derive(Default, Clone)]
pub struct DashboardBuilder {
    options: DashboardOptions,
    transport_factory: Option<Arc<dyn TransportFactory>>,
    history: Option<Arc<dyn History>>,
    busy_indicator: Option<Arc<dyn BusyIndicator>>,
    auth_prompt: Option<Arc<dyn AuthPrompt>>,
}

impl fmt::Debug for DashboardBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DashboardBuilder")
            .field("options", &self.options)
            .field("transport_factory", &self.transport_factory.is_some())
            .field("history", &self.history.is_some())
            .field("busy_indicator", &self.busy_indicator.is_some())
            .field("auth_prompt", &self.auth_prompt.is_some())
            .finish()
    }
}

// ============================================================================
// DashboardBuilder Implementation
// ============================================================================

impl DashboardBuilder {
    /// Creates a builder with default options.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the dashboard options.
    #[inline]
    #[must_use]
    pub fn options(mut self, options: DashboardOptions) -> Self {
        self.options = options;
        self
    }

    /// Sets the factory pool slots are created with.
    #[inline]
    #[must_use]
    pub fn transport_factory(mut self, factory: Arc<dyn TransportFactory>) -> Self {
        self.transport_factory = Some(factory);
        self
    }

    /// Sets the history stack the router pushes to.
    #[inline]
    #[must_use]
    pub fn history(mut self, history: Arc<dyn History>) -> Self {
        self.history = Some(history);
        self
    }

    /// Sets the indicator shown while a call is in flight.
    #[inline]
    #[must_use]
    pub fn busy_indicator(mut self, busy: Arc<dyn BusyIndicator>) -> Self {
        self.busy_indicator = Some(busy);
        self
    }

    /// Sets the login modal opened on an expired session.
    #[inline]
    #[must_use]
    pub fn auth_prompt(mut self, prompt: Arc<dyn AuthPrompt>) -> Self {
        self.auth_prompt = Some(prompt);
        self
    }

    /// Builds the dashboard with validation.
    ///
    /// # Errors
    ///
    /// - [`Error::Config`](crate::Error::Config) or
    ///   [`Error::InvalidUrl`](crate::Error::InvalidUrl) if the options are
    ///   invalid
    /// - [`Error::Config`](crate::Error::Config) if the default HTTP client
    ///   cannot be created
    /// - Any error from the factory while creating the minimum slots
    pub fn build(self) -> Result<Dashboard> {
        self.options.validate()?;

        let factory = match self.transport_factory {
            Some(factory) => factory,
            None => Arc::new(HttpTransportFactory::new(&self.options.base_url)?),
        };

        let mut hooks = PoolHooks::default();
        if let Some(busy) = self.busy_indicator {
            hooks = hooks.with_busy(busy);
        }
        if let Some(prompt) = self.auth_prompt {
            hooks = hooks.with_auth(prompt);
        }

        let pool = RequestPool::with_hooks(self.options.pool.clone(), factory, hooks)?;

        let history = self
            .history
            .unwrap_or_else(|| Arc::new(MemoryHistory::default()));
        let router = ViewRouter::new(self.options.router.clone(), history);

        Ok(Dashboard::new(self.options, router, pool))
    }
}

// ============================================================================
// Tests
// ============================================================================
