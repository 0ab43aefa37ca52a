//! Dashboard coordinator.
//!
//! The [`Dashboard`] owns the router and the request pool for one session
//! and runs the start-up handshake.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;

use tracing::{error, info};

use crate::error::Result;
use crate::protocol::{ErrorMessage, GetCurrentUserRequest, GetCurrentUserResponse};
use crate::router::{NavigationOutcome, View, ViewRouter};
use crate::transport::RequestPool;

use super::builder::DashboardBuilder;
use super::options::DashboardOptions;

// ============================================================================
// Types
// ============================================================================

/// Internal shared state for the dashboard.
pub(crate) struct DashboardInner {
    pub options: DashboardOptions,
    pub router: ViewRouter,
    pub pool: RequestPool,
}

// ============================================================================
// Dashboard
// ============================================================================

/// One dashboard session: a router and the pool its views call through.
///
/// Cheap to clone; hand a clone to every view that needs it.
#[derive(Clone)]
pub struct Dashboard {
    pub(crate) inner: Arc<DashboardInner>,
}

impl fmt::Debug for Dashboard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dashboard")
            .field("base_url", &self.inner.options.base_url)
            .field("router", &self.inner.router)
            .field("pool", &self.inner.pool)
            .finish()
    }
}

impl Dashboard {
    pub(crate) fn new(options: DashboardOptions, router: ViewRouter, pool: RequestPool) -> Self {
        Self {
            inner: Arc::new(DashboardInner {
                options,
                router,
                pool,
            }),
        }
    }

    /// Creates a configuration builder.
    #[inline]
    #[must_use]
    pub fn builder() -> DashboardBuilder {
        DashboardBuilder::new()
    }
}

// ============================================================================
// Dashboard - Accessors
// ============================================================================

impl Dashboard {
    #[inline]
    #[must_use]
    pub fn router(&self) -> &ViewRouter {
        &self.inner.router
    }

    #[inline]
    #[must_use]
    pub fn pool(&self) -> &RequestPool {
        &self.inner.pool
    }

    #[inline]
    #[must_use]
    pub fn options(&self) -> &DashboardOptions {
        &self.inner.options
    }

    /// Registers a view with the router.
    pub fn register_view(&self, view: Arc<dyn View>) {
        self.inner.router.register_view(view);
    }
}

// ============================================================================
// Dashboard - Lifecycle
// ============================================================================

impl Dashboard {
    /// Runs the session handshake, then loads the current location.
    ///
    /// The current user becomes the router's viewer and the login hint of
    /// the re-authentication modal. The first navigation does not push
    /// history.
    ///
    /// # Errors
    ///
    /// - [`Error::Application`](crate::Error::Application) if the server
    ///   reports an error for the current user
    /// - Any pool error from the handshake call
    /// - Any navigation error for the current location
    pub async fn start(&self) -> Result<NavigationOutcome> {
        info!(base_url = %self.inner.options.base_url, "Starting dashboard");

        let response: GetCurrentUserResponse = match self
            .inner
            .pool
            .call(&self.inner.options.current_user_path, &GetCurrentUserRequest::default())
            .await
        {
            Ok(response) => response,
            Err(e) => {
                error!(error = %e, "Current user request failed");
                return Err(e);
            }
        };

        if let Err(e) = response.check() {
            error!(error = %e, "Failed to get current user, reload the page");
            return Err(e);
        }

        let user = response.user.unwrap_or_default();
        info!(login = %user.login_name, admin = user.is_admin, "Session established");
        self.inner
            .pool
            .set_login_hint(Some(user.login_name.clone()));
        self.inner.router.set_viewer(user);

        self.inner.router.refresh_current_view().await
    }

    /// Closes the request pool. Views stay registered.
    pub fn close(&self) {
        info!("Closing dashboard");
        self.inner.pool.close();
    }
}

// ============================================================================
// Tests
// ============================================================================
