//! Dashboard session entry point.
//!
//! # Components
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Dashboard`] | Owns the router and request pool, runs the handshake |
//! | [`DashboardBuilder`] | Fluent configuration builder |
//! | [`DashboardOptions`] | Serde-loadable configuration |
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use dashboard_runtime::{Dashboard, DashboardOptions, Result};
//!
//! # async fn example() -> Result<()> {
//! let options = DashboardOptions::from_json(&std::fs::read_to_string("dashboard.json")?)?;
//! let dashboard = Dashboard::builder().options(options).build()?;
//!
//! dashboard.register_view(Arc::new(HomeView::new()));
//! dashboard.register_view(Arc::new(LogsView::new()));
//! dashboard.start().await?;
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Submodules
// ============================================================================

/// Fluent builder pattern for dashboard configuration.
pub mod builder;

/// Core dashboard implementation.
pub mod core;

/// Dashboard options.
pub mod options;

// ============================================================================
// Re-exports
// ============================================================================

pub use self::core::Dashboard;
pub use builder::DashboardBuilder;
pub use options::{DEFAULT_BASE_URL, DashboardOptions};
