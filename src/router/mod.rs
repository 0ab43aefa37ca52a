//! View routing.
//!
//! The router owns the registered views, resolves navigation intents to
//! exactly one active view and keeps the history stack in sync.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`ViewRouter`] | Registry, active view, navigation |
//! | [`View`] | Contract every screen implements |
//! | [`RouteData`] | Params, query and payload attached on activation |
//! | [`History`] | Host history stack ([`MemoryHistory`] in memory) |
//! | [`HostEvent`] | Resize and back/forward notifications |
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use dashboard_runtime::{MemoryHistory, RouterOptions, ViewRouter};
//!
//! # async fn example() -> dashboard_runtime::Result<()> {
//! let router = ViewRouter::new(RouterOptions::default(), Arc::new(MemoryHistory::new("/")));
//! router.register_view(Arc::new(HomeView::new()));
//! router.register_view(Arc::new(LogsView::new()));
//!
//! router.navigate_by_url("/logs?x=1", true).await?;
//! assert_eq!(router.active_view_name().as_deref(), Some("logs"));
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Submodules
// ============================================================================

/// Router handle and registry.
pub mod core;

/// History and host events.
pub mod host;

/// Navigation by name and URL.
pub mod navigation;

/// View contract and route data.
pub mod view;

#[cfg(test)]
pub(crate) mod testing;

// ============================================================================
// Re-exports
// ============================================================================

pub use self::core::{DEFAULT_CONTAINER, DEFAULT_ROUTE, RouterOptions, ViewRouter};
pub use host::{History, HistoryEntry, HostEvent, MemoryHistory, ViewportSize};
pub use navigation::NavigationOutcome;
pub use view::{
    NavigationData, QueryData, RouteData, RouteParams, View, ViewContext, ViewPhase,
    compile_pattern,
};
