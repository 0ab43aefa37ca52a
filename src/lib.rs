//! Dashboard Runtime - client core of a single-page admin dashboard.
//!
//! This library provides the two pieces every dashboard screen depends on:
//! a view router and a pooled, authenticated request transport.
//!
//! # Architecture
//!
//! - **View Router**: resolves a URL or a view name to exactly one active
//!   [`View`], runs its load life cycle and keeps history in sync
//! - **Request Pool**: bounded set of reusable transports with FIFO
//!   leasing, a per-call timeout and central handling of expired sessions
//!
//! Key design principles:
//!
//! - Router and pool are owned handles passed to views, not globals
//! - First registered pattern wins; history is pushed only on URL change
//! - A 401 reclaims the slot and opens one login modal; nothing is replayed
//! - Loads carry a [`NavigationId`] so superseded work can be detected
//!
//! # Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use dashboard_runtime::{Dashboard, DashboardOptions, Result};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let dashboard = Dashboard::builder()
//!         .options(DashboardOptions::new().with_base_url("https://admin.example.com/"))
//!         .auth_prompt(Arc::new(LoginDialog::new()))
//!         .build()?;
//!
//!     dashboard.register_view(Arc::new(HomeView::new(dashboard.clone())));
//!     dashboard.register_view(Arc::new(LogsView::new(dashboard.clone())));
//!
//!     // Handshake, then load the current location
//!     dashboard.start().await?;
//!
//!     dashboard.router().navigate_by_url("/logs?since=1h", true).await?;
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`app`] | [`Dashboard`], builder and options |
//! | [`error`] | Error types and [`Result`] alias |
//! | [`identifiers`] | Type-safe ID wrappers |
//! | [`protocol`] | Codec contract and runtime API messages |
//! | [`router`] | [`ViewRouter`], [`View`] and host integration |
//! | [`transport`] | [`RequestPool`], leases and transports |

// ============================================================================
// Modules
// ============================================================================

/// Dashboard session entry point.
///
/// Use [`Dashboard::builder()`] to create a configured dashboard.
pub mod app;

/// Error types and result aliases.
///
/// All fallible operations return [`Result<T>`] which uses [`Error`].
pub mod error;

/// Type-safe identifiers for slots and navigations.
pub mod identifiers;

/// Codec contract and API messages.
pub mod protocol;

/// View registry, navigation and history.
pub mod router;

/// Pooled request transport.
pub mod transport;

// ============================================================================
// Re-exports
// ============================================================================

// App types
pub use app::{Dashboard, DashboardBuilder, DashboardOptions};

// Error types
pub use error::{Error, Result};

// Identifier types
pub use identifiers::{NavigationId, SlotId};

// Protocol types
pub use protocol::{Credentials, ErrorMessage, Message, UserInfo};

// Router types
pub use router::{
    History, HostEvent, MemoryHistory, NavigationData, NavigationOutcome, QueryData, RouteData,
    RouteParams, RouterOptions, View, ViewContext, ViewPhase, ViewRouter, ViewportSize,
};

// Transport types
pub use transport::{
    AuthPrompt, BusyFlag, BusyIndicator, HttpTransportFactory, Lease, PoolOptions, PoolStats,
    PromptRequest, RequestPool, Transport, TransportFactory,
};
