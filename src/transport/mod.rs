//! Pooled request transport.
//!
//! All network calls made by views go through a single [`RequestPool`].
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐   acquire/release   ┌───────────────┐   POST body   ┌──────────┐
//! │    View     │ ──────────────────► │  RequestPool  │ ────────────► │ Dashboard│
//! │             │ ◄────────────────── │  (1..=3 slots)│ ◄──────────── │   API    │
//! └─────────────┘   response bytes    └───────────────┘  status+bytes └──────────┘
//!                                            │ 401
//!                                            ▼
//!                                      login modal
//! ```
//!
//! # Lease Lifecycle
//!
//! 1. `RequestPool::acquire` - Lease a free slot (or wait FIFO)
//! 2. `Lease::send` - Fire the call; busy indicator set until it settles
//! 3. `RequestPool::release` - Return the slot (or let the pool reclaim it
//!    on timeout, error, or expired session)
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `connection` | Transport contract |
//! | `hooks` | Busy indicator and login prompt seams |
//! | `http` | `reqwest`-backed transport |
//! | `options` | Pool configuration |
//! | `pool` | The bounded pool and leases |

// ============================================================================
// Submodules
// ============================================================================

/// Transport contract.
pub mod connection;

/// Per-lease hooks.
pub mod hooks;

/// HTTP transport.
pub mod http;

/// Pool configuration.
pub mod options;

/// Request pool and leases.
pub mod pool;

#[cfg(test)]
pub(crate) mod testing;

// ============================================================================
// Re-exports
// ============================================================================

pub use connection::{
    Method, STATUS_UNAUTHORIZED, Transport, TransportError, TransportFactory, TransportRequest,
    TransportResponse,
};
pub use hooks::{AuthPrompt, BusyFlag, BusyIndicator, PromptRequest};
pub use http::{HttpTransport, HttpTransportFactory};
pub use options::PoolOptions;
pub use pool::{Lease, PoolHooks, PoolStats, RequestPool};
