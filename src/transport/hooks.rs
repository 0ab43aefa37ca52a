//! Per-lease hooks installed by the pool.
//!
//! Every lease the pool hands out reports to the same two hooks:
//!
//! - [`BusyIndicator`]: set when a call is sent, cleared when it settles.
//!   The signal is shared by all calls, so overlapping calls share one
//!   coarse state and the first completion clears it.
//! - [`AuthPrompt`]: the modal login interaction opened on a 401.

// ============================================================================
// Imports
// ============================================================================

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;

use crate::protocol::Credentials;

// ============================================================================
// BusyIndicator
// ============================================================================

/// Process-wide "busy" visual state (the progress cursor).
pub trait BusyIndicator: Send + Sync {
    /// Sets or clears the busy state.
    fn set_busy(&self, busy: bool);
}

/// [`BusyIndicator`] backed by an atomic flag.
#[derive(Debug, Default)]
pub struct BusyFlag {
    busy: AtomicBool,
}

impl BusyFlag {
    /// Creates a cleared flag.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            busy: AtomicBool::new(false),
        }
    }

    /// Returns the current state.
    #[inline]
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::SeqCst)
    }
}

impl BusyIndicator for BusyFlag {
    fn set_busy(&self, busy: bool) {
        self.busy.store(busy, Ordering::SeqCst);
    }
}

/// Scoped busy state: set on creation, cleared on drop.
///
/// Clears the indicator on every terminal path, including a dropped
/// (cancelled) call.
pub(crate) struct BusyGuard<'a> {
    indicator: &'a dyn BusyIndicator,
}

impl<'a> BusyGuard<'a> {
    pub(crate) fn set(indicator: &'a dyn BusyIndicator) -> Self {
        indicator.set_busy(true);
        Self { indicator }
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.indicator.set_busy(false);
    }
}

// ============================================================================
// AuthPrompt
// ============================================================================

/// What the login modal should display.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PromptRequest {
    /// Login name to pre-fill.
    pub login_hint: Option<String>,
    /// Error from the previous attempt.
    pub error: Option<String>,
}

/// Modal re-authentication interaction.
///
/// The pool calls [`credentials`](AuthPrompt::credentials) when a call
/// hits an expired session, and again with the server's message after a
/// rejected attempt. [`close`](AuthPrompt::close) is called once the login
/// succeeds.
#[async_trait]
pub trait AuthPrompt: Send + Sync {
    /// Shows the modal and waits for the user to submit.
    ///
    /// Returns `None` if the user dismissed the modal.
    async fn credentials(&self, request: PromptRequest) -> Option<Credentials>;

    /// Hides the modal.
    fn close(&self);
}

// ============================================================================
// Tests
// ============================================================================
