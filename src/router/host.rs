//! Host environment seams: history stack, viewport and host events.
//!
//! The router never talks to a browser directly. It pushes entries through
//! a [`History`] implementation and reacts to [`HostEvent`]s delivered over
//! a channel by whatever embeds it.
//!
//! ```text
//! host ──HostEvent──► mpsc ──► ViewRouter::listen ──┬─► active view (resize)
//!                                                   └─► navigate_by_url(location, false)
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::ViewRouter;

// ============================================================================
// ViewportSize
// ============================================================================

/// Size of the host viewport in CSS pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ViewportSize {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl ViewportSize {
    #[inline]
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl fmt::Display for ViewportSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

// ============================================================================
// HostEvent
// ============================================================================

/// Notification from the host environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostEvent {
    /// The viewport was resized.
    Resize(ViewportSize),
    /// The user moved through history (back/forward).
    PopState {
        /// Location after the move.
        location: String,
    },
}

// ============================================================================
// History
// ============================================================================

/// Browser history stack.
pub trait History: Send + Sync {
    /// Pushes a new entry and makes it the current location.
    fn push_state(&self, url: &str, title: &str);

    /// Current location (path and query).
    fn location(&self) -> String;
}

/// A single history entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    /// Entry URL.
    pub url: String,
    /// Entry title.
    pub title: String,
}

/// In-memory [`History`] with back/forward support.
///
/// Pushing while positioned before the end discards the forward entries,
/// as browsers do.
#[derive(Debug)]
pub struct MemoryHistory {
    state: Mutex<HistoryState>,
}

#[derive(Debug)]
struct HistoryState {
    entries: Vec<HistoryEntry>,
    index: usize,
}

impl MemoryHistory {
    /// Creates a history positioned at `initial`.
    ///
    /// The initial entry does not count as a push.
    #[must_use]
    pub fn new(initial: impl Into<String>) -> Self {
        Self {
            state: Mutex::new(HistoryState {
                entries: vec![HistoryEntry {
                    url: initial.into(),
                    title: String::new(),
                }],
                index: 0,
            }),
        }
    }

    /// Moves one entry back and returns the new location.
    ///
    /// Returns `None` at the start of history.
    pub fn back(&self) -> Option<String> {
        let mut state = self.state.lock();
        if state.index == 0 {
            return None;
        }
        state.index -= 1;
        Some(state.entries[state.index].url.clone())
    }

    /// Moves one entry forward and returns the new location.
    pub fn forward(&self) -> Option<String> {
        let mut state = self.state.lock();
        if state.index + 1 >= state.entries.len() {
            return None;
        }
        state.index += 1;
        Some(state.entries[state.index].url.clone())
    }

    /// All entries, oldest first.
    #[must_use]
    pub fn entries(&self) -> Vec<HistoryEntry> {
        self.state.lock().entries.clone()
    }

    /// Number of entries, including the initial one.
    #[must_use]
    pub fn len(&self) -> usize {
        self.state.lock().entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.state.lock().entries.is_empty()
    }
}

impl Default for MemoryHistory {
    fn default() -> Self {
        Self::new("/")
    }
}

impl History for MemoryHistory {
    fn push_state(&self, url: &str, title: &str) {
        let mut state = self.state.lock();
        let keep = state.index + 1;
        state.entries.truncate(keep);
        state.entries.push(HistoryEntry {
            url: url.to_string(),
            title: title.to_string(),
        });
        state.index = state.entries.len() - 1;
    }

    fn location(&self) -> String {
        let state = self.state.lock();
        state.entries[state.index].url.clone()
    }
}

// ============================================================================
// ViewRouter - Host Events
// ============================================================================

impl ViewRouter {
    /// Spawns the host event loop.
    ///
    /// Runs until every sender is dropped. Back/forward navigations are
    /// handled in their own task so a slow load does not delay resizes.
    pub fn listen(&self, mut events: mpsc::UnboundedReceiver<HostEvent>) -> JoinHandle<()> {
        let router = self.clone();
        tokio::spawn(async move {
            debug!("Host event loop started");
            while let Some(event) = events.recv().await {
                router.handle_host_event(event);
            }
            debug!("Host event loop terminated");
        })
    }

    /// Applies one host event.
    ///
    /// Must be called within a tokio runtime.
    pub fn handle_host_event(&self, event: HostEvent) {
        match event {
            HostEvent::Resize(size) => self.resize(size),
            HostEvent::PopState { location } => {
                let router = self.clone();
                tokio::spawn(async move {
                    if let Err(e) = router.navigate_by_url(&location, false).await {
                        warn!(location = %location, error = %e, "History navigation failed");
                    }
                });
            }
        }
    }

    /// Records the viewport size and forwards it to the active view.
    pub fn resize(&self, size: ViewportSize) {
        *self.inner.viewport.lock() = size;
        if let Some(view) = self.active_view() {
            debug!(view = %view.name(), size = %size, "Forwarding resize");
            view.update_view_size(size);
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
