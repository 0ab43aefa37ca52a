//! Type-safe identifiers for pool slots and navigations.
//!
//! Newtype wrappers prevent mixing incompatible IDs at compile time.
//!
//! | Type | Scope | Source |
//! |------|-------|--------|
//! | [`SlotId`] | Pooled transport slot | Process-wide counter |
//! | [`NavigationId`] | One router activation | Per-router generation |

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::num::NonZeroU32;
use std::sync::atomic::{AtomicU32, Ordering};

// ============================================================================
// SlotId
// ============================================================================

/// Next slot ID to hand out.
static NEXT_SLOT_ID: AtomicU32 = AtomicU32::new(1);

/// Opaque identity of one pooled transport slot.
///
/// Stable for the life of the slot; a slot keeps its ID across leases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SlotId(NonZeroU32);

impl SlotId {
    /// Allocates a fresh slot ID.
    #[must_use]
    pub fn next() -> Self {
        let raw = NEXT_SLOT_ID.fetch_add(1, Ordering::Relaxed);
        // The counter starts at 1; wrapping past u32::MAX slots is not a
        // realistic session.
        Self(NonZeroU32::new(raw).unwrap_or(NonZeroU32::MIN))
    }

    /// Creates a slot ID from a raw value, `None` for zero.
    #[inline]
    #[must_use]
    pub fn from_u32(raw: u32) -> Option<Self> {
        NonZeroU32::new(raw).map(Self)
    }

    /// Returns the raw value.
    #[inline]
    #[must_use]
    pub fn as_u32(self) -> u32 {
        self.0.get()
    }
}

impl fmt::Display for SlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "slot-{}", self.0)
    }
}

// ============================================================================
// NavigationId
// ============================================================================

/// Generation number of a router activation.
///
/// Every activation gets a strictly larger ID than the previous one on the
/// same router, so a load can tell whether it has been superseded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct NavigationId(u64);

impl NavigationId {
    /// Creates a navigation ID from a raw generation.
    #[inline]
    #[must_use]
    pub const fn new(generation: u64) -> Self {
        Self(generation)
    }

    /// Returns the raw generation.
    #[inline]
    #[must_use]
    pub const fn generation(self) -> u64 {
        self.0
    }
}

impl fmt::Display for NavigationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "nav-{}", self.0)
    }
}

// ============================================================================
// Tests
// ============================================================================
