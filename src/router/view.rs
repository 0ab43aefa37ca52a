//! The view contract and the data attached to a view on activation.
//!
//! A view is registered once and re-activated on every navigation that
//! resolves to it. Before each activation the router clears whatever the
//! previous navigation attached, then hands the view a fresh [`RouteData`]
//! through its [`ViewContext`].
//!
//! # Example
//!
//! ```ignore
//! use async_trait::async_trait;
//! use regex::Regex;
//! use dashboard_runtime::router::compile_pattern;
//! use dashboard_runtime::{Result, RouteData, View, ViewContext};
//!
//! struct ServiceView {
//!     pattern: Regex,
//! }
//!
//! impl ServiceView {
//!     fn new() -> Result<Self> {
//!         Ok(Self { pattern: compile_pattern(r"^/service/(\d+)$")? })
//!     }
//! }
//!
//! #[async_trait]
//! impl View for ServiceView {
//!     fn name(&self) -> &str { "service" }
//!     fn title(&self) -> &str { "Service" }
//!     fn url_pattern(&self) -> &Regex { &self.pattern }
//!
//!     fn url(&self, route: &RouteData) -> String {
//!         let id = route.params.get(1).or(route.data.get_str("service_id"));
//!         format!("/service/{}", id.unwrap_or_default())
//!     }
//!
//!     async fn load(&self, ctx: ViewContext) -> Result<()> {
//!         // fetch and render
//!         Ok(())
//!     }
//! }
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

use async_trait::async_trait;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::Result;
use crate::identifiers::NavigationId;

use super::ViewRouter;
use super::host::ViewportSize;

// ============================================================================
// View
// ============================================================================

/// A named, URL-addressable screen with a load life cycle.
///
/// Only [`load`](Self::load) and [`url`](Self::url) carry behavior every
/// view must provide; [`reset`](Self::reset) and
/// [`update_view_size`](Self::update_view_size) default to no-ops.
#[async_trait]
pub trait View: Send + Sync {
    /// Unique registry key. The empty string names the default view.
    fn name(&self) -> &str;

    /// Title pushed to history alongside the canonical URL.
    fn title(&self) -> &str;

    /// Pattern tested against the decoded path.
    fn url_pattern(&self) -> &Regex;

    /// Canonical URL for the given route data.
    fn url(&self, route: &RouteData) -> String;

    /// Fetches and renders the view.
    ///
    /// Returning `Ok` marks the view ready and lets the router push
    /// history. A load that finishes after a newer navigation started is
    /// ignored; check [`ViewContext::is_current`] before touching shared
    /// state from a late continuation.
    async fn load(&self, ctx: ViewContext) -> Result<()>;

    /// Clears view-local state left over from the previous activation.
    fn reset(&self) {}

    /// Called with the new viewport size while the view is active.
    fn update_view_size(&self, _size: ViewportSize) {}
}

/// Compiles a view URL pattern.
///
/// # Errors
///
/// Returns [`Error::InvalidPattern`](crate::Error::InvalidPattern) if
/// `pattern` is not a valid regex.
pub fn compile_pattern(pattern: &str) -> Result<Regex> {
    Ok(Regex::new(pattern)?)
}

// ============================================================================
// ViewPhase
// ============================================================================

/// Per-view activation state.
///
/// ```text
/// Constructed ──► Reset ──► Attached ──► Loading ──► Ready
///                   ▲                       │
///                   │                       └──────► Failed
///                   └──── next activation ──────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ViewPhase {
    /// Registered, never activated.
    Constructed,
    /// Route data cleared for a new activation.
    Reset,
    /// Route data attached, load not yet started.
    Attached,
    /// `load` in progress.
    Loading,
    /// `load` completed successfully.
    Ready,
    /// `load` returned an error.
    Failed,
}

impl fmt::Display for ViewPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Constructed => "constructed",
            Self::Reset => "reset",
            Self::Attached => "attached",
            Self::Loading => "loading",
            Self::Ready => "ready",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

// ============================================================================
// RouteParams
// ============================================================================

/// Capture groups from the last pattern match.
///
/// Index 0 is the whole match, as with [`Captures`]. Groups that did not
/// participate in the match are `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteParams(Vec<Option<String>>);

impl RouteParams {
    /// Copies all groups out of a match.
    #[must_use]
    pub fn from_captures(captures: &Captures<'_>) -> Self {
        Self(
            captures
                .iter()
                .map(|group| group.map(|m| m.as_str().to_string()))
                .collect(),
        )
    }

    /// Returns group `index`, if it matched.
    #[inline]
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&str> {
        self.0.get(index).and_then(Option::as_deref)
    }

    /// Number of groups, including group 0.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` when no pattern has been matched.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<String>> FromIterator<Option<S>> for RouteParams {
    fn from_iter<I: IntoIterator<Item = Option<S>>>(iter: I) -> Self {
        Self(iter.into_iter().map(|g| g.map(Into::into)).collect())
    }
}

// ============================================================================
// QueryData
// ============================================================================

/// Decoded query string, in source order.
///
/// Keys may repeat.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryData(Vec<(String, String)>);

impl QueryData {
    /// Builds query data from decoded pairs.
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// First value for `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Every value for `key`, in order.
    #[must_use]
    pub fn get_all(&self, key: &str) -> Vec<&str> {
        self.0
            .iter()
            .filter(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
            .collect()
    }

    /// Iterates over all pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Re-encodes the pairs as `k=v&k2=v2`, without a leading `?`.
    #[must_use]
    pub fn to_query_string(&self) -> String {
        self.0
            .iter()
            .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&")
    }
}

// ============================================================================
// NavigationData
// ============================================================================

/// Caller-supplied payload for name-based navigation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NavigationData(Map<String, Value>);

impl NavigationData {
    /// Creates an empty payload.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a value.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    #[inline]
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Returns the value for `key` if it is a string.
    #[must_use]
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Map<String, Value>> for NavigationData {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

// ============================================================================
// RouteData
// ============================================================================

/// Everything attached to a view for one activation.
///
/// URL navigation fills `params` and `query`; name navigation fills
/// `data`. The other fields stay empty.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RouteData {
    /// Capture groups of the matched pattern.
    pub params: RouteParams,
    /// Decoded query string.
    pub query: QueryData,
    /// Programmatic payload.
    pub data: NavigationData,
}

impl RouteData {
    /// Route data for a URL match.
    #[must_use]
    pub fn from_match(params: RouteParams, query: QueryData) -> Self {
        Self {
            params,
            query,
            data: NavigationData::default(),
        }
    }

    /// Route data for a name-based navigation.
    #[must_use]
    pub fn from_data(data: NavigationData) -> Self {
        Self {
            data,
            ..Self::default()
        }
    }
}

// ============================================================================
// ViewContext
// ============================================================================

/// Handle passed to [`View::load`].
#[derive(Debug, Clone)]
pub struct ViewContext {
    route: RouteData,
    router: ViewRouter,
    navigation: NavigationId,
}

impl ViewContext {
    pub(crate) fn new(route: RouteData, router: ViewRouter, navigation: NavigationId) -> Self {
        Self {
            route,
            router,
            navigation,
        }
    }

    /// Route data attached for this activation.
    #[inline]
    #[must_use]
    pub fn route(&self) -> &RouteData {
        &self.route
    }

    /// The router that activated the view.
    #[inline]
    #[must_use]
    pub fn router(&self) -> &ViewRouter {
        &self.router
    }

    #[inline]
    #[must_use]
    pub fn navigation_id(&self) -> NavigationId {
        self.navigation
    }

    /// Returns `false` once a newer navigation has started.
    #[inline]
    #[must_use]
    pub fn is_current(&self) -> bool {
        self.router.current_navigation() == self.navigation
    }
}

// ============================================================================
// Tests
// ============================================================================
