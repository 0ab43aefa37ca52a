//! Navigation by name and by URL.
//!
//! Every activation runs the same sequence:
//!
//! 1. The view becomes active and gets a fresh [`NavigationId`]
//! 2. `reset` clears data from the previous activation
//! 3. Route data is attached
//! 4. `load` runs
//! 5. On success, history is pushed if asked for and the canonical URL
//!    differs from the last pushed URL
//!
//! A load that completes after a newer navigation started is reported as
//! [`NavigationOutcome::Superseded`] and never touches history.

// ============================================================================
// Imports
// ============================================================================

use std::borrow::Cow;
use std::sync::Arc;

use tracing::{debug, warn};
use url::Url;

use crate::error::{Error, Result};
use crate::identifiers::NavigationId;

use super::ViewRouter;
use super::core::ViewEntry;
use super::view::{NavigationData, QueryData, RouteData, RouteParams, ViewContext, ViewPhase};

// ============================================================================
// Constants
// ============================================================================

/// Base used to resolve relative locations.
const LOCATION_BASE: &str = "http://localhost/";

// ============================================================================
// NavigationOutcome
// ============================================================================

/// Result of a navigation whose view loaded successfully.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationOutcome {
    /// The view loaded and is still the active one.
    Loaded {
        /// Whether a history entry was pushed.
        pushed_history: bool,
    },
    /// A newer navigation started before the load finished.
    Superseded,
}

impl NavigationOutcome {
    #[inline]
    #[must_use]
    pub fn is_loaded(self) -> bool {
        matches!(self, Self::Loaded { .. })
    }

    #[inline]
    #[must_use]
    pub fn pushed_history(self) -> bool {
        matches!(
            self,
            Self::Loaded {
                pushed_history: true
            }
        )
    }
}

// ============================================================================
// ViewRouter - Navigation
// ============================================================================

impl ViewRouter {
    /// Activates the view registered under `name` with `data` attached.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ViewNotFound`] if no view has that name, or the
    /// error returned by the view's `load`.
    pub async fn navigate_by_name(
        &self,
        name: &str,
        push_history: bool,
        data: NavigationData,
    ) -> Result<NavigationOutcome> {
        let Some(entry) = self.entry(name) else {
            warn!(view = %name, "Navigation to unknown view");
            return Err(Error::view_not_found(name));
        };

        self.activate(entry, RouteData::from_data(data), push_history)
            .await
    }

    /// Activates the first view, in registration order, whose pattern
    /// matches the path of `url`.
    ///
    /// `url` may be a full URL or a path with an optional query. An empty
    /// or root path is replaced by the default route.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidUrl`] if `url` cannot be parsed,
    /// [`Error::NoRouteMatch`] if no pattern matches, or the error
    /// returned by the view's `load`.
    pub async fn navigate_by_url(&self, url: &str, push_history: bool) -> Result<NavigationOutcome> {
        let (path, query) = split_location(url)?;
        let path = self.route_path(path);

        let Some((entry, params)) = self.match_path(&path) else {
            warn!(url = %url, path = %path, "No view matches location");
            return Err(Error::no_route_match(path));
        };

        self.activate(entry, RouteData::from_match(params, query), push_history)
            .await
    }

    /// Re-resolves the current history location without pushing history.
    ///
    /// # Errors
    ///
    /// Same as [`navigate_by_url`](Self::navigate_by_url).
    pub async fn refresh_current_view(&self) -> Result<NavigationOutcome> {
        let location = self.inner.history.location();
        debug!(location = %location, "Refreshing current view");
        self.navigate_by_url(&location, false).await
    }

    /// Name of the view `url` would activate, without activating it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidUrl`] if `url` cannot be parsed.
    pub fn match_url(&self, url: &str) -> Result<Option<String>> {
        let (path, _) = split_location(url)?;
        let path = self.route_path(path);
        Ok(self
            .match_path(&path)
            .map(|(entry, _)| entry.name().to_string()))
    }
}

// ============================================================================
// ViewRouter - Activation
// ============================================================================

impl ViewRouter {
    fn route_path(&self, path: String) -> String {
        if path.is_empty() || path == "/" {
            self.inner.options.default_route.clone()
        } else {
            path
        }
    }

    fn match_path(&self, path: &str) -> Option<(Arc<ViewEntry>, RouteParams)> {
        let state = self.inner.state.lock();
        state.views.iter().find_map(|entry| {
            entry
                .view
                .url_pattern()
                .captures(path)
                .map(|captures| (Arc::clone(entry), RouteParams::from_captures(&captures)))
        })
    }

    async fn activate(
        &self,
        entry: Arc<ViewEntry>,
        route: RouteData,
        push_history: bool,
    ) -> Result<NavigationOutcome> {
        let navigation = {
            let mut state = self.inner.state.lock();
            state.generation += 1;
            state.active = Some(Arc::clone(&entry));
            NavigationId::new(state.generation)
        };
        debug!(view = %entry.name(), navigation = %navigation, "Activating view");

        entry.reset(navigation);
        entry.attach(route.clone());
        entry.advance(navigation, ViewPhase::Loading);

        let ctx = ViewContext::new(route, self.clone(), navigation);
        match entry.view.load(ctx).await {
            Ok(()) => {
                entry.advance(navigation, ViewPhase::Ready);
                Ok(self.complete(&entry, navigation, push_history))
            }
            Err(e) => {
                entry.advance(navigation, ViewPhase::Failed);
                warn!(view = %entry.name(), navigation = %navigation, error = %e, "View failed to load");
                Err(e)
            }
        }
    }

    /// Pushes history for a finished load that is still current.
    fn complete(
        &self,
        entry: &ViewEntry,
        navigation: NavigationId,
        push_history: bool,
    ) -> NavigationOutcome {
        let url = push_history.then(|| entry.view.url(&entry.route()));

        let mut state = self.inner.state.lock();
        if state.generation != navigation.generation() {
            debug!(view = %entry.name(), navigation = %navigation, "Load superseded");
            return NavigationOutcome::Superseded;
        }

        let Some(url) = url else {
            return NavigationOutcome::Loaded {
                pushed_history: false,
            };
        };
        if state.current_url.as_deref() == Some(url.as_str()) {
            debug!(view = %entry.name(), url = %url, "Already at URL, history unchanged");
            return NavigationOutcome::Loaded {
                pushed_history: false,
            };
        }
        state.current_url = Some(url.clone());
        drop(state);

        self.inner.history.push_state(&url, entry.view.title());
        debug!(view = %entry.name(), url = %url, "History pushed");
        NavigationOutcome::Loaded {
            pushed_history: true,
        }
    }
}

// ============================================================================
// Location Parsing
// ============================================================================

/// Splits a location into its percent-decoded path and query.
fn split_location(url: &str) -> Result<(String, QueryData)> {
    let parsed = Url::parse(LOCATION_BASE)?.join(url)?;
    let raw = parsed.path();
    let path = urlencoding::decode(raw).map_or_else(|_| raw.to_string(), Cow::into_owned);
    let query = QueryData::from_pairs(parsed.query_pairs());
    Ok((path, query))
}

// ============================================================================
// Tests
// ============================================================================
