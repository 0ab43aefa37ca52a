//! Router handle, view registry and accessors.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::identifiers::NavigationId;
use crate::protocol::UserInfo;

use super::host::{History, ViewportSize};
use super::view::{RouteData, View, ViewPhase};

// ============================================================================
// Constants
// ============================================================================

/// Default id of the element views render into.
pub const DEFAULT_CONTAINER: &str = "view-container";

/// Default route substituted for an empty or root path.
pub const DEFAULT_ROUTE: &str = "";

// ============================================================================
// RouterOptions
// ============================================================================

/// View router configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouterOptions {
    /// Id of the element views render into.
    pub container: String,

    /// Path matched in place of `""` or `"/"`.
    pub default_route: String,
}

impl Default for RouterOptions {
    fn default() -> Self {
        Self {
            container: DEFAULT_CONTAINER.to_string(),
            default_route: DEFAULT_ROUTE.to_string(),
        }
    }
}

// ============================================================================
// ViewEntry
// ============================================================================

/// A registered view plus its per-activation state.
pub(crate) struct ViewEntry {
    pub view: Arc<dyn View>,
    activation: Mutex<Activation>,
}

/// State of the latest activation of one view.
struct Activation {
    navigation: NavigationId,
    route: RouteData,
    phase: ViewPhase,
}

impl ViewEntry {
    fn new(view: Arc<dyn View>) -> Self {
        Self {
            view,
            activation: Mutex::new(Activation {
                navigation: NavigationId::default(),
                route: RouteData::default(),
                phase: ViewPhase::Constructed,
            }),
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        self.view.name()
    }

    /// Starts a new activation: clears attached data, then lets the view
    /// drop its own state.
    pub fn reset(&self, navigation: NavigationId) {
        {
            let mut activation = self.activation.lock();
            activation.navigation = navigation;
            activation.route = RouteData::default();
            activation.phase = ViewPhase::Reset;
        }
        self.view.reset();
    }

    pub fn attach(&self, route: RouteData) {
        let mut activation = self.activation.lock();
        activation.route = route;
        activation.phase = ViewPhase::Attached;
    }

    /// Moves to `phase` unless a later activation of this view started.
    pub fn advance(&self, navigation: NavigationId, phase: ViewPhase) {
        let mut activation = self.activation.lock();
        if activation.navigation == navigation {
            activation.phase = phase;
        }
    }

    pub fn route(&self) -> RouteData {
        self.activation.lock().route.clone()
    }

    pub fn phase(&self) -> ViewPhase {
        self.activation.lock().phase
    }
}

// ============================================================================
// RouterInner
// ============================================================================

/// Internal shared state for the router.
pub(crate) struct RouterInner {
    pub options: RouterOptions,
    pub history: Arc<dyn History>,
    pub viewport: Mutex<ViewportSize>,
    pub state: Mutex<RouterState>,
}

pub(crate) struct RouterState {
    /// Registration order is match priority.
    pub views: Vec<Arc<ViewEntry>>,
    /// Name to position in `views`.
    pub index: FxHashMap<String, usize>,
    pub active: Option<Arc<ViewEntry>>,
    /// Last URL pushed to history.
    pub current_url: Option<String>,
    pub viewer: Option<UserInfo>,
    pub generation: u64,
}

// ============================================================================
// ViewRouter
// ============================================================================

/// Resolves navigation intents to views and keeps history in sync.
///
/// Cheap to clone; all clones share state.
#[derive(Clone)]
pub struct ViewRouter {
    pub(crate) inner: Arc<RouterInner>,
}

impl fmt::Debug for ViewRouter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.state.lock();
        f.debug_struct("ViewRouter")
            .field("views", &state.views.len())
            .field("active", &state.active.as_ref().map(|e| e.name().to_string()))
            .field("current_url", &state.current_url)
            .finish_non_exhaustive()
    }
}

impl ViewRouter {
    /// Creates a router with no registered views.
    #[must_use]
    pub fn new(options: RouterOptions, history: Arc<dyn History>) -> Self {
        Self {
            inner: Arc::new(RouterInner {
                options,
                history,
                viewport: Mutex::new(ViewportSize::default()),
                state: Mutex::new(RouterState {
                    views: Vec::new(),
                    index: FxHashMap::default(),
                    active: None,
                    current_url: None,
                    viewer: None,
                    generation: 0,
                }),
            }),
        }
    }
}

// ============================================================================
// ViewRouter - Registration
// ============================================================================

impl ViewRouter {
    /// Registers a view.
    ///
    /// A later registration under an existing name replaces the earlier
    /// one and keeps its match priority.
    pub fn register_view(&self, view: Arc<dyn View>) {
        let name = view.name().to_string();
        let entry = Arc::new(ViewEntry::new(view));
        let mut state = self.inner.state.lock();

        if let Some(&position) = state.index.get(&name) {
            warn!(view = %name, "View registered twice, replacing previous registration");
            state.views[position] = entry;
            return;
        }

        let position = state.views.len();
        state.views.push(entry);
        state.index.insert(name.clone(), position);
        debug!(view = %name, position, "View registered");
    }

    /// Registers a view, rejecting duplicate names.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateView`] if the name is taken.
    pub fn try_register_view(&self, view: Arc<dyn View>) -> Result<()> {
        if self.inner.state.lock().index.contains_key(view.name()) {
            return Err(Error::duplicate_view(view.name()));
        }
        self.register_view(view);
        Ok(())
    }

    /// Looks up a registered view by exact name.
    #[must_use]
    pub fn view(&self, name: &str) -> Option<Arc<dyn View>> {
        self.entry(name).map(|entry| Arc::clone(&entry.view))
    }

    /// Registered view names in match order.
    #[must_use]
    pub fn view_names(&self) -> Vec<String> {
        self.inner
            .state
            .lock()
            .views
            .iter()
            .map(|e| e.name().to_string())
            .collect()
    }

    pub(crate) fn entry(&self, name: &str) -> Option<Arc<ViewEntry>> {
        let state = self.inner.state.lock();
        state
            .index
            .get(name)
            .map(|&position| Arc::clone(&state.views[position]))
    }
}

// ============================================================================
// ViewRouter - Accessors
// ============================================================================

impl ViewRouter {
    /// Id of the element views render into.
    #[inline]
    #[must_use]
    pub fn container(&self) -> &str {
        &self.inner.options.container
    }

    #[inline]
    #[must_use]
    pub fn options(&self) -> &RouterOptions {
        &self.inner.options
    }

    /// Last size reported by the host.
    #[must_use]
    pub fn viewport_size(&self) -> ViewportSize {
        *self.inner.viewport.lock()
    }

    /// The history stack the router pushes to.
    #[inline]
    #[must_use]
    pub fn history(&self) -> &Arc<dyn History> {
        &self.inner.history
    }

    /// The active view, if any navigation has happened.
    #[must_use]
    pub fn active_view(&self) -> Option<Arc<dyn View>> {
        self.inner
            .state
            .lock()
            .active
            .as_ref()
            .map(|entry| Arc::clone(&entry.view))
    }

    /// Name of the active view.
    #[must_use]
    pub fn active_view_name(&self) -> Option<String> {
        self.inner
            .state
            .lock()
            .active
            .as_ref()
            .map(|entry| entry.name().to_string())
    }

    /// Last URL pushed to history by this router.
    #[must_use]
    pub fn current_url(&self) -> Option<String> {
        self.inner.state.lock().current_url.clone()
    }

    /// Activation phase of a registered view.
    #[must_use]
    pub fn phase(&self, name: &str) -> Option<ViewPhase> {
        self.entry(name).map(|entry| entry.phase())
    }

    /// Route data currently attached to a registered view.
    #[must_use]
    pub fn route_data(&self, name: &str) -> Option<RouteData> {
        self.entry(name).map(|entry| entry.route())
    }

    /// ID of the most recent activation.
    #[must_use]
    pub fn current_navigation(&self) -> NavigationId {
        NavigationId::new(self.inner.state.lock().generation)
    }

    /// Sets the authenticated user.
    pub fn set_viewer(&self, viewer: UserInfo) {
        debug!(login = %viewer.login_name, "Viewer set");
        self.inner.state.lock().viewer = Some(viewer);
    }

    /// The authenticated user, once the session handshake is done.
    #[must_use]
    pub fn viewer(&self) -> Option<UserInfo> {
        self.inner.state.lock().viewer.clone()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::router::host::MemoryHistory;
    use crate::router::testing::StubView;

    fn router() -> ViewRouter {
        ViewRouter::new(RouterOptions::default(), Arc::new(MemoryHistory::default()))
    }

    #[test]
    fn test_options_defaults() {
        let options = RouterOptions::default();
        assert_eq!(options.container, "view-container");
        assert_eq!(options.default_route, "");
    }

    #[test]
    fn test_register_keeps_order() {
        let router = router();
        router.register_view(StubView::new("", r"^$"));
        router.register_view(StubView::new("logs", r"^/logs$"));
        router.register_view(StubView::new("users", r"^/users$"));

        assert_eq!(router.view_names(), vec!["", "logs", "users"]);
        assert_eq!(router.phase("logs"), Some(ViewPhase::Constructed));
        assert!(router.active_view().is_none());
    }

    #[test]
    fn test_register_duplicate_replaces_in_place() {
        let router = router();
        router.register_view(StubView::new("logs", r"^/logs$"));
        router.register_view(StubView::new("users", r"^/users$"));
        let replacement = StubView::new("logs", r"^/audit$");
        router.register_view(replacement.clone());

        assert_eq!(router.view_names(), vec!["logs", "users"]);
        let view = router.view("logs").expect("registered");
        assert_eq!(view.url_pattern().as_str(), r"^/audit$");
    }

    #[test]
    fn test_try_register_rejects_duplicate() {
        let router = router();
        router
            .try_register_view(StubView::new("logs", r"^/logs$"))
            .expect("first registration");
        let err = router
            .try_register_view(StubView::new("logs", r"^/other$"))
            .unwrap_err();
        assert!(matches!(err, Error::DuplicateView { ref name } if name == "logs"));
        assert_eq!(router.view_names(), vec!["logs"]);
    }

    #[test]
    fn test_viewer() {
        let router = router();
        assert!(router.viewer().is_none());
        router.set_viewer(UserInfo {
            login_name: "admin".into(),
            display_name: "Admin".into(),
            is_admin: true,
            disabled: false,
        });
        assert_eq!(router.viewer().map(|u| u.login_name).as_deref(), Some("admin"));
    }

    #[test]
    fn test_unknown_view_has_no_phase() {
        assert_eq!(router().phase("missing"), None);
        assert!(router().route_data("missing").is_none());
    }
}
