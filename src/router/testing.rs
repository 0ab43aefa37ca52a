//! Recording views for unit tests.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use regex::Regex;
use tokio::sync::Notify;

use crate::error::{Error, Result};

use super::host::ViewportSize;
use super::view::{RouteData, View, ViewContext, compile_pattern};

/// What a [`StubView`] observed, in order.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum ViewEvent {
    Reset,
    Load(RouteData),
    Resize(ViewportSize),
}

/// View that records every call made on it.
pub(crate) struct StubView {
    name: String,
    title: String,
    pattern: Regex,
    events: Mutex<Vec<ViewEvent>>,
    context: Mutex<Option<ViewContext>>,
    fail: AtomicBool,
    gate: Option<Notify>,
}

impl StubView {
    pub(crate) fn new(name: &str, pattern: &str) -> Arc<Self> {
        Arc::new(Self::build(name, pattern, None))
    }

    /// Every load waits for [`open_gate`](Self::open_gate).
    pub(crate) fn gated(name: &str, pattern: &str) -> Arc<Self> {
        Arc::new(Self::build(name, pattern, Some(Notify::new())))
    }

    fn build(name: &str, pattern: &str, gate: Option<Notify>) -> Self {
        Self {
            name: name.to_string(),
            title: format!("{name} title"),
            pattern: compile_pattern(pattern).expect("test pattern"),
            events: Mutex::new(Vec::new()),
            context: Mutex::new(None),
            fail: AtomicBool::new(false),
            gate,
        }
    }

    pub(crate) fn open_gate(&self) {
        if let Some(gate) = &self.gate {
            gate.notify_one();
        }
    }

    /// Makes subsequent loads fail.
    pub(crate) fn fail_loads(&self) {
        self.fail.store(true, Ordering::SeqCst);
    }

    pub(crate) fn events(&self) -> Vec<ViewEvent> {
        self.events.lock().clone()
    }

    /// Context handed to the most recent load.
    pub(crate) fn last_context(&self) -> Option<ViewContext> {
        self.context.lock().clone()
    }

    pub(crate) fn loads(&self) -> Vec<RouteData> {
        self.events
            .lock()
            .iter()
            .filter_map(|event| match event {
                ViewEvent::Load(route) => Some(route.clone()),
                _ => None,
            })
            .collect()
    }
}

#[async_trait]
impl View for StubView {
    fn name(&self) -> &str {
        &self.name
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn url_pattern(&self) -> &Regex {
        &self.pattern
    }

    /// The matched path, or `/<name>` for name-based navigation.
    fn url(&self, route: &RouteData) -> String {
        match route.params.get(0) {
            Some(path) if !path.is_empty() => path.to_string(),
            _ => format!("/{}", self.name),
        }
    }

    async fn load(&self, ctx: ViewContext) -> Result<()> {
        self.events.lock().push(ViewEvent::Load(ctx.route().clone()));
        *self.context.lock() = Some(ctx);
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        if self.fail.load(Ordering::SeqCst) {
            return Err(Error::application(format!("{} failed to load", self.name)));
        }
        Ok(())
    }

    fn reset(&self) {
        self.events.lock().push(ViewEvent::Reset);
    }

    fn update_view_size(&self, size: ViewportSize) {
        self.events.lock().push(ViewEvent::Resize(size));
    }
}
