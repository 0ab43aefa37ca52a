//! Scripted transports and prompts for unit tests.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::Notify;

use crate::error::Result;
use crate::protocol::Credentials;

use super::connection::{
    Transport, TransportError, TransportFactory, TransportRequest, TransportResponse,
};
use super::hooks::{AuthPrompt, PromptRequest};

/// What a scripted transport does with a request.
pub(crate) enum Step {
    Respond(u16, Vec<u8>),
    Fail(&'static str),
    Hang,
}

type Handler = Arc<dyn Fn(&TransportRequest) -> Step + Send + Sync>;

/// Factory whose transports answer through a shared handler.
pub(crate) struct ScriptedFactory {
    handler: Handler,
    created: AtomicUsize,
    sent: Arc<Mutex<Vec<TransportRequest>>>,
}

impl ScriptedFactory {
    pub(crate) fn new(
        handler: impl Fn(&TransportRequest) -> Step + Send + Sync + 'static,
    ) -> Arc<Self> {
        Arc::new(Self {
            handler: Arc::new(handler),
            created: AtomicUsize::new(0),
            sent: Arc::new(Mutex::new(Vec::new())),
        })
    }

    /// Answers every request with an empty 200.
    pub(crate) fn ok() -> Arc<Self> {
        Self::new(|_| Step::Respond(200, Vec::new()))
    }

    pub(crate) fn created(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }

    pub(crate) fn sent(&self) -> Vec<TransportRequest> {
        self.sent.lock().clone()
    }

    pub(crate) fn sent_paths(&self) -> Vec<String> {
        self.sent.lock().iter().map(|r| r.path.clone()).collect()
    }
}

impl TransportFactory for ScriptedFactory {
    fn create(&self) -> Result<Box<dyn Transport>> {
        self.created.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(ScriptedTransport {
            handler: Arc::clone(&self.handler),
            sent: Arc::clone(&self.sent),
            status: None,
        }))
    }
}

struct ScriptedTransport {
    handler: Handler,
    sent: Arc<Mutex<Vec<TransportRequest>>>,
    status: Option<u16>,
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(
        &mut self,
        request: TransportRequest,
    ) -> std::result::Result<TransportResponse, TransportError> {
        self.sent.lock().push(request.clone());
        match (self.handler)(&request) {
            Step::Respond(status, body) => {
                self.status = Some(status);
                Ok(TransportResponse::new(status, body))
            }
            Step::Fail(message) => Err(TransportError::new(message)),
            Step::Hang => std::future::pending().await,
        }
    }

    fn status(&self) -> Option<u16> {
        self.status
    }
}

/// Login prompt that answers from a script and records what it was shown.
pub(crate) struct RecordingPrompt {
    answers: Mutex<VecDeque<Option<Credentials>>>,
    requests: Mutex<Vec<PromptRequest>>,
    closed: AtomicUsize,
    gate: Option<Arc<Notify>>,
}

impl RecordingPrompt {
    /// Answers with the given credentials in order, then dismisses.
    pub(crate) fn answering(answers: Vec<Option<Credentials>>) -> Arc<Self> {
        Arc::new(Self {
            answers: Mutex::new(answers.into()),
            requests: Mutex::new(Vec::new()),
            closed: AtomicUsize::new(0),
            gate: None,
        })
    }

    /// Holds the first answer until [`open_gate`](Self::open_gate).
    pub(crate) fn gated(answer: Option<Credentials>) -> Arc<Self> {
        Arc::new(Self {
            answers: Mutex::new(VecDeque::from([answer])),
            requests: Mutex::new(Vec::new()),
            closed: AtomicUsize::new(0),
            gate: Some(Arc::new(Notify::new())),
        })
    }

    pub(crate) fn open_gate(&self) {
        if let Some(gate) = &self.gate {
            gate.notify_one();
        }
    }

    pub(crate) fn requests(&self) -> Vec<PromptRequest> {
        self.requests.lock().clone()
    }

    pub(crate) fn closed(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AuthPrompt for RecordingPrompt {
    async fn credentials(&self, request: PromptRequest) -> Option<Credentials> {
        self.requests.lock().push(request);
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        self.answers.lock().pop_front().flatten()
    }

    fn close(&self) {
        self.closed.fetch_add(1, Ordering::SeqCst);
    }
}

/// Polls `condition` until it holds, failing the test after ~2s.
pub(crate) async fn wait_until(mut condition: impl FnMut() -> bool) {
    for _ in 0..1000 {
        if condition() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(2)).await;
    }
    panic!("condition not reached in time");
}
