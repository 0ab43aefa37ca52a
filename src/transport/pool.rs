//! Bounded pool of reusable transports.
//!
//! Every outbound dashboard call goes through one [`RequestPool`]. The pool
//! lends transports as [`Lease`]s, enforces the per-lease timeout, drives
//! the busy indicator and intercepts expired sessions.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │                RequestPool                   │
//! │  free:    [slot-1] [slot-2]                  │
//! │  leased:  slot-3 → Lease (caller)            │
//! │  waiters: acquire#1 → acquire#2   (FIFO)     │
//! └──────────────────────────────────────────────┘
//!          │ send()                 ▲ release / drop / reclaim
//!          ▼                        │
//!   Transport ── 2xx ─► caller      │
//!             ── 401 ─► reclaim ──► login modal (no replay)
//!             ── err ─► reclaim
//!             ── timeout ─► reclaim
//! ```
//!
//! # Guarantees
//!
//! - At most `max_slots` slots ever exist and each is leased to one caller.
//! - Queued acquires are served in FIFO order and never dropped.
//! - Every lease is returned exactly once: by [`RequestPool::release`], by
//!   dropping it, or by the pool when the call fails.

// ============================================================================
// Imports
// ============================================================================

use std::collections::VecDeque;
use std::fmt;
use std::mem;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::{Mutex, RwLock};
use tokio::sync::oneshot;
use tokio::time::timeout;
use tracing::{debug, info, trace, warn};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::identifiers::SlotId;
use crate::protocol::{Credentials, LoginRequest, LoginResponse, Message};

use super::connection::{Transport, TransportFactory, TransportRequest, TransportResponse};
use super::hooks::{AuthPrompt, BusyFlag, BusyGuard, BusyIndicator, PromptRequest};
use super::options::PoolOptions;

// ============================================================================
// PoolHooks
// ============================================================================

/// Hooks attached to every lease.
#[derive(Clone)]
pub struct PoolHooks {
    /// Busy indicator set while a call is in flight.
    pub busy: Arc<dyn BusyIndicator>,

    /// Login modal opened on an expired session.
    pub auth: Option<Arc<dyn AuthPrompt>>,
}

impl Default for PoolHooks {
    fn default() -> Self {
        Self {
            busy: Arc::new(BusyFlag::new()),
            auth: None,
        }
    }
}

impl PoolHooks {
    /// Sets the busy indicator.
    #[inline]
    #[must_use]
    pub fn with_busy(mut self, busy: Arc<dyn BusyIndicator>) -> Self {
        self.busy = busy;
        self
    }

    /// Sets the login prompt.
    #[inline]
    #[must_use]
    pub fn with_auth(mut self, auth: Arc<dyn AuthPrompt>) -> Self {
        self.auth = Some(auth);
        self
    }
}

impl fmt::Debug for PoolHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PoolHooks")
            .field("auth", &self.auth.is_some())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// PoolStats
// ============================================================================

/// Snapshot of the pool's slot accounting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolStats {
    /// Slots in existence.
    pub total: usize,
    /// Slots ready to lease.
    pub free: usize,
    /// Slots currently leased (including hand-offs to queued acquires).
    pub leased: usize,
    /// Acquires waiting for a slot.
    pub queued: usize,
}

// ============================================================================
// Slot
// ============================================================================

/// One pooled transport.
pub(crate) struct Slot {
    id: SlotId,
    transport: Box<dyn Transport>,
}

impl Slot {
    fn create(factory: &dyn TransportFactory) -> Result<Self> {
        let slot = Self {
            id: SlotId::next(),
            transport: factory.create()?,
        };
        debug!(slot = %slot.id, "Slot created");
        Ok(slot)
    }
}

// ============================================================================
// PoolInner
// ============================================================================

/// Slot bookkeeping guarded by the pool lock.
#[derive(Default)]
struct PoolState {
    free: VecDeque<Slot>,
    total: usize,
    leased: usize,
    waiters: VecDeque<oneshot::Sender<Slot>>,
}

/// Shared state behind every [`RequestPool`] handle and [`Lease`].
pub(crate) struct PoolInner {
    options: PoolOptions,
    factory: Arc<dyn TransportFactory>,
    hooks: PoolHooks,
    state: Mutex<PoolState>,
    login_hint: RwLock<Option<String>>,
    reauth_open: AtomicBool,
    closed: AtomicBool,
}

impl PoolInner {
    /// Returns a slot to the pool, handing it to the oldest live waiter.
    fn check_in(&self, slot: Slot) {
        let mut state = self.state.lock();

        if self.closed.load(Ordering::SeqCst) {
            state.leased = state.leased.saturating_sub(1);
            state.total = state.total.saturating_sub(1);
            debug!(slot = %slot.id, "Slot dropped, pool closed");
            return;
        }

        let mut slot = slot;
        while let Some(waiter) = state.waiters.pop_front() {
            let id = slot.id;
            match waiter.send(slot) {
                Ok(()) => {
                    trace!(slot = %id, "Slot handed to queued acquire");
                    return;
                }
                // Waiter gave up; try the next one.
                Err(returned) => slot = returned,
            }
        }

        state.leased = state.leased.saturating_sub(1);
        trace!(slot = %slot.id, free = state.free.len() + 1, "Slot returned");
        state.free.push_back(slot);
    }

    /// Opens the login modal unless one is already open.
    fn on_session_expired(self: &Arc<Self>) {
        let Some(prompt) = self.hooks.auth.clone() else {
            warn!("Session expired and no login prompt is installed");
            return;
        };

        if self.reauth_open.swap(true, Ordering::SeqCst) {
            debug!("Login modal already open");
            return;
        }

        let pool = RequestPool {
            inner: Arc::clone(self),
        };
        tokio::spawn(async move {
            pool.reauthenticate(prompt).await;
        });
    }
}

// ============================================================================
// RequestPool
// ============================================================================

/// Bounded, reusable transport pool with session recovery.
///
/// Cheap to clone; all clones share the same slots.
///
/// # Example
///
/// ```ignore
/// let pool = RequestPool::new(PoolOptions::default(), factory)?;
///
/// let mut lease = pool.acquire().await?;
/// let response = lease.send("/_/get-logs", body).await?;
/// pool.release(lease);
/// ```
#[derive(Clone)]
pub struct RequestPool {
    pub(crate) inner: Arc<PoolInner>,
}

impl fmt::Debug for RequestPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestPool")
            .field("options", &self.inner.options)
            .field("stats", &self.stats())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// RequestPool - Constructor
// ============================================================================

impl RequestPool {
    /// Creates a pool with default hooks (a [`BusyFlag`], no login prompt).
    ///
    /// # Errors
    ///
    /// - [`Error::Config`] if the options are invalid
    /// - Any error from the factory while creating the minimum slots
    pub fn new(options: PoolOptions, factory: Arc<dyn TransportFactory>) -> Result<Self> {
        Self::with_hooks(options, factory, PoolHooks::default())
    }

    /// Creates a pool with the given hooks.
    ///
    /// Creates `min_slots` transports up front.
    ///
    /// # Errors
    ///
    /// - [`Error::Config`] if the options are invalid
    /// - Any error from the factory while creating the minimum slots
    pub fn with_hooks(
        options: PoolOptions,
        factory: Arc<dyn TransportFactory>,
        hooks: PoolHooks,
    ) -> Result<Self> {
        options.validate()?;

        let mut free = VecDeque::with_capacity(options.max_slots);
        for _ in 0..options.min_slots {
            free.push_back(Slot::create(factory.as_ref())?);
        }

        info!(
            min = options.min_slots,
            max = options.max_slots,
            timeout_ms = options.timeout_ms,
            "RequestPool started"
        );

        let state = PoolState {
            total: free.len(),
            free,
            ..PoolState::default()
        };

        Ok(Self {
            inner: Arc::new(PoolInner {
                options,
                factory,
                hooks,
                state: Mutex::new(state),
                login_hint: RwLock::new(None),
                reauth_open: AtomicBool::new(false),
                closed: AtomicBool::new(false),
            }),
        })
    }
}

// ============================================================================
// RequestPool - Leasing
// ============================================================================

impl RequestPool {
    /// Leases a transport, waiting in FIFO order if all slots are leased.
    ///
    /// # Errors
    ///
    /// - [`Error::PoolClosed`] if the pool is or gets closed
    /// - Any error from the factory while creating a new slot
    pub async fn acquire(&self) -> Result<Lease> {
        let rx = {
            let mut state = self.inner.state.lock();
            if let Some(slot) = self.take_slot(&mut state)? {
                return Ok(Lease::new(slot, Arc::clone(&self.inner)));
            }

            let (tx, rx) = oneshot::channel();
            state.waiters.push_back(tx);
            debug!(queued = state.waiters.len(), "All slots leased, acquire queued");
            rx
        };

        let waiter = Waiter {
            rx: Some(rx),
            pool: Arc::clone(&self.inner),
        };
        let slot = waiter.wait().await?;
        Ok(Lease::new(slot, Arc::clone(&self.inner)))
    }

    /// Leases a transport if one is available without waiting.
    ///
    /// Returns `Ok(None)` when all `max_slots` slots are leased.
    ///
    /// # Errors
    ///
    /// - [`Error::PoolClosed`] if the pool is closed
    /// - Any error from the factory while creating a new slot
    pub fn try_acquire(&self) -> Result<Option<Lease>> {
        let mut state = self.inner.state.lock();
        Ok(self
            .take_slot(&mut state)?
            .map(|slot| Lease::new(slot, Arc::clone(&self.inner))))
    }

    /// Returns a lease to the pool.
    ///
    /// Releasing a lease the pool already reclaimed is a no-op.
    #[inline]
    pub fn release(&self, lease: Lease) {
        lease.release();
    }

    /// Takes a free slot or creates one below the maximum.
    fn take_slot(&self, state: &mut PoolState) -> Result<Option<Slot>> {
        if self.inner.closed.load(Ordering::SeqCst) {
            return Err(Error::PoolClosed);
        }

        if let Some(slot) = state.free.pop_front() {
            state.leased += 1;
            return Ok(Some(slot));
        }

        if state.total < self.inner.options.max_slots {
            let slot = Slot::create(self.inner.factory.as_ref())?;
            state.total += 1;
            state.leased += 1;
            return Ok(Some(slot));
        }

        Ok(None)
    }
}

// ============================================================================
// RequestPool - Calls
// ============================================================================

impl RequestPool {
    /// Encodes `request`, posts it to `path` and decodes the response.
    ///
    /// Acquires and releases a lease around the call.
    ///
    /// # Errors
    ///
    /// - [`Error::Codec`] if encoding or decoding fails
    /// - [`Error::RequestTimeout`], [`Error::Status`], [`Error::Transport`],
    ///   [`Error::SessionExpired`] if the call was abandoned
    /// - [`Error::PoolClosed`] if the pool is closed
    pub async fn call<Req, Resp>(&self, path: &str, request: &Req) -> Result<Resp>
    where
        Req: Message + Sync,
        Resp: Message,
    {
        let body = request.encode()?;
        let mut lease = self.acquire().await?;
        let response = lease.send(path, body).await?;
        self.release(lease);
        Resp::decode(&response.body)
    }

    /// Logs in with the given credentials.
    ///
    /// On success the login modal is closed if the pool opened one. The call
    /// that triggered the modal is not replayed.
    ///
    /// # Errors
    ///
    /// - [`Error::LoginRejected`] if the server rejected the credentials
    /// - Any error from [`call`](Self::call)
    pub async fn login(&self, credentials: &Credentials) -> Result<()> {
        let request = LoginRequest::from(credentials);
        let response: LoginResponse = self
            .call(&self.inner.options.login_path, &request)
            .await?;

        if !response.error_msg.is_empty() {
            debug!(login_name = %credentials.login_name, "Login rejected");
            return Err(Error::login_rejected(response.error_msg));
        }

        info!(login_name = %credentials.login_name, "Login succeeded");
        if self.inner.reauth_open.load(Ordering::SeqCst) {
            if let Some(prompt) = &self.inner.hooks.auth {
                prompt.close();
            }
        }
        Ok(())
    }

    /// Runs the login modal until it is dismissed or a login succeeds.
    async fn reauthenticate(&self, prompt: Arc<dyn AuthPrompt>) {
        info!("Opening login modal");

        let mut request = PromptRequest {
            login_hint: self.login_hint(),
            error: None,
        };

        loop {
            let Some(credentials) = prompt.credentials(request.clone()).await else {
                info!("Login modal dismissed");
                break;
            };

            match self.login(&credentials).await {
                Ok(()) => break,
                Err(Error::LoginRejected { message }) => request.error = Some(message),
                Err(e) => {
                    warn!(error = %e, "Login call failed");
                    request.error = Some(e.to_string());
                }
            }
        }

        self.inner.reauth_open.store(false, Ordering::SeqCst);
    }
}

// ============================================================================
// RequestPool - Accessors & Lifecycle
// ============================================================================

impl RequestPool {
    /// Returns the pool options.
    #[inline]
    #[must_use]
    pub fn options(&self) -> &PoolOptions {
        &self.inner.options
    }

    /// Returns a snapshot of the slot accounting.
    #[must_use]
    pub fn stats(&self) -> PoolStats {
        let state = self.inner.state.lock();
        PoolStats {
            total: state.total,
            free: state.free.len(),
            leased: state.leased,
            queued: state.waiters.iter().filter(|w| !w.is_closed()).count(),
        }
    }

    /// Sets the login name pre-filled in the login modal.
    pub fn set_login_hint(&self, login_name: Option<String>) {
        *self.inner.login_hint.write() = login_name;
    }

    /// Returns the login name pre-filled in the login modal.
    #[must_use]
    pub fn login_hint(&self) -> Option<String> {
        self.inner.login_hint.read().clone()
    }

    /// Returns `true` while the login modal is open.
    #[inline]
    #[must_use]
    pub fn is_reauthenticating(&self) -> bool {
        self.inner.reauth_open.load(Ordering::SeqCst)
    }

    /// Returns `true` once the pool has been closed.
    #[inline]
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::SeqCst)
    }

    /// Closes the pool.
    ///
    /// Free slots are dropped, queued acquires fail with
    /// [`Error::PoolClosed`], and leased slots are dropped when returned.
    pub fn close(&self) {
        if self.inner.closed.swap(true, Ordering::SeqCst) {
            return;
        }

        let (free, waiters) = {
            let mut state = self.inner.state.lock();
            let free = mem::take(&mut state.free);
            state.total = state.total.saturating_sub(free.len());
            (free, mem::take(&mut state.waiters))
        };

        info!(
            dropped = free.len(),
            waiters = waiters.len(),
            "RequestPool closed"
        );

        // Dropping the senders fails the queued acquires.
        drop(waiters);
        drop(free);
    }
}

// ============================================================================
// Waiter
// ============================================================================

/// A queued acquire.
///
/// If the acquire is cancelled after a slot was handed to it, the slot goes
/// back to the pool instead of being lost with the channel. Otherwise the
/// closed sender is pruned from the queue.
struct Waiter {
    rx: Option<oneshot::Receiver<Slot>>,
    pool: Arc<PoolInner>,
}

impl Waiter {
    async fn wait(mut self) -> Result<Slot> {
        let Some(rx) = self.rx.as_mut() else {
            return Err(Error::PoolClosed);
        };
        let result = rx.await;
        self.rx = None;
        result.map_err(|_| Error::PoolClosed)
    }
}

impl Drop for Waiter {
    fn drop(&mut self) {
        if let Some(mut rx) = self.rx.take() {
            rx.close();
            if let Ok(slot) = rx.try_recv() {
                debug!(slot = %slot.id, "Acquire cancelled after hand-off, returning slot");
                self.pool.check_in(slot);
                return;
            }

            let mut state = self.pool.state.lock();
            state.waiters.retain(|tx| !tx.is_closed());
            trace!(queued = state.waiters.len(), "Cancelled acquire left the queue");
        }
    }
}

// ============================================================================
// Lease
// ============================================================================

/// Exclusive, time-bounded ownership of one pooled transport.
///
/// Returned to the pool by [`RequestPool::release`], [`Lease::release`], or
/// on drop. If a call times out, fails, or hits an expired session, the pool
/// reclaims the slot immediately and the lease becomes inert.
pub struct Lease {
    id: Uuid,
    slot: Option<Slot>,
    pool: Arc<PoolInner>,
}

impl fmt::Debug for Lease {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Lease")
            .field("id", &self.id)
            .field("slot", &self.slot_id())
            .finish_non_exhaustive()
    }
}

impl Lease {
    fn new(slot: Slot, pool: Arc<PoolInner>) -> Self {
        let id = Uuid::new_v4();
        trace!(lease = %id, slot = %slot.id, "Slot leased");
        Self {
            id,
            slot: Some(slot),
            pool,
        }
    }

    /// Returns the lease correlation ID.
    #[inline]
    #[must_use]
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Returns the leased slot, `None` once reclaimed.
    #[inline]
    #[must_use]
    pub fn slot_id(&self) -> Option<SlotId> {
        self.slot.as_ref().map(|slot| slot.id)
    }

    /// Returns `true` if the pool reclaimed this lease.
    #[inline]
    #[must_use]
    pub fn is_reclaimed(&self) -> bool {
        self.slot.is_none()
    }

    /// Returns the status of the last settled call on this transport.
    #[inline]
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        self.slot.as_ref().and_then(|slot| slot.transport.status())
    }

    /// Posts `body` to `path` with the pool headers and timeout.
    ///
    /// The busy indicator is set for the duration of the call.
    ///
    /// # Errors
    ///
    /// - [`Error::LeaseReclaimed`] if the lease was already reclaimed
    /// - [`Error::RequestTimeout`] if the call did not settle in time
    /// - [`Error::SessionExpired`] on a 401 (the login modal opens)
    /// - [`Error::Status`] on any other non-2xx status
    /// - [`Error::Transport`] on a transport-level failure
    ///
    /// All errors except the first reclaim the slot.
    pub async fn send(&mut self, path: &str, body: Vec<u8>) -> Result<TransportResponse> {
        let pool = Arc::clone(&self.pool);
        let lease_id = self.id;
        let slot = self
            .slot
            .as_mut()
            .ok_or(Error::LeaseReclaimed { lease_id })?;

        let request_timeout = pool.options.timeout();
        let request = TransportRequest::post(path, body).with_headers(pool.options.headers.clone());
        slot.transport.set_timeout(request_timeout);

        trace!(lease = %lease_id, slot = %slot.id, path, "Request sent");
        let outcome = {
            let _busy = BusyGuard::set(pool.hooks.busy.as_ref());
            timeout(request_timeout, slot.transport.send(request)).await
        };

        match outcome {
            Ok(Ok(response)) if response.is_success() => {
                trace!(lease = %lease_id, path, status = response.status, "Request succeeded");
                Ok(response)
            }
            Ok(Ok(response)) if response.is_unauthorized() => {
                warn!(lease = %lease_id, path, "Session expired");
                self.reclaim();
                pool.on_session_expired();
                Err(Error::session_expired(path))
            }
            Ok(Ok(response)) => {
                warn!(lease = %lease_id, path, status = response.status, "Request failed");
                self.reclaim();
                Err(Error::status(path, response.status))
            }
            Ok(Err(e)) => {
                warn!(lease = %lease_id, path, error = %e, "Request failed");
                self.reclaim();
                Err(Error::transport(e.message))
            }
            Err(_) => {
                warn!(
                    lease = %lease_id,
                    path,
                    timeout_ms = pool.options.timeout_ms,
                    "Request timed out"
                );
                self.reclaim();
                Err(Error::request_timeout(path, pool.options.timeout_ms))
            }
        }
    }

    /// Returns the lease to the pool.
    #[inline]
    pub fn release(self) {
        drop(self);
    }

    /// Returns the slot to the pool ahead of the caller's release.
    fn reclaim(&mut self) {
        if let Some(slot) = self.slot.take() {
            debug!(lease = %self.id, slot = %slot.id, "Slot reclaimed by pool");
            self.pool.check_in(slot);
        }
    }
}

impl Drop for Lease {
    fn drop(&mut self) {
        if let Some(slot) = self.slot.take() {
            trace!(lease = %self.id, slot = %slot.id, "Lease released");
            self.pool.check_in(slot);
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use std::time::Duration;

    use proptest::prelude::*;
    use tokio::sync::mpsc;

    use crate::protocol::LOGIN_PATH;
    use crate::transport::testing::{RecordingPrompt, ScriptedFactory, Step, wait_until};

    fn options(min: usize, max: usize) -> PoolOptions {
        PoolOptions::new().with_slots(min, max)
    }

    fn pool(min: usize, max: usize, factory: &Arc<ScriptedFactory>) -> RequestPool {
        RequestPool::new(options(min, max), factory.clone()).expect("pool creation")
    }

    fn login_ok() -> Step {
        Step::Respond(200, LoginResponse::default().encode().expect("encode"))
    }

    #[test]
    fn test_min_slots_created_up_front() {
        let factory = ScriptedFactory::ok();
        let pool = pool(2, 3, &factory);
        assert_eq!(factory.created(), 2);
        assert_eq!(
            pool.stats(),
            PoolStats {
                total: 2,
                free: 2,
                leased: 0,
                queued: 0
            }
        );
    }

    #[test]
    fn test_invalid_options_rejected() {
        let factory = ScriptedFactory::ok();
        let result = RequestPool::new(options(3, 2), factory);
        assert!(matches!(result, Err(Error::Config { .. })));
    }

    #[tokio::test]
    async fn test_acquire_up_to_max_then_queue_fifo() {
        let factory = ScriptedFactory::ok();
        let pool = pool(1, 3, &factory);

        let first = pool.acquire().await.expect("first");
        let second = pool.acquire().await.expect("second");
        let third = pool.acquire().await.expect("third");
        assert_eq!(pool.stats().leased, 3);
        assert_eq!(factory.created(), 3);

        let (granted_tx, mut granted_rx) = mpsc::unbounded_channel();
        for label in ["fourth", "fifth"] {
            let pool_clone = pool.clone();
            let granted_tx = granted_tx.clone();
            let queued_before = pool.stats().queued;
            tokio::spawn(async move {
                let lease = pool_clone.acquire().await.expect("queued acquire");
                granted_tx.send((label, lease)).expect("send grant");
            });
            wait_until(|| pool.stats().queued == queued_before + 1).await;
        }

        assert!(granted_rx.try_recv().is_err());

        pool.release(second);
        let (label, fourth) = granted_rx.recv().await.expect("fourth grant");
        assert_eq!(label, "fourth");
        assert_eq!(pool.stats().queued, 1);

        pool.release(first);
        let (label, _fifth) = granted_rx.recv().await.expect("fifth grant");
        assert_eq!(label, "fifth");

        assert_eq!(pool.stats().total, 3);
        assert_eq!(factory.created(), 3);
        drop(fourth);
        drop(third);
    }

    #[tokio::test]
    async fn test_try_acquire_returns_none_when_exhausted() {
        let factory = ScriptedFactory::ok();
        let pool = pool(0, 1, &factory);

        let lease = pool.try_acquire().expect("try").expect("lease");
        assert!(pool.try_acquire().expect("try").is_none());

        pool.release(lease);
        assert!(pool.try_acquire().expect("try").is_some());
    }

    #[tokio::test]
    async fn test_drop_returns_slot() {
        let factory = ScriptedFactory::ok();
        let pool = pool(1, 1, &factory);

        {
            let _lease = pool.acquire().await.expect("lease");
            assert_eq!(pool.stats().free, 0);
        }
        assert_eq!(pool.stats().free, 1);
        assert_eq!(pool.stats().leased, 0);
    }

    #[tokio::test]
    async fn test_cancelled_acquire_does_not_leak() {
        let factory = ScriptedFactory::ok();
        let pool = pool(1, 1, &factory);

        let held = pool.acquire().await.expect("lease");
        let cancelled = tokio::time::timeout(Duration::from_millis(10), pool.acquire()).await;
        assert!(cancelled.is_err());

        pool.release(held);
        assert_eq!(
            pool.stats(),
            PoolStats {
                total: 1,
                free: 1,
                leased: 0,
                queued: 0
            }
        );
    }

    #[tokio::test]
    async fn test_cancelled_acquires_leave_queue_while_full() {
        let factory = ScriptedFactory::ok();
        let pool = pool(1, 1, &factory);

        let held = pool.acquire().await.expect("lease");
        for _ in 0..200 {
            let cancelled = tokio::time::timeout(Duration::from_micros(1), pool.acquire()).await;
            assert!(cancelled.is_err());
        }
        assert_eq!(pool.inner.state.lock().waiters.len(), 0);

        let waiting = {
            let pool = pool.clone();
            tokio::spawn(async move { pool.acquire().await })
        };
        wait_until(|| pool.stats().queued == 1).await;
        let _ = tokio::time::timeout(Duration::from_millis(5), pool.acquire()).await;
        assert_eq!(pool.inner.state.lock().waiters.len(), 1);

        pool.release(held);
        let lease = waiting.await.expect("join").expect("queued acquire");
        assert_eq!(pool.inner.state.lock().waiters.len(), 0);
        drop(lease);
    }

    #[tokio::test]
    async fn test_successful_send_keeps_lease() {
        let factory = ScriptedFactory::new(|_| Step::Respond(200, b"pong".to_vec()));
        let pool = pool(1, 1, &factory);

        let mut lease = pool.acquire().await.expect("lease");
        let response = lease.send("/_/ping", b"ping".to_vec()).await.expect("send");
        assert_eq!(response.body, b"pong");
        assert_eq!(lease.status(), Some(200));
        assert!(!lease.is_reclaimed());

        let sent = factory.sent();
        assert_eq!(sent.len(), 1);
        assert!(
            sent[0]
                .headers
                .iter()
                .any(|(k, v)| k == "X-Requested-With" && v == "XMLHttpRequest")
        );

        pool.release(lease);
        assert_eq!(pool.stats().free, 1);
    }

    #[tokio::test]
    async fn test_busy_set_during_call_and_cleared_after() {
        let busy = Arc::new(BusyFlag::new());
        let observed = Arc::new(AtomicBool::new(false));

        let factory = {
            let busy = Arc::clone(&busy);
            let observed = Arc::clone(&observed);
            ScriptedFactory::new(move |_| {
                observed.store(busy.is_busy(), Ordering::SeqCst);
                Step::Respond(200, Vec::new())
            })
        };

        let hooks = PoolHooks::default().with_busy(busy.clone());
        let pool = RequestPool::with_hooks(options(1, 1), factory, hooks).expect("pool");

        let mut lease = pool.acquire().await.expect("lease");
        lease.send("/_/x", Vec::new()).await.expect("send");
        assert!(observed.load(Ordering::SeqCst));
        assert!(!busy.is_busy());
    }

    #[tokio::test]
    async fn test_timeout_reclaims_slot() {
        let busy = Arc::new(BusyFlag::new());
        let factory = ScriptedFactory::new(|_| Step::Hang);
        let hooks = PoolHooks::default().with_busy(busy.clone());
        let pool = RequestPool::with_hooks(
            options(1, 1).with_timeout(Duration::from_millis(30)),
            factory,
            hooks,
        )
        .expect("pool");

        let mut lease = pool.acquire().await.expect("lease");
        let err = lease.send("/_/slow", Vec::new()).await.unwrap_err();
        assert!(err.is_timeout());
        assert!(lease.is_reclaimed());
        assert!(!busy.is_busy());
        assert_eq!(pool.stats().free, 1);

        let again = lease.send("/_/slow", Vec::new()).await.unwrap_err();
        assert!(matches!(again, Error::LeaseReclaimed { .. }));

        // Releasing a reclaimed lease is a no-op.
        pool.release(lease);
        assert_eq!(pool.stats().free, 1);
        assert_eq!(pool.stats().leased, 0);
    }

    #[tokio::test]
    async fn test_error_status_reclaims_slot() {
        let factory = ScriptedFactory::new(|_| Step::Respond(500, Vec::new()));
        let pool = pool(1, 1, &factory);

        let mut lease = pool.acquire().await.expect("lease");
        let err = lease.send("/_/boom", Vec::new()).await.unwrap_err();
        assert!(matches!(err, Error::Status { status: 500, .. }));
        assert!(lease.is_reclaimed());
        assert_eq!(pool.stats().free, 1);
        assert!(!pool.is_reauthenticating());
    }

    #[tokio::test]
    async fn test_transport_error_reclaims_slot() {
        let factory = ScriptedFactory::new(|_| Step::Fail("connection reset"));
        let pool = pool(1, 1, &factory);

        let mut lease = pool.acquire().await.expect("lease");
        let err = lease.send("/_/x", Vec::new()).await.unwrap_err();
        assert!(matches!(err, Error::Transport { ref message } if message == "connection reset"));
        assert_eq!(pool.stats().free, 1);
    }

    #[tokio::test]
    async fn test_session_expiry_opens_modal_without_replay() {
        let factory = ScriptedFactory::new(|req| {
            if req.path == LOGIN_PATH {
                login_ok()
            } else {
                Step::Respond(401, b"Unauthorized".to_vec())
            }
        });
        let prompt = RecordingPrompt::answering(vec![Some(Credentials::new("ops", "pw"))]);
        let hooks = PoolHooks::default().with_auth(prompt.clone());
        let pool = RequestPool::with_hooks(options(1, 3), factory.clone(), hooks).expect("pool");
        pool.set_login_hint(Some("ops".into()));

        let free_before = pool.stats().free;
        let mut lease = pool.acquire().await.expect("lease");
        let err = lease.send("/_/get-users", Vec::new()).await.unwrap_err();
        assert!(matches!(err, Error::SessionExpired { .. }));
        assert!(lease.is_reclaimed());

        wait_until(|| prompt.closed() == 1).await;
        wait_until(|| !pool.is_reauthenticating()).await;

        let requests = prompt.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].login_hint.as_deref(), Some("ops"));
        assert_eq!(requests[0].error, None);

        assert_eq!(factory.sent_paths(), vec!["/_/get-users", LOGIN_PATH]);
        assert_eq!(pool.stats().free, free_before);
        assert_eq!(pool.stats().leased, 0);
    }

    #[tokio::test]
    async fn test_rejected_login_reprompts_with_message() {
        let attempts = Arc::new(Mutex::new(0usize));
        let factory = {
            let attempts = Arc::clone(&attempts);
            ScriptedFactory::new(move |req| {
                if req.path != LOGIN_PATH {
                    return Step::Respond(401, Vec::new());
                }
                let mut attempts = attempts.lock();
                *attempts += 1;
                if *attempts == 1 {
                    let rejected = LoginResponse {
                        error_msg: "Login name and password not match.".into(),
                    };
                    Step::Respond(200, rejected.encode().expect("encode"))
                } else {
                    login_ok()
                }
            })
        };
        let prompt = RecordingPrompt::answering(vec![
            Some(Credentials::new("ops", "wrong")),
            Some(Credentials::new("ops", "right")),
        ]);
        let hooks = PoolHooks::default().with_auth(prompt.clone());
        let pool = RequestPool::with_hooks(options(1, 2), factory, hooks).expect("pool");

        let mut lease = pool.acquire().await.expect("lease");
        let _ = lease.send("/_/get-logs", Vec::new()).await;

        wait_until(|| prompt.closed() == 1).await;
        let requests = prompt.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(
            requests[1].error.as_deref(),
            Some("Login name and password not match.")
        );
    }

    #[tokio::test]
    async fn test_dismissed_modal_ends_interaction() {
        let factory = ScriptedFactory::new(|_| Step::Respond(401, Vec::new()));
        let prompt = RecordingPrompt::answering(vec![None]);
        let hooks = PoolHooks::default().with_auth(prompt.clone());
        let pool = RequestPool::with_hooks(options(1, 1), factory.clone(), hooks).expect("pool");

        let mut lease = pool.acquire().await.expect("lease");
        let _ = lease.send("/_/x", Vec::new()).await;

        wait_until(|| prompt.requests().len() == 1).await;
        wait_until(|| !pool.is_reauthenticating()).await;
        assert_eq!(prompt.closed(), 0);
        assert_eq!(factory.sent_paths(), vec!["/_/x"]);
    }

    #[tokio::test]
    async fn test_concurrent_expiry_opens_one_modal() {
        let factory = ScriptedFactory::new(|req| {
            if req.path == LOGIN_PATH {
                login_ok()
            } else {
                Step::Respond(401, Vec::new())
            }
        });
        let prompt = RecordingPrompt::gated(Some(Credentials::new("ops", "pw")));
        let hooks = PoolHooks::default().with_auth(prompt.clone());
        let pool = RequestPool::with_hooks(options(2, 2), factory, hooks).expect("pool");

        let mut a = pool.acquire().await.expect("a");
        let mut b = pool.acquire().await.expect("b");
        let _ = a.send("/_/a", Vec::new()).await;
        let _ = b.send("/_/b", Vec::new()).await;

        wait_until(|| prompt.requests().len() == 1).await;
        assert!(pool.is_reauthenticating());

        prompt.open_gate();
        wait_until(|| prompt.closed() == 1).await;
        assert_eq!(prompt.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_login_rejected_is_error() {
        let factory = ScriptedFactory::new(|_| {
            let rejected = LoginResponse {
                error_msg: "Disabled.".into(),
            };
            Step::Respond(200, rejected.encode().expect("encode"))
        });
        let pool = pool(1, 1, &factory);

        let err = pool
            .login(&Credentials::new("ops", "pw"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::LoginRejected { ref message } if message == "Disabled."));
        assert_eq!(pool.stats().free, 1);
    }

    #[tokio::test]
    async fn test_direct_login_leaves_prompt_untouched() {
        let factory = ScriptedFactory::new(|_| login_ok());
        let prompt = RecordingPrompt::answering(Vec::new());
        let hooks = PoolHooks::default().with_auth(prompt.clone());
        let pool = RequestPool::with_hooks(options(1, 1), factory, hooks).expect("pool");

        pool.login(&Credentials::new("ops", "pw"))
            .await
            .expect("login");
        assert_eq!(prompt.closed(), 0);
        assert!(prompt.requests().is_empty());
        assert!(!pool.is_reauthenticating());
    }

    #[tokio::test]
    async fn test_call_round_trips_messages() {
        let factory = ScriptedFactory::new(|req| {
            let login = LoginRequest::decode(&req.body).expect("decode request");
            let reply = LoginResponse {
                error_msg: format!("hello {}", login.login_name),
            };
            Step::Respond(200, reply.encode().expect("encode"))
        });
        let pool = pool(1, 1, &factory);

        let response: LoginResponse = pool
            .call("/_/echo", &LoginRequest::new("ops", "pw"))
            .await
            .expect("call");
        assert_eq!(response.error_msg, "hello ops");
        assert_eq!(pool.stats().free, 1);
    }

    #[tokio::test]
    async fn test_login_header_matches_body_encoding() {
        let factory = ScriptedFactory::new(|_| login_ok());
        let pool = pool(1, 1, &factory);

        pool.login(&Credentials::new("ops", "pw"))
            .await
            .expect("login");

        let sent = factory.sent();
        assert_eq!(sent.len(), 1);
        let content_type = sent[0]
            .headers
            .iter()
            .find(|(k, _)| k == "Content-Type")
            .map(|(_, v)| v.as_str());
        assert_eq!(content_type, Some(LoginRequest::CONTENT_TYPE));

        let body: serde_json::Value = serde_json::from_slice(&sent[0].body).expect("json body");
        assert_eq!(body["login_name"], "ops");
        assert_eq!(body["password"], "pw");
    }

    #[tokio::test]
    async fn test_close_fails_waiters_and_new_acquires() {
        let factory = ScriptedFactory::ok();
        let pool = pool(1, 1, &factory);

        let held = pool.acquire().await.expect("lease");
        let waiting = {
            let pool = pool.clone();
            tokio::spawn(async move { pool.acquire().await })
        };
        wait_until(|| pool.stats().queued == 1).await;

        pool.close();
        let result = waiting.await.expect("join");
        assert!(matches!(result, Err(Error::PoolClosed)));
        assert!(matches!(pool.acquire().await, Err(Error::PoolClosed)));

        pool.release(held);
        assert_eq!(pool.stats().total, 0);
        assert_eq!(pool.stats().leased, 0);
    }

    #[tokio::test]
    async fn test_concurrent_callers_never_exceed_max() {
        let factory = ScriptedFactory::new(|_| Step::Respond(200, Vec::new()));
        let pool = pool(1, 3, &factory);

        let mut handles = Vec::new();
        for _ in 0..20 {
            let pool = pool.clone();
            handles.push(tokio::spawn(async move {
                let mut lease = pool.acquire().await.expect("lease");
                let leased = pool.stats().leased;
                lease.send("/_/x", Vec::new()).await.expect("send");
                tokio::task::yield_now().await;
                pool.release(lease);
                leased
            }));
        }

        for leased in futures_util::future::join_all(handles).await {
            assert!(leased.expect("join") <= 3);
        }
        assert!(factory.created() <= 3);
        assert_eq!(pool.stats().leased, 0);
        assert_eq!(pool.stats().free, factory.created());
    }

    #[derive(Debug, Clone)]
    enum Op {
        Acquire,
        Release(usize),
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![Just(Op::Acquire), (0usize..8).prop_map(Op::Release)]
    }

    proptest! {
        #[test]
        fn prop_leases_bounded_by_max(max in 1usize..5, ops in prop::collection::vec(op(), 0..40)) {
            let factory = ScriptedFactory::ok();
            let pool = RequestPool::new(options(0, max), factory.clone()).expect("pool");
            let mut held = Vec::new();

            for op in ops {
                match op {
                    Op::Acquire => {
                        let lease = pool.try_acquire().expect("try");
                        prop_assert_eq!(lease.is_some(), held.len() < max);
                        held.extend(lease);
                    }
                    Op::Release(i) if !held.is_empty() => {
                        let lease = held.remove(i % held.len());
                        pool.release(lease);
                    }
                    Op::Release(_) => {}
                }

                let stats = pool.stats();
                prop_assert!(stats.total <= max);
                prop_assert_eq!(stats.leased, held.len());
                prop_assert_eq!(stats.total, stats.free + stats.leased);

                let mut slots: Vec<_> = held.iter().filter_map(Lease::slot_id).collect();
                slots.sort();
                slots.dedup();
                prop_assert_eq!(slots.len(), held.len());
            }

            prop_assert!(factory.created() <= max);
        }
    }
}
