//! Dispatcher that delivers requests on a later frame.
//!
//! Sending only queues. Nothing reaches the [`PeerStore`] until the test
//! calls [`DeferredDispatcher::deliver`], which mirrors how a real client's
//! answers show up as item changes some frames after the button press.
//! Delivery can drop requests with a seeded probability.

use std::collections::VecDeque;

use padlock_core::{
    ApplyRequest, DispatchError, Dispatcher, ItemRef, LockRequest, ToggleRequest, UnlockRequest,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, trace};

use crate::store::PeerStore;

/// Any request a widget can send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    /// Apply a padlock.
    Lock(LockRequest),
    /// Remove a padlock.
    Unlock(UnlockRequest),
    /// Apply a choice.
    Apply(ApplyRequest),
    /// Enable or disable a choice.
    Toggle(ToggleRequest),
}

impl Request {
    /// Slot the request addresses.
    pub fn target(&self) -> &ItemRef {
        match self {
            Self::Lock(request) => &request.target,
            Self::Unlock(request) => &request.target,
            Self::Apply(request) => &request.target,
            Self::Toggle(request) => &request.target,
        }
    }

    fn apply(&self, store: &mut PeerStore) -> Result<(), DispatchError> {
        match self {
            Self::Lock(request) => store.apply_lock(request),
            Self::Unlock(request) => store.apply_unlock(request),
            Self::Apply(request) => store.apply_choice(request),
            Self::Toggle(request) => store.apply_toggle(request),
        }
    }
}

/// Result of delivering one queued request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    /// Request delivered.
    pub request: Request,
    /// What the peer answered.
    pub outcome: Result<(), DispatchError>,
}

/// Deferred dispatcher configuration.
#[derive(Debug, Clone)]
pub struct DispatcherConfig {
    /// Most requests waiting for delivery at once.
    pub capacity: usize,
    /// Probability in `[0, 1]` that a delivery is lost.
    pub drop_rate: f64,
    /// RNG seed for drop decisions.
    pub seed: u64,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self { capacity: 16, drop_rate: 0.0, seed: 0 }
    }
}

/// Queueing dispatcher with seeded fault injection.
#[derive(Debug, Clone)]
pub struct DeferredDispatcher {
    config: DispatcherConfig,
    queue: VecDeque<Request>,
    connected: bool,
    rng: ChaCha8Rng,
}

impl Default for DeferredDispatcher {
    fn default() -> Self {
        Self::new(DispatcherConfig::default())
    }
}

impl DeferredDispatcher {
    /// Connected dispatcher with an empty queue.
    pub fn new(config: DispatcherConfig) -> Self {
        let rng = ChaCha8Rng::seed_from_u64(config.seed);
        Self { config, queue: VecDeque::new(), connected: true, rng }
    }

    /// Whether requests are accepted.
    pub fn is_connected(&self) -> bool {
        self.connected
    }

    /// Simulate losing or regaining the connection.
    ///
    /// Queued requests survive a disconnect and go out on the next delivery.
    pub fn set_connected(&mut self, connected: bool) {
        debug!(connected, "dispatcher connection changed");
        self.connected = connected;
    }

    /// Requests waiting for delivery, oldest first.
    pub fn pending(&self) -> impl Iterator<Item = &Request> {
        self.queue.iter()
    }

    /// Number of requests waiting for delivery.
    pub fn pending_len(&self) -> usize {
        self.queue.len()
    }

    /// Deliver everything queued to `store`, in order.
    pub fn deliver(&mut self, store: &mut PeerStore) -> Vec<Delivery> {
        let drop_rate = self.config.drop_rate.clamp(0.0, 1.0);
        let mut deliveries = Vec::with_capacity(self.queue.len());

        while let Some(request) = self.queue.pop_front() {
            let outcome = if self.rng.gen_bool(drop_rate) {
                Err(DispatchError::Rejected { reason: "lost in transit".to_string() })
            } else {
                request.apply(store)
            };
            debug!(item = ?request.target(), ?outcome, "request delivered");
            deliveries.push(Delivery { request, outcome });
        }
        deliveries
    }

    fn enqueue(&mut self, request: Request) -> Result<(), DispatchError> {
        if !self.connected {
            return Err(DispatchError::Disconnected);
        }
        if self.queue.len() >= self.config.capacity {
            return Err(DispatchError::QueueFull);
        }
        trace!(item = ?request.target(), "request queued");
        self.queue.push_back(request);
        Ok(())
    }
}

impl Dispatcher for DeferredDispatcher {
    fn send_lock_request(&mut self, request: LockRequest) -> Result<(), DispatchError> {
        self.enqueue(Request::Lock(request))
    }

    fn send_unlock_request(&mut self, request: UnlockRequest) -> Result<(), DispatchError> {
        self.enqueue(Request::Unlock(request))
    }

    fn send_apply_request(&mut self, request: ApplyRequest) -> Result<(), DispatchError> {
        self.enqueue(Request::Apply(request))
    }

    fn send_toggle_request(&mut self, request: ToggleRequest) -> Result<(), DispatchError> {
        self.enqueue(Request::Toggle(request))
    }
}
