//! Reference model for model-based testing.
//!
//! [`ModelWorld`] is a deliberately naive re-statement of how the registry,
//! the gag padlock widgets and the peers behind them should behave. It keeps
//! plain vectors and hand-written rule tables instead of calling into the
//! real validation code, so a divergence points at a real bug.
//!
//! Operations carry raw bytes and are mapped onto small fixed vocabularies
//! (two peers, three layers, a handful of passwords and timers) so that
//! random sequences keep hitting the interesting cases.

use std::collections::{BTreeMap, VecDeque};

use arbitrary::Arbitrary;
use padlock_app::{InteractionKind, RegistryError};
use padlock_core::{DispatchError, LockGrants, LockVariant, PadlockError, PeerId, ValidationError};

use crate::store::{PeerData, PeerStore};

/// Peers every world starts with.
pub const PEERS: [&str; 2] = ["A", "B"];

/// Gag layers per peer.
pub const LAYERS: u8 = 3;

/// Outgoing queue capacity of the real dispatcher.
pub const QUEUE_CAPACITY: usize = 4;

/// Longest timer peer `A` accepts, in seconds.
pub const PEER_A_LIMIT_SECS: u64 = 3600;

/// Password vocabulary.
pub const PASSWORDS: [&str; 5] = ["", "1234", "12a4", "hunter2", "correct horse battery staple"];

/// Timer vocabulary with the seconds each one means, `None` when invalid.
pub const TIMERS: [(&str, Option<u64>); 5] =
    [("", None), ("30m", Some(1800)), ("0h0m0s", None), ("2h", Some(7200)), ("soon", None)];

/// Interactions operations can open.
pub const KINDS: [InteractionKind; 4] = [
    InteractionKind::LockGag,
    InteractionKind::UnlockGag,
    InteractionKind::ApplyGag,
    InteractionKind::ToggleAlarm,
];

/// Peer addressed by a raw index.
pub fn peer_at(index: u8) -> PeerId {
    PeerId::new(PEERS[usize::from(index) % PEERS.len()])
}

/// Layer addressed by a raw index. One value past the last layer is kept so
/// out of range selections get exercised.
pub fn layer_at(index: u8) -> usize {
    usize::from(index % (LAYERS + 1))
}

/// Padlock addressed by a raw index.
pub fn variant_at(index: u8) -> LockVariant {
    LockVariant::ALL[usize::from(index) % LockVariant::ALL.len()]
}

/// Password addressed by a raw index.
pub fn password_at(index: u8) -> &'static str {
    PASSWORDS[usize::from(index) % PASSWORDS.len()]
}

/// Timer text addressed by a raw index.
pub fn timer_at(index: u8) -> &'static str {
    TIMERS[usize::from(index) % TIMERS.len()].0
}

/// Interaction addressed by a raw index.
pub fn kind_at(index: u8) -> InteractionKind {
    KINDS[usize::from(index) % KINDS.len()]
}

/// Store holding the peers every world starts with.
///
/// Peer `A` grants no owner or devotional padlocks, caps timers at one hour
/// and wears gags on layers 0 and 1. Peer `B` grants everything and wears a
/// gag on layer 0.
pub fn seed_store() -> PeerStore {
    let limited = LockGrants {
        max_duration: Some(std::time::Duration::from_secs(PEER_A_LIMIT_SECS)),
        ..LockGrants::default()
    };
    let mut store = PeerStore::new();
    store.insert(
        peer_at(0),
        PeerData::new(LAYERS, &limited).with_gag(0, "Ball Gag").with_gag(1, "Cloth Gag"),
    );
    store.insert(peer_at(1), PeerData::new(LAYERS, &LockGrants::all()).with_gag(0, "Ring Gag"));
    store
}

/// One user or network step.
#[derive(Debug, Clone, PartialEq, Eq, Arbitrary)]
pub enum Operation {
    /// Rebuild the widget set of a peer.
    Rebuild {
        /// Raw peer index.
        peer: u8,
    },
    /// Drop the widget set of a peer.
    RemovePeer {
        /// Raw peer index.
        peer: u8,
    },
    /// Switch the active gag layer.
    SelectLayer {
        /// Raw layer index.
        layer: u8,
    },
    /// Open an interaction.
    Open {
        /// Raw peer index.
        peer: u8,
        /// Raw interaction index.
        kind: u8,
    },
    /// Close whatever is open.
    Close,
    /// Pick a padlock in the active layer's widget.
    Select {
        /// Raw peer index.
        peer: u8,
        /// Raw padlock index.
        variant: u8,
    },
    /// Type a password into the active layer's widget.
    TypePassword {
        /// Raw peer index.
        peer: u8,
        /// Raw password index.
        text: u8,
    },
    /// Type a timer into the active layer's widget.
    TypeTimer {
        /// Raw peer index.
        peer: u8,
        /// Raw timer index.
        text: u8,
    },
    /// Press lock on the active layer.
    Lock {
        /// Raw peer index.
        peer: u8,
    },
    /// Press unlock on the active layer.
    Unlock {
        /// Raw peer index.
        peer: u8,
    },
    /// Deliver queued requests, then observe every built peer.
    Deliver,
    /// Drop or restore the connection.
    SetConnected {
        /// New state.
        connected: bool,
    },
}

/// Coarse classification of an operation error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationError {
    /// No widgets built for the peer.
    UnknownPeer,
    /// Layer index out of range.
    LayerOutOfRange,
    /// Padlock not permitted on the item.
    NotPermitted,
    /// Any other local validation failure.
    Validation,
    /// Active padlock changed since it was shown.
    StateMismatch,
    /// Dispatcher offline.
    Disconnected,
    /// Dispatcher queue full.
    QueueFull,
    /// Anything the model does not produce.
    Other,
}

impl From<&RegistryError> for OperationError {
    fn from(err: &RegistryError) -> Self {
        match err {
            RegistryError::UnknownPeer(_) => Self::UnknownPeer,
            RegistryError::LayerOutOfRange { .. } => Self::LayerOutOfRange,
            RegistryError::Padlock(PadlockError::Validation(ValidationError::NotPermitted {
                ..
            })) => Self::NotPermitted,
            RegistryError::Padlock(PadlockError::Validation(_)) => Self::Validation,
            RegistryError::Padlock(PadlockError::StateMismatch { .. }) => Self::StateMismatch,
            RegistryError::Padlock(PadlockError::Dispatch(err)) | RegistryError::Dispatch(err) => {
                match err {
                    DispatchError::Disconnected => Self::Disconnected,
                    DispatchError::QueueFull => Self::QueueFull,
                    DispatchError::Rejected { .. } => Self::Other,
                }
            },
            _ => Self::Other,
        }
    }
}

/// Result of applying one operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationResult {
    /// Accepted.
    Ok,
    /// Refused.
    Error(OperationError),
}

impl OperationResult {
    /// Whether the operation was accepted.
    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Ok)
    }
}

impl From<Result<(), RegistryError>> for OperationResult {
    fn from(result: Result<(), RegistryError>) -> Self {
        match result {
            Ok(()) => Self::Ok,
            Err(err) => Self::Error(OperationError::from(&err)),
        }
    }
}

/// Edit buffer of one gag padlock widget: selection, password and timer.
pub type BufferState = (LockVariant, String, String);

/// State both worlds expose for comparison.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ObservableState {
    /// Open interaction.
    pub opened: Option<(PeerId, InteractionKind)>,
    /// Active gag layer.
    pub active_layer: usize,
    /// Buffers of every built gag padlock widget, by peer and layer.
    pub buffers: BTreeMap<(PeerId, u8), BufferState>,
    /// Padlock on every gag slot, by peer and layer.
    pub padlocks: BTreeMap<(PeerId, u8), LockVariant>,
    /// Unconfirmed lock of every built gag padlock widget that has one.
    pub pending_locks: BTreeMap<(PeerId, u8), LockVariant>,
    /// Requests waiting for delivery.
    pub pending: usize,
}

#[derive(Debug, Clone, Default)]
struct ModelWidget {
    selected: LockVariant,
    password: String,
    timer: String,
    shown: Option<LockVariant>,
    pending_lock: Option<LockVariant>,
    committed: bool,
}

impl ModelWidget {
    fn reset(&mut self) {
        self.selected = LockVariant::None;
        self.password.clear();
        self.timer.clear();
    }
}

#[derive(Debug, Clone)]
struct ModelSlot {
    worn: bool,
    padlock: LockVariant,
    password: Option<String>,
}

#[derive(Debug, Clone)]
struct ModelPeer {
    slots: Vec<ModelSlot>,
    all_grants: bool,
    limit_secs: Option<u64>,
}

#[derive(Debug, Clone)]
struct ModelRequest {
    peer: usize,
    layer: usize,
    unlock: bool,
    variant: LockVariant,
    password: Option<String>,
}

/// Reference implementation.
#[derive(Debug, Clone)]
pub struct ModelWorld {
    peers: Vec<ModelPeer>,
    widgets: BTreeMap<usize, Vec<ModelWidget>>,
    opened: Option<(usize, InteractionKind)>,
    active_layer: usize,
    connected: bool,
    queue: VecDeque<ModelRequest>,
}

impl Default for ModelWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl ModelWorld {
    /// World matching [`seed_store`], no widgets built.
    pub fn new() -> Self {
        let slot = |worn| ModelSlot { worn, padlock: LockVariant::None, password: None };
        let peers = vec![
            ModelPeer {
                slots: vec![slot(true), slot(true), slot(false)],
                all_grants: false,
                limit_secs: Some(PEER_A_LIMIT_SECS),
            },
            ModelPeer {
                slots: vec![slot(true), slot(false), slot(false)],
                all_grants: true,
                limit_secs: None,
            },
        ];
        Self {
            peers,
            widgets: BTreeMap::new(),
            opened: None,
            active_layer: 0,
            connected: true,
            queue: VecDeque::new(),
        }
    }

    /// Apply one operation.
    pub fn apply(&mut self, op: &Operation) -> OperationResult {
        let result = match *op {
            Operation::Rebuild { peer } => {
                let p = index(peer);
                self.widgets.insert(p, vec![ModelWidget::default(); usize::from(LAYERS)]);
                self.close_for(p);
                Ok(())
            },
            Operation::RemovePeer { peer } => {
                let p = index(peer);
                self.widgets.remove(&p);
                self.close_for(p);
                Ok(())
            },
            Operation::SelectLayer { layer } => self.select_layer(layer_at(layer)),
            Operation::Open { peer, kind } => self.open(index(peer), kind_at(kind)),
            Operation::Close => {
                self.opened = None;
                Ok(())
            },
            Operation::Select { peer, variant } => self.widget(index(peer)).map(|w| {
                match variant_at(variant) {
                    LockVariant::None => w.reset(),
                    picked => w.selected = picked,
                }
            }),
            Operation::TypePassword { peer, text } => {
                self.widget(index(peer)).map(|w| w.password = password_at(text).to_string())
            },
            Operation::TypeTimer { peer, text } => {
                self.widget(index(peer)).map(|w| w.timer = timer_at(text).to_string())
            },
            Operation::Lock { peer } => self.lock(index(peer)),
            Operation::Unlock { peer } => self.unlock(index(peer)),
            Operation::Deliver => {
                self.deliver();
                Ok(())
            },
            Operation::SetConnected { connected } => {
                self.connected = connected;
                Ok(())
            },
        };
        match result {
            Ok(()) => OperationResult::Ok,
            Err(err) => OperationResult::Error(err),
        }
    }

    /// Current observable state.
    pub fn observable_state(&self) -> ObservableState {
        let mut state = ObservableState {
            opened: self.opened.map(|(p, kind)| (peer_at(p as u8), kind)),
            active_layer: self.active_layer,
            pending: self.queue.len(),
            ..ObservableState::default()
        };
        for (p, widgets) in &self.widgets {
            for (layer, w) in widgets.iter().enumerate() {
                let key = (peer_at(*p as u8), layer as u8);
                if let Some(variant) = w.pending_lock {
                    state.pending_locks.insert(key.clone(), variant);
                }
                state.buffers.insert(key, (w.selected, w.password.clone(), w.timer.clone()));
            }
        }
        for (p, peer) in self.peers.iter().enumerate() {
            for (layer, slot) in peer.slots.iter().enumerate() {
                state.padlocks.insert((peer_at(p as u8), layer as u8), slot.padlock);
            }
        }
        state
    }

    fn close_for(&mut self, p: usize) {
        if self.opened.is_some_and(|(open, _)| open == p) {
            self.opened = None;
        }
    }

    fn finish(&mut self, p: usize, kind: InteractionKind) {
        if self.opened == Some((p, kind)) {
            self.opened = None;
        }
    }

    fn select_layer(&mut self, layer: usize) -> Result<(), OperationError> {
        if layer >= usize::from(LAYERS) {
            return Err(OperationError::LayerOutOfRange);
        }
        if layer != self.active_layer {
            self.active_layer = layer;
            self.opened = None;
        }
        Ok(())
    }

    fn open(&mut self, p: usize, kind: InteractionKind) -> Result<(), OperationError> {
        let padlock = matches!(kind, InteractionKind::LockGag | InteractionKind::UnlockGag);
        let w = self.widget(p)?;
        if padlock && std::mem::take(&mut w.committed) {
            w.reset();
        }
        self.opened = Some((p, kind));
        Ok(())
    }

    fn widget(&mut self, p: usize) -> Result<&mut ModelWidget, OperationError> {
        let layer = self.active_layer;
        self.widgets
            .get_mut(&p)
            .and_then(|widgets| widgets.get_mut(layer))
            .ok_or(OperationError::UnknownPeer)
    }

    fn permits(&self, p: usize, variant: LockVariant) -> bool {
        let peer = &self.peers[p];
        let slot = &peer.slots[self.active_layer];
        slot.worn && slot.padlock == LockVariant::None && permitted(peer.all_grants, variant)
    }

    fn queue(&mut self, request: ModelRequest) -> Result<(), OperationError> {
        if !self.connected {
            return Err(OperationError::Disconnected);
        }
        if self.queue.len() >= QUEUE_CAPACITY {
            return Err(OperationError::QueueFull);
        }
        self.queue.push_back(request);
        Ok(())
    }

    fn lock(&mut self, p: usize) -> Result<(), OperationError> {
        let limit = self.peers[p].limit_secs;
        let w = self.widget(p)?.clone();
        let variant = w.selected;
        if w.selected == LockVariant::None {
            return Err(OperationError::Validation);
        }
        if !self.permits(p, w.selected) {
            return Err(OperationError::NotPermitted);
        }
        if w.selected.requires_password() && !password_ok(w.selected, &w.password) {
            return Err(OperationError::Validation);
        }
        if w.selected.requires_timer() && !timer_ok(&w.timer, limit) {
            return Err(OperationError::Validation);
        }

        self.queue(ModelRequest {
            peer: p,
            layer: self.active_layer,
            unlock: false,
            variant: w.selected,
            password: w.selected.requires_password().then(|| w.password.clone()),
        })?;
        let w = self.widget(p)?;
        w.pending_lock = Some(variant);
        w.reset();
        w.committed = true;
        self.finish(p, InteractionKind::LockGag);
        Ok(())
    }

    fn unlock(&mut self, p: usize) -> Result<(), OperationError> {
        self.widget(p)?;
        let current = self.peers[p].slots[self.active_layer].padlock;
        let w = self.widget(p)?;
        if let Some(shown) = w.shown.replace(current)
            && shown != current
        {
            return Err(OperationError::StateMismatch);
        }
        if current == LockVariant::None {
            return Err(OperationError::Validation);
        }
        if current.requires_password() && !password_ok(current, &w.password) {
            return Err(OperationError::Validation);
        }
        let password = current.requires_password().then(|| w.password.clone());

        self.queue(ModelRequest {
            peer: p,
            layer: self.active_layer,
            unlock: true,
            variant: current,
            password,
        })?;
        let w = self.widget(p)?;
        w.password.clear();
        w.timer.clear();
        w.committed = true;
        self.finish(p, InteractionKind::UnlockGag);
        Ok(())
    }

    fn deliver(&mut self) {
        while let Some(request) = self.queue.pop_front() {
            let peer = &mut self.peers[request.peer];
            let all_grants = peer.all_grants;
            let slot = &mut peer.slots[request.layer];
            if request.unlock {
                let password_matches =
                    slot.password.is_none() || slot.password == request.password;
                if slot.padlock != LockVariant::None
                    && slot.padlock == request.variant
                    && password_matches
                {
                    slot.padlock = LockVariant::None;
                    slot.password = None;
                }
            } else if slot.worn
                && slot.padlock == LockVariant::None
                && permitted(all_grants, request.variant)
            {
                slot.padlock = request.variant;
                slot.password = request.password;
            }
        }

        for (p, widgets) in &mut self.widgets {
            for (layer, w) in widgets.iter_mut().enumerate() {
                let current = self.peers[*p].slots[layer].padlock;
                w.shown = Some(current);
                // Only an untouched slot keeps the lock waiting
                if w.pending_lock.is_some() && current != LockVariant::None {
                    w.pending_lock = None;
                }
            }
        }
    }
}

fn index(raw: u8) -> usize {
    usize::from(raw) % PEERS.len()
}

fn permitted(all_grants: bool, variant: LockVariant) -> bool {
    match variant {
        LockVariant::None => false,
        LockVariant::OwnerTimer | LockVariant::DevotionalTimer => all_grants,
        _ => true,
    }
}

fn password_ok(variant: LockVariant, password: &str) -> bool {
    match variant {
        LockVariant::Combination => {
            password.len() == 4 && password.bytes().all(|b| b.is_ascii_digit())
        },
        _ => !password.is_empty() && password.len() <= 20,
    }
}

fn timer_ok(text: &str, limit_secs: Option<u64>) -> bool {
    TIMERS
        .iter()
        .find(|(t, _)| *t == text)
        .and_then(|(_, secs)| *secs)
        .is_some_and(|secs| limit_secs.is_none_or(|limit| secs <= limit))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lock_then_deliver_applies_padlock() {
        let mut model = ModelWorld::new();
        let ops = [
            Operation::Rebuild { peer: 0 },
            Operation::Select { peer: 0, variant: 1 },
            Operation::TypePassword { peer: 0, text: 1 },
            Operation::Lock { peer: 0 },
            Operation::Deliver,
        ];
        for op in &ops {
            assert!(model.apply(op).is_ok(), "{op:?}");
        }

        let state = model.observable_state();
        assert_eq!(state.padlocks[&(peer_at(0), 0)], LockVariant::Combination);
        let cleared = (LockVariant::None, String::new(), String::new());
        assert_eq!(state.buffers[&(peer_at(0), 0)], cleared);
    }

    #[test]
    fn selecting_none_resets_buffer() {
        let mut model = ModelWorld::new();
        for op in [
            Operation::Rebuild { peer: 1 },
            Operation::Select { peer: 1, variant: 2 },
            Operation::TypePassword { peer: 1, text: 3 },
            Operation::Select { peer: 1, variant: 0 },
        ] {
            assert!(model.apply(&op).is_ok(), "{op:?}");
        }

        let cleared = (LockVariant::None, String::new(), String::new());
        assert_eq!(model.observable_state().buffers[&(peer_at(1), 0)], cleared);
    }

    #[test]
    fn owner_timer_needs_grant() {
        let mut model = ModelWorld::new();
        model.apply(&Operation::Rebuild { peer: 0 });
        model.apply(&Operation::Select { peer: 0, variant: 5 });
        assert_eq!(
            model.apply(&Operation::Lock { peer: 0 }),
            OperationResult::Error(OperationError::NotPermitted)
        );
    }

    #[test]
    fn timer_limit_applies_to_peer_a_only() {
        assert!(!timer_ok("2h", Some(PEER_A_LIMIT_SECS)));
        assert!(timer_ok("2h", None));
        assert!(!timer_ok("0h0m0s", None));
    }
}
