//! The real registry wired to in-memory peers.
//!
//! [`RealWorld`] accepts the same [`Operation`]s as
//! [`ModelWorld`](crate::ModelWorld) and exposes the same
//! [`ObservableState`], so the two can be run side by side.

use padlock_app::{ItemSource, PeerComboRegistry, RegistryConfig, RegistryError};
use padlock_core::{GagSlot, LockSelection, PeerId};

use crate::{
    dispatcher::{DeferredDispatcher, DispatcherConfig},
    model::{
        LAYERS, ObservableState, Operation, OperationResult, PEERS, QUEUE_CAPACITY, kind_at,
        layer_at, password_at, peer_at, seed_store, timer_at, variant_at,
    },
    store::PeerStore,
};

/// Registry, peers and dispatcher under test.
pub struct RealWorld {
    /// Widget registry.
    pub registry: PeerComboRegistry,
    /// Peer data behind the widgets.
    pub store: PeerStore,
    /// Outgoing request queue.
    pub dispatcher: DeferredDispatcher,
}

impl Default for RealWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl RealWorld {
    /// World seeded like [`ModelWorld::new`](crate::ModelWorld::new).
    pub fn new() -> Self {
        let config = DispatcherConfig { capacity: QUEUE_CAPACITY, ..DispatcherConfig::default() };
        Self {
            registry: PeerComboRegistry::new(RegistryConfig::default()),
            store: seed_store(),
            dispatcher: DeferredDispatcher::new(config),
        }
    }

    /// Apply one operation.
    pub fn apply(&mut self, op: &Operation) -> OperationResult {
        let result = match *op {
            Operation::Rebuild { peer } => {
                self.registry.rebuild_for(&peer_at(peer));
                Ok(())
            },
            Operation::RemovePeer { peer } => {
                self.registry.remove_peer(&peer_at(peer));
                Ok(())
            },
            Operation::SelectLayer { layer } => self.registry.select_layer(layer_at(layer)),
            Operation::Open { peer, kind } => {
                self.registry.open_interaction(&peer_at(peer), kind_at(kind)).map(|_| ())
            },
            Operation::Close => {
                self.registry.close_interaction();
                Ok(())
            },
            Operation::Select { peer, variant } => {
                self.widget(&peer_at(peer)).map(|w| w.select(variant_at(variant)))
            },
            Operation::TypePassword { peer, text } => {
                self.widget(&peer_at(peer)).map(|w| w.set_password(password_at(text)))
            },
            Operation::TypeTimer { peer, text } => {
                self.widget(&peer_at(peer)).map(|w| w.set_timer(timer_at(text)))
            },
            Operation::Lock { peer } => {
                self.registry.lock_active_gag(&peer_at(peer), &self.store, &mut self.dispatcher)
            },
            Operation::Unlock { peer } => {
                self.registry.unlock_active_gag(&peer_at(peer), &self.store, &mut self.dispatcher)
            },
            Operation::Deliver => {
                self.dispatcher.deliver(&mut self.store);
                let peers: Vec<PeerId> = self.registry.peers().cloned().collect();
                peers.iter().try_for_each(|peer| {
                    self.registry.observe(peer, &self.store).map(|_| ())
                })
            },
            Operation::SetConnected { connected } => {
                self.dispatcher.set_connected(connected);
                Ok(())
            },
        };
        result.into()
    }

    /// Snapshot comparable with the model's.
    pub fn observable_state(&self) -> ObservableState {
        let mut state = ObservableState {
            opened: self.registry.opened().map(|open| (open.peer.clone(), open.kind)),
            active_layer: self.registry.active_layer(),
            pending: self.dispatcher.pending_len(),
            ..ObservableState::default()
        };
        for peer in self.registry.peers() {
            let Some(set) = self.registry.widgets_for(peer) else { continue };
            for layer in 0..LAYERS {
                if let Some(widget) = set.gag_padlock(layer) {
                    if let Some(variant) = widget.pending_lock() {
                        state.pending_locks.insert((peer.clone(), layer), variant);
                    }
                    let buffer = widget.buffer();
                    let password = buffer.password().to_string();
                    let timer = buffer.timer().to_string();
                    let entry = (buffer.selected(), password, timer);
                    state.buffers.insert((peer.clone(), layer), entry);
                }
            }
        }
        for index in 0..PEERS.len() {
            let peer = peer_at(index as u8);
            for layer in 0..LAYERS {
                let slot: Option<&GagSlot> = ItemSource::item(&self.store, &peer, layer);
                if let Some(slot) = slot {
                    state.padlocks.insert((peer.clone(), layer), slot.padlock);
                }
            }
        }
        state
    }

    fn widget(&mut self, peer: &PeerId) -> Result<&mut LockSelection<GagSlot>, RegistryError> {
        let layer = self.registry.active_layer() as u8;
        self.registry
            .widgets_for_mut(peer)
            .and_then(|set| set.gag_padlock_mut(layer))
            .ok_or_else(|| RegistryError::UnknownPeer(peer.clone()))
    }
}
