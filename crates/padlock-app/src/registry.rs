//! Per-peer widget registry.
//!
//! The registry builds one [`WidgetSet`] per peer and owns the [`Session`]
//! coordinating them. Widget sets are replaced wholesale on rebuild, so a
//! widget can never end up pointing at a peer it was not built for.

use std::collections::{HashMap, hash_map::Entry};

use padlock_core::{
    Dispatcher, GagSlot, LockSelection, Lockable, PeerId, RestraintSet, Settlement, SlotKey,
    SlotKind,
};
use tracing::{debug, info};

use crate::{
    config::RegistryConfig,
    error::RegistryError,
    session::{Interaction, InteractionKind, Session},
    source::ItemSource,
    widget::{Widget, WidgetKey, WidgetSet},
};

/// Factory and cache of widget sets, one per peer.
#[derive(Debug, Clone)]
pub struct PeerComboRegistry {
    config: RegistryConfig,
    session: Session,
    peers: HashMap<PeerId, WidgetSet>,
}

impl Default for PeerComboRegistry {
    fn default() -> Self {
        Self::new(RegistryConfig::default())
    }
}

impl PeerComboRegistry {
    /// Empty registry.
    pub fn new(config: RegistryConfig) -> Self {
        let session = Session::new(usize::from(config.gag_layers));
        Self { config, session, peers: HashMap::new() }
    }

    /// Registry configuration.
    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Shared interaction session.
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Replace the whole widget set of `peer` with freshly built widgets.
    ///
    /// An interaction open on `peer` is closed, since the widget it referred
    /// to no longer exists. Interactions on other peers are left alone.
    pub fn rebuild_for(&mut self, peer: &PeerId) -> &mut WidgetSet {
        let set = WidgetSet::build(peer, &self.config);
        if let Some(closed) = self.session.close_for_peer(peer) {
            debug!(%peer, kind = %closed.kind, "interaction closed by rebuild");
        }
        info!(%peer, widgets = set.len(), "widget set rebuilt");

        match self.peers.entry(peer.clone()) {
            Entry::Occupied(mut entry) => {
                entry.insert(set);
                entry.into_mut()
            },
            Entry::Vacant(entry) => entry.insert(set),
        }
    }

    /// Drop the widget set of `peer`. Returns whether one existed.
    pub fn remove_peer(&mut self, peer: &PeerId) -> bool {
        self.session.close_for_peer(peer);
        self.peers.remove(peer).is_some()
    }

    /// Widget set of `peer`.
    pub fn widgets_for(&self, peer: &PeerId) -> Option<&WidgetSet> {
        self.peers.get(peer)
    }

    /// Mutable widget set of `peer`.
    pub fn widgets_for_mut(&mut self, peer: &PeerId) -> Option<&mut WidgetSet> {
        self.peers.get_mut(peer)
    }

    /// Peers with a built widget set.
    pub fn peers(&self) -> impl Iterator<Item = &PeerId> {
        self.peers.keys()
    }

    /// Index of the operative gag layer.
    pub fn active_layer(&self) -> usize {
        self.session.active_layer()
    }

    /// Make `index` the operative gag layer.
    ///
    /// Switching layers closes any open interaction.
    pub fn select_layer(&mut self, index: usize) -> Result<(), RegistryError> {
        self.session.select_layer(index).map(|_| ())
    }

    /// The open interaction, if any.
    pub fn opened(&self) -> Option<&Interaction> {
        self.session.opened()
    }

    /// Whether `kind` is open on `peer`.
    pub fn is_open(&self, peer: &PeerId, kind: InteractionKind) -> bool {
        self.session.is_open(peer, kind)
    }

    /// Widget an interaction of `kind` operates on the current layer.
    pub fn widget_key(&self, kind: InteractionKind) -> WidgetKey {
        kind.widget_key(self.active_layer_index())
    }

    /// Open `kind` on `peer`, closing any other open interaction first.
    ///
    /// Returns the interaction that was closed.
    pub fn open_interaction(
        &mut self,
        peer: &PeerId,
        kind: InteractionKind,
    ) -> Result<Option<Interaction>, RegistryError> {
        let key = self.widget_key(kind);
        let widget = self.widget_mut(peer, key)?;
        widget.reopen();

        let closed = self.session.open(peer.clone(), kind);
        debug!(%peer, %kind, widget = %key, "interaction opened");
        Ok(closed)
    }

    /// Open `kind` on `peer` if it is closed, close it if it is open.
    ///
    /// Returns whether it is open afterwards.
    pub fn toggle_interaction(
        &mut self,
        peer: &PeerId,
        kind: InteractionKind,
    ) -> Result<bool, RegistryError> {
        if self.session.is_open(peer, kind) {
            self.session.close();
            return Ok(false);
        }
        self.open_interaction(peer, kind)?;
        Ok(true)
    }

    /// Close whatever is open.
    pub fn close_interaction(&mut self) -> Option<Interaction> {
        self.session.close()
    }

    /// Lock the gag on the active layer of `peer` with its widget's input.
    pub fn lock_active_gag<S, D>(
        &mut self,
        peer: &PeerId,
        source: &S,
        dispatcher: &mut D,
    ) -> Result<(), RegistryError>
    where
        S: ItemSource<GagSlot> + ?Sized,
        D: Dispatcher + ?Sized,
    {
        let layer = self.active_layer_index();
        let item = fetch(source, peer, SlotKey::new(SlotKind::Gag, layer))?;
        self.gag_padlock_mut(peer, layer)?.attempt_lock(item, dispatcher)?;
        self.finish(peer, InteractionKind::LockGag);
        Ok(())
    }

    /// Unlock the gag on the active layer of `peer` with its widget's input.
    pub fn unlock_active_gag<S, D>(
        &mut self,
        peer: &PeerId,
        source: &S,
        dispatcher: &mut D,
    ) -> Result<(), RegistryError>
    where
        S: ItemSource<GagSlot> + ?Sized,
        D: Dispatcher + ?Sized,
    {
        let layer = self.active_layer_index();
        let item = fetch(source, peer, SlotKey::new(SlotKind::Gag, layer))?;
        self.gag_padlock_mut(peer, layer)?.attempt_unlock(item, dispatcher)?;
        self.finish(peer, InteractionKind::UnlockGag);
        Ok(())
    }

    /// Lock the restraint set of `peer` with its widget's input.
    pub fn lock_restraint<S, D>(
        &mut self,
        peer: &PeerId,
        source: &S,
        dispatcher: &mut D,
    ) -> Result<(), RegistryError>
    where
        S: ItemSource<RestraintSet> + ?Sized,
        D: Dispatcher + ?Sized,
    {
        let item = fetch(source, peer, SlotKey::new(SlotKind::Restraint, 0))?;
        self.restraint_padlock_mut(peer)?.attempt_lock(item, dispatcher)?;
        self.finish(peer, InteractionKind::LockRestraint);
        Ok(())
    }

    /// Unlock the restraint set of `peer` with its widget's input.
    pub fn unlock_restraint<S, D>(
        &mut self,
        peer: &PeerId,
        source: &S,
        dispatcher: &mut D,
    ) -> Result<(), RegistryError>
    where
        S: ItemSource<RestraintSet> + ?Sized,
        D: Dispatcher + ?Sized,
    {
        let item = fetch(source, peer, SlotKey::new(SlotKind::Restraint, 0))?;
        self.restraint_padlock_mut(peer)?.attempt_unlock(item, dispatcher)?;
        self.finish(peer, InteractionKind::UnlockRestraint);
        Ok(())
    }

    /// Reconcile every padlock widget of `peer` with the data layer.
    ///
    /// Returns the settlements that were not [`Settlement::Nothing`].
    pub fn observe<S>(
        &mut self,
        peer: &PeerId,
        source: &S,
    ) -> Result<Vec<(WidgetKey, Settlement)>, RegistryError>
    where
        S: ItemSource<GagSlot> + ItemSource<RestraintSet> + ?Sized,
    {
        let set = self.peers.get_mut(peer).ok_or_else(|| RegistryError::UnknownPeer(peer.clone()))?;

        let mut settled = Vec::new();
        for layer in 0..self.config.gag_layers {
            let key = WidgetKey::gag_padlock(layer);
            if let (Some(widget), Some(item)) = (
                set.gag_padlock_mut(layer),
                <S as ItemSource<GagSlot>>::item(source, peer, layer),
            ) {
                push_settlement(&mut settled, key, widget, item);
            }
        }
        if let (Some(widget), Some(item)) = (
            set.restraint_padlock_mut(),
            <S as ItemSource<RestraintSet>>::item(source, peer, 0),
        ) {
            push_settlement(&mut settled, WidgetKey::restraint_padlock(), widget, item);
        }
        Ok(settled)
    }

    fn active_layer_index(&self) -> u8 {
        u8::try_from(self.session.active_layer()).unwrap_or(u8::MAX)
    }

    fn widget_mut(&mut self, peer: &PeerId, key: WidgetKey) -> Result<&mut Widget, RegistryError> {
        self.peers
            .get_mut(peer)
            .ok_or_else(|| RegistryError::UnknownPeer(peer.clone()))?
            .get_mut(&key)
            .ok_or(RegistryError::UnknownWidget(key))
    }

    fn gag_padlock_mut(
        &mut self,
        peer: &PeerId,
        layer: u8,
    ) -> Result<&mut LockSelection<GagSlot>, RegistryError> {
        match self.widget_mut(peer, WidgetKey::gag_padlock(layer))? {
            Widget::GagPadlock(selection) => Ok(selection),
            _ => Err(RegistryError::UnknownWidget(WidgetKey::gag_padlock(layer))),
        }
    }

    fn restraint_padlock_mut(
        &mut self,
        peer: &PeerId,
    ) -> Result<&mut LockSelection<RestraintSet>, RegistryError> {
        match self.widget_mut(peer, WidgetKey::restraint_padlock())? {
            Widget::RestraintPadlock(selection) => Ok(selection),
            _ => Err(RegistryError::UnknownWidget(WidgetKey::restraint_padlock())),
        }
    }

    /// A request for `kind` went out; close it if it is the open interaction.
    fn finish(&mut self, peer: &PeerId, kind: InteractionKind) {
        if self.session.is_open(peer, kind) {
            self.session.close();
        }
    }
}

fn fetch<'s, T, S>(source: &'s S, peer: &PeerId, slot: SlotKey) -> Result<&'s T, RegistryError>
where
    S: ItemSource<T> + ?Sized,
{
    source
        .item(peer, slot.index)
        .ok_or_else(|| RegistryError::ItemUnavailable { peer: peer.clone(), slot })
}

fn push_settlement<T: Lockable>(
    settled: &mut Vec<(WidgetKey, Settlement)>,
    key: WidgetKey,
    widget: &mut LockSelection<T>,
    item: &T,
) {
    match widget.observe(item) {
        Settlement::Nothing => {},
        settlement => settled.push((key, settlement)),
    }
}
