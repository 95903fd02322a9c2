//! Interaction session shared by every widget.
//!
//! Exactly one interaction may be open across all peers and widgets at a
//! time, and one gag layer is the operative one. Both live here, in a value
//! owned by the registry, and are written at most once per update cycle.

use std::fmt;

use padlock_core::{PeerId, SlotKey, SlotKind};
use tracing::debug;

use crate::{
    error::RegistryError,
    widget::{Capability, WidgetKey},
};

/// Kind of interaction a widget can open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InteractionKind {
    /// Choosing a gag for the active layer.
    ApplyGag,
    /// Locking the gag on the active layer.
    LockGag,
    /// Unlocking the gag on the active layer.
    UnlockGag,
    /// Choosing a restraint set.
    ApplyRestraint,
    /// Locking the restraint set.
    LockRestraint,
    /// Unlocking the restraint set.
    UnlockRestraint,
    /// Executing a pattern.
    ExecutePattern,
    /// Enabling or disabling an alarm.
    ToggleAlarm,
    /// Enabling or disabling a trigger.
    ToggleTrigger,
}

impl InteractionKind {
    /// Widget an interaction of this kind operates, given the active layer.
    pub fn widget_key(self, active_layer: u8) -> WidgetKey {
        let (capability, kind, index) = match self {
            Self::ApplyGag => (Capability::Apply, SlotKind::Gag, active_layer),
            Self::LockGag | Self::UnlockGag => (Capability::Padlock, SlotKind::Gag, active_layer),
            Self::ApplyRestraint => (Capability::Apply, SlotKind::Restraint, 0),
            Self::LockRestraint | Self::UnlockRestraint => {
                (Capability::Padlock, SlotKind::Restraint, 0)
            },
            Self::ExecutePattern => (Capability::Execute, SlotKind::Pattern, 0),
            Self::ToggleAlarm => (Capability::Toggle, SlotKind::Alarm, 0),
            Self::ToggleTrigger => (Capability::Toggle, SlotKind::Trigger, 0),
        };
        WidgetKey::new(capability, SlotKey::new(kind, index))
    }
}

impl fmt::Display for InteractionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// The currently open interaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interaction {
    /// Peer whose widget is open.
    pub peer: PeerId,
    /// What is open.
    pub kind: InteractionKind,
}

/// Interaction cursor and active layer.
#[derive(Debug, Clone)]
pub struct Session {
    opened: Option<Interaction>,
    active_layer: usize,
    layer_count: usize,
}

impl Session {
    /// Session with nothing open and layer 0 active.
    pub fn new(layer_count: usize) -> Self {
        Self { opened: None, active_layer: 0, layer_count }
    }

    /// The open interaction, if any.
    pub fn opened(&self) -> Option<&Interaction> {
        self.opened.as_ref()
    }

    /// Index of the operative layer.
    pub fn active_layer(&self) -> usize {
        self.active_layer
    }

    /// Number of selectable layers.
    pub fn layer_count(&self) -> usize {
        self.layer_count
    }

    /// Make `index` the operative layer.
    ///
    /// Switching to a different layer closes the open interaction, which was
    /// scoped to the old layer. Returns whether the layer changed.
    pub fn select_layer(&mut self, index: usize) -> Result<bool, RegistryError> {
        if index >= self.layer_count {
            return Err(RegistryError::LayerOutOfRange { index, count: self.layer_count });
        }
        if index == self.active_layer {
            return Ok(false);
        }

        debug!(from = self.active_layer, to = index, "layer switched");
        self.active_layer = index;
        self.opened = None;
        Ok(true)
    }

    /// Open `kind` on `peer`, closing whatever was open before.
    ///
    /// Returns the interaction that was closed.
    pub fn open(&mut self, peer: PeerId, kind: InteractionKind) -> Option<Interaction> {
        self.opened.replace(Interaction { peer, kind })
    }

    /// Close the open interaction.
    pub fn close(&mut self) -> Option<Interaction> {
        self.opened.take()
    }

    /// Whether `kind` is open on `peer`.
    pub fn is_open(&self, peer: &PeerId, kind: InteractionKind) -> bool {
        self.opened.as_ref().is_some_and(|open| open.peer == *peer && open.kind == kind)
    }

    /// Close the open interaction if it belongs to `peer`.
    pub fn close_for_peer(&mut self, peer: &PeerId) -> Option<Interaction> {
        if self.opened.as_ref().is_some_and(|open| open.peer == *peer) {
            self.opened.take()
        } else {
            None
        }
    }
}
