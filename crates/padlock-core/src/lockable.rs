//! Lockable item capability and item addressing.
//!
//! The data layer owns every lockable item. Widgets only ever hold an
//! [`ItemRef`] and re-fetch the item each frame, so whatever the data layer
//! reports is the truth.

use std::{fmt, time::Duration};

use serde::{Deserialize, Serialize};

use crate::variant::LockVariant;

/// Identity of a remote peer (their UID).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PeerId(String);

impl PeerId {
    /// Wrap a peer UID.
    pub fn new(uid: impl Into<String>) -> Self {
        Self(uid.into())
    }

    /// The peer UID.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Kind of slot a peer exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SlotKind {
    /// One of the layered gag slots.
    Gag,
    /// The restraint set slot.
    Restraint,
    /// Vibe pattern slot.
    Pattern,
    /// Alarm slot.
    Alarm,
    /// Trigger slot.
    Trigger,
}

impl fmt::Display for SlotKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Gag => "Gag",
            Self::Restraint => "Restraint",
            Self::Pattern => "Pattern",
            Self::Alarm => "Alarm",
            Self::Trigger => "Trigger",
        })
    }
}

/// Position of a slot within a peer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SlotKey {
    /// Slot kind.
    pub kind: SlotKind,
    /// Zero-based index among slots of the same kind.
    pub index: u8,
}

impl SlotKey {
    /// Slot key for `kind` at `index`.
    pub const fn new(kind: SlotKind, index: u8) -> Self {
        Self { kind, index }
    }
}

/// Lookup key for an item owned by the data layer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemRef {
    /// Owning peer.
    pub peer: PeerId,
    /// Slot on that peer.
    pub slot: SlotKey,
}

impl ItemRef {
    /// Reference the slot `slot` of `peer`.
    pub fn new(peer: PeerId, slot: SlotKey) -> Self {
        Self { peer, slot }
    }
}

/// Capability of an item that can carry a padlock.
///
/// Each concrete item kind decides which padlocks are permissible in its
/// current context (ownership, role, whether it is occupied). Callers must
/// ask again every frame; permissions change underneath the widget.
pub trait Lockable {
    /// Value displayed as the item's active state.
    type Active;

    /// Padlocks that may be applied right now.
    fn permitted_padlocks(&self) -> Vec<LockVariant>;

    /// Padlock currently applied, [`LockVariant::None`] when unlocked.
    fn active_padlock(&self) -> LockVariant;

    /// The item's active state.
    fn active_item(&self) -> Self::Active;

    /// Text shown in the read-only active item display.
    fn describe_active(&self) -> String;

    /// Longest timer the item accepts, if it limits timers at all.
    fn max_lock_duration(&self) -> Option<Duration> {
        None
    }
}
