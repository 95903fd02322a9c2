//! Data layer contracts.
//!
//! The registry never caches items or choice lists; it asks these sources
//! every time it needs them.

use padlock_core::{PeerId, SlotKind};

/// Looks up the current item of kind `T` for a peer's slot.
pub trait ItemSource<T> {
    /// Current item at `index`, `None` if the peer or slot is unknown.
    fn item(&self, peer: &PeerId, index: u8) -> Option<&T>;
}

/// Something a choice widget can pick: a gag, set, pattern, alarm or trigger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Choice {
    /// Stable id sent in requests.
    pub id: String,
    /// Text shown in the combo.
    pub label: String,
    /// Whether the choice is currently active (applied, running, enabled).
    pub enabled: bool,
}

impl Choice {
    /// Inactive choice whose label is its id.
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        Self { label: id.clone(), id, enabled: false }
    }

    /// Set the enabled state.
    #[must_use]
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }
}

/// Lists the choices a peer offers for a slot kind.
pub trait ChoiceSource {
    /// Choices for `kind` on `peer`; empty if the peer is unknown.
    fn choices(&self, peer: &PeerId, kind: SlotKind) -> Vec<Choice>;
}
