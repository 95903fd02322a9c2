//! Registry error types.

use padlock_core::{DispatchError, PadlockError, PeerId, SlotKey};
use thiserror::Error;

use crate::widget::{Capability, WidgetKey};

/// Errors returned by the registry and its choice widgets.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// Layer index outside `[0, count)`.
    #[error("layer {index} out of range ({count} layers)")]
    LayerOutOfRange {
        /// Requested layer.
        index: usize,
        /// Number of layers.
        count: usize,
    },

    /// No widget set was built for the peer.
    #[error("no widgets built for peer {0}")]
    UnknownPeer(PeerId),

    /// The peer's widget set has no widget under this key.
    #[error("no widget {0}")]
    UnknownWidget(WidgetKey),

    /// The widget exists but cannot perform the operation.
    #[error("widget {key} cannot {wanted}")]
    WrongCapability {
        /// Widget addressed.
        key: WidgetKey,
        /// Capability the operation needs.
        wanted: Capability,
    },

    /// The data layer has no item for the slot.
    #[error("no item in {slot:?} for peer {peer}")]
    ItemUnavailable {
        /// Peer queried.
        peer: PeerId,
        /// Slot queried.
        slot: SlotKey,
    },

    /// Confirm pressed with nothing selected.
    #[error("nothing selected")]
    NoChoiceSelected,

    /// The selected choice is no longer offered.
    #[error("choice {0:?} is not available")]
    UnknownChoice(String),

    /// The choice already has the requested enabled state.
    #[error("choice {id:?} is already {}", state_name(.enabled))]
    ToggleUnchanged {
        /// Choice id.
        id: String,
        /// Its current state.
        enabled: bool,
    },

    /// A padlock widget operation failed.
    #[error(transparent)]
    Padlock(#[from] PadlockError),

    /// The dispatcher refused a choice request.
    #[error(transparent)]
    Dispatch(#[from] DispatchError),
}

fn state_name(enabled: &bool) -> &'static str {
    if *enabled { "enabled" } else { "disabled" }
}
