//! Request payloads handed to a [`crate::Dispatcher`].
//!
//! These types only describe intent. How they reach the peer, and how the
//! peer's answer flows back into the data layer, is up to the dispatcher.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{lockable::ItemRef, variant::LockVariant};

/// Validated input accompanying a lock or unlock request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    /// Password or combination, present only when the variant needs one.
    pub password: Option<String>,
    /// Parsed timer, present only when the variant needs one.
    pub timer: Option<Duration>,
}

/// Apply a padlock to an item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockRequest {
    /// Item to lock.
    pub target: ItemRef,
    /// Padlock to apply.
    pub variant: LockVariant,
    /// Inputs the variant requires.
    pub credentials: Credentials,
}

/// Remove the active padlock from an item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnlockRequest {
    /// Item to unlock.
    pub target: ItemRef,
    /// Padlock the item was showing when the request was made.
    pub variant: LockVariant,
    /// Password, if the padlock needs one.
    pub credentials: Credentials,
}

/// Apply a gag or restraint set, or execute a pattern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplyRequest {
    /// Slot receiving the choice.
    pub target: ItemRef,
    /// Id of the chosen gag, set or pattern.
    pub choice: String,
}

/// Enable or disable an alarm or trigger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToggleRequest {
    /// Slot owning the alarm or trigger.
    pub target: ItemRef,
    /// Id of the alarm or trigger.
    pub choice: String,
    /// New state.
    pub enable: bool,
}
