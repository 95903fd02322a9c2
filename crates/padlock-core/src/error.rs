//! Error types for padlock selection.
//!
//! Every error here is scoped to a single widget and recoverable by the user
//! retrying; none of them should tear down the host.

use std::time::Duration;

use thiserror::Error;

use crate::variant::LockVariant;

/// Input rejected locally before anything is dispatched.
///
/// The widget keeps its edit buffer untouched so the user can correct it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Lock attempted with no padlock selected.
    #[error("no padlock selected")]
    NoLockSelected,

    /// The selected padlock is not permitted on the item any more.
    #[error("{variant} is not permitted on this item")]
    NotPermitted {
        /// The rejected selection.
        variant: LockVariant,
    },

    /// Password required but empty.
    #[error("{variant} requires a password")]
    MissingPassword {
        /// Variant demanding the password.
        variant: LockVariant,
    },

    /// Password longer than the field cap.
    #[error("password is {len} bytes, limit is {max}")]
    PasswordTooLong {
        /// Supplied length in bytes.
        len: usize,
        /// Permitted length in bytes.
        max: usize,
    },

    /// Combination is not exactly four ASCII digits.
    #[error("combination must be exactly 4 digits")]
    MalformedCombination,

    /// Timer required but empty.
    #[error("{variant} requires a timer")]
    MissingTimer {
        /// Variant demanding the timer.
        variant: LockVariant,
    },

    /// Timer text longer than the field cap.
    #[error("timer is {len} bytes, limit is {max}")]
    TimerTooLong {
        /// Supplied length in bytes.
        len: usize,
        /// Permitted length in bytes.
        max: usize,
    },

    /// Timer text does not parse.
    #[error("timer {text:?} is not of the form 0h2m7s")]
    MalformedTimer {
        /// The offending text.
        text: String,
    },

    /// Timer parses to zero length.
    #[error("timer must be longer than zero")]
    ZeroTimer,

    /// Timer longer than the item permits.
    #[error("timer of {requested:?} exceeds the permitted {limit:?}")]
    TimerExceedsLimit {
        /// Parsed timer.
        requested: Duration,
        /// Item's maximum.
        limit: Duration,
    },

    /// Unlock attempted on an item without a padlock.
    #[error("item is not locked")]
    NotLocked,
}

/// Failure reported by a [`crate::Dispatcher`].
///
/// Surfaced to the caller as a transient failure. Nothing retries
/// automatically.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    /// No connection to the server.
    #[error("not connected")]
    Disconnected,

    /// Remote side refused the request.
    #[error("request rejected: {reason}")]
    Rejected {
        /// Reason given by the remote side.
        reason: String,
    },

    /// Outgoing queue cannot take more requests this frame.
    #[error("outgoing request queue is full")]
    QueueFull,
}

/// Errors returned by lock selection operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PadlockError {
    /// Input failed local validation; nothing was dispatched.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The dispatcher refused or failed the request.
    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    /// The active padlock changed since it was last shown to the user.
    ///
    /// Nothing was dispatched; the next render shows the new padlock.
    #[error("active padlock changed from {shown} to {current}")]
    StateMismatch {
        /// Padlock the user was looking at.
        shown: LockVariant,
        /// Padlock the item reports now.
        current: LockVariant,
    },
}

impl PadlockError {
    /// Whether the error was raised before dispatching.
    pub fn is_local(&self) -> bool {
        !matches!(self, Self::Dispatch(_))
    }
}
