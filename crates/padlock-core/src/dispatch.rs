//! Dispatcher trait for abstracting the network client.
//!
//! Widgets never talk to the network themselves. They hand validated
//! requests to a [`Dispatcher`], which queues them and returns at once. The
//! eventual outcome arrives by the data layer updating the item, which the
//! widget observes on a later frame.

use crate::{
    error::DispatchError,
    request::{ApplyRequest, LockRequest, ToggleRequest, UnlockRequest},
};

/// Sends requests towards peers.
///
/// Implementations must not block. `Ok(())` means the request was accepted
/// for delivery, not that the peer applied it.
pub trait Dispatcher {
    /// Queue a lock request.
    ///
    /// # Errors
    ///
    /// Returns an error if the request cannot be queued or is refused.
    fn send_lock_request(&mut self, request: LockRequest) -> Result<(), DispatchError>;

    /// Queue an unlock request.
    ///
    /// # Errors
    ///
    /// Returns an error if the request cannot be queued or is refused.
    fn send_unlock_request(&mut self, request: UnlockRequest) -> Result<(), DispatchError>;

    /// Queue an apply (or execute) request.
    ///
    /// # Errors
    ///
    /// Returns an error if the request cannot be queued or is refused.
    fn send_apply_request(&mut self, request: ApplyRequest) -> Result<(), DispatchError>;

    /// Queue an enable/disable request.
    ///
    /// # Errors
    ///
    /// Returns an error if the request cannot be queued or is refused.
    fn send_toggle_request(&mut self, request: ToggleRequest) -> Result<(), DispatchError>;
}

impl<D: Dispatcher + ?Sized> Dispatcher for &mut D {
    fn send_lock_request(&mut self, request: LockRequest) -> Result<(), DispatchError> {
        (**self).send_lock_request(request)
    }

    fn send_unlock_request(&mut self, request: UnlockRequest) -> Result<(), DispatchError> {
        (**self).send_unlock_request(request)
    }

    fn send_apply_request(&mut self, request: ApplyRequest) -> Result<(), DispatchError> {
        (**self).send_apply_request(request)
    }

    fn send_toggle_request(&mut self, request: ToggleRequest) -> Result<(), DispatchError> {
        (**self).send_toggle_request(request)
    }
}
