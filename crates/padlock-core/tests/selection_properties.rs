//! Property tests for the lock selection state machine.
//!
//! Random selections and inputs are driven through a [`LockSelection`] and
//! checked against the invariants every padlock combo must keep: fields
//! follow variant metadata, resets leave nothing behind, and invalid input
//! never reaches the dispatcher.

use padlock_core::{
    ApplyRequest, DispatchError, Dispatcher, GagSlot, ItemRef, LockGrants, LockRequest,
    LockSelection, LockVariant, PadlockError, PeerId, SlotKey, SlotKind, ToggleRequest,
    UnlockRequest,
};
use proptest::prelude::*;

#[derive(Default)]
struct CountingDispatcher {
    locks: Vec<LockRequest>,
    unlocks: Vec<UnlockRequest>,
}

impl Dispatcher for CountingDispatcher {
    fn send_lock_request(&mut self, request: LockRequest) -> Result<(), DispatchError> {
        self.locks.push(request);
        Ok(())
    }

    fn send_unlock_request(&mut self, request: UnlockRequest) -> Result<(), DispatchError> {
        self.unlocks.push(request);
        Ok(())
    }

    fn send_apply_request(&mut self, _request: ApplyRequest) -> Result<(), DispatchError> {
        Ok(())
    }

    fn send_toggle_request(&mut self, _request: ToggleRequest) -> Result<(), DispatchError> {
        Ok(())
    }
}

fn widget() -> LockSelection<GagSlot> {
    LockSelection::new(
        "PadlockGag0-UID",
        ItemRef::new(PeerId::new("UID"), SlotKey::new(SlotKind::Gag, 0)),
    )
}

fn variant_strategy() -> impl Strategy<Value = LockVariant> {
    prop::sample::select(LockVariant::ALL.to_vec())
}

fn text_strategy() -> impl Strategy<Value = String> {
    prop_oneof![Just(String::new()), "[0-9]{4}", "[a-z0-9]{1,24}", "[0-9]{1,2}h[0-9]{1,2}m"]
}

proptest! {
    /// Variants without password or timer needs never ask for input.
    #[test]
    fn prop_inputless_variants_render_no_fields(variant in variant_strategy()) {
        let mut selection = widget();
        selection.select(variant);

        let mut slot = GagSlot::with_gag("Ball Gag", LockGrants::all());
        slot.padlock = variant;

        if !variant.requires_password() && !variant.requires_timer() {
            prop_assert_eq!(selection.lock_fields().field_count(), 0);
        }
        if !variant.requires_password() {
            prop_assert_eq!(selection.unlock_fields(&slot).field_count(), 0);
        }
    }

    /// A reset always leaves an empty buffer behind.
    #[test]
    fn prop_reset_clears_buffer(
        variant in variant_strategy(),
        password in text_strategy(),
        timer in text_strategy(),
    ) {
        let mut selection = widget();
        selection.select(variant);
        selection.set_password(password);
        selection.set_timer(timer);

        selection.reset_selection();
        prop_assert_eq!(selection.selected(), LockVariant::None);
        prop_assert!(selection.buffer().password().is_empty());
        prop_assert!(selection.buffer().timer().is_empty());
        prop_assert_eq!(selection.lock_fields().field_count(), 0);
    }

    /// Either a lock goes out and the buffer resets, or nothing goes out and
    /// the buffer is exactly as the user left it.
    #[test]
    fn prop_validation_gates_dispatch(
        variant in variant_strategy(),
        password in text_strategy(),
        timer in text_strategy(),
    ) {
        let slot = GagSlot::with_gag("Ball Gag", LockGrants::all());
        let mut selection = widget();
        let mut dispatcher = CountingDispatcher::default();
        selection.select(variant);
        selection.set_password(password.clone());
        selection.set_timer(timer.clone());
        let before = selection.buffer().clone();

        match selection.attempt_lock(&slot, &mut dispatcher) {
            Ok(()) => {
                prop_assert_eq!(dispatcher.locks.len(), 1);
                prop_assert_eq!(dispatcher.locks[0].variant, variant);
                prop_assert!(selection.buffer().is_clear());
            },
            Err(err) => {
                prop_assert!(matches!(err, PadlockError::Validation(_)));
                prop_assert!(dispatcher.locks.is_empty());
                prop_assert_eq!(selection.buffer(), &before);
            },
        }
    }

    /// Only the inputs a variant requires travel with the request.
    #[test]
    fn prop_request_carries_required_inputs_only(
        variant in variant_strategy(),
        password in text_strategy(),
        timer in text_strategy(),
    ) {
        let slot = GagSlot::with_gag("Ball Gag", LockGrants::all());
        let mut selection = widget();
        let mut dispatcher = CountingDispatcher::default();
        selection.select(variant);
        selection.set_password(password);
        selection.set_timer(timer);

        if selection.attempt_lock(&slot, &mut dispatcher).is_ok() {
            let request = &dispatcher.locks[0];
            prop_assert_eq!(request.credentials.password.is_some(), variant.requires_password());
            prop_assert_eq!(request.credentials.timer.is_some(), variant.requires_timer());
        }
    }
}

#[test]
fn two_successful_locks_never_share_text() {
    let mut dispatcher = CountingDispatcher::default();
    let slot = GagSlot::with_gag("Ball Gag", LockGrants::all());
    let mut selection = widget();

    selection.select(LockVariant::Password);
    selection.set_password("first");
    selection.attempt_lock(&slot, &mut dispatcher).unwrap();

    selection.select(LockVariant::Password);
    let err = selection.attempt_lock(&slot, &mut dispatcher).unwrap_err();
    assert!(matches!(err, PadlockError::Validation(_)));
    assert_eq!(dispatcher.locks.len(), 1);
}

#[test]
fn unlock_with_empty_password_is_not_dispatched() {
    let mut dispatcher = CountingDispatcher::default();
    let mut slot = GagSlot::with_gag("Ball Gag", LockGrants::all());
    slot.padlock = LockVariant::TimerPassword;
    let mut selection = widget();

    let err = selection.attempt_unlock(&slot, &mut dispatcher).unwrap_err();
    assert!(matches!(err, PadlockError::Validation(_)));
    assert!(dispatcher.unlocks.is_empty());
}
