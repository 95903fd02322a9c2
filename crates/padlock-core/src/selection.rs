//! Lock selection state machine.
//!
//! One [`LockSelection`] backs one padlock combo: it owns the transient edit
//! buffer and turns lock/unlock gestures into requests for a
//! [`Dispatcher`]. It never stores the item it operates on. Every call
//! takes the item freshly fetched from the data layer.
//!
//! # State Machine
//!
//! ```text
//!            select(v)             attempt_lock (valid, accepted)
//! ┌──────┐ ────────────> ┌───────────┐ ──────────────────────> ┌─────────────┐
//! │ Idle │               │ Selecting │                          │ Pending(v)  │
//! └──────┘ <──────────── └───────────┘ <─── dispatch failure    └─────────────┘
//!     ^      reset             │             (input retained)          │
//!     │                        │ validation failure: no change         │
//!     └──────────────────────────────────────── observe(item) ─────────┘
//! ```
//!
//! The pending lock lives beside the edit state, so reopening the combo or
//! picking another padlock while a request is in flight does not forget it.
//! The unlock path is tracked the same way: a dispatched unlock records the
//! padlock it targeted until [`LockSelection::observe`] sees the item
//! unlocked (or locked with something else).

use std::marker::PhantomData;

use tracing::{debug, trace, warn};

use crate::{
    buffer::EditBuffer,
    dispatch::Dispatcher,
    error::{PadlockError, ValidationError},
    lockable::{ItemRef, Lockable},
    render::{ComboOption, Renderer, Tooltips},
    request::{LockRequest, UnlockRequest},
    validate::{validate_lock, validate_unlock},
    variant::{FieldKind, FieldLayout, FieldRequirements, LockVariant},
};

/// Progress of the lock path.
///
/// Editing takes precedence: a widget the user is selecting in reports
/// [`LockPhase::Selecting`] even while an earlier request is unconfirmed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LockPhase {
    /// Nothing selected.
    #[default]
    Idle,
    /// A padlock is selected and its fields are editable.
    Selecting,
    /// A lock request went out and the item has not reflected it yet.
    Pending(LockVariant),
}

/// Result of comparing a pending request against the item's current state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Settlement {
    /// Nothing was pending.
    Nothing,
    /// The item does not reflect the request yet.
    Waiting,
    /// The item now shows the requested state.
    Confirmed(LockVariant),
    /// The item changed to something other than what was requested.
    Superseded {
        /// Padlock the request expected.
        expected: LockVariant,
        /// Padlock the item reports.
        observed: LockVariant,
    },
}

/// Edit state and lock workflow for one lockable item.
#[derive(Debug, Clone)]
pub struct LockSelection<T> {
    label: String,
    target: ItemRef,
    buffer: EditBuffer,
    /// Edit state only, never [`LockPhase::Pending`].
    phase: LockPhase,
    pending_lock: Option<LockVariant>,
    pending_unlock: Option<LockVariant>,
    /// Active padlock as of the last frame the item was looked at.
    shown: Option<LockVariant>,
    /// A request went out since the combo was last (re)opened.
    committed: bool,
    _item: PhantomData<fn(&T)>,
}

impl<T: Lockable> LockSelection<T> {
    /// Create a selection for the item at `target`.
    ///
    /// `label` must be unique among widgets rendered in the same frame; it
    /// scopes every id handed to the renderer.
    pub fn new(label: impl Into<String>, target: ItemRef) -> Self {
        Self {
            label: label.into(),
            target,
            buffer: EditBuffer::new(),
            phase: LockPhase::Idle,
            pending_lock: None,
            pending_unlock: None,
            shown: None,
            committed: false,
            _item: PhantomData,
        }
    }

    /// Identity string of this widget.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Item this widget operates on.
    pub fn target(&self) -> &ItemRef {
        &self.target
    }

    /// Current edit buffer.
    pub fn buffer(&self) -> &EditBuffer {
        &self.buffer
    }

    /// Candidate padlock.
    pub fn selected(&self) -> LockVariant {
        self.buffer.selected()
    }

    /// Lock path progress.
    pub fn phase(&self) -> LockPhase {
        match (self.phase, self.pending_lock) {
            (LockPhase::Idle, Some(variant)) => LockPhase::Pending(variant),
            (phase, _) => phase,
        }
    }

    /// Padlock targeted by an unconfirmed lock request.
    pub fn pending_lock(&self) -> Option<LockVariant> {
        self.pending_lock
    }

    /// Padlock targeted by an unconfirmed unlock request.
    pub fn pending_unlock(&self) -> Option<LockVariant> {
        self.pending_unlock
    }

    /// Padlocks the item permits right now.
    pub fn permissible_padlocks(&self, item: &T) -> Vec<LockVariant> {
        item.permitted_padlocks()
    }

    /// Inputs `variant` requires.
    pub fn required_fields(variant: LockVariant) -> FieldRequirements {
        variant.requirements()
    }

    /// Pick a candidate padlock.
    ///
    /// Picking [`LockVariant::None`] is a reset and drops typed text too.
    pub fn select(&mut self, variant: LockVariant) {
        if variant == LockVariant::None {
            self.reset_selection();
            return;
        }
        self.buffer.select(variant);
        self.phase = LockPhase::Selecting;
    }

    /// Replace the password text.
    pub fn set_password(&mut self, text: impl Into<String>) {
        self.buffer.set_password(text);
    }

    /// Replace the timer text.
    pub fn set_timer(&mut self, text: impl Into<String>) {
        self.buffer.set_timer(text);
    }

    /// Drop the selection and all typed text.
    ///
    /// A pending lock stays pending.
    pub fn reset_selection(&mut self) {
        trace!(label = %self.label, "selection reset");
        self.buffer.reset();
        self.phase = LockPhase::Idle;
    }

    /// Drop typed text but keep the selection.
    pub fn reset_inputs(&mut self) {
        self.buffer.clear_inputs();
    }

    /// Called when the owning interaction is opened.
    ///
    /// Starts from a clean selection if a request went out since the last
    /// open.
    pub fn reopen(&mut self) {
        if std::mem::take(&mut self.committed) {
            self.reset_selection();
        }
    }

    /// Fields to show under the lock combo.
    pub fn lock_fields(&self) -> FieldLayout {
        self.buffer.selected().lock_fields()
    }

    /// Fields to show under the unlock combo.
    pub fn unlock_fields(&self, item: &T) -> FieldLayout {
        item.active_padlock().unlock_fields()
    }

    /// Rows occupied by the lock combo with its active item display.
    pub fn lock_rows(&self) -> usize {
        if self.buffer.selected().is_two_row() { 3 } else { 2 }
    }

    /// Rows occupied by the unlock combo.
    pub fn unlock_rows(&self, item: &T) -> usize {
        if item.active_padlock().requires_password() { 2 } else { 1 }
    }

    /// Validate the buffer and dispatch a lock request.
    ///
    /// On validation failure nothing is dispatched and the buffer is left
    /// untouched. On dispatch failure the input is kept for another try. On
    /// success the selection resets and the lock is pending until
    /// [`Self::observe`] sees it.
    pub fn attempt_lock<D: Dispatcher + ?Sized>(
        &mut self,
        item: &T,
        dispatcher: &mut D,
    ) -> Result<(), PadlockError> {
        let variant = self.buffer.selected();
        if variant == LockVariant::None {
            return Err(ValidationError::NoLockSelected.into());
        }
        if !item.permitted_padlocks().contains(&variant) {
            return Err(ValidationError::NotPermitted { variant }.into());
        }

        let credentials = validate_lock(
            variant,
            self.buffer.password(),
            self.buffer.timer(),
            item.max_lock_duration(),
        )?;

        let request = LockRequest { target: self.target.clone(), variant, credentials };
        match dispatcher.send_lock_request(request) {
            Ok(()) => {
                debug!(label = %self.label, %variant, "lock request dispatched");
                self.reset_selection();
                self.pending_lock = Some(variant);
                self.committed = true;
                Ok(())
            },
            Err(err) => {
                warn!(label = %self.label, %variant, error = %err, "lock request failed");
                self.phase = LockPhase::Selecting;
                Err(err.into())
            },
        }
    }

    /// Dispatch an unlock request for the item's active padlock.
    ///
    /// Fails with [`PadlockError::StateMismatch`] when the active padlock
    /// differs from what the user was last shown; nothing is dispatched and
    /// the next attempt goes against the new padlock.
    pub fn attempt_unlock<D: Dispatcher + ?Sized>(
        &mut self,
        item: &T,
        dispatcher: &mut D,
    ) -> Result<(), PadlockError> {
        let current = item.active_padlock();
        if let Some(shown) = self.shown.replace(current)
            && shown != current
        {
            warn!(label = %self.label, %shown, %current, "padlock changed before unlock");
            return Err(PadlockError::StateMismatch { shown, current });
        }

        let credentials = validate_unlock(current, self.buffer.password())?;

        let request = UnlockRequest { target: self.target.clone(), variant: current, credentials };
        match dispatcher.send_unlock_request(request) {
            Ok(()) => {
                debug!(label = %self.label, variant = %current, "unlock request dispatched");
                self.buffer.clear_inputs();
                self.pending_unlock = Some(current);
                self.committed = true;
                Ok(())
            },
            Err(err) => {
                warn!(
                    label = %self.label,
                    variant = %current,
                    error = %err,
                    "unlock request failed"
                );
                Err(err.into())
            },
        }
    }

    /// Reconcile pending requests with the item's current state.
    ///
    /// Hosts call this once per frame with the freshly fetched item.
    pub fn observe(&mut self, item: &T) -> Settlement {
        let current = item.active_padlock();
        self.shown = Some(current);

        let settlement = match self.pending_lock {
            Some(expected) => {
                let settlement = settle(expected, current, current == expected);
                if settlement != Settlement::Waiting {
                    self.pending_lock = None;
                }
                settlement
            },
            None => Settlement::Nothing,
        };
        if settlement != Settlement::Nothing {
            return settlement;
        }

        match self.pending_unlock {
            Some(expected) => {
                let settlement = settle(expected, current, current == LockVariant::None);
                if settlement != Settlement::Waiting {
                    self.pending_unlock = None;
                }
                settlement
            },
            None => Settlement::Nothing,
        }
    }

    /// Draw the lock combo, its button and its fields.
    ///
    /// Returns true when a lock request was dispatched this frame.
    pub fn draw_lock_combo<R, D>(
        &mut self,
        renderer: &mut R,
        item: &T,
        dispatcher: &mut D,
        width: f32,
        tooltips: Tooltips<'_>,
    ) -> Result<bool, PadlockError>
    where
        R: Renderer + ?Sized,
        D: Dispatcher + ?Sized,
    {
        let padlocks = self.permissible_padlocks(item);
        let selected = self.buffer.selected();
        let options: Vec<ComboOption<'_>> = padlocks
            .iter()
            .map(|v| ComboOption { label: v.name(), selected: *v == selected })
            .collect();

        let id = format!("##{}-LockCombo", self.label);
        let response = renderer.combo(&id, width, selected.name(), &options);
        renderer.tooltip(tooltips.combo);
        if response.cleared {
            self.reset_selection();
        } else if let Some(variant) = response.picked.and_then(|i| padlocks.get(i).copied()) {
            self.select(variant);
        }

        let disabled = self.buffer.selected() == LockVariant::None;
        let pressed = renderer.button(&format!("##{}-LockButton", self.label), "Lock", disabled);
        renderer.tooltip(tooltips.button);
        let result = if pressed && !disabled {
            self.attempt_lock(item, dispatcher).map(|()| true)
        } else {
            Ok(false)
        };

        self.draw_fields(renderer, self.lock_fields());
        result
    }

    /// Draw the active item display followed by the lock combo.
    pub fn draw_lock_combo_with_active<R, D>(
        &mut self,
        renderer: &mut R,
        item: &T,
        dispatcher: &mut D,
        width: f32,
        tooltips: Tooltips<'_>,
    ) -> Result<bool, PadlockError>
    where
        R: Renderer + ?Sized,
        D: Dispatcher + ?Sized,
    {
        let active = item.describe_active();
        renderer.read_only(&format!("##{}-ActiveDisplay", self.label), width, &active);
        self.draw_lock_combo(renderer, item, dispatcher, width, tooltips)
    }

    /// Draw the active padlock display, the unlock button and its fields.
    ///
    /// Returns true when an unlock request was dispatched this frame.
    pub fn draw_unlock_combo<R, D>(
        &mut self,
        renderer: &mut R,
        item: &T,
        dispatcher: &mut D,
        width: f32,
        tooltips: Tooltips<'_>,
    ) -> Result<bool, PadlockError>
    where
        R: Renderer + ?Sized,
        D: Dispatcher + ?Sized,
    {
        let active = item.active_padlock();
        renderer.read_only(&format!("##{}-DisplayLock", self.label), width, active.name());
        renderer.tooltip(tooltips.combo);

        let disabled = active == LockVariant::None;
        let pressed =
            renderer.button(&format!("##{}-UnlockButton", self.label), "Unlock", disabled);
        renderer.tooltip(tooltips.button);
        let result = if pressed && !disabled {
            self.attempt_unlock(item, dispatcher).map(|()| true)
        } else {
            self.shown = Some(active);
            Ok(false)
        };

        self.draw_fields(renderer, self.unlock_fields(item));
        result
    }

    fn draw_fields<R: Renderer + ?Sized>(&mut self, renderer: &mut R, layout: FieldLayout) {
        for field in layout.fields() {
            let id = format!("##{}-{}", self.label, field.id);
            let buffer = match field.kind {
                FieldKind::Password => self.buffer.password_mut(),
                FieldKind::Timer => self.buffer.timer_mut(),
            };
            renderer.input_text(&id, &field, buffer);
        }
    }
}

fn settle(expected: LockVariant, current: LockVariant, done: bool) -> Settlement {
    if done {
        Settlement::Confirmed(expected)
    } else if current == expected || current == LockVariant::None {
        Settlement::Waiting
    } else {
        Settlement::Superseded { expected, observed: current }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        error::DispatchError,
        items::{GagSlot, LockGrants},
        lockable::{PeerId, SlotKey, SlotKind},
        request::{ApplyRequest, ToggleRequest},
    };

    #[derive(Default)]
    struct Recorder {
        locks: Vec<LockRequest>,
        unlocks: Vec<UnlockRequest>,
        fail_with: Option<DispatchError>,
    }

    impl Dispatcher for Recorder {
        fn send_lock_request(&mut self, request: LockRequest) -> Result<(), DispatchError> {
            if let Some(err) = self.fail_with.clone() {
                return Err(err);
            }
            self.locks.push(request);
            Ok(())
        }

        fn send_unlock_request(&mut self, request: UnlockRequest) -> Result<(), DispatchError> {
            if let Some(err) = self.fail_with.clone() {
                return Err(err);
            }
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

    fn selection() -> LockSelection<GagSlot> {
        LockSelection::new(
            "PadlockGag0-UID",
            ItemRef::new(PeerId::new("UID"), SlotKey::new(SlotKind::Gag, 0)),
        )
    }

    fn gagged() -> GagSlot {
        GagSlot::with_gag("Ball Gag", LockGrants::all())
    }

    #[test]
    fn combination_lock_dispatches_and_resets() {
        let mut widget = selection();
        let mut dispatcher = Recorder::default();

        widget.select(LockVariant::Combination);
        widget.set_password("1234");
        widget.attempt_lock(&gagged(), &mut dispatcher).unwrap();

        assert_eq!(dispatcher.locks.len(), 1);
        assert_eq!(dispatcher.locks[0].variant, LockVariant::Combination);
        assert_eq!(dispatcher.locks[0].credentials.password.as_deref(), Some("1234"));
        assert_eq!(dispatcher.locks[0].credentials.timer, None);
        assert!(widget.buffer().is_clear());
        assert_eq!(widget.phase(), LockPhase::Pending(LockVariant::Combination));
    }

    #[test]
    fn reset_inputs_keeps_selection() {
        let mut widget = selection();
        widget.select(LockVariant::TimerPassword);
        widget.set_password("hunter2");
        widget.set_timer("1h");

        widget.reset_inputs();
        assert_eq!(widget.selected(), LockVariant::TimerPassword);
        assert_eq!(widget.buffer().password(), "");
        assert_eq!(widget.buffer().timer(), "");

        let needs = LockSelection::<GagSlot>::required_fields(widget.selected());
        assert!(needs.needs_password && needs.needs_timer);
    }

    #[test]
    fn empty_password_blocks_dispatch() {
        let mut widget = selection();
        let mut dispatcher = Recorder::default();

        widget.select(LockVariant::Password);
        let err = widget.attempt_lock(&gagged(), &mut dispatcher).unwrap_err();

        assert!(matches!(err, PadlockError::Validation(ValidationError::MissingPassword { .. })));
        assert!(dispatcher.locks.is_empty());
        assert_eq!(widget.selected(), LockVariant::Password);
        assert_eq!(widget.phase(), LockPhase::Selecting);
    }

    #[test]
    fn dispatch_failure_keeps_input() {
        let mut widget = selection();
        let mut dispatcher =
            Recorder { fail_with: Some(DispatchError::Disconnected), ..Recorder::default() };

        widget.select(LockVariant::Password);
        widget.set_password("secret");
        let err = widget.attempt_lock(&gagged(), &mut dispatcher).unwrap_err();

        assert_eq!(err, PadlockError::Dispatch(DispatchError::Disconnected));
        assert!(!err.is_local());
        assert_eq!(widget.selected(), LockVariant::Password);
        assert_eq!(widget.buffer().password(), "secret");
        assert_eq!(widget.phase(), LockPhase::Selecting);
    }

    #[test]
    fn lock_requires_permission() {
        let mut widget = selection();
        let mut dispatcher = Recorder::default();
        let slot = GagSlot::with_gag("Ball Gag", LockGrants::default());

        widget.select(LockVariant::OwnerTimer);
        widget.set_timer("1h");
        let err = widget.attempt_lock(&slot, &mut dispatcher).unwrap_err();

        assert_eq!(
            err,
            PadlockError::Validation(ValidationError::NotPermitted {
                variant: LockVariant::OwnerTimer
            })
        );
        assert!(dispatcher.locks.is_empty());
    }

    #[test]
    fn unlock_timer_password_requires_password() {
        let mut widget = selection();
        let mut dispatcher = Recorder::default();
        let mut slot = gagged();
        slot.padlock = LockVariant::TimerPassword;

        let err = widget.attempt_unlock(&slot, &mut dispatcher).unwrap_err();
        assert!(matches!(err, PadlockError::Validation(ValidationError::MissingPassword { .. })));
        assert!(dispatcher.unlocks.is_empty());
    }

    #[test]
    fn unlock_timer_lock_needs_no_password() {
        let mut widget = selection();
        let mut dispatcher = Recorder::default();
        let mut slot = gagged();
        slot.padlock = LockVariant::Timer;

        widget.attempt_unlock(&slot, &mut dispatcher).unwrap();
        assert_eq!(dispatcher.unlocks[0].variant, LockVariant::Timer);
        assert_eq!(dispatcher.unlocks[0].credentials.password, None);
        assert_eq!(widget.pending_unlock(), Some(LockVariant::Timer));
    }

    #[test]
    fn unlock_detects_changed_padlock() {
        let mut widget = selection();
        let mut dispatcher = Recorder::default();
        let mut slot = gagged();
        slot.padlock = LockVariant::Password;
        widget.observe(&slot);

        slot.padlock = LockVariant::Combination;
        widget.set_password("secret");
        let err = widget.attempt_unlock(&slot, &mut dispatcher).unwrap_err();
        assert_eq!(
            err,
            PadlockError::StateMismatch {
                shown: LockVariant::Password,
                current: LockVariant::Combination
            }
        );
        assert!(dispatcher.unlocks.is_empty());
        assert_eq!(widget.buffer().password(), "secret");

        // Second attempt runs against the new padlock.
        widget.set_password("4321");
        widget.attempt_unlock(&slot, &mut dispatcher).unwrap();
        assert_eq!(dispatcher.unlocks[0].variant, LockVariant::Combination);
    }

    #[test]
    fn observe_settles_pending_lock() {
        let mut widget = selection();
        let mut dispatcher = Recorder::default();
        let mut slot = gagged();

        widget.select(LockVariant::Timer);
        widget.set_timer("10m");
        widget.attempt_lock(&slot, &mut dispatcher).unwrap();
        assert_eq!(widget.observe(&slot), Settlement::Waiting);

        slot.padlock = LockVariant::Timer;
        assert_eq!(widget.observe(&slot), Settlement::Confirmed(LockVariant::Timer));
        assert_eq!(widget.phase(), LockPhase::Idle);
        assert_eq!(widget.observe(&slot), Settlement::Nothing);
    }

    #[test]
    fn observe_reports_superseded_lock() {
        let mut widget = selection();
        let mut dispatcher = Recorder::default();
        let mut slot = gagged();

        widget.select(LockVariant::Timer);
        widget.set_timer("10m");
        widget.attempt_lock(&slot, &mut dispatcher).unwrap();

        slot.padlock = LockVariant::Password;
        assert_eq!(
            widget.observe(&slot),
            Settlement::Superseded { expected: LockVariant::Timer, observed: LockVariant::Password }
        );
        assert_eq!(widget.phase(), LockPhase::Idle);
    }

    #[test]
    fn observe_settles_pending_unlock() {
        let mut widget = selection();
        let mut dispatcher = Recorder::default();
        let mut slot = gagged();
        slot.padlock = LockVariant::Password;

        widget.set_password("secret");
        widget.attempt_unlock(&slot, &mut dispatcher).unwrap();
        assert!(widget.buffer().password().is_empty());
        assert_eq!(widget.observe(&slot), Settlement::Waiting);

        slot.padlock = LockVariant::None;
        assert_eq!(widget.observe(&slot), Settlement::Confirmed(LockVariant::Password));
        assert_eq!(widget.pending_unlock(), None);
    }

    #[test]
    fn reopen_resets_only_after_commit() {
        let mut widget = selection();
        let mut dispatcher = Recorder::default();

        widget.select(LockVariant::Password);
        widget.reopen();
        assert_eq!(widget.selected(), LockVariant::Password);

        widget.set_password("secret");
        widget.attempt_lock(&gagged(), &mut dispatcher).unwrap();
        widget.select(LockVariant::Timer);
        widget.reopen();
        assert_eq!(widget.selected(), LockVariant::None);
    }

    #[test]
    fn pending_lock_survives_reopen_and_reselect() {
        let mut widget = selection();
        let mut dispatcher = Recorder::default();
        let mut slot = gagged();

        widget.select(LockVariant::Combination);
        widget.set_password("1234");
        widget.attempt_lock(&slot, &mut dispatcher).unwrap();
        widget.reopen();
        assert_eq!(widget.phase(), LockPhase::Pending(LockVariant::Combination));

        widget.select(LockVariant::Timer);
        assert_eq!(widget.phase(), LockPhase::Selecting);
        assert_eq!(widget.pending_lock(), Some(LockVariant::Combination));

        slot.padlock = LockVariant::Combination;
        assert_eq!(widget.observe(&slot), Settlement::Confirmed(LockVariant::Combination));
        assert_eq!(widget.pending_lock(), None);
        assert_eq!(widget.phase(), LockPhase::Selecting);
    }

    #[test]
    fn selecting_none_clears_typed_text() {
        let mut widget = selection();
        widget.select(LockVariant::TimerPassword);
        widget.set_password("secret");
        widget.set_timer("1h");

        widget.select(LockVariant::None);
        assert!(widget.buffer().is_clear());
        assert_eq!(widget.phase(), LockPhase::Idle);
    }

    #[test]
    fn row_counts_follow_selection() {
        let mut widget = selection();
        assert_eq!(widget.lock_rows(), 2);
        widget.select(LockVariant::Timer);
        assert_eq!(widget.lock_rows(), 3);

        let mut slot = gagged();
        assert_eq!(widget.unlock_rows(&slot), 1);
        slot.padlock = LockVariant::Combination;
        assert_eq!(widget.unlock_rows(&slot), 2);
    }
}
