//! Frame transcripts for the padlock and choice combos.
//!
//! A scripted renderer records every primitive a widget draws; the snapshots
//! pin the exact ids, labels and enabled states a host UI would see.

use padlock_app::{ChoiceSource, ItemSource, PeerComboRegistry, RegistryConfig, WidgetKey};
use padlock_core::{GagSlot, LockGrants, LockVariant, PeerId, SlotKind, Tooltips};
use padlock_harness::{DeferredDispatcher, PeerData, PeerStore, ScriptedRenderer, init_tracing};

const WIDTH: f32 = 200.0;
const LOCK_TIPS: Tooltips<'static> =
    Tooltips { combo: "Select a padlock", button: "Apply the selected padlock" };
const UNLOCK_TIPS: Tooltips<'static> =
    Tooltips { combo: "Active padlock", button: "Remove the padlock" };

fn setup() -> (PeerId, PeerComboRegistry, PeerStore, DeferredDispatcher) {
    init_tracing();
    let peer = PeerId::new("UID-7");
    let mut store = PeerStore::new();
    store.insert(peer.clone(), PeerData::new(1, &LockGrants::default()).with_gag(0, "Ball Gag"));
    let mut registry = PeerComboRegistry::new(RegistryConfig::default());
    registry.rebuild_for(&peer);
    (peer, registry, store, DeferredDispatcher::default())
}

fn gag<'s>(store: &'s PeerStore, peer: &PeerId) -> &'s GagSlot {
    let slot: Option<&GagSlot> = ItemSource::item(store, peer, 0);
    slot.unwrap()
}

#[test]
fn lock_combo_frames() {
    let (peer, mut registry, store, mut dispatcher) = setup();
    let mut renderer = ScriptedRenderer::new();
    let item = gag(&store, &peer).clone();
    let widget = registry.widgets_for_mut(&peer).unwrap().gag_padlock_mut(0).unwrap();

    let sent = widget
        .draw_lock_combo_with_active(&mut renderer, &item, &mut dispatcher, WIDTH, LOCK_TIPS)
        .unwrap();
    assert!(!sent);
    insta::assert_snapshot!(renderer.take_transcript(), @r#"
    read_only ##PadlockGag0-UID-7-ActiveDisplay "Ball Gag"
    combo ##PadlockGag0-UID-7-LockCombo [None] Combination Padlock | Password Padlock | Timer Password Padlock | Timer Padlock
    tooltip "Select a padlock"
    button ##PadlockGag0-UID-7-LockButton "Lock" (disabled)
    tooltip "Apply the selected padlock"
    "#);

    renderer.pick("##PadlockGag0-UID-7-LockCombo", 0);
    renderer.type_text("##PadlockGag0-UID-7-Combination_Input", "1234");
    let sent = widget
        .draw_lock_combo_with_active(&mut renderer, &item, &mut dispatcher, WIDTH, LOCK_TIPS)
        .unwrap();
    assert!(!sent);
    insta::assert_snapshot!(renderer.take_transcript(), @r#"
    read_only ##PadlockGag0-UID-7-ActiveDisplay "Ball Gag"
    combo ##PadlockGag0-UID-7-LockCombo [None] Combination Padlock | Password Padlock | Timer Password Padlock | Timer Padlock
    tooltip "Select a padlock"
    button ##PadlockGag0-UID-7-LockButton "Lock"
    tooltip "Apply the selected padlock"
    input ##PadlockGag0-UID-7-Combination_Input "Enter 4 digit combination..." = "1234"
    "#);

    renderer.press("##PadlockGag0-UID-7-LockButton");
    let sent = widget
        .draw_lock_combo_with_active(&mut renderer, &item, &mut dispatcher, WIDTH, LOCK_TIPS)
        .unwrap();
    assert!(sent);
    insta::assert_snapshot!(renderer.take_transcript(), @r#"
    read_only ##PadlockGag0-UID-7-ActiveDisplay "Ball Gag"
    combo ##PadlockGag0-UID-7-LockCombo [Combination Padlock] *Combination Padlock | Password Padlock | Timer Password Padlock | Timer Padlock
    tooltip "Select a padlock"
    button ##PadlockGag0-UID-7-LockButton "Lock" (pressed)
    tooltip "Apply the selected padlock"
    "#);
    assert_eq!(dispatcher.pending_len(), 1);
}

#[test]
fn unlock_combo_after_delivery() {
    let (peer, mut registry, mut store, mut dispatcher) = setup();
    let mut renderer = ScriptedRenderer::new();

    let widget = registry.widgets_for_mut(&peer).unwrap().gag_padlock_mut(0).unwrap();
    widget.select(LockVariant::Combination);
    widget.set_password("1234");
    registry.lock_active_gag(&peer, &store, &mut dispatcher).unwrap();
    dispatcher.deliver(&mut store);
    registry.observe(&peer, &store).unwrap();

    let item = gag(&store, &peer).clone();
    let widget = registry.widgets_for_mut(&peer).unwrap().gag_padlock_mut(0).unwrap();
    let sent = widget
        .draw_unlock_combo(&mut renderer, &item, &mut dispatcher, WIDTH, UNLOCK_TIPS)
        .unwrap();
    assert!(!sent);
    insta::assert_snapshot!(renderer.take_transcript(), @r#"
    read_only ##PadlockGag0-UID-7-DisplayLock "Combination Padlock"
    tooltip "Active padlock"
    button ##PadlockGag0-UID-7-UnlockButton "Unlock"
    tooltip "Remove the padlock"
    input ##PadlockGag0-UID-7-Combination_Input "Enter 4 digit combination..." = ""
    "#);
}

#[test]
fn alarm_toggle_frame() {
    let (peer, mut registry, store, mut dispatcher) = setup();
    let mut renderer = ScriptedRenderer::new();
    let choices = store.choices(&peer, SlotKind::Alarm);
    let tips = Tooltips { combo: "Pick an alarm", button: "Enable or disable it" };

    renderer.pick("##ToggleAlarm0-UID-7-Combo", 0);
    renderer.press("##ToggleAlarm0-UID-7-Enable");
    let widget = registry.widgets_for_mut(&peer).unwrap().choice_mut(&WidgetKey::alarm()).unwrap();
    let sent = widget.draw(&mut renderer, &choices, &mut dispatcher, WIDTH, tips).unwrap();

    assert!(sent);
    insta::assert_snapshot!(renderer.take_transcript(), @r#"
    combo ##ToggleAlarm0-UID-7-Combo [Select an item...] Morning | Evening
    tooltip "Pick an alarm"
    button ##ToggleAlarm0-UID-7-Enable "Enable" (pressed)
    button ##ToggleAlarm0-UID-7-Disable "Disable" (disabled)
    tooltip "Enable or disable it"
    "#);
    assert_eq!(dispatcher.pending_len(), 1);
}
