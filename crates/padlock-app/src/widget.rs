//! Widget instances and the per-peer widget set.
//!
//! A [`WidgetSet`] maps `(capability, slot)` to one widget instance. Sets are
//! only ever built whole and replaced whole; nothing mutates which widgets a
//! set contains after construction.

use std::{collections::BTreeMap, fmt};

use padlock_core::{GagSlot, ItemRef, LockSelection, PeerId, RestraintSet, SlotKey, SlotKind};

use crate::{choice::ChoiceSelection, config::RegistryConfig};

/// What a widget does with its slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Capability {
    /// Pick a gag or restraint set to apply.
    Apply,
    /// Lock and unlock the slot's item.
    Padlock,
    /// Pick a pattern to run.
    Execute,
    /// Enable or disable an alarm or trigger.
    Toggle,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Apply => "Apply",
            Self::Padlock => "Padlock",
            Self::Execute => "Execute",
            Self::Toggle => "Toggle",
        })
    }
}

/// Address of a widget within a peer's set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WidgetKey {
    /// Widget capability.
    pub capability: Capability,
    /// Slot it operates on.
    pub slot: SlotKey,
}

impl WidgetKey {
    /// Key for `capability` on `slot`.
    pub const fn new(capability: Capability, slot: SlotKey) -> Self {
        Self { capability, slot }
    }

    /// Padlock widget of gag layer `layer`.
    pub const fn gag_padlock(layer: u8) -> Self {
        Self::new(Capability::Padlock, SlotKey::new(SlotKind::Gag, layer))
    }

    /// Apply widget of gag layer `layer`.
    pub const fn gag_apply(layer: u8) -> Self {
        Self::new(Capability::Apply, SlotKey::new(SlotKind::Gag, layer))
    }

    /// Padlock widget of the restraint set.
    pub const fn restraint_padlock() -> Self {
        Self::new(Capability::Padlock, SlotKey::new(SlotKind::Restraint, 0))
    }

    /// Apply widget of the restraint set.
    pub const fn restraint_apply() -> Self {
        Self::new(Capability::Apply, SlotKey::new(SlotKind::Restraint, 0))
    }

    /// Pattern execution widget.
    pub const fn pattern() -> Self {
        Self::new(Capability::Execute, SlotKey::new(SlotKind::Pattern, 0))
    }

    /// Alarm toggle widget.
    pub const fn alarm() -> Self {
        Self::new(Capability::Toggle, SlotKey::new(SlotKind::Alarm, 0))
    }

    /// Trigger toggle widget.
    pub const fn trigger() -> Self {
        Self::new(Capability::Toggle, SlotKey::new(SlotKind::Trigger, 0))
    }

    /// Identity string used to scope the widget's input ids.
    pub fn identity(&self, peer: &PeerId) -> String {
        format!("{self}-{peer}")
    }
}

impl fmt::Display for WidgetKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.capability, self.slot.kind, self.slot.index)
    }
}

/// One widget instance.
#[derive(Debug, Clone)]
pub enum Widget {
    /// Padlock combo of a gag slot.
    GagPadlock(LockSelection<GagSlot>),
    /// Padlock combo of the restraint set.
    RestraintPadlock(LockSelection<RestraintSet>),
    /// Apply, execute or toggle combo.
    Choice(ChoiceSelection),
}

impl Widget {
    /// Identity string of the widget.
    pub fn label(&self) -> &str {
        match self {
            Self::GagPadlock(selection) => selection.label(),
            Self::RestraintPadlock(selection) => selection.label(),
            Self::Choice(choice) => choice.label(),
        }
    }

    /// Notify the widget that its interaction was opened.
    pub fn reopen(&mut self) {
        match self {
            Self::GagPadlock(selection) => selection.reopen(),
            Self::RestraintPadlock(selection) => selection.reopen(),
            Self::Choice(choice) => choice.reopen(),
        }
    }

    /// Whether the widget has no pending user input.
    pub fn is_pristine(&self) -> bool {
        match self {
            Self::GagPadlock(selection) => selection.buffer().is_clear(),
            Self::RestraintPadlock(selection) => selection.buffer().is_clear(),
            Self::Choice(choice) => choice.selected().is_none(),
        }
    }
}

/// All widgets built for one peer.
#[derive(Debug, Clone)]
pub struct WidgetSet {
    peer: PeerId,
    widgets: BTreeMap<WidgetKey, Widget>,
}

impl WidgetSet {
    /// Build a fresh widget for every slot `config` describes.
    pub fn build(peer: &PeerId, config: &RegistryConfig) -> Self {
        let mut widgets = BTreeMap::new();
        let mut add = |key: WidgetKey, make: fn(String, ItemRef, Capability) -> Widget| {
            let target = ItemRef::new(peer.clone(), key.slot);
            widgets.insert(key, make(key.identity(peer), target, key.capability));
        };

        for layer in 0..config.gag_layers {
            add(WidgetKey::gag_apply(layer), choice_widget);
            add(WidgetKey::gag_padlock(layer), |label, target, _| {
                Widget::GagPadlock(LockSelection::new(label, target))
            });
        }
        add(WidgetKey::restraint_apply(), choice_widget);
        add(WidgetKey::restraint_padlock(), |label, target, _| {
            Widget::RestraintPadlock(LockSelection::new(label, target))
        });
        add(WidgetKey::pattern(), choice_widget);
        add(WidgetKey::alarm(), choice_widget);
        add(WidgetKey::trigger(), choice_widget);

        Self { peer: peer.clone(), widgets }
    }

    /// Peer the set belongs to.
    pub fn peer(&self) -> &PeerId {
        &self.peer
    }

    /// Number of widgets.
    pub fn len(&self) -> usize {
        self.widgets.len()
    }

    /// Whether the set holds no widgets.
    pub fn is_empty(&self) -> bool {
        self.widgets.is_empty()
    }

    /// Widgets in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&WidgetKey, &Widget)> {
        self.widgets.iter()
    }

    /// Widget under `key`.
    pub fn get(&self, key: &WidgetKey) -> Option<&Widget> {
        self.widgets.get(key)
    }

    /// Mutable widget under `key`.
    pub fn get_mut(&mut self, key: &WidgetKey) -> Option<&mut Widget> {
        self.widgets.get_mut(key)
    }

    /// Padlock combo of gag layer `layer`.
    pub fn gag_padlock(&self, layer: u8) -> Option<&LockSelection<GagSlot>> {
        match self.widgets.get(&WidgetKey::gag_padlock(layer)) {
            Some(Widget::GagPadlock(selection)) => Some(selection),
            _ => None,
        }
    }

    /// Mutable padlock combo of gag layer `layer`.
    pub fn gag_padlock_mut(&mut self, layer: u8) -> Option<&mut LockSelection<GagSlot>> {
        match self.widgets.get_mut(&WidgetKey::gag_padlock(layer)) {
            Some(Widget::GagPadlock(selection)) => Some(selection),
            _ => None,
        }
    }

    /// Padlock combo of the restraint set.
    pub fn restraint_padlock(&self) -> Option<&LockSelection<RestraintSet>> {
        match self.widgets.get(&WidgetKey::restraint_padlock()) {
            Some(Widget::RestraintPadlock(selection)) => Some(selection),
            _ => None,
        }
    }

    /// Mutable padlock combo of the restraint set.
    pub fn restraint_padlock_mut(&mut self) -> Option<&mut LockSelection<RestraintSet>> {
        match self.widgets.get_mut(&WidgetKey::restraint_padlock()) {
            Some(Widget::RestraintPadlock(selection)) => Some(selection),
            _ => None,
        }
    }

    /// Choice widget under `key`.
    pub fn choice(&self, key: &WidgetKey) -> Option<&ChoiceSelection> {
        match self.widgets.get(key) {
            Some(Widget::Choice(choice)) => Some(choice),
            _ => None,
        }
    }

    /// Mutable choice widget under `key`.
    pub fn choice_mut(&mut self, key: &WidgetKey) -> Option<&mut ChoiceSelection> {
        match self.widgets.get_mut(key) {
            Some(Widget::Choice(choice)) => Some(choice),
            _ => None,
        }
    }
}

fn choice_widget(label: String, target: ItemRef, capability: Capability) -> Widget {
    Widget::Choice(ChoiceSelection::new(label, target, capability))
}
