//! Concrete lockable item kinds.
//!
//! Snapshots of a peer's gag slots and restraint set as reported by the data
//! layer, together with the lock grants that peer has given us for that kind
//! of item.

use std::time::Duration;

use crate::{lockable::Lockable, variant::LockVariant};

/// What a peer allows us to do with padlocks on one kind of item.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LockGrants {
    /// Owner-only padlocks may be applied.
    pub owner_locks: bool,
    /// Devotional padlocks may be applied.
    pub devotional_locks: bool,
    /// Longest timer accepted, `None` for no limit.
    pub max_duration: Option<Duration>,
}

impl LockGrants {
    /// Every padlock, unlimited timers.
    pub fn all() -> Self {
        Self { owner_locks: true, devotional_locks: true, max_duration: None }
    }

    fn permits(&self, variant: LockVariant) -> bool {
        match variant {
            LockVariant::None => false,
            LockVariant::OwnerTimer => self.owner_locks,
            LockVariant::DevotionalTimer => self.devotional_locks,
            _ => true,
        }
    }

    fn permitted(&self) -> Vec<LockVariant> {
        LockVariant::ALL.into_iter().filter(|v| self.permits(*v)).collect()
    }
}

/// One layered gag slot on a peer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GagSlot {
    /// Name of the applied gag, `None` when the slot is empty.
    pub gag: Option<String>,
    /// Applied padlock.
    pub padlock: LockVariant,
    /// UID of whoever applied the padlock.
    pub assigner: Option<String>,
    /// Gag lock grants of the peer.
    pub grants: LockGrants,
}

impl GagSlot {
    /// Slot holding `gag`, unlocked.
    pub fn with_gag(gag: impl Into<String>, grants: LockGrants) -> Self {
        Self { gag: Some(gag.into()), padlock: LockVariant::None, assigner: None, grants }
    }
}

impl Lockable for GagSlot {
    type Active = Option<String>;

    /// Empty or already locked slots accept no padlock.
    fn permitted_padlocks(&self) -> Vec<LockVariant> {
        if self.gag.is_none() || self.padlock != LockVariant::None {
            return Vec::new();
        }
        self.grants.permitted()
    }

    fn active_padlock(&self) -> LockVariant {
        self.padlock
    }

    fn active_item(&self) -> Option<String> {
        self.gag.clone()
    }

    fn describe_active(&self) -> String {
        self.gag.clone().unwrap_or_else(|| "None".to_string())
    }

    fn max_lock_duration(&self) -> Option<Duration> {
        self.grants.max_duration
    }
}

/// The restraint set slot on a peer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RestraintSet {
    /// Name of the active set, `None` when no set is applied.
    pub set: Option<String>,
    /// Applied padlock.
    pub padlock: LockVariant,
    /// UID of whoever enabled the set.
    pub enabled_by: Option<String>,
    /// Restraint lock grants of the peer.
    pub grants: LockGrants,
}

impl RestraintSet {
    /// Slot with `set` active, unlocked.
    pub fn with_set(set: impl Into<String>, grants: LockGrants) -> Self {
        Self { set: Some(set.into()), padlock: LockVariant::None, enabled_by: None, grants }
    }
}

impl Lockable for RestraintSet {
    type Active = Option<String>;

    fn permitted_padlocks(&self) -> Vec<LockVariant> {
        if self.set.is_none() || self.padlock != LockVariant::None {
            return Vec::new();
        }
        self.grants.permitted()
    }

    fn active_padlock(&self) -> LockVariant {
        self.padlock
    }

    fn active_item(&self) -> Option<String> {
        self.set.clone()
    }

    fn describe_active(&self) -> String {
        match (&self.set, &self.enabled_by) {
            (Some(set), Some(by)) => format!("{set} (enabled by {by})"),
            (Some(set), None) => set.clone(),
            (None, _) => "No Restraint Set Active".to_string(),
        }
    }

    fn max_lock_duration(&self) -> Option<Duration> {
        self.grants.max_duration
    }
}
