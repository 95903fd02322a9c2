//! In-memory data layer standing in for the peer sync service.
//!
//! Holds every peer's items and the secrets of the padlocks on them, and
//! applies delivered requests the way a remote peer would: it re-checks
//! permissions, compares passwords and expires timers.

use std::{
    collections::{BTreeMap, HashMap},
    time::Duration,
};

use padlock_app::{Choice, ChoiceSource, ItemSource};
use padlock_core::{
    ApplyRequest, DispatchError, GagSlot, ItemRef, LockGrants, LockRequest, LockVariant, Lockable,
    PeerId, RestraintSet, SlotKey, SlotKind, ToggleRequest, UnlockRequest,
};
use tracing::{debug, trace};

/// UID recorded as assigner of padlocks applied through the store.
pub const LOCAL_UID: &str = "self";

/// Secret kept by the peer for an applied padlock.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Secret {
    password: Option<String>,
    expires_at: Option<Duration>,
}

/// Everything one peer exposes.
#[derive(Debug, Clone, Default)]
pub struct PeerData {
    /// Layered gag slots.
    pub gags: Vec<GagSlot>,
    /// Restraint set slot.
    pub restraint: RestraintSet,
    /// Offered choices per slot kind.
    pub catalog: BTreeMap<SlotKind, Vec<Choice>>,
    secrets: HashMap<SlotKey, Secret>,
}

impl PeerData {
    /// Peer with `layers` empty gag slots, no restraint set and the default
    /// catalog, granting `grants` on both gags and restraints.
    pub fn new(layers: u8, grants: &LockGrants) -> Self {
        let gag = GagSlot { grants: grants.clone(), ..GagSlot::default() };
        let catalog = BTreeMap::from([
            (SlotKind::Gag, choices(&["Ball Gag", "Cloth Gag", "Ring Gag"])),
            (SlotKind::Restraint, choices(&["Leather Set", "Rope Set"])),
            (SlotKind::Pattern, choices(&["Pulse", "Wave"])),
            (SlotKind::Alarm, choices(&["Morning", "Evening"])),
            (SlotKind::Trigger, choices(&["Safeword"])),
        ]);
        Self {
            gags: vec![gag; usize::from(layers)],
            restraint: RestraintSet { grants: grants.clone(), ..RestraintSet::default() },
            catalog,
            secrets: HashMap::new(),
        }
    }

    /// Put `gag` on layer `layer`. Out of range layers are ignored.
    #[must_use]
    pub fn with_gag(mut self, layer: u8, gag: &str) -> Self {
        if let Some(slot) = self.gags.get_mut(usize::from(layer)) {
            slot.gag = Some(gag.to_string());
        }
        self
    }

    /// Activate restraint `set`.
    #[must_use]
    pub fn with_restraint(mut self, set: &str) -> Self {
        self.restraint.set = Some(set.to_string());
        self
    }
}

fn choices(ids: &[&str]) -> Vec<Choice> {
    ids.iter().map(|id| Choice::new(*id)).collect()
}

/// In-memory peer store.
#[derive(Debug, Clone, Default)]
pub struct PeerStore {
    peers: BTreeMap<PeerId, PeerData>,
    now: Duration,
}

impl PeerStore {
    /// Empty store at time zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a peer.
    pub fn insert(&mut self, peer: PeerId, data: PeerData) {
        self.peers.insert(peer, data);
    }

    /// Data of `peer`.
    pub fn peer(&self, peer: &PeerId) -> Option<&PeerData> {
        self.peers.get(peer)
    }

    /// Mutable data of `peer`, for tests changing state behind the widgets.
    pub fn peer_mut(&mut self, peer: &PeerId) -> Option<&mut PeerData> {
        self.peers.get_mut(peer)
    }

    /// Current store time.
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Let `elapsed` pass, releasing every timer padlock that ran out.
    ///
    /// Returns the slots that were released.
    pub fn advance(&mut self, elapsed: Duration) -> Vec<ItemRef> {
        self.now += elapsed;
        let now = self.now;

        let mut released = Vec::new();
        for (peer, data) in &mut self.peers {
            let expired: Vec<SlotKey> = data
                .secrets
                .iter()
                .filter(|(_, secret)| secret.expires_at.is_some_and(|at| at <= now))
                .map(|(slot, _)| *slot)
                .collect();
            for slot in expired {
                data.secrets.remove(&slot);
                if let Some(padlock) = padlock_mut(data, slot) {
                    *padlock = LockVariant::None;
                }
                debug!(%peer, ?slot, "timer padlock expired");
                released.push(ItemRef::new(peer.clone(), slot));
            }
        }
        released
    }

    /// Apply a delivered lock request.
    pub fn apply_lock(&mut self, request: &LockRequest) -> Result<(), DispatchError> {
        let now = self.now;
        let data = self.data_mut(&request.target)?;
        let slot = request.target.slot;

        let permitted = match slot.kind {
            SlotKind::Gag => gag(data, slot)?.permitted_padlocks(),
            SlotKind::Restraint => data.restraint.permitted_padlocks(),
            _ => return Err(rejected("slot cannot be locked")),
        };
        if !permitted.contains(&request.variant) {
            return Err(rejected("padlock not permitted"));
        }
        if request.variant.requires_password() && request.credentials.password.is_none() {
            return Err(rejected("missing password"));
        }

        let secret = Secret {
            password: request.credentials.password.clone(),
            expires_at: request.credentials.timer.map(|timer| now + timer),
        };
        data.secrets.insert(slot, secret);
        match slot.kind {
            SlotKind::Gag => {
                let item = gag_mut(data, slot)?;
                item.padlock = request.variant;
                item.assigner = Some(LOCAL_UID.to_string());
            },
            _ => data.restraint.padlock = request.variant,
        }
        debug!(item = ?request.target, variant = %request.variant, "padlock applied");
        Ok(())
    }

    /// Apply a delivered unlock request.
    pub fn apply_unlock(&mut self, request: &UnlockRequest) -> Result<(), DispatchError> {
        let data = self.data_mut(&request.target)?;
        let slot = request.target.slot;

        let current = match slot.kind {
            SlotKind::Gag => gag(data, slot)?.padlock,
            SlotKind::Restraint => data.restraint.padlock,
            _ => return Err(rejected("slot cannot be locked")),
        };
        if current == LockVariant::None {
            return Err(rejected("not locked"));
        }
        if current != request.variant {
            return Err(rejected("padlock changed"));
        }
        let expected = data.secrets.get(&slot).and_then(|secret| secret.password.as_deref());
        if expected.is_some() && expected != request.credentials.password.as_deref() {
            return Err(rejected("wrong password"));
        }

        data.secrets.remove(&slot);
        match slot.kind {
            SlotKind::Gag => {
                let item = gag_mut(data, slot)?;
                item.padlock = LockVariant::None;
                item.assigner = None;
            },
            _ => data.restraint.padlock = LockVariant::None,
        }
        debug!(item = ?request.target, variant = %current, "padlock removed");
        Ok(())
    }

    /// Apply a delivered apply or execute request.
    pub fn apply_choice(&mut self, request: &ApplyRequest) -> Result<(), DispatchError> {
        let data = self.data_mut(&request.target)?;
        let slot = request.target.slot;
        if !offers(data, slot.kind, &request.choice) {
            return Err(rejected("unknown choice"));
        }

        match slot.kind {
            SlotKind::Gag => {
                let item = gag_mut(data, slot)?;
                if item.padlock != LockVariant::None {
                    return Err(rejected("slot is locked"));
                }
                item.gag = Some(request.choice.clone());
            },
            SlotKind::Restraint => {
                if data.restraint.padlock != LockVariant::None {
                    return Err(rejected("slot is locked"));
                }
                data.restraint.set = Some(request.choice.clone());
                data.restraint.enabled_by = Some(LOCAL_UID.to_string());
            },
            SlotKind::Pattern => {
                for choice in data.catalog.entry(SlotKind::Pattern).or_default() {
                    choice.enabled = choice.id == request.choice;
                }
            },
            SlotKind::Alarm | SlotKind::Trigger => return Err(rejected("slot is toggled")),
        }
        trace!(item = ?request.target, choice = %request.choice, "choice applied");
        Ok(())
    }

    /// Apply a delivered enable or disable request.
    pub fn apply_toggle(&mut self, request: &ToggleRequest) -> Result<(), DispatchError> {
        let data = self.data_mut(&request.target)?;
        if !matches!(request.target.slot.kind, SlotKind::Alarm | SlotKind::Trigger) {
            return Err(rejected("slot is not toggled"));
        }

        let choice = data
            .catalog
            .get_mut(&request.target.slot.kind)
            .and_then(|list| list.iter_mut().find(|c| c.id == request.choice))
            .ok_or_else(|| rejected("unknown choice"))?;
        choice.enabled = request.enable;
        trace!(
            item = ?request.target,
            choice = %request.choice,
            enable = request.enable,
            "choice toggled"
        );
        Ok(())
    }

    fn data_mut(&mut self, target: &ItemRef) -> Result<&mut PeerData, DispatchError> {
        self.peers.get_mut(&target.peer).ok_or_else(|| rejected("unknown peer"))
    }
}

fn rejected(reason: &str) -> DispatchError {
    DispatchError::Rejected { reason: reason.to_string() }
}

fn gag(data: &PeerData, slot: SlotKey) -> Result<&GagSlot, DispatchError> {
    data.gags.get(usize::from(slot.index)).ok_or_else(|| rejected("no such gag layer"))
}

fn gag_mut(data: &mut PeerData, slot: SlotKey) -> Result<&mut GagSlot, DispatchError> {
    data.gags.get_mut(usize::from(slot.index)).ok_or_else(|| rejected("no such gag layer"))
}

fn padlock_mut(data: &mut PeerData, slot: SlotKey) -> Option<&mut LockVariant> {
    match slot.kind {
        SlotKind::Gag => data.gags.get_mut(usize::from(slot.index)).map(|item| &mut item.padlock),
        SlotKind::Restraint => Some(&mut data.restraint.padlock),
        _ => None,
    }
}

fn offers(data: &PeerData, kind: SlotKind, id: &str) -> bool {
    data.catalog.get(&kind).is_some_and(|list| list.iter().any(|c| c.id == id))
}

impl ItemSource<GagSlot> for PeerStore {
    fn item(&self, peer: &PeerId, index: u8) -> Option<&GagSlot> {
        self.peers.get(peer)?.gags.get(usize::from(index))
    }
}

impl ItemSource<RestraintSet> for PeerStore {
    fn item(&self, peer: &PeerId, index: u8) -> Option<&RestraintSet> {
        (index == 0).then_some(&self.peers.get(peer)?.restraint)
    }
}

impl ChoiceSource for PeerStore {
    fn choices(&self, peer: &PeerId, kind: SlotKind) -> Vec<Choice> {
        let Some(data) = self.peers.get(peer) else {
            return Vec::new();
        };
        let mut list = data.catalog.get(&kind).cloned().unwrap_or_default();
        for choice in &mut list {
            match kind {
                SlotKind::Gag => {
                    choice.enabled = data.gags.iter().any(|g| g.gag.as_ref() == Some(&choice.id));
                },
                SlotKind::Restraint => {
                    choice.enabled = data.restraint.set.as_ref() == Some(&choice.id);
                },
                SlotKind::Pattern | SlotKind::Alarm | SlotKind::Trigger => {},
            }
        }
        list
    }
}

#[cfg(test)]
mod tests {
    use padlock_core::Credentials;

    use super::*;

    fn store() -> (PeerStore, PeerId) {
        let peer = PeerId::new("UID-1");
        let mut store = PeerStore::new();
        let data = PeerData::new(3, &LockGrants::default()).with_gag(0, "Ball Gag");
        store.insert(peer.clone(), data);
        (store, peer)
    }

    fn lock(peer: &PeerId, variant: LockVariant, password: Option<&str>) -> LockRequest {
        LockRequest {
            target: ItemRef::new(peer.clone(), SlotKey::new(SlotKind::Gag, 0)),
            variant,
            credentials: Credentials {
                password: password.map(str::to_string),
                timer: variant.requires_timer().then_some(Duration::from_secs(60)),
            },
        }
    }

    fn unlock(peer: &PeerId, variant: LockVariant, password: Option<&str>) -> UnlockRequest {
        UnlockRequest {
            target: ItemRef::new(peer.clone(), SlotKey::new(SlotKind::Gag, 0)),
            variant,
            credentials: Credentials { password: password.map(str::to_string), timer: None },
        }
    }

    #[test]
    fn password_lock_round_trip() {
        let (mut store, peer) = store();
        store.apply_lock(&lock(&peer, LockVariant::Password, Some("hunter2"))).unwrap();

        let slot: &GagSlot = store.item(&peer, 0).unwrap();
        assert_eq!(slot.padlock, LockVariant::Password);
        assert_eq!(slot.assigner.as_deref(), Some(LOCAL_UID));

        assert_eq!(
            store.apply_unlock(&unlock(&peer, LockVariant::Password, Some("wrong"))),
            Err(rejected("wrong password"))
        );
        store.apply_unlock(&unlock(&peer, LockVariant::Password, Some("hunter2"))).unwrap();
        let slot: &GagSlot = store.item(&peer, 0).unwrap();
        assert_eq!(slot.padlock, LockVariant::None);
    }

    #[test]
    fn remote_permission_check() {
        let (mut store, peer) = store();
        assert_eq!(
            store.apply_lock(&lock(&peer, LockVariant::OwnerTimer, None)),
            Err(rejected("padlock not permitted"))
        );

        let mut request = lock(&peer, LockVariant::Timer, None);
        request.target.slot.index = 1;
        assert_eq!(store.apply_lock(&request), Err(rejected("padlock not permitted")));
    }

    #[test]
    fn timers_expire() {
        let (mut store, peer) = store();
        store.apply_lock(&lock(&peer, LockVariant::Timer, None)).unwrap();

        assert!(store.advance(Duration::from_secs(59)).is_empty());
        let released = store.advance(Duration::from_secs(1));
        assert_eq!(store.now(), Duration::from_secs(60));
        assert_eq!(released, vec![ItemRef::new(peer.clone(), SlotKey::new(SlotKind::Gag, 0))]);
        let slot: &GagSlot = store.item(&peer, 0).unwrap();
        assert_eq!(slot.padlock, LockVariant::None);
    }

    #[test]
    fn locked_gag_cannot_be_swapped() {
        let (mut store, peer) = store();
        store.apply_lock(&lock(&peer, LockVariant::Combination, Some("1234"))).unwrap();

        let request = ApplyRequest {
            target: ItemRef::new(peer.clone(), SlotKey::new(SlotKind::Gag, 0)),
            choice: "Ring Gag".to_string(),
        };
        assert_eq!(store.apply_choice(&request), Err(rejected("slot is locked")));
    }

    #[test]
    fn choices_reflect_items() {
        let (mut store, peer) = store();
        let toggle = ToggleRequest {
            target: ItemRef::new(peer.clone(), SlotKey::new(SlotKind::Alarm, 0)),
            choice: "Morning".to_string(),
            enable: true,
        };
        store.apply_toggle(&toggle).unwrap();

        let gags = store.choices(&peer, SlotKind::Gag);
        assert!(gags.iter().any(|c| c.id == "Ball Gag" && c.enabled));
        assert!(gags.iter().any(|c| c.id == "Cloth Gag" && !c.enabled));
        assert!(store.choices(&peer, SlotKind::Alarm)[0].enabled);
        assert!(store.choices(&PeerId::new("nobody"), SlotKind::Gag).is_empty());
    }
}
