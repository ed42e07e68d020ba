//! Weapon transaction classifier
//!
//! Tells a purchase from a pickup by following each equipment instance through
//! the round. State lives for one round only.

use hashbrown::HashMap;

use super::ItemAction;
use crate::event::ParticipantId;

/// Per-round ownership tracker keyed by equipment instance id.
#[derive(Debug, Default)]
pub struct WeaponTracker {
    owners: HashMap<i64, ParticipantId>,
    bought: HashMap<i64, bool>,
    dropped: HashMap<i64, bool>,
    prev_owners: HashMap<i64, ParticipantId>,
}

impl WeaponTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget every instance (called at each round start).
    pub fn reset(&mut self) {
        self.owners.clear();
        self.bought.clear();
        self.dropped.clear();
        self.prev_owners.clear();
    }

    /// Classify an instance arriving in `participant`'s inventory.
    ///
    /// Returns `None` for a self-pickup of one's own drop or an instance that is
    /// already owned.
    pub fn classify_pickup(&mut self, item: i64, participant: ParticipantId) -> Option<ItemAction> {
        if self.is_purchase(item, participant) {
            Some(ItemAction::Purchase)
        } else if self.is_pickup(item, participant) {
            Some(ItemAction::Pickup)
        } else {
            None
        }
    }

    /// Record that `participant` dropped the instance.
    pub fn register_drop(&mut self, item: i64, participant: ParticipantId) {
        self.dropped.insert(item, true);
        self.prev_owners.insert(item, participant);
        self.owners.remove(&item);
    }

    pub fn owner(&self, item: i64) -> Option<ParticipantId> {
        self.owners.get(&item).copied()
    }

    pub fn was_bought(&self, item: i64) -> bool {
        self.bought.get(&item).copied().unwrap_or(false)
    }

    pub fn is_dropped(&self, item: i64) -> bool {
        self.dropped.get(&item).copied().unwrap_or(false)
    }

    fn is_purchase(&mut self, item: i64, participant: ParticipantId) -> bool {
        if self.is_dropped(item) || self.owners.contains_key(&item) {
            return false;
        }
        self.owners.insert(item, participant);
        self.bought.insert(item, true);
        self.dropped.insert(item, false);
        self.prev_owners.insert(item, participant);
        true
    }

    fn is_pickup(&mut self, item: i64, participant: ParticipantId) -> bool {
        let Some(&prev_owner) = self.prev_owners.get(&item) else {
            return false;
        };
        if !self.is_dropped(item) || prev_owner == participant {
            return false;
        }
        self.owners.insert(item, participant);
        self.dropped.insert(item, false);
        self.prev_owners.insert(item, participant);
        true
    }
}
