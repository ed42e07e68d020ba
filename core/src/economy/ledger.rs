//! Per-round transaction ledger
//!
//! Holds every participant's transactions and final inventory, split by side.

use serde::Serialize;
use std::collections::BTreeMap;

use super::TransactionRecord;
use crate::catalog::Equipment;
use crate::event::{PlayerState, Team};

/// One participant's economy for one round.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ParticipantPurchases {
    pub purchases: Vec<TransactionRecord>,
    pub final_inventory: Vec<Equipment>,
}

/// Both sides' purchase data for one round.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RoundPurchases {
    #[serde(rename = "T")]
    pub t: BTreeMap<String, ParticipantPurchases>,
    #[serde(rename = "CT")]
    pub ct: BTreeMap<String, ParticipantPurchases>,
}

impl RoundPurchases {
    pub fn side(&self, team: Team) -> Option<&BTreeMap<String, ParticipantPurchases>> {
        match team {
            Team::Terrorists => Some(&self.t),
            Team::CounterTerrorists => Some(&self.ct),
            _ => None,
        }
    }

    fn side_mut(&mut self, team: Team) -> Option<&mut BTreeMap<String, ParticipantPurchases>> {
        match team {
            Team::Terrorists => Some(&mut self.t),
            Team::CounterTerrorists => Some(&mut self.ct),
            _ => None,
        }
    }

    /// Puts the participant on exactly one side with an empty record.
    pub fn initialize_participant(&mut self, name: &str, team: Team) {
        self.t.remove(name);
        self.ct.remove(name);
        if let Some(side) = self.side_mut(team) {
            side.insert(name.to_string(), ParticipantPurchases::default());
        }
    }

    /// Record for the participant, initializing it if this is their first transaction.
    pub fn entry(&mut self, name: &str, team: Team) -> Option<&mut ParticipantPurchases> {
        let known = self.side(team).is_some_and(|side| side.contains_key(name));
        if !known {
            self.initialize_participant(name, team);
        }
        self.side_mut(team)?.get_mut(name)
    }

    pub fn get(&self, name: &str, team: Team) -> Option<&ParticipantPurchases> {
        self.side(team)?.get(name)
    }

    /// Total transactions on each side as `(t, ct)`.
    pub fn transaction_counts(&self) -> (usize, usize) {
        let count = |side: &BTreeMap<String, ParticipantPurchases>| {
            side.values().map(|p| p.purchases.len()).sum()
        };
        (count(&self.t), count(&self.ct))
    }
}

/// Final inventory snapshot: weapons (deduplicated, knife and bomb excluded),
/// then armor, then the defuse kit.
pub fn final_inventory(player: &PlayerState) -> Vec<Equipment> {
    let mut inventory: Vec<Equipment> = Vec::new();
    let mut push = |item: Equipment| {
        if !inventory.contains(&item) {
            inventory.push(item);
        }
    };

    for &weapon in &player.weapons {
        if weapon != Equipment::Unknown && !weapon.is_inventory_filtered() {
            push(weapon);
        }
    }

    if player.helmet {
        push(Equipment::Vesthelm);
    } else if player.armor > 0 {
        push(Equipment::Vest);
    }

    if player.defuse_kit {
        push(Equipment::Defuser);
    }

    inventory
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::economy::ItemAction;

    fn player(weapons: Vec<Equipment>) -> PlayerState {
        let mut p: PlayerState = serde_json::from_value(serde_json::json!({
            "id": 1,
            "name": "alice",
            "team": "CT",
        }))
        .unwrap();
        p.weapons = weapons;
        p
    }

    #[test]
    fn test_initialize_moves_between_sides() {
        let mut round = RoundPurchases::default();
        round.initialize_participant("alice", Team::Terrorists);
        assert!(round.t.contains_key("alice"));

        round.initialize_participant("alice", Team::CounterTerrorists);
        assert!(!round.t.contains_key("alice"));
        assert!(round.ct.contains_key("alice"));

        round.initialize_participant("alice", Team::Spectators);
        assert!(round.t.is_empty() && round.ct.is_empty());
    }

    #[test]
    fn test_entry_initializes_once() {
        let mut round = RoundPurchases::default();
        round
            .entry("bob", Team::Terrorists)
            .unwrap()
            .purchases
            .push(TransactionRecord::new(1.0, Equipment::Ak47, ItemAction::Purchase));
        round.entry("bob", Team::Terrorists).unwrap();

        assert_eq!(round.get("bob", Team::Terrorists).unwrap().purchases.len(), 1);
        assert_eq!(round.transaction_counts(), (1, 0));
        assert!(round.entry("carol", Team::Unassigned).is_none());
    }

    #[test]
    fn test_final_inventory_snapshot() {
        let mut p = player(vec![
            Equipment::Knife,
            Equipment::UspSilencer,
            Equipment::M4a1Silencer,
            Equipment::Flashbang,
            Equipment::Flashbang,
            Equipment::C4,
        ]);
        p.armor = 100;
        p.helmet = true;
        p.defuse_kit = true;

        assert_eq!(
            final_inventory(&p),
            vec![
                Equipment::UspSilencer,
                Equipment::M4a1Silencer,
                Equipment::Flashbang,
                Equipment::Vesthelm,
                Equipment::Defuser,
            ]
        );
    }

    #[test]
    fn test_final_inventory_vest_without_helmet() {
        let mut p = player(vec![Equipment::Glock]);
        p.armor = 40;
        assert_eq!(final_inventory(&p), vec![Equipment::Glock, Equipment::Vest]);
    }
}
