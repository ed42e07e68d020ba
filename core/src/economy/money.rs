//! Round-start money reconstruction
//!
//! The money observed at round start can be lower than what a participant
//! demonstrably spent (late snapshots, refunds, teammates dropping guns). At
//! round end the observed value is raised to cover every purchase, every gun
//! handed out and every final-inventory item that no transaction explains.

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

use super::{ItemAction, ParticipantPurchases, RoundPurchases, TransactionRecord};
use crate::event::{PlayerState, Team};

/// Observed (and later corrected) money for both sides of one round.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RoundMoney {
    #[serde(rename = "T")]
    pub t: BTreeMap<String, i32>,
    #[serde(rename = "CT")]
    pub ct: BTreeMap<String, i32>,
}

impl RoundMoney {
    fn side_mut(&mut self, team: Team) -> Option<&mut BTreeMap<String, i32>> {
        match team {
            Team::Terrorists => Some(&mut self.t),
            Team::CounterTerrorists => Some(&mut self.ct),
            _ => None,
        }
    }

    pub fn get(&self, name: &str, team: Team) -> Option<i32> {
        match team {
            Team::Terrorists => self.t.get(name).copied(),
            Team::CounterTerrorists => self.ct.get(name).copied(),
            _ => None,
        }
    }
}

/// Cost breakdown of one participant's transactions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CostBreakdown {
    pub purchased: i32,
    pub dropped: i32,
    pub picked_up: i32,
    /// Final-inventory items not covered by a purchase or pickup. Starting
    /// pistols are free.
    pub unaccounted_inventory: i32,
}

impl CostBreakdown {
    pub fn of(purchases: &ParticipantPurchases) -> Self {
        let mut breakdown = Self {
            purchased: action_total(&purchases.purchases, ItemAction::Purchase),
            dropped: action_total(&purchases.purchases, ItemAction::Drop),
            picked_up: action_total(&purchases.purchases, ItemAction::Pickup),
            unaccounted_inventory: 0,
        };

        let covered: BTreeSet<_> = purchases
            .purchases
            .iter()
            .filter(|r| matches!(r.action, ItemAction::Purchase | ItemAction::Pickup))
            .map(|r| r.item)
            .collect();
        breakdown.unaccounted_inventory = purchases
            .final_inventory
            .iter()
            .filter(|item| !item.is_transaction_filtered() && !covered.contains(item))
            .map(|item| item.price())
            .sum();

        breakdown
    }

    /// Net spend: purchases plus guns handed out, minus guns picked up.
    pub fn actual_cost(&self) -> i32 {
        self.purchased + self.dropped - self.picked_up
    }

    /// Minimum round-start money consistent with what was observed.
    pub fn total_required(&self) -> i32 {
        self.actual_cost() + self.unaccounted_inventory
    }
}

fn action_total(records: &[TransactionRecord], action: ItemAction) -> i32 {
    records
        .iter()
        .filter(|r| r.action == action)
        .map(|r| r.item.price())
        .sum()
}

/// Net spend of a transaction list.
pub fn actual_cost(records: &[TransactionRecord]) -> i32 {
    action_total(records, ItemAction::Purchase) + action_total(records, ItemAction::Drop)
        - action_total(records, ItemAction::Pickup)
}

/// Corrected money: the observed value, raised to `total_required` if short.
pub fn reconcile(observed: i32, purchases: &ParticipantPurchases) -> i32 {
    observed.max(CostBreakdown::of(purchases).total_required())
}

/// One money correction applied at round end.
#[derive(Debug, Clone, PartialEq)]
pub struct MoneyAdjustment {
    pub team: Team,
    pub name: String,
    pub observed: i32,
    pub adjusted: i32,
    pub breakdown: CostBreakdown,
}

/// Money for every round of the match.
#[derive(Debug, Default)]
pub struct MoneyLedger {
    rounds: BTreeMap<u32, RoundMoney>,
}

impl MoneyLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores the money a participant had when the round started.
    pub fn record_start_money(&mut self, round: u32, player: &PlayerState) {
        let entry = self.rounds.entry(round).or_default();
        if let Some(side) = entry.side_mut(player.team) {
            side.insert(player.name.clone(), player.money);
            tracing::debug!(round, team = player.team.label(), player = %player.name, money = player.money, "recorded start money");
        }
    }

    /// Starts a fresh (empty) money table for the round.
    pub fn open_round(&mut self, round: u32) {
        self.rounds.insert(round, RoundMoney::default());
    }

    pub fn discard_round(&mut self, round: u32) {
        self.rounds.remove(&round);
    }

    pub fn round(&self, round: u32) -> Option<&RoundMoney> {
        self.rounds.get(&round)
    }

    pub fn rounds(&self) -> &BTreeMap<u32, RoundMoney> {
        &self.rounds
    }

    /// Applies the correction rule to every participant with purchase data.
    ///
    /// Reapplying to an already corrected round changes nothing.
    pub fn adjust_round(&mut self, round: u32, purchases: &RoundPurchases) -> Vec<MoneyAdjustment> {
        let Some(money) = self.rounds.get_mut(&round) else {
            tracing::warn!(round, "no money data for round");
            return Vec::new();
        };

        let mut adjustments = Vec::new();
        for team in [Team::Terrorists, Team::CounterTerrorists] {
            let Some(side) = money.side_mut(team) else {
                continue;
            };
            for (name, observed) in side.iter_mut() {
                let Some(record) = purchases.get(name, team) else {
                    tracing::debug!(round, team = team.label(), player = %name, money = *observed, "no purchase data");
                    continue;
                };

                let breakdown = CostBreakdown::of(record);
                let required = breakdown.total_required();
                if *observed < required {
                    tracing::info!(
                        round,
                        team = team.label(),
                        player = %name,
                        purchased = breakdown.purchased,
                        dropped = breakdown.dropped,
                        picked_up = breakdown.picked_up,
                        unaccounted = breakdown.unaccounted_inventory,
                        "money adjusted: ${} -> ${}",
                        *observed,
                        required
                    );
                    adjustments.push(MoneyAdjustment {
                        team,
                        name: name.clone(),
                        observed: *observed,
                        adjusted: required,
                        breakdown,
                    });
                    *observed = required;
                } else {
                    tracing::debug!(round, team = team.label(), player = %name, money = *observed, required, "money consistent");
                }
            }
        }
        adjustments
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Equipment;

    fn record(item: Equipment, action: ItemAction) -> TransactionRecord {
        TransactionRecord::new(1.0, item, action)
    }

    fn purchases(records: Vec<TransactionRecord>, inventory: Vec<Equipment>) -> ParticipantPurchases {
        ParticipantPurchases {
            purchases: records,
            final_inventory: inventory,
        }
    }

    fn player(name: &str, team: Team, money: i32) -> PlayerState {
        let mut p: PlayerState =
            serde_json::from_value(serde_json::json!({ "id": 1, "name": name })).unwrap();
        p.team = team;
        p.money = money;
        p
    }

    #[test]
    fn test_actual_cost() {
        let records = vec![
            record(Equipment::Ak47, ItemAction::Purchase),
            record(Equipment::Awp, ItemAction::Pickup),
            record(Equipment::M4a1, ItemAction::Drop),
        ];
        assert_eq!(actual_cost(&records), 2700 + 3100 - 4750);
    }

    #[test]
    fn test_unaccounted_inventory_adds_cost() {
        let p = purchases(
            vec![record(Equipment::Ak47, ItemAction::Purchase)],
            vec![Equipment::Ak47, Equipment::Glock, Equipment::Vesthelm, Equipment::Flashbang],
        );
        let breakdown = CostBreakdown::of(&p);
        assert_eq!(breakdown.unaccounted_inventory, 1000 + 200);
        assert_eq!(breakdown.total_required(), 2700 + 1200);
    }

    #[test]
    fn test_reconcile_only_raises() {
        let p = purchases(vec![record(Equipment::Ak47, ItemAction::Purchase)], vec![]);
        assert_eq!(reconcile(800, &p), 2700);
        assert_eq!(reconcile(16000, &p), 16000);
    }

    #[test]
    fn test_reconcile_is_idempotent() {
        let p = purchases(
            vec![
                record(Equipment::Famas, ItemAction::Purchase),
                record(Equipment::Ak47, ItemAction::Pickup),
            ],
            vec![Equipment::Ak47, Equipment::Vest, Equipment::Smokegrenade],
        );
        for observed in [0, 500, 2250, 4000] {
            let once = reconcile(observed, &p);
            assert_eq!(reconcile(once, &p), once);
        }
    }

    #[test]
    fn test_adjust_round_updates_ledger_once() {
        let mut ledger = MoneyLedger::new();
        ledger.open_round(3);
        ledger.record_start_money(3, &player("alice", Team::Terrorists, 1000));
        ledger.record_start_money(3, &player("bob", Team::CounterTerrorists, 9000));
        ledger.record_start_money(3, &player("carol", Team::Terrorists, 50));

        let mut round = RoundPurchases::default();
        round
            .entry("alice", Team::Terrorists)
            .unwrap()
            .purchases
            .push(record(Equipment::Ak47, ItemAction::Purchase));
        round
            .entry("bob", Team::CounterTerrorists)
            .unwrap()
            .purchases
            .push(record(Equipment::M4a1, ItemAction::Purchase));

        let adjustments = ledger.adjust_round(3, &round);
        assert_eq!(adjustments.len(), 1);
        assert_eq!(adjustments[0].name, "alice");
        assert_eq!(adjustments[0].adjusted, 2700);

        let money = ledger.round(3).unwrap();
        assert_eq!(money.get("alice", Team::Terrorists), Some(2700));
        assert_eq!(money.get("bob", Team::CounterTerrorists), Some(9000));
        // No purchase data: left untouched.
        assert_eq!(money.get("carol", Team::Terrorists), Some(50));

        assert!(ledger.adjust_round(3, &round).is_empty());
    }

    #[test]
    fn test_adjust_missing_round_is_noop() {
        let mut ledger = MoneyLedger::new();
        assert!(ledger.adjust_round(9, &RoundPurchases::default()).is_empty());
    }
}
