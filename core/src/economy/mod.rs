//! Round economy
//!
//! - [`WeaponTracker`] classifies each inventory change as purchase, pickup or drop
//! - [`PurchaseLedger`] keeps every participant's transactions and final inventory
//! - [`MoneyLedger`] stores round-start money and corrects under-reported values

mod ledger;
mod money;
mod tracker;

pub use ledger::{ParticipantPurchases, RoundPurchases, final_inventory};
pub use money::{
    CostBreakdown, MoneyAdjustment, MoneyLedger, RoundMoney, actual_cost, reconcile,
};
pub use tracker::WeaponTracker;

use serde::Serialize;
use std::collections::BTreeMap;

use crate::catalog::{Equipment, Slot};

/// What happened to an equipment instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ItemAction {
    #[serde(rename = "purchased")]
    Purchase,
    #[serde(rename = "picked_up")]
    Pickup,
    #[serde(rename = "dropped")]
    Drop,
}

/// One purchase, pickup or drop.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransactionRecord {
    /// Seconds since freeze time started.
    pub time: f64,
    pub item: Equipment,
    pub slot: Slot,
    pub action: ItemAction,
}

impl TransactionRecord {
    pub fn new(time: f64, item: Equipment, action: ItemAction) -> Self {
        Self {
            time,
            item,
            slot: item.slot(),
            action,
        }
    }
}

/// Purchase data for every round of the match.
#[derive(Debug, Default)]
pub struct PurchaseLedger {
    rounds: BTreeMap<u32, RoundPurchases>,
}

impl PurchaseLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a fresh table for the round, replacing any earlier one.
    pub fn open_round(&mut self, round: u32) -> &mut RoundPurchases {
        self.rounds.insert(round, RoundPurchases::default());
        self.rounds.entry(round).or_default()
    }

    pub fn round(&self, round: u32) -> Option<&RoundPurchases> {
        self.rounds.get(&round)
    }

    pub fn round_mut(&mut self, round: u32) -> Option<&mut RoundPurchases> {
        self.rounds.get_mut(&round)
    }

    pub fn discard_round(&mut self, round: u32) {
        self.rounds.remove(&round);
    }

    pub fn rounds(&self) -> &BTreeMap<u32, RoundPurchases> {
        &self.rounds
    }
}
