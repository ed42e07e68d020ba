//! Match analytics
//!
//! Everything besides the recordings: chat log, bomb carriers, participant
//! roster, capture cadence and freeze-time durations. Written once, at the end
//! of the stream, next to the per-round recording directories.

use serde::ser::{Serialize, SerializeMap, Serializer};
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::path::Path;

use crate::economy::{MoneyLedger, PurchaseLedger};
use crate::event::PlayerState;
use crate::output::{OutputStore, write_json};
use crate::replay::FrameRateEstimate;

pub const PURCHASES_FILE: &str = "purchases.json";
pub const MONEY_FILE: &str = "money.json";
pub const CHAT_FILE: &str = "chat.json";
pub const C4_HOLDERS_FILE: &str = "c4_holders.json";
pub const PLAYERS_FILE: &str = "players_info.json";
pub const DEMO_INFO_FILE: &str = "demo_info.json";
pub const FREEZE_FILE: &str = "freeze.txt";

/// Freeze duration assumed when no regular round was observed.
pub const DEFAULT_FREEZE_SECS: f64 = 15.0;

/// Serializes a round-indexed map as `{"round1": .., "round2": ..}` in
/// ascending round order.
pub struct RoundKeyed<'a, V>(pub &'a BTreeMap<u32, V>);

impl<V: Serialize> Serialize for RoundKeyed<'_, V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (round, value) in self.0 {
            map.serialize_entry(&format!("round{round}"), value)?;
        }
        map.end()
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct ChatMessage {
    pub round: u32,
    /// Seconds since freeze time started.
    pub time: f64,
    pub player_name: String,
    pub team: String,
    pub message: String,
    pub is_team_chat: bool,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct C4Holder {
    pub round: u32,
    pub player_name: String,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct PlayerInfo {
    pub steamid: u64,
    pub crosshair_code: String,
}

/// Capture cadence summary (`demo_info.json`).
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct DemoInfo {
    pub tick_rate: f64,
    pub original_frame_rate: f64,
    pub target_frame_rate: f64,
    pub interpolated: bool,
    pub interpolation_ratio: f64,
    pub note: String,
}

impl DemoInfo {
    pub fn new(estimate: &FrameRateEstimate, target_fps: f64) -> Self {
        let ratio = target_fps / estimate.effective_fps;
        let interpolated = estimate.should_interpolate();
        let note = if interpolated {
            format!(
                "interpolated ({:.1} fps -> {:.0} fps, {:.2}x)",
                estimate.effective_fps, target_fps, ratio
            )
        } else {
            "no processing needed".to_string()
        };
        Self {
            tick_rate: estimate.tick_rate,
            original_frame_rate: estimate.effective_fps,
            target_frame_rate: target_fps,
            interpolated,
            interpolation_ratio: ratio,
            note,
        }
    }
}

/// Freeze duration of one round; `None` for halftime rounds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FreezeEntry {
    pub seconds: Option<f64>,
}

/// Most common duration, rounded to a tenth of a second. Ties go to the
/// shorter duration.
pub fn most_common_freeze(durations: impl IntoIterator<Item = f64>) -> f64 {
    let mut counts: BTreeMap<i64, usize> = BTreeMap::new();
    for duration in durations {
        *counts.entry((duration * 10.0 + 0.5) as i64).or_default() += 1;
    }

    let mut best: Option<(i64, usize)> = None;
    for (&tenths, &count) in &counts {
        if best.is_none_or(|(_, c)| count > c) {
            best = Some((tenths, count));
        }
    }
    best.map_or(DEFAULT_FREEZE_SECS, |(tenths, _)| tenths as f64 / 10.0)
}

/// Collected analytics for the whole stream.
#[derive(Debug, Default)]
pub struct Analytics {
    chat: Vec<ChatMessage>,
    c4_holders: BTreeMap<u32, String>,
    players: BTreeMap<String, PlayerInfo>,
    freeze: BTreeMap<u32, FreezeEntry>,
}

impl Analytics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_chat(&mut self, message: ChatMessage) {
        tracing::info!(
            round = message.round,
            time = format_args!("{:.2}", message.time),
            player = %message.player_name,
            team = %message.team,
            team_only = message.is_team_chat,
            "chat: {}",
            message.message
        );
        self.chat.push(message);
    }

    /// Forget round-keyed entries left under `round` by a discarded capture.
    pub fn open_round(&mut self, round: u32) {
        let stale_c4 = self.c4_holders.remove(&round).is_some();
        let stale_freeze = self.freeze.remove(&round).is_some();
        let before = self.chat.len();
        self.chat.retain(|message| message.round != round);
        let stale_chat = before - self.chat.len();
        if stale_c4 || stale_freeze || stale_chat > 0 {
            tracing::debug!(round, stale_chat, "replacing analytics of a renumbered round");
        }
    }

    /// First carrier seen for the round wins.
    pub fn record_c4_holder(&mut self, round: u32, name: &str) -> bool {
        if self.c4_holders.contains_key(&round) {
            return false;
        }
        tracing::info!(round, player = %name, "bomb carrier");
        self.c4_holders.insert(round, name.to_string());
        true
    }

    /// First sighting of a participant name wins.
    pub fn record_player(&mut self, player: &PlayerState) {
        if self.players.contains_key(&player.name) {
            return;
        }
        let crosshair_code = player
            .crosshair_code
            .clone()
            .filter(|code| !code.is_empty())
            .unwrap_or_else(|| "N/A".to_string());
        tracing::debug!(player = %player.name, steamid = player.id, crosshair = %crosshair_code, "participant seen");
        self.players.insert(
            player.name.clone(),
            PlayerInfo {
                steamid: player.id,
                crosshair_code,
            },
        );
    }

    pub fn record_freeze(&mut self, round: u32, seconds: f64, halftime: bool) {
        let seconds = if halftime { None } else { Some(seconds) };
        self.freeze.insert(round, FreezeEntry { seconds });
    }

    pub fn chat(&self) -> &[ChatMessage] {
        &self.chat
    }

    pub fn c4_holders(&self) -> Vec<C4Holder> {
        self.c4_holders
            .iter()
            .map(|(&round, name)| C4Holder {
                round,
                player_name: name.clone(),
            })
            .collect()
    }

    pub fn players(&self) -> &BTreeMap<String, PlayerInfo> {
        &self.players
    }

    /// `freeze.txt` contents.
    pub fn freeze_report(&self) -> String {
        let common = most_common_freeze(self.freeze.values().filter_map(|e| e.seconds));
        let mut out = String::new();
        for (round, entry) in &self.freeze {
            let seconds = entry.seconds.unwrap_or(common);
            let _ = writeln!(out, "round{round}: {seconds:.2}s");
        }
        let _ = write!(out, "freeze_time: {common:.2}s");
        out
    }

    /// Write every analytics file. Returns the number of files that failed.
    pub fn write_all(
        &self,
        store: &mut dyn OutputStore,
        purchases: &PurchaseLedger,
        money: &MoneyLedger,
        demo: Option<&DemoInfo>,
    ) -> usize {
        let mut results = vec![
            (PURCHASES_FILE, write_json(store, Path::new(PURCHASES_FILE), &RoundKeyed(purchases.rounds()))),
            (MONEY_FILE, write_json(store, Path::new(MONEY_FILE), &RoundKeyed(money.rounds()))),
            (CHAT_FILE, write_json(store, Path::new(CHAT_FILE), &self.chat)),
            (C4_HOLDERS_FILE, write_json(store, Path::new(C4_HOLDERS_FILE), &self.c4_holders())),
            (PLAYERS_FILE, write_json(store, Path::new(PLAYERS_FILE), &self.players)),
            (FREEZE_FILE, store.write(Path::new(FREEZE_FILE), self.freeze_report().as_bytes())),
        ];
        if let Some(demo) = demo {
            results.push((DEMO_INFO_FILE, write_json(store, Path::new(DEMO_INFO_FILE), demo)));
        }

        let mut failures = 0;
        for (name, result) in results {
            let path = store.display_path(Path::new(name));
            match result {
                Ok(()) => tracing::info!(path = %path.display(), "saved"),
                Err(e) => {
                    tracing::error!(path = %path.display(), error = %e, "failed to save");
                    failures += 1;
                }
            }
        }
        failures
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::MemoryStore;
    use crate::replay::Cadence;

    #[test]
    fn test_round_keyed_is_numeric_order() {
        let mut map = BTreeMap::new();
        map.insert(10, "ten");
        map.insert(2, "two");
        map.insert(1, "one");
        let json = serde_json::to_string(&RoundKeyed(&map)).unwrap();
        assert_eq!(json, r#"{"round1":"one","round2":"two","round10":"ten"}"#);
    }

    #[test]
    fn test_most_common_freeze() {
        assert_eq!(most_common_freeze(std::iter::empty()), DEFAULT_FREEZE_SECS);
        assert_eq!(most_common_freeze([20.01, 19.98, 15.0]), 20.0);
        // Tie: shorter wins.
        assert_eq!(most_common_freeze([20.0, 15.0]), 15.0);
    }

    #[test]
    fn test_freeze_report() {
        let mut analytics = Analytics::new();
        analytics.record_freeze(1, 20.0, false);
        analytics.record_freeze(2, 20.04, false);
        analytics.record_freeze(3, 55.0, true);
        analytics.record_freeze(10, 15.5, false);
        assert_eq!(
            analytics.freeze_report(),
            "round1: 20.00s\nround2: 20.04s\nround3: 20.00s\nround10: 15.50s\nfreeze_time: 20.00s"
        );
    }

    #[test]
    fn test_c4_and_players_first_wins() {
        let mut analytics = Analytics::new();
        assert!(analytics.record_c4_holder(1, "alice"));
        assert!(!analytics.record_c4_holder(1, "bob"));

        let mut p: PlayerState =
            serde_json::from_value(serde_json::json!({ "id": 7, "name": "alice" })).unwrap();
        analytics.record_player(&p);
        p.id = 8;
        p.crosshair_code = Some("CSGO-xxxx".into());
        analytics.record_player(&p);

        let info = &analytics.players()["alice"];
        assert_eq!(info.steamid, 7);
        assert_eq!(info.crosshair_code, "N/A");
        assert_eq!(
            analytics.c4_holders(),
            vec![C4Holder {
                round: 1,
                player_name: "alice".into()
            }]
        );
    }

    #[test]
    fn test_open_round_clears_renumbered_entries() {
        let mut analytics = Analytics::new();
        analytics.record_c4_holder(1, "alice");
        analytics.record_c4_holder(2, "carol");
        analytics.record_freeze(1, 20.0, false);
        analytics.record_chat(ChatMessage {
            round: 1,
            time: 1.0,
            player_name: "alice".into(),
            team: "T".into(),
            message: "eco".into(),
            is_team_chat: true,
        });

        analytics.open_round(1);
        assert!(analytics.chat().is_empty());
        assert_eq!(analytics.freeze_report(), "freeze_time: 15.00s");
        assert!(analytics.record_c4_holder(1, "bob"));
        let names: Vec<String> = analytics
            .c4_holders()
            .into_iter()
            .map(|holder| holder.player_name)
            .collect();
        assert_eq!(names, vec!["bob", "carol"]);
    }

    #[test]
    fn test_demo_info_note() {
        let estimate = FrameRateEstimate {
            tick_rate: 128.0,
            mean_tick_delta: 2.0,
            effective_fps: 64.0,
            time_scale: 0.5,
            cadence: Cadence::Low,
            samples: 500,
        };
        let info = DemoInfo::new(&estimate, 128.0);
        assert!(info.interpolated);
        assert_eq!(info.interpolation_ratio, 2.0);
        assert_eq!(info.note, "interpolated (64.0 fps -> 128 fps, 2.00x)");
    }

    #[test]
    fn test_write_all() {
        let mut store = MemoryStore::new();
        let analytics = Analytics::new();
        let failures = analytics.write_all(
            &mut store,
            &PurchaseLedger::new(),
            &MoneyLedger::new(),
            None,
        );
        assert_eq!(failures, 0);
        assert_eq!(store.len(), 6);
        assert_eq!(store.get(CHAT_FILE).unwrap(), b"[]");
        assert!(store.get(DEMO_INFO_FILE).is_none());
    }
}
