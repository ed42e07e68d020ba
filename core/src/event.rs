//! Decoded replay events
//!
//! The replay decoder is an external collaborator; it hands us a finite, ordered
//! sequence of [`StreamEvent`]s. Every callback the decoder can raise is one variant
//! of the closed [`Event`] union, so a session dispatches with a single `match`.

use glam::{DVec2, DVec3};
use serde::{Deserialize, Serialize};

use crate::catalog::Equipment;

/// Stable participant identity (64-bit account id).
pub type ParticipantId = u64;

/// Team side of a participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Team {
    #[serde(rename = "T")]
    Terrorists,
    #[serde(rename = "CT")]
    CounterTerrorists,
    #[serde(rename = "Spectator")]
    Spectators,
    #[default]
    #[serde(rename = "Unassigned")]
    Unassigned,
}

impl Team {
    /// Whether the team takes part in rounds.
    pub fn is_playing(self) -> bool {
        matches!(self, Team::Terrorists | Team::CounterTerrorists)
    }

    /// Label used in analytics output.
    pub fn label(self) -> &'static str {
        match self {
            Team::Terrorists => "T",
            Team::CounterTerrorists => "CT",
            Team::Spectators => "Spectator",
            Team::Unassigned => "Unknown",
        }
    }

    /// Directory name used for recordings (`t` / `ct`).
    pub fn side_dir(self) -> Option<&'static str> {
        match self {
            Team::Terrorists => Some("t"),
            Team::CounterTerrorists => Some("ct"),
            _ => None,
        }
    }
}

/// Minimal participant reference carried by one-shot events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerRef {
    pub id: ParticipantId,
    pub name: String,
    #[serde(default)]
    pub team: Team,
}

/// Full participant snapshot at the moment of an event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerState {
    pub id: ParticipantId,
    pub name: String,
    #[serde(default)]
    pub team: Team,
    #[serde(default = "default_true")]
    pub alive: bool,
    #[serde(default)]
    pub scoped: bool,
    #[serde(default)]
    pub defusing: bool,
    #[serde(default)]
    pub planting: bool,
    /// World position.
    #[serde(default)]
    pub position: DVec3,
    /// World velocity in units per second.
    #[serde(default)]
    pub velocity: DVec3,
    /// View angles in degrees: `x` = pitch, `y` = yaw.
    #[serde(default)]
    pub view: DVec2,
    #[serde(default)]
    pub money: i32,
    #[serde(default)]
    pub armor: i32,
    #[serde(default)]
    pub helmet: bool,
    #[serde(default)]
    pub defuse_kit: bool,
    #[serde(default)]
    pub active_weapon: Option<Equipment>,
    /// Weapons currently carried.
    #[serde(default)]
    pub weapons: Vec<Equipment>,
    #[serde(default)]
    pub crosshair_code: Option<String>,
}

fn default_true() -> bool {
    true
}

impl PlayerState {
    pub fn player_ref(&self) -> PlayerRef {
        PlayerRef {
            id: self.id,
            name: self.name.clone(),
            team: self.team,
        }
    }

    pub fn pitch(&self) -> f64 {
        self.view.x
    }

    pub fn yaw(&self) -> f64 {
        self.view.y
    }
}

/// One concrete equipment instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemRef {
    /// Unique instance id assigned by the decoder.
    pub id: i64,
    pub kind: Equipment,
}

/// Bombsite where the bomb was planted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Bombsite {
    A,
    B,
}

/// One decoded event, stamped with the tick it happened on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamEvent {
    pub tick: i32,
    /// Whether the match was in its warmup period.
    #[serde(default)]
    pub warmup: bool,
    #[serde(flatten)]
    pub event: Event,
}

impl StreamEvent {
    pub fn new(tick: i32, event: Event) -> Self {
        Self {
            tick,
            warmup: false,
            event,
        }
    }

    pub fn warmup(tick: i32, event: Event) -> Self {
        Self {
            tick,
            warmup: true,
            event,
        }
    }
}

/// Every callback the decoder raises.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// Stream header: nominal simulation rate.
    MatchStart { tick_rate: f64 },
    MatchEnd,
    PlayerConnect { player: PlayerState },
    RoundStart { players: Vec<PlayerState> },
    FreezeTimeEnd { players: Vec<PlayerState> },
    RoundEnd { players: Vec<PlayerState> },
    HalfEnded,
    /// All state for one captured frame has been delivered.
    TickDone { players: Vec<PlayerState> },
    WeaponFire { player: PlayerRef },
    Jump { player: PlayerRef },
    ItemPickup { player: PlayerRef, item: ItemRef },
    ItemDrop { player: PlayerRef, item: ItemRef },
    Chat {
        sender: String,
        text: String,
        #[serde(default)]
        team_only: bool,
    },
    BombPlantBegin { player: PlayerRef },
    BombPlantAborted { player: PlayerRef },
    BombPlanted {
        player: PlayerRef,
        #[serde(default)]
        site: Option<Bombsite>,
    },
    BombDefuseStart { player: PlayerRef },
    BombDefuseAborted { player: PlayerRef },
    BombDefused { player: PlayerRef },
}

impl Event {
    /// Short name for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            Event::MatchStart { .. } => "match_start",
            Event::MatchEnd => "match_end",
            Event::PlayerConnect { .. } => "player_connect",
            Event::RoundStart { .. } => "round_start",
            Event::FreezeTimeEnd { .. } => "freeze_time_end",
            Event::RoundEnd { .. } => "round_end",
            Event::HalfEnded => "half_ended",
            Event::TickDone { .. } => "tick_done",
            Event::WeaponFire { .. } => "weapon_fire",
            Event::Jump { .. } => "jump",
            Event::ItemPickup { .. } => "item_pickup",
            Event::ItemDrop { .. } => "item_drop",
            Event::Chat { .. } => "chat",
            Event::BombPlantBegin { .. } => "bomb_plant_begin",
            Event::BombPlantAborted { .. } => "bomb_plant_aborted",
            Event::BombPlanted { .. } => "bomb_planted",
            Event::BombDefuseStart { .. } => "bomb_defuse_start",
            Event::BombDefuseAborted { .. } => "bomb_defuse_aborted",
            Event::BombDefused { .. } => "bomb_defused",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tick_done_line() {
        let line = r#"{"tick":120,"type":"tick_done","players":[
            {"id":7,"name":"alice","team":"T","position":[1.0,2.0,3.0],
             "velocity":[250.0,0.0,0.0],"view":[-5.0,90.0],"active_weapon":"ak47"}]}"#;
        let parsed: StreamEvent = serde_json::from_str(line).unwrap();

        assert_eq!(parsed.tick, 120);
        assert!(!parsed.warmup);
        let Event::TickDone { players } = parsed.event else {
            panic!("expected tick_done");
        };
        assert_eq!(players.len(), 1);
        assert!(players[0].alive);
        assert_eq!(players[0].team, Team::Terrorists);
        assert_eq!(players[0].position, DVec3::new(1.0, 2.0, 3.0));
        assert_eq!(players[0].yaw(), 90.0);
        assert_eq!(players[0].active_weapon, Some(Equipment::Ak47));
    }

    #[test]
    fn test_parse_unit_and_pickup_events() {
        let parsed: StreamEvent =
            serde_json::from_str(r#"{"tick":5,"warmup":true,"type":"half_ended"}"#).unwrap();
        assert!(parsed.warmup);
        assert_eq!(parsed.event, Event::HalfEnded);

        let parsed: StreamEvent = serde_json::from_str(
            r#"{"tick":9,"type":"item_pickup","player":{"id":1,"name":"bob","team":"CT"},
                "item":{"id":42,"kind":"m4a1_silencer"}}"#,
        )
        .unwrap();
        assert_eq!(parsed.event.kind(), "item_pickup");
    }

    #[test]
    fn test_team_labels() {
        assert_eq!(Team::Terrorists.side_dir(), Some("t"));
        assert_eq!(Team::CounterTerrorists.label(), "CT");
        assert_eq!(Team::Spectators.side_dir(), None);
        assert!(!Team::Unassigned.is_playing());
    }
}
