//! Shared test utilities for integration and unit tests

use glam::{DVec2, DVec3};

use crate::catalog::Equipment;
use crate::config::SessionConfig;
use crate::event::{Event, ItemRef, ParticipantId, PlayerState, StreamEvent, Team};
use crate::output::{MemoryStore, OutputStore};
use crate::session::Session;

/// Header timestamp pinned for every test session.
pub const TEST_TIMESTAMP: i32 = 1_700_000_000;

/// Participant snapshot with every optional field at its default.
pub fn player(id: ParticipantId, name: &str, team: Team) -> PlayerState {
    PlayerState {
        id,
        name: name.to_string(),
        team,
        alive: true,
        scoped: false,
        defusing: false,
        planting: false,
        position: DVec3::ZERO,
        velocity: DVec3::ZERO,
        view: DVec2::ZERO,
        money: 800,
        armor: 0,
        helmet: false,
        defuse_kit: false,
        active_weapon: None,
        weapons: Vec::new(),
        crosshair_code: None,
    }
}

/// Session writing to memory with a pinned timestamp.
pub fn memory_session(config: SessionConfig) -> Session<MemoryStore> {
    let mut session = Session::new(config, MemoryStore::new());
    session.set_capture_timestamp(TEST_TIMESTAMP);
    session
}

/// Builder for scripted event streams.
#[derive(Debug, Default)]
pub struct Script {
    events: Vec<StreamEvent>,
}

impl Script {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(mut self, tick: i32, event: Event) -> Self {
        self.events.push(StreamEvent::new(tick, event));
        self
    }

    pub fn push_warmup(mut self, tick: i32, event: Event) -> Self {
        self.events.push(StreamEvent::warmup(tick, event));
        self
    }

    pub fn match_start(self, tick_rate: f64) -> Self {
        self.push(0, Event::MatchStart { tick_rate })
    }

    pub fn round_start(self, tick: i32, players: &[PlayerState]) -> Self {
        self.push(
            tick,
            Event::RoundStart {
                players: players.to_vec(),
            },
        )
    }

    pub fn freeze_end(self, tick: i32, players: &[PlayerState]) -> Self {
        self.push(
            tick,
            Event::FreezeTimeEnd {
                players: players.to_vec(),
            },
        )
    }

    pub fn tick(self, tick: i32, players: &[PlayerState]) -> Self {
        self.push(
            tick,
            Event::TickDone {
                players: players.to_vec(),
            },
        )
    }

    /// `tick_done` for every tick in `ticks`.
    pub fn ticks(
        mut self,
        ticks: impl IntoIterator<Item = i32>,
        players: &[PlayerState],
    ) -> Self {
        for tick in ticks {
            self = self.tick(tick, players);
        }
        self
    }

    pub fn round_end(self, tick: i32, players: &[PlayerState]) -> Self {
        self.push(
            tick,
            Event::RoundEnd {
                players: players.to_vec(),
            },
        )
    }

    pub fn pickup(self, tick: i32, player: &PlayerState, id: i64, kind: Equipment) -> Self {
        self.push(
            tick,
            Event::ItemPickup {
                player: player.player_ref(),
                item: ItemRef { id, kind },
            },
        )
    }

    pub fn drop_item(self, tick: i32, player: &PlayerState, id: i64, kind: Equipment) -> Self {
        self.push(
            tick,
            Event::ItemDrop {
                player: player.player_ref(),
                item: ItemRef { id, kind },
            },
        )
    }

    pub fn fire(self, tick: i32, player: &PlayerState) -> Self {
        self.push(
            tick,
            Event::WeaponFire {
                player: player.player_ref(),
            },
        )
    }

    pub fn events(&self) -> &[StreamEvent] {
        &self.events
    }

    /// Feed every event to the session.
    pub fn play<S: OutputStore>(&self, session: &mut Session<S>) {
        for event in &self.events {
            session.handle(event);
        }
    }

    /// Play into a fresh in-memory session.
    pub fn run(&self, config: SessionConfig) -> Session<MemoryStore> {
        let mut session = memory_session(config);
        self.play(&mut session);
        session
    }
}
