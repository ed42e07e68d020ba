//! Encoding session
//!
//! A [`Session`] owns every piece of per-match state and consumes the event
//! stream one [`StreamEvent`] at a time. Each event runs to completion before
//! the next one is handled; the only blocking work is the store write at round
//! end and at [`Session::finish`].

use hashbrown::HashMap;

use crate::analytics::{Analytics, ChatMessage, DemoInfo};
use crate::catalog::Equipment;
use crate::config::SessionConfig;
use crate::economy::{
    ItemAction, MoneyLedger, PurchaseLedger, TransactionRecord, WeaponTracker, final_inventory,
};
use crate::event::{Event, ItemRef, ParticipantId, PlayerRef, PlayerState, StreamEvent, Team};
use crate::output::{OutputStore, recording_path};
use crate::replay::{
    ButtonQueue, Buttons, FrameNormalizer, FrameRateEstimate, FrameRecorder, Recording,
    encode_recording,
};
use crate::round::{RoundMachine, RoundStartOutcome};
use crate::stream::StreamError;

/// Summary returned by [`Session::finish`].
#[derive(Debug, Clone, PartialEq)]
pub struct SessionReport {
    /// Rounds closed by a round-end event.
    pub rounds: u32,
    pub recordings_written: usize,
    /// Recordings and analytics files that could not be written.
    pub write_failures: usize,
    pub chat_messages: usize,
    pub frame_rate: Option<FrameRateEstimate>,
}

/// Whole-match state: round lifecycle, economy, capture and analytics.
pub struct Session<S: OutputStore> {
    config: SessionConfig,
    tick_rate: f64,
    rounds: RoundMachine,
    weapons: WeaponTracker,
    purchases: PurchaseLedger,
    money: MoneyLedger,
    buttons: ButtonQueue,
    recorder: FrameRecorder,
    normalizer: FrameNormalizer,
    analytics: Analytics,
    /// Name → side for everyone on a playing team in the latest snapshot.
    roster: HashMap<String, Team>,
    capture_timestamp: Option<i32>,
    store: S,
    rounds_completed: u32,
    recordings_written: usize,
    write_failures: usize,
}

impl<S: OutputStore> Session<S> {
    pub fn new(config: SessionConfig, store: S) -> Self {
        let tick_rate = config.tick_rate;
        let recorder = FrameRecorder::new(config.keyframe_interval(tick_rate));
        let normalizer = FrameNormalizer::new(config.frame_rate.clone());
        Self {
            config,
            tick_rate,
            rounds: RoundMachine::new(),
            weapons: WeaponTracker::new(),
            purchases: PurchaseLedger::new(),
            money: MoneyLedger::new(),
            buttons: ButtonQueue::new(),
            recorder,
            normalizer,
            analytics: Analytics::new(),
            roster: HashMap::new(),
            capture_timestamp: None,
            store,
            rounds_completed: 0,
            recordings_written: 0,
            write_failures: 0,
        }
    }

    /// Pin the header timestamp instead of using the wall clock at round start.
    pub fn set_capture_timestamp(&mut self, timestamp: i32) {
        self.capture_timestamp = Some(timestamp);
    }

    pub fn tick_rate(&self) -> f64 {
        self.tick_rate
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn rounds(&self) -> &RoundMachine {
        &self.rounds
    }

    pub fn purchases(&self) -> &PurchaseLedger {
        &self.purchases
    }

    pub fn money(&self) -> &MoneyLedger {
        &self.money
    }

    pub fn recorder(&self) -> &FrameRecorder {
        &self.recorder
    }

    pub fn normalizer(&self) -> &FrameNormalizer {
        &self.normalizer
    }

    pub fn analytics(&self) -> &Analytics {
        &self.analytics
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Handle every event of a stream. Stops at the first input error.
    pub fn run<I>(&mut self, events: I) -> Result<(), StreamError>
    where
        I: IntoIterator<Item = Result<StreamEvent, StreamError>>,
    {
        for event in events {
            self.handle(&event?);
        }
        Ok(())
    }

    /// Dispatch one event.
    pub fn handle(&mut self, event: &StreamEvent) {
        let tick = event.tick;
        tracing::trace!(tick, kind = event.event.kind(), warmup = event.warmup, "event");

        match &event.event {
            Event::MatchStart { tick_rate } => self.on_match_start(*tick_rate),
            Event::RoundStart { players } => self.on_round_start(tick, event.warmup, players),
            Event::RoundEnd { players } => self.on_round_end(tick, event.warmup, players),
            _ if event.warmup => {}
            Event::MatchEnd => {
                tracing::info!(tick, rounds = self.rounds_completed, "match ended");
            }
            Event::PlayerConnect { player } => {
                tracing::debug!(tick, player = %player.name, steamid = player.id, "player connected");
            }
            Event::FreezeTimeEnd { players } => self.on_freeze_time_end(tick, players),
            Event::HalfEnded => match self.rounds.on_half_ended() {
                Some(round) => tracing::info!(round, tick, "half ended; round includes side switch"),
                None => tracing::warn!(tick, "half ended with no open round"),
            },
            Event::TickDone { players } => self.on_tick_done(tick, players),
            Event::WeaponFire { player } => self.buttons.signal(tick, player.id, Buttons::ATTACK),
            Event::Jump { player } => self.buttons.signal(tick, player.id, Buttons::JUMP),
            Event::ItemPickup { player, item } => self.on_item_pickup(tick, player, *item),
            Event::ItemDrop { player, item } => self.on_item_drop(tick, player, *item),
            Event::Chat {
                sender,
                text,
                team_only,
            } => self.on_chat(tick, sender, text, *team_only),
            Event::BombPlantBegin { player } => {
                self.buttons.signal(tick, player.id, Buttons::USE);
                tracing::info!(tick, player = %player.name, "bomb plant started");
            }
            Event::BombPlantAborted { player } => {
                tracing::info!(tick, player = %player.name, "bomb plant aborted");
            }
            Event::BombPlanted { player, site } => {
                tracing::info!(tick, player = %player.name, site = ?site, "bomb planted");
            }
            Event::BombDefuseStart { player } => {
                self.buttons.signal(tick, player.id, Buttons::USE);
                tracing::info!(tick, player = %player.name, "bomb defuse started");
            }
            Event::BombDefuseAborted { player } => {
                tracing::info!(tick, player = %player.name, "bomb defuse aborted");
            }
            Event::BombDefused { player } => {
                tracing::info!(tick, player = %player.name, "bomb defused");
            }
        }
    }

    /// Write the match-wide analytics and summarize the run.
    pub fn finish(&mut self) -> SessionReport {
        if let Some(round) = self.rounds.current() {
            tracing::warn!(round = round.number, "stream ended inside a round; its recordings are dropped");
        }

        let detector = self.normalizer.detector();
        let estimate = detector.partial_estimate(self.tick_rate);
        if estimate.is_some() && !detector.is_complete() {
            tracing::info!("frame rate detection incomplete; reporting a partial estimate");
        }
        let demo = estimate.map(|estimate| DemoInfo::new(&estimate, self.normalizer.target_fps()));

        let failures =
            self.analytics
                .write_all(&mut self.store, &self.purchases, &self.money, demo.as_ref());
        self.write_failures += failures;

        let report = SessionReport {
            rounds: self.rounds_completed,
            recordings_written: self.recordings_written,
            write_failures: self.write_failures,
            chat_messages: self.analytics.chat().len(),
            frame_rate: estimate,
        };
        tracing::info!(
            rounds = report.rounds,
            recordings = report.recordings_written,
            failures = report.write_failures,
            "session finished"
        );
        report
    }

    fn on_match_start(&mut self, tick_rate: f64) {
        if !tick_rate.is_finite() || tick_rate <= 0.0 {
            tracing::warn!(tick_rate, fallback = self.tick_rate, "invalid tick rate announced");
            return;
        }
        self.tick_rate = tick_rate;
        self.recorder
            .set_keyframe_interval(self.config.keyframe_interval(tick_rate));
        tracing::info!(
            tick_rate,
            keyframe_interval = self.recorder.keyframe_interval(),
            "match started"
        );
    }

    fn on_round_start(&mut self, tick: i32, warmup: bool, players: &[PlayerState]) {
        match self.rounds.on_round_start(tick, warmup) {
            RoundStartOutcome::SkippedWarmup => {
                tracing::debug!(tick, "skipping warmup round");
            }
            RoundStartOutcome::Reset { discarded_round } => {
                tracing::warn!(tick, discarded = ?discarded_round, "warmup re-entered; match state reset");
                self.discard_in_flight(discarded_round);
            }
            RoundStartOutcome::Duplicate { open_round } => {
                tracing::warn!(tick, round = open_round, "duplicate round start ignored");
            }
            RoundStartOutcome::Opened(round) => {
                tracing::info!(round, tick, "round started");
                self.weapons.reset();
                self.buttons.reset_scope();
                self.update_roster(players);

                self.money.open_round(round);
                self.analytics.open_round(round);
                let purchases = self.purchases.open_round(round);
                for player in players.iter().filter(|p| p.team.is_playing()) {
                    self.money.record_start_money(round, player);
                    self.analytics.record_player(player);
                    purchases.initialize_participant(&player.name, player.team);
                }

                let timestamp = self
                    .capture_timestamp
                    .unwrap_or_else(|| chrono::Utc::now().timestamp() as i32);
                self.recorder.begin_round(timestamp);
            }
        }
    }

    fn on_freeze_time_end(&mut self, tick: i32, players: &[PlayerState]) {
        let extension = self.config.buy_time_extension_ticks(self.tick_rate);
        let Some(round) = self.rounds.on_freeze_time_end(tick, extension) else {
            tracing::warn!(tick, "freeze time ended with no open round");
            return;
        };
        let number = round.number;
        tracing::info!(
            round = number,
            tick,
            duration = format_args!("{:.2}s", round.freeze_duration(self.tick_rate)),
            buy_time_end = tick + extension,
            "freeze time ended"
        );

        self.update_roster(players);
        for player in players.iter().filter(|p| p.team.is_playing()) {
            self.recorder.reinit(player);
        }

        let carrier = players
            .iter()
            .find(|p| p.team == Team::Terrorists && p.weapons.contains(&Equipment::C4));
        match carrier {
            Some(player) => {
                self.analytics.record_c4_holder(number, &player.name);
            }
            None => tracing::warn!(round = number, "no bomb carrier found"),
        }
    }

    fn on_tick_done(&mut self, tick: i32, players: &[PlayerState]) {
        self.update_roster(players);
        self.normalizer.observe(tick, self.tick_rate);

        let Some(round) = self.rounds.current().filter(|_| self.rounds.is_capturing()) else {
            self.buttons.discard_before(tick);
            return;
        };
        let number = round.number;
        let full_snapshot = round.in_freeze_time();
        let inventory_due = round.inventory_check_due(tick);

        for player in players.iter().filter(|p| p.team.is_playing()) {
            // Signals are consumed even when the participant is dead.
            let buttons = self.buttons.frame_buttons(tick, player);
            self.recorder
                .capture(player, buttons, self.tick_rate, full_snapshot);
        }
        self.buttons.discard_before(tick);

        if inventory_due {
            tracing::info!(round = number, tick, "recording final inventories");
            if let Some(purchases) = self.purchases.round_mut(number) {
                for player in players.iter().filter(|p| p.team.is_playing()) {
                    if let Some(entry) = purchases.entry(&player.name, player.team) {
                        entry.final_inventory = final_inventory(player);
                    }
                }
            }
            if let Some(round) = self.rounds.current_mut() {
                round.inventory_checked = true;
            }
        }
    }

    fn on_item_pickup(&mut self, tick: i32, player: &PlayerRef, item: ItemRef) {
        let counted = is_counted(item.kind);
        if counted {
            self.buttons.signal(tick, player.id, Buttons::USE);
        }

        let Some(round) = self.rounds.current() else {
            return;
        };
        if !counted || !round.in_buy_window(tick) || !player.team.is_playing() {
            return;
        }
        let number = round.number;
        let time = round.seconds_since_freeze_start(tick, self.tick_rate);

        let Some(action) = self.weapons.classify_pickup(item.id, player.id) else {
            tracing::trace!(tick, player = %player.name, item = %item.kind, "pickup not classified");
            return;
        };
        self.push_transaction(number, player, TransactionRecord::new(time, item.kind, action));
    }

    fn on_item_drop(&mut self, tick: i32, player: &PlayerRef, item: ItemRef) {
        if item.kind.is_grenade() {
            self.buttons.signal(tick, player.id, Buttons::ATTACK);
        }

        let Some(round) = self.rounds.current() else {
            return;
        };
        if !round.in_freeze_time() || !is_counted(item.kind) || !player.team.is_playing() {
            return;
        }
        let number = round.number;
        let time = round.seconds_since_freeze_start(tick, self.tick_rate);

        self.weapons.register_drop(item.id, player.id);
        self.push_transaction(
            number,
            player,
            TransactionRecord::new(time, item.kind, ItemAction::Drop),
        );
    }

    fn push_transaction(&mut self, round: u32, player: &PlayerRef, record: TransactionRecord) {
        let Some(entry) = self
            .purchases
            .round_mut(round)
            .and_then(|purchases| purchases.entry(&player.name, player.team))
        else {
            return;
        };
        tracing::debug!(
            round,
            player = %player.name,
            team = player.team.label(),
            item = %record.item,
            action = ?record.action,
            time = format_args!("{:.2}", record.time),
            "transaction"
        );
        entry.purchases.push(record);
    }

    fn on_chat(&mut self, tick: i32, sender: &str, text: &str, team_only: bool) {
        let Some(round) = self.rounds.current().filter(|round| round.started) else {
            return;
        };
        let team = self
            .roster
            .get(sender)
            .map_or(Team::Unassigned.label(), |team| team.label());

        let message = ChatMessage {
            round: round.number,
            time: round.seconds_since_freeze_start(tick, self.tick_rate),
            player_name: sender.to_string(),
            team: team.to_string(),
            message: text.to_string(),
            is_team_chat: team_only,
        };
        self.analytics.record_chat(message);
    }

    fn on_round_end(&mut self, tick: i32, warmup: bool, players: &[PlayerState]) {
        let open = self.rounds.current().map(|round| round.number);
        let Some(round) = self.rounds.on_round_end(tick, warmup) else {
            match open {
                Some(number) => {
                    tracing::warn!(round = number, tick, "round ended during warmup; discarding it");
                    self.discard_in_flight(Some(number));
                }
                None if warmup => tracing::debug!(tick, "warmup round ended"),
                None => tracing::warn!(tick, "round end with no open round"),
            }
            return;
        };

        let number = round.number;
        self.update_roster(players);
        tracing::info!(round = number, tick, "round ended");
        self.analytics
            .record_freeze(number, round.freeze_duration(self.tick_rate), round.halftime);

        if let Some(purchases) = self.purchases.round(number) {
            let (t, ct) = purchases.transaction_counts();
            tracing::info!(round = number, t, ct, "transactions recorded");
            self.money.adjust_round(number, purchases);
        }

        let sides: HashMap<ParticipantId, Team> =
            players.iter().map(|p| (p.id, p.team)).collect();
        let tracks = self.recorder.take_recordings();
        let count = tracks.len();
        for track in tracks {
            let team = sides
                .get(&track.id)
                .copied()
                .filter(|team| team.is_playing())
                .unwrap_or(track.team);
            self.write_recording(number, team, track.recording);
        }
        tracing::info!(round = number, recordings = count, "round recordings processed");
        self.rounds_completed += 1;
    }

    fn write_recording(&mut self, round: u32, team: Team, mut recording: Recording) {
        let name = recording.header.name.clone();
        let Some(path) = recording_path(round, team, &name) else {
            tracing::warn!(round, player = %name, team = team.label(), "participant not on a playing side; recording skipped");
            return;
        };

        self.normalizer.normalize(&mut recording);
        let result = encode_recording(&recording).and_then(|bytes| self.store.write(&path, &bytes));
        let shown = self.store.display_path(&path);
        match result {
            Ok(()) => {
                tracing::debug!(round, player = %name, frames = recording.tick_count(), path = %shown.display(), "recording saved");
                self.recordings_written += 1;
            }
            Err(e) => {
                tracing::error!(round, player = %name, path = %shown.display(), error = %e, "failed to save recording");
                self.write_failures += 1;
            }
        }
    }

    fn discard_in_flight(&mut self, round: Option<u32>) {
        if let Some(round) = round {
            self.purchases.discard_round(round);
            self.money.discard_round(round);
        }
        self.recorder.clear();
        self.buttons.clear();
        self.weapons.reset();
    }

    fn update_roster(&mut self, players: &[PlayerState]) {
        self.roster.clear();
        self.roster.extend(
            players
                .iter()
                .filter(|p| p.team.is_playing())
                .map(|p| (p.name.clone(), p.team)),
        );
    }
}

/// Whether the item takes part in purchase accounting.
fn is_counted(kind: Equipment) -> bool {
    kind != Equipment::Unknown && !kind.is_transaction_filtered()
}
