//! Round lifecycle
//!
//! Tracks warmup, freeze time, the post-freeze buy window and round end, and
//! tells the session which transitions actually happened so it can gate the
//! economy and capture components.
//!
//! ```text
//! Warmup ──round start──▶ FreezeTime ──freeze end──▶ Active ──round end──▶ Ended
//!    ▲                        ▲                                              │
//!    │                        └──────────────────round start─────────────────┘
//!    └──────── round start during warmup after the game started (reset) ─────
//! ```

/// Lifecycle phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RoundPhase {
    #[default]
    Warmup,
    FreezeTime,
    Active,
    Ended,
}

/// One open round.
#[derive(Debug, Clone, PartialEq)]
pub struct RoundInfo {
    pub number: u32,
    pub freeze_start: i32,
    pub freeze_end: i32,
    pub round_end: Option<i32>,
    pub halftime: bool,
    pub started: bool,
    /// Last tick at which pickups still count as purchases.
    pub buy_time_end: Option<i32>,
    /// Tick at which final inventories are snapshotted.
    pub inventory_check_tick: Option<i32>,
    pub inventory_checked: bool,
}

impl RoundInfo {
    fn open(number: u32, tick: i32) -> Self {
        Self {
            number,
            freeze_start: tick,
            freeze_end: tick,
            round_end: None,
            halftime: false,
            started: true,
            buy_time_end: None,
            inventory_check_tick: None,
            inventory_checked: false,
        }
    }

    /// Whether freeze time has not ended yet.
    pub fn in_freeze_time(&self) -> bool {
        self.buy_time_end.is_none()
    }

    /// Freeze time or the post-freeze extension.
    pub fn in_buy_window(&self, tick: i32) -> bool {
        match self.buy_time_end {
            None => true,
            Some(end) => tick <= end,
        }
    }

    /// Seconds elapsed since freeze time started.
    pub fn seconds_since_freeze_start(&self, tick: i32, tick_rate: f64) -> f64 {
        (tick - self.freeze_start) as f64 / tick_rate
    }

    /// Freeze time length in seconds.
    pub fn freeze_duration(&self, tick_rate: f64) -> f64 {
        (self.freeze_end - self.freeze_start) as f64 / tick_rate
    }

    /// Whether the final inventory snapshot is due at `tick`.
    pub fn inventory_check_due(&self, tick: i32) -> bool {
        !self.inventory_checked && self.inventory_check_tick.is_some_and(|check| tick >= check)
    }
}

/// Outcome of a round-start signal.
#[derive(Debug, Clone, PartialEq)]
pub enum RoundStartOutcome {
    /// Round opened with this number.
    Opened(u32),
    /// Warmup round before the game started.
    SkippedWarmup,
    /// Warmup re-entered after the game started; everything in flight was dropped.
    Reset { discarded_round: Option<u32> },
    /// A round is already open and started.
    Duplicate { open_round: u32 },
}

/// Round state machine.
#[derive(Debug, Default)]
pub struct RoundMachine {
    phase: RoundPhase,
    game_started: bool,
    round_counter: u32,
    current: Option<RoundInfo>,
}

impl RoundMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> RoundPhase {
        self.phase
    }

    pub fn game_started(&self) -> bool {
        self.game_started
    }

    pub fn current(&self) -> Option<&RoundInfo> {
        self.current.as_ref()
    }

    pub fn current_mut(&mut self) -> Option<&mut RoundInfo> {
        self.current.as_mut()
    }

    /// Rounds opened since the game (re)started.
    pub fn rounds_played(&self) -> u32 {
        self.round_counter
    }

    /// Whether per-tick capture should run.
    pub fn is_capturing(&self) -> bool {
        self.game_started && self.current.as_ref().is_some_and(|round| round.started)
    }

    pub fn on_round_start(&mut self, tick: i32, warmup: bool) -> RoundStartOutcome {
        if warmup {
            if !self.game_started {
                self.phase = RoundPhase::Warmup;
                return RoundStartOutcome::SkippedWarmup;
            }
            let discarded_round = self.current.take().map(|round| round.number);
            self.game_started = false;
            self.round_counter = 0;
            self.phase = RoundPhase::Warmup;
            return RoundStartOutcome::Reset { discarded_round };
        }

        if let Some(round) = self.current.as_ref().filter(|round| round.started) {
            return RoundStartOutcome::Duplicate {
                open_round: round.number,
            };
        }

        self.game_started = true;
        self.round_counter += 1;
        self.current = Some(RoundInfo::open(self.round_counter, tick));
        self.phase = RoundPhase::FreezeTime;
        RoundStartOutcome::Opened(self.round_counter)
    }

    /// Ends freeze time and opens the buy extension window.
    ///
    /// Returns `None` when no round is open.
    pub fn on_freeze_time_end(&mut self, tick: i32, extension_ticks: i32) -> Option<&RoundInfo> {
        let round = self.current.as_mut()?;
        round.freeze_end = tick;
        round.buy_time_end = Some(tick + extension_ticks);
        round.inventory_check_tick = Some(tick + extension_ticks);
        self.phase = RoundPhase::Active;
        Some(round)
    }

    /// Flags the open round as the halftime round. Returns the round number.
    pub fn on_half_ended(&mut self) -> Option<u32> {
        let round = self.current.as_mut()?;
        round.halftime = true;
        Some(round.number)
    }

    /// Closes the open round and hands it back for finalization.
    ///
    /// During warmup or before the game started, any open round is discarded
    /// and `None` is returned.
    pub fn on_round_end(&mut self, tick: i32, warmup: bool) -> Option<RoundInfo> {
        if warmup || !self.game_started {
            self.current = None;
            return None;
        }
        let mut round = self.current.take()?;
        round.round_end = Some(tick);
        self.phase = RoundPhase::Ended;
        Some(round)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_round_lifecycle() {
        let mut rounds = RoundMachine::new();
        assert_eq!(rounds.phase(), RoundPhase::Warmup);
        assert!(!rounds.is_capturing());

        assert_eq!(rounds.on_round_start(100, false), RoundStartOutcome::Opened(1));
        assert_eq!(rounds.phase(), RoundPhase::FreezeTime);
        assert!(rounds.is_capturing());
        assert!(rounds.current().unwrap().in_freeze_time());

        let round = rounds.on_freeze_time_end(1380, 1280).unwrap();
        assert_eq!(round.buy_time_end, Some(2660));
        assert_eq!(round.freeze_duration(128.0), 10.0);
        assert_eq!(rounds.phase(), RoundPhase::Active);

        let ended = rounds.on_round_end(5000, false).unwrap();
        assert_eq!(ended.number, 1);
        assert_eq!(ended.round_end, Some(5000));
        assert_eq!(rounds.phase(), RoundPhase::Ended);
        assert!(rounds.current().is_none());

        assert_eq!(rounds.on_round_start(5200, false), RoundStartOutcome::Opened(2));
    }

    #[test]
    fn test_duplicate_round_start_is_ignored() {
        let mut rounds = RoundMachine::new();
        rounds.on_round_start(10, false);
        assert_eq!(
            rounds.on_round_start(12, false),
            RoundStartOutcome::Duplicate { open_round: 1 }
        );
        assert_eq!(rounds.rounds_played(), 1);
        assert_eq!(rounds.current().unwrap().freeze_start, 10);
    }

    #[test]
    fn test_warmup_reset_discards_open_round() {
        let mut rounds = RoundMachine::new();
        assert_eq!(rounds.on_round_start(0, true), RoundStartOutcome::SkippedWarmup);

        rounds.on_round_start(10, false);
        rounds.on_round_end(90, false);
        rounds.on_round_start(100, false);

        assert_eq!(
            rounds.on_round_start(200, true),
            RoundStartOutcome::Reset {
                discarded_round: Some(2)
            }
        );
        assert!(!rounds.game_started());
        assert_eq!(rounds.phase(), RoundPhase::Warmup);
        assert_eq!(rounds.on_round_start(300, false), RoundStartOutcome::Opened(1));
    }

    #[test]
    fn test_round_end_without_open_round() {
        let mut rounds = RoundMachine::new();
        assert!(rounds.on_round_end(50, false).is_none());

        rounds.on_round_start(10, false);
        rounds.on_round_end(20, false);
        assert!(rounds.on_round_end(30, false).is_none());
    }

    #[test]
    fn test_halftime_flag_and_missing_round() {
        let mut rounds = RoundMachine::new();
        assert_eq!(rounds.on_half_ended(), None);

        rounds.on_round_start(10, false);
        assert_eq!(rounds.on_half_ended(), Some(1));
        assert!(rounds.current().unwrap().halftime);
        assert_eq!(rounds.phase(), RoundPhase::FreezeTime);
    }

    #[test]
    fn test_buy_window_and_inventory_check() {
        let mut rounds = RoundMachine::new();
        rounds.on_round_start(0, false);
        assert!(rounds.current().unwrap().in_buy_window(999_999));

        rounds.on_freeze_time_end(100, 50);
        let round = rounds.current().unwrap();
        assert!(round.in_buy_window(150));
        assert!(!round.in_buy_window(151));
        assert!(!round.inventory_check_due(149));
        assert!(round.inventory_check_due(152));

        rounds.current_mut().unwrap().inventory_checked = true;
        assert!(!rounds.current().unwrap().inventory_check_due(200));
    }
}
