//! One-shot button signals
//!
//! Button presses are not observable directly; discrete events (firing,
//! jumping, using) are queued against the tick they happened on and folded
//! into that tick's frame.

use hashbrown::HashMap;

use crate::event::{ParticipantId, PlayerState};
use crate::replay::types::Buttons;

/// Pending one-shot buttons plus per-participant scope state.
#[derive(Debug, Default)]
pub struct ButtonQueue {
    pending: HashMap<(i32, ParticipantId), Buttons>,
    scoped: HashMap<ParticipantId, bool>,
}

impl ButtonQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `buttons` for the participant's frame at `tick`.
    pub fn signal(&mut self, tick: i32, participant: ParticipantId, buttons: Buttons) {
        *self.pending.entry((tick, participant)).or_default() |= buttons;
    }

    /// Remove and return the buttons queued for exactly this tick.
    pub fn take(&mut self, tick: i32, participant: ParticipantId) -> Buttons {
        self.pending
            .remove(&(tick, participant))
            .unwrap_or_default()
    }

    /// Buttons for a participant's frame: queued signals, a scope toggle since
    /// the last observed tick, and `USE` while defusing or planting.
    pub fn frame_buttons(&mut self, tick: i32, player: &PlayerState) -> Buttons {
        let mut buttons = self.take(tick, player.id);

        if let Some(last) = self.scoped.insert(player.id, player.scoped) {
            if last != player.scoped {
                buttons |= Buttons::ATTACK2;
            }
        }

        if player.defusing || player.planting {
            buttons |= Buttons::USE;
        }
        buttons
    }

    /// Drop signals older than `tick` that no frame consumed.
    pub fn discard_before(&mut self, tick: i32) {
        self.pending.retain(|&(t, _), _| t >= tick);
    }

    /// Forget scope state (round start).
    pub fn reset_scope(&mut self) {
        self.scoped.clear();
    }

    pub fn clear(&mut self) {
        self.pending.clear();
        self.scoped.clear();
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }
}
