//! Match telemetry and cross-command state
//!
//! One explicitly owned context object, injected into every component call;
//! nothing here is global. Reset on every map load.

use std::collections::HashMap;

use crate::host::PlayerSlot;

/// Per-slot map nominations feeding the next session's candidate pool.
#[derive(Debug, Clone, Default)]
pub struct NominationBook {
    by_slot: HashMap<PlayerSlot, String>,
}

impl NominationBook {
    /// Record a nomination, overwriting the slot's previous one.
    pub fn nominate(&mut self, slot: PlayerSlot, map_name: impl Into<String>) {
        self.by_slot.insert(slot, map_name.into());
    }

    /// Deduplicated nominated names, case-insensitive.
    pub fn distinct(&self) -> Vec<String> {
        let mut seen: Vec<String> = Vec::new();
        for name in self.by_slot.values() {
            if !seen.iter().any(|s| s.eq_ignore_ascii_case(name)) {
                seen.push(name.clone());
            }
        }
        seen
    }

    /// Drop a slot's nomination (the disconnect path).
    pub fn remove(&mut self, slot: PlayerSlot) {
        self.by_slot.remove(&slot);
    }

    pub fn is_empty(&self) -> bool {
        self.by_slot.is_empty()
    }

    pub fn clear(&mut self) {
        self.by_slot.clear();
    }
}

/// Observed match state plus the flags shared across vote features.
#[derive(Debug, Clone, Default)]
pub struct MatchState {
    /// A winning map is waiting for a round boundary or match end
    pub map_change_scheduled: bool,
    /// Display name of the pending next map
    pub next_map: Option<String>,
    /// The pending change applies as soon as it executes
    pub change_immediately: bool,
    /// The pending change came out of a rock-the-vote session
    pub pending_is_rtv: bool,
    /// Engine clock at warmup end / match start
    pub map_start_time: f64,
    pub rounds_played: u32,
    pub warmup_running: bool,
    /// The win panel has been shown for this map
    pub match_ended: bool,
    /// Extensions still available this map
    pub extends_left: u32,
    /// Earliest round at which the automated trigger may fire again
    pub next_vote_round: u32,
    /// Earliest engine time at which the automated trigger may fire again
    pub next_vote_time: f64,
    /// RTV lockout after a failed quorum session, engine time
    pub rtv_cooldown_end_time: Option<f64>,
    pub nominations: NominationBook,
}

impl MatchState {
    /// Reset everything for a freshly loaded map.
    pub fn reset_for_map_load(&mut self, extend_limit: u32) {
        *self = Self {
            extends_left: extend_limit,
            ..Self::default()
        };
    }

    /// Re-arm window for the automated trigger: not before the next round
    /// and not before `until` on the engine clock.
    pub fn arm_trigger_window(&mut self, until: f64) {
        self.next_vote_round = self.rounds_played + 1;
        self.next_vote_time = until;
    }

    /// Whether the automated trigger is still inside its re-arm window.
    pub fn trigger_window_blocks(&self, now: f64) -> bool {
        self.rounds_played < self.next_vote_round && now < self.next_vote_time
    }
}
