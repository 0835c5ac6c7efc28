//! Top-level coordinator
//!
//! [`MapVote`] owns every component and is the single object the host embeds.
//! The host wires three things to it: a once-per-second call to
//! [`tick`](MapVote::tick), its game-event hooks to the `on_*` handlers, and
//! chat/menu input to the command surface in [`crate::commands`].

use std::collections::HashMap;
use std::path::Path;

use chrono::Utc;
use rand::rngs::StdRng;
use tracing::info;

use crate::change::ChangeMapManager;
use crate::config::{ConfigError, MapVoteConfig};
use crate::events::{EventBus, VoteEvent};
use crate::host::{GameHost, PlayerSlot, CVAR_TIME_LIMIT};
use crate::locale::Messages;
use crate::maps::{MapCooldown, MapList};
use crate::match_state::MatchState;
use crate::session::{VoteContext, VoteSessionManager};
use crate::tally::ThresholdTally;
use crate::timer::{TimerAction, TimerQueue};
use crate::trigger;

/// Borrow the read-only context out of disjoint coordinator fields so the
/// mutable components can be passed alongside it.
macro_rules! ctx {
    ($self:ident) => {
        VoteContext {
            config: &$self.config,
            maps: &$self.maps,
            cooldown: &$self.cooldown,
            messages: &$self.messages,
            bus: &$self.bus,
        }
    };
}

/// The embedded vote subsystem.
pub struct MapVote {
    pub(crate) config: MapVoteConfig,
    pub(crate) maps: MapList,
    pub(crate) cooldown: MapCooldown,
    pub(crate) messages: Messages,
    pub(crate) state: MatchState,
    pub(crate) session: VoteSessionManager,
    pub(crate) change: ChangeMapManager,
    pub(crate) rtv_tally: ThresholdTally,
    pub(crate) extend_tally: ThresholdTally,
    /// Per-map threshold tallies for direct map votes
    pub(crate) map_tallies: HashMap<String, ThresholdTally>,
    pub(crate) timers: TimerQueue,
    pub(crate) bus: EventBus,
}

impl MapVote {
    pub fn new(config: MapVoteConfig) -> Self {
        let maps = MapList::new(config.maps.clone());
        let cooldown = MapCooldown::new(config.maps_in_cooldown);
        let messages = Messages::new(config.messages.clone());
        Self {
            config,
            maps,
            cooldown,
            messages,
            state: MatchState::default(),
            session: VoteSessionManager::new(),
            change: ChangeMapManager::new(),
            rtv_tally: ThresholdTally::new(),
            extend_tally: ThresholdTally::new(),
            map_tallies: HashMap::new(),
            timers: TimerQueue::new(),
            bus: EventBus::new(),
        }
    }

    /// Load configuration from a TOML file and build the subsystem.
    pub fn from_config_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Ok(Self::new(MapVoteConfig::load_toml(path)?))
    }

    /// Deterministic candidate shuffling for tests.
    pub fn with_session_rng(config: MapVoteConfig, rng: StdRng) -> Self {
        let mut this = Self::new(config);
        this.session = VoteSessionManager::with_rng(rng);
        this
    }

    /// Subscribe to vote lifecycle events.
    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<VoteEvent> {
        self.bus.subscribe()
    }

    pub fn vote_active(&self) -> bool {
        self.session.active()
    }

    /// Display name of the decided next map, if any.
    pub fn next_map(&self) -> Option<&str> {
        self.state.next_map.as_deref()
    }

    /// Distinct nominated map names awaiting the next session.
    pub fn nominations(&self) -> Vec<String> {
        self.state.nominations.distinct()
    }

    pub fn clear_nominations(&mut self) {
        self.state.nominations.clear();
    }

    /// Withdraw a ballot from the active session without closing it.
    pub fn retract_vote(&mut self, slot: PlayerSlot) -> bool {
        self.session.remove_vote(slot)
    }

    /// Once-per-second pump: dispatch due timer entries, then evaluate the
    /// automated end-of-map trigger.
    pub fn tick(&mut self, host: &mut dyn GameHost) {
        let now = host.game_time();
        for entry in self.timers.drain_due(now) {
            match entry.action {
                TimerAction::SessionTick => {
                    let ctx = ctx!(self);
                    self.session.run_timer(
                        &ctx,
                        host,
                        &mut self.state,
                        &mut self.timers,
                        &mut self.change,
                        &mut self.rtv_tally,
                        entry.session_id.unwrap_or(0),
                    );
                }
                TimerAction::PerformMapChange => {
                    let ctx = ctx!(self);
                    self.change.perform(&ctx, host);
                }
            }
        }

        if !self.state.match_ended {
            self.check_auto_trigger(host, false);
        }
    }

    // --- lifecycle handlers, called from the host's game-event hooks ---

    /// A new map finished loading.
    pub fn on_map_load(&mut self, host: &mut dyn GameHost) {
        let current = host.current_map();
        info!(map = %current.name, "map loaded");

        self.state
            .reset_for_map_load(self.config.end_of_map.extend_limit);
        self.state.map_start_time = host.game_time();
        self.session.reset();
        self.change.reset();
        self.timers.clear();
        self.rtv_tally.clear();
        self.extend_tally.clear();
        self.map_tallies.clear();
        self.cooldown
            .record_map_start(&current.name, current.workshop_id.as_deref());
    }

    pub fn on_warmup_announce(&mut self) {
        self.state.warmup_running = true;
    }

    /// Warmup over; the match clock starts here.
    pub fn on_warmup_end(&mut self, host: &mut dyn GameHost) {
        self.state.warmup_running = false;
        self.state.map_start_time = host.game_time();
    }

    /// Live match begins: round telemetry starts from zero and warmup-era
    /// nominations do not carry into the match.
    pub fn on_match_start(&mut self, host: &mut dyn GameHost) {
        self.state.warmup_running = false;
        self.state.rounds_played = 0;
        self.state.map_start_time = host.game_time();
        self.state.nominations.clear();
    }

    pub fn on_round_start(&mut self, host: &mut dyn GameHost) {
        if !self.state.warmup_running {
            self.check_auto_trigger(host, false);
        }
    }

    pub fn on_round_end(&mut self, host: &mut dyn GameHost) {
        if self.state.warmup_running {
            return;
        }
        self.state.rounds_played += 1;
        self.check_auto_trigger(host, false);
    }

    /// Match point reached: make sure the next map gets voted on even if no
    /// margin fired yet.
    pub fn on_match_point(&mut self, host: &mut dyn GameHost) {
        self.check_auto_trigger(host, true);
    }

    /// Win panel shown. Applies a parked map change, or lets a still-running
    /// session resolve into an immediate one.
    pub fn on_win_panel(&mut self, host: &mut dyn GameHost) {
        self.state.match_ended = true;
        if !self.session.active() && self.state.map_change_scheduled {
            let ctx = ctx!(self);
            self.change
                .execute(&ctx, host, &mut self.state, &mut self.timers);
        }
    }

    /// A participant left; their votes and nomination leave with them.
    pub fn on_player_disconnect(&mut self, host: &mut dyn GameHost, slot: PlayerSlot) {
        self.rtv_tally.remove_vote(slot);
        self.extend_tally.remove_vote(slot);
        for tally in self.map_tallies.values_mut() {
            tally.remove_vote(slot);
        }
        self.session.remove_vote(slot);
        self.state.nominations.remove(slot);

        // A shrinking denominator can push a pending quorum over the line.
        self.recheck_rtv_quorum(host);
    }

    // --- automated trigger ---

    /// Gate and evaluate the end-of-map trigger; start the session when it
    /// fires. `forced` bypasses the margins and the re-arm window.
    pub(crate) fn check_auto_trigger(&mut self, host: &mut dyn GameHost, forced: bool) {
        if !self.config.end_of_map.enabled {
            return;
        }
        if self.session.active()
            || self.state.map_change_scheduled
            || self.change.change_in_flight()
            || self.state.warmup_running
        {
            return;
        }
        let now = host.game_time();
        if !forced && self.state.trigger_window_blocks(now) {
            return;
        }
        if !forced && !trigger::should_start_vote(host, &self.config.end_of_map, &self.state) {
            return;
        }

        info!(forced, "end-of-map trigger fired");
        self.bus.publish(VoteEvent::TriggerFired {
            timestamp: Utc::now(),
        });
        // Re-arm past this session so a failed start cannot fire every tick
        self.state
            .arm_trigger_window(now + self.config.end_of_map.vote_duration as f64 + 1.0);
        let ctx = ctx!(self);
        self.session
            .start(&ctx, host, &mut self.state, &mut self.timers, false);
    }

    // --- queries used by the command surface ---

    /// Seconds left on the map clock, or `None` without a time limit.
    pub fn time_remaining(&self, host: &dyn GameHost) -> Option<f64> {
        let limit = host.cvar_f32(CVAR_TIME_LIMIT).unwrap_or(0.0);
        if limit <= 0.0 {
            return None;
        }
        let end = self.state.map_start_time + limit as f64 * 60.0;
        Some((end - host.game_time()).max(0.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{CVAR_MAX_ROUNDS, CVAR_TIME_LIMIT};
    use crate::maps::Map;
    use crate::testing::FakeHost;
    use rand::SeedableRng;

    fn seven_maps() -> Vec<Map> {
        vec![
            Map::new("de_mirage", "Mirage"),
            Map::new("de_inferno", "Inferno"),
            Map::new("de_nuke", "Nuke"),
            Map::new("de_ancient", "Ancient"),
            Map::new("de_anubis", "Anubis"),
            Map::new("de_vertigo", "Vertigo"),
            Map::new("de_overpass", "Overpass"),
        ]
    }

    fn subsystem() -> MapVote {
        MapVote::with_session_rng(
            MapVoteConfig::with_maps(seven_maps()),
            StdRng::seed_from_u64(11),
        )
    }

    fn populated_host(players: u32) -> FakeHost {
        let mut host = FakeHost::new();
        for slot in 0..players {
            host.add_player(slot, &format!("player{slot}"), 2 + (slot % 2) as u8);
        }
        host
    }

    #[test]
    fn test_map_load_resets_everything() {
        let mut vote = subsystem();
        let mut host = populated_host(2);
        vote.rtv_tally.add_vote(0);
        vote.state.rounds_played = 12;
        vote.state.nominations.nominate(0, "Nuke");

        vote.on_map_load(&mut host);
        assert_eq!(vote.rtv_tally.count(), 0);
        assert_eq!(vote.state.rounds_played, 0);
        assert!(vote.state.nominations.is_empty());
        assert_eq!(vote.state.extends_left, 3);
    }

    #[test]
    fn test_match_start_clears_nominations_and_rounds() {
        let mut vote = subsystem();
        let mut host = populated_host(2);
        vote.on_map_load(&mut host);
        vote.state.nominations.nominate(0, "Nuke");
        vote.state.rounds_played = 3;
        host.advance_time(45.0);

        vote.on_match_start(&mut host);
        assert!(vote.state.nominations.is_empty());
        assert_eq!(vote.state.rounds_played, 0);
        assert_eq!(vote.state.map_start_time, host.game_time());
    }

    #[test]
    fn test_trigger_starts_session_on_round_margin() {
        let mut vote = subsystem();
        let mut host = populated_host(4);
        host.set_cvar_i32(CVAR_MAX_ROUNDS, 24);
        vote.on_map_load(&mut host);
        vote.state.rounds_played = 20;

        vote.tick(&mut host);
        assert!(vote.vote_active());
    }

    #[test]
    fn test_trigger_rearm_window_prevents_restart() {
        let mut vote = subsystem();
        let mut host = populated_host(4);
        host.set_cvar_i32(CVAR_MAX_ROUNDS, 24);
        vote.on_map_load(&mut host);
        vote.state.rounds_played = 20;

        vote.tick(&mut host);
        assert!(vote.vote_active());
        let id = vote.session.current_id();

        // Cancel, then tick within the re-arm window: no restart
        let ctx = ctx!(vote);
        vote.session.cancel(&ctx, &mut host);
        host.advance_time(1.0);
        vote.tick(&mut host);
        assert!(!vote.vote_active());

        // Past the window (and into the next round) it fires again
        host.advance_time(60.0);
        vote.state.rounds_played += 1;
        vote.tick(&mut host);
        assert!(vote.vote_active());
        assert!(vote.session.current_id() > id);
    }

    #[test]
    fn test_session_resolves_after_duration() {
        let mut vote = subsystem();
        let mut host = populated_host(4);
        host.set_cvar_i32(CVAR_MAX_ROUNDS, 24);
        vote.on_map_load(&mut host);
        vote.state.rounds_played = 20;
        vote.tick(&mut host);
        assert!(vote.vote_active());

        // Walk the clock one second at a time like the host scheduler does
        for _ in 0..=vote.config.end_of_map.vote_duration {
            host.advance_time(1.0);
            vote.tick(&mut host);
        }
        assert!(!vote.vote_active());
        // No extend row winner possible here: nobody voted, random map wins
        assert!(vote.next_map().is_some());
    }

    #[test]
    fn test_win_panel_applies_parked_change() {
        let mut vote = subsystem();
        let mut host = populated_host(2);
        vote.on_map_load(&mut host);

        let ctx = ctx!(vote);
        vote.change.schedule(
            &ctx,
            &mut host,
            &mut vote.state,
            &mut vote.timers,
            "Mirage",
            false,
            false,
        );
        assert!(host.engine_commands().is_empty());

        vote.on_win_panel(&mut host);
        let delay = vote.config.end_of_map.change_map_delay as f64;
        host.advance_time(delay);
        vote.tick(&mut host);

        assert!(host
            .engine_commands()
            .iter()
            .any(|c| c == "change_level de_mirage"));
    }

    #[test]
    fn test_time_margin_fires_via_tick() {
        let mut vote = subsystem();
        let mut host = populated_host(4);
        host.set_cvar_f32(CVAR_TIME_LIMIT, 10.0);
        vote.on_map_load(&mut host);

        host.advance_time(300.0);
        vote.tick(&mut host);
        assert!(!vote.vote_active());

        host.advance_time(185.0);
        vote.tick(&mut host);
        assert!(vote.vote_active());
    }
}
