//! Timed plurality vote session
//!
//! At most one session exists at a time. Starting one assembles a candidate
//! list (nominations first, then random cooldown-filtered fill, plus an
//! optional extend option), opens a menu for every eligible player, and arms
//! a per-second heartbeat in the timer queue. Each heartbeat and every
//! deferred callback carries the session id captured when it was scheduled;
//! a mismatch at fire time means the session was restarted or torn down and
//! the callback does nothing.

use std::collections::{HashMap, HashSet};

use chrono::Utc;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use tracing::{debug, info, warn};

use crate::change::ChangeMapManager;
use crate::config::MapVoteConfig;
use crate::events::{EventBus, VoteEvent};
use crate::extend::extend_map;
use crate::host::{CurrentMap, GameHost, MenuOption, MenuSpec, PlayerSlot};
use crate::locale::{MessageKey, Messages};
use crate::maps::{MapCooldown, MapList};
use crate::match_state::MatchState;
use crate::tally::ThresholdTally;
use crate::timer::{TimerAction, TimerQueue};

/// Sentinel candidate value for the "extend current map" menu row.
pub const EXTEND_CANDIDATE: &str = "mapvote.extend";

/// Menu ownership tag; the session only ever closes menus carrying it.
pub const VOTE_MENU_TAG: &str = "mapvote.vote";

/// Shared read-only context threaded through session, change and trigger
/// calls. Borrowed from the coordinator's disjoint fields.
pub struct VoteContext<'a> {
    pub config: &'a MapVoteConfig,
    pub maps: &'a MapList,
    pub cooldown: &'a MapCooldown,
    pub messages: &'a Messages,
    pub bus: &'a EventBus,
}

/// State machine for the timed next-map vote.
pub struct VoteSessionManager {
    active: bool,
    is_rtv: bool,
    /// Apply the winner as soon as the session resolves
    immediate_apply: bool,
    /// Monotonically increasing; bumped on every start and every map load
    id: u64,
    end_time: f64,
    /// Candidate values in menu order; may end with [`EXTEND_CANDIDATE`]
    candidates: Vec<String>,
    /// Ballot per slot; re-voting moves the ballot
    choices: HashMap<PlayerSlot, String>,
    /// Slots that have been shown the menu at least once this session
    received: HashSet<PlayerSlot>,
    rng: StdRng,
}

impl VoteSessionManager {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Deterministic candidate shuffling for tests.
    pub fn with_rng(rng: StdRng) -> Self {
        Self {
            active: false,
            is_rtv: false,
            immediate_apply: false,
            id: 0,
            end_time: 0.0,
            candidates: Vec::new(),
            choices: HashMap::new(),
            received: HashSet::new(),
            rng,
        }
    }

    pub fn active(&self) -> bool {
        self.active
    }

    pub fn is_rtv(&self) -> bool {
        self.is_rtv
    }

    pub fn current_id(&self) -> u64 {
        self.id
    }

    pub fn candidates(&self) -> &[String] {
        &self.candidates
    }

    /// Whole seconds until the session closes, never negative.
    pub fn remaining_secs(&self, now: f64) -> u32 {
        (self.end_time - now).ceil().max(0.0) as u32
    }

    /// Current ballot count for a candidate value.
    pub fn tally_for(&self, value: &str) -> usize {
        self.choices.values().filter(|c| c.as_str() == value).count()
    }

    /// Map-load reset. Bumping the id here keeps callbacks scheduled on the
    /// previous map inert even if the host failed to clear its own timers.
    pub fn reset(&mut self) {
        self.active = false;
        self.is_rtv = false;
        self.immediate_apply = false;
        self.id += 1;
        self.candidates.clear();
        self.choices.clear();
        self.received.clear();
    }

    /// Open a vote session. Returns false when one is already running or no
    /// candidate could be assembled.
    pub fn start(
        &mut self,
        ctx: &VoteContext<'_>,
        host: &mut dyn GameHost,
        state: &mut MatchState,
        timers: &mut TimerQueue,
        is_rtv: bool,
    ) -> bool {
        if self.active {
            debug!("vote session already active, not starting another");
            return false;
        }

        let (duration, maps_to_show) = if is_rtv {
            (ctx.config.rtv.vote_duration, ctx.config.rtv.maps_to_show)
        } else {
            (
                ctx.config.end_of_map.vote_duration,
                ctx.config.end_of_map.maps_to_show,
            )
        };

        let candidates = self.build_candidates(ctx, host, state, is_rtv, maps_to_show);
        // Nominations are consumed by the pool they seeded
        state.nominations.clear();
        let immediate = is_rtv && ctx.config.rtv.change_map_immediately;
        self.activate(ctx, host, timers, candidates, duration, is_rtv, immediate)
    }

    /// Open a session over a caller-supplied candidate list (the admin
    /// custom-vote path). The list is used verbatim, minus maps on cooldown.
    pub fn start_custom(
        &mut self,
        ctx: &VoteContext<'_>,
        host: &mut dyn GameHost,
        timers: &mut TimerQueue,
        candidates: &[String],
        immediate_apply: bool,
    ) -> bool {
        if self.active {
            debug!("vote session already active, not starting another");
            return false;
        }

        let current = host.current_map();
        let candidates: Vec<String> = candidates
            .iter()
            .filter(|name| match ctx.maps.by_name(name) {
                Some(map) => !ctx.cooldown.is_map_on_cooldown(map, &current),
                None => !ctx.cooldown.is_on_cooldown(name, &current),
            })
            .cloned()
            .collect();
        let duration = ctx.config.end_of_map.vote_duration;
        self.activate(ctx, host, timers, candidates, duration, false, immediate_apply)
    }

    fn activate(
        &mut self,
        ctx: &VoteContext<'_>,
        host: &mut dyn GameHost,
        timers: &mut TimerQueue,
        candidates: Vec<String>,
        duration: u32,
        is_rtv: bool,
        immediate_apply: bool,
    ) -> bool {
        if candidates.is_empty() {
            warn!("no eligible candidate maps, vote not started");
            return false;
        }

        self.id += 1;
        self.active = true;
        self.is_rtv = is_rtv;
        self.immediate_apply = immediate_apply;
        self.candidates = candidates;
        self.choices.clear();
        self.received.clear();

        let now = host.game_time();
        self.end_time = now + duration as f64;
        timers.schedule(now + 1.0, Some(self.id), TimerAction::SessionTick);

        host.chat_all(&ctx.messages.line(MessageKey::VoteStarted, &[]));
        self.refresh_menus(ctx, host, now, true);

        info!(
            session_id = self.id,
            is_rtv,
            candidates = self.candidates.len(),
            duration,
            "vote session started"
        );
        ctx.bus.publish(VoteEvent::SessionStarted {
            session_id: self.id,
            candidates: self.candidates.clone(),
            duration_secs: duration,
            is_rtv,
            timestamp: Utc::now(),
        });
        true
    }

    /// Per-second heartbeat, dispatched from the timer queue.
    pub fn run_timer(
        &mut self,
        ctx: &VoteContext<'_>,
        host: &mut dyn GameHost,
        state: &mut MatchState,
        timers: &mut TimerQueue,
        change: &mut ChangeMapManager,
        rtv_tally: &mut ThresholdTally,
        session_id: u64,
    ) {
        if !self.active || session_id != self.id {
            debug!(session_id, live = self.id, "stale session tick ignored");
            return;
        }

        let now = host.game_time();
        if self.remaining_secs(now) == 0 {
            self.resolve(ctx, host, state, timers, change, rtv_tally);
        } else {
            self.refresh_menus(ctx, host, now, false);
            timers.schedule(now + 1.0, Some(self.id), TimerAction::SessionTick);
        }
    }

    /// Cast or move a ballot. Returns false when no session is running or
    /// the value is not a candidate.
    pub fn register_vote(
        &mut self,
        ctx: &VoteContext<'_>,
        host: &mut dyn GameHost,
        slot: PlayerSlot,
        value: &str,
    ) -> bool {
        if !self.active {
            return false;
        }
        // Spectators never receive the menu, but a stale or forged menu
        // callback can still name one.
        if !ctx.config.allow_spectators_to_vote
            && host
                .players()
                .iter()
                .any(|p| p.slot == slot && p.is_spectator())
        {
            return false;
        }
        let Some(candidate) = self
            .candidates
            .iter()
            .find(|c| c.as_str() == value)
            .cloned()
        else {
            return false;
        };

        self.choices.insert(slot, candidate.clone());

        let label = if candidate == EXTEND_CANDIDATE {
            ctx.messages.render(MessageKey::ExtendOption, &[])
        } else {
            candidate.clone()
        };
        host.chat_player(
            slot,
            &ctx.messages.line(MessageKey::YouVoted, &[("map", label)]),
        );
        host.close_menu(slot);

        let now = host.game_time();
        self.refresh_menus(ctx, host, now, false);
        ctx.bus.publish(VoteEvent::BallotCast {
            session_id: self.id,
            slot,
            choice: candidate,
            timestamp: Utc::now(),
        });
        true
    }

    /// Withdraw a ballot (the disconnect path, and unrtv mid-session).
    pub fn remove_vote(&mut self, slot: PlayerSlot) -> bool {
        self.choices.remove(&slot).is_some()
    }

    /// Reopen the menu for one player so they can move their ballot.
    pub fn reopen_menu(&mut self, ctx: &VoteContext<'_>, host: &mut dyn GameHost, slot: PlayerSlot) {
        if !self.active {
            return;
        }
        let now = host.game_time();
        let menu = self.build_menu(ctx, now);
        host.show_menu(slot, menu);
        self.received.insert(slot);
    }

    /// Tear the session down without picking a winner.
    pub fn cancel(&mut self, ctx: &VoteContext<'_>, host: &mut dyn GameHost) {
        if !self.active {
            return;
        }
        info!(session_id = self.id, "vote session cancelled");
        let cancelled_id = self.id;
        self.cleanup(host);
        host.chat_all(&ctx.messages.line(MessageKey::VoteCancelled, &[]));
        ctx.bus.publish(VoteEvent::SessionCancelled {
            session_id: cancelled_id,
            timestamp: Utc::now(),
        });
    }

    /// Close the session and act on the outcome.
    pub fn resolve(
        &mut self,
        ctx: &VoteContext<'_>,
        host: &mut dyn GameHost,
        state: &mut MatchState,
        timers: &mut TimerQueue,
        change: &mut ChangeMapManager,
        rtv_tally: &mut ThresholdTally,
    ) {
        if !self.active {
            return;
        }
        let resolved_id = self.id;
        let was_rtv = self.is_rtv;
        let immediate_apply = self.immediate_apply;
        let now = host.game_time();

        if was_rtv {
            rtv_tally.clear();
        }

        // An RTV vote nobody participated in fails and locks RTV out for a
        // while instead of changing the map under the players.
        if was_rtv && self.choices.is_empty() {
            warn!(session_id = resolved_id, "rtv vote expired with no ballots");
            state.rtv_cooldown_end_time =
                Some(now + ctx.config.rtv.vote_cooldown_time as f64);
            host.chat_all(&ctx.messages.line(MessageKey::RtvFailedNoVotes, &[]));
            self.cleanup(host);
            ctx.bus.publish(VoteEvent::SessionFailed {
                session_id: resolved_id,
                timestamp: Utc::now(),
            });
            return;
        }

        let (winner, votes) = self.pick_winner();
        self.cleanup(host);

        if winner == EXTEND_CANDIDATE {
            info!(session_id = resolved_id, votes, "extend option won the vote");
            host.chat_all(&ctx.messages.line(
                MessageKey::ExtendVotePassed,
                &[("votes", votes.to_string())],
            ));
            extend_map(
                host,
                state,
                ctx.messages,
                ctx.bus,
                ctx.config.end_of_map.extend_time_step,
                ctx.config.end_of_map.extend_round_step,
            );
            return;
        }

        info!(session_id = resolved_id, winner = %winner, votes, "vote session resolved");
        host.chat_all(&ctx.messages.line(
            MessageKey::VoteEnded,
            &[("map", winner.clone()), ("votes", votes.to_string())],
        ));
        ctx.bus.publish(VoteEvent::SessionResolved {
            session_id: resolved_id,
            winner: winner.clone(),
            votes,
            timestamp: Utc::now(),
        });

        let immediately = immediate_apply || state.match_ended;
        change.schedule(ctx, host, state, timers, &winner, immediately, was_rtv);
    }

    fn cleanup(&mut self, host: &mut dyn GameHost) {
        self.active = false;
        self.is_rtv = false;
        self.immediate_apply = false;
        for player in host.players() {
            if host.open_menu_tag(player.slot).as_deref() == Some(VOTE_MENU_TAG) {
                host.close_menu(player.slot);
            }
        }
        self.candidates.clear();
        self.choices.clear();
        self.received.clear();
    }

    /// Winner is the highest tally; ties go to the earlier candidate in menu
    /// order. With no ballots at all a uniformly random pick decides, drawn
    /// from the map rows only: the extend row needs at least one actual
    /// ballot to win.
    fn pick_winner(&mut self) -> (String, usize) {
        if self.choices.is_empty() {
            let pool: Vec<&String> = self
                .candidates
                .iter()
                .filter(|c| c.as_str() != EXTEND_CANDIDATE)
                .collect();
            let idx = self.rng.gen_range(0..pool.len());
            return (pool[idx].clone(), 0);
        }

        let mut winner = self.candidates[0].clone();
        let mut best = self.tally_for(&winner);
        for candidate in &self.candidates[1..] {
            let votes = self.tally_for(candidate);
            if votes > best {
                best = votes;
                winner = candidate.clone();
            }
        }
        (winner, best)
    }

    fn build_candidates(
        &mut self,
        ctx: &VoteContext<'_>,
        host: &dyn GameHost,
        state: &MatchState,
        is_rtv: bool,
        maps_to_show: usize,
    ) -> Vec<String> {
        let current = host.current_map();
        let max = maps_to_show.max(1);
        let mut chosen: Vec<String> = Vec::new();

        // Nominations first, shuffled so a full nomination book does not
        // always favor the earliest slots. Cooldown is re-checked here: a
        // nomination can predate the ledger entry that excludes it.
        let mut nominated: Vec<String> = state
            .nominations
            .distinct()
            .into_iter()
            .filter_map(|name| ctx.maps.by_name(&name).cloned())
            .filter(|m| !is_current_map(ctx.maps, &current, &m.name))
            .filter(|m| !ctx.cooldown.is_map_on_cooldown(m, &current))
            .map(|m| m.name)
            .collect();
        nominated.shuffle(&mut self.rng);
        chosen.extend(nominated.into_iter().take(max));

        // Random fill from the pool, honoring the cooldown ledger.
        let mut pool: Vec<&crate::maps::Map> = ctx
            .maps
            .all()
            .iter()
            .filter(|m| !is_current_map(ctx.maps, &current, &m.name))
            .filter(|m| !chosen.iter().any(|c| c.eq_ignore_ascii_case(&m.name)))
            .collect();
        pool.shuffle(&mut self.rng);

        // A small pool can leave the list short of `max`; a short menu
        // beats re-offering a recently played map.
        for map in &pool {
            if chosen.len() >= max {
                break;
            }
            if !ctx.cooldown.is_map_on_cooldown(map, &current) {
                chosen.push(map.name.clone());
            }
        }

        // The extend row rides along outside the map budget.
        if !is_rtv
            && ctx.config.end_of_map.allow_extend
            && state.extends_left > 0
            && !chosen.is_empty()
        {
            chosen.push(EXTEND_CANDIDATE.to_string());
        }
        chosen
    }

    fn build_menu(&self, ctx: &VoteContext<'_>, now: f64) -> MenuSpec {
        let options = self
            .candidates
            .iter()
            .map(|candidate| {
                let label = if candidate == EXTEND_CANDIDATE {
                    ctx.messages.render(MessageKey::ExtendOption, &[])
                } else {
                    candidate.clone()
                };
                MenuOption {
                    label: format!("{} ({})", label, self.tally_for(candidate)),
                    value: candidate.clone(),
                    enabled: true,
                }
            })
            .collect();
        MenuSpec {
            tag: VOTE_MENU_TAG.to_string(),
            title: ctx.messages.render(
                MessageKey::VoteMenuTitle,
                &[("seconds", self.remaining_secs(now).to_string())],
            ),
            options,
        }
    }

    /// Menu distribution policy. `force` opens the menu for everyone who has
    /// not voted; otherwise only players who already have it open get the
    /// refreshed tallies, plus late joiners who never received it.
    fn refresh_menus(
        &mut self,
        ctx: &VoteContext<'_>,
        host: &mut dyn GameHost,
        now: f64,
        force: bool,
    ) {
        let menu = self.build_menu(ctx, now);
        let allow_spectators = ctx.config.allow_spectators_to_vote;

        for player in host.players() {
            if !player.is_valid || player.is_bot {
                continue;
            }
            let slot = player.slot;
            let open = host.open_menu_tag(slot).as_deref() == Some(VOTE_MENU_TAG);

            if player.is_spectator() && !allow_spectators {
                if open {
                    host.close_menu(slot);
                }
                continue;
            }

            if self.choices.contains_key(&slot) {
                if open {
                    host.show_menu(slot, menu.clone());
                }
                continue;
            }

            if force || !self.received.contains(&slot) {
                host.show_menu(slot, menu.clone());
                self.received.insert(slot);
            } else if open {
                host.show_menu(slot, menu.clone());
            }
        }
    }
}

impl Default for VoteSessionManager {
    fn default() -> Self {
        Self::new()
    }
}

fn is_current_map(maps: &MapList, current: &CurrentMap, name: &str) -> bool {
    if name.eq_ignore_ascii_case(&current.name) {
        return true;
    }
    maps.by_current(current)
        .is_some_and(|m| m.name.eq_ignore_ascii_case(name))
}
