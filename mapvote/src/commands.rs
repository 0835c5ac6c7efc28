//! Chat and admin command surface
//!
//! The host maps its chat triggers (`!rtv`, `!nominate`, ...) and admin
//! console commands onto these methods, and routes menu selections back in
//! through [`MapVote::handle_menu_select`].

use chrono::Utc;
use tracing::info;

use crate::coordinator::MapVote;
use crate::events::{QuorumKind, VoteEvent};
use crate::host::{eligible_players, GameHost, MenuOption, MenuSpec, PlayerInfo, PlayerSlot};
use crate::locale::MessageKey;
use crate::session::{VoteContext, VOTE_MENU_TAG};
use crate::tally::required_votes;

/// Menu ownership tag for the nomination list.
pub const NOMINATE_MENU_TAG: &str = "mapvote.nominate";

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

impl MapVote {
    /// `!rtv`: vote to start a rock-the-vote session now.
    pub fn handle_rtv(&mut self, host: &mut dyn GameHost, slot: PlayerSlot) {
        if !self.config.rtv.enabled {
            return;
        }
        let Some(player) = self.eligible_caller(host, slot) else {
            return;
        };

        if self.state.warmup_running && !self.config.rtv.enabled_in_warmup {
            self.reply(host, slot, MessageKey::RtvDisabledInWarmup, &[]);
            return;
        }

        let now = host.game_time();
        if let Some(end) = self.state.rtv_cooldown_end_time {
            if now < end {
                let seconds = (end - now).ceil() as u32;
                self.reply(host, slot, MessageKey::RtvCooldown, &[("seconds", seconds.to_string())]);
                return;
            }
        }

        // Mid-session the command just reopens the menu
        if self.session.active() {
            let ctx = ctx!(self);
            self.session.reopen_menu(&ctx, host, slot);
            return;
        }
        if self.state.map_change_scheduled {
            if let Some(map) = self.state.next_map.clone() {
                self.reply(host, slot, MessageKey::NextMapIs, &[("map", map)]);
            }
            return;
        }

        let eligible = eligible_players(host, self.config.allow_spectators_to_vote).len();
        if eligible < self.config.rtv.min_players as usize {
            self.reply(
                host,
                slot,
                MessageKey::NotEnoughPlayers,
                &[
                    ("count", eligible.to_string()),
                    ("needed", self.config.rtv.min_players.to_string()),
                ],
            );
            return;
        }
        if self.state.rounds_played < self.config.rtv.min_rounds {
            self.reply(host, slot, MessageKey::NotEnoughRounds, &[]);
            return;
        }

        if !self.rtv_tally.add_vote(slot) {
            self.reply(host, slot, MessageKey::RtvAlreadyVoted, &[]);
            return;
        }

        let count = self.rtv_tally.count();
        let needed = required_votes(eligible, self.config.rtv.vote_percentage);
        host.chat_all(&self.messages.line(
            MessageKey::RtvVoted,
            &[
                ("player", player.name.clone()),
                ("count", count.to_string()),
                ("needed", needed.to_string()),
            ],
        ));
        self.bus.publish(VoteEvent::QuorumVote {
            kind: QuorumKind::Rtv,
            slot,
            count,
            needed,
            timestamp: Utc::now(),
        });

        if self
            .rtv_tally
            .has_reached(eligible, self.config.rtv.vote_percentage)
        {
            self.rtv_quorum_reached(host);
        }
    }

    /// `!unrtv`: withdraw a rock-the-vote vote.
    pub fn handle_unrtv(&mut self, host: &mut dyn GameHost, slot: PlayerSlot) {
        if !self.config.rtv.enabled {
            return;
        }
        if !self.rtv_tally.remove_vote(slot) {
            self.reply(host, slot, MessageKey::RtvNotVoted, &[]);
            return;
        }
        if self.session.active() && self.session.is_rtv() {
            self.session.remove_vote(slot);
        }
        self.reply(host, slot, MessageKey::RtvVoteRemoved, &[]);
    }

    /// `!nominate [map]`: put a map forward for the next session. Without an
    /// argument, opens the nomination menu.
    pub fn handle_nominate(&mut self, host: &mut dyn GameHost, slot: PlayerSlot, query: Option<&str>) {
        if !self.config.rtv.enabled || !self.config.rtv.nomination_enabled {
            return;
        }
        let Some(player) = self.eligible_caller(host, slot) else {
            return;
        };

        let Some(query) = query else {
            self.show_nomination_menu(host, slot);
            return;
        };

        let current = host.current_map();
        let Some(map) = self.maps.find(query).cloned() else {
            self.reply(host, slot, MessageKey::MapNotFound, &[("map", query.to_string())]);
            return;
        };
        if self.is_current(&map.name, host) {
            self.reply(host, slot, MessageKey::CannotPickCurrentMap, &[]);
            return;
        }
        if self.cooldown.is_map_on_cooldown(&map, &current) {
            self.reply(host, slot, MessageKey::VotemapCooldown, &[("map", map.name.clone())]);
            return;
        }

        self.state.nominations.nominate(slot, map.name.clone());
        host.chat_all(&self.messages.line(
            MessageKey::NominateSuccess,
            &[("player", player.name), ("map", map.name.clone())],
        ));
        self.bus.publish(VoteEvent::NominationAdded {
            slot,
            map: map.name,
            timestamp: Utc::now(),
        });
    }

    /// `!votemap <map>`: threshold vote to change straight to one map.
    pub fn handle_votemap(&mut self, host: &mut dyn GameHost, slot: PlayerSlot, query: &str) {
        if !self.config.votemap.enabled {
            return;
        }
        let Some(player) = self.eligible_caller(host, slot) else {
            return;
        };
        if self.session.active() || self.state.map_change_scheduled {
            return;
        }

        let current = host.current_map();
        let Some(map) = self.maps.find(query).cloned() else {
            self.reply(host, slot, MessageKey::MapNotFound, &[("map", query.to_string())]);
            return;
        };
        if self.is_current(&map.name, host) {
            self.reply(host, slot, MessageKey::CannotPickCurrentMap, &[]);
            return;
        }
        if self.cooldown.is_map_on_cooldown(&map, &current) {
            self.reply(host, slot, MessageKey::VotemapCooldown, &[("map", map.name.clone())]);
            return;
        }

        let eligible = eligible_players(host, self.config.allow_spectators_to_vote).len();
        if eligible < self.config.votemap.min_players as usize {
            self.reply(
                host,
                slot,
                MessageKey::NotEnoughPlayers,
                &[
                    ("count", eligible.to_string()),
                    ("needed", self.config.votemap.min_players.to_string()),
                ],
            );
            return;
        }

        let added = self
            .map_tallies
            .entry(map.name.clone())
            .or_default()
            .add_vote(slot);
        if !added {
            self.reply(host, slot, MessageKey::VotemapAlreadyVoted, &[("map", map.name.clone())]);
            return;
        }

        let count = self.map_tallies[&map.name].count();
        let needed = required_votes(eligible, self.config.votemap.vote_percentage);
        host.chat_all(&self.messages.line(
            MessageKey::VotemapVoted,
            &[
                ("player", player.name),
                ("map", map.name.clone()),
                ("count", count.to_string()),
                ("needed", needed.to_string()),
            ],
        ));
        self.bus.publish(VoteEvent::QuorumVote {
            kind: QuorumKind::Votemap,
            slot,
            count,
            needed,
            timestamp: Utc::now(),
        });

        if count >= needed {
            info!(map = %map.name, count, "votemap quorum reached");
            self.bus.publish(VoteEvent::QuorumReached {
                kind: QuorumKind::Votemap,
                count,
                timestamp: Utc::now(),
            });
            self.map_tallies.clear();
            let immediately = self.config.votemap.change_map_immediately;
            let ctx = ctx!(self);
            self.change.schedule(
                &ctx,
                host,
                &mut self.state,
                &mut self.timers,
                &map.name,
                immediately,
                false,
            );
        }
    }

    /// `!extend`: threshold vote to extend the current map.
    pub fn handle_extend_vote(&mut self, host: &mut dyn GameHost, slot: PlayerSlot) {
        let cfg = &self.config.extend_vote;
        if !cfg.enabled {
            return;
        }
        let Some(player) = self.eligible_caller(host, slot) else {
            return;
        };
        if self.state.warmup_running && !cfg.enabled_in_warmup {
            return;
        }
        if self.state.extends_left == 0 {
            self.reply(host, slot, MessageKey::ExtendNoneLeft, &[]);
            return;
        }

        let eligible = eligible_players(host, self.config.allow_spectators_to_vote).len();
        if eligible < cfg.min_players as usize {
            self.reply(
                host,
                slot,
                MessageKey::NotEnoughPlayers,
                &[
                    ("count", eligible.to_string()),
                    ("needed", cfg.min_players.to_string()),
                ],
            );
            return;
        }
        if self.state.rounds_played < cfg.min_rounds {
            self.reply(host, slot, MessageKey::NotEnoughRounds, &[]);
            return;
        }

        if !self.extend_tally.add_vote(slot) {
            self.reply(host, slot, MessageKey::ExtendAlreadyVoted, &[]);
            return;
        }

        let count = self.extend_tally.count();
        let percentage = self.config.extend_vote.vote_percentage;
        let needed = required_votes(eligible, percentage);
        host.chat_all(&self.messages.line(
            MessageKey::ExtendVoted,
            &[
                ("player", player.name),
                ("count", count.to_string()),
                ("needed", needed.to_string()),
            ],
        ));
        self.bus.publish(VoteEvent::QuorumVote {
            kind: QuorumKind::Extend,
            slot,
            count,
            needed,
            timestamp: Utc::now(),
        });

        if self.extend_tally.has_reached(eligible, percentage) {
            self.bus.publish(VoteEvent::QuorumReached {
                kind: QuorumKind::Extend,
                count,
                timestamp: Utc::now(),
            });
            self.extend_tally.clear();
            crate::extend::extend_map(
                host,
                &mut self.state,
                &self.messages,
                &self.bus,
                self.config.end_of_map.extend_time_step,
                self.config.end_of_map.extend_round_step,
            );
        }
    }

    /// `!revote`: reopen the active session's menu to move a ballot.
    pub fn handle_revote(&mut self, host: &mut dyn GameHost, slot: PlayerSlot) {
        if self.eligible_caller(host, slot).is_none() {
            return;
        }
        if !self.session.active() {
            self.reply(host, slot, MessageKey::NoVoteActive, &[]);
            return;
        }
        let ctx = ctx!(self);
        self.session.reopen_menu(&ctx, host, slot);
    }

    /// `!timeleft`: report the map clock.
    pub fn handle_timeleft(&mut self, host: &mut dyn GameHost, slot: PlayerSlot) {
        match self.time_remaining(host) {
            Some(remaining) => {
                let total = remaining.ceil() as u64;
                self.reply(
                    host,
                    slot,
                    MessageKey::TimeLeft,
                    &[
                        ("minutes", (total / 60).to_string()),
                        ("seconds", format!("{:02}", total % 60)),
                    ],
                );
            }
            None => self.reply(host, slot, MessageKey::TimeLeftNoLimit, &[]),
        }
    }

    /// `!nextmap`: report the decided next map.
    pub fn handle_nextmap(&mut self, host: &mut dyn GameHost, slot: PlayerSlot) {
        match self.state.next_map.clone() {
            Some(map) => self.reply(host, slot, MessageKey::NextMapIs, &[("map", map)]),
            None => self.reply(host, slot, MessageKey::NextMapNotSet, &[]),
        }
    }

    /// Menu selection callback; the host reports which tagged menu produced
    /// the value.
    pub fn handle_menu_select(
        &mut self,
        host: &mut dyn GameHost,
        slot: PlayerSlot,
        tag: &str,
        value: &str,
    ) {
        match tag {
            VOTE_MENU_TAG => {
                let ctx = ctx!(self);
                self.session.register_vote(&ctx, host, slot, value);
            }
            NOMINATE_MENU_TAG => {
                host.close_menu(slot);
                self.handle_nominate(host, slot, Some(value));
            }
            _ => {}
        }
    }

    // --- admin commands ---

    /// Start a next-map vote on demand. Returns false when one is already
    /// running.
    pub fn admin_start_vote(&mut self, host: &mut dyn GameHost) -> bool {
        if self.session.active() {
            return false;
        }
        info!("admin started a map vote");
        let ctx = ctx!(self);
        self.session
            .start(&ctx, host, &mut self.state, &mut self.timers, false)
    }

    /// Start a vote over an admin-supplied candidate list. The winner is
    /// applied as soon as the session resolves.
    pub fn admin_start_custom_vote(
        &mut self,
        host: &mut dyn GameHost,
        candidates: &[String],
    ) -> bool {
        if self.session.active() {
            return false;
        }
        info!(candidates = candidates.len(), "admin started a custom vote");
        let ctx = ctx!(self);
        self.session
            .start_custom(&ctx, host, &mut self.timers, candidates, true)
    }

    /// Cancel the running vote session, if any.
    pub fn admin_cancel_vote(&mut self, host: &mut dyn GameHost) {
        let ctx = ctx!(self);
        self.session.cancel(&ctx, host);
    }

    /// Pin the next map without a vote.
    pub fn admin_set_next_map(&mut self, host: &mut dyn GameHost, query: &str) -> bool {
        let Some(map) = self.maps.find(query).cloned() else {
            return false;
        };
        info!(map = %map.name, "admin set the next map");
        let ctx = ctx!(self);
        self.change.schedule(
            &ctx,
            host,
            &mut self.state,
            &mut self.timers,
            &map.name,
            false,
            false,
        );
        true
    }

    // --- shared plumbing ---

    /// The caller, if they are a connected human allowed to vote. Replies to
    /// spectators when spectator voting is off.
    fn eligible_caller(&self, host: &mut dyn GameHost, slot: PlayerSlot) -> Option<PlayerInfo> {
        let player = host
            .players()
            .into_iter()
            .find(|p| p.slot == slot && p.is_valid && !p.is_bot)?;
        if player.is_spectator() && !self.config.allow_spectators_to_vote {
            self.reply(host, slot, MessageKey::SpectatorsNotAllowed, &[]);
            return None;
        }
        Some(player)
    }

    fn reply(
        &self,
        host: &mut dyn GameHost,
        slot: PlayerSlot,
        key: MessageKey,
        args: &[(&str, String)],
    ) {
        host.chat_player(slot, &self.messages.line(key, args));
    }

    fn is_current(&self, name: &str, host: &dyn GameHost) -> bool {
        let current = host.current_map();
        name.eq_ignore_ascii_case(&current.name)
            || self
                .maps
                .by_current(&current)
                .is_some_and(|m| m.name.eq_ignore_ascii_case(name))
    }

    fn show_nomination_menu(&mut self, host: &mut dyn GameHost, slot: PlayerSlot) {
        let current = host.current_map();
        let current_name = self
            .maps
            .by_current(&current)
            .map(|m| m.name.clone())
            .unwrap_or_else(|| current.name.clone());
        let options: Vec<MenuOption> = self
            .maps
            .all()
            .iter()
            .filter(|m| !m.name.eq_ignore_ascii_case(&current_name))
            .map(|m| MenuOption {
                label: m.name.clone(),
                value: m.name.clone(),
                enabled: !self.cooldown.is_map_on_cooldown(m, &current),
            })
            .collect();
        host.show_menu(
            slot,
            MenuSpec {
                tag: NOMINATE_MENU_TAG.to_string(),
                title: self.messages.render(MessageKey::NominateMenuTitle, &[]),
                options,
            },
        );
    }

    fn rtv_quorum_reached(&mut self, host: &mut dyn GameHost) {
        let count = self.rtv_tally.count();
        info!(count, "rtv quorum reached");
        self.bus.publish(VoteEvent::QuorumReached {
            kind: QuorumKind::Rtv,
            count,
            timestamp: Utc::now(),
        });
        let ctx = ctx!(self);
        self.session
            .start(&ctx, host, &mut self.state, &mut self.timers, true);
    }

    /// Disconnects shrink the denominator; a pending rtv quorum may now hold.
    pub(crate) fn recheck_rtv_quorum(&mut self, host: &mut dyn GameHost) {
        if !self.config.rtv.enabled
            || self.session.active()
            || self.state.map_change_scheduled
            || self.rtv_tally.count() == 0
        {
            return;
        }
        let eligible = eligible_players(host, self.config.allow_spectators_to_vote).len();
        if eligible >= self.config.rtv.min_players as usize
            && self
                .rtv_tally
                .has_reached(eligible, self.config.rtv.vote_percentage)
        {
            self.rtv_quorum_reached(host);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MapVoteConfig;
    use crate::maps::Map;
    use crate::testing::FakeHost;
    use rand::rngs::StdRng;
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
        let mut config = MapVoteConfig::with_maps(seven_maps());
        config.rtv.min_players = 0;
        config.votemap.min_players = 0;
        config.extend_vote.min_players = 0;
        MapVote::with_session_rng(config, StdRng::seed_from_u64(23))
    }

    fn populated_host(players: u32) -> FakeHost {
        let mut host = FakeHost::new();
        for slot in 0..players {
            host.add_player(slot, &format!("player{slot}"), 2 + (slot % 2) as u8);
        }
        host
    }

    #[test]
    fn test_rtv_quorum_starts_session() {
        let mut vote = subsystem();
        let mut host = populated_host(10);
        vote.on_map_load(&mut host);

        // 60% of 10 players: sixth vote fires
        for slot in 0..5 {
            vote.handle_rtv(&mut host, slot);
            assert!(!vote.vote_active());
        }
        vote.handle_rtv(&mut host, 5);
        assert!(vote.vote_active());
        assert!(vote.session.is_rtv());
    }

    #[test]
    fn test_rtv_duplicate_vote_rejected() {
        let mut vote = subsystem();
        let mut host = populated_host(10);
        vote.on_map_load(&mut host);

        vote.handle_rtv(&mut host, 0);
        vote.handle_rtv(&mut host, 0);
        assert_eq!(vote.rtv_tally.count(), 1);
    }

    #[test]
    fn test_spectator_blocked_by_default() {
        let mut vote = subsystem();
        let mut host = populated_host(2);
        host.add_player(9, "watcher", 1);
        vote.on_map_load(&mut host);

        vote.handle_rtv(&mut host, 9);
        assert_eq!(vote.rtv_tally.count(), 0);
        let (slot, line) = host.chat().last().unwrap();
        assert_eq!(*slot, Some(9));
        assert!(line.contains("Spectators"));
    }

    #[test]
    fn test_unrtv_withdraws() {
        let mut vote = subsystem();
        let mut host = populated_host(10);
        vote.on_map_load(&mut host);

        vote.handle_rtv(&mut host, 0);
        vote.handle_unrtv(&mut host, 0);
        assert_eq!(vote.rtv_tally.count(), 0);

        // Withdrawing without a vote just gets a notice
        vote.handle_unrtv(&mut host, 1);
        assert_eq!(vote.rtv_tally.count(), 0);
    }

    #[test]
    fn test_disconnect_shrinks_quorum_denominator() {
        let mut vote = subsystem();
        let mut host = populated_host(10);
        vote.on_map_load(&mut host);

        for slot in 0..5 {
            vote.handle_rtv(&mut host, slot);
        }
        assert!(!vote.vote_active());

        // 5 of 9 is short of 60%; 5 of 8 (needed 5) is not
        host.remove_player(9);
        vote.on_player_disconnect(&mut host, 9);
        assert!(!vote.vote_active());

        host.remove_player(8);
        vote.on_player_disconnect(&mut host, 8);
        assert!(vote.vote_active());
    }

    #[test]
    fn test_nominate_feeds_candidates() {
        let mut vote = subsystem();
        let mut host = populated_host(10);
        vote.on_map_load(&mut host);

        vote.handle_nominate(&mut host, 0, Some("nuke"));
        vote.handle_nominate(&mut host, 1, Some("ancient"));
        assert_eq!(vote.state.nominations.distinct().len(), 2);

        for slot in 0..6 {
            vote.handle_rtv(&mut host, slot);
        }
        assert!(vote.vote_active());
        let candidates = vote.session.candidates();
        assert_eq!(candidates.len(), 6);
        assert!(candidates.iter().any(|c| c == "Nuke"));
        assert!(candidates.iter().any(|c| c == "Ancient"));
    }

    #[test]
    fn test_nominate_rejects_unknown_and_current() {
        let mut vote = subsystem();
        let mut host = populated_host(2);
        host.set_map("de_mirage");
        vote.on_map_load(&mut host);

        vote.handle_nominate(&mut host, 0, Some("no_such_map"));
        vote.handle_nominate(&mut host, 0, Some("mirage"));
        assert!(vote.state.nominations.is_empty());
    }

    #[test]
    fn test_votemap_quorum_schedules_change() {
        let mut vote = subsystem();
        let mut host = populated_host(4);
        vote.on_map_load(&mut host);

        // 60% of 4: third vote fires
        vote.handle_votemap(&mut host, 0, "nuke");
        vote.handle_votemap(&mut host, 1, "nuke");
        assert!(vote.next_map().is_none());
        vote.handle_votemap(&mut host, 2, "nuke");

        assert_eq!(vote.next_map(), Some("Nuke"));
        assert!(vote.map_tallies.is_empty());
    }

    #[test]
    fn test_votemap_tallies_are_per_map() {
        let mut vote = subsystem();
        let mut host = populated_host(6);
        vote.on_map_load(&mut host);

        vote.handle_votemap(&mut host, 0, "nuke");
        vote.handle_votemap(&mut host, 1, "ancient");
        vote.handle_votemap(&mut host, 2, "nuke");
        assert_eq!(vote.map_tallies["Nuke"].count(), 2);
        assert_eq!(vote.map_tallies["Ancient"].count(), 1);
    }

    #[test]
    fn test_extend_quorum_extends_map() {
        let mut vote = subsystem();
        let mut host = populated_host(4);
        host.set_cvar_f32(crate::host::CVAR_TIME_LIMIT, 30.0);
        vote.on_map_load(&mut host);

        vote.handle_extend_vote(&mut host, 0);
        vote.handle_extend_vote(&mut host, 1);
        assert_eq!(host.cvar_f32(crate::host::CVAR_TIME_LIMIT), Some(30.0));
        vote.handle_extend_vote(&mut host, 2);

        assert_eq!(host.cvar_f32(crate::host::CVAR_TIME_LIMIT), Some(45.0));
        assert_eq!(vote.state.extends_left, 2);
        assert_eq!(vote.extend_tally.count(), 0);
    }

    #[test]
    fn test_menu_select_routes_session_vote() {
        let mut vote = subsystem();
        let mut host = populated_host(10);
        vote.on_map_load(&mut host);
        for slot in 0..6 {
            vote.handle_rtv(&mut host, slot);
        }
        assert!(vote.vote_active());

        let choice = vote.session.candidates()[0].clone();
        vote.handle_menu_select(&mut host, 0, VOTE_MENU_TAG, &choice);
        assert_eq!(vote.session.tally_for(&choice), 1);
    }

    #[test]
    fn test_admin_custom_vote_uses_caller_list() {
        let mut vote = subsystem();
        let mut host = populated_host(2);
        vote.on_map_load(&mut host);

        let list = vec!["Nuke".to_string(), "Ancient".to_string()];
        assert!(vote.admin_start_custom_vote(&mut host, &list));
        assert_eq!(vote.session.candidates(), list.as_slice());

        // The winner applies immediately on resolution
        let menu_tag = host.open_menu(0).unwrap().tag.clone();
        vote.handle_menu_select(&mut host, 0, &menu_tag, "Ancient");
        vote.handle_menu_select(&mut host, 1, &menu_tag, "Ancient");
        for _ in 0..=vote.config.end_of_map.vote_duration {
            host.advance_time(1.0);
            vote.tick(&mut host);
        }
        assert!(!vote.vote_active());
        assert_eq!(vote.next_map(), Some("Ancient"));
        assert!(vote.change.change_in_flight());
    }

    #[test]
    fn test_admin_set_next_map() {
        let mut vote = subsystem();
        let mut host = populated_host(2);
        vote.on_map_load(&mut host);

        assert!(vote.admin_set_next_map(&mut host, "vertigo"));
        assert_eq!(vote.next_map(), Some("Vertigo"));
        assert!(!vote.admin_set_next_map(&mut host, "no_such_map"));
    }

    #[test]
    fn test_timeleft_and_nextmap_queries() {
        let mut vote = subsystem();
        let mut host = populated_host(1);
        vote.on_map_load(&mut host);

        vote.handle_timeleft(&mut host, 0);
        assert!(host.chat().last().unwrap().1.contains("No time limit"));

        host.set_cvar_f32(crate::host::CVAR_TIME_LIMIT, 10.0);
        host.advance_time(90.0);
        vote.handle_timeleft(&mut host, 0);
        assert!(host.chat().last().unwrap().1.contains("8:30"));

        vote.handle_nextmap(&mut host, 0);
        assert!(host.chat().last().unwrap().1.contains("not been decided"));
    }
}
