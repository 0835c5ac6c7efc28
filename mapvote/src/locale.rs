//! Player-facing message catalog
//!
//! Every visible string flows through [`Messages`]: a hardcoded default
//! table, optionally shadowed by per-key overrides from configuration.
//! Lookup never fails; a missing override falls back to the default
//! template. Templates use `{name}` placeholders.

use std::collections::HashMap;

/// Identifier of a player-facing message template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKey {
    Prefix,
    VoteStarted,
    VoteEnded,
    VoteCancelled,
    YouVoted,
    VoteMenuTitle,
    ExtendOption,
    NextMapAnnounced,
    ChangingMap,
    RtvVoted,
    RtvAlreadyVoted,
    RtvNotVoted,
    RtvVoteRemoved,
    RtvCooldown,
    RtvFailedNoVotes,
    RtvDisabledInWarmup,
    NominateSuccess,
    NominateMenuTitle,
    MapNotFound,
    CannotPickCurrentMap,
    VotemapVoted,
    VotemapAlreadyVoted,
    VotemapCooldown,
    VotemapMenuTitle,
    ExtendVoted,
    ExtendAlreadyVoted,
    ExtendNoneLeft,
    ExtendVotePassed,
    MapExtendedBoth,
    MapExtendedTime,
    MapExtendedRounds,
    SpectatorsNotAllowed,
    NoVoteActive,
    NotEnoughPlayers,
    NotEnoughRounds,
    TimeLeft,
    TimeLeftNoLimit,
    NextMapIs,
    NextMapNotSet,
}

impl MessageKey {
    /// Stable id used for override lookup in config files.
    pub fn id(self) -> &'static str {
        match self {
            Self::Prefix => "prefix",
            Self::VoteStarted => "vote.started",
            Self::VoteEnded => "vote.ended",
            Self::VoteCancelled => "vote.cancelled",
            Self::YouVoted => "vote.you_voted",
            Self::VoteMenuTitle => "vote.menu_title",
            Self::ExtendOption => "vote.extend_option",
            Self::NextMapAnnounced => "next_map_announced",
            Self::ChangingMap => "changing_map",
            Self::RtvVoted => "rtv.voted",
            Self::RtvAlreadyVoted => "rtv.already_voted",
            Self::RtvNotVoted => "rtv.not_voted",
            Self::RtvVoteRemoved => "rtv.vote_removed",
            Self::RtvCooldown => "rtv.cooldown",
            Self::RtvFailedNoVotes => "rtv.failed_no_votes",
            Self::RtvDisabledInWarmup => "rtv.disabled_in_warmup",
            Self::NominateSuccess => "nominate.success",
            Self::NominateMenuTitle => "nominate.menu_title",
            Self::MapNotFound => "map_not_found",
            Self::CannotPickCurrentMap => "cannot_pick_current_map",
            Self::VotemapVoted => "votemap.voted",
            Self::VotemapAlreadyVoted => "votemap.already_voted",
            Self::VotemapCooldown => "votemap.cooldown",
            Self::VotemapMenuTitle => "votemap.menu_title",
            Self::ExtendVoted => "extend.voted",
            Self::ExtendAlreadyVoted => "extend.already_voted",
            Self::ExtendNoneLeft => "extend.none_left",
            Self::ExtendVotePassed => "extend.vote_passed",
            Self::MapExtendedBoth => "extend.map_extended_both",
            Self::MapExtendedTime => "extend.map_extended_time",
            Self::MapExtendedRounds => "extend.map_extended_rounds",
            Self::SpectatorsNotAllowed => "validation.spectator",
            Self::NoVoteActive => "no_vote_active",
            Self::NotEnoughPlayers => "validation.min_players",
            Self::NotEnoughRounds => "validation.min_rounds",
            Self::TimeLeft => "timeleft",
            Self::TimeLeftNoLimit => "timeleft.no_limit",
            Self::NextMapIs => "nextmap",
            Self::NextMapNotSet => "nextmap.not_set",
        }
    }

    fn default_template(self) -> &'static str {
        match self {
            Self::Prefix => "[MapVote]",
            Self::VoteStarted => "Vote for the next map has started!",
            Self::VoteEnded => "Vote ended. Next map: {map} ({votes} votes)",
            Self::VoteCancelled => "The vote has been cancelled.",
            Self::YouVoted => "You voted for {map}.",
            Self::VoteMenuTitle => "Vote for the next map ({seconds}s)",
            Self::ExtendOption => "Extend current map",
            Self::NextMapAnnounced => "Next map: {map}",
            Self::ChangingMap => "Changing map to {map} in {seconds} seconds...",
            Self::RtvVoted => "{player} wants to rock the vote ({count}/{needed})",
            Self::RtvAlreadyVoted => "You already voted to rock the vote.",
            Self::RtvNotVoted => "You have not voted to rock the vote.",
            Self::RtvVoteRemoved => "Your rock-the-vote vote was removed.",
            Self::RtvCooldown => "Rock the vote is on cooldown for {seconds} more seconds.",
            Self::RtvFailedNoVotes => "Rock the vote failed: nobody voted for a map.",
            Self::RtvDisabledInWarmup => "Rock the vote is disabled during warmup.",
            Self::NominateSuccess => "{player} nominated {map} for the next vote.",
            Self::NominateMenuTitle => "Nominate a map",
            Self::MapNotFound => "Map {map} was not found.",
            Self::CannotPickCurrentMap => "That map is currently being played.",
            Self::VotemapVoted => "{player} voted to change to {map} ({count}/{needed})",
            Self::VotemapAlreadyVoted => "You already voted for {map}.",
            Self::VotemapCooldown => "{map} was played recently and is on cooldown.",
            Self::VotemapMenuTitle => "Vote to change the map",
            Self::ExtendVoted => "{player} voted to extend the map ({count}/{needed})",
            Self::ExtendAlreadyVoted => "You already voted to extend the map.",
            Self::ExtendNoneLeft => "No extensions left for this map.",
            Self::ExtendVotePassed => "Vote passed ({votes} votes). Extending the current map!",
            Self::MapExtendedBoth => {
                "Map extended by {minutes} minutes and {rounds} rounds ({left} extends left)"
            }
            Self::MapExtendedTime => "Map extended by {minutes} minutes ({left} extends left)",
            Self::MapExtendedRounds => "Map extended by {rounds} rounds ({left} extends left)",
            Self::SpectatorsNotAllowed => "Spectators are not allowed to vote.",
            Self::NoVoteActive => "There is no vote in progress.",
            Self::NotEnoughPlayers => "Not enough players ({count}/{needed}).",
            Self::NotEnoughRounds => "Not enough rounds played yet.",
            Self::TimeLeft => "Time remaining: {minutes}:{seconds}",
            Self::TimeLeftNoLimit => "No time limit on this map.",
            Self::NextMapIs => "Next map: {map}",
            Self::NextMapNotSet => "Next map has not been decided yet.",
        }
    }
}

/// Message catalog with optional overrides.
#[derive(Debug, Clone, Default)]
pub struct Messages {
    overrides: HashMap<String, String>,
}

impl Messages {
    pub fn new(overrides: HashMap<String, String>) -> Self {
        Self { overrides }
    }

    /// Template for `key`: the override when present, the default otherwise.
    pub fn template(&self, key: MessageKey) -> &str {
        self.overrides
            .get(key.id())
            .map(String::as_str)
            .unwrap_or_else(|| key.default_template())
    }

    /// Render a template, substituting `{name}` placeholders.
    pub fn render(&self, key: MessageKey, args: &[(&str, String)]) -> String {
        let mut out = self.template(key).to_string();
        for (name, value) in args {
            out = out.replace(&format!("{{{name}}}"), value);
        }
        out
    }

    /// Render with the chat prefix prepended.
    pub fn line(&self, key: MessageKey, args: &[(&str, String)]) -> String {
        format!("{} {}", self.template(MessageKey::Prefix), self.render(key, args))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_fallback_on_missing_override() {
        let messages = Messages::default();
        assert_eq!(
            messages.template(MessageKey::NoVoteActive),
            "There is no vote in progress."
        );
    }

    #[test]
    fn test_override_shadows_default() {
        let mut overrides = HashMap::new();
        overrides.insert("prefix".to_string(), "[Server]".to_string());
        let messages = Messages::new(overrides);

        let line = messages.line(MessageKey::VoteCancelled, &[]);
        assert!(line.starts_with("[Server] "));
    }

    #[test]
    fn test_placeholder_substitution() {
        let messages = Messages::default();
        let rendered = messages.render(
            MessageKey::RtvVoted,
            &[
                ("player", "alice".to_string()),
                ("count", 3.to_string()),
                ("needed", 6.to_string()),
            ],
        );
        assert_eq!(rendered, "alice wants to rock the vote (3/6)");
    }
}
