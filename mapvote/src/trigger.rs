//! Automated end-of-map vote trigger
//!
//! Pure evaluation of match telemetry against the configured margins. The
//! coordinator gates the result (feature off, vote already ran, warmup,
//! re-arm window) and starts the session when it fires.

use tracing::debug;

use crate::config::EndOfMapConfig;
use crate::host::{GameHost, CVAR_MAX_ROUNDS, CVAR_TIME_LIMIT, CVAR_WIN_LIMIT};
use crate::match_state::MatchState;

/// Whether the end of the current map is close enough to vote on a
/// successor. True when any of the three margins is reached: map time
/// remaining, match rounds remaining, or a team being within the margin of
/// the winning score.
pub fn should_start_vote(
    host: &dyn GameHost,
    config: &EndOfMapConfig,
    state: &MatchState,
) -> bool {
    let now = host.game_time();

    let time_limit = host.cvar_f32(CVAR_TIME_LIMIT).unwrap_or(0.0);
    if time_limit > 0.0 {
        let end = state.map_start_time + time_limit as f64 * 60.0;
        let remaining = end - now;
        if remaining <= config.trigger_seconds_before_end as f64 {
            debug!(remaining, "time margin reached");
            return true;
        }
    }

    let margin = config.trigger_rounds_before_end as i32;
    let max_rounds = host.cvar_i32(CVAR_MAX_ROUNDS).unwrap_or(0);
    if max_rounds > 0 {
        let remaining = max_rounds - state.rounds_played as i32;
        if remaining <= margin {
            debug!(remaining, "round margin reached");
            return true;
        }
    }

    let win_limit = host.cvar_i32(CVAR_WIN_LIMIT).unwrap_or(0);
    let winning_score = if win_limit > 0 {
        Some(win_limit)
    } else if max_rounds > 0 {
        Some(max_rounds / 2 + 1)
    } else {
        None
    };
    if let Some(winning_score) = winning_score {
        let best = host.team_scores().into_iter().max().unwrap_or(0);
        if winning_score - best <= margin {
            debug!(best, winning_score, "score margin reached");
            return true;
        }
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeHost;

    fn config() -> EndOfMapConfig {
        EndOfMapConfig::default()
    }

    #[test]
    fn test_no_limits_never_fires() {
        let host = FakeHost::new();
        assert!(!should_start_vote(&host, &config(), &MatchState::default()));
    }

    #[test]
    fn test_time_margin() {
        let mut host = FakeHost::new();
        host.set_cvar_f32(CVAR_TIME_LIMIT, 10.0); // 600s map
        let state = MatchState::default();

        host.advance_time(400.0);
        assert!(!should_start_vote(&host, &config(), &state));

        // Default margin is 120s before the end
        host.advance_time(85.0);
        assert!(should_start_vote(&host, &config(), &state));
    }

    #[test]
    fn test_round_margin() {
        let mut host = FakeHost::new();
        host.set_cvar_i32(CVAR_MAX_ROUNDS, 24);
        let mut state = MatchState {
            rounds_played: 15,
            ..Default::default()
        };
        assert!(!should_start_vote(&host, &config(), &state));

        // 4 rounds remaining at the default margin
        state.rounds_played = 20;
        assert!(should_start_vote(&host, &config(), &state));
    }

    #[test]
    fn test_score_margin_from_win_limit() {
        let mut host = FakeHost::new();
        host.set_cvar_i32(CVAR_WIN_LIMIT, 13);
        let state = MatchState::default();

        host.set_team_scores(vec![5, 8]);
        assert!(!should_start_vote(&host, &config(), &state));

        host.set_team_scores(vec![5, 9]);
        assert!(should_start_vote(&host, &config(), &state));
    }

    #[test]
    fn test_score_margin_derived_from_max_rounds() {
        let mut host = FakeHost::new();
        host.set_cvar_i32(CVAR_MAX_ROUNDS, 24);
        let state = MatchState::default();

        // Winning score 13; margin 4 → fires at 9
        host.set_team_scores(vec![9, 2]);
        assert!(should_start_vote(&host, &config(), &state));
    }

    #[test]
    fn test_map_start_offset_respected() {
        let mut host = FakeHost::new();
        host.set_cvar_f32(CVAR_TIME_LIMIT, 10.0);
        host.advance_time(500.0);

        // Map started at t=480, so 580s remain
        let state = MatchState {
            map_start_time: 480.0,
            ..Default::default()
        };
        assert!(!should_start_vote(&host, &config(), &state));
    }
}
