//! Match extension
//!
//! Raising the current map's limits means writing engine console variables:
//! minutes go on `mp_timelimit`, rounds on `mp_maxrounds` with a matching
//! bump of `mp_winlimit` so a score lead cannot end the match early anyway.

use chrono::Utc;
use tracing::info;

use crate::events::{EventBus, VoteEvent};
use crate::host::{GameHost, CVAR_MAX_ROUNDS, CVAR_TIME_LIMIT, CVAR_WIN_LIMIT};
use crate::locale::{MessageKey, Messages};
use crate::match_state::MatchState;

/// Starting value for `mp_maxrounds` when extending a match that had none.
const DEFAULT_MAX_ROUNDS: i32 = 24;

/// Extend the current map by `minutes` and/or `rounds`, consuming one entry
/// of the extension budget. Returns false when the budget is spent or both
/// steps end up as no-ops.
pub fn extend_map(
    host: &mut dyn GameHost,
    state: &mut MatchState,
    messages: &Messages,
    bus: &EventBus,
    minutes: u32,
    rounds: u32,
) -> bool {
    if state.extends_left == 0 {
        return false;
    }

    let mut extended_time = false;
    let mut extended_rounds = false;

    if minutes > 0 {
        // A zero time limit means "no limit"; adding minutes to it would
        // silently introduce one.
        let limit = host.cvar_f32(CVAR_TIME_LIMIT).unwrap_or(0.0);
        if limit > 0.0 {
            host.set_cvar_f32(CVAR_TIME_LIMIT, limit + minutes as f32);
            extended_time = true;
        }
    }

    if rounds > 0 {
        let max_rounds = host.cvar_i32(CVAR_MAX_ROUNDS).unwrap_or(0);
        let new_max = if max_rounds > 0 {
            max_rounds + rounds as i32
        } else {
            DEFAULT_MAX_ROUNDS + rounds as i32
        };
        host.set_cvar_i32(CVAR_MAX_ROUNDS, new_max);

        // An unset win limit is seeded from the raised round limit, the
        // majority of new_max, so a score lead cannot end the match before
        // the extension is played out.
        let win_limit = host.cvar_i32(CVAR_WIN_LIMIT).unwrap_or(0);
        let base_win = if win_limit > 0 {
            win_limit
        } else {
            new_max / 2 + 1
        };
        host.set_cvar_i32(CVAR_WIN_LIMIT, base_win + (rounds as i32 + 1) / 2);
        extended_rounds = true;
    }

    // Whatever the outcome, a passed extension revokes any pending change
    // and pushes the automated trigger back out.
    state.map_change_scheduled = false;
    state.next_map = None;
    let now = host.game_time();
    state.arm_trigger_window(now + 60.0);

    if !extended_time && !extended_rounds {
        return false;
    }

    state.extends_left -= 1;
    info!(
        minutes = if extended_time { minutes } else { 0 },
        rounds = if extended_rounds { rounds } else { 0 },
        extends_left = state.extends_left,
        "map extended"
    );

    let key = match (extended_time, extended_rounds) {
        (true, true) => MessageKey::MapExtendedBoth,
        (true, false) => MessageKey::MapExtendedTime,
        (false, _) => MessageKey::MapExtendedRounds,
    };
    host.chat_all(&messages.line(
        key,
        &[
            ("minutes", minutes.to_string()),
            ("rounds", rounds.to_string()),
            ("left", state.extends_left.to_string()),
        ],
    ));
    bus.publish(VoteEvent::MapExtended {
        minutes: if extended_time { minutes } else { 0 },
        rounds: if extended_rounds { rounds } else { 0 },
        extends_left: state.extends_left,
        timestamp: Utc::now(),
    });

    true
}
