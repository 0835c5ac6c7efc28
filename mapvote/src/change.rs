//! Map-change scheduling and execution
//!
//! A winning map is either applied after a short announced countdown or
//! parked until a round boundary / match end. The countdown entry in the
//! timer queue carries no session id: once a change is in flight it must
//! survive vote-session restarts.

use chrono::Utc;
use tracing::{info, warn};

use crate::events::VoteEvent;
use crate::host::GameHost;
use crate::locale::MessageKey;
use crate::maps::Map;
use crate::match_state::MatchState;
use crate::session::VoteContext;
use crate::timer::{TimerAction, TimerQueue};

/// Owns the pending-change slot between "winner picked" and "engine told".
#[derive(Debug, Default)]
pub struct ChangeMapManager {
    /// Resolved map waiting for its countdown to elapse
    in_flight: Option<Map>,
}

impl ChangeMapManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a winning map. With `immediately` the countdown starts now;
    /// otherwise the change waits for [`execute`](Self::execute) at the next
    /// round boundary or match end.
    pub fn schedule(
        &mut self,
        ctx: &VoteContext<'_>,
        host: &mut dyn GameHost,
        state: &mut MatchState,
        timers: &mut TimerQueue,
        name: &str,
        immediately: bool,
        is_rtv: bool,
    ) {
        state.next_map = Some(name.to_string());
        state.map_change_scheduled = true;
        state.change_immediately = immediately;
        state.pending_is_rtv = is_rtv;

        ctx.bus.publish(VoteEvent::MapChangeScheduled {
            map: name.to_string(),
            immediately,
            timestamp: Utc::now(),
        });

        if immediately {
            self.execute(ctx, host, state, timers);
        } else {
            host.chat_all(&ctx.messages.line(
                MessageKey::NextMapAnnounced,
                &[("map", name.to_string())],
            ));
        }
    }

    /// Start the announced countdown for the scheduled map.
    pub fn execute(
        &mut self,
        ctx: &VoteContext<'_>,
        host: &mut dyn GameHost,
        state: &mut MatchState,
        timers: &mut TimerQueue,
    ) {
        let Some(name) = state.next_map.clone() else {
            warn!("map change executed with no next map recorded");
            state.map_change_scheduled = false;
            return;
        };
        let Some(map) = ctx.maps.by_name(&name).cloned() else {
            warn!(map = %name, "scheduled map vanished from the pool");
            state.map_change_scheduled = false;
            return;
        };

        let delay = if state.pending_is_rtv {
            ctx.config.rtv.change_map_delay
        } else {
            ctx.config.end_of_map.change_map_delay
        };

        host.chat_all(&ctx.messages.line(
            MessageKey::ChangingMap,
            &[("map", map.name.clone()), ("seconds", delay.to_string())],
        ));

        // Cleared before the countdown so round-boundary hooks do not try to
        // execute the same change twice.
        state.map_change_scheduled = false;
        self.in_flight = Some(map);
        let now = host.game_time();
        timers.schedule(now + delay as f64, None, TimerAction::PerformMapChange);
    }

    /// Countdown elapsed: tell the engine to switch levels.
    pub fn perform(&mut self, ctx: &VoteContext<'_>, host: &mut dyn GameHost) {
        let Some(map) = self.in_flight.take() else {
            return;
        };

        info!(map = %map.name, id = %map.id, "changing level");
        host.set_next_level(&map.name);
        if let Some(workshop_id) = map.workshop_id() {
            host.load_workshop_map(workshop_id);
        } else {
            host.change_level(&map.id);
        }
        ctx.bus.publish(VoteEvent::MapChanged {
            map: map.name.clone(),
            timestamp: Utc::now(),
        });
    }

    pub fn change_in_flight(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Map-load reset; a countdown from the previous map must not fire.
    pub fn reset(&mut self) {
        self.in_flight = None;
    }
}
