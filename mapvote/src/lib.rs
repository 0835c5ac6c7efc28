//! Map-vote coordination for multiplayer game servers
//!
//! This library provides:
//! - A timed multi-candidate vote for picking the next map (end-of-map and
//!   admin-initiated), with nominations and a map-recency cooldown
//! - Threshold (quorum) votes: rock-the-vote, per-map votes, match extension
//! - An automated trigger that starts the end-of-map vote from match
//!   telemetry (time remaining, rounds remaining, score proximity)
//! - Deferred/immediate map-change execution, including workshop maps
//!
//! The host game server drives the core: it calls [`MapVote::tick`] once per
//! second and the lifecycle handlers (`on_map_load`, `on_round_end`, ...)
//! from its event hooks, and implements [`GameHost`] to expose players,
//! console variables, chat, the choice-menu widget, and map changes.
//! Everything runs on the host's logical thread; deferred work lives in a
//! session-id-tagged timer queue so restarting a vote session renders stale
//! callbacks inert.

pub mod change;
pub mod commands;
pub mod config;
pub mod coordinator;
pub mod events;
pub mod extend;
pub mod host;
pub mod locale;
pub mod maps;
pub mod match_state;
pub mod session;
pub mod tally;
pub mod testing;
pub mod timer;
pub mod trigger;

// Re-export the coordinator entry points
pub use coordinator::MapVote;

// Re-export key config types
pub use config::{
    ConfigError, EndOfMapConfig, ExtendVoteConfig, MapVoteConfig, RtvConfig, VotemapConfig,
};

// Re-export the host contract
pub use host::{CurrentMap, GameHost, MenuOption, MenuSpec, PlayerInfo, PlayerSlot};

// Re-export core vote primitives
pub use maps::{Map, MapCooldown, MapList};
pub use session::{VoteSessionManager, EXTEND_CANDIDATE};
pub use tally::ThresholdTally;

// Re-export key event types
pub use events::{EventBus, QuorumKind, SharedEventBus, VoteEvent};
