//! Vote lifecycle events
//!
//! Pub/sub notifications for everything observable about the vote system:
//! session lifecycle, ballots, quorum progress, map changes and extensions.
//! Consumers (HUD overlays, Discord relays, admin logs) subscribe without
//! coupling to the core.

pub mod bus;
pub mod types;

pub use bus::{EventBus, SharedEventBus};
pub use types::{QuorumKind, VoteEvent};
