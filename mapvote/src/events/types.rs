//! Event types for the vote subsystem
//!
//! Serializable so downstream consumers can forward them over the wire.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::host::PlayerSlot;

/// Which threshold vote a quorum event belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuorumKind {
    /// Rock-the-vote
    Rtv,
    /// Per-map change vote
    Votemap,
    /// Match extension vote
    Extend,
}

impl std::fmt::Display for QuorumKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QuorumKind::Rtv => write!(f, "rtv"),
            QuorumKind::Votemap => write!(f, "votemap"),
            QuorumKind::Extend => write!(f, "extend"),
        }
    }
}

/// All observable vote-system events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum VoteEvent {
    /// A plurality vote session opened
    SessionStarted {
        session_id: u64,
        candidates: Vec<String>,
        duration_secs: u32,
        is_rtv: bool,
        timestamp: DateTime<Utc>,
    },

    /// A ballot was cast or moved within the active session
    BallotCast {
        session_id: u64,
        slot: PlayerSlot,
        choice: String,
        timestamp: DateTime<Utc>,
    },

    /// The session closed with a winner
    SessionResolved {
        session_id: u64,
        winner: String,
        votes: usize,
        timestamp: DateTime<Utc>,
    },

    /// The session was cancelled by an admin or a map change
    SessionCancelled {
        session_id: u64,
        timestamp: DateTime<Utc>,
    },

    /// The session expired with no ballots cast
    SessionFailed {
        session_id: u64,
        timestamp: DateTime<Utc>,
    },

    /// Progress on a threshold vote
    QuorumVote {
        kind: QuorumKind,
        slot: PlayerSlot,
        count: usize,
        needed: usize,
        timestamp: DateTime<Utc>,
    },

    /// A threshold vote crossed its quorum
    QuorumReached {
        kind: QuorumKind,
        count: usize,
        timestamp: DateTime<Utc>,
    },

    /// A winning map is queued for the next change opportunity
    MapChangeScheduled {
        map: String,
        immediately: bool,
        timestamp: DateTime<Utc>,
    },

    /// The engine was told to switch levels
    MapChanged {
        map: String,
        timestamp: DateTime<Utc>,
    },

    /// The current map's limits were raised
    MapExtended {
        minutes: u32,
        rounds: u32,
        extends_left: u32,
        timestamp: DateTime<Utc>,
    },

    /// The automated end-of-map trigger fired
    TriggerFired { timestamp: DateTime<Utc> },

    /// A player nominated a map for the next session
    NominationAdded {
        slot: PlayerSlot,
        map: String,
        timestamp: DateTime<Utc>,
    },
}

impl VoteEvent {
    /// Get the timestamp of this event
    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            VoteEvent::SessionStarted { timestamp, .. } => *timestamp,
            VoteEvent::BallotCast { timestamp, .. } => *timestamp,
            VoteEvent::SessionResolved { timestamp, .. } => *timestamp,
            VoteEvent::SessionCancelled { timestamp, .. } => *timestamp,
            VoteEvent::SessionFailed { timestamp, .. } => *timestamp,
            VoteEvent::QuorumVote { timestamp, .. } => *timestamp,
            VoteEvent::QuorumReached { timestamp, .. } => *timestamp,
            VoteEvent::MapChangeScheduled { timestamp, .. } => *timestamp,
            VoteEvent::MapChanged { timestamp, .. } => *timestamp,
            VoteEvent::MapExtended { timestamp, .. } => *timestamp,
            VoteEvent::TriggerFired { timestamp } => *timestamp,
            VoteEvent::NominationAdded { timestamp, .. } => *timestamp,
        }
    }

    /// Get the event type as a string
    pub fn event_type(&self) -> &'static str {
        match self {
            VoteEvent::SessionStarted { .. } => "session_started",
            VoteEvent::BallotCast { .. } => "ballot_cast",
            VoteEvent::SessionResolved { .. } => "session_resolved",
            VoteEvent::SessionCancelled { .. } => "session_cancelled",
            VoteEvent::SessionFailed { .. } => "session_failed",
            VoteEvent::QuorumVote { .. } => "quorum_vote",
            VoteEvent::QuorumReached { .. } => "quorum_reached",
            VoteEvent::MapChangeScheduled { .. } => "map_change_scheduled",
            VoteEvent::MapChanged { .. } => "map_changed",
            VoteEvent::MapExtended { .. } => "map_extended",
            VoteEvent::TriggerFired { .. } => "trigger_fired",
            VoteEvent::NominationAdded { .. } => "nomination_added",
        }
    }

    /// Get the session id if this event is session-scoped
    pub fn session_id(&self) -> Option<u64> {
        match self {
            VoteEvent::SessionStarted { session_id, .. } => Some(*session_id),
            VoteEvent::BallotCast { session_id, .. } => Some(*session_id),
            VoteEvent::SessionResolved { session_id, .. } => Some(*session_id),
            VoteEvent::SessionCancelled { session_id, .. } => Some(*session_id),
            VoteEvent::SessionFailed { session_id, .. } => Some(*session_id),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_serialization() {
        let event = VoteEvent::SessionStarted {
            session_id: 3,
            candidates: vec!["Mirage".to_string(), "Nuke".to_string()],
            duration_secs: 30,
            is_rtv: true,
            timestamp: Utc::now(),
        };

        let json = serde_json::to_string(&event).unwrap();
        let parsed: VoteEvent = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed.event_type(), "session_started");
        assert_eq!(parsed.session_id(), Some(3));
    }

    #[test]
    fn test_event_accessors() {
        let event = VoteEvent::QuorumReached {
            kind: QuorumKind::Rtv,
            count: 6,
            timestamp: Utc::now(),
        };

        assert_eq!(event.event_type(), "quorum_reached");
        assert_eq!(event.session_id(), None);
        assert_eq!(QuorumKind::Rtv.to_string(), "rtv");
    }
}
