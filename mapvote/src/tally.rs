//! Threshold (quorum) vote primitive
//!
//! Counts one boolean vote per participant slot against a percentage of the
//! eligible player count. Used by rock-the-vote, per-map votes, and match
//! extension; this type is agnostic to what the vote is about.

use std::collections::HashSet;

use crate::host::PlayerSlot;

#[derive(Debug, Clone, Default)]
pub struct ThresholdTally {
    voters: HashSet<PlayerSlot>,
}

/// Votes needed for `eligible` players at `percentage` percent, never
/// below one.
pub fn required_votes(eligible: usize, percentage: u32) -> usize {
    let needed = (eligible as f64 * percentage as f64 / 100.0).ceil() as usize;
    needed.max(1)
}

impl ThresholdTally {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false if the slot already voted.
    pub fn add_vote(&mut self, slot: PlayerSlot) -> bool {
        self.voters.insert(slot)
    }

    /// Returns false if the slot had not voted.
    pub fn remove_vote(&mut self, slot: PlayerSlot) -> bool {
        self.voters.remove(&slot)
    }

    pub fn has_voted(&self, slot: PlayerSlot) -> bool {
        self.voters.contains(&slot)
    }

    pub fn count(&self) -> usize {
        self.voters.len()
    }

    pub fn has_reached(&self, eligible: usize, percentage: u32) -> bool {
        self.count() >= required_votes(eligible, percentage)
    }

    pub fn clear(&mut self) {
        self.voters.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_matches_distinct_voters() {
        let mut tally = ThresholdTally::new();
        assert!(tally.add_vote(1));
        assert!(tally.add_vote(2));
        assert!(!tally.add_vote(1)); // duplicate
        assert_eq!(tally.count(), 2);

        assert!(tally.remove_vote(1));
        assert!(!tally.remove_vote(1)); // already gone
        assert_eq!(tally.count(), 1);

        tally.clear();
        assert_eq!(tally.count(), 0);
    }

    #[test]
    fn test_required_votes_rounds_up() {
        assert_eq!(required_votes(10, 60), 6);
        assert_eq!(required_votes(9, 60), 6); // 5.4 rounds up
        assert_eq!(required_votes(1, 60), 1);
        // Never below one, even for degenerate inputs
        assert_eq!(required_votes(0, 60), 1);
        assert_eq!(required_votes(10, 0), 1);
    }

    #[test]
    fn test_required_votes_monotonic() {
        for n in 1..40 {
            for p in 1..=100 {
                assert!(required_votes(n, p) <= required_votes(n + 1, p));
                assert!(required_votes(n, p) <= required_votes(n, (p + 1).min(100)));
                assert!(required_votes(n, p) >= 1);
            }
        }
    }

    #[test]
    fn test_quorum_fires_on_sixth_of_ten() {
        let mut tally = ThresholdTally::new();
        for slot in 0..5 {
            tally.add_vote(slot);
        }
        assert!(!tally.has_reached(10, 60));

        tally.add_vote(5);
        assert!(tally.has_reached(10, 60));
    }
}
