//! Vote Guard
//!
//! Remembers which voter identities have voted on which poll. Identities are
//! opaque strings supplied by the host surface; nothing here inspects them.
//! The guard has no locking of its own; the registry keeps it under the same
//! lock as the tallies so check-and-record happens together with the
//! increment.

use std::collections::{HashMap, HashSet};

#[derive(Debug, Default, Clone)]
pub struct VoteGuard {
    /// poll_id -> voters
    voters: HashMap<String, HashSet<String>>,
}

impl VoteGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `voter` already voted on `poll_id`
    pub fn has_voted(&self, poll_id: &str, voter: &str) -> bool {
        self.voters
            .get(poll_id)
            .map(|set| set.contains(voter))
            .unwrap_or(false)
    }

    /// Record a vote. Returns `false` if the voter was already recorded.
    pub fn record_vote(&mut self, poll_id: &str, voter: &str) -> bool {
        self.voters
            .entry(poll_id.to_string())
            .or_default()
            .insert(voter.to_string())
    }

    /// Forget all voters of a poll, keeping it known (relaunch)
    pub fn clear(&mut self, poll_id: &str) {
        if let Some(set) = self.voters.get_mut(poll_id) {
            set.clear();
        }
    }

    /// Drop the poll entirely (deletion)
    pub fn forget(&mut self, poll_id: &str) {
        self.voters.remove(poll_id);
    }

    /// Number of voters recorded for a poll
    pub fn voter_count(&self, poll_id: &str) -> usize {
        self.voters.get(poll_id).map(HashSet::len).unwrap_or(0)
    }
}
