//! Poll Registry
//!
//! Owns every poll, enforces the single-Active-poll rule and applies votes.
//!
//! All state lives behind one `RwLock`. Mutations (`add`, `launch`, `stop`,
//! `delete`, `cast_vote`, `tick`) take the write lock for the whole
//! operation and check everything before changing anything, so a rejected
//! call leaves the registry untouched. Reads take the read lock and return
//! copies.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

use super::guard::VoteGuard;
use super::poll::{NewPoll, Poll, PollState, VoteTally, WindowPolicy};
use super::tally::PollResults;
use super::{PollError, Result};

#[derive(Debug, Default)]
struct RegistryState {
    /// Polls by ID
    polls: HashMap<String, Poll>,
    /// IDs in creation order
    order: Vec<String>,
    /// The Active poll, if any. Always agrees with `polls[..].state`.
    active: Option<String>,
    guard: VoteGuard,
}

/// Authoritative store of polls
#[derive(Debug, Default)]
pub struct PollRegistry {
    state: RwLock<RegistryState>,
    policy: WindowPolicy,
}

/// Accepted vote
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteReceipt {
    pub poll_id: String,
    pub option: String,
    pub voter: String,
    /// Votes for `option` after this one
    pub option_votes: u64,
    /// Votes on the poll after this one
    pub total_votes: u64,
}

/// Result of advancing a poll's window by one second
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TickOutcome {
    pub poll_id: String,
    pub remaining_seconds: u32,
    /// This tick ran the window out and closed the poll
    pub closed: bool,
}

/// Poll filter for listing polls
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PollFilter {
    /// Only polls in this state
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<PollState>,
    /// Limit results (0 = no limit)
    #[serde(default)]
    pub limit: usize,
    /// Offset for pagination
    #[serde(default)]
    pub offset: usize,
}

impl PollFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn in_state(mut self, state: PollState) -> Self {
        self.state = Some(state);
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }
}

/// Registry statistics
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistryStats {
    pub total_polls: usize,
    pub draft_polls: usize,
    pub active_polls: usize,
    pub closed_polls: usize,
    /// Votes across all polls
    pub total_votes: u64,
}

impl PollRegistry {
    /// Create an empty registry with the default window policy
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy(policy: WindowPolicy) -> Self {
        Self {
            state: RwLock::new(RegistryState::default()),
            policy,
        }
    }

    pub fn policy(&self) -> &WindowPolicy {
        &self.policy
    }

    /// Validate a request and store the resulting Draft poll
    pub fn create_poll(&self, request: NewPoll) -> Result<Poll> {
        let poll = request.build(&self.policy)?;
        self.add(poll)
    }

    /// Insert a Draft poll.
    ///
    /// The poll is re-validated against this registry's policy; its tally
    /// and remaining time are reset to the Draft starting point.
    pub fn add(&self, mut poll: Poll) -> Result<Poll> {
        if poll.state != PollState::Draft {
            return Err(PollError::InvalidState {
                id: poll.id,
                state: poll.state,
                operation: "add",
            });
        }

        let request = NewPoll {
            question: poll.question.clone(),
            options: poll.options.clone(),
            window_seconds: Some(poll.window_seconds),
        };
        let (question, options, window_seconds) = request.validate(&self.policy)?;
        poll.tally = VoteTally::new(&options);
        poll.question = question;
        poll.options = options;
        poll.window_seconds = window_seconds;
        poll.remaining_seconds = window_seconds;

        let mut state = self.state.write();
        if state.polls.contains_key(&poll.id) {
            return Err(PollError::DuplicateId(poll.id));
        }
        state.order.push(poll.id.clone());
        state.polls.insert(poll.id.clone(), poll.clone());

        tracing::debug!(poll_id = %poll.id, "poll created");
        Ok(poll)
    }

    /// Make `id` the Active poll.
    ///
    /// Any other Active poll is closed first. Launching a Closed poll starts
    /// it over: full window, zero tally, no recorded voters.
    pub fn launch(&self, id: &str) -> Result<Poll> {
        let mut state = self.state.write();
        let RegistryState {
            polls,
            active,
            guard,
            ..
        } = &mut *state;

        let Some(target) = polls.get(id) else {
            return Err(PollError::NotFound(id.to_string()));
        };
        if target.state == PollState::Active {
            return Err(PollError::InvalidState {
                id: id.to_string(),
                state: target.state,
                operation: "launch",
            });
        }

        if let Some(previous) = active.take() {
            if let Some(poll) = polls.get_mut(&previous) {
                poll.close();
                tracing::debug!(poll_id = %previous, "poll closed by launch of {}", id);
            }
        }

        let poll = polls
            .get_mut(id)
            .ok_or_else(|| PollError::NotFound(id.to_string()))?;
        poll.activate();
        guard.clear(id);
        *active = Some(id.to_string());

        tracing::debug!(poll_id = %id, window = poll.window_seconds, "poll launched");
        Ok(poll.clone())
    }

    /// Close `id` if it is Active. Stopping a Draft or Closed poll succeeds
    /// without changing it.
    pub fn stop(&self, id: &str) -> Result<Poll> {
        let mut state = self.state.write();
        let RegistryState { polls, active, .. } = &mut *state;

        let poll = polls
            .get_mut(id)
            .ok_or_else(|| PollError::NotFound(id.to_string()))?;
        if poll.state == PollState::Active {
            poll.close();
            *active = None;
            tracing::debug!(poll_id = %id, "poll stopped");
        }
        Ok(poll.clone())
    }

    /// Close whichever poll is Active. Returns it, or `None` if nothing was.
    pub fn stop_active(&self) -> Option<Poll> {
        let mut state = self.state.write();
        let RegistryState { polls, active, .. } = &mut *state;

        let id = active.take()?;
        let poll = polls.get_mut(&id)?;
        poll.close();
        tracing::debug!(poll_id = %id, "poll stopped");
        Some(poll.clone())
    }

    /// Remove a poll. Deleting the Active poll leaves no poll Active.
    pub fn delete(&self, id: &str) -> Result<Poll> {
        let mut state = self.state.write();
        let poll = state
            .polls
            .remove(id)
            .ok_or_else(|| PollError::NotFound(id.to_string()))?;

        if state.active.as_deref() == Some(id) {
            state.active = None;
        }
        state.order.retain(|p| p != id);
        state.guard.forget(id);

        tracing::debug!(poll_id = %id, "poll deleted");
        Ok(poll)
    }

    /// Cast one vote.
    ///
    /// Checks run in this order: the poll exists, it is Active with time
    /// left, the option belongs to it, the voter has not voted on it yet.
    /// The voter is recorded and the tally bumped under the same lock.
    pub fn cast_vote(&self, id: &str, option: &str, voter: &str) -> Result<VoteReceipt> {
        let mut state = self.state.write();
        let RegistryState { polls, guard, .. } = &mut *state;

        let poll = polls
            .get_mut(id)
            .ok_or_else(|| PollError::NotFound(id.to_string()))?;

        if !poll.accepts_votes() {
            return Err(PollError::InvalidState {
                id: id.to_string(),
                state: poll.state,
                operation: "vote on",
            });
        }

        let unknown = || PollError::UnknownOption {
            id: id.to_string(),
            option: option.to_string(),
        };
        if !poll.has_option(option) {
            return Err(unknown());
        }

        if guard.has_voted(id, voter) {
            return Err(PollError::DuplicateVote {
                id: id.to_string(),
                voter: voter.to_string(),
            });
        }

        let option_votes = poll.tally.increment(option).ok_or_else(unknown)?;
        guard.record_vote(id, voter);

        Ok(VoteReceipt {
            poll_id: id.to_string(),
            option: option.to_string(),
            voter: voter.to_string(),
            option_votes,
            total_votes: poll.total_votes(),
        })
    }

    /// Advance the window of Active poll `id` by one second, closing the
    /// poll when it reaches zero.
    pub fn tick(&self, id: &str) -> Result<TickOutcome> {
        let mut state = self.state.write();
        let poll = state
            .polls
            .get(id)
            .ok_or_else(|| PollError::NotFound(id.to_string()))?;
        if poll.state != PollState::Active {
            return Err(PollError::InvalidState {
                id: id.to_string(),
                state: poll.state,
                operation: "tick",
            });
        }
        Ok(Self::tick_locked(&mut state, id))
    }

    /// Tick whichever poll is Active. `None` if no poll is.
    ///
    /// Finding and ticking happen under one lock, so a timer using this
    /// never races an admin stop or launch.
    pub fn tick_active(&self) -> Option<TickOutcome> {
        let mut state = self.state.write();
        let id = state.active.clone()?;
        Some(Self::tick_locked(&mut state, &id))
    }

    fn tick_locked(state: &mut RegistryState, id: &str) -> TickOutcome {
        let RegistryState { polls, active, .. } = state;
        let Some(poll) = polls.get_mut(id) else {
            return TickOutcome {
                poll_id: id.to_string(),
                remaining_seconds: 0,
                closed: false,
            };
        };

        poll.remaining_seconds = poll.remaining_seconds.saturating_sub(1);
        let closed = poll.remaining_seconds == 0;
        if closed {
            poll.close();
            *active = None;
            tracing::debug!(poll_id = %id, "voting window elapsed");
        }

        TickOutcome {
            poll_id: id.to_string(),
            remaining_seconds: poll.remaining_seconds,
            closed,
        }
    }

    /// Get a poll by ID
    pub fn get(&self, id: &str) -> Option<Poll> {
        self.state.read().polls.get(id).cloned()
    }

    /// The Active poll, if any
    pub fn active(&self) -> Option<Poll> {
        let state = self.state.read();
        state.active.as_ref().and_then(|id| state.polls.get(id)).cloned()
    }

    /// List polls in creation order
    pub fn list(&self, filter: Option<&PollFilter>) -> Vec<Poll> {
        let state = self.state.read();
        let polls = state.order.iter().filter_map(|id| state.polls.get(id));

        let Some(filter) = filter else {
            return polls.cloned().collect();
        };

        let limit = if filter.limit > 0 {
            filter.limit
        } else {
            usize::MAX
        };
        polls
            .filter(|p| filter.state.map_or(true, |s| p.state == s))
            .skip(filter.offset)
            .take(limit)
            .cloned()
            .collect()
    }

    /// Whether `voter` has voted on the current activation of `id`
    pub fn has_voted(&self, id: &str, voter: &str) -> bool {
        self.state.read().guard.has_voted(id, voter)
    }

    /// Results for one poll, computed from a consistent snapshot
    pub fn results(&self, id: &str) -> Option<PollResults> {
        let state = self.state.read();
        state.polls.get(id).map(PollResults::from_poll)
    }

    /// Results for every poll, in creation order
    pub fn all_results(&self) -> Vec<PollResults> {
        let state = self.state.read();
        state
            .order
            .iter()
            .filter_map(|id| state.polls.get(id))
            .map(PollResults::from_poll)
            .collect()
    }

    pub fn stats(&self) -> RegistryStats {
        let state = self.state.read();
        let mut stats = RegistryStats {
            total_polls: state.polls.len(),
            ..Default::default()
        };
        for poll in state.polls.values() {
            match poll.state {
                PollState::Draft => stats.draft_polls += 1,
                PollState::Active => stats.active_polls += 1,
                PollState::Closed => stats.closed_polls += 1,
            }
            stats.total_votes += poll.total_votes();
        }
        stats
    }
}

/// Create a shared poll registry
pub fn create_registry(policy: WindowPolicy) -> Arc<PollRegistry> {
    Arc::new(PollRegistry::with_policy(policy))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::polls::tally::{percentage, winner};
    use crate::polls::ValidationError;

    fn season_request() -> NewPoll {
        NewPoll::new("Best season?")
            .with_options(["Summer", "Winter"])
            .with_window(30)
    }

    fn colour_request() -> NewPoll {
        NewPoll::new("Favorite color?").with_options(["Red", "Blue", "Green"])
    }

    #[test]
    fn test_create_poll() {
        let registry = PollRegistry::new();
        let poll = registry.create_poll(season_request()).unwrap();

        assert_eq!(poll.state, PollState::Draft);
        assert_eq!(registry.get(&poll.id).unwrap(), poll);
        assert!(registry.active().is_none());
    }

    #[test]
    fn test_create_poll_invalid_stores_nothing() {
        let registry = PollRegistry::new();
        let err = registry
            .create_poll(NewPoll::new("").with_options(["a", "b"]))
            .unwrap_err();
        assert_eq!(err, PollError::Validation(ValidationError::EmptyQuestion));
        assert!(registry.list(None).is_empty());
    }

    #[test]
    fn test_add_duplicate_id() {
        let registry = PollRegistry::new();
        let poll = Poll::create("Q?", ["a", "b"], None).unwrap();
        registry.add(poll.clone()).unwrap();

        let err = registry.add(poll.clone()).unwrap_err();
        assert_eq!(err, PollError::DuplicateId(poll.id));
        assert_eq!(registry.list(None).len(), 1);
    }

    #[test]
    fn test_add_rejects_non_draft() {
        let registry = PollRegistry::new();
        let mut poll = Poll::create("Q?", ["a", "b"], None).unwrap();
        poll.state = PollState::Active;

        let err = registry.add(poll).unwrap_err();
        assert!(matches!(err, PollError::InvalidState { operation: "add", .. }));
        assert!(registry.active().is_none());
    }

    #[test]
    fn test_add_applies_registry_policy() {
        let registry = PollRegistry::with_policy(WindowPolicy {
            max_seconds: 60,
            ..Default::default()
        });
        let poll = Poll::create("Q?", ["a", "b"], Some(120)).unwrap();
        let err = registry.add(poll).unwrap_err();
        assert!(matches!(
            err,
            PollError::Validation(ValidationError::WindowOutOfRange { seconds: 120, .. })
        ));
    }

    #[test]
    fn test_launch_activates() {
        let registry = PollRegistry::new();
        let poll = registry.create_poll(season_request()).unwrap();

        let launched = registry.launch(&poll.id).unwrap();
        assert_eq!(launched.state, PollState::Active);
        assert_eq!(launched.remaining_seconds, 30);
        assert!(launched.launched_at.is_some());
        assert_eq!(registry.active().unwrap().id, poll.id);
    }

    #[test]
    fn test_launch_unknown() {
        let registry = PollRegistry::new();
        assert_eq!(
            registry.launch("missing").unwrap_err(),
            PollError::NotFound("missing".to_string())
        );
    }

    #[test]
    fn test_launch_already_active() {
        let registry = PollRegistry::new();
        let poll = registry.create_poll(season_request()).unwrap();
        registry.launch(&poll.id).unwrap();
        registry.cast_vote(&poll.id, "Summer", "v1").unwrap();

        let err = registry.launch(&poll.id).unwrap_err();
        assert!(matches!(err, PollError::InvalidState { operation: "launch", .. }));
        // nothing was reset
        assert_eq!(registry.get(&poll.id).unwrap().total_votes(), 1);
    }

    #[test]
    fn test_launch_closes_previous() {
        let registry = PollRegistry::new();
        let a = registry.create_poll(season_request()).unwrap();
        let b = registry.create_poll(colour_request()).unwrap();

        registry.launch(&a.id).unwrap();
        registry.cast_vote(&a.id, "Winter", "v1").unwrap();
        registry.launch(&b.id).unwrap();

        let a_now = registry.get(&a.id).unwrap();
        assert_eq!(a_now.state, PollState::Closed);
        assert_eq!(a_now.votes_for("Winter"), 1);
        assert_eq!(registry.active().unwrap().id, b.id);

        let err = registry.cast_vote(&a.id, "Summer", "v2").unwrap_err();
        assert!(matches!(err, PollError::InvalidState { state: PollState::Closed, .. }));
        assert_eq!(registry.get(&a.id).unwrap().total_votes(), 1);
    }

    #[test]
    fn test_relaunch_closed_resets() {
        let registry = PollRegistry::new();
        let poll = registry.create_poll(season_request()).unwrap();
        registry.launch(&poll.id).unwrap();
        registry.cast_vote(&poll.id, "Summer", "v1").unwrap();
        registry.tick(&poll.id).unwrap();
        registry.stop(&poll.id).unwrap();

        let relaunched = registry.launch(&poll.id).unwrap();
        assert_eq!(relaunched.state, PollState::Active);
        assert_eq!(relaunched.total_votes(), 0);
        assert_eq!(relaunched.remaining_seconds, 30);
        assert!(!registry.has_voted(&poll.id, "v1"));

        // v1 may vote again in the new activation
        registry.cast_vote(&poll.id, "Winter", "v1").unwrap();
    }

    #[test]
    fn test_stop() {
        let registry = PollRegistry::new();
        let poll = registry.create_poll(season_request()).unwrap();
        registry.launch(&poll.id).unwrap();
        registry.cast_vote(&poll.id, "Summer", "v1").unwrap();

        let stopped = registry.stop(&poll.id).unwrap();
        assert_eq!(stopped.state, PollState::Closed);
        assert_eq!(stopped.total_votes(), 1);
        assert!(registry.active().is_none());

        // idempotent
        let again = registry.stop(&poll.id).unwrap();
        assert_eq!(again.state, PollState::Closed);
        assert_eq!(again.closed_at, stopped.closed_at);
    }

    #[test]
    fn test_stop_draft_is_noop() {
        let registry = PollRegistry::new();
        let poll = registry.create_poll(season_request()).unwrap();
        assert_eq!(registry.stop(&poll.id).unwrap().state, PollState::Draft);
        assert!(registry.stop("missing").is_err());
    }

    #[test]
    fn test_stop_active() {
        let registry = PollRegistry::new();
        assert!(registry.stop_active().is_none());

        let poll = registry.create_poll(season_request()).unwrap();
        registry.launch(&poll.id).unwrap();

        let stopped = registry.stop_active().unwrap();
        assert_eq!(stopped.id, poll.id);
        assert_eq!(stopped.state, PollState::Closed);
        assert!(registry.stop_active().is_none());
    }

    #[test]
    fn test_delete() {
        let registry = PollRegistry::new();
        let poll = registry.create_poll(season_request()).unwrap();

        assert_eq!(registry.delete(&poll.id).unwrap().id, poll.id);
        assert!(registry.get(&poll.id).is_none());
        assert_eq!(
            registry.delete(&poll.id).unwrap_err(),
            PollError::NotFound(poll.id.clone())
        );
    }

    #[test]
    fn test_delete_active_leaves_none_active() {
        let registry = PollRegistry::new();
        let a = registry.create_poll(season_request()).unwrap();
        let b = registry.create_poll(colour_request()).unwrap();
        registry.launch(&a.id).unwrap();
        registry.cast_vote(&a.id, "Summer", "v1").unwrap();

        registry.delete(&a.id).unwrap();
        assert!(registry.active().is_none());
        assert_eq!(registry.get(&b.id).unwrap().state, PollState::Draft);
        assert!(!registry.has_voted(&a.id, "v1"));
        assert!(registry.tick_active().is_none());
    }

    #[test]
    fn test_cast_vote_errors() {
        let registry = PollRegistry::new();
        let poll = registry.create_poll(season_request()).unwrap();

        assert_eq!(
            registry.cast_vote("missing", "Summer", "v1").unwrap_err(),
            PollError::NotFound("missing".to_string())
        );

        // draft
        let err = registry.cast_vote(&poll.id, "Summer", "v1").unwrap_err();
        assert!(matches!(err, PollError::InvalidState { state: PollState::Draft, .. }));

        registry.launch(&poll.id).unwrap();
        let err = registry.cast_vote(&poll.id, "Spring", "v1").unwrap_err();
        assert!(matches!(err, PollError::UnknownOption { .. }));

        registry.cast_vote(&poll.id, "Summer", "v1").unwrap();
        let err = registry.cast_vote(&poll.id, "Winter", "v1").unwrap_err();
        assert_eq!(
            err,
            PollError::DuplicateVote {
                id: poll.id.clone(),
                voter: "v1".to_string()
            }
        );

        let poll = registry.get(&poll.id).unwrap();
        assert_eq!(poll.total_votes(), 1);
        assert_eq!(poll.votes_for("Winter"), 0);
    }

    #[test]
    fn test_unknown_option_reported_before_duplicate() {
        let registry = PollRegistry::new();
        let poll = registry.create_poll(season_request()).unwrap();
        registry.launch(&poll.id).unwrap();
        registry.cast_vote(&poll.id, "Summer", "v1").unwrap();

        let err = registry.cast_vote(&poll.id, "Spring", "v1").unwrap_err();
        assert!(matches!(err, PollError::UnknownOption { .. }));
    }

    #[test]
    fn test_season_scenario() {
        let registry = PollRegistry::new();
        let poll = registry.create_poll(season_request()).unwrap();
        assert_eq!(poll.tally.count("Summer"), Some(0));
        assert_eq!(poll.tally.count("Winter"), Some(0));

        let poll = registry.launch(&poll.id).unwrap();
        assert_eq!(poll.remaining_seconds, 30);

        registry.cast_vote(&poll.id, "Summer", "v1").unwrap();
        registry.cast_vote(&poll.id, "Winter", "v2").unwrap();
        let receipt = registry.cast_vote(&poll.id, "Summer", "v3").unwrap();
        assert_eq!(receipt.option_votes, 2);
        assert_eq!(receipt.total_votes, 3);

        let poll = registry.get(&poll.id).unwrap();
        assert_eq!(poll.votes_for("Summer"), 2);
        assert_eq!(poll.votes_for("Winter"), 1);
        assert_eq!(percentage(&poll, "Summer"), 67);
        assert_eq!(percentage(&poll, "Winter"), 33);
        assert_eq!(winner(&poll).unwrap().option, "Summer");
    }

    #[test]
    fn test_tick_window_to_close() {
        let registry = PollRegistry::new();
        let poll = registry.create_poll(season_request()).unwrap();
        registry.launch(&poll.id).unwrap();

        let mut closes = 0;
        for expected in (0..30).rev() {
            let outcome = registry.tick(&poll.id).unwrap();
            assert_eq!(outcome.remaining_seconds, expected);
            if outcome.closed {
                closes += 1;
            }
        }
        assert_eq!(closes, 1);
        assert_eq!(registry.get(&poll.id).unwrap().state, PollState::Closed);
        assert!(registry.active().is_none());

        let err = registry.cast_vote(&poll.id, "Summer", "late").unwrap_err();
        assert!(matches!(err, PollError::InvalidState { .. }));

        // further ticks do not close it again
        assert!(matches!(
            registry.tick(&poll.id).unwrap_err(),
            PollError::InvalidState { operation: "tick", .. }
        ));
        assert!(registry.tick_active().is_none());
    }

    #[test]
    fn test_tick_active() {
        let registry = PollRegistry::new();
        assert!(registry.tick_active().is_none());

        let poll = registry.create_poll(season_request().with_window(10)).unwrap();
        registry.launch(&poll.id).unwrap();

        let outcome = registry.tick_active().unwrap();
        assert_eq!(outcome.poll_id, poll.id);
        assert_eq!(outcome.remaining_seconds, 9);
        assert!(!outcome.closed);
        assert_eq!(registry.active().unwrap().remaining_seconds, 9);
    }

    #[test]
    fn test_list_in_creation_order_with_filter() {
        let registry = PollRegistry::new();
        let a = registry.create_poll(season_request()).unwrap();
        let b = registry.create_poll(colour_request()).unwrap();
        let c = registry.create_poll(season_request()).unwrap();
        registry.launch(&b.id).unwrap();

        let ids: Vec<String> = registry.list(None).into_iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![a.id.clone(), b.id.clone(), c.id.clone()]);

        let drafts = registry.list(Some(&PollFilter::new().in_state(PollState::Draft)));
        assert_eq!(drafts.len(), 2);

        let page = registry.list(Some(&PollFilter::new().offset(1).limit(1)));
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].id, b.id);
    }

    #[test]
    fn test_snapshots_are_copies() {
        let registry = PollRegistry::new();
        let poll = registry.create_poll(season_request()).unwrap();

        let mut copy = registry.get(&poll.id).unwrap();
        copy.question = "changed".to_string();
        copy.state = PollState::Active;

        let stored = registry.get(&poll.id).unwrap();
        assert_eq!(stored.question, "Best season?");
        assert_eq!(stored.state, PollState::Draft);
    }

    #[test]
    fn test_results() {
        let registry = PollRegistry::new();
        let poll = registry.create_poll(colour_request()).unwrap();
        registry.launch(&poll.id).unwrap();
        registry.cast_vote(&poll.id, "Blue", "u1").unwrap();

        let results = registry.results(&poll.id).unwrap();
        assert_eq!(results.total_votes, 1);
        assert_eq!(results.winner.unwrap().option, "Blue");
        assert!(registry.results("missing").is_none());
        assert_eq!(registry.all_results().len(), 1);
    }

    #[test]
    fn test_registry_stats() {
        let registry = PollRegistry::new();
        assert_eq!(registry.stats(), RegistryStats::default());

        let a = registry.create_poll(season_request()).unwrap();
        let b = registry.create_poll(colour_request()).unwrap();
        registry.create_poll(colour_request()).unwrap();
        registry.launch(&a.id).unwrap();
        registry.cast_vote(&a.id, "Summer", "u1").unwrap();
        registry.launch(&b.id).unwrap();
        registry.cast_vote(&b.id, "Red", "u1").unwrap();
        registry.cast_vote(&b.id, "Red", "u2").unwrap();

        let stats = registry.stats();
        assert_eq!(stats.total_polls, 3);
        assert_eq!(stats.draft_polls, 1);
        assert_eq!(stats.active_polls, 1);
        assert_eq!(stats.closed_polls, 1);
        assert_eq!(stats.total_votes, 3);
    }
}
