//! Poll metrics
//!
//! Lock-free counters for what happens at the service boundary: votes
//! accepted and rejected (by reason), launches, and closures.

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::polls::PollError;

/// Counter metric type
#[derive(Debug, Default)]
pub struct Counter {
    value: AtomicU64,
}

impl Counter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Increment the counter by 1
    pub fn inc(&self) {
        self.value.fetch_add(1, Ordering::Relaxed);
    }

    pub fn get(&self) -> u64 {
        self.value.load(Ordering::Relaxed)
    }
}

/// Gauge metric type (stores a single value)
#[derive(Debug, Default)]
pub struct Gauge {
    value: AtomicU64,
}

impl Gauge {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, value: u64) {
        self.value.store(value, Ordering::Relaxed);
    }

    pub fn get(&self) -> u64 {
        self.value.load(Ordering::Relaxed)
    }
}

/// Counters kept by the poll service
#[derive(Debug, Default)]
pub struct PollMetrics {
    pub polls_created: Counter,
    pub polls_launched: Counter,
    pub polls_closed: Counter,
    pub votes_accepted: Counter,
    pub votes_rejected_state: Counter,
    pub votes_rejected_duplicate: Counter,
    pub votes_rejected_other: Counter,
    /// Seconds left on the Active poll, 0 when none
    pub active_remaining_seconds: Gauge,
}

impl PollMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count a rejected vote under its reason
    pub fn record_rejection(&self, err: &PollError) {
        match err {
            PollError::InvalidState { .. } => self.votes_rejected_state.inc(),
            PollError::DuplicateVote { .. } => self.votes_rejected_duplicate.inc(),
            _ => self.votes_rejected_other.inc(),
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            polls_created: self.polls_created.get(),
            polls_launched: self.polls_launched.get(),
            polls_closed: self.polls_closed.get(),
            votes_accepted: self.votes_accepted.get(),
            votes_rejected: self.votes_rejected_state.get()
                + self.votes_rejected_duplicate.get()
                + self.votes_rejected_other.get(),
            duplicate_votes: self.votes_rejected_duplicate.get(),
            active_remaining_seconds: self.active_remaining_seconds.get(),
        }
    }
}

/// Point-in-time copy of [`PollMetrics`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsSnapshot {
    pub polls_created: u64,
    pub polls_launched: u64,
    pub polls_closed: u64,
    pub votes_accepted: u64,
    pub votes_rejected: u64,
    pub duplicate_votes: u64,
    pub active_remaining_seconds: u64,
}
