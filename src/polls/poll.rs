//! Poll Entity
//!
//! The poll record, its lifecycle state and vote tally, and the validation
//! applied before a poll is admitted to the registry.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use super::ValidationError;

/// Window used when the caller does not ask for one
pub const DEFAULT_WINDOW_SECONDS: u32 = 30;
/// Shortest accepted voting window
pub const MIN_WINDOW_SECONDS: u32 = 10;
/// Longest accepted voting window
pub const MAX_WINDOW_SECONDS: u32 = 300;
/// Upper bound on options per poll
pub const MAX_OPTIONS: usize = 20;

/// Lifecycle state of a poll
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PollState {
    /// Created, never launched
    #[default]
    Draft,
    /// Accepting votes
    Active,
    /// Voting finished, tally frozen
    Closed,
}

impl PollState {
    pub fn as_str(&self) -> &'static str {
        match self {
            PollState::Draft => "draft",
            PollState::Active => "active",
            PollState::Closed => "closed",
        }
    }
}

impl std::fmt::Display for PollState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-option vote counts for one poll.
///
/// Every option of the owning poll has an entry, and `total` is always the
/// sum of the entries. Both are maintained here, so the fields stay private.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteTally {
    counts: HashMap<String, u64>,
    total: u64,
}

impl VoteTally {
    /// Zero tally with one entry per option
    pub fn new<'a>(options: impl IntoIterator<Item = &'a String>) -> Self {
        Self {
            counts: options.into_iter().map(|o| (o.clone(), 0)).collect(),
            total: 0,
        }
    }

    /// Count for an option, `None` if the option is not part of the poll
    pub fn count(&self, option: &str) -> Option<u64> {
        self.counts.get(option).copied()
    }

    /// Total accepted votes
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Whether `option` has an entry
    pub fn contains(&self, option: &str) -> bool {
        self.counts.contains_key(option)
    }

    /// Add one vote for `option`. Returns the new count, or `None` (and
    /// changes nothing) if the option is unknown.
    pub(crate) fn increment(&mut self, option: &str) -> Option<u64> {
        let count = self.counts.get_mut(option)?;
        *count += 1;
        self.total += 1;
        Some(*count)
    }

    /// Zero every entry, keeping the option set
    pub(crate) fn reset(&mut self) {
        self.counts.values_mut().for_each(|c| *c = 0);
        self.total = 0;
    }

    /// Iterate over (option, count) pairs in arbitrary order
    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.counts.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

/// Bounds applied to the voting window and option count at creation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowPolicy {
    pub default_seconds: u32,
    pub min_seconds: u32,
    pub max_seconds: u32,
    pub max_options: usize,
}

impl Default for WindowPolicy {
    fn default() -> Self {
        Self {
            default_seconds: DEFAULT_WINDOW_SECONDS,
            min_seconds: MIN_WINDOW_SECONDS,
            max_seconds: MAX_WINDOW_SECONDS,
            max_options: MAX_OPTIONS,
        }
    }
}

impl WindowPolicy {
    /// Resolve the requested window, falling back to the default when absent
    pub fn resolve(&self, requested: Option<u32>) -> Result<u32, ValidationError> {
        let seconds = requested.unwrap_or(self.default_seconds);
        if seconds < self.min_seconds || seconds > self.max_seconds {
            return Err(ValidationError::WindowOutOfRange {
                seconds,
                min: self.min_seconds,
                max: self.max_seconds,
            });
        }
        Ok(seconds)
    }
}

/// Unvalidated poll creation request
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPoll {
    /// Question text
    pub question: String,
    /// Option labels in display order
    pub options: Vec<String>,
    /// Voting window in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub window_seconds: Option<u32>,
}

impl NewPoll {
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            ..Default::default()
        }
    }

    /// Append an option
    pub fn option(mut self, label: impl Into<String>) -> Self {
        self.options.push(label.into());
        self
    }

    /// Set all options
    pub fn with_options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options = options.into_iter().map(Into::into).collect();
        self
    }

    /// Set the voting window
    pub fn with_window(mut self, seconds: u32) -> Self {
        self.window_seconds = Some(seconds);
        self
    }

    /// Validate against `policy` and build a Draft poll with a fresh id.
    pub fn build(self, policy: &WindowPolicy) -> Result<Poll, ValidationError> {
        let (question, options, window_seconds) = self.validate(policy)?;

        Ok(Poll {
            id: uuid::Uuid::new_v4().to_string(),
            question,
            tally: VoteTally::new(&options),
            options,
            window_seconds,
            remaining_seconds: window_seconds,
            state: PollState::Draft,
            created_at: Utc::now(),
            launched_at: None,
            closed_at: None,
        })
    }

    /// Check the request against `policy`. Returns the trimmed question, the
    /// trimmed options and the resolved window.
    pub fn validate(
        &self,
        policy: &WindowPolicy,
    ) -> Result<(String, Vec<String>, u32), ValidationError> {
        let question = self.question.trim();
        if question.is_empty() {
            return Err(ValidationError::EmptyQuestion);
        }

        let options: Vec<String> = self.options.iter().map(|o| o.trim().to_string()).collect();
        if let Some(index) = options.iter().position(|o| o.is_empty()) {
            return Err(ValidationError::EmptyOption { index });
        }
        if options.len() < 2 {
            return Err(ValidationError::InsufficientOptions {
                count: options.len(),
            });
        }
        if options.len() > policy.max_options {
            return Err(ValidationError::TooManyOptions {
                max: policy.max_options,
            });
        }

        let mut seen = HashSet::new();
        for option in &options {
            if !seen.insert(option.as_str()) {
                return Err(ValidationError::DuplicateOption(option.clone()));
            }
        }

        let window_seconds = policy.resolve(self.window_seconds)?;

        Ok((question.to_string(), options, window_seconds))
    }
}

/// A poll and its tally.
///
/// Values handed out by the registry are copies; changing one has no effect
/// on the registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Poll {
    /// Opaque unique identifier
    pub id: String,
    /// Question text
    pub question: String,
    /// Option labels in declared order
    pub options: Vec<String>,
    /// Configured voting window
    pub window_seconds: u32,
    /// Seconds left in the current window
    pub remaining_seconds: u32,
    /// Lifecycle state
    pub state: PollState,
    /// Vote counts
    pub tally: VoteTally,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Most recent launch
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub launched_at: Option<DateTime<Utc>>,
    /// When the poll last closed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub closed_at: Option<DateTime<Utc>>,
}

impl Poll {
    /// Validate and build a Draft poll with the default window policy
    pub fn create(
        question: impl Into<String>,
        options: impl IntoIterator<Item = impl Into<String>>,
        window_seconds: Option<u32>,
    ) -> Result<Self, ValidationError> {
        let mut request = NewPoll::new(question).with_options(options);
        request.window_seconds = window_seconds;
        request.build(&WindowPolicy::default())
    }

    /// Total accepted votes
    pub fn total_votes(&self) -> u64 {
        self.tally.total()
    }

    /// Count for an option (0 for unknown options)
    pub fn votes_for(&self, option: &str) -> u64 {
        self.tally.count(option).unwrap_or(0)
    }

    pub fn is_active(&self) -> bool {
        self.state == PollState::Active
    }

    /// Active with time left on the window
    pub fn accepts_votes(&self) -> bool {
        self.is_active() && self.remaining_seconds > 0
    }

    pub fn has_option(&self, option: &str) -> bool {
        self.tally.contains(option)
    }

    /// Enter Active with a fresh window and a zero tally
    pub(crate) fn activate(&mut self) {
        self.state = PollState::Active;
        self.remaining_seconds = self.window_seconds;
        self.tally.reset();
        self.launched_at = Some(Utc::now());
        self.closed_at = None;
    }

    /// Enter Closed, freezing the tally
    pub(crate) fn close(&mut self) {
        self.state = PollState::Closed;
        self.closed_at = Some(Utc::now());
    }
}
