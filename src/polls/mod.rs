//! Polling Module
//!
//! Live poll lifecycle and vote tallying. A [`PollRegistry`] owns every poll,
//! keeps at most one of them Active, and applies votes atomically; the
//! [`tally`] functions derive percentages and the winner from a snapshot.

pub mod clock;
pub mod engine;
pub mod guard;
pub mod poll;
pub mod tally;

pub use clock::run_window_clock;
pub use engine::{create_registry, PollFilter, PollRegistry, RegistryStats, TickOutcome, VoteReceipt};
pub use guard::VoteGuard;
pub use poll::{NewPoll, Poll, PollState, VoteTally, WindowPolicy};
pub use tally::{percentage, percentages, winner, OptionResult, PollResults, Winner};

use thiserror::Error;

/// Reasons a poll creation request is rejected
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("question is empty")]
    EmptyQuestion,

    #[error("a poll needs at least 2 options, got {count}")]
    InsufficientOptions { count: usize },

    #[error("option {index} is empty")]
    EmptyOption { index: usize },

    #[error("duplicate option: {0}")]
    DuplicateOption(String),

    #[error("a poll cannot have more than {max} options")]
    TooManyOptions { max: usize },

    #[error("window of {seconds}s is outside {min}..={max}s")]
    WindowOutOfRange { seconds: u32, min: u32, max: u32 },
}

/// Poll registry errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PollError {
    #[error("invalid poll: {0}")]
    Validation(#[from] ValidationError),

    #[error("poll not found: {0}")]
    NotFound(String),

    #[error("cannot {operation} poll {id} while it is {state}")]
    InvalidState {
        id: String,
        state: PollState,
        operation: &'static str,
    },

    #[error("poll {id} has no option {option:?}")]
    UnknownOption { id: String, option: String },

    #[error("{voter} already voted on poll {id}")]
    DuplicateVote { id: String, voter: String },

    #[error("poll id already exists: {0}")]
    DuplicateId(String),
}

/// Result type for poll operations
pub type Result<T> = std::result::Result<T, PollError>;
