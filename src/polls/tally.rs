//! Tally Engine
//!
//! Pure functions over a poll snapshot. They never touch the registry, so a
//! caller that got its [`Poll`] from the registry always sees a tally that
//! was consistent when it was copied.

use serde::{Deserialize, Serialize};

use super::poll::{Poll, PollState};

/// Share of the vote for `option`, as a whole percentage.
///
/// Rounds to the nearest integer with ties going away from zero, so 2 of 3
/// votes is 67 and 1 of 8 (12.5) is 13. Returns 0 when nobody has voted or
/// the option is not part of the poll.
pub fn percentage(poll: &Poll, option: &str) -> u32 {
    let total = poll.total_votes();
    if total == 0 {
        return 0;
    }
    let votes = poll.votes_for(option);
    // round(100 * votes / total) == floor((200 * votes + total) / (2 * total))
    ((200 * votes + total) / (2 * total)) as u32
}

/// Percentages for every option, in declared order
pub fn percentages(poll: &Poll) -> Vec<(String, u32)> {
    poll.options
        .iter()
        .map(|o| (o.clone(), percentage(poll, o)))
        .collect()
}

/// The leading option of a poll
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Winner {
    pub option: String,
    pub votes: u64,
}

/// Option with the most votes. On a tie the option declared first wins.
/// `None` until at least one vote has been cast.
pub fn winner(poll: &Poll) -> Option<Winner> {
    if poll.total_votes() == 0 {
        return None;
    }

    let mut best: Option<Winner> = None;
    for option in &poll.options {
        let votes = poll.votes_for(option);
        if best.as_ref().map_or(true, |b| votes > b.votes) {
            best = Some(Winner {
                option: option.clone(),
                votes,
            });
        }
    }
    best
}

/// Result line for one option
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionResult {
    pub option: String,
    pub votes: u64,
    pub percentage: u32,
    pub is_winner: bool,
}

/// Poll results summary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PollResults {
    pub poll_id: String,
    pub question: String,
    pub state: PollState,
    pub total_votes: u64,
    pub remaining_seconds: u32,
    /// Per-option results in declared order
    pub options: Vec<OptionResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub winner: Option<Winner>,
}

impl PollResults {
    pub fn from_poll(poll: &Poll) -> Self {
        let winner = winner(poll);
        let options = poll
            .options
            .iter()
            .map(|o| OptionResult {
                option: o.clone(),
                votes: poll.votes_for(o),
                percentage: percentage(poll, o),
                is_winner: winner.as_ref().is_some_and(|w| &w.option == o),
            })
            .collect();

        Self {
            poll_id: poll.id.clone(),
            question: poll.question.clone(),
            state: poll.state,
            total_votes: poll.total_votes(),
            remaining_seconds: poll.remaining_seconds,
            options,
            winner,
        }
    }
}
