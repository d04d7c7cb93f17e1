//! Voting window clock.
//!
//! The registry only knows how to advance a window by one step
//! ([`PollRegistry::tick_active`]); this loop is the timer that calls it.
//! Hosts that already own a scheduler can call `tick_active` themselves
//! instead.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use super::engine::{PollRegistry, TickOutcome};

/// Tick the Active poll every `period` until `cancel` fires.
///
/// `on_tick` sees every outcome, including the one that closes a poll.
pub async fn run_window_clock(
    registry: Arc<PollRegistry>,
    period: Duration,
    cancel: CancellationToken,
    mut on_tick: impl FnMut(&TickOutcome) + Send,
) {
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::debug!("window clock cancelled");
                break;
            }
            _ = ticker.tick() => {
                let Some(outcome) = registry.tick_active() else {
                    continue;
                };
                if outcome.closed {
                    tracing::info!(poll_id = %outcome.poll_id, "voting window closed");
                } else {
                    tracing::trace!(
                        poll_id = %outcome.poll_id,
                        remaining = outcome.remaining_seconds,
                        "window tick"
                    );
                }
                on_tick(&outcome);
            }
        }
    }
}
