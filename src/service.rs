//! Poll service
//!
//! The call surface the admin, voter and results front ends use. It wraps a
//! shared [`PollRegistry`], logs outcomes, keeps [`PollMetrics`], and can
//! delay poll creation and votes by a configured amount to exercise slow
//! front ends. The registry's own behavior is the same with or without it.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::metrics::PollMetrics;
use crate::polls::{
    run_window_clock, NewPoll, Poll, PollRegistry, PollResults, Result, TickOutcome, VoteReceipt,
};

#[derive(Debug, Clone)]
pub struct PollService {
    registry: Arc<PollRegistry>,
    metrics: Arc<PollMetrics>,
    simulated_latency: Option<Duration>,
}

impl PollService {
    pub fn new(registry: Arc<PollRegistry>) -> Self {
        Self {
            registry,
            metrics: Arc::new(PollMetrics::new()),
            simulated_latency: None,
        }
    }

    /// Build a registry with the configured window policy and latency
    pub fn from_config(config: &Config) -> Self {
        let registry = Arc::new(PollRegistry::with_policy(config.polls.window_policy()));
        Self::new(registry).with_simulated_latency(config.polls.simulated_latency())
    }

    pub fn with_simulated_latency(mut self, latency: Option<Duration>) -> Self {
        self.simulated_latency = latency;
        self
    }

    pub fn registry(&self) -> &Arc<PollRegistry> {
        &self.registry
    }

    pub fn metrics(&self) -> &PollMetrics {
        &self.metrics
    }

    async fn simulate_latency(&self) {
        if let Some(delay) = self.simulated_latency {
            tokio::time::sleep(delay).await;
        }
    }

    // -- admin ---------------------------------------------------------------

    pub async fn create_poll(&self, request: NewPoll) -> Result<Poll> {
        self.simulate_latency().await;
        let poll = self.registry.create_poll(request)?;
        self.metrics.polls_created.inc();
        tracing::info!(
            poll_id = %poll.id,
            options = poll.options.len(),
            window = poll.window_seconds,
            "poll created"
        );
        Ok(poll)
    }

    pub fn launch(&self, id: &str) -> Result<Poll> {
        let previous = self.registry.active().map(|p| p.id);
        let poll = self.registry.launch(id)?;

        self.metrics.polls_launched.inc();
        self.metrics
            .active_remaining_seconds
            .set(poll.remaining_seconds.into());
        if let Some(previous) = previous {
            self.metrics.polls_closed.inc();
            tracing::info!(poll_id = %previous, "poll closed by launch of another");
        }
        tracing::info!(poll_id = %poll.id, window = poll.window_seconds, "poll launched");
        Ok(poll)
    }

    pub fn stop(&self, id: &str) -> Result<Poll> {
        let was_active = self.registry.get(id).is_some_and(|p| p.is_active());
        let poll = self.registry.stop(id)?;
        if was_active && !poll.is_active() {
            self.note_closed(&poll);
        }
        Ok(poll)
    }

    /// Stop whatever is running
    pub fn stop_active(&self) -> Option<Poll> {
        let poll = self.registry.stop_active()?;
        self.note_closed(&poll);
        Some(poll)
    }

    fn note_closed(&self, poll: &Poll) {
        self.metrics.polls_closed.inc();
        self.metrics.active_remaining_seconds.set(0);
        tracing::info!(poll_id = %poll.id, votes = poll.total_votes(), "poll stopped");
    }

    pub fn delete(&self, id: &str) -> Result<Poll> {
        let poll = self.registry.delete(id)?;
        if poll.is_active() {
            self.metrics.active_remaining_seconds.set(0);
        }
        tracing::info!(poll_id = %id, "poll deleted");
        Ok(poll)
    }

    pub fn list(&self) -> Vec<Poll> {
        self.registry.list(None)
    }

    // -- voter ---------------------------------------------------------------

    /// The poll voters should see, if any
    pub fn current_poll(&self) -> Option<Poll> {
        self.registry.active()
    }

    pub async fn cast_vote(&self, id: &str, option: &str, voter: &str) -> Result<VoteReceipt> {
        self.simulate_latency().await;
        match self.registry.cast_vote(id, option, voter) {
            Ok(receipt) => {
                self.metrics.votes_accepted.inc();
                tracing::debug!(
                    poll_id = %id,
                    option = %option,
                    total = receipt.total_votes,
                    "vote accepted"
                );
                Ok(receipt)
            }
            Err(err) => {
                self.metrics.record_rejection(&err);
                tracing::debug!(poll_id = %id, error = %err, "vote rejected");
                Err(err)
            }
        }
    }

    pub fn has_voted(&self, id: &str, voter: &str) -> bool {
        self.registry.has_voted(id, voter)
    }

    // -- results -------------------------------------------------------------

    pub fn results(&self, id: &str) -> Option<PollResults> {
        self.registry.results(id)
    }

    pub fn all_results(&self) -> Vec<PollResults> {
        self.registry.all_results()
    }

    // -- clock ---------------------------------------------------------------

    /// Run the voting window clock on the current runtime until `cancel`
    pub fn spawn_clock(&self, period: Duration, cancel: CancellationToken) -> JoinHandle<()> {
        let metrics = self.metrics.clone();
        tokio::spawn(run_window_clock(
            self.registry.clone(),
            period,
            cancel,
            move |outcome: &TickOutcome| {
                metrics
                    .active_remaining_seconds
                    .set(outcome.remaining_seconds.into());
                if outcome.closed {
                    metrics.polls_closed.inc();
                }
            },
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::polls::{PollError, PollState};

    fn service() -> PollService {
        PollService::new(Arc::new(PollRegistry::new()))
    }

    fn request() -> NewPoll {
        NewPoll::new("Best season?").with_options(["Summer", "Winter"])
    }

    #[tokio::test]
    async fn test_admin_voter_results_flow() {
        let service = service();
        let poll = service.create_poll(request()).await.unwrap();
        service.launch(&poll.id).unwrap();
        assert_eq!(service.current_poll().unwrap().id, poll.id);

        service.cast_vote(&poll.id, "Summer", "v1").await.unwrap();
        service.cast_vote(&poll.id, "Winter", "v2").await.unwrap();
        let err = service.cast_vote(&poll.id, "Winter", "v2").await.unwrap_err();
        assert!(matches!(err, PollError::DuplicateVote { .. }));
        assert!(service.has_voted(&poll.id, "v1"));

        let results = service.results(&poll.id).unwrap();
        assert_eq!(results.total_votes, 2);
        assert_eq!(results.winner.unwrap().option, "Summer");

        let stopped = service.stop_active().unwrap();
        assert_eq!(stopped.state, PollState::Closed);

        let snap = service.metrics().snapshot();
        assert_eq!(snap.polls_created, 1);
        assert_eq!(snap.polls_launched, 1);
        assert_eq!(snap.polls_closed, 1);
        assert_eq!(snap.votes_accepted, 2);
        assert_eq!(snap.duplicate_votes, 1);
    }

    #[tokio::test]
    async fn test_launch_counts_replaced_poll_as_closed() {
        let service = service();
        let a = service.create_poll(request()).await.unwrap();
        let b = service.create_poll(request()).await.unwrap();
        service.launch(&a.id).unwrap();
        service.launch(&b.id).unwrap();

        assert_eq!(service.metrics().snapshot().polls_closed, 1);
        assert_eq!(service.list().len(), 2);
    }

    #[tokio::test]
    async fn test_stop_inactive_does_not_count() {
        let service = service();
        let poll = service.create_poll(request()).await.unwrap();
        service.stop(&poll.id).unwrap();
        assert_eq!(service.metrics().snapshot().polls_closed, 0);
        assert!(service.stop_active().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_simulated_latency_delays_votes() {
        let service = service().with_simulated_latency(Some(Duration::from_secs(1)));
        let poll = service.create_poll(request()).await.unwrap();
        service.launch(&poll.id).unwrap();

        let start = tokio::time::Instant::now();
        service.cast_vote(&poll.id, "Summer", "v1").await.unwrap();
        assert!(start.elapsed() >= Duration::from_secs(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_spawned_clock_closes_poll() {
        let service = service();
        let poll = service
            .create_poll(request().with_window(10))
            .await
            .unwrap();
        service.launch(&poll.id).unwrap();

        let cancel = CancellationToken::new();
        let handle = service.spawn_clock(Duration::from_secs(1), cancel.clone());
        tokio::time::sleep(Duration::from_millis(10_500)).await;

        assert_eq!(
            service.results(&poll.id).unwrap().state,
            PollState::Closed
        );
        let snap = service.metrics().snapshot();
        assert_eq!(snap.polls_closed, 1);
        assert_eq!(snap.active_remaining_seconds, 0);

        cancel.cancel();
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_from_config_uses_policy() {
        let mut config = Config::default();
        config.polls.max_window_seconds = 60;
        let service = PollService::from_config(&config);
        let err = service
            .create_poll(request().with_window(90))
            .await
            .unwrap_err();
        assert!(matches!(err, PollError::Validation(_)));
    }
}
