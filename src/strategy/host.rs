//! Strategy trait and lifecycle host
//!
//! A strategy is one long-running `run` task. The host starts it,
//! hands it a cancellation token, and exposes a handle that surfaces
//! the run's outcome. Subscriptions opened inside `run` are owned by
//! the `run` scope, so they are released before any fault reaches the
//! handle.

use async_trait::async_trait;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::common::errors::{Result, StrategyError};

/// Contract every strategy implements to run inside the host
///
/// `run` is the strategy body: typically open subscriptions, loop on
/// [`Subscription::watch`](crate::strategy::Subscription::watch), act
/// between iterations, and return when the watch reports `false`
/// (stream ended or cancelled).
///
/// # Implementation Notes
///
/// - `run` owns its captured state; nothing else reads or writes it.
/// - All suspension points inside `run` must observe `cancel`.
/// - Returning `Err` marks the run as faulted; the core never retries.
#[async_trait]
pub trait Strategy: Send + 'static {
    /// Identifier used in logs
    fn name(&self) -> &str;

    /// The strategy body; runs once per start
    async fn run(&mut self, cancel: CancellationToken) -> Result<()>;
}

/// One-shot host for a strategy's single execution task
pub struct StrategyHost<S: Strategy> {
    strategy: Option<S>,
}

impl<S: Strategy> StrategyHost<S> {
    /// Wrap a strategy, ready to be started once
    pub fn new(strategy: S) -> Self {
        Self {
            strategy: Some(strategy),
        }
    }

    /// Launch the strategy's `run` as an independent task
    ///
    /// One-shot contract: a second call returns
    /// [`StrategyError::AlreadyStarted`] immediately, whether the
    /// first run is still active or already finished.
    pub fn start(&mut self) -> Result<StrategyHandle> {
        let mut strategy = self
            .strategy
            .take()
            .ok_or(StrategyError::AlreadyStarted)?;

        let cancel = CancellationToken::new();
        let run_token = cancel.clone();
        let task = tokio::spawn(async move {
            let name = strategy.name().to_string();
            info!(strategy = %name, "strategy started");
            let outcome = strategy.run(run_token).await;
            match &outcome {
                Ok(()) => info!(strategy = %name, "strategy finished"),
                Err(err) => error!(strategy = %name, error = %err, "strategy faulted"),
            }
            outcome
        });

        Ok(StrategyHandle { cancel, task })
    }
}

/// Handle over a started strategy run
pub struct StrategyHandle {
    cancel: CancellationToken,
    task: JoinHandle<Result<()>>,
}

impl StrategyHandle {
    /// Request cooperative cancellation of the run
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Token observed by the run; cancelling it is equivalent to
    /// [`StrategyHandle::cancel`]
    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Wait for the run to finish and surface its outcome
    ///
    /// Cancellation yields `Ok(())`; faults inside `run` (or a panic
    /// of the run task) yield `Err`.
    pub async fn join(self) -> Result<()> {
        self.task.await?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::time::timeout;

    struct IdleStrategy;

    #[async_trait]
    impl Strategy for IdleStrategy {
        fn name(&self) -> &str {
            "idle"
        }

        async fn run(&mut self, cancel: CancellationToken) -> Result<()> {
            cancel.cancelled().await;
            Ok(())
        }
    }

    struct FaultyStrategy;

    #[async_trait]
    impl Strategy for FaultyStrategy {
        fn name(&self) -> &str {
            "faulty"
        }

        async fn run(&mut self, _cancel: CancellationToken) -> Result<()> {
            Err(StrategyError::action("order rejected"))
        }
    }

    #[tokio::test]
    async fn test_second_start_is_an_immediate_error() {
        let mut host = StrategyHost::new(IdleStrategy);
        let handle = host.start().unwrap();

        let second = host.start();
        assert!(matches!(second, Err(StrategyError::AlreadyStarted)));

        handle.cancel();
        handle.join().await.unwrap();
    }

    #[tokio::test]
    async fn test_cancel_unwinds_the_run() {
        let mut host = StrategyHost::new(IdleStrategy);
        let handle = host.start().unwrap();

        handle.cancel();
        timeout(Duration::from_secs(1), handle.join())
            .await
            .expect("run did not observe cancellation")
            .unwrap();
    }

    #[tokio::test]
    async fn test_fault_propagates_to_join() {
        let mut host = StrategyHost::new(FaultyStrategy);
        let handle = host.start().unwrap();

        let err = handle.join().await.unwrap_err();
        assert!(matches!(err, StrategyError::Action(_)));
    }
}
