//! Subscription and watch primitive
//!
//! A [`Subscription`] owns one dedicated consumption task that pulls a
//! sequence and runs a per-item callback. [`Subscription::watch`]
//! suspends the caller until a predicate over the callback's state
//! becomes true, the stream ends, or cancellation is requested.
//!
//! Delivery is lock-step: after each `on_item` returns, the
//! consumption task publishes the completed item and parks until a
//! watcher has evaluated its predicate against exactly that state
//! (or the subscription is released). The predicate therefore runs
//! once per item, never concurrently with any callback, and the state
//! that satisfied it stays untouched until the next watch call.

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use crate::common::errors::{Result, StrategyError};
use crate::stream::Sequence;

/// Lifecycle state of a subscription's consumption task
///
/// Transitions are one-way: `Active` moves to exactly one terminal
/// state and stays there.
#[derive(Debug, Clone, PartialEq)]
pub enum SubscriptionState {
    /// Consuming items
    Active,
    /// The underlying sequence ended
    Ended,
    /// Disposal or external cancellation stopped consumption
    Cancelled,
    /// The producer or the item callback failed
    Faulted(StrategyError),
}

/// Snapshot published by the consumption task after every transition
#[derive(Debug, Clone)]
struct Progress {
    /// Number of completed `on_item` invocations
    items: u64,
    state: SubscriptionState,
}

/// Scoped handle over one sequence's active consumption
///
/// Created by [`Subscription::spawn`]; must not outlive the strategy
/// run that created it. Dropping it aborts the consumption task;
/// [`Subscription::dispose`] additionally waits until the task has
/// reached a terminal state, guaranteeing no further callback fires.
pub struct Subscription {
    progress: watch::Receiver<Progress>,
    /// Highest item a predicate evaluation has released back to the
    /// consumption task; it does not pull past an unreleased item
    acks: watch::Sender<u64>,
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
    /// Item count the last predicate evaluation acted on
    seen_items: u64,
    /// False until the first watch call has evaluated its predicate
    primed: bool,
}

impl Subscription {
    /// Start consuming `sequence`, invoking `on_item` for each element
    ///
    /// `on_item` runs on the consumption task, one invocation at a
    /// time, in emission order. An `Err` from it faults the
    /// subscription (no retry); the next `watch` surfaces it.
    pub fn spawn<S, F>(mut sequence: S, mut on_item: F) -> Subscription
    where
        S: Sequence + 'static,
        F: FnMut(S::Item) -> Result<()> + Send + 'static,
    {
        let (progress_tx, progress_rx) = watch::channel(Progress {
            items: 0,
            state: SubscriptionState::Active,
        });
        let (ack_tx, mut ack_rx) = watch::channel(0u64);
        let cancel = CancellationToken::new();
        let task_cancel = cancel.clone();

        let task = tokio::spawn(async move {
            let terminal = 'run: loop {
                tokio::select! {
                    () = task_cancel.cancelled() => break 'run SubscriptionState::Cancelled,
                    pulled = sequence.next() => match pulled {
                        Ok(Some(item)) => match on_item(item) {
                            Ok(()) => {
                                // Publish strictly after the callback returns;
                                // watchers check their predicate on this edge.
                                let mut completed = 0;
                                progress_tx.send_modify(|p| {
                                    p.items += 1;
                                    completed = p.items;
                                });
                                // Park until a predicate has been evaluated
                                // against this item; the next pull must not
                                // start before that check completes.
                                while *ack_rx.borrow_and_update() < completed {
                                    tokio::select! {
                                        () = task_cancel.cancelled() => {
                                            break 'run SubscriptionState::Cancelled;
                                        }
                                        changed = ack_rx.changed() => {
                                            if changed.is_err() {
                                                // Subscription handle dropped.
                                                break;
                                            }
                                        }
                                    }
                                }
                            }
                            Err(err) => break 'run SubscriptionState::Faulted(err),
                        },
                        Ok(None) => break 'run SubscriptionState::Ended,
                        Err(err) => break 'run SubscriptionState::Faulted(err),
                    },
                }
            };
            debug!(state = ?terminal, "subscription consumption finished");
            progress_tx.send_modify(|p| p.state = terminal);
        });

        Subscription {
            progress: progress_rx,
            acks: ack_tx,
            cancel,
            task: Some(task),
            seen_items: 0,
            primed: false,
        }
    }

    /// Current lifecycle state
    pub fn state(&self) -> SubscriptionState {
        self.progress.borrow().state.clone()
    }

    /// Suspend until `predicate` holds
    ///
    /// The predicate is evaluated immediately on the first call (and
    /// whenever an item has completed that no previous evaluation
    /// acted on), then once per further completed `on_item`: the
    /// consumption task holds its next pull until each check has run,
    /// so a burst of items cannot be coalesced into a single check. A
    /// repeat call over unchanged state waits for fresh data instead
    /// of re-affirming the last answer, so a strategy looping on
    /// `watch` acts once per update, not once per poll.
    ///
    /// When `watch` returns `Ok(true)`, consumption stays parked until
    /// the next `watch` call: state read after a satisfied watch is
    /// exactly the state that satisfied it.
    ///
    /// Returns `Ok(true)` once the predicate holds; `Ok(false)` if the
    /// token is cancelled or the sequence ends first; `Err` if the
    /// producer or the callback faulted.
    pub async fn watch<P>(&mut self, mut predicate: P, cancel: &CancellationToken) -> Result<bool>
    where
        P: FnMut() -> bool,
    {
        loop {
            // Mark the current progress as seen before evaluating, so an
            // item landing between the check and the suspension below
            // still wakes us.
            let progress = self.progress.borrow_and_update().clone();
            let fresh = !self.primed || progress.items > self.seen_items;
            self.primed = true;
            self.seen_items = progress.items;
            if fresh && predicate() {
                trace!("watch predicate satisfied");
                // No ack: the consumption task stays parked on this
                // item until the caller watches again.
                return Ok(true);
            }
            // Release the consumption task for the item just evaluated
            // (or for one satisfied by a previous watch).
            self.acks.send_replace(progress.items);
            match progress.state {
                SubscriptionState::Active => {}
                SubscriptionState::Ended | SubscriptionState::Cancelled => return Ok(false),
                SubscriptionState::Faulted(err) => return Err(err),
            }
            tokio::select! {
                () = cancel.cancelled() => {
                    trace!("watch cancelled");
                    return Ok(false);
                }
                changed = self.progress.changed() => {
                    // A closed channel normally means the consumption
                    // task recorded a terminal state and exited; the
                    // next iteration acts on it. A close while still
                    // Active means the task panicked.
                    if changed.is_err()
                        && matches!(self.progress.borrow().state, SubscriptionState::Active)
                    {
                        return Err(StrategyError::Join(
                            "subscription task stopped without a terminal state".to_string(),
                        ));
                    }
                }
            }
        }
    }

    /// Stop consumption and wait for the task to reach a terminal state
    ///
    /// After `dispose` returns, no further `on_item` invocation can
    /// occur, even if the producer keeps emitting.
    pub async fn dispose(mut self) {
        self.cancel.cancel();
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        // Backstop for scope exit without an explicit dispose; the
        // task stops but we cannot wait for it here.
        self.cancel.cancel();
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
