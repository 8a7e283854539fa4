//! Latest-value zip combinator
//!
//! Combines two independent sequences into one sequence of pairs. A
//! pair is emitted on every arrival from either side, carrying the
//! other side's most recently seen value, starting once both sides
//! have produced at least one element.

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::trace;

use crate::common::errors::{Result, StrategyError};

use super::Sequence;

/// One tagged arrival funneled from a side's forwarder task
enum Arrival<X, Y> {
    Left(X),
    Right(Y),
    /// A side ended; the combined sequence ends with it
    End,
    Fault(StrategyError),
}

/// Combine two sequences into a sequence of latest-value pairs
///
/// Either side ending ends the combined sequence; either side
/// faulting faults it. Dropping the returned [`ZipLatest`] cancels
/// both underlying pulls.
pub fn zip_latest<S1, S2>(left: S1, right: S2) -> ZipLatest<S1::Item, S2::Item>
where
    S1: Sequence + 'static,
    S2: Sequence + 'static,
    S1::Item: Clone + Send + 'static,
    S2::Item: Clone + Send + 'static,
{
    let (tx, rx) = mpsc::unbounded_channel();
    let cancel = CancellationToken::new();

    let left_task = spawn_side(left, tx.clone(), cancel.clone(), Arrival::Left);
    let right_task = spawn_side(right, tx, cancel.clone(), Arrival::Right);

    ZipLatest {
        rx,
        cancel,
        tasks: [left_task, right_task],
        last_left: None,
        last_right: None,
        done: false,
    }
}

/// Forward one side's elements into the shared arrival channel
///
/// The shared channel is what serializes near-simultaneous arrivals:
/// each one lands exactly once, in arrival order.
fn spawn_side<S, X, Y>(
    mut sequence: S,
    tx: mpsc::UnboundedSender<Arrival<X, Y>>,
    cancel: CancellationToken,
    wrap: fn(S::Item) -> Arrival<X, Y>,
) -> JoinHandle<()>
where
    S: Sequence + 'static,
    X: Send + 'static,
    Y: Send + 'static,
{
    tokio::spawn(async move {
        loop {
            tokio::select! {
                () = cancel.cancelled() => break,
                pulled = sequence.next() => match pulled {
                    Ok(Some(item)) => {
                        if tx.send(wrap(item)).is_err() {
                            break;
                        }
                    }
                    Ok(None) => {
                        let _ = tx.send(Arrival::End);
                        break;
                    }
                    Err(err) => {
                        let _ = tx.send(Arrival::Fault(err));
                        break;
                    }
                },
            }
        }
    })
}

/// Sequence of `(X, Y)` latest-value pairs; see [`zip_latest`]
pub struct ZipLatest<X, Y> {
    rx: mpsc::UnboundedReceiver<Arrival<X, Y>>,
    cancel: CancellationToken,
    tasks: [JoinHandle<()>; 2],
    last_left: Option<X>,
    last_right: Option<Y>,
    done: bool,
}

impl<X, Y> ZipLatest<X, Y> {
    fn finish(&mut self) {
        self.done = true;
        // Stop the surviving side's pull promptly.
        self.cancel.cancel();
    }
}

#[async_trait]
impl<X, Y> Sequence for ZipLatest<X, Y>
where
    X: Clone + Send,
    Y: Clone + Send,
{
    type Item = (X, Y);

    async fn next(&mut self) -> Result<Option<(X, Y)>> {
        if self.done {
            return Ok(None);
        }
        loop {
            match self.rx.recv().await {
                Some(Arrival::Left(x)) => {
                    trace!("zip_latest: left arrival");
                    self.last_left = Some(x);
                }
                Some(Arrival::Right(y)) => {
                    trace!("zip_latest: right arrival");
                    self.last_right = Some(y);
                }
                Some(Arrival::End) | None => {
                    self.finish();
                    return Ok(None);
                }
                Some(Arrival::Fault(err)) => {
                    self.finish();
                    return Err(err);
                }
            }
            // No pair leaves until both slots have been filled once.
            if let (Some(left), Some(right)) = (&self.last_left, &self.last_right) {
                return Ok(Some((left.clone(), right.clone())));
            }
        }
    }
}

impl<X, Y> Drop for ZipLatest<X, Y> {
    fn drop(&mut self) {
        self.cancel.cancel();
        for task in &self.tasks {
            task.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::EventStream;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_no_pair_before_both_sides_emit() {
        let (left_tx, left) = EventStream::channel();
        let (right_tx, right) = EventStream::channel();
        let mut zipped = zip_latest(left, right);

        assert!(left_tx.send(1u32).await);

        // One-sided input must not produce a pair.
        let premature =
            tokio::time::timeout(std::time::Duration::from_millis(50), zipped.next()).await;
        assert!(premature.is_err());

        assert!(right_tx.send(10u32).await);
        assert_eq!(zipped.next().await.unwrap(), Some((1, 10)));
    }

    #[tokio::test]
    async fn test_reemits_on_every_arrival_with_latest_other_side() {
        let (left_tx, left) = EventStream::channel();
        let (right_tx, right) = EventStream::channel();
        let mut zipped = zip_latest(left, right);

        assert!(left_tx.send(1u32).await);
        assert!(right_tx.send(10u32).await);
        assert_eq!(zipped.next().await.unwrap(), Some((1, 10)));

        assert!(right_tx.send(20u32).await);
        assert_eq!(zipped.next().await.unwrap(), Some((1, 20)));

        assert!(left_tx.send(2u32).await);
        assert_eq!(zipped.next().await.unwrap(), Some((2, 20)));
    }

    #[tokio::test]
    async fn test_burst_from_one_side_emits_one_pair_per_arrival() {
        let (left_tx, left) = EventStream::channel();
        let (right_tx, right) = EventStream::channel();
        let mut zipped = zip_latest(left, right);

        assert!(left_tx.send(1u32).await);
        assert!(right_tx.send(10u32).await);
        assert_eq!(zipped.next().await.unwrap(), Some((1, 10)));

        // A burst from one side lands one pair per arrival, in order.
        assert!(right_tx.send(11u32).await);
        assert!(right_tx.send(12u32).await);
        assert_eq!(zipped.next().await.unwrap(), Some((1, 11)));
        assert_eq!(zipped.next().await.unwrap(), Some((1, 12)));
    }

    #[tokio::test]
    async fn test_either_side_ending_ends_the_pair_stream() {
        let (left_tx, left) = EventStream::channel();
        let (right_tx, right) = EventStream::<u32>::channel();
        let mut zipped = zip_latest(left, right);

        assert!(left_tx.send(1u32).await);
        drop(right_tx);

        assert_eq!(zipped.next().await.unwrap(), None);
        assert_eq!(zipped.next().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_side_fault_propagates() {
        let (left_tx, left) = EventStream::channel();
        let (right_tx, right) = EventStream::channel();
        let mut zipped = zip_latest(left, right);

        assert!(left_tx.send(1u32).await);
        assert!(right_tx.send(10u32).await);
        assert_eq!(zipped.next().await.unwrap(), Some((1, 10)));

        assert!(left_tx.fail("binance feed dropped").await);
        let err = loop {
            match zipped.next().await {
                Ok(Some(_)) => continue,
                Ok(None) => panic!("expected a fault, got end-of-stream"),
                Err(err) => break err,
            }
        };
        assert!(matches!(err, StrategyError::Producer(_)));
    }

    #[tokio::test]
    async fn test_dropping_combinator_cancels_both_pulls() {
        let (left_tx, left) = EventStream::<u32>::channel();
        let (right_tx, right) = EventStream::<u32>::channel();
        let zipped = zip_latest(left, right);

        drop(zipped);

        left_tx.closed().await;
        right_tx.closed().await;
        assert!(left_tx.is_closed());
        assert!(right_tx.is_closed());
    }
}
