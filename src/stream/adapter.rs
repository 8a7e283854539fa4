//! Push-to-pull stream adapter
//!
//! Exchange feeds push events at their own pace; the strategy core
//! pulls. [`EventStream::channel`] bridges the two with an
//! at-least-one-deep buffer so a producer emitting before the consumer
//! asks for the next element never loses it.

use async_trait::async_trait;
use futures_util::{Stream, StreamExt};
use tokio::sync::mpsc;
use tracing::debug;

use crate::common::channels::BufferPolicy;
use crate::common::errors::{Result, StrategyError};

use super::Sequence;

/// One frame on the producer-to-consumer channel
enum Frame<T> {
    Item(T),
    Fault(StrategyError),
}

enum SinkInner<T> {
    Unbounded(mpsc::UnboundedSender<Frame<T>>),
    Bounded(mpsc::Sender<Frame<T>>),
}

impl<T> Clone for SinkInner<T> {
    fn clone(&self) -> Self {
        match self {
            SinkInner::Unbounded(tx) => SinkInner::Unbounded(tx.clone()),
            SinkInner::Bounded(tx) => SinkInner::Bounded(tx.clone()),
        }
    }
}

/// Producer-side handle of an event stream
///
/// Clonable; dropping every sink ends the stream. A bounded sink's
/// `send` suspends while the buffer is full, an unbounded sink's never
/// does.
pub struct EventSink<T> {
    inner: SinkInner<T>,
}

impl<T> Clone for EventSink<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T: Send> EventSink<T> {
    /// Push one event. Returns `false` if the consumer is gone.
    pub async fn send(&self, item: T) -> bool {
        self.push(Frame::Item(item)).await
    }

    /// Terminate the stream with a fault, delivered to the consumer on
    /// its next pull. Returns `false` if the consumer is gone.
    pub async fn fail(&self, err: impl std::fmt::Display) -> bool {
        self.push(Frame::Fault(StrategyError::producer(err))).await
    }

    /// True once the consumer half has been dropped
    pub fn is_closed(&self) -> bool {
        match &self.inner {
            SinkInner::Unbounded(tx) => tx.is_closed(),
            SinkInner::Bounded(tx) => tx.is_closed(),
        }
    }

    /// Suspend until the consumer half is dropped
    pub async fn closed(&self) {
        match &self.inner {
            SinkInner::Unbounded(tx) => tx.closed().await,
            SinkInner::Bounded(tx) => tx.closed().await,
        }
    }

    async fn push(&self, frame: Frame<T>) -> bool {
        match &self.inner {
            SinkInner::Unbounded(tx) => tx.send(frame).is_ok(),
            SinkInner::Bounded(tx) => tx.send(frame).await.is_ok(),
        }
    }
}

enum StreamInner<T> {
    Unbounded(mpsc::UnboundedReceiver<Frame<T>>),
    Bounded(mpsc::Receiver<Frame<T>>),
}

/// Consumer-side handle of an event stream; the pull end of the bridge
///
/// Implements [`Sequence`]. Dropping it closes the channel so
/// producers observe cancellation via [`EventSink::is_closed`].
pub struct EventStream<T> {
    inner: StreamInner<T>,
    done: bool,
}

impl<T: Send + 'static> EventStream<T> {
    /// Create an unbounded push-to-pull bridge (the ticker default)
    pub fn channel() -> (EventSink<T>, EventStream<T>) {
        Self::with_policy(BufferPolicy::Unbounded)
    }

    /// Create a bridge with an explicit buffering policy
    pub fn with_policy(policy: BufferPolicy) -> (EventSink<T>, EventStream<T>) {
        match policy {
            BufferPolicy::Unbounded => {
                let (tx, rx) = mpsc::unbounded_channel();
                (
                    EventSink {
                        inner: SinkInner::Unbounded(tx),
                    },
                    EventStream {
                        inner: StreamInner::Unbounded(rx),
                        done: false,
                    },
                )
            }
            BufferPolicy::Bounded(capacity) => {
                let (tx, rx) = mpsc::channel(capacity.max(1));
                (
                    EventSink {
                        inner: SinkInner::Bounded(tx),
                    },
                    EventStream {
                        inner: StreamInner::Bounded(rx),
                        done: false,
                    },
                )
            }
        }
    }

    /// Adapt any [`futures_util::Stream`] into an [`EventStream`]
    ///
    /// Spawns a forwarding task that stops as soon as the source ends
    /// or the consumer is dropped.
    pub fn from_stream<S>(source: S) -> EventStream<T>
    where
        S: Stream<Item = T> + Send + 'static,
    {
        let (sink, stream) = Self::channel();
        tokio::spawn(async move {
            futures_util::pin_mut!(source);
            loop {
                tokio::select! {
                    () = sink.closed() => {
                        debug!("event stream consumer dropped; stopping forwarder");
                        break;
                    }
                    item = source.next() => match item {
                        Some(item) => {
                            if !sink.send(item).await {
                                break;
                            }
                        }
                        None => break,
                    },
                }
            }
        });
        stream
    }
}

#[async_trait]
impl<T: Send> Sequence for EventStream<T> {
    type Item = T;

    async fn next(&mut self) -> Result<Option<T>> {
        if self.done {
            return Ok(None);
        }
        let frame = match &mut self.inner {
            StreamInner::Unbounded(rx) => rx.recv().await,
            StreamInner::Bounded(rx) => rx.recv().await,
        };
        match frame {
            Some(Frame::Item(item)) => Ok(Some(item)),
            Some(Frame::Fault(err)) => {
                self.done = true;
                Err(err)
            }
            None => {
                self.done = true;
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_buffers_event_emitted_before_first_pull() {
        let (sink, mut stream) = EventStream::channel();
        assert!(sink.send(1u32).await);
        assert!(sink.send(2u32).await);

        assert_eq!(stream.next().await.unwrap(), Some(1));
        assert_eq!(stream.next().await.unwrap(), Some(2));
    }

    #[tokio::test]
    async fn test_stream_ends_when_all_sinks_drop() {
        let (sink, mut stream) = EventStream::<u32>::channel();
        drop(sink);
        assert_eq!(stream.next().await.unwrap(), None);
        // Terminal answer is sticky.
        assert_eq!(stream.next().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_fault_surfaces_on_next_pull() {
        let (sink, mut stream) = EventStream::channel();
        assert!(sink.send(7u32).await);
        assert!(sink.fail("feed disconnected").await);

        assert_eq!(stream.next().await.unwrap(), Some(7));
        let err = stream.next().await.unwrap_err();
        assert!(matches!(err, StrategyError::Producer(_)));
        assert_eq!(stream.next().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_dropping_consumer_closes_sink() {
        let (sink, stream) = EventStream::<u32>::channel();
        assert!(!sink.is_closed());
        drop(stream);
        sink.closed().await;
        assert!(sink.is_closed());
        assert!(!sink.send(1).await);
    }

    #[tokio::test]
    async fn test_from_stream_forwards_all_items() {
        let mut stream = EventStream::from_stream(futures_util::stream::iter(vec![1u32, 2, 3]));
        assert_eq!(stream.next().await.unwrap(), Some(1));
        assert_eq!(stream.next().await.unwrap(), Some(2));
        assert_eq!(stream.next().await.unwrap(), Some(3));
        assert_eq!(stream.next().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_bounded_policy_applies_backpressure() {
        let (sink, mut stream) = EventStream::with_policy(BufferPolicy::Bounded(1));
        assert!(sink.send(1u32).await);

        // A second send must wait for the consumer to drain one slot.
        let pending = tokio::time::timeout(std::time::Duration::from_millis(50), sink.send(2u32));
        assert!(pending.await.is_err());

        assert_eq!(stream.next().await.unwrap(), Some(1));
        assert!(sink.send(2u32).await);
        assert_eq!(stream.next().await.unwrap(), Some(2));
    }
}
