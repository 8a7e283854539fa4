//! Pull-based event sequences and their combinators
//!
//! A [`Sequence`] is a lazy, potentially infinite, non-restartable
//! source of typed events. Producers push; the [`adapter`] buffers and
//! turns that into a pull; [`zip_latest`] combines two sequences into
//! a stream of latest-value pairs.

pub mod adapter;
pub mod zip_latest;

use async_trait::async_trait;

use crate::common::errors::Result;

pub use adapter::{EventSink, EventStream};
pub use zip_latest::{zip_latest, ZipLatest};

/// Contract for anything the strategy core can consume
///
/// `next` suspends until an element is ready. `Ok(Some(item))` is one
/// element, `Ok(None)` is end-of-stream (terminal), and `Err` surfaces
/// an upstream fault on the pull that observes it (also terminal).
///
/// # Implementation Notes
///
/// - Elements must be delivered in emission order.
/// - After `Ok(None)` or `Err`, further calls must keep returning a
///   terminal answer; callers are allowed to stop pulling instead.
/// - Dropping a sequence must release its producer-side resources.
#[async_trait]
pub trait Sequence: Send {
    /// Element type produced by this sequence
    type Item: Send;

    /// Pull the next element, suspending until one is ready
    async fn next(&mut self) -> Result<Option<Self::Item>>;
}
