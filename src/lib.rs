//! ticker_reactor
//!
//! A reactive execution core for event-driven trading strategies:
//! subscribe to independently-arriving ticker streams, combine them
//! into latest-value pairs, and suspend until a predicate over the
//! combined state holds. Everything is cancellable and cleans up
//! after itself.

pub mod common;
pub mod config;
pub mod stream;
pub mod strategy;

// Re-export commonly used types
pub use common::channels::BufferPolicy;
pub use common::errors::{Result, StrategyError};
pub use common::types::{Ticker, Venue};
pub use config::{load_config, RuntimeConfig};
pub use stream::{zip_latest, EventSink, EventStream, Sequence, ZipLatest};
pub use strategy::{
    SimpleArbitrageStrategy, Strategy, StrategyHandle, StrategyHost, Subscription,
    SubscriptionState,
};
