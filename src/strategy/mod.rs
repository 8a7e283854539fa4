//! Strategy execution: subscriptions, watch, and the lifecycle host
//!
//! A strategy body is logically single-threaded: producers may run
//! anywhere, but the subscription layer serializes their effects onto
//! the strategy's timeline. The only synchronization a strategy needs
//! is the happens-before edge the watch primitive provides between
//! "callback completed" and "predicate re-checked".
//!
//! # Components
//!
//! - [`Strategy`]: trait for implementing strategy bodies
//! - [`StrategyHost`] / [`StrategyHandle`]: one-shot start, cancel, join
//! - [`Subscription`]: scoped consumption of a combined sequence
//! - [`SimpleArbitrageStrategy`]: worked example over two ticker feeds

pub mod arbitrage;
pub mod host;
pub mod subscription;

pub use arbitrage::{SimpleArbitrageStrategy, DEFAULT_SPREAD_THRESHOLD};
pub use host::{Strategy, StrategyHandle, StrategyHost};
pub use subscription::{Subscription, SubscriptionState};
