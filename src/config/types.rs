//! Configuration types

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::common::channels::BufferPolicy;

/// Main runtime configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeConfig {
    /// Buffering policy between producers and the strategy core
    #[serde(default)]
    pub buffer: BufferPolicy,
    /// Strategy settings
    #[serde(default)]
    pub strategy: StrategySettings,
    /// Synthetic feed settings for the demo binary
    #[serde(default)]
    pub feeds: FeedSettings,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            buffer: BufferPolicy::default(),
            strategy: StrategySettings::default(),
            feeds: FeedSettings::default(),
        }
    }
}

/// Settings for the sample arbitrage strategy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategySettings {
    /// Spread threshold the watch predicate waits for
    #[serde(default = "default_spread_threshold")]
    pub spread_threshold: Decimal,
}

impl Default for StrategySettings {
    fn default() -> Self {
        Self {
            spread_threshold: default_spread_threshold(),
        }
    }
}

fn default_spread_threshold() -> Decimal {
    crate::strategy::DEFAULT_SPREAD_THRESHOLD
}

/// Settings for the demo's synthetic ticker feeds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedSettings {
    /// Milliseconds between synthetic Binance ticks
    #[serde(default = "default_binance_interval_ms")]
    pub binance_interval_ms: u64,
    /// Milliseconds between synthetic CoinJar ticks
    #[serde(default = "default_coinjar_interval_ms")]
    pub coinjar_interval_ms: u64,
    /// Starting mid price for both walks
    #[serde(default = "default_start_price")]
    pub start_price: Decimal,
}

impl Default for FeedSettings {
    fn default() -> Self {
        Self {
            binance_interval_ms: default_binance_interval_ms(),
            coinjar_interval_ms: default_coinjar_interval_ms(),
            start_price: default_start_price(),
        }
    }
}

fn default_binance_interval_ms() -> u64 {
    250
}

fn default_coinjar_interval_ms() -> u64 {
    400
}

fn default_start_price() -> Decimal {
    Decimal::new(9200, 3)
}
