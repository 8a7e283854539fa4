//! Unified event types consumed by the strategy core

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Source venue identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Venue {
    Binance,
    CoinJar,
}

impl std::fmt::Display for Venue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Venue::Binance => write!(f, "binance"),
            Venue::CoinJar => write!(f, "coinjar"),
        }
    }
}

/// A top-of-book quote snapshot from a single venue
///
/// Events are immutable once emitted; the core never mutates them and
/// holds them only for the duration of callback delivery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ticker {
    /// Venue this quote is from
    pub venue: Venue,
    /// Best bid price
    pub bid: Decimal,
    /// Best ask price
    pub ask: Decimal,
    /// Timestamp of the snapshot
    pub timestamp: DateTime<Utc>,
}

impl Ticker {
    /// Create a new ticker stamped with the current time
    pub fn new(venue: Venue, bid: Decimal, ask: Decimal) -> Self {
        Self {
            venue,
            bid,
            ask,
            timestamp: Utc::now(),
        }
    }

    /// Parse a ticker from the raw decimal strings exchange feeds carry
    /// (e.g. `"9.200"`). Returns `None` if either price fails to parse.
    pub fn from_raw(venue: Venue, bid: &str, ask: &str) -> Option<Self> {
        Some(Self::new(venue, bid.parse().ok()?, ask.parse().ok()?))
    }

    /// Mid price of this quote
    pub fn mid(&self) -> Decimal {
        (self.bid + self.ask) / Decimal::from(2)
    }

    /// Spread (ask - bid) of this quote
    pub fn spread(&self) -> Decimal {
        self.ask - self.bid
    }
}
