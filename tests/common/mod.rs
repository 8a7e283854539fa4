//! Common test utilities and fixtures

use rust_decimal_macros::dec;
use ticker_reactor::{Ticker, Venue};

/// Binance quote with the sample's resting ask of 9.200
pub fn binance_ticker() -> Ticker {
    Ticker::new(Venue::Binance, dec!(9.005), dec!(9.200))
}

/// CoinJar quote with an arbitrary bid (ask fixed at 9.505)
pub fn coinjar_ticker(bid: &str) -> Ticker {
    Ticker::from_raw(Venue::CoinJar, bid, "9.505").expect("valid test bid")
}
