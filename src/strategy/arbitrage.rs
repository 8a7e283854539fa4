//! Cross-venue arbitrage sample strategy
//!
//! Buys where the ask is low (Binance) and sells where the bid is
//! high (CoinJar) whenever the spread between the two exceeds a
//! threshold. A toy: it ignores fees, quantities, and fills. It exists
//! to show how a strategy body composes [`zip_latest`],
//! [`Subscription::spawn`], and [`Subscription::watch`].

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::common::errors::{Result, StrategyError};
use crate::common::types::Ticker;
use crate::stream::{zip_latest, EventStream};
use crate::strategy::host::Strategy;
use crate::strategy::subscription::Subscription;

/// Spread the sample waits for before trading
pub const DEFAULT_SPREAD_THRESHOLD: Decimal = dec!(0.002);

/// Opaque side-effecting trade action, invoked synchronously from the
/// strategy's logical thread with the price it should act at
pub type PriceAction = Box<dyn FnMut(Decimal) -> Result<()> + Send>;

/// Latest quotes the watch predicate ranges over
///
/// Written only inside the subscription callback, read only by the
/// predicate and after a satisfied watch.
#[derive(Debug, Default, Clone, Copy)]
struct Quotes {
    /// Binance ask: the price we would buy at
    buy: Decimal,
    /// CoinJar bid: the price we would sell at
    sell: Decimal,
}

/// The sample strategy: watch two venues, act on the spread
pub struct SimpleArbitrageStrategy {
    binance_ticker: Option<EventStream<Ticker>>,
    coinjar_ticker: Option<EventStream<Ticker>>,
    threshold: Decimal,
    buy_at_binance: PriceAction,
    sell_at_coinjar: PriceAction,
}

impl SimpleArbitrageStrategy {
    /// Build the strategy from its two ticker feeds and trade actions
    pub fn new(
        binance_ticker: EventStream<Ticker>,
        coinjar_ticker: EventStream<Ticker>,
        buy_at_binance: impl FnMut(Decimal) -> Result<()> + Send + 'static,
        sell_at_coinjar: impl FnMut(Decimal) -> Result<()> + Send + 'static,
    ) -> Self {
        Self {
            binance_ticker: Some(binance_ticker),
            coinjar_ticker: Some(coinjar_ticker),
            threshold: DEFAULT_SPREAD_THRESHOLD,
            buy_at_binance: Box::new(buy_at_binance),
            sell_at_coinjar: Box::new(sell_at_coinjar),
        }
    }

    /// Override the spread threshold
    pub fn with_threshold(mut self, threshold: Decimal) -> Self {
        self.threshold = threshold;
        self
    }

    async fn trade_loop(
        &mut self,
        subscription: &mut Subscription,
        quotes: &Arc<Mutex<Quotes>>,
        cancel: &CancellationToken,
    ) -> Result<()> {
        let threshold = self.threshold;
        loop {
            let watched = quotes.clone();
            let satisfied = subscription
                .watch(
                    move || {
                        watched
                            .lock()
                            .map(|q| q.sell - q.buy > threshold)
                            .unwrap_or(false)
                    },
                    cancel,
                )
                .await?;
            if !satisfied {
                // Stream ended or cancellation requested; stop, do not retry.
                return Ok(());
            }

            let snapshot = *quotes
                .lock()
                .map_err(|_| StrategyError::action("quotes lock poisoned"))?;
            debug!(buy = %snapshot.buy, sell = %snapshot.sell, "arbitrage window open");

            // Buy at Binance then sell at CoinJar.
            (self.buy_at_binance)(snapshot.buy)?;
            (self.sell_at_coinjar)(snapshot.sell)?;
        }
    }
}

#[async_trait]
impl Strategy for SimpleArbitrageStrategy {
    fn name(&self) -> &str {
        "simple_arbitrage"
    }

    async fn run(&mut self, cancel: CancellationToken) -> Result<()> {
        let binance = self
            .binance_ticker
            .take()
            .ok_or(StrategyError::AlreadyStarted)?;
        let coinjar = self
            .coinjar_ticker
            .take()
            .ok_or(StrategyError::AlreadyStarted)?;

        let quotes = Arc::new(Mutex::new(Quotes::default()));

        // Store Binance's ask and CoinJar's bid every time either
        // venue updates.
        let written = quotes.clone();
        let mut subscription = Subscription::spawn(
            zip_latest(binance, coinjar),
            move |(binance, coinjar): (Ticker, Ticker)| {
                let mut q = written
                    .lock()
                    .map_err(|_| StrategyError::action("quotes lock poisoned"))?;
                q.buy = binance.ask;
                q.sell = coinjar.bid;
                Ok(())
            },
        );

        let outcome = self.trade_loop(&mut subscription, &quotes, &cancel).await;

        // Release consumption before any fault surfaces to the host.
        subscription.dispose().await;
        outcome
    }
}
