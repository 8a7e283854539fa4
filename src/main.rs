//! ticker_reactor - Demo Entry Point
//!
//! Runs the sample arbitrage strategy against two synthetic
//! random-walk ticker feeds until ctrl-c.

use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use rand::Rng;
use rust_decimal::Decimal;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use ticker_reactor::{
    EventSink, EventStream, RuntimeConfig, SimpleArbitrageStrategy, StrategyHost, Ticker, Venue,
};

/// CLI arguments for the demo
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Override the configured spread threshold
    #[arg(long)]
    spread_threshold: Option<Decimal>,
}

/// Emit a random-walk ticker every `interval_ms` until the consumer goes away
fn spawn_feed(venue: Venue, interval_ms: u64, start: Decimal, sink: EventSink<Ticker>) {
    tokio::spawn(async move {
        let half_spread = Decimal::new(2, 3);
        let mut mid = start;
        let mut ticks = tokio::time::interval(Duration::from_millis(interval_ms.max(1)));
        loop {
            ticks.tick().await;
            let step = rand::thread_rng().gen_range(-5i64..=5);
            mid += Decimal::new(step, 3);
            let ticker = Ticker::new(venue, mid - half_spread, mid + half_spread);
            if !sink.send(ticker).await {
                break;
            }
        }
        info!(%venue, "feed stopped");
    });
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let mut config: RuntimeConfig = ticker_reactor::load_config(Some(&args.config))?;
    if let Some(threshold) = args.spread_threshold {
        config.strategy.spread_threshold = threshold;
    }

    info!(
        threshold = %config.strategy.spread_threshold,
        "starting demo arbitrage run"
    );

    let (binance_sink, binance) = EventStream::with_policy(config.buffer);
    let (coinjar_sink, coinjar) = EventStream::with_policy(config.buffer);
    spawn_feed(
        Venue::Binance,
        config.feeds.binance_interval_ms,
        config.feeds.start_price,
        binance_sink,
    );
    spawn_feed(
        Venue::CoinJar,
        config.feeds.coinjar_interval_ms,
        config.feeds.start_price,
        coinjar_sink,
    );

    let strategy = SimpleArbitrageStrategy::new(
        binance,
        coinjar,
        |price| {
            info!(%price, "buy at binance");
            Ok(())
        },
        |price| {
            info!(%price, "sell at coinjar");
            Ok(())
        },
    )
    .with_threshold(config.strategy.spread_threshold);

    let mut host = StrategyHost::new(strategy);
    let handle = host.start()?;

    tokio::signal::ctrl_c().await?;
    info!("received shutdown signal, cancelling strategy");
    handle.cancel();
    handle.join().await?;
    info!("strategy stopped cleanly");

    Ok(())
}
