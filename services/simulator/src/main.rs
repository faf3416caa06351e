//! Exchange simulator - runs a scripted session against a configured exchange
//!
//! Usage:
//!   dex-simulator --config config/exchange.toml
//!   dex-simulator --rounds 20 --trade-size 5 --json-logs

mod session;

use anyhow::{Context, Result};
use clap::Parser;
use dex_config::{defaults, ExchangeConfig};
use dex_types::Address;
use session::Simulation;
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "dex-simulator")]
#[command(about = "Constant-product exchange simulator")]
#[command(version)]
struct Args {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error); overrides the config file
    #[arg(short, long)]
    log_level: Option<String>,

    /// Enable JSON logging format
    #[arg(long)]
    json_logs: bool,

    /// Swap rounds to run across every funded pool
    #[arg(long, default_value_t = 5)]
    rounds: u32,

    /// Swap size in whole tokens of the input asset
    #[arg(long, default_value_t = 1)]
    trade_size: u64,

    /// Slippage tolerance applied to each quote, in basis points
    #[arg(long, default_value_t = 50, value_parser = clap::value_parser!(u32).range(0..=10_000))]
    slippage_bps: u32,

    /// Address the swaps are executed for
    #[arg(long, default_value = "0x00000000000000000000000000000000000000b0")]
    trader: Address,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let config = ExchangeConfig::load(args.config.as_deref())?;
    let level = args
        .log_level
        .clone()
        .unwrap_or_else(|| config.logging.level.clone());
    init_logging(&level, args.json_logs || config.logging.json)?;

    info!("Starting exchange simulator");
    info!(
        "Fee {} bps, owner {}, {} assets",
        config.exchange.fee_bps,
        config.exchange.owner,
        config.assets.len()
    );

    let simulation = Simulation::new(config).map_err(|e| {
        error!("Failed to initialise exchange: {:#}", e);
        e
    })?;
    let seeded = simulation.seed_pools()?;
    info!(
        "{} of {} pools funded",
        seeded,
        simulation.engine().registry().pool_count()
    );

    let stats = simulation.run_swaps(args.trader, args.rounds, args.trade_size, args.slippage_bps)?;
    let report = simulation.report(stats)?;
    println!(
        "{}",
        serde_json::to_string_pretty(&report).context("Failed to serialize session report")?
    );

    Ok(())
}

fn init_logging(level: &str, json: bool) -> Result<()> {
    let filter = EnvFilter::try_from_env(defaults::logging::FILTER_ENV)
        .or_else(|_| EnvFilter::try_new(level))
        .with_context(|| format!("Invalid log level: {}", level))?;

    let subscriber = tracing_subscriber::fmt().with_env_filter(filter);
    if json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    Ok(())
}
