//! Scripted exchange session driven by configuration

use anyhow::{Context, Result};
use dex_amm::Decimal;
use dex_config::{AssetConfig, ExchangeConfig, PoolSeedConfig};
use dex_exchange::{
    EventLog, ExchangeEngine, FanoutSink, InMemoryCustody, PoolStatus, TracingSink,
};
use dex_types::{Address, Amount, DexError, PoolKey};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

const BPS: Amount = 10_000;

/// State of one pool at the end of a session
#[derive(Debug, Clone, Serialize)]
pub struct PoolSnapshot {
    /// `SYMBOL_X/SYMBOL_Y` on the canonical orientation
    pub pair: String,
    pub pool: PoolKey,
    pub reserve_x: Amount,
    pub reserve_y: Amount,
    pub total_shares: Amount,
    pub status: PoolStatus,
    /// Units of `y` per unit of `x`; absent for an unfunded pool
    pub spot_price: Option<Decimal>,
}

#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct SwapStats {
    pub executed: usize,
    pub rejected: usize,
}

#[derive(Debug, Serialize)]
pub struct SessionReport {
    pub pools: Vec<PoolSnapshot>,
    pub swaps: SwapStats,
    pub events: usize,
}

/// Exchange engine wired to in-memory custody and an event recorder
pub struct Simulation {
    config: ExchangeConfig,
    engine: ExchangeEngine,
    custody: Arc<InMemoryCustody>,
    log: Arc<EventLog>,
}

impl Simulation {
    pub fn new(config: ExchangeConfig) -> Result<Self> {
        let custody = Arc::new(InMemoryCustody::new());
        let log = Arc::new(EventLog::new());
        let sink = FanoutSink::new()
            .with(log.clone())
            .with(Arc::new(TracingSink));

        let engine = ExchangeEngine::from_config(&config, custody.clone(), Arc::new(sink))
            .context("Failed to build exchange")?;

        Ok(Self {
            config,
            engine,
            custody,
            log,
        })
    }

    pub fn engine(&self) -> &ExchangeEngine {
        &self.engine
    }

    /// Deposit each configured pool's initial liquidity from the owner
    ///
    /// Returns the number of pools funded.
    pub fn seed_pools(&self) -> Result<usize> {
        let owner = self.config.exchange.owner;
        let mut seeded = 0;

        for seed in self.funded_seeds() {
            let (a, b) = self.assets(seed)?;
            let amount_a = a.scaled(seed.initial_a)?;
            let amount_b = b.scaled(seed.initial_b)?;
            self.credit(owner, a.address, amount_a)?;
            self.credit(owner, b.address, amount_b)?;

            let (_, _, shares) = self
                .engine
                .add_liquidity(owner, a.address, b.address, amount_a, amount_b, amount_a, amount_b)
                .with_context(|| format!("Failed to seed pool {}/{}", a.symbol, b.symbol))?;
            info!(
                "Seeded {}/{} with {} {} and {} {} ({} shares)",
                a.symbol, b.symbol, seed.initial_a, a.symbol, seed.initial_b, b.symbol, shares
            );
            seeded += 1;
        }

        Ok(seeded)
    }

    /// Alternate swap directions across every funded pool for `rounds` rounds
    ///
    /// Each swap sells `trade_size` whole tokens with a minimum output of the
    /// quote less `slippage_bps`. Rejected swaps are counted, not fatal.
    pub fn run_swaps(
        &self,
        trader: Address,
        rounds: u32,
        trade_size: u64,
        slippage_bps: u32,
    ) -> Result<SwapStats> {
        let mut stats = SwapStats::default();

        for round in 0..rounds {
            for seed in self.funded_seeds() {
                let (a, b) = self.assets(seed)?;
                let (asset_in, asset_out) = if round % 2 == 0 { (a, b) } else { (b, a) };
                let amount_in = asset_in.scaled(trade_size)?;
                self.credit(trader, asset_in.address, amount_in)?;

                match self.swap_once(trader, asset_in, asset_out, amount_in, slippage_bps) {
                    Ok(amount_out) => {
                        debug!(
                            "Round {}: {} {} -> {} {}",
                            round, amount_in, asset_in.symbol, amount_out, asset_out.symbol
                        );
                        stats.executed += 1;
                    }
                    Err(e) => {
                        warn!(
                            "Round {}: swap {} -> {} rejected: {}",
                            round, asset_in.symbol, asset_out.symbol, e
                        );
                        stats.rejected += 1;
                    }
                }
            }
        }

        info!(
            "Swap session finished: {} executed, {} rejected",
            stats.executed, stats.rejected
        );
        Ok(stats)
    }

    fn swap_once(
        &self,
        trader: Address,
        asset_in: &AssetConfig,
        asset_out: &AssetConfig,
        amount_in: Amount,
        slippage_bps: u32,
    ) -> dex_types::Result<Amount> {
        let quote = self
            .engine
            .get_amount_out(amount_in, asset_in.address, asset_out.address)?;
        if let Ok(impact) = self
            .engine
            .get_price_impact(amount_in, asset_in.address, asset_out.address)
        {
            debug!(
                "Quote {} {} -> {} {} (impact {} bps)",
                amount_in, asset_in.symbol, quote, asset_out.symbol, impact
            );
        }

        let tolerance = BPS - Amount::from(slippage_bps.min(10_000));
        let min_out = quote
            .checked_mul(tolerance)
            .map(|scaled| scaled / BPS)
            .unwrap_or(quote / BPS * tolerance);

        self.engine.swap_exact_input(
            trader,
            amount_in,
            min_out,
            asset_in.address,
            asset_out.address,
        )
    }

    /// Every registered pool, in canonical order
    pub fn snapshot(&self) -> Result<Vec<PoolSnapshot>> {
        let registry = self.engine.registry();
        let mut snapshots = Vec::with_capacity(registry.pool_count());

        for key in registry.pool_keys() {
            let handle = registry.get_pool(key.x(), key.y())?;
            let (reserve_x, reserve_y, total_shares, status) = {
                let pool = handle.read();
                (
                    pool.reserves().reserve_x(),
                    pool.reserves().reserve_y(),
                    pool.shares().total(),
                    pool.status(),
                )
            };

            let spot_price = match self.engine.get_spot_price(key.x(), key.y()) {
                Ok(price) => Some(price),
                Err(DexError::InsufficientLiquidity { .. }) => None,
                Err(e) => return Err(e).with_context(|| format!("Failed to price pool {}", key)),
            };

            snapshots.push(PoolSnapshot {
                pair: format!("{}/{}", self.label(key.x()), self.label(key.y())),
                pool: key,
                reserve_x,
                reserve_y,
                total_shares,
                status,
                spot_price,
            });
        }

        Ok(snapshots)
    }

    pub fn report(&self, swaps: SwapStats) -> Result<SessionReport> {
        Ok(SessionReport {
            pools: self.snapshot()?,
            swaps,
            events: self.log.len(),
        })
    }

    fn funded_seeds(&self) -> impl Iterator<Item = &PoolSeedConfig> {
        self.config.pools.iter().filter(|seed| seed.initial_a > 0)
    }

    fn assets(&self, seed: &PoolSeedConfig) -> Result<(&AssetConfig, &AssetConfig)> {
        let a = self
            .config
            .asset(&seed.asset_a)
            .with_context(|| format!("Unknown asset {}", seed.asset_a))?;
        let b = self
            .config
            .asset(&seed.asset_b)
            .with_context(|| format!("Unknown asset {}", seed.asset_b))?;
        Ok((a, b))
    }

    /// Mint to `holder` and approve the exchange for the whole balance
    fn credit(&self, holder: Address, asset: Address, amount: Amount) -> Result<()> {
        self.custody.mint(asset, holder, amount)?;
        let balance = self.custody.balance_of(asset, holder);
        self.custody.approve(asset, holder, balance);
        Ok(())
    }

    fn label(&self, address: Address) -> String {
        self.config
            .assets
            .iter()
            .find(|asset| asset.address == address)
            .map(|asset| asset.symbol.clone())
            .unwrap_or_else(|| address.to_string())
    }
}
