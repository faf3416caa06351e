//! Exchange Engine
//!
//! Orchestrates liquidity provision, withdrawal and swaps. Every mutating
//! operation follows the same shape:
//!
//! 1. `ensure_active` on the access gate
//! 2. take the pool's write guard
//! 3. quote against that snapshot and validate every precondition
//! 4. settle the custody legs as one batch
//! 5. commit reserves and shares, release the guard, emit the event
//!
//! Nothing is mutated before step 4, and a failed settlement has already
//! compensated its own legs, so every error leaves the exchange unchanged.

use crate::access::AccessGate;
use crate::custody::{AssetCustody, Transfer};
use crate::events::EventSink;
use crate::registry::{Pool, PoolInfo, PoolRegistry};
use anyhow::Context;
use dex_amm::{AmmPool, Decimal, PricingEngine, ReservePair};
use dex_config::ExchangeConfig;
use dex_types::{Address, Amount, DexError, ExchangeEvent, PoolKey, Result};
use std::sync::Arc;
use tracing::{debug, info};

/// Entry point for every exchange operation
pub struct ExchangeEngine {
    registry: PoolRegistry,
    gate: Arc<AccessGate>,
    custody: Arc<dyn AssetCustody>,
    events: Arc<dyn EventSink>,
    fee_bps: u32,
}

impl std::fmt::Debug for ExchangeEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExchangeEngine")
            .field("pools", &self.registry.pool_count())
            .field("owner", &self.gate.owner())
            .field("paused", &self.gate.paused())
            .field("fee_bps", &self.fee_bps)
            .finish()
    }
}

impl ExchangeEngine {
    pub fn new(
        gate: Arc<AccessGate>,
        custody: Arc<dyn AssetCustody>,
        events: Arc<dyn EventSink>,
        fee_bps: u32,
    ) -> Result<Self> {
        PricingEngine::validate_fee(fee_bps)?;
        Ok(Self {
            registry: PoolRegistry::new(),
            gate,
            custody,
            events,
            fee_bps,
        })
    }

    /// Build an engine from validated configuration
    ///
    /// Registers the configured assets and creates the configured pools on
    /// behalf of the configured owner. Pools start unfunded.
    pub fn from_config(
        config: &ExchangeConfig,
        custody: Arc<dyn AssetCustody>,
        events: Arc<dyn EventSink>,
    ) -> anyhow::Result<Self> {
        config.validate()?;
        let owner = config.exchange.owner;
        let gate = Arc::new(AccessGate::new(owner));
        let engine = Self::new(gate, custody, events, config.exchange.fee_bps)
            .context("Invalid exchange settings")?;

        for asset in &config.assets {
            engine
                .gate
                .add_supported_token(owner, asset.address)
                .with_context(|| format!("Failed to register asset {}", asset.symbol))?;
        }

        for seed in &config.pools {
            let (a, b) = (config.asset(&seed.asset_a), config.asset(&seed.asset_b));
            let (a, b) = a.zip(b).with_context(|| {
                format!("Pool {}/{} references an unknown asset", seed.asset_a, seed.asset_b)
            })?;
            engine
                .create_pool(owner, a.address, b.address)
                .with_context(|| format!("Failed to create pool {}/{}", a.symbol, b.symbol))?;
        }

        info!(
            "Exchange initialised: {} assets, {} pools, fee {} bps",
            config.assets.len(),
            engine.registry.pool_count(),
            engine.fee_bps
        );
        Ok(engine)
    }

    pub fn gate(&self) -> &AccessGate {
        &self.gate
    }

    pub fn registry(&self) -> &PoolRegistry {
        &self.registry
    }

    pub fn fee_bps(&self) -> u32 {
        self.fee_bps
    }

    /// Register an empty pool for a pair of supported assets
    pub fn create_pool(&self, caller: Address, asset_a: Address, asset_b: Address) -> Result<PoolKey> {
        self.gate.ensure_active()?;
        let handle = self.registry.create_pool(&self.gate, asset_a, asset_b)?;
        let (pool, sequence) = {
            let pool = handle.read();
            (pool.key(), pool.sequence())
        };

        self.events.emit(&ExchangeEvent::PoolCreated {
            pool,
            creator: caller,
            sequence,
        });
        Ok(pool)
    }

    /// Deposit a matched pair and mint shares to `caller`
    ///
    /// Returns `(used_a, used_b, shares_minted)`. An empty pool takes the
    /// desired amounts as-is and sets the initial price.
    #[allow(clippy::too_many_arguments)]
    pub fn add_liquidity(
        &self,
        caller: Address,
        asset_a: Address,
        asset_b: Address,
        desired_a: Amount,
        desired_b: Amount,
        min_a: Amount,
        min_b: Amount,
    ) -> Result<(Amount, Amount, Amount)> {
        self.gate.ensure_active()?;
        if desired_a == 0 || desired_b == 0 {
            return Err(DexError::ZeroAmount {
                what: "deposit amount",
            });
        }

        let handle = self.registry.get_pool(asset_a, asset_b)?;
        let mut pool = handle.write();
        let reserves = *pool.reserves();
        let total_shares = pool.shares().total();
        let (reserve_a, reserve_b) = reserves.oriented(asset_a);

        let (used_a, used_b) =
            PricingEngine::quote_matched_deposit(reserve_a, reserve_b, desired_a, desired_b)?;
        if used_a == 0 || used_b == 0 {
            return Err(DexError::ZeroAmount {
                what: "matched deposit",
            });
        }

        let shares = if reserves.is_empty() {
            PricingEngine::quote_bootstrap_shares(used_a, used_b)
        } else {
            // Both sides are floored, so the smaller grant never over-mints
            let by_a = PricingEngine::quote_share_grant(reserve_a, total_shares, used_a)?;
            let by_b = PricingEngine::quote_share_grant(reserve_b, total_shares, used_b)?;
            by_a.min(by_b)
        };
        if shares == 0 {
            return Err(DexError::ZeroAmount {
                what: "shares minted",
            });
        }

        check_minimum("minimum amount A", min_a, used_a)?;
        check_minimum("minimum amount B", min_b, used_b)?;

        let updated = reserves.with_oriented(
            asset_a,
            add_reserve(reserve_a, used_a)?,
            add_reserve(reserve_b, used_b)?,
        );
        let mint = pool.shares().prepare_mint(caller, shares)?;

        self.custody.settle(&[
            Transfer::In {
                asset: asset_a,
                from: caller,
                amount: used_a,
            },
            Transfer::In {
                asset: asset_b,
                from: caller,
                amount: used_b,
            },
        ])?;
        pool.commit(updated, Some(mint));
        let key = pool.key();
        drop(pool);

        info!(
            "Liquidity added to {} by {}: {} / {} for {} shares",
            key, caller, used_a, used_b, shares
        );
        let (amount_x, amount_y) = canonical(key, asset_a, used_a, used_b);
        self.events.emit(&ExchangeEvent::LiquidityAdded {
            pool: key,
            provider: caller,
            amount_x,
            amount_y,
            shares_minted: shares,
        });
        Ok((used_a, used_b, shares))
    }

    /// Burn `shares` held by `caller` and pay out the proportional reserves
    ///
    /// Returns `(out_a, out_b)` in argument order.
    pub fn remove_liquidity(
        &self,
        caller: Address,
        asset_a: Address,
        asset_b: Address,
        shares: Amount,
        min_a: Amount,
        min_b: Amount,
    ) -> Result<(Amount, Amount)> {
        self.gate.ensure_active()?;
        if shares == 0 {
            return Err(DexError::ZeroAmount {
                what: "shares burned",
            });
        }

        let handle = self.registry.get_pool(asset_a, asset_b)?;
        let mut pool = handle.write();
        let burn = pool.shares().prepare_burn(caller, shares)?;
        let reserves = *pool.reserves();
        let (reserve_a, reserve_b) = reserves.oriented(asset_a);

        let (out_a, out_b) =
            PricingEngine::quote_withdrawal(reserve_a, reserve_b, pool.shares().total(), shares)?;
        if out_a == 0 || out_b == 0 {
            return Err(DexError::ZeroAmount {
                what: "withdrawal amount",
            });
        }

        check_minimum("minimum amount A", min_a, out_a)?;
        check_minimum("minimum amount B", min_b, out_b)?;

        // out <= reserve by construction of the withdrawal quote
        let updated = reserves.with_oriented(asset_a, reserve_a - out_a, reserve_b - out_b);

        self.custody.settle(&[
            Transfer::Out {
                asset: asset_a,
                to: caller,
                amount: out_a,
            },
            Transfer::Out {
                asset: asset_b,
                to: caller,
                amount: out_b,
            },
        ])?;
        pool.commit(updated, Some(burn));
        let key = pool.key();
        drop(pool);

        info!(
            "Liquidity removed from {} by {}: {} shares for {} / {}",
            key, caller, shares, out_a, out_b
        );
        let (amount_x, amount_y) = canonical(key, asset_a, out_a, out_b);
        self.events.emit(&ExchangeEvent::LiquidityRemoved {
            pool: key,
            provider: caller,
            amount_x,
            amount_y,
            shares_burned: shares,
        });
        Ok((out_a, out_b))
    }

    /// Sell exactly `amount_in` of `asset_in`; returns the output paid
    pub fn swap_exact_input(
        &self,
        caller: Address,
        amount_in: Amount,
        min_amount_out: Amount,
        asset_in: Address,
        asset_out: Address,
    ) -> Result<Amount> {
        self.gate.ensure_active()?;
        let handle = self.registry.get_pool(asset_in, asset_out)?;
        let mut pool = handle.write();

        let amount_out = pool
            .reserves()
            .directed(asset_in, self.fee_bps)
            .get_amount_out(amount_in)?;
        if amount_out == 0 {
            return Err(DexError::ZeroAmount {
                what: "output amount",
            });
        }
        check_minimum("minimum output", min_amount_out, amount_out)?;

        let event = self.execute_swap(&mut pool, caller, asset_in, asset_out, amount_in, amount_out)?;
        drop(pool);
        self.events.emit(&event);
        Ok(amount_out)
    }

    /// Buy exactly `amount_out` of `asset_out`; returns the input charged
    pub fn swap_exact_output(
        &self,
        caller: Address,
        amount_out: Amount,
        max_amount_in: Amount,
        asset_in: Address,
        asset_out: Address,
    ) -> Result<Amount> {
        self.gate.ensure_active()?;
        let handle = self.registry.get_pool(asset_in, asset_out)?;
        let mut pool = handle.write();

        let amount_in = pool
            .reserves()
            .directed(asset_in, self.fee_bps)
            .get_amount_in(amount_out)?;
        if amount_in > max_amount_in {
            return Err(DexError::SlippageExceeded {
                bound: "maximum input",
                limit: max_amount_in,
                actual: amount_in,
            });
        }

        let event = self.execute_swap(&mut pool, caller, asset_in, asset_out, amount_in, amount_out)?;
        drop(pool);
        self.events.emit(&event);
        Ok(amount_in)
    }

    /// Settle and commit a quoted swap while the caller holds the write guard
    ///
    /// Returns the event to emit once the guard is released.
    fn execute_swap(
        &self,
        pool: &mut Pool,
        caller: Address,
        asset_in: Address,
        asset_out: Address,
        amount_in: Amount,
        amount_out: Amount,
    ) -> Result<ExchangeEvent> {
        let reserves = *pool.reserves();
        let (reserve_in, reserve_out) = reserves.oriented(asset_in);
        if amount_out >= reserve_out {
            return Err(DexError::InsufficientLiquidity {
                reason: "requested output would drain the reserve",
            });
        }
        let updated = reserves.with_oriented(
            asset_in,
            add_reserve(reserve_in, amount_in)?,
            reserve_out - amount_out,
        );
        debug_assert!(updated.product() >= reserves.product());

        self.custody.settle(&[
            Transfer::In {
                asset: asset_in,
                from: caller,
                amount: amount_in,
            },
            Transfer::Out {
                asset: asset_out,
                to: caller,
                amount: amount_out,
            },
        ])?;
        pool.commit(updated, None);
        let key = pool.key();

        info!(
            "Swap on {} by {}: {} {} -> {} {}",
            key, caller, amount_in, asset_in, amount_out, asset_out
        );
        Ok(ExchangeEvent::SwapExecuted {
            pool: key,
            trader: caller,
            asset_in,
            asset_out,
            amount_in,
            amount_out,
        })
    }

    /// `(reserve_a, reserve_b, total_shares)` in argument order
    pub fn get_pool_info(&self, asset_a: Address, asset_b: Address) -> Result<PoolInfo> {
        self.registry.get_pool_info(asset_a, asset_b)
    }

    /// Quote for selling `amount_in`; available while paused
    pub fn get_amount_out(&self, amount_in: Amount, asset_in: Address, asset_out: Address) -> Result<Amount> {
        let reserves = self.snapshot(asset_in, asset_out)?;
        let amount_out = reserves
            .directed(asset_in, self.fee_bps)
            .get_amount_out(amount_in)?;
        debug!("Quoted {} {} -> {} {}", amount_in, asset_in, amount_out, asset_out);
        Ok(amount_out)
    }

    /// Input required to buy `amount_out`; available while paused
    pub fn get_amount_in(&self, amount_out: Amount, asset_in: Address, asset_out: Address) -> Result<Amount> {
        let reserves = self.snapshot(asset_in, asset_out)?;
        let amount_in = reserves
            .directed(asset_in, self.fee_bps)
            .get_amount_in(amount_out)?;
        debug!("Quoted {} {} for {} {}", amount_in, asset_in, amount_out, asset_out);
        Ok(amount_in)
    }

    /// Units of `asset_quote` per unit of `asset_base` at the current reserves
    pub fn get_spot_price(&self, asset_base: Address, asset_quote: Address) -> Result<Decimal> {
        let (reserve_base, reserve_quote) = self.snapshot(asset_base, asset_quote)?.oriented(asset_base);
        PricingEngine::spot_price(reserve_base, reserve_quote)
    }

    /// Shortfall of a swap's output against the spot rate, in basis points
    pub fn get_price_impact(&self, amount_in: Amount, asset_in: Address, asset_out: Address) -> Result<Decimal> {
        let (reserve_in, reserve_out) = self.snapshot(asset_in, asset_out)?.oriented(asset_in);
        PricingEngine::price_impact_bps(reserve_in, reserve_out, amount_in, self.fee_bps)
    }

    pub fn share_balance_of(&self, asset_a: Address, asset_b: Address, holder: Address) -> Result<Amount> {
        let handle = self.registry.get_pool(asset_a, asset_b)?;
        let pool = handle.read();
        Ok(pool.shares().balance_of(holder))
    }

    fn snapshot(&self, asset_a: Address, asset_b: Address) -> Result<ReservePair> {
        let handle = self.registry.get_pool(asset_a, asset_b)?;
        let reserves = *handle.read().reserves();
        Ok(reserves)
    }
}

fn check_minimum(bound: &'static str, limit: Amount, actual: Amount) -> Result<()> {
    if actual < limit {
        return Err(DexError::SlippageExceeded { bound, limit, actual });
    }
    Ok(())
}

fn add_reserve(reserve: Amount, amount: Amount) -> Result<Amount> {
    reserve
        .checked_add(amount)
        .ok_or(DexError::ArithmeticOverflow { op: "reserve update" })
}

/// Reorder `(amount of asset_a, amount of the other)` onto the pair's `x`/`y`
fn canonical(key: PoolKey, asset_a: Address, amount_a: Amount, amount_b: Amount) -> (Amount, Amount) {
    if key.is_x(asset_a) {
        (amount_a, amount_b)
    } else {
        (amount_b, amount_a)
    }
}
