//! Observable exchange events
//!
//! Amounts are reported on the canonical pair orientation (`x`/`y` of the
//! [`PoolKey`]) regardless of the argument order the caller used.

use crate::{Address, Amount, PoolKey};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ExchangeEvent {
    PoolCreated {
        pool: PoolKey,
        creator: Address,
        /// Creation order across the registry, starting at 1
        sequence: u64,
    },
    LiquidityAdded {
        pool: PoolKey,
        provider: Address,
        amount_x: Amount,
        amount_y: Amount,
        shares_minted: Amount,
    },
    LiquidityRemoved {
        pool: PoolKey,
        provider: Address,
        amount_x: Amount,
        amount_y: Amount,
        shares_burned: Amount,
    },
    SwapExecuted {
        pool: PoolKey,
        trader: Address,
        asset_in: Address,
        asset_out: Address,
        amount_in: Amount,
        amount_out: Amount,
    },
}

impl ExchangeEvent {
    pub fn pool(&self) -> PoolKey {
        match self {
            ExchangeEvent::PoolCreated { pool, .. }
            | ExchangeEvent::LiquidityAdded { pool, .. }
            | ExchangeEvent::LiquidityRemoved { pool, .. }
            | ExchangeEvent::SwapExecuted { pool, .. } => *pool,
        }
    }

    /// Party that triggered the event
    pub fn actor(&self) -> Address {
        match self {
            ExchangeEvent::PoolCreated { creator, .. } => *creator,
            ExchangeEvent::LiquidityAdded { provider, .. }
            | ExchangeEvent::LiquidityRemoved { provider, .. } => *provider,
            ExchangeEvent::SwapExecuted { trader, .. } => *trader,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ExchangeEvent::PoolCreated { .. } => "pool_created",
            ExchangeEvent::LiquidityAdded { .. } => "liquidity_added",
            ExchangeEvent::LiquidityRemoved { .. } => "liquidity_removed",
            ExchangeEvent::SwapExecuted { .. } => "swap_executed",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_json_is_tagged() {
        let pool = PoolKey::new(Address::from_low_u64(1), Address::from_low_u64(2)).unwrap();
        let event = ExchangeEvent::SwapExecuted {
            pool,
            trader: Address::from_low_u64(9),
            asset_in: pool.x(),
            asset_out: pool.y(),
            amount_in: 1000,
            amount_out: 987,
        };

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "swap_executed");
        assert_eq!(json["amount_out"], 987);
        assert_eq!(event.actor(), Address::from_low_u64(9));
        assert_eq!(event.name(), "swap_executed");
    }
}
