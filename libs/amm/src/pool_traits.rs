//! Unified quoting interface over a pool snapshot

use crate::PricingEngine;
use dex_types::{Amount, Result};

/// Reserves seen from one swap direction, plus the fee tier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirectedReserves {
    pub reserve_in: Amount,
    pub reserve_out: Amount,
    pub fee_bps: u32, // Fee in basis points (30 = 0.3%)
}

/// Quote interface shared by every pool snapshot the engine prices against
pub trait AmmPool {
    /// Calculate output amount for given input
    fn get_amount_out(&self, amount_in: Amount) -> Result<Amount>;

    /// Calculate required input for desired output
    fn get_amount_in(&self, amount_out: Amount) -> Result<Amount>;

    /// Get current reserves as (in, out)
    fn get_liquidity(&self) -> (Amount, Amount);

    /// Get fee tier
    fn get_fee_bps(&self) -> u32;
}

impl AmmPool for DirectedReserves {
    fn get_amount_out(&self, amount_in: Amount) -> Result<Amount> {
        PricingEngine::quote_output_for_exact_input(
            self.reserve_in,
            self.reserve_out,
            amount_in,
            self.fee_bps,
        )
    }

    fn get_amount_in(&self, amount_out: Amount) -> Result<Amount> {
        PricingEngine::quote_input_for_exact_output(
            self.reserve_in,
            self.reserve_out,
            amount_out,
            self.fee_bps,
        )
    }

    fn get_liquidity(&self) -> (Amount, Amount) {
        (self.reserve_in, self.reserve_out)
    }

    fn get_fee_bps(&self) -> u32 {
        self.fee_bps
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ReservePair;
    use dex_types::{Address, PoolKey};

    #[test]
    fn test_directed_view_follows_swap_direction() {
        let (tka, tkb) = (Address::from_low_u64(1), Address::from_low_u64(2));
        let pair = ReservePair::new(PoolKey::new(tka, tkb).unwrap(), 100_000, 50_000);

        let sell_b = pair.directed(tkb, 30);
        assert_eq!(sell_b.get_liquidity(), (50_000, 100_000));
        assert_eq!(sell_b.get_fee_bps(), 30);

        let sell_a = pair.directed(tka, 30);
        assert_eq!(sell_a.get_liquidity(), (100_000, 50_000));
        let out = sell_a.get_amount_out(1000).unwrap();
        assert!(sell_a.get_amount_in(out).unwrap() <= 1000);
    }
}
