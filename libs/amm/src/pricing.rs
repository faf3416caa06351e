//! Constant-product pricing with a proportional fee
//!
//! All functions are pure and operate on integer amounts in the assets'
//! native precision. Each division states its rounding direction; rounding
//! always favours the pool so no value can leak out of it through truncation.

use crate::math::{mul3_div_ceil, mul_div_floor, sqrt_product, to_amount, BPS_DENOMINATOR};
use dex_types::{Amount, DexError, Result};
use primitive_types::{U256, U512};
use rust_decimal::Decimal;

/// Stateless constant-product quoting functions
pub struct PricingEngine;

impl PricingEngine {
    /// Reject fees that would consume the whole input
    pub fn validate_fee(fee_bps: u32) -> Result<()> {
        if fee_bps >= BPS_DENOMINATOR {
            return Err(DexError::InvalidFee { fee_bps });
        }
        Ok(())
    }

    /// Exact output for a given input under `x * y = k`
    ///
    /// `amount_in_after_fee = floor(amount_in * (10000 - fee_bps) / 10000)`
    /// `amount_out = floor(reserve_out * amount_in_after_fee / (reserve_in + amount_in_after_fee))`
    ///
    /// Both steps round down: the output is never overstated.
    pub fn quote_output_for_exact_input(
        reserve_in: Amount,
        reserve_out: Amount,
        amount_in: Amount,
        fee_bps: u32,
    ) -> Result<Amount> {
        Self::validate_fee(fee_bps)?;
        if amount_in == 0 {
            return Err(DexError::ZeroAmount { what: "input amount" });
        }
        if reserve_in == 0 || reserve_out == 0 {
            return Err(DexError::InsufficientLiquidity {
                reason: "pool has no reserves",
            });
        }

        let amount_in_after_fee = mul_div_floor(
            amount_in,
            (BPS_DENOMINATOR - fee_bps) as Amount,
            BPS_DENOMINATOR as Amount,
            "fee deduction",
        )?;

        let numerator = U256::from(reserve_out) * U256::from(amount_in_after_fee);
        let denominator = U256::from(reserve_in) + U256::from(amount_in_after_fee);
        to_amount(numerator / denominator, "output quote")
    }

    /// Input required to receive exactly `amount_out`
    ///
    /// `amount_in = ceil(reserve_in * amount_out * 10000 / ((reserve_out - amount_out) * (10000 - fee_bps)))`
    ///
    /// Rounds up: the required input is never understated.
    pub fn quote_input_for_exact_output(
        reserve_in: Amount,
        reserve_out: Amount,
        amount_out: Amount,
        fee_bps: u32,
    ) -> Result<Amount> {
        Self::validate_fee(fee_bps)?;
        if amount_out == 0 {
            return Err(DexError::ZeroAmount {
                what: "output amount",
            });
        }
        if reserve_in == 0 || reserve_out == 0 {
            return Err(DexError::InsufficientLiquidity {
                reason: "pool has no reserves",
            });
        }
        if amount_out >= reserve_out {
            return Err(DexError::InsufficientLiquidity {
                reason: "requested output would drain the reserve",
            });
        }

        let denominator =
            U256::from(reserve_out - amount_out) * U256::from(BPS_DENOMINATOR - fee_bps);
        mul3_div_ceil(
            reserve_in,
            amount_out,
            BPS_DENOMINATOR,
            denominator,
            "input quote",
        )
    }

    /// Largest ratio-preserving deposit not exceeding the desired amounts
    ///
    /// On an empty pool (bootstrap) the desired amounts are taken as-is and
    /// set the initial price. Otherwise the over-supplied side is scaled down,
    /// rounding down.
    pub fn quote_matched_deposit(
        reserve_a: Amount,
        reserve_b: Amount,
        desired_a: Amount,
        desired_b: Amount,
    ) -> Result<(Amount, Amount)> {
        match (reserve_a == 0, reserve_b == 0) {
            (true, true) => return Ok((desired_a, desired_b)),
            (false, false) => {}
            _ => {
                return Err(DexError::InsufficientLiquidity {
                    reason: "reserves and share supply are inconsistent",
                })
            }
        }

        let b_per_a_desired = U256::from(desired_b) * U256::from(reserve_a);
        let b_per_a_pool = U256::from(desired_a) * U256::from(reserve_b);

        if b_per_a_desired >= b_per_a_pool {
            // B over-supplied relative to the pool ratio
            let used_b = mul_div_floor(desired_a, reserve_b, reserve_a, "matched deposit")?;
            Ok((desired_a, used_b))
        } else {
            let used_a = mul_div_floor(desired_b, reserve_a, reserve_b, "matched deposit")?;
            Ok((used_a, desired_b))
        }
    }

    /// Initial share grant for an empty pool: `floor(sqrt(used_a * used_b))`
    pub fn quote_bootstrap_shares(used_a: Amount, used_b: Amount) -> Amount {
        sqrt_product(used_a, used_b)
    }

    /// Shares minted for a deposit into a funded pool:
    /// `floor(total_shares * used_a / reserve_a)`
    pub fn quote_share_grant(reserve_a: Amount, total_shares: Amount, used_a: Amount) -> Result<Amount> {
        if reserve_a == 0 {
            return Err(DexError::InsufficientLiquidity {
                reason: "pool has no reserves",
            });
        }
        mul_div_floor(total_shares, used_a, reserve_a, "share grant")
    }

    /// Payout for burning shares: `floor(reserve * burned_shares / total_shares)` per side
    pub fn quote_withdrawal(
        reserve_a: Amount,
        reserve_b: Amount,
        total_shares: Amount,
        burned_shares: Amount,
    ) -> Result<(Amount, Amount)> {
        if total_shares == 0 {
            return Err(DexError::InsufficientLiquidity {
                reason: "pool has no outstanding shares",
            });
        }
        if burned_shares > total_shares {
            return Err(DexError::InsufficientShares {
                requested: burned_shares,
                available: total_shares,
            });
        }

        let out_a = mul_div_floor(reserve_a, burned_shares, total_shares, "withdrawal")?;
        let out_b = mul_div_floor(reserve_b, burned_shares, total_shares, "withdrawal")?;
        Ok((out_a, out_b))
    }

    /// Marginal price of the input asset in units of the output asset
    pub fn spot_price(reserve_in: Amount, reserve_out: Amount) -> Result<Decimal> {
        if reserve_in == 0 || reserve_out == 0 {
            return Err(DexError::InsufficientLiquidity {
                reason: "pool has no reserves",
            });
        }
        ratio_to_decimal(
            U512::from(reserve_out),
            U512::from(reserve_in),
            "spot price",
        )
    }

    /// Shortfall of the executed output against the spot-rate output, in
    /// basis points (fee included)
    ///
    /// `10000 * (amount_in * reserve_out - actual * reserve_in) / (amount_in * reserve_out)`,
    /// evaluated exactly and rounded down to `Decimal` precision.
    pub fn price_impact_bps(
        reserve_in: Amount,
        reserve_out: Amount,
        amount_in: Amount,
        fee_bps: u32,
    ) -> Result<Decimal> {
        let actual = Self::quote_output_for_exact_input(reserve_in, reserve_out, amount_in, fee_bps)?;

        let ideal = U256::from(amount_in).full_mul(U256::from(reserve_out));
        let executed = U256::from(actual).full_mul(U256::from(reserve_in));
        let shortfall = ideal.saturating_sub(executed) * U512::from(BPS_DENOMINATOR);
        ratio_to_decimal(shortfall, ideal, "price impact")
    }
}

/// Largest `Decimal` scale
const MAX_DECIMAL_SCALE: u32 = 28;

/// `numerator / denominator` rounded down to the finest scale whose mantissa
/// fits `Decimal`'s 96 bits
fn ratio_to_decimal(numerator: U512, denominator: U512, op: &'static str) -> Result<Decimal> {
    if denominator.is_zero() {
        return Err(DexError::ArithmeticOverflow { op });
    }
    for scale in (0..=MAX_DECIMAL_SCALE).rev() {
        let mantissa = numerator * U512::exp10(scale as usize) / denominator;
        if mantissa.bits() <= 96 {
            return Decimal::try_from_i128_with_scale(mantissa.low_u128() as i128, scale)
                .map(|value| value.normalize())
                .map_err(|_| DexError::ArithmeticOverflow { op });
        }
    }
    Err(DexError::ArithmeticOverflow { op })
}
