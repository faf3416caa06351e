//! # Exchange AMM Library - Constant-Product Pricing Engine
//!
//! ## Purpose
//!
//! Mathematical core of the exchange: swap quotes in both directions, matched
//! liquidity deposits, share grants and withdrawals for two-asset pools priced
//! by the constant-product rule `x * y = k` with a proportional fee.
//!
//! ## Numeric Contract
//!
//! - **Integers only**: amounts are `u128` in each asset's native precision
//! - **Wide intermediates**: every product is formed in `U256`/`U512` before
//!   dividing back to storage width; a result that does not fit surfaces as
//!   `ArithmeticOverflow` instead of wrapping
//! - **Rounding favours the pool**: outputs, share grants and withdrawals
//!   round down; required inputs round up
//! - **Bootstrap**: the first deposit into an empty pool mints
//!   `floor(sqrt(a * b))` shares
//!
//! ## Architecture Role
//!
//! ```text
//! ReservePair snapshot ──→ [PricingEngine] ──→ quote ──→ ExchangeEngine commit
//!        ↓                       ↓
//!  DirectedReserves         math (U256 mul_div, isqrt)
//!  (AmmPool trait)          Decimal analytics (spot price, impact)
//! ```
//!
//! Invariant guaranteed by construction: for any swap the reserve product
//! after execution is at least the product before.

pub mod math;
pub mod pool_traits;
pub mod pricing;
pub mod reserves;

pub use pool_traits::{AmmPool, DirectedReserves};
pub use pricing::PricingEngine;
pub use reserves::ReservePair;

/// Common types for analytics output
pub use rust_decimal::Decimal;
pub use rust_decimal_macros::dec;
