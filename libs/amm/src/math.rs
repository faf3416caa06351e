//! Wide-integer helpers for exact pricing
//!
//! Every product of two `u128` amounts is formed in `U256` (and in `U512`
//! when a third factor is involved) before dividing back down, so no
//! intermediate can wrap. Narrowing back to `u128` is checked and reported as
//! [`DexError::ArithmeticOverflow`].

use dex_types::{Amount, DexError, Result};
use primitive_types::{U256, U512};

/// Basis-point denominator (10000 bps = 100%)
pub const BPS_DENOMINATOR: u32 = 10_000;

/// Narrow a 256-bit value back to storage width
pub fn to_amount(value: U256, op: &'static str) -> Result<Amount> {
    if value.bits() > 128 {
        return Err(DexError::ArithmeticOverflow { op });
    }
    Ok(value.low_u128())
}

fn narrow_u512(value: U512, op: &'static str) -> Result<Amount> {
    if value.bits() > 128 {
        return Err(DexError::ArithmeticOverflow { op });
    }
    Ok(value.low_u128())
}

/// `floor(a * b / c)`
pub fn mul_div_floor(a: Amount, b: Amount, c: Amount, op: &'static str) -> Result<Amount> {
    if c == 0 {
        return Err(DexError::ArithmeticOverflow { op });
    }
    let product = U256::from(a) * U256::from(b);
    to_amount(product / U256::from(c), op)
}

/// `ceil(a * b / c)`
pub fn mul_div_ceil(a: Amount, b: Amount, c: Amount, op: &'static str) -> Result<Amount> {
    if c == 0 {
        return Err(DexError::ArithmeticOverflow { op });
    }
    let product = U256::from(a) * U256::from(b);
    let divisor = U256::from(c);
    let (quotient, remainder) = product.div_mod(divisor);
    let rounded = if remainder.is_zero() {
        quotient
    } else {
        quotient + U256::one()
    };
    to_amount(rounded, op)
}

/// `ceil(a * b * k / d)` where `d` may itself be a 256-bit product
pub fn mul3_div_ceil(a: Amount, b: Amount, k: u32, d: U256, op: &'static str) -> Result<Amount> {
    if d.is_zero() {
        return Err(DexError::ArithmeticOverflow { op });
    }
    let numerator = (U256::from(a) * U256::from(b)).full_mul(U256::from(k));
    let divisor = U512::from(d);
    let (quotient, remainder) = numerator.div_mod(divisor);
    let rounded = if remainder.is_zero() {
        quotient
    } else {
        quotient + U512::one()
    };
    narrow_u512(rounded, op)
}

/// Integer square root of a 256-bit value, rounded down (Babylonian method)
pub fn isqrt(value: U256) -> U256 {
    if value <= U256::one() {
        return value;
    }
    // Start above the root so the sequence decreases monotonically onto floor(sqrt)
    let mut x = value;
    let two = U256::from(2u8);
    let mut y = value / two + value % two;
    while y < x {
        x = y;
        y = (x + value / x) / two;
    }
    x
}

/// `floor(sqrt(a * b))`; always fits storage width
pub fn sqrt_product(a: Amount, b: Amount) -> Amount {
    isqrt(U256::from(a) * U256::from(b)).low_u128()
}
