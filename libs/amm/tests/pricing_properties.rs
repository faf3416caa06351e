//! Pricing Engine Property Tests
//!
//! Mathematical properties that must hold for every reserve configuration:
//! the constant product never decreases across a swap, and every rounding
//! step is biased in the pool's favour.

use dex_amm::{math::sqrt_product, PricingEngine};
use primitive_types::U256;
use proptest::prelude::*;

prop_compose! {
    fn valid_reserves()
        (reserve in 1_000u128..1_000_000_000_000_000_000u128) -> u128 {
        reserve
    }
}

prop_compose! {
    fn valid_fee()
        (fee_bps in 0u32..1000u32) -> u32 {
        fee_bps
    }
}

fn product(a: u128, b: u128) -> U256 {
    U256::from(a) * U256::from(b)
}

proptest! {
    #[test]
    fn prop_exact_input_never_decreases_k(
        reserve_in in valid_reserves(),
        reserve_out in valid_reserves(),
        amount_in in 1u128..1_000_000_000_000_000_000u128,
        fee_bps in valid_fee(),
    ) {
        let out = PricingEngine::quote_output_for_exact_input(reserve_in, reserve_out, amount_in, fee_bps).unwrap();
        prop_assert!(out < reserve_out);

        let before = product(reserve_in, reserve_out);
        let after = product(reserve_in + amount_in, reserve_out - out);
        prop_assert!(after >= before);
    }

    #[test]
    fn prop_exact_output_never_decreases_k(
        reserve_in in valid_reserves(),
        reserve_out in valid_reserves(),
        share_of_reserve in 1u128..1000u128,
        fee_bps in valid_fee(),
    ) {
        let amount_out = (reserve_out * share_of_reserve / 1000).max(1);
        prop_assume!(amount_out < reserve_out);

        let amount_in = PricingEngine::quote_input_for_exact_output(reserve_in, reserve_out, amount_out, fee_bps).unwrap();
        let before = product(reserve_in, reserve_out);
        let after = product(reserve_in + amount_in, reserve_out - amount_out);
        prop_assert!(after >= before);
    }

    #[test]
    fn prop_matched_deposit_respects_desired_and_ratio(
        reserve_a in valid_reserves(),
        reserve_b in valid_reserves(),
        desired_a in 1u128..1_000_000_000_000u128,
        desired_b in 1u128..1_000_000_000_000u128,
    ) {
        let (used_a, used_b) = PricingEngine::quote_matched_deposit(reserve_a, reserve_b, desired_a, desired_b).unwrap();
        prop_assert!(used_a <= desired_a);
        prop_assert!(used_b <= desired_b);
        prop_assert!(used_a == desired_a || used_b == desired_b);
        // The scaled side is within one unit of the exact pool ratio
        prop_assert!(product(used_b, reserve_a) <= product(used_a + 1, reserve_b));
        prop_assert!(product(used_a, reserve_b) <= product(used_b + 1, reserve_a));
    }

    #[test]
    fn prop_withdrawal_never_exceeds_reserves(
        reserve_a in valid_reserves(),
        reserve_b in valid_reserves(),
        total in 1u128..1_000_000_000_000u128,
        burned_share in 0u128..=1000u128,
    ) {
        let burned = total * burned_share / 1000;
        let (out_a, out_b) = PricingEngine::quote_withdrawal(reserve_a, reserve_b, total, burned).unwrap();
        prop_assert!(out_a <= reserve_a);
        prop_assert!(out_b <= reserve_b);
        if burned == total {
            prop_assert_eq!((out_a, out_b), (reserve_a, reserve_b));
        }
    }

    #[test]
    fn prop_bootstrap_shares_are_floor_sqrt(
        a in 1u128..u64::MAX as u128,
        b in 1u128..u64::MAX as u128,
    ) {
        let shares = sqrt_product(a, b);
        prop_assert!(product(shares, shares) <= product(a, b));
        prop_assert!(product(shares + 1, shares + 1) > product(a, b));
    }
}
