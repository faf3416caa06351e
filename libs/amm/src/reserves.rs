//! Reserve snapshot for one canonical asset pair

use crate::pool_traits::DirectedReserves;
use dex_types::{Address, Amount, DexError, PoolKey, Result};
use primitive_types::U256;
use serde::Serialize;

/// Balances a pool holds of its two assets, on the canonical orientation
///
/// A value object: mutating operations build a new pair with
/// [`ReservePair::with_oriented`] and commit it wholesale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReservePair {
    key: PoolKey,
    reserve_x: Amount,
    reserve_y: Amount,
}

impl ReservePair {
    pub fn empty(key: PoolKey) -> Self {
        Self {
            key,
            reserve_x: 0,
            reserve_y: 0,
        }
    }

    pub fn new(key: PoolKey, reserve_x: Amount, reserve_y: Amount) -> Self {
        Self {
            key,
            reserve_x,
            reserve_y,
        }
    }

    pub fn key(&self) -> PoolKey {
        self.key
    }

    pub fn reserve_x(&self) -> Amount {
        self.reserve_x
    }

    pub fn reserve_y(&self) -> Amount {
        self.reserve_y
    }

    pub fn is_empty(&self) -> bool {
        self.reserve_x == 0 && self.reserve_y == 0
    }

    /// Reserves as `(reserve of asset, reserve of the other asset)`
    ///
    /// `asset` must belong to the pair; anything that is not the `x` side is
    /// treated as `y`.
    pub fn oriented(&self, asset: Address) -> (Amount, Amount) {
        if self.key.is_x(asset) {
            (self.reserve_x, self.reserve_y)
        } else {
            (self.reserve_y, self.reserve_x)
        }
    }

    /// New snapshot with reserves given in `asset`-first orientation
    pub fn with_oriented(&self, asset: Address, reserve_asset: Amount, reserve_other: Amount) -> Self {
        if self.key.is_x(asset) {
            Self::new(self.key, reserve_asset, reserve_other)
        } else {
            Self::new(self.key, reserve_other, reserve_asset)
        }
    }

    /// Swap-direction view used for quoting
    pub fn directed(&self, asset_in: Address, fee_bps: u32) -> DirectedReserves {
        let (reserve_in, reserve_out) = self.oriented(asset_in);
        DirectedReserves {
            reserve_in,
            reserve_out,
            fee_bps,
        }
    }

    /// Constant-product `k` in full width
    pub fn product(&self) -> U256 {
        U256::from(self.reserve_x) * U256::from(self.reserve_y)
    }

    /// Funded-or-untouched invariant: both reserves and the share supply are
    /// all zero or all non-zero
    pub fn check_consistency(&self, total_shares: Amount) -> Result<()> {
        let x_empty = self.reserve_x == 0;
        let y_empty = self.reserve_y == 0;
        let shares_empty = total_shares == 0;
        if x_empty == y_empty && y_empty == shares_empty {
            Ok(())
        } else {
            Err(DexError::InsufficientLiquidity {
                reason: "reserves and share supply are inconsistent",
            })
        }
    }
}
