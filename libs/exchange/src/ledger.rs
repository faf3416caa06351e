//! Per-pool share bookkeeping
//!
//! Pure arithmetic, no pricing. Updates are validated first
//! ([`ShareLedger::prepare_mint`] / [`ShareLedger::prepare_burn`]) and applied
//! later with an infallible [`ShareLedger::apply`], so a caller holding the
//! pool's write guard can check everything before committing anything.

use dex_types::{Address, Amount, DexError, Result};
use std::collections::HashMap;

/// Validated share change, ready to apply to the ledger it was prepared from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub struct ShareUpdate {
    holder: Address,
    new_balance: Amount,
    new_total: Amount,
}

impl ShareUpdate {
    pub fn holder(&self) -> Address {
        self.holder
    }
}

/// Outstanding shares of one pool and each holder's balance
///
/// Invariant: the sum of all balances equals `total`. Zero balances are not
/// stored.
#[derive(Debug, Clone, Default)]
pub struct ShareLedger {
    total: Amount,
    balances: HashMap<Address, Amount>,
}

impl ShareLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn total(&self) -> Amount {
        self.total
    }

    pub fn balance_of(&self, holder: Address) -> Amount {
        self.balances.get(&holder).copied().unwrap_or(0)
    }

    pub fn holder_count(&self) -> usize {
        self.balances.len()
    }

    pub fn balances(&self) -> impl Iterator<Item = (Address, Amount)> + '_ {
        self.balances.iter().map(|(holder, amount)| (*holder, *amount))
    }

    pub fn prepare_mint(&self, holder: Address, amount: Amount) -> Result<ShareUpdate> {
        let new_total = self
            .total
            .checked_add(amount)
            .ok_or(DexError::ArithmeticOverflow { op: "share mint" })?;
        let new_balance = self
            .balance_of(holder)
            .checked_add(amount)
            .ok_or(DexError::ArithmeticOverflow { op: "share mint" })?;
        Ok(ShareUpdate {
            holder,
            new_balance,
            new_total,
        })
    }

    pub fn prepare_burn(&self, holder: Address, amount: Amount) -> Result<ShareUpdate> {
        let available = self.balance_of(holder);
        if amount > available {
            return Err(DexError::InsufficientShares {
                requested: amount,
                available,
            });
        }
        Ok(ShareUpdate {
            holder,
            new_balance: available - amount,
            // balance <= total, so this cannot underflow
            new_total: self.total - amount,
        })
    }

    /// Apply an update prepared against the current ledger state
    pub fn apply(&mut self, update: ShareUpdate) {
        if update.new_balance == 0 {
            self.balances.remove(&update.holder);
        } else {
            self.balances.insert(update.holder, update.new_balance);
        }
        self.total = update.new_total;
    }

    pub fn mint(&mut self, holder: Address, amount: Amount) -> Result<()> {
        let update = self.prepare_mint(holder, amount)?;
        self.apply(update);
        Ok(())
    }

    /// Fails with `InsufficientShares` if `amount` exceeds the holder's balance
    pub fn burn(&mut self, holder: Address, amount: Amount) -> Result<()> {
        let update = self.prepare_burn(holder, amount)?;
        self.apply(update);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALICE: Address = Address::from_low_u64(1);
    const BOB: Address = Address::from_low_u64(2);

    fn sum(ledger: &ShareLedger) -> Amount {
        ledger.balances().map(|(_, amount)| amount).sum()
    }

    #[test]
    fn test_mint_and_burn_keep_sum_invariant() {
        let mut ledger = ShareLedger::new();
        ledger.mint(ALICE, 1000).unwrap();
        ledger.mint(BOB, 250).unwrap();
        assert_eq!(ledger.total(), 1250);
        assert_eq!(sum(&ledger), ledger.total());

        ledger.burn(ALICE, 400).unwrap();
        assert_eq!(ledger.balance_of(ALICE), 600);
        assert_eq!(ledger.total(), 850);
        assert_eq!(sum(&ledger), ledger.total());
    }

    #[test]
    fn test_full_burn_removes_holder() {
        let mut ledger = ShareLedger::new();
        ledger.mint(ALICE, 10).unwrap();
        ledger.burn(ALICE, 10).unwrap();
        assert_eq!(ledger.holder_count(), 0);
        assert_eq!(ledger.total(), 0);
    }

    #[test]
    fn test_burn_more_than_held_fails_without_change() {
        let mut ledger = ShareLedger::new();
        ledger.mint(ALICE, 10).unwrap();
        assert_eq!(
            ledger.burn(ALICE, 11),
            Err(DexError::InsufficientShares {
                requested: 11,
                available: 10
            })
        );
        assert_eq!(
            ledger.burn(BOB, 1),
            Err(DexError::InsufficientShares {
                requested: 1,
                available: 0
            })
        );
        assert_eq!(ledger.balance_of(ALICE), 10);
        assert_eq!(ledger.total(), 10);
    }

    #[test]
    fn test_mint_overflow_is_checked() {
        let mut ledger = ShareLedger::new();
        ledger.mint(ALICE, u128::MAX).unwrap();
        assert_eq!(
            ledger.mint(BOB, 1),
            Err(DexError::ArithmeticOverflow { op: "share mint" })
        );
        assert_eq!(ledger.balance_of(BOB), 0);
    }

    #[test]
    fn test_prepared_update_has_no_effect_until_applied() {
        let mut ledger = ShareLedger::new();
        let update = ledger.prepare_mint(ALICE, 5).unwrap();
        assert_eq!(ledger.total(), 0);
        assert_eq!(update.holder(), ALICE);
        ledger.apply(update);
        assert_eq!(ledger.balance_of(ALICE), 5);
    }
}
