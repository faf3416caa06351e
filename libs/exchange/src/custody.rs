//! Asset-custody capability
//!
//! The engine never moves balances itself; it hands transfer legs to an
//! injected [`AssetCustody`]. [`AssetCustody::settle`] applies a batch of legs
//! all-or-nothing by compensating already-applied legs when a later one fails.

use dex_types::{Address, Amount, CustodyError, DexError, Result};
use parking_lot::Mutex;
use std::collections::HashMap;
use tracing::{debug, error};

/// One movement of an asset between a party and the exchange vault
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transfer {
    /// Pull `amount` of `asset` from `from` into the vault
    In {
        asset: Address,
        from: Address,
        amount: Amount,
    },
    /// Pay `amount` of `asset` from the vault to `to`
    Out {
        asset: Address,
        to: Address,
        amount: Amount,
    },
}

/// Capability the exchange uses to move assets
pub trait AssetCustody: Send + Sync {
    /// Fails with `InsufficientBalance` or `InsufficientAllowance`
    fn transfer_in(&self, asset: Address, from: Address, amount: Amount) -> Result<(), CustodyError>;

    /// Fails with `InsufficientReserve`
    fn transfer_out(&self, asset: Address, to: Address, amount: Amount) -> Result<(), CustodyError>;

    /// Undo a leg this custody previously applied
    fn revert(&self, leg: &Transfer) -> Result<(), CustodyError>;

    /// Apply legs in order; on failure revert the applied ones in reverse
    ///
    /// Returns the failing leg's error when the rollback completes, or
    /// [`CustodyError::RollbackFailed`] carrying both errors when it does not.
    fn settle(&self, legs: &[Transfer]) -> Result<(), CustodyError> {
        for (index, leg) in legs.iter().enumerate() {
            let outcome = match *leg {
                Transfer::In { asset, from, amount } => self.transfer_in(asset, from, amount),
                Transfer::Out { asset, to, amount } => self.transfer_out(asset, to, amount),
            };

            if let Err(e) = outcome {
                debug!("Settlement leg {} failed, rolling back: {}", index, e);
                let mut rollback_error = None;
                for applied in legs[..index].iter().rev() {
                    if let Err(revert_err) = self.revert(applied) {
                        error!("Failed to roll back {:?}: {}", applied, revert_err);
                        rollback_error.get_or_insert(revert_err);
                    }
                }
                return Err(match rollback_error {
                    Some(rollback) => CustodyError::RollbackFailed {
                        leg: index,
                        cause: Box::new(e),
                        rollback: Box::new(rollback),
                    },
                    None => e,
                });
            }
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
struct CustodyBook {
    /// (asset, holder) -> balance
    balances: HashMap<(Address, Address), Amount>,
    /// (asset, holder) -> amount the exchange may pull
    allowances: HashMap<(Address, Address), Amount>,
    /// asset -> amount held by the exchange
    vault: HashMap<Address, Amount>,
    /// asset -> total ever minted; bounds every other sum
    supply: HashMap<Address, Amount>,
}

impl CustodyBook {
    fn balance(&self, asset: Address, holder: Address) -> Amount {
        self.balances.get(&(asset, holder)).copied().unwrap_or(0)
    }

    fn allowance(&self, asset: Address, holder: Address) -> Amount {
        self.allowances.get(&(asset, holder)).copied().unwrap_or(0)
    }

    fn vault(&self, asset: Address) -> Amount {
        self.vault.get(&asset).copied().unwrap_or(0)
    }

    // Credits below cannot overflow: every balance is bounded by the
    // asset's minted supply, which is itself checked on mint.
    fn credit_holder(&mut self, asset: Address, holder: Address, amount: Amount) {
        *self.balances.entry((asset, holder)).or_insert(0) += amount;
    }

    fn credit_vault(&mut self, asset: Address, amount: Amount) {
        *self.vault.entry(asset).or_insert(0) += amount;
    }

    fn debit_holder(&mut self, asset: Address, holder: Address, amount: Amount) -> Result<(), CustodyError> {
        let available = self.balance(asset, holder);
        if available < amount {
            return Err(CustodyError::InsufficientBalance {
                asset,
                holder,
                required: amount,
                available,
            });
        }
        self.balances.insert((asset, holder), available - amount);
        Ok(())
    }

    fn debit_vault(&mut self, asset: Address, amount: Amount) -> Result<(), CustodyError> {
        let available = self.vault(asset);
        if available < amount {
            return Err(CustodyError::InsufficientReserve {
                asset,
                required: amount,
                available,
            });
        }
        self.vault.insert(asset, available - amount);
        Ok(())
    }
}

/// Complete in-process custody ledger: balances, allowances and the vault
///
/// Mirrors the approve-then-pull flow of fungible token contracts. Used by
/// the simulator and as the default test double.
#[derive(Debug, Default)]
pub struct InMemoryCustody {
    book: Mutex<CustodyBook>,
}

impl InMemoryCustody {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create `amount` new units of `asset` for `holder`
    pub fn mint(&self, asset: Address, holder: Address, amount: Amount) -> Result<()> {
        let mut book = self.book.lock();
        let supply = book.supply.get(&asset).copied().unwrap_or(0);
        let new_supply = supply
            .checked_add(amount)
            .ok_or(DexError::ArithmeticOverflow { op: "asset mint" })?;
        book.supply.insert(asset, new_supply);
        book.credit_holder(asset, holder, amount);
        Ok(())
    }

    /// Set how much of `asset` the exchange may pull from `holder`
    pub fn approve(&self, asset: Address, holder: Address, amount: Amount) {
        self.book.lock().allowances.insert((asset, holder), amount);
    }

    pub fn balance_of(&self, asset: Address, holder: Address) -> Amount {
        self.book.lock().balance(asset, holder)
    }

    pub fn allowance(&self, asset: Address, holder: Address) -> Amount {
        self.book.lock().allowance(asset, holder)
    }

    /// Amount of `asset` currently held by the exchange
    pub fn vault_balance(&self, asset: Address) -> Amount {
        self.book.lock().vault(asset)
    }
}

impl AssetCustody for InMemoryCustody {
    fn transfer_in(&self, asset: Address, from: Address, amount: Amount) -> Result<(), CustodyError> {
        let mut book = self.book.lock();
        let allowance = book.allowance(asset, from);
        if allowance < amount {
            return Err(CustodyError::InsufficientAllowance {
                asset,
                holder: from,
                required: amount,
                available: allowance,
            });
        }
        book.debit_holder(asset, from, amount)?;
        book.allowances.insert((asset, from), allowance - amount);
        book.credit_vault(asset, amount);
        Ok(())
    }

    fn transfer_out(&self, asset: Address, to: Address, amount: Amount) -> Result<(), CustodyError> {
        let mut book = self.book.lock();
        book.debit_vault(asset, amount)?;
        book.credit_holder(asset, to, amount);
        Ok(())
    }

    fn revert(&self, leg: &Transfer) -> Result<(), CustodyError> {
        let mut book = self.book.lock();
        match *leg {
            Transfer::In { asset, from, amount } => {
                book.debit_vault(asset, amount)?;
                book.credit_holder(asset, from, amount);
                let allowance = book.allowance(asset, from);
                book.allowances
                    .insert((asset, from), allowance.saturating_add(amount));
            }
            Transfer::Out { asset, to, amount } => {
                book.debit_holder(asset, to, amount)?;
                book.credit_vault(asset, amount);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TKA: Address = Address::from_low_u64(1);
    const TKB: Address = Address::from_low_u64(2);
    const ALICE: Address = Address::from_low_u64(0xa1);

    #[test]
    fn test_transfer_in_requires_allowance_and_balance() {
        let custody = InMemoryCustody::new();
        custody.mint(TKA, ALICE, 100).unwrap();

        assert!(matches!(
            custody.transfer_in(TKA, ALICE, 50),
            Err(CustodyError::InsufficientAllowance { .. })
        ));

        custody.approve(TKA, ALICE, 500);
        assert!(matches!(
            custody.transfer_in(TKA, ALICE, 150),
            Err(CustodyError::InsufficientBalance { .. })
        ));

        custody.transfer_in(TKA, ALICE, 60).unwrap();
        assert_eq!(custody.balance_of(TKA, ALICE), 40);
        assert_eq!(custody.allowance(TKA, ALICE), 440);
        assert_eq!(custody.vault_balance(TKA), 60);
    }

    #[test]
    fn test_transfer_out_bounded_by_vault() {
        let custody = InMemoryCustody::new();
        assert_eq!(
            custody.transfer_out(TKA, ALICE, 1),
            Err(CustodyError::InsufficientReserve {
                asset: TKA,
                required: 1,
                available: 0
            })
        );
    }

    #[test]
    fn test_settle_rolls_back_applied_legs() {
        let custody = InMemoryCustody::new();
        custody.mint(TKA, ALICE, 100).unwrap();
        custody.approve(TKA, ALICE, 100);

        // Second leg fails: vault holds no TKB
        let result = custody.settle(&[
            Transfer::In {
                asset: TKA,
                from: ALICE,
                amount: 70,
            },
            Transfer::Out {
                asset: TKB,
                to: ALICE,
                amount: 5,
            },
        ]);

        assert!(matches!(
            result,
            Err(CustodyError::InsufficientReserve { .. })
        ));
        assert_eq!(custody.balance_of(TKA, ALICE), 100);
        assert_eq!(custody.allowance(TKA, ALICE), 100);
        assert_eq!(custody.vault_balance(TKA), 0);
    }

    /// Applies legs through an in-memory ledger but cannot undo them
    struct IrreversibleCustody(InMemoryCustody);

    impl AssetCustody for IrreversibleCustody {
        fn transfer_in(&self, asset: Address, from: Address, amount: Amount) -> Result<(), CustodyError> {
            self.0.transfer_in(asset, from, amount)
        }

        fn transfer_out(&self, asset: Address, to: Address, amount: Amount) -> Result<(), CustodyError> {
            self.0.transfer_out(asset, to, amount)
        }

        fn revert(&self, leg: &Transfer) -> Result<(), CustodyError> {
            let Transfer::In { asset, from, amount } = *leg else {
                return Ok(());
            };
            Err(CustodyError::InsufficientReserve {
                asset,
                required: amount,
                available: self.0.balance_of(asset, from),
            })
        }
    }

    #[test]
    fn test_settle_reports_failed_rollback() {
        let custody = IrreversibleCustody(InMemoryCustody::new());
        custody.0.mint(TKA, ALICE, 100).unwrap();
        custody.0.approve(TKA, ALICE, 100);

        let result = custody.settle(&[
            Transfer::In {
                asset: TKA,
                from: ALICE,
                amount: 70,
            },
            Transfer::Out {
                asset: TKB,
                to: ALICE,
                amount: 5,
            },
        ]);

        match result {
            Err(CustodyError::RollbackFailed { leg, cause, rollback }) => {
                assert_eq!(leg, 1);
                assert_eq!(
                    *cause,
                    CustodyError::InsufficientReserve {
                        asset: TKB,
                        required: 5,
                        available: 0
                    }
                );
                assert!(matches!(*rollback, CustodyError::InsufficientReserve { asset: TKA, .. }));
            }
            other => panic!("expected RollbackFailed, got {:?}", other),
        }
        // The first leg stays applied and the caller is told so
        assert_eq!(custody.0.vault_balance(TKA), 70);
    }

    #[test]
    fn test_mint_checks_supply() {
        let custody = InMemoryCustody::new();
        custody.mint(TKA, ALICE, u128::MAX).unwrap();
        assert_eq!(
            custody.mint(TKA, ALICE, 1),
            Err(DexError::ArithmeticOverflow { op: "asset mint" })
        );
    }
}
