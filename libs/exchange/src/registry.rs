//! Pool Registry
//!
//! Maps each canonical asset pair to exactly one pool. Pools live behind
//! `Arc<RwLock<_>>` handles in a `DashMap`, so operations on different pools
//! never contend and readers of one pool share access.

use crate::access::AccessGate;
use crate::ledger::{ShareLedger, ShareUpdate};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use dex_amm::ReservePair;
use dex_types::{Address, Amount, DexError, PoolKey, Result};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::info;

/// Shared handle to one pool's state
pub type PoolHandle = Arc<RwLock<Pool>>;

/// Lifecycle of a pool; a funded pool never returns to `Uninitialized`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PoolStatus {
    Uninitialized,
    Funded,
}

/// Reserve and share state for one canonical pair
#[derive(Debug)]
pub struct Pool {
    reserves: ReservePair,
    shares: ShareLedger,
    status: PoolStatus,
    sequence: u64,
}

impl Pool {
    fn new(key: PoolKey, sequence: u64) -> Self {
        Self {
            reserves: ReservePair::empty(key),
            shares: ShareLedger::new(),
            status: PoolStatus::Uninitialized,
            sequence,
        }
    }

    pub fn key(&self) -> PoolKey {
        self.reserves.key()
    }

    pub fn reserves(&self) -> &ReservePair {
        &self.reserves
    }

    pub fn shares(&self) -> &ShareLedger {
        &self.shares
    }

    pub fn status(&self) -> PoolStatus {
        self.status
    }

    /// Creation order within the registry, starting at 1
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Install a new reserve snapshot and apply a prepared share change
    ///
    /// Only the exchange engine commits, and only after every precondition
    /// and custody leg has succeeded.
    pub(crate) fn commit(&mut self, reserves: ReservePair, shares: Option<ShareUpdate>) {
        debug_assert_eq!(reserves.key(), self.reserves.key());
        self.reserves = reserves;
        if let Some(update) = shares {
            self.shares.apply(update);
        }
        if !self.reserves.is_empty() {
            self.status = PoolStatus::Funded;
        }
        debug_assert!(self.reserves.check_consistency(self.shares.total()).is_ok());
    }

    /// Read-only view oriented to `asset_a`
    pub fn info(&self, asset_a: Address) -> PoolInfo {
        let (reserve_a, reserve_b) = self.reserves.oriented(asset_a);
        PoolInfo {
            reserve_a,
            reserve_b,
            total_shares: self.shares.total(),
        }
    }
}

/// Reserve/share snapshot in the caller's asset order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolInfo {
    pub reserve_a: Amount,
    pub reserve_b: Amount,
    pub total_shares: Amount,
}

/// Exclusive owner of every pool
#[derive(Debug, Default)]
pub struct PoolRegistry {
    pools: DashMap<PoolKey, PoolHandle>,
    created: AtomicU64,
}

impl PoolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new, empty pool for the pair
    ///
    /// Fails with `PoolAlreadyExists` for a known pair in either order and with
    /// `UnsupportedAsset` if the gate does not list both assets.
    pub fn create_pool(
        &self,
        gate: &AccessGate,
        asset_a: Address,
        asset_b: Address,
    ) -> Result<PoolHandle> {
        let key = PoolKey::new(asset_a, asset_b)?;
        if self.pools.contains_key(&key) {
            return Err(DexError::PoolAlreadyExists { pair: key });
        }
        for asset in [key.x(), key.y()] {
            if !gate.is_supported(asset) {
                return Err(DexError::UnsupportedAsset { asset });
            }
        }

        match self.pools.entry(key) {
            Entry::Occupied(_) => Err(DexError::PoolAlreadyExists { pair: key }),
            Entry::Vacant(slot) => {
                let sequence = self.created.fetch_add(1, Ordering::Relaxed) + 1;
                let handle = Arc::new(RwLock::new(Pool::new(key, sequence)));
                slot.insert(handle.clone());
                info!("Pool #{} created for {}", sequence, key);
                Ok(handle)
            }
        }
    }

    pub fn get_pool(&self, asset_a: Address, asset_b: Address) -> Result<PoolHandle> {
        let key = PoolKey::new(asset_a, asset_b)?;
        self.pools
            .get(&key)
            .map(|entry| entry.value().clone())
            .ok_or(DexError::PoolNotFound { pair: key })
    }

    /// `(reserve_a, reserve_b, total_shares)` in argument order; never mutates
    pub fn get_pool_info(&self, asset_a: Address, asset_b: Address) -> Result<PoolInfo> {
        let handle = self.get_pool(asset_a, asset_b)?;
        let pool = handle.read();
        Ok(pool.info(asset_a))
    }

    pub fn pool_count(&self) -> usize {
        self.pools.len()
    }

    /// All registered pairs, sorted canonically
    pub fn pool_keys(&self) -> Vec<PoolKey> {
        let mut keys: Vec<PoolKey> = self.pools.iter().map(|entry| *entry.key()).collect();
        keys.sort();
        keys
    }
}
