//! Owner-restricted administration: supported-asset list and global pause
//!
//! The gate is an explicit context object handed to the engine at
//! construction; there is no global instance.

use dex_types::{Address, DexError, Result};
use parking_lot::RwLock;
use std::collections::BTreeSet;
use tracing::{info, warn};

#[derive(Debug)]
struct GateState {
    owner: Address,
    paused: bool,
    supported: BTreeSet<Address>,
}

/// Administrative state consulted before every mutating exchange operation
#[derive(Debug)]
pub struct AccessGate {
    state: RwLock<GateState>,
}

impl AccessGate {
    pub fn new(owner: Address) -> Self {
        Self {
            state: RwLock::new(GateState {
                owner,
                paused: false,
                supported: BTreeSet::new(),
            }),
        }
    }

    pub fn owner(&self) -> Address {
        self.state.read().owner
    }

    pub fn paused(&self) -> bool {
        self.state.read().paused
    }

    pub fn is_supported(&self, asset: Address) -> bool {
        self.state.read().supported.contains(&asset)
    }

    /// Supported assets in canonical order
    pub fn supported_assets(&self) -> Vec<Address> {
        self.state.read().supported.iter().copied().collect()
    }

    /// Add an asset to the supported list
    ///
    /// Idempotent: returns `Ok(true)` when the asset was newly added and
    /// `Ok(false)` when it was already supported.
    pub fn add_supported_token(&self, caller: Address, asset: Address) -> Result<bool> {
        let mut state = self.state.write();
        Self::ensure_owner(&state, caller, "add_supported_token")?;
        if asset.is_zero() {
            return Err(DexError::ZeroAddress { what: "asset" });
        }

        let added = state.supported.insert(asset);
        if added {
            info!("Asset {} added to supported list", asset);
        }
        Ok(added)
    }

    /// Halt all mutating operations; repeated calls are no-ops
    pub fn pause(&self, caller: Address) -> Result<()> {
        let mut state = self.state.write();
        Self::ensure_owner(&state, caller, "pause")?;
        if !state.paused {
            state.paused = true;
            info!("Exchange paused by {}", caller);
        }
        Ok(())
    }

    pub fn unpause(&self, caller: Address) -> Result<()> {
        let mut state = self.state.write();
        Self::ensure_owner(&state, caller, "unpause")?;
        if state.paused {
            state.paused = false;
            info!("Exchange unpaused by {}", caller);
        }
        Ok(())
    }

    pub fn transfer_ownership(&self, caller: Address, new_owner: Address) -> Result<()> {
        let mut state = self.state.write();
        Self::ensure_owner(&state, caller, "transfer_ownership")?;
        if new_owner.is_zero() {
            return Err(DexError::ZeroAddress { what: "new owner" });
        }
        info!("Ownership transferred from {} to {}", state.owner, new_owner);
        state.owner = new_owner;
        Ok(())
    }

    /// Precondition for every state-mutating exchange operation
    pub fn ensure_active(&self) -> Result<()> {
        if self.state.read().paused {
            return Err(DexError::SystemPaused);
        }
        Ok(())
    }

    fn ensure_owner(state: &GateState, caller: Address, action: &str) -> Result<()> {
        if caller != state.owner {
            warn!("Rejected {} from non-owner {}", action, caller);
            return Err(DexError::NotOwner { caller });
        }
        Ok(())
    }
}
