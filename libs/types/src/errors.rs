//! Error taxonomy for exchange operations
//!
//! Every failure is terminal for the triggering call and leaves pool, share
//! and custody state untouched, except [`CustodyError::RollbackFailed`], which
//! reports that custody could not undo a partially applied settlement. The
//! `Display` text is the human-readable reason surfaced to the caller.

use crate::{Address, Amount, PoolKey};
use thiserror::Error;

/// Failures of the asset-custody collaborator
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CustodyError {
    #[error("insufficient balance of {asset} for {holder}: required {required}, available {available}")]
    InsufficientBalance {
        asset: Address,
        holder: Address,
        required: Amount,
        available: Amount,
    },

    #[error("insufficient allowance of {asset} from {holder}: required {required}, approved {available}")]
    InsufficientAllowance {
        asset: Address,
        holder: Address,
        required: Amount,
        available: Amount,
    },

    #[error("insufficient reserve of {asset} in custody: required {required}, held {available}")]
    InsufficientReserve {
        asset: Address,
        required: Amount,
        available: Amount,
    },

    /// A settlement leg failed and undoing an earlier leg failed too; custody
    /// is left partially applied
    #[error("settlement leg {leg} failed ({cause}) and rollback failed ({rollback})")]
    RollbackFailed {
        leg: usize,
        cause: Box<CustodyError>,
        rollback: Box<CustodyError>,
    },
}

/// Errors surfaced by pricing, pool bookkeeping and exchange operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DexError {
    #[error("pool not found for {pair}")]
    PoolNotFound { pair: PoolKey },

    #[error("pool already exists for {pair}")]
    PoolAlreadyExists { pair: PoolKey },

    #[error("asset {asset} is not supported")]
    UnsupportedAsset { asset: Address },

    #[error("pool assets must differ, got {asset} twice")]
    IdenticalAssets { asset: Address },

    #[error("insufficient liquidity: {reason}")]
    InsufficientLiquidity { reason: &'static str },

    #[error("insufficient shares: requested {requested}, held {available}")]
    InsufficientShares { requested: Amount, available: Amount },

    #[error("slippage exceeded: {bound} is {limit}, executed amount is {actual}")]
    SlippageExceeded {
        bound: &'static str,
        limit: Amount,
        actual: Amount,
    },

    #[error("system is paused")]
    SystemPaused,

    #[error("caller {caller} is not the owner")]
    NotOwner { caller: Address },

    #[error("arithmetic overflow in {op}")]
    ArithmeticOverflow { op: &'static str },

    #[error("fee of {fee_bps} bps is out of range (must be below 10000)")]
    InvalidFee { fee_bps: u32 },

    #[error("{what} must be non-zero")]
    ZeroAmount { what: &'static str },

    #[error("{what} must not be the zero address")]
    ZeroAddress { what: &'static str },

    #[error("custody transfer failed: {0}")]
    Custody(#[from] CustodyError),
}

impl DexError {
    /// Short stable name of the failure kind, suitable for metrics labels and logs
    pub fn kind(&self) -> &'static str {
        match self {
            DexError::PoolNotFound { .. } => "PoolNotFound",
            DexError::PoolAlreadyExists { .. } => "PoolAlreadyExists",
            DexError::UnsupportedAsset { .. } => "UnsupportedAsset",
            DexError::IdenticalAssets { .. } => "IdenticalAssets",
            DexError::InsufficientLiquidity { .. } => "InsufficientLiquidity",
            DexError::InsufficientShares { .. } => "InsufficientShares",
            DexError::SlippageExceeded { .. } => "SlippageExceeded",
            DexError::SystemPaused => "SystemPaused",
            DexError::NotOwner { .. } => "NotOwner",
            DexError::ArithmeticOverflow { .. } => "ArithmeticOverflow",
            DexError::InvalidFee { .. } => "InvalidFee",
            DexError::ZeroAmount { .. } => "ZeroAmount",
            DexError::ZeroAddress { .. } => "ZeroAddress",
            DexError::Custody(CustodyError::InsufficientBalance { .. }) => "InsufficientBalance",
            DexError::Custody(CustodyError::InsufficientAllowance { .. }) => {
                "InsufficientAllowance"
            }
            DexError::Custody(CustodyError::InsufficientReserve { .. }) => "InsufficientReserve",
            DexError::Custody(CustodyError::RollbackFailed { .. }) => "RollbackFailed",
        }
    }
}
