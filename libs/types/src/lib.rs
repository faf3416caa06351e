//! # Exchange Core Types
//!
//! Shared vocabulary for the constant-product exchange crates.
//!
//! ## Contents
//!
//! - **Identifiers**: [`Address`] (20-byte asset/party identifier) and [`PoolKey`]
//!   (canonically ordered asset pair)
//! - **Amounts**: [`Amount`] is an unsigned 128-bit fixed-point integer in the
//!   asset's native precision; no floating point ever touches balances
//! - **Errors**: [`DexError`] covers every failure an exchange operation can
//!   surface, [`CustodyError`] the failures of the asset-custody collaborator
//! - **Events**: [`ExchangeEvent`] records emitted for external indexing
//!
//! ## Usage
//!
//! ```rust
//! use dex_types::{Address, PoolKey};
//!
//! let usdc: Address = "0x2791bca1f2de4661ed88a30c99a7a9449aa84174".parse().unwrap();
//! let weth: Address = "0x7ceb23fd6bc0add59e62ac25578270cff1b9f619".parse().unwrap();
//!
//! // (A, B) and (B, A) resolve to the same pool
//! assert_eq!(PoolKey::new(usdc, weth).unwrap(), PoolKey::new(weth, usdc).unwrap());
//! ```

pub mod address;
pub mod errors;
pub mod events;

pub use address::{Address, AddressParseError, PoolKey};
pub use errors::{CustodyError, DexError};
pub use events::ExchangeEvent;

/// Token quantity in the asset's smallest unit
pub type Amount = u128;

/// Result alias used across the exchange crates
pub type Result<T, E = DexError> = std::result::Result<T, E>;
