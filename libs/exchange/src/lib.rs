//! # Exchange Core
//!
//! Pool registry, liquidity shares, administrative gate and the engine that
//! executes deposits, withdrawals and swaps against constant-product pools.
//!
//! ## Architecture
//!
//! - [`PoolRegistry`] owns every pool behind a per-pool `RwLock`
//! - [`ShareLedger`] tracks each pool's outstanding shares
//! - [`AccessGate`] holds the owner, the pause flag and the supported assets
//! - [`ExchangeEngine`] runs each operation against one locked reserve snapshot
//! - [`AssetCustody`] and [`EventSink`] are injected capabilities
//!
//! ## Usage
//!
//! ```rust
//! use dex_exchange::{AccessGate, EventLog, ExchangeEngine, InMemoryCustody};
//! use dex_types::Address;
//! use std::sync::Arc;
//!
//! let owner = Address::from_low_u64(0xaa);
//! let (tka, tkb) = (Address::from_low_u64(1), Address::from_low_u64(2));
//!
//! let custody = Arc::new(InMemoryCustody::new());
//! let engine = ExchangeEngine::new(
//!     Arc::new(AccessGate::new(owner)),
//!     custody.clone(),
//!     Arc::new(EventLog::new()),
//!     30,
//! )?;
//! engine.gate().add_supported_token(owner, tka)?;
//! engine.gate().add_supported_token(owner, tkb)?;
//! engine.create_pool(owner, tka, tkb)?;
//!
//! for asset in [tka, tkb] {
//!     custody.mint(asset, owner, 100_000)?;
//!     custody.approve(asset, owner, 100_000);
//! }
//! engine.add_liquidity(owner, tka, tkb, 100_000, 100_000, 0, 0)?;
//! assert_eq!(engine.get_amount_out(1000, tka, tkb)?, 987);
//! # Ok::<(), dex_types::DexError>(())
//! ```

pub mod access;
pub mod custody;
pub mod engine;
pub mod events;
pub mod ledger;
pub mod registry;

pub use access::AccessGate;
pub use custody::{AssetCustody, InMemoryCustody, Transfer};
pub use engine::ExchangeEngine;
pub use events::{EventLog, EventSink, FanoutSink, TracingSink};
pub use ledger::{ShareLedger, ShareUpdate};
pub use registry::{Pool, PoolHandle, PoolInfo, PoolRegistry, PoolStatus};
