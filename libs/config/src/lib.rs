//! # Exchange Configuration
//!
//! Centralised configuration and defaults for the exchange core and the
//! simulator service.
//!
//! ## Features
//!
//! - **Layered loading**: TOML file, then `DEX__`-prefixed environment overrides
//! - **Validation**: fee range and owner checks before anything is built
//! - **Defaults**: fee tier and logging constants in [`defaults`]
//!
//! ## Usage
//!
//! ```rust,no_run
//! use dex_config::ExchangeConfig;
//! use std::path::Path;
//!
//! let config = ExchangeConfig::load(Some(Path::new("config/exchange.toml")))?;
//! println!("fee tier: {} bps", config.exchange.fee_bps);
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod defaults;
pub mod exchange_config;

// Re-export commonly used types
pub use exchange_config::{
    AssetConfig, ExchangeConfig, ExchangeSettings, LoggingConfig, PoolSeedConfig, load_config,
};
