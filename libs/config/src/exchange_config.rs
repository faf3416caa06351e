//! Exchange Configuration Module
//!
//! Provides configuration loading and validation for the exchange core.
//! Supports loading from TOML files with environment variable overrides.

use crate::defaults;
use anyhow::{bail, Context, Result};
use config_crate::{Config, Environment, File};
use dex_types::{Address, Amount};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, info};

/// Main exchange configuration structure
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct ExchangeConfig {
    /// Core exchange settings
    #[serde(default)]
    pub exchange: ExchangeSettings,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Assets registered on the supported list at startup
    #[serde(default)]
    pub assets: Vec<AssetConfig>,

    /// Pools created (and optionally funded) at startup
    #[serde(default)]
    pub pools: Vec<PoolSeedConfig>,
}

/// Core exchange settings
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ExchangeSettings {
    /// Swap fee in basis points (30 = 0.3%)
    pub fee_bps: u32,

    /// Administrator allowed to pause and curate the supported asset list
    pub owner: Address,
}

/// Logging settings
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub json: bool,
}

/// One supported asset
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AssetConfig {
    pub symbol: String,
    pub address: Address,
    #[serde(default = "default_decimals")]
    pub decimals: u8,
}

/// A pool to create at startup, referencing assets by symbol
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct PoolSeedConfig {
    pub asset_a: String,
    pub asset_b: String,

    /// Initial liquidity in whole tokens; zero leaves the pool unfunded
    #[serde(default)]
    pub initial_a: u64,
    #[serde(default)]
    pub initial_b: u64,
}

fn default_decimals() -> u8 {
    defaults::exchange::ASSET_DECIMALS
}

impl Default for ExchangeSettings {
    fn default() -> Self {
        Self {
            fee_bps: defaults::exchange::FEE_BPS,
            owner: Address::ZERO,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::logging::LEVEL.to_string(),
            json: false,
        }
    }
}

impl AssetConfig {
    /// Convert a whole-token quantity into base units
    pub fn scaled(&self, whole_tokens: u64) -> Result<Amount> {
        let unit = 10u128
            .checked_pow(self.decimals as u32)
            .with_context(|| format!("decimals {} too large for {}", self.decimals, self.symbol))?;
        (whole_tokens as u128)
            .checked_mul(unit)
            .with_context(|| format!("{} {} overflows base units", whole_tokens, self.symbol))
    }
}

impl ExchangeConfig {
    /// Load configuration from a TOML file with environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = path.unwrap_or(Path::new(defaults::loading::DEFAULT_CONFIG_PATH));
        info!("Loading exchange config: {:?}", path);

        let builder = Config::builder()
            .add_source(File::from(path).required(true))
            // Override with environment variables (DEX__ prefix)
            .add_source(
                Environment::with_prefix(defaults::loading::ENV_PREFIX)
                    .separator(defaults::loading::ENV_SEPARATOR)
                    .try_parsing(true),
            );

        let config: ExchangeConfig = builder
            .build()
            .context("Failed to build configuration")?
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        config.validate()?;
        debug!(
            "Loaded config: fee {} bps, {} assets, {} pools",
            config.exchange.fee_bps,
            config.assets.len(),
            config.pools.len()
        );
        Ok(config)
    }

    /// Reject configurations the exchange cannot be built from
    pub fn validate(&self) -> Result<()> {
        if self.exchange.fee_bps >= defaults::exchange::MAX_FEE_BPS {
            bail!(
                "fee_bps must be below {}, got {}",
                defaults::exchange::MAX_FEE_BPS,
                self.exchange.fee_bps
            );
        }
        if self.exchange.owner.is_zero() {
            bail!("exchange.owner must be set to a non-zero address");
        }

        let mut symbols = HashSet::new();
        for asset in &self.assets {
            if !symbols.insert(asset.symbol.as_str()) {
                bail!("duplicate asset symbol: {}", asset.symbol);
            }
        }

        for pool in &self.pools {
            for symbol in [&pool.asset_a, &pool.asset_b] {
                if !symbols.contains(symbol.as_str()) {
                    bail!("pool references unknown asset symbol: {}", symbol);
                }
            }
            if pool.asset_a == pool.asset_b {
                bail!("pool must pair two different assets, got {} twice", pool.asset_a);
            }
            if (pool.initial_a == 0) != (pool.initial_b == 0) {
                bail!(
                    "pool {}/{} must seed both sides or neither",
                    pool.asset_a,
                    pool.asset_b
                );
            }
        }

        Ok(())
    }

    /// Look up an asset entry by symbol
    pub fn asset(&self, symbol: &str) -> Option<&AssetConfig> {
        self.assets.iter().find(|a| a.symbol == symbol)
    }
}

/// Convenience function to load configuration from the default location
pub fn load_config() -> Result<ExchangeConfig> {
    ExchangeConfig::load(None)
}
