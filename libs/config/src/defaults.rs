//! Default values and constants
//!
//! Shared by configuration loading and by callers that build an exchange
//! without a config file (tests, embedded hosts).

/// Exchange defaults
pub mod exchange {
    /// Swap fee tier (0.3%)
    pub const FEE_BPS: u32 = 30;

    /// Fee denominator; a fee must stay strictly below it
    pub const MAX_FEE_BPS: u32 = 10_000;

    /// Decimals assumed for an asset entry that omits them
    pub const ASSET_DECIMALS: u8 = 18;
}

/// Logging defaults
pub mod logging {
    pub const LEVEL: &str = "info";

    /// Environment variable consulted before the configured level
    pub const FILTER_ENV: &str = "RUST_LOG";
}

/// Configuration loading
pub mod loading {
    /// Config file used when no path is given
    pub const DEFAULT_CONFIG_PATH: &str = "config/exchange.toml";

    /// Prefix for environment overrides, e.g. `DEX__EXCHANGE__FEE_BPS=25`
    pub const ENV_PREFIX: &str = "DEX";

    pub const ENV_SEPARATOR: &str = "__";
}
