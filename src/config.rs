//! # Configuration
//!
//! Configuration of the liquidity provider service.
//!
//! # Configuration Sources
//!
//! Configuration is loaded in the following order (later sources override earlier):
//! 1. Default values
//! 2. Configuration file (if exists)
//! 3. Environment variables (prefixed with `LPS_`, sections separated by `__`)
//!
//! A `.env` file in the working directory is loaded into the environment first.
//!
//! # Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `LPS_CONFIG_FILE` | Configuration file path | `config.toml` |
//! | `LPS_LOG__LEVEL` | Log level | `info` |
//! | `LPS_LOG__FORMAT` | Log format (json/pretty) | `json` |
//! | `LPS_SIGNER__PRIVATE_KEY` | LP private key, hex | empty |
//! | `LPS_SIGNER__BTC_ADDRESS` | LP Bitcoin address | empty |
//! | `LPS_PEGOUT__EXPIRE_BLOCKS` | Pegout validity in blocks | `500` |
//! | `LPS_PEGIN__CALL_FOR_USER_EXTRA_GAS` | Extra gas of `callForUser` | `180000` |
//!
//! # Examples
//!
//! ```ignore
//! use liquidity_provider::config::LiquidityProviderConfig;
//!
//! let config = LiquidityProviderConfig::load()?;
//! config.validate()?;
//! println!("pegout max: {}", config.pegout.max_value);
//! ```

use crate::domain::services::liquidity_provider::{PeginConfiguration, PegoutConfiguration};
use crate::domain::value_objects::Wei;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Environment variable naming the configuration file.
pub const CONFIG_FILE_ENV: &str = "LPS_CONFIG_FILE";

const ENV_PREFIX: &str = "LPS";
const DEFAULT_CONFIG_FILE: &str = "config.toml";

// ============================================================================
// Configuration Errors
// ============================================================================

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A source could not be read or deserialized.
    #[error("failed to load config: {0}")]
    Load(#[from] config::ConfigError),

    /// Invalid configuration value.
    #[error("invalid config value for {field}: {message}")]
    InvalidValue {
        /// Field name.
        field: String,
        /// Error message.
        message: String,
    },
}

impl ConfigError {
    fn invalid(field: &str, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

// ============================================================================
// Logging Configuration
// ============================================================================

/// Log format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// JSON format (structured logging).
    #[default]
    Json,
    /// Pretty format (human-readable).
    Pretty,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// Log level or `EnvFilter` directive.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format.
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::Json,
        }
    }
}

// ============================================================================
// Signer Configuration
// ============================================================================

/// Keys and addresses of the LP.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct SignerConfig {
    /// Hex private key signing quotes and RSK transactions.
    #[serde(default)]
    pub private_key: String,

    /// Bitcoin address receiving pegin deposits and paying pegouts.
    #[serde(default)]
    pub btc_address: String,
}

impl std::fmt::Debug for SignerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignerConfig")
            .field("private_key", &"<redacted>")
            .field("btc_address", &self.btc_address)
            .finish()
    }
}

// ============================================================================
// Direction Configuration
// ============================================================================

/// Pegout limits, fees and watcher windows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PegoutConfig {
    /// Smallest quote value accepted, in wei.
    #[serde(default = "default_min_value")]
    pub min_value: Wei,

    /// Largest quote value accepted, in wei.
    #[serde(default = "default_max_value")]
    pub max_value: Wei,

    /// Fixed part of the call fee, in wei.
    #[serde(default)]
    pub fixed_fee: Wei,

    /// Percentage part of the call fee.
    #[serde(default)]
    pub fee_percentage: Decimal,

    /// Smallest refunded amount worth forwarding to the bridge, in wei.
    #[serde(default = "default_bridge_transaction_min")]
    pub bridge_transaction_min: Wei,

    /// RSK blocks a quote stays valid for.
    #[serde(default = "default_expire_blocks")]
    pub expire_blocks: u64,

    /// RSK blocks scanned for deposits on startup.
    #[serde(default = "default_deposit_cache_blocks")]
    pub deposit_cache_blocks: u64,
}

impl Default for PegoutConfig {
    fn default() -> Self {
        Self {
            min_value: default_min_value(),
            max_value: default_max_value(),
            fixed_fee: Wei::zero(),
            fee_percentage: Decimal::ZERO,
            bridge_transaction_min: default_bridge_transaction_min(),
            expire_blocks: default_expire_blocks(),
            deposit_cache_blocks: default_deposit_cache_blocks(),
        }
    }
}

impl PegoutConfig {
    /// Returns the part of the section the use cases consume.
    #[must_use]
    pub fn configuration(&self) -> PegoutConfiguration {
        PegoutConfiguration {
            min_value: self.min_value,
            max_value: self.max_value,
            fixed_fee: self.fixed_fee,
            fee_percentage: self.fee_percentage,
            bridge_transaction_min: self.bridge_transaction_min,
            expire_blocks: self.expire_blocks,
        }
    }
}

/// Pegin limits and fees.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeginConfig {
    /// Smallest quote value accepted, in wei.
    #[serde(default = "default_min_value")]
    pub min_value: Wei,

    /// Largest quote value accepted, in wei.
    #[serde(default = "default_max_value")]
    pub max_value: Wei,

    /// Fixed part of the call fee, in wei.
    #[serde(default)]
    pub fixed_fee: Wei,

    /// Percentage part of the call fee.
    #[serde(default)]
    pub fee_percentage: Decimal,

    /// Gas added on top of the quote gas limit for `callForUser`.
    #[serde(default = "default_call_for_user_extra_gas")]
    pub call_for_user_extra_gas: u64,
}

impl Default for PeginConfig {
    fn default() -> Self {
        Self {
            min_value: default_min_value(),
            max_value: default_max_value(),
            fixed_fee: Wei::zero(),
            fee_percentage: Decimal::ZERO,
            call_for_user_extra_gas: default_call_for_user_extra_gas(),
        }
    }
}

impl PeginConfig {
    /// Returns the part of the section the use cases consume.
    #[must_use]
    pub fn configuration(&self) -> PeginConfiguration {
        PeginConfiguration {
            min_value: self.min_value,
            max_value: self.max_value,
            fixed_fee: self.fixed_fee,
            fee_percentage: self.fee_percentage,
            call_for_user_extra_gas: self.call_for_user_extra_gas,
        }
    }
}

// ============================================================================
// Service Configuration
// ============================================================================

/// Complete configuration of the liquidity provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LiquidityProviderConfig {
    /// Logging configuration.
    #[serde(default)]
    pub log: LogConfig,

    /// LP keys.
    #[serde(default)]
    pub signer: SignerConfig,

    /// Pegout configuration.
    #[serde(default)]
    pub pegout: PegoutConfig,

    /// Pegin configuration.
    #[serde(default)]
    pub pegin: PeginConfig,

    /// RSK address collecting product fees, used in fee estimations.
    #[serde(default = "default_fee_collector_address")]
    pub fee_collector_address: String,
}

impl Default for LiquidityProviderConfig {
    fn default() -> Self {
        Self {
            log: LogConfig::default(),
            signer: SignerConfig::default(),
            pegout: PegoutConfig::default(),
            pegin: PeginConfig::default(),
            fee_collector_address: default_fee_collector_address(),
        }
    }
}

impl LiquidityProviderConfig {
    /// Loads `.env`, then the file named by `LPS_CONFIG_FILE` (default
    /// `config.toml`, optional) and the `LPS_` environment.
    ///
    /// # Errors
    ///
    /// Returns an error if a source cannot be read or deserialized.
    pub fn load() -> Result<Self, ConfigError> {
        // A missing .env is the normal case outside development.
        let _ = dotenvy::dotenv();
        let path =
            std::env::var(CONFIG_FILE_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());
        Self::from_path(&path)
    }

    /// Loads the file at `path` (optional) and the `LPS_` environment.
    ///
    /// # Errors
    ///
    /// Returns an error if a source cannot be read or deserialized.
    pub fn from_path(path: &str) -> Result<Self, ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;
        Ok(config.try_deserialize()?)
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log.level.to_lowercase().as_str()) {
            return Err(ConfigError::invalid(
                "log.level",
                format!(
                    "invalid log level '{}', must be one of: {:?}",
                    self.log.level, valid_levels
                ),
            ));
        }

        validate_bounds("pegout", self.pegout.min_value, self.pegout.max_value)?;
        validate_bounds("pegin", self.pegin.min_value, self.pegin.max_value)?;
        validate_percentage("pegout.fee_percentage", self.pegout.fee_percentage)?;
        validate_percentage("pegin.fee_percentage", self.pegin.fee_percentage)?;
        if self.pegout.expire_blocks == 0 {
            return Err(ConfigError::invalid(
                "pegout.expire_blocks",
                "must be greater than zero",
            ));
        }

        let key = self.signer.private_key.trim_start_matches("0x");
        if !key.is_empty() && (key.len() != 64 || !key.chars().all(|c| c.is_ascii_hexdigit())) {
            return Err(ConfigError::invalid(
                "signer.private_key",
                "must be 32 hex-encoded bytes",
            ));
        }
        if !crate::infrastructure::blockchain::is_rsk_address(&self.fee_collector_address) {
            return Err(ConfigError::invalid(
                "fee_collector_address",
                format!("'{}' is not an RSK address", self.fee_collector_address),
            ));
        }
        Ok(())
    }
}

fn validate_bounds(section: &str, min: Wei, max: Wei) -> Result<(), ConfigError> {
    if min > max {
        return Err(ConfigError::invalid(
            &format!("{section}.min_value"),
            format!("{min} is above max_value {max}"),
        ));
    }
    Ok(())
}

fn validate_percentage(field: &str, percentage: Decimal) -> Result<(), ConfigError> {
    if percentage.is_sign_negative() || percentage >= Decimal::ONE_HUNDRED {
        return Err(ConfigError::invalid(
            field,
            format!("{percentage} is not in [0, 100)"),
        ));
    }
    Ok(())
}

// ============================================================================
// Default Value Functions
// ============================================================================

fn default_log_level() -> String {
    "info".to_string()
}

/// 0.005 RBTC.
fn default_min_value() -> Wei {
    Wei::from(5_000_000_000_000_000u64)
}

/// 1 RBTC.
fn default_max_value() -> Wei {
    Wei::from(1_000_000_000_000_000_000u64)
}

/// 0.015 RBTC.
fn default_bridge_transaction_min() -> Wei {
    Wei::from(15_000_000_000_000_000u64)
}

fn default_expire_blocks() -> u64 {
    500
}

fn default_deposit_cache_blocks() -> u64 {
    1000
}

fn default_call_for_user_extra_gas() -> u64 {
    180_000
}

fn default_fee_collector_address() -> String {
    crate::infrastructure::blockchain::RSK_ZERO_ADDRESS.to_string()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn config_default() {
        let config = LiquidityProviderConfig::default();
        assert_eq!(config.log.level, "info");
        assert_eq!(config.log.format, LogFormat::Json);
        assert_eq!(config.pegout.expire_blocks, 500);
        assert_eq!(config.pegin.call_for_user_extra_gas, 180_000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn sections_map_to_configurations() {
        let config = LiquidityProviderConfig::default();
        let pegout = config.pegout.configuration();
        assert_eq!(pegout.max_value, config.pegout.max_value);
        assert_eq!(pegout.expire_blocks, 500);
        let pegin = config.pegin.configuration();
        assert_eq!(pegin.call_for_user_extra_gas, 180_000);
    }

    #[test]
    fn validate_invalid_log_level() {
        let mut config = LiquidityProviderConfig::default();
        config.log.level = "loud".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_inverted_bounds() {
        let mut config = LiquidityProviderConfig::default();
        config.pegin.min_value = Wei::from(10u64);
        config.pegin.max_value = Wei::from(9u64);
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("pegin.min_value"));
    }

    #[test]
    fn validate_fee_percentage() {
        let mut config = LiquidityProviderConfig::default();
        config.pegout.fee_percentage = Decimal::ONE_HUNDRED;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_private_key_format() {
        let mut config = LiquidityProviderConfig::default();
        config.signer.private_key = "0x1234".to_string();
        assert!(config.validate().is_err());

        config.signer.private_key = format!("0x{}", "ab".repeat(32));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn signer_debug_hides_key() {
        let signer = SignerConfig {
            private_key: "secret".to_string(),
            btc_address: "mzBc4XEFSdzCDcTxAgf6EZXgsZWpztRhef".to_string(),
        };
        assert!(!format!("{signer:?}").contains("secret"));
    }

    #[test]
    fn loads_toml_file() {
        let path = std::env::temp_dir().join(format!("lps-{}.toml", uuid::Uuid::new_v4()));
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            "[log]\nformat = \"pretty\"\n\n[pegout]\nmax_value = \"2000\"\nfee_percentage = \"1.5\"\nexpire_blocks = 20\n"
        )
        .unwrap();

        let config = LiquidityProviderConfig::from_path(path.to_str().unwrap()).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(config.log.format, LogFormat::Pretty);
        assert_eq!(config.pegout.max_value, Wei::from(2_000u64));
        assert_eq!(config.pegout.fee_percentage, Decimal::new(15, 1));
        assert_eq!(config.pegout.expire_blocks, 20);
        assert_eq!(config.pegin.call_for_user_extra_gas, 180_000);
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let config = LiquidityProviderConfig::from_path("/nonexistent/lps-config").unwrap();
        assert_eq!(config.pegout.deposit_cache_blocks, 1000);
    }
}
