//! # POS Configuration
//!
//! Settings for the ledger and checkout services.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     CARPET_LOCATION=main         CARPET_TAX_RATE=8.25%                 │
//! │     CARPET_ACTOR_ID=clerk-1      CARPET_DISCOUNT_RATE=5                │
//! │     CARPET_DB_PATH=./carpet.db   CARPET_LOG=debug                      │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/carpet-pos/pos.toml (Linux)                              │
//! │     ~/Library/Application Support/com.carpet.pos/pos.toml (macOS)      │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! [store]
//! location = "main"
//! actor_id = "clerk-1"
//!
//! [checkout]
//! tax_bps = 500            # 5%
//! discount_bps = 0
//! walk_in_name = "Walk-in Customer"
//! walk_in_email_domain = "walkin.carpet.local"
//!
//! [database]
//! path = "./carpet.db"
//! max_connections = 5
//! invoice_prefix = "INV"
//!
//! [logging]
//! filter = "info,carpet=debug,sqlx=warn"
//! ```

use carpet_core::validation::{validate_bps, ValidationResult};
use carpet_core::{Percentage, DEFAULT_INVOICE_PREFIX};
use carpet_db::DbConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::telemetry::DEFAULT_LOG_FILTER;

pub const ENV_LOCATION: &str = "CARPET_LOCATION";
pub const ENV_ACTOR_ID: &str = "CARPET_ACTOR_ID";
pub const ENV_TAX_RATE: &str = "CARPET_TAX_RATE";
pub const ENV_DISCOUNT_RATE: &str = "CARPET_DISCOUNT_RATE";
pub const ENV_DB_PATH: &str = "CARPET_DB_PATH";
pub const ENV_LOG: &str = "CARPET_LOG";

const CONFIG_FILE_NAME: &str = "pos.toml";

// =============================================================================
// Errors
// =============================================================================

/// Configuration loading and saving errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Failed to load config: {0}")]
    LoadFailed(String),

    #[error("Failed to save config: {0}")]
    SaveFailed(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        ConfigError::LoadFailed(err.to_string())
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::LoadFailed(err.to_string())
    }
}

impl From<toml::ser::Error> for ConfigError {
    fn from(err: toml::ser::Error) -> Self {
        ConfigError::SaveFailed(err.to_string())
    }
}

// =============================================================================
// Sections
// =============================================================================

/// Where sales happen and who makes them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreSettings {
    /// Stamped on customers, invoices and movements.
    #[serde(default = "default_location")]
    pub location: String,

    /// Actor recorded as `created_by`.
    #[serde(default = "default_actor_id")]
    pub actor_id: String,
}

fn default_location() -> String {
    "main".to_string()
}

fn default_actor_id() -> String {
    "pos".to_string()
}

impl Default for StoreSettings {
    fn default() -> Self {
        StoreSettings {
            location: default_location(),
            actor_id: default_actor_id(),
        }
    }
}

/// Defaults applied at checkout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckoutSettings {
    /// Invoice-level tax in basis points.
    #[serde(default)]
    pub tax_bps: u32,

    /// Invoice-level discount in basis points, on top of line discounts.
    #[serde(default)]
    pub discount_bps: u32,

    /// Name used when the cashier leaves the customer name blank.
    #[serde(default = "default_walk_in_name")]
    pub walk_in_name: String,

    /// Domain of the generated walk-in email addresses.
    #[serde(default = "default_walk_in_email_domain")]
    pub walk_in_email_domain: String,
}

fn default_walk_in_name() -> String {
    "Walk-in Customer".to_string()
}

fn default_walk_in_email_domain() -> String {
    "walkin.carpet.local".to_string()
}

impl Default for CheckoutSettings {
    fn default() -> Self {
        CheckoutSettings {
            tax_bps: 0,
            discount_bps: 0,
            walk_in_name: default_walk_in_name(),
            walk_in_email_domain: default_walk_in_email_domain(),
        }
    }
}

impl CheckoutSettings {
    /// The configured tax rate. Settings can be edited after load, so the
    /// range is checked again on every read.
    pub fn tax(&self) -> ValidationResult<Percentage> {
        rate("checkout.tax_bps", self.tax_bps)
    }

    pub fn discount(&self) -> ValidationResult<Percentage> {
        rate("checkout.discount_bps", self.discount_bps)
    }
}

fn rate(field: &str, bps: u32) -> ValidationResult<Percentage> {
    validate_bps(field, bps)?;
    Percentage::try_from_bps(bps)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatabaseSettings {
    #[serde(default = "default_db_path")]
    pub path: PathBuf,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    #[serde(default = "default_invoice_prefix")]
    pub invoice_prefix: String,
}

fn default_db_path() -> PathBuf {
    directories::ProjectDirs::from("com", "carpet", "pos")
        .map(|dirs| dirs.data_dir().join("carpet.db"))
        .unwrap_or_else(|| PathBuf::from("carpet.db"))
}

fn default_max_connections() -> u32 {
    5
}

fn default_invoice_prefix() -> String {
    DEFAULT_INVOICE_PREFIX.to_string()
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        DatabaseSettings {
            path: default_db_path(),
            max_connections: default_max_connections(),
            invoice_prefix: default_invoice_prefix(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// `EnvFilter` directives; `RUST_LOG` wins when set.
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

fn default_log_filter() -> String {
    DEFAULT_LOG_FILTER.to_string()
}

impl Default for LoggingSettings {
    fn default() -> Self {
        LoggingSettings {
            filter: default_log_filter(),
        }
    }
}

// =============================================================================
// Main POS Configuration
// =============================================================================

/// Complete POS configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PosConfig {
    #[serde(default)]
    pub store: StoreSettings,

    #[serde(default)]
    pub checkout: CheckoutSettings,

    #[serde(default)]
    pub database: DatabaseSettings,

    #[serde(default)]
    pub logging: LoggingSettings,
}

impl PosConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (pos.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> ConfigResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading POS config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = Self::from_toml(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns defaults if loading fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load POS config: {}. Using defaults.", e);
            Self::default()
        })
    }

    pub fn from_toml(contents: &str) -> ConfigResult<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Saves configuration as pretty TOML.
    pub fn save(&self, config_path: Option<PathBuf>) -> ConfigResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| ConfigError::SaveFailed("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| ConfigError::SaveFailed(e.to_string()))?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents).map_err(|e| ConfigError::SaveFailed(e.to_string()))?;

        info!(?path, "POS config saved");
        Ok(())
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.store.location.trim().is_empty() {
            return Err(ConfigError::Invalid("store.location must not be empty".into()));
        }
        if self.store.actor_id.trim().is_empty() {
            return Err(ConfigError::Invalid("store.actor_id must not be empty".into()));
        }

        for (field, bps) in [
            ("checkout.tax_bps", self.checkout.tax_bps),
            ("checkout.discount_bps", self.checkout.discount_bps),
        ] {
            Percentage::try_from_bps(bps)
                .map_err(|_| ConfigError::Invalid(format!("{} must be 0..=10000, got {}", field, bps)))?;
        }

        if !self.checkout.walk_in_email_domain.contains('.')
            || self.checkout.walk_in_email_domain.contains('@')
        {
            return Err(ConfigError::Invalid(format!(
                "checkout.walk_in_email_domain is not a domain: '{}'",
                self.checkout.walk_in_email_domain
            )));
        }

        if self.database.max_connections == 0 {
            return Err(ConfigError::Invalid(
                "database.max_connections must be greater than 0".into(),
            ));
        }

        Ok(())
    }

    /// Applies `CARPET_*` overrides from `lookup`.
    ///
    /// Unparseable rates are logged and ignored.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(location) = lookup(ENV_LOCATION) {
            debug!(location = %location, "Overriding location from environment");
            self.store.location = location;
        }

        if let Some(actor) = lookup(ENV_ACTOR_ID) {
            self.store.actor_id = actor;
        }

        if let Some(rate) = lookup(ENV_TAX_RATE) {
            match rate.parse::<Percentage>() {
                Ok(pct) => self.checkout.tax_bps = pct.bps(),
                Err(e) => warn!(value = %rate, error = %e, "Ignoring {}", ENV_TAX_RATE),
            }
        }

        if let Some(rate) = lookup(ENV_DISCOUNT_RATE) {
            match rate.parse::<Percentage>() {
                Ok(pct) => self.checkout.discount_bps = pct.bps(),
                Err(e) => warn!(value = %rate, error = %e, "Ignoring {}", ENV_DISCOUNT_RATE),
            }
        }

        if let Some(path) = lookup(ENV_DB_PATH) {
            debug!(path = %path, "Overriding database path from environment");
            self.database.path = PathBuf::from(path);
        }

        if let Some(filter) = lookup(ENV_LOG) {
            self.logging.filter = filter;
        }
    }

    /// Returns the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "carpet", "pos")
            .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
    }

    /// Database settings as a pool configuration.
    pub fn db_config(&self) -> DbConfig {
        DbConfig::new(&self.database.path)
            .max_connections(self.database.max_connections)
            .invoice_number_prefix(&self.database.invoice_prefix)
    }
}
