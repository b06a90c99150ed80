//! Service configuration.
//!
//! Configuration is loaded from environment variables with fallback to defaults.
//!
//! | Variable                   | Default                          |
//! |----------------------------|----------------------------------|
//! | `KIRANA_DB_PATH`           | `./kirana.db`                    |
//! | `KIRANA_MAX_CONNECTIONS`   | `5`                              |
//! | `KIRANA_BILL_RETRIES`      | `4`                              |
//! | `KIRANA_LOW_STOCK_DEFAULT` | `5`                              |
//! | `KIRANA_CONTACT_LIMIT`     | `20`                             |
//! | `KIRANA_LOG`               | `info,kirana=debug,sqlx=warn`    |

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use kirana_core::{DEFAULT_CONTACT_LIMIT, DEFAULT_MIN_STOCK_LEVEL, MAX_LIST_LIMIT};

/// Default tracing filter when `KIRANA_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "info,kirana=debug,sqlx=warn";

/// Service configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// SQLite database file
    pub db_path: PathBuf,

    /// Connection pool size
    pub max_connections: u32,

    /// Extra attempts for a bill transaction that hit lock contention
    pub bill_retries: u32,

    /// `minStockLevel` for products created without one
    pub low_stock_default: i64,

    /// Contacts returned when the caller gives no limit
    pub contact_limit: u32,

    /// tracing-subscriber `EnvFilter` directives
    pub log_filter: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            db_path: PathBuf::from("./kirana.db"),
            max_connections: 5,
            bill_retries: 4,
            low_stock_default: DEFAULT_MIN_STOCK_LEVEL,
            contact_limit: DEFAULT_CONTACT_LIMIT,
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from any key lookup (environment, a map in tests).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = AppConfig::default();

        let config = AppConfig {
            db_path: lookup("KIRANA_DB_PATH")
                .filter(|p| !p.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or(defaults.db_path),

            max_connections: parse_or(&lookup, "KIRANA_MAX_CONNECTIONS", defaults.max_connections)?,

            bill_retries: parse_or(&lookup, "KIRANA_BILL_RETRIES", defaults.bill_retries)?,

            low_stock_default: parse_or(
                &lookup,
                "KIRANA_LOW_STOCK_DEFAULT",
                defaults.low_stock_default,
            )?,

            contact_limit: parse_or(&lookup, "KIRANA_CONTACT_LIMIT", defaults.contact_limit)?,

            log_filter: lookup("KIRANA_LOG")
                .filter(|f| !f.trim().is_empty())
                .unwrap_or(defaults.log_filter),
        };

        config.validate()?;
        Ok(config)
    }

    /// Checks value ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_connections == 0 {
            return Err(ConfigError::OutOfRange {
                key: "KIRANA_MAX_CONNECTIONS".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }

        if self.low_stock_default < 0 {
            return Err(ConfigError::OutOfRange {
                key: "KIRANA_LOW_STOCK_DEFAULT".to_string(),
                reason: "must not be negative".to_string(),
            });
        }

        if self.contact_limit == 0 || self.contact_limit > MAX_LIST_LIMIT {
            return Err(ConfigError::OutOfRange {
                key: "KIRANA_CONTACT_LIMIT".to_string(),
                reason: format!("must be between 1 and {}", MAX_LIST_LIMIT),
            });
        }

        Ok(())
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
            key: key.to_string(),
            value: raw,
        }),
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: '{value}'")]
    InvalidValue { key: String, value: String },

    #[error("{key} {reason}")]
    OutOfRange { key: String, reason: String },
}
