//! # Configuration State
//!
//! Request-time defaults taken from [`AppConfig`] at startup.
//! Read-only after initialization, so no mutex needed.

use kirana_core::{DEFAULT_CONTACT_LIMIT, DEFAULT_MIN_STOCK_LEVEL};

use crate::config::AppConfig;

/// Defaults applied by handlers when the caller leaves a field out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfigState {
    /// `minStockLevel` for new products
    pub low_stock_default: i64,

    /// Page size for the contact listing
    pub contact_limit: u32,
}

impl Default for ConfigState {
    fn default() -> Self {
        ConfigState {
            low_stock_default: DEFAULT_MIN_STOCK_LEVEL,
            contact_limit: DEFAULT_CONTACT_LIMIT,
        }
    }
}

impl From<&AppConfig> for ConfigState {
    fn from(config: &AppConfig) -> Self {
        ConfigState {
            low_stock_default: config.low_stock_default,
            contact_limit: config.contact_limit,
        }
    }
}
