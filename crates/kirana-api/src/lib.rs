//! # kirana-api: Request Boundary for Kirana Billing
//!
//! Framework-free command handlers that a transport (HTTP router, IPC
//! bridge, CLI) wires to its routes.
//!
//! ## Startup Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Application Startup                                  │
//! │                                                                         │
//! │  1. AppConfig::load()                                                   │
//! │     └── KIRANA_* environment variables, validated                       │
//! │                                                                         │
//! │  2. init_tracing(&config)                                               │
//! │     └── RUST_LOG wins, then KIRANA_LOG, then the default filter         │
//! │                                                                         │
//! │  3. start(&config)                                                      │
//! │     ├── Open SQLite pool (WAL) and run migrations                       │
//! │     └── Build DbState and ConfigState                                   │
//! │                                                                         │
//! │  4. Transport routes requests to commands::*                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust,ignore
//! let config = AppConfig::load()?;
//! kirana_api::init_tracing(&config);
//! let (db, settings) = kirana_api::start(&config).await?;
//!
//! let request = commands::parse_body(body)?;
//! let response = commands::create_bill(&db, request).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod commands;
pub mod config;
pub mod error;
pub mod state;

// =============================================================================
// Re-exports
// =============================================================================

pub use commands::{parse_body, ApiResponse};
pub use config::{AppConfig, ConfigError};
pub use error::{ApiError, ErrorType, StartupError};
pub use state::{ConfigState, DbState};

use tracing::info;
use tracing_subscriber::EnvFilter;

use kirana_db::{Database, DbConfig};

/// Initializes the tracing subscriber for logging.
///
/// ## Log Levels
/// - `RUST_LOG` overrides everything when set
/// - Otherwise `config.log_filter` (`KIRANA_LOG`, default
///   `info,kirana=debug,sqlx=warn`)
///
/// Safe to call more than once; later calls leave the first subscriber.
pub fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_filter));

    if tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .is_err()
    {
        tracing::debug!("Tracing subscriber already installed");
    }
}

/// Opens the database and builds the handler state.
pub async fn start(config: &AppConfig) -> Result<(DbState, ConfigState), StartupError> {
    config.validate()?;

    info!(
        db_path = %config.db_path.display(),
        max_connections = config.max_connections,
        "Starting Kirana billing service"
    );

    let db_config = DbConfig::new(&config.db_path).max_connections(config.max_connections);
    let db = Database::new(db_config).await?;

    info!("Database initialized successfully");

    Ok((
        DbState::new(db, config.bill_retries),
        ConfigState::from(config),
    ))
}
