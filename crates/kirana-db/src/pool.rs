//! # Database Pool Management
//!
//! Opens the SQLite pool the repositories and the bill transaction share.
//!
//! ## Who Waits for Whom
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                  SqlitePool (max_connections)                           │
//! │                                                                         │
//! │  create_bill A ──► conn 1 ── BEGIN ... UPDATE stock ... COMMIT          │
//! │  create_bill B ──► conn 2 ── BEGIN ... UPDATE stock                     │
//! │                                   │                                     │
//! │                                   └── write lock held by A:             │
//! │                                       wait up to busy_timeout,          │
//! │                                       then SQLITE_BUSY ──► retry B      │
//! │                                                                         │
//! │  list_products ──► conn 3 ── SELECT  (WAL snapshot, never waits)        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! File databases run in WAL mode. The in-memory target is a single
//! private connection, used by tests.

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::billing::BillingService;
use crate::error::{DbError, DbResult};
use crate::migrations;
use crate::repository::bill::BillRepository;
use crate::repository::contact::ContactRepository;
use crate::repository::counter::CounterRepository;
use crate::repository::product::ProductRepository;

/// Path spelling that selects the in-memory target.
const MEMORY_PATH: &str = ":memory:";

// =============================================================================
// Configuration
// =============================================================================

/// Where the data lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DbTarget {
    /// SQLite file, created on first open.
    File(PathBuf),
    /// Private in-memory database; gone when the pool closes.
    Memory,
}

/// Database configuration.
///
/// ```rust,ignore
/// let config = DbConfig::new("/var/lib/kirana/shop.db")
///     .max_connections(8)
///     .busy_timeout(Duration::from_secs(2));
/// ```
#[derive(Debug, Clone)]
pub struct DbConfig {
    pub target: DbTarget,

    /// Default: 5
    pub max_connections: u32,

    /// Default: 1
    pub min_connections: u32,

    /// How long a caller waits for a free pooled connection. Default: 30s
    pub acquire_timeout: Duration,

    /// Default: 10 minutes
    pub idle_timeout: Duration,

    /// How long a statement waits on another connection's write lock
    /// before SQLite reports BUSY. Default: 5s
    pub busy_timeout: Duration,

    /// Apply pending migrations when the pool opens. Default: true
    pub run_migrations: bool,
}

impl DbConfig {
    /// File-backed configuration. The path `:memory:` selects [`DbTarget::Memory`].
    pub fn new(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let target = if path.as_os_str() == MEMORY_PATH {
            DbTarget::Memory
        } else {
            DbTarget::File(path.to_path_buf())
        };

        DbConfig {
            target,
            max_connections: 5,
            min_connections: 1,
            acquire_timeout: Duration::from_secs(30),
            idle_timeout: Duration::from_secs(600),
            busy_timeout: Duration::from_secs(5),
            run_migrations: true,
        }
    }

    /// A fresh, isolated in-memory database.
    pub fn in_memory() -> Self {
        DbConfig {
            acquire_timeout: Duration::from_secs(5),
            busy_timeout: Duration::from_secs(1),
            ..DbConfig::new(MEMORY_PATH)
        }
    }

    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    pub fn min_connections(mut self, min: u32) -> Self {
        self.min_connections = min;
        self
    }

    pub fn acquire_timeout(mut self, timeout: Duration) -> Self {
        self.acquire_timeout = timeout;
        self
    }

    pub fn busy_timeout(mut self, timeout: Duration) -> Self {
        self.busy_timeout = timeout;
        self
    }

    pub fn run_migrations(mut self, run: bool) -> Self {
        self.run_migrations = run;
        self
    }

    /// Pool size actually used. Every in-memory connection would open its
    /// own empty database, so that target is pinned to one.
    fn pool_size(&self) -> (u32, u32) {
        match self.target {
            DbTarget::Memory => (1, 1),
            DbTarget::File(_) => (
                self.max_connections.max(1),
                self.min_connections.min(self.max_connections.max(1)),
            ),
        }
    }

    /// SQLite options applied to every pooled connection.
    fn connect_options(&self) -> DbResult<SqliteConnectOptions> {
        let options = match &self.target {
            DbTarget::Memory => SqliteConnectOptions::from_str("sqlite::memory:")
                .map_err(|e| DbError::ConnectionFailed(e.to_string()))?,
            DbTarget::File(path) => SqliteConnectOptions::new()
                .filename(path)
                .create_if_missing(true)
                .journal_mode(SqliteJournalMode::Wal),
        };

        Ok(options
            .synchronous(SqliteSynchronous::Normal)
            .foreign_keys(true)
            .busy_timeout(self.busy_timeout))
    }

    fn describe(&self) -> String {
        match &self.target {
            DbTarget::Memory => MEMORY_PATH.to_string(),
            DbTarget::File(path) => path.display().to_string(),
        }
    }
}

// =============================================================================
// Database
// =============================================================================

/// Handle to the pool; hands out repositories and the bill service.
///
/// Cloning shares the pool.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Opens the pool and, unless disabled, applies migrations.
    pub async fn new(config: DbConfig) -> DbResult<Self> {
        let (max_connections, min_connections) = config.pool_size();
        info!(db = %config.describe(), max_connections, "Opening database");

        let options = config.connect_options()?;
        debug!(busy_timeout_ms = config.busy_timeout.as_millis() as u64, "Connect options ready");

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(config.acquire_timeout)
            .idle_timeout(Some(config.idle_timeout))
            .connect_with(options)
            .await
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?;

        let db = Database { pool };
        if config.run_migrations {
            db.run_migrations().await?;
        }

        Ok(db)
    }

    /// Applies pending migrations; already-applied ones are skipped.
    pub async fn run_migrations(&self) -> DbResult<()> {
        migrations::run_migrations(&self.pool).await
    }

    /// Raw pool, for diagnostics and the bill transaction.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn counters(&self) -> CounterRepository {
        CounterRepository::new(self.pool.clone())
    }

    /// ```rust,ignore
    /// let low = db.products().list_low_stock().await?;
    /// ```
    pub fn products(&self) -> ProductRepository {
        ProductRepository::new(self.pool.clone())
    }

    pub fn bills(&self) -> BillRepository {
        BillRepository::new(self.pool.clone())
    }

    pub fn contacts(&self) -> ContactRepository {
        ContactRepository::new(self.pool.clone())
    }

    /// Bill transaction service with the default retry budget.
    pub fn billing(&self) -> BillingService {
        BillingService::new(self.pool.clone())
    }

    /// Closes every connection; later queries fail.
    pub async fn close(&self) {
        info!("Closing database pool");
        self.pool.close().await;
    }

    /// True when a trivial query succeeds.
    pub async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_database_is_migrated() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        assert!(db.health_check().await);
        assert_eq!(db.products().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_closed_database_is_unhealthy() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.close().await;

        assert!(!db.health_check().await);
    }

    #[test]
    fn test_memory_path_selects_memory_target() {
        assert_eq!(DbConfig::new(":memory:").target, DbTarget::Memory);
        assert_eq!(DbConfig::in_memory().target, DbTarget::Memory);
        assert_eq!(
            DbConfig::new("shop.db").target,
            DbTarget::File(PathBuf::from("shop.db"))
        );
    }

    #[test]
    fn test_pool_size() {
        let memory = DbConfig::in_memory().max_connections(8);
        assert_eq!(memory.pool_size(), (1, 1));

        let file = DbConfig::new("shop.db").max_connections(0).min_connections(3);
        assert_eq!(file.pool_size(), (1, 1));

        let file = DbConfig::new("shop.db")
            .max_connections(10)
            .min_connections(2)
            .busy_timeout(Duration::from_millis(250));
        assert_eq!(file.pool_size(), (10, 2));
        assert_eq!(file.busy_timeout, Duration::from_millis(250));
    }
}
