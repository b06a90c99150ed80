//! # Store Errors
//!
//! What can go wrong between a repository call and SQLite, sorted into
//! the cases callers actually branch on.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  sqlx::Error                                                            │
//! │     │                                                                   │
//! │     ├── RowNotFound ──────────────► NotFound                            │
//! │     ├── Database(code, message)                                         │
//! │     │      ├── BUSY / LOCKED ─────► Busy  ──► bill retry loop           │
//! │     │      ├── UNIQUE ────────────► UniqueViolation                     │
//! │     │      ├── FOREIGN KEY ───────► ForeignKeyViolation                 │
//! │     │      ├── CHECK ─────────────► CheckViolation (stock < 0)          │
//! │     │      └── anything else ─────► QueryFailed                         │
//! │     ├── PoolTimedOut ─────────────► PoolExhausted ──► retry loop        │
//! │     └── the rest ─────────────────► Internal                            │
//! │                                                                         │
//! │  CoreError (rules checked in Rust) ──► Domain                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use kirana_core::{CoreError, ValidationError};
use thiserror::Error;

// Primary result codes. sqlx hands back extended codes such as
// BUSY_SNAPSHOT (517) or LOCKED_SHAREDCACHE (262); the low byte is primary.
const SQLITE_BUSY: i32 = 5;
const SQLITE_LOCKED: i32 = 6;

#[derive(Debug, Error)]
pub enum DbError {
    /// A lookup by key came back empty.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Second row for a key that must be unique (`<table>.<column>`).
    #[error("Duplicate value for {column}")]
    UniqueViolation { column: String },

    #[error("Foreign key violation: {message}")]
    ForeignKeyViolation { message: String },

    /// A column CHECK fired. For products this is the `stock >= 0` backstop
    /// behind the guarded decrement.
    #[error("Constraint violation: {message}")]
    CheckViolation { message: String },

    /// The write lock stayed taken past busy_timeout, or a WAL snapshot went
    /// stale mid-transaction.
    #[error("Database busy: {0}")]
    Busy(String),

    /// Rejected by a billing or inventory rule rather than by SQLite.
    #[error(transparent)]
    Domain(#[from] CoreError),

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// No pooled connection freed up within acquire_timeout.
    #[error("Connection pool exhausted")]
    PoolExhausted,

    #[error("Internal database error: {0}")]
    Internal(String),
}

impl DbError {
    pub fn not_found(entity: impl Into<String>, id: impl ToString) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    /// Contention a fresh transaction may get past.
    pub fn is_retryable(&self) -> bool {
        matches!(self, DbError::Busy(_) | DbError::PoolExhausted)
    }
}

fn is_busy_code(code: Option<&str>) -> bool {
    code.and_then(|c| c.parse::<i32>().ok())
        .is_some_and(|c| matches!(c & 0xff, SQLITE_BUSY | SQLITE_LOCKED))
}

/// Sorts a SQLite error by result code first, then by the constraint named
/// in its message.
fn classify(code: Option<&str>, message: &str) -> DbError {
    if is_busy_code(code) || message.contains("database is locked") {
        return DbError::Busy(message.to_string());
    }

    if let Some(column) = message.strip_prefix("UNIQUE constraint failed: ") {
        DbError::UniqueViolation {
            column: column.to_string(),
        }
    } else if message.contains("FOREIGN KEY constraint failed") {
        DbError::ForeignKeyViolation {
            message: message.to_string(),
        }
    } else if message.contains("CHECK constraint failed") {
        DbError::CheckViolation {
            message: message.to_string(),
        }
    } else {
        DbError::QueryFailed(message.to_string())
    }
}

impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::not_found("Row", "unknown"),
            sqlx::Error::Database(db_err) => classify(db_err.code().as_deref(), db_err.message()),
            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,
            sqlx::Error::PoolClosed => DbError::ConnectionFailed("pool is closed".to_string()),
            other => DbError::Internal(other.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

impl From<ValidationError> for DbError {
    fn from(err: ValidationError) -> Self {
        DbError::Domain(CoreError::Validation(err))
    }
}

pub type DbResult<T> = Result<T, DbError>;
