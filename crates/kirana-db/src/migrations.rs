//! # Schema Migrations
//!
//! The SQL under `migrations/sqlite/` is compiled into the binary and
//! applied on open. sqlx records each file's checksum in
//! `_sqlx_migrations`, so an edited file that was already applied fails
//! the next startup instead of drifting silently.
//!
//! ```text
//! 001_initial_schema.sql
//!   counters        name PK, sequence       (productId, billNumber)
//!   products        stock CHECK (stock >= 0), prices in paise
//!   bills           bill_number PK, sequence UNIQUE
//!   bill_items      (bill_number, position) PK, name and price snapshot
//!   contacts        mobile_number PK, last_used
//! ```
//!
//! Schema changes go in a new `NNN_description.sql`; applied files stay
//! as they are.

use sqlx::SqlitePool;
use tracing::info;

use crate::error::DbResult;

static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../../migrations/sqlite");

/// Applies whatever is pending, in filename order.
pub async fn run_migrations(pool: &SqlitePool) -> DbResult<()> {
    info!(embedded = MIGRATOR.migrations.len(), "Applying pending migrations");

    MIGRATOR.run(pool).await?;

    info!("Schema up to date");
    Ok(())
}

/// `(embedded, applied)`. Equal counts mean the schema is current.
pub async fn migration_status(pool: &SqlitePool) -> DbResult<(usize, usize)> {
    let total = MIGRATOR.migrations.len();

    let applied: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM _sqlx_migrations WHERE success = 1")
        .fetch_one(pool)
        .await?;

    Ok((total, applied as usize))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    #[tokio::test]
    async fn test_all_migrations_applied() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let (total, applied) = migration_status(db.pool()).await.unwrap();
        assert!(total >= 1);
        assert_eq!(total, applied);
    }

    #[tokio::test]
    async fn test_rerun_is_idempotent() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.run_migrations().await.unwrap();

        let (total, applied) = migration_status(db.pool()).await.unwrap();
        assert_eq!(total, applied);
    }
}
