//! # Counter Repository
//!
//! Named monotonic sequences (`productId`, `billNumber`).
//!
//! ```text
//! INSERT ... ON CONFLICT DO UPDATE ... RETURNING
//!   ├── row absent  → inserted with sequence 1
//!   └── row present → sequence + 1
//! ```
//!
//! One statement does the read-modify-write, so two callers never see the
//! same value. When called inside a transaction the increment commits or
//! rolls back with it.

use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::DbResult;
use kirana_core::Counter;

/// Repository for named counters.
#[derive(Debug, Clone)]
pub struct CounterRepository {
    pool: SqlitePool,
}

impl CounterRepository {
    /// Creates a new CounterRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CounterRepository { pool }
    }

    /// Increments the counter and returns the new value.
    pub async fn next(&self, counter: Counter) -> DbResult<i64> {
        let mut conn = self.pool.acquire().await?;
        Self::next_in(&mut conn, counter).await
    }

    /// Returns the last value handed out, 0 when the counter was never used.
    pub async fn current(&self, counter: Counter) -> DbResult<i64> {
        let sequence: Option<i64> =
            sqlx::query_scalar("SELECT sequence FROM counters WHERE name = ?1")
                .bind(counter.name())
                .fetch_optional(&self.pool)
                .await?;

        Ok(sequence.unwrap_or(0))
    }

    /// Increments the counter on an existing connection or transaction.
    pub async fn next_in(conn: &mut SqliteConnection, counter: Counter) -> DbResult<i64> {
        let sequence: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO counters (name, sequence) VALUES (?1, 1)
            ON CONFLICT (name) DO UPDATE SET sequence = sequence + 1
            RETURNING sequence
            "#,
        )
        .bind(counter.name())
        .fetch_one(&mut *conn)
        .await?;

        debug!(counter = counter.name(), sequence, "Counter advanced");
        Ok(sequence)
    }
}

#[cfg(test)]
mod tests {
    use crate::pool::{Database, DbConfig};
    use kirana_core::Counter;

    #[tokio::test]
    async fn test_counter_starts_at_one_and_increments() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let counters = db.counters();

        assert_eq!(counters.current(Counter::BillNumber).await.unwrap(), 0);
        assert_eq!(counters.next(Counter::BillNumber).await.unwrap(), 1);
        assert_eq!(counters.next(Counter::BillNumber).await.unwrap(), 2);
        assert_eq!(counters.current(Counter::BillNumber).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_counters_are_independent() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let counters = db.counters();

        counters.next(Counter::BillNumber).await.unwrap();
        counters.next(Counter::BillNumber).await.unwrap();
        assert_eq!(counters.next(Counter::ProductId).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_rolled_back_increment_is_not_consumed() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.counters().next(Counter::BillNumber).await.unwrap();

        let mut tx = db.pool().begin().await.unwrap();
        let seq = super::CounterRepository::next_in(&mut tx, Counter::BillNumber)
            .await
            .unwrap();
        assert_eq!(seq, 2);
        tx.rollback().await.unwrap();

        assert_eq!(db.counters().next(Counter::BillNumber).await.unwrap(), 2);
    }
}
