//! # Database State
//!
//! Wraps the `Database` connection for use in command handlers.
//!
//! ## Thread Safety
//! The `Database` struct from `kirana-db` contains a `SqlitePool` which
//! is thread-safe. Handlers can run concurrently without extra locking;
//! conflicting bill writes are serialised by SQLite and retried.

use kirana_db::{BillingService, Database};

/// Wrapper around `Database` plus the bill retry budget.
#[derive(Debug)]
pub struct DbState {
    db: Database,
    bill_attempts: u32,
}

impl DbState {
    /// Creates a new DbState; `bill_retries` extra attempts follow the first.
    pub fn new(db: Database, bill_retries: u32) -> Self {
        DbState {
            db,
            bill_attempts: bill_retries.saturating_add(1),
        }
    }

    /// Returns a reference to the inner Database.
    pub fn inner(&self) -> &Database {
        &self.db
    }

    /// Bill transaction service using the configured retry budget.
    pub fn billing(&self) -> BillingService {
        self.db.billing().max_attempts(self.bill_attempts)
    }
}
