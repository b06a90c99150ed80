//! # Bill Transaction
//!
//! Creates a bill as one all-or-nothing unit: validate every line against
//! live stock, take the stock, number and store the bill, remember the
//! customer.
//!
//! ## Transaction Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       create_bill(request)                              │
//! │                                                                         │
//! │  precheck (no transaction)                                             │
//! │  ├── customerName / mobileNumber ──► ValidationError                   │
//! │  └── items empty                  ──► EmptyOrder                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  BEGIN ◄─────────────────────────────────────────────┐                 │
//! │  ├── per line: parse → fetch (cached) → check_line    │                 │
//! │  │     └── InvalidLine / NotFound / InsufficientStock ──► ROLLBACK      │
//! │  ├── guarded decrement per product (stock >= qty)     │                 │
//! │  ├── next(billNumber) + INSERT bill, bill_items       │                 │
//! │  ├── SAVEPOINT contact insert-if-absent               │                 │
//! │  │     └── failure: ROLLBACK TO SAVEPOINT, warn, go on │                 │
//! │  └── COMMIT                                           │                 │
//! │       │                                               │                 │
//! │       └── BUSY / LOCKED anywhere ──► backoff ─────────┘ (bounded)      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every retry starts from a fresh transaction and re-reads stock, so a
//! bill that lost the race for the last unit fails with `InsufficientStock`
//! on its next attempt.

use std::time::Duration;

use backoff::backoff::Backoff;
use backoff::ExponentialBackoff;
use chrono::{DateTime, Utc};
use sqlx::{Connection, SqliteConnection, SqlitePool};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::error::{DbError, DbResult};
use crate::repository::bill::BillRepository;
use crate::repository::contact::ContactRepository;
use crate::repository::product::ProductRepository;
use kirana_core::order::{parse_line, precheck};
use kirana_core::{Bill, CoreError, CreateBillRequest, OrderValidator};

/// Attempts per bill before a storage conflict is reported.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

const DEFAULT_BACKOFF: Duration = Duration::from_millis(10);
const MAX_BACKOFF: Duration = Duration::from_millis(500);

// =============================================================================
// Errors
// =============================================================================

/// Outcome of a failed bill.
#[derive(Debug, Error)]
pub enum BillingError {
    /// The request or the stock said no. Nothing was written.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Storage failed or stayed busy past the retry budget. Nothing was
    /// written.
    #[error("Transaction failed: {0}")]
    TransactionFailure(String),
}

impl BillingError {
    /// Zero-based request line the failure refers to, when there is one.
    pub fn item_index(&self) -> Option<usize> {
        match self {
            BillingError::Core(err) => err.item_index(),
            BillingError::TransactionFailure(_) => None,
        }
    }
}

impl From<DbError> for BillingError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::Domain(core) => BillingError::Core(core),
            other => BillingError::TransactionFailure(other.to_string()),
        }
    }
}

/// Result type for bill creation.
pub type BillingResult<T> = Result<T, BillingError>;

// =============================================================================
// Service
// =============================================================================

/// Runs bill transactions against a pool.
///
/// ## Usage
/// ```rust,ignore
/// let bill = db.billing().max_attempts(8).create_bill(&request).await?;
/// println!("{} = {}", bill.bill_number, bill.grand_total);
/// ```
#[derive(Debug, Clone)]
pub struct BillingService {
    pool: SqlitePool,
    max_attempts: u32,
    backoff: Duration,
}

impl BillingService {
    /// Creates a service with the default retry budget.
    pub fn new(pool: SqlitePool) -> Self {
        BillingService {
            pool,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            backoff: DEFAULT_BACKOFF,
        }
    }

    /// Sets how many times a conflicted transaction is attempted (at least 1).
    pub fn max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    /// Sets the first backoff delay; it roughly doubles on each retry, up to 500ms.
    pub fn backoff(mut self, delay: Duration) -> Self {
        self.backoff = delay;
        self
    }

    /// Creates a bill.
    ///
    /// ## Errors
    /// - `Core(Validation)` for a missing name or a bad mobile number
    /// - `Core(EmptyOrder)` when there are no items
    /// - `Core(InvalidLine | LineProductNotFound | InsufficientStock)` for the
    ///   first failing line, in request order
    /// - `TransactionFailure` when storage fails or stays busy
    pub async fn create_bill(&self, request: &CreateBillRequest) -> BillingResult<Bill> {
        let (customer_name, mobile_number) = precheck(request)?;

        let mut backoff = self.create_backoff();
        let mut attempt = 1;
        loop {
            match self.try_create(request, &customer_name, &mobile_number).await {
                Ok(bill) => {
                    info!(
                        bill_number = %bill.bill_number,
                        grand_total = %bill.grand_total,
                        items = bill.items.len(),
                        attempt,
                        "Bill committed"
                    );
                    return Ok(bill);
                }
                Err(err) if err.is_retryable() && attempt < self.max_attempts => {
                    let delay = backoff.next_backoff().unwrap_or(MAX_BACKOFF);
                    warn!(
                        attempt,
                        max_attempts = self.max_attempts,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "Bill transaction conflicted, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => {
                    debug!(attempt, error = %err, "Bill rejected");
                    return Err(err.into());
                }
            }
        }
    }

    /// Jittered exponential backoff starting at `self.backoff`.
    fn create_backoff(&self) -> ExponentialBackoff {
        ExponentialBackoff {
            current_interval: self.backoff,
            initial_interval: self.backoff,
            max_interval: MAX_BACKOFF,
            multiplier: 2.0,
            max_elapsed_time: None, // bounded by max_attempts instead
            ..Default::default()
        }
    }

    /// One attempt. Returning early drops the transaction, which rolls it back.
    async fn try_create(
        &self,
        request: &CreateBillRequest,
        customer_name: &str,
        mobile_number: &str,
    ) -> DbResult<Bill> {
        let mut tx = self.pool.begin().await?;

        let mut validator = OrderValidator::new();
        for (index, raw) in request.items.iter().enumerate() {
            let line = parse_line(index, raw)?;
            let fetched = if validator.needs_product(line.product_id) {
                ProductRepository::get_in(&mut tx, line.product_id).await?
            } else {
                None
            };
            validator.check_line(line, fetched)?;
        }
        debug!(
            lines = request.items.len(),
            products_read = validator.cached_products(),
            "Bill lines validated"
        );
        let order = validator.finish()?;

        for reservation in &order.reservations {
            let taken = ProductRepository::decrement_in(
                &mut tx,
                reservation.product_id,
                reservation.quantity,
            )
            .await?;

            if !taken {
                // Only reachable if stock moved under our own read view.
                let available = ProductRepository::get_in(&mut tx, reservation.product_id)
                    .await?
                    .map(|p| p.stock)
                    .unwrap_or(0);
                return Err(CoreError::InsufficientStock {
                    index: reservation.first_index,
                    product_id: reservation.product_id,
                    available,
                    requested: reservation.quantity,
                }
                .into());
            }
        }

        let now = Utc::now();
        let draft = order.into_draft(customer_name.to_string(), mobile_number.to_string());
        let bill = BillRepository::append_in(&mut tx, draft, now).await?;

        record_contact(&mut tx, &bill, now).await;

        tx.commit().await?;
        Ok(bill)
    }
}

/// Best-effort contact insert inside its own savepoint.
///
/// Errors roll back the savepoint only and are logged; the bill goes on.
async fn record_contact(conn: &mut SqliteConnection, bill: &Bill, now: DateTime<Utc>) {
    let mut savepoint = match conn.begin().await {
        Ok(savepoint) => savepoint,
        Err(err) => {
            warn!(bill_number = %bill.bill_number, error = %err, "Could not open contact savepoint");
            return;
        }
    };

    let outcome = ContactRepository::upsert_if_absent_in(
        &mut savepoint,
        &bill.customer_name,
        &bill.mobile_number,
        now,
    )
    .await;

    match outcome {
        Ok(upsert) => {
            if let Err(err) = savepoint.commit().await {
                warn!(bill_number = %bill.bill_number, error = %err, "Contact savepoint release failed");
            } else {
                debug!(
                    mobile_number = %bill.mobile_number,
                    created = upsert.created,
                    "Contact recorded with bill"
                );
            }
        }
        Err(err) => {
            warn!(
                bill_number = %bill.bill_number,
                mobile_number = %bill.mobile_number,
                error = %err,
                "Contact insert failed; bill continues without it"
            );
            if let Err(err) = savepoint.rollback().await {
                warn!(error = %err, "Contact savepoint rollback failed");
            }
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
