//! # Bill Repository
//!
//! The bill ledger: append-only bill headers and their line snapshots.
//!
//! ## Bill Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Bill Lifecycle                                    │
//! │                                                                         │
//! │  1. APPEND (inside the bill transaction only)                          │
//! │     └── next(billNumber) → 42                                          │
//! │     └── BILL-2026-000042 → bills + bill_items                          │
//! │                                                                         │
//! │  2. READ                                                               │
//! │     └── get_by_number() → snapshot lines LEFT JOIN current products    │
//! │     └── list_recent()   → headers, newest first                        │
//! │                                                                         │
//! │  There is no update and no delete.                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Datelike, Utc};
use sqlx::{FromRow, SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::DbResult;
use crate::repository::counter::CounterRepository;
use kirana_core::numbering::{format_bill_number, parse_bill_number};
use kirana_core::validation::validate_list_limit;
use kirana_core::{
    Bill, BillDetails, BillDraft, BillSummary, Counter, LineItem, LineItemDetails, Money, Product,
};

const SUMMARY_COLUMNS: &str = "bill_number, grand_total_paise AS grand_total, customer_name, \
     mobile_number, created_at";

/// A stored line joined with whatever the catalog holds for it now.
#[derive(Debug, FromRow)]
struct LineRow {
    product_id: i64,
    localized_name: String,
    quantity: i64,
    unit_price: Money,
    line_total: Money,
    current_id: Option<i64>,
    current_name: Option<String>,
    current_localized_name: Option<String>,
    current_price: Option<Money>,
    current_stock: Option<i64>,
    current_min_stock_level: Option<i64>,
    current_created_at: Option<DateTime<Utc>>,
}

impl LineRow {
    fn into_details(self) -> LineItemDetails {
        let product = match (
            self.current_id,
            self.current_name,
            self.current_localized_name,
            self.current_price,
            self.current_stock,
            self.current_min_stock_level,
            self.current_created_at,
        ) {
            (
                Some(id),
                Some(name),
                Some(localized_name),
                Some(price),
                Some(stock),
                Some(min_stock_level),
                Some(created_at),
            ) => Some(Product {
                id,
                name,
                localized_name,
                price,
                stock,
                min_stock_level,
                created_at,
            }),
            _ => None,
        };

        LineItemDetails::new(
            LineItem {
                product_id: self.product_id,
                localized_name: self.localized_name,
                quantity: self.quantity,
                unit_price: self.unit_price,
                line_total: self.line_total,
            },
            product,
        )
    }
}

/// Repository for the bill ledger.
#[derive(Debug, Clone)]
pub struct BillRepository {
    pool: SqlitePool,
}

impl BillRepository {
    /// Creates a new BillRepository.
    pub fn new(pool: SqlitePool) -> Self {
        BillRepository { pool }
    }

    /// Numbers and persists a priced bill.
    ///
    /// Only the bill transaction calls this; the counter increment and the
    /// rows commit or roll back together.
    pub async fn append_in(
        conn: &mut SqliteConnection,
        draft: BillDraft,
        created_at: DateTime<Utc>,
    ) -> DbResult<Bill> {
        let sequence = CounterRepository::next_in(&mut *conn, Counter::BillNumber).await?;
        let bill_number = format_bill_number(created_at.year(), sequence);

        debug!(bill_number = %bill_number, items = draft.items.len(), "Appending bill");

        sqlx::query(
            r#"
            INSERT INTO bills (
                bill_number, sequence, grand_total_paise,
                customer_name, mobile_number, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&bill_number)
        .bind(sequence)
        .bind(draft.grand_total)
        .bind(&draft.customer_name)
        .bind(&draft.mobile_number)
        .bind(created_at)
        .execute(&mut *conn)
        .await?;

        for (position, item) in draft.items.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO bill_items (
                    bill_number, position, product_id, localized_name,
                    quantity, unit_price_paise, line_total_paise
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                "#,
            )
            .bind(&bill_number)
            .bind(position as i64)
            .bind(item.product_id)
            .bind(&item.localized_name)
            .bind(item.quantity)
            .bind(item.unit_price)
            .bind(item.line_total)
            .execute(&mut *conn)
            .await?;
        }

        Ok(draft.into_bill(bill_number, created_at))
    }

    /// Looks up a bill, enriching each line with the product's current record.
    ///
    /// ## Errors
    /// - `Validation` when `bill_number` is not `BILL-YYYY-NNNNNN`
    ///
    /// An unknown but well-formed number is `Ok(None)`.
    pub async fn get_by_number(&self, bill_number: &str) -> DbResult<Option<BillDetails>> {
        parse_bill_number(bill_number)?;
        let bill_number = bill_number.trim();

        let mut conn = self.pool.acquire().await?;

        let sql = format!("SELECT {SUMMARY_COLUMNS} FROM bills WHERE bill_number = ?1");
        let header = sqlx::query_as::<_, BillSummary>(&sql)
            .bind(bill_number)
            .fetch_optional(&mut *conn)
            .await?;

        let Some(header) = header else {
            debug!(bill_number, "Bill not found");
            return Ok(None);
        };

        let lines = sqlx::query_as::<_, LineRow>(
            r#"
            SELECT
                i.product_id,
                i.localized_name,
                i.quantity,
                i.unit_price_paise AS unit_price,
                i.line_total_paise AS line_total,
                p.id AS current_id,
                p.name AS current_name,
                p.localized_name AS current_localized_name,
                p.price_paise AS current_price,
                p.stock AS current_stock,
                p.min_stock_level AS current_min_stock_level,
                p.created_at AS current_created_at
            FROM bill_items i
            LEFT JOIN products p ON p.id = i.product_id
            WHERE i.bill_number = ?1
            ORDER BY i.position ASC
            "#,
        )
        .bind(bill_number)
        .fetch_all(&mut *conn)
        .await?;

        Ok(Some(BillDetails {
            bill_number: header.bill_number,
            items: lines.into_iter().map(LineRow::into_details).collect(),
            grand_total: header.grand_total,
            customer_name: header.customer_name,
            mobile_number: header.mobile_number,
            created_at: header.created_at,
        }))
    }

    /// Lists bill headers, newest first.
    pub async fn list_recent(&self, limit: u32) -> DbResult<Vec<BillSummary>> {
        let limit = validate_list_limit(limit)?;

        let sql = format!("SELECT {SUMMARY_COLUMNS} FROM bills ORDER BY sequence DESC LIMIT ?1");
        let bills = sqlx::query_as::<_, BillSummary>(&sql)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        Ok(bills)
    }

    /// Counts committed bills.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM bills")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DbError;
    use crate::pool::{Database, DbConfig};
    use kirana_core::{CoreError, NewProduct};

    fn draft(product_id: i64, quantity: i64, unit_price: Money) -> BillDraft {
        let line_total = unit_price * quantity;
        BillDraft {
            items: vec![LineItem {
                product_id,
                localized_name: "சிப்ஸ்".to_string(),
                quantity,
                unit_price,
                line_total,
            }],
            grand_total: line_total,
            customer_name: "Ravi".to_string(),
            mobile_number: "9876543210".to_string(),
        }
    }

    async fn append(db: &Database, draft: BillDraft) -> Bill {
        let mut tx = db.pool().begin().await.unwrap();
        let bill = BillRepository::append_in(&mut tx, draft, Utc::now())
            .await
            .unwrap();
        tx.commit().await.unwrap();
        bill
    }

    #[tokio::test]
    async fn test_append_numbers_bills_sequentially() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let year = Utc::now().year();

        let first = append(&db, draft(1, 1, Money::from_rupees(10))).await;
        let second = append(&db, draft(1, 2, Money::from_rupees(10))).await;

        assert_eq!(first.bill_number, format_bill_number(year, 1));
        assert_eq!(second.bill_number, format_bill_number(year, 2));
        assert_eq!(db.bills().count().await.unwrap(), 2);

        let recent: Vec<String> = db
            .bills()
            .list_recent(10)
            .await
            .unwrap()
            .into_iter()
            .map(|b| b.bill_number)
            .collect();
        assert_eq!(recent, vec![second.bill_number, first.bill_number]);
    }

    #[tokio::test]
    async fn test_get_by_number_joins_current_product() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let product = db
            .products()
            .create(&NewProduct {
                name: "Chips".to_string(),
                localized_name: "சிப்ஸ்".to_string(),
                price: Money::from_rupees(10),
                min_stock_level: 5,
            })
            .await
            .unwrap();

        let bill = append(&db, draft(product.id, 3, Money::from_rupees(10))).await;

        // Price changes after billing; the snapshot must not.
        db.products()
            .update_details(
                product.id,
                &kirana_core::ProductUpdate {
                    price: Some(Money::from_rupees(15)),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let details = db.bills().get_by_number(&bill.bill_number).await.unwrap().unwrap();
        assert_eq!(details.grand_total, Money::from_rupees(30));
        assert_eq!(details.items[0].unit_price, Money::from_rupees(10));
        let current = details.items[0].product.as_ref().unwrap();
        assert_eq!(current.price, Money::from_rupees(15));

        db.products().delete(product.id).await.unwrap();
        let details = db.bills().get_by_number(&bill.bill_number).await.unwrap().unwrap();
        assert!(details.items[0].product.is_none());
        assert_eq!(details.items[0].localized_name, "சிப்ஸ்");
    }

    #[tokio::test]
    async fn test_get_by_number_unknown_and_malformed() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        assert!(db
            .bills()
            .get_by_number("BILL-2026-000999")
            .await
            .unwrap()
            .is_none());

        let err = db.bills().get_by_number("12345").await.unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::Validation(_))));
    }

    #[tokio::test]
    async fn test_list_recent_rejects_bad_limit() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        assert!(db.bills().list_recent(0).await.is_err());
        assert!(db.bills().list_recent(20).await.unwrap().is_empty());
    }
}
