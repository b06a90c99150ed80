//! # Product Repository
//!
//! Database operations for the product catalog.
//!
//! ## Key Operations
//! - CRUD operations (ids minted by the `productId` counter)
//! - Atomic stock adjustment, single and bulk
//! - Guarded stock decrement for the bill transaction
//! - Low-stock listing
//!
//! ## Stock Never Goes Negative
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Every stock write is a single guarded UPDATE:                          │
//! │                                                                         │
//! │    UPDATE products SET stock = stock + :delta                           │
//! │    WHERE id = :id AND stock + :delta >= 0                               │
//! │                                                                         │
//! │  0 rows affected → product missing, or the delta would overdraw.       │
//! │  The schema's CHECK (stock >= 0) backs this up.                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::repository::counter::CounterRepository;
use kirana_core::{
    AdjustmentFailure, CoreError, Counter, NewProduct, Product, ProductUpdate, StockAdjustment,
    StockAdjustmentResult,
};

/// Column list matching [`Product`]'s `FromRow` field names.
pub(crate) const PRODUCT_COLUMNS: &str =
    "id, name, localized_name, price_paise AS price, stock, min_stock_level, created_at";

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = ProductRepository::new(pool);
///
/// let product = repo.create(&new_product).await?;
/// let product = repo.adjust_stock(product.id, 10).await?;
/// let low = repo.list_low_stock().await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Gets a product by ID.
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Product>> {
        let mut conn = self.pool.acquire().await?;
        Self::get_in(&mut conn, id).await
    }

    /// Gets a product by ID on an existing connection or transaction.
    pub async fn get_in(conn: &mut SqliteConnection, id: i64) -> DbResult<Option<Product>> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?1");
        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?;

        Ok(product)
    }

    /// Lists every product, id ascending.
    pub async fn list_all(&self) -> DbResult<Vec<Product>> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products ORDER BY id ASC");
        let products = sqlx::query_as::<_, Product>(&sql)
            .fetch_all(&self.pool)
            .await?;

        debug!(count = products.len(), "Listed products");
        Ok(products)
    }

    /// Lists products whose stock is below their `min_stock_level`.
    pub async fn list_low_stock(&self) -> DbResult<Vec<Product>> {
        let sql = format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE stock < min_stock_level ORDER BY id ASC"
        );
        let products = sqlx::query_as::<_, Product>(&sql)
            .fetch_all(&self.pool)
            .await?;

        debug!(count = products.len(), "Listed low-stock products");
        Ok(products)
    }

    /// Counts products in the catalog.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    // =========================================================================
    // Writes
    // =========================================================================

    /// Inserts a validated product with stock 0.
    ///
    /// The id comes from the `productId` counter in the same transaction, so
    /// a failed insert does not burn an id.
    pub async fn create(&self, product: &NewProduct) -> DbResult<Product> {
        let mut tx = self.pool.begin().await?;

        let id = CounterRepository::next_in(&mut tx, Counter::ProductId).await?;
        let sql = format!(
            r#"
            INSERT INTO products (id, name, localized_name, price_paise, stock, min_stock_level, created_at)
            VALUES (?1, ?2, ?3, ?4, 0, ?5, ?6)
            RETURNING {PRODUCT_COLUMNS}
            "#
        );
        let created = sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .bind(&product.name)
            .bind(&product.localized_name)
            .bind(product.price)
            .bind(product.min_stock_level)
            .bind(Utc::now())
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;

        info!(id = created.id, name = %created.name, "Product created");
        Ok(created)
    }

    /// Edits descriptive fields in place. Stock is never touched.
    pub async fn update_details(&self, id: i64, update: &ProductUpdate) -> DbResult<Product> {
        let update = update.validate()?;
        if update.is_empty() {
            return self
                .get_by_id(id)
                .await?
                .ok_or(DbError::Domain(CoreError::ProductNotFound { product_id: id }));
        }

        debug!(id, "Updating product details");

        let sql = format!(
            r#"
            UPDATE products SET
                name = COALESCE(?2, name),
                localized_name = COALESCE(?3, localized_name),
                price_paise = COALESCE(?4, price_paise),
                min_stock_level = COALESCE(?5, min_stock_level)
            WHERE id = ?1
            RETURNING {PRODUCT_COLUMNS}
            "#
        );
        sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .bind(update.name)
            .bind(update.localized_name)
            .bind(update.price)
            .bind(update.min_stock_level)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(DbError::Domain(CoreError::ProductNotFound { product_id: id }))
    }

    /// Hard-deletes a product. Committed bills keep their line snapshots.
    ///
    /// Returns false when there was nothing to delete.
    pub async fn delete(&self, id: i64) -> DbResult<bool> {
        let result = sqlx::query("DELETE FROM products WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        let deleted = result.rows_affected() == 1;
        if deleted {
            info!(id, "Product deleted");
        }
        Ok(deleted)
    }

    // =========================================================================
    // Stock
    // =========================================================================

    /// Applies a signed stock delta atomically.
    ///
    /// ## Errors
    /// - `ProductNotFound` when the id does not exist
    /// - `NegativeStock` when the delta would take stock below zero
    /// - `StockOverflow` when the delta would exceed `i64::MAX`
    pub async fn adjust_stock(&self, id: i64, delta: i64) -> DbResult<Product> {
        let mut tx = self.pool.begin().await?;
        let product = Self::adjust_in(&mut tx, id, delta).await?;
        tx.commit().await?;

        info!(id, delta, stock = product.stock, "Stock adjusted");
        Ok(product)
    }

    /// Applies several deltas in one transaction.
    ///
    /// Entries for unknown products, or that would overdraw or overflow, are
    /// reported as failures in their slot and the rest of the batch still commits.
    /// Storage errors abort the whole batch.
    pub async fn bulk_adjust_stock(
        &self,
        entries: &[StockAdjustment],
    ) -> DbResult<Vec<StockAdjustmentResult>> {
        let mut tx = self.pool.begin().await?;
        let mut results = Vec::with_capacity(entries.len());

        for entry in entries {
            let outcome = Self::adjust_in(&mut tx, entry.product_id, entry.quantity).await;
            let result = match outcome {
                Ok(product) => StockAdjustmentResult::applied(product.id, product.stock),
                Err(DbError::Domain(err @ CoreError::ProductNotFound { .. })) => {
                    StockAdjustmentResult::rejected(
                        entry.product_id,
                        AdjustmentFailure::NotFound,
                        err.to_string(),
                    )
                }
                Err(DbError::Domain(err @ CoreError::NegativeStock { .. })) => {
                    StockAdjustmentResult::rejected(
                        entry.product_id,
                        AdjustmentFailure::NegativeStock,
                        err.to_string(),
                    )
                }
                Err(DbError::Domain(err @ CoreError::StockOverflow { .. })) => {
                    StockAdjustmentResult::rejected(
                        entry.product_id,
                        AdjustmentFailure::StockOverflow,
                        err.to_string(),
                    )
                }
                Err(other) => return Err(other),
            };
            results.push(result);
        }

        tx.commit().await?;

        let applied = results.iter().filter(|r| r.success).count();
        info!(
            entries = entries.len(),
            applied,
            rejected = entries.len() - applied,
            "Bulk stock adjustment committed"
        );
        Ok(results)
    }

    /// Applies a signed delta on an existing connection or transaction.
    ///
    /// SQLite turns an overflowing integer sum into a REAL, so the guard
    /// compares against `i64::MAX - stock` instead of adding first. Stock is
    /// never negative, so a negative delta cannot underflow.
    pub async fn adjust_in(conn: &mut SqliteConnection, id: i64, delta: i64) -> DbResult<Product> {
        let sql = format!(
            r#"
            UPDATE products SET stock = stock + ?2
            WHERE id = ?1 AND ?2 >= -stock AND ?2 <= ?3 - stock
            RETURNING {PRODUCT_COLUMNS}
            "#
        );
        let updated = sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .bind(delta)
            .bind(i64::MAX)
            .fetch_optional(&mut *conn)
            .await?;

        if let Some(product) = updated {
            return Ok(product);
        }

        match Self::get_in(conn, id).await? {
            None => Err(CoreError::ProductNotFound { product_id: id }.into()),
            Some(product) if delta > 0 => Err(CoreError::StockOverflow {
                product_id: id,
                available: product.stock,
                delta,
            }
            .into()),
            Some(product) => Err(CoreError::NegativeStock {
                product_id: id,
                available: product.stock,
                delta,
            }
            .into()),
        }
    }

    /// Takes `quantity` units if at least that many are on hand.
    ///
    /// Returns false, changing nothing, when stock is short or the product
    /// is gone.
    pub async fn decrement_in(
        conn: &mut SqliteConnection,
        id: i64,
        quantity: i64,
    ) -> DbResult<bool> {
        let result =
            sqlx::query("UPDATE products SET stock = stock - ?2 WHERE id = ?1 AND stock >= ?2")
                .bind(id)
                .bind(quantity)
                .execute(&mut *conn)
                .await?;

        Ok(result.rows_affected() == 1)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use kirana_core::Money;

    fn chips() -> NewProduct {
        NewProduct {
            name: "Chips".to_string(),
            localized_name: "சிப்ஸ்".to_string(),
            price: Money::from_rupees(10),
            min_stock_level: 5,
        }
    }

    fn milk() -> NewProduct {
        NewProduct {
            name: "Milk".to_string(),
            localized_name: "பால்".to_string(),
            price: Money::from_paise(2550),
            min_stock_level: 2,
        }
    }

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    #[tokio::test]
    async fn test_create_assigns_sequential_ids_and_zero_stock() {
        let db = test_db().await;
        let repo = db.products();

        let first = repo.create(&chips()).await.unwrap();
        let second = repo.create(&milk()).await.unwrap();

        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
        assert_eq!(first.stock, 0);
        assert_eq!(second.price, Money::from_paise(2550));
        assert_eq!(repo.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_ids_are_not_reused_after_delete() {
        let db = test_db().await;
        let repo = db.products();

        let first = repo.create(&chips()).await.unwrap();
        assert!(repo.delete(first.id).await.unwrap());
        assert!(!repo.delete(first.id).await.unwrap());

        let next = repo.create(&milk()).await.unwrap();
        assert_eq!(next.id, 2);
        assert!(repo.get_by_id(first.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_all_sorted_by_id() {
        let db = test_db().await;
        let repo = db.products();
        repo.create(&chips()).await.unwrap();
        repo.create(&milk()).await.unwrap();

        let ids: Vec<i64> = repo.list_all().await.unwrap().iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[tokio::test]
    async fn test_adjust_stock() {
        let db = test_db().await;
        let repo = db.products();
        let product = repo.create(&chips()).await.unwrap();

        let product = repo.adjust_stock(product.id, 5).await.unwrap();
        assert_eq!(product.stock, 5);

        let product = repo.adjust_stock(product.id, -2).await.unwrap();
        assert_eq!(product.stock, 3);
    }

    #[tokio::test]
    async fn test_adjust_stock_rejects_overdraw_and_unknown() {
        let db = test_db().await;
        let repo = db.products();
        let product = repo.create(&chips()).await.unwrap();
        repo.adjust_stock(product.id, 2).await.unwrap();

        let err = repo.adjust_stock(product.id, -3).await.unwrap_err();
        assert!(matches!(
            err,
            DbError::Domain(CoreError::NegativeStock {
                available: 2,
                delta: -3,
                ..
            })
        ));
        assert_eq!(repo.get_by_id(product.id).await.unwrap().unwrap().stock, 2);

        let err = repo.adjust_stock(999, 5).await.unwrap_err();
        assert!(matches!(
            err,
            DbError::Domain(CoreError::ProductNotFound { product_id: 999 })
        ));
    }

    #[tokio::test]
    async fn test_bulk_adjust_reports_per_entry() {
        let db = test_db().await;
        let repo = db.products();
        let product = repo.create(&chips()).await.unwrap();

        let results = repo
            .bulk_adjust_stock(&[
                StockAdjustment { product_id: product.id, quantity: 5 },
                StockAdjustment { product_id: 999, quantity: 5 },
                StockAdjustment { product_id: product.id, quantity: -10 },
            ])
            .await
            .unwrap();

        assert_eq!(results.len(), 3);
        assert!(results[0].success);
        assert_eq!(results[0].stock, Some(5));
        assert!(!results[1].success);
        assert_eq!(results[1].reason, Some(AdjustmentFailure::NotFound));
        assert_eq!(results[2].reason, Some(AdjustmentFailure::NegativeStock));

        assert_eq!(repo.get_by_id(product.id).await.unwrap().unwrap().stock, 5);
    }

    #[tokio::test]
    async fn test_adjust_stock_rejects_overflow() {
        let db = test_db().await;
        let repo = db.products();
        let product = repo.create(&chips()).await.unwrap();
        repo.adjust_stock(product.id, 1).await.unwrap();

        let err = repo.adjust_stock(product.id, i64::MAX).await.unwrap_err();
        assert!(matches!(
            err,
            DbError::Domain(CoreError::StockOverflow { available: 1, .. })
        ));

        let product = repo.adjust_stock(product.id, i64::MAX - 1).await.unwrap();
        assert_eq!(product.stock, i64::MAX);

        let err = repo.adjust_stock(product.id, i64::MIN).await.unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::NegativeStock { .. })));
    }

    #[tokio::test]
    async fn test_bulk_adjust_overflow_keeps_other_entries() {
        let db = test_db().await;
        let repo = db.products();
        let product = repo.create(&chips()).await.unwrap();
        repo.adjust_stock(product.id, 1).await.unwrap();

        let results = repo
            .bulk_adjust_stock(&[
                StockAdjustment { product_id: product.id, quantity: 5 },
                StockAdjustment { product_id: product.id, quantity: i64::MAX },
            ])
            .await
            .unwrap();

        assert!(results[0].success);
        assert_eq!(results[0].stock, Some(6));
        assert!(!results[1].success);
        assert_eq!(results[1].reason, Some(AdjustmentFailure::StockOverflow));

        assert_eq!(repo.get_by_id(product.id).await.unwrap().unwrap().stock, 6);
    }

    #[tokio::test]
    async fn test_low_stock_listing() {
        let db = test_db().await;
        let repo = db.products();
        let chips = repo.create(&chips()).await.unwrap(); // min 5
        let milk = repo.create(&milk()).await.unwrap(); // min 2
        repo.adjust_stock(chips.id, 4).await.unwrap();
        repo.adjust_stock(milk.id, 2).await.unwrap();

        let low: Vec<i64> = repo
            .list_low_stock()
            .await
            .unwrap()
            .iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(low, vec![chips.id]);
    }

    #[tokio::test]
    async fn test_update_details_keeps_stock() {
        let db = test_db().await;
        let repo = db.products();
        let product = repo.create(&chips()).await.unwrap();
        repo.adjust_stock(product.id, 7).await.unwrap();

        let updated = repo
            .update_details(
                product.id,
                &ProductUpdate {
                    price: Some(Money::from_rupees(12)),
                    name: Some("  Potato Chips ".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.name, "Potato Chips");
        assert_eq!(updated.localized_name, "சிப்ஸ்");
        assert_eq!(updated.price, Money::from_rupees(12));
        assert_eq!(updated.stock, 7);

        let err = repo
            .update_details(999, &ProductUpdate { min_stock_level: Some(1), ..Default::default() })
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::ProductNotFound { .. })));

        let err = repo
            .update_details(product.id, &ProductUpdate { price: Some(Money::zero()), ..Default::default() })
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::Validation(_))));
    }

    #[tokio::test]
    async fn test_guarded_decrement() {
        let db = test_db().await;
        let repo = db.products();
        let product = repo.create(&chips()).await.unwrap();
        repo.adjust_stock(product.id, 3).await.unwrap();

        let mut conn = db.pool().acquire().await.unwrap();
        assert!(!ProductRepository::decrement_in(&mut conn, product.id, 4).await.unwrap());
        assert!(ProductRepository::decrement_in(&mut conn, product.id, 3).await.unwrap());
        assert!(!ProductRepository::decrement_in(&mut conn, product.id, 1).await.unwrap());
        drop(conn);

        assert_eq!(repo.get_by_id(product.id).await.unwrap().unwrap().stock, 0);
    }
}
