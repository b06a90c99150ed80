//! # Stock Commands
//!
//! Signed stock deltas: positive restocks, negative write-offs.
//!
//! ```text
//! adjust_stock       one entry, all-or-nothing, errors map to 404 / 400
//! adjust_stock_bulk  many entries, one transaction, per-entry outcome:
//!
//!   [{1, +5}, {999, +5}, {2, -50}]
//!      │         │          │
//!      ▼         ▼          ▼
//!   applied   NotFound   NegativeStock      (applied entries still commit)
//! ```

use tracing::{debug, info};

use kirana_core::{Product, StockAdjustment, StockAdjustmentResult, ValidationError};

use crate::commands::ApiResponse;
use crate::error::ApiError;
use crate::state::DbState;

/// Applies one stock delta.
pub async fn adjust_stock(
    db: &DbState,
    request: StockAdjustment,
) -> Result<ApiResponse<Product>, ApiError> {
    debug!(
        product_id = request.product_id,
        delta = request.quantity,
        "adjust_stock command"
    );

    let product = db
        .inner()
        .products()
        .adjust_stock(request.product_id, request.quantity)
        .await?;

    Ok(ApiResponse::ok(product))
}

/// Applies many deltas and reports each entry's outcome in request order.
pub async fn adjust_stock_bulk(
    db: &DbState,
    entries: Vec<StockAdjustment>,
) -> Result<ApiResponse<Vec<StockAdjustmentResult>>, ApiError> {
    debug!(entries = entries.len(), "adjust_stock_bulk command");

    if entries.is_empty() {
        return Err(ValidationError::required("entries").into());
    }

    let results = db.inner().products().bulk_adjust_stock(&entries).await?;

    let rejected = results.iter().filter(|r| !r.success).count();
    if rejected > 0 {
        info!(rejected, "adjust_stock_bulk completed with rejected entries");
    }

    Ok(ApiResponse::ok(results))
}
