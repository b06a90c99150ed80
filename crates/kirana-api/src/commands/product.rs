//! # Product Commands
//!
//! Catalog listing, creation and edits. Stock changes live in
//! [`crate::commands::stock`].

use tracing::{debug, info};

use kirana_core::{CoreError, CreateProductRequest, Product, ProductUpdate};

use crate::commands::ApiResponse;
use crate::error::ApiError;
use crate::state::{ConfigState, DbState};

/// Lists every product, ordered by id.
pub async fn list_products(db: &DbState) -> Result<ApiResponse<Vec<Product>>, ApiError> {
    debug!("list_products command");

    let products = db.inner().products().list_all().await?;
    Ok(ApiResponse::ok(products))
}

/// Lists products whose stock is below their `minStockLevel`.
pub async fn list_low_stock_products(
    db: &DbState,
) -> Result<ApiResponse<Vec<Product>>, ApiError> {
    debug!("list_low_stock_products command");

    let products = db.inner().products().list_low_stock().await?;
    Ok(ApiResponse::ok(products))
}

/// Adds a product with zero stock.
pub async fn create_product(
    db: &DbState,
    config: &ConfigState,
    request: CreateProductRequest,
) -> Result<ApiResponse<Product>, ApiError> {
    debug!("create_product command");

    let product = request.validate(config.low_stock_default)?;
    let created = db.inner().products().create(&product).await?;

    Ok(ApiResponse::created(created))
}

/// Edits descriptive fields of a product.
pub async fn update_product(
    db: &DbState,
    id: i64,
    update: ProductUpdate,
) -> Result<ApiResponse<Product>, ApiError> {
    debug!(id, "update_product command");

    let product = db.inner().products().update_details(id, &update).await?;
    Ok(ApiResponse::ok(product))
}

/// Removes a product from the catalog.
pub async fn delete_product(db: &DbState, id: i64) -> Result<ApiResponse<i64>, ApiError> {
    debug!(id, "delete_product command");

    if !db.inner().products().delete(id).await? {
        return Err(CoreError::ProductNotFound { product_id: id }.into());
    }

    info!(id, "delete_product completed");
    Ok(ApiResponse::ok(id))
}
