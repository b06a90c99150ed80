//! # Bill Commands
//!
//! Bill creation and lookup.
//!
//! ## Bill Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Bill Creation Flow                                   │
//! │                                                                         │
//! │  POST bill { customerName, mobileNumber, items: [{productId, qty}] }    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  BillingService::create_bill  (one transaction, retried on BUSY)        │
//! │       │                                                                 │
//! │       ├── Ok(Bill)                 ──► 201 { billNumber, items, ... }   │
//! │       ├── CoreError (line failure) ──► 400 { errorType, itemIndex }     │
//! │       └── TransactionFailure       ──► 500 generic message              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::time::Instant;

use tracing::{debug, info};

use kirana_core::{Bill, BillDetails, BillSummary, CoreError, CreateBillRequest};

use crate::commands::ApiResponse;
use crate::error::ApiError;
use crate::state::DbState;

/// Bills returned by [`list_bills`] when no limit is given.
pub const DEFAULT_BILL_LIST_LIMIT: u32 = 20;

/// Creates and persists a bill.
pub async fn create_bill(
    db: &DbState,
    request: CreateBillRequest,
) -> Result<ApiResponse<Bill>, ApiError> {
    debug!(items = request.items.len(), "create_bill command");

    let start = Instant::now();
    let bill = db.billing().create_bill(&request).await?;

    info!(
        bill_number = %bill.bill_number,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "create_bill completed"
    );

    Ok(ApiResponse::created(bill))
}

/// Fetches a bill with each line's current product record.
pub async fn get_bill(
    db: &DbState,
    bill_number: String,
) -> Result<ApiResponse<BillDetails>, ApiError> {
    debug!(bill_number = %bill_number, "get_bill command");

    let bill = db
        .inner()
        .bills()
        .get_by_number(&bill_number)
        .await?
        .ok_or_else(|| CoreError::BillNotFound(bill_number.trim().to_string()))?;

    Ok(ApiResponse::ok(bill))
}

/// Lists bill headers, newest first.
pub async fn list_bills(
    db: &DbState,
    limit: Option<u32>,
) -> Result<ApiResponse<Vec<BillSummary>>, ApiError> {
    let limit = limit.unwrap_or(DEFAULT_BILL_LIST_LIMIT);
    debug!(limit, "list_bills command");

    let bills = db.inner().bills().list_recent(limit).await?;
    Ok(ApiResponse::ok(bills))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::{db_state, stocked};
    use crate::error::ErrorType;
    use kirana_core::{BillLineRequest, Money};

    fn request(items: Vec<BillLineRequest>) -> CreateBillRequest {
        CreateBillRequest {
            customer_name: Some("Ravi".to_string()),
            mobile_number: Some("9876543210".to_string()),
            items,
        }
    }

    #[tokio::test]
    async fn test_create_bill_returns_created() {
        let db = db_state().await;
        let chips = stocked(&db, "Chips", 10, 5).await;

        let response = create_bill(&db, request(vec![BillLineRequest::new(chips.id, 3)]))
            .await
            .unwrap();

        assert_eq!(response.status, 201);
        assert_eq!(response.body.grand_total, Money::from_rupees(30));
        assert!(response.body.bill_number.starts_with("BILL-"));

        let after = db.inner().products().get_by_id(chips.id).await.unwrap().unwrap();
        assert_eq!(after.stock, 2);
    }

    #[tokio::test]
    async fn test_create_bill_insufficient_stock_is_400() {
        let db = db_state().await;
        let chips = stocked(&db, "Chips", 10, 3).await;

        let err = create_bill(
            &db,
            request(vec![
                BillLineRequest::new(chips.id, 2),
                BillLineRequest::new(chips.id, 2),
            ]),
        )
        .await
        .unwrap_err();

        assert_eq!(err.status, 400);
        assert_eq!(err.error_type, ErrorType::InsufficientStock);
        assert_eq!(err.item_index, Some(1));
    }

    #[tokio::test]
    async fn test_create_bill_rejects_bad_customer_and_empty_order() {
        let db = db_state().await;

        let mut bad_mobile = request(vec![BillLineRequest::new(1, 1)]);
        bad_mobile.mobile_number = Some("12345".to_string());
        let err = create_bill(&db, bad_mobile).await.unwrap_err();
        assert_eq!(err.error_type, ErrorType::ValidationError);

        let err = create_bill(&db, request(vec![])).await.unwrap_err();
        assert_eq!(err.error_type, ErrorType::EmptyOrder);
    }

    #[tokio::test]
    async fn test_get_bill() {
        let db = db_state().await;
        let chips = stocked(&db, "Chips", 10, 5).await;
        let created = create_bill(&db, request(vec![BillLineRequest::new(chips.id, 1)]))
            .await
            .unwrap()
            .into_body();

        let found = get_bill(&db, created.bill_number.clone()).await.unwrap();
        assert_eq!(found.status, 200);
        assert_eq!(found.body.items.len(), 1);
        assert!(found.body.items[0].product.is_some());

        let missing = get_bill(&db, "BILL-2020-999999".to_string()).await.unwrap_err();
        assert_eq!(missing.status, 404);

        let malformed = get_bill(&db, "INV-1".to_string()).await.unwrap_err();
        assert_eq!(malformed.status, 400);
    }

    #[tokio::test]
    async fn test_list_bills_newest_first() {
        let db = db_state().await;
        let chips = stocked(&db, "Chips", 10, 5).await;

        let first = create_bill(&db, request(vec![BillLineRequest::new(chips.id, 1)]))
            .await
            .unwrap()
            .into_body();
        let second = create_bill(&db, request(vec![BillLineRequest::new(chips.id, 1)]))
            .await
            .unwrap()
            .into_body();

        let bills = list_bills(&db, None).await.unwrap().into_body();
        assert_eq!(bills.len(), 2);
        assert_eq!(bills[0].bill_number, second.bill_number);
        assert_eq!(bills[1].bill_number, first.bill_number);

        let err = list_bills(&db, Some(0)).await.unwrap_err();
        assert_eq!(err.status, 400);
    }
}
