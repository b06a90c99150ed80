//! # Commands Module
//!
//! Every operation the request layer exposes.
//!
//! ## Command Organization
//! ```text
//! commands/
//! ├── mod.rs      ◄─── You are here (ApiResponse, body parsing)
//! ├── bill.rs     ◄─── Bill creation and lookup
//! ├── product.rs  ◄─── Catalog listing and edits
//! ├── stock.rs    ◄─── Single and bulk stock adjustment
//! ├── contact.rs  ◄─── Contact directory
//! └── health.rs   ◄─── Liveness and migration status
//! ```
//!
//! ## How Commands Work
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Command Flow                                         │
//! │                                                                         │
//! │  Transport (HTTP route, IPC call, CLI)                                  │
//! │         │  raw JSON body                                                │
//! │         ▼                                                               │
//! │  parse_body::<CreateBillRequest>(body)  ──► 400 on malformed JSON       │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  create_bill(&DbState, request)                                         │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  Ok(ApiResponse { status: 201, body: Bill })                            │
//! │  Err(ApiError { status: 400, errorType, message, itemIndex })           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## State Injection
//! Each command declares only the state it needs:
//! ```rust,ignore
//! // Only needs database
//! async fn list_products(db: &DbState)
//!
//! // Needs defaults too
//! async fn create_product(db: &DbState, config: &ConfigState, ...)
//! ```

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::ApiError;

pub mod bill;
pub mod contact;
pub mod health;
pub mod product;
pub mod stock;

pub use bill::{create_bill, get_bill, list_bills};
pub use contact::{create_contact, list_contacts};
pub use health::{health, HealthStatus};
pub use product::{
    create_product, delete_product, list_low_stock_products, list_products, update_product,
};
pub use stock::{adjust_stock, adjust_stock_bulk};

/// Successful command result: a status code and the body to serialize.
///
/// Serializes as the body alone; the transport sets the status.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ApiResponse<T> {
    #[serde(skip)]
    pub status: u16,

    pub body: T,
}

impl<T> ApiResponse<T> {
    /// 200 OK.
    pub fn ok(body: T) -> Self {
        ApiResponse { status: 200, body }
    }

    /// 201 Created.
    pub fn created(body: T) -> Self {
        ApiResponse { status: 201, body }
    }

    pub fn into_body(self) -> T {
        self.body
    }
}

/// Deserializes a raw request body, mapping malformed JSON to a 400.
pub fn parse_body<T: DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    serde_json::from_str(body)
        .map_err(|e| ApiError::validation(format!("Malformed request body: {}", e)))
}


#[cfg(test)]
mod tests {
    use super::*;
    use kirana_core::CreateBillRequest;

    #[test]
    fn test_parse_body() {
        let request: CreateBillRequest = parse_body(
            r#"{"customerName":"Ravi","mobileNumber":"9876543210","items":[{"productId":1,"quantity":"2"}]}"#,
        )
        .unwrap();
        assert_eq!(request.items.len(), 1);

        let err = parse_body::<CreateBillRequest>("{not json").unwrap_err();
        assert_eq!(err.status, 400);
    }

    #[test]
    fn test_response_status() {
        assert_eq!(ApiResponse::ok(1).status, 200);
        assert_eq!(ApiResponse::created(1).into_body(), 1);
    }
}
