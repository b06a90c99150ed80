//! # API Error Type
//!
//! Unified error type for command handlers.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in Kirana                                 │
//! │                                                                         │
//! │  Command Function → Result<ApiResponse<T>, ApiError>                    │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  CoreError / ValidationError ──► 400 (404 for a missing resource)       │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  BillingError::TransactionFailure ──► 500, detail logged only           │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  DbError (infrastructure) ──► 500 "Internal server error"               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Serialization
//! The status code travels beside the body, not inside it:
//! ```json
//! {
//!   "errorType": "InsufficientStock",
//!   "message": "Item 1: insufficient stock for product 1: available 3, requested 4",
//!   "itemIndex": 1
//! }
//! ```

use serde::Serialize;
use thiserror::Error;

use kirana_core::{CoreError, ValidationError};
use kirana_db::{BillingError, DbError};

/// Message returned for every 500; the real cause only reaches the log.
pub const INTERNAL_MESSAGE: &str = "Internal server error";

/// API error returned from command handlers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[serde(rename_all = "camelCase")]
#[error("[{status} {error_type:?}] {message}")]
pub struct ApiError {
    /// HTTP-style status code (400, 404, 500)
    #[serde(skip)]
    pub status: u16,

    /// Machine-readable error kind
    pub error_type: ErrorType,

    /// Human-readable message for display
    pub message: String,

    /// Zero-based bill line the error refers to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item_index: Option<usize>,
}

/// Error kinds exposed to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorType {
    /// Input validation failed (400)
    ValidationError,

    /// Resource not found (404, or 400 for a bill line)
    NotFound,

    /// Cumulative quantity exceeds stock (400)
    InsufficientStock,

    /// Stock adjustment would go below zero (400)
    NegativeStock,

    /// Bill without items (400)
    EmptyOrder,

    /// Malformed bill line (400)
    InvalidLine,

    /// Bill transaction could not be committed (500)
    TransactionFailure,

    /// Anything else (500)
    Internal,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(status: u16, error_type: ErrorType, message: impl Into<String>) -> Self {
        ApiError {
            status,
            error_type,
            message: message.into(),
            item_index: None,
        }
    }

    /// Attaches the offending bill line.
    pub fn at_item(mut self, index: Option<usize>) -> Self {
        self.item_index = index;
        self
    }

    /// Creates a not found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::new(404, ErrorType::NotFound, message)
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(400, ErrorType::ValidationError, message)
    }

    /// Creates an internal error with the generic message.
    pub fn internal() -> Self {
        ApiError::new(500, ErrorType::Internal, INTERNAL_MESSAGE)
    }

    /// True for 5xx responses.
    pub fn is_server_error(&self) -> bool {
        self.status >= 500
    }
}

/// Converts validation errors to API errors.
impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::validation(err.to_string())
    }
}

/// Converts core errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        let index = err.item_index();
        let message = err.to_string();

        match err {
            CoreError::ProductNotFound { .. } | CoreError::BillNotFound(_) => {
                ApiError::not_found(message)
            }
            CoreError::LineProductNotFound { .. } => {
                ApiError::new(400, ErrorType::NotFound, message).at_item(index)
            }
            CoreError::InsufficientStock { .. } => {
                ApiError::new(400, ErrorType::InsufficientStock, message).at_item(index)
            }
            CoreError::NegativeStock { .. } => {
                ApiError::new(400, ErrorType::NegativeStock, message)
            }
            CoreError::StockOverflow { .. } => ApiError::validation(message),
            CoreError::EmptyOrder => ApiError::new(400, ErrorType::EmptyOrder, message),
            CoreError::InvalidLine { .. } => {
                ApiError::new(400, ErrorType::InvalidLine, message).at_item(index)
            }
            CoreError::Validation(e) => e.into(),
        }
    }
}

/// Converts database errors to API errors.
impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::Domain(e) => e.into(),
            DbError::NotFound { entity, id } => {
                ApiError::not_found(format!("{} not found: {}", entity, id))
            }
            DbError::UniqueViolation { column } => {
                ApiError::validation(format!("{} already exists", column))
            }
            DbError::CheckViolation { message } => {
                tracing::error!(%message, "Constraint rejected a write");
                ApiError::validation("Value violates a data constraint")
            }
            other => {
                // Log the actual error but return a generic message
                tracing::error!(error = %other, "Database operation failed");
                ApiError::internal()
            }
        }
    }
}

/// Converts bill transaction errors to API errors.
impl From<BillingError> for ApiError {
    fn from(err: BillingError) -> Self {
        match err {
            BillingError::Core(e) => e.into(),
            BillingError::TransactionFailure(detail) => {
                tracing::error!(%detail, "Bill transaction failed");
                ApiError::new(500, ErrorType::TransactionFailure, INTERNAL_MESSAGE)
            }
        }
    }
}

/// Errors raised while bringing the service up.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] DbError),
}
