//! # Error Types
//!
//! Domain-specific error types for kirana-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  kirana-core errors (this file)                                        │
//! │  ├── CoreError        - Business rule violations, per-line failures    │
//! │  └── ValidationError  - Malformed or missing input                     │
//! │                                                                         │
//! │  kirana-db errors                                                      │
//! │  ├── DbError          - Storage failures                               │
//! │  └── BillingError     - Bill transaction outcome                       │
//! │                                                                         │
//! │  kirana-api errors                                                     │
//! │  └── ApiError         - What the caller sees (errorType, message)      │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → BillingError → ApiError           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Line indexes are zero-based positions in the request's `items` array.

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// None of these are raised after a durable mutation: every check runs
/// before stock is touched, so aborting needs no compensation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// Product referenced outside of a bill (stock adjustment, lookup).
    #[error("Product not found: {product_id}")]
    ProductNotFound { product_id: i64 },

    /// Product referenced by a bill line does not exist.
    #[error("Item {index}: product {product_id} not found")]
    LineProductNotFound { index: usize, product_id: i64 },

    /// Cumulative quantity requested for a product exceeds its stock.
    ///
    /// ## User Workflow
    /// ```text
    /// items: [{productId: 1, quantity: 2}, {productId: 1, quantity: 2}]
    ///      │
    ///      ▼
    /// line 0: reserved 2 of 3  ✓
    /// line 1: reserved 4 of 3  ✗
    ///      │
    ///      ▼
    /// InsufficientStock { index: 1, product_id: 1, available: 3, requested: 4 }
    /// ```
    #[error(
        "Item {index}: insufficient stock for product {product_id}: available {available}, requested {requested}"
    )]
    InsufficientStock {
        index: usize,
        product_id: i64,
        available: i64,
        requested: i64,
    },

    /// A stock adjustment would take stock below zero.
    #[error("Stock for product {product_id} cannot go below zero: available {available}, change {delta}")]
    NegativeStock {
        product_id: i64,
        available: i64,
        delta: i64,
    },

    /// A stock adjustment would push stock past what an i64 can hold.
    #[error("Stock for product {product_id} cannot grow by {delta}: available {available}")]
    StockOverflow {
        product_id: i64,
        available: i64,
        delta: i64,
    },

    /// Bill request carries no line items.
    #[error("Bill must contain at least one item")]
    EmptyOrder,

    /// A bill line is malformed (non-integer id, zero quantity, ...).
    #[error("Item {index} is invalid: {reason}")]
    InvalidLine { index: usize, reason: String },

    /// Bill number does not exist in the ledger.
    #[error("Bill not found: {0}")]
    BillNotFound(String),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Zero-based request line the error refers to, when there is one.
    pub fn item_index(&self) -> Option<usize> {
        match self {
            CoreError::LineProductNotFound { index, .. }
            | CoreError::InsufficientStock { index, .. }
            | CoreError::InvalidLine { index, .. } => Some(*index),
            _ => None,
        }
    }

    /// Creates an InvalidLine error.
    pub fn invalid_line(index: usize, reason: impl Into<String>) -> Self {
        CoreError::InvalidLine {
            index,
            reason: reason.into(),
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Raised before any storage access; never associated with a mutation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., mobile number, bill number).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

impl ValidationError {
    /// Creates a Required error.
    pub fn required(field: impl Into<String>) -> Self {
        ValidationError::Required {
            field: field.into(),
        }
    }

    /// Creates an InvalidFormat error.
    pub fn invalid_format(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ValidationError::InvalidFormat {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
