//! # Validation Module
//!
//! Field-level input rules.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Request boundary (kirana-api)                                │
//! │  └── Deserialization into loosely typed request structs                │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE + order validator                                │
//! │  ├── Required fields, formats, ranges                                  │
//! │  └── Runs before any transaction is opened                             │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── CHECK (stock >= 0)                                                │
//! │  └── PRIMARY KEY / UNIQUE constraints                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use kirana_core::validation::{validate_mobile_number, validate_quantity};
//!
//! assert!(validate_mobile_number("9876543210").is_ok());
//! assert!(validate_mobile_number("+919876543210").is_err());
//! assert!(validate_quantity(0).is_err());
//! ```

use crate::error::ValidationError;
use crate::money::Money;
use crate::{MAX_LIST_LIMIT, MOBILE_NUMBER_LEN};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

const MAX_NAME_LEN: usize = 200;

// =============================================================================
// String Validators
// =============================================================================

fn validate_required_text(field: &str, value: &str, max: usize) -> ValidationResult<()> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::required(field));
    }

    if value.chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }

    Ok(())
}

/// Validates a product's display name.
pub fn validate_product_name(name: &str) -> ValidationResult<()> {
    validate_required_text("name", name, MAX_NAME_LEN)
}

/// Validates a product's local-language name.
///
/// Length is counted in characters, not bytes: Tamil text is three bytes per
/// code point in UTF-8.
pub fn validate_localized_name(name: &str) -> ValidationResult<()> {
    validate_required_text("localizedName", name, MAX_NAME_LEN)
}

/// Validates a customer or contact name under the given field label.
pub fn validate_person_name(field: &str, name: &str) -> ValidationResult<()> {
    validate_required_text(field, name, MAX_NAME_LEN)
}

/// Validates a mobile number: exactly 10 ASCII digits, surrounding
/// whitespace ignored.
///
/// ## Example
/// ```rust
/// use kirana_core::validation::validate_mobile_number;
///
/// assert!(validate_mobile_number(" 9876543210 ").is_ok());
/// assert!(validate_mobile_number("98765 43210").is_err());
/// assert!(validate_mobile_number("").is_err());
/// ```
pub fn validate_mobile_number(mobile: &str) -> ValidationResult<()> {
    let mobile = mobile.trim();

    if mobile.is_empty() {
        return Err(ValidationError::required("mobileNumber"));
    }

    if mobile.len() != MOBILE_NUMBER_LEN || !mobile.chars().all(|c| c.is_ascii_digit()) {
        return Err(ValidationError::invalid_format(
            "mobileNumber",
            format!("must be exactly {} digits", MOBILE_NUMBER_LEN),
        ));
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a bill line quantity. Must be positive.
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    Ok(())
}

/// Validates a product price. Must be positive when set through the catalog.
pub fn validate_price(price: Money) -> ValidationResult<()> {
    if !price.is_positive() {
        return Err(ValidationError::MustBePositive {
            field: "price".to_string(),
        });
    }

    Ok(())
}

/// Validates a low-stock threshold.
pub fn validate_min_stock_level(level: i64) -> ValidationResult<()> {
    if level < 0 {
        return Err(ValidationError::OutOfRange {
            field: "minStockLevel".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Validates a listing limit and returns it.
pub fn validate_list_limit(limit: u32) -> ValidationResult<u32> {
    if limit == 0 || limit > MAX_LIST_LIMIT {
        return Err(ValidationError::OutOfRange {
            field: "limit".to_string(),
            min: 1,
            max: MAX_LIST_LIMIT as i64,
        });
    }

    Ok(limit)
}

// =============================================================================
// Unit Tests
// =============================================================================
