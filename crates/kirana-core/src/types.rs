//! # Domain Types
//!
//! Core domain types used throughout the billing backend.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │      Bill       │   │    Contact      │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (counter)   │   │  bill_number    │   │  mobile_number  │       │
//! │  │  name           │   │  items ───────┐ │   │  name           │       │
//! │  │  localized_name │   │  grand_total  │ │   │  last_used      │       │
//! │  │  price, stock   │   │  customer     │ │   └─────────────────┘       │
//! │  └────────▲────────┘   └───────────────┼─┘                             │
//! │           │ soft reference             ▼                                │
//! │           │            ┌─────────────────┐                              │
//! │           └────────────│    LineItem     │  snapshot of name + price   │
//! │                        │  product_id     │  taken at billing time      │
//! │                        └─────────────────┘                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Snapshot Pattern
//! A line item copies `localized_name` and `unit_price` out of the product.
//! Editing or deleting the product later never changes a committed bill.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::validation::{
    validate_localized_name, validate_min_stock_level, validate_mobile_number,
    validate_person_name, validate_price, validate_product_name, ValidationResult,
};
use crate::error::ValidationError;

// =============================================================================
// Product
// =============================================================================

/// A product in the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Product {
    /// Integer ID minted by the `productId` counter. Never reused.
    #[ts(type = "number")]
    pub id: i64,

    /// Display name (English).
    pub name: String,

    /// Name in the local language, printed on bills.
    pub localized_name: String,

    /// Unit price.
    pub price: Money,

    /// Units on hand. Never negative.
    #[ts(type = "number")]
    pub stock: i64,

    /// Stock below this level shows up in the low-stock listing.
    #[ts(type = "number")]
    pub min_stock_level: i64,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl Product {
    /// True when the product belongs in the low-stock listing.
    #[inline]
    pub fn is_low_stock(&self) -> bool {
        self.stock < self.min_stock_level
    }

    /// True when `quantity` units can be taken from current stock.
    #[inline]
    pub fn can_fulfil(&self, quantity: i64) -> bool {
        quantity <= self.stock
    }
}

/// Incoming product creation request, as loosely typed as callers send it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub localized_name: Option<String>,
    /// Rupees, as a number or a decimal string.
    #[serde(default)]
    pub price: Option<serde_json::Value>,
    #[serde(default)]
    pub min_stock_level: Option<i64>,
}

impl CreateProductRequest {
    /// Validates every field and produces an insertable product.
    ///
    /// ## Rules
    /// - `name` and `localizedName` are required
    /// - `price` must be a positive amount
    /// - `minStockLevel` falls back to `default_min_stock_level`
    pub fn validate(&self, default_min_stock_level: i64) -> ValidationResult<NewProduct> {
        let name = self.name.as_deref().unwrap_or_default();
        validate_product_name(name)?;

        let localized_name = self.localized_name.as_deref().unwrap_or_default();
        validate_localized_name(localized_name)?;

        let price = match &self.price {
            None | Some(serde_json::Value::Null) => {
                return Err(ValidationError::required("price"))
            }
            Some(value) => Money::from_json(value).ok_or_else(|| {
                ValidationError::invalid_format("price", "must be a number")
            })?,
        };
        validate_price(price)?;

        let min_stock_level = self.min_stock_level.unwrap_or(default_min_stock_level);
        validate_min_stock_level(min_stock_level)?;

        Ok(NewProduct {
            name: name.trim().to_string(),
            localized_name: localized_name.trim().to_string(),
            price,
            min_stock_level,
        })
    }
}

/// A validated product ready for insertion. Stock always starts at 0.
#[derive(Debug, Clone, PartialEq)]
pub struct NewProduct {
    pub name: String,
    pub localized_name: String,
    pub price: Money,
    pub min_stock_level: i64,
}

/// In-place edit of a product's descriptive fields. Stock is not editable here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ProductUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub localized_name: Option<String>,
    #[serde(default)]
    pub price: Option<Money>,
    #[serde(default)]
    #[ts(type = "number | null")]
    pub min_stock_level: Option<i64>,
}

impl ProductUpdate {
    /// Validates the fields that are present and trims names.
    pub fn validate(&self) -> ValidationResult<ProductUpdate> {
        if let Some(name) = &self.name {
            validate_product_name(name)?;
        }
        if let Some(localized_name) = &self.localized_name {
            validate_localized_name(localized_name)?;
        }
        if let Some(price) = self.price {
            validate_price(price)?;
        }
        if let Some(level) = self.min_stock_level {
            validate_min_stock_level(level)?;
        }

        Ok(ProductUpdate {
            name: self.name.as_ref().map(|n| n.trim().to_string()),
            localized_name: self.localized_name.as_ref().map(|n| n.trim().to_string()),
            price: self.price,
            min_stock_level: self.min_stock_level,
        })
    }

    /// True when the update would change nothing.
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.localized_name.is_none()
            && self.price.is_none()
            && self.min_stock_level.is_none()
    }
}

// =============================================================================
// Stock Adjustment
// =============================================================================

/// One stock delta. `quantity` is signed: positive restocks, negative removes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct StockAdjustment {
    #[ts(type = "number")]
    pub product_id: i64,
    #[serde(alias = "delta")]
    #[ts(type = "number")]
    pub quantity: i64,
}

/// Why a single entry of a bulk adjustment was not applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub enum AdjustmentFailure {
    /// No product with that ID.
    NotFound,
    /// The delta would take stock below zero.
    NegativeStock,
    /// The delta would overflow the stock counter.
    StockOverflow,
}

/// Per-entry outcome of a bulk stock adjustment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct StockAdjustmentResult {
    #[ts(type = "number")]
    pub product_id: i64,
    pub success: bool,
    /// Stock after the adjustment, when it was applied.
    #[ts(type = "number | null")]
    pub stock: Option<i64>,
    pub reason: Option<AdjustmentFailure>,
    pub message: Option<String>,
}

impl StockAdjustmentResult {
    pub fn applied(product_id: i64, stock: i64) -> Self {
        StockAdjustmentResult {
            product_id,
            success: true,
            stock: Some(stock),
            reason: None,
            message: None,
        }
    }

    pub fn rejected(product_id: i64, reason: AdjustmentFailure, message: impl Into<String>) -> Self {
        StockAdjustmentResult {
            product_id,
            success: false,
            stock: None,
            reason: Some(reason),
            message: Some(message.into()),
        }
    }
}

// =============================================================================
// Bill
// =============================================================================

/// A line of a committed bill. Values are frozen at billing time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct LineItem {
    #[ts(type = "number")]
    pub product_id: i64,
    /// Local-language name at time of billing (frozen).
    pub localized_name: String,
    #[ts(type = "number")]
    pub quantity: i64,
    /// Unit price at time of billing (frozen).
    pub unit_price: Money,
    /// `quantity × unit_price`.
    pub line_total: Money,
}

/// An immutable, committed bill.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Bill {
    /// `BILL-<year>-<6-digit sequence>`.
    pub bill_number: String,
    pub items: Vec<LineItem>,
    /// Sum of all line totals.
    pub grand_total: Money,
    pub customer_name: String,
    pub mobile_number: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// A bill that has been validated and priced but has no number yet.
#[derive(Debug, Clone, PartialEq)]
pub struct BillDraft {
    pub items: Vec<LineItem>,
    pub grand_total: Money,
    pub customer_name: String,
    pub mobile_number: String,
}

impl BillDraft {
    /// Attaches the minted number and timestamp.
    pub fn into_bill(self, bill_number: String, created_at: DateTime<Utc>) -> Bill {
        Bill {
            bill_number,
            items: self.items,
            grand_total: self.grand_total,
            customer_name: self.customer_name,
            mobile_number: self.mobile_number,
            created_at,
        }
    }
}

/// Bill header without its line items, for listings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct BillSummary {
    pub bill_number: String,
    pub grand_total: Money,
    pub customer_name: String,
    pub mobile_number: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// A line item joined with the product's current record at read time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct LineItemDetails {
    #[ts(type = "number")]
    pub product_id: i64,
    pub localized_name: String,
    #[ts(type = "number")]
    pub quantity: i64,
    pub unit_price: Money,
    pub line_total: Money,
    /// Current product record; serialized as `null` once the product is gone.
    pub product: Option<Product>,
}

impl LineItemDetails {
    pub fn new(item: LineItem, product: Option<Product>) -> Self {
        LineItemDetails {
            product_id: item.product_id,
            localized_name: item.localized_name,
            quantity: item.quantity,
            unit_price: item.unit_price,
            line_total: item.line_total,
            product,
        }
    }
}

/// A bill as displayed: stored snapshot plus live product details.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct BillDetails {
    pub bill_number: String,
    pub items: Vec<LineItemDetails>,
    pub grand_total: Money,
    pub customer_name: String,
    pub mobile_number: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Contact
// =============================================================================

/// A customer contact, one per mobile number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Contact {
    pub name: String,
    pub mobile_number: String,
    #[ts(as = "String")]
    pub last_used: DateTime<Utc>,
}

/// Outcome of an insert-if-absent on the contact directory.
///
/// `created = false` is the duplicate path: the existing contact is returned
/// untouched and nothing is reported as an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ContactUpsert {
    pub created: bool,
    pub contact: Contact,
}

/// Incoming contact creation request.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct NewContact {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub mobile_number: Option<String>,
}

impl NewContact {
    /// Returns the trimmed `(name, mobile_number)` pair.
    pub fn validate(&self) -> ValidationResult<(String, String)> {
        let name = self.name.as_deref().unwrap_or_default();
        validate_person_name("name", name)?;

        let mobile = self.mobile_number.as_deref().unwrap_or_default();
        validate_mobile_number(mobile)?;

        Ok((name.trim().to_string(), mobile.trim().to_string()))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
