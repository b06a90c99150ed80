//! # kirana-core: Pure Business Logic for Kirana Billing
//!
//! This crate holds the domain model and every rule that can be checked
//! without touching storage.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Kirana Billing Architecture                        │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 kirana-api (request boundary)                   │   │
//! │  │    create_bill, adjust_stock, list_products, create_contact     │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ kirana-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │   order   │  │ numbering │  │   │
//! │  │   │  Product  │  │   Money   │  │ Validator │  │ BILL-...  │  │   │
//! │  │   │   Bill    │  │  (paise)  │  │ per line  │  │ counters  │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 kirana-db (Database Layer)                      │   │
//! │  │      SQLite, repositories, the bill transaction                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Bill, LineItem, Contact)
//! - [`money`] - Money type with integer paise arithmetic
//! - [`order`] - Order line parsing and the per-bill stock validator
//! - [`numbering`] - Counter names and the `BILL-YYYY-NNNNNN` format
//! - [`validation`] - Field-level input rules
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use kirana_core::money::Money;
//!
//! let price = Money::from_paise(1050); // ₹10.50
//! let line_total = price * 3;
//! assert_eq!(line_total.paise(), 3150);
//! assert_eq!(line_total.to_string(), "₹31.50");
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod money;
pub mod numbering;
pub mod order;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use numbering::Counter;
pub use order::{
    BillLineRequest, CreateBillRequest, OrderLine, OrderValidator, StockReservation,
    ValidatedOrder,
};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Low-stock threshold given to products created without an explicit one.
pub const DEFAULT_MIN_STOCK_LEVEL: i64 = 5;

/// Number of contacts returned by the recent-contacts listing by default.
pub const DEFAULT_CONTACT_LIMIT: u32 = 20;

/// Upper bound for any listing limit accepted from a caller.
pub const MAX_LIST_LIMIT: u32 = 100;

/// Mobile numbers are exactly this many ASCII digits.
pub const MOBILE_NUMBER_LEN: usize = 10;
