//! # kirana-db: Database Layer for Kirana Billing
//!
//! This crate provides storage for the billing backend.
//! It uses SQLite with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Kirana Data Flow                                 │
//! │                                                                         │
//! │  Command handler (create_bill)                                         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     kirana-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │               │    │  (embedded)  │  │   │
//! │  │   │               │    │ CounterRepo   │    │              │  │   │
//! │  │   │ SqlitePool    │◄───│ ProductRepo   │    │ 001_init.sql │  │   │
//! │  │   │               │    │ BillRepo      │    │              │  │   │
//! │  │   │               │    │ ContactRepo   │    │              │  │   │
//! │  │   └───────▲───────┘    └───────▲───────┘    └──────────────┘  │   │
//! │  │           │                    │                                │   │
//! │  │   ┌───────┴────────────────────┴──────┐                        │   │
//! │  │   │  BillingService (billing.rs)      │  one transaction per   │   │
//! │  │   │  validate → decrement → append    │  bill, retried on BUSY │   │
//! │  │   └───────────────────────────────────┘                        │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite Database (WAL)                                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations
//! - [`billing`] - The bill transaction
//!
//! ## Usage
//!
//! ```rust,ignore
//! use kirana_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("kirana.db")).await?;
//!
//! let bill = db.billing().create_bill(&request).await?;
//! let low = db.products().list_low_stock().await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod billing;
pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use billing::{BillingError, BillingResult, BillingService};
pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig, DbTarget};

// Repository re-exports for convenience
pub use repository::bill::BillRepository;
pub use repository::contact::ContactRepository;
pub use repository::counter::CounterRepository;
pub use repository::product::ProductRepository;
