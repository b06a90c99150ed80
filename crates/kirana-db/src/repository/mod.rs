//! # Repository Module
//!
//! Database repository implementations for the billing backend.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern                                   │
//! │                                                                         │
//! │  Command handler                                                       │
//! │       │  db.products().adjust_stock(1, 5)                              │
//! │       ▼                                                                 │
//! │  ProductRepository                                                     │
//! │  ├── &self methods        → use the pool, own their transaction        │
//! │  └── *_in(conn, ...) fns  → run on a caller's transaction              │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! │                                                                         │
//! │  The bill transaction composes the *_in functions of several           │
//! │  repositories on one connection so they commit together.               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`CounterRepository`](counter::CounterRepository) - Named sequences
//! - [`ProductRepository`](product::ProductRepository) - Catalog and stock
//! - [`BillRepository`](bill::BillRepository) - Bill ledger
//! - [`ContactRepository`](contact::ContactRepository) - Contact directory

pub mod bill;
pub mod contact;
pub mod counter;
pub mod product;
