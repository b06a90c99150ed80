//! # State Module
//!
//! Shared state handed to command handlers.
//!
//! ## Why Multiple State Types?
//! Handlers declare exactly what they need: most take only [`DbState`],
//! a few also read defaults from [`ConfigState`].
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    State Architecture                                   │
//! │                                                                         │
//! │  AppConfig::load()  ──►  kirana_api::start(&config)                     │
//! │                              │                                          │
//! │               ┌──────────────┴──────────────┐                           │
//! │               ▼                             ▼                           │
//! │  ┌──────────────────────┐      ┌──────────────────────────┐             │
//! │  │       DbState        │      │       ConfigState        │             │
//! │  │  Database (pool)     │      │  low_stock_default       │             │
//! │  │  bill attempts       │      │  contact_limit           │             │
//! │  └──────────────────────┘      └──────────────────────────┘             │
//! │                                                                         │
//! │  THREAD SAFETY:                                                        │
//! │  • DbState: SqlitePool is internally synchronised                      │
//! │  • ConfigState: read-only after startup                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod config;
mod db;

pub use config::ConfigState;
pub use db::DbState;
