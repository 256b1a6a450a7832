//! # carpet-db: Database Layer for Carpet POS
//!
//! The SQLite reference implementation of the store the POS services talk
//! to. It uses sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Carpet POS Data Flow                             │
//! │                                                                         │
//! │  carpet-pos (StockLedger / CheckoutOrchestrator via SqliteStore)        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    carpet-db (THIS CRATE)                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌────────────────────┐  ┌────────────┐  │   │
//! │  │   │   Database    │    │    Repositories    │  │ Migrations │  │   │
//! │  │   │   (pool.rs)   │    │                    │  │ (embedded) │  │   │
//! │  │   │               │    │ InventoryRepo      │  │            │  │   │
//! │  │   │ SqlitePool    │◄───│ MovementRepo       │  │ 001_init   │  │   │
//! │  │   │ Connection    │    │ CustomerRepo       │  │            │  │   │
//! │  │   │ Management    │    │ InvoiceRepo        │  │            │  │   │
//! │  │   └───────────────┘    └────────────────────┘  └────────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite Database (file, or :memory: for tests)                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations
//!
//! ## Usage
//!
//! ```rust,ignore
//! use carpet_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("./carpet.db")).await?;
//! let low = db.inventory().list_low_stock().await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

pub use repository::customer::CustomerRepository;
pub use repository::invoice::InvoiceRepository;
pub use repository::item::InventoryRepository;
pub use repository::movement::MovementRepository;
