//! # carpet-pos: Ledger and Checkout Services
//!
//! The services a till or the back office calls: apply stock movements and
//! check out a cart. Storage is reached only through the traits in [`store`].
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   Dashboard / till                                                      │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  ┌─────────────────────── carpet-pos ───────────────────────────────┐  │
//! │  │  StockLedger<S>          CheckoutOrchestrator<S>                 │  │
//! │  │       │                        │                                 │  │
//! │  │       └──────────┬─────────────┘                                 │  │
//! │  │                  ▼                                               │  │
//! │  │   InventoryStore / CustomerStore / InvoiceStore                  │  │
//! │  │        MemoryStore           SqliteStore ──► carpet-db           │  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                                                                         │
//! │   carpet-core supplies the math: ledger rules, invoice totals, cart    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust,ignore
//! use carpet_pos::{init_tracing, CheckoutOrchestrator, PaymentDetails, PosConfig, SqliteStore};
//!
//! let config = PosConfig::load(None)?;
//! init_tracing(&config.logging.filter);
//!
//! let db = carpet_db::Database::new(config.db_config()).await?;
//! let mut checkout = CheckoutOrchestrator::new(SqliteStore::new(db), &config);
//! let invoice = checkout.checkout(&cart, &PaymentDetails::walk_in(PaymentMethod::Cash)).await?;
//! cart.clear();
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod checkout;
pub mod config;
pub mod error;
pub mod ledger;
pub mod store;
pub mod telemetry;

// =============================================================================
// Re-exports
// =============================================================================

pub use checkout::{CheckoutOrchestrator, CheckoutState, PaymentDetails};
pub use config::{ConfigError, ConfigResult, PosConfig};
pub use error::{CheckoutError, ServiceError, ServiceResult};
pub use ledger::StockLedger;
pub use store::{CustomerStore, InventoryStore, InvoiceStore, MemoryStore, SqliteStore};
pub use telemetry::init_tracing;
