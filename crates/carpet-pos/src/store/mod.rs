//! # Store Boundary
//!
//! The traits the services use to reach persistence. Every call is a
//! suspension point; nothing else in the services awaits.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │   StockLedger ───────────► InventoryStore                               │
//! │                              get_item / commit_movement / history       │
//! │                                                                         │
//! │   CheckoutOrchestrator ──► InventoryStore (prices)                      │
//! │                       ├──► CustomerStore  create_customer               │
//! │                       └──► InvoiceStore   create_invoice                │
//! │                                           (stock-out per line)          │
//! │                                                                         │
//! │   Implementations: MemoryStore (tests, demos)                           │
//! │                    SqliteStore (carpet-db)                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

// The services are generic over the store and never spawn its futures, so
// no Send bound is needed.
#![allow(async_fn_in_trait)]

use carpet_core::invoice::NewInvoice;
use carpet_core::ledger::NewStockMovement;
use carpet_core::{Customer, InventoryItem, Invoice, NewCustomer, StockMovement};

use crate::error::ServiceResult;

pub mod memory;
pub mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// Item lookup and movement persistence.
pub trait InventoryStore {
    /// The item as currently stored, or `NotFound`.
    async fn get_item(&self, item_id: &str) -> ServiceResult<InventoryItem>;

    /// Records `movement` and sets the item's quantity to
    /// `movement.new_quantity`, both or neither.
    ///
    /// Fails with `Conflict` if the item's version is no longer
    /// `movement.expected_version`.
    async fn commit_movement(&self, movement: &NewStockMovement) -> ServiceResult<StockMovement>;

    /// Movements for an item, oldest first.
    async fn movements_for_item(&self, item_id: &str) -> ServiceResult<Vec<StockMovement>>;
}

pub trait CustomerStore {
    async fn create_customer(&self, customer: &NewCustomer) -> ServiceResult<Customer>;
}

pub trait InvoiceStore {
    /// Persists the invoice, assigns the next invoice number and takes every
    /// line out of stock (clamped at zero), all as one unit.
    ///
    /// Rejects submissions whose totals disagree with their lines.
    async fn create_invoice(&self, invoice: &NewInvoice) -> ServiceResult<Invoice>;
}
