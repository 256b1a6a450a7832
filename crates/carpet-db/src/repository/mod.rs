//! # Repository Module
//!
//! Database repository implementations for Carpet POS.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern                                   │
//! │                                                                         │
//! │  SqliteStore (carpet-pos)                                               │
//! │       │                                                                 │
//! │       │  db.movements().apply(&planned)                                 │
//! │       ▼                                                                 │
//! │  MovementRepository                                                     │
//! │  ├── apply(&self, movement)     ← version-checked, one transaction     │
//! │  ├── list_for_item(&self, id)                                           │
//! │  └── list_for_reference(&self, kind, id)                                │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`item::InventoryRepository`] - Inventory items and thresholds
//! - [`movement::MovementRepository`] - The append-only stock ledger
//! - [`customer::CustomerRepository`] - Customers
//! - [`invoice::InvoiceRepository`] - Invoices, their lines and the stock
//!   they consume

pub mod customer;
pub mod invoice;
pub mod item;
pub mod movement;
