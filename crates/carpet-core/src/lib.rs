//! # carpet-core: Pure Business Logic for Carpet POS
//!
//! This crate is the **heart** of Carpet POS. It contains the stock ledger
//! rules, the invoice calculator and the POS cart as pure functions with zero
//! I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Carpet POS Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Dashboard (web)                              │   │
//! │  │   Inventory ──► Stock Update ──► Invoices ──► POS Checkout      │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             carpet-pos (StockLedger, CheckoutOrchestrator)      │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ carpet-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │  ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌──────────┐  │   │
//! │  │  │  types  │ │  money  │ │ ledger  │ │ invoice │ │   cart   │  │   │
//! │  │  │  Item   │ │  Money  │ │ in/out/ │ │ totals  │ │ CartLine │  │   │
//! │  │  │ Invoice │ │ Percent │ │ adjust  │ │ drafts  │ │          │  │   │
//! │  │  └─────────┘ └─────────┘ └─────────┘ └─────────┘ └──────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    carpet-db (SQLite store)                     │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (InventoryItem, StockMovement, Invoice, ...)
//! - [`money`] - Money and Percentage types with integer arithmetic
//! - [`ledger`] - Stock movement rules and threshold warnings
//! - [`invoice`] - Invoice calculator and editable drafts
//! - [`cart`] - Point-of-sale cart
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation
//!
//! ## Example Usage
//!
//! ```rust
//! use carpet_core::invoice::{compute_invoice_totals, Catalog, CatalogEntry, InvoiceLine};
//! use carpet_core::Percentage;
//!
//! let lines = vec![InvoiceLine::new("rug-1", 2, 10_000)];
//! let catalog = Catalog::from_entries([CatalogEntry::new("rug-1", "PER-RED-200X300", "Tabriz Red", 10_000)]);
//!
//! let totals = compute_invoice_totals(
//!     "customer-1",
//!     &lines,
//!     Percentage::try_from_bps(1000).unwrap(), // 10% discount
//!     Percentage::try_from_bps(500).unwrap(),  // 5% tax
//!     &catalog,
//! )
//! .unwrap();
//!
//! assert_eq!(totals.total.cents(), 18_900); // 189.00
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod error;
pub mod invoice;
pub mod ledger;
pub mod money;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, ValidationError};
pub use money::{Money, Percentage};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum distinct lines allowed in a single POS cart.
pub const MAX_CART_ITEMS: usize = 100;

/// Maximum quantity of a single item in the cart.
///
/// ## Business Reason
/// Prevents accidental over-ordering (e.g., typing 1000 instead of 10).
pub const MAX_ITEM_QUANTITY: i64 = 999;

/// Prefix for human-readable invoice numbers (`INV-000042`).
pub const DEFAULT_INVOICE_PREFIX: &str = "INV";
