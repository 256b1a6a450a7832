//! # POS Cart
//!
//! The cart the point-of-sale screen builds before checkout.
//!
//! ## Cart Operations
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  POS Action               Cart Method            Effect                 │
//! │  ──────────               ───────────            ──────                 │
//! │  Click carpet ──────────► add_item() ──────────► push, or qty += n      │
//! │  Change quantity ───────► update_quantity() ───► qty = n (0 removes)    │
//! │  Click remove ──────────► remove_item() ───────► drop the line          │
//! │  Checkout succeeded ────► clear() ─────────────► empty                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The prices held here are for display only. Checkout re-reads every item
//! and prices the invoice from that fresh read.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::InventoryItem;
use crate::validation::validate_quantity;
use crate::{MAX_CART_ITEMS, MAX_ITEM_QUANTITY};

/// One line in the cart.
///
/// Name, SKU and price are snapshots taken when the carpet was added.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CartLine {
    pub item_id: String,
    pub sku: String,
    pub name: String,
    /// Price shown when the line was added.
    pub unit_price_cents: i64,
    pub quantity: i64,
    #[ts(as = "String")]
    pub added_at: DateTime<Utc>,
}

impl CartLine {
    pub fn from_item(item: &InventoryItem, quantity: i64) -> Self {
        CartLine {
            item_id: item.id.clone(),
            sku: item.sku.clone(),
            name: item.name.clone(),
            unit_price_cents: item.unit_price_cents,
            quantity,
            added_at: Utc::now(),
        }
    }

    /// Saturates at the `i64` bounds; the invoice calculator does the checked math.
    pub fn line_total(&self) -> Money {
        Money::from_cents(self.unit_price_cents.saturating_mul(self.quantity))
    }
}

/// The POS cart.
///
/// ## Invariants
/// - Lines are unique by `item_id` (adding the same carpet increases quantity)
/// - Every quantity is in `1..=MAX_ITEM_QUANTITY`
/// - At most `MAX_CART_ITEMS` lines
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Cart {
    pub lines: Vec<CartLine>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl Default for Cart {
    fn default() -> Self {
        Self::new()
    }
}

impl Cart {
    pub fn new() -> Self {
        Cart {
            lines: Vec::new(),
            created_at: Utc::now(),
        }
    }

    /// Adds a carpet, or increases its quantity if already in the cart.
    pub fn add_item(&mut self, item: &InventoryItem, quantity: i64) -> CoreResult<()> {
        validate_quantity(quantity)?;

        if let Some(line) = self.lines.iter_mut().find(|l| l.item_id == item.id) {
            let new_qty = line.quantity + quantity;
            if new_qty > MAX_ITEM_QUANTITY {
                return Err(CoreError::QuantityTooLarge {
                    requested: new_qty,
                    max: MAX_ITEM_QUANTITY,
                });
            }
            line.quantity = new_qty;
            return Ok(());
        }

        if self.lines.len() >= MAX_CART_ITEMS {
            return Err(CoreError::CartTooLarge {
                max: MAX_CART_ITEMS,
            });
        }

        self.lines.push(CartLine::from_item(item, quantity));
        Ok(())
    }

    /// Sets a line's quantity. Zero removes the line.
    pub fn update_quantity(&mut self, item_id: &str, quantity: i64) -> CoreResult<()> {
        if quantity == 0 {
            return self.remove_item(item_id);
        }
        if quantity > MAX_ITEM_QUANTITY {
            return Err(CoreError::QuantityTooLarge {
                requested: quantity,
                max: MAX_ITEM_QUANTITY,
            });
        }
        validate_quantity(quantity)?;

        match self.lines.iter_mut().find(|l| l.item_id == item_id) {
            Some(line) => {
                line.quantity = quantity;
                Ok(())
            }
            None => Err(CoreError::ItemNotFound(item_id.to_string())),
        }
    }

    pub fn remove_item(&mut self, item_id: &str) -> CoreResult<()> {
        let before = self.lines.len();
        self.lines.retain(|l| l.item_id != item_id);

        if self.lines.len() == before {
            Err(CoreError::ItemNotFound(item_id.to_string()))
        } else {
            Ok(())
        }
    }

    pub fn clear(&mut self) {
        self.lines.clear();
        self.created_at = Utc::now();
    }

    pub fn item_count(&self) -> usize {
        self.lines.len()
    }

    pub fn total_quantity(&self) -> i64 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    /// Display subtotal from the snapshot prices.
    pub fn subtotal(&self) -> Money {
        let cents = self
            .lines
            .iter()
            .fold(0i64, |acc, line| acc.saturating_add(line.line_total().cents()));
        Money::from_cents(cents)
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}
