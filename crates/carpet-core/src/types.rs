//! # Domain Types
//!
//! Core domain types used throughout Carpet POS.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │  InventoryItem  │   │  StockMovement  │   │    Customer     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │◄──│  item_id        │   │  id (UUID)      │       │
//! │  │  sku / barcode  │   │  movement_type  │   │  email (unique) │       │
//! │  │  stock_quantity │   │  previous → new │   │  location       │       │
//! │  │  min / max      │   │  reference_*    │   └────────▲────────┘       │
//! │  │  version (CAS)  │   └─────────────────┘            │                │
//! │  └────────▲────────┘                                  │                │
//! │           │            ┌─────────────────┐   ┌────────┴────────┐       │
//! │           └────────────│   InvoiceItem   │──►│     Invoice     │       │
//! │                        │  ─────────────  │   │  ─────────────  │       │
//! │                        │  unit_price     │   │  invoice_number │       │
//! │                        │  (captured)     │   │  status         │       │
//! │                        │  discount_bps   │   │  totals (derived)│      │
//! │                        └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! Every entity has:
//! - `id`: UUID v4 - immutable, used for relations
//! - Business ID: (sku, barcode, invoice_number) - human-readable

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::{Money, Percentage};

// =============================================================================
// Inventory Item
// =============================================================================

/// One stocked carpet variant.
///
/// `stock_quantity` is never written directly: it changes only through a
/// stock movement, and every write bumps `version`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct InventoryItem {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Stock Keeping Unit - business identifier.
    pub sku: String,

    pub barcode: String,

    pub name: String,

    /// Carpet type (e.g. "Persian", "Modern"), `type` on the wire.
    #[serde(rename = "type")]
    pub item_type: String,

    pub color: String,

    /// Free-form size label, e.g. "200x300".
    pub size: String,

    pub material: String,

    /// Store or warehouse holding this stock.
    pub location: String,

    pub supplier: Option<String>,

    pub description: Option<String>,

    /// Selling price in cents.
    pub unit_price_cents: i64,

    /// Purchase cost in cents.
    pub cost_price_cents: i64,

    /// Current stock level. Never negative.
    pub stock_quantity: i64,

    /// Low-stock threshold (inclusive).
    pub minimum_stock: i64,

    /// Overstock threshold (exclusive).
    pub maximum_stock: i64,

    pub created_by: String,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,

    /// Bumped on every quantity write; the compare-and-swap token.
    pub version: i64,
}

impl InventoryItem {
    /// Returns the selling price as Money.
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }

    /// Returns the cost price as Money.
    #[inline]
    pub fn cost_price(&self) -> Money {
        Money::from_cents(self.cost_price_cents)
    }

    /// True when the item sits at or below its low-stock threshold.
    #[inline]
    pub fn is_low_stock(&self) -> bool {
        self.stock_quantity <= self.minimum_stock
    }
}

// =============================================================================
// Movement Kind
// =============================================================================

/// The kind of a stock movement.
///
/// `Transfer` exists so stored history round-trips, but the ledger refuses to
/// apply it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum MovementKind {
    /// Additive increase.
    In,
    /// Additive decrease, clamped at zero.
    Out,
    /// Absolute set.
    Adjustment,
    /// Reserved for multi-location transfers.
    Transfer,
}

impl MovementKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            MovementKind::In => "in",
            MovementKind::Out => "out",
            MovementKind::Adjustment => "adjustment",
            MovementKind::Transfer => "transfer",
        }
    }
}

impl fmt::Display for MovementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MovementKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "in" => Ok(MovementKind::In),
            "out" => Ok(MovementKind::Out),
            "adjustment" => Ok(MovementKind::Adjustment),
            "transfer" => Ok(MovementKind::Transfer),
            _ => Err(ValidationError::NotAllowed {
                field: "movement_type".to_string(),
                allowed: ["in", "out", "adjustment", "transfer"]
                    .iter()
                    .map(|s| s.to_string())
                    .collect(),
            }),
        }
    }
}

// =============================================================================
// Reference Type
// =============================================================================

/// The business event a movement is linked to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum ReferenceType {
    Invoice,
    Purchase,
    Adjustment,
    Transfer,
}

// =============================================================================
// Stock Movement
// =============================================================================

/// An immutable, append-only ledger entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct StockMovement {
    pub id: String,
    pub item_id: String,
    pub movement_type: MovementKind,
    /// The quantity the caller asked for (not the applied delta).
    pub quantity: i64,
    pub previous_quantity: i64,
    pub new_quantity: i64,
    pub reference_type: Option<ReferenceType>,
    pub reference_id: Option<String>,
    pub notes: Option<String>,
    pub location: String,
    /// Actor who recorded the movement.
    pub created_by: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl StockMovement {
    /// Signed change actually applied (`new - previous`).
    ///
    /// For a clamped `out` this is smaller in magnitude than `quantity`.
    #[inline]
    pub fn applied_delta(&self) -> i64 {
        self.new_quantity - self.previous_quantity
    }
}

// =============================================================================
// Customer
// =============================================================================

/// A customer invoices are billed to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Customer {
    pub id: String,
    pub name: String,
    /// Unique across customers.
    pub email: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub location: String,
    pub tax_number: Option<String>,
    pub credit_limit_cents: Option<i64>,
    pub payment_terms: Option<String>,
    pub created_by: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// Input for creating a customer. The store assigns `id` and `created_at`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct NewCustomer {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub location: String,
    pub tax_number: Option<String>,
    pub credit_limit_cents: Option<i64>,
    pub payment_terms: Option<String>,
    pub created_by: String,
}

// =============================================================================
// Invoice Status
// =============================================================================

/// Lifecycle status of an invoice.
///
/// ```text
///   draft ──► unpaid ──► partially_paid ──► paid
///     │         │              │              │
///     └─────────┴──────────────┴──────────────┴──► cancelled (terminal)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum InvoiceStatus {
    #[default]
    Draft,
    Unpaid,
    PartiallyPaid,
    Paid,
    Cancelled,
}

impl InvoiceStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            InvoiceStatus::Draft => "draft",
            InvoiceStatus::Unpaid => "unpaid",
            InvoiceStatus::PartiallyPaid => "partially_paid",
            InvoiceStatus::Paid => "paid",
            InvoiceStatus::Cancelled => "cancelled",
        }
    }

    /// Whether `self → next` is an allowed transition.
    pub fn can_transition_to(&self, next: InvoiceStatus) -> bool {
        use InvoiceStatus::*;
        matches!(
            (self, next),
            (Draft, Unpaid | PartiallyPaid | Paid | Cancelled)
                | (Unpaid, PartiallyPaid | Paid | Cancelled)
                | (PartiallyPaid, Paid | Cancelled)
                | (Paid, Cancelled)
        )
    }

    #[inline]
    pub fn is_terminal(&self) -> bool {
        matches!(self, InvoiceStatus::Cancelled)
    }
}

impl fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Payment Method
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum PaymentMethod {
    /// Physical cash payment.
    Cash,
    /// Card payment on an external terminal.
    CreditCard,
}

impl PaymentMethod {
    pub const fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::CreditCard => "credit_card",
        }
    }
}

/// Accepts the dashboard labels ("Cash", "Credit Card") as well as the
/// stored snake_case form.
impl FromStr for PaymentMethod {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .to_ascii_lowercase()
            .chars()
            .map(|c| if c == ' ' || c == '-' { '_' } else { c })
            .collect();

        match normalized.as_str() {
            "cash" => Ok(PaymentMethod::Cash),
            "credit_card" | "card" | "creditcard" => Ok(PaymentMethod::CreditCard),
            _ => Err(ValidationError::NotAllowed {
                field: "payment_method".to_string(),
                allowed: vec!["cash".to_string(), "credit_card".to_string()],
            }),
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Invoice
// =============================================================================

/// A persisted invoice.
///
/// The `*_cents` totals are derived from `items` and stored alongside them;
/// stores recompute them on write and refuse mismatches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Invoice {
    pub id: String,
    /// Sequential human-readable number, e.g. `INV-000042`.
    pub invoice_number: String,
    pub customer_id: String,
    #[cfg_attr(feature = "sqlx", sqlx(skip))]
    pub items: Vec<InvoiceItem>,
    pub subtotal_cents: i64,
    pub discount_bps: u32,
    pub discount_cents: i64,
    pub tax_bps: u32,
    pub tax_cents: i64,
    pub total_cents: i64,
    pub status: InvoiceStatus,
    pub payment_amount_cents: i64,
    pub payment_method: Option<PaymentMethod>,
    #[ts(as = "Option<String>")]
    pub payment_date: Option<DateTime<Utc>>,
    #[ts(as = "String")]
    pub due_date: DateTime<Utc>,
    pub notes: Option<String>,
    pub location: String,
    pub created_by: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl Invoice {
    #[inline]
    pub fn subtotal(&self) -> Money {
        Money::from_cents(self.subtotal_cents)
    }

    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }

    #[inline]
    pub fn discount(&self) -> Percentage {
        Percentage::from_bps(self.discount_bps)
    }

    #[inline]
    pub fn tax(&self) -> Percentage {
        Percentage::from_bps(self.tax_bps)
    }

    /// Amount still owed.
    pub fn balance_due(&self) -> Money {
        (self.total() - Money::from_cents(self.payment_amount_cents)).floor_zero()
    }
}

// =============================================================================
// Invoice Item
// =============================================================================

/// A line on an invoice.
/// Captures the unit price at the time of sale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct InvoiceItem {
    pub id: String,
    pub invoice_id: String,
    pub item_id: String,
    /// 1-based position within the invoice.
    pub line_no: i64,
    pub quantity: i64,
    /// Unit price in cents at time of sale (frozen).
    pub unit_price_cents: i64,
    pub discount_bps: u32,
    pub discount_cents: i64,
    pub total_cents: i64,
}

impl InvoiceItem {
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }

    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_movement_kind_parse() {
        assert_eq!("in".parse::<MovementKind>().unwrap(), MovementKind::In);
        assert_eq!("OUT".parse::<MovementKind>().unwrap(), MovementKind::Out);
        assert_eq!(
            " Adjustment ".parse::<MovementKind>().unwrap(),
            MovementKind::Adjustment
        );
        assert!(matches!(
            "refill".parse::<MovementKind>(),
            Err(ValidationError::NotAllowed { .. })
        ));
    }

    #[test]
    fn test_payment_method_accepts_dashboard_labels() {
        assert_eq!("Cash".parse::<PaymentMethod>().unwrap(), PaymentMethod::Cash);
        assert_eq!(
            "Credit Card".parse::<PaymentMethod>().unwrap(),
            PaymentMethod::CreditCard
        );
        assert_eq!("card".parse::<PaymentMethod>().unwrap(), PaymentMethod::CreditCard);
        assert!("cheque".parse::<PaymentMethod>().is_err());
    }

    #[test]
    fn test_invoice_status_default() {
        assert_eq!(InvoiceStatus::default(), InvoiceStatus::Draft);
    }

    #[test]
    fn test_invoice_status_transitions() {
        use InvoiceStatus::*;

        assert!(Draft.can_transition_to(Paid));
        assert!(Unpaid.can_transition_to(PartiallyPaid));
        assert!(Paid.can_transition_to(Cancelled));

        assert!(!Paid.can_transition_to(Draft));
        assert!(!PartiallyPaid.can_transition_to(Unpaid));
        assert!(!Cancelled.can_transition_to(Paid));
        assert!(!Draft.can_transition_to(Draft));
        assert!(Cancelled.is_terminal());
    }

    #[test]
    fn test_serde_wire_names() {
        let json = serde_json::to_string(&InvoiceStatus::PartiallyPaid).unwrap();
        assert_eq!(json, "\"partially_paid\"");

        let json = serde_json::to_string(&MovementKind::Adjustment).unwrap();
        assert_eq!(json, "\"adjustment\"");

        let json = serde_json::to_string(&PaymentMethod::CreditCard).unwrap();
        assert_eq!(json, "\"credit_card\"");
    }
}
