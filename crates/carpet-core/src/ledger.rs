//! # Stock Ledger Rules
//!
//! Pure stock movement math: how a movement changes an item's quantity and
//! which warnings the result should raise.
//!
//! ## Movement Semantics
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  kind         new quantity              example (current = 10)          │
//! │  ──────────   ───────────────────────   ──────────────────────────────  │
//! │  in           current + q               in 5         → 15               │
//! │  out          max(0, current - q)       out 3        → 7                │
//! │                                         out 12       → 0 (clamped)      │
//! │  adjustment   q                         adjustment 4 → 4                │
//! │  transfer     (rejected)                                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Warnings
//! Warnings never block a movement:
//! - `new <= minimum_stock` → [`StockWarning::LowStock`]
//! - `new > maximum_stock` → [`StockWarning::Overstock`]
//! - `minimum_stock > maximum_stock` → [`StockWarning::ThresholdsInverted`]
//!
//! ## Usage
//! ```rust
//! use carpet_core::ledger::{compute_new_quantity, stock_warnings, StockWarning};
//! use carpet_core::MovementKind;
//!
//! let new = compute_new_quantity(7, MovementKind::Out, 8).unwrap();
//! assert_eq!(new, 0);
//! assert_eq!(
//!     stock_warnings(new, 5, 50),
//!     vec![StockWarning::LowStock { quantity: 0, minimum: 5 }]
//! );
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

use crate::error::ValidationError;
use crate::types::{InventoryItem, MovementKind, ReferenceType, StockMovement};
use crate::validation::{validate_movement_quantity, ValidationResult};

// =============================================================================
// Quantity Rule
// =============================================================================

/// Computes an item's quantity after a movement.
///
/// ## Errors
/// - `MustNotBeNegative` when `requested < 0`
/// - `NotAllowed` for [`MovementKind::Transfer`]
/// - `OutOfRange` when a stock-in would overflow
pub fn compute_new_quantity(
    current: i64,
    kind: MovementKind,
    requested: i64,
) -> ValidationResult<i64> {
    validate_movement_quantity(requested)?;

    match kind {
        MovementKind::In => current
            .checked_add(requested)
            .ok_or_else(|| ValidationError::OutOfRange {
                field: "quantity".to_string(),
                min: 0,
                max: i64::MAX - current,
            }),
        MovementKind::Out => Ok((current - requested).max(0)),
        MovementKind::Adjustment => Ok(requested),
        MovementKind::Transfer => Err(ValidationError::NotAllowed {
            field: "movement_type".to_string(),
            allowed: vec![
                "in".to_string(),
                "out".to_string(),
                "adjustment".to_string(),
            ],
        }),
    }
}

// =============================================================================
// Movement Request
// =============================================================================

/// A caller's request to move stock.
///
/// This is the shape the stock update form submits. `location` defaults to
/// the item's own location when omitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct MovementRequest {
    pub item_id: String,
    #[serde(alias = "type")]
    pub movement_type: MovementKind,
    pub quantity: i64,
    pub actor_id: String,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub reference_type: Option<ReferenceType>,
    #[serde(default)]
    pub reference_id: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
}

impl MovementRequest {
    pub fn new(
        item_id: impl Into<String>,
        movement_type: MovementKind,
        quantity: i64,
        actor_id: impl Into<String>,
    ) -> Self {
        Self {
            item_id: item_id.into(),
            movement_type,
            quantity,
            actor_id: actor_id.into(),
            notes: None,
            reference_type: None,
            reference_id: None,
            location: None,
        }
    }

    /// The stock-out a store records for one invoice line.
    pub fn for_invoice_line(
        item_id: impl Into<String>,
        quantity: i64,
        invoice_id: impl Into<String>,
        actor_id: impl Into<String>,
        location: impl Into<String>,
    ) -> Self {
        Self {
            reference_type: Some(ReferenceType::Invoice),
            reference_id: Some(invoice_id.into()),
            location: Some(location.into()),
            ..Self::new(item_id, MovementKind::Out, quantity, actor_id)
        }
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    pub fn with_reference(mut self, kind: ReferenceType, id: impl Into<String>) -> Self {
        self.reference_type = Some(kind);
        self.reference_id = Some(id.into());
        self
    }

    /// Decodes a request from JSON.
    ///
    /// Anything serde refuses (a fractional quantity, an unknown movement
    /// type, a missing field) becomes `InvalidFormat`.
    ///
    /// ```rust
    /// use carpet_core::ledger::MovementRequest;
    ///
    /// let ok = MovementRequest::from_json(
    ///     r#"{"itemId":"rug-1","movementType":"in","quantity":5,"actorId":"u1"}"#,
    /// );
    /// assert!(ok.is_ok());
    ///
    /// let fractional = MovementRequest::from_json(
    ///     r#"{"itemId":"rug-1","movementType":"in","quantity":2.5,"actorId":"u1"}"#,
    /// );
    /// assert!(fractional.is_err());
    /// ```
    pub fn from_json(json: &str) -> ValidationResult<Self> {
        serde_json::from_str(json)
            .map_err(|e| ValidationError::invalid_format("movement request", e.to_string()))
    }
}

// =============================================================================
// Planned Movement
// =============================================================================

/// A validated movement ready to be committed.
///
/// `expected_version` is the item version read when the plan was made. A
/// store must apply the movement only if the item is still at that version.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct NewStockMovement {
    pub item_id: String,
    pub movement_type: MovementKind,
    pub quantity: i64,
    pub previous_quantity: i64,
    pub new_quantity: i64,
    pub expected_version: i64,
    pub reference_type: Option<ReferenceType>,
    pub reference_id: Option<String>,
    pub notes: Option<String>,
    pub location: String,
    pub created_by: String,
}

/// Validates `request` against a fresh read of `item` and captures the
/// before/after quantities.
pub fn plan_movement(
    item: &InventoryItem,
    request: &MovementRequest,
) -> ValidationResult<NewStockMovement> {
    if request.item_id != item.id {
        return Err(ValidationError::UnknownReference {
            field: "item_id".to_string(),
            id: request.item_id.clone(),
        });
    }
    if request.actor_id.trim().is_empty() {
        return Err(ValidationError::required("actor_id"));
    }

    let new_quantity =
        compute_new_quantity(item.stock_quantity, request.movement_type, request.quantity)?;

    Ok(NewStockMovement {
        item_id: item.id.clone(),
        movement_type: request.movement_type,
        quantity: request.quantity,
        previous_quantity: item.stock_quantity,
        new_quantity,
        expected_version: item.version,
        reference_type: request.reference_type,
        reference_id: request.reference_id.clone(),
        notes: request.notes.clone(),
        location: request
            .location
            .clone()
            .unwrap_or_else(|| item.location.clone()),
        created_by: request.actor_id.clone(),
    })
}

// =============================================================================
// Warnings
// =============================================================================

/// A non-fatal advisory about the resulting stock level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "kind", rename_all = "snake_case")]
#[ts(export)]
pub enum StockWarning {
    LowStock { quantity: i64, minimum: i64 },
    Overstock { quantity: i64, maximum: i64 },
    ThresholdsInverted { minimum: i64, maximum: i64 },
}

impl StockWarning {
    /// Warnings for a movement that was applied to `item`.
    ///
    /// Thresholds come from `item`; the quantity comes from the movement.
    pub fn for_movement(item: &InventoryItem, movement: &StockMovement) -> Vec<StockWarning> {
        stock_warnings(movement.new_quantity, item.minimum_stock, item.maximum_stock)
    }
}

impl fmt::Display for StockWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StockWarning::LowStock { quantity, minimum } => {
                write!(f, "low stock: {} at or below minimum {}", quantity, minimum)
            }
            StockWarning::Overstock { quantity, maximum } => {
                write!(f, "overstock: {} above maximum {}", quantity, maximum)
            }
            StockWarning::ThresholdsInverted { minimum, maximum } => {
                write!(f, "minimum stock {} exceeds maximum {}", minimum, maximum)
            }
        }
    }
}

/// Evaluates threshold warnings for a quantity.
pub fn stock_warnings(quantity: i64, minimum: i64, maximum: i64) -> Vec<StockWarning> {
    let mut warnings = Vec::new();

    if minimum > maximum {
        warnings.push(StockWarning::ThresholdsInverted { minimum, maximum });
    }
    if quantity <= minimum {
        warnings.push(StockWarning::LowStock { quantity, minimum });
    }
    if quantity > maximum {
        warnings.push(StockWarning::Overstock { quantity, maximum });
    }

    warnings
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use proptest::prelude::*;

    fn item_with(stock: i64, min: i64, max: i64) -> InventoryItem {
        InventoryItem {
            id: "rug-1".to_string(),
            sku: "KIL-BLU-160X230".to_string(),
            barcode: "8690000000028".to_string(),
            name: "Kilim Blue".to_string(),
            item_type: "Kilim".to_string(),
            color: "Blue".to_string(),
            size: "160x230".to_string(),
            material: "Cotton".to_string(),
            location: "main".to_string(),
            supplier: None,
            description: None,
            unit_price_cents: 12_000,
            cost_price_cents: 7_000,
            stock_quantity: stock,
            minimum_stock: min,
            maximum_stock: max,
            created_by: "admin".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
            version: 3,
        }
    }

    #[test]
    fn test_in_adds() {
        assert_eq!(compute_new_quantity(10, MovementKind::In, 5).unwrap(), 15);
    }

    #[test]
    fn test_out_clamps_at_zero() {
        assert_eq!(compute_new_quantity(10, MovementKind::Out, 3).unwrap(), 7);
        assert_eq!(compute_new_quantity(7, MovementKind::Out, 8).unwrap(), 0);
    }

    #[test]
    fn test_adjustment_sets() {
        assert_eq!(compute_new_quantity(10, MovementKind::Adjustment, 4).unwrap(), 4);
        assert_eq!(compute_new_quantity(10, MovementKind::Adjustment, 0).unwrap(), 0);
    }

    #[test]
    fn test_transfer_is_rejected() {
        let err = compute_new_quantity(10, MovementKind::Transfer, 1).unwrap_err();
        assert!(matches!(err, ValidationError::NotAllowed { .. }));
    }

    #[test]
    fn test_negative_quantity_is_rejected() {
        for kind in [MovementKind::In, MovementKind::Out, MovementKind::Adjustment] {
            assert!(compute_new_quantity(10, kind, -1).is_err());
        }
    }

    #[test]
    fn test_in_overflow_is_rejected() {
        assert!(compute_new_quantity(i64::MAX, MovementKind::In, 1).is_err());
    }

    #[test]
    fn test_plan_captures_previous_new_and_version() {
        let item = item_with(10, 5, 50);
        let request = MovementRequest::new("rug-1", MovementKind::Out, 3, "clerk-1")
            .with_notes("sold at fair");

        let planned = plan_movement(&item, &request).unwrap();
        assert_eq!(planned.previous_quantity, 10);
        assert_eq!(planned.new_quantity, 7);
        assert_eq!(planned.quantity, 3);
        assert_eq!(planned.expected_version, 3);
        assert_eq!(planned.location, "main");
        assert_eq!(planned.notes.as_deref(), Some("sold at fair"));
    }

    #[test]
    fn test_plan_rejects_mismatched_item_and_missing_actor() {
        let item = item_with(10, 5, 50);

        let wrong_item = MovementRequest::new("rug-2", MovementKind::In, 1, "clerk-1");
        assert!(matches!(
            plan_movement(&item, &wrong_item),
            Err(ValidationError::UnknownReference { .. })
        ));

        let no_actor = MovementRequest::new("rug-1", MovementKind::In, 1, " ");
        assert_eq!(
            plan_movement(&item, &no_actor),
            Err(ValidationError::required("actor_id"))
        );
    }

    #[test]
    fn test_invoice_line_request() {
        let request = MovementRequest::for_invoice_line("rug-1", 2, "inv-1", "clerk-1", "annex");
        assert_eq!(request.movement_type, MovementKind::Out);
        assert_eq!(request.reference_type, Some(ReferenceType::Invoice));
        assert_eq!(request.reference_id.as_deref(), Some("inv-1"));
        assert_eq!(request.location.as_deref(), Some("annex"));
    }

    #[test]
    fn test_from_json() {
        let request = MovementRequest::from_json(
            r#"{"itemId":"rug-1","type":"adjustment","quantity":4,"actorId":"u1","notes":"count"}"#,
        )
        .unwrap();
        assert_eq!(request.movement_type, MovementKind::Adjustment);
        assert_eq!(request.notes.as_deref(), Some("count"));

        let err = MovementRequest::from_json(
            r#"{"itemId":"rug-1","movementType":"in","quantity":2.5,"actorId":"u1"}"#,
        )
        .unwrap_err();
        assert!(matches!(err, ValidationError::InvalidFormat { .. }));

        let err = MovementRequest::from_json(
            r#"{"itemId":"rug-1","movementType":"restock","quantity":2,"actorId":"u1"}"#,
        )
        .unwrap_err();
        assert!(matches!(err, ValidationError::InvalidFormat { .. }));
    }

    #[test]
    fn test_scenario_out_without_warning_then_clamped_with_warning() {
        // current 10, min 5: out 3 → 7, nothing to report
        assert_eq!(compute_new_quantity(10, MovementKind::Out, 3).unwrap(), 7);
        assert!(stock_warnings(7, 5, 50).is_empty());

        // current 7: out 8 → 0, low stock
        let new = compute_new_quantity(7, MovementKind::Out, 8).unwrap();
        assert_eq!(new, 0);
        assert_eq!(
            stock_warnings(new, 5, 50),
            vec![StockWarning::LowStock {
                quantity: 0,
                minimum: 5
            }]
        );
    }

    #[test]
    fn test_warning_boundaries() {
        // minimum is inclusive
        assert_eq!(stock_warnings(5, 5, 50).len(), 1);
        assert!(stock_warnings(6, 5, 50).is_empty());
        // maximum is exclusive
        assert!(stock_warnings(50, 5, 50).is_empty());
        assert_eq!(
            stock_warnings(51, 5, 50),
            vec![StockWarning::Overstock {
                quantity: 51,
                maximum: 50
            }]
        );
    }

    #[test]
    fn test_inverted_thresholds_warn() {
        let warnings = stock_warnings(20, 30, 10);
        assert!(warnings.contains(&StockWarning::ThresholdsInverted {
            minimum: 30,
            maximum: 10
        }));
        assert!(warnings.contains(&StockWarning::LowStock {
            quantity: 20,
            minimum: 30
        }));
        assert!(warnings.contains(&StockWarning::Overstock {
            quantity: 20,
            maximum: 10
        }));
    }

    proptest! {
        #[test]
        fn prop_in_adds_exactly(current in 0i64..1_000_000, q in 0i64..1_000_000) {
            prop_assert_eq!(compute_new_quantity(current, MovementKind::In, q).unwrap(), current + q);
        }

        #[test]
        fn prop_out_never_negative(current in 0i64..1_000_000, q in 0i64..2_000_000) {
            let new = compute_new_quantity(current, MovementKind::Out, q).unwrap();
            prop_assert!(new >= 0);
            prop_assert_eq!(new, (current - q).max(0));
        }

        #[test]
        fn prop_adjustment_sets(current in 0i64..1_000_000, q in 0i64..1_000_000) {
            prop_assert_eq!(compute_new_quantity(current, MovementKind::Adjustment, q).unwrap(), q);
        }
    }
}
