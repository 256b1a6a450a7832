//! # Stock Ledger Service
//!
//! Applies stock movements against a store with a read-plan-commit cycle.
//!
//! ## Apply Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  MovementRequest                                                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  store.get_item(id)            fresh read: quantity + version           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  plan_movement(item, request)  in / out (clamped) / adjustment          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  store.commit_movement(plan)   CAS on version ── stale → Conflict       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  warnings (low stock, overstock) logged at WARN                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A conflict is returned to the caller as-is; the ledger never retries.

use carpet_core::ledger::{plan_movement, MovementRequest, StockWarning};
use carpet_core::StockMovement;
use tracing::{debug, info, warn};

use crate::error::ServiceResult;
use crate::store::InventoryStore;

/// The stock ledger over any [`InventoryStore`].
#[derive(Debug, Clone)]
pub struct StockLedger<S> {
    store: S,
}

impl<S: InventoryStore> StockLedger<S> {
    pub fn new(store: S) -> Self {
        StockLedger { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Applies one movement and returns the recorded ledger entry.
    ///
    /// ## Errors
    /// - `NotFound` if the item does not exist
    /// - `Validation` for a negative quantity, the reserved `transfer` kind
    ///   or a blank actor
    /// - `Conflict` if the item changed between the read and the commit
    pub async fn apply_movement(&self, request: &MovementRequest) -> ServiceResult<StockMovement> {
        let item = self.store.get_item(&request.item_id).await?;
        let planned = plan_movement(&item, request)?;

        debug!(
            item_id = %planned.item_id,
            movement_type = %planned.movement_type,
            quantity = planned.quantity,
            previous_quantity = planned.previous_quantity,
            new_quantity = planned.new_quantity,
            "Committing stock movement"
        );

        let movement = self.store.commit_movement(&planned).await?;

        info!(
            item_id = %movement.item_id,
            movement_id = %movement.id,
            new_quantity = movement.new_quantity,
            "Stock movement applied"
        );

        for warning in StockWarning::for_movement(&item, &movement) {
            warn!(item_id = %movement.item_id, sku = %item.sku, "{}", warning);
        }

        Ok(movement)
    }

    /// Decodes a JSON request and applies it.
    pub async fn apply_json(&self, json: &str) -> ServiceResult<StockMovement> {
        let request = MovementRequest::from_json(json)?;
        self.apply_movement(&request).await
    }

    /// Movements for an item, oldest first.
    pub async fn history(&self, item_id: &str) -> ServiceResult<Vec<StockMovement>> {
        self.store.movements_for_item(item_id).await
    }

    /// Threshold warnings for `movement`, using the item's current thresholds.
    pub async fn warnings_for(&self, movement: &StockMovement) -> ServiceResult<Vec<StockWarning>> {
        let item = self.store.get_item(&movement.item_id).await?;
        Ok(StockWarning::for_movement(&item, movement))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ServiceError;
    use crate::store::MemoryStore;
    use carpet_core::{InventoryItem, MovementKind};
    use chrono::Utc;
    use proptest::prelude::*;

    fn rug(stock: i64, min: i64, max: i64) -> InventoryItem {
        InventoryItem {
            id: "rug-1".to_string(),
            sku: "PER-1".to_string(),
            barcode: "869-PER-1".to_string(),
            name: "Persian Red 200x300".to_string(),
            item_type: "Persian".to_string(),
            color: "Red".to_string(),
            size: "200x300".to_string(),
            material: "Wool".to_string(),
            location: "main".to_string(),
            supplier: None,
            description: None,
            unit_price_cents: 10_000,
            cost_price_cents: 6_000,
            stock_quantity: stock,
            minimum_stock: min,
            maximum_stock: max,
            created_by: "admin".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
            version: 0,
        }
    }

    async fn ledger_with(item: InventoryItem) -> StockLedger<MemoryStore> {
        let store = MemoryStore::new();
        store.insert_item(item).await.unwrap();
        StockLedger::new(store)
    }

    #[tokio::test]
    async fn test_in_out_adjustment() {
        let ledger = ledger_with(rug(10, 5, 50)).await;

        let m = ledger
            .apply_movement(&MovementRequest::new("rug-1", MovementKind::In, 4, "u1"))
            .await
            .unwrap();
        assert_eq!((m.previous_quantity, m.new_quantity), (10, 14));

        let m = ledger
            .apply_movement(&MovementRequest::new("rug-1", MovementKind::Out, 20, "u1"))
            .await
            .unwrap();
        assert_eq!((m.previous_quantity, m.new_quantity), (14, 0));

        let m = ledger
            .apply_movement(&MovementRequest::new("rug-1", MovementKind::Adjustment, 9, "u1"))
            .await
            .unwrap();
        assert_eq!((m.previous_quantity, m.new_quantity), (0, 9));

        assert_eq!(ledger.store().get_item("rug-1").await.unwrap().stock_quantity, 9);
        assert_eq!(ledger.history("rug-1").await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_rejections_write_nothing() {
        let ledger = ledger_with(rug(10, 5, 50)).await;

        let transfer = MovementRequest::new("rug-1", MovementKind::Transfer, 1, "u1");
        assert!(matches!(
            ledger.apply_movement(&transfer).await,
            Err(ServiceError::Validation(_))
        ));

        let negative = MovementRequest::new("rug-1", MovementKind::In, -1, "u1");
        assert!(matches!(
            ledger.apply_movement(&negative).await,
            Err(ServiceError::Validation(_))
        ));

        let missing = MovementRequest::new("nope", MovementKind::In, 1, "u1");
        assert!(matches!(
            ledger.apply_movement(&missing).await,
            Err(ServiceError::NotFound { .. })
        ));

        assert!(ledger.history("rug-1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_fractional_json_quantity_is_validation() {
        let ledger = ledger_with(rug(10, 5, 50)).await;
        let err = ledger
            .apply_json(r#"{"itemId":"rug-1","type":"in","quantity":2.5,"actorId":"u1"}"#)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));

        let ok = ledger
            .apply_json(r#"{"itemId":"rug-1","type":"in","quantity":2,"actorId":"u1"}"#)
            .await
            .unwrap();
        assert_eq!(ok.new_quantity, 12);
    }

    #[tokio::test]
    async fn test_warnings_for_overstock() {
        let ledger = ledger_with(rug(10, 5, 12)).await;
        let m = ledger
            .apply_movement(&MovementRequest::new("rug-1", MovementKind::In, 5, "u1"))
            .await
            .unwrap();

        assert_eq!(
            ledger.warnings_for(&m).await.unwrap(),
            vec![StockWarning::Overstock {
                quantity: 15,
                maximum: 12
            }]
        );
    }

    proptest! {
        #[test]
        fn prop_stock_never_negative(
            start in 0i64..1_000,
            ops in proptest::collection::vec((0u8..3, 0i64..500), 1..12),
        ) {
            let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
            rt.block_on(async {
                let ledger = ledger_with(rug(start, 5, 50)).await;
                for (kind, qty) in &ops {
                    let kind = match kind {
                        0 => MovementKind::In,
                        1 => MovementKind::Out,
                        _ => MovementKind::Adjustment,
                    };
                    let m = ledger
                        .apply_movement(&MovementRequest::new("rug-1", kind, *qty, "u1"))
                        .await
                        .unwrap();
                    prop_assert!(m.new_quantity >= 0);
                }
                let history = ledger.history("rug-1").await.unwrap();
                prop_assert_eq!(history.len(), ops.len());
                for pair in history.windows(2) {
                    prop_assert_eq!(pair[0].new_quantity, pair[1].previous_quantity);
                }
                Ok(())
            })?;
        }
    }
}
