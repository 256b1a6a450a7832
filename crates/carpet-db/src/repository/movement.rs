//! # Movement Repository
//!
//! The append-only stock ledger.
//!
//! ## Applying a Movement
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  BEGIN                                                                  │
//! │    UPDATE inventory_items                                               │
//! │       SET stock_quantity = :new, version = version + 1                  │
//! │     WHERE id = :item AND version = :expected                            │
//! │         │                                                               │
//! │         ├── 0 rows, item missing  → NotFound         (ROLLBACK)         │
//! │         ├── 0 rows, version moved → VersionConflict  (ROLLBACK)         │
//! │         ▼                                                               │
//! │    INSERT INTO stock_movements (...)                                    │
//! │  COMMIT                                                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//! The quantity write and the ledger entry land together or not at all.

use carpet_core::ledger::NewStockMovement;
use carpet_core::{ReferenceType, StockMovement};
use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::{DbError, DbResult};

const MOVEMENT_COLUMNS: &str = r#"
    id, item_id, movement_type, quantity, previous_quantity, new_quantity,
    reference_type, reference_id, notes, location, created_by, created_at
"#;

/// Repository for stock movements.
#[derive(Debug, Clone)]
pub struct MovementRepository {
    pool: SqlitePool,
}

impl MovementRepository {
    pub fn new(pool: SqlitePool) -> Self {
        MovementRepository { pool }
    }

    /// Records `movement` and sets the item's quantity in one transaction,
    /// provided the item is still at `movement.expected_version`.
    pub async fn apply(&self, movement: &NewStockMovement) -> DbResult<StockMovement> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        let recorded = apply_in_tx(&mut *tx, movement, Utc::now()).await?;

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        Ok(recorded)
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<StockMovement>> {
        let movement = sqlx::query_as::<_, StockMovement>(&format!(
            "SELECT {MOVEMENT_COLUMNS} FROM stock_movements WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(movement)
    }

    /// Movements for an item, oldest first.
    pub async fn list_for_item(&self, item_id: &str) -> DbResult<Vec<StockMovement>> {
        let movements = sqlx::query_as::<_, StockMovement>(&format!(
            "SELECT {MOVEMENT_COLUMNS} FROM stock_movements \
             WHERE item_id = ?1 ORDER BY created_at, rowid"
        ))
        .bind(item_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(movements)
    }

    /// Movements linked to a business event, e.g. every line of an invoice.
    pub async fn list_for_reference(
        &self,
        reference_type: ReferenceType,
        reference_id: &str,
    ) -> DbResult<Vec<StockMovement>> {
        let movements = sqlx::query_as::<_, StockMovement>(&format!(
            "SELECT {MOVEMENT_COLUMNS} FROM stock_movements \
             WHERE reference_type = ?1 AND reference_id = ?2 ORDER BY created_at, rowid"
        ))
        .bind(reference_type)
        .bind(reference_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(movements)
    }
}

/// Version-checked quantity write plus ledger insert on an open transaction.
///
/// The caller owns commit/rollback.
pub(crate) async fn apply_in_tx(
    conn: &mut SqliteConnection,
    movement: &NewStockMovement,
    now: DateTime<Utc>,
) -> DbResult<StockMovement> {
    let updated = sqlx::query(
        "UPDATE inventory_items \
         SET stock_quantity = ?1, version = version + 1, updated_at = ?2 \
         WHERE id = ?3 AND version = ?4",
    )
    .bind(movement.new_quantity)
    .bind(now)
    .bind(&movement.item_id)
    .bind(movement.expected_version)
    .execute(&mut *conn)
    .await?;

    if updated.rows_affected() == 0 {
        let actual: Option<i64> =
            sqlx::query_scalar("SELECT version FROM inventory_items WHERE id = ?1")
                .bind(&movement.item_id)
                .fetch_optional(&mut *conn)
                .await?;

        return Err(match actual {
            None => DbError::not_found("InventoryItem", &movement.item_id),
            Some(actual) => {
                warn!(
                    item_id = %movement.item_id,
                    expected = movement.expected_version,
                    actual,
                    "Stale version on stock movement"
                );
                DbError::VersionConflict {
                    entity: "InventoryItem".to_string(),
                    id: movement.item_id.clone(),
                    expected: movement.expected_version,
                    actual,
                }
            }
        });
    }

    let recorded = StockMovement {
        id: Uuid::new_v4().to_string(),
        item_id: movement.item_id.clone(),
        movement_type: movement.movement_type,
        quantity: movement.quantity,
        previous_quantity: movement.previous_quantity,
        new_quantity: movement.new_quantity,
        reference_type: movement.reference_type,
        reference_id: movement.reference_id.clone(),
        notes: movement.notes.clone(),
        location: movement.location.clone(),
        created_by: movement.created_by.clone(),
        created_at: now,
    };

    sqlx::query(&format!(
        "INSERT INTO stock_movements ({MOVEMENT_COLUMNS}) VALUES \
         (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)"
    ))
    .bind(&recorded.id)
    .bind(&recorded.item_id)
    .bind(recorded.movement_type)
    .bind(recorded.quantity)
    .bind(recorded.previous_quantity)
    .bind(recorded.new_quantity)
    .bind(recorded.reference_type)
    .bind(&recorded.reference_id)
    .bind(&recorded.notes)
    .bind(&recorded.location)
    .bind(&recorded.created_by)
    .bind(recorded.created_at)
    .execute(&mut *conn)
    .await?;

    debug!(
        item_id = %recorded.item_id,
        movement_type = %recorded.movement_type,
        previous_quantity = recorded.previous_quantity,
        new_quantity = recorded.new_quantity,
        "Stock movement recorded"
    );

    Ok(recorded)
}
