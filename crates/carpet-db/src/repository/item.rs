//! # Inventory Repository
//!
//! Database operations for inventory items.
//!
//! Item quantities are never written from here: `stock_quantity` and
//! `version` only change through [`super::movement::MovementRepository::apply`]
//! or invoice creation, so every change has a ledger entry.

use carpet_core::validation::validate_inventory_item;
use carpet_core::InventoryItem;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};

pub(crate) const ITEM_COLUMNS: &str = r#"
    id, sku, barcode, name, item_type, color, size, material, location,
    supplier, description, unit_price_cents, cost_price_cents,
    stock_quantity, minimum_stock, maximum_stock,
    created_by, created_at, updated_at, version
"#;

/// Repository for inventory item database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = db.inventory();
/// repo.insert(&item).await?;
/// let low = repo.list_low_stock().await?;
/// ```
#[derive(Debug, Clone)]
pub struct InventoryRepository {
    pool: SqlitePool,
}

impl InventoryRepository {
    pub fn new(pool: SqlitePool) -> Self {
        InventoryRepository { pool }
    }

    /// Inserts a new item, including its opening stock.
    pub async fn insert(&self, item: &InventoryItem) -> DbResult<()> {
        validate_inventory_item(item)?;
        debug!(id = %item.id, sku = %item.sku, "Inserting inventory item");

        sqlx::query(&format!(
            "INSERT INTO inventory_items ({ITEM_COLUMNS}) VALUES \
             (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20)"
        ))
        .bind(&item.id)
        .bind(&item.sku)
        .bind(&item.barcode)
        .bind(&item.name)
        .bind(&item.item_type)
        .bind(&item.color)
        .bind(&item.size)
        .bind(&item.material)
        .bind(&item.location)
        .bind(&item.supplier)
        .bind(&item.description)
        .bind(item.unit_price_cents)
        .bind(item.cost_price_cents)
        .bind(item.stock_quantity)
        .bind(item.minimum_stock)
        .bind(item.maximum_stock)
        .bind(&item.created_by)
        .bind(item.created_at)
        .bind(item.updated_at)
        .bind(item.version)
        .execute(&self.pool)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::UniqueViolation { field, .. } if field == "sku" => {
                DbError::duplicate("sku", &item.sku)
            }
            DbError::UniqueViolation { field, .. } if field == "barcode" => {
                DbError::duplicate("barcode", &item.barcode)
            }
            other => other,
        })?;

        Ok(())
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<InventoryItem>> {
        let item = sqlx::query_as::<_, InventoryItem>(&format!(
            "SELECT {ITEM_COLUMNS} FROM inventory_items WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(item)
    }

    pub async fn get_by_sku(&self, sku: &str) -> DbResult<Option<InventoryItem>> {
        let item = sqlx::query_as::<_, InventoryItem>(&format!(
            "SELECT {ITEM_COLUMNS} FROM inventory_items WHERE sku = ?1"
        ))
        .bind(sku)
        .fetch_optional(&self.pool)
        .await?;

        Ok(item)
    }

    /// Lists items ordered by name.
    pub async fn list(&self, limit: i64, offset: i64) -> DbResult<Vec<InventoryItem>> {
        let items = sqlx::query_as::<_, InventoryItem>(&format!(
            "SELECT {ITEM_COLUMNS} FROM inventory_items ORDER BY name, sku LIMIT ?1 OFFSET ?2"
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Items at or below their low-stock threshold.
    pub async fn list_low_stock(&self) -> DbResult<Vec<InventoryItem>> {
        let items = sqlx::query_as::<_, InventoryItem>(&format!(
            "SELECT {ITEM_COLUMNS} FROM inventory_items \
             WHERE stock_quantity <= minimum_stock ORDER BY stock_quantity, name"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM inventory_items")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}
