//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use carpet_core::invoice::NewInvoice;
use carpet_core::ledger::NewStockMovement;
use carpet_core::{Customer, InventoryItem, Invoice, NewCustomer, StockMovement};
use carpet_db::{Database, DbConfig};
use carpet_pos::{
    CustomerStore, InventoryStore, InvoiceStore, MemoryStore, ServiceError, ServiceResult,
    SqliteStore,
};
use chrono::Utc;

pub fn rug(id: &str, price_cents: i64, stock: i64, min: i64, max: i64) -> InventoryItem {
    InventoryItem {
        id: id.to_string(),
        sku: format!("SKU-{}", id),
        barcode: format!("869-{}", id),
        name: format!("Persian {}", id),
        item_type: "Persian".to_string(),
        color: "Red".to_string(),
        size: "200x300".to_string(),
        material: "Wool".to_string(),
        location: "main".to_string(),
        supplier: None,
        description: None,
        unit_price_cents: price_cents,
        cost_price_cents: price_cents / 2,
        stock_quantity: stock,
        minimum_stock: min,
        maximum_stock: max,
        created_by: "admin".to_string(),
        created_at: Utc::now(),
        updated_at: Utc::now(),
        version: 0,
    }
}

pub async fn memory_store(items: &[InventoryItem]) -> MemoryStore {
    let store = MemoryStore::new();
    for item in items {
        store.insert_item(item.clone()).await.unwrap();
    }
    store
}

pub async fn sqlite_store(items: &[InventoryItem]) -> SqliteStore {
    let db = Database::new(DbConfig::in_memory()).await.unwrap();
    for item in items {
        db.inventory().insert(item).await.unwrap();
    }
    SqliteStore::new(db)
}

/// Wraps a store and fails invoice creation on demand.
#[derive(Debug, Clone)]
pub struct FailingInvoices<S> {
    pub inner: S,
}

impl<S: InventoryStore> InventoryStore for FailingInvoices<S> {
    async fn get_item(&self, item_id: &str) -> ServiceResult<InventoryItem> {
        self.inner.get_item(item_id).await
    }

    async fn commit_movement(&self, movement: &NewStockMovement) -> ServiceResult<StockMovement> {
        self.inner.commit_movement(movement).await
    }

    async fn movements_for_item(&self, item_id: &str) -> ServiceResult<Vec<StockMovement>> {
        self.inner.movements_for_item(item_id).await
    }
}

impl<S: CustomerStore> CustomerStore for FailingInvoices<S> {
    async fn create_customer(&self, customer: &NewCustomer) -> ServiceResult<Customer> {
        self.inner.create_customer(customer).await
    }
}

impl<S> InvoiceStore for FailingInvoices<S> {
    async fn create_invoice(&self, _invoice: &NewInvoice) -> ServiceResult<Invoice> {
        Err(ServiceError::Transport("connection reset by peer".to_string()))
    }
}
