//! SQLite-backed store over [`carpet_db::Database`].

use carpet_core::invoice::NewInvoice;
use carpet_core::ledger::NewStockMovement;
use carpet_core::{Customer, InventoryItem, Invoice, NewCustomer, StockMovement};
use carpet_db::Database;

use super::{CustomerStore, InventoryStore, InvoiceStore};
use crate::error::{ServiceError, ServiceResult};

/// Store adapter mapping `DbError` into [`ServiceError`].
#[derive(Debug, Clone)]
pub struct SqliteStore {
    db: Database,
}

impl SqliteStore {
    pub fn new(db: Database) -> Self {
        SqliteStore { db }
    }

    pub fn database(&self) -> &Database {
        &self.db
    }
}

impl InventoryStore for SqliteStore {
    async fn get_item(&self, item_id: &str) -> ServiceResult<InventoryItem> {
        self.db
            .inventory()
            .get_by_id(item_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("InventoryItem", item_id))
    }

    async fn commit_movement(&self, movement: &NewStockMovement) -> ServiceResult<StockMovement> {
        Ok(self.db.movements().apply(movement).await?)
    }

    async fn movements_for_item(&self, item_id: &str) -> ServiceResult<Vec<StockMovement>> {
        Ok(self.db.movements().list_for_item(item_id).await?)
    }
}

impl CustomerStore for SqliteStore {
    async fn create_customer(&self, customer: &NewCustomer) -> ServiceResult<Customer> {
        Ok(self.db.customers().create(customer).await?)
    }
}

impl InvoiceStore for SqliteStore {
    async fn create_invoice(&self, invoice: &NewInvoice) -> ServiceResult<Invoice> {
        Ok(self.db.invoices().create(invoice).await?)
    }
}
