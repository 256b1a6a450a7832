//! # In-Memory Store
//!
//! A store held in process memory behind one async mutex. It follows the same
//! contract as the SQLite store: version-checked movements, sequential
//! invoice numbers, all-or-nothing invoice creation.

use carpet_core::invoice::NewInvoice;
use carpet_core::ledger::{compute_new_quantity, NewStockMovement};
use carpet_core::validation::{validate_inventory_item, validate_new_customer};
use carpet_core::{
    Customer, InventoryItem, Invoice, MovementKind, NewCustomer, ReferenceType, StockMovement,
    DEFAULT_INVOICE_PREFIX,
};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;
use uuid::Uuid;

use super::{CustomerStore, InventoryStore, InvoiceStore};
use crate::error::{ServiceError, ServiceResult};

#[derive(Debug, Default)]
struct State {
    items: HashMap<String, InventoryItem>,
    movements: Vec<StockMovement>,
    customers: HashMap<String, Customer>,
    invoices: Vec<Invoice>,
    last_sequence: i64,
}

/// Store backed by in-process maps. Clones share the same state.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    state: Arc<Mutex<State>>,
    invoice_prefix: String,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore {
            state: Arc::new(Mutex::new(State::default())),
            invoice_prefix: DEFAULT_INVOICE_PREFIX.to_string(),
        }
    }

    pub fn with_invoice_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.invoice_prefix = prefix.into();
        self
    }

    /// Adds an item with its opening stock.
    pub async fn insert_item(&self, item: InventoryItem) -> ServiceResult<()> {
        validate_inventory_item(&item)?;

        let mut state = self.state.lock().await;
        if state.items.values().any(|i| i.sku == item.sku) {
            return Err(ServiceError::Validation(format!(
                "Duplicate sku: '{}' already exists",
                item.sku
            )));
        }
        state.items.insert(item.id.clone(), item);
        Ok(())
    }

    pub async fn customer(&self, customer_id: &str) -> Option<Customer> {
        self.state.lock().await.customers.get(customer_id).cloned()
    }

    pub async fn customer_count(&self) -> usize {
        self.state.lock().await.customers.len()
    }

    pub async fn invoices(&self) -> Vec<Invoice> {
        self.state.lock().await.invoices.clone()
    }
}

/// The version-checked write shared by movements and invoice lines.
fn apply_movement(
    state: &mut State,
    movement: &NewStockMovement,
    now: DateTime<Utc>,
) -> ServiceResult<StockMovement> {
    let item = state
        .items
        .get_mut(&movement.item_id)
        .ok_or_else(|| ServiceError::not_found("InventoryItem", &movement.item_id))?;

    if item.version != movement.expected_version {
        return Err(ServiceError::Conflict {
            entity: "InventoryItem".to_string(),
            id: movement.item_id.clone(),
            reason: format!(
                "expected version {}, found {}",
                movement.expected_version, item.version
            ),
        });
    }

    item.stock_quantity = movement.new_quantity;
    item.version += 1;
    item.updated_at = now;

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
    state.movements.push(recorded.clone());

    Ok(recorded)
}

impl InventoryStore for MemoryStore {
    async fn get_item(&self, item_id: &str) -> ServiceResult<InventoryItem> {
        self.state
            .lock()
            .await
            .items
            .get(item_id)
            .cloned()
            .ok_or_else(|| ServiceError::not_found("InventoryItem", item_id))
    }

    async fn commit_movement(&self, movement: &NewStockMovement) -> ServiceResult<StockMovement> {
        let mut state = self.state.lock().await;
        apply_movement(&mut state, movement, Utc::now())
    }

    async fn movements_for_item(&self, item_id: &str) -> ServiceResult<Vec<StockMovement>> {
        Ok(self
            .state
            .lock()
            .await
            .movements
            .iter()
            .filter(|m| m.item_id == item_id)
            .cloned()
            .collect())
    }
}

impl CustomerStore for MemoryStore {
    async fn create_customer(&self, customer: &NewCustomer) -> ServiceResult<Customer> {
        validate_new_customer(customer)?;

        let mut state = self.state.lock().await;
        if state.customers.values().any(|c| c.email == customer.email) {
            return Err(ServiceError::Validation(format!(
                "Duplicate email: '{}' already exists",
                customer.email
            )));
        }

        let created = Customer {
            id: Uuid::new_v4().to_string(),
            name: customer.name.clone(),
            email: customer.email.clone(),
            phone: customer.phone.clone(),
            address: customer.address.clone(),
            city: customer.city.clone(),
            location: customer.location.clone(),
            tax_number: customer.tax_number.clone(),
            credit_limit_cents: customer.credit_limit_cents,
            payment_terms: customer.payment_terms.clone(),
            created_by: customer.created_by.clone(),
            created_at: Utc::now(),
        };
        state.customers.insert(created.id.clone(), created.clone());

        debug!(customer_id = %created.id, "Customer created in memory");
        Ok(created)
    }
}

impl InvoiceStore for MemoryStore {
    async fn create_invoice(&self, invoice: &NewInvoice) -> ServiceResult<Invoice> {
        invoice.verify()?;

        let mut guard = self.state.lock().await;
        if !guard.customers.contains_key(&invoice.customer_id) {
            return Err(ServiceError::Validation(format!(
                "Unknown customer: {}",
                invoice.customer_id
            )));
        }

        // Work on a copy so a failing line leaves nothing behind.
        let mut state = State {
            items: guard.items.clone(),
            movements: Vec::new(),
            customers: HashMap::new(),
            invoices: Vec::new(),
            last_sequence: guard.last_sequence,
        };

        let now = Utc::now();
        let sequence = state.last_sequence + 1;
        let id = Uuid::new_v4().to_string();
        let invoice_number = format!("{}-{:06}", self.invoice_prefix, sequence);

        let mut items = Vec::with_capacity(invoice.lines.len());
        for (index, line) in invoice.lines.iter().enumerate() {
            let (current, version) = state
                .items
                .get(&line.item_id)
                .map(|i| (i.stock_quantity, i.version))
                .ok_or_else(|| ServiceError::not_found("InventoryItem", &line.item_id))?;

            let movement = NewStockMovement {
                item_id: line.item_id.clone(),
                movement_type: MovementKind::Out,
                quantity: line.quantity,
                previous_quantity: current,
                new_quantity: compute_new_quantity(current, MovementKind::Out, line.quantity)?,
                expected_version: version,
                reference_type: Some(ReferenceType::Invoice),
                reference_id: Some(id.clone()),
                notes: Some(format!("Sold on {}", invoice_number)),
                location: invoice.location.clone(),
                created_by: invoice.created_by.clone(),
            };
            apply_movement(&mut state, &movement, now)?;

            items.push(line.to_invoice_item(&id, index as i64 + 1)?);
        }

        let created = Invoice {
            id,
            invoice_number,
            customer_id: invoice.customer_id.clone(),
            items,
            subtotal_cents: invoice.subtotal_cents,
            discount_bps: invoice.discount_bps,
            discount_cents: invoice.discount_cents,
            tax_bps: invoice.tax_bps,
            tax_cents: invoice.tax_cents,
            total_cents: invoice.total_cents,
            status: invoice.status,
            payment_amount_cents: invoice.payment_amount_cents,
            payment_method: invoice.payment_method,
            payment_date: invoice.payment_date,
            due_date: invoice.due_date,
            notes: invoice.notes.clone(),
            location: invoice.location.clone(),
            created_by: invoice.created_by.clone(),
            created_at: now,
        };

        guard.items = state.items;
        guard.movements.extend(state.movements);
        guard.last_sequence = sequence;
        guard.invoices.push(created.clone());

        debug!(invoice_number = %created.invoice_number, "Invoice created in memory");
        Ok(created)
    }
}
