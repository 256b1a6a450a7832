//! # Invoice Repository
//!
//! Invoice creation is the one write that spans tables: the invoice header,
//! its lines and one stock-out movement per line commit together.
//!
//! ## Create Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  NewInvoice::verify()          totals must match the lines              │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  BEGIN                                                                  │
//! │    sequence = MAX(sequence) + 1   →  INV-000042                         │
//! │    INSERT invoices                                                      │
//! │    for each line (line_no 1..):                                         │
//! │       INSERT invoice_items                                              │
//! │       read item quantity + version                                      │
//! │       stock-out movement (clamped at zero), reference = invoice        │
//! │  COMMIT                                                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Any failure rolls the whole invoice back. Cancelling an invoice does not
//! return its stock.

use carpet_core::invoice::NewInvoice;
use carpet_core::ledger::{compute_new_quantity, NewStockMovement};
use carpet_core::{Invoice, InvoiceItem, InvoiceStatus, MovementKind, ReferenceType};
use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::repository::movement::apply_in_tx;

const INVOICE_COLUMNS: &str = r#"
    id, invoice_number, customer_id, subtotal_cents, discount_bps, discount_cents,
    tax_bps, tax_cents, total_cents, status, payment_amount_cents, payment_method,
    payment_date, due_date, notes, location, created_by, created_at
"#;

const INVOICE_ITEM_COLUMNS: &str = r#"
    id, invoice_id, item_id, line_no, quantity, unit_price_cents,
    discount_bps, discount_cents, total_cents
"#;

/// Repository for invoices and their lines.
#[derive(Debug, Clone)]
pub struct InvoiceRepository {
    pool: SqlitePool,
    prefix: String,
}

impl InvoiceRepository {
    pub fn new(pool: SqlitePool, prefix: impl Into<String>) -> Self {
        InvoiceRepository {
            pool,
            prefix: prefix.into(),
        }
    }

    /// Formats the human-readable number for a sequence value.
    pub fn format_number(&self, sequence: i64) -> String {
        format!("{}-{:06}", self.prefix, sequence)
    }

    /// Creates an invoice and takes its lines out of stock.
    ///
    /// ## Errors
    /// - [`DbError::Validation`] when the totals disagree with the lines
    /// - [`DbError::ForeignKeyViolation`] for an unknown customer
    /// - [`DbError::NotFound`] when a line names an unknown item
    /// - [`DbError::VersionConflict`] if a line's item changed mid-transaction
    pub async fn create(&self, invoice: &NewInvoice) -> DbResult<Invoice> {
        invoice.verify()?;

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        let sequence: i64 =
            sqlx::query_scalar("SELECT COALESCE(MAX(sequence), 0) + 1 FROM invoices")
                .fetch_one(&mut *tx)
                .await?;

        let now = Utc::now();
        let mut created = Invoice {
            id: Uuid::new_v4().to_string(),
            invoice_number: self.format_number(sequence),
            customer_id: invoice.customer_id.clone(),
            items: Vec::with_capacity(invoice.lines.len()),
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

        debug!(
            invoice_number = %created.invoice_number,
            customer_id = %created.customer_id,
            lines = invoice.lines.len(),
            "Creating invoice"
        );

        sqlx::query(&format!(
            "INSERT INTO invoices (sequence, {INVOICE_COLUMNS}) VALUES \
             (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19)"
        ))
        .bind(sequence)
        .bind(&created.id)
        .bind(&created.invoice_number)
        .bind(&created.customer_id)
        .bind(created.subtotal_cents)
        .bind(created.discount_bps)
        .bind(created.discount_cents)
        .bind(created.tax_bps)
        .bind(created.tax_cents)
        .bind(created.total_cents)
        .bind(created.status)
        .bind(created.payment_amount_cents)
        .bind(created.payment_method)
        .bind(created.payment_date)
        .bind(created.due_date)
        .bind(&created.notes)
        .bind(&created.location)
        .bind(&created.created_by)
        .bind(created.created_at)
        .execute(&mut *tx)
        .await?;

        for (index, line) in invoice.lines.iter().enumerate() {
            let item = line.to_invoice_item(&created.id, index as i64 + 1)?;

            sqlx::query(&format!(
                "INSERT INTO invoice_items ({INVOICE_ITEM_COLUMNS}) VALUES \
                 (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)"
            ))
            .bind(&item.id)
            .bind(&item.invoice_id)
            .bind(&item.item_id)
            .bind(item.line_no)
            .bind(item.quantity)
            .bind(item.unit_price_cents)
            .bind(item.discount_bps)
            .bind(item.discount_cents)
            .bind(item.total_cents)
            .execute(&mut *tx)
            .await?;

            let (current, version): (i64, i64) = sqlx::query_as(
                "SELECT stock_quantity, version FROM inventory_items WHERE id = ?1",
            )
            .bind(&line.item_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| DbError::not_found("InventoryItem", &line.item_id))?;

            let new_quantity = compute_new_quantity(current, MovementKind::Out, line.quantity)?;
            let movement = NewStockMovement {
                item_id: line.item_id.clone(),
                movement_type: MovementKind::Out,
                quantity: line.quantity,
                previous_quantity: current,
                new_quantity,
                expected_version: version,
                reference_type: Some(ReferenceType::Invoice),
                reference_id: Some(created.id.clone()),
                notes: Some(format!("Sold on {}", created.invoice_number)),
                location: created.location.clone(),
                created_by: created.created_by.clone(),
            };
            apply_in_tx(&mut *tx, &movement, now).await?;

            created.items.push(item);
        }

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        info!(
            invoice_number = %created.invoice_number,
            total_cents = created.total_cents,
            "Invoice created"
        );

        Ok(created)
    }

    /// Fetches an invoice together with its lines.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Invoice>> {
        let invoice = sqlx::query_as::<_, Invoice>(&format!(
            "SELECT {INVOICE_COLUMNS} FROM invoices WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match invoice {
            Some(mut invoice) => {
                invoice.items = self.get_items(&invoice.id).await?;
                Ok(Some(invoice))
            }
            None => Ok(None),
        }
    }

    pub async fn get_by_number(&self, invoice_number: &str) -> DbResult<Option<Invoice>> {
        let id: Option<String> =
            sqlx::query_scalar("SELECT id FROM invoices WHERE invoice_number = ?1")
                .bind(invoice_number)
                .fetch_optional(&self.pool)
                .await?;

        match id {
            Some(id) => self.get_by_id(&id).await,
            None => Ok(None),
        }
    }

    /// Lines of an invoice in `line_no` order.
    pub async fn get_items(&self, invoice_id: &str) -> DbResult<Vec<InvoiceItem>> {
        let items = sqlx::query_as::<_, InvoiceItem>(&format!(
            "SELECT {INVOICE_ITEM_COLUMNS} FROM invoice_items \
             WHERE invoice_id = ?1 ORDER BY line_no"
        ))
        .bind(invoice_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Invoice headers for a customer, newest first. Lines are not loaded.
    pub async fn list_for_customer(&self, customer_id: &str) -> DbResult<Vec<Invoice>> {
        let invoices = sqlx::query_as::<_, Invoice>(&format!(
            "SELECT {INVOICE_COLUMNS} FROM invoices \
             WHERE customer_id = ?1 ORDER BY sequence DESC"
        ))
        .bind(customer_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(invoices)
    }

    /// Marks an invoice cancelled. Stock already taken out stays out.
    pub async fn cancel(&self, id: &str) -> DbResult<Invoice> {
        let mut invoice = self
            .get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Invoice", id))?;

        invoice
            .check_transition(InvoiceStatus::Cancelled)
            .map_err(|e| DbError::InvalidTransition(e.to_string()))?;

        sqlx::query("UPDATE invoices SET status = ?1 WHERE id = ?2")
            .bind(InvoiceStatus::Cancelled)
            .bind(id)
            .execute(&self.pool)
            .await?;

        info!(invoice_number = %invoice.invoice_number, "Invoice cancelled");
        invoice.status = InvoiceStatus::Cancelled;
        Ok(invoice)
    }

    /// Deletes an invoice and, by cascade, its lines.
    ///
    /// Stock movements referencing it are kept.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM invoices WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Invoice", id));
        }
        Ok(())
    }

    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM invoices")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}
