//! # Checkout Orchestrator
//!
//! Turns a cart into a paid invoice: a walk-in customer is created, the cart
//! is priced from fresh item reads, and the invoice is submitted. The store
//! takes the sold quantities out of stock while creating the invoice.
//!
//! ## State Machine
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   Idle ──► CustomerResolving ──► InvoiceCreating ──► Committed          │
//! │    │              │                     │                               │
//! │    └──────────────┴──────────┬──────────┘                               │
//! │                              ▼                                          │
//! │                            Failed                                       │
//! │                                                                         │
//! │   Committed / Failed ──► Idle   (next sale)                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Partial Failure
//! There is no compensation. If the invoice fails after the customer was
//! created, the customer stays and [`CheckoutError::customer_id`] says so.
//! Stages are never retried here.

use carpet_core::cart::Cart;
use carpet_core::invoice::{Catalog, CatalogEntry, InvoiceLine, NewInvoice};
use carpet_core::{Invoice, NewCustomer, PaymentMethod};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::config::{CheckoutSettings, PosConfig, StoreSettings};
use crate::error::{CheckoutError, ServiceError};
use crate::store::{CustomerStore, InventoryStore, InvoiceStore};

// =============================================================================
// Checkout State
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckoutState {
    #[default]
    Idle,
    CustomerResolving,
    InvoiceCreating,
    Committed,
    Failed,
}

impl CheckoutState {
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckoutState::Idle => "idle",
            CheckoutState::CustomerResolving => "customer_resolving",
            CheckoutState::InvoiceCreating => "invoice_creating",
            CheckoutState::Committed => "committed",
            CheckoutState::Failed => "failed",
        }
    }

    pub fn can_transition_to(&self, next: CheckoutState) -> bool {
        use CheckoutState::*;
        matches!(
            (self, next),
            (Idle, CustomerResolving | Failed)
                | (CustomerResolving, InvoiceCreating | Failed)
                | (InvoiceCreating, Committed | Failed)
                | (Committed | Failed, Idle)
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, CheckoutState::Committed | CheckoutState::Failed)
    }
}

impl fmt::Display for CheckoutState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Payment Details
// =============================================================================

/// What the cashier enters at the till.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentDetails {
    /// Blank means a walk-in customer.
    #[serde(default)]
    pub customer_name: String,
    pub payment_method: PaymentMethod,
}

impl PaymentDetails {
    pub fn new(customer_name: impl Into<String>, payment_method: PaymentMethod) -> Self {
        PaymentDetails {
            customer_name: customer_name.into(),
            payment_method,
        }
    }

    pub fn walk_in(payment_method: PaymentMethod) -> Self {
        Self::new("", payment_method)
    }
}

// =============================================================================
// Orchestrator
// =============================================================================

/// Sequences customer creation and invoice creation for one sale at a time.
#[derive(Debug)]
pub struct CheckoutOrchestrator<S> {
    store: S,
    store_settings: StoreSettings,
    checkout_settings: CheckoutSettings,
    state: CheckoutState,
}

impl<S> CheckoutOrchestrator<S>
where
    S: InventoryStore + CustomerStore + InvoiceStore,
{
    pub fn new(store: S, config: &PosConfig) -> Self {
        CheckoutOrchestrator {
            store,
            store_settings: config.store.clone(),
            checkout_settings: config.checkout.clone(),
            state: CheckoutState::Idle,
        }
    }

    pub fn state(&self) -> CheckoutState {
        self.state
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Runs one checkout.
    ///
    /// The caller clears `cart` only on `Ok`.
    pub async fn checkout(
        &mut self,
        cart: &Cart,
        payment: &PaymentDetails,
    ) -> Result<Invoice, CheckoutError> {
        if self.state.is_terminal() {
            self.transition(CheckoutState::Idle);
        }

        self.transition(CheckoutState::CustomerResolving);
        if cart.is_empty() {
            return Err(self.fail(ServiceError::Validation("cart is empty".into()), None));
        }

        let customer = match self.store.create_customer(&self.walk_in_customer(payment)).await {
            Ok(customer) => customer,
            Err(cause) => return Err(self.fail(cause, None)),
        };
        info!(customer_id = %customer.id, name = %customer.name, "Checkout customer created");

        self.transition(CheckoutState::InvoiceCreating);
        let invoice = match self.build_invoice(cart, &customer.id, payment).await {
            Ok(invoice) => invoice,
            Err(cause) => return Err(self.fail(cause, Some(customer.id))),
        };

        let created = match self.store.create_invoice(&invoice).await {
            Ok(created) => created,
            Err(cause) => return Err(self.fail(cause, Some(customer.id))),
        };

        self.transition(CheckoutState::Committed);
        info!(
            invoice_number = %created.invoice_number,
            customer_id = %created.customer_id,
            total_cents = created.total_cents,
            lines = created.items.len(),
            "Checkout committed"
        );

        Ok(created)
    }

    fn walk_in_customer(&self, payment: &PaymentDetails) -> NewCustomer {
        let name = match payment.customer_name.trim() {
            "" => self.checkout_settings.walk_in_name.clone(),
            name => name.to_string(),
        };

        NewCustomer {
            name,
            email: format!(
                "walkin-{}@{}",
                Uuid::new_v4(),
                self.checkout_settings.walk_in_email_domain
            ),
            phone: "0000000000".to_string(),
            address: "N/A".to_string(),
            city: "N/A".to_string(),
            location: self.store_settings.location.clone(),
            tax_number: None,
            credit_limit_cents: None,
            payment_terms: None,
            created_by: self.store_settings.actor_id.clone(),
        }
    }

    /// Prices every cart line from a fresh item read.
    async fn build_invoice(
        &self,
        cart: &Cart,
        customer_id: &str,
        payment: &PaymentDetails,
    ) -> Result<NewInvoice, ServiceError> {
        let mut catalog = Catalog::new();
        let mut lines = Vec::with_capacity(cart.lines.len());

        for cart_line in &cart.lines {
            let item = self.store.get_item(&cart_line.item_id).await?;
            if item.unit_price_cents != cart_line.unit_price_cents {
                warn!(
                    item_id = %item.id,
                    cart_price = cart_line.unit_price_cents,
                    current_price = item.unit_price_cents,
                    "Price changed since the item was added to the cart"
                );
            }

            let entry = CatalogEntry::from(&item);
            lines.push(InvoiceLine::from_catalog(&entry, cart_line.quantity));
            catalog.insert(entry);
        }

        let invoice = NewInvoice::priced(
            customer_id,
            lines,
            self.checkout_settings.discount()?,
            self.checkout_settings.tax()?,
            &catalog,
            &self.store_settings.location,
            &self.store_settings.actor_id,
        )?
        .paid_in_full(payment.payment_method, Utc::now());

        Ok(invoice)
    }

    fn transition(&mut self, next: CheckoutState) {
        let allowed = self.state.can_transition_to(next);
        if !allowed {
            error!(from = %self.state, to = %next, "Invalid checkout transition");
        }
        debug_assert!(allowed, "invalid checkout transition {} -> {}", self.state, next);
        info!(from = %self.state, to = %next, "Checkout state change");
        self.state = next;
    }

    fn fail(&mut self, cause: ServiceError, customer_id: Option<String>) -> CheckoutError {
        let stage = self.state;
        error!(stage = ?stage, customer_id = ?customer_id, error = %cause, "Checkout failed");
        self.transition(CheckoutState::Failed);

        let err = CheckoutError::new(stage, cause);
        match customer_id {
            Some(id) => err.with_customer(id),
            None => err,
        }
    }
}
