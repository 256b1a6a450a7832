//! Checkout end to end against both stores.

mod common;

use carpet_core::cart::Cart;
use carpet_core::invoice::{compute_invoice_totals, Catalog};
use carpet_core::{InvoiceStatus, Money, Percentage, PaymentMethod, ReferenceType};
use carpet_pos::{
    CheckoutOrchestrator, CheckoutState, CustomerStore, InventoryStore, InvoiceStore,
    PaymentDetails, PosConfig, ServiceError,
};
use common::{memory_store, rug, sqlite_store, FailingInvoices};

fn config_with_rates(discount_bps: u32, tax_bps: u32) -> PosConfig {
    let mut config = PosConfig::default();
    config.checkout.discount_bps = discount_bps;
    config.checkout.tax_bps = tax_bps;
    config.store.actor_id = "clerk-1".to_string();
    config
}

async fn paid_checkout<S>(store: S)
where
    S: InventoryStore + CustomerStore + InvoiceStore,
{
    let item = store.get_item("rug-1").await.unwrap();
    let mut cart = Cart::new();
    cart.add_item(&item, 2).unwrap();

    let mut checkout = CheckoutOrchestrator::new(store, &config_with_rates(1000, 500));
    let invoice = checkout
        .checkout(&cart, &PaymentDetails::walk_in(PaymentMethod::Cash))
        .await
        .unwrap();

    assert_eq!(checkout.state(), CheckoutState::Committed);
    assert_eq!(invoice.invoice_number, "INV-000001");
    assert_eq!(invoice.subtotal(), Money::from_cents(20_000));
    assert_eq!(invoice.discount_cents, 2_000);
    assert_eq!(invoice.tax_cents, 900);
    assert_eq!(invoice.total(), Money::from_cents(18_900));
    assert_eq!(invoice.discount(), Percentage::try_from_bps(1000).unwrap());
    assert_eq!(invoice.status, InvoiceStatus::Paid);
    assert_eq!(invoice.payment_amount_cents, 18_900);
    assert_eq!(invoice.payment_method, Some(PaymentMethod::Cash));
    assert_eq!(invoice.items.len(), 1);

    // The store took the rugs out of stock against this invoice.
    let store = checkout.store();
    assert_eq!(store.get_item("rug-1").await.unwrap().stock_quantity, 8);
    let history = store.movements_for_item("rug-1").await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].reference_type, Some(ReferenceType::Invoice));
    assert_eq!(history[0].reference_id.as_deref(), Some(invoice.id.as_str()));
}

#[tokio::test]
async fn test_paid_checkout_memory() {
    paid_checkout(memory_store(&[rug("rug-1", 10_000, 10, 5, 50)]).await).await;
}

#[tokio::test]
async fn test_paid_checkout_sqlite() {
    paid_checkout(sqlite_store(&[rug("rug-1", 10_000, 10, 5, 50)]).await).await;
}

#[test]
fn test_empty_invoice_totals_are_zero() {
    let totals = compute_invoice_totals(
        "cust-1",
        &[],
        Percentage::try_from_bps(1000).unwrap(),
        Percentage::try_from_bps(500).unwrap(),
        &Catalog::new(),
    )
    .unwrap();

    assert!(totals.subtotal.is_zero());
    assert!(totals.discount.is_zero());
    assert!(totals.tax.is_zero());
    assert!(totals.total.is_zero());
}

#[tokio::test]
async fn test_invoice_failure_keeps_customer_memory() {
    let item = rug("rug-1", 10_000, 10, 5, 50);
    let inner = memory_store(&[item.clone()]).await;
    let mut cart = Cart::new();
    cart.add_item(&item, 1).unwrap();

    let mut checkout = CheckoutOrchestrator::new(
        FailingInvoices {
            inner: inner.clone(),
        },
        &PosConfig::default(),
    );
    let err = checkout
        .checkout(&cart, &PaymentDetails::new("Imran", PaymentMethod::Cash))
        .await
        .unwrap_err();

    assert_eq!(checkout.state(), CheckoutState::Failed);
    assert_eq!(err.stage, CheckoutState::InvoiceCreating);
    assert!(matches!(err.cause, ServiceError::Transport(_)));
    assert!(!err.is_retryable());

    let customer_id = err.customer_id.clone().unwrap();
    let customer = inner.customer(&customer_id).await.unwrap();
    assert_eq!(customer.name, "Imran");
    assert!(err.to_string().contains("invoice_creating"));

    // Nothing was sold.
    assert!(inner.invoices().await.is_empty());
    assert_eq!(inner.get_item("rug-1").await.unwrap().stock_quantity, 10);
}

#[tokio::test]
async fn test_invoice_failure_keeps_customer_sqlite() {
    let item = rug("rug-1", 10_000, 10, 5, 50);
    let inner = sqlite_store(&[item.clone()]).await;
    let mut cart = Cart::new();
    cart.add_item(&item, 1).unwrap();

    let mut checkout = CheckoutOrchestrator::new(
        FailingInvoices {
            inner: inner.clone(),
        },
        &PosConfig::default(),
    );
    let err = checkout
        .checkout(&cart, &PaymentDetails::walk_in(PaymentMethod::CreditCard))
        .await
        .unwrap_err();

    assert_eq!(err.stage, CheckoutState::InvoiceCreating);
    let customer_id = err.customer_id.unwrap();

    let db = inner.database();
    let customer = db.customers().get_by_id(&customer_id).await.unwrap().unwrap();
    assert_eq!(customer.name, "Walk-in Customer");
    assert_eq!(customer.phone, "0000000000");
    assert_eq!(db.invoices().count().await.unwrap(), 0);
    assert_eq!(inner.get_item("rug-1").await.unwrap().stock_quantity, 10);
}

#[tokio::test]
async fn test_item_removed_from_store_fails_at_invoice_stage() {
    let item = rug("rug-1", 10_000, 10, 5, 50);
    let store = memory_store(&[]).await;
    let mut cart = Cart::new();
    cart.add_item(&item, 1).unwrap();

    let mut checkout = CheckoutOrchestrator::new(store.clone(), &PosConfig::default());
    let err = checkout
        .checkout(&cart, &PaymentDetails::walk_in(PaymentMethod::Cash))
        .await
        .unwrap_err();

    assert_eq!(err.stage, CheckoutState::InvoiceCreating);
    assert_eq!(err.cause, ServiceError::not_found("InventoryItem", "rug-1"));
    assert!(err.customer_id.is_some());
    assert_eq!(store.customer_count().await, 1);
}

#[tokio::test]
async fn test_oversold_checkout_clamps_stock_sqlite() {
    let item = rug("rug-1", 10_000, 1, 0, 50);
    let store = sqlite_store(&[item.clone()]).await;
    let mut cart = Cart::new();
    cart.add_item(&item, 3).unwrap();

    let mut checkout = CheckoutOrchestrator::new(store.clone(), &PosConfig::default());
    let invoice = checkout
        .checkout(&cart, &PaymentDetails::walk_in(PaymentMethod::Cash))
        .await
        .unwrap();

    assert_eq!(invoice.items[0].quantity, 3);
    assert_eq!(store.get_item("rug-1").await.unwrap().stock_quantity, 0);
}
