//! # Invoice Calculator
//!
//! Derives line and invoice totals from line items, a discount and a tax
//! percentage. Everything here is pure and idempotent: the same inputs always
//! produce the same totals.
//!
//! ## Calculation Order
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  for each line:                                                         │
//! │     line_total = round(qty × unit_price × (100% − line_discount))       │
//! │                                                                         │
//! │  subtotal  = Σ line_total                                               │
//! │  discount  = round(subtotal × invoice_discount)                         │
//! │  tax       = round((subtotal − discount) × tax)                         │
//! │  total     = max(0, subtotal − discount + tax)                          │
//! │                                                                         │
//! │  round = half-up to the cent                                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A line discount and the invoice discount both apply when both are set.
//! The invoice form has always worked that way and totals already issued
//! depend on it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use ts_rs::TS;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::{Money, Percentage};
use crate::types::{Invoice, InvoiceItem, InvoiceStatus, InventoryItem, PaymentMethod};
use crate::validation::{
    validate_bps, validate_line_quantity, validate_price_cents, ValidationResult,
};
use crate::MAX_CART_ITEMS;

// =============================================================================
// Catalog Snapshot
// =============================================================================

/// The price of one item at the moment a snapshot was taken.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CatalogEntry {
    pub item_id: String,
    pub name: String,
    pub sku: String,
    pub unit_price_cents: i64,
}

impl CatalogEntry {
    pub fn new(
        item_id: impl Into<String>,
        sku: impl Into<String>,
        name: impl Into<String>,
        unit_price_cents: i64,
    ) -> Self {
        Self {
            item_id: item_id.into(),
            sku: sku.into(),
            name: name.into(),
            unit_price_cents,
        }
    }

    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }
}

impl From<&InventoryItem> for CatalogEntry {
    fn from(item: &InventoryItem) -> Self {
        Self {
            item_id: item.id.clone(),
            name: item.name.clone(),
            sku: item.sku.clone(),
            unit_price_cents: item.unit_price_cents,
        }
    }
}

/// A price snapshot keyed by item id.
///
/// Lines are only valid if their item is in the snapshot they are priced
/// against.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    entries: HashMap<String, CatalogEntry>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_items<'a>(items: impl IntoIterator<Item = &'a InventoryItem>) -> Self {
        Self::from_entries(items.into_iter().map(CatalogEntry::from))
    }

    pub fn from_entries(entries: impl IntoIterator<Item = CatalogEntry>) -> Self {
        let mut catalog = Self::new();
        for entry in entries {
            catalog.insert(entry);
        }
        catalog
    }

    /// Adds or replaces an entry.
    pub fn insert(&mut self, entry: CatalogEntry) {
        self.entries.insert(entry.item_id.clone(), entry);
    }

    pub fn get(&self, item_id: &str) -> Option<&CatalogEntry> {
        self.entries.get(item_id)
    }

    pub fn contains(&self, item_id: &str) -> bool {
        self.entries.contains_key(item_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// =============================================================================
// Invoice Line
// =============================================================================

/// One priced line on an invoice before it is persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct InvoiceLine {
    pub item_id: String,
    pub quantity: i64,
    /// Captured at the moment the line was priced.
    pub unit_price_cents: i64,
    #[serde(default)]
    pub discount_bps: u32,
}

impl InvoiceLine {
    pub fn new(item_id: impl Into<String>, quantity: i64, unit_price_cents: i64) -> Self {
        Self {
            item_id: item_id.into(),
            quantity,
            unit_price_cents,
            discount_bps: 0,
        }
    }

    /// Prices a line from a catalog snapshot.
    pub fn from_catalog(entry: &CatalogEntry, quantity: i64) -> Self {
        Self::new(entry.item_id.clone(), quantity, entry.unit_price_cents)
    }

    pub fn with_discount(mut self, discount: Percentage) -> Self {
        self.discount_bps = discount.bps();
        self
    }

    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }

    /// `quantity × unit_price` before any discount.
    ///
    /// ## Errors
    /// - `OutOfRange` if the product does not fit in an `i64` of cents
    pub fn gross(&self) -> ValidationResult<Money> {
        self.unit_price()
            .checked_mul_quantity(self.quantity)
            .ok_or_else(|| amount_overflow("line_total"))
    }

    fn validate(&self, catalog: &Catalog) -> ValidationResult<()> {
        validate_line_quantity(self.quantity)?;
        validate_price_cents("unit_price", self.unit_price_cents)?;
        validate_bps("line_discount", self.discount_bps)?;
        if !catalog.contains(&self.item_id) {
            return Err(ValidationError::UnknownReference {
                field: "item_id".to_string(),
                id: self.item_id.clone(),
            });
        }
        Ok(())
    }

    /// Materializes the line as a stored invoice item.
    pub fn to_invoice_item(&self, invoice_id: &str, line_no: i64) -> ValidationResult<InvoiceItem> {
        Ok(InvoiceItem {
            id: uuid::Uuid::new_v4().to_string(),
            invoice_id: invoice_id.to_string(),
            item_id: self.item_id.clone(),
            line_no,
            quantity: self.quantity,
            unit_price_cents: self.unit_price_cents,
            discount_bps: self.discount_bps,
            discount_cents: line_discount(self)?.cents(),
            total_cents: compute_line_total(self)?.cents(),
        })
    }
}

fn amount_overflow(field: &str) -> ValidationError {
    ValidationError::OutOfRange {
        field: field.to_string(),
        min: 0,
        max: i64::MAX,
    }
}

/// A percentage field that must lie in `0..=10000` bps.
fn percentage(field: &str, bps: u32) -> ValidationResult<Percentage> {
    validate_bps(field, bps)?;
    Ok(Percentage::from_bps(bps))
}

/// Total for one line after its own discount, rounded half-up, never negative.
///
/// ```rust
/// use carpet_core::invoice::{compute_line_total, InvoiceLine};
/// use carpet_core::Percentage;
///
/// let line = InvoiceLine::new("rug-1", 3, 3_333)
///     .with_discount(Percentage::try_from_bps(1000).unwrap());
/// // 99.99 × 90% = 89.991 → 89.99
/// assert_eq!(compute_line_total(&line).unwrap().cents(), 8_999);
/// ```
///
/// ## Errors
/// - `OutOfRange` for a line discount above 100% or an amount that overflows
pub fn compute_line_total(line: &InvoiceLine) -> ValidationResult<Money> {
    let discount = percentage("line_discount", line.discount_bps)?;
    Ok(line.gross()?.less_percent(discount).floor_zero())
}

/// The amount a line's own discount takes off its gross.
pub fn line_discount(line: &InvoiceLine) -> ValidationResult<Money> {
    let gross = line.gross()?.floor_zero();
    Ok((gross - compute_line_total(line)?).floor_zero())
}

// =============================================================================
// Totals
// =============================================================================

/// Derived invoice amounts. Never stored independently of the lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct InvoiceTotals {
    pub subtotal: Money,
    pub discount: Money,
    pub tax: Money,
    pub total: Money,
}

impl InvoiceTotals {
    /// The arithmetic alone, without catalog or quantity checks.
    ///
    /// Stores use this to check totals a caller submitted. Every sum is
    /// checked; an amount that leaves the `i64` range is `OutOfRange`.
    pub fn from_lines(
        lines: &[InvoiceLine],
        discount: Percentage,
        tax: Percentage,
    ) -> ValidationResult<Self> {
        let subtotal = lines.iter().try_fold(Money::zero(), |acc, line| {
            acc.checked_add(compute_line_total(line)?)
                .ok_or_else(|| amount_overflow("subtotal"))
        })?;
        // Line totals are floored at zero, so 0 <= discount <= subtotal.
        let discount_amount = subtotal.percent_of(discount);
        let taxable = subtotal - discount_amount;
        let tax_amount = taxable.percent_of(tax);
        let total = taxable
            .checked_add(tax_amount)
            .ok_or_else(|| amount_overflow("total"))?;

        Ok(Self {
            subtotal,
            discount: discount_amount,
            tax: tax_amount,
            total,
        })
    }
}

/// Computes invoice totals after validating every input.
///
/// An empty `lines` slice is valid and yields all-zero totals.
///
/// ## Errors
/// - `Required` if `customer_id` is blank
/// - `MustBePositive` for a line quantity of zero or less
/// - `OutOfRange` for a line discount above 100% or an amount that overflows
/// - `UnknownReference` if a line's item is not in `catalog`
///
/// Both percentages are [`Percentage`] values, which cannot exceed 100%.
pub fn compute_invoice_totals(
    customer_id: &str,
    lines: &[InvoiceLine],
    discount: Percentage,
    tax: Percentage,
    catalog: &Catalog,
) -> ValidationResult<InvoiceTotals> {
    if customer_id.trim().is_empty() {
        return Err(ValidationError::required("customer_id"));
    }
    for line in lines {
        line.validate(catalog)?;
    }

    InvoiceTotals::from_lines(lines, discount, tax)
}

// =============================================================================
// New Invoice (store submission)
// =============================================================================

/// An invoice submitted to a store for creation.
///
/// The store assigns `id`, `invoice_number` and `created_at`, writes one
/// stock-out movement per line and rejects the submission if the totals below
/// disagree with the lines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct NewInvoice {
    pub customer_id: String,
    pub lines: Vec<InvoiceLine>,
    pub discount_bps: u32,
    pub tax_bps: u32,
    pub subtotal_cents: i64,
    pub discount_cents: i64,
    pub tax_cents: i64,
    pub total_cents: i64,
    pub status: InvoiceStatus,
    pub payment_amount_cents: i64,
    pub payment_method: Option<PaymentMethod>,
    #[ts(as = "Option<String>")]
    pub payment_date: Option<DateTime<Utc>>,
    #[ts(as = "String")]
    pub due_date: DateTime<Utc>,
    pub notes: Option<String>,
    pub location: String,
    pub created_by: String,
}

impl NewInvoice {
    /// Prices `lines` against `catalog` and returns a draft.
    pub fn priced(
        customer_id: impl Into<String>,
        lines: Vec<InvoiceLine>,
        discount: Percentage,
        tax: Percentage,
        catalog: &Catalog,
        location: impl Into<String>,
        created_by: impl Into<String>,
    ) -> ValidationResult<Self> {
        let customer_id = customer_id.into();
        let totals = compute_invoice_totals(&customer_id, &lines, discount, tax, catalog)?;

        Ok(Self {
            customer_id,
            lines,
            discount_bps: discount.bps(),
            tax_bps: tax.bps(),
            subtotal_cents: totals.subtotal.cents(),
            discount_cents: totals.discount.cents(),
            tax_cents: totals.tax.cents(),
            total_cents: totals.total.cents(),
            status: InvoiceStatus::Draft,
            payment_amount_cents: 0,
            payment_method: None,
            payment_date: None,
            due_date: Utc::now(),
            notes: None,
            location: location.into(),
            created_by: created_by.into(),
        })
    }

    /// Marks the invoice as settled in full at `paid_at`.
    pub fn paid_in_full(mut self, method: PaymentMethod, paid_at: DateTime<Utc>) -> Self {
        self.status = InvoiceStatus::Paid;
        self.payment_amount_cents = self.total_cents;
        self.payment_method = Some(method);
        self.payment_date = Some(paid_at);
        self.due_date = paid_at;
        self
    }

    /// The totals this submission carries.
    pub fn totals(&self) -> InvoiceTotals {
        InvoiceTotals {
            subtotal: Money::from_cents(self.subtotal_cents),
            discount: Money::from_cents(self.discount_cents),
            tax: Money::from_cents(self.tax_cents),
            total: Money::from_cents(self.total_cents),
        }
    }

    /// Recomputes the totals from the lines and checks the submission.
    ///
    /// Returns the recomputed totals when they match.
    pub fn verify(&self) -> ValidationResult<InvoiceTotals> {
        if self.customer_id.trim().is_empty() {
            return Err(ValidationError::required("customer_id"));
        }
        let discount = percentage("discount", self.discount_bps)?;
        let tax = percentage("tax", self.tax_bps)?;
        for line in &self.lines {
            validate_line_quantity(line.quantity)?;
            validate_price_cents("unit_price", line.unit_price_cents)?;
            validate_bps("line_discount", line.discount_bps)?;
        }
        validate_price_cents("payment_amount", self.payment_amount_cents)?;

        let expected = InvoiceTotals::from_lines(&self.lines, discount, tax)?;
        if expected != self.totals() {
            return Err(ValidationError::invalid_format(
                "totals",
                format!(
                    "submitted total {} does not match computed total {}",
                    Money::from_cents(self.total_cents),
                    expected.total
                ),
            ));
        }

        Ok(expected)
    }
}

impl Invoice {
    /// Checks that the invoice may move to `next`.
    pub fn check_transition(&self, next: InvoiceStatus) -> CoreResult<()> {
        if self.status.can_transition_to(next) {
            Ok(())
        } else {
            Err(CoreError::InvalidInvoiceStatus {
                invoice_id: self.id.clone(),
                from: self.status.to_string(),
                to: next.to_string(),
            })
        }
    }
}

// =============================================================================
// Invoice Draft
// =============================================================================

/// An invoice being edited line by line.
///
/// Totals are recomputed from the lines on every call to
/// [`InvoiceDraft::totals`], never cached.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct InvoiceDraft {
    pub customer_id: String,
    pub lines: Vec<InvoiceLine>,
    pub discount: Percentage,
    pub tax: Percentage,
    pub notes: Option<String>,
}

impl InvoiceDraft {
    pub fn new(customer_id: impl Into<String>) -> Self {
        Self {
            customer_id: customer_id.into(),
            ..Self::default()
        }
    }

    /// Appends a line and returns its index.
    ///
    /// Lines for the same item are kept separate.
    pub fn add_line(&mut self, line: InvoiceLine) -> CoreResult<usize> {
        if self.lines.len() >= MAX_CART_ITEMS {
            return Err(CoreError::CartTooLarge {
                max: MAX_CART_ITEMS,
            });
        }
        validate_line_quantity(line.quantity)?;
        validate_price_cents("unit_price", line.unit_price_cents)?;
        validate_bps("line_discount", line.discount_bps)?;

        self.lines.push(line);
        Ok(self.lines.len() - 1)
    }

    pub fn set_quantity(&mut self, index: usize, quantity: i64) -> CoreResult<()> {
        validate_line_quantity(quantity)?;
        self.line_mut(index)?.quantity = quantity;
        Ok(())
    }

    pub fn set_unit_price(&mut self, index: usize, unit_price: Money) -> CoreResult<()> {
        validate_price_cents("unit_price", unit_price.cents())?;
        self.line_mut(index)?.unit_price_cents = unit_price.cents();
        Ok(())
    }

    pub fn set_line_discount(&mut self, index: usize, discount: Percentage) -> CoreResult<()> {
        self.line_mut(index)?.discount_bps = discount.bps();
        Ok(())
    }

    pub fn remove_line(&mut self, index: usize) -> CoreResult<InvoiceLine> {
        self.check_index(index)?;
        Ok(self.lines.remove(index))
    }

    /// Sets the invoice discount from form input in basis points.
    ///
    /// Anything above 10000 (100%) is rejected and the draft is left as is.
    pub fn set_discount(&mut self, discount_bps: u32) -> CoreResult<()> {
        self.discount = percentage("discount", discount_bps)?;
        Ok(())
    }

    /// Sets the tax rate from form input in basis points.
    pub fn set_tax(&mut self, tax_bps: u32) -> CoreResult<()> {
        self.tax = percentage("tax", tax_bps)?;
        Ok(())
    }

    pub fn totals(&self, catalog: &Catalog) -> ValidationResult<InvoiceTotals> {
        compute_invoice_totals(&self.customer_id, &self.lines, self.discount, self.tax, catalog)
    }

    /// Converts the draft into a store submission with status `unpaid`.
    pub fn into_new_invoice(
        self,
        catalog: &Catalog,
        location: impl Into<String>,
        created_by: impl Into<String>,
    ) -> ValidationResult<NewInvoice> {
        let notes = self.notes;
        let mut invoice = NewInvoice::priced(
            self.customer_id,
            self.lines,
            self.discount,
            self.tax,
            catalog,
            location,
            created_by,
        )?;
        invoice.status = InvoiceStatus::Unpaid;
        invoice.notes = notes;
        Ok(invoice)
    }

    fn check_index(&self, index: usize) -> ValidationResult<()> {
        let Some(last) = self.lines.len().checked_sub(1) else {
            return Err(ValidationError::invalid_format("line", "the invoice has no lines"));
        };
        if index > last {
            return Err(ValidationError::OutOfRange {
                field: "line".to_string(),
                min: 0,
                max: i64::try_from(last).unwrap_or(i64::MAX),
            });
        }
        Ok(())
    }

    fn line_mut(&mut self, index: usize) -> ValidationResult<&mut InvoiceLine> {
        self.check_index(index)?;
        Ok(&mut self.lines[index])
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn catalog() -> Catalog {
        Catalog::from_entries([
            CatalogEntry::new("rug-1", "PER-RED-200X300", "Tabriz Red", 10_000),
            CatalogEntry::new("rug-2", "KIL-BLU-120X180", "Kilim Blue", 4_550),
        ])
    }

    #[test]
    fn test_single_line_discount_and_tax() {
        let lines = vec![InvoiceLine::new("rug-1", 2, 10_000)];
        let totals = compute_invoice_totals(
            "cust-1",
            &lines,
            Percentage::from_bps(1000),
            Percentage::from_bps(500),
            &catalog(),
        )
        .unwrap();

        assert_eq!(totals.subtotal.to_string(), "200.00");
        assert_eq!(totals.discount.to_string(), "20.00");
        assert_eq!(totals.tax.to_string(), "9.00");
        assert_eq!(totals.total.to_string(), "189.00");
    }

    #[test]
    fn test_empty_lines_are_all_zero() {
        let totals = compute_invoice_totals(
            "cust-1",
            &[],
            Percentage::from_bps(1000),
            Percentage::from_bps(500),
            &catalog(),
        )
        .unwrap();
        assert_eq!(totals, InvoiceTotals::default());
    }

    #[test]
    fn test_line_and_invoice_discount_both_apply() {
        let lines = vec![InvoiceLine::new("rug-1", 1, 10_000).with_discount(Percentage::from_bps(1000))];
        let totals =
            InvoiceTotals::from_lines(&lines, Percentage::from_bps(1000), Percentage::ZERO)
                .unwrap();

        assert_eq!(totals.subtotal.cents(), 9_000);
        assert_eq!(totals.discount.cents(), 900);
        assert_eq!(totals.total.cents(), 8_100);
    }

    #[test]
    fn test_line_total_rounds_half_up() {
        // 0.05 × 50% = 0.025 → 0.03
        let line = InvoiceLine::new("rug-1", 1, 5).with_discount(Percentage::from_bps(5000));
        assert_eq!(compute_line_total(&line).unwrap().cents(), 3);
        assert_eq!(line_discount(&line).unwrap().cents(), 2);
    }

    #[test]
    fn test_full_line_discount_is_zero_not_negative() {
        let line = InvoiceLine::new("rug-1", 4, 10_000).with_discount(Percentage::FULL);
        assert_eq!(compute_line_total(&line), Ok(Money::zero()));
    }

    #[test]
    fn test_bulk_quantities_above_cart_cap_are_priced() {
        let lines = vec![InvoiceLine::new("rug-1", 1_000, 100)];
        let totals = compute_invoice_totals(
            "cust-1",
            &lines,
            Percentage::ZERO,
            Percentage::ZERO,
            &catalog(),
        )
        .unwrap();
        assert_eq!(totals.total.cents(), 100_000);
    }

    #[test]
    fn test_overflowing_amounts_are_rejected() {
        let huge = InvoiceLine::new("rug-1", 3, i64::MAX / 2);
        assert_eq!(huge.gross(), Err(amount_overflow("line_total")));
        assert_eq!(compute_line_total(&huge), Err(amount_overflow("line_total")));
        assert!(huge.to_invoice_item("inv-1", 1).is_err());

        let halves = vec![
            InvoiceLine::new("rug-1", 1, i64::MAX / 2 + 1),
            InvoiceLine::new("rug-1", 1, i64::MAX / 2 + 1),
        ];
        assert_eq!(
            InvoiceTotals::from_lines(&halves, Percentage::ZERO, Percentage::ZERO),
            Err(amount_overflow("subtotal"))
        );

        // Tax pushes a near-maximum subtotal past the limit.
        let near_max = vec![InvoiceLine::new("rug-1", 1, i64::MAX - 10)];
        assert_eq!(
            InvoiceTotals::from_lines(&near_max, Percentage::ZERO, Percentage::from_bps(500)),
            Err(amount_overflow("total"))
        );
    }

    #[test]
    fn test_verify_rejects_overflow_instead_of_panicking() {
        let mut invoice = NewInvoice::priced(
            "cust-1",
            vec![InvoiceLine::new("rug-1", 1, 10_000)],
            Percentage::ZERO,
            Percentage::ZERO,
            &catalog(),
            "main",
            "clerk-1",
        )
        .unwrap();
        invoice.lines = vec![InvoiceLine::new("rug-1", 3, i64::MAX / 2)];

        assert_eq!(invoice.verify(), Err(amount_overflow("line_total")));
    }

    #[test]
    fn test_out_of_range_invoice_percentages_are_rejected() {
        assert!(Percentage::try_from_bps(15_000).is_err());
        assert!("150".parse::<Percentage>().is_err());

        let invoice = NewInvoice::priced(
            "cust-1",
            vec![InvoiceLine::new("rug-1", 2, 10_000)],
            Percentage::ZERO,
            Percentage::ZERO,
            &catalog(),
            "main",
            "clerk-1",
        )
        .unwrap();

        let mut discount = invoice.clone();
        discount.discount_bps = 15_000;
        assert!(matches!(
            discount.verify(),
            Err(ValidationError::OutOfRange { ref field, .. }) if field == "discount"
        ));

        let mut tax = invoice;
        tax.tax_bps = 10_001;
        assert!(matches!(
            tax.verify(),
            Err(ValidationError::OutOfRange { ref field, .. }) if field == "tax"
        ));

        let mut line = InvoiceLine::new("rug-1", 1, 10_000);
        line.discount_bps = 10_001;
        assert!(compute_line_total(&line).is_err());
    }

    #[test]
    fn test_draft_rejects_out_of_range_rates() {
        let mut draft = InvoiceDraft::new("cust-1");
        draft.add_line(InvoiceLine::new("rug-1", 2, 10_000)).unwrap();
        draft.set_discount(1000).unwrap();

        assert!(matches!(
            draft.set_discount(15_000),
            Err(CoreError::Validation(ValidationError::OutOfRange { .. }))
        ));
        assert!(draft.set_tax(10_001).is_err());

        // Rejected input leaves the previous rates in place.
        assert_eq!(draft.discount, Percentage::from_bps(1000));
        assert_eq!(draft.tax, Percentage::ZERO);
        assert_eq!(draft.totals(&catalog()).unwrap().total.cents(), 18_000);
    }

    #[test]
    fn test_empty_draft_index_error_names_the_problem() {
        let mut draft = InvoiceDraft::new("cust-1");
        assert!(matches!(
            draft.remove_line(0),
            Err(CoreError::Validation(ValidationError::InvalidFormat { .. }))
        ));

        draft.add_line(InvoiceLine::new("rug-1", 1, 10_000)).unwrap();
        assert!(matches!(
            draft.set_quantity(1, 2),
            Err(CoreError::Validation(ValidationError::OutOfRange { max: 0, .. }))
        ));
    }

    #[test]
    fn test_rejects_bad_inputs() {
        let catalog = catalog();

        let zero_qty = vec![InvoiceLine::new("rug-1", 0, 10_000)];
        assert!(matches!(
            compute_invoice_totals("c", &zero_qty, Percentage::ZERO, Percentage::ZERO, &catalog),
            Err(ValidationError::MustBePositive { .. })
        ));

        let unknown = vec![InvoiceLine::new("rug-9", 1, 10_000)];
        assert_eq!(
            compute_invoice_totals("c", &unknown, Percentage::ZERO, Percentage::ZERO, &catalog),
            Err(ValidationError::UnknownReference {
                field: "item_id".to_string(),
                id: "rug-9".to_string()
            })
        );

        let mut bad_discount = InvoiceLine::new("rug-1", 1, 10_000);
        bad_discount.discount_bps = 10_001;
        assert!(compute_invoice_totals(
            "c",
            &[bad_discount],
            Percentage::ZERO,
            Percentage::ZERO,
            &catalog
        )
        .is_err());

        assert_eq!(
            compute_invoice_totals("", &[], Percentage::ZERO, Percentage::ZERO, &catalog),
            Err(ValidationError::required("customer_id"))
        );
    }

    #[test]
    fn test_duplicate_item_lines_are_not_merged() {
        let mut draft = InvoiceDraft::new("cust-1");
        draft.add_line(InvoiceLine::new("rug-2", 1, 4_550)).unwrap();
        draft.add_line(InvoiceLine::new("rug-2", 2, 4_000)).unwrap();

        assert_eq!(draft.lines.len(), 2);
        let totals = draft.totals(&catalog()).unwrap();
        assert_eq!(totals.subtotal.cents(), 4_550 + 8_000);
    }

    #[test]
    fn test_draft_editing_recomputes() {
        let catalog = catalog();
        let mut draft = InvoiceDraft::new("cust-1");
        let first = draft.add_line(InvoiceLine::new("rug-1", 1, 10_000)).unwrap();
        draft.add_line(InvoiceLine::new("rug-2", 1, 4_550)).unwrap();

        draft.set_quantity(first, 3).unwrap();
        draft.set_unit_price(first, Money::from_cents(9_000)).unwrap();
        draft.set_tax(1000).unwrap();
        assert_eq!(draft.totals(&catalog).unwrap().subtotal.cents(), 27_000 + 4_550);

        let removed = draft.remove_line(1).unwrap();
        assert_eq!(removed.item_id, "rug-2");

        let totals = draft.totals(&catalog).unwrap();
        assert_eq!(totals.subtotal.cents(), 27_000);
        assert_eq!(totals.tax.cents(), 2_700);
        assert_eq!(totals.total.cents(), 29_700);

        assert!(draft.set_quantity(5, 1).is_err());
        assert!(draft.set_quantity(first, 0).is_err());
        assert!(draft.remove_line(3).is_err());
    }

    #[test]
    fn test_new_invoice_verify() {
        let catalog = catalog();
        let invoice = NewInvoice::priced(
            "cust-1",
            vec![InvoiceLine::new("rug-1", 2, 10_000)],
            Percentage::from_bps(1000),
            Percentage::from_bps(500),
            &catalog,
            "main",
            "clerk-1",
        )
        .unwrap()
        .paid_in_full(PaymentMethod::Cash, Utc::now());

        assert_eq!(invoice.status, InvoiceStatus::Paid);
        assert_eq!(invoice.payment_amount_cents, 18_900);
        assert_eq!(invoice.verify().unwrap().total.cents(), 18_900);

        let mut tampered = invoice.clone();
        tampered.total_cents -= 1;
        assert!(tampered.verify().is_err());
    }

    #[test]
    fn test_draft_into_new_invoice_is_unpaid() {
        let mut draft = InvoiceDraft::new("cust-1");
        draft.add_line(InvoiceLine::new("rug-1", 1, 10_000)).unwrap();
        draft.notes = Some("deliver Friday".to_string());

        let invoice = draft.into_new_invoice(&catalog(), "main", "clerk-1").unwrap();
        assert_eq!(invoice.status, InvoiceStatus::Unpaid);
        assert_eq!(invoice.notes.as_deref(), Some("deliver Friday"));
        assert_eq!(invoice.total_cents, 10_000);
    }

    #[test]
    fn test_to_invoice_item() {
        let line = InvoiceLine::new("rug-1", 2, 10_000).with_discount(Percentage::from_bps(2500));
        let item = line.to_invoice_item("inv-1", 1).unwrap();
        assert_eq!(item.invoice_id, "inv-1");
        assert_eq!(item.total_cents, 15_000);
        assert_eq!(item.discount_cents, 5_000);
    }

    fn arb_line() -> impl Strategy<Value = InvoiceLine> {
        (1i64..=100_000, 0i64..5_000_000, 0u32..=10_000).prop_map(|(qty, price, bps)| {
            InvoiceLine::new("rug-1", qty, price).with_discount(Percentage::from_bps(bps))
        })
    }

    proptest! {
        #[test]
        fn prop_total_identity_holds(
            lines in proptest::collection::vec(arb_line(), 0..20),
            discount in 0u32..=10_000,
            tax in 0u32..=10_000,
        ) {
            let totals = InvoiceTotals::from_lines(
                &lines,
                Percentage::from_bps(discount),
                Percentage::from_bps(tax),
            )
            .unwrap();
            let identity = totals.subtotal - totals.discount + totals.tax;
            prop_assert!((identity.cents() - totals.total.cents()).abs() <= 1);
            prop_assert!(totals.total.cents() >= 0);
            prop_assert!(totals.subtotal.cents() >= 0);
            prop_assert!(totals.discount.cents() >= 0);
            prop_assert!(totals.tax.cents() >= 0);
        }

        #[test]
        fn prop_totals_are_idempotent(
            lines in proptest::collection::vec(arb_line(), 0..20),
            discount in 0u32..=10_000,
            tax in 0u32..=10_000,
        ) {
            let catalog = Catalog::from_entries([CatalogEntry::new("rug-1", "PER-RED-200X300", "Tabriz Red", 0)]);
            let d = Percentage::from_bps(discount);
            let t = Percentage::from_bps(tax);
            let first = compute_invoice_totals("c", &lines, d, t, &catalog).unwrap();
            let second = compute_invoice_totals("c", &lines, d, t, &catalog).unwrap();
            prop_assert_eq!(first, second);
        }
    }
}
