//! Bills, line items, and bill amounts
//!
//! A bill moves through a small state machine:
//!
//! ```text
//! DRAFT ──finalize──> FINALIZED ──mark_unpaid──> UNPAID
//!   │                     │                        │
//!   └──────────settled by payments─────────────────┴──> PAID
//! ```
//!
//! Line items can only be appended while the bill is a draft. Every stored
//! bill satisfies `total = subtotal + tax - discount`.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use core_kernel::{BillId, Currency, CustomerId, LineItemId, Money, Rate, ReservationId};
use crate::error::BillingError;

/// Billing category, each with its own invoice number series
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BillCategory {
    /// Tax-inclusive invoice
    Gst,
    /// Invoice without tax
    NonGst,
}

impl BillCategory {
    pub const ALL: [BillCategory; 2] = [BillCategory::Gst, BillCategory::NonGst];

    pub fn as_str(&self) -> &'static str {
        match self {
            BillCategory::Gst => "GST",
            BillCategory::NonGst => "NON_GST",
        }
    }

    pub fn is_taxable(&self) -> bool {
        matches!(self, BillCategory::Gst)
    }
}

impl fmt::Display for BillCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BillCategory {
    type Err = BillingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "GST" => Ok(BillCategory::Gst),
            "NON_GST" => Ok(BillCategory::NonGst),
            other => Err(BillingError::validation(format!("unknown bill category '{}'", other))),
        }
    }
}

/// What the bill is for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BillType {
    /// Stay charges derived from a reservation
    Room,
    /// Guest without a reservation
    WalkIn,
    Food,
    Manual,
}

impl BillType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BillType::Room => "ROOM",
            BillType::WalkIn => "WALK_IN",
            BillType::Food => "FOOD",
            BillType::Manual => "MANUAL",
        }
    }
}

impl fmt::Display for BillType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BillType {
    type Err = BillingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ROOM" => Ok(BillType::Room),
            "WALK_IN" => Ok(BillType::WalkIn),
            "FOOD" => Ok(BillType::Food),
            "MANUAL" => Ok(BillType::Manual),
            other => Err(BillingError::validation(format!("unknown bill type '{}'", other))),
        }
    }
}

/// Bill status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BillStatus {
    /// Editable; line items may still be added
    Draft,
    /// Issued to the guest
    Finalized,
    /// Issued and chased for payment
    Unpaid,
    /// Payments cover the total. Terminal.
    Paid,
}

impl BillStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BillStatus::Draft => "DRAFT",
            BillStatus::Finalized => "FINALIZED",
            BillStatus::Unpaid => "UNPAID",
            BillStatus::Paid => "PAID",
        }
    }
}

impl fmt::Display for BillStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BillStatus {
    type Err = BillingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "DRAFT" => Ok(BillStatus::Draft),
            "FINALIZED" => Ok(BillStatus::Finalized),
            "UNPAID" => Ok(BillStatus::Unpaid),
            "PAID" => Ok(BillStatus::Paid),
            other => Err(BillingError::validation(format!("unknown bill status '{}'", other))),
        }
    }
}

/// A single charge on a bill
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub id: LineItemId,
    pub bill_id: BillId,
    /// Zero-based order on the bill
    pub position: i32,
    pub description: String,
    pub amount: Money,
}

impl LineItem {
    /// Creates a line item, rounding the amount to the currency's minor unit
    ///
    /// # Errors
    ///
    /// Returns `BillingError::Validation` for an empty description or a
    /// negative amount
    pub fn new(
        id: LineItemId,
        bill_id: BillId,
        position: i32,
        description: impl Into<String>,
        amount: Money,
    ) -> Result<Self, BillingError> {
        let description = description.into().trim().to_string();
        if description.is_empty() {
            return Err(BillingError::validation("line item description is required"));
        }
        let amount = amount.round_to_currency();
        if amount.is_negative() {
            return Err(BillingError::validation(format!(
                "line item amount cannot be negative: {}",
                amount
            )));
        }

        Ok(Self {
            id,
            bill_id,
            position,
            description,
            amount,
        })
    }
}

/// A charge requested on a new bill, before it has an identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Charge {
    pub description: String,
    pub amount: Money,
}

impl Charge {
    pub fn new(description: impl Into<String>, amount: Money) -> Self {
        Self {
            description: description.into(),
            amount,
        }
    }
}

/// Caller-supplied amounts for bills that are not line-item driven
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExplicitAmounts {
    pub subtotal: Money,
    pub tax: Money,
    pub discount: Money,
}

/// The monetary summary of a bill
///
/// # Invariants
///
/// - `total = subtotal + tax - discount`
/// - no component is negative
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillAmounts {
    pub subtotal: Money,
    pub tax: Money,
    pub discount: Money,
    pub total: Money,
}

impl BillAmounts {
    /// Builds amounts from the components, deriving the total
    ///
    /// Every component is rounded to the currency's minor unit first.
    ///
    /// # Errors
    ///
    /// Returns `BillingError::Validation` if a component or the resulting total
    /// is negative, and `BillingError::Money` on a currency mismatch
    pub fn new(subtotal: Money, tax: Money, discount: Money) -> Result<Self, BillingError> {
        let (subtotal, tax, discount) = (
            subtotal.round_to_currency(),
            tax.round_to_currency(),
            discount.round_to_currency(),
        );
        for (name, value) in [("subtotal", subtotal), ("tax", tax), ("discount", discount)] {
            if value.is_negative() {
                return Err(BillingError::validation(format!("{} cannot be negative", name)));
            }
        }

        let total = subtotal.checked_add(&tax)?.checked_sub(&discount)?.round_to_currency();
        if total.is_negative() {
            return Err(BillingError::validation(format!(
                "discount {} exceeds the bill amount",
                discount
            )));
        }

        Ok(Self {
            subtotal,
            tax,
            discount,
            total,
        })
    }

    /// Derives amounts from line items, applying `tax_rate` to the subtotal
    pub fn itemized(
        currency: Currency,
        items: &[LineItem],
        tax_rate: Rate,
        discount: Money,
    ) -> Result<Self, BillingError> {
        let subtotal = Money::sum(currency, items.iter().map(|item| &item.amount))?.round_to_currency();
        Self::new(subtotal, tax_rate.apply(&subtotal), discount)
    }

    pub fn zero(currency: Currency) -> Self {
        let zero = Money::zero(currency);
        Self {
            subtotal: zero,
            tax: zero,
            discount: zero,
            total: zero,
        }
    }

    /// Returns true if `total = subtotal + tax - discount` holds
    pub fn is_consistent(&self) -> bool {
        self.subtotal
            .checked_add(&self.tax)
            .and_then(|gross| gross.checked_sub(&self.discount))
            .map(|expected| expected.round_to_currency() == self.total.round_to_currency())
            .unwrap_or(false)
    }
}

/// Everything needed to issue a bill, minus its identity and invoice number
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillDraft {
    pub customer_id: CustomerId,
    pub reservation_id: Option<ReservationId>,
    pub bill_type: BillType,
    pub category: BillCategory,
    pub bill_date: NaiveDate,
    pub charges: Vec<Charge>,
    /// When set, these amounts are used instead of deriving them from `charges`
    pub explicit_amounts: Option<ExplicitAmounts>,
    pub discount: Option<Money>,
    pub notes: Option<String>,
}

impl BillDraft {
    pub fn new(customer_id: CustomerId, category: BillCategory, bill_date: NaiveDate) -> Self {
        Self {
            customer_id,
            reservation_id: None,
            bill_type: BillType::Manual,
            category,
            bill_date,
            charges: Vec::new(),
            explicit_amounts: None,
            discount: None,
            notes: None,
        }
    }

    pub fn with_reservation(mut self, reservation_id: ReservationId) -> Self {
        self.reservation_id = Some(reservation_id);
        self
    }

    pub fn with_type(mut self, bill_type: BillType) -> Self {
        self.bill_type = bill_type;
        self
    }

    pub fn with_charge(mut self, description: impl Into<String>, amount: Money) -> Self {
        self.charges.push(Charge::new(description, amount));
        self
    }

    pub fn with_explicit_amounts(mut self, amounts: ExplicitAmounts) -> Self {
        self.explicit_amounts = Some(amounts);
        self
    }

    pub fn with_discount(mut self, discount: Money) -> Self {
        self.discount = Some(discount);
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// Checks the draft can become a bill
    ///
    /// Run before an invoice number is allocated.
    ///
    /// # Errors
    ///
    /// Returns `BillingError::Validation` when there is nothing to bill, a
    /// charge is malformed, or an amount is in a currency other than `currency`
    pub fn validate(&self, currency: Currency) -> Result<(), BillingError> {
        if self.charges.is_empty() && self.explicit_amounts.is_none() {
            return Err(BillingError::validation(
                "a bill needs at least one line item or explicit amounts",
            ));
        }

        let mut amounts: Vec<&Money> = self.charges.iter().map(|c| &c.amount).collect();
        if let Some(explicit) = &self.explicit_amounts {
            amounts.extend([&explicit.subtotal, &explicit.tax, &explicit.discount]);
        }
        amounts.extend(self.discount.iter());

        if let Some(foreign) = amounts.iter().find(|m| m.currency() != currency) {
            return Err(BillingError::validation(format!(
                "amount {} is not in the property currency {}",
                foreign, currency
            )));
        }

        for charge in &self.charges {
            if charge.description.trim().is_empty() {
                return Err(BillingError::validation("line item description is required"));
            }
            if charge.amount.is_negative() {
                return Err(BillingError::validation(format!(
                    "line item amount cannot be negative: {}",
                    charge.amount
                )));
            }
        }

        Ok(())
    }
}

/// A guest bill
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bill {
    pub id: BillId,
    pub customer_id: CustomerId,
    pub reservation_id: Option<ReservationId>,
    pub bill_type: BillType,
    pub category: BillCategory,
    /// Category-scoped invoice number such as `GST-0042`
    pub invoice_number: String,
    pub bill_date: NaiveDate,
    pub amounts: BillAmounts,
    /// Rate the tax was derived from; `None` when the amounts were supplied explicitly
    pub tax_rate: Option<Rate>,
    pub status: BillStatus,
    pub line_items: Vec<LineItem>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Bill {
    /// Issues a DRAFT bill from a validated draft
    ///
    /// # Arguments
    ///
    /// * `id` - Identity of the new bill
    /// * `invoice_number` - Number allocated for the draft's category
    /// * `draft` - Customer, charges, and amounts
    /// * `gst_rate` - Rate applied to taxable itemized bills
    /// * `currency` - Property currency
    /// * `next_line_id` - Supplies an identity per line item
    /// * `now` - Creation timestamp
    ///
    /// # Errors
    ///
    /// Returns `BillingError::Validation` for anything [`BillDraft::validate`]
    /// rejects, or when the amounts violate the bill invariants
    pub fn issue(
        id: BillId,
        invoice_number: impl Into<String>,
        draft: BillDraft,
        gst_rate: Rate,
        currency: Currency,
        mut next_line_id: impl FnMut() -> LineItemId,
        now: DateTime<Utc>,
    ) -> Result<Self, BillingError> {
        draft.validate(currency)?;

        let line_items = draft
            .charges
            .into_iter()
            .enumerate()
            .map(|(position, charge)| {
                LineItem::new(next_line_id(), id, position as i32, charge.description, charge.amount)
            })
            .collect::<Result<Vec<_>, _>>()?;

        let (amounts, tax_rate) = match draft.explicit_amounts {
            Some(explicit) => (
                BillAmounts::new(explicit.subtotal, explicit.tax, explicit.discount)?,
                None,
            ),
            None => {
                let rate = if draft.category.is_taxable() { gst_rate } else { Rate::zero() };
                let discount = draft.discount.unwrap_or_else(|| Money::zero(currency));
                (BillAmounts::itemized(currency, &line_items, rate, discount)?, Some(rate))
            }
        };

        Ok(Self {
            id,
            customer_id: draft.customer_id,
            reservation_id: draft.reservation_id,
            bill_type: draft.bill_type,
            category: draft.category,
            invoice_number: invoice_number.into(),
            bill_date: draft.bill_date,
            amounts,
            tax_rate,
            status: BillStatus::Draft,
            line_items,
            notes: draft.notes,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn currency(&self) -> Currency {
        self.amounts.total.currency()
    }

    pub fn total(&self) -> Money {
        self.amounts.total
    }

    pub fn is_draft(&self) -> bool {
        self.status == BillStatus::Draft
    }

    /// Appends a line item and recomputes the amounts
    ///
    /// The tax is recomputed only when it was derived from a rate; explicit
    /// tax amounts are kept as they are.
    ///
    /// # Errors
    ///
    /// - `BillingError::InvalidTransition` unless the bill is DRAFT
    /// - `BillingError::Validation` for a malformed item
    pub fn add_line_item(
        &mut self,
        id: LineItemId,
        description: impl Into<String>,
        amount: Money,
        now: DateTime<Utc>,
    ) -> Result<&LineItem, BillingError> {
        if !self.is_draft() {
            return Err(BillingError::InvalidTransition {
                action: "add a line item to",
                status: self.status,
            });
        }
        if amount.currency() != self.currency() {
            return Err(BillingError::validation(format!(
                "amount {} is not in the bill currency {}",
                amount,
                self.currency()
            )));
        }

        let position = self.line_items.iter().map(|i| i.position + 1).max().unwrap_or(0);
        let item = LineItem::new(id, self.id, position, description, amount)?;

        let subtotal = self.amounts.subtotal.checked_add(&item.amount)?.round_to_currency();
        let tax = match self.tax_rate {
            Some(rate) => rate.apply(&subtotal),
            None => self.amounts.tax,
        };
        self.amounts = BillAmounts::new(subtotal, tax, self.amounts.discount)?;
        self.line_items.push(item);
        self.updated_at = now;

        Ok(&self.line_items[self.line_items.len() - 1])
    }

    /// DRAFT to FINALIZED
    ///
    /// # Errors
    ///
    /// Returns `BillingError::InvalidTransition` from any other status
    pub fn finalize(&mut self, now: DateTime<Utc>) -> Result<(), BillingError> {
        self.transition(BillStatus::Draft, BillStatus::Finalized, "finalize", now)
    }

    /// FINALIZED to UNPAID
    ///
    /// # Errors
    ///
    /// Returns `BillingError::InvalidTransition` from any other status
    pub fn mark_unpaid(&mut self, now: DateTime<Utc>) -> Result<(), BillingError> {
        self.transition(BillStatus::Finalized, BillStatus::Unpaid, "mark unpaid", now)
    }

    /// Promotes a FINALIZED or UNPAID bill to PAID
    ///
    /// Returns false when the bill is DRAFT or already PAID. A DRAFT bill
    /// has to be finalized before it can be settled.
    pub fn mark_paid(&mut self, now: DateTime<Utc>) -> bool {
        if !matches!(self.status, BillStatus::Finalized | BillStatus::Unpaid) {
            return false;
        }
        self.status = BillStatus::Paid;
        self.updated_at = now;
        true
    }

    fn transition(
        &mut self,
        from: BillStatus,
        to: BillStatus,
        action: &'static str,
        now: DateTime<Utc>,
    ) -> Result<(), BillingError> {
        if self.status != from {
            return Err(BillingError::InvalidTransition {
                action,
                status: self.status,
            });
        }
        self.status = to;
        self.updated_at = now;
        Ok(())
    }
}
