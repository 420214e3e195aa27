//! Payments and bill reconciliation
//!
//! Payments are append-only. No running balance is stored: the amount paid on
//! a bill is always recomputed from its payments.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use core_kernel::{BillId, Money, PaymentId};
use crate::error::BillingError;

/// Payment method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    Cash,
    Card,
    Upi,
    BankTransfer,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "CASH",
            PaymentMethod::Card => "CARD",
            PaymentMethod::Upi => "UPI",
            PaymentMethod::BankTransfer => "BANK_TRANSFER",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentMethod {
    type Err = BillingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CASH" => Ok(PaymentMethod::Cash),
            "CARD" => Ok(PaymentMethod::Card),
            "UPI" => Ok(PaymentMethod::Upi),
            "BANK_TRANSFER" => Ok(PaymentMethod::BankTransfer),
            other => Err(BillingError::validation(format!("unknown payment method '{}'", other))),
        }
    }
}

/// A recorded payment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    pub id: PaymentId,
    pub bill_id: BillId,
    pub amount: Money,
    pub method: PaymentMethod,
    pub payment_date: NaiveDate,
    /// External reference such as a card slip or UPI transaction id
    pub reference: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Payment {
    /// Records a payment against a bill
    ///
    /// The amount is rounded to the currency's minor unit before it is checked.
    ///
    /// # Errors
    ///
    /// Returns `BillingError::Validation` if the rounded amount is zero or negative
    pub fn record(
        id: PaymentId,
        bill_id: BillId,
        amount: Money,
        method: PaymentMethod,
        payment_date: NaiveDate,
        now: DateTime<Utc>,
    ) -> Result<Self, BillingError> {
        let amount = amount.round_to_currency();
        if !amount.is_positive() {
            return Err(BillingError::validation(format!(
                "payment amount must be positive, got {}",
                amount
            )));
        }

        Ok(Self {
            id,
            bill_id,
            amount,
            method,
            payment_date,
            reference: None,
            created_at: now,
        })
    }

    pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = Some(reference.into());
        self
    }
}

/// Where a bill stands against its payments
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reconciliation {
    pub total: Money,
    pub paid: Money,
    /// Amount still owed, never negative
    pub outstanding: Money,
    /// Amount paid beyond the total, if any
    pub overpaid_by: Option<Money>,
}

impl Reconciliation {
    /// Sums `payments` against `total`
    ///
    /// # Errors
    ///
    /// Returns `BillingError::Money` if a payment is in another currency
    pub fn compute<'a, I>(total: Money, payments: I) -> Result<Self, BillingError>
    where
        I: IntoIterator<Item = &'a Payment>,
    {
        let currency = total.currency();
        let paid = Money::sum(currency, payments.into_iter().map(|p| &p.amount))?;
        let difference = paid.checked_sub(&total)?;

        let (outstanding, overpaid_by) = if difference.is_negative() {
            (total.checked_sub(&paid)?, None)
        } else if difference.is_positive() {
            (Money::zero(currency), Some(difference))
        } else {
            (Money::zero(currency), None)
        };

        Ok(Self {
            total,
            paid,
            outstanding,
            overpaid_by,
        })
    }

    /// Payments cover the total
    pub fn is_settled(&self) -> bool {
        self.outstanding.is_zero()
    }
}
