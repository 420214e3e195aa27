//! Invoice numbering
//!
//! Each billing category has one counter. Allocation reads the counter's next
//! number and increments it in the same step; the store runs that step inside
//! the bill transaction so a rolled-back bill also rolls back its number.
//! Gaps are tolerated, duplicates are not.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::bill::BillCategory;
use crate::error::BillingError;

/// Minimum number of digits printed for an invoice number
pub const INVOICE_NUMBER_WIDTH: usize = 4;

/// An allocated invoice number, printed as `PREFIX-0001`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InvoiceNumber {
    pub prefix: String,
    pub number: i64,
}

impl InvoiceNumber {
    pub fn new(prefix: impl Into<String>, number: i64) -> Self {
        Self {
            prefix: prefix.into(),
            number,
        }
    }
}

impl fmt::Display for InvoiceNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{:0width$}", self.prefix, self.number, width = INVOICE_NUMBER_WIDTH)
    }
}

/// Per-category invoice counter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceCounter {
    pub category: BillCategory,
    pub prefix: String,
    /// Number the next allocation will return
    pub next_number: i64,
    pub updated_at: DateTime<Utc>,
}

impl InvoiceCounter {
    /// Creates a counter starting at 1
    pub fn new(category: BillCategory, prefix: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            category,
            prefix: prefix.into(),
            next_number: 1,
            updated_at: now,
        }
    }

    /// Returns the next number and advances the counter
    pub fn allocate(&mut self, now: DateTime<Utc>) -> InvoiceNumber {
        let allocated = InvoiceNumber::new(self.prefix.clone(), self.next_number);
        self.next_number += 1;
        self.updated_at = now;
        allocated
    }

    /// Moves the counter so the next allocation returns `starting_number`
    ///
    /// # Errors
    ///
    /// - `BillingError::Validation` if `starting_number < 1`
    /// - `BillingError::CounterRewind` if it is below the current next number
    pub fn restart_at(&mut self, starting_number: i64, now: DateTime<Utc>) -> Result<(), BillingError> {
        check_starting_number(self, starting_number)?;
        self.next_number = starting_number;
        self.updated_at = now;
        Ok(())
    }
}

/// Validates a forward-only counter adjustment without applying it
pub fn check_starting_number(counter: &InvoiceCounter, starting_number: i64) -> Result<(), BillingError> {
    if starting_number < 1 {
        return Err(BillingError::validation("invoice starting number must be at least 1"));
    }
    if starting_number < counter.next_number {
        return Err(BillingError::CounterRewind {
            category: counter.category,
            next_number: counter.next_number,
            requested: starting_number,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invoice_number_padding() {
        assert_eq!(InvoiceNumber::new("GST", 7).to_string(), "GST-0007");
        assert_eq!(InvoiceNumber::new("INV", 12345).to_string(), "INV-12345");
    }

    #[test]
    fn test_allocate_advances() {
        let mut counter = InvoiceCounter::new(BillCategory::Gst, "GST", Utc::now());

        assert_eq!(counter.allocate(Utc::now()).number, 1);
        assert_eq!(counter.allocate(Utc::now()).number, 2);
        assert_eq!(counter.next_number, 3);
    }

    #[test]
    fn test_restart_only_moves_forward() {
        let mut counter = InvoiceCounter::new(BillCategory::NonGst, "INV", Utc::now());
        counter.restart_at(100, Utc::now()).unwrap();
        assert_eq!(counter.allocate(Utc::now()).to_string(), "INV-0100");

        let err = counter.restart_at(50, Utc::now()).unwrap_err();
        assert!(matches!(err, BillingError::CounterRewind { next_number: 101, requested: 50, .. }));
        assert!(counter.restart_at(0, Utc::now()).is_err());
    }
}
