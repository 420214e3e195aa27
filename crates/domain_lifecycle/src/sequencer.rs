//! Invoice sequencer
//!
//! Numbers are handed out by the store's atomic increment inside the caller's
//! transaction. If that transaction rolls back, so does the increment.

use chrono::{DateTime, Utc};
use tracing::debug;

use domain_billing::{check_starting_number, BillCategory, InvoiceCounter, InvoiceNumber};

use crate::error::LifecycleError;
use crate::ports::StoreTransaction;

/// Invoice numbering within one store transaction
pub struct InvoiceSequencer<'a> {
    tx: &'a mut dyn StoreTransaction,
}

impl<'a> InvoiceSequencer<'a> {
    pub fn new(tx: &'a mut dyn StoreTransaction) -> Self {
        Self { tx }
    }

    /// Allocates the next number of `category`
    pub async fn next_number(&mut self, category: BillCategory) -> Result<InvoiceNumber, LifecycleError> {
        let number = self.tx.next_invoice_number(category).await?;
        debug!(category = %category, invoice_number = %number, "Allocated invoice number");
        Ok(number)
    }

    /// Creates the counter for its category if missing; existing counters are untouched
    pub async fn ensure(&mut self, counter: &InvoiceCounter) -> Result<(), LifecycleError> {
        Ok(self.tx.ensure_invoice_counter(counter).await?)
    }

    pub async fn counters(&mut self) -> Result<Vec<InvoiceCounter>, LifecycleError> {
        Ok(self.tx.list_invoice_counters().await?)
    }

    /// Moves a counter forward so the next allocation returns `starting_number`
    ///
    /// # Errors
    ///
    /// `Validation` if `starting_number` is below 1 or below the counter's
    /// current next number
    pub async fn restart_at(
        &mut self,
        category: BillCategory,
        starting_number: i64,
        at: DateTime<Utc>,
    ) -> Result<InvoiceCounter, LifecycleError> {
        let mut counter = self.tx.lock_invoice_counter(category).await?;
        check_starting_number(&counter, starting_number)?;

        self.tx.set_invoice_next_number(category, starting_number, at).await?;
        counter.next_number = starting_number;
        counter.updated_at = at;
        Ok(counter)
    }
}
