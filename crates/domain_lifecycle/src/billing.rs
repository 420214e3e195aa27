//! Billing engine
//!
//! Turns a [`BillDraft`] into a numbered bill and drives the bill state
//! machine. The invoice number is allocated in the same transaction that
//! inserts the bill, after the draft has been validated.

use chrono::{DateTime, Utc};

use core_kernel::{BillId, Currency, CustomerId, IdGenerator, LineItemId, Money, Rate};
use domain_billing::{Bill, BillDraft, LineItem};

use crate::error::LifecycleError;
use crate::ports::{BillQuery, StoreTransaction};
use crate::sequencer::InvoiceSequencer;

/// Bill operations within one store transaction
pub struct BillingEngine<'a> {
    tx: &'a mut dyn StoreTransaction,
    currency: Currency,
    gst_rate: Rate,
}

impl<'a> BillingEngine<'a> {
    pub fn new(tx: &'a mut dyn StoreTransaction, currency: Currency, gst_rate: Rate) -> Self {
        Self { tx, currency, gst_rate }
    }

    /// Creates a DRAFT bill with its line items
    ///
    /// # Errors
    ///
    /// - `Validation` if the draft has nothing to bill or malformed amounts
    /// - `Conflict` if the draft's reservation already has a bill
    pub async fn create_bill(
        &mut self,
        draft: BillDraft,
        ids: &dyn IdGenerator,
        now: DateTime<Utc>,
    ) -> Result<Bill, LifecycleError> {
        draft.validate(self.currency)?;

        if let Some(reservation_id) = draft.reservation_id {
            if let Some(existing) = self.tx.find_bill_for_reservation(reservation_id).await? {
                return Err(LifecycleError::conflict(format!(
                    "reservation {} is already billed on {}",
                    reservation_id, existing.invoice_number
                )));
            }
        }

        let invoice_number = InvoiceSequencer::new(&mut *self.tx)
            .next_number(draft.category)
            .await?;

        let bill = Bill::issue(
            BillId::generate(ids),
            invoice_number.to_string(),
            draft,
            self.gst_rate,
            self.currency,
            || LineItemId::generate(ids),
            now,
        )?;

        self.tx.insert_bill(&bill).await?;
        Ok(bill)
    }

    /// DRAFT to FINALIZED
    pub async fn finalize(&mut self, bill_id: BillId, now: DateTime<Utc>) -> Result<Bill, LifecycleError> {
        let mut bill = self.tx.lock_bill(bill_id).await?;
        bill.finalize(now)?;
        self.tx.update_bill_status(bill.id, bill.status, now).await?;
        Ok(bill)
    }

    /// FINALIZED to UNPAID
    pub async fn mark_unpaid(&mut self, bill_id: BillId, now: DateTime<Utc>) -> Result<Bill, LifecycleError> {
        let mut bill = self.tx.lock_bill(bill_id).await?;
        bill.mark_unpaid(now)?;
        self.tx.update_bill_status(bill.id, bill.status, now).await?;
        Ok(bill)
    }

    /// Appends a charge to a DRAFT bill and stores the recomputed amounts
    pub async fn add_line_item(
        &mut self,
        bill_id: BillId,
        description: String,
        amount: Money,
        ids: &dyn IdGenerator,
        now: DateTime<Utc>,
    ) -> Result<(Bill, LineItem), LifecycleError> {
        let mut bill = self.tx.lock_bill(bill_id).await?;
        let item = bill
            .add_line_item(LineItemId::generate(ids), description, amount, now)?
            .clone();

        self.tx.insert_line_item(&item).await?;
        self.tx.update_bill_amounts(bill.id, &bill.amounts, now).await?;
        Ok((bill, item))
    }

    pub async fn get_by_id(&mut self, bill_id: BillId) -> Result<Bill, LifecycleError> {
        Ok(self.tx.get_bill(bill_id).await?)
    }

    pub async fn get_by_customer(&mut self, customer_id: CustomerId) -> Result<Vec<Bill>, LifecycleError> {
        Ok(self.tx.list_bills(BillQuery::by_customer(customer_id)).await?)
    }

    pub async fn find(&mut self, query: BillQuery) -> Result<Vec<Bill>, LifecycleError> {
        Ok(self.tx.list_bills(query).await?)
    }
}
