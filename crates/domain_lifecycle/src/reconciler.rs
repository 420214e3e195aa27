//! Payment reconciler
//!
//! Records a payment and decides whether the bill is now settled. The bill
//! row stays locked for the whole step, so two payments on one bill are
//! reconciled one after the other and each sees the other's amount.
//!
//! Only FINALIZED and UNPAID bills are promoted. Payments on a DRAFT bill are
//! recorded and counted, and the bill is settled when it is finalized.

use chrono::{DateTime, Utc};

use core_kernel::BillId;
use domain_billing::{Bill, BillStatus, Payment, Reconciliation};

use crate::error::LifecycleError;
use crate::ports::StoreTransaction;

/// Result of reconciling a bill after a payment
#[derive(Debug, Clone)]
pub struct Settlement {
    pub bill: Bill,
    pub reconciliation: Reconciliation,
    /// The payment moved the bill to PAID
    pub promoted: bool,
}

/// Payment operations within one store transaction
pub struct PaymentReconciler<'a> {
    tx: &'a mut dyn StoreTransaction,
}

impl<'a> PaymentReconciler<'a> {
    pub fn new(tx: &'a mut dyn StoreTransaction) -> Self {
        Self { tx }
    }

    /// Appends `payment` and promotes its bill to PAID once payments cover the total
    ///
    /// # Errors
    ///
    /// - `NotFound` if the bill does not exist
    /// - `Validation` if the payment is in another currency than the bill
    pub async fn record_payment(
        &mut self,
        payment: &Payment,
        now: DateTime<Utc>,
    ) -> Result<Settlement, LifecycleError> {
        let bill = self.tx.lock_bill(payment.bill_id).await?;
        if payment.amount.currency() != bill.currency() {
            return Err(LifecycleError::validation(format!(
                "payment {} is not in the bill currency {}",
                payment.amount,
                bill.currency()
            )));
        }

        self.tx.insert_payment(payment).await?;
        self.settle(bill, now).await
    }

    /// Promotes an already locked `bill` to PAID if its payments cover the total
    ///
    /// A DRAFT or already PAID bill is left as it is.
    pub async fn settle(&mut self, mut bill: Bill, now: DateTime<Utc>) -> Result<Settlement, LifecycleError> {
        let payments = self.tx.list_payments(bill.id).await?;
        let reconciliation = Reconciliation::compute(bill.total(), &payments)?;

        let promoted = reconciliation.is_settled() && bill.mark_paid(now);
        if promoted {
            self.tx.update_bill_status(bill.id, BillStatus::Paid, now).await?;
        }

        Ok(Settlement {
            bill,
            reconciliation,
            promoted,
        })
    }

    /// Where the bill stands against its payments
    pub async fn balance(&mut self, bill_id: BillId) -> Result<Reconciliation, LifecycleError> {
        let bill = self.tx.get_bill(bill_id).await?;
        let payments = self.tx.list_payments(bill.id).await?;
        Ok(Reconciliation::compute(bill.total(), &payments)?)
    }

    /// Payments of the bill, oldest first; `NotFound` for an unknown bill
    pub async fn payments(&mut self, bill_id: BillId) -> Result<Vec<Payment>, LifecycleError> {
        let bill = self.tx.get_bill(bill_id).await?;
        Ok(self.tx.list_payments(bill.id).await?)
    }
}
