//! Inputs and outcomes of coordinator operations

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use core_kernel::{temporal, BillId, CustomerId, Money, RoomId, RoomTypeId, StayPeriod};
use domain_billing::{Bill, BillStatus, Payment, PaymentMethod, Reconciliation};
use domain_reservation::Reservation;

use crate::error::LifecycleError;

/// Request to book a room
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewReservation {
    pub customer_id: CustomerId,
    pub room_id: RoomId,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
}

impl NewReservation {
    pub fn new(customer_id: CustomerId, room_id: RoomId, check_in: NaiveDate, check_out: NaiveDate) -> Self {
        Self {
            customer_id,
            room_id,
            check_in,
            check_out,
        }
    }

    /// Builds a request from `YYYY-MM-DD` strings
    ///
    /// # Errors
    ///
    /// Returns `LifecycleError::Validation` for a malformed date
    pub fn parse(
        customer_id: CustomerId,
        room_id: RoomId,
        check_in: &str,
        check_out: &str,
    ) -> Result<Self, LifecycleError> {
        let check_in = temporal::parse_date(check_in).map_err(|e| LifecycleError::validation(e.to_string()))?;
        let check_out = temporal::parse_date(check_out).map_err(|e| LifecycleError::validation(e.to_string()))?;
        Ok(Self::new(customer_id, room_id, check_in, check_out))
    }

    /// The requested stay; `Validation` unless check-out is after check-in
    pub fn stay(&self) -> Result<StayPeriod, LifecycleError> {
        StayPeriod::new(self.check_in, self.check_out).map_err(|e| LifecycleError::validation(e.to_string()))
    }
}

/// Request to add a room type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewRoomType {
    pub name: String,
    pub default_rate: Money,
}

/// Request to add a room
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewRoom {
    pub room_number: String,
    pub room_type_id: RoomTypeId,
    /// Overrides the type's default rate
    pub nightly_rate: Option<Money>,
}

/// Request to record a payment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPayment {
    pub bill_id: BillId,
    pub amount: Money,
    pub method: PaymentMethod,
    /// Defaults to today at the property
    pub payment_date: Option<NaiveDate>,
    pub reference: Option<String>,
}

impl NewPayment {
    pub fn new(bill_id: BillId, amount: Money, method: PaymentMethod) -> Self {
        Self {
            bill_id,
            amount,
            method,
            payment_date: None,
            reference: None,
        }
    }

    pub fn on(mut self, date: NaiveDate) -> Self {
        self.payment_date = Some(date);
        self
    }

    pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = Some(reference.into());
        self
    }
}

/// Outcome of recording a payment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentReceipt {
    pub payment: Payment,
    pub bill_status: BillStatus,
    pub balance: Reconciliation,
    /// This payment moved the bill to PAID
    pub settled_now: bool,
}

impl PaymentReceipt {
    pub fn is_overpaid(&self) -> bool {
        self.balance.overpaid_by.is_some()
    }
}

/// Outcome of checking out and billing in one step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutOutcome {
    pub reservation: Reservation,
    pub bill: Bill,
    /// The room was set back to AVAILABLE
    pub room_released: bool,
    /// Steps that failed after the checkout and bill were committed
    pub warnings: Vec<String>,
}
