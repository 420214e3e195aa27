//! Lifecycle coordinator
//!
//! Every public operation runs in its own store transaction and either commits
//! as a whole or leaves nothing behind. The one deliberate exception is
//! [`LifecycleCoordinator::checkout_and_bill`], whose room release runs in a
//! follow-up transaction and is reported as a warning when it fails.
//!
//! # Reservation lifecycle
//!
//! ```text
//!         create           check_in                checkout
//! (none) -------> ACTIVE -----------> ACTIVE* -----------------> COMPLETED
//!                   |  \
//!                   |   \ cancel
//!                   |    -----------> CANCELLED
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! let coordinator = LifecycleCoordinator::new(store, clock, ids, settings);
//!
//! let reservation = coordinator
//!     .create_reservation(NewReservation::parse(customer, room, "2024-05-01", "2024-05-04")?)
//!     .await?;
//! coordinator.check_in(reservation.id).await?;
//! let outcome = coordinator
//!     .checkout_and_bill(reservation.id, today, BillCategory::Gst, None)
//!     .await?;
//! ```

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use core_kernel::{
    BillId, Clock, Currency, CustomerId, HealthCheckResult, IdGenerator, Money, PaymentId, Rate,
    ReservationId, RoomId, RoomTypeId,
};
use domain_billing::{Bill, BillCategory, BillDraft, BillType, InvoiceCounter, Payment, Reconciliation};
use domain_reservation::{
    assess_booking, Reservation, ReservationStatus, Room, RoomStatus, RoomType,
};

use crate::billing::BillingEngine;
use crate::error::LifecycleError;
use crate::ledger::ReservationLedger;
use crate::ports::{BillQuery, LodgingStore, StoreTransaction};
use crate::reconciler::PaymentReconciler;
use crate::registry::RoomRegistry;
use crate::requests::{CheckoutOutcome, NewPayment, NewReservation, NewRoom, NewRoomType, PaymentReceipt};
use crate::sequencer::InvoiceSequencer;

/// Money settings chosen once for the property
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillingSettings {
    pub currency: Currency,
    /// Applied to line-item driven GST bills
    pub gst_rate: Rate,
}

impl BillingSettings {
    pub fn new(currency: Currency, gst_rate: Rate) -> Self {
        Self { currency, gst_rate }
    }
}

/// Sequences multi-entity state changes as single units of work
pub struct LifecycleCoordinator {
    store: Arc<dyn LodgingStore>,
    clock: Arc<dyn Clock>,
    ids: Arc<dyn IdGenerator>,
    settings: BillingSettings,
}

impl LifecycleCoordinator {
    pub fn new(
        store: Arc<dyn LodgingStore>,
        clock: Arc<dyn Clock>,
        ids: Arc<dyn IdGenerator>,
        settings: BillingSettings,
    ) -> Self {
        Self {
            store,
            clock,
            ids,
            settings,
        }
    }

    pub fn settings(&self) -> BillingSettings {
        self.settings
    }

    async fn begin(&self) -> Result<Box<dyn StoreTransaction>, LifecycleError> {
        Ok(self.store.begin().await?)
    }

    fn engine<'t>(&self, tx: &'t mut dyn StoreTransaction) -> BillingEngine<'t> {
        BillingEngine::new(tx, self.settings.currency, self.settings.gst_rate)
    }

    fn ensure_currency(&self, amount: &Money) -> Result<(), LifecycleError> {
        if amount.currency() != self.settings.currency {
            return Err(LifecycleError::validation(format!(
                "amount {} is not in the property currency {}",
                amount, self.settings.currency
            )));
        }
        Ok(())
    }

    // ========================================================================
    // Rooms
    // ========================================================================

    /// Adds a room type; `Conflict` if the name is taken
    #[instrument(skip(self, request), fields(name = %request.name))]
    pub async fn register_room_type(&self, request: NewRoomType) -> Result<RoomType, LifecycleError> {
        self.ensure_currency(&request.default_rate)?;
        let room_type = RoomType::new(
            RoomTypeId::generate(self.ids.as_ref()),
            request.name,
            request.default_rate,
            self.clock.now(),
        )?;

        let mut tx = self.begin().await?;
        RoomRegistry::new(tx.as_mut()).register_room_type(&room_type).await?;
        tx.commit().await?;

        info!(room_type_id = %room_type.id, "Room type registered");
        Ok(room_type)
    }

    pub async fn room_types(&self) -> Result<Vec<RoomType>, LifecycleError> {
        let mut tx = self.begin().await?;
        let found = RoomRegistry::new(tx.as_mut()).room_types().await?;
        Ok(found)
    }

    /// Adds an AVAILABLE room
    ///
    /// # Errors
    ///
    /// - `NotFound` if the room type does not exist
    /// - `Conflict` if the room number is taken
    #[instrument(skip(self, request), fields(room_number = %request.room_number))]
    pub async fn register_room(&self, request: NewRoom) -> Result<Room, LifecycleError> {
        if let Some(rate) = &request.nightly_rate {
            self.ensure_currency(rate)?;
        }

        let mut tx = self.begin().await?;
        let room = {
            let mut registry = RoomRegistry::new(tx.as_mut());
            let room_type = registry.room_type(request.room_type_id).await?;
            let room = Room::new(
                RoomId::generate(self.ids.as_ref()),
                request.room_number,
                &room_type,
                request.nightly_rate,
                self.clock.now(),
            )?;
            registry.register_room(&room).await?;
            room
        };
        tx.commit().await?;

        info!(room_id = %room.id, "Room registered");
        Ok(room)
    }

    pub async fn room(&self, id: RoomId) -> Result<Room, LifecycleError> {
        let mut tx = self.begin().await?;
        let found = RoomRegistry::new(tx.as_mut()).get_room(id).await?;
        Ok(found)
    }

    pub async fn rooms(&self) -> Result<Vec<Room>, LifecycleError> {
        let mut tx = self.begin().await?;
        let found = RoomRegistry::new(tx.as_mut()).rooms().await?;
        Ok(found)
    }

    /// Operator status change, such as taking a room into maintenance
    ///
    /// No lifecycle rules are applied.
    #[instrument(skip(self), fields(room_id = %id, status = %status))]
    pub async fn set_room_status(&self, id: RoomId, status: RoomStatus) -> Result<Room, LifecycleError> {
        let now = self.clock.now();
        let mut tx = self.begin().await?;
        let room = {
            let mut registry = RoomRegistry::new(tx.as_mut());
            let mut room = registry.lock_room(id).await?;
            registry.set_status(id, status, now).await?;
            room.status = status;
            room.updated_at = now;
            room
        };
        tx.commit().await?;

        info!("Room status set");
        Ok(room)
    }

    // ========================================================================
    // Reservations
    // ========================================================================

    /// Books a room
    ///
    /// The room row is locked while overlaps are checked, so two bookings of
    /// the same room are decided one after the other.
    ///
    /// # Errors
    ///
    /// - `Validation` if check-out is not after check-in
    /// - `NotFound` if the room does not exist
    /// - `Conflict` if the stay overlaps an ACTIVE reservation, or the room is
    ///   occupied and the stay starts today
    #[instrument(skip(self, request), fields(room_id = %request.room_id, customer_id = %request.customer_id))]
    pub async fn create_reservation(&self, request: NewReservation) -> Result<Reservation, LifecycleError> {
        let stay = request.stay()?;
        let today = self.clock.today();

        let mut tx = self.begin().await?;
        let room = RoomRegistry::new(tx.as_mut()).lock_room(request.room_id).await?;

        let reservation = {
            let mut ledger = ReservationLedger::new(tx.as_mut());
            let overlapping = ledger.find_overlapping(room.id, &stay).await?;
            assess_booking(&room, &overlapping, &stay, today)?;

            let reservation = Reservation::book(
                ReservationId::generate(self.ids.as_ref()),
                request.customer_id,
                room.id,
                stay,
                self.clock.now(),
            );
            ledger.create(&reservation).await?;
            reservation
        };
        tx.commit().await?;

        info!(reservation_id = %reservation.id, stay = %stay, "Reservation created");
        Ok(reservation)
    }

    /// Stamps today's check-in and marks the room OCCUPIED
    ///
    /// # Errors
    ///
    /// `InvalidState` unless the reservation is ACTIVE and not yet checked in
    #[instrument(skip(self), fields(reservation_id = %id))]
    pub async fn check_in(&self, id: ReservationId) -> Result<Reservation, LifecycleError> {
        let now = self.clock.now();
        let mut tx = self.begin().await?;

        let mut reservation = ReservationLedger::new(tx.as_mut()).lock(id).await?;
        reservation.check_in(self.clock.today(), now)?;

        {
            let mut registry = RoomRegistry::new(tx.as_mut());
            registry.lock_room(reservation.room_id).await?;
            registry.set_status(reservation.room_id, RoomStatus::Occupied, now).await?;
        }
        ReservationLedger::new(tx.as_mut()).save_transition(&reservation).await?;
        tx.commit().await?;

        info!(room_id = %reservation.room_id, "Guest checked in");
        Ok(reservation)
    }

    /// Cancels an ACTIVE reservation
    ///
    /// If the guest had checked in and the room is still OCCUPIED, the room
    /// goes back to AVAILABLE.
    ///
    /// # Errors
    ///
    /// `InvalidState` unless the reservation is ACTIVE
    #[instrument(skip(self), fields(reservation_id = %id))]
    pub async fn cancel_reservation(&self, id: ReservationId) -> Result<Reservation, LifecycleError> {
        let now = self.clock.now();
        let mut tx = self.begin().await?;

        let mut reservation = ReservationLedger::new(tx.as_mut()).lock(id).await?;
        let was_checked_in = reservation.cancel(now)?;
        ReservationLedger::new(tx.as_mut()).save_transition(&reservation).await?;

        let mut released = false;
        if was_checked_in {
            let mut registry = RoomRegistry::new(tx.as_mut());
            let room = registry.lock_room(reservation.room_id).await?;
            if room.is_occupied() {
                registry.set_status(room.id, RoomStatus::Available, now).await?;
                released = true;
            }
        }
        tx.commit().await?;

        info!(room_released = released, "Reservation cancelled");
        Ok(reservation)
    }

    /// Completes the stay and sets the room AVAILABLE
    ///
    /// A prior check-in is not required. The room stays OCCUPIED while another
    /// reservation on it is checked in.
    ///
    /// # Errors
    ///
    /// - `InvalidState` unless the reservation is ACTIVE
    /// - `Validation` if `date` is before the actual check-in
    #[instrument(skip(self), fields(reservation_id = %id, date = %date))]
    pub async fn checkout(&self, id: ReservationId, date: NaiveDate) -> Result<Reservation, LifecycleError> {
        let now = self.clock.now();
        let mut tx = self.begin().await?;

        let mut reservation = ReservationLedger::new(tx.as_mut()).lock(id).await?;
        reservation.check_out(date, now)?;
        ReservationLedger::new(tx.as_mut()).save_transition(&reservation).await?;
        let released = release_if_vacant(tx.as_mut(), reservation.room_id, now).await?;
        tx.commit().await?;

        info!(room_id = %reservation.room_id, room_released = released, "Guest checked out");
        Ok(reservation)
    }

    /// Checks out and bills the stay in one transaction, then releases the room
    ///
    /// The room release runs after the checkout and bill have committed. If it
    /// fails, the checkout and bill stand and the failure is returned in
    /// [`CheckoutOutcome::warnings`]. A room another guest has checked in to
    /// in the meantime is left OCCUPIED and reported as not released.
    #[instrument(skip(self, discount), fields(reservation_id = %id, date = %date, category = %category))]
    pub async fn checkout_and_bill(
        &self,
        id: ReservationId,
        date: NaiveDate,
        category: BillCategory,
        discount: Option<Money>,
    ) -> Result<CheckoutOutcome, LifecycleError> {
        if let Some(discount) = &discount {
            self.ensure_currency(discount)?;
        }
        let now = self.clock.now();
        let mut tx = self.begin().await?;

        let mut reservation = ReservationLedger::new(tx.as_mut()).lock(id).await?;
        reservation.check_out(date, now)?;
        ReservationLedger::new(tx.as_mut()).save_transition(&reservation).await?;

        let room = RoomRegistry::new(tx.as_mut()).get_room(reservation.room_id).await?;
        let draft = self.stay_bill_draft(&reservation, &room, category, discount)?;
        let bill = self.engine(tx.as_mut()).create_bill(draft, self.ids.as_ref(), now).await?;
        tx.commit().await?;

        info!(bill_id = %bill.id, invoice_number = %bill.invoice_number, "Guest checked out and billed");

        let mut warnings = Vec::new();
        let room_released = match self.release_room(room.id).await {
            Ok(released) => released,
            Err(err) => {
                warn!(room_id = %room.id, error = %err, "Room release failed after checkout");
                warnings.push(format!("room {} was not released: {}", room.room_number, err));
                false
            }
        };

        Ok(CheckoutOutcome {
            reservation,
            bill,
            room_released,
            warnings,
        })
    }

    async fn release_room(&self, room_id: RoomId) -> Result<bool, LifecycleError> {
        let mut tx = self.begin().await?;
        let released = release_if_vacant(tx.as_mut(), room_id, self.clock.now()).await?;
        tx.commit().await?;
        Ok(released)
    }

    pub async fn reservation(&self, id: ReservationId) -> Result<Reservation, LifecycleError> {
        let mut tx = self.begin().await?;
        let found = ReservationLedger::new(tx.as_mut()).find_by_id(id).await?;
        Ok(found)
    }

    /// Every reservation, newest first
    pub async fn reservations(&self) -> Result<Vec<Reservation>, LifecycleError> {
        let mut tx = self.begin().await?;
        let found = ReservationLedger::new(tx.as_mut()).find_all().await?;
        Ok(found)
    }

    pub async fn reservations_for_customer(&self, customer_id: CustomerId) -> Result<Vec<Reservation>, LifecycleError> {
        let mut tx = self.begin().await?;
        let found = ReservationLedger::new(tx.as_mut()).find_by_customer(customer_id).await?;
        Ok(found)
    }

    // ========================================================================
    // Bills
    // ========================================================================

    fn stay_bill_draft(
        &self,
        reservation: &Reservation,
        room: &Room,
        category: BillCategory,
        discount: Option<Money>,
    ) -> Result<BillDraft, LifecycleError> {
        if reservation.status == ReservationStatus::Cancelled {
            return Err(LifecycleError::invalid_state(format!(
                "cannot bill reservation {} because it is {}",
                reservation.id, reservation.status
            )));
        }

        let nights = reservation.billable_nights();
        let amount = room.nightly_rate.multiply(Decimal::from(nights)).round_to_currency();
        let mut draft = BillDraft::new(reservation.customer_id, category, self.clock.today())
            .with_reservation(reservation.id)
            .with_type(BillType::Room)
            .with_charge(
                format!("Room {}: {} night(s) @ {}", room.room_number, nights, room.nightly_rate),
                amount,
            );
        if let Some(discount) = discount {
            draft = draft.with_discount(discount);
        }
        Ok(draft)
    }

    /// Creates a DRAFT bill from ad-hoc charges or explicit amounts
    ///
    /// # Errors
    ///
    /// - `Validation` if there is nothing to bill
    /// - `NotFound` if the draft references an unknown reservation
    /// - `Conflict` if that reservation already has a bill
    #[instrument(skip(self, draft), fields(customer_id = %draft.customer_id, category = %draft.category))]
    pub async fn create_bill(&self, draft: BillDraft) -> Result<Bill, LifecycleError> {
        draft.validate(self.settings.currency)?;
        let mut tx = self.begin().await?;

        if let Some(reservation_id) = draft.reservation_id {
            let reservation = ReservationLedger::new(tx.as_mut()).lock(reservation_id).await?;
            if reservation.status == ReservationStatus::Cancelled {
                return Err(LifecycleError::invalid_state(format!(
                    "cannot bill reservation {} because it is {}",
                    reservation.id, reservation.status
                )));
            }
        }

        let bill = self
            .engine(tx.as_mut())
            .create_bill(draft, self.ids.as_ref(), self.clock.now())
            .await?;
        tx.commit().await?;

        info!(bill_id = %bill.id, invoice_number = %bill.invoice_number, "Bill created");
        Ok(bill)
    }

    /// Bills a reservation's stay: nights times the room's nightly rate
    ///
    /// # Errors
    ///
    /// - `NotFound` if the reservation does not exist
    /// - `InvalidState` if it was cancelled
    /// - `Conflict` if it already has a bill
    #[instrument(skip(self, discount), fields(reservation_id = %id, category = %category))]
    pub async fn create_reservation_bill(
        &self,
        id: ReservationId,
        category: BillCategory,
        discount: Option<Money>,
    ) -> Result<Bill, LifecycleError> {
        if let Some(discount) = &discount {
            self.ensure_currency(discount)?;
        }
        let mut tx = self.begin().await?;

        let reservation = ReservationLedger::new(tx.as_mut()).lock(id).await?;
        let room = RoomRegistry::new(tx.as_mut()).get_room(reservation.room_id).await?;
        let draft = self.stay_bill_draft(&reservation, &room, category, discount)?;
        let bill = self
            .engine(tx.as_mut())
            .create_bill(draft, self.ids.as_ref(), self.clock.now())
            .await?;
        tx.commit().await?;

        info!(bill_id = %bill.id, invoice_number = %bill.invoice_number, "Stay billed");
        Ok(bill)
    }

    /// Appends a charge to a DRAFT bill
    #[instrument(skip(self, description), fields(bill_id = %bill_id, amount = %amount))]
    pub async fn add_line_item(
        &self,
        bill_id: BillId,
        description: impl Into<String>,
        amount: Money,
    ) -> Result<Bill, LifecycleError> {
        let description = description.into();
        let mut tx = self.begin().await?;
        let (bill, _) = self
            .engine(tx.as_mut())
            .add_line_item(bill_id, description, amount, self.ids.as_ref(), self.clock.now())
            .await?;
        tx.commit().await?;

        info!(total = %bill.total(), "Line item added");
        Ok(bill)
    }

    /// DRAFT to FINALIZED; `InvalidState` from any other status
    ///
    /// Payments taken while the bill was a draft count here: when they
    /// already cover the total the bill goes straight on to PAID.
    #[instrument(skip(self), fields(bill_id = %bill_id))]
    pub async fn finalize_bill(&self, bill_id: BillId) -> Result<Bill, LifecycleError> {
        let now = self.clock.now();
        let mut tx = self.begin().await?;
        let finalized = self.engine(tx.as_mut()).finalize(bill_id, now).await?;
        let settlement = PaymentReconciler::new(tx.as_mut()).settle(finalized, now).await?;
        tx.commit().await?;

        info!(
            invoice_number = %settlement.bill.invoice_number,
            status = %settlement.bill.status,
            "Bill finalized"
        );
        Ok(settlement.bill)
    }

    /// FINALIZED to UNPAID; `InvalidState` from any other status
    #[instrument(skip(self), fields(bill_id = %bill_id))]
    pub async fn mark_bill_unpaid(&self, bill_id: BillId) -> Result<Bill, LifecycleError> {
        let mut tx = self.begin().await?;
        let bill = self.engine(tx.as_mut()).mark_unpaid(bill_id, self.clock.now()).await?;
        tx.commit().await?;

        info!(invoice_number = %bill.invoice_number, "Bill marked unpaid");
        Ok(bill)
    }

    pub async fn bill(&self, bill_id: BillId) -> Result<Bill, LifecycleError> {
        let mut tx = self.begin().await?;
        let found = self.engine(tx.as_mut()).get_by_id(bill_id).await?;
        Ok(found)
    }

    /// Every bill, newest first
    pub async fn bills(&self) -> Result<Vec<Bill>, LifecycleError> {
        let mut tx = self.begin().await?;
        let found = self.engine(tx.as_mut()).find(BillQuery::all()).await?;
        Ok(found)
    }

    pub async fn bills_for_customer(&self, customer_id: CustomerId) -> Result<Vec<Bill>, LifecycleError> {
        let mut tx = self.begin().await?;
        let found = self.engine(tx.as_mut()).get_by_customer(customer_id).await?;
        Ok(found)
    }

    // ========================================================================
    // Payments
    // ========================================================================

    /// Records a payment and settles the bill once payments cover its total
    ///
    /// Overpayment is accepted; the receipt reports the excess and a warning
    /// is logged.
    ///
    /// # Errors
    ///
    /// - `Validation` if the amount is not positive
    /// - `NotFound` if the bill does not exist
    #[instrument(skip(self, request), fields(bill_id = %request.bill_id, amount = %request.amount, method = %request.method))]
    pub async fn record_payment(&self, request: NewPayment) -> Result<PaymentReceipt, LifecycleError> {
        self.ensure_currency(&request.amount)?;
        let mut payment = Payment::record(
            PaymentId::generate(self.ids.as_ref()),
            request.bill_id,
            request.amount,
            request.method,
            request.payment_date.unwrap_or_else(|| self.clock.today()),
            self.clock.now(),
        )?;
        if let Some(reference) = request.reference {
            payment = payment.with_reference(reference);
        }

        let mut tx = self.begin().await?;
        let settlement = PaymentReconciler::new(tx.as_mut())
            .record_payment(&payment, self.clock.now())
            .await?;
        tx.commit().await?;

        if let Some(excess) = settlement.reconciliation.overpaid_by {
            warn!(
                payment_id = %payment.id,
                overpaid_by = %excess,
                total = %settlement.reconciliation.total,
                "Bill overpaid"
            );
        }
        info!(
            payment_id = %payment.id,
            bill_status = %settlement.bill.status,
            outstanding = %settlement.reconciliation.outstanding,
            "Payment recorded"
        );

        Ok(PaymentReceipt {
            payment,
            bill_status: settlement.bill.status,
            balance: settlement.reconciliation,
            settled_now: settlement.promoted,
        })
    }

    /// Payments of a bill, oldest first
    pub async fn payments_for_bill(&self, bill_id: BillId) -> Result<Vec<Payment>, LifecycleError> {
        let mut tx = self.begin().await?;
        let found = PaymentReconciler::new(tx.as_mut()).payments(bill_id).await?;
        Ok(found)
    }

    /// Total paid, outstanding, and any overpayment of a bill
    pub async fn bill_balance(&self, bill_id: BillId) -> Result<Reconciliation, LifecycleError> {
        let mut tx = self.begin().await?;
        let found = PaymentReconciler::new(tx.as_mut()).balance(bill_id).await?;
        Ok(found)
    }

    // ========================================================================
    // Invoice Counters
    // ========================================================================

    /// Creates the category's counter with `prefix` unless it already exists
    #[instrument(skip(self, prefix), fields(category = %category))]
    pub async fn ensure_invoice_counter(
        &self,
        category: BillCategory,
        prefix: impl Into<String>,
    ) -> Result<(), LifecycleError> {
        let counter = InvoiceCounter::new(category, prefix, self.clock.now());
        let mut tx = self.begin().await?;
        InvoiceSequencer::new(tx.as_mut()).ensure(&counter).await?;
        tx.commit().await?;
        Ok(())
    }

    pub async fn invoice_counters(&self) -> Result<Vec<InvoiceCounter>, LifecycleError> {
        let mut tx = self.begin().await?;
        let found = InvoiceSequencer::new(tx.as_mut()).counters().await?;
        Ok(found)
    }

    /// Moves a counter forward so the next invoice gets `starting_number`
    ///
    /// # Errors
    ///
    /// `Validation` if the number is below 1 or would re-issue numbers
    #[instrument(skip(self), fields(category = %category))]
    pub async fn set_invoice_starting_number(
        &self,
        category: BillCategory,
        starting_number: i64,
    ) -> Result<InvoiceCounter, LifecycleError> {
        let mut tx = self.begin().await?;
        let counter = InvoiceSequencer::new(tx.as_mut())
            .restart_at(category, starting_number, self.clock.now())
            .await?;
        tx.commit().await?;

        info!(next_number = counter.next_number, "Invoice counter moved");
        Ok(counter)
    }

    // ========================================================================
    // Health
    // ========================================================================

    pub async fn store_health(&self) -> HealthCheckResult {
        self.store.health_check().await
    }
}

/// Sets the room AVAILABLE unless a guest is checked in to it
///
/// The room row is locked before the in-house check, so a check-in racing
/// this release either commits first and is seen, or waits and wins.
async fn release_if_vacant(
    tx: &mut dyn StoreTransaction,
    room_id: RoomId,
    now: DateTime<Utc>,
) -> Result<bool, LifecycleError> {
    RoomRegistry::new(&mut *tx).lock_room(room_id).await?;
    let in_house = ReservationLedger::new(&mut *tx).in_house(room_id).await?;
    if let Some(guest) = in_house.first() {
        info!(room_id = %room_id, reservation_id = %guest.id, "Room kept occupied by a checked-in guest");
        return Ok(false);
    }

    RoomRegistry::new(tx).set_status(room_id, RoomStatus::Available, now).await?;
    Ok(true)
}
