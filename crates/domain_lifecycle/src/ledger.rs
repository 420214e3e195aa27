//! Reservation ledger

use chrono::{DateTime, NaiveDate, Utc};

use core_kernel::{CustomerId, ReservationId, RoomId, StayPeriod};
use domain_reservation::{Reservation, ReservationStatus};

use crate::error::LifecycleError;
use crate::ports::{ReservationQuery, StoreTransaction};

/// Reservation records within one store transaction
///
/// The ledger persists what it is given. Overlap is decided by the caller from
/// [`ReservationLedger::find_overlapping`] while it holds the room lock.
pub struct ReservationLedger<'a> {
    tx: &'a mut dyn StoreTransaction,
}

impl<'a> ReservationLedger<'a> {
    pub fn new(tx: &'a mut dyn StoreTransaction) -> Self {
        Self { tx }
    }

    /// ACTIVE reservations on the room whose stay overlaps `stay`
    pub async fn find_overlapping(
        &mut self,
        room_id: RoomId,
        stay: &StayPeriod,
    ) -> Result<Vec<Reservation>, LifecycleError> {
        Ok(self.tx.find_overlapping(room_id, stay).await?)
    }

    pub async fn create(&mut self, reservation: &Reservation) -> Result<(), LifecycleError> {
        Ok(self.tx.insert_reservation(reservation).await?)
    }

    pub async fn update_status(
        &mut self,
        id: ReservationId,
        status: ReservationStatus,
        at: DateTime<Utc>,
    ) -> Result<(), LifecycleError> {
        Ok(self.tx.update_reservation_status(id, status, at).await?)
    }

    pub async fn set_actual_check_in(
        &mut self,
        id: ReservationId,
        date: NaiveDate,
        at: DateTime<Utc>,
    ) -> Result<(), LifecycleError> {
        Ok(self.tx.set_actual_check_in(id, date, at).await?)
    }

    pub async fn set_actual_check_out(
        &mut self,
        id: ReservationId,
        date: NaiveDate,
        at: DateTime<Utc>,
    ) -> Result<(), LifecycleError> {
        Ok(self.tx.set_actual_check_out(id, date, at).await?)
    }

    pub async fn find_by_id(&mut self, id: ReservationId) -> Result<Reservation, LifecycleError> {
        Ok(self.tx.get_reservation(id).await?)
    }

    /// Reads a reservation and keeps it locked for the rest of the transaction
    pub async fn lock(&mut self, id: ReservationId) -> Result<Reservation, LifecycleError> {
        Ok(self.tx.lock_reservation(id).await?)
    }

    pub async fn find_by_customer(&mut self, customer_id: CustomerId) -> Result<Vec<Reservation>, LifecycleError> {
        Ok(self.tx.list_reservations(ReservationQuery::by_customer(customer_id)).await?)
    }

    /// Every reservation, newest first
    pub async fn find_all(&mut self) -> Result<Vec<Reservation>, LifecycleError> {
        Ok(self.tx.list_reservations(ReservationQuery::all()).await?)
    }

    /// ACTIVE reservations on the room whose guest has checked in
    pub async fn in_house(&mut self, room_id: RoomId) -> Result<Vec<Reservation>, LifecycleError> {
        let active = self
            .tx
            .list_reservations(ReservationQuery::by_room(room_id).with_status(ReservationStatus::Active))
            .await?;
        Ok(active.into_iter().filter(Reservation::is_checked_in).collect())
    }

    /// Writes status and actual dates of a reservation changed in memory
    pub async fn save_transition(&mut self, reservation: &Reservation) -> Result<(), LifecycleError> {
        if let Some(date) = reservation.actual_check_in {
            self.set_actual_check_in(reservation.id, date, reservation.updated_at).await?;
        }
        if let Some(date) = reservation.actual_check_out {
            self.set_actual_check_out(reservation.id, date, reservation.updated_at).await?;
        }
        self.update_status(reservation.id, reservation.status, reservation.updated_at).await
    }
}
