//! Reservation records and their lifecycle transitions

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use core_kernel::{CustomerId, ReservationId, RoomId, StayPeriod};
use crate::error::ReservationError;

/// Reservation status
///
/// Transitions only move forward: ACTIVE to COMPLETED or ACTIVE to CANCELLED.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReservationStatus {
    Active,
    Completed,
    Cancelled,
}

impl ReservationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReservationStatus::Active => "ACTIVE",
            ReservationStatus::Completed => "COMPLETED",
            ReservationStatus::Cancelled => "CANCELLED",
        }
    }

    /// COMPLETED and CANCELLED reservations never change again
    pub fn is_terminal(&self) -> bool {
        !matches!(self, ReservationStatus::Active)
    }
}

impl fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReservationStatus {
    type Err = ReservationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ACTIVE" => Ok(ReservationStatus::Active),
            "COMPLETED" => Ok(ReservationStatus::Completed),
            "CANCELLED" => Ok(ReservationStatus::Cancelled),
            other => Err(ReservationError::validation(format!(
                "unknown reservation status '{}'",
                other
            ))),
        }
    }
}

/// A guest's booking of one room over a stay period
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reservation {
    pub id: ReservationId,
    pub customer_id: CustomerId,
    pub room_id: RoomId,
    /// Planned stay
    pub stay: StayPeriod,
    pub actual_check_in: Option<NaiveDate>,
    pub actual_check_out: Option<NaiveDate>,
    pub status: ReservationStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Reservation {
    /// Creates a new ACTIVE reservation
    ///
    /// Availability is not checked here; see [`crate::assess_booking`].
    pub fn book(
        id: ReservationId,
        customer_id: CustomerId,
        room_id: RoomId,
        stay: StayPeriod,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            customer_id,
            room_id,
            stay,
            actual_check_in: None,
            actual_check_out: None,
            status: ReservationStatus::Active,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == ReservationStatus::Active
    }

    pub fn is_checked_in(&self) -> bool {
        self.actual_check_in.is_some()
    }

    /// Stamps the actual check-in date
    ///
    /// # Errors
    ///
    /// Returns `ReservationError::InvalidTransition` unless the reservation is
    /// ACTIVE and not yet checked in
    pub fn check_in(&mut self, today: NaiveDate, now: DateTime<Utc>) -> Result<(), ReservationError> {
        if !self.is_active() {
            return Err(ReservationError::invalid_transition("check in", self.status));
        }
        if self.is_checked_in() {
            return Err(ReservationError::InvalidTransition {
                action: "check in",
                status: self.status,
                detail: " and already checked in",
            });
        }

        self.actual_check_in = Some(today);
        self.updated_at = now;
        Ok(())
    }

    /// Cancels the reservation
    ///
    /// Returns whether the guest had already checked in, in which case the
    /// caller is responsible for releasing the room.
    ///
    /// # Errors
    ///
    /// Returns `ReservationError::InvalidTransition` unless the reservation is ACTIVE
    pub fn cancel(&mut self, now: DateTime<Utc>) -> Result<bool, ReservationError> {
        if !self.is_active() {
            return Err(ReservationError::invalid_transition("cancel", self.status));
        }

        self.status = ReservationStatus::Cancelled;
        self.updated_at = now;
        Ok(self.is_checked_in())
    }

    /// Completes the stay on `date`
    ///
    /// A prior check-in is not required.
    ///
    /// # Errors
    ///
    /// - `ReservationError::InvalidTransition` unless the reservation is ACTIVE
    /// - `ReservationError::Validation` if `date` is before the actual check-in
    pub fn check_out(&mut self, date: NaiveDate, now: DateTime<Utc>) -> Result<(), ReservationError> {
        if !self.is_active() {
            return Err(ReservationError::invalid_transition("check out", self.status));
        }
        if let Some(checked_in) = self.actual_check_in {
            if date < checked_in {
                return Err(ReservationError::validation(format!(
                    "check-out date {} is before the actual check-in {}",
                    date, checked_in
                )));
            }
        }

        self.actual_check_out = Some(date);
        self.status = ReservationStatus::Completed;
        self.updated_at = now;
        Ok(())
    }

    /// Nights to charge for
    ///
    /// Actual dates win over planned ones; a same-day stay still costs one night.
    pub fn billable_nights(&self) -> i64 {
        let start = self.actual_check_in.unwrap_or(self.stay.check_in());
        let end = self.actual_check_out.unwrap_or(self.stay.check_out());
        (end - start).num_days().max(1)
    }

    /// Returns true if this reservation holds the room for any night of `stay`
    pub fn blocks(&self, stay: &StayPeriod) -> bool {
        self.is_active() && self.stay.overlaps(stay)
    }
}
