//! Booking availability rules
//!
//! A room can be booked for a stay when no ACTIVE reservation on it overlaps
//! the stay, and it is not occupied right now by a stay that would clash with
//! a check-in today.

use chrono::NaiveDate;

use core_kernel::{RoomId, StayPeriod};
use crate::error::ReservationError;
use crate::reservation::Reservation;
use crate::room::Room;

/// Returns the ACTIVE reservations on `room_id` that overlap `stay`
///
/// Uses the half-open rule `existing.check_in < stay.check_out AND
/// existing.check_out > stay.check_in`, so a stay ending on the day another
/// begins is not returned.
pub fn find_overlapping<'a, I>(room_id: RoomId, stay: &StayPeriod, reservations: I) -> Vec<&'a Reservation>
where
    I: IntoIterator<Item = &'a Reservation>,
{
    reservations
        .into_iter()
        .filter(|r| r.room_id == room_id && r.blocks(stay))
        .collect()
}

/// Decides whether `stay` may be booked on `room`
///
/// # Arguments
///
/// * `room` - The room, freshly read under lock
/// * `overlapping` - ACTIVE reservations on the room overlapping `stay`
/// * `stay` - Requested stay
/// * `today` - Current date at the property
///
/// # Errors
///
/// - `ReservationError::AlreadyReserved` if anything overlaps
/// - `ReservationError::RoomOccupied` if the room is occupied and the stay starts today
pub fn assess_booking(
    room: &Room,
    overlapping: &[Reservation],
    stay: &StayPeriod,
    today: NaiveDate,
) -> Result<(), ReservationError> {
    if !overlapping.is_empty() {
        return Err(ReservationError::AlreadyReserved {
            room_id: room.id,
            requested: *stay,
        });
    }

    if room.is_occupied() && stay.check_in() == today {
        return Err(ReservationError::RoomOccupied { room_id: room.id });
    }

    Ok(())
}
