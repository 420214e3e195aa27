//! Reservation domain errors
//!
//! Variants are grouped by the caller-facing kind they map to: validation,
//! conflict, or invalid lifecycle state.

use core_kernel::{RoomId, StayPeriod, TemporalError};
use thiserror::Error;

use crate::reservation::ReservationStatus;

/// Errors that can occur in the reservation domain
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReservationError {
    /// The requested stay dates are malformed or empty
    #[error("Invalid stay dates: {0}")]
    InvalidDates(#[from] TemporalError),

    /// Other malformed or missing input
    #[error("Validation error: {0}")]
    Validation(String),

    /// An ACTIVE reservation already covers part of the requested stay
    #[error("Room {room_id} is already reserved for selected dates {requested}")]
    AlreadyReserved {
        room_id: RoomId,
        requested: StayPeriod,
    },

    /// The room is occupied and the requested stay starts today
    #[error("Room {room_id} is currently occupied")]
    RoomOccupied {
        room_id: RoomId,
    },

    /// The lifecycle action is not allowed from the current state
    #[error("Cannot {action} a reservation that is {status}{detail}")]
    InvalidTransition {
        action: &'static str,
        status: ReservationStatus,
        detail: &'static str,
    },
}

impl ReservationError {
    pub fn validation(message: impl Into<String>) -> Self {
        ReservationError::Validation(message.into())
    }

    pub(crate) fn invalid_transition(action: &'static str, status: ReservationStatus) -> Self {
        ReservationError::InvalidTransition {
            action,
            status,
            detail: "",
        }
    }

    /// Returns true for errors caused by competing bookings or occupancy
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            ReservationError::AlreadyReserved { .. } | ReservationError::RoomOccupied { .. }
        )
    }

    /// Returns true for errors caused by the reservation's lifecycle state
    pub fn is_invalid_state(&self) -> bool {
        matches!(self, ReservationError::InvalidTransition { .. })
    }
}
