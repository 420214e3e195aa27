//! Room inventory

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use core_kernel::{Money, RoomId, RoomTypeId};
use crate::error::ReservationError;

/// Housekeeping status of a room
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoomStatus {
    /// Ready for a guest
    Available,
    /// A checked-in guest is staying in the room
    Occupied,
    /// Taken out of service by an operator
    Maintenance,
}

impl RoomStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RoomStatus::Available => "AVAILABLE",
            RoomStatus::Occupied => "OCCUPIED",
            RoomStatus::Maintenance => "MAINTENANCE",
        }
    }
}

impl fmt::Display for RoomStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RoomStatus {
    type Err = ReservationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "AVAILABLE" => Ok(RoomStatus::Available),
            "OCCUPIED" => Ok(RoomStatus::Occupied),
            "MAINTENANCE" => Ok(RoomStatus::Maintenance),
            other => Err(ReservationError::validation(format!("unknown room status '{}'", other))),
        }
    }
}

/// A category of room with a default nightly rate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomType {
    pub id: RoomTypeId,
    pub name: String,
    pub default_rate: Money,
    pub created_at: DateTime<Utc>,
}

impl RoomType {
    /// Creates a room type
    ///
    /// # Errors
    ///
    /// Returns `ReservationError::Validation` for a blank name or a negative rate
    pub fn new(
        id: RoomTypeId,
        name: impl Into<String>,
        default_rate: Money,
        created_at: DateTime<Utc>,
    ) -> Result<Self, ReservationError> {
        let name = name.into().trim().to_string();
        if name.is_empty() {
            return Err(ReservationError::validation("room type name is required"));
        }
        if default_rate.is_negative() {
            return Err(ReservationError::validation("default rate cannot be negative"));
        }

        Ok(Self {
            id,
            name,
            default_rate,
            created_at,
        })
    }
}

/// A sellable room
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    pub id: RoomId,
    /// Human-facing number painted on the door, unique per property
    pub room_number: String,
    pub room_type_id: RoomTypeId,
    pub nightly_rate: Money,
    pub status: RoomStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Room {
    /// Creates an available room of the given type
    ///
    /// The nightly rate defaults to the type's rate when `rate` is `None`.
    ///
    /// # Errors
    ///
    /// Returns `ReservationError::Validation` for a blank room number or a
    /// negative rate
    pub fn new(
        id: RoomId,
        room_number: impl Into<String>,
        room_type: &RoomType,
        rate: Option<Money>,
        created_at: DateTime<Utc>,
    ) -> Result<Self, ReservationError> {
        let room_number = room_number.into().trim().to_string();
        if room_number.is_empty() {
            return Err(ReservationError::validation("room number is required"));
        }

        let nightly_rate = rate.unwrap_or(room_type.default_rate);
        if nightly_rate.is_negative() {
            return Err(ReservationError::validation("nightly rate cannot be negative"));
        }

        Ok(Self {
            id,
            room_number,
            room_type_id: room_type.id,
            nightly_rate,
            status: RoomStatus::Available,
            created_at,
            updated_at: created_at,
        })
    }

    pub fn is_occupied(&self) -> bool {
        self.status == RoomStatus::Occupied
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_kernel::Currency;
    use rust_decimal_macros::dec;

    fn deluxe() -> RoomType {
        RoomType::new(
            RoomTypeId::new_v7(),
            "Deluxe",
            Money::new(dec!(2500), Currency::INR),
            Utc::now(),
        )
        .unwrap()
    }

    #[test]
    fn test_room_inherits_type_rate() {
        let room = Room::new(RoomId::new_v7(), "101", &deluxe(), None, Utc::now()).unwrap();

        assert_eq!(room.nightly_rate.amount(), dec!(2500));
        assert_eq!(room.status, RoomStatus::Available);
    }

    #[test]
    fn test_room_rate_override() {
        let rate = Money::new(dec!(1800), Currency::INR);
        let room = Room::new(RoomId::new_v7(), "102", &deluxe(), Some(rate), Utc::now()).unwrap();

        assert_eq!(room.nightly_rate, rate);
    }

    #[test]
    fn test_blank_room_number_rejected() {
        let result = Room::new(RoomId::new_v7(), "  ", &deluxe(), None, Utc::now());
        assert!(matches!(result, Err(ReservationError::Validation(_))));
    }

    #[test]
    fn test_status_round_trips_through_str() {
        for status in [RoomStatus::Available, RoomStatus::Occupied, RoomStatus::Maintenance] {
            assert_eq!(status.as_str().parse::<RoomStatus>().unwrap(), status);
        }
    }
}
