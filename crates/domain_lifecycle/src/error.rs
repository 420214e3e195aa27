//! Caller-facing errors of the lifecycle coordinator
//!
//! Domain and store errors are folded into five kinds. The kind is what an
//! outer adapter maps to a response; the message carries the detail.

use core_kernel::PortError;
use domain_billing::BillingError;
use domain_reservation::ReservationError;
use thiserror::Error;

/// Classification of a [`LifecycleError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NotFound,
    Validation,
    Conflict,
    InvalidState,
    Storage,
}

/// Errors returned by lifecycle operations
#[derive(Debug, Error)]
pub enum LifecycleError {
    /// The referenced entity does not exist
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Malformed or missing input
    #[error("Validation error: {0}")]
    Validation(String),

    /// The action collides with existing data
    #[error("Conflict: {0}")]
    Conflict(String),

    /// The entity's current status does not allow the action
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// The backing store failed
    #[error("Storage error: {0}")]
    Storage(#[source] PortError),
}

impl LifecycleError {
    pub fn not_found(entity: impl Into<String>, id: impl std::fmt::Display) -> Self {
        LifecycleError::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        LifecycleError::Validation(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        LifecycleError::Conflict(message.into())
    }

    pub fn invalid_state(message: impl Into<String>) -> Self {
        LifecycleError::InvalidState(message.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            LifecycleError::NotFound { .. } => ErrorKind::NotFound,
            LifecycleError::Validation(_) => ErrorKind::Validation,
            LifecycleError::Conflict(_) => ErrorKind::Conflict,
            LifecycleError::InvalidState(_) => ErrorKind::InvalidState,
            LifecycleError::Storage(_) => ErrorKind::Storage,
        }
    }
}

impl From<PortError> for LifecycleError {
    fn from(err: PortError) -> Self {
        match err {
            PortError::NotFound { entity_type, id } => LifecycleError::NotFound {
                entity: entity_type,
                id,
            },
            PortError::Validation { message, .. } => LifecycleError::Validation(message),
            PortError::Conflict { message } => LifecycleError::Conflict(message),
            other => LifecycleError::Storage(other),
        }
    }
}

impl From<ReservationError> for LifecycleError {
    fn from(err: ReservationError) -> Self {
        match err {
            ReservationError::InvalidDates(_) | ReservationError::Validation(_) => {
                LifecycleError::Validation(err.to_string())
            }
            ReservationError::AlreadyReserved { .. } | ReservationError::RoomOccupied { .. } => {
                LifecycleError::Conflict(err.to_string())
            }
            ReservationError::InvalidTransition { .. } => LifecycleError::InvalidState(err.to_string()),
        }
    }
}

impl From<BillingError> for LifecycleError {
    fn from(err: BillingError) -> Self {
        match err {
            BillingError::InvalidTransition { .. } => LifecycleError::InvalidState(err.to_string()),
            BillingError::Validation(_) | BillingError::Money(_) | BillingError::CounterRewind { .. } => {
                LifecycleError::Validation(err.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_kernel::RoomId;

    #[test]
    fn test_port_errors_keep_their_kind() {
        assert_eq!(LifecycleError::from(PortError::not_found("Room", "x")).kind(), ErrorKind::NotFound);
        assert_eq!(LifecycleError::from(PortError::conflict("dup")).kind(), ErrorKind::Conflict);
        assert_eq!(LifecycleError::from(PortError::validation("bad")).kind(), ErrorKind::Validation);
        assert_eq!(LifecycleError::from(PortError::connection("down")).kind(), ErrorKind::Storage);
    }

    #[test]
    fn test_occupancy_is_a_conflict() {
        let err: LifecycleError = ReservationError::RoomOccupied { room_id: RoomId::new_v7() }.into();
        assert_eq!(err.kind(), ErrorKind::Conflict);
        assert!(err.to_string().contains("currently occupied"));
    }
}
