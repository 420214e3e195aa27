//! Reservation Domain - Rooms and Stays
//!
//! This crate holds the room inventory model and the reservation lifecycle
//! rules. It is storage-agnostic: the lifecycle coordinator loads rooms and
//! reservations through its store port and applies the rules defined here.
//!
//! # Reservation lifecycle
//!
//! ```text
//!         book             check_in                check_out
//! (none) -------> ACTIVE -----------> ACTIVE* -----------------> COMPLETED
//!                   |  \
//!                   |   \ cancel
//!                   |    -----------> CANCELLED
//! ```
//!
//! `ACTIVE*` is an active reservation with its actual check-in stamped. It is
//! not a separately stored status.
//!
//! # Overlap rule
//!
//! Stays are half-open `[check_in, check_out)` intervals. For any room, no two
//! ACTIVE reservations may overlap; back-to-back stays are allowed.

pub mod room;
pub mod reservation;
pub mod availability;
pub mod error;

pub use room::{Room, RoomType, RoomStatus};
pub use reservation::{Reservation, ReservationStatus};
pub use availability::{find_overlapping, assess_booking};
pub use error::ReservationError;
