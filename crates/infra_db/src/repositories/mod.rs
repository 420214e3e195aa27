//! Repository implementations for lodging entities
//!
//! Each repository borrows the connection of an open transaction, so a
//! coordinator operation spanning rooms, reservations and bills commits or
//! rolls back as one. Rows are decoded into `*Row` structs with
//! [`sqlx::FromRow`] and converted into domain types with `TryFrom`; a
//! stored value that no longer parses surfaces as `DatabaseError::Decode`.

pub mod rooms;
pub mod reservations;
pub mod invoice_counters;
pub mod bills;
pub mod payments;

pub use rooms::{RoomRepository, RoomRow, RoomTypeRow};
pub use reservations::{ReservationRepository, ReservationRow};
pub use invoice_counters::{InvoiceCounterRepository, InvoiceCounterRow};
pub use bills::{BillRepository, BillRow, LineItemRow};
pub use payments::{PaymentRepository, PaymentRow};

use std::fmt::Display;
use std::str::FromStr;

use rust_decimal::Decimal;

use core_kernel::{Currency, Money};

use crate::error::DatabaseError;

/// Parses a text column holding an enum or code
pub(crate) fn parse_column<T>(column: &'static str, value: &str) -> Result<T, DatabaseError>
where
    T: FromStr,
    T::Err: Display,
{
    value.parse().map_err(|e| DatabaseError::decode(column, e))
}

/// Rebuilds a money value from an amount column and its currency column
pub(crate) fn money_column(column: &'static str, amount: Decimal, currency: &str) -> Result<Money, DatabaseError> {
    let currency: Currency = parse_column(column, currency)?;
    Ok(Money::new(amount, currency))
}
