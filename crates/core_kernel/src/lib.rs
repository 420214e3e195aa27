//! Core Kernel - Foundational types shared by every lodging crate
//!
//! This crate provides the fundamental building blocks used across all domain modules:
//! - Money types with precise decimal arithmetic and a single configured currency
//! - Half-open stay periods for reservation overlap math
//! - Strongly-typed identifiers and the identity generation port
//! - Port primitives (errors, health checks, clock) used by store adapters

pub mod money;
pub mod temporal;
pub mod identifiers;
pub mod ports;

pub use money::{Money, Currency, MoneyError, Rate};
pub use temporal::{StayPeriod, TemporalError, Timezone};
pub use identifiers::{
    RoomId, RoomTypeId, ReservationId, CustomerId, BillId, LineItemId, PaymentId,
    IdGenerator, UuidV7Generator,
};
pub use ports::{
    PortError, DomainPort, HealthCheckable, HealthCheckResult, AdapterHealth,
    Clock, SystemClock, FixedClock,
};
