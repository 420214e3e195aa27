//! Lifecycle Domain - Coordinating Rooms, Reservations, Bills, and Payments
//!
//! This crate owns the consistency engine of the lodging core. Each component
//! works inside one store transaction:
//!
//! - [`RoomRegistry`]: room identity, type, rate, and status
//! - [`ReservationLedger`]: reservation records and overlap queries
//! - [`InvoiceSequencer`]: per-category invoice numbers
//! - [`BillingEngine`]: bill creation and the bill state machine
//! - [`PaymentReconciler`]: payments and promotion to PAID
//!
//! The [`LifecycleCoordinator`] opens a transaction per logical action, runs
//! the components it needs, and commits. Callers see either the whole action
//! or none of it.
//!
//! Persistence is reached only through the [`LodgingStore`] port. An
//! in-memory adapter ships in [`adapters`]; the PostgreSQL adapter lives in
//! `infra_db`.

pub mod adapters;
pub mod billing;
pub mod coordinator;
pub mod error;
pub mod ledger;
pub mod ports;
pub mod reconciler;
pub mod registry;
pub mod requests;
pub mod sequencer;

pub use adapters::InMemoryLodgingStore;
pub use billing::BillingEngine;
pub use coordinator::{BillingSettings, LifecycleCoordinator};
pub use error::{ErrorKind, LifecycleError};
pub use ledger::ReservationLedger;
pub use ports::{BillQuery, LodgingStore, ReservationQuery, StoreTransaction};
pub use reconciler::{PaymentReconciler, Settlement};
pub use registry::RoomRegistry;
pub use requests::{CheckoutOutcome, NewPayment, NewReservation, NewRoom, NewRoomType, PaymentReceipt};
pub use sequencer::InvoiceSequencer;
