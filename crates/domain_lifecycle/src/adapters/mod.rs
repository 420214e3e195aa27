//! Store adapters that live alongside the ports
//!
//! The PostgreSQL adapter lives in `infra_db`.

pub mod memory;

pub use memory::{InMemoryLodgingStore, InMemoryTransaction, LodgingState};
