//! Port adapters backed by PostgreSQL

pub mod lodging;

pub use lodging::{PgLodgingTransaction, PostgresLodgingStore};
