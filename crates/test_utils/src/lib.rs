//! Test Utilities Crate
//!
//! Shared test infrastructure for the lodging core test suite.
//!
//! # Modules
//!
//! - `fixtures`: Pre-built dates, amounts, and identifiers
//! - `builders`: Builders for reservation requests, bill drafts, and payments
//! - `harness`: A coordinator wired to the in-memory store and a fixed clock
//! - `database`: PostgreSQL test containers with the schema migrated
//! - `assertions`: Assertion helpers for bills, stays, and money
//! - `generators`: Property-based test data generators

pub mod fixtures;
pub mod builders;
pub mod harness;
pub mod database;
pub mod assertions;
pub mod generators;

pub use fixtures::*;
pub use builders::*;
pub use harness::*;
pub use database::*;
pub use assertions::*;
pub use generators::*;
