//! Infrastructure Database Layer
//!
//! PostgreSQL persistence for the lodging core using SQLx.
//!
//! # Architecture
//!
//! - [`pool`]: connection pool configuration
//! - [`migrate`]: embedded schema migrations
//! - [`repositories`]: SQL for each entity, run on a borrowed transaction
//! - [`adapters`]: [`PostgresLodgingStore`], the `LodgingStore` port
//!   implementation the lifecycle coordinator runs on
//!
//! # Concurrency
//!
//! Correctness under concurrent requests rests on the schema and on row
//! locks, not on in-process state:
//!
//! - an exclusion constraint keeps ACTIVE stays of a room from overlapping
//! - invoice counters are advanced with `UPDATE ... RETURNING`, which holds
//!   the counter row until commit
//! - room, reservation and bill rows are read `FOR UPDATE` before a
//!   transition is written
//!
//! # Example
//!
//! ```rust,ignore
//! use infra_db::{create_pool, migrate, DatabaseConfig, PostgresLodgingStore};
//!
//! let pool = create_pool(DatabaseConfig::new("postgres://localhost/lodging")).await?;
//! migrate::run(&pool).await?;
//! let store = PostgresLodgingStore::new(pool);
//! ```

pub mod pool;
pub mod error;
pub mod migrate;
pub mod repositories;
pub mod adapters;

pub use pool::{create_pool, DatabaseConfig, DatabasePool};
pub use error::{db_to_port_error, DatabaseError};
pub use adapters::{PgLodgingTransaction, PostgresLodgingStore};
