//! Lodging Service
//!
//! Process-level wiring around the lodging core:
//!
//! - [`config`]: `LODGING_*` settings over defaults
//! - [`telemetry`]: tracing subscriber with optional JSON output
//! - [`bootstrap`]: pool, migrations, store, clock and the coordinator
//!
//! ```rust,ignore
//! dotenvy::dotenv().ok();
//! let config = ServiceConfig::from_env()?;
//! telemetry::init(&config.log_level, config.log_json)?;
//! let service = bootstrap(&config).await?;
//! let rooms = service.coordinator.rooms().await?;
//! ```

pub mod config;
pub mod telemetry;
pub mod bootstrap;

pub use config::ServiceConfig;
pub use bootstrap::{bootstrap, build_coordinator, seed_invoice_counters, LodgingService};
