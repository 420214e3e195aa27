//! Service bootstrap
//!
//! Builds the coordinator embedding applications call into: a pool, the schema,
//! the PostgreSQL store, a clock in the property's timezone and the seeded
//! invoice counters.

use std::sync::Arc;

use anyhow::Context;
use tracing::info;

use core_kernel::{Clock, SystemClock, UuidV7Generator};
use domain_billing::BillCategory;
use domain_lifecycle::{LifecycleCoordinator, LifecycleError, LodgingStore};
use infra_db::{create_pool, migrate, DatabasePool, PostgresLodgingStore};

use crate::config::ServiceConfig;

/// A ready-to-serve lodging core
pub struct LodgingService {
    pub coordinator: Arc<LifecycleCoordinator>,
    pub pool: DatabasePool,
}

/// Connects, migrates and wires the coordinator
pub async fn bootstrap(config: &ServiceConfig) -> anyhow::Result<LodgingService> {
    let pool = create_pool(config.database())
        .await
        .context("connecting to the lodging database")?;

    if config.run_migrations {
        migrate::run(&pool).await.context("applying schema migrations")?;
    }

    let store = Arc::new(PostgresLodgingStore::new(pool.clone()));
    let clock = Arc::new(SystemClock::new(config.timezone));
    let coordinator = build_coordinator(config, store, clock);

    seed_invoice_counters(&coordinator, config)
        .await
        .context("seeding invoice counters")?;

    info!(
        currency = %config.currency,
        gst_rate = %config.gst_rate(),
        "Lodging service ready"
    );

    Ok(LodgingService {
        coordinator: Arc::new(coordinator),
        pool,
    })
}

/// Wires a coordinator over any store and clock
pub fn build_coordinator(
    config: &ServiceConfig,
    store: Arc<dyn LodgingStore>,
    clock: Arc<dyn Clock>,
) -> LifecycleCoordinator {
    LifecycleCoordinator::new(store, clock, Arc::new(UuidV7Generator), config.billing())
}

/// Creates the GST and non-GST counters with the configured prefixes
///
/// Counters that already exist keep their prefix and position.
pub async fn seed_invoice_counters(
    coordinator: &LifecycleCoordinator,
    config: &ServiceConfig,
) -> Result<(), LifecycleError> {
    coordinator
        .ensure_invoice_counter(BillCategory::Gst, config.gst_invoice_prefix.clone())
        .await?;
    coordinator
        .ensure_invoice_counter(BillCategory::NonGst, config.non_gst_invoice_prefix.clone())
        .await?;
    Ok(())
}
