//! Schema migrations
//!
//! The SQL files under the workspace `migrations/` directory are embedded at
//! compile time and applied in version order. Applied versions are recorded
//! in `_sqlx_migrations`, so running twice is a no-op.

use sqlx::migrate::Migrator;
use tracing::info;

use crate::error::DatabaseError;
use crate::pool::DatabasePool;

static MIGRATOR: Migrator = sqlx::migrate!("../../migrations");

/// Applies every pending migration
pub async fn run(pool: &DatabasePool) -> Result<(), DatabaseError> {
    info!(migrations = MIGRATOR.iter().count(), "Applying schema migrations");
    MIGRATOR.run(pool).await?;
    info!("Schema is up to date");
    Ok(())
}
