//! Postgres connection pool and migrations.

use std::time::Duration;

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tracing::info;

use huddle_core::{CoreError, CoreResult};

/// Bounded pool shared by all request handlers.
pub const POOL_MIN_CONNECTIONS: u32 = 2;
pub const POOL_MAX_CONNECTIONS: u32 = 10;

const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

/// Open the shared connection pool.
pub async fn connect(database_url: &str) -> CoreResult<PgPool> {
    let pool = PgPoolOptions::new()
        .min_connections(POOL_MIN_CONNECTIONS)
        .max_connections(POOL_MAX_CONNECTIONS)
        .acquire_timeout(ACQUIRE_TIMEOUT)
        .connect(database_url)
        .await
        .map_err(|e| CoreError::persistence(format!("database connect: {e}")))?;

    info!(
        min = POOL_MIN_CONNECTIONS,
        max = POOL_MAX_CONNECTIONS,
        "connected to Postgres"
    );
    Ok(pool)
}

/// Apply the embedded migrations (idempotent).
pub async fn run_migrations(pool: &PgPool) -> CoreResult<()> {
    sqlx::migrate!()
        .run(pool)
        .await
        .map_err(|e| CoreError::persistence(format!("migrations: {e}")))?;

    info!("database migrations applied");
    Ok(())
}
