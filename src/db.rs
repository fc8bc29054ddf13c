use log::info;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;

use crate::config::DatabaseConfig;
use crate::error::AppError;

/// Opens the connection pool described by `config`.
pub async fn connect(config: &DatabaseConfig) -> Result<PgPool, AppError> {
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .max_lifetime(Duration::from_secs(config.max_lifetime_minutes * 60))
        .acquire_timeout(Duration::from_secs(5))
        .connect(&config.url)
        .await?;

    info!(
        "database pool ready (max {} connections)",
        config.max_connections
    );
    Ok(pool)
}

/// Applies the SQL files under `migrations/`.
pub async fn migrate(pool: &PgPool) -> Result<(), AppError> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .map_err(|e| AppError::Internal(format!("failed to run migrations: {}", e)))?;
    info!("database migrations applied");
    Ok(())
}
