//! Migration runner for local development databases.
//!
//! Production schemas are owned by the hosted backend; the bundled
//! migrations recreate the tables this service reads and writes.

use sqlx::PgPool;
use tracing::info;

use coastline_core::error::{AppError, ErrorKind};

/// Apply all pending migrations from `migrations/`.
pub async fn run_migrations(pool: &PgPool) -> Result<(), AppError> {
    info!("Running database migrations");

    sqlx::migrate!("../../migrations")
        .run(pool)
        .await
        .map_err(|e| {
            AppError::with_source(
                ErrorKind::Database,
                format!("Failed to run migrations: {e}"),
                e,
            )
        })?;

    info!("Database migrations completed");
    Ok(())
}
