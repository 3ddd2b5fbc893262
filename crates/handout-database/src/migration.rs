//! Database migration runner.

use sqlx::PgPool;
use tracing::info;

use handout_core::error::{AppError, ErrorKind};
use handout_core::result::AppResult;

/// Run all pending database migrations.
pub async fn run_migrations(pool: &PgPool) -> AppResult<()> {
    info!("Running handout schema migrations");

    sqlx::migrate!("../../migrations")
        .run(pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to run migrations", e)
        })?;

    info!("Schema is up to date");
    Ok(())
}
