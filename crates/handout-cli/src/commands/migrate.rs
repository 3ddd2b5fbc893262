//! Database migration command.

use handout_core::config::AppConfig;
use handout_core::config::database::StoreBackend;
use handout_core::result::AppResult;
use handout_database::DatabasePool;
use handout_database::migration::run_migrations;

use crate::output;

/// Apply all pending migrations to the configured database.
pub async fn execute(config: &AppConfig) -> AppResult<()> {
    if config.database.backend == StoreBackend::Memory {
        output::print_warning("The memory backend has no schema; nothing to migrate.");
        return Ok(());
    }

    let pool = DatabasePool::connect(&config.database).await?;
    run_migrations(pool.pool()).await?;
    pool.close().await;
    output::print_success("All migrations applied.");
    Ok(())
}
