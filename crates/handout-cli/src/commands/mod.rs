//! CLI command definitions and dispatch.

pub mod audit;
pub mod delete;
pub mod download;
pub mod ingest;
pub mod migrate;
pub mod restore;
pub mod share;
pub mod versions;

use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use tracing::debug;
use uuid::Uuid;

use handout_core::config::AppConfig;
use handout_core::config::database::StoreBackend;
use handout_core::error::AppError;
use handout_core::result::AppResult;
use handout_database::store::{MemoryRecordStore, PgRecordStore, RecordStore};
use handout_database::DatabasePool;
use handout_service::{RequestContext, StorageEngine};
use handout_storage::LocalStorageProvider;

use crate::output::OutputFormat;

/// Handout Vault: versioned handout storage
#[derive(Debug, Parser)]
#[command(name = "handout", version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: String,

    /// Environment overlay loaded from `{env}.toml` next to the config file
    #[arg(short, long, env = "HANDOUT_ENV")]
    pub env: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Apply database migrations
    Migrate,
    /// Upload a file as the next version of a document
    Ingest(ingest::IngestArgs),
    /// Resolve a version for download, optionally copying it out
    Download(download::DownloadArgs),
    /// Point a document back at an earlier version
    Restore(restore::RestoreArgs),
    /// List the versions of a document
    Versions(versions::VersionsArgs),
    /// Show the audit trail of a document
    Audit(audit::AuditArgs),
    /// Record a public share of the current version
    Share(share::ShareArgs),
    /// Record deletion of a document
    Delete(delete::DeleteArgs),
}

/// Identity of the caller, as an external auth layer would supply it.
#[derive(Debug, Clone, Args)]
pub struct ActorArgs {
    /// Acting user ID
    #[arg(short, long)]
    pub user: Uuid,

    /// Act with administrative rights
    #[arg(long)]
    pub admin: bool,

    /// Client address to record in the audit trail
    #[arg(long)]
    pub origin: Option<String>,
}

impl ActorArgs {
    /// Build the request context for this caller.
    pub fn context(&self) -> RequestContext {
        if self.admin {
            RequestContext::admin(self.user, self.origin.clone())
        } else {
            RequestContext::new(self.user, self.origin.clone())
        }
    }
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        match &self.command {
            Commands::Migrate => migrate::execute(config).await,
            Commands::Ingest(args) => ingest::execute(args, config, self.format).await,
            Commands::Download(args) => download::execute(args, config, self.format).await,
            Commands::Restore(args) => restore::execute(args, config, self.format).await,
            Commands::Versions(args) => versions::execute(args, config, self.format).await,
            Commands::Audit(args) => audit::execute(args, config, self.format).await,
            Commands::Share(args) => share::execute(args, config, self.format).await,
            Commands::Delete(args) => delete::execute(args, config, self.format).await,
        }
    }
}

/// Helper: load configuration from file plus the optional environment overlay
pub fn load_config(config_path: &str, env: Option<&str>) -> AppResult<AppConfig> {
    AppConfig::load(config_path, env)
}

/// Helper: build the record store selected by configuration
pub async fn create_store(config: &AppConfig) -> AppResult<Arc<dyn RecordStore>> {
    match config.database.backend {
        StoreBackend::Postgres => {
            let pool = DatabasePool::connect(&config.database).await?;
            Ok(Arc::new(PgRecordStore::new(pool)))
        }
        StoreBackend::Memory => Ok(Arc::new(MemoryRecordStore::new())),
    }
}

/// Helper: build the storage engine from configuration
pub async fn create_engine(config: &AppConfig) -> AppResult<StorageEngine> {
    let store = create_store(config).await?;
    let storage = LocalStorageProvider::new(&config.storage.root_path).await?;

    let engine = StorageEngine::new(
        config.storage.clone(),
        &config.versioning,
        store,
        Arc::new(storage),
    );
    if !engine.health_check().await? {
        return Err(AppError::internal("Storage engine is not healthy"));
    }
    debug!(engine = ?engine, "Storage engine ready");
    Ok(engine)
}
