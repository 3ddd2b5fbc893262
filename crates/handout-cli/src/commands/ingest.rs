//! Ingest command: upload a local file as a new version.

use std::path::PathBuf;

use clap::Args;
use tokio_util::io::ReaderStream;
use uuid::Uuid;

use handout_core::config::AppConfig;
use handout_core::error::AppError;
use handout_core::result::AppResult;
use handout_service::IngestRequest;

use super::ActorArgs;
use crate::output::{self, OutputFormat};

/// Arguments for the ingest command
#[derive(Debug, Args)]
pub struct IngestArgs {
    /// Path to the file to upload
    pub file: PathBuf,

    #[command(flatten)]
    pub actor: ActorArgs,

    /// Document title; the document is created on first upload
    #[arg(short, long)]
    pub title: String,

    /// Add the version to this existing document instead
    #[arg(short, long)]
    pub document: Option<Uuid>,

    /// Description used when the document is created
    #[arg(long)]
    pub description: Option<String>,

    /// What changed in this version
    #[arg(long)]
    pub changelog: Option<String>,

    /// Declared content type
    #[arg(long, default_value = "application/octet-stream")]
    pub content_type: String,

    /// Override the declared filename
    #[arg(short, long)]
    pub name: Option<String>,
}

/// Execute the ingest command
pub async fn execute(args: &IngestArgs, config: &AppConfig, format: OutputFormat) -> AppResult<()> {
    let engine = super::create_engine(config).await?;

    let filename = match &args.name {
        Some(name) => name.clone(),
        None => args
            .file
            .file_name()
            .and_then(|n| n.to_str())
            .map(str::to_string)
            .ok_or_else(|| AppError::invalid_filename("Cannot derive a filename from the path"))?,
    };

    let file = tokio::fs::File::open(&args.file)
        .await
        .map_err(|e| AppError::io("Failed to open input file", e))?;
    let content = Box::pin(ReaderStream::with_capacity(file, config.storage.chunk_size_bytes));

    let request = IngestRequest {
        document_id: args.document,
        title: args.title.clone(),
        description: args.description.clone(),
        filename,
        content_type: args.content_type.clone(),
        changelog: args.changelog.clone(),
    };

    let version = engine
        .ingest_version(&args.actor.context(), request, content)
        .await?;

    output::print_success(&format!("Stored version {}", version.version_number));
    output::print_record(
        &version,
        &[
            ("Document", version.document_id.to_string()),
            ("Version ID", version.id.to_string()),
            ("Number", version.version_number.to_string()),
            ("Filename", version.filename.clone()),
            ("Size", format!("{} bytes", version.size_bytes)),
            ("SHA-256", version.checksum_sha256.clone()),
            ("Path", version.storage_path.clone()),
        ],
        format,
    );
    Ok(())
}
