//! Download command: resolve a version and optionally copy it out.

use std::path::PathBuf;

use clap::Args;
use uuid::Uuid;

use handout_core::config::AppConfig;
use handout_core::error::AppError;
use handout_core::result::AppResult;
use handout_storage::checksum_file;

use super::ActorArgs;
use crate::output::{self, OutputFormat};

/// Arguments for the download command
#[derive(Debug, Args)]
pub struct DownloadArgs {
    #[command(flatten)]
    pub actor: ActorArgs,

    /// Document ID
    #[arg(short, long)]
    pub document: Uuid,

    /// Version ID
    #[arg(short, long)]
    pub version: Uuid,

    /// Copy the content to this path and verify its checksum
    #[arg(short, long)]
    pub out: Option<PathBuf>,
}

/// Execute the download command
pub async fn execute(
    args: &DownloadArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> AppResult<()> {
    let engine = super::create_engine(config).await?;
    let target = engine
        .resolve_download(&args.actor.context(), args.document, args.version)
        .await?;

    if let Some(out) = &args.out {
        tokio::fs::copy(&target.absolute_path, out)
            .await
            .map_err(|e| AppError::io("Failed to copy version content", e))?;
        let copied = checksum_file(out, config.storage.chunk_size_bytes).await?;
        if copied.sha256 != target.checksum_sha256 {
            return Err(AppError::internal("Copied content does not match the recorded checksum"));
        }
        output::print_success(&format!("Wrote {}", out.display()));
    }

    output::print_record(
        &target,
        &[
            ("Path", target.absolute_path.display().to_string()),
            ("Filename", target.filename.clone()),
            ("Content type", target.content_type.clone()),
            ("Size", format!("{} bytes", target.size_bytes)),
            ("SHA-256", target.checksum_sha256.clone()),
        ],
        format,
    );
    Ok(())
}
