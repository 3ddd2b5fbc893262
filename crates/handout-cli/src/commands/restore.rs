//! Restore command.

use clap::Args;
use uuid::Uuid;

use handout_core::config::AppConfig;
use handout_core::result::AppResult;

use super::ActorArgs;
use crate::output::{self, OutputFormat};

/// Arguments for the restore command
#[derive(Debug, Args)]
pub struct RestoreArgs {
    #[command(flatten)]
    pub actor: ActorArgs,

    /// Document ID
    #[arg(short, long)]
    pub document: Uuid,

    /// Version to make current
    #[arg(short, long)]
    pub version: Uuid,
}

/// Execute the restore command
pub async fn execute(args: &RestoreArgs, config: &AppConfig, format: OutputFormat) -> AppResult<()> {
    let engine = super::create_engine(config).await?;
    let document = engine
        .restore_version(&args.actor.context(), args.document, args.version)
        .await?;

    output::print_success("Version restored");
    output::print_record(
        &document,
        &[
            ("Document", document.id.to_string()),
            ("Title", document.title.clone()),
            ("Current version", output::or_dash(document.current_version_id)),
        ],
        format,
    );
    Ok(())
}
