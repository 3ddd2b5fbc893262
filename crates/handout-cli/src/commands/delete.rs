//! Delete command.

use clap::Args;
use uuid::Uuid;

use handout_core::config::AppConfig;
use handout_core::error::AppError;
use handout_core::result::AppResult;

use super::ActorArgs;
use crate::output::{self, OutputFormat};

/// Arguments for the delete command
#[derive(Debug, Args)]
pub struct DeleteArgs {
    #[command(flatten)]
    pub actor: ActorArgs,

    /// Document ID
    #[arg(short, long)]
    pub document: Uuid,

    /// Skip confirmation prompt
    #[arg(long)]
    pub force: bool,
}

/// Execute the delete command
pub async fn execute(args: &DeleteArgs, config: &AppConfig, format: OutputFormat) -> AppResult<()> {
    if !args.force {
        let confirm = dialoguer::Confirm::new()
            .with_prompt(format!("Record deletion of document {}?", args.document))
            .default(false)
            .interact()
            .map_err(|e| AppError::internal(format!("Prompt failed: {e}")))?;
        if !confirm {
            output::print_warning("Aborted.");
            return Ok(());
        }
    }

    let engine = super::create_engine(config).await?;
    let record = engine
        .delete_document(&args.actor.context(), args.document)
        .await?;

    output::print_success("Deletion recorded; stored versions are kept.");
    output::print_record(
        &record,
        &[
            ("Document", args.document.to_string()),
            ("Audit record", record.id.to_string()),
        ],
        format,
    );
    Ok(())
}
