//! Share command.

use clap::Args;
use uuid::Uuid;

use handout_core::config::AppConfig;
use handout_core::result::AppResult;

use super::ActorArgs;
use crate::output::{self, OutputFormat};

/// Arguments for the share command
#[derive(Debug, Args)]
pub struct ShareArgs {
    #[command(flatten)]
    pub actor: ActorArgs,

    /// Document ID
    #[arg(short, long)]
    pub document: Uuid,

    /// Hours until the share expires
    #[arg(short, long, default_value = "24")]
    pub expires_hours: u32,
}

/// Execute the share command
pub async fn execute(args: &ShareArgs, config: &AppConfig, format: OutputFormat) -> AppResult<()> {
    let engine = super::create_engine(config).await?;
    let record = engine
        .record_share(&args.actor.context(), args.document, args.expires_hours)
        .await?;

    output::print_success("Share recorded");
    output::print_record(
        &record,
        &[
            ("Document", args.document.to_string()),
            ("Version", output::or_dash(record.version_id)),
            ("Expires in", format!("{}h", args.expires_hours)),
        ],
        format,
    );
    Ok(())
}
