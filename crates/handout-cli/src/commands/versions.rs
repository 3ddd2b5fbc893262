//! Versions command.

use clap::Args;
use serde::Serialize;
use tabled::Tabled;
use uuid::Uuid;

use handout_core::config::AppConfig;
use handout_core::result::AppResult;
use handout_entity::version::DocumentVersion;

use super::ActorArgs;
use crate::output::{self, OutputFormat};

/// Arguments for the versions command
#[derive(Debug, Args)]
pub struct VersionsArgs {
    #[command(flatten)]
    pub actor: ActorArgs,

    /// Document ID
    #[arg(short, long)]
    pub document: Uuid,
}

/// Version display row
#[derive(Debug, Serialize, Tabled)]
struct VersionRow {
    /// Version number, with the current one marked
    #[tabled(rename = "#")]
    number: String,
    /// Version ID
    id: String,
    /// Filename
    filename: String,
    /// Size in bytes
    size: i64,
    /// Uploaded at
    uploaded: String,
    /// Changelog
    changelog: String,
}

impl VersionRow {
    fn new(version: &DocumentVersion, current: Option<Uuid>) -> Self {
        let marker = if current == Some(version.id) { "*" } else { "" };
        Self {
            number: format!("{}{marker}", version.version_number),
            id: version.id.to_string(),
            filename: version.filename.clone(),
            size: version.size_bytes,
            uploaded: version.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            changelog: output::or_dash(version.changelog.as_deref()),
        }
    }
}

/// Execute the versions command
pub async fn execute(args: &VersionsArgs, config: &AppConfig, format: OutputFormat) -> AppResult<()> {
    let engine = super::create_engine(config).await?;
    let details = engine.get_document(&args.actor.context(), args.document).await?;

    let rows: Vec<_> = details
        .versions
        .iter()
        .map(|v| VersionRow::new(v, details.document.current_version_id))
        .collect();
    output::print_list(&rows, format);
    Ok(())
}
