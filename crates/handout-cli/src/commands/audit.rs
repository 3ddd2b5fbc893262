//! Audit trail command.

use clap::Args;
use serde::Serialize;
use tabled::Tabled;
use uuid::Uuid;

use handout_core::config::AppConfig;
use handout_core::result::AppResult;
use handout_entity::audit::AuditRecord;

use super::ActorArgs;
use crate::output::{self, OutputFormat};

/// Arguments for the audit command
#[derive(Debug, Args)]
pub struct AuditArgs {
    #[command(flatten)]
    pub actor: ActorArgs,

    /// Document ID
    #[arg(short, long)]
    pub document: Uuid,

    /// Number of records
    #[arg(short, long, default_value = "50")]
    pub limit: usize,
}

/// Audit display row
#[derive(Debug, Serialize, Tabled)]
struct AuditRow {
    /// Time
    time: String,
    /// Action
    action: String,
    /// Actor ID
    actor: String,
    /// Version ID
    version: String,
    /// Origin address
    origin: String,
    /// Detail
    detail: String,
}

impl From<&AuditRecord> for AuditRow {
    fn from(record: &AuditRecord) -> Self {
        Self {
            time: record.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            action: record.action.to_string(),
            actor: output::or_dash(record.actor_id),
            version: output::or_dash(record.version_id),
            origin: output::or_dash(record.origin.as_deref()),
            detail: output::or_dash(record.detail.as_deref()),
        }
    }
}

/// Execute the audit command
pub async fn execute(args: &AuditArgs, config: &AppConfig, format: OutputFormat) -> AppResult<()> {
    let engine = super::create_engine(config).await?;
    let records = engine
        .audit_trail(&args.actor.context(), args.document, args.limit)
        .await?;

    let rows: Vec<AuditRow> = records.iter().map(AuditRow::from).collect();
    output::print_list(&rows, format);
    Ok(())
}
