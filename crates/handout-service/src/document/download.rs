//! Download resolution.

use tracing::info;
use uuid::Uuid;

use handout_core::error::AppError;
use handout_core::result::AppResult;
use handout_entity::audit::{AuditAction, NewAuditRecord};

use crate::audit::AuditService;
use crate::context::RequestContext;

use super::engine::{DownloadTarget, StorageEngine, authorize};

impl StorageEngine {
    /// Resolve a version of a document for the caller to stream back.
    ///
    /// A version that exists but belongs to another document is reported as
    /// `NotFound`. Every successful call appends its own DOWNLOAD record.
    pub async fn resolve_download(
        &self,
        ctx: &RequestContext,
        document_id: Uuid,
        version_id: Uuid,
    ) -> AppResult<DownloadTarget> {
        let version = self
            .store
            .find_version(version_id)
            .await?
            .filter(|v| v.document_id == document_id)
            .ok_or_else(|| AppError::not_found(format!("Version {version_id} not found")))?;
        let document = self.load_document(document_id).await?;
        authorize(ctx, &document)?;

        let target = self.target_for(&version).await?;

        self.audit
            .record(
                AuditService::entry_for(ctx, AuditAction::Download, document_id)
                    .version(Some(version.id)),
            )
            .await?;

        info!(
            document_id = %document_id,
            version = version.version_number,
            user_id = %ctx.user_id,
            "Download resolved"
        );
        Ok(target)
    }

    /// Resolve the current version of a document for a public share.
    ///
    /// The share token is verified by the caller. The record carries no
    /// actor.
    pub async fn resolve_public_download(
        &self,
        document_id: Uuid,
        origin: Option<String>,
    ) -> AppResult<DownloadTarget> {
        let document = self.load_document(document_id).await?;
        let current = document
            .current_version_id
            .ok_or_else(|| AppError::not_found("Document has no version available"))?;
        let version = self.load_version(current).await?;

        let target = self.target_for(&version).await?;

        self.audit
            .record(
                NewAuditRecord::new(AuditAction::PublicDownload)
                    .document(document_id)
                    .version(Some(version.id))
                    .origin(origin),
            )
            .await?;

        info!(
            document_id = %document_id,
            version = version.version_number,
            "Public download resolved"
        );
        Ok(target)
    }
}
