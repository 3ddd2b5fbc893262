//! Restore, listing, sharing and deletion.

use tracing::info;
use uuid::Uuid;

use handout_core::error::AppError;
use handout_core::result::AppResult;
use handout_entity::audit::{AuditAction, AuditRecord};
use handout_entity::document::Document;
use handout_entity::version::DocumentVersion;

use crate::audit::AuditService;
use crate::context::RequestContext;

use super::engine::{DocumentDetails, StorageEngine};

impl StorageEngine {
    /// Point a document back at one of its earlier versions.
    pub async fn restore_version(
        &self,
        ctx: &RequestContext,
        document_id: Uuid,
        version_id: Uuid,
    ) -> AppResult<Document> {
        self.load_authorized(ctx, document_id).await?;
        let version = self.load_version(version_id).await?;
        if version.document_id != document_id {
            return Err(AppError::version_mismatch(format!(
                "Version {version_id} does not belong to document {document_id}"
            )));
        }

        let lock = self.allocator.lock(document_id).await;
        let audit = AuditService::entry_for(ctx, AuditAction::Restore, document_id)
            .version(Some(version.id))
            .detail(Some(format!("restore v{}", version.version_number)));
        let document = self
            .pointer
            .set_current(&lock, document_id, version.id, audit)
            .await?;
        drop(lock);

        info!(
            document_id = %document_id,
            version = version.version_number,
            user_id = %ctx.user_id,
            "Version restored"
        );
        Ok(document)
    }

    /// A document and all its versions.
    pub async fn get_document(
        &self,
        ctx: &RequestContext,
        document_id: Uuid,
    ) -> AppResult<DocumentDetails> {
        let document = self.load_authorized(ctx, document_id).await?;
        let versions = self.store.list_versions(document_id).await?;
        Ok(DocumentDetails { document, versions })
    }

    /// All versions of a document, newest first.
    pub async fn list_versions(
        &self,
        ctx: &RequestContext,
        document_id: Uuid,
    ) -> AppResult<Vec<DocumentVersion>> {
        self.load_authorized(ctx, document_id).await?;
        self.store.list_versions(document_id).await
    }

    /// The version the document currently points at, if any.
    pub async fn current_version(
        &self,
        ctx: &RequestContext,
        document_id: Uuid,
    ) -> AppResult<Option<DocumentVersion>> {
        let document = self.load_authorized(ctx, document_id).await?;
        match document.current_version_id {
            Some(id) => Ok(Some(self.load_version(id).await?)),
            None => Ok(None),
        }
    }

    /// Record that a public share of the current version was issued.
    /// Token signing happens outside the engine.
    pub async fn record_share(
        &self,
        ctx: &RequestContext,
        document_id: Uuid,
        expires_in_hours: u32,
    ) -> AppResult<AuditRecord> {
        if expires_in_hours == 0 {
            return Err(AppError::validation("Share expiry must be at least one hour")
                .on_field("expires_in_hours"));
        }
        let document = self.load_authorized(ctx, document_id).await?;

        let record = self
            .audit
            .record(
                AuditService::entry_for(ctx, AuditAction::ShareCreated, document_id)
                    .version(document.current_version_id)
                    .detail(Some(format!("expires_in={expires_in_hours}h"))),
            )
            .await?;

        info!(document_id = %document_id, expires_in_hours, "Share recorded");
        Ok(record)
    }

    /// Record a deletion request. Stored versions are left in place;
    /// reclaiming them is an operator task.
    pub async fn delete_document(
        &self,
        ctx: &RequestContext,
        document_id: Uuid,
    ) -> AppResult<AuditRecord> {
        self.load_authorized(ctx, document_id).await?;
        let record = self
            .audit
            .record(AuditService::entry_for(ctx, AuditAction::Delete, document_id))
            .await?;

        info!(document_id = %document_id, user_id = %ctx.user_id, "Deletion recorded");
        Ok(record)
    }

    /// Audit records for a document, newest first.
    pub async fn audit_trail(
        &self,
        ctx: &RequestContext,
        document_id: Uuid,
        limit: usize,
    ) -> AppResult<Vec<AuditRecord>> {
        self.load_authorized(ctx, document_id).await?;
        self.audit.trail(document_id, limit).await
    }
}
