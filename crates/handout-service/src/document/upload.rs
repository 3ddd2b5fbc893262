//! Version ingest.

use tracing::{info, warn};
use uuid::Uuid;

use handout_core::error::AppError;
use handout_core::result::AppResult;
use handout_core::traits::{ByteStream, StagedObject};
use handout_entity::audit::AuditAction;
use handout_entity::document::{CreateDocument, Document};
use handout_entity::version::{DocumentVersion, NewVersion};
use handout_storage::path::version_path;

use crate::audit::AuditService;
use crate::context::RequestContext;

use super::engine::{IngestRequest, StorageEngine};
use super::validation::ValidatedName;

impl StorageEngine {
    /// Store `content` as the next version of a document.
    ///
    /// Nothing becomes visible unless every step succeeds: the staged bytes
    /// and any placed-but-uncommitted file are removed on failure or when
    /// the returned future is dropped. A commit that has already started
    /// finishes regardless, and its file is kept exactly when the record
    /// is written.
    pub async fn ingest_version(
        &self,
        ctx: &RequestContext,
        request: IngestRequest,
        content: ByteStream,
    ) -> AppResult<DocumentVersion> {
        let filename = request.filename.clone();
        let result = self.ingest(ctx, request, content).await;
        if let Err(e) = &result {
            warn!(
                user_id = %ctx.user_id,
                filename = %filename,
                kind = %e.kind,
                error = %e,
                "Upload rejected"
            );
        }
        result
    }

    async fn ingest(
        &self,
        ctx: &RequestContext,
        request: IngestRequest,
        content: ByteStream,
    ) -> AppResult<DocumentVersion> {
        let name = self.policy.check_filename(&request.filename)?;
        self.policy.check_content_type(&request.content_type, &name);

        // An explicit target is authorized before any byte is read.
        let existing = match request.document_id {
            Some(id) => Some(self.load_authorized(ctx, id).await?),
            None => None,
        };

        let staged = self.storage.stage(content, self.policy.max_bytes()).await?;

        let document = match existing {
            Some(document) => document,
            None => {
                self.store
                    .find_or_create_document(CreateDocument {
                        owner_id: ctx.user_id,
                        title: request.title.clone(),
                        description: request.description.clone(),
                    })
                    .await?
            }
        };

        let version = self
            .allocate(ctx, &document, &name, &request, &staged)
            .await?;

        info!(
            document_id = %document.id,
            version = version.version_number,
            size = version.size_bytes,
            sha256 = %version.checksum_sha256,
            user_id = %ctx.user_id,
            "Version stored"
        );
        Ok(version)
    }

    /// Allocate a number, place the staged bytes and commit, retrying lost
    /// races up to the configured bound.
    async fn allocate(
        &self,
        ctx: &RequestContext,
        document: &Document,
        name: &ValidatedName,
        request: &IngestRequest,
        staged: &StagedObject,
    ) -> AppResult<DocumentVersion> {
        let size_bytes = i64::try_from(staged.size_bytes)
            .map_err(|_| AppError::payload_too_large(self.policy.max_bytes()))?;

        for attempt in 1..=self.max_allocation_retries {
            let lock = self.allocator.lock(document.id).await;
            let number = self.allocator.next_version_number(document.id).await?;
            let path = version_path(document.owner_id, document.id, number, &name.safe_name);

            let placed = match self.storage.place(staged, &path).await {
                Ok(placed) => placed,
                Err(e) if e.is_retryable() => {
                    warn!(
                        document_id = %document.id,
                        version = number,
                        attempt,
                        "Version slot taken on disk, retrying"
                    );
                    continue;
                }
                Err(e) => return Err(e),
            };

            let version_id = Uuid::new_v4();
            let version = NewVersion {
                id: version_id,
                document_id: document.id,
                version_number: number,
                storage_path: path,
                filename: request.filename.clone(),
                content_type: request.content_type.clone(),
                checksum_sha256: staged.checksum_sha256.clone(),
                size_bytes,
                uploaded_by: ctx.user_id,
                changelog: request.changelog.clone(),
            };
            let audit = AuditService::entry_for(ctx, AuditAction::Upload, document.id)
                .version(Some(version_id))
                .detail(request.changelog.clone());

            // Commit and keep run in their own task so a dropped caller cannot
            // separate a committed record from its file.
            let allocator = self.allocator.clone();
            let commit = tokio::spawn(async move {
                let _lock = lock;
                let created = allocator.create_version(version, audit).await?;
                placed.keep();
                Ok::<_, AppError>(created)
            });
            let outcome = commit
                .await
                .map_err(|e| AppError::internal(format!("Version commit task failed: {e}")))?;

            match outcome {
                Ok(created) => return Ok(created),
                Err(e) if e.is_retryable() => {
                    warn!(
                        document_id = %document.id,
                        version = number,
                        attempt,
                        "Version number taken, retrying"
                    );
                }
                Err(e) => return Err(e),
            }
        }

        Err(AppError::conflict(format!(
            "Could not allocate a version for document {} after {} attempts",
            document.id, self.max_allocation_retries
        )))
    }
}
