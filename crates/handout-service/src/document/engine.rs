//! The storage engine and the types crossing its boundary.

use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use handout_core::config::{StorageConfig, VersioningConfig};
use handout_core::error::AppError;
use handout_core::result::AppResult;
use handout_core::traits::StorageProvider;
use handout_database::store::RecordStore;
use handout_entity::document::Document;
use handout_entity::version::DocumentVersion;

use crate::audit::AuditService;
use crate::context::RequestContext;

use super::allocator::VersionAllocator;
use super::pointer::PointerManager;
use super::validation::UploadPolicy;

/// Metadata accompanying an uploaded byte stream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestRequest {
    /// Existing document to add a version to. When absent the document is
    /// found or created by `(caller, title)`.
    pub document_id: Option<Uuid>,
    /// Document title.
    pub title: String,
    /// Description used if the document is created.
    pub description: Option<String>,
    /// Filename as declared by the client.
    pub filename: String,
    /// Content type as declared by the client.
    pub content_type: String,
    /// What changed in this version.
    pub changelog: Option<String>,
}

/// Everything the transport layer needs to stream a version back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DownloadTarget {
    /// Canonical location on disk, inside the storage root.
    pub absolute_path: PathBuf,
    /// Declared content type of the version.
    pub content_type: String,
    /// Filename as declared at upload; escaping it for headers is up to the transport.
    pub filename: String,
    /// Lower-case hex SHA-256 recorded for the version.
    pub checksum_sha256: String,
    /// Recorded size in bytes.
    pub size_bytes: i64,
}

/// A document with its versions, newest first.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentDetails {
    /// The document.
    pub document: Document,
    /// All versions, newest first.
    pub versions: Vec<DocumentVersion>,
}

/// Ingests, resolves and restores document versions.
///
/// Cheap to clone; every clone shares the same stores and per-document
/// locks.
#[derive(Clone)]
pub struct StorageEngine {
    pub(crate) store: Arc<dyn RecordStore>,
    pub(crate) storage: Arc<dyn StorageProvider>,
    pub(crate) policy: UploadPolicy,
    pub(crate) allocator: VersionAllocator,
    pub(crate) pointer: PointerManager,
    pub(crate) audit: AuditService,
    pub(crate) max_allocation_retries: u32,
}

impl std::fmt::Debug for StorageEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageEngine")
            .field("store", &self.store.backend())
            .field("storage", &self.storage.provider_type())
            .field("max_allocation_retries", &self.max_allocation_retries)
            .finish()
    }
}

impl StorageEngine {
    /// Creates a new engine.
    pub fn new(
        storage_config: StorageConfig,
        versioning: &VersioningConfig,
        store: Arc<dyn RecordStore>,
        storage: Arc<dyn StorageProvider>,
    ) -> Self {
        Self {
            policy: UploadPolicy::new(storage_config),
            allocator: VersionAllocator::new(Arc::clone(&store)),
            pointer: PointerManager::new(Arc::clone(&store)),
            audit: AuditService::new(Arc::clone(&store)),
            max_allocation_retries: versioning.max_allocation_retries.max(1),
            store,
            storage,
        }
    }

    /// The audit service backing this engine.
    pub fn audit(&self) -> &AuditService {
        &self.audit
    }

    /// Whether both the record store and the storage provider are healthy.
    pub async fn health_check(&self) -> AppResult<bool> {
        Ok(self.store.health_check().await? && self.storage.health_check().await?)
    }

    /// Load a document, `NotFound` if absent.
    pub(crate) async fn load_document(&self, document_id: Uuid) -> AppResult<Document> {
        self.store
            .find_document(document_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Document {document_id} not found")))
    }

    /// Load a document the caller owns or administers.
    pub(crate) async fn load_authorized(
        &self,
        ctx: &RequestContext,
        document_id: Uuid,
    ) -> AppResult<Document> {
        let document = self.load_document(document_id).await?;
        authorize(ctx, &document)?;
        Ok(document)
    }

    /// Load a version, `NotFound` if absent.
    pub(crate) async fn load_version(&self, version_id: Uuid) -> AppResult<DocumentVersion> {
        self.store
            .find_version(version_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Version {version_id} not found")))
    }

    /// Build the download target for a version after re-checking its path.
    pub(crate) async fn target_for(&self, version: &DocumentVersion) -> AppResult<DownloadTarget> {
        let absolute_path = self.storage.resolve(&version.storage_path).await?;
        Ok(DownloadTarget {
            absolute_path,
            content_type: version.content_type.clone(),
            filename: version.filename.clone(),
            checksum_sha256: version.checksum_sha256.clone(),
            size_bytes: version.size_bytes,
        })
    }
}

/// Owner or admin, else `Forbidden`.
pub(crate) fn authorize(ctx: &RequestContext, document: &Document) -> AppResult<()> {
    if document.is_accessible_by(ctx.user_id, ctx.is_admin) {
        Ok(())
    } else {
        Err(AppError::forbidden("Not authorized for this document"))
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use handout_core::error::ErrorKind;

    #[test]
    fn test_authorize_owner_admin_stranger() {
        let owner = Uuid::new_v4();
        let document = Document {
            id: Uuid::new_v4(),
            title: "Syllabus".into(),
            description: None,
            owner_id: owner,
            created_at: Utc::now(),
            current_version_id: None,
        };

        assert!(authorize(&RequestContext::new(owner, None), &document).is_ok());
        assert!(authorize(&RequestContext::admin(Uuid::new_v4(), None), &document).is_ok());
        let err = authorize(&RequestContext::new(Uuid::new_v4(), None), &document).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Forbidden);
    }
}
