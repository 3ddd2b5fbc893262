//! PostgreSQL record store.

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};
use tracing::debug;
use uuid::Uuid;

use handout_core::error::{AppError, ErrorKind};
use handout_core::result::AppResult;
use handout_entity::audit::{AuditRecord, NewAuditRecord};
use handout_entity::document::{CreateDocument, Document};
use handout_entity::version::{DocumentVersion, NewVersion};

use super::RecordStore;
use crate::connection::DatabasePool;
use crate::repositories::{AuditRepository, DocumentRepository, VersionRepository};

/// Record store backed by PostgreSQL.
///
/// Multi-row writes run in one transaction that locks the document row
/// first; the `(document_id, version_number)` unique constraint catches
/// writers in other processes.
#[derive(Debug, Clone)]
pub struct PgRecordStore {
    db: DatabasePool,
    documents: DocumentRepository,
    versions: VersionRepository,
    audit: AuditRepository,
}

impl PgRecordStore {
    /// Create a store over an existing pool.
    pub fn new(db: DatabasePool) -> Self {
        let pool = db.pool().clone();
        Self {
            documents: DocumentRepository::new(pool.clone()),
            versions: VersionRepository::new(pool.clone()),
            audit: AuditRepository::new(pool),
            db,
        }
    }

    fn pool(&self) -> &PgPool {
        self.db.pool()
    }

    async fn begin(&self) -> AppResult<Transaction<'static, Postgres>> {
        self.pool().begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })
    }

    async fn commit(tx: Transaction<'static, Postgres>) -> AppResult<()> {
        tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to commit transaction", e)
        })
    }
}

#[async_trait]
impl RecordStore for PgRecordStore {
    fn backend(&self) -> &str {
        "postgres"
    }

    async fn health_check(&self) -> AppResult<bool> {
        self.db.health_check().await
    }

    async fn find_document(&self, id: Uuid) -> AppResult<Option<Document>> {
        self.documents.find_by_id(id).await
    }

    async fn find_or_create_document(&self, data: CreateDocument) -> AppResult<Document> {
        self.documents.find_or_create(&data).await
    }

    async fn find_version(&self, id: Uuid) -> AppResult<Option<DocumentVersion>> {
        self.versions.find_by_id(id).await
    }

    async fn list_versions(&self, document_id: Uuid) -> AppResult<Vec<DocumentVersion>> {
        self.versions.find_by_document(document_id).await
    }

    async fn max_version_number(&self, document_id: Uuid) -> AppResult<Option<i32>> {
        self.versions.max_version_number(document_id).await
    }

    async fn commit_version(
        &self,
        version: NewVersion,
        audit: NewAuditRecord,
    ) -> AppResult<DocumentVersion> {
        let mut tx = self.begin().await?;

        DocumentRepository::lock(&mut tx, version.document_id)
            .await?
            .ok_or_else(|| {
                AppError::not_found(format!("Document {} not found", version.document_id))
            })?;

        let inserted = VersionRepository::insert(&mut tx, &version).await?;
        DocumentRepository::set_current(&mut tx, inserted.document_id, inserted.id).await?;
        AuditRepository::insert(&mut tx, &audit).await?;
        Self::commit(tx).await?;

        debug!(
            document_id = %inserted.document_id,
            version = inserted.version_number,
            "Committed version"
        );
        Ok(inserted)
    }

    async fn set_current_version(
        &self,
        document_id: Uuid,
        version_id: Uuid,
        audit: NewAuditRecord,
    ) -> AppResult<Document> {
        let mut tx = self.begin().await?;

        DocumentRepository::lock(&mut tx, document_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Document {document_id} not found")))?;

        let version = VersionRepository::find_in(&mut tx, version_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Version {version_id} not found")))?;
        if version.document_id != document_id {
            return Err(AppError::version_mismatch(format!(
                "Version {version_id} does not belong to document {document_id}"
            )));
        }

        let document = DocumentRepository::set_current(&mut tx, document_id, version_id).await?;
        AuditRepository::insert(&mut tx, &audit).await?;
        Self::commit(tx).await?;
        Ok(document)
    }

    async fn append_audit(&self, audit: NewAuditRecord) -> AppResult<AuditRecord> {
        self.audit.create(&audit).await
    }

    async fn list_audit(&self, document_id: Uuid, limit: usize) -> AppResult<Vec<AuditRecord>> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        self.audit.find_by_document(document_id, limit).await
    }
}
