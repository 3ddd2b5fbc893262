//! In-process record store.
//!
//! State lives behind one async mutex, so every method is trivially
//! atomic. Suitable for a single node and for tests; nothing survives a
//! restart.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;
use uuid::Uuid;

use handout_core::error::AppError;
use handout_core::result::AppResult;
use handout_entity::audit::{AuditRecord, NewAuditRecord};
use handout_entity::document::{CreateDocument, Document};
use handout_entity::version::{DocumentVersion, NewVersion};

use super::RecordStore;

#[derive(Debug, Default)]
struct MemoryState {
    documents: HashMap<Uuid, Document>,
    versions: HashMap<Uuid, DocumentVersion>,
    /// Append order is chronological order.
    audit: Vec<AuditRecord>,
}

impl MemoryState {
    fn push_audit(&mut self, audit: NewAuditRecord) -> AuditRecord {
        let record = audit.into_record(Uuid::now_v7(), Utc::now());
        self.audit.push(record.clone());
        record
    }
}

/// Record store held entirely in memory.
#[derive(Debug, Default)]
pub struct MemoryRecordStore {
    inner: Mutex<MemoryState>,
}

impl MemoryRecordStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of audit records held, across all documents.
    pub async fn audit_len(&self) -> usize {
        self.inner.lock().await.audit.len()
    }

    /// Total number of versions held, across all documents.
    pub async fn version_len(&self) -> usize {
        self.inner.lock().await.versions.len()
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    fn backend(&self) -> &str {
        "memory"
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(true)
    }

    async fn find_document(&self, id: Uuid) -> AppResult<Option<Document>> {
        Ok(self.inner.lock().await.documents.get(&id).cloned())
    }

    async fn find_or_create_document(&self, data: CreateDocument) -> AppResult<Document> {
        let mut state = self.inner.lock().await;
        if let Some(existing) = state
            .documents
            .values()
            .find(|d| d.owner_id == data.owner_id && d.title == data.title)
        {
            return Ok(existing.clone());
        }

        let document = Document {
            id: Uuid::new_v4(),
            title: data.title,
            description: data.description,
            owner_id: data.owner_id,
            created_at: Utc::now(),
            current_version_id: None,
        };
        state.documents.insert(document.id, document.clone());
        Ok(document)
    }

    async fn find_version(&self, id: Uuid) -> AppResult<Option<DocumentVersion>> {
        Ok(self.inner.lock().await.versions.get(&id).cloned())
    }

    async fn list_versions(&self, document_id: Uuid) -> AppResult<Vec<DocumentVersion>> {
        let state = self.inner.lock().await;
        let mut versions: Vec<_> = state
            .versions
            .values()
            .filter(|v| v.document_id == document_id)
            .cloned()
            .collect();
        versions.sort_by(|a, b| b.version_number.cmp(&a.version_number));
        Ok(versions)
    }

    async fn max_version_number(&self, document_id: Uuid) -> AppResult<Option<i32>> {
        let state = self.inner.lock().await;
        Ok(state
            .versions
            .values()
            .filter(|v| v.document_id == document_id)
            .map(|v| v.version_number)
            .max())
    }

    async fn commit_version(
        &self,
        version: NewVersion,
        audit: NewAuditRecord,
    ) -> AppResult<DocumentVersion> {
        let mut state = self.inner.lock().await;

        if !state.documents.contains_key(&version.document_id) {
            return Err(AppError::not_found(format!(
                "Document {} not found",
                version.document_id
            )));
        }
        let taken = state.versions.values().any(|v| {
            (v.document_id == version.document_id && v.version_number == version.version_number)
                || v.storage_path == version.storage_path
        });
        if taken {
            return Err(AppError::conflict(format!(
                "Version {} of document {} already exists",
                version.version_number, version.document_id
            )));
        }

        let version = version.into_version(Utc::now());
        state.versions.insert(version.id, version.clone());
        if let Some(document) = state.documents.get_mut(&version.document_id) {
            document.current_version_id = Some(version.id);
        }
        state.push_audit(audit);
        Ok(version)
    }

    async fn set_current_version(
        &self,
        document_id: Uuid,
        version_id: Uuid,
        audit: NewAuditRecord,
    ) -> AppResult<Document> {
        let mut state = self.inner.lock().await;

        let version_owner = state
            .versions
            .get(&version_id)
            .map(|v| v.document_id)
            .ok_or_else(|| AppError::not_found(format!("Version {version_id} not found")))?;
        if version_owner != document_id {
            return Err(AppError::version_mismatch(format!(
                "Version {version_id} does not belong to document {document_id}"
            )));
        }

        let document = state
            .documents
            .get_mut(&document_id)
            .ok_or_else(|| AppError::not_found(format!("Document {document_id} not found")))?;
        document.current_version_id = Some(version_id);
        let document = document.clone();

        state.push_audit(audit);
        Ok(document)
    }

    async fn append_audit(&self, audit: NewAuditRecord) -> AppResult<AuditRecord> {
        Ok(self.inner.lock().await.push_audit(audit))
    }

    async fn list_audit(&self, document_id: Uuid, limit: usize) -> AppResult<Vec<AuditRecord>> {
        let state = self.inner.lock().await;
        Ok(state
            .audit
            .iter()
            .rev()
            .filter(|r| r.document_id == Some(document_id))
            .take(limit)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use handout_core::error::ErrorKind;
    use handout_entity::audit::AuditAction;

    fn new_version(document_id: Uuid, number: i32) -> NewVersion {
        NewVersion {
            id: Uuid::new_v4(),
            document_id,
            version_number: number,
            storage_path: format!("o/{document_id}/v{number}/a.pdf"),
            filename: "a.pdf".into(),
            content_type: "application/pdf".into(),
            checksum_sha256: "0".repeat(64),
            size_bytes: 1,
            uploaded_by: Uuid::nil(),
            changelog: None,
        }
    }

    async fn document(store: &MemoryRecordStore, title: &str) -> Document {
        store
            .find_or_create_document(CreateDocument {
                owner_id: Uuid::nil(),
                title: title.into(),
                description: None,
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_find_or_create_is_idempotent_per_owner_and_title() {
        let store = MemoryRecordStore::new();
        let a = document(&store, "Week 1").await;
        let b = document(&store, "Week 1").await;
        let c = document(&store, "Week 2").await;
        assert_eq!(a.id, b.id);
        assert_ne!(a.id, c.id);
    }

    #[tokio::test]
    async fn test_commit_moves_pointer_and_audits() {
        let store = MemoryRecordStore::new();
        let doc = document(&store, "Week 1").await;
        let v1 = new_version(doc.id, 1);
        let v1_id = v1.id;

        let committed = store
            .commit_version(v1, NewAuditRecord::new(AuditAction::Upload).document(doc.id).version(Some(v1_id)))
            .await
            .unwrap();

        let doc = store.find_document(doc.id).await.unwrap().unwrap();
        assert_eq!(doc.current_version_id, Some(committed.id));
        assert_eq!(store.max_version_number(doc.id).await.unwrap(), Some(1));
        assert_eq!(store.list_audit(doc.id, 10).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_number_conflicts_without_side_effects() {
        let store = MemoryRecordStore::new();
        let doc = document(&store, "Week 1").await;
        store
            .commit_version(new_version(doc.id, 1), NewAuditRecord::new(AuditAction::Upload))
            .await
            .unwrap();

        let mut dup = new_version(doc.id, 1);
        dup.storage_path = "other".into();
        let err = store
            .commit_version(dup, NewAuditRecord::new(AuditAction::Upload).document(doc.id))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Conflict);
        assert!(err.is_retryable());
        assert_eq!(store.version_len().await, 1);
        assert_eq!(store.audit_len().await, 1);
    }

    #[tokio::test]
    async fn test_set_current_rejects_foreign_version() {
        let store = MemoryRecordStore::new();
        let a = document(&store, "A").await;
        let b = document(&store, "B").await;
        let va = store
            .commit_version(new_version(a.id, 1), NewAuditRecord::new(AuditAction::Upload))
            .await
            .unwrap();
        let vb = store
            .commit_version(new_version(b.id, 1), NewAuditRecord::new(AuditAction::Upload))
            .await
            .unwrap();

        let err = store
            .set_current_version(a.id, vb.id, NewAuditRecord::new(AuditAction::Restore))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::VersionMismatch);

        let a = store.find_document(a.id).await.unwrap().unwrap();
        assert_eq!(a.current_version_id, Some(va.id));
        assert_eq!(store.audit_len().await, 2);
    }

    #[tokio::test]
    async fn test_versions_and_audit_are_newest_first() {
        let store = MemoryRecordStore::new();
        let doc = document(&store, "Week 1").await;
        for n in 1..=3 {
            store
                .commit_version(
                    new_version(doc.id, n),
                    NewAuditRecord::new(AuditAction::Upload)
                        .document(doc.id)
                        .detail(Some(format!("v{n}"))),
                )
                .await
                .unwrap();
        }

        let numbers: Vec<_> = store
            .list_versions(doc.id)
            .await
            .unwrap()
            .iter()
            .map(|v| v.version_number)
            .collect();
        assert_eq!(numbers, vec![3, 2, 1]);

        let trail = store.list_audit(doc.id, 2).await.unwrap();
        assert_eq!(trail.len(), 2);
        assert_eq!(trail[0].detail.as_deref(), Some("v3"));
    }
}
