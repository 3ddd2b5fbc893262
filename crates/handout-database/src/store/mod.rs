//! Record stores: the persistence seam used by the storage engine.
//!
//! A store owns documents, versions and audit records. Every write that
//! must be observed together (version row, current pointer, audit record)
//! goes through a single method so implementations can commit it
//! atomically.

pub mod memory;
pub mod postgres;

pub use memory::MemoryRecordStore;
pub use postgres::PgRecordStore;

use std::fmt;

use async_trait::async_trait;
use uuid::Uuid;

use handout_core::result::AppResult;
use handout_entity::audit::{AuditRecord, NewAuditRecord};
use handout_entity::document::{CreateDocument, Document};
use handout_entity::version::{DocumentVersion, NewVersion};

/// Persistence operations for documents, versions and audit records.
#[async_trait]
pub trait RecordStore: Send + Sync + fmt::Debug + 'static {
    /// Return the backend name (e.g., "postgres").
    fn backend(&self) -> &str;

    /// Check whether the store is reachable.
    async fn health_check(&self) -> AppResult<bool>;

    /// Find a document by ID.
    async fn find_document(&self, id: Uuid) -> AppResult<Option<Document>>;

    /// Return the document for `(owner_id, title)`, creating it if absent.
    /// Concurrent callers for the same pair observe the same document.
    async fn find_or_create_document(&self, data: CreateDocument) -> AppResult<Document>;

    /// Find a version by ID.
    async fn find_version(&self, id: Uuid) -> AppResult<Option<DocumentVersion>>;

    /// All versions of a document, newest first.
    async fn list_versions(&self, document_id: Uuid) -> AppResult<Vec<DocumentVersion>>;

    /// Highest committed version number, `None` if there is none yet.
    async fn max_version_number(&self, document_id: Uuid) -> AppResult<Option<i32>>;

    /// Atomically insert `version`, point its document at it, and append
    /// `audit`.
    ///
    /// Fails with `NotFound` if the document is missing and `Conflict` if
    /// `(document_id, version_number)` is already taken. Nothing is
    /// written on failure.
    async fn commit_version(
        &self,
        version: NewVersion,
        audit: NewAuditRecord,
    ) -> AppResult<DocumentVersion>;

    /// Atomically point `document_id` at `version_id` and append `audit`.
    ///
    /// Fails with `NotFound` if either is missing and `VersionMismatch` if
    /// the version belongs to a different document. The pointer is left
    /// unchanged on failure.
    async fn set_current_version(
        &self,
        document_id: Uuid,
        version_id: Uuid,
        audit: NewAuditRecord,
    ) -> AppResult<Document>;

    /// Append one audit record.
    async fn append_audit(&self, audit: NewAuditRecord) -> AppResult<AuditRecord>;

    /// Audit records for a document, newest first, at most `limit`.
    async fn list_audit(&self, document_id: Uuid, limit: usize) -> AppResult<Vec<AuditRecord>>;
}
