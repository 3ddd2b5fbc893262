//! Document version entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// One immutable uploaded revision of a document's content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct DocumentVersion {
    /// Unique version identifier.
    pub id: Uuid,
    /// The document this version belongs to.
    pub document_id: Uuid,
    /// Sequential version number, starting at 1.
    pub version_number: i32,
    /// Path to this version's content, relative to the storage root.
    pub storage_path: String,
    /// Filename as declared by the uploader.
    pub filename: String,
    /// Content type as declared by the uploader.
    pub content_type: String,
    /// Lower-case hex SHA-256 of the stored bytes.
    pub checksum_sha256: String,
    /// Size in bytes.
    pub size_bytes: i64,
    /// User who uploaded this version.
    pub uploaded_by: Uuid,
    /// When this version was created.
    pub created_at: DateTime<Utc>,
    /// Optional description of what changed.
    pub changelog: Option<String>,
}

/// Data required to insert a version record.
///
/// The identifier is chosen up front so the audit record committed in the
/// same transaction can reference it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewVersion {
    /// Pre-allocated version identifier.
    pub id: Uuid,
    /// Owning document.
    pub document_id: Uuid,
    /// Allocated version number.
    pub version_number: i32,
    /// Path relative to the storage root.
    pub storage_path: String,
    /// Declared filename.
    pub filename: String,
    /// Declared content type.
    pub content_type: String,
    /// Lower-case hex SHA-256.
    pub checksum_sha256: String,
    /// Size in bytes.
    pub size_bytes: i64,
    /// Uploader.
    pub uploaded_by: Uuid,
    /// Optional changelog text.
    pub changelog: Option<String>,
}

impl NewVersion {
    /// Materialize the row as it will be stored.
    pub fn into_version(self, created_at: DateTime<Utc>) -> DocumentVersion {
        DocumentVersion {
            id: self.id,
            document_id: self.document_id,
            version_number: self.version_number,
            storage_path: self.storage_path,
            filename: self.filename,
            content_type: self.content_type,
            checksum_sha256: self.checksum_sha256,
            size_bytes: self.size_bytes,
            uploaded_by: self.uploaded_by,
            created_at,
            changelog: self.changelog,
        }
    }
}
