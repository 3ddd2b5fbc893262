//! Document version repository implementation.

use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use handout_core::error::{AppError, ErrorKind};
use handout_core::result::AppResult;
use handout_entity::version::{DocumentVersion, NewVersion};

use super::map_write_error;

/// Repository for immutable document versions.
#[derive(Debug, Clone)]
pub struct VersionRepository {
    pool: PgPool,
}

impl VersionRepository {
    /// Create a new version repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a version by ID.
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<DocumentVersion>> {
        sqlx::query_as::<_, DocumentVersion>("SELECT * FROM document_versions WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find version", e))
    }

    /// All versions of a document, newest first.
    pub async fn find_by_document(&self, document_id: Uuid) -> AppResult<Vec<DocumentVersion>> {
        sqlx::query_as::<_, DocumentVersion>(
            "SELECT * FROM document_versions WHERE document_id = $1 ORDER BY version_number DESC",
        )
        .bind(document_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list versions", e))
    }

    /// Highest version number of a document, `None` if it has none.
    pub async fn max_version_number(&self, document_id: Uuid) -> AppResult<Option<i32>> {
        sqlx::query_scalar::<_, Option<i32>>(
            "SELECT MAX(version_number) FROM document_versions WHERE document_id = $1",
        )
        .bind(document_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to read version numbers", e))
    }

    /// Insert a version row. A duplicate `(document_id, version_number)` or
    /// storage path surfaces as `Conflict`.
    pub async fn insert(conn: &mut PgConnection, data: &NewVersion) -> AppResult<DocumentVersion> {
        sqlx::query_as::<_, DocumentVersion>(
            "INSERT INTO document_versions (id, document_id, version_number, storage_path, filename, \
             content_type, checksum_sha256, size_bytes, uploaded_by, changelog) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) RETURNING *",
        )
        .bind(data.id)
        .bind(data.document_id)
        .bind(data.version_number)
        .bind(&data.storage_path)
        .bind(&data.filename)
        .bind(&data.content_type)
        .bind(&data.checksum_sha256)
        .bind(data.size_bytes)
        .bind(data.uploaded_by)
        .bind(&data.changelog)
        .fetch_one(conn)
        .await
        .map_err(|e| map_write_error("Failed to insert version", e))
    }

    /// Find a version by ID inside a transaction.
    pub async fn find_in(conn: &mut PgConnection, id: Uuid) -> AppResult<Option<DocumentVersion>> {
        sqlx::query_as::<_, DocumentVersion>("SELECT * FROM document_versions WHERE id = $1")
            .bind(id)
            .fetch_optional(conn)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find version", e))
    }
}
