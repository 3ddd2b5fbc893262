//! Document repository implementation.

use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use handout_core::error::{AppError, ErrorKind};
use handout_core::result::AppResult;
use handout_entity::document::{CreateDocument, Document};

/// Repository for documents and their current-version pointer.
#[derive(Debug, Clone)]
pub struct DocumentRepository {
    pool: PgPool,
}

impl DocumentRepository {
    /// Create a new document repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a document by ID.
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Document>> {
        sqlx::query_as::<_, Document>("SELECT * FROM documents WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find document", e))
    }

    /// Return the document for `(owner_id, title)`, creating it if absent.
    ///
    /// Concurrent callers racing on the same pair both end up with the one
    /// row the unique constraint admitted.
    pub async fn find_or_create(&self, data: &CreateDocument) -> AppResult<Document> {
        sqlx::query(
            "INSERT INTO documents (id, title, description, owner_id) VALUES ($1, $2, $3, $4) \
             ON CONFLICT (owner_id, title) DO NOTHING",
        )
        .bind(Uuid::new_v4())
        .bind(&data.title)
        .bind(&data.description)
        .bind(data.owner_id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create document", e))?;

        sqlx::query_as::<_, Document>("SELECT * FROM documents WHERE owner_id = $1 AND title = $2")
            .bind(data.owner_id)
            .bind(&data.title)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to load document", e))?
            .ok_or_else(|| AppError::internal("Document vanished after creation"))
    }

    /// Lock the document row for the rest of the transaction.
    pub async fn lock(conn: &mut PgConnection, id: Uuid) -> AppResult<Option<Document>> {
        sqlx::query_as::<_, Document>("SELECT * FROM documents WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(conn)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to lock document", e))
    }

    /// Point the document at `version_id`. The caller checks ownership of
    /// the version first.
    pub async fn set_current(
        conn: &mut PgConnection,
        id: Uuid,
        version_id: Uuid,
    ) -> AppResult<Document> {
        sqlx::query_as::<_, Document>(
            "UPDATE documents SET current_version_id = $2 WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(version_id)
        .fetch_optional(conn)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to update current version", e))?
        .ok_or_else(|| AppError::not_found(format!("Document {id} not found")))
    }
}
