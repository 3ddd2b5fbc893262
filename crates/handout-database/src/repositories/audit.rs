//! Audit record repository implementation.

use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use handout_core::error::{AppError, ErrorKind};
use handout_core::result::AppResult;
use handout_entity::audit::{AuditRecord, NewAuditRecord};

/// Repository for the append-only audit trail.
#[derive(Debug, Clone)]
pub struct AuditRepository {
    pool: PgPool,
}

impl AuditRepository {
    /// Create a new audit repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Records for a document, newest first.
    pub async fn find_by_document(&self, document_id: Uuid, limit: i64) -> AppResult<Vec<AuditRecord>> {
        sqlx::query_as::<_, AuditRecord>(
            "SELECT * FROM audit_records WHERE document_id = $1 \
             ORDER BY created_at DESC, id DESC LIMIT $2",
        )
        .bind(document_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list audit records", e))
    }

    /// Append a record outside any transaction.
    pub async fn create(&self, data: &NewAuditRecord) -> AppResult<AuditRecord> {
        let mut conn = self.pool.acquire().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to acquire connection", e)
        })?;
        Self::insert(&mut conn, data).await
    }

    /// Append a record on the given connection.
    pub async fn insert(conn: &mut PgConnection, data: &NewAuditRecord) -> AppResult<AuditRecord> {
        sqlx::query_as::<_, AuditRecord>(
            "INSERT INTO audit_records (id, document_id, version_id, action, actor_id, origin, detail) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING *",
        )
        .bind(Uuid::now_v7())
        .bind(data.document_id)
        .bind(data.version_id)
        .bind(data.action)
        .bind(data.actor_id)
        .bind(&data.origin)
        .bind(&data.detail)
        .fetch_one(conn)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to append audit record", e))
    }
}
