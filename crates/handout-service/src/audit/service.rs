//! Audit service: appends and lists audit records.

use std::sync::Arc;

use tracing::debug;
use uuid::Uuid;

use handout_core::result::AppResult;
use handout_database::store::RecordStore;
use handout_entity::audit::{AuditAction, AuditRecord, NewAuditRecord};

use crate::context::RequestContext;

/// Writes and reads the audit trail.
///
/// Records that must commit together with a version or pointer change are
/// handed to the record store alongside that change instead of going
/// through [`AuditService::record`].
#[derive(Clone)]
pub struct AuditService {
    store: Arc<dyn RecordStore>,
}

impl std::fmt::Debug for AuditService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuditService")
            .field("backend", &self.store.backend())
            .finish()
    }
}

impl AuditService {
    /// Creates a new audit service.
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// Append one record.
    pub async fn record(&self, entry: NewAuditRecord) -> AppResult<AuditRecord> {
        let record = self.store.append_audit(entry).await?;
        debug!(
            action = %record.action,
            document_id = ?record.document_id,
            version_id = ?record.version_id,
            "Audit record appended"
        );
        Ok(record)
    }

    /// Start a record attributed to the caller of `ctx`.
    pub fn entry_for(
        ctx: &RequestContext,
        action: AuditAction,
        document_id: Uuid,
    ) -> NewAuditRecord {
        NewAuditRecord::new(action)
            .document(document_id)
            .actor(Some(ctx.user_id))
            .origin(ctx.origin.clone())
    }

    /// Records for a document, newest first.
    pub async fn trail(&self, document_id: Uuid, limit: usize) -> AppResult<Vec<AuditRecord>> {
        self.store.list_audit(document_id, limit).await
    }
}

#[cfg(test)]
mod tests {
    use handout_database::store::MemoryRecordStore;

    use super::*;

    #[test]
    fn test_entry_for_carries_actor_and_origin() {
        let ctx = RequestContext::new(Uuid::new_v4(), Some("10.0.0.7".into()));
        let doc = Uuid::new_v4();
        let entry = AuditService::entry_for(&ctx, AuditAction::Download, doc);
        assert_eq!(entry.document_id, Some(doc));
        assert_eq!(entry.actor_id, Some(ctx.user_id));
        assert_eq!(entry.origin.as_deref(), Some("10.0.0.7"));
        assert_eq!(entry.version_id, None);
    }

    #[tokio::test]
    async fn test_trail_is_scoped_to_document() {
        let audit = AuditService::new(Arc::new(MemoryRecordStore::new()));
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        audit.record(NewAuditRecord::new(AuditAction::Delete).document(a)).await.unwrap();
        audit.record(NewAuditRecord::new(AuditAction::Delete).document(b)).await.unwrap();
        audit.record(NewAuditRecord::new(AuditAction::ShareCreated).document(a)).await.unwrap();

        let trail = audit.trail(a, 10).await.unwrap();
        let actions: Vec<_> = trail.iter().map(|r| r.action).collect();
        assert_eq!(actions, vec![AuditAction::ShareCreated, AuditAction::Delete]);
    }
}
