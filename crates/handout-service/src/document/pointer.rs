//! Current-version pointer updates.

use std::sync::Arc;

use tracing::debug;
use uuid::Uuid;

use handout_core::result::AppResult;
use handout_database::store::RecordStore;
use handout_entity::audit::NewAuditRecord;
use handout_entity::document::Document;

use super::allocator::DocumentLock;

/// Repoints documents at one of their own versions.
#[derive(Clone)]
pub struct PointerManager {
    store: Arc<dyn RecordStore>,
}

impl std::fmt::Debug for PointerManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PointerManager").finish()
    }
}

impl PointerManager {
    /// Creates a new pointer manager.
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// Point `document_id` at `version_id` and append `audit` with it.
    ///
    /// Requires the document's lock so the change cannot interleave with a
    /// concurrent upload. Fails with `VersionMismatch` when the version
    /// belongs elsewhere; the pointer is then untouched.
    pub async fn set_current(
        &self,
        _lock: &DocumentLock,
        document_id: Uuid,
        version_id: Uuid,
        audit: NewAuditRecord,
    ) -> AppResult<Document> {
        let document = self
            .store
            .set_current_version(document_id, version_id, audit)
            .await?;
        debug!(%document_id, %version_id, "Current version updated");
        Ok(document)
    }
}
