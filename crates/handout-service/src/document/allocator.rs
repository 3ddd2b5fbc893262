//! Version number allocation.
//!
//! Allocation and pointer updates for one document are serialized by a
//! per-document async mutex. Different documents never contend. The
//! store's `(document_id, version_number)` uniqueness constraint catches
//! writers in other processes; those surface as a retryable `Conflict`.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::debug;
use uuid::Uuid;

use handout_core::result::AppResult;
use handout_database::store::RecordStore;
use handout_entity::audit::NewAuditRecord;
use handout_entity::version::{DocumentVersion, NewVersion};

type LockTable = DashMap<Uuid, Arc<Mutex<()>>>;

/// Exclusive hold on one document's allocation and pointer state.
///
/// The lock entry is dropped from the table once nobody holds or waits
/// for it.
pub struct DocumentLock {
    document_id: Uuid,
    guard: Option<OwnedMutexGuard<()>>,
    table: Arc<LockTable>,
}

impl std::fmt::Debug for DocumentLock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentLock")
            .field("document_id", &self.document_id)
            .finish()
    }
}

impl Drop for DocumentLock {
    fn drop(&mut self) {
        drop(self.guard.take());
        self.table
            .remove_if(&self.document_id, |_, lock| Arc::strong_count(lock) == 1);
    }
}

/// Computes next version numbers and commits version records.
#[derive(Clone)]
pub struct VersionAllocator {
    store: Arc<dyn RecordStore>,
    locks: Arc<LockTable>,
}

impl std::fmt::Debug for VersionAllocator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VersionAllocator")
            .field("held_locks", &self.locks.len())
            .finish()
    }
}

impl VersionAllocator {
    /// Creates a new allocator.
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self {
            store,
            locks: Arc::new(DashMap::new()),
        }
    }

    /// Wait for exclusive access to `document_id`.
    pub async fn lock(&self, document_id: Uuid) -> DocumentLock {
        let mutex = self
            .locks
            .entry(document_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        let guard = mutex.lock_owned().await;
        DocumentLock {
            document_id,
            guard: Some(guard),
            table: Arc::clone(&self.locks),
        }
    }

    /// `1 + max(existing)`, or `1` for a document without versions.
    ///
    /// Only meaningful while the caller holds the document's lock.
    pub async fn next_version_number(&self, document_id: Uuid) -> AppResult<i32> {
        let current = self.store.max_version_number(document_id).await?;
        Ok(current.map_or(1, |n| n + 1))
    }

    /// Persist a version, move the document's pointer to it and append its
    /// audit record in one step.
    pub async fn create_version(
        &self,
        version: NewVersion,
        audit: NewAuditRecord,
    ) -> AppResult<DocumentVersion> {
        let created = self.store.commit_version(version, audit).await?;
        debug!(
            document_id = %created.document_id,
            version = created.version_number,
            "Version allocated"
        );
        Ok(created)
    }

    /// Number of lock entries currently tracked.
    pub fn tracked_locks(&self) -> usize {
        self.locks.len()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use handout_database::store::MemoryRecordStore;

    use super::*;

    fn allocator() -> VersionAllocator {
        VersionAllocator::new(Arc::new(MemoryRecordStore::new()))
    }

    #[tokio::test]
    async fn test_first_version_is_one() {
        let allocator = allocator();
        assert_eq!(allocator.next_version_number(Uuid::new_v4()).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_lock_serializes_same_document() {
        let allocator = allocator();
        let doc = Uuid::new_v4();
        let held = allocator.lock(doc).await;

        let contender = allocator.clone();
        let waiting = tokio::spawn(async move {
            let _lock = contender.lock(doc).await;
        });

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!waiting.is_finished());

        drop(held);
        waiting.await.unwrap();
        assert_eq!(allocator.tracked_locks(), 0);
    }

    #[tokio::test]
    async fn test_different_documents_do_not_contend() {
        let allocator = allocator();
        let _a = allocator.lock(Uuid::new_v4()).await;
        let b = tokio::time::timeout(Duration::from_millis(100), allocator.lock(Uuid::new_v4())).await;
        assert!(b.is_ok());
        assert_eq!(allocator.tracked_locks(), 2);
    }
}
