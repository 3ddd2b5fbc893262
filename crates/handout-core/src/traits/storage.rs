//! Storage provider trait for version content backends.

use std::fmt;
use std::path::PathBuf;
use std::pin::Pin;

use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;

use crate::result::AppResult;

/// A byte stream type used for reading and writing file contents.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, std::io::Error>> + Send>>;

type Cleanup = Box<dyn FnOnce() + Send + Sync>;

/// Bytes that were fully received into a staging area but are not yet
/// visible at any version path.
///
/// Dropping a `StagedObject` discards the staged bytes, so an upload that
/// fails or is cancelled leaves nothing behind.
pub struct StagedObject {
    /// Provider-internal key of the staged bytes.
    pub key: String,
    /// Number of bytes received.
    pub size_bytes: u64,
    /// Lower-case hex SHA-256 of the received bytes.
    pub checksum_sha256: String,
    discard: Option<Cleanup>,
}

impl StagedObject {
    /// Create a staged object whose bytes are removed by `discard` on drop.
    pub fn new(
        key: impl Into<String>,
        size_bytes: u64,
        checksum_sha256: impl Into<String>,
        discard: impl FnOnce() + Send + Sync + 'static,
    ) -> Self {
        Self {
            key: key.into(),
            size_bytes,
            checksum_sha256: checksum_sha256.into(),
            discard: Some(Box::new(discard)),
        }
    }
}

impl Drop for StagedObject {
    fn drop(&mut self) {
        if let Some(discard) = self.discard.take() {
            discard();
        }
    }
}

impl fmt::Debug for StagedObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StagedObject")
            .field("key", &self.key)
            .field("size_bytes", &self.size_bytes)
            .field("checksum_sha256", &self.checksum_sha256)
            .finish()
    }
}

/// Staged bytes that now exist at their final version path but are not
/// yet referenced by a committed version record.
///
/// Dropping a `PlacedObject` without calling [`PlacedObject::keep`]
/// removes the file again.
pub struct PlacedObject {
    /// Path relative to the storage root.
    pub path: String,
    rollback: Option<Cleanup>,
}

impl PlacedObject {
    /// Create a placed object whose file is removed by `rollback` on drop.
    pub fn new(path: impl Into<String>, rollback: impl FnOnce() + Send + Sync + 'static) -> Self {
        Self {
            path: path.into(),
            rollback: Some(Box::new(rollback)),
        }
    }

    /// Keep the file permanently. Called once the version record commits.
    pub fn keep(mut self) -> String {
        self.rollback = None;
        std::mem::take(&mut self.path)
    }
}

impl Drop for PlacedObject {
    fn drop(&mut self) {
        if let Some(rollback) = self.rollback.take() {
            rollback();
        }
    }
}

impl fmt::Debug for PlacedObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlacedObject")
            .field("path", &self.path)
            .field("armed", &self.rollback.is_some())
            .finish()
    }
}

/// Trait for version content backends.
///
/// Writes go through two phases: [`stage`](StorageProvider::stage) receives
/// and hashes the bytes under a temporary key, then
/// [`place`](StorageProvider::place) makes them visible at the final
/// version path without ever overwriting an existing object.
#[async_trait]
pub trait StorageProvider: Send + Sync + fmt::Debug + 'static {
    /// Return the provider type name (e.g., "local").
    fn provider_type(&self) -> &str;

    /// Check whether the provider is healthy and reachable.
    async fn health_check(&self) -> AppResult<bool>;

    /// Receive a byte stream into the staging area, hashing and counting
    /// every chunk. Fails with `PayloadTooLarge` as soon as more than
    /// `max_bytes` have arrived.
    async fn stage(&self, stream: ByteStream, max_bytes: u64) -> AppResult<StagedObject>;

    /// Make staged bytes visible at `path`. Fails with `Conflict` if an
    /// object already exists there.
    async fn place(&self, staged: &StagedObject, path: &str) -> AppResult<PlacedObject>;

    /// Resolve a stored relative path to an absolute location, rejecting
    /// anything outside the storage root.
    async fn resolve(&self, path: &str) -> AppResult<PathBuf>;
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    use super::*;

    #[test]
    fn test_staged_object_discards_on_drop() {
        let discarded = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&discarded);
        let staged = StagedObject::new("k", 3, "abc", move || flag.store(true, Ordering::SeqCst));
        drop(staged);
        assert!(discarded.load(Ordering::SeqCst));
    }

    #[test]
    fn test_placed_object_keep_disarms_rollback() {
        let rolled_back = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&rolled_back);
        let placed = PlacedObject::new("a/b", move || flag.store(true, Ordering::SeqCst));
        assert_eq!(placed.keep(), "a/b");
        assert!(!rolled_back.load(Ordering::SeqCst));
    }

    #[test]
    fn test_placed_object_rolls_back_on_drop() {
        let rolled_back = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&rolled_back);
        drop(PlacedObject::new("a/b", move || flag.store(true, Ordering::SeqCst)));
        assert!(rolled_back.load(Ordering::SeqCst));
    }
}
