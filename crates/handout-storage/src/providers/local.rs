//! Local filesystem storage provider.
//!
//! Uploads are written to `{root}/.staging/{uuid}.part` first and only
//! hard-linked to their version path once fully received. The link fails
//! if the target exists, so a stored version is never overwritten.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use futures::StreamExt;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};
use uuid::Uuid;

use handout_core::error::AppError;
use handout_core::result::AppResult;
use handout_core::traits::storage::{ByteStream, PlacedObject, StagedObject, StorageProvider};

use crate::checksum::HashingStream;
use crate::path::{join_within, resolve_within};

const STAGING_DIR: &str = ".staging";

/// Local filesystem storage provider.
#[derive(Debug, Clone)]
pub struct LocalStorageProvider {
    /// Canonical root directory for all stored files.
    root: PathBuf,
    /// Directory holding partially received uploads.
    staging: PathBuf,
}

impl LocalStorageProvider {
    /// Create a provider rooted at `root_path`, creating the directory
    /// (and its staging area) if needed.
    pub async fn new(root_path: &str) -> AppResult<Self> {
        fs::create_dir_all(root_path)
            .await
            .map_err(|e| AppError::io("Failed to create storage root", e))?;
        let root = fs::canonicalize(root_path)
            .await
            .map_err(|e| AppError::io("Failed to resolve storage root", e))?;

        let staging = root.join(STAGING_DIR);
        fs::create_dir_all(&staging)
            .await
            .map_err(|e| AppError::io("Failed to create staging directory", e))?;

        debug!(root = %root.display(), "Local storage ready");
        Ok(Self { root, staging })
    }

    /// Canonical storage root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Ensure the parent directory of a path exists.
    async fn ensure_parent(&self, path: &Path) -> AppResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| AppError::io("Failed to create version directory", e))?;
        }
        Ok(())
    }
}

/// Removes a staging file unless disarmed. Covers both errors and the
/// future being dropped mid-write.
struct StagingGuard {
    path: Option<PathBuf>,
}

impl StagingGuard {
    fn disarm(mut self) -> PathBuf {
        self.path.take().unwrap_or_default()
    }
}

impl Drop for StagingGuard {
    fn drop(&mut self) {
        if let Some(path) = self.path.take() {
            remove_quietly(&path);
        }
    }
}

fn remove_quietly(path: &Path) {
    match std::fs::remove_file(path) {
        Ok(()) => debug!(path = %path.display(), "Removed uncommitted file"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!(path = %path.display(), error = %e, "Failed to remove uncommitted file"),
    }
}

#[async_trait]
impl StorageProvider for LocalStorageProvider {
    fn provider_type(&self) -> &str {
        "local"
    }

    async fn health_check(&self) -> AppResult<bool> {
        match fs::metadata(&self.staging).await {
            Ok(meta) => Ok(meta.is_dir()),
            Err(_) => Ok(false),
        }
    }

    async fn stage(&self, stream: ByteStream, max_bytes: u64) -> AppResult<StagedObject> {
        let key = format!("{}.part", Uuid::new_v4());
        let staging_path = self.staging.join(&key);
        let guard = StagingGuard {
            path: Some(staging_path.clone()),
        };

        let mut file = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&staging_path)
            .await
            .map_err(|e| AppError::io("Failed to create staging file", e))?;

        let mut hashing = HashingStream::with_limit(stream, max_bytes);
        while let Some(chunk) = hashing.next().await {
            let chunk = chunk?;
            file.write_all(&chunk)
                .await
                .map_err(|e| AppError::io("Failed to write upload chunk", e))?;
        }

        file.flush()
            .await
            .map_err(|e| AppError::io("Failed to flush staging file", e))?;
        file.sync_all()
            .await
            .map_err(|e| AppError::io("Failed to sync staging file", e))?;
        drop(file);

        let checksum = hashing.finalize();
        let staged_path = guard.disarm();
        debug!(
            key = %key,
            bytes = checksum.size_bytes,
            sha256 = %checksum.sha256,
            "Staged upload"
        );

        Ok(StagedObject::new(
            key,
            checksum.size_bytes,
            checksum.sha256,
            move || remove_quietly(&staged_path),
        ))
    }

    async fn place(&self, staged: &StagedObject, path: &str) -> AppResult<PlacedObject> {
        let target = join_within(&self.root, path)?;
        if target.starts_with(&self.staging) {
            return Err(AppError::path_traversal());
        }
        self.ensure_parent(&target).await?;

        let source = self.staging.join(&staged.key);
        fs::hard_link(&source, &target).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::AlreadyExists {
                AppError::conflict(format!("A stored object already exists at {path}"))
            } else {
                AppError::io("Failed to place staged upload", e)
            }
        })?;

        debug!(path, key = %staged.key, "Placed staged upload");
        Ok(PlacedObject::new(path, move || remove_quietly(&target)))
    }

    async fn resolve(&self, path: &str) -> AppResult<PathBuf> {
        resolve_within(&self.root, path).await
    }
}
