//! Shared helpers for engine integration tests.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;

use bytes::Bytes;
use futures::stream;
use tempfile::TempDir;
use uuid::Uuid;

use handout_core::config::{StorageConfig, VersioningConfig};
use handout_core::traits::ByteStream;
use handout_database::store::{MemoryRecordStore, RecordStore};
use handout_service::{IngestRequest, RequestContext, StorageEngine};
use handout_storage::LocalStorageProvider;

/// An engine over a temporary storage root and an in-memory record store.
pub struct TestEngine {
    pub engine: StorageEngine,
    pub store: Arc<MemoryRecordStore>,
    /// Canonical storage root.
    pub root: PathBuf,
    _dir: TempDir,
}

impl TestEngine {
    pub async fn new() -> Self {
        let store = Arc::new(MemoryRecordStore::new());
        Self::with_store(store.clone(), store).await
    }

    /// Build an engine that persists through `records`; `store` is kept
    /// for direct inspection.
    pub async fn with_store(store: Arc<MemoryRecordStore>, records: Arc<dyn RecordStore>) -> Self {
        let dir = tempfile::tempdir().expect("temp dir");
        let config = StorageConfig {
            root_path: dir.path().to_string_lossy().into_owned(),
            chunk_size_bytes: 64 * 1024,
            ..StorageConfig::default()
        };
        let provider = LocalStorageProvider::new(&config.root_path)
            .await
            .expect("storage provider");
        let root = provider.root().to_path_buf();

        let engine = StorageEngine::new(
            config,
            &VersioningConfig::default(),
            records,
            Arc::new(provider),
        );

        Self {
            engine,
            store,
            root,
            _dir: dir,
        }
    }

    /// Upload `content` under `title` as `owner`.
    pub async fn upload(
        &self,
        owner: &RequestContext,
        title: &str,
        filename: &str,
        content: &[u8],
    ) -> handout_core::AppResult<handout_entity::version::DocumentVersion> {
        self.engine
            .ingest_version(owner, request(None, title, filename), body(content.to_vec(), 7))
            .await
    }

    /// Every regular file under the storage root, staging included.
    pub fn files(&self) -> Vec<PathBuf> {
        let mut out = Vec::new();
        walk(&self.root, &mut out);
        out.sort();
        out
    }

    /// Files currently in the staging area.
    pub fn staged_files(&self) -> Vec<PathBuf> {
        let mut out = Vec::new();
        walk(&self.root.join(".staging"), &mut out);
        out
    }
}

fn walk(dir: &Path, out: &mut Vec<PathBuf>) {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            walk(&path, out);
        } else {
            out.push(path);
        }
    }
}

pub fn user() -> RequestContext {
    RequestContext::new(Uuid::new_v4(), Some("192.0.2.10".into()))
}

pub fn request(document_id: Option<Uuid>, title: &str, filename: &str) -> IngestRequest {
    IngestRequest {
        document_id,
        title: title.into(),
        description: None,
        filename: filename.into(),
        content_type: "application/pdf".into(),
        changelog: None,
    }
}

/// `data` delivered in chunks of `chunk` bytes.
pub fn body(data: Vec<u8>, chunk: usize) -> ByteStream {
    let chunks: Vec<_> = data
        .chunks(chunk)
        .map(|c| Ok::<_, std::io::Error>(Bytes::copy_from_slice(c)))
        .collect();
    Box::pin(stream::iter(chunks))
}

/// `mib` MiB of zeros, produced lazily one MiB at a time.
pub fn zeros_mib(mib: usize) -> ByteStream {
    Box::pin(stream::iter(
        (0..mib).map(|_| Ok::<_, std::io::Error>(Bytes::from(vec![0u8; 1024 * 1024]))),
    ))
}
