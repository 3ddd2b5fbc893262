//! Versioned document storage: validation, allocation, pointer management
//! and the engine that composes them.

pub mod allocator;
pub mod download;
pub mod engine;
pub mod history;
pub mod pointer;
pub mod upload;
pub mod validation;

pub use allocator::{DocumentLock, VersionAllocator};
pub use engine::{DocumentDetails, DownloadTarget, IngestRequest, StorageEngine};
pub use pointer::PointerManager;
pub use validation::{UploadPolicy, ValidatedName};
