//! # handout-service
//!
//! The versioned handout storage engine. [`StorageEngine`] ingests byte
//! streams as immutable document versions, resolves versions for download,
//! restores earlier versions and records every action in the audit trail.
//!
//! Services follow constructor injection: the record store and storage
//! provider are handed in as `Arc`s.

pub mod audit;
pub mod context;
pub mod document;

pub use audit::AuditService;
pub use context::RequestContext;
pub use document::{DocumentDetails, DownloadTarget, IngestRequest, StorageEngine};
