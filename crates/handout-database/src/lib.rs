//! # handout-database
//!
//! PostgreSQL connection management, repositories for documents, versions
//! and audit records, and the [`RecordStore`] seam the engine persists
//! through.

pub mod connection;
pub mod migration;
pub mod repositories;
pub mod store;

pub use connection::DatabasePool;
pub use store::{MemoryRecordStore, PgRecordStore, RecordStore};
