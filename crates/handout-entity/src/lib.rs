//! # handout-entity
//!
//! Domain entity models for Handout Vault. Every struct in this crate
//! represents a database table row or the data needed to insert one.
//! All entities derive `Debug`, `Clone`, `Serialize`, `Deserialize`, and
//! row types additionally derive `sqlx::FromRow`.

pub mod audit;
pub mod document;
pub mod version;

pub use audit::{AuditAction, AuditRecord, NewAuditRecord};
pub use document::{CreateDocument, Document};
pub use version::{DocumentVersion, NewVersion};
