//! Audit trail entities.

pub mod action;
pub mod model;

pub use action::AuditAction;
pub use model::{AuditRecord, NewAuditRecord};
