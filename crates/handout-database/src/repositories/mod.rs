//! Repository implementations for handout entities.
//!
//! Reads go through the pooled repository structs. Writes that must commit
//! together take a `&mut PgConnection` so callers can run them inside one
//! transaction.

pub mod audit;
pub mod document;
pub mod version;

pub use audit::AuditRepository;
pub use document::DocumentRepository;
pub use version::VersionRepository;

use handout_core::error::{AppError, ErrorKind};

/// Map a sqlx error, turning unique-constraint violations into `Conflict`.
pub(crate) fn map_write_error(context: &'static str, err: sqlx::Error) -> AppError {
    let unique = matches!(&err, sqlx::Error::Database(db) if db.is_unique_violation());
    if unique {
        AppError::with_source(ErrorKind::Conflict, context, err)
    } else {
        AppError::with_source(ErrorKind::Database, context, err)
    }
}
