//! Convenience result type alias for Handout Vault.

use crate::error::AppError;

/// A specialized `Result` type for Handout Vault operations.
pub type AppResult<T> = Result<T, AppError>;
