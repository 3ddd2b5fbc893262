//! Unified application error types for Handout Vault.
//!
//! All crates map their internal errors into [`AppError`] for consistent
//! propagation through the ? operator. Every error carries an [`ErrorKind`]
//! the transport layer can map onto a response, and optionally the name of
//! the offending input field.

use std::fmt;
use thiserror::Error;

/// Top-level error kind categorization used across the entire application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ErrorKind {
    /// The filename is empty once sanitized.
    InvalidFilename,
    /// The filename extension is not in the allow-list.
    UnsupportedExtension,
    /// The payload exceeded the configured size ceiling.
    PayloadTooLarge,
    /// A stored path resolves outside the storage root.
    PathTraversal,
    /// The requested document or version does not exist.
    NotFound,
    /// The version record exists but its file is missing from storage.
    NotFoundOnDisk,
    /// The caller is neither the owner nor an admin.
    Forbidden,
    /// A version was referenced through a document it does not belong to.
    VersionMismatch,
    /// A version number race was lost. Retryable.
    Conflict,
    /// An underlying storage I/O error occurred.
    Io,
    /// Other input validation failed.
    Validation,
    /// A database error occurred.
    Database,
    /// A configuration error occurred.
    Configuration,
    /// A serialization/deserialization error occurred.
    Serialization,
    /// An internal error occurred.
    Internal,
}

impl ErrorKind {
    /// Whether an operation failing with this kind may succeed when retried.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Conflict)
    }

    /// Return the kind as an upper-snake-case code.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidFilename => "INVALID_FILENAME",
            Self::UnsupportedExtension => "UNSUPPORTED_EXTENSION",
            Self::PayloadTooLarge => "PAYLOAD_TOO_LARGE",
            Self::PathTraversal => "PATH_TRAVERSAL",
            Self::NotFound => "NOT_FOUND",
            Self::NotFoundOnDisk => "NOT_FOUND_ON_DISK",
            Self::Forbidden => "FORBIDDEN",
            Self::VersionMismatch => "VERSION_MISMATCH",
            Self::Conflict => "CONFLICT",
            Self::Io => "IO_FAILURE",
            Self::Validation => "VALIDATION",
            Self::Database => "DATABASE",
            Self::Configuration => "CONFIGURATION",
            Self::Serialization => "SERIALIZATION",
            Self::Internal => "INTERNAL",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The unified application error used throughout Handout Vault.
///
/// Messages are safe to show to the caller: they never contain absolute
/// filesystem paths. The underlying cause is kept in `source` for logs.
#[derive(Debug, Error)]
#[error("{kind}: {message}")]
pub struct AppError {
    /// The category of error.
    pub kind: ErrorKind,
    /// A human-readable error message.
    pub message: String,
    /// The input field the error refers to, if any.
    pub field: Option<&'static str>,
    /// Optional underlying cause.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new application error.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            field: None,
            source: None,
        }
    }

    /// Create a new application error with an underlying cause.
    pub fn with_source(
        kind: ErrorKind,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            field: None,
            source: Some(Box::new(source)),
        }
    }

    /// Attach the name of the offending input field.
    pub fn on_field(mut self, field: &'static str) -> Self {
        self.field = Some(field);
        self
    }

    /// Whether retrying the failed operation may succeed.
    pub fn is_retryable(&self) -> bool {
        self.kind.is_retryable()
    }

    /// Create an invalid-filename error.
    pub fn invalid_filename(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidFilename, message).on_field("filename")
    }

    /// Create an unsupported-extension error.
    pub fn unsupported_extension(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::UnsupportedExtension, message).on_field("filename")
    }

    /// Create a payload-too-large error.
    pub fn payload_too_large(max_bytes: u64) -> Self {
        Self::new(
            ErrorKind::PayloadTooLarge,
            format!("Payload exceeds maximum upload size of {max_bytes} bytes"),
        )
        .on_field("size")
    }

    /// Create a path-traversal error.
    pub fn path_traversal() -> Self {
        Self::new(
            ErrorKind::PathTraversal,
            "Stored path resolves outside the storage root",
        )
        .on_field("storage_path")
    }

    /// Create a not-found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    /// Create a not-found-on-disk error.
    pub fn not_found_on_disk(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFoundOnDisk, message)
    }

    /// Create a forbidden error.
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Forbidden, message)
    }

    /// Create a version-mismatch error.
    pub fn version_mismatch(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::VersionMismatch, message).on_field("version_id")
    }

    /// Create a conflict error.
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Conflict, message)
    }

    /// Create an I/O failure.
    pub fn io(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::with_source(ErrorKind::Io, message, source)
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    /// Create a database error.
    pub fn database(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Database, message)
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration, message)
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }
}

impl Clone for AppError {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            message: self.message.clone(),
            field: self.field,
            source: None,
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::with_source(
            ErrorKind::Serialization,
            format!("JSON serialization error: {err}"),
            err,
        )
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::with_source(ErrorKind::Io, "Storage I/O failure", err)
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::with_source(
            ErrorKind::Configuration,
            format!("Configuration error: {err}"),
            err,
        )
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        Self::with_source(
            ErrorKind::Configuration,
            format!("Invalid configuration: {err}"),
            err,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_conflict_is_retryable() {
        assert!(AppError::conflict("lost race").is_retryable());
        assert!(!AppError::payload_too_large(10).is_retryable());
        assert!(!AppError::forbidden("no").is_retryable());
    }

    #[test]
    fn test_io_error_hides_path() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "/srv/secret/path failed");
        let err = AppError::from(io);
        assert_eq!(err.kind, ErrorKind::Io);
        assert!(!err.to_string().contains("/srv/secret"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_field_is_attached() {
        let err = AppError::unsupported_extension("Extension '.exe' is not allowed");
        assert_eq!(err.field, Some("filename"));
        assert_eq!(err.to_string(), "UNSUPPORTED_EXTENSION: Extension '.exe' is not allowed");
    }

    #[test]
    fn test_clone_drops_source() {
        let err = AppError::io(
            "write failed",
            std::io::Error::new(std::io::ErrorKind::Other, "disk"),
        );
        let cloned = err.clone();
        assert_eq!(cloned.kind, ErrorKind::Io);
        assert!(cloned.source.is_none());
    }
}
