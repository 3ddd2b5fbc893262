//! Upload validation gate.
//!
//! Filename and extension are checked before any byte is read. The size
//! ceiling is enforced while streaming, see [`UploadPolicy::max_bytes`].
//! The declared content type is advisory only.

use tracing::warn;

use handout_core::config::StorageConfig;
use handout_core::error::AppError;
use handout_core::result::AppResult;
use handout_storage::path::{extension_of, is_usable_filename, sanitize_filename};

/// A declared filename that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedName {
    /// Sanitized name used on disk and in the version record.
    pub safe_name: String,
    /// Lower-cased extension including the dot.
    pub extension: String,
}

/// Allow-lists and ceiling applied to every upload.
#[derive(Debug, Clone)]
pub struct UploadPolicy {
    config: StorageConfig,
}

impl UploadPolicy {
    /// Build the policy from storage configuration.
    pub fn new(config: StorageConfig) -> Self {
        Self { config }
    }

    /// Maximum accepted payload in bytes.
    pub fn max_bytes(&self) -> u64 {
        self.config.max_upload_size_bytes
    }

    /// Sanitize `filename` and check it against the extension allow-list.
    pub fn check_filename(&self, filename: &str) -> AppResult<ValidatedName> {
        let safe_name = sanitize_filename(filename);
        if !is_usable_filename(&safe_name) {
            return Err(AppError::invalid_filename("Filename is empty after sanitization"));
        }

        let extension = extension_of(&safe_name)
            .ok_or_else(|| AppError::unsupported_extension("Filename has no extension"))?;
        if !self.config.allows_extension(&extension) {
            return Err(AppError::unsupported_extension(format!(
                "Extension {extension} is not allowed"
            )));
        }

        Ok(ValidatedName {
            safe_name,
            extension,
        })
    }

    /// Log a warning when the declared content type is not one we expect.
    /// Never rejects.
    pub fn check_content_type(&self, content_type: &str, name: &ValidatedName) -> bool {
        let expected = self.config.expects_content_type(content_type);
        if !expected {
            warn!(
                content_type,
                extension = %name.extension,
                "Declared content type is not in the allow-list; accepting on extension"
            );
        }
        expected
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use handout_core::error::ErrorKind;

    fn policy() -> UploadPolicy {
        UploadPolicy::new(StorageConfig::default())
    }

    #[test]
    fn test_accepts_allowed_extension_any_case() {
        let name = policy().check_filename("Lecture 3.PDF").unwrap();
        assert_eq!(name.safe_name, "Lecture_3.PDF");
        assert_eq!(name.extension, ".pdf");
    }

    #[test]
    fn test_rejects_empty_and_dot_names() {
        for bad in ["", "uploads/", "..", "a/b/."] {
            let err = policy().check_filename(bad).unwrap_err();
            assert_eq!(err.kind, ErrorKind::InvalidFilename, "{bad}");
            assert_eq!(err.field, Some("filename"));
        }
    }

    #[test]
    fn test_rejects_executables_and_missing_extension() {
        for bad in ["setup.exe", "README", "notes.pdf.sh"] {
            let err = policy().check_filename(bad).unwrap_err();
            assert_eq!(err.kind, ErrorKind::UnsupportedExtension, "{bad}");
        }
    }

    #[test]
    fn test_traversal_name_is_flattened() {
        let name = policy().check_filename("../../etc/passwd.pdf").unwrap();
        assert_eq!(name.safe_name, "passwd.pdf");
    }

    #[test]
    fn test_content_type_is_advisory() {
        let policy = policy();
        let name = policy.check_filename("a.pdf").unwrap();
        assert!(policy.check_content_type("application/pdf", &name));
        assert!(!policy.check_content_type("application/x-msdownload", &name));
    }

    #[test]
    fn test_max_bytes_defaults_to_twenty_mib() {
        assert_eq!(policy().max_bytes(), 20 * 1024 * 1024);
    }
}
