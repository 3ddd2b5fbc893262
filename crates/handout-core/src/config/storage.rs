//! Version content storage configuration.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Storage root and upload acceptance policy.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct StorageConfig {
    /// Root directory beneath which every version file must resolve.
    #[serde(default = "default_root_path")]
    #[validate(length(min = 1))]
    pub root_path: String,
    /// Accepted filename extensions, including the leading dot.
    /// Compared case-insensitively.
    #[serde(default = "default_allowed_extensions")]
    #[validate(length(min = 1))]
    pub allowed_extensions: Vec<String>,
    /// Expected declared content types. Advisory only: a mismatch is
    /// logged, never rejected.
    #[serde(default = "default_allowed_content_types")]
    pub allowed_content_types: Vec<String>,
    /// Maximum upload size in bytes (default 20 MiB).
    #[serde(default = "default_max_upload")]
    #[validate(range(min = 1))]
    pub max_upload_size_bytes: u64,
    /// Read buffer size used when streaming stored files (default 1 MiB).
    #[serde(default = "default_chunk_size")]
    #[validate(range(min = 4096, max = 67_108_864))]
    pub chunk_size_bytes: usize,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            root_path: default_root_path(),
            allowed_extensions: default_allowed_extensions(),
            allowed_content_types: default_allowed_content_types(),
            max_upload_size_bytes: default_max_upload(),
            chunk_size_bytes: default_chunk_size(),
        }
    }
}

impl StorageConfig {
    /// Whether `extension` (with leading dot) is in the allow-list.
    pub fn allows_extension(&self, extension: &str) -> bool {
        self.allowed_extensions
            .iter()
            .any(|allowed| allowed.eq_ignore_ascii_case(extension))
    }

    /// Whether the declared content type is one of the expected types.
    /// Parameters such as `; charset=utf-8` are ignored.
    pub fn expects_content_type(&self, content_type: &str) -> bool {
        let essence = content_type.split(';').next().unwrap_or_default().trim();
        self.allowed_content_types
            .iter()
            .any(|allowed| allowed.eq_ignore_ascii_case(essence))
    }
}

fn default_root_path() -> String {
    "./data/storage".to_string()
}

fn default_allowed_extensions() -> Vec<String> {
    [
        ".pdf", ".doc", ".docx", ".ppt", ".pptx", ".txt", ".jpg", ".jpeg", ".png",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_allowed_content_types() -> Vec<String> {
    [
        "application/pdf",
        "application/msword",
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "application/vnd.ms-powerpoint",
        "application/vnd.openxmlformats-officedocument.presentationml.presentation",
        "text/plain",
        "image/jpeg",
        "image/png",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_max_upload() -> u64 {
    20 * 1024 * 1024
}

fn default_chunk_size() -> usize {
    1024 * 1024
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_match_is_case_insensitive() {
        let config = StorageConfig::default();
        assert!(config.allows_extension(".PDF"));
        assert!(config.allows_extension(".docx"));
        assert!(!config.allows_extension(".exe"));
        assert!(!config.allows_extension("pdf"));
    }

    #[test]
    fn test_content_type_ignores_parameters() {
        let config = StorageConfig::default();
        assert!(config.expects_content_type("text/plain; charset=utf-8"));
        assert!(config.expects_content_type("Application/PDF"));
        assert!(!config.expects_content_type("application/x-msdownload"));
    }

    #[test]
    fn test_defaults_validate() {
        assert!(StorageConfig::default().validate().is_ok());

        let bad = StorageConfig {
            allowed_extensions: Vec::new(),
            ..StorageConfig::default()
        };
        assert!(bad.validate().is_err());
    }
}
