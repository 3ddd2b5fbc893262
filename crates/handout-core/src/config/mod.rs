//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section.

pub mod database;
pub mod logging;
pub mod storage;
pub mod versioning;

use std::path::Path;

use serde::{Deserialize, Serialize};
use validator::Validate;

pub use self::database::DatabaseConfig;
pub use self::logging::LoggingConfig;
pub use self::storage::StorageConfig;
pub use self::versioning::VersioningConfig;

use crate::error::AppError;

/// Root application configuration.
///
/// This struct is the top-level deserialization target for the merged
/// TOML configuration files (default.toml + environment overlay).
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AppConfig {
    /// Database connection settings.
    pub database: DatabaseConfig,
    /// Version content storage settings.
    #[serde(default)]
    #[validate(nested)]
    pub storage: StorageConfig,
    /// Version allocation settings.
    #[serde(default)]
    #[validate(nested)]
    pub versioning: VersioningConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from `path`, then the optional `{env}.toml`
    /// overlay next to it, then `HANDOUT__*` environment variables.
    ///
    /// The base file must exist; a missing overlay is ignored.
    pub fn load(path: &str, env: Option<&str>) -> Result<Self, AppError> {
        let mut builder = config::Config::builder().add_source(config::File::with_name(path));
        if let Some(env) = env {
            let overlay = Path::new(path).with_file_name(format!("{env}.toml"));
            builder = builder.add_source(config::File::from(overlay).required(false));
        }
        Self::build(builder)
    }

    fn build(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<Self, AppError> {
        let config = builder
            .add_source(
                config::Environment::with_prefix("HANDOUT")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        let parsed: Self = config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))?;

        parsed.validate()?;
        Ok(parsed)
    }
}
