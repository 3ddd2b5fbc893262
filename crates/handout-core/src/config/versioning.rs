//! Version allocation configuration.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Controls how lost version-number races are retried.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct VersioningConfig {
    /// How many times a lost allocation race is retried before the
    /// conflict is surfaced to the caller.
    #[serde(default = "default_max_allocation_retries")]
    #[validate(range(min = 1, max = 20))]
    pub max_allocation_retries: u32,
}

impl Default for VersioningConfig {
    fn default() -> Self {
        Self {
            max_allocation_retries: default_max_allocation_retries(),
        }
    }
}

fn default_max_allocation_retries() -> u32 {
    5
}
