//! # handout-storage
//!
//! Version content storage for Handout Vault: streaming SHA-256 and size
//! computation, the path policy that keeps every stored file inside the
//! storage root, and the local filesystem provider.

pub mod checksum;
pub mod path;
pub mod providers;

pub use checksum::{Checksum, HashingStream, checksum_file, checksum_stream};
#[cfg(feature = "local")]
pub use providers::LocalStorageProvider;
