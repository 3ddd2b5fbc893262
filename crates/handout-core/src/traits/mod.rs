//! Core traits defined in `handout-core` and implemented by other crates.

pub mod storage;

pub use storage::{ByteStream, PlacedObject, StagedObject, StorageProvider};
