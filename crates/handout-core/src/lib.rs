//! # handout-core
//!
//! Core crate for Handout Vault. Contains the storage provider trait,
//! configuration schemas, and the unified error system shared by every
//! other crate in the workspace.
//!
//! This crate has **no** internal dependencies on other Handout crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;

pub use error::{AppError, ErrorKind};
pub use result::AppResult;
