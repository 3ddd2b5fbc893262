//! Document domain entities.

pub mod model;

pub use model::{CreateDocument, Document};
