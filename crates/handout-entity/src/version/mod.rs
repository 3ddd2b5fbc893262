//! Document version entities.

pub mod model;

pub use model::{DocumentVersion, NewVersion};
