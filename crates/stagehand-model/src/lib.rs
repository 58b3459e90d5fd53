//! Shared data types for the stagehand pipeline runner, demo service and verifier.
mod error;
pub use error::ModelError;

mod domain;
pub use domain::*;
