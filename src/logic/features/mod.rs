//! Features Module - Feature schema and validated request data
//!
//! - `layout.rs` - Named, hashed feature positions
//! - `vector.rs` - `FeatureVector` (validated values) and `Observation`

pub mod layout;
pub mod vector;

#[cfg(test)]
mod tests;

// Re-export common types
pub use layout::{FeatureLayout, LayoutMismatchError};
pub use vector::{FeatureError, FeatureVector, Observation};
