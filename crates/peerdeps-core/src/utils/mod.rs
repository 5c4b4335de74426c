//! Utility functions and helpers.
//!
//! Common functionality used across multiple peerdeps crates.

pub mod path;

// Re-export commonly used utilities
pub use path::{normalize_path, relative_location};
