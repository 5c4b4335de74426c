//! peerdeps benchmarking suite
//!
//! Benchmarks for range checks, manifest parsing and end-to-end validation.

pub mod common;

pub use common::*;
