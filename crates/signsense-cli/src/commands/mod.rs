//! CLI command implementations.

pub mod dataset;
