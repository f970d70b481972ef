//! Long-running server process for the Nova platform.
//!
//! Loads configuration, builds or loads the mock dataset, and serves the
//! REST API until a shutdown signal arrives.

pub mod daemon;
pub mod shutdown;
