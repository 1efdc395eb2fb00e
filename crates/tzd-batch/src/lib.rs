//! Batch runner for station time-zone detection
//!
//! Walks the station list in order, searches each station for a verdict and
//! persists one verdict per station. Store clients are borrowed; opening and
//! closing them is the caller's job.

pub mod runner;

pub use runner::*;
