//! Core data types and the temperature-curve analysis steps
//!
//! This crate holds the pieces of the pipeline that never touch I/O:
//! extracting one reading per hour, filling gaps, and classifying the
//! timing of the daily extremes. Store access is expressed as traits in
//! [`store`] and implemented elsewhere.

pub mod classify;
pub mod gapfill;
pub mod normalize;
pub mod store;
pub mod types;

pub use classify::*;
pub use gapfill::*;
pub use normalize::*;
pub use store::*;
pub use types::*;
