//! Day-window search
//!
//! Picks a 24 hour window ending at 04:59:59, fetches the station's hourly
//! readings for it, and runs them through normalization, gap filling and
//! classification. Windows that yield no verdict are retried one day
//! earlier until the attempt bound is reached.

pub mod search;
pub mod window;

pub use search::*;
pub use window::*;

use thiserror::Error;
use tzd_core::{NormalizeError, StoreError};

/// Why a single window produced no verdict
#[derive(Debug, Clone, Error, PartialEq)]
pub enum AttemptFailure {
    #[error("Insufficient data: {usable} usable records")]
    InsufficientData { usable: usize },

    #[error("Too many missing values: {missing}")]
    TooManyMissingValues { missing: usize },

    #[error("Extremum timing matches neither pattern")]
    Indeterminate,

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl From<NormalizeError> for AttemptFailure {
    fn from(err: NormalizeError) -> Self {
        match err {
            NormalizeError::TooManyMissingValues { missing } => {
                AttemptFailure::TooManyMissingValues { missing }
            }
        }
    }
}

pub type AttemptResult<T> = Result<T, AttemptFailure>;
