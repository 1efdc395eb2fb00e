//! Document-store access for hourly observation documents
//!
//! The MongoDB client lives behind the `mongo` feature so the URI helpers
//! and document conversion can be built without the driver.

#[cfg(feature = "mongo")]
pub mod client;
#[cfg(feature = "mongo")]
pub mod document;
pub mod uri;

#[cfg(feature = "mongo")]
pub use client::*;
pub use uri::*;

use thiserror::Error;
use tzd_core::StoreError;

/// Collection holding hourly documents
pub const HOURLY_COLLECTION: &str = "data1h";

#[derive(Debug, Error)]
pub enum DocStoreError {
    #[cfg(feature = "mongo")]
    #[error("Driver error: {0}")]
    Driver(#[from] mongodb::error::Error),

    #[error("Invalid connection URI: {0}")]
    InvalidUri(String),

    #[error("Timestamp out of range: {0} ms")]
    InvalidTimestamp(i64),
}

pub type DocStoreResult<T> = Result<T, DocStoreError>;

impl From<DocStoreError> for StoreError {
    fn from(err: DocStoreError) -> Self {
        match &err {
            #[cfg(feature = "mongo")]
            DocStoreError::Driver(e) => {
                use mongodb::error::ErrorKind;
                match e.kind.as_ref() {
                    ErrorKind::ServerSelection { .. } | ErrorKind::Io(_) => {
                        StoreError::Unavailable(err.to_string())
                    }
                    _ => StoreError::Query(err.to_string()),
                }
            }
            DocStoreError::InvalidUri(_) => StoreError::Unavailable(err.to_string()),
            DocStoreError::InvalidTimestamp(_) => StoreError::Query(err.to_string()),
        }
    }
}
