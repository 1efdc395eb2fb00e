//! PostgreSQL access for the station list and stored verdicts
//!
//! Reads transmitting stations and upserts one time-zone verdict per
//! station. Uses the existing schema - NO migrations.

pub mod client;
pub mod queries;
pub mod schema;

pub use client::*;
pub use schema::*;

use thiserror::Error;
use tzd_core::StoreError;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("Database connection error: {0}")]
    ConnectionError(#[from] sqlx::Error),

    #[error("Invalid configuration: {0}")]
    ConfigError(String),
}

pub type DbResult<T> = Result<T, DbError>;

impl From<DbError> for StoreError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::ConnectionError(sqlx::Error::PoolTimedOut)
            | DbError::ConnectionError(sqlx::Error::PoolClosed)
            | DbError::ConnectionError(sqlx::Error::Io(_)) => {
                StoreError::Unavailable(err.to_string())
            }
            other => StoreError::Query(other.to_string()),
        }
    }
}
