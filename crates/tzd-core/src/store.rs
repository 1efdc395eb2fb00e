//! Store seams used by the search and the batch runner

use chrono::NaiveDateTime;
use thiserror::Error;

use crate::{RawRecord, Station, TimeZoneVerdict};

/// Failure reaching or querying an external store
///
/// An empty result is not an error; sources return `Ok(vec![])` for that.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum StoreError {
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Query failed: {0}")]
    Query(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Range query for hourly documents of one station
#[derive(Debug, Clone, PartialEq)]
pub struct ObservationQuery {
    pub station_id: String,
    /// Inclusive lower bound
    pub start: NaiveDateTime,
    /// Inclusive upper bound
    pub end: NaiveDateTime,
    /// Only this sub-reading channel is requested
    pub sensor_key: String,
    /// Maximum number of documents returned
    pub limit: i64,
}

#[async_trait::async_trait]
pub trait ObservationSource: Send + Sync {
    /// Documents inside the query range, ascending by timestamp
    async fn fetch(&self, query: &ObservationQuery) -> StoreResult<Vec<RawRecord>>;
}

#[async_trait::async_trait]
pub trait StationSource: Send + Sync {
    async fn stations(&self) -> StoreResult<Vec<Station>>;
}

#[async_trait::async_trait]
pub trait VerdictSink: Send + Sync {
    /// Insert or overwrite the verdict stored for `station_id`
    async fn upsert(
        &self,
        station_id: &str,
        updated_at: NaiveDateTime,
        verdict: TimeZoneVerdict,
    ) -> StoreResult<()>;
}
