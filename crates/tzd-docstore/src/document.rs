//! Hourly document layout and conversion into raw records

use chrono::{DateTime, NaiveDateTime};
use mongodb::bson::{self, Bson, Document};
use serde::{Deserialize, Serialize};
use tracing::warn;
use tzd_core::{RawRecord, SensorChannel, SubReading};

use crate::{DocStoreError, DocStoreResult};

/// Document as stored in the hourly collection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HourlyDocument {
    #[serde(rename = "puntoObservacion")]
    pub station_id: String,

    #[serde(rename = "fechaTomaDato")]
    pub taken_at: bson::DateTime,

    /// Channel key -> array of sub-reading documents
    #[serde(default)]
    pub data: Document,
}

impl HourlyDocument {
    /// Convert to a raw record, keeping channel order
    pub fn into_record(self) -> DocStoreResult<RawRecord> {
        let data = self
            .data
            .into_iter()
            .map(|(key, value)| SensorChannel {
                key,
                readings: sub_readings(&value),
            })
            .collect();

        Ok(RawRecord {
            station_id: self.station_id,
            timestamp: to_naive(self.taken_at)?,
            data,
        })
    }
}

/// Convert fetched documents, skipping any whose date cannot be represented
pub fn into_records(documents: Vec<HourlyDocument>) -> Vec<RawRecord> {
    documents
        .into_iter()
        .filter_map(|document| {
            let station_id = document.station_id.clone();
            match document.into_record() {
                Ok(record) => Some(record),
                Err(e) => {
                    warn!(station = %station_id, error = %e, "skipping unreadable document");
                    None
                }
            }
        })
        .collect()
}

/// Stored dates are compared as naive wall-clock values
pub fn to_bson(timestamp: NaiveDateTime) -> bson::DateTime {
    bson::DateTime::from_millis(timestamp.and_utc().timestamp_millis())
}

pub fn to_naive(timestamp: bson::DateTime) -> DocStoreResult<NaiveDateTime> {
    let millis = timestamp.timestamp_millis();
    DateTime::from_timestamp_millis(millis)
        .map(|dt| dt.naive_utc())
        .ok_or(DocStoreError::InvalidTimestamp(millis))
}

fn sub_readings(value: &Bson) -> Vec<SubReading> {
    match value {
        Bson::Array(items) => items
            .iter()
            .filter_map(Bson::as_document)
            .map(|doc| SubReading {
                valor: doc.get("valor").and_then(numeric),
            })
            .collect(),
        _ => Vec::new(),
    }
}

fn numeric(value: &Bson) -> Option<f64> {
    match value {
        Bson::Double(v) => Some(*v),
        Bson::Int32(v) => Some(f64::from(*v)),
        Bson::Int64(v) => Some(*v as f64),
        _ => None,
    }
}
