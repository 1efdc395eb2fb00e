//! Reduce raw hourly documents to one reading per hour

use thiserror::Error;

use crate::{Observation, RawRecord};

/// Absent readings tolerated in one batch
pub const MAX_MISSING_VALUES: usize = 5;

#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum NormalizeError {
    #[error("Too many missing values: {missing} (max {MAX_MISSING_VALUES})")]
    TooManyMissingValues { missing: usize },
}

/// Value of the first sub-reading of the first non-empty channel
pub fn extract_value(record: &RawRecord) -> Option<f64> {
    record
        .data
        .iter()
        .flat_map(|channel| channel.readings.iter())
        .next()
        .and_then(|reading| reading.valor)
}

/// Convert raw records to observations, preserving input order
///
/// The absent count is global over the batch and the conversion stops at
/// the first absent value past [`MAX_MISSING_VALUES`].
pub fn normalize(records: &[RawRecord]) -> Result<Vec<Observation>, NormalizeError> {
    let mut observations = Vec::with_capacity(records.len());
    let mut missing = 0;

    for record in records {
        let value = extract_value(record);
        if value.is_none() {
            missing += 1;
            if missing > MAX_MISSING_VALUES {
                return Err(NormalizeError::TooManyMissingValues { missing });
            }
        }

        observations.push(Observation {
            station_id: record.station_id.clone(),
            timestamp: record.timestamp,
            value,
        });
    }

    Ok(observations)
}
