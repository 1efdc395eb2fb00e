//! Linear gap filling over the timestamp axis

use std::cmp::Ordering;

use chrono::NaiveDateTime;
use tracing::debug;

use crate::{CompletedSeries, Observation, SeriesPoint};

/// Round to one decimal place, ties to even
pub fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round_ties_even() / 10.0
}

/// Fill absent values by interpolating between the nearest known readings
///
/// Input must be ascending by timestamp. Absent values before the first or
/// after the last known reading stay absent. Every value is rounded to one
/// decimal and the result is ordered by station, timestamp, then value.
pub fn fill_gaps(observations: &[Observation]) -> Vec<Observation> {
    let known: Vec<(i64, f64)> = observations
        .iter()
        .filter_map(|o| o.value.map(|v| (seconds(o.timestamp), v)))
        .collect();

    let mut filled: Vec<Observation> = observations
        .iter()
        .map(|o| {
            let value = o
                .value
                .or_else(|| interpolate_at(&known, seconds(o.timestamp)));
            Observation {
                station_id: o.station_id.clone(),
                timestamp: o.timestamp,
                value: value.map(round_one_decimal),
            }
        })
        .collect();

    filled.sort_by(series_order);
    filled
}

/// Collect the present readings of a filled series
///
/// Boundary readings that interpolation could not reach are left out.
pub fn complete_series(station_id: &str, filled: &[Observation]) -> CompletedSeries {
    let points: Vec<SeriesPoint> = filled
        .iter()
        .filter_map(|o| {
            o.value.map(|value| SeriesPoint {
                timestamp: o.timestamp,
                value,
            })
        })
        .collect();

    let dropped = filled.len() - points.len();
    if dropped > 0 {
        debug!(station = station_id, dropped, "unbracketed readings left out");
    }

    CompletedSeries {
        station_id: station_id.to_string(),
        points,
    }
}

fn seconds(timestamp: NaiveDateTime) -> i64 {
    timestamp.and_utc().timestamp()
}

fn interpolate_at(known: &[(i64, f64)], x: i64) -> Option<f64> {
    let upper = known.partition_point(|(kx, _)| *kx < x);
    if upper == known.len() {
        return None;
    }
    let (x1, y1) = known[upper];
    if x1 == x {
        return Some(y1);
    }
    if upper == 0 {
        return None;
    }
    let (x0, y0) = known[upper - 1];
    let fraction = (x - x0) as f64 / (x1 - x0) as f64;
    Some(y0 + (y1 - y0) * fraction)
}

// Absent values sort after present ones.
fn series_order(a: &Observation, b: &Observation) -> Ordering {
    a.station_id
        .cmp(&b.station_id)
        .then(a.timestamp.cmp(&b.timestamp))
        .then_with(|| match (a.value, b.value) {
            (Some(x), Some(y)) => x.total_cmp(&y),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        })
}
