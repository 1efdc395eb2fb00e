//! Extremum timing classification

use chrono::{Duration, NaiveDateTime, Timelike};

use crate::{CompletedSeries, TimeZoneVerdict};

/// Fixed offset tested when the local pattern does not match
pub const SHIFT_HOURS: i64 = 5;

/// Daily maximum expected in [12:00, 16:00)
pub fn is_local_peak_time(time: NaiveDateTime) -> bool {
    (12..16).contains(&time.hour())
}

/// Daily minimum expected in [01:00, 06:59]
pub fn is_local_low_time(time: NaiveDateTime) -> bool {
    (1..=6).contains(&time.hour())
}

/// Decide the time-zone convention from when the day peaks and bottoms out
pub fn classify(series: &CompletedSeries) -> TimeZoneVerdict {
    let Some((max, min)) = series.extremes() else {
        return TimeZoneVerdict::Indeterminate;
    };

    if is_local_peak_time(max.timestamp) && is_local_low_time(min.timestamp) {
        return TimeZoneVerdict::Local;
    }

    let shift = Duration::hours(SHIFT_HOURS);
    if is_local_peak_time(max.timestamp - shift) && is_local_low_time(min.timestamp - shift) {
        return TimeZoneVerdict::Utc5Shifted;
    }

    TimeZoneVerdict::Indeterminate
}
