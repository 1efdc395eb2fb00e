//! Core data types for station observations and verdicts

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One sub-reading inside a raw hourly document
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SubReading {
    /// Numeric value; a stored null is kept as `None`
    #[serde(default)]
    pub valor: Option<f64>,
}

/// A named sensor channel with its sub-readings, in document order
#[derive(Debug, Clone, PartialEq)]
pub struct SensorChannel {
    pub key: String,
    pub readings: Vec<SubReading>,
}

/// Hourly document as returned by the observation source
#[derive(Debug, Clone, PartialEq)]
pub struct RawRecord {
    /// Station code
    pub station_id: String,

    /// Observation time (hourly resolution)
    pub timestamp: NaiveDateTime,

    /// Sensor channels in the order the document lists them
    pub data: Vec<SensorChannel>,
}

impl RawRecord {
    /// Look up a channel by key
    pub fn channel(&self, key: &str) -> Option<&SensorChannel> {
        self.data.iter().find(|c| c.key == key)
    }

    /// True when the channel exists and carries at least one sub-reading
    pub fn has_readings(&self, key: &str) -> bool {
        self.channel(key).is_some_and(|c| !c.readings.is_empty())
    }
}

/// A single hourly reading, possibly absent
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Observation {
    pub station_id: String,
    pub timestamp: NaiveDateTime,
    pub value: Option<f64>,
}

/// A present reading inside a [`CompletedSeries`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeriesPoint {
    pub timestamp: NaiveDateTime,
    pub value: f64,
}

/// Gap-filled readings for one station over one window, no absent values
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CompletedSeries {
    pub station_id: String,
    pub points: Vec<SeriesPoint>,
}

impl CompletedSeries {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// First occurrence of the maximum and of the minimum, in series order
    pub fn extremes(&self) -> Option<(SeriesPoint, SeriesPoint)> {
        let mut points = self.points.iter();
        let first = *points.next()?;
        let (mut max, mut min) = (first, first);
        for point in points {
            if point.value > max.value {
                max = *point;
            }
            if point.value < min.value {
                min = *point;
            }
        }
        Some((max, min))
    }
}

/// Station metadata from the station source
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Station {
    pub station_id: String,
    pub last_data_date: Option<NaiveDateTime>,
    pub latitude: f64,
    pub longitude: f64,
}

/// Time-zone convention inferred for a station
///
/// The discriminants are the codes persisted by the verdict sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "i32", try_from = "i32")]
pub enum TimeZoneVerdict {
    Indeterminate = 0,
    Utc5Shifted = 1,
    Local = 2,
}

impl TimeZoneVerdict {
    pub fn code(self) -> i32 {
        self as i32
    }

    pub fn is_resolved(self) -> bool {
        self != TimeZoneVerdict::Indeterminate
    }
}

impl From<TimeZoneVerdict> for i32 {
    fn from(verdict: TimeZoneVerdict) -> Self {
        verdict.code()
    }
}

impl TryFrom<i32> for TimeZoneVerdict {
    type Error = String;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(TimeZoneVerdict::Indeterminate),
            1 => Ok(TimeZoneVerdict::Utc5Shifted),
            2 => Ok(TimeZoneVerdict::Local),
            other => Err(format!("unknown time zone code: {}", other)),
        }
    }
}

impl fmt::Display for TimeZoneVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeZoneVerdict::Indeterminate => write!(f, "indeterminate"),
            TimeZoneVerdict::Utc5Shifted => write!(f, "utc-5"),
            TimeZoneVerdict::Local => write!(f, "local"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 10)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_verdict_codes() {
        assert_eq!(TimeZoneVerdict::Local.code(), 2);
        assert_eq!(TimeZoneVerdict::Utc5Shifted.code(), 1);
        assert_eq!(TimeZoneVerdict::Indeterminate.code(), 0);
        assert_eq!(TimeZoneVerdict::try_from(1), Ok(TimeZoneVerdict::Utc5Shifted));
        assert!(TimeZoneVerdict::try_from(3).is_err());
        assert!(!TimeZoneVerdict::Indeterminate.is_resolved());
    }

    #[test]
    fn test_verdict_serde_as_code() {
        let json = serde_json::to_string(&TimeZoneVerdict::Local).unwrap();
        assert_eq!(json, "2");
        let back: TimeZoneVerdict = serde_json::from_str("0").unwrap();
        assert_eq!(back, TimeZoneVerdict::Indeterminate);
    }

    #[test]
    fn test_has_readings() {
        let record = RawRecord {
            station_id: "M0024".to_string(),
            timestamp: at(1),
            data: vec![
                SensorChannel {
                    key: "293161h".to_string(),
                    readings: vec![],
                },
                SensorChannel {
                    key: "other".to_string(),
                    readings: vec![SubReading { valor: Some(1.0) }],
                },
            ],
        };
        assert!(!record.has_readings("293161h"));
        assert!(record.has_readings("other"));
        assert!(!record.has_readings("missing"));
    }

    #[test]
    fn test_extremes_first_occurrence() {
        let series = CompletedSeries {
            station_id: "M0024".to_string(),
            points: vec![
                SeriesPoint { timestamp: at(3), value: 10.0 },
                SeriesPoint { timestamp: at(13), value: 25.0 },
                SeriesPoint { timestamp: at(14), value: 25.0 },
                SeriesPoint { timestamp: at(4), value: 10.0 },
            ],
        };
        let (max, min) = series.extremes().unwrap();
        assert_eq!(max.timestamp, at(13));
        assert_eq!(min.timestamp, at(3));
        assert!(CompletedSeries::default().extremes().is_none());
    }
}
