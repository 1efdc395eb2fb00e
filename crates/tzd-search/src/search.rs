//! Bounded day-by-day search for a station's verdict

use chrono::NaiveDateTime;
use tracing::{debug, info, instrument, warn};
use tzd_core::{
    classify, complete_series, fill_gaps, normalize, ObservationQuery, ObservationSource,
    RawRecord, TimeZoneVerdict,
};

use crate::{AttemptFailure, AttemptResult, DailyWindow};

/// A window must yield strictly more usable records than this
pub const MIN_USABLE_RECORDS: usize = 20;

/// Oldest window tried, in days before today
pub const MAX_DAYS_AGO: u32 = 7;

/// Documents requested per window
pub const FETCH_LIMIT: i64 = 48;

/// Result of searching one station
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchOutcome {
    Resolved {
        verdict: TimeZoneVerdict,
        days_ago: u32,
        attempts: u32,
    },
    GaveUp {
        attempts: u32,
    },
}

impl SearchOutcome {
    /// Verdict to persist; a search that gave up stores Indeterminate
    pub fn verdict(&self) -> TimeZoneVerdict {
        match self {
            SearchOutcome::Resolved { verdict, .. } => *verdict,
            SearchOutcome::GaveUp { .. } => TimeZoneVerdict::Indeterminate,
        }
    }

    pub fn attempts(&self) -> u32 {
        match self {
            SearchOutcome::Resolved { attempts, .. } | SearchOutcome::GaveUp { attempts } => {
                *attempts
            }
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, SearchOutcome::Resolved { .. })
    }
}

/// Drives fetch, normalize, fill and classify over successive windows
pub struct DayWindowSearch<'a> {
    source: &'a dyn ObservationSource,
    sensor_key: String,
}

impl<'a> DayWindowSearch<'a> {
    pub fn new(source: &'a dyn ObservationSource, sensor_key: impl Into<String>) -> Self {
        Self {
            source,
            sensor_key: sensor_key.into(),
        }
    }

    pub fn sensor_key(&self) -> &str {
        &self.sensor_key
    }

    /// Search from `start_days_ago` back to [`MAX_DAYS_AGO`]
    ///
    /// A start at or past the bound makes exactly one attempt.
    #[instrument(skip(self, now))]
    pub async fn search(
        &self,
        station_id: &str,
        start_days_ago: u32,
        now: NaiveDateTime,
    ) -> SearchOutcome {
        let Some(mut window) = DailyWindow::for_days_ago(now.date(), start_days_ago) else {
            warn!(station = station_id, start_days_ago, "window outside calendar range, giving up");
            return SearchOutcome::GaveUp { attempts: 1 };
        };
        let mut attempts = 0;

        loop {
            attempts += 1;

            match self.attempt(station_id, &window).await {
                Ok(verdict) => {
                    info!(
                        station = station_id,
                        %verdict,
                        days_ago = window.days_ago,
                        "verdict accepted"
                    );
                    return SearchOutcome::Resolved {
                        verdict,
                        days_ago: window.days_ago,
                        attempts,
                    };
                }
                Err(AttemptFailure::Store(e)) => {
                    warn!(station = station_id, %window, error = %e, "fetch failed, treating as no data");
                }
                Err(failure) => {
                    debug!(station = station_id, %window, reason = %failure, "no verdict for window");
                }
            }

            match window.previous() {
                Some(previous) if window.days_ago < MAX_DAYS_AGO => window = previous,
                _ => {
                    info!(station = station_id, attempts, "giving up");
                    return SearchOutcome::GaveUp { attempts };
                }
            }
        }
    }

    /// One fetch and classification over a single window
    pub async fn attempt(
        &self,
        station_id: &str,
        window: &DailyWindow,
    ) -> AttemptResult<TimeZoneVerdict> {
        let query = ObservationQuery {
            station_id: station_id.to_string(),
            start: window.start,
            end: window.end,
            sensor_key: self.sensor_key.clone(),
            limit: FETCH_LIMIT,
        };
        let records = self.source.fetch(&query).await?;

        let usable: Vec<RawRecord> = records
            .into_iter()
            .filter(|r| r.has_readings(&self.sensor_key))
            .collect();
        debug!(station = station_id, %window, usable = usable.len(), "fetched window");

        if usable.len() <= MIN_USABLE_RECORDS {
            return Err(AttemptFailure::InsufficientData {
                usable: usable.len(),
            });
        }

        let observations = normalize(&usable)?;
        let filled = fill_gaps(&observations);
        let series = complete_series(station_id, &filled);

        match classify(&series) {
            TimeZoneVerdict::Indeterminate => Err(AttemptFailure::Indeterminate),
            verdict => Ok(verdict),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use tzd_core::{SensorChannel, StoreError, StoreResult, SubReading};

    const KEY: &str = "293161h";

    /// Replays one scripted response per fetch and records the queries
    struct ScriptedSource {
        responses: Mutex<VecDeque<StoreResult<Vec<RawRecord>>>>,
        queries: Mutex<Vec<ObservationQuery>>,
    }

    impl ScriptedSource {
        fn new(responses: Vec<StoreResult<Vec<RawRecord>>>) -> Self {
            Self {
                responses: Mutex::new(responses.into()),
                queries: Mutex::new(Vec::new()),
            }
        }

        fn fetches(&self) -> usize {
            self.queries.lock().unwrap().len()
        }
    }

    #[async_trait::async_trait]
    impl ObservationSource for ScriptedSource {
        async fn fetch(&self, query: &ObservationQuery) -> StoreResult<Vec<RawRecord>> {
            self.queries.lock().unwrap().push(query.clone());
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(Vec::new()))
        }
    }

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 10)
            .unwrap()
            .and_hms_opt(8, 30, 0)
            .unwrap()
    }

    fn reading(timestamp: NaiveDateTime, valor: Option<f64>) -> RawRecord {
        RawRecord {
            station_id: "M0024".to_string(),
            timestamp,
            data: vec![SensorChannel {
                key: KEY.to_string(),
                readings: vec![SubReading { valor }],
            }],
        }
    }

    /// 24 hourly records for `days_ago`, peaking and bottoming at the given hours
    fn day(days_ago: u32, max_hour: u32, min_hour: u32) -> Vec<RawRecord> {
        let window = DailyWindow::for_days_ago(now().date(), days_ago).unwrap();
        (0..24)
            .map(|h| {
                let timestamp = window.start + Duration::hours(h);
                let hour = chrono::Timelike::hour(&timestamp);
                let value = if hour == max_hour {
                    28.0
                } else if hour == min_hour {
                    9.0
                } else {
                    18.0
                };
                reading(timestamp, Some(value))
            })
            .collect()
    }

    #[tokio::test]
    async fn test_local_on_first_window() {
        let source = ScriptedSource::new(vec![Ok(day(0, 14, 3))]);
        let search = DayWindowSearch::new(&source, KEY);

        let outcome = search.search("M0024", 0, now()).await;

        assert_eq!(
            outcome,
            SearchOutcome::Resolved {
                verdict: TimeZoneVerdict::Local,
                days_ago: 0,
                attempts: 1
            }
        );
        let queries = source.queries.lock().unwrap();
        assert_eq!(queries[0].sensor_key, KEY);
        assert_eq!(queries[0].limit, FETCH_LIMIT);
        assert_eq!(queries[0].start.to_string(), "2024-03-09 05:00:00");
        assert_eq!(queries[0].end.to_string(), "2024-03-10 04:59:59");
    }

    #[tokio::test]
    async fn test_indeterminate_then_local() {
        let source = ScriptedSource::new(vec![Ok(day(0, 9, 20)), Ok(day(1, 14, 3))]);
        let search = DayWindowSearch::new(&source, KEY);

        let outcome = search.search("M0024", 0, now()).await;

        assert_eq!(outcome.verdict(), TimeZoneVerdict::Local);
        assert_eq!(outcome.attempts(), 2);
        assert_eq!(source.fetches(), 2);
        let queries = source.queries.lock().unwrap();
        assert_eq!(queries[1].end.to_string(), "2024-03-09 04:59:59");
    }

    #[tokio::test]
    async fn test_shifted_verdict() {
        let source = ScriptedSource::new(vec![Ok(day(0, 19, 8))]);
        let search = DayWindowSearch::new(&source, KEY);

        let outcome = search.search("M0024", 0, now()).await;

        assert_eq!(outcome.verdict(), TimeZoneVerdict::Utc5Shifted);
    }

    #[tokio::test]
    async fn test_gives_up_after_eight_sparse_windows() {
        let sparse: Vec<StoreResult<Vec<RawRecord>>> = (0..8)
            .map(|d| Ok(day(d, 14, 3).into_iter().take(20).collect()))
            .collect();
        let source = ScriptedSource::new(sparse);
        let search = DayWindowSearch::new(&source, KEY);

        let outcome = search.search("M0024", 0, now()).await;

        assert_eq!(outcome, SearchOutcome::GaveUp { attempts: 8 });
        assert_eq!(outcome.verdict(), TimeZoneVerdict::Indeterminate);
        assert_eq!(source.fetches(), 8);
    }

    #[tokio::test]
    async fn test_indeterminate_is_bounded() {
        let source = ScriptedSource::new((0..10).map(|d| Ok(day(d, 9, 20))).collect());
        let search = DayWindowSearch::new(&source, KEY);

        let outcome = search.search("M0024", 0, now()).await;

        assert_eq!(outcome, SearchOutcome::GaveUp { attempts: 8 });
    }

    #[tokio::test]
    async fn test_start_past_bound_makes_one_attempt() {
        let source = ScriptedSource::new(vec![]);
        let search = DayWindowSearch::new(&source, KEY);

        let outcome = search.search("M0024", MAX_DAYS_AGO, now()).await;

        assert_eq!(outcome, SearchOutcome::GaveUp { attempts: 1 });
    }

    #[tokio::test]
    async fn test_start_outside_calendar_gives_up_without_fetching() {
        let source = ScriptedSource::new(vec![]);
        let search = DayWindowSearch::new(&source, KEY);

        let outcome = search.search("M0024", u32::MAX, now()).await;

        assert_eq!(outcome, SearchOutcome::GaveUp { attempts: 1 });
        assert_eq!(source.fetches(), 0);
    }

    #[tokio::test]
    async fn test_twenty_one_usable_records_are_classified() {
        // 05:00 through 01:00; the 01:00 trough is the last record.
        let records: Vec<RawRecord> = day(0, 14, 1).into_iter().take(21).collect();
        let source = ScriptedSource::new(vec![Ok(records)]);
        let search = DayWindowSearch::new(&source, KEY);
        let window = DailyWindow::for_days_ago(now().date(), 0).unwrap();

        let result = search.attempt("M0024", &window).await;

        assert_eq!(result, Ok(TimeZoneVerdict::Local));
    }

    #[tokio::test]
    async fn test_records_without_sensor_key_are_not_usable() {
        // 21 records but one lacks readings for the key.
        let mut records: Vec<RawRecord> = day(0, 14, 3).into_iter().take(21).collect();
        records[5].data[0].readings.clear();
        let source = ScriptedSource::new(vec![Ok(records)]);
        let search = DayWindowSearch::new(&source, KEY);
        let window = DailyWindow::for_days_ago(now().date(), 0).unwrap();

        let result = search.attempt("M0024", &window).await;

        assert_eq!(result, Err(AttemptFailure::InsufficientData { usable: 20 }));
    }

    #[tokio::test]
    async fn test_too_many_missing_values_retries() {
        let mut gappy = day(0, 14, 3);
        for record in gappy.iter_mut().skip(6).take(6) {
            record.data[0].readings[0].valor = None;
        }
        let source = ScriptedSource::new(vec![Ok(gappy), Ok(day(1, 14, 3))]);
        let search = DayWindowSearch::new(&source, KEY);
        let window = DailyWindow::for_days_ago(now().date(), 0).unwrap();

        assert_eq!(
            search.attempt("M0024", &window).await,
            Err(AttemptFailure::TooManyMissingValues { missing: 6 })
        );
        assert_eq!(
            search.attempt("M0024", &window.previous().unwrap()).await,
            Ok(TimeZoneVerdict::Local)
        );
    }

    #[tokio::test]
    async fn test_store_failure_counts_as_no_data() {
        let source = ScriptedSource::new(vec![
            Err(StoreError::Unavailable("connection refused".to_string())),
            Ok(day(1, 14, 3)),
        ]);
        let search = DayWindowSearch::new(&source, KEY);

        let outcome = search.search("M0024", 0, now()).await;

        assert_eq!(
            outcome,
            SearchOutcome::Resolved {
                verdict: TimeZoneVerdict::Local,
                days_ago: 1,
                attempts: 2
            }
        );
    }

    #[tokio::test]
    async fn test_interior_gaps_are_filled_before_classifying() {
        // The 14:00 peak survives; neighbouring gaps are interpolated.
        let mut records = day(0, 14, 3);
        for idx in [2, 7, 11, 15, 19] {
            records[idx].data[0].readings[0].valor = None;
        }
        let source = ScriptedSource::new(vec![Ok(records)]);
        let search = DayWindowSearch::new(&source, KEY);

        let outcome = search.search("M0024", 0, now()).await;

        assert_eq!(outcome.verdict(), TimeZoneVerdict::Local);
    }
}
