//! Sequential per-station processing

use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use tracing::{error, info, instrument};
use tzd_core::{ObservationSource, StationSource, TimeZoneVerdict, VerdictSink};
use tzd_search::{DayWindowSearch, SearchOutcome};

/// Counts reported at the end of a run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub total: usize,
    /// Stations that received a non-zero verdict
    pub resolved: usize,
    /// Upserts that failed and were skipped
    pub failed_writes: usize,
}

/// Runs the search for every station and stores the verdicts
pub struct BatchRunner<'a> {
    stations: &'a dyn StationSource,
    sink: &'a dyn VerdictSink,
    search: DayWindowSearch<'a>,
}

impl<'a> BatchRunner<'a> {
    pub fn new(
        stations: &'a dyn StationSource,
        observations: &'a dyn ObservationSource,
        sink: &'a dyn VerdictSink,
        sensor_key: &str,
    ) -> Self {
        Self {
            stations,
            sink,
            search: DayWindowSearch::new(observations, sensor_key),
        }
    }

    /// Process all stations; `now` anchors the windows and stamps the verdicts
    ///
    /// Only a failure to list stations aborts the run.
    pub async fn run(&self, now: NaiveDateTime) -> Result<BatchSummary> {
        let stations = self
            .stations
            .stations()
            .await
            .context("Failed to load station list")?;

        info!(
            "Processing {} stations with sensor {}",
            stations.len(),
            self.search.sensor_key()
        );

        let mut summary = BatchSummary {
            total: stations.len(),
            ..Default::default()
        };

        for station in &stations {
            let outcome = self.process_station(&station.station_id, now).await;

            if outcome.is_resolved() {
                summary.resolved += 1;
            }
            if let Err(e) = self
                .sink
                .upsert(&station.station_id, now, outcome.verdict())
                .await
            {
                error!(station = %station.station_id, error = %e, "Failed to store verdict");
                summary.failed_writes += 1;
            }
        }

        info!(
            "Stations with determined time zone: {} / {}",
            summary.resolved, summary.total
        );
        Ok(summary)
    }

    #[instrument(skip(self, now))]
    async fn process_station(&self, station_id: &str, now: NaiveDateTime) -> SearchOutcome {
        let outcome = self.search.search(station_id, 0, now).await;
        match outcome {
            SearchOutcome::Resolved {
                verdict, days_ago, ..
            } => info!(%verdict, days_ago, attempts = outcome.attempts(), "resolved"),
            SearchOutcome::GaveUp { attempts } => info!(
                verdict = %TimeZoneVerdict::Indeterminate,
                attempts,
                "no usable window"
            ),
        }
        outcome
    }
}
