//! Queries against the station and time-zone tables

use chrono::NaiveDateTime;
use tracing::{debug, instrument};
use tzd_core::{Station, StationSource, StoreResult, TimeZoneVerdict, VerdictSink};

use crate::schema::StationRow;
use crate::{DbClient, DbResult};

impl DbClient {
    /// Transmitting stations whose code starts with the configured prefix
    #[instrument(skip(self))]
    pub async fn get_stations(&self) -> DbResult<Vec<StationRow>> {
        let rows = sqlx::query_as::<_, StationRow>(
            r#"
            SELECT puobcodi,
                   last_data_date,
                   latitude::float8 AS latitude,
                   longitude::float8 AS longitude
            FROM public.transmission_stations
            WHERE transmission_status_id = TRUE AND puobcodi LIKE $1
            "#,
        )
        .bind(format!("{}%", self.station_prefix()))
        .fetch_all(self.pool())
        .await?;

        debug!("Retrieved {} stations", rows.len());
        Ok(rows)
    }

    /// Insert the verdict for a station or overwrite the stored one
    #[instrument(skip(self))]
    pub async fn insert_or_update_time_zone(
        &self,
        station_id: &str,
        update_date: NaiveDateTime,
        time_zone_id: i32,
    ) -> DbResult<()> {
        sqlx::query(
            r#"
            INSERT INTO public.stations_time_zones (puobcodi, update_date, time_zone_id)
            VALUES ($1, $2, $3)
            ON CONFLICT (puobcodi)
            DO UPDATE SET
                update_date = EXCLUDED.update_date,
                time_zone_id = EXCLUDED.time_zone_id
            "#,
        )
        .bind(station_id)
        .bind(update_date)
        .bind(time_zone_id)
        .execute(self.pool())
        .await?;

        debug!("Stored time zone {} for {}", time_zone_id, station_id);
        Ok(())
    }
}

#[async_trait::async_trait]
impl StationSource for DbClient {
    async fn stations(&self) -> StoreResult<Vec<Station>> {
        let rows = self.get_stations().await?;
        Ok(rows.into_iter().map(Station::from).collect())
    }
}

#[async_trait::async_trait]
impl VerdictSink for DbClient {
    async fn upsert(
        &self,
        station_id: &str,
        updated_at: NaiveDateTime,
        verdict: TimeZoneVerdict,
    ) -> StoreResult<()> {
        self.insert_or_update_time_zone(station_id, updated_at, verdict.code())
            .await?;
        Ok(())
    }
}
