//! Row types for the station table
//!
//! Column names follow the existing production schema; do not rename
//! fields without checking it.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use tzd_core::Station;

/// Transmitting station as listed in `transmission_stations`
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct StationRow {
    /// Station code
    pub puobcodi: String,

    pub last_data_date: Option<NaiveDateTime>,

    pub latitude: f64,
    pub longitude: f64,
}

impl From<StationRow> for Station {
    fn from(row: StationRow) -> Self {
        Station {
            station_id: row.puobcodi,
            last_data_date: row.last_data_date,
            latitude: row.latitude,
            longitude: row.longitude,
        }
    }
}
