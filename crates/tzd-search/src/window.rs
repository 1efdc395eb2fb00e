//! Daily window arithmetic

use chrono::{Days, Duration, NaiveDate, NaiveDateTime};
use std::fmt;

/// Hour of day at which a window opens
pub const WINDOW_START_HOUR: u32 = 5;

/// A 24 hour span from 05:00:00 to 04:59:59 the next day
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DailyWindow {
    pub days_ago: u32,
    /// Inclusive
    pub start: NaiveDateTime,
    /// Inclusive
    pub end: NaiveDateTime,
}

impl DailyWindow {
    /// Window ending on `today - days_ago`
    ///
    /// `days_ago = 0` spans yesterday 05:00:00 to today 04:59:59.
    /// Returns `None` when the window falls outside the calendar range.
    pub fn for_days_ago(today: NaiveDate, days_ago: u32) -> Option<Self> {
        let end_day = today.checked_sub_days(Days::new(u64::from(days_ago)))?;
        let start_day = end_day.checked_sub_days(Days::new(1))?;
        let start = opening(start_day);
        let end = opening(end_day) - Duration::seconds(1);

        Some(Self {
            days_ago,
            start,
            end,
        })
    }

    pub fn contains(&self, timestamp: NaiveDateTime) -> bool {
        self.start <= timestamp && timestamp <= self.end
    }

    /// The window one day earlier
    pub fn previous(&self) -> Option<Self> {
        let days_ago = self.days_ago.checked_add(1)?;
        Self::for_days_ago(self.end.date(), 1).map(|w| w.with_days_ago(days_ago))
    }

    fn with_days_ago(mut self, days_ago: u32) -> Self {
        self.days_ago = days_ago;
        self
    }
}

fn opening(day: NaiveDate) -> NaiveDateTime {
    day.and_hms_opt(WINDOW_START_HOUR, 0, 0)
        .expect("window start hour is a valid time of day")
}

impl fmt::Display for DailyWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} .. {}",
            self.start.format("%Y-%m-%d %H:%M:%S"),
            self.end.format("%Y-%m-%d %H:%M:%S")
        )
    }
}
