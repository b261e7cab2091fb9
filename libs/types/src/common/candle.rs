//! OHLCV candle and its UTC time slot

use chrono::{DateTime, Datelike, Timelike, Utc};
use serde::{Deserialize, Serialize};

pub const DAYS_PER_WEEK: usize = 7;
pub const HOURS_PER_DAY: usize = 24;

/// One OHLCV bar. Timestamps are milliseconds since the Unix epoch.
///
/// Candles built through [`crate::kline::candles_from_klines`] are guaranteed to satisfy
/// `low <= {open, close} <= high`, non-negative values and representable timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candle {
    pub open_time: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    pub close_time: i64,
}

impl Candle {
    /// Open time as a UTC datetime, `None` when outside chrono's range
    pub fn open_datetime(&self) -> Option<DateTime<Utc>> {
        DateTime::<Utc>::from_timestamp_millis(self.open_time)
    }

    /// UTC (day-of-week, hour-of-day) bucket of the open time
    pub fn time_slot(&self) -> TimeSlot {
        TimeSlot::from_millis(self.open_time)
    }

    /// Midpoint of the high/low range
    pub fn midpoint(&self) -> f64 {
        (self.high + self.low) / 2.0
    }
}

/// Heatmap coordinates: day of week with Sunday = 0, hour of day 0-23, both UTC
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSlot {
    pub day_of_week: usize,
    pub hour_of_day: usize,
}

impl TimeSlot {
    pub fn from_datetime(at: DateTime<Utc>) -> Self {
        Self {
            day_of_week: at.weekday().num_days_from_sunday() as usize,
            hour_of_day: at.hour() as usize,
        }
    }

    /// Buckets a millisecond timestamp.
    ///
    /// Timestamps beyond chrono's range fall back to calendar arithmetic on the epoch
    /// (1970-01-01 was a Thursday) so bucketing stays total.
    pub fn from_millis(millis: i64) -> Self {
        match DateTime::<Utc>::from_timestamp_millis(millis) {
            Some(at) => Self::from_datetime(at),
            None => {
                const DAY_MS: i64 = 86_400_000;
                let days = millis.div_euclid(DAY_MS);
                let within_day = millis.rem_euclid(DAY_MS);
                Self {
                    day_of_week: (days + 4).rem_euclid(DAYS_PER_WEEK as i64) as usize,
                    hour_of_day: (within_day / 3_600_000) as usize,
                }
            }
        }
    }
}
