//! Candle interval identifiers
//!
//! Mirrors the interval strings exchanges accept for kline requests. Month candles are
//! approximated as 30 days, which only matters when a close time has to be estimated.

use crate::common::errors::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const MINUTE_MS: i64 = 60 * 1000;
const HOUR_MS: i64 = 60 * MINUTE_MS;
const DAY_MS: i64 = 24 * HOUR_MS;

/// Supported candle widths
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Interval {
    Minute1,
    Minute3,
    Minute5,
    Minute15,
    Minute30,
    #[default]
    Hour1,
    Hour2,
    Hour4,
    Hour6,
    Hour8,
    Hour12,
    Day1,
    Day3,
    Week1,
    Month1,
}

impl Interval {
    pub const ALL: [Interval; 15] = [
        Interval::Minute1,
        Interval::Minute3,
        Interval::Minute5,
        Interval::Minute15,
        Interval::Minute30,
        Interval::Hour1,
        Interval::Hour2,
        Interval::Hour4,
        Interval::Hour6,
        Interval::Hour8,
        Interval::Hour12,
        Interval::Day1,
        Interval::Day3,
        Interval::Week1,
        Interval::Month1,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Interval::Minute1 => "1m",
            Interval::Minute3 => "3m",
            Interval::Minute5 => "5m",
            Interval::Minute15 => "15m",
            Interval::Minute30 => "30m",
            Interval::Hour1 => "1h",
            Interval::Hour2 => "2h",
            Interval::Hour4 => "4h",
            Interval::Hour6 => "6h",
            Interval::Hour8 => "8h",
            Interval::Hour12 => "12h",
            Interval::Day1 => "1d",
            Interval::Day3 => "3d",
            Interval::Week1 => "1w",
            Interval::Month1 => "1M",
        }
    }

    /// Width of one candle in milliseconds
    pub fn as_millis(&self) -> i64 {
        match self {
            Interval::Minute1 => MINUTE_MS,
            Interval::Minute3 => 3 * MINUTE_MS,
            Interval::Minute5 => 5 * MINUTE_MS,
            Interval::Minute15 => 15 * MINUTE_MS,
            Interval::Minute30 => 30 * MINUTE_MS,
            Interval::Hour1 => HOUR_MS,
            Interval::Hour2 => 2 * HOUR_MS,
            Interval::Hour4 => 4 * HOUR_MS,
            Interval::Hour6 => 6 * HOUR_MS,
            Interval::Hour8 => 8 * HOUR_MS,
            Interval::Hour12 => 12 * HOUR_MS,
            Interval::Day1 => DAY_MS,
            Interval::Day3 => 3 * DAY_MS,
            Interval::Week1 => 7 * DAY_MS,
            Interval::Month1 => 30 * DAY_MS,
        }
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Interval {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Interval::ALL
            .iter()
            .copied()
            .find(|interval| interval.as_str() == s)
            .ok_or_else(|| ValidationError::UnsupportedInterval {
                interval: s.to_string(),
            })
    }
}

impl TryFrom<String> for Interval {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Interval> for String {
    fn from(interval: Interval) -> Self {
        interval.as_str().to_string()
    }
}
