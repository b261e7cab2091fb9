//! Exchange kline records and their conversion into validated [`Candle`]s
//!
//! Exchanges ship OHLCV values as decimal strings (`"42000.01000000"`), some clients as
//! plain JSON numbers. Both are accepted. Values go through `rust_decimal` before becoming
//! `f64`, which rejects `NaN`/`inf` spellings that `f64::from_str` would happily accept.
//!
//! The conversion is all-or-nothing: the first bad record aborts with a
//! [`ValidationError`] and no partial candle list is returned.

use crate::common::{Candle, Interval, ValidationError};
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Numeric field as it appears on the wire
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawNumber {
    Text(String),
    Float(f64),
}

impl RawNumber {
    fn to_decimal(&self) -> Option<Decimal> {
        match self {
            RawNumber::Text(text) => {
                let text = text.trim();
                Decimal::from_str(text)
                    .or_else(|_| Decimal::from_scientific(text))
                    .ok()
            }
            RawNumber::Float(value) => Decimal::from_f64(*value),
        }
    }

    fn describe(&self) -> String {
        match self {
            RawNumber::Text(text) => text.clone(),
            RawNumber::Float(value) => value.to_string(),
        }
    }
}

impl From<&str> for RawNumber {
    fn from(value: &str) -> Self {
        RawNumber::Text(value.to_string())
    }
}

impl From<f64> for RawNumber {
    fn from(value: f64) -> Self {
        RawNumber::Float(value)
    }
}

/// One kline record in exchange (camelCase) layout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawKline {
    pub open_time: i64,
    pub open: RawNumber,
    pub high: RawNumber,
    pub low: RawNumber,
    pub close: RawNumber,
    pub volume: RawNumber,
    #[serde(default)]
    pub close_time: Option<i64>,
    #[serde(default)]
    pub quote_asset_volume: Option<RawNumber>,
    #[serde(default)]
    pub trades: Option<u64>,
    #[serde(default)]
    pub taker_buy_base_asset_volume: Option<RawNumber>,
    #[serde(default)]
    pub taker_buy_quote_asset_volume: Option<RawNumber>,
}

impl RawKline {
    /// Validates this record in isolation. `interval` is used to estimate a missing close time.
    pub fn to_candle(
        &self,
        index: usize,
        interval: Option<Interval>,
    ) -> Result<Candle, ValidationError> {
        let open = parse_field(index, "open", &self.open)?;
        let high = parse_field(index, "high", &self.high)?;
        let low = parse_field(index, "low", &self.low)?;
        let close = parse_field(index, "close", &self.close)?;
        let volume = parse_field(index, "volume", &self.volume)?;

        if low > open.min(close) || high < open.max(close) || low > high {
            return Err(ValidationError::PriceEnvelope {
                index,
                open,
                high,
                low,
                close,
            });
        }

        check_timestamp(index, self.open_time)?;
        let close_time = match self.close_time {
            Some(close_time) => close_time,
            None => self
                .open_time
                .saturating_add(interval.map(|i| i.as_millis()).unwrap_or(0)),
        };
        check_timestamp(index, close_time)?;
        if close_time < self.open_time {
            return Err(ValidationError::CloseBeforeOpen {
                index,
                open_time: self.open_time,
                close_time,
            });
        }

        Ok(Candle {
            open_time: self.open_time,
            open,
            high,
            low,
            close,
            volume,
            close_time,
        })
    }
}

fn parse_field(index: usize, field: &'static str, raw: &RawNumber) -> Result<f64, ValidationError> {
    let value = raw
        .to_decimal()
        .and_then(|decimal| decimal.to_f64())
        .filter(|value| value.is_finite())
        .ok_or_else(|| ValidationError::InvalidNumber {
            index,
            field,
            input: raw.describe(),
        })?;

    if value < 0.0 {
        return Err(ValidationError::Negative {
            index,
            field,
            value,
        });
    }
    Ok(value)
}

fn check_timestamp(index: usize, timestamp: i64) -> Result<(), ValidationError> {
    chrono::DateTime::<chrono::Utc>::from_timestamp_millis(timestamp)
        .map(|_| ())
        .ok_or(ValidationError::TimestampOutOfRange { index, timestamp })
}

/// Converts a record list into an ascending, deduplicated candle sequence.
///
/// Records sharing an open time with their predecessor are dropped (first one wins);
/// a record older than its predecessor is an error.
pub fn candles_from_klines(
    records: &[RawKline],
    interval: Option<Interval>,
) -> Result<Vec<Candle>, ValidationError> {
    let mut candles: Vec<Candle> = Vec::with_capacity(records.len());

    for (index, record) in records.iter().enumerate() {
        let candle = record.to_candle(index, interval)?;
        if let Some(previous) = candles.last() {
            if candle.open_time < previous.open_time {
                return Err(ValidationError::OutOfOrder {
                    index,
                    previous: previous.open_time,
                    current: candle.open_time,
                });
            }
            if candle.open_time == previous.open_time {
                continue;
            }
        }
        candles.push(candle);
    }

    Ok(candles)
}

/// Decodes a JSON array of kline records and validates it
pub fn parse_klines_json(
    payload: &str,
    interval: Option<Interval>,
) -> Result<Vec<Candle>, ValidationError> {
    let records: Vec<RawKline> =
        serde_json::from_str(payload).map_err(|e| ValidationError::Malformed {
            message: e.to_string(),
        })?;
    candles_from_klines(&records, interval)
}
