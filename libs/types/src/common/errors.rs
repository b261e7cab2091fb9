//! Error types for candle ingestion
//!
//! Every failure at the candle boundary surfaces as a [`ValidationError`]. Callers get one
//! error kind to match on; the variant carries the record index and the offending value so
//! the message is actionable without leaking parser internals.

use thiserror::Error;

/// Validation failures raised while turning exchange records into [`crate::Candle`]s
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    /// Payload could not be decoded as a list of kline records
    #[error("Malformed kline payload: {message}")]
    Malformed { message: String },

    /// Numeric field is not a finite decimal
    #[error("Record {index}: field '{field}' is not a valid decimal: '{input}'")]
    InvalidNumber {
        index: usize,
        field: &'static str,
        input: String,
    },

    /// Prices and volume must be non-negative
    #[error("Record {index}: field '{field}' is negative ({value})")]
    Negative {
        index: usize,
        field: &'static str,
        value: f64,
    },

    /// low <= {open, close} <= high does not hold
    #[error(
        "Record {index}: low {low} and high {high} do not bracket open {open} and close {close}"
    )]
    PriceEnvelope {
        index: usize,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
    },

    /// Timestamp cannot be represented as a UTC date
    #[error("Record {index}: timestamp {timestamp} is out of range")]
    TimestampOutOfRange { index: usize, timestamp: i64 },

    /// Close time precedes open time
    #[error("Record {index}: close time {close_time} precedes open time {open_time}")]
    CloseBeforeOpen {
        index: usize,
        open_time: i64,
        close_time: i64,
    },

    /// Records must arrive in ascending open-time order
    #[error("Record {index}: open time {current} precedes previous open time {previous}")]
    OutOfOrder {
        index: usize,
        previous: i64,
        current: i64,
    },

    /// Interval string is not one of the supported candle widths
    #[error("Unsupported interval: {interval}")]
    UnsupportedInterval { interval: String },
}

impl ValidationError {
    /// Index of the offending record, when the failure is tied to one
    pub fn record_index(&self) -> Option<usize> {
        match self {
            Self::InvalidNumber { index, .. }
            | Self::Negative { index, .. }
            | Self::PriceEnvelope { index, .. }
            | Self::TimestampOutOfRange { index, .. }
            | Self::CloseBeforeOpen { index, .. }
            | Self::OutOfOrder { index, .. } => Some(*index),
            Self::Malformed { .. } | Self::UnsupportedInterval { .. } => None,
        }
    }
}
