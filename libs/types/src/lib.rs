//! # Market Data Types
//!
//! Shared candle types for the consolidation signal workspace.
//!
//! ## Design Philosophy
//!
//! - **Validated at the boundary**: exchange records become [`Candle`]s only through
//!   [`kline::candles_from_klines`], which checks every record or rejects the whole batch
//! - **One failure kind**: everything that can go wrong while ingesting candles is a
//!   [`ValidationError`]
//! - **UTC buckets**: [`TimeSlot`] derives day-of-week/hour-of-day straight from the
//!   timestamp, never from an assumed fixed candle spacing
//!
//! ## Quick Start
//!
//! ```rust
//! use types::{kline::parse_klines_json, Interval};
//!
//! let payload = r#"[{"openTime": 1704067200000, "open": "42000", "high": "42100",
//!                    "low": "41900", "close": "42050", "volume": "12.5"}]"#;
//! let candles = parse_klines_json(payload, Some(Interval::Hour1)).unwrap();
//! assert_eq!(candles[0].time_slot().day_of_week, 1); // Monday
//! ```

pub mod common;
pub mod kline;

pub use common::{Candle, Interval, TimeSlot, ValidationError, DAYS_PER_WEEK, HOURS_PER_DAY};
pub use kline::{candles_from_klines, parse_klines_json, RawKline, RawNumber};
