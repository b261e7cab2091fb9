//! Common market data types

pub mod candle;
pub mod errors;
pub mod interval;

pub use candle::{Candle, TimeSlot, DAYS_PER_WEEK, HOURS_PER_DAY};
pub use errors::ValidationError;
pub use interval::Interval;
