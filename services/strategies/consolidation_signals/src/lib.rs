//! # Consolidation Signals Strategy - Breakout Detection From Quiet Markets
//!
//! ## Purpose
//!
//! Finds when a market tends to go quiet and trades the moment it stops being quiet.
//! Every candle gets a consolidation score (100 = perfectly flat); scores are averaged into
//! UTC day-of-week / hour-of-day heatmaps, and the same scores drive a single-position
//! breakout state machine confirmed by RSI momentum.
//!
//! ## Architecture Role
//!
//! ```text
//! CandleProvider → [ConsolidationAnalyzer] → per-candle scores ─┐
//!       ↓                  ↓                                    ↓
//! Validated candles    Heatmaps (7×24, 24, 7)        [SignalEngine + RSI] → TradingSignals
//!                                                               ↓
//!                                                     AnalysisReport (camelCase JSON)
//! ```
//!
//! ## Signal Rules
//!
//! - **Entry**: upside breakout of a consolidation run with RSI above 50, or RSI oversold
//!   inside a run
//! - **Exit**: downside breakout with RSI below 50, RSI overbought inside a run, stop loss
//!   and take profit outside runs, and a synthetic close after the last candle
//! - **Invariant**: BUY and SELL strictly alternate, starting with BUY
//!
//! ## Examples
//!
//! ```rust
//! use consolidation_signals::ConsolidationSignalStrategy;
//! use strategy_config::EngineConfig;
//!
//! let strategy = ConsolidationSignalStrategy::new(EngineConfig::default()).unwrap();
//! let (heatmaps, outcome) = strategy.signals(&[]);
//! assert!(heatmaps.raw_data.is_empty());
//! assert!(outcome.signals.is_empty());
//! ```

pub mod consolidation;
pub mod engine;
pub mod error;
pub mod indicators;
pub mod provider;
pub mod signals;
pub mod strategy;

pub use consolidation::{CandleConsolidation, ConsolidationAnalyzer, ConsolidationResult};
pub use engine::{BreakoutDirection, SignalEngine, SignalOutcome, TransitionEvent, TransitionKind};
pub use error::{Result, StrategyError};
pub use indicators::{rsi, Rsi};
pub use provider::{CandleProvider, CandleRequest, JsonFileProvider, StaticProvider};
pub use signals::{SignalRule, SignalStrength, SignalSummary, SignalType, TradingSignal};
pub use strategy::{AnalysisReport, ConsolidationSignalStrategy, PricePoint, SignalReport};

/// Re-export candle types
pub use types::{Candle, Interval};
