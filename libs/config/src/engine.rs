//! Signal engine parameters
//!
//! Every threshold the engine consults lives here, including the heuristic constants
//! (exit multipliers, oscillator epsilon, confidence formula terms), so behaviour can be
//! tuned without touching control flow. Values are fixed once an engine is built.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Invalid parameter '{field}': {reason}")]
    InvalidParameter { field: &'static str, reason: String },
}

impl ConfigError {
    fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            field,
            reason: reason.into(),
        }
    }
}

/// Core engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Minimum consolidation score that opens a run
    pub consolidation_threshold: f64,

    /// Breakout margin beyond the run's range, percent of the range midpoint
    pub breakout_percentage: f64,

    pub rsi_overbought: f64,
    pub rsi_oversold: f64,
    pub rsi_period: usize,

    /// Runs shorter than this never emit signals
    pub min_consolidation_length: usize,

    /// Breakout volume must exceed the run's baseline volume times this factor
    pub volume_breakout_multiplier: f64,

    /// Substituted for an exactly-zero average loss in the oscillator
    pub rsi_loss_epsilon: f64,

    pub run: RunPolicy,
    pub exits: ExitPolicy,
    pub confidence: ConfidencePolicy,

    /// Collect per-step transition events alongside the signals
    pub collect_trace: bool,
}

/// Run lifecycle constants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunPolicy {
    /// A run whose close range exceeds this percent of its midpoint is abandoned...
    pub max_range_percent: f64,
    /// ...once it is longer than this many steps
    pub invalidation_min_length: usize,
    /// Trailing candles averaged for the volume baseline when a run opens
    pub volume_lookback: usize,
    /// Oscillator level separating bullish from bearish breakout confirmation
    pub momentum_midline: f64,
}

/// Position protection multipliers applied to the entry price
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExitPolicy {
    pub stop_loss_multiplier: f64,
    pub take_profit_multiplier: f64,
}

/// Terms of the heuristic confidence formulas
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfidencePolicy {
    /// Cap applied to breakout confidence
    pub breakout_cap: f64,
    pub volume_bonus: f64,
    /// Base for oversold/overbought signals inside a run (not capped)
    pub extreme_base: f64,
    pub stop_loss: f64,
    pub take_profit: f64,
    pub end_of_series: f64,
    /// Signals strictly above this count as high confidence in summaries
    pub high_confidence_threshold: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            consolidation_threshold: 97.0,
            breakout_percentage: 0.5,
            rsi_overbought: 70.0,
            rsi_oversold: 30.0,
            rsi_period: 14,
            min_consolidation_length: 5,
            volume_breakout_multiplier: 1.5,
            rsi_loss_epsilon: 0.001,
            run: RunPolicy::default(),
            exits: ExitPolicy::default(),
            confidence: ConfidencePolicy::default(),
            collect_trace: false,
        }
    }
}

impl Default for RunPolicy {
    fn default() -> Self {
        Self {
            max_range_percent: 3.0,
            invalidation_min_length: 3,
            volume_lookback: 10,
            momentum_midline: 50.0,
        }
    }
}

impl Default for ExitPolicy {
    fn default() -> Self {
        Self {
            stop_loss_multiplier: 0.95,
            take_profit_multiplier: 1.10,
        }
    }
}

impl Default for ConfidencePolicy {
    fn default() -> Self {
        Self {
            breakout_cap: 100.0,
            volume_bonus: 15.0,
            extreme_base: 80.0,
            stop_loss: 60.0,
            take_profit: 75.0,
            end_of_series: 50.0,
            high_confidence_threshold: 90.0,
        }
    }
}

impl EngineConfig {
    /// Preset served by the dashboard endpoints: looser threshold, wider breakout margin
    pub fn api_preset() -> Self {
        Self {
            consolidation_threshold: 96.0,
            breakout_percentage: 0.8,
            ..Self::default()
        }
    }

    pub fn with_trace(mut self, collect_trace: bool) -> Self {
        self.collect_trace = collect_trace;
        self
    }

    /// Rejects parameter combinations the engine cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        let finite = [
            ("consolidation_threshold", self.consolidation_threshold),
            ("breakout_percentage", self.breakout_percentage),
            ("rsi_overbought", self.rsi_overbought),
            ("rsi_oversold", self.rsi_oversold),
            ("volume_breakout_multiplier", self.volume_breakout_multiplier),
            ("rsi_loss_epsilon", self.rsi_loss_epsilon),
            ("run.max_range_percent", self.run.max_range_percent),
            ("run.momentum_midline", self.run.momentum_midline),
            ("exits.stop_loss_multiplier", self.exits.stop_loss_multiplier),
            ("exits.take_profit_multiplier", self.exits.take_profit_multiplier),
            ("confidence.breakout_cap", self.confidence.breakout_cap),
            ("confidence.volume_bonus", self.confidence.volume_bonus),
            ("confidence.extreme_base", self.confidence.extreme_base),
            ("confidence.stop_loss", self.confidence.stop_loss),
            ("confidence.take_profit", self.confidence.take_profit),
            ("confidence.end_of_series", self.confidence.end_of_series),
            (
                "confidence.high_confidence_threshold",
                self.confidence.high_confidence_threshold,
            ),
        ];
        for (field, value) in finite {
            if !value.is_finite() {
                return Err(ConfigError::invalid(field, format!("{value} is not finite")));
            }
        }

        if self.rsi_period == 0 {
            return Err(ConfigError::invalid("rsi_period", "must be at least 1"));
        }
        if self.rsi_oversold >= self.rsi_overbought {
            return Err(ConfigError::invalid(
                "rsi_oversold",
                format!(
                    "{} must be below rsi_overbought {}",
                    self.rsi_oversold, self.rsi_overbought
                ),
            ));
        }
        if self.breakout_percentage < 0.0 {
            return Err(ConfigError::invalid("breakout_percentage", "must not be negative"));
        }
        if self.volume_breakout_multiplier <= 0.0 {
            return Err(ConfigError::invalid(
                "volume_breakout_multiplier",
                "must be positive",
            ));
        }
        if self.rsi_loss_epsilon <= 0.0 {
            return Err(ConfigError::invalid("rsi_loss_epsilon", "must be positive"));
        }
        if self.run.volume_lookback == 0 {
            return Err(ConfigError::invalid("run.volume_lookback", "must be at least 1"));
        }
        if !(0.0..1.0).contains(&self.exits.stop_loss_multiplier) {
            return Err(ConfigError::invalid(
                "exits.stop_loss_multiplier",
                "must lie in [0, 1)",
            ));
        }
        if self.exits.take_profit_multiplier <= 1.0 {
            return Err(ConfigError::invalid(
                "exits.take_profit_multiplier",
                "must be above 1",
            ));
        }
        Ok(())
    }
}
