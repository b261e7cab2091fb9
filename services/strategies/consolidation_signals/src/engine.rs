//! Consolidation breakout signal engine
//!
//! A single forward pass over the candles. Each step may open a consolidation run (a
//! stretch of high consolidation scores), advance the run, close it on a breakout or when
//! its range drifts too wide, and manage one implicit long position with stop-loss and
//! take-profit exits. Every decision uses only the current and earlier candles.
//!
//! Per step, in order:
//! 1. open a run when flat and the score reaches the threshold
//! 2. advance an active run: the range absorbs the close and a too-wide range abandons the
//!    run for the rest of the step; otherwise a breakout beyond the range established
//!    before this candle ends it (emitting on momentum confirmation), and a run that holds
//!    may emit on oversold/overbought momentum
//! 3. outside a run, check stop loss then take profit on the open position
//!
//! Any position still open after the last candle is closed by a synthetic sell.
//!
//! The scan state lives in a [`ScanState`] value created per call, so one engine can serve
//! concurrent callers without locking.

use crate::indicators::Rsi;
use crate::signals::{SignalRule, SignalSummary, SignalType, TradingSignal};
use serde::{Deserialize, Serialize};
use strategy_config::{ConfigError, EngineConfig};
use tracing::debug;
use types::Candle;

/// State transition recorded when tracing is enabled
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransitionEvent {
    pub index: usize,
    pub timestamp: i64,
    pub kind: TransitionKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum TransitionKind {
    #[serde(rename_all = "camelCase")]
    RunStarted {
        price: f64,
        score: f64,
        avg_volume: f64,
    },
    #[serde(rename_all = "camelCase")]
    RunInvalidated { range_percent: f64, length: usize },
    #[serde(rename_all = "camelCase")]
    RunBrokenOut {
        direction: BreakoutDirection,
        length: usize,
        confirmed: bool,
    },
    #[serde(rename_all = "camelCase")]
    SignalEmitted {
        signal_type: SignalType,
        rule: SignalRule,
        confidence: f64,
        price: f64,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BreakoutDirection {
    Up,
    Down,
}

/// Result of one engine pass
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SignalOutcome {
    /// Chronological by construction
    pub signals: Vec<TradingSignal>,
    /// Empty unless `collect_trace` is set
    pub trace: Vec<TransitionEvent>,
}

impl SignalOutcome {
    pub fn summary(&self, high_confidence_threshold: f64) -> SignalSummary {
        SignalSummary::from_signals(&self.signals, high_confidence_threshold)
    }
}

/// Active low-volatility episode
#[derive(Debug, Clone, Copy, PartialEq)]
struct ConsolidationRun {
    length: usize,
    highest_price: f64,
    lowest_price: f64,
    avg_volume_at_start: f64,
}

impl ConsolidationRun {
    fn open(price: f64, avg_volume_at_start: f64) -> Self {
        Self {
            length: 1,
            highest_price: price,
            lowest_price: price,
            avg_volume_at_start,
        }
    }

    fn midpoint(&self) -> f64 {
        (self.highest_price + self.lowest_price) / 2.0
    }

    fn range_percent(&self) -> f64 {
        let midpoint = self.midpoint();
        if midpoint == 0.0 {
            0.0
        } else {
            (self.highest_price - self.lowest_price) / midpoint * 100.0
        }
    }
}

/// Open long position
#[derive(Debug, Clone, Copy, PartialEq)]
struct Position {
    entry_price: f64,
}

/// Everything carried from one step to the next
#[derive(Debug, Clone, Default)]
struct ScanState {
    run: Option<ConsolidationRun>,
    position: Option<Position>,
    signals: Vec<TradingSignal>,
    trace: Vec<TransitionEvent>,
}

/// Inputs of the candle under evaluation
#[derive(Debug, Clone, Copy)]
struct Bar {
    index: usize,
    timestamp: i64,
    price: f64,
    volume: f64,
    score: f64,
    rsi: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RunStep {
    Continue,
    Invalidated,
}

#[derive(Debug, Clone)]
pub struct SignalEngine {
    config: EngineConfig,
    rsi: Rsi,
}

impl SignalEngine {
    pub fn new(config: EngineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let rsi = Rsi::new(config.rsi_period).with_loss_epsilon(config.rsi_loss_epsilon);
        Ok(Self { config, rsi })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Oscillator series the engine evaluates `candles` against
    pub fn oscillator(&self, candles: &[Candle]) -> Vec<f64> {
        let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();
        self.rsi.calculate(&closes)
    }

    /// Runs the pass with the engine's own oscillator.
    ///
    /// `scores[i]` is the consolidation score of `candles[i]`; missing or non-finite scores
    /// count as 0.
    pub fn generate(&self, candles: &[Candle], scores: &[f64]) -> SignalOutcome {
        let oscillator = self.oscillator(candles);
        self.evaluate(candles, scores, &oscillator)
    }

    /// Runs the pass with a caller-supplied oscillator whose entry `k` belongs to candle
    /// `rsi_period + k`. The pass stops early if the oscillator runs out.
    pub fn evaluate(
        &self,
        candles: &[Candle],
        scores: &[f64],
        oscillator: &[f64],
    ) -> SignalOutcome {
        let period = self.config.rsi_period;
        if candles.len() <= period {
            return SignalOutcome::default();
        }

        let mut state = ScanState::default();
        for index in period..candles.len() {
            let Some(&rsi) = oscillator.get(index - period) else {
                break;
            };
            let candle = &candles[index];
            let bar = Bar {
                index,
                timestamp: candle.open_time,
                price: candle.close,
                volume: candle.volume,
                score: scores
                    .get(index)
                    .copied()
                    .filter(|s| s.is_finite())
                    .unwrap_or(0.0),
                rsi,
            };
            self.step(&mut state, candles, bar);
        }

        if state.position.is_some() {
            if let Some(last) = candles.last() {
                let bar = Bar {
                    index: candles.len() - 1,
                    timestamp: last.open_time,
                    price: last.close,
                    volume: last.volume,
                    score: 0.0,
                    rsi: 0.0,
                };
                self.emit(
                    &mut state,
                    &bar,
                    SignalRule::EndOfSeries,
                    self.config.confidence.end_of_series,
                    "closed at end of analysis".to_string(),
                );
            }
        }

        debug!(
            "Signal pass finished: {} candles, {} signals",
            candles.len(),
            state.signals.len()
        );

        SignalOutcome {
            signals: state.signals,
            trace: state.trace,
        }
    }

    fn step(&self, state: &mut ScanState, candles: &[Candle], bar: Bar) {
        if state.run.is_none() && bar.score >= self.config.consolidation_threshold {
            let avg_volume =
                trailing_mean_volume(candles, bar.index, self.config.run.volume_lookback);
            state.run = Some(ConsolidationRun::open(bar.price, avg_volume));
            self.record(
                state,
                &bar,
                TransitionKind::RunStarted {
                    price: bar.price,
                    score: bar.score,
                    avg_volume,
                },
            );
        }

        if state.run.is_some() && self.advance_run(state, &bar) == RunStep::Invalidated {
            return;
        }

        if state.run.is_none() {
            self.protect_position(state, &bar);
        }
    }

    fn advance_run(&self, state: &mut ScanState, bar: &Bar) -> RunStep {
        let Some(mut run) = state.run else {
            return RunStep::Continue;
        };
        let config = &self.config;
        let midline = config.run.momentum_midline;

        run.length += 1;
        let valid_run = run.length >= config.min_consolidation_length;

        // breakouts are measured against the range known before this candle
        let previous = run;
        let breakout_threshold = previous.midpoint() * config.breakout_percentage / 100.0;

        run.highest_price = run.highest_price.max(bar.price);
        run.lowest_price = run.lowest_price.min(bar.price);

        let range_percent = run.range_percent();
        if range_percent > config.run.max_range_percent
            && run.length > config.run.invalidation_min_length
        {
            state.run = None;
            self.record(
                state,
                bar,
                TransitionKind::RunInvalidated {
                    range_percent,
                    length: run.length,
                },
            );
            return RunStep::Invalidated;
        }

        let volume_confirmed =
            bar.volume > run.avg_volume_at_start * config.volume_breakout_multiplier;
        let volume_bonus = if volume_confirmed {
            config.confidence.volume_bonus
        } else {
            0.0
        };
        let volume_note = if volume_confirmed { " + volume surge" } else { "" };

        if bar.price > previous.highest_price + breakout_threshold {
            let confirmed = bar.rsi > midline && state.position.is_none() && valid_run;
            state.run = None;
            self.record(
                state,
                bar,
                TransitionKind::RunBrokenOut {
                    direction: BreakoutDirection::Up,
                    length: run.length,
                    confirmed,
                },
            );
            if confirmed {
                let confidence = (bar.score + (bar.rsi - midline) + volume_bonus)
                    .min(config.confidence.breakout_cap);
                self.emit(
                    state,
                    bar,
                    SignalRule::UpsideBreakout,
                    confidence,
                    format!(
                        "upside breakout of consolidation range + RSI confirmation ({:.2}){}",
                        bar.rsi, volume_note
                    ),
                );
            }
            return RunStep::Continue;
        }

        if bar.price < previous.lowest_price - breakout_threshold {
            let confirmed = bar.rsi < midline && state.position.is_some() && valid_run;
            state.run = None;
            self.record(
                state,
                bar,
                TransitionKind::RunBrokenOut {
                    direction: BreakoutDirection::Down,
                    length: run.length,
                    confirmed,
                },
            );
            if confirmed {
                let confidence = (bar.score + (midline - bar.rsi) + volume_bonus)
                    .min(config.confidence.breakout_cap);
                self.emit(
                    state,
                    bar,
                    SignalRule::DownsideBreakout,
                    confidence,
                    format!(
                        "downside breakout of consolidation range + RSI confirmation ({:.2}){}",
                        bar.rsi, volume_note
                    ),
                );
            }
            return RunStep::Continue;
        }

        state.run = Some(run);

        if valid_run {
            if bar.rsi <= config.rsi_oversold && state.position.is_none() {
                self.emit(
                    state,
                    bar,
                    SignalRule::OversoldInRun,
                    config.confidence.extreme_base + (config.rsi_oversold - bar.rsi),
                    format!("RSI oversold within consolidation ({:.2})", bar.rsi),
                );
            } else if bar.rsi >= config.rsi_overbought && state.position.is_some() {
                self.emit(
                    state,
                    bar,
                    SignalRule::OverboughtInRun,
                    config.confidence.extreme_base + (bar.rsi - config.rsi_overbought),
                    format!("RSI overbought within consolidation ({:.2})", bar.rsi),
                );
            }
        }

        RunStep::Continue
    }

    fn protect_position(&self, state: &mut ScanState, bar: &Bar) {
        let Some(position) = state.position else {
            return;
        };
        let exits = &self.config.exits;

        if bar.price < position.entry_price * exits.stop_loss_multiplier {
            self.emit(
                state,
                bar,
                SignalRule::StopLoss,
                self.config.confidence.stop_loss,
                format!(
                    "stop loss (down more than {}%)",
                    format_percent((1.0 - exits.stop_loss_multiplier) * 100.0)
                ),
            );
        } else if bar.price > position.entry_price * exits.take_profit_multiplier {
            self.emit(
                state,
                bar,
                SignalRule::TakeProfit,
                self.config.confidence.take_profit,
                format!(
                    "take profit (up more than {}%)",
                    format_percent((exits.take_profit_multiplier - 1.0) * 100.0)
                ),
            );
        }
    }

    fn emit(
        &self,
        state: &mut ScanState,
        bar: &Bar,
        rule: SignalRule,
        confidence: f64,
        reason: String,
    ) {
        let signal_type = rule.signal_type();
        match signal_type {
            SignalType::Buy => {
                state.position = Some(Position {
                    entry_price: bar.price,
                })
            }
            SignalType::Sell => state.position = None,
        }

        self.record(
            state,
            bar,
            TransitionKind::SignalEmitted {
                signal_type,
                rule,
                confidence,
                price: bar.price,
            },
        );

        state.signals.push(TradingSignal {
            timestamp: bar.timestamp,
            signal_type,
            confidence,
            reason,
            price: bar.price,
            in_consolidation: rule.within_consolidation(),
            rule,
        });
    }

    fn record(&self, state: &mut ScanState, bar: &Bar, kind: TransitionKind) {
        debug!(index = bar.index, timestamp = bar.timestamp, ?kind, "engine transition");
        if self.config.collect_trace {
            state.trace.push(TransitionEvent {
                index: bar.index,
                timestamp: bar.timestamp,
                kind,
            });
        }
    }
}

/// Mean volume over the last `lookback` candles ending at `index` (fewer near the start)
fn trailing_mean_volume(candles: &[Candle], index: usize, lookback: usize) -> f64 {
    let start = (index + 1).saturating_sub(lookback);
    let window = &candles[start..=index];
    if window.is_empty() {
        return 0.0;
    }
    window.iter().map(|c| c.volume).sum::<f64>() / window.len() as f64
}

/// Percent with trailing zeros trimmed: 5.000000000000004 -> "5", 2.5 -> "2.5"
fn format_percent(value: f64) -> String {
    let text = format!("{:.2}", value);
    text.trim_end_matches('0').trim_end_matches('.').to_string()
}
