//! Breakout Scenario Tests
//!
//! Hand-built candle paths run through the full analyzer + engine with default parameters.

use consolidation_signals::{
    Candle, ConsolidationSignalStrategy, SignalRule, SignalType, TradingSignal,
};
use strategy_config::EngineConfig;

const MONDAY: i64 = 1_704_067_200_000;
const HOUR: i64 = 3_600_000;

/// Builds flat-bodied candles (high = low = close) so every score depends only on the
/// close-to-close move
fn path(closes: &[f64]) -> Vec<Candle> {
    closes
        .iter()
        .enumerate()
        .map(|(i, close)| {
            let open_time = MONDAY + i as i64 * HOUR;
            Candle {
                open_time,
                open: *close,
                high: *close,
                low: *close,
                close: *close,
                volume: 1.0,
                close_time: open_time + HOUR - 1,
            }
        })
        .collect()
}

/// 15 bars rising 2% (score 96, below the threshold) followed by 10 flat bars
fn warm_up_then_flat() -> Vec<f64> {
    let mut closes: Vec<f64> = (0..15).map(|i| 100.0 * 1.02f64.powi(i)).collect();
    let plateau = closes[14];
    closes.extend(std::iter::repeat(plateau).take(10));
    closes
}

fn signals(closes: &[f64]) -> Vec<TradingSignal> {
    let strategy = ConsolidationSignalStrategy::new(EngineConfig::default()).unwrap();
    let (_, outcome) = strategy.signals(&path(closes));
    outcome.signals
}

#[test]
fn test_breakout_after_flat_run_buys_once() {
    let mut closes = warm_up_then_flat();
    let breakout = closes[24] * 1.02;
    closes.push(breakout);

    let signals = signals(&closes);
    let buys: Vec<&TradingSignal> = signals
        .iter()
        .filter(|s| s.signal_type == SignalType::Buy)
        .collect();

    assert_eq!(buys.len(), 1);
    let buy = buys[0];
    assert_eq!(buy.rule, SignalRule::UpsideBreakout);
    assert_eq!(buy.timestamp, MONDAY + 25 * HOUR);
    assert_eq!(buy.price, breakout);
    assert!(buy.confidence <= 100.0);
    assert!(buy.in_consolidation);
    assert!(buy.reason.starts_with("upside breakout of consolidation range"));

    // still long after the last bar
    let last = signals.last().unwrap();
    assert_eq!(last.rule, SignalRule::EndOfSeries);
    assert_eq!(last.confidence, 50.0);
}

#[test]
fn test_stop_loss_after_drop() {
    let mut closes = warm_up_then_flat();
    let entry = closes[24] * 1.02;
    closes.push(entry);
    closes.push(entry * 0.94);

    let signals = signals(&closes);
    assert_eq!(signals.len(), 2);
    let exit = &signals[1];
    assert_eq!(exit.signal_type, SignalType::Sell);
    assert_eq!(exit.rule, SignalRule::StopLoss);
    assert_eq!(exit.confidence, 60.0);
    assert_eq!(exit.reason, "stop loss (down more than 5%)");
    assert!(!exit.in_consolidation);
}

#[test]
fn test_take_profit_after_rally() {
    let mut closes = warm_up_then_flat();
    let entry = closes[24] * 1.02;
    closes.push(entry);
    closes.push(entry * 1.11);

    let signals = signals(&closes);
    assert_eq!(signals.len(), 2);
    assert_eq!(signals[1].rule, SignalRule::TakeProfit);
    assert_eq!(signals[1].confidence, 75.0);
}

#[test]
fn test_small_moves_hold_position() {
    let mut closes = warm_up_then_flat();
    let entry = closes[24] * 1.02;
    closes.push(entry);
    // 3% down then 8% up: inside both exits, score too low to reopen a run
    closes.push(entry * 0.97);
    closes.push(entry * 1.08);

    let signals = signals(&closes);
    assert_eq!(signals.len(), 2);
    assert_eq!(signals[1].rule, SignalRule::EndOfSeries);
    assert_eq!(signals[1].timestamp, MONDAY + 27 * HOUR);
}

#[test]
fn test_trending_market_stays_silent() {
    let closes: Vec<f64> = (0..60).map(|i| 100.0 * 1.02f64.powi(i)).collect();
    assert!(signals(&closes).is_empty());
}

#[test]
fn test_api_preset_opens_runs_on_lower_scores() {
    // 1.9% steps score 96.2: above the preset threshold, below the default one
    let mut closes: Vec<f64> = (0..20).map(|i| 100.0 * 1.019f64.powi(i)).collect();
    let last = closes[19];
    closes.push(last * 1.05);

    let default_signals = signals(&closes);
    assert!(default_signals.is_empty());

    let strategy =
        ConsolidationSignalStrategy::new(EngineConfig::api_preset().with_trace(true)).unwrap();
    let (_, outcome) = strategy.signals(&path(&closes));
    assert!(!outcome.trace.is_empty());
}

#[test]
fn test_degenerate_inputs() {
    assert!(signals(&[]).is_empty());
    assert!(signals(&[100.0]).is_empty());
    assert!(signals(&[100.0; 14]).is_empty());
}
