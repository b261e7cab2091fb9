//! Signal Engine Property Tests
//!
//! Properties that must hold for any candle path, whatever the market does.

use consolidation_signals::{
    rsi, Candle, ConsolidationSignalStrategy, SignalRule, SignalType,
};
use proptest::prelude::*;
use strategy_config::EngineConfig;

const MONDAY: i64 = 1_704_067_200_000;
const HOUR: i64 = 3_600_000;

/// Random walk with small steps so consolidation runs actually occur
fn candle_path() -> impl Strategy<Value = Vec<Candle>> {
    prop::collection::vec((-300i32..300, 0u32..200, 1u32..1_000), 0..250).prop_map(|steps| {
        let mut close = 100.0f64;
        steps
            .into_iter()
            .enumerate()
            .map(|(i, (step_bp, wick_bp, volume))| {
                let open = close;
                // mostly tiny moves with the occasional jump
                let step = if step_bp.abs() > 250 {
                    step_bp as f64 / 2_000.0
                } else {
                    step_bp as f64 / 100_000.0
                };
                close = (close * (1.0 + step)).max(0.01);
                let wick = close * wick_bp as f64 / 100_000.0;
                let open_time = MONDAY + i as i64 * HOUR;
                Candle {
                    open_time,
                    open,
                    high: open.max(close) + wick,
                    low: (open.min(close) - wick).max(0.0),
                    close,
                    volume: volume as f64,
                    close_time: open_time + HOUR - 1,
                }
            })
            .collect()
    })
}

fn config_strategy() -> impl Strategy<Value = EngineConfig> {
    (90.0f64..99.5, 0.1f64..1.5, 2usize..20, 2usize..8).prop_map(
        |(threshold, breakout, period, min_length)| EngineConfig {
            consolidation_threshold: threshold,
            breakout_percentage: breakout,
            rsi_period: period,
            min_consolidation_length: min_length,
            ..EngineConfig::default()
        },
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn prop_signals_alternate_starting_with_buy(
        candles in candle_path(),
        config in config_strategy(),
    ) {
        let strategy = ConsolidationSignalStrategy::new(config).unwrap();
        let (_, outcome) = strategy.signals(&candles);

        let mut expected = SignalType::Buy;
        for signal in &outcome.signals {
            prop_assert_eq!(signal.signal_type, expected);
            expected = match expected {
                SignalType::Buy => SignalType::Sell,
                SignalType::Sell => SignalType::Buy,
            };
        }
        // every position is closed by the end
        prop_assert_eq!(expected, SignalType::Buy);
    }

    #[test]
    fn prop_signals_are_chronological_and_bounded(
        candles in candle_path(),
        config in config_strategy(),
    ) {
        let cap = config.confidence.breakout_cap;
        let strategy = ConsolidationSignalStrategy::new(config).unwrap();
        let (_, outcome) = strategy.signals(&candles);

        for pair in outcome.signals.windows(2) {
            prop_assert!(pair[0].timestamp <= pair[1].timestamp);
        }
        for signal in &outcome.signals {
            prop_assert!(signal.confidence.is_finite());
            if matches!(signal.rule, SignalRule::UpsideBreakout | SignalRule::DownsideBreakout) {
                prop_assert!(signal.confidence <= cap);
            }
            prop_assert!(candles.iter().any(|c| c.open_time == signal.timestamp));
        }
        if let Some(end) = outcome.signals.iter().position(|s| s.rule == SignalRule::EndOfSeries) {
            prop_assert_eq!(end, outcome.signals.len() - 1);
        }
    }

    #[test]
    fn prop_analysis_is_idempotent(
        candles in candle_path(),
        config in config_strategy(),
    ) {
        let strategy = ConsolidationSignalStrategy::new(config.with_trace(true)).unwrap();
        let first = strategy.signals(&candles);
        let second = strategy.signals(&candles);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn prop_rsi_stays_in_bounds(
        closes in prop::collection::vec(0.01f64..10_000.0, 0..200),
        period in 1usize..30,
    ) {
        let values = rsi(&closes, period);
        prop_assert_eq!(values.len(), closes.len().saturating_sub(period));
        for value in values {
            prop_assert!((0.0..=100.0).contains(&value));
        }
    }

    #[test]
    fn prop_heatmap_counts_every_scored_candle(candles in candle_path()) {
        let strategy = ConsolidationSignalStrategy::new(EngineConfig::default()).unwrap();
        let result = strategy.consolidation(&candles);
        prop_assert_eq!(result.raw_data.len(), candles.len().saturating_sub(1));

        let samples: u32 = result.heatmap_samples.iter().flatten().sum();
        prop_assert_eq!(samples as usize, result.raw_data.len());
        for record in &result.raw_data {
            prop_assert!(record.consolidation_score <= 100.0);
        }
    }
}
