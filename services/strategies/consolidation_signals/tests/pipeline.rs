//! End-to-end pipeline tests: kline file on disk to JSON report

use consolidation_signals::{
    CandleProvider, CandleRequest, ConsolidationSignalStrategy, Interval, JsonFileProvider,
    SignalRule, StrategyError,
};
use serde_json::{json, Value};
use std::io::Write;
use std::sync::Arc;
use strategy_config::EngineConfig;
use tempfile::NamedTempFile;

const MONDAY: i64 = 1_704_067_200_000;
const HOUR: i64 = 3_600_000;

/// Warm-up rally, flat plateau, breakout bar, then a slide through the stop loss
fn kline_file() -> NamedTempFile {
    let mut closes: Vec<f64> = (0..15).map(|i| 100.0 * 1.02f64.powi(i)).collect();
    let plateau = closes[14];
    closes.extend(std::iter::repeat(plateau).take(10));
    closes.push(plateau * 1.02);
    closes.push(plateau * 1.02 * 0.94);

    let records: Vec<Value> = closes
        .iter()
        .enumerate()
        .map(|(i, close)| {
            let price = format!("{:.8}", close);
            json!({
                "openTime": MONDAY + i as i64 * HOUR,
                "open": price,
                "high": price,
                "low": price,
                "close": price,
                "volume": "10.0",
                "closeTime": MONDAY + (i as i64 + 1) * HOUR - 1,
                "trades": 120
            })
        })
        .collect();

    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{}", Value::Array(records)).unwrap();
    file
}

#[tokio::test]
async fn test_report_from_kline_file() {
    let file = kline_file();
    let provider = JsonFileProvider::new(file.path());
    let request = CandleRequest::new("BTCUSDT", Interval::Hour1, Some(30));
    let strategy = ConsolidationSignalStrategy::new(EngineConfig::default()).unwrap();

    let report = strategy.run(&provider, &request).await.unwrap();

    assert_eq!(report.candle_count, 27);
    let rules: Vec<SignalRule> = report.trading.signals.iter().map(|s| s.rule).collect();
    assert_eq!(rules, vec![SignalRule::UpsideBreakout, SignalRule::StopLoss]);
    assert_eq!(report.trading.summary.buy_count, 1);
    assert_eq!(report.trading.summary.sell_count, 1);
    assert_eq!(report.trading.summary.consolidation_signal_count, 1);

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["trading"]["signals"][0]["type"], "BUY");
    assert_eq!(json["trading"]["signals"][1]["confidence"], 60.0);
    assert_eq!(json["trading"]["priceData"].as_array().unwrap().len(), 27);
    assert_eq!(json["consolidation"]["hourOfDay"].as_array().unwrap().len(), 24);
    assert_eq!(json["consolidation"]["dayOfWeek"].as_array().unwrap().len(), 7);
    assert_eq!(json["consolidation"]["rawData"].as_array().unwrap().len(), 26);
}

#[tokio::test]
async fn test_lookback_trims_old_candles() {
    let file = kline_file();
    let provider = JsonFileProvider::new(file.path());
    // 27 hourly candles span just over a day; a 7-day window keeps them all
    let request = CandleRequest::new("BTCUSDT", Interval::Hour1, Some(7));
    let candles = provider.fetch_candles(&request).await.unwrap();
    assert_eq!(candles.len(), 27);
}

#[tokio::test]
async fn test_trace_is_reported_when_enabled() {
    let file = kline_file();
    let provider = JsonFileProvider::new(file.path());
    let request = CandleRequest::new("BTCUSDT", Interval::Hour1, None);
    let strategy =
        ConsolidationSignalStrategy::new(EngineConfig::default().with_trace(true)).unwrap();

    let report = strategy.run(&provider, &request).await.unwrap();
    let json = serde_json::to_value(&report).unwrap();
    let trace = json["trading"]["trace"].as_array().unwrap();
    assert_eq!(trace[0]["kind"]["event"], "runStarted");
    assert_eq!(trace[0]["index"], 15);
}

#[tokio::test]
async fn test_validation_failure_aborts_analysis() {
    let mut file = NamedTempFile::new().unwrap();
    write!(
        file,
        r#"[{{"openTime": 1704067200000, "open": "1", "high": "1", "low": "1", "close": "1", "volume": "1"}},
            {{"openTime": 1704063600000, "open": "1", "high": "1", "low": "1", "close": "1", "volume": "1"}}]"#
    )
    .unwrap();

    let provider = JsonFileProvider::new(file.path());
    let request = CandleRequest::new("BTCUSDT", Interval::Hour1, None);
    let strategy = ConsolidationSignalStrategy::new(EngineConfig::default()).unwrap();

    let err = strategy.run(&provider, &request).await.unwrap_err();
    match err {
        StrategyError::Validation(inner) => assert_eq!(inner.record_index(), Some(1)),
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_concurrent_analyses_are_independent() {
    let file = kline_file();
    let strategy =
        Arc::new(ConsolidationSignalStrategy::new(EngineConfig::default()).unwrap());
    let path = file.path().to_path_buf();

    let mut handles = Vec::new();
    for _ in 0..8 {
        let strategy = Arc::clone(&strategy);
        let provider = JsonFileProvider::new(path.clone());
        handles.push(tokio::spawn(async move {
            let request = CandleRequest::new("BTCUSDT", Interval::Hour1, None);
            strategy.run(&provider, &request).await
        }));
    }

    let mut reports = Vec::new();
    for handle in handles {
        reports.push(handle.await.unwrap().unwrap());
    }
    for report in &reports[1..] {
        assert_eq!(report, &reports[0]);
    }
}
