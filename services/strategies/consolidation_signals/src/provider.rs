//! Candle acquisition
//!
//! Providers hand the pipeline an ascending, deduplicated candle snapshot. Fetching finishes
//! (or fails) before any analysis starts.

use crate::error::{Result, StrategyError};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use strategy_config::{clamp_lookback_days, ServiceSettings};
use tracing::{debug, info};
use types::{parse_klines_json, Candle, Interval};

const MILLIS_PER_DAY: i64 = 86_400_000;

/// What to fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandleRequest {
    pub symbol: String,
    pub interval: Interval,
    /// Already clamped into the supported window
    pub lookback_days: u32,
}

impl CandleRequest {
    pub fn new(symbol: impl Into<String>, interval: Interval, lookback_days: Option<u32>) -> Self {
        Self {
            symbol: symbol.into(),
            interval,
            lookback_days: clamp_lookback_days(lookback_days),
        }
    }

    pub fn from_settings(settings: &ServiceSettings) -> Self {
        Self::new(
            settings.symbol.clone(),
            settings.interval,
            Some(settings.lookback_days),
        )
    }

    pub fn lookback_millis(&self) -> i64 {
        i64::from(self.lookback_days) * MILLIS_PER_DAY
    }
}

#[async_trait]
pub trait CandleProvider: Send + Sync {
    /// Provider name for logs
    fn name(&self) -> &str;

    async fn fetch_candles(&self, request: &CandleRequest) -> Result<Vec<Candle>>;
}

/// Keeps the candles whose open time lies within the lookback window ending at the last
/// candle's open time
pub fn trim_to_lookback(candles: Vec<Candle>, lookback_millis: i64) -> Vec<Candle> {
    let Some(last) = candles.last() else {
        return candles;
    };
    let cutoff = last.open_time.saturating_sub(lookback_millis);
    let first_kept = candles.partition_point(|c| c.open_time < cutoff);
    if first_kept == 0 {
        candles
    } else {
        candles[first_kept..].to_vec()
    }
}

/// Reads a JSON array of exchange kline records from disk
#[derive(Debug, Clone)]
pub struct JsonFileProvider {
    path: PathBuf,
}

impl JsonFileProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl CandleProvider for JsonFileProvider {
    fn name(&self) -> &str {
        "json_file"
    }

    async fn fetch_candles(&self, request: &CandleRequest) -> Result<Vec<Candle>> {
        info!(
            "Loading {} {} candles from {:?}",
            request.symbol, request.interval, self.path
        );

        let payload = tokio::fs::read_to_string(&self.path).await?;
        let candles = parse_klines_json(&payload, Some(request.interval))?;
        let total = candles.len();
        let candles = trim_to_lookback(candles, request.lookback_millis());

        debug!(
            "Kept {} of {} candles inside the {}-day lookback",
            candles.len(),
            total,
            request.lookback_days
        );

        Ok(candles)
    }
}

/// Serves a fixed, already validated snapshot
#[derive(Debug, Clone, Default)]
pub struct StaticProvider {
    candles: Vec<Candle>,
}

impl StaticProvider {
    /// Rejects snapshots that are not strictly ascending by open time
    pub fn new(candles: Vec<Candle>) -> Result<Self> {
        if let Some(index) = candles
            .windows(2)
            .position(|pair| pair[1].open_time <= pair[0].open_time)
        {
            return Err(StrategyError::MarketData {
                message: format!(
                    "candle {} does not follow its predecessor in time",
                    index + 1
                ),
            });
        }
        Ok(Self { candles })
    }

    pub fn len(&self) -> usize {
        self.candles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }
}

#[async_trait]
impl CandleProvider for StaticProvider {
    fn name(&self) -> &str {
        "static"
    }

    async fn fetch_candles(&self, request: &CandleRequest) -> Result<Vec<Candle>> {
        Ok(trim_to_lookback(
            self.candles.clone(),
            request.lookback_millis(),
        ))
    }
}
