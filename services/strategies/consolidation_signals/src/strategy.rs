//! Analysis pipeline: candles in, heatmaps and signals out

use crate::consolidation::{ConsolidationAnalyzer, ConsolidationResult};
use crate::engine::{SignalEngine, SignalOutcome, TransitionEvent};
use crate::error::Result;
use crate::provider::{CandleProvider, CandleRequest};
use crate::signals::{SignalSummary, TradingSignal};
use serde::{Deserialize, Serialize};
use strategy_config::EngineConfig;
use tracing::{info, warn};
use types::Candle;

/// OHLC point echoed back for charting clients
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub timestamp: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

impl From<&Candle> for PricePoint {
    fn from(candle: &Candle) -> Self {
        Self {
            timestamp: candle.open_time,
            open: candle.open,
            high: candle.high,
            low: candle.low,
            close: candle.close,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignalReport {
    pub signals: Vec<TradingSignal>,
    pub price_data: Vec<PricePoint>,
    pub summary: SignalSummary,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub trace: Vec<TransitionEvent>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    pub symbol: String,
    pub interval: String,
    pub candle_count: usize,
    pub consolidation: ConsolidationResult,
    pub trading: SignalReport,
}

/// Stateless between calls; every analysis owns its scan state
#[derive(Debug, Clone)]
pub struct ConsolidationSignalStrategy {
    analyzer: ConsolidationAnalyzer,
    engine: SignalEngine,
}

impl ConsolidationSignalStrategy {
    pub fn new(config: EngineConfig) -> Result<Self> {
        Ok(Self {
            analyzer: ConsolidationAnalyzer::new(),
            engine: SignalEngine::new(config)?,
        })
    }

    pub fn engine(&self) -> &SignalEngine {
        &self.engine
    }

    /// Heatmaps only
    pub fn consolidation(&self, candles: &[Candle]) -> ConsolidationResult {
        self.analyzer.analyze(candles)
    }

    /// Heatmaps plus the signal pass fed with their per-candle scores
    pub fn signals(&self, candles: &[Candle]) -> (ConsolidationResult, SignalOutcome) {
        let consolidation = self.analyzer.analyze(candles);
        let scores = consolidation.score_series(candles.len());
        let outcome = self.engine.generate(candles, &scores);
        (consolidation, outcome)
    }

    pub fn analyze(&self, request: &CandleRequest, candles: &[Candle]) -> AnalysisReport {
        let (consolidation, outcome) = self.signals(candles);
        let summary =
            outcome.summary(self.engine.config().confidence.high_confidence_threshold);

        info!(
            "Analysis of {} {}: {} candles, {} buy / {} sell signals ({} high confidence)",
            request.symbol,
            request.interval,
            candles.len(),
            summary.buy_count,
            summary.sell_count,
            summary.high_confidence_count
        );

        AnalysisReport {
            symbol: request.symbol.clone(),
            interval: request.interval.to_string(),
            candle_count: candles.len(),
            consolidation,
            trading: SignalReport {
                signals: outcome.signals,
                price_data: candles.iter().map(PricePoint::from).collect(),
                summary,
                trace: outcome.trace,
            },
        }
    }

    /// Fetches the snapshot, then analyses it. A fetch failure aborts before any analysis.
    pub async fn run<P>(&self, provider: &P, request: &CandleRequest) -> Result<AnalysisReport>
    where
        P: CandleProvider + ?Sized,
    {
        info!(
            "Fetching {} days of {} {} candles via {}",
            request.lookback_days,
            request.symbol,
            request.interval,
            provider.name()
        );

        let candles = provider.fetch_candles(request).await?;
        if candles.len() <= self.engine.config().rsi_period {
            warn!(
                "Only {} candles available; no signals can be generated",
                candles.len()
            );
        }

        Ok(self.analyze(request, &candles))
    }
}
