//! Consolidation scoring and time-of-week heatmaps
//!
//! A candle's consolidation score is `100 - (volatility + 2 * price_change)` where
//! volatility is the candle's high/low spread and price change is the close-to-close move,
//! both in percent. Flat candles score 100; the score is unbounded below.

use serde::{Deserialize, Serialize};
use types::{Candle, DAYS_PER_WEEK, HOURS_PER_DAY};

/// Per-candle metrics behind the heatmap
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandleConsolidation {
    pub timestamp: i64,
    pub day_of_week: usize,
    pub hour_of_day: usize,
    pub consolidation_score: f64,
    pub volatility: f64,
    pub price_change: f64,
}

/// Heatmaps plus the per-candle series.
///
/// Means are 0 for slots without observations; `heatmap_samples` tells those apart from a
/// genuine average of 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsolidationResult {
    /// `[day_of_week][hour_of_day]`, Sunday = 0, UTC
    pub hourly_heatmap: [[f64; HOURS_PER_DAY]; DAYS_PER_WEEK],
    pub hour_of_day: [f64; HOURS_PER_DAY],
    pub day_of_week: [f64; DAYS_PER_WEEK],
    /// One record per candle from index 1 onwards
    pub raw_data: Vec<CandleConsolidation>,
    pub heatmap_samples: [[u32; HOURS_PER_DAY]; DAYS_PER_WEEK],
}

impl Default for ConsolidationResult {
    fn default() -> Self {
        Self {
            hourly_heatmap: [[0.0; HOURS_PER_DAY]; DAYS_PER_WEEK],
            hour_of_day: [0.0; HOURS_PER_DAY],
            day_of_week: [0.0; DAYS_PER_WEEK],
            raw_data: Vec::new(),
            heatmap_samples: [[0; HOURS_PER_DAY]; DAYS_PER_WEEK],
        }
    }
}

impl ConsolidationResult {
    /// Scores aligned to candle indices for a series of `candle_count` candles.
    ///
    /// Index 0 has no previous close and carries 0, as does any index without a record.
    pub fn score_series(&self, candle_count: usize) -> Vec<f64> {
        let mut scores = vec![0.0; candle_count];
        for (offset, record) in self.raw_data.iter().enumerate() {
            if let Some(slot) = scores.get_mut(offset + 1) {
                *slot = record.consolidation_score;
            }
        }
        scores
    }
}

/// `numerator / denominator * 100`, zero when the denominator is zero
fn percent_of(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator * 100.0
    }
}

/// Score, volatility and price change of `candle` relative to `prev_close`
pub fn consolidation_metrics(candle: &Candle, prev_close: f64) -> (f64, f64, f64) {
    let volatility = percent_of(candle.high - candle.low, candle.low);
    let price_change = percent_of((candle.close - prev_close).abs(), prev_close);
    let score = 100.0 - (volatility + price_change * 2.0);
    (score, volatility, price_change)
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ConsolidationAnalyzer;

impl ConsolidationAnalyzer {
    pub fn new() -> Self {
        Self
    }

    /// Scores every candle after the first and averages the scores per UTC time slot.
    /// Fewer than two candles produce an all-zero result.
    pub fn analyze(&self, candles: &[Candle]) -> ConsolidationResult {
        let mut result = ConsolidationResult::default();
        if candles.len() < 2 {
            return result;
        }

        let mut hour_samples = [0u32; HOURS_PER_DAY];
        let mut day_samples = [0u32; DAYS_PER_WEEK];
        result.raw_data.reserve(candles.len() - 1);

        for pair in candles.windows(2) {
            let (prev, candle) = (&pair[0], &pair[1]);
            let (score, volatility, price_change) = consolidation_metrics(candle, prev.close);
            let slot = candle.time_slot();
            let (day, hour) = (slot.day_of_week, slot.hour_of_day);

            result.hourly_heatmap[day][hour] += score;
            result.heatmap_samples[day][hour] += 1;
            result.hour_of_day[hour] += score;
            hour_samples[hour] += 1;
            result.day_of_week[day] += score;
            day_samples[day] += 1;

            result.raw_data.push(CandleConsolidation {
                timestamp: candle.open_time,
                day_of_week: day,
                hour_of_day: hour,
                consolidation_score: score,
                volatility,
                price_change,
            });
        }

        for day in 0..DAYS_PER_WEEK {
            for hour in 0..HOURS_PER_DAY {
                let samples = result.heatmap_samples[day][hour];
                if samples > 0 {
                    result.hourly_heatmap[day][hour] /= samples as f64;
                }
            }
            if day_samples[day] > 0 {
                result.day_of_week[day] /= day_samples[day] as f64;
            }
        }
        for hour in 0..HOURS_PER_DAY {
            if hour_samples[hour] > 0 {
                result.hour_of_day[hour] /= hour_samples[hour] as f64;
            }
        }

        result
    }
}
