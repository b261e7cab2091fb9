//! Trading signal definitions and summary statistics

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SignalType {
    Buy,
    Sell,
}

/// Rule that produced a signal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SignalRule {
    UpsideBreakout,
    DownsideBreakout,
    OversoldInRun,
    OverboughtInRun,
    StopLoss,
    TakeProfit,
    EndOfSeries,
}

impl SignalRule {
    /// Side the rule trades
    pub fn signal_type(&self) -> SignalType {
        match self {
            SignalRule::UpsideBreakout | SignalRule::OversoldInRun => SignalType::Buy,
            SignalRule::DownsideBreakout
            | SignalRule::OverboughtInRun
            | SignalRule::StopLoss
            | SignalRule::TakeProfit
            | SignalRule::EndOfSeries => SignalType::Sell,
        }
    }

    /// Rules that only fire while a consolidation run is active
    pub fn within_consolidation(&self) -> bool {
        matches!(
            self,
            SignalRule::UpsideBreakout
                | SignalRule::DownsideBreakout
                | SignalRule::OversoldInRun
                | SignalRule::OverboughtInRun
        )
    }
}

/// One emitted signal. Never mutated after emission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradingSignal {
    /// Open time of the candle that triggered the signal
    pub timestamp: i64,

    #[serde(rename = "type")]
    pub signal_type: SignalType,

    /// Heuristic score, nominally 0-100. Oversold/overbought signals can exceed 100.
    pub confidence: f64,

    /// Human-readable reason for signal
    pub reason: String,

    pub price: f64,

    /// Emitted while a consolidation run was active
    pub in_consolidation: bool,

    pub rule: SignalRule,
}

impl TradingSignal {
    /// Get signal strength based on confidence
    pub fn strength(&self) -> SignalStrength {
        match self.confidence {
            c if c >= 90.0 => SignalStrength::VeryStrong,
            c if c >= 80.0 => SignalStrength::Strong,
            c if c >= 70.0 => SignalStrength::Moderate,
            c if c >= 60.0 => SignalStrength::Weak,
            _ => SignalStrength::VeryWeak,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SignalStrength {
    VeryWeak,
    Weak,
    Moderate,
    Strong,
    VeryStrong,
}

/// Signal counts for a finished analysis
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignalSummary {
    pub buy_count: u64,
    pub sell_count: u64,
    /// Signals with confidence strictly above the high-confidence threshold
    pub high_confidence_count: u64,
    pub consolidation_signal_count: u64,
    pub average_confidence: f64,
}

impl SignalSummary {
    pub fn from_signals(signals: &[TradingSignal], high_confidence_threshold: f64) -> Self {
        let mut summary = Self::default();
        for signal in signals {
            summary.record_signal(signal, high_confidence_threshold);
        }
        summary
    }

    /// Update stats with a new signal
    pub fn record_signal(&mut self, signal: &TradingSignal, high_confidence_threshold: f64) {
        match signal.signal_type {
            SignalType::Buy => self.buy_count += 1,
            SignalType::Sell => self.sell_count += 1,
        }
        if signal.confidence > high_confidence_threshold {
            self.high_confidence_count += 1;
        }
        if signal.in_consolidation {
            self.consolidation_signal_count += 1;
        }

        // Update rolling average confidence
        let total = self.total_signals();
        let total_confidence = self.average_confidence * (total - 1) as f64 + signal.confidence;
        self.average_confidence = total_confidence / total as f64;
    }

    pub fn total_signals(&self) -> u64 {
        self.buy_count + self.sell_count
    }

    /// Share of signals emitted inside a consolidation run, in percent
    pub fn consolidation_share(&self) -> f64 {
        match self.total_signals() {
            0 => 0.0,
            total => self.consolidation_signal_count as f64 / total as f64 * 100.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signal(signal_type: SignalType, confidence: f64, in_consolidation: bool) -> TradingSignal {
        TradingSignal {
            timestamp: 0,
            signal_type,
            confidence,
            reason: "Test".to_string(),
            price: 100.0,
            in_consolidation,
            rule: SignalRule::UpsideBreakout,
        }
    }

    #[test]
    fn test_signal_strength() {
        assert_eq!(signal(SignalType::Buy, 95.0, true).strength(), SignalStrength::VeryStrong);
        assert_eq!(signal(SignalType::Buy, 85.0, true).strength(), SignalStrength::Strong);
        assert_eq!(signal(SignalType::Sell, 60.0, false).strength(), SignalStrength::Weak);
        assert_eq!(signal(SignalType::Sell, 50.0, false).strength(), SignalStrength::VeryWeak);
    }

    #[test]
    fn test_signal_summary() {
        let signals = vec![
            signal(SignalType::Buy, 80.0, true),
            signal(SignalType::Sell, 90.0, false),
            signal(SignalType::Buy, 100.0, true),
        ];
        let summary = SignalSummary::from_signals(&signals, 90.0);

        assert_eq!(summary.buy_count, 2);
        assert_eq!(summary.sell_count, 1);
        // 90 is not strictly above the threshold
        assert_eq!(summary.high_confidence_count, 1);
        assert_eq!(summary.consolidation_signal_count, 2);
        assert!((summary.average_confidence - 90.0).abs() < 1e-9);
        assert!((summary.consolidation_share() - 200.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_rule_sides() {
        assert_eq!(SignalRule::UpsideBreakout.signal_type(), SignalType::Buy);
        assert_eq!(SignalRule::OversoldInRun.signal_type(), SignalType::Buy);
        assert_eq!(SignalRule::DownsideBreakout.signal_type(), SignalType::Sell);
        assert_eq!(SignalRule::EndOfSeries.signal_type(), SignalType::Sell);

        assert!(SignalRule::OverboughtInRun.within_consolidation());
        assert!(!SignalRule::StopLoss.within_consolidation());
        assert!(!SignalRule::TakeProfit.within_consolidation());
        assert!(!SignalRule::EndOfSeries.within_consolidation());
    }

    #[test]
    fn test_empty_summary() {
        let summary = SignalSummary::from_signals(&[], 90.0);
        assert_eq!(summary, SignalSummary::default());
        assert_eq!(summary.consolidation_share(), 0.0);
    }

    #[test]
    fn test_wire_format() {
        let json = serde_json::to_value(signal(SignalType::Sell, 60.0, false)).unwrap();
        assert_eq!(json["type"], "SELL");
        assert_eq!(json["inConsolidation"], false);
        assert_eq!(json["rule"], "UPSIDE_BREAKOUT");

        let summary = serde_json::to_value(SignalSummary::default()).unwrap();
        assert_eq!(summary["buyCount"], 0);
        assert_eq!(summary["highConfidenceCount"], 0);
    }
}
