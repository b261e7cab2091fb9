//! Momentum oscillator for breakout confirmation

/// Denominator floor used when the smoothed average loss is exactly zero
pub const DEFAULT_LOSS_EPSILON: f64 = 0.001;

/// Relative Strength Index with Wilder smoothing.
///
/// Unlike textbook RSI, an exactly-zero average loss is replaced by a small epsilon rather
/// than pinning the value to 100. A steadily rising series therefore approaches 100 without
/// reaching it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rsi {
    period: usize,
    loss_epsilon: f64,
}

impl Rsi {
    pub fn new(period: usize) -> Self {
        Self {
            period,
            loss_epsilon: DEFAULT_LOSS_EPSILON,
        }
    }

    pub fn with_loss_epsilon(mut self, loss_epsilon: f64) -> Self {
        self.loss_epsilon = loss_epsilon;
        self
    }

    pub fn period(&self) -> usize {
        self.period
    }

    /// Oscillator values for `closes`.
    ///
    /// The result has `closes.len() - period` entries; entry `k` belongs to candle index
    /// `period + k`. Fewer than `period + 1` closes (or a zero period) yield an empty vector.
    pub fn calculate(&self, closes: &[f64]) -> Vec<f64> {
        let period = self.period;
        if period == 0 || closes.len() < period + 1 {
            return Vec::new();
        }

        let mut values = Vec::with_capacity(closes.len() - period);
        let mut gains = 0.0;
        let mut losses = 0.0;

        for window in closes[..=period].windows(2) {
            let (gain, loss) = split_delta(window[1] - window[0]);
            gains += gain;
            losses += loss;
        }

        let n = period as f64;
        let mut avg_gain = gains / n;
        let mut avg_loss = losses / n;
        values.push(self.value(avg_gain, avg_loss));

        for window in closes[period..].windows(2) {
            let (gain, loss) = split_delta(window[1] - window[0]);
            avg_gain = (avg_gain * (n - 1.0) + gain) / n;
            avg_loss = (avg_loss * (n - 1.0) + loss) / n;
            values.push(self.value(avg_gain, avg_loss));
        }

        values
    }

    fn value(&self, avg_gain: f64, avg_loss: f64) -> f64 {
        let denominator = if avg_loss == 0.0 {
            self.loss_epsilon
        } else {
            avg_loss
        };
        let rs = avg_gain / denominator;
        100.0 - 100.0 / (1.0 + rs)
    }
}

fn split_delta(delta: f64) -> (f64, f64) {
    if delta >= 0.0 {
        (delta, 0.0)
    } else {
        (0.0, -delta)
    }
}

/// Convenience wrapper: RSI of `closes` with the default epsilon
pub fn rsi(closes: &[f64], period: usize) -> Vec<f64> {
    Rsi::new(period).calculate(closes)
}
