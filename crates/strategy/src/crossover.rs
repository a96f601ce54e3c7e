use tracing::debug;

use common::{Candle, Signal};

use crate::indicators::SmaIndicator;

/// Fast/slow simple-moving-average crossover.
///
/// BUY while the fast average sits above the slow one, SELL while below,
/// NONE on exact equality. Any series shorter than `min_candles`, or with a
/// missing or non-finite close anywhere in it, yields NONE.
#[derive(Debug, Clone, Copy)]
pub struct MaCrossover {
    pub fast: SmaIndicator,
    pub slow: SmaIndicator,
    pub min_candles: usize,
}

impl Default for MaCrossover {
    fn default() -> Self {
        Self::new(5, 10, 20)
    }
}

impl MaCrossover {
    pub fn new(fast: usize, slow: usize, min_candles: usize) -> Self {
        assert!(fast < slow, "fast period must be less than slow period");
        assert!(min_candles >= slow, "min_candles must cover the slow period");
        Self {
            fast: SmaIndicator::new(fast),
            slow: SmaIndicator::new(slow),
            min_candles,
        }
    }

    /// Evaluate a chronologically ordered (oldest first) candle series.
    pub fn evaluate(&self, candles: &[Candle]) -> Signal {
        if candles.len() < self.min_candles {
            return Signal::Neutral;
        }

        let closes: Option<Vec<f64>> = candles
            .iter()
            .map(|c| c.close.filter(|v| v.is_finite()))
            .collect();
        let Some(closes) = closes else {
            debug!("Unusable close in candle series");
            return Signal::Neutral;
        };

        let (Some(fast), Some(slow)) = (self.fast.compute(&closes), self.slow.compute(&closes))
        else {
            return Signal::Neutral;
        };
        debug!(ma_fast = fast, ma_slow = slow, "Moving averages");

        if fast > slow {
            Signal::Buy
        } else if fast < slow {
            Signal::Sell
        } else {
            Signal::Neutral
        }
    }
}

/// MA5/MA10 crossover over at least 20 candles.
pub fn compute_signal(candles: &[Candle]) -> Signal {
    MaCrossover::default().evaluate(candles)
}
