/// Simple moving average over the most recent `period` closes.
#[derive(Debug, Clone, Copy)]
pub struct SmaIndicator {
    pub period: usize,
}

impl SmaIndicator {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "SMA period must be >= 1");
        Self { period }
    }

    /// Compute the SMA from a slice of close prices (oldest first).
    /// Returns `None` if there are fewer than `period` values or the window
    /// contains a non-finite price.
    pub fn compute(&self, closes: &[f64]) -> Option<f64> {
        if closes.len() < self.period {
            return None;
        }

        let window = &closes[closes.len() - self.period..];
        if window.iter().any(|c| !c.is_finite()) {
            return None;
        }

        Some(window.iter().sum::<f64>() / self.period as f64)
    }
}
