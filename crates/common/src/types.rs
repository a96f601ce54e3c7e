use std::fmt;

use serde::{Deserialize, Serialize};

/// Symbol of a monitored instrument, e.g. `EUR/USD` or `AAPL`.
///
/// Loaded once at startup and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Instrument(String);

impl Instrument {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self(symbol.into())
    }

    pub fn symbol(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Instrument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Instrument {
    fn from(symbol: &str) -> Self {
        Self::new(symbol)
    }
}

/// One-minute candle as returned by the quote provider.
///
/// Only the close is used. A close the provider sent as something other than
/// a number is kept as `None` so the signal engine can reject the series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    /// Provider-side timestamp of the candle open, as sent.
    pub datetime: Option<String>,
    pub close: Option<f64>,
}

impl Candle {
    pub fn from_close(close: f64) -> Self {
        Self {
            datetime: None,
            close: Some(close),
        }
    }
}

/// Moving-average crossover recommendation for one instrument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Signal {
    Buy,
    Sell,
    /// No actionable crossover, or not enough usable data.
    #[default]
    Neutral,
}

impl Signal {
    pub fn is_actionable(&self) -> bool {
        !matches!(self, Signal::Neutral)
    }

    /// Label shown to subscribers of the notification channel.
    pub fn label(&self) -> Option<&'static str> {
        match self {
            Signal::Buy => Some("COMPRA"),
            Signal::Sell => Some("VENDA"),
            Signal::Neutral => None,
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Signal::Buy => write!(f, "BUY"),
            Signal::Sell => write!(f, "SELL"),
            Signal::Neutral => write!(f, "NONE"),
        }
    }
}
