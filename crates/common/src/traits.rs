use async_trait::async_trait;

use crate::{Candle, Instrument, Result};

/// Source of recent one-minute candles.
///
/// `TwelveDataClient` implements this against the live REST API. Every
/// request must carry a bounded timeout so one unresponsive call cannot stall
/// a monitor loop.
#[async_trait]
pub trait QuoteProvider: Send + Sync {
    /// Fetch at least `count` of the most recent candles, oldest first.
    ///
    /// An error or an empty vector both mean "no data this cycle".
    async fn recent_candles(&self, instrument: &Instrument, count: usize) -> Result<Vec<Candle>>;
}

/// Delivers a rendered message to the single configured destination.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, message: &str) -> Result<()>;
}

/// Operator-controlled switch gating all monitoring.
///
/// Read every cycle, never cached. Implementations report a failed read as
/// disabled rather than as an error.
#[async_trait]
pub trait EnableFlag: Send + Sync {
    async fn is_enabled(&self) -> bool;
}
