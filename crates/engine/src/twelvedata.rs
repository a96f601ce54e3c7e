use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use common::{Candle, Error, Instrument, QuoteProvider, Result};

/// REST client for the Twelve Data time-series endpoint.
///
/// One request per call, no retries. The monitor loop's next cycle is the
/// retry.
pub struct TwelveDataClient {
    base_url: Url,
    api_key: String,
    http: Client,
}

impl TwelveDataClient {
    pub fn new(base_url: &str, api_key: impl Into<String>, timeout: Duration) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| Error::Config(format!("invalid quote base URL '{base_url}': {e}")))?;
        let http = Client::builder()
            .use_rustls_tls()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Http(e.to_string()))?;

        Ok(Self {
            base_url,
            api_key: api_key.into(),
            http,
        })
    }

    fn time_series_url(&self) -> Result<Url> {
        self.base_url
            .join("time_series")
            .map_err(|e| Error::Config(e.to_string()))
    }
}

#[async_trait]
impl QuoteProvider for TwelveDataClient {
    async fn recent_candles(&self, instrument: &Instrument, count: usize) -> Result<Vec<Candle>> {
        let url = self.time_series_url()?;
        let outputsize = count.to_string();

        debug!(instrument = %instrument, count, "Requesting time series");
        let resp = self
            .http
            .get(url)
            .query(&[
                ("symbol", instrument.symbol()),
                ("interval", "1min"),
                ("outputsize", outputsize.as_str()),
                ("apikey", self.api_key.as_str()),
            ])
            .send()
            .await
            .map_err(|e| Error::Http(e.to_string()))?;

        let status = resp.status();
        let body = resp.text().await.map_err(|e| Error::Http(e.to_string()))?;

        let candles = parse_time_series(&body).map_err(|e| match e {
            Error::Provider(msg) if !status.is_success() => {
                Error::Provider(format!("HTTP {status}: {msg}"))
            }
            other => other,
        })?;

        if candles.len() < count {
            warn!(
                instrument = %instrument,
                received = candles.len(),
                requested = count,
                "Provider returned fewer candles than requested"
            );
        }
        Ok(candles)
    }
}

// ─── Response parsing ─────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct TimeSeriesResponse {
    values: Option<Vec<RawCandle>>,
    status: Option<String>,
    message: Option<String>,
}

#[derive(Deserialize)]
struct RawCandle {
    datetime: Option<String>,
    #[serde(default)]
    close: Value,
}

/// Parse a time-series body into oldest-first candles.
///
/// The provider lists newest first. A body without `values` is an error
/// carrying the provider's message when it sent one.
fn parse_time_series(body: &str) -> Result<Vec<Candle>> {
    let resp: TimeSeriesResponse = serde_json::from_str(body)?;

    let Some(values) = resp.values else {
        let reason = resp
            .message
            .or(resp.status)
            .unwrap_or_else(|| "response has no 'values' field".to_string());
        return Err(Error::Provider(reason));
    };

    Ok(values
        .into_iter()
        .rev()
        .map(|raw| Candle {
            datetime: raw.datetime,
            close: number_from_value(&raw.close),
        })
        .collect())
}

/// Prices arrive as JSON strings (`"1.08453"`) but numbers are accepted too.
fn number_from_value(value: &Value) -> Option<f64> {
    match value {
        Value::String(s) => s.trim().parse().ok(),
        Value::Number(n) => n.as_f64(),
        _ => None,
    }
}
