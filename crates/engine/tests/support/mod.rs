#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use tokio::sync::mpsc;

use common::{Candle, EnableFlag, Error, Instrument, Notifier, QuoteProvider, Result};
use engine::{Clock, MonitorDeps};

/// Clock whose `sleep` advances virtual time instantly.
pub struct VirtualClock {
    now: Mutex<DateTime<Utc>>,
    sleeps: Mutex<Vec<Duration>>,
}

impl VirtualClock {
    /// 2024-05-02 13:00:00 UTC, i.e. 10:00:00 in Sao Paulo.
    pub fn new() -> Self {
        Self::starting_at(Utc.with_ymd_and_hms(2024, 5, 2, 13, 0, 0).unwrap())
    }

    pub fn starting_at(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now),
            sleeps: Mutex::new(Vec::new()),
        }
    }

    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.lock().unwrap().clone()
    }
}

#[async_trait]
impl Clock for VirtualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }

    async fn sleep(&self, duration: Duration) {
        {
            let mut now = self.now.lock().unwrap();
            *now += chrono::TimeDelta::from_std(duration).unwrap();
            self.sleeps.lock().unwrap().push(duration);
        }
        // Let other tasks on the runtime make progress
        tokio::task::yield_now().await;
    }
}

/// Hands out scripted responses in order, then empty results forever.
#[derive(Default)]
pub struct ScriptedQuotes {
    script: Mutex<VecDeque<Result<Vec<Candle>>>>,
    calls: AtomicUsize,
}

impl ScriptedQuotes {
    pub fn new(script: Vec<Result<Vec<Candle>>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl QuoteProvider for ScriptedQuotes {
    async fn recent_candles(&self, _instrument: &Instrument, _count: usize) -> Result<Vec<Candle>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(Vec::new()))
    }
}

/// Returns the same series for a symbol on every call.
pub struct FixedQuotes {
    series: HashMap<String, Vec<Candle>>,
}

impl FixedQuotes {
    pub fn new(series: Vec<(&str, Vec<Candle>)>) -> Self {
        Self {
            series: series.into_iter().map(|(s, c)| (s.to_string(), c)).collect(),
        }
    }
}

#[async_trait]
impl QuoteProvider for FixedQuotes {
    async fn recent_candles(&self, instrument: &Instrument, _count: usize) -> Result<Vec<Candle>> {
        self.series
            .get(instrument.symbol())
            .cloned()
            .ok_or_else(|| Error::Provider(format!("unknown symbol {instrument}")))
    }
}

/// Records every message; optionally fails every delivery.
pub struct RecordingNotifier {
    sent: Mutex<Vec<String>>,
    fail: bool,
    tx: Option<mpsc::UnboundedSender<String>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self { sent: Mutex::new(Vec::new()), fail: false, tx: None }
    }

    pub fn failing() -> Self {
        Self { fail: true, ..Self::new() }
    }

    pub fn with_channel(tx: mpsc::UnboundedSender<String>) -> Self {
        Self { tx: Some(tx), ..Self::new() }
    }

    pub fn sent(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, message: &str) -> Result<()> {
        self.sent.lock().unwrap().push(message.to_string());
        if let Some(tx) = &self.tx {
            let _ = tx.send(message.to_string());
        }
        if self.fail {
            return Err(Error::Telegram("chat not found".into()));
        }
        Ok(())
    }
}

pub struct StaticFlag(AtomicBool);

impl StaticFlag {
    pub fn new(enabled: bool) -> Self {
        Self(AtomicBool::new(enabled))
    }

    pub fn set(&self, enabled: bool) {
        self.0.store(enabled, Ordering::SeqCst);
    }
}

#[async_trait]
impl EnableFlag for StaticFlag {
    async fn is_enabled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

pub fn deps(
    quotes: Arc<dyn QuoteProvider>,
    notifier: Arc<dyn Notifier>,
    flag: Arc<dyn EnableFlag>,
    clock: Arc<dyn Clock>,
) -> MonitorDeps {
    MonitorDeps { quotes, notifier, flag, clock }
}

pub fn rising() -> Vec<Candle> {
    (0..20).map(|i| Candle::from_close(1.0800 + i as f64 * 0.0001)).collect()
}

pub fn falling() -> Vec<Candle> {
    (0..20).map(|i| Candle::from_close(1.0900 - i as f64 * 0.0001)).collect()
}

pub fn flat() -> Vec<Candle> {
    vec![Candle::from_close(1.2500); 20]
}
