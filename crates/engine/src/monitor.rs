use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use tracing::{debug, info, warn};

use common::{Candle, EnableFlag, Instrument, Notifier, QuoteProvider, Signal};
use strategy::MaCrossover;

use crate::clock::{format_timestamp, wait_until_next_boundary, Clock};

/// Timing and sizing knobs for a monitor loop.
#[derive(Debug, Clone, Copy)]
pub struct MonitorSettings {
    /// How long before the minute boundary to poll.
    pub lead: Duration,
    /// Pause between flag checks while monitoring is off.
    pub disabled_backoff: Duration,
    /// Pause after a cycle that produced no candles.
    pub no_data_backoff: Duration,
    /// Pause after every completed cycle.
    pub idle: Duration,
    pub candle_count: usize,
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self {
            lead: Duration::from_secs(10),
            disabled_backoff: Duration::from_secs(10),
            no_data_backoff: Duration::from_secs(10),
            idle: Duration::from_secs(1),
            candle_count: 20,
        }
    }
}

/// Collaborators shared by every monitor loop. All read-only from the
/// loop's point of view.
#[derive(Clone)]
pub struct MonitorDeps {
    pub quotes: Arc<dyn QuoteProvider>,
    pub notifier: Arc<dyn Notifier>,
    pub flag: Arc<dyn EnableFlag>,
    pub clock: Arc<dyn Clock>,
}

/// Where a monitor loop currently is within its cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorState {
    Disabled,
    Waiting,
    Fetching,
    Evaluating,
    Notifying,
    Idle,
}

impl fmt::Display for MonitorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MonitorState::Disabled => write!(f, "disabled"),
            MonitorState::Waiting => write!(f, "waiting"),
            MonitorState::Fetching => write!(f, "fetching"),
            MonitorState::Evaluating => write!(f, "evaluating"),
            MonitorState::Notifying => write!(f, "notifying"),
            MonitorState::Idle => write!(f, "idle"),
        }
    }
}

/// What one pass through the cycle did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// The enable flag was off; nothing was fetched.
    Disabled,
    /// The candle for this boundary was already evaluated; slept past it.
    AlreadyPolled,
    /// The provider returned nothing usable.
    NoData,
    /// A signal was computed but did not warrant a notification.
    Evaluated(Signal),
    /// A changed signal was sent. `delivered` is false if the notifier failed.
    Notified { signal: Signal, delivered: bool },
}

/// Per-instrument polling loop.
///
/// Owns the instrument's last emitted signal exclusively. A notification goes
/// out only when a BUY/SELL differs from that value, and the value advances
/// whether or not delivery succeeded.
pub struct Monitor {
    instrument: Instrument,
    deps: MonitorDeps,
    settings: MonitorSettings,
    tz: Tz,
    crossover: MaCrossover,
    state: MonitorState,
    last_emitted: Signal,
    last_polled: Option<DateTime<Utc>>,
}

impl Monitor {
    pub fn new(instrument: Instrument, deps: MonitorDeps, settings: MonitorSettings, tz: Tz) -> Self {
        Self {
            instrument,
            deps,
            settings,
            tz,
            crossover: MaCrossover::default(),
            state: MonitorState::Idle,
            last_emitted: Signal::Neutral,
            last_polled: None,
        }
    }

    pub fn instrument(&self) -> &Instrument {
        &self.instrument
    }

    pub fn state(&self) -> MonitorState {
        self.state
    }

    pub fn last_emitted(&self) -> Signal {
        self.last_emitted
    }

    /// Run forever. Call from `tokio::spawn`.
    pub async fn run(mut self) {
        info!(instrument = %self.instrument, "Monitoring started");
        loop {
            self.run_cycle().await;
        }
    }

    /// Execute exactly one cycle: flag check, boundary wait, fetch, evaluate,
    /// maybe notify, pause.
    pub async fn run_cycle(&mut self) -> CycleOutcome {
        let clock = self.deps.clock.clone();

        if !self.deps.flag.is_enabled().await {
            self.enter(MonitorState::Disabled);
            debug!(instrument = %self.instrument, "Bot is off");
            clock.sleep(self.settings.disabled_backoff).await;
            return CycleOutcome::Disabled;
        }

        self.enter(MonitorState::Waiting);
        let boundary = wait_until_next_boundary(clock.as_ref(), self.tz, self.settings.lead).await;

        if self.last_polled == Some(boundary) {
            // Still inside the lead window of a candle we already evaluated
            let remaining = (boundary - clock.now()).to_std().unwrap_or_default();
            self.enter(MonitorState::Idle);
            clock.sleep(remaining).await;
            return CycleOutcome::AlreadyPolled;
        }

        self.enter(MonitorState::Fetching);
        let Some(candles) = self.fetch().await else {
            self.enter(MonitorState::Idle);
            clock.sleep(self.settings.no_data_backoff).await;
            return CycleOutcome::NoData;
        };
        self.last_polled = Some(boundary);

        self.enter(MonitorState::Evaluating);
        let signal = self.crossover.evaluate(&candles);

        let outcome = if signal.is_actionable() && signal != self.last_emitted {
            self.enter(MonitorState::Notifying);
            let delivered = self.emit(signal).await;
            self.last_emitted = signal;
            CycleOutcome::Notified { signal, delivered }
        } else {
            debug!(instrument = %self.instrument, signal = %signal, last = %self.last_emitted, "No new signal");
            CycleOutcome::Evaluated(signal)
        };

        self.enter(MonitorState::Idle);
        clock.sleep(self.settings.idle).await;
        outcome
    }

    async fn fetch(&self) -> Option<Vec<Candle>> {
        match self
            .deps
            .quotes
            .recent_candles(&self.instrument, self.settings.candle_count)
            .await
        {
            Ok(candles) if !candles.is_empty() => Some(candles),
            Ok(_) => {
                warn!(instrument = %self.instrument, "No candles returned, skipping cycle");
                None
            }
            Err(e) => {
                warn!(instrument = %self.instrument, error = %e, "Quote fetch failed, skipping cycle");
                None
            }
        }
    }

    async fn emit(&self, signal: Signal) -> bool {
        let timestamp = format_timestamp(self.deps.clock.now(), self.tz);
        let Some(message) = signal_message(&self.instrument, &timestamp, signal) else {
            return false;
        };

        match self.deps.notifier.notify(&message).await {
            Ok(()) => {
                info!(instrument = %self.instrument, signal = %signal, "Signal sent");
                true
            }
            Err(e) => {
                warn!(instrument = %self.instrument, signal = %signal, error = %e, "Failed to deliver signal");
                false
            }
        }
    }

    fn enter(&mut self, next: MonitorState) {
        if self.state != next {
            debug!(instrument = %self.instrument, from = %self.state, to = %next, "State transition");
            self.state = next;
        }
    }
}

/// HTML notification body for a BUY/SELL signal. `None` for NONE.
pub fn signal_message(instrument: &Instrument, timestamp: &str, signal: Signal) -> Option<String> {
    let label = signal.label()?;
    Some(format!(
        "\u{23F0} {timestamp}\nAtivo: <b>{}</b>\nSinal: <b>{label}</b>",
        escape_html(instrument.symbol())
    ))
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
    out
}
