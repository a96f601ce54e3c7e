use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, TimeZone, Timelike, Utc};
use chrono_tz::Tz;
use tracing::debug;

const MINUTE: Duration = Duration::from_secs(60);

/// Wall clock and sleep, injectable so monitor loops can run on virtual time
/// in tests.
#[async_trait]
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    async fn sleep(&self, duration: Duration);
}

/// Real time: `chrono::Utc::now` and `tokio::time::sleep`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

#[async_trait]
impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Time left until the next whole minute.
fn until_boundary<T: TimeZone>(now: &DateTime<T>) -> Duration {
    // Leap seconds report nanosecond >= 1e9
    let into_minute = Duration::new(
        u64::from(now.second().min(59)),
        now.nanosecond().min(999_999_999),
    );
    MINUTE - into_minute
}

/// The next whole-minute boundary strictly after `now`, in `now`'s timezone.
pub fn next_boundary<T: TimeZone>(now: &DateTime<T>) -> DateTime<T> {
    // until_boundary is at most one minute, always representable
    let delta = TimeDelta::from_std(until_boundary(now)).unwrap_or(TimeDelta::minutes(1));
    now.clone() + delta
}

/// How long to wait from `now` until `lead` before the next minute boundary.
///
/// `None` when that instant is already here or past, e.g. anywhere in the last
/// `lead` seconds of a minute.
pub fn time_until_lead<T: TimeZone>(now: &DateTime<T>, lead: Duration) -> Option<Duration> {
    until_boundary(now)
        .checked_sub(lead)
        .filter(|wait| !wait.is_zero())
}

/// Block until `lead` before the next minute boundary of `tz` and return the
/// boundary that was targeted. Returns immediately if that point has passed.
pub async fn wait_until_next_boundary(clock: &dyn Clock, tz: Tz, lead: Duration) -> DateTime<Utc> {
    let now = clock.now().with_timezone(&tz);
    let boundary = next_boundary(&now).with_timezone(&Utc);

    match time_until_lead(&now, lead) {
        Some(wait) => {
            debug!(wait = ?wait, boundary = %boundary, "Waiting for next candle boundary");
            clock.sleep(wait).await;
        }
        None => debug!(boundary = %boundary, "Inside lead window, not waiting"),
    }
    boundary
}

/// `YYYY-MM-DD HH:MM:SS` in the reference timezone.
pub fn format_timestamp(now: DateTime<Utc>, tz: Tz) -> String {
    now.with_timezone(&tz).format("%Y-%m-%d %H:%M:%S").to_string()
}
