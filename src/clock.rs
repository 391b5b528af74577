//! All things time-related.

pub use chrono::{DateTime, TimeDelta, Utc};
use std::time::Duration;

/// Tells time and waits for time to pass.
///
/// Generally you will want to use [`SystemClock`], but in tests you may
/// want to implement a `Clock` that does not actually wait, so that
/// retry loops can run to completion instantly.
pub trait Clock: Send + Sync {
    /// The current time.
    fn now(&self) -> DateTime<Utc>;

    /// Pauses the current task for `duration`.
    fn sleep(&self, duration: Duration) -> impl Future<Output = ()> + Send;
}

/// Interacts with the system clock to get the current time, and with the
/// Tokio timer to wait.
#[derive(Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await
    }
}

impl<C: Clock> Clock for &C {
    fn now(&self) -> DateTime<Utc> {
        (**self).now()
    }

    fn sleep(&self, duration: Duration) -> impl Future<Output = ()> + Send {
        (**self).sleep(duration)
    }
}

/// Formats an elapsed time as a short, human-readable string, such as
/// "42s" or "3m 5s".
///
/// # Examples
///
/// ```
/// use tesla_cli::clock::{TimeDelta, format_elapsed};
/// assert_eq!(format_elapsed(TimeDelta::seconds(42)), "42s");
/// assert_eq!(format_elapsed(TimeDelta::seconds(185)), "3m 5s");
/// ```
pub fn format_elapsed(elapsed: TimeDelta) -> String {
    let secs = elapsed.num_seconds().max(0);
    if secs < 60 {
        format!("{secs}s")
    } else {
        format!("{}m {}s", secs / 60, secs % 60)
    }
}
