//! Wall-clock access for the scheduler.
//!
//! Timed waits always go through `tokio::time`; the release window, however,
//! is a property of the platform's local clock, so it is read through `Clock`.

use chrono::{DateTime, TimeDelta, Utc};
use chrono_tz::Tz;

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Tz>;
}

/// Real time in the platform zone.
#[derive(Clone, Debug)]
pub struct SystemClock {
    tz: Tz,
}

impl SystemClock {
    pub fn new(tz: Tz) -> Self {
        Self { tz }
    }
}

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Tz> {
        Utc::now().with_timezone(&self.tz)
    }
}

/// Clock pinned to `anchor` when constructed, then advancing with tokio's
/// clock. Under a paused runtime this follows virtual time exactly.
#[derive(Clone, Debug)]
pub struct AnchoredClock {
    anchor: DateTime<Tz>,
    origin: tokio::time::Instant,
}

impl AnchoredClock {
    pub fn new(anchor: DateTime<Tz>) -> Self {
        Self {
            anchor,
            origin: tokio::time::Instant::now(),
        }
    }
}

impl Clock for AnchoredClock {
    fn now(&self) -> DateTime<Tz> {
        let elapsed = TimeDelta::from_std(self.origin.elapsed()).unwrap_or(TimeDelta::zero());
        self.anchor + elapsed
    }
}
