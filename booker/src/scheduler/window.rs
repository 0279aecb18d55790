//! Release-window classification.
//!
//! Pure: no async, no IO. The caller supplies "now" in the platform zone.

use chrono::{DateTime, NaiveDate, NaiveTime, Timelike};
use chrono_tz::Tz;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DueState {
    NotDue,
    DueNormal,
    DueCritical,
}

impl DueState {
    pub fn is_due(&self) -> bool {
        !matches!(self, DueState::NotDue)
    }
}

/// When the platform releases a date, and how close to it we must be.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReleaseWindow {
    /// A date is bookable from this many days before it.
    pub lead_days: i64,

    /// Inclusive local-clock bounds of the high-contention minutes.
    pub critical_start: NaiveTime,
    pub critical_end: NaiveTime,
}

impl Default for ReleaseWindow {
    fn default() -> Self {
        Self {
            lead_days: 2,
            critical_start: NaiveTime::from_hms_opt(18, 55, 0).unwrap_or_default(),
            critical_end: NaiveTime::from_hms_opt(19, 5, 0).unwrap_or_default(),
        }
    }
}

impl ReleaseWindow {
    /// Calendar days from `today` to `target`; negative once the date passed.
    pub fn days_until(today: NaiveDate, target: NaiveDate) -> i64 {
        (target - today).num_days()
    }

    /// Compared at minute resolution, so 19:05:59 is still inside.
    pub fn is_critical(&self, now: &DateTime<Tz>) -> bool {
        let t = now.time();
        let minute = NaiveTime::from_hms_opt(t.hour(), t.minute(), 0).unwrap_or(t);
        minute >= self.critical_start && minute <= self.critical_end
    }

    /// `today` is passed separately so a forced date can be combined with
    /// the real wall clock.
    pub fn classify(&self, today: NaiveDate, target: NaiveDate, now: &DateTime<Tz>) -> DueState {
        let d = Self::days_until(today, target);
        if !(0..=self.lead_days).contains(&d) {
            return DueState::NotDue;
        }
        if self.is_critical(now) {
            DueState::DueCritical
        } else {
            DueState::DueNormal
        }
    }
}
