//! Retry budgets per due state.

use std::time::Duration;

use crate::scheduler::window::{DueState, ReleaseWindow};

/// Bounds of the attempt loop for one booking in one pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptPolicy {
    pub max_attempts: u32,

    /// Wait between the end of one attempt and the start of the next.
    pub spacing: Duration,

    /// Total time budget measured from the first attempt.
    pub max_elapsed: Option<Duration>,

    /// Stop as soon as the clock leaves the critical window.
    pub stop_outside_window: bool,
}

impl AttemptPolicy {
    pub fn critical() -> Self {
        Self {
            max_attempts: 18,
            spacing: Duration::from_secs(10),
            max_elapsed: Some(Duration::from_secs(180)),
            stop_outside_window: true,
        }
    }

    pub fn normal() -> Self {
        Self {
            max_attempts: 3,
            spacing: Duration::from_secs(10),
            max_elapsed: None,
            stop_outside_window: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    pub window: ReleaseWindow,
    pub critical: AttemptPolicy,
    pub normal: AttemptPolicy,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            window: ReleaseWindow::default(),
            critical: AttemptPolicy::critical(),
            normal: AttemptPolicy::normal(),
        }
    }
}

impl SchedulerConfig {
    /// `None` for bookings that are not due.
    pub fn policy_for(&self, state: DueState) -> Option<&AttemptPolicy> {
        match state {
            DueState::NotDue => None,
            DueState::DueNormal => Some(&self.normal),
            DueState::DueCritical => Some(&self.critical),
        }
    }
}
