use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use crate::planner::types::SlotWindow;
use crate::serde_helpers::{hhmm, id_string};

/// Lifecycle of a desired booking as seen by the scheduler.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BookingState {
    #[default]
    Pending,
    Completed,
    FailedRetryable,
}

/// Diagnostics of the most recent unsuccessful pass.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureRecord {
    pub at: DateTime<Utc>,

    /// Pipeline stage that failed first: chunking, availability,
    /// provisioning or booking.
    #[serde(default)]
    pub stage: String,

    pub error: String,
}

/// A user-requested reservation, as stored in the schedule file.
///
/// The scheduler only ever touches the state fields (`enabled`, `state`,
/// `secured_slots`, `completed_at`, `last_failure`); everything else is
/// owned by whoever edits the file.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DesiredBooking {
    pub id: String,
    pub target_date: NaiveDate,

    /// Informational; due-ness is derived from `target_date`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub booking_date: Option<NaiveDate>,

    #[serde(with = "hhmm")]
    pub start: NaiveTime,
    #[serde(with = "hhmm")]
    pub end: NaiveTime,

    #[serde(deserialize_with = "id_string")]
    pub resource: String,

    #[serde(default)]
    pub description: String,

    #[serde(default = "enabled_by_default")]
    pub enabled: bool,

    #[serde(default)]
    pub state: BookingState,

    /// Sub-ranges booked by earlier passes.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub secured_slots: Vec<SlotWindow>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub added_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_failure: Option<FailureRecord>,

    /// Keys this program does not know about survive a rewrite.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

fn enabled_by_default() -> bool {
    true
}

impl DesiredBooking {
    pub fn new(target_date: NaiveDate, start: NaiveTime, end: NaiveTime, resource: &str) -> Self {
        Self {
            id: format!("booking-{}", target_date.format("%Y-%m-%d")),
            target_date,
            booking_date: None,
            start,
            end,
            resource: resource.to_string(),
            description: format!("Booking for {}", target_date.format("%Y-%m-%d")),
            enabled: true,
            state: BookingState::Pending,
            secured_slots: Vec::new(),
            added_at: Some(Utc::now()),
            completed_at: None,
            last_failure: None,
            extra: serde_json::Map::new(),
        }
    }

    /// Enabled and not yet completed. Completion is read from `completed_at`,
    /// so a record re-enabled by hand (flag set, timestamp removed) is live
    /// again whatever its stored `state`.
    pub fn is_active(&self) -> bool {
        self.enabled && self.completed_at.is_none()
    }

    /// Bring `state` back in line with a hand-edited record. A completed
    /// record that lost its `completedAt` starts over from scratch.
    pub fn reconcile(&mut self) {
        if self.state == BookingState::Completed && self.completed_at.is_none() {
            self.state = BookingState::Pending;
            self.secured_slots.clear();
        }
    }

    /// Record newly booked windows, ignoring ones already known.
    pub fn secure(&mut self, windows: impl IntoIterator<Item = SlotWindow>) {
        for w in windows {
            if !self.secured_slots.contains(&w) {
                self.secured_slots.push(w);
            }
        }
        self.secured_slots.sort_by_key(|w| w.start);
    }

    /// Completion disables the record in place; it is never removed.
    pub fn mark_completed(&mut self, at: DateTime<Utc>) {
        self.enabled = false;
        self.state = BookingState::Completed;
        self.completed_at = Some(at);
        self.last_failure = None;
    }

    pub fn mark_failed(&mut self, at: DateTime<Utc>, stage: &str, error: String) {
        self.state = BookingState::FailedRetryable;
        self.last_failure = Some(FailureRecord {
            at,
            stage: stage.to_string(),
            error,
        });
    }
}

/// On-disk layout: `{ "bookings": [...] }`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ScheduleFile {
    #[serde(default)]
    pub bookings: Vec<DesiredBooking>,
}
