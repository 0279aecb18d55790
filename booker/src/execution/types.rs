use std::fmt;

use crate::error::BookingError;
use crate::planner::types::{SlotWindow, TimeSlot};

/// Per-slot result of one attempt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AttemptResult {
    Booked,
    Occupied,
    Blocked { reason: String },
    BookingFailed(BookingError),
    AccountCreationFailed(BookingError),
}

impl AttemptResult {
    pub fn is_booked(&self) -> bool {
        matches!(self, AttemptResult::Booked)
    }

    pub fn error(&self) -> Option<&BookingError> {
        match self {
            AttemptResult::BookingFailed(e) | AttemptResult::AccountCreationFailed(e) => Some(e),
            _ => None,
        }
    }
}

impl fmt::Display for AttemptResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttemptResult::Booked => f.write_str("booked"),
            AttemptResult::Occupied => f.write_str("occupied"),
            AttemptResult::Blocked { reason } => write!(f, "blocked ({reason})"),
            AttemptResult::BookingFailed(e) => write!(f, "booking failed: {e}"),
            AttemptResult::AccountCreationFailed(e) => write!(f, "account creation failed: {e}"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SlotOutcome {
    pub slot: TimeSlot,
    pub result: AttemptResult,

    /// Booked in an earlier attempt or pass; nothing was submitted now.
    pub previously_secured: bool,
}

impl SlotOutcome {
    pub fn new(slot: TimeSlot, result: AttemptResult) -> Self {
        Self {
            slot,
            result,
            previously_secured: false,
        }
    }
}

/// Outcome of one pass through the pipeline for one desired booking.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AttemptReport {
    pub outcomes: Vec<SlotOutcome>,
    pub identities_used: usize,
}

impl AttemptReport {
    /// Every slot is booked, now or earlier.
    pub fn is_complete(&self) -> bool {
        !self.outcomes.is_empty() && self.outcomes.iter().all(|o| o.result.is_booked())
    }

    /// Slots booked by this attempt.
    pub fn newly_booked(&self) -> impl Iterator<Item = SlotWindow> + '_ {
        self.outcomes
            .iter()
            .filter(|o| o.result.is_booked() && !o.previously_secured)
            .map(|o| o.slot.window())
    }

    pub fn booked_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.result.is_booked()).count()
    }

    /// Diagnostic summary of every slot that is not booked, suitable for
    /// the booking's `last_failure`. `None` when nothing failed.
    pub fn failure_summary(&self) -> Option<(String, String)> {
        let failed: Vec<_> = self
            .outcomes
            .iter()
            .filter(|o| !o.result.is_booked())
            .collect();

        let first = failed.first()?;
        let stage = match &first.result {
            AttemptResult::AccountCreationFailed(_) => "provisioning",
            AttemptResult::BookingFailed(e) => e.stage(),
            _ => "availability",
        };

        let detail = failed
            .iter()
            .map(|o| format!("{}: {}", o.slot.window(), o.result))
            .collect::<Vec<_>>()
            .join("; ");

        Some((stage.to_string(), detail))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planner::chunker::chunk_range;
    use chrono::{NaiveDate, NaiveTime, TimeDelta};

    fn slots(n: u32) -> Vec<TimeSlot> {
        chunk_range(
            NaiveDate::from_ymd_opt(2025, 12, 15).unwrap(),
            NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
            NaiveTime::from_hms_opt(8 + 3 * n, 0, 0).unwrap(),
            "565",
            TimeDelta::hours(3),
        )
        .unwrap()
    }

    #[test]
    fn empty_report_is_not_complete() {
        assert!(!AttemptReport::default().is_complete());
        assert!(AttemptReport::default().failure_summary().is_none());
    }

    #[test]
    fn previously_secured_slots_count_as_booked_but_not_new() {
        let s = slots(2);
        let report = AttemptReport {
            outcomes: vec![
                SlotOutcome {
                    slot: s[0].clone(),
                    result: AttemptResult::Booked,
                    previously_secured: true,
                },
                SlotOutcome::new(s[1].clone(), AttemptResult::Booked),
            ],
            identities_used: 1,
        };

        assert!(report.is_complete());
        assert_eq!(report.booked_count(), 2);
        assert_eq!(report.newly_booked().collect::<Vec<_>>(), vec![s[1].window()]);
    }

    #[test]
    fn summary_names_first_failing_stage_and_every_failure() {
        let s = slots(3);
        let report = AttemptReport {
            outcomes: vec![
                SlotOutcome::new(s[0].clone(), AttemptResult::Booked),
                SlotOutcome::new(
                    s[1].clone(),
                    AttemptResult::AccountCreationFailed(BookingError::Transport("timeout".into())),
                ),
                SlotOutcome::new(s[2].clone(), AttemptResult::Occupied),
            ],
            identities_used: 2,
        };

        let (stage, detail) = report.failure_summary().unwrap();
        assert_eq!(stage, "provisioning");
        assert!(detail.contains("11:00-14:00: account creation failed"));
        assert!(detail.contains("14:00-17:00: occupied"));
        assert!(!detail.contains("08:00"));
    }
}
