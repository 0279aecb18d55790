//! Classifies one slot against one availability snapshot.
//!
//! Pure and deterministic; no IO, no clock.

use chrono::NaiveDateTime;

use crate::availability::snapshot::AvailabilitySnapshot;
use crate::planner::types::TimeSlot;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Availability {
    Available,
    Occupied,
    Blocked { reason: String },
}

impl Availability {
    pub fn is_available(&self) -> bool {
        matches!(self, Availability::Available)
    }
}

/// Strict half-open overlap: ranges that only touch do not overlap.
pub fn overlaps(
    a_start: NaiveDateTime,
    a_end: NaiveDateTime,
    b_start: NaiveDateTime,
    b_end: NaiveDateTime,
) -> bool {
    a_start < b_end && a_end > b_start
}

/// Occupied wins over blocked: reservations are checked first and short-circuit.
pub fn evaluate_slot(
    slot: &TimeSlot,
    snapshot: &AvailabilitySnapshot,
    reservation_type: &str,
) -> Availability {
    let (start, end) = (slot.starts_at(), slot.ends_at());

    let occupied = snapshot
        .reservations
        .iter()
        .filter(|r| r.resource == slot.resource())
        .any(|r| overlaps(start, end, r.start, r.end));

    if occupied {
        return Availability::Occupied;
    }

    if let Some(blocks) = &snapshot.blocks {
        let hit = blocks.iter().find(|b| {
            b.applies_to_resource(slot.resource())
                && b.applies_to_type(reservation_type)
                && overlaps(start, end, b.start, b.end)
        });

        if let Some(b) = hit {
            return Availability::Blocked {
                reason: format!(
                    "closed {} - {}",
                    b.start.format("%Y-%m-%d %H:%M"),
                    b.end.format("%Y-%m-%d %H:%M")
                ),
            };
        }
    }

    Availability::Available
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::availability::snapshot::{BlackoutBlock, Reservation};
    use crate::planner::chunker::chunk_range;
    use chrono::{NaiveDate, NaiveTime, TimeDelta};

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 12, 15).unwrap()
    }

    fn at(h: u32, m: u32) -> NaiveDateTime {
        date().and_time(NaiveTime::from_hms_opt(h, m, 0).unwrap())
    }

    fn slot(from: u32, to: u32, resource: &str) -> TimeSlot {
        chunk_range(
            date(),
            NaiveTime::from_hms_opt(from, 0, 0).unwrap(),
            NaiveTime::from_hms_opt(to, 0, 0).unwrap(),
            resource,
            TimeDelta::hours(24),
        )
        .unwrap()
        .remove(0)
    }

    fn reservation(resource: &str, from: u32, to: u32) -> Reservation {
        Reservation {
            resource: resource.into(),
            start: at(from, 0),
            end: at(to, 0),
        }
    }

    fn block(resource: Option<Vec<&str>>, types: Option<Vec<&str>>, from: u32, to: u32) -> BlackoutBlock {
        BlackoutBlock {
            resource: resource.map(|v| v.into_iter().map(String::from).collect()),
            types: types.map(|v| v.into_iter().map(String::from).collect()),
            start: at(from, 0),
            end: at(to, 0),
        }
    }

    #[test]
    fn empty_snapshot_is_available() {
        let out = evaluate_slot(&slot(9, 12, "565"), &AvailabilitySnapshot::default(), "36");
        assert_eq!(out, Availability::Available);
    }

    #[test]
    fn touching_reservation_is_not_a_conflict() {
        let snap = AvailabilitySnapshot {
            reservations: vec![reservation("565", 12, 15)],
            blocks: None,
        };
        assert!(evaluate_slot(&slot(9, 12, "565"), &snap, "36").is_available());
    }

    #[test]
    fn overlapping_reservation_same_resource_is_occupied() {
        let snap = AvailabilitySnapshot {
            reservations: vec![reservation("565", 11, 13)],
            blocks: None,
        };
        assert_eq!(
            evaluate_slot(&slot(9, 12, "565"), &snap, "36"),
            Availability::Occupied
        );
    }

    #[test]
    fn other_resource_does_not_conflict() {
        let snap = AvailabilitySnapshot {
            reservations: vec![reservation("566", 9, 12)],
            blocks: None,
        };
        assert!(evaluate_slot(&slot(9, 12, "565"), &snap, "36").is_available());
    }

    #[test]
    fn untyped_block_blocks_every_resource() {
        let snap = AvailabilitySnapshot {
            reservations: vec![],
            blocks: Some(vec![block(None, None, 8, 10)]),
        };
        assert!(matches!(
            evaluate_slot(&slot(9, 12, "565"), &snap, "36"),
            Availability::Blocked { .. }
        ));
    }

    #[test]
    fn block_filters_are_respected() {
        let snap = AvailabilitySnapshot {
            reservations: vec![],
            blocks: Some(vec![
                block(Some(vec!["600"]), None, 8, 18),
                block(None, Some(vec!["12"]), 8, 18),
            ]),
        };
        assert!(evaluate_slot(&slot(9, 12, "565"), &snap, "36").is_available());
    }

    #[test]
    fn occupied_takes_precedence_over_blocked() {
        let snap = AvailabilitySnapshot {
            reservations: vec![reservation("565", 9, 10)],
            blocks: Some(vec![block(None, None, 9, 12)]),
        };
        assert_eq!(
            evaluate_slot(&slot(9, 12, "565"), &snap, "36"),
            Availability::Occupied
        );
    }

    #[test]
    fn evaluation_is_deterministic() {
        let snap = AvailabilitySnapshot {
            reservations: vec![reservation("565", 13, 14)],
            blocks: Some(vec![block(Some(vec!["565"]), Some(vec!["36"]), 16, 18)]),
        };
        let s = slot(12, 15, "565");
        let first = evaluate_slot(&s, &snap, "36");
        for _ in 0..10 {
            assert_eq!(evaluate_slot(&s, &snap, "36"), first);
        }
    }
}
