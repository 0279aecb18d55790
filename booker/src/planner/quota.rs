//! Groups bookable slots into per-identity batches.

use crate::planner::types::TimeSlot;

/// Partition `slots` into consecutive batches of at most `quota` entries,
/// preserving order. One batch is served by one guest identity, so the
/// batch count is the number of identities to provision.
pub fn partition_by_quota(slots: &[TimeSlot], quota: usize) -> Vec<Vec<TimeSlot>> {
    slots
        .chunks(quota.max(1))
        .map(|batch| batch.to_vec())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planner::chunker::chunk_range;
    use chrono::{NaiveDate, NaiveTime, TimeDelta};

    fn hourly_slots(n: u32) -> Vec<TimeSlot> {
        let date = NaiveDate::from_ymd_opt(2025, 12, 15).unwrap();
        chunk_range(
            date,
            NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
            NaiveTime::from_hms_opt(8 + n, 0, 0).unwrap(),
            "565",
            TimeDelta::hours(1),
        )
        .unwrap()
    }

    #[test]
    fn five_slots_make_two_two_one() {
        let slots = hourly_slots(5);
        let batches = partition_by_quota(&slots, 2);

        let sizes: Vec<_> = batches.iter().map(Vec::len).collect();
        assert_eq!(sizes, vec![2, 2, 1]);

        let flattened: Vec<_> = batches.into_iter().flatten().collect();
        assert_eq!(flattened, slots, "order must be preserved");
    }

    #[test]
    fn batch_count_is_ceiling_of_half() {
        for n in 1..=9 {
            let batches = partition_by_quota(&hourly_slots(n), 2);
            assert_eq!(batches.len(), n.div_ceil(2) as usize);
            assert!(batches.iter().all(|b| !b.is_empty() && b.len() <= 2));
        }
    }

    #[test]
    fn no_slots_no_batches() {
        assert!(partition_by_quota(&[], 2).is_empty());
    }

    #[test]
    fn zero_quota_degrades_to_singletons() {
        let batches = partition_by_quota(&hourly_slots(3), 0);
        assert_eq!(batches.len(), 3);
    }
}
