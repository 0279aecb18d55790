//! Splits a desired range into sub-ranges the platform will accept.
//!
//! Pure: same inputs always give the same slots, so the range is simply
//! re-chunked on every attempt instead of remembering earlier chunks.

use chrono::{NaiveDate, NaiveTime, TimeDelta};
use tracing::debug;

use crate::error::BookingError;
use crate::planner::types::TimeSlot;

/// Decompose `[start, end)` on `date` into consecutive slots no longer than
/// `max_len`. Every slot but the last has exactly `max_len`.
pub fn chunk_range(
    date: NaiveDate,
    start: NaiveTime,
    end: NaiveTime,
    resource: &str,
    max_len: TimeDelta,
) -> Result<Vec<TimeSlot>, BookingError> {
    if start >= end || max_len <= TimeDelta::zero() {
        return Err(BookingError::InvalidRange { start, end });
    }

    // Walk on full datetimes: NaiveTime arithmetic wraps at midnight.
    let stop = date.and_time(end);
    let mut cursor = date.and_time(start);
    let mut out = Vec::new();

    while cursor < stop {
        let next = (cursor + max_len).min(stop);
        out.push(TimeSlot::new(
            date,
            cursor.time(),
            next.time(),
            resource.to_string(),
        ));
        cursor = next;
    }

    debug!(
        %date,
        resource,
        slots = out.len(),
        "range chunked"
    );

    Ok(out)
}
