use std::fmt;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::serde_helpers::hhmm;

/// Clock range of a slot, without date or resource. This is what a desired
/// booking remembers about sub-ranges it has already secured.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SlotWindow {
    #[serde(with = "hhmm")]
    pub start: NaiveTime,
    #[serde(with = "hhmm")]
    pub end: NaiveTime,
}

impl fmt::Display for SlotWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start.format("%H:%M"), self.end.format("%H:%M"))
    }
}

/// One bounded sub-range of a desired booking.
///
/// Only the chunker builds these, so `start < end` and the length bound hold
/// for every value in circulation.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TimeSlot {
    date: NaiveDate,
    start: NaiveTime,
    end: NaiveTime,
    resource: String,
}

impl TimeSlot {
    pub(crate) fn new(date: NaiveDate, start: NaiveTime, end: NaiveTime, resource: String) -> Self {
        debug_assert!(start < end, "slot must have positive length");
        Self {
            date,
            start,
            end,
            resource,
        }
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn start(&self) -> NaiveTime {
        self.start
    }

    pub fn end(&self) -> NaiveTime {
        self.end
    }

    pub fn resource(&self) -> &str {
        &self.resource
    }

    pub fn starts_at(&self) -> NaiveDateTime {
        self.date.and_time(self.start)
    }

    pub fn ends_at(&self) -> NaiveDateTime {
        self.date.and_time(self.end)
    }

    pub fn window(&self) -> SlotWindow {
        SlotWindow {
            start: self.start,
            end: self.end,
        }
    }
}

impl fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} (resource {})",
            self.date.format("%Y-%m-%d"),
            self.window(),
            self.resource
        )
    }
}
