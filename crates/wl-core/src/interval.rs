//! Start/end pairs within a single day.

use chrono::{Duration, NaiveTime};

use crate::types::ValidationError;

/// A closed span of time inside one day.
///
/// Derived from a booking on demand and never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeInterval {
    start: NaiveTime,
    end: NaiveTime,
}

impl TimeInterval {
    /// Creates an interval; `end` must come strictly after `start`.
    pub fn new(start: NaiveTime, end: NaiveTime) -> Result<Self, ValidationError> {
        if end <= start {
            return Err(ValidationError::EndNotAfterStart { start, end });
        }
        Ok(Self { start, end })
    }

    #[must_use]
    pub const fn start(&self) -> NaiveTime {
        self.start
    }

    #[must_use]
    pub const fn end(&self) -> NaiveTime {
        self.end
    }

    /// Length in whole minutes; seconds are dropped.
    #[must_use]
    pub fn length(&self) -> Duration {
        Duration::minutes((self.end - self.start).num_minutes())
    }

    /// Returns true if the two intervals share any time.
    ///
    /// Back-to-back intervals (one ends exactly where the other starts) do
    /// not overlap, so a day can be tiled by consecutive bookings.
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        !(self.start == other.end
            || self.end == other.start
            || self.start > other.end
            || self.end < other.start)
    }
}
