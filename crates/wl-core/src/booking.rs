//! Time bookings against activities.

use chrono::{NaiveDate, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::interval::TimeInterval;
use crate::store::Record;
use crate::types::{RecordId, UserId, ValidationError};

/// Attributes of a booking, without identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewBooking {
    pub day: NaiveDate,
    pub user: UserId,
    pub activity: RecordId,
    pub start: NaiveTime,
    #[serde(default)]
    pub end: Option<NaiveTime>,
    #[serde(default)]
    pub comment: String,
}

/// Fields to override when deriving a changed booking.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookingChanges {
    pub day: Option<NaiveDate>,
    pub activity: Option<RecordId>,
    pub start: Option<NaiveTime>,
    pub end: Option<NaiveTime>,
    pub comment: Option<String>,
}

/// One user's time record for a single activity within one day.
///
/// A booking without an end time is "open". Times are kept at minute
/// precision and the end, when present, is strictly after the start.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "StoredBooking")]
pub struct Booking {
    id: Option<RecordId>,
    day: NaiveDate,
    user: UserId,
    activity: RecordId,
    start: NaiveTime,
    end: Option<NaiveTime>,
    comment: String,
}

#[derive(Deserialize)]
struct StoredBooking {
    id: Option<RecordId>,
    #[serde(flatten)]
    fields: NewBooking,
}

impl TryFrom<StoredBooking> for Booking {
    type Error = ValidationError;

    fn try_from(stored: StoredBooking) -> Result<Self, Self::Error> {
        let booking = Self::new(stored.fields)?;
        Ok(match stored.id {
            Some(id) => booking.with_id(id),
            None => booking,
        })
    }
}

/// Drops seconds and below.
fn to_minute(time: NaiveTime) -> NaiveTime {
    NaiveTime::from_hms_opt(time.hour(), time.minute(), 0).unwrap_or(time)
}

impl Booking {
    /// Validates the attributes and builds an unsaved booking.
    ///
    /// A blank comment is stored as empty.
    pub fn new(fields: NewBooking) -> Result<Self, ValidationError> {
        let start = to_minute(fields.start);
        let end = fields.end.map(to_minute);
        if let Some(end) = end {
            if end <= start {
                return Err(ValidationError::EndNotAfterStart { start, end });
            }
        }
        let comment = fields.comment.trim().to_string();
        Ok(Self {
            id: None,
            day: fields.day,
            user: fields.user,
            activity: fields.activity,
            start,
            end,
            comment,
        })
    }

    /// Re-derives the booking with the given overrides applied.
    ///
    /// The result carries the same id and is validated from scratch.
    pub fn with_changes(&self, changes: BookingChanges) -> Result<Self, ValidationError> {
        let changed = Self::new(NewBooking {
            day: changes.day.unwrap_or(self.day),
            user: self.user.clone(),
            activity: changes.activity.unwrap_or(self.activity),
            start: changes.start.unwrap_or(self.start),
            end: changes.end.or(self.end),
            comment: changes.comment.unwrap_or_else(|| self.comment.clone()),
        })?;
        Ok(Self {
            id: self.id,
            ..changed
        })
    }

    pub const fn id(&self) -> Option<RecordId> {
        self.id
    }

    pub const fn day(&self) -> NaiveDate {
        self.day
    }

    pub const fn user(&self) -> &UserId {
        &self.user
    }

    pub const fn activity(&self) -> RecordId {
        self.activity
    }

    pub const fn start(&self) -> NaiveTime {
        self.start
    }

    pub const fn end(&self) -> Option<NaiveTime> {
        self.end
    }

    pub fn comment(&self) -> &str {
        &self.comment
    }

    pub const fn is_open(&self) -> bool {
        self.end.is_none()
    }

    /// The booked interval, or `None` while the booking is open.
    pub fn interval(&self) -> Option<TimeInterval> {
        self.end
            .and_then(|end| TimeInterval::new(self.start, end).ok())
    }
}

impl Record for Booking {
    const KIND: &'static str = "booking";

    fn id(&self) -> Option<RecordId> {
        self.id
    }

    fn with_id(self, id: RecordId) -> Self {
        Self { id: Some(id), ..self }
    }
}
