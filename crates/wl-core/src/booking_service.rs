//! Booking mutations that keep a user's day consistent.
//!
//! Rules enforced here:
//! - hidden activities receive no new or edited bookings
//! - adding a booking closes the open booking of that day when it started
//!   earlier, so a day normally has at most one open booking
//! - inserting a break splits one booking into two around the break
//!
//! Every mutation re-derives the whole record from the stored one and
//! writes it back under the same id.

use chrono::{Duration, NaiveDate, NaiveTime};
use tracing::debug;

use crate::activity::Activity;
use crate::booking::{Booking, BookingChanges, NewBooking};
use crate::error::{Error, Result};
use crate::store::Store;
use crate::types::{RecordId, UserId, ValidationError};

/// Default break length in minutes.
pub const DEFAULT_BREAK_MINUTES: i64 = 30;

/// Input for [`BookingService::add_booking`].
#[derive(Debug, Clone)]
pub struct AddBooking<'a> {
    pub day: NaiveDate,
    pub user: UserId,
    pub activity: &'a Activity,
    pub start: NaiveTime,
    pub end: Option<NaiveTime>,
    pub comment: Option<String>,
}

/// Fields to change in [`BookingService::change_booking`]; `None` keeps the stored value.
#[derive(Debug, Clone, Default)]
pub struct BookingUpdate<'a> {
    pub day: Option<NaiveDate>,
    pub activity: Option<&'a Activity>,
    pub start: Option<NaiveTime>,
    pub end: Option<NaiveTime>,
    pub comment: Option<String>,
}

/// Applies booking mutations through a booking store.
pub struct BookingService<'a, S> {
    bookings: &'a S,
}

/// Id of an activity that may receive bookings.
fn bookable_activity(activity: &Activity) -> Result<RecordId> {
    if activity.is_hidden() {
        return Err(Error::HiddenActivity {
            activity: activity.composite_id(),
        });
    }
    activity.id().ok_or_else(|| {
        ValidationError::Unsaved {
            record: "activity",
        }
        .into()
    })
}

/// The user's bookings on `day`, ordered by start time.
pub fn bookings_on_day<S: Store<Booking>>(
    store: &S,
    user: &UserId,
    day: NaiveDate,
) -> Result<Vec<Booking>> {
    let mut bookings: Vec<Booking> = store
        .store_all()?
        .into_iter()
        .filter(|booking| booking.user() == user && booking.day() == day)
        .collect();
    bookings.sort_by_key(|booking| (booking.start(), booking.id()));
    Ok(bookings)
}

impl<'a, S: Store<Booking>> BookingService<'a, S> {
    pub const fn new(bookings: &'a S) -> Self {
        Self { bookings }
    }

    /// The open booking of `user` on `day`, if any.
    ///
    /// Should several exist, the one starting last is returned.
    pub fn open_booking(&self, user: &UserId, day: NaiveDate) -> Result<Option<Booking>> {
        Ok(bookings_on_day(self.bookings, user, day)?
            .into_iter()
            .filter(Booking::is_open)
            .next_back())
    }

    /// Creates a booking, first closing the day's open booking at the new start.
    ///
    /// An open booking that starts at or after the new start is left open.
    pub fn add_booking(&self, request: AddBooking<'_>) -> Result<Booking> {
        let activity = bookable_activity(request.activity)?;

        let closed = match self.open_booking(&request.user, request.day)? {
            Some(open) if open.start() < request.start => {
                Some(open.with_changes(BookingChanges {
                    end: Some(request.start),
                    ..BookingChanges::default()
                })?)
            }
            _ => None,
        };
        let start = request.start;
        let booking = Booking::new(NewBooking {
            day: request.day,
            user: request.user,
            activity,
            start,
            end: request.end,
            comment: request.comment.unwrap_or_default(),
        })?;

        if let Some(closed) = closed {
            debug!(booking = ?closed.id(), end = %start, "closing open booking");
            self.bookings.save(closed)?;
        }
        let saved = self.bookings.save(booking)?;
        debug!(booking = ?saved.id(), day = %saved.day(), "added booking");
        Ok(saved)
    }

    /// Applies the given changes on top of `booking` and stores the result under its id.
    pub fn change_booking(&self, booking: &Booking, update: BookingUpdate<'_>) -> Result<Booking> {
        if booking.id().is_none() {
            return Err(Error::InvalidInput(
                "only saved bookings can be changed".to_string(),
            ));
        }
        let activity = update.activity.map(bookable_activity).transpose()?;
        let changed = booking.with_changes(BookingChanges {
            day: update.day,
            activity,
            start: update.start,
            end: update.end,
            comment: update.comment,
        })?;
        let saved = self.bookings.save(changed)?;
        debug!(booking = ?saved.id(), "changed booking");
        Ok(saved)
    }

    /// Splits `booking` around a break starting at `break_start`.
    ///
    /// The booking is cut back to end at `break_start`; a new booking for the
    /// same day, user, activity and comment covers the time from the end of
    /// the break to the original end. Returns the new tail booking.
    pub fn add_break_to_booking(
        &self,
        booking: &Booking,
        break_start: NaiveTime,
        duration: Duration,
    ) -> Result<Booking> {
        if booking.id().is_none() {
            return Err(Error::InvalidInput(
                "only saved bookings can take a break".to_string(),
            ));
        }
        if duration <= Duration::zero() {
            return Err(Error::InvalidBreak(format!(
                "duration must be positive, got {} minutes",
                duration.num_minutes()
            )));
        }
        if break_start <= booking.start() {
            return Err(Error::InvalidBreak(format!(
                "break at {break_start} does not start after booking start {}",
                booking.start()
            )));
        }
        let Some(end) = booking.end() else {
            return Err(Error::InvalidBreak(
                "booking has no end time".to_string(),
            ));
        };
        let (break_end, wrapped) = break_start.overflowing_add_signed(duration);
        if wrapped != 0 || break_end >= end {
            return Err(Error::InvalidBreak(format!(
                "break from {break_start} for {} minutes does not end before {end}",
                duration.num_minutes()
            )));
        }

        let head = booking.with_changes(BookingChanges {
            end: Some(break_start),
            ..BookingChanges::default()
        })?;
        let tail = Booking::new(NewBooking {
            day: booking.day(),
            user: booking.user().clone(),
            activity: booking.activity(),
            start: break_end,
            end: Some(end),
            comment: booking.comment().to_string(),
        })?;

        self.bookings.save(head)?;
        let tail = self.bookings.save(tail)?;
        debug!(
            booking = ?booking.id(),
            tail = ?tail.id(),
            %break_start,
            minutes = duration.num_minutes(),
            "inserted break"
        );
        Ok(tail)
    }
}
