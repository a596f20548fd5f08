//! Per-day presence, worktime, breaks and overtime.

use std::collections::BTreeMap;

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use tracing::warn;

use super::{Analyzer, Row, Table, format_duration};
use crate::booking::Booking;
use crate::error::Result;
use crate::period::CalculationPeriod;
use crate::store::Store;
use crate::types::UserId;

const UNFINISHED: &str = "Day has unfinished bookings!";
const OVERLAPPING: &str = "Day has overlapping bookings!";
const TOO_LONG: &str = "> 10 hours worktime!";
const BREAK_TOO_SHORT: &str = "Break too short!";

const HEADER: [&str; 9] = [
    "Day",
    "Start",
    "End",
    "Presence",
    "Worktime",
    "Breaktime",
    "Total",
    "Overtime",
    "Comment",
];

/// Worktime and break limits applied to each day.
#[derive(Debug, Clone)]
pub struct WorktimePolicy {
    /// Expected worktime on Monday to Friday. Default: 480 (8 hours).
    pub daily_target_minutes: i64,

    /// Worktime above this is flagged outright. Default: 600.
    pub max_worktime_minutes: i64,

    /// Long days need at least `long_day_break_minutes` of break.
    /// Default: 540 and 45.
    pub long_day_minutes: i64,
    pub long_day_break_minutes: i64,

    /// Days over `short_day_minutes` need at least `short_day_break_minutes`.
    /// Default: 360 and 30.
    pub short_day_minutes: i64,
    pub short_day_break_minutes: i64,
}

impl Default for WorktimePolicy {
    fn default() -> Self {
        Self {
            daily_target_minutes: 480,
            max_worktime_minutes: 600,
            long_day_minutes: 540,
            long_day_break_minutes: 45,
            short_day_minutes: 360,
            short_day_break_minutes: 30,
        }
    }
}

impl WorktimePolicy {
    /// First matching rule wins.
    fn comment(&self, worktime: Duration, breaktime: Duration) -> &'static str {
        let work = worktime.num_minutes();
        let pause = breaktime.num_minutes();
        if work > self.max_worktime_minutes {
            TOO_LONG
        } else if (work > self.long_day_minutes && pause < self.long_day_break_minutes)
            || (work > self.short_day_minutes && pause < self.short_day_break_minutes)
        {
            BREAK_TOO_SHORT
        } else {
            ""
        }
    }

    fn target(&self, day: NaiveDate) -> Duration {
        match day.weekday() {
            Weekday::Sat | Weekday::Sun => Duration::zero(),
            _ => Duration::minutes(self.daily_target_minutes),
        }
    }
}

/// The "HOURS" analysis: one validated row per booked day.
///
/// Days without bookings are skipped. Days with open or overlapping
/// bookings get a row with only the day and a diagnostic comment, so one
/// bad day does not hide the rest of the report. Running total and
/// overtime carry on across such days.
pub struct DayAnalyzer<'a, S> {
    bookings: &'a S,
    policy: WorktimePolicy,
}

impl<'a, S: Store<Booking>> DayAnalyzer<'a, S> {
    pub fn new(bookings: &'a S) -> Self {
        Self::with_policy(bookings, WorktimePolicy::default())
    }

    pub const fn with_policy(bookings: &'a S, policy: WorktimePolicy) -> Self {
        Self { bookings, policy }
    }
}

fn degraded_row(day: NaiveDate, comment: &str) -> Row {
    let mut row = vec![String::new(); HEADER.len()];
    row[0] = day.to_string();
    row[HEADER.len() - 1] = comment.to_string();
    row
}

fn has_overlap(bookings: &[Booking]) -> bool {
    let intervals: Vec<_> = bookings.iter().filter_map(Booking::interval).collect();
    intervals.iter().enumerate().any(|(i, a)| {
        intervals[i + 1..].iter().any(|b| a.overlaps(b))
    })
}

impl<S: Store<Booking>> Analyzer for DayAnalyzer<'_, S> {
    fn analyze(&self, user: &UserId, period: &CalculationPeriod) -> Result<Table> {
        let mut by_day: BTreeMap<NaiveDate, Vec<Booking>> = BTreeMap::new();
        for booking in self.bookings.store_all()? {
            if booking.user() == user && period.is_in_period(booking.day()) {
                by_day.entry(booking.day()).or_default().push(booking);
            }
        }

        let mut table: Table = vec![HEADER.iter().map(ToString::to_string).collect()];
        let mut total = Duration::zero();
        let mut overtime = Duration::zero();

        for day in period.days() {
            let Some(bookings) = by_day.get_mut(day) else {
                continue;
            };
            bookings.sort_by_key(|booking| (booking.start(), booking.id()));

            if bookings.iter().any(Booking::is_open) {
                warn!(%day, "day has unfinished bookings");
                table.push(degraded_row(*day, UNFINISHED));
                continue;
            }
            if has_overlap(bookings) {
                warn!(%day, "day has overlapping bookings");
                table.push(degraded_row(*day, OVERLAPPING));
                continue;
            }

            let (Some(first), Some(last)) = (bookings.first(), bookings.last()) else {
                continue;
            };
            let (start, end) = (first.start(), last.end().unwrap_or_else(|| last.start()));
            let presence = Duration::minutes((end - start).num_minutes());
            let worktime = bookings
                .iter()
                .filter_map(Booking::interval)
                .map(|interval| interval.length())
                .fold(Duration::zero(), |sum, length| sum + length);
            let breaktime = presence - worktime;

            total += worktime;
            overtime += worktime - self.policy.target(*day);

            table.push(vec![
                day.to_string(),
                start.format("%H:%M").to_string(),
                end.format("%H:%M").to_string(),
                format_duration(presence),
                format_duration(worktime),
                format_duration(breaktime),
                format_duration(total),
                format_duration(overtime),
                self.policy.comment(worktime, breaktime).to_string(),
            ]);
        }

        Ok(table)
    }
}
