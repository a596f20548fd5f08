//! Percentage allocation of booked time across activities or projects.

use std::collections::HashMap;

use chrono::Duration;
use tracing::error;

use super::{Analyzer, Row, Table, format_duration, format_percentage};
use crate::activity::Activity;
use crate::booking::Booking;
use crate::error::{Error, Result};
use crate::period::CalculationPeriod;
use crate::store::Store;
use crate::types::{RecordId, UserId};

/// How bookings are grouped and labelled in an allocation report.
#[derive(Debug, Clone, Copy)]
pub struct Grouping {
    /// Header labels of the key columns.
    pub labels: &'static [&'static str],
    /// Grouping identity; rows are sorted by it, ignoring case.
    pub key: fn(&Activity) -> String,
    /// Display values for the key columns, one per label.
    pub columns: fn(&Activity) -> Vec<String>,
}

impl Grouping {
    /// One row per `projectId:activityId`.
    pub fn by_activity() -> Self {
        Self {
            labels: &["Activity Id", "Activity"],
            key: Activity::composite_id,
            columns: |activity| vec![activity.composite_id(), activity.display_name()],
        }
    }

    /// One row per `projectId`.
    pub fn by_project() -> Self {
        Self {
            labels: &["Project Id"],
            key: |activity| activity.project_id().to_string(),
            columns: |activity| vec![activity.project_id().to_string()],
        }
    }
}

/// Time booked against one grouping key.
#[derive(Debug)]
struct Allocation {
    key: String,
    columns: Vec<String>,
    time: Duration,
    comments: Vec<String>,
}

/// The "ACTIVITIES" and "PROJECTS" analyses.
///
/// Only closed bookings count. Each key gets its booked time, its share of
/// the total and, for single-day periods, the comments of its bookings.
pub struct AllocationAnalyzer<'a, B, A> {
    bookings: &'a B,
    activities: &'a A,
    grouping: Grouping,
}

impl<'a, B, A> AllocationAnalyzer<'a, B, A>
where
    B: Store<Booking>,
    A: Store<Activity>,
{
    pub const fn new(bookings: &'a B, activities: &'a A, grouping: Grouping) -> Self {
        Self {
            bookings,
            activities,
            grouping,
        }
    }

    fn resolve<'c>(
        &self,
        cache: &'c mut HashMap<RecordId, Activity>,
        booking: &Booking,
    ) -> Result<&'c Activity> {
        let id = booking.activity();
        if !cache.contains_key(&id) {
            let Some(activity) = self.activities.find_by_id(id)? else {
                error!(day = %booking.day(), activity = %id, "booking references unknown activity");
                return Err(Error::UnknownActivity {
                    day: booking.day(),
                    activity: id,
                });
            };
            cache.insert(id, activity);
        }
        cache.get(&id).ok_or(Error::UnknownActivity {
            day: booking.day(),
            activity: id,
        })
    }

    fn header(&self, with_comments: bool) -> Row {
        let mut row: Row = self.grouping.labels.iter().map(ToString::to_string).collect();
        row.push("Time".to_string());
        row.push("Percentage".to_string());
        if with_comments {
            row.push("Comments".to_string());
        }
        row
    }

    fn footer(&self, total: Duration, with_comments: bool) -> Row {
        let mut row = vec![String::new(); self.grouping.labels.len()];
        row[0] = "Total".to_string();
        row.push(format_duration(total));
        row.push(format_percentage(100.0));
        if with_comments {
            row.push(String::new());
        }
        row
    }
}

#[allow(clippy::cast_precision_loss)]
fn share(part: Duration, total: Duration) -> f64 {
    part.num_minutes() as f64 / total.num_minutes() as f64 * 100.0
}

impl<B, A> Analyzer for AllocationAnalyzer<'_, B, A>
where
    B: Store<Booking>,
    A: Store<Activity>,
{
    fn analyze(&self, user: &UserId, period: &CalculationPeriod) -> Result<Table> {
        let mut bookings: Vec<Booking> = self
            .bookings
            .store_all()?
            .into_iter()
            .filter(|booking| booking.user() == user && period.is_in_period(booking.day()))
            .filter(|booking| !booking.is_open())
            .collect();
        bookings.sort_by_key(|booking| (booking.day(), booking.start(), booking.id()));

        let mut cache = HashMap::new();
        let mut allocations: HashMap<String, Allocation> = HashMap::new();
        let mut total = Duration::zero();

        for booking in &bookings {
            let Some(interval) = booking.interval() else {
                continue;
            };
            let activity = self.resolve(&mut cache, booking)?;
            let key = (self.grouping.key)(activity);
            let allocation = allocations
                .entry(key.clone())
                .or_insert_with(|| Allocation {
                    key,
                    columns: (self.grouping.columns)(activity),
                    time: Duration::zero(),
                    comments: Vec::new(),
                });
            allocation.time += interval.length();
            total += interval.length();
            if !booking.comment().is_empty() {
                allocation.comments.push(booking.comment().to_string());
            }
        }

        let with_comments = period.is_day_period();
        let mut table = vec![self.header(with_comments)];

        if total > Duration::zero() {
            let mut allocations: Vec<Allocation> = allocations.into_values().collect();
            allocations.sort_by(|a, b| {
                a.key
                    .to_lowercase()
                    .cmp(&b.key.to_lowercase())
                    .then_with(|| a.key.cmp(&b.key))
            });

            for allocation in allocations {
                let mut row = allocation.columns;
                row.push(format_duration(allocation.time));
                row.push(format_percentage(share(allocation.time, total)));
                if with_comments {
                    row.push(allocation.comments.join(", "));
                }
                table.push(row);
            }
        }

        table.push(self.footer(total, with_comments));
        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::booking::NewBooking;
    use crate::error::ErrorKind;
    use crate::store::MemoryStore;
    use crate::testing::{activity, booking, day, t, user};
    use insta::assert_snapshot;

    struct Fixture {
        bookings: MemoryStore<Booking>,
        activities: MemoryStore<Activity>,
    }

    impl Fixture {
        fn new() -> Self {
            let activities = MemoryStore::new();
            for (id, project, sub) in [(1, "tt", "DEV"), (2, "TT", "OPS"), (3, "ABC", "DEV")] {
                activities.save(activity(id, project, sub)).unwrap();
            }
            Self {
                bookings: MemoryStore::new(),
                activities,
            }
        }

        fn book(&self, booking: Booking) {
            self.bookings.save(booking).unwrap();
        }

        fn analyze(&self, grouping: Grouping, period: &CalculationPeriod) -> Result<Table> {
            AllocationAnalyzer::new(&self.bookings, &self.activities, grouping)
                .analyze(&user("alice"), period)
        }
    }

    fn rendered(table: &Table) -> String {
        table
            .iter()
            .map(|row| row.join("|"))
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn percentages(table: &Table) -> Vec<&str> {
        table[1..table.len() - 1]
            .iter()
            .map(|row| row[row.len() - 2].as_str())
            .collect()
    }

    #[test]
    fn activity_rows_on_a_day_include_comments() {
        let fixture = Fixture::new();
        let wednesday = day(2025, 1, 29);
        fixture.book(booking(wednesday, 1, (8, 0), (10, 0), "review"));
        fixture.book(booking(wednesday, 2, (10, 0), (11, 0), ""));
        fixture.book(booking(wednesday, 1, (11, 0), (12, 0), "fixes"));
        fixture.book(booking(wednesday, 1, (12, 0), (13, 0), ""));
        fixture.book(booking(wednesday, 3, (13, 0), (17, 0), ""));

        let table = fixture
            .analyze(Grouping::by_activity(), &CalculationPeriod::day(wednesday).unwrap())
            .unwrap();

        assert_snapshot!(rendered(&table), @r"
        Activity Id|Activity|Time|Percentage|Comments
        ABC:DEV|Project ABC:Activity DEV| 04:00|44.4%|
        tt:DEV|Project tt:Activity DEV| 04:00|44.4%|review, fixes
        TT:OPS|Project TT:Activity OPS| 01:00|11.1%|
        Total|| 09:00|100.0%|
        ");
    }

    #[test]
    fn project_rows_over_a_week_omit_comments() {
        let fixture = Fixture::new();
        fixture.book(booking(day(2025, 1, 27), 1, (8, 0), (9, 0), "ignored"));
        fixture.book(booking(day(2025, 1, 28), 2, (8, 0), (10, 0), ""));
        fixture.book(booking(day(2025, 1, 29), 3, (8, 0), (9, 0), ""));

        let week = CalculationPeriod::week_of(day(2025, 1, 29)).unwrap();
        let table = fixture.analyze(Grouping::by_project(), &week).unwrap();

        assert_eq!(
            table,
            vec![
                vec!["Project Id", "Time", "Percentage"],
                vec!["ABC", " 01:00", "25.0%"],
                vec!["TT", " 02:00", "50.0%"],
                vec!["tt", " 01:00", "25.0%"],
                vec!["Total", " 04:00", "100.0%"],
            ]
        );
    }

    #[test]
    fn open_bookings_and_other_days_do_not_count() {
        let fixture = Fixture::new();
        let wednesday = day(2025, 1, 29);
        fixture.book(booking(wednesday, 1, (8, 0), (9, 0), "counted"));
        fixture.book(booking(day(2025, 1, 30), 2, (8, 0), (9, 0), "next day"));
        fixture.book(
            Booking::new(NewBooking {
                day: wednesday,
                user: user("alice"),
                activity: RecordId::new(2),
                start: t(9, 0),
                end: None,
                comment: "still running".to_string(),
            })
            .unwrap(),
        );

        let table = fixture
            .analyze(Grouping::by_activity(), &CalculationPeriod::day(wednesday).unwrap())
            .unwrap();

        assert_eq!(
            table,
            vec![
                vec!["Activity Id", "Activity", "Time", "Percentage", "Comments"],
                vec!["tt:DEV", "Project tt:Activity DEV", " 01:00", "100.0%", "counted"],
                vec!["Total", "", " 01:00", "100.0%", ""],
            ]
        );
    }

    #[test]
    fn empty_period_yields_header_and_zero_footer() {
        let fixture = Fixture::new();
        let week = CalculationPeriod::week_of(day(2025, 1, 29)).unwrap();

        let table = fixture.analyze(Grouping::by_activity(), &week).unwrap();

        assert_eq!(
            table,
            vec![
                vec!["Activity Id", "Activity", "Time", "Percentage"],
                vec!["Total", "", " 00:00", "100.0%"],
            ]
        );
    }

    #[test]
    fn percentages_sum_to_hundred_within_rounding() {
        let fixture = Fixture::new();
        let wednesday = day(2025, 1, 29);
        fixture.book(booking(wednesday, 1, (8, 0), (8, 20), ""));
        fixture.book(booking(wednesday, 2, (8, 20), (8, 40), ""));
        fixture.book(booking(wednesday, 3, (8, 40), (9, 0), ""));

        let table = fixture
            .analyze(Grouping::by_activity(), &CalculationPeriod::day(wednesday).unwrap())
            .unwrap();

        let shares = percentages(&table);
        assert_eq!(shares, vec!["33.3%", "33.3%", "33.3%"]);
        let sum: f64 = shares
            .iter()
            .map(|share| share.trim_end_matches('%').parse::<f64>().unwrap())
            .sum();
        assert!((sum - 100.0).abs() <= 0.15, "sum was {sum}");
    }

    #[test]
    fn unknown_activity_is_a_data_integrity_error() {
        let fixture = Fixture::new();
        let wednesday = day(2025, 1, 29);
        fixture.book(booking(wednesday, 42, (8, 0), (9, 0), ""));

        let err = fixture
            .analyze(Grouping::by_project(), &CalculationPeriod::day(wednesday).unwrap())
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::DataIntegrity);
        assert!(matches!(
            err,
            Error::UnknownActivity { activity, .. } if activity == RecordId::new(42)
        ));
    }
}
