//! Shared utilities for CLI commands.

use anyhow::{Context, Result, anyhow, bail};
use chrono::{Local, NaiveDate, TimeDelta};
use clap::Args;

use wl_core::{Activity, Booking, CalculationPeriod, RecordId, Store, User, UserId};
use wl_db::Database;

use crate::Config;

/// Period selection shared by `bookings` and `report`.
///
/// Without flags the period is the single day given by `--day`, or today.
#[derive(Debug, Clone, Default, Args)]
pub struct PeriodArgs {
    /// Day to report on, or the day whose week or month to use (YYYY-MM-DD).
    #[arg(long, conflicts_with = "from")]
    pub day: Option<NaiveDate>,

    /// Use the Monday-to-Sunday week containing the day.
    #[arg(long, conflicts_with_all = ["month", "from"])]
    pub week: bool,

    /// Use the calendar month containing the day.
    #[arg(long, conflicts_with = "from")]
    pub month: bool,

    /// First day of an explicit range (YYYY-MM-DD).
    #[arg(long, requires = "to")]
    pub from: Option<NaiveDate>,

    /// Last day of an explicit range, inclusive (YYYY-MM-DD).
    #[arg(long, requires = "from")]
    pub to: Option<NaiveDate>,
}

impl PeriodArgs {
    /// Resolves the selected period relative to `today`.
    pub fn resolve(&self, today: NaiveDate) -> Result<CalculationPeriod> {
        if let (Some(from), Some(to)) = (self.from, self.to) {
            let after = to
                .checked_add_signed(TimeDelta::days(1))
                .ok_or_else(|| anyhow!("date out of range: {to}"))?;
            return CalculationPeriod::new(from, after)
                .with_context(|| format!("invalid range {from} to {to}"));
        }

        let anchor = self.day.unwrap_or(today);
        let period = if self.week {
            CalculationPeriod::week_of(anchor)
        } else if self.month {
            CalculationPeriod::month_of(anchor)
        } else {
            CalculationPeriod::day(anchor)
        };
        Ok(period?)
    }
}

/// Today's date in the local time zone.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Resolves the acting user from `--user` or the config and checks it is registered.
pub fn resolve_user(db: &Database, cli_user: Option<&str>, config: &Config) -> Result<UserId> {
    let Some(name) = cli_user.or(config.user.as_deref()) else {
        bail!("no user given; pass --user or set `user` in the config file");
    };
    let name = UserId::new(name.trim()).context("invalid user name")?;
    if db.find_user(&name)?.is_none() {
        bail!("unknown user: {name} (register it with `wl user add {name}`)");
    }
    Ok(name)
}

/// Registers `name` unless a user with that name already exists.
pub fn ensure_user(db: &Database, name: &UserId) -> Result<User> {
    if let Some(user) = db.find_user(name)? {
        return Ok(user);
    }
    Ok(db.save(User::new(name.clone()))?)
}

/// Loads an activity of `user` by id.
pub fn find_activity(db: &Database, user: &UserId, id: RecordId) -> Result<Activity> {
    let activity: Option<Activity> = db.find_by_id(id)?;
    match activity {
        Some(activity) if activity.user() == user => Ok(activity),
        _ => bail!("activity not found: {id}"),
    }
}

/// Loads a booking of `user` by id.
pub fn find_booking(db: &Database, user: &UserId, id: RecordId) -> Result<Booking> {
    let booking: Option<Booking> = db.find_by_id(id)?;
    match booking {
        Some(booking) if booking.user() == user => Ok(booking),
        _ => bail!("booking not found: {id}"),
    }
}

/// Display form of an optional record id.
pub fn id_label(id: Option<RecordId>) -> String {
    id.map_or_else(|| "-".to_string(), |id| id.to_string())
}

/// Renders rows as left-aligned columns separated by two spaces.
pub fn render_table(rows: &[Vec<String>]) -> String {
    let columns = rows.iter().map(Vec::len).max().unwrap_or(0);
    let widths: Vec<usize> = (0..columns)
        .map(|col| {
            rows.iter()
                .filter_map(|row| row.get(col))
                .map(|cell| cell.chars().count())
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut output = String::new();
    for row in rows {
        let line = row
            .iter()
            .zip(&widths)
            .map(|(cell, &width)| format!("{cell:<width$}"))
            .collect::<Vec<_>>()
            .join("  ");
        output.push_str(line.trim_end());
        output.push('\n');
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn default_period_is_today() {
        let period = PeriodArgs::default().resolve(day(2025, 1, 29)).unwrap();
        assert!(period.is_day_period());
        assert_eq!(period.first_day(), day(2025, 1, 29));
    }

    #[test]
    fn week_uses_the_given_day() {
        let args = PeriodArgs {
            day: Some(day(2025, 2, 2)),
            week: true,
            ..PeriodArgs::default()
        };
        let period = args.resolve(day(2025, 6, 1)).unwrap();
        assert_eq!(period.first_day(), day(2025, 1, 27));
        assert_eq!(period.last_day(), day(2025, 2, 2));
    }

    #[test]
    fn month_covers_all_days() {
        let args = PeriodArgs {
            month: true,
            ..PeriodArgs::default()
        };
        let period = args.resolve(day(2024, 2, 10)).unwrap();
        assert_eq!(period.days().len(), 29);
    }

    #[test]
    fn explicit_range_includes_last_day() {
        let args = PeriodArgs {
            from: Some(day(2025, 1, 1)),
            to: Some(day(2025, 1, 3)),
            ..PeriodArgs::default()
        };
        let period = args.resolve(day(2025, 6, 1)).unwrap();
        assert_eq!(period.days().len(), 3);
        assert_eq!(period.last_day(), day(2025, 1, 3));
    }

    #[test]
    fn reversed_range_is_rejected() {
        let args = PeriodArgs {
            from: Some(day(2025, 1, 3)),
            to: Some(day(2025, 1, 1)),
            ..PeriodArgs::default()
        };
        assert!(args.resolve(day(2025, 6, 1)).is_err());
    }

    #[test]
    fn resolve_user_prefers_cli_over_config() {
        let db = Database::open_in_memory().unwrap();
        ensure_user(&db, &UserId::new("alice").unwrap()).unwrap();
        let config = Config {
            user: Some("bob".to_string()),
            ..Config::default()
        };

        let user = resolve_user(&db, Some("alice"), &config).unwrap();
        assert_eq!(user.as_str(), "alice");

        let err = resolve_user(&db, None, &config).unwrap_err();
        assert!(err.to_string().contains("unknown user: bob"));
    }

    #[test]
    fn resolve_user_requires_a_name() {
        let db = Database::open_in_memory().unwrap();
        let err = resolve_user(&db, None, &Config::default()).unwrap_err();
        assert!(err.to_string().contains("no user given"));
    }

    #[test]
    fn render_table_aligns_columns_without_trailing_space() {
        let rows = vec![
            vec!["Id".to_string(), "Name".to_string(), String::new()],
            vec!["10".to_string(), "x".to_string(), "done".to_string()],
        ];
        assert_eq!(render_table(&rows), "Id  Name\n10  x     done\n");
    }
}
