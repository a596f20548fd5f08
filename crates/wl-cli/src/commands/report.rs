//! Report command: runs a registered analysis and prints its table.

use std::io::Write;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Args;

use wl_core::{AnalysisRegistry, Table, UserId};
use wl_db::Database;

use super::util::{PeriodArgs, render_table};

#[derive(Debug, Args)]
pub struct ReportArgs {
    /// Analysis to run: HOURS, ACTIVITIES or PROJECTS.
    pub analysis: String,

    #[command(flatten)]
    pub period: PeriodArgs,

    /// Output as JSON (an array of rows, header first).
    #[arg(long)]
    pub json: bool,
}

/// Formats an analysis table as JSON.
pub fn format_report_json(table: &Table) -> Result<String> {
    Ok(serde_json::to_string_pretty(table)?)
}

// ========== Public Interface ==========

/// Runs the report command.
pub fn run<W: Write>(
    writer: &mut W,
    db: &Database,
    user: &UserId,
    args: &ReportArgs,
    today: NaiveDate,
) -> Result<()> {
    let period = args.period.resolve(today)?;
    let registry = AnalysisRegistry::new(db, db);
    let table = registry
        .analyze(&args.analysis, user.as_str(), Some(&period))
        .with_context(|| {
            let known: Vec<&str> = registry.ids().collect();
            format!(
                "{} report failed (available: {})",
                args.analysis.trim(),
                known.join(", ")
            )
        })?;

    if args.json {
        writeln!(writer, "{}", format_report_json(&table)?)?;
    } else {
        write!(writer, "{}", render_table(&table))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;
    use insta::assert_snapshot;
    use wl_core::{ActivityService, AddBooking, BookingService, NewActivity};

    use crate::commands::util::ensure_user;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    /// Alice's Monday and Wednesday of the week of 2025-01-27.
    fn seeded() -> (Database, UserId) {
        let db = Database::open_in_memory().unwrap();
        let user = UserId::new("alice").unwrap();
        ensure_user(&db, &user).unwrap();

        let activities = ActivityService::new(&db);
        let add = |project_id: &str, activity_id: &str, name: &str| {
            activities
                .add_activity(NewActivity {
                    user: user.clone(),
                    project_name: format!("Project {project_id}"),
                    activity_name: name.to_string(),
                    project_id: project_id.to_string(),
                    activity_id: activity_id.to_string(),
                    hidden: false,
                })
                .unwrap()
        };
        let dev = add("WL", "DEV", "Development");
        let ops = add("WL", "OPS", "Operations");
        let sales = add("ACME", "PRE", "Presales");

        let bookings = BookingService::new(&db);
        let book = |on, activity, start, end, comment: &str| {
            bookings
                .add_booking(AddBooking {
                    day: on,
                    user: user.clone(),
                    activity,
                    start,
                    end: Some(end),
                    comment: Some(comment.to_string()),
                })
                .unwrap();
        };
        let monday = day(2025, 1, 27);
        book(monday, &dev, t(8, 0), t(12, 0), "sprint");
        book(monday, &ops, t(12, 30), t(16, 30), "");
        let wednesday = day(2025, 1, 29);
        book(wednesday, &dev, t(8, 15), t(12, 0), "review");
        book(wednesday, &sales, t(12, 0), t(13, 0), "call");
        book(wednesday, &dev, t(13, 0), t(16, 45), "fixes");
        (db, user)
    }

    fn report(db: &Database, user: &UserId, analysis: &str, period: PeriodArgs, json: bool) -> String {
        let mut output = Vec::new();
        let args = ReportArgs {
            analysis: analysis.to_string(),
            period,
            json,
        };
        run(&mut output, db, user, &args, day(2025, 1, 29)).unwrap();
        String::from_utf8(output).unwrap()
    }

    fn week() -> PeriodArgs {
        PeriodArgs {
            week: true,
            ..PeriodArgs::default()
        }
    }

    #[test]
    fn hours_over_a_week() {
        let (db, user) = seeded();
        assert_snapshot!(report(&db, &user, "HOURS", week(), false), @r"
        Day         Start  End    Presence  Worktime  Breaktime  Total   Overtime  Comment
        2025-01-27  08:00  16:30   08:30     08:00     00:30      08:00   00:00
        2025-01-29  08:15  16:45   08:30     08:30     00:00      16:30   00:30    Break too short!
        ");
    }

    #[test]
    fn activities_on_a_day_include_comments() {
        let (db, user) = seeded();
        assert_snapshot!(report(&db, &user, "activities", PeriodArgs::default(), false), @r"
        Activity Id  Activity                Time    Percentage  Comments
        ACME:PRE     Project ACME:Presales    01:00  11.8%       call
        WL:DEV       Project WL:Development   07:30  88.2%       review, fixes
        Total                                 08:30  100.0%
        ");
    }

    #[test]
    fn projects_over_a_week_as_json() {
        let (db, user) = seeded();
        assert_snapshot!(report(&db, &user, "PROJECTS", week(), true), @r#"
        [
          [
            "Project Id",
            "Time",
            "Percentage"
          ],
          [
            "ACME",
            " 01:00",
            "6.1%"
          ],
          [
            "WL",
            " 15:30",
            "93.9%"
          ],
          [
            "Total",
            " 16:30",
            "100.0%"
          ]
        ]
        "#);
    }

    #[test]
    fn unknown_analysis_lists_available_ids() {
        let (db, user) = seeded();
        let args = ReportArgs {
            analysis: "WEEKDAYS".to_string(),
            period: PeriodArgs::default(),
            json: false,
        };
        let err = run(&mut Vec::new(), &db, &user, &args, day(2025, 1, 29)).unwrap_err();
        assert_eq!(
            err.to_string(),
            "WEEKDAYS report failed (available: ACTIVITIES, HOURS, PROJECTS)"
        );
    }
}
