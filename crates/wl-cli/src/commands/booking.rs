//! Booking commands: book, change, break, list and delete.

use std::io::Write;

use anyhow::{Result, bail};
use chrono::{NaiveDate, NaiveTime, TimeDelta};
use clap::Args;

use wl_core::{
    Activity, AddBooking, Booking, BookingService, BookingUpdate, RecordId, Store, UserId,
};
use wl_db::Database;

use super::util::{PeriodArgs, find_activity, find_booking, id_label, render_table};

#[derive(Debug, Args)]
pub struct BookArgs {
    /// Activity id.
    pub activity: RecordId,
    /// Start time (HH:MM).
    pub start: NaiveTime,
    /// End time (HH:MM); leave out to keep the booking open.
    #[arg(long)]
    pub end: Option<NaiveTime>,
    /// Day of the booking (YYYY-MM-DD), defaults to today.
    #[arg(long)]
    pub day: Option<NaiveDate>,
    /// Free-text comment.
    #[arg(long)]
    pub comment: Option<String>,
}

#[derive(Debug, Args)]
pub struct ChangeArgs {
    /// Booking id.
    pub id: RecordId,
    /// Move the booking to another day (YYYY-MM-DD).
    #[arg(long)]
    pub day: Option<NaiveDate>,
    /// Book on another activity id.
    #[arg(long)]
    pub activity: Option<RecordId>,
    /// New start time (HH:MM).
    #[arg(long)]
    pub start: Option<NaiveTime>,
    /// New end time (HH:MM).
    #[arg(long)]
    pub end: Option<NaiveTime>,
    /// New comment.
    #[arg(long)]
    pub comment: Option<String>,
}

#[derive(Debug, Args)]
pub struct BreakArgs {
    /// Booking id.
    pub id: RecordId,
    /// Break start (HH:MM).
    pub start: NaiveTime,
    /// Break length in minutes; defaults to `break_minutes` from the config.
    #[arg(long)]
    pub minutes: Option<i64>,
}

#[derive(Debug, Args)]
pub struct BookingsArgs {
    #[command(flatten)]
    pub period: PeriodArgs,
}

fn describe(booking: &Booking, activity: &Activity) -> String {
    let end = booking
        .end()
        .map_or_else(|| "open".to_string(), |end| end.format("%H:%M").to_string());
    format!(
        "#{} {} {}-{} {}",
        id_label(booking.id()),
        booking.day(),
        booking.start().format("%H:%M"),
        end,
        activity.composite_id()
    )
}

pub fn book<W: Write>(
    writer: &mut W,
    db: &Database,
    user: &UserId,
    args: &BookArgs,
    today: NaiveDate,
) -> Result<Booking> {
    let activity = find_activity(db, user, args.activity)?;
    let booking = BookingService::new(db).add_booking(AddBooking {
        day: args.day.unwrap_or(today),
        user: user.clone(),
        activity: &activity,
        start: args.start,
        end: args.end,
        comment: args.comment.clone(),
    })?;
    writeln!(writer, "Booked {}", describe(&booking, &activity))?;
    Ok(booking)
}

pub fn change<W: Write>(
    writer: &mut W,
    db: &Database,
    user: &UserId,
    args: &ChangeArgs,
) -> Result<Booking> {
    let booking = find_booking(db, user, args.id)?;
    let new_activity = args
        .activity
        .map(|id| find_activity(db, user, id))
        .transpose()?;

    let changed = BookingService::new(db).change_booking(
        &booking,
        BookingUpdate {
            day: args.day,
            activity: new_activity.as_ref(),
            start: args.start,
            end: args.end,
            comment: args.comment.clone(),
        },
    )?;
    let activity = find_activity(db, user, changed.activity())?;
    writeln!(writer, "Changed {}", describe(&changed, &activity))?;
    Ok(changed)
}

pub fn add_break<W: Write>(
    writer: &mut W,
    db: &Database,
    user: &UserId,
    args: &BreakArgs,
    default_minutes: i64,
) -> Result<Booking> {
    let booking = find_booking(db, user, args.id)?;
    let minutes = args.minutes.unwrap_or(default_minutes);
    let Some(duration) = TimeDelta::try_minutes(minutes) else {
        bail!("break of {minutes} minutes is out of range");
    };
    let tail = BookingService::new(db).add_break_to_booking(&booking, args.start, duration)?;
    writeln!(
        writer,
        "Inserted {minutes} minute break into #{}; continued as #{}",
        args.id,
        id_label(tail.id())
    )?;
    Ok(tail)
}

pub fn list<W: Write>(
    writer: &mut W,
    db: &Database,
    user: &UserId,
    args: &BookingsArgs,
    today: NaiveDate,
) -> Result<()> {
    let period = args.period.resolve(today)?;
    let mut bookings: Vec<Booking> = Store::<Booking>::store_all(db)?
        .into_iter()
        .filter(|booking| booking.user() == user && period.is_in_period(booking.day()))
        .collect();
    bookings.sort_by_key(|booking| (booking.day(), booking.start(), booking.id()));

    if bookings.is_empty() {
        writeln!(writer, "No bookings.")?;
        return Ok(());
    }

    let mut rows = vec![
        ["Id", "Day", "Start", "End", "Activity", "Comment"]
            .map(String::from)
            .to_vec(),
    ];
    for booking in &bookings {
        let activity: Option<Activity> = db.find_by_id(booking.activity())?;
        rows.push(vec![
            id_label(booking.id()),
            booking.day().to_string(),
            booking.start().format("%H:%M").to_string(),
            booking
                .end()
                .map(|end| end.format("%H:%M").to_string())
                .unwrap_or_default(),
            activity.map_or_else(
                || format!("?{}", booking.activity()),
                |activity| activity.composite_id(),
            ),
            booking.comment().to_string(),
        ]);
    }
    write!(writer, "{}", render_table(&rows))?;
    Ok(())
}

pub fn delete<W: Write>(writer: &mut W, db: &Database, user: &UserId, id: RecordId) -> Result<()> {
    let booking = find_booking(db, user, id)?;
    let Some(id) = booking.id() else {
        bail!("booking not found: {id}");
    };
    Store::<Booking>::delete_by_id(db, id)?;
    writeln!(writer, "Deleted booking #{id}")?;
    Ok(())
}
