//! Shared fixtures for unit tests.

use chrono::{NaiveDate, NaiveTime};

use crate::activity::{Activity, NewActivity};
use crate::booking::{Booking, NewBooking};
use crate::store::Record;
use crate::types::{RecordId, UserId};

pub fn t(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

pub fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn user(name: &str) -> UserId {
    UserId::new(name).unwrap()
}

/// A saved activity of "alice" with readable names derived from the keys.
pub fn activity(id: i64, project_id: &str, activity_id: &str) -> Activity {
    Activity::new(NewActivity {
        user: user("alice"),
        project_name: format!("Project {project_id}"),
        activity_name: format!("Activity {activity_id}"),
        project_id: project_id.to_string(),
        activity_id: activity_id.to_string(),
        hidden: false,
    })
    .unwrap()
    .with_id(RecordId::new(id))
}

/// An unsaved, closed booking of "alice".
pub fn booking(
    on: NaiveDate,
    activity: i64,
    start: (u32, u32),
    end: (u32, u32),
    comment: &str,
) -> Booking {
    Booking::new(NewBooking {
        day: on,
        user: user("alice"),
        activity: RecordId::new(activity),
        start: t(start.0, start.1),
        end: Some(t(end.0, end.1)),
        comment: comment.to_string(),
    })
    .unwrap()
}
