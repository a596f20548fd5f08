//! Activity management commands.

use std::io::Write;

use anyhow::Result;
use clap::Args;

use wl_core::{Activity, ActivityService, NewActivity, RecordId, UserId};
use wl_db::Database;

use super::util::{find_activity, id_label, render_table};

#[derive(Debug, Args)]
pub struct AddActivityArgs {
    /// Project identifier, e.g. the cost center.
    #[arg(long)]
    pub project_id: String,
    /// Project display name.
    #[arg(long)]
    pub project: String,
    /// Activity identifier within the project.
    #[arg(long)]
    pub activity_id: String,
    /// Activity display name.
    #[arg(long)]
    pub name: String,
}

#[derive(Debug, Args)]
pub struct ListActivitiesArgs {
    /// Include hidden activities.
    #[arg(long)]
    pub all: bool,
}

pub fn add<W: Write>(
    writer: &mut W,
    db: &Database,
    user: &UserId,
    args: &AddActivityArgs,
) -> Result<Activity> {
    let activity = ActivityService::new(db).add_activity(NewActivity {
        user: user.clone(),
        project_name: args.project.clone(),
        activity_name: args.name.clone(),
        project_id: args.project_id.clone(),
        activity_id: args.activity_id.clone(),
        hidden: false,
    })?;
    writeln!(
        writer,
        "Added activity #{} {} ({})",
        id_label(activity.id()),
        activity.composite_id(),
        activity.display_name()
    )?;
    Ok(activity)
}

pub fn list<W: Write>(
    writer: &mut W,
    db: &Database,
    user: &UserId,
    args: &ListActivitiesArgs,
) -> Result<()> {
    let activities = ActivityService::new(db).activities(user, args.all)?;
    if activities.is_empty() {
        writeln!(writer, "No activities.")?;
        return Ok(());
    }

    let mut rows = vec![
        ["Id", "Key", "Project", "Activity", ""]
            .map(String::from)
            .to_vec(),
    ];
    for activity in &activities {
        rows.push(vec![
            id_label(activity.id()),
            activity.composite_id(),
            activity.project_name().to_string(),
            activity.activity_name().to_string(),
            if activity.is_hidden() { "hidden" } else { "" }.to_string(),
        ]);
    }
    write!(writer, "{}", render_table(&rows))?;
    Ok(())
}

pub fn set_hidden<W: Write>(
    writer: &mut W,
    db: &Database,
    user: &UserId,
    id: RecordId,
    hidden: bool,
) -> Result<Activity> {
    let activity = find_activity(db, user, id)?;
    let activity = ActivityService::new(db).set_hidden(&activity, hidden)?;
    let state = if hidden { "Hid" } else { "Unhid" };
    writeln!(writer, "{state} activity #{id} {}", activity.composite_id())?;
    Ok(activity)
}
