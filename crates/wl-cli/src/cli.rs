//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::commands::activity::{AddActivityArgs, ListActivitiesArgs};
use crate::commands::booking::{BookArgs, BookingsArgs, BreakArgs, ChangeArgs};
use crate::commands::report::ReportArgs;
use wl_core::RecordId;

/// Work log.
///
/// Books working time against project activities and reports worktime,
/// overtime and how the time was spread across activities and projects.
#[derive(Debug, Parser)]
#[command(name = "wl", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// User to act as; overrides `user` from the config.
    #[arg(short, long, global = true)]
    pub user: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Manage users.
    #[command(subcommand)]
    User(UserAction),

    /// Manage bookable activities.
    #[command(subcommand)]
    Activity(ActivityAction),

    /// Book time on an activity, closing the day's open booking.
    Book(BookArgs),

    /// Change fields of an existing booking.
    Change(ChangeArgs),

    /// Insert a break into a booking, splitting it in two.
    Break(BreakArgs),

    /// List bookings with their ids.
    Bookings(BookingsArgs),

    /// Delete a booking.
    Delete {
        /// Booking id.
        id: RecordId,
    },

    /// Run an analysis (HOURS, ACTIVITIES or PROJECTS) over a period.
    Report(ReportArgs),

    /// Write a JSON backup of all records to stdout.
    Export,

    /// Restore records from a JSON backup on stdin, keeping their ids.
    Import,
}

/// User subcommands.
#[derive(Debug, Subcommand)]
pub enum UserAction {
    /// Register a user.
    Add {
        /// User name.
        name: String,
    },
    /// List registered users.
    List,
}

/// Activity subcommands.
#[derive(Debug, Subcommand)]
pub enum ActivityAction {
    /// Create an activity for the current user.
    Add(AddActivityArgs),
    /// List the current user's activities.
    List(ListActivitiesArgs),
    /// Hide an activity from new bookings.
    Hide {
        /// Activity id.
        id: RecordId,
    },
    /// Make a hidden activity bookable again.
    Unhide {
        /// Activity id.
        id: RecordId,
    },
}
