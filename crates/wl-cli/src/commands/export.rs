//! Export command: writes every stored record as one JSON backup document.

use std::io::Write;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use wl_core::{Activity, Booking, Store, User};
use wl_db::Database;

/// Backup document shared with `wl import`.
#[derive(Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Backup {
    #[serde(default)]
    pub users: Vec<User>,
    #[serde(default)]
    pub activities: Vec<Activity>,
    #[serde(default)]
    pub bookings: Vec<Booking>,
}

impl Backup {
    /// Reads all records from the database.
    pub fn collect(db: &Database) -> Result<Self> {
        Ok(Self {
            users: Store::<User>::store_all(db)?,
            activities: Store::<Activity>::store_all(db)?,
            bookings: Store::<Booking>::store_all(db)?,
        })
    }
}

pub fn run<W: Write>(writer: &mut W, db: &Database) -> Result<()> {
    let backup = Backup::collect(db)?;
    tracing::debug!(
        users = backup.users.len(),
        activities = backup.activities.len(),
        bookings = backup.bookings.len(),
        "exporting backup"
    );
    serde_json::to_writer_pretty(&mut *writer, &backup)?;
    writeln!(writer)?;
    Ok(())
}
