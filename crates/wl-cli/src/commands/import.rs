//! Import command for restoring a JSON backup into the local `SQLite` store.

use std::io::Read;

use anyhow::{Context, Result};

use wl_core::Store;
use wl_db::Database;

use super::export::Backup;

/// Number of records restored per kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportSummary {
    pub users: usize,
    pub activities: usize,
    pub bookings: usize,
}

pub fn run<R: Read>(reader: R, db: &Database) -> Result<ImportSummary> {
    let backup: Backup = serde_json::from_reader(reader).context("invalid backup JSON")?;
    restore(db, backup)
}

/// Saves every record in one transaction, keeping ids where present.
fn restore(db: &Database, backup: Backup) -> Result<ImportSummary> {
    let summary = ImportSummary {
        users: backup.users.len(),
        activities: backup.activities.len(),
        bookings: backup.bookings.len(),
    };
    db.in_transaction(|| -> Result<()> {
        for user in backup.users {
            db.save(user)?;
        }
        for activity in backup.activities {
            db.save(activity)?;
        }
        for booking in backup.bookings {
            db.save(booking)?;
        }
        Ok(())
    })?;
    tracing::debug!(?summary, "imported backup");
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wl_core::{Activity, Booking, RecordId, User};

    use crate::commands::export;

    const BACKUP: &str = r#"{
        "users": [{"id": 3, "name": "alice"}],
        "activities": [{
            "id": 5, "user": "alice", "project_name": "Work Log", "activity_name": "Development",
            "project_id": "WL", "activity_id": "DEV", "hidden": true
        }],
        "bookings": [
            {"id": 9, "day": "2025-01-29", "user": "alice", "activity": 5,
             "start": "08:00:00", "end": "12:00:00", "comment": "sprint"},
            {"day": "2025-01-29", "user": "alice", "activity": 5, "start": "13:00:00"}
        ]
    }"#;

    #[test]
    fn restores_records_under_their_ids() {
        let db = Database::open_in_memory().unwrap();
        let summary = run(BACKUP.as_bytes(), &db).unwrap();
        assert_eq!(
            summary,
            ImportSummary {
                users: 1,
                activities: 1,
                bookings: 2,
            }
        );

        let activity: Option<Activity> = db.find_by_id(RecordId::new(5)).unwrap();
        assert!(activity.unwrap().is_hidden());
        let booking: Option<Booking> = db.find_by_id(RecordId::new(9)).unwrap();
        assert_eq!(booking.unwrap().comment(), "sprint");
        let open: Option<Booking> = db.find_by_id(RecordId::new(10)).unwrap();
        assert!(open.unwrap().is_open());
        let users: Vec<User> = db.store_all().unwrap();
        assert_eq!(users[0].id(), Some(RecordId::new(3)));
    }

    #[test]
    fn invalid_records_abort_the_whole_import() {
        let db = Database::open_in_memory().unwrap();
        let backup = r#"{
            "users": [{"name": "alice"}],
            "bookings": [{"day": "2025-01-29", "user": "alice", "activity": 1,
                          "start": "09:00:00", "end": "08:00:00"}]
        }"#;

        assert!(run(backup.as_bytes(), &db).is_err());
        let users: Vec<User> = db.store_all().unwrap();
        assert!(users.is_empty());
    }

    #[test]
    fn export_then_import_into_a_file_database() {
        let temp = tempfile::tempdir().unwrap();
        let source = Database::open(&temp.path().join("source.db")).unwrap();
        run(BACKUP.as_bytes(), &source).unwrap();

        let mut exported = Vec::new();
        export::run(&mut exported, &source).unwrap();

        let target = Database::open(&temp.path().join("target.db")).unwrap();
        run(exported.as_slice(), &target).unwrap();

        assert_eq!(
            export::Backup::collect(&target).unwrap(),
            export::Backup::collect(&source).unwrap()
        );
    }
}
