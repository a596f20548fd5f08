//! Storage layer for the work log.
//!
//! Provides persistence for users, activities and bookings using `rusqlite`.
//! A single [`Database`] implements [`Store`] for all three record types, so
//! the services and analyses in `wl-core` run against it directly.
//!
//! # Thread Safety
//!
//! The [`Database`] type wraps a `rusqlite::Connection`, which is `Send` but not `Sync`.
//! A `Database` instance can be moved between threads but cannot be shared
//! across threads without external synchronization.
//!
//! # Schema
//!
//! Days are stored as TEXT in ISO 8601 format (`2025-01-29`) and times of day
//! as `HH:MM`, so lexicographic ordering matches chronological ordering.
//! Bookings keep the activity id as a plain integer without a foreign key:
//! dangling references are reported by the analyses, not rejected on write.
//!
//! Ids come from `AUTOINCREMENT` columns and are never reused. Saving a record
//! that already carries an id replaces the row with that id, which is how
//! imports keep their original ids.

use std::path::Path;

use chrono::{NaiveDate, NaiveTime};
use rusqlite::types::ToSql;
use rusqlite::{Connection, OptionalExtension, Row};
use thiserror::Error;
use tracing::{debug, trace};
use wl_core::{
    Activity, Booking, NewActivity, NewBooking, Record, RecordId, Store, StoreError, User, UserId,
    ValidationError,
};

const DAY_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMAT: &str = "%H:%M";

/// Database errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// An error from the underlying database.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    /// A stored column could not be parsed back into a domain value.
    #[error("invalid {table} row {id}: {message}")]
    InvalidRow {
        table: &'static str,
        id: i64,
        message: String,
    },
    /// A stored row no longer satisfies the record invariants.
    #[error("stored record is invalid: {0}")]
    Validation(#[from] ValidationError),
}

impl From<DbError> for StoreError {
    fn from(err: DbError) -> Self {
        Self::new(err)
    }
}

/// Database connection wrapper.
///
/// See the [module documentation](self) for thread safety considerations.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Opens a database at the given path, creating it if necessary.
    ///
    /// The database schema is automatically initialized on first open.
    pub fn open(path: &Path) -> Result<Self, DbError> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.init()?;
        debug!(path = %path.display(), "opened database");
        Ok(db)
    }

    /// Opens an in-memory database.
    ///
    /// Useful for testing. The database is destroyed when the connection closes.
    pub fn open_in_memory() -> Result<Self, DbError> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Initializes the database schema.
    ///
    /// This is idempotent - safe to call on an already-initialized database.
    fn init(&self) -> Result<(), DbError> {
        self.conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS activities (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user TEXT NOT NULL,
                project_name TEXT NOT NULL,
                activity_name TEXT NOT NULL,
                project_id TEXT NOT NULL,
                activity_id TEXT NOT NULL,
                hidden INTEGER NOT NULL DEFAULT 0
            );

            CREATE INDEX IF NOT EXISTS idx_activities_user ON activities(user);

            -- day: ISO date ('2025-01-29'); times: 'HH:MM', end_time NULL while open
            CREATE TABLE IF NOT EXISTS bookings (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                day TEXT NOT NULL,
                user TEXT NOT NULL,
                activity INTEGER NOT NULL,
                start_time TEXT NOT NULL,
                end_time TEXT,
                comment TEXT NOT NULL DEFAULT ''
            );

            CREATE INDEX IF NOT EXISTS idx_bookings_user_day ON bookings(user, day);
            ",
        )?;
        Ok(())
    }

    /// Runs `f` inside a transaction, committing only if it succeeds.
    ///
    /// Store calls made by `f` against this database take part in the
    /// transaction and are rolled back when `f` fails.
    pub fn in_transaction<T, E>(&self, f: impl FnOnce() -> Result<T, E>) -> Result<T, E>
    where
        E: From<DbError>,
    {
        let tx = self.conn.unchecked_transaction().map_err(DbError::from)?;
        let value = f()?;
        tx.commit().map_err(DbError::from)?;
        Ok(value)
    }

    /// Looks up a user by exact name, lowest id first.
    pub fn find_user(&self, name: &UserId) -> Result<Option<User>, DbError> {
        self.conn
            .query_row(
                "SELECT id, name FROM users WHERE name = ?1 ORDER BY id ASC LIMIT 1",
                [name.as_str()],
                User::read,
            )
            .optional()?
            .map(User::convert)
            .transpose()
    }

    fn list<T: Mapped>(&self) -> Result<Vec<T>, DbError> {
        let sql = format!("SELECT {} FROM {} ORDER BY id ASC", T::COLUMNS, T::TABLE);
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map([], T::read)?;
        let mut records = Vec::new();
        for row in rows {
            records.push(T::convert(row?)?);
        }
        Ok(records)
    }

    fn get<T: Mapped>(&self, id: RecordId) -> Result<Option<T>, DbError> {
        let sql = format!("SELECT {} FROM {} WHERE id = ?1", T::COLUMNS, T::TABLE);
        self.conn
            .query_row(&sql, [id.value()], T::read)
            .optional()?
            .map(T::convert)
            .transpose()
    }

    fn put<T: Mapped>(&self, record: T) -> Result<T, DbError> {
        let values = record.values();
        let params: Vec<&dyn ToSql> = values.iter().map(|value| &**value).collect();
        let placeholders = (1..=params.len())
            .map(|n| format!("?{n}"))
            .collect::<Vec<_>>()
            .join(", ");

        let record = match record.id() {
            Some(id) => {
                let sql = format!(
                    "INSERT OR REPLACE INTO {} (id, {}) VALUES (?{}, {placeholders})",
                    T::TABLE,
                    T::FIELDS,
                    params.len() + 1,
                );
                let raw = id.value();
                let mut with_id = params;
                with_id.push(&raw);
                self.conn.execute(&sql, with_id.as_slice())?;
                record
            }
            None => {
                let sql = format!(
                    "INSERT INTO {} ({}) VALUES ({placeholders})",
                    T::TABLE,
                    T::FIELDS,
                );
                self.conn.execute(&sql, params.as_slice())?;
                record.with_id(RecordId::new(self.conn.last_insert_rowid()))
            }
        };
        trace!(kind = T::KIND, id = ?record.id(), "saved row");
        Ok(record)
    }

    fn remove<T: Mapped>(&self, id: RecordId) -> Result<(), DbError> {
        let sql = format!("DELETE FROM {} WHERE id = ?1", T::TABLE);
        let deleted = self.conn.execute(&sql, [id.value()])?;
        trace!(kind = T::KIND, %id, deleted, "deleted row");
        Ok(())
    }
}

/// Mapping between a record type and its table.
trait Mapped: Record {
    const TABLE: &'static str;
    /// Writable columns, in the order of [`Mapped::values`].
    const FIELDS: &'static str;
    /// Selected columns, `id` first.
    const COLUMNS: &'static str;

    /// Raw column values as read from a row.
    type Columns;

    fn read(row: &Row<'_>) -> rusqlite::Result<Self::Columns>;

    fn convert(columns: Self::Columns) -> Result<Self, DbError>;

    fn values(&self) -> Vec<Box<dyn ToSql>>;
}

impl Mapped for User {
    const TABLE: &'static str = "users";
    const FIELDS: &'static str = "name";
    const COLUMNS: &'static str = "id, name";

    type Columns = (i64, String);

    fn read(row: &Row<'_>) -> rusqlite::Result<Self::Columns> {
        Ok((row.get(0)?, row.get(1)?))
    }

    fn convert((id, name): Self::Columns) -> Result<Self, DbError> {
        Ok(Self::new(UserId::new(name)?).with_id(RecordId::new(id)))
    }

    fn values(&self) -> Vec<Box<dyn ToSql>> {
        vec![Box::new(self.name().to_string())]
    }
}

struct ActivityRow {
    id: i64,
    user: String,
    project_name: String,
    activity_name: String,
    project_id: String,
    activity_id: String,
    hidden: bool,
}

impl Mapped for Activity {
    const TABLE: &'static str = "activities";
    const FIELDS: &'static str = "user, project_name, activity_name, project_id, activity_id, hidden";
    const COLUMNS: &'static str =
        "id, user, project_name, activity_name, project_id, activity_id, hidden";

    type Columns = ActivityRow;

    fn read(row: &Row<'_>) -> rusqlite::Result<Self::Columns> {
        Ok(ActivityRow {
            id: row.get(0)?,
            user: row.get(1)?,
            project_name: row.get(2)?,
            activity_name: row.get(3)?,
            project_id: row.get(4)?,
            activity_id: row.get(5)?,
            hidden: row.get(6)?,
        })
    }

    fn convert(row: Self::Columns) -> Result<Self, DbError> {
        let activity = Self::new(NewActivity {
            user: UserId::new(row.user)?,
            project_name: row.project_name,
            activity_name: row.activity_name,
            project_id: row.project_id,
            activity_id: row.activity_id,
            hidden: row.hidden,
        })?;
        Ok(activity.with_id(RecordId::new(row.id)))
    }

    fn values(&self) -> Vec<Box<dyn ToSql>> {
        vec![
            Box::new(self.user().to_string()),
            Box::new(self.project_name().to_string()),
            Box::new(self.activity_name().to_string()),
            Box::new(self.project_id().to_string()),
            Box::new(self.activity_id().to_string()),
            Box::new(self.is_hidden()),
        ]
    }
}

struct BookingRow {
    id: i64,
    day: String,
    user: String,
    activity: i64,
    start: String,
    end: Option<String>,
    comment: String,
}

impl BookingRow {
    fn day(&self) -> Result<NaiveDate, DbError> {
        NaiveDate::parse_from_str(&self.day, DAY_FORMAT).map_err(|err| self.invalid("day", &self.day, &err))
    }

    fn time(&self, column: &'static str, value: &str) -> Result<NaiveTime, DbError> {
        NaiveTime::parse_from_str(value, TIME_FORMAT).map_err(|err| self.invalid(column, value, &err))
    }

    fn invalid(&self, column: &str, value: &str, err: &chrono::ParseError) -> DbError {
        DbError::InvalidRow {
            table: Booking::TABLE,
            id: self.id,
            message: format!("{column} {value:?}: {err}"),
        }
    }
}

impl Mapped for Booking {
    const TABLE: &'static str = "bookings";
    const FIELDS: &'static str = "day, user, activity, start_time, end_time, comment";
    const COLUMNS: &'static str = "id, day, user, activity, start_time, end_time, comment";

    type Columns = BookingRow;

    fn read(row: &Row<'_>) -> rusqlite::Result<Self::Columns> {
        Ok(BookingRow {
            id: row.get(0)?,
            day: row.get(1)?,
            user: row.get(2)?,
            activity: row.get(3)?,
            start: row.get(4)?,
            end: row.get(5)?,
            comment: row.get(6)?,
        })
    }

    fn convert(row: Self::Columns) -> Result<Self, DbError> {
        let day = row.day()?;
        let start = row.time("start_time", &row.start)?;
        let end = row
            .end
            .as_deref()
            .map(|end| row.time("end_time", end))
            .transpose()?;
        let booking = Self::new(NewBooking {
            day,
            user: UserId::new(row.user)?,
            activity: RecordId::new(row.activity),
            start,
            end,
            comment: row.comment,
        })?;
        Ok(booking.with_id(RecordId::new(row.id)))
    }

    fn values(&self) -> Vec<Box<dyn ToSql>> {
        vec![
            Box::new(self.day().format(DAY_FORMAT).to_string()),
            Box::new(self.user().to_string()),
            Box::new(self.activity().value()),
            Box::new(self.start().format(TIME_FORMAT).to_string()),
            Box::new(self.end().map(|end| end.format(TIME_FORMAT).to_string())),
            Box::new(self.comment().to_string()),
        ]
    }
}

macro_rules! impl_store {
    ($($record:ty),+ $(,)?) => {
        $(
            impl Store<$record> for Database {
                fn store_all(&self) -> Result<Vec<$record>, StoreError> {
                    Ok(self.list()?)
                }

                fn find_by_id(&self, id: RecordId) -> Result<Option<$record>, StoreError> {
                    Ok(self.get(id)?)
                }

                fn save(&self, record: $record) -> Result<$record, StoreError> {
                    Ok(self.put(record)?)
                }

                fn delete_by_id(&self, id: RecordId) -> Result<(), StoreError> {
                    Ok(self.remove::<$record>(id)?)
                }
            }
        )+
    };
}

impl_store!(User, Activity, Booking);
