//! Core domain logic for the work log.
//!
//! This crate contains the fundamental types and logic for:
//! - Records: users, activities and bookings, validated on construction
//! - Booking consistency: auto-closing open bookings and inserting breaks
//! - Analyses: per-day worktime (`HOURS`) and time allocation
//!   (`ACTIVITIES`, `PROJECTS`) over a calculation period
//!
//! Persistence is abstracted behind [`Store`]; see `wl-db` for the SQLite
//! implementation.

pub mod activity;
pub mod activity_service;
pub mod analysis;
pub mod booking;
pub mod booking_service;
pub mod error;
pub mod interval;
pub mod period;
pub mod store;
pub mod types;
pub mod user;

#[cfg(test)]
mod testing;

pub use activity::{Activity, ActivityChanges, NewActivity};
pub use activity_service::ActivityService;
pub use analysis::{
    ACTIVITIES, AllocationAnalyzer, AnalysisRegistry, Analyzer, DayAnalyzer, Grouping, HOURS,
    PROJECTS, Row, Table, WorktimePolicy,
};
pub use booking::{Booking, BookingChanges, NewBooking};
pub use booking_service::{
    AddBooking, BookingService, BookingUpdate, DEFAULT_BREAK_MINUTES, bookings_on_day,
};
pub use error::{Error, ErrorKind, Result};
pub use interval::TimeInterval;
pub use period::CalculationPeriod;
pub use store::{MemoryStore, Record, Store, StoreError};
pub use types::{RecordId, UserId, ValidationError};
pub use user::User;
