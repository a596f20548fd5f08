//! Reports derived from a user's bookings over a period.
//!
//! Every analysis produces a [`Table`]: the first row is the header, the
//! remaining rows are display strings ready to be printed or serialized.
//! Analyses only read from the stores and can be repeated freely.

mod allocation;
mod hours;
mod registry;

use chrono::Duration;

use crate::error::Result;
use crate::period::CalculationPeriod;
use crate::types::UserId;

pub use allocation::{AllocationAnalyzer, Grouping};
pub use hours::{DayAnalyzer, WorktimePolicy};
pub use registry::{ACTIVITIES, AnalysisRegistry, HOURS, PROJECTS};

/// One row of display strings.
pub type Row = Vec<String>;

/// Header row followed by data rows.
pub type Table = Vec<Row>;

/// A report over one user's bookings.
pub trait Analyzer {
    fn analyze(&self, user: &UserId, period: &CalculationPeriod) -> Result<Table>;
}

/// Formats a duration as `±HH:MM`, with a space for non-negative values.
pub fn format_duration(duration: Duration) -> String {
    let minutes = duration.num_minutes();
    let sign = if minutes < 0 { '-' } else { ' ' };
    let minutes = minutes.abs();
    format!("{sign}{:02}:{:02}", minutes / 60, minutes % 60)
}

/// Formats a percentage with one decimal, e.g. `37.5%`.
pub fn format_percentage(value: f64) -> String {
    format!("{value:.1}%")
}
