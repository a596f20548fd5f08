//! Calendar periods used as analysis windows.

use chrono::{Datelike, Duration, Months, NaiveDate};

use crate::types::ValidationError;

/// A run of consecutive calendar days, `[first_day, first_day_after)`.
///
/// Days are materialized eagerly; periods are a day, a week or a month.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalculationPeriod {
    days: Vec<NaiveDate>,
}

impl CalculationPeriod {
    /// Creates a period covering `first_day` up to, but excluding, `first_day_after`.
    pub fn new(first_day: NaiveDate, first_day_after: NaiveDate) -> Result<Self, ValidationError> {
        if first_day_after <= first_day {
            return Err(ValidationError::EmptyPeriod {
                first_day,
                first_day_after,
            });
        }
        let days = first_day
            .iter_days()
            .take_while(|day| *day < first_day_after)
            .collect();
        Ok(Self { days })
    }

    /// A single-day period.
    pub fn day(day: NaiveDate) -> Result<Self, ValidationError> {
        let next = day
            .succ_opt()
            .ok_or(ValidationError::DateOutOfRange { day })?;
        Self::new(day, next)
    }

    /// The Monday-to-Sunday week containing `day`.
    pub fn week_of(day: NaiveDate) -> Result<Self, ValidationError> {
        let offset = i64::from(day.weekday().num_days_from_monday());
        let monday = day
            .checked_sub_signed(Duration::days(offset))
            .ok_or(ValidationError::DateOutOfRange { day })?;
        let next_monday = monday
            .checked_add_signed(Duration::days(7))
            .ok_or(ValidationError::DateOutOfRange { day })?;
        Self::new(monday, next_monday)
    }

    /// The calendar month containing `day`.
    pub fn month_of(day: NaiveDate) -> Result<Self, ValidationError> {
        let first = day
            .with_day(1)
            .ok_or(ValidationError::DateOutOfRange { day })?;
        let next = first
            .checked_add_months(Months::new(1))
            .ok_or(ValidationError::DateOutOfRange { day })?;
        Self::new(first, next)
    }

    /// Days in chronological order.
    #[must_use]
    pub fn days(&self) -> &[NaiveDate] {
        &self.days
    }

    #[must_use]
    pub fn first_day(&self) -> NaiveDate {
        self.days[0]
    }

    #[must_use]
    pub fn last_day(&self) -> NaiveDate {
        self.days[self.days.len() - 1]
    }

    #[must_use]
    pub fn is_in_period(&self, day: NaiveDate) -> bool {
        day >= self.first_day() && day <= self.last_day()
    }

    /// True when the period is exactly one day long.
    ///
    /// Allocation reports only show per-row comments for day periods.
    #[must_use]
    pub fn is_day_period(&self) -> bool {
        self.days.len() == 1
    }
}
