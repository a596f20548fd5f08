//! Lookup of analyses by id.

use std::collections::BTreeMap;

use super::{AllocationAnalyzer, Analyzer, DayAnalyzer, Grouping, Table};
use crate::activity::Activity;
use crate::booking::Booking;
use crate::error::{Error, Result};
use crate::period::CalculationPeriod;
use crate::store::Store;
use crate::types::UserId;

/// Per-day worktime report.
pub const HOURS: &str = "HOURS";
/// Allocation by `projectId:activityId`.
pub const ACTIVITIES: &str = "ACTIVITIES";
/// Allocation by `projectId`.
pub const PROJECTS: &str = "PROJECTS";

/// Named analyses, built once and passed to whoever needs them.
pub struct AnalysisRegistry<'a> {
    analyzers: BTreeMap<&'static str, Box<dyn Analyzer + 'a>>,
}

impl<'a> AnalysisRegistry<'a> {
    /// A registry with no analyses.
    pub fn empty() -> Self {
        Self {
            analyzers: BTreeMap::new(),
        }
    }

    /// The standard `HOURS`, `ACTIVITIES` and `PROJECTS` analyses.
    pub fn new<B, A>(bookings: &'a B, activities: &'a A) -> Self
    where
        B: Store<Booking>,
        A: Store<Activity>,
    {
        let mut registry = Self::empty();
        registry.register(HOURS, DayAnalyzer::new(bookings));
        registry.register(
            ACTIVITIES,
            AllocationAnalyzer::new(bookings, activities, Grouping::by_activity()),
        );
        registry.register(
            PROJECTS,
            AllocationAnalyzer::new(bookings, activities, Grouping::by_project()),
        );
        registry
    }

    /// Adds or replaces the analysis under `id`.
    pub fn register(&mut self, id: &'static str, analyzer: impl Analyzer + 'a) {
        self.analyzers.insert(id, Box::new(analyzer));
    }

    /// Registered ids in sorted order.
    pub fn ids(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.analyzers.keys().copied()
    }

    /// Runs the analysis registered under `id` for `user` over `period`.
    ///
    /// Ids are matched ignoring case and surrounding whitespace.
    pub fn analyze(
        &self,
        id: &str,
        user: &str,
        period: Option<&CalculationPeriod>,
    ) -> Result<Table> {
        let id = id.trim();
        if id.is_empty() {
            return Err(Error::InvalidInput("analysis id is required".to_string()));
        }
        let user = UserId::new(user.trim())
            .map_err(|_| Error::InvalidInput("user is required".to_string()))?;
        let period =
            period.ok_or_else(|| Error::InvalidInput("period is required".to_string()))?;

        let analyzer = self
            .analyzers
            .iter()
            .find(|(known, _)| known.eq_ignore_ascii_case(id))
            .map(|(_, analyzer)| analyzer)
            .ok_or_else(|| Error::InvalidInput(format!("unknown analysis: {id}")))?;

        tracing::debug!(analysis = id, %user, first_day = %period.first_day(), "running analysis");
        analyzer.analyze(&user, period)
    }
}
