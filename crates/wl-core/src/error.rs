//! Errors returned by the booking services and analyses.

use chrono::NaiveDate;
use thiserror::Error;

use crate::store::StoreError;
use crate::types::{RecordId, ValidationError};

/// Broad class of an [`Error`], deciding how a caller should react.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A required argument was blank or missing. Never retried.
    InvalidInput,
    /// The request breaks a booking rule; the caller should correct and resubmit.
    BusinessRule,
    /// Stored data is inconsistent. Not user-correctable.
    DataIntegrity,
    /// The store backend failed.
    Storage,
}

/// Service and analysis errors.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("activity {activity} is hidden and cannot be booked")]
    HiddenActivity { activity: String },

    #[error("invalid break: {0}")]
    InvalidBreak(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("booking on {day} references unknown activity {activity}")]
    UnknownActivity { day: NaiveDate, activity: RecordId },

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl Error {
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidInput(_) => ErrorKind::InvalidInput,
            Self::HiddenActivity { .. } | Self::InvalidBreak(_) | Self::Validation(_) => {
                ErrorKind::BusinessRule
            }
            Self::UnknownActivity { .. } => ErrorKind::DataIntegrity,
            Self::Store(_) => ErrorKind::Storage,
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
