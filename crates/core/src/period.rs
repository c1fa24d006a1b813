//! Period and membership checks shared by forecasts, consolidations and
//! audit filters.

use chrono::{DateTime, Utc};
use ledgerline_shared::AppError;
use thiserror::Error;
use uuid::Uuid;

/// Errors raised by period checks.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PeriodError {
    /// End precedes start.
    #[error("{end_field} ({end}) must not be before {start_field} ({start})")]
    EndBeforeStart {
        /// Name of the start field.
        start_field: &'static str,
        /// Name of the end field.
        end_field: &'static str,
        /// Start value.
        start: DateTime<Utc>,
        /// End value.
        end: DateTime<Utc>,
    },

    /// A set that must have members is empty.
    #[error("{0} must not be empty")]
    EmptySet(&'static str),
}

impl From<PeriodError> for AppError {
    fn from(err: PeriodError) -> Self {
        Self::InvalidArgument(err.to_string())
    }
}

/// Checks `start <= end`.
///
/// # Errors
///
/// Returns `EndBeforeStart` otherwise.
pub fn validate_range(
    start_field: &'static str,
    start: DateTime<Utc>,
    end_field: &'static str,
    end: DateTime<Utc>,
) -> Result<(), PeriodError> {
    if end < start {
        return Err(PeriodError::EndBeforeStart {
            start_field,
            end_field,
            start,
            end,
        });
    }
    Ok(())
}

/// Checks an optional range; either bound may be open.
///
/// # Errors
///
/// Returns `EndBeforeStart` when both bounds are set and inverted.
pub fn validate_open_range(
    start_field: &'static str,
    start: Option<DateTime<Utc>>,
    end_field: &'static str,
    end: Option<DateTime<Utc>>,
) -> Result<(), PeriodError> {
    match (start, end) {
        (Some(start), Some(end)) => validate_range(start_field, start, end_field, end),
        _ => Ok(()),
    }
}

/// Rejects an empty id set and removes duplicates, keeping first occurrence.
///
/// # Errors
///
/// Returns `EmptySet` when `ids` is empty.
pub fn distinct_non_empty(field: &'static str, ids: &[Uuid]) -> Result<Vec<Uuid>, PeriodError> {
    if ids.is_empty() {
        return Err(PeriodError::EmptySet(field));
    }
    let mut out: Vec<Uuid> = Vec::with_capacity(ids.len());
    for id in ids {
        if !out.contains(id) {
            out.push(*id);
        }
    }
    Ok(out)
}
