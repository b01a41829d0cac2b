//! Validation of user-entered plan values.
//!
//! Text from the user is checked here before it reaches the calculator, so
//! the calculator only ever sees well-formed numbers and dates.

use chrono::NaiveDate;
use thiserror::Error;
use tracing::warn;

use crate::calculations::PaceError;

/// Rejected user input.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PlanInputError {
    #[error("invalid page count '{0}': enter a whole number above zero")]
    InvalidPageCount(String),

    #[error("invalid pages per day '{0}': enter a whole number above zero")]
    InvalidPagesPerDay(String),

    #[error("invalid date '{0}': expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error(transparent)]
    Pace(#[from] PaceError),
}

/// Trims whitespace and removes commas (thousands separator).
fn normalize_number_input(s: &str) -> String {
    s.trim().replace(',', "")
}

fn parse_positive(s: &str) -> Option<u32> {
    normalize_number_input(s).parse::<u32>().ok().filter(|n| *n > 0)
}

/// Parses a page count.
///
/// Accepts `"1,024"`. Empty or whitespace-only input unsets the count and
/// returns `Ok(None)`.
///
/// # Errors
///
/// Returns [`PlanInputError::InvalidPageCount`] for zero, negative or
/// non-numeric input.
pub fn parse_page_count(s: &str) -> Result<Option<u32>, PlanInputError> {
    if normalize_number_input(s).is_empty() {
        return Ok(None);
    }
    match parse_positive(s) {
        Some(pages) => Ok(Some(pages)),
        None => {
            warn!(input = %s, "invalid page count");
            Err(PlanInputError::InvalidPageCount(s.to_string()))
        }
    }
}

/// Parses a manual pages-per-day target. Unlike a page count, empty input is
/// not accepted.
///
/// # Errors
///
/// Returns [`PlanInputError::InvalidPagesPerDay`] unless the input is a
/// positive whole number.
pub fn parse_pages_per_day(s: &str) -> Result<u32, PlanInputError> {
    parse_positive(s).ok_or_else(|| {
        warn!(input = %s, "invalid pages per day");
        PlanInputError::InvalidPagesPerDay(s.to_string())
    })
}

/// Parses an ISO calendar date (`2025-03-24`).
///
/// # Errors
///
/// Returns [`PlanInputError::InvalidDate`] if the text is not a valid date.
pub fn parse_date(s: &str) -> Result<NaiveDate, PlanInputError> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|e| {
        warn!(input = %s, "invalid date: {}", e);
        PlanInputError::InvalidDate(s.to_string())
    })
}
