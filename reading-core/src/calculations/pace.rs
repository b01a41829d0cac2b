//! Pages-per-day scheduling.
//!
//! A reading plan is driven either by its deadline or by a fixed daily pace.
//! [`PaceCalculator::pages_per_day`] derives the pace from a deadline and
//! [`PaceCalculator::deadline_for_pace`] derives the deadline from a pace.
//!
//! # Counting Rule
//!
//! Both directions count reading days strictly after `today`: a plan made on
//! a Monday with Monday as a reading day does not expect any pages that same
//! day. The deadline itself is counted when it falls on a reading day.
//!
//! # Example
//!
//! ```
//! use chrono::{NaiveDate, Weekday};
//! use reading_core::ReadingDays;
//! use reading_core::calculations::PaceCalculator;
//!
//! // 2025-03-03 is a Monday.
//! let today = NaiveDate::from_ymd_opt(2025, 3, 3).unwrap();
//! let deadline = NaiveDate::from_ymd_opt(2025, 3, 24).unwrap();
//! let days = ReadingDays::from_weekdays([Weekday::Mon, Weekday::Wed, Weekday::Fri]);
//!
//! let calculator = PaceCalculator::new(today);
//!
//! assert_eq!(calculator.pages_per_day(Some(300), Some(deadline), &days), Some(34));
//! assert_eq!(
//!     calculator.deadline_for_pace(Some(300), &days, 34).unwrap(),
//!     Some(deadline)
//! );
//! ```

use chrono::{Datelike, Days, NaiveDate};
use thiserror::Error;
use tracing::{debug, warn};

use crate::ReadingDays;
use crate::calculations::common::{ceil_div, reading_days_between};

/// Errors raised for pace values that cannot be scheduled.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PaceError {
    /// A pace of zero pages never finishes the book.
    #[error("pages per day must be a positive number")]
    ZeroPagesPerDay,
}

/// Converts between deadlines and daily page quotas relative to a fixed day.
///
/// The calculator never reads the system clock; `today` is supplied by the
/// caller so results are reproducible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaceCalculator {
    today: NaiveDate,
}

impl PaceCalculator {
    pub fn new(today: NaiveDate) -> Self {
        Self { today }
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    /// Pages to read on each reading day to finish by `deadline`.
    ///
    /// Returns `None` while the plan is incomplete: no page count, no
    /// deadline, no reading days, or no reading day left before the deadline.
    /// The result is never below 1.
    pub fn pages_per_day(
        &self,
        total_pages: Option<u32>,
        deadline: Option<NaiveDate>,
        reading_days: &ReadingDays,
    ) -> Option<u32> {
        let total_pages = total_pages.filter(|p| *p > 0)?;
        let deadline = deadline?;
        if !reading_days.any() {
            debug!("No reading days selected; pace not computed");
            return None;
        }

        let available = self.reading_days_until(deadline, reading_days);
        if available == 0 {
            warn!(
                today = %self.today,
                deadline = %deadline,
                reading_days = %reading_days,
                "No reading days before the deadline"
            );
            return None;
        }

        Some(ceil_div(total_pages, available))
    }

    /// Number of reading days after today up to and including `deadline`.
    pub fn reading_days_until(
        &self,
        deadline: NaiveDate,
        reading_days: &ReadingDays,
    ) -> u32 {
        reading_days_between(self.today, deadline, reading_days)
    }

    /// Earliest deadline that finishes the book at `target` pages per day.
    ///
    /// The result is the reading day on which the last chunk of pages is
    /// read. Returns `Ok(None)` when there is no page count or no reading day
    /// is selected.
    ///
    /// # Errors
    ///
    /// Returns [`PaceError::ZeroPagesPerDay`] if `target` is zero.
    pub fn deadline_for_pace(
        &self,
        total_pages: Option<u32>,
        reading_days: &ReadingDays,
        target: u32,
    ) -> Result<Option<NaiveDate>, PaceError> {
        if target == 0 {
            return Err(PaceError::ZeroPagesPerDay);
        }
        let Some(total_pages) = total_pages.filter(|p| *p > 0) else {
            return Ok(None);
        };
        let per_week = reading_days.count();
        if per_week == 0 {
            debug!("No reading days selected; deadline not computed");
            return Ok(None);
        }

        let days_needed = ceil_div(total_pages, target);
        Ok(self.nth_reading_day(days_needed, reading_days, per_week))
    }

    /// The `n`th reading day strictly after today (`n >= 1`).
    ///
    /// Skips whole weeks first, then walks the final partial week.
    fn nth_reading_day(
        &self,
        n: u32,
        reading_days: &ReadingDays,
        per_week: u32,
    ) -> Option<NaiveDate> {
        let whole_weeks = (n - 1) / per_week;
        let mut remaining = n - whole_weeks * per_week;

        let mut date = self
            .today
            .checked_add_days(Days::new(u64::from(whole_weeks) * 7))?;
        while remaining > 0 {
            date = date.succ_opt()?;
            if reading_days.is_active(date.weekday()) {
                remaining -= 1;
            }
        }

        Some(date)
    }
}
