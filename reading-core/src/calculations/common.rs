//! Shared arithmetic for pace calculations.

use chrono::{Datelike, NaiveDate};

use crate::ReadingDays;

/// Integer division rounding up.
///
/// # Panics
///
/// Panics if `denominator` is zero; callers check preconditions first.
///
/// # Examples
///
/// ```
/// use reading_core::calculations::common::ceil_div;
///
/// assert_eq!(ceil_div(300, 9), 34);
/// assert_eq!(ceil_div(300, 10), 30);
/// ```
pub fn ceil_div(
    numerator: u32,
    denominator: u32,
) -> u32 {
    numerator.div_ceil(denominator)
}

/// Counts the active reading days in the window `(after, through]`.
///
/// The start date itself is never counted. Returns 0 when `through` is not
/// after `after`.
///
/// Whole weeks contain each weekday exactly once, so only the trailing
/// partial week is walked day by day.
pub fn reading_days_between(
    after: NaiveDate,
    through: NaiveDate,
    reading_days: &ReadingDays,
) -> u32 {
    let span = (through - after).num_days();
    if span <= 0 {
        return 0;
    }

    let whole_weeks = span / 7;
    let remainder = span % 7;

    let mut count = whole_weeks as u64 * u64::from(reading_days.count());
    let mut weekday = through.weekday();
    for _ in 0..remainder {
        if reading_days.is_active(weekday) {
            count += 1;
        }
        weekday = weekday.pred();
    }

    u32::try_from(count).unwrap_or(u32::MAX)
}
