use chrono::{Datelike, NaiveDate, Weekday};
use reading_core::{ReadingDays, StoredBook};
use thiserror::Error;

/// Error returned when a weekday list cannot be parsed.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid weekday '{0}': use names like mon, tue or monday")]
pub struct ParseWeekdaysError(String);

/// Parses a comma-separated weekday list (`"mon,wed,fri"`).
///
/// Names are case-insensitive, short or long. Empty input is no days.
/// Logs and returns an error on the first unknown name.
pub fn parse_weekdays(s: &str) -> Result<ReadingDays, ParseWeekdaysError> {
    let mut days = ReadingDays::default();
    for name in s.split(',').map(str::trim).filter(|n| !n.is_empty()) {
        let day: Weekday = name.parse().map_err(|_| {
            tracing::warn!(input = %s, name, "invalid weekday");
            ParseWeekdaysError(name.to_string())
        })?;
        days.set(day, true);
    }
    Ok(days)
}

/// Formats a deadline as "March 4", adding the year when it is not
/// `today`'s year.
pub fn format_deadline(
    deadline: NaiveDate,
    today: NaiveDate,
) -> String {
    if deadline.year() == today.year() {
        deadline.format("%B %-d").to_string()
    } else {
        deadline.format("%B %-d, %Y").to_string()
    }
}

/// Formats an optional value for display, using "—" when `None`.
pub fn opt_display<T: ToString>(value: Option<T>) -> String {
    value
        .map(|v| v.to_string())
        .unwrap_or_else(|| "—".to_string())
}

/// One line of the reading list.
pub fn entry_line(
    index: usize,
    entry: &StoredBook,
    today: NaiveDate,
) -> String {
    format!(
        "{:>3}. {} by {} ({}) - {} pages/day on {} until {} [cover {}]",
        index,
        entry.title,
        entry.author,
        entry.year,
        entry.pages_per_day,
        entry.reading_days,
        format_deadline(entry.deadline_date(), today),
        opt_display(Some(&entry.cover_id).filter(|c| !c.is_empty())),
    )
}
