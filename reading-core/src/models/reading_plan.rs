use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{Book, ReadingDays, StoredBook};

/// The plan being assembled by one wizard session.
///
/// `deadline` and `pages_per_day` are never both free: when
/// `manual_override` is false the pace is derived from the deadline, when it
/// is true the deadline was derived from the pace.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadingPlan {
    pub book: Option<Book>,
    pub total_pages: Option<u32>,
    pub deadline: Option<NaiveDate>,
    pub reading_days: ReadingDays,
    pub pages_per_day: Option<u32>,
    pub manual_override: bool,
}

impl ReadingPlan {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a plan from a saved entry for editing.
    ///
    /// The stored pace is authoritative, so the plan starts in manual
    /// override mode and keeps it until a forward mutation happens.
    pub fn from_stored(entry: &StoredBook) -> Self {
        Self {
            book: Some(entry.book()),
            total_pages: Some(entry.number_of_pages),
            deadline: Some(entry.deadline_date()),
            reading_days: entry.reading_days,
            pages_per_day: Some(entry.pages_per_day),
            manual_override: true,
        }
    }
}
