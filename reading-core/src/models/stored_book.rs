use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Book, ReadingDays};

/// A finalized reading plan as kept in the reading list.
///
/// Entries are immutable snapshots: an edit replaces the whole entry. The
/// serialized field names match the list format written by the mobile app.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredBook {
    pub title: String,
    pub author: String,
    pub year: String,
    pub cover_id: String,
    #[serde(rename = "numberOfPages")]
    pub number_of_pages: u32,
    pub deadline: DateTime<Utc>,
    #[serde(rename = "ppd")]
    pub pages_per_day: u32,
    #[serde(rename = "readingDays")]
    pub reading_days: ReadingDays,
}

impl StoredBook {
    pub fn book(&self) -> Book {
        Book {
            title: self.title.clone(),
            author: self.author.clone(),
            year: self.year.clone(),
            cover_id: self.cover_id.clone(),
        }
    }

    /// Calendar date of the deadline (UTC).
    pub fn deadline_date(&self) -> NaiveDate {
        self.deadline.date_naive()
    }
}

/// Midnight UTC of `date`, the form in which deadlines are stored.
pub fn deadline_timestamp(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}
