mod book;
mod reading_days;
mod reading_plan;
mod stored_book;

pub use book::Book;
pub use reading_days::{ALL_WEEKDAYS, ReadingDays, weekday_name};
pub use reading_plan::ReadingPlan;
pub use stored_book::{StoredBook, deadline_timestamp};
