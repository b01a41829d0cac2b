//! The saved reading list.
//!
//! Entries are identified by their cover id, or by position on the list.
//! The list functions at the top operate on an in-memory `Vec`; [`Shelf`]
//! loads the list from a [`BookRepository`], applies one of them and writes
//! the whole list back.

use chrono::NaiveDate;
use thiserror::Error;
use tracing::{error, info};

use crate::db::repository::{BookRepository, RepositoryError};
use crate::wizard::{FinalizeError, WizardSession};
use crate::StoredBook;

/// Index of the first entry with `cover_id`.
pub fn position_of(
    books: &[StoredBook],
    cover_id: &str,
) -> Option<usize> {
    books.iter().position(|b| b.cover_id == cover_id)
}

/// Removes the first entry with `cover_id`. Later duplicates and the order
/// of the remaining entries are left alone.
pub fn remove_by_cover(
    books: &mut Vec<StoredBook>,
    cover_id: &str,
) -> Option<StoredBook> {
    position_of(books, cover_id).map(|i| books.remove(i))
}

/// Puts `entry` where the entry with `cover_id` was, or at the end if there
/// is none. Returns the entry's index.
pub fn replace_or_append(
    books: &mut Vec<StoredBook>,
    cover_id: &str,
    entry: StoredBook,
) -> usize {
    match position_of(books, cover_id) {
        Some(i) => {
            books[i] = entry;
            i
        }
        None => {
            books.push(entry);
            books.len() - 1
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ShelfError {
    #[error(transparent)]
    Incomplete(#[from] FinalizeError),

    #[error("no saved book with cover id '{0}'")]
    NotFound(String),

    #[error("no saved book at position {0}")]
    NoSuchPosition(usize),

    #[error("could not {action} the reading list, please try again: {source}")]
    Persistence {
        action: &'static str,
        #[source]
        source: RepositoryError,
    },
}

impl ShelfError {
    /// Storage failures may succeed on retry; the others need new input.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ShelfError::Persistence { .. })
    }
}

/// Save, edit and delete operations over a [`BookRepository`].
pub struct Shelf<'a> {
    repo: &'a dyn BookRepository,
}

impl<'a> Shelf<'a> {
    pub fn new(repo: &'a dyn BookRepository) -> Self {
        Self { repo }
    }

    pub async fn list(&self) -> Result<Vec<StoredBook>, ShelfError> {
        self.repo.load_books().await.map_err(|source| {
            error!(error = %source, "Failed to load reading list");
            ShelfError::Persistence {
                action: "load",
                source,
            }
        })
    }

    pub async fn find(
        &self,
        cover_id: &str,
    ) -> Result<StoredBook, ShelfError> {
        let books = self.list().await?;
        position_of(&books, cover_id)
            .map(|i| books[i].clone())
            .ok_or_else(|| ShelfError::NotFound(cover_id.to_string()))
    }

    /// Stores the session's plan and resets the session.
    ///
    /// A new plan is appended. A plan opened with [`Shelf::edit`] replaces
    /// the entry it was loaded from.
    ///
    /// # Errors
    ///
    /// [`ShelfError::Incomplete`] when a wizard step is unfinished, or
    /// [`ShelfError::Persistence`] when storage fails. The session is left
    /// untouched on error.
    pub async fn save(
        &self,
        session: &mut WizardSession,
    ) -> Result<StoredBook, ShelfError> {
        let entry = session.finalize()?;
        let mut books = self.list().await?;

        let index = match session.editing() {
            Some(original) => replace_or_append(&mut books, original, entry.clone()),
            None => {
                books.push(entry.clone());
                books.len() - 1
            }
        };

        self.write(&books).await?;
        info!(
            title = %entry.title,
            cover_id = %entry.cover_id,
            position = index,
            "Saved reading plan"
        );
        session.reset();
        Ok(entry)
    }

    /// Deletes the first entry with `cover_id`.
    pub async fn delete(
        &self,
        cover_id: &str,
    ) -> Result<StoredBook, ShelfError> {
        let mut books = self.list().await?;
        let removed = remove_by_cover(&mut books, cover_id)
            .ok_or_else(|| ShelfError::NotFound(cover_id.to_string()))?;

        self.write(&books).await?;
        info!(title = %removed.title, cover_id, "Deleted reading plan");
        Ok(removed)
    }

    /// Deletes the entry at `index` (zero-based).
    pub async fn delete_at(
        &self,
        index: usize,
    ) -> Result<StoredBook, ShelfError> {
        let mut books = self.list().await?;
        if index >= books.len() {
            return Err(ShelfError::NoSuchPosition(index));
        }
        let removed = books.remove(index);

        self.write(&books).await?;
        info!(title = %removed.title, position = index, "Deleted reading plan");
        Ok(removed)
    }

    /// Opens a saved entry in a new wizard session.
    pub async fn edit(
        &self,
        cover_id: &str,
        today: NaiveDate,
    ) -> Result<WizardSession, ShelfError> {
        let entry = self.find(cover_id).await?;
        Ok(WizardSession::from_stored(&entry, today))
    }

    async fn write(
        &self,
        books: &[StoredBook],
    ) -> Result<(), ShelfError> {
        self.repo.save_books(books).await.map_err(|source| {
            error!(error = %source, "Failed to write reading list");
            ShelfError::Persistence {
                action: "save",
                source,
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use chrono::Weekday;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::wizard::{PlanChange, WizardStep};
    use crate::{Book, ReadingDays, deadline_timestamp};

    fn date(
        y: i32,
        m: u32,
        d: u32,
    ) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn entry(
        title: &str,
        cover_id: &str,
    ) -> StoredBook {
        StoredBook {
            title: title.to_string(),
            author: "Anon".to_string(),
            year: "2001".to_string(),
            cover_id: cover_id.to_string(),
            number_of_pages: 200,
            deadline: deadline_timestamp(date(2025, 4, 1)),
            pages_per_day: 10,
            reading_days: ReadingDays::from_weekdays([Weekday::Sat]),
        }
    }

    fn titles(books: &[StoredBook]) -> Vec<&str> {
        books.iter().map(|b| b.title.as_str()).collect()
    }

    #[derive(Default)]
    struct MemoryRepository {
        books: Mutex<Vec<StoredBook>>,
        fail_writes: bool,
    }

    #[async_trait]
    impl BookRepository for MemoryRepository {
        async fn load_books(&self) -> Result<Vec<StoredBook>, RepositoryError> {
            Ok(self.books.lock().unwrap().clone())
        }

        async fn save_books(&self, books: &[StoredBook]) -> Result<(), RepositoryError> {
            if self.fail_writes {
                return Err(RepositoryError::Database("disk full".to_string()));
            }
            *self.books.lock().unwrap() = books.to_vec();
            Ok(())
        }
    }

    fn complete_session(cover_id: &str) -> WizardSession {
        let mut session = WizardSession::new(date(2025, 3, 3));
        session
            .apply(PlanChange::SelectBook(Book {
                title: "Dune".to_string(),
                author: "Frank Herbert".to_string(),
                year: "1965".to_string(),
                cover_id: cover_id.to_string(),
            }))
            .unwrap();
        session.apply(PlanChange::SetTotalPages(Some(300))).unwrap();
        session
            .apply(PlanChange::SetDeadline(Some(date(2025, 3, 24))))
            .unwrap();
        session
            .apply(PlanChange::ToggleReadingDay(Weekday::Mon))
            .unwrap();
        session
    }

    // =========================================================================
    // list functions
    // =========================================================================

    #[test]
    fn remove_by_cover_takes_first_match_only() {
        let mut books = vec![entry("a", "1"), entry("b", "2"), entry("c", "1"), entry("d", "3")];

        let removed = remove_by_cover(&mut books, "1");

        assert_eq!(removed.map(|b| b.title), Some("a".to_string()));
        assert_eq!(titles(&books), vec!["b", "c", "d"]);
    }

    #[test]
    fn remove_by_cover_without_match_is_noop() {
        let mut books = vec![entry("a", "1"), entry("b", "2")];

        assert_eq!(remove_by_cover(&mut books, "9"), None);
        assert_eq!(titles(&books), vec!["a", "b"]);
    }

    #[test]
    fn replace_or_append_keeps_position() {
        let mut books = vec![entry("a", "1"), entry("b", "2"), entry("c", "3")];

        let index = replace_or_append(&mut books, "2", entry("b2", "2"));

        assert_eq!(index, 1);
        assert_eq!(titles(&books), vec!["a", "b2", "c"]);
    }

    #[test]
    fn replace_or_append_appends_missing() {
        let mut books = vec![entry("a", "1")];

        let index = replace_or_append(&mut books, "7", entry("z", "7"));

        assert_eq!(index, 1);
        assert_eq!(titles(&books), vec!["a", "z"]);
    }

    // =========================================================================
    // Shelf
    // =========================================================================

    #[tokio::test]
    async fn save_appends_and_resets_session() {
        let repo = MemoryRepository::default();
        let shelf = Shelf::new(&repo);
        let mut session = complete_session("42");

        let saved = shelf.save(&mut session).await.unwrap();

        assert_eq!(saved.pages_per_day, 100);
        assert_eq!(shelf.list().await.unwrap(), vec![saved]);
        assert_eq!(session.current_step(), WizardStep::BookSearch);
        assert!(session.plan().book.is_none());
    }

    #[tokio::test]
    async fn incomplete_session_is_not_saved() {
        let repo = MemoryRepository::default();
        let shelf = Shelf::new(&repo);
        let mut session = WizardSession::new(date(2025, 3, 3));

        let result = shelf.save(&mut session).await;

        assert!(matches!(result, Err(ShelfError::Incomplete(_))));
        assert!(shelf.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn failed_write_keeps_session() {
        let repo = MemoryRepository {
            fail_writes: true,
            ..Default::default()
        };
        let shelf = Shelf::new(&repo);
        let mut session = complete_session("42");
        let before = session.clone();

        let err = shelf.save(&mut session).await.unwrap_err();

        assert!(err.is_retryable());
        assert_eq!(session, before);
    }

    #[tokio::test]
    async fn edit_replaces_original_entry_in_place() {
        let repo = MemoryRepository::default();
        *repo.books.lock().unwrap() = vec![entry("a", "1"), entry("b", "2"), entry("c", "3")];
        let shelf = Shelf::new(&repo);

        let mut session = shelf.edit("2", date(2025, 3, 3)).await.unwrap();
        session.apply(PlanChange::SetTotalPages(Some(120))).unwrap();
        shelf.save(&mut session).await.unwrap();

        let books = shelf.list().await.unwrap();
        assert_eq!(titles(&books), vec!["a", "b", "c"]);
        assert_eq!(books[1].number_of_pages, 120);
    }

    #[tokio::test]
    async fn edit_unknown_cover_is_not_found() {
        let repo = MemoryRepository::default();
        let shelf = Shelf::new(&repo);

        let result = shelf.edit("nope", date(2025, 3, 3)).await;

        assert!(matches!(result, Err(ShelfError::NotFound(c)) if c == "nope"));
    }

    #[tokio::test]
    async fn delete_by_cover_and_position() {
        let repo = MemoryRepository::default();
        *repo.books.lock().unwrap() = vec![entry("a", "1"), entry("b", "2"), entry("c", "3")];
        let shelf = Shelf::new(&repo);

        shelf.delete("2").await.unwrap();
        shelf.delete_at(0).await.unwrap();

        assert_eq!(titles(&shelf.list().await.unwrap()), vec!["c"]);
        assert_eq!(shelf.delete_at(5).await, Err(ShelfError::NoSuchPosition(5)));
        assert_eq!(shelf.delete("2").await, Err(ShelfError::NotFound("2".to_string())));
    }
}
