use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use reading_core::{BookRepository, RepositoryError, StoredBook};
use tracing::debug;

pub struct JsonFileRepository {
    path: PathBuf,
}

impl JsonFileRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Sibling file the list is written to before being renamed into place.
    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl BookRepository for JsonFileRepository {
    /// A missing file is an empty list.
    async fn load_books(&self) -> Result<Vec<StoredBook>, RepositoryError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(RepositoryError::Connection(format!(
                    "{}: {e}",
                    self.path.display()
                )));
            }
        };
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Vec::new());
        }

        serde_json::from_slice(&bytes)
            .map_err(|e| RepositoryError::Database(format!("{}: {e}", self.path.display())))
    }

    async fn save_books(&self, books: &[StoredBook]) -> Result<(), RepositoryError> {
        let json = serde_json::to_vec_pretty(books)
            .map_err(|e| RepositoryError::Database(e.to_string()))?;

        let temp = self.temp_path();
        tokio::fs::write(&temp, json)
            .await
            .map_err(|e| RepositoryError::Connection(format!("{}: {e}", temp.display())))?;
        tokio::fs::rename(&temp, &self.path)
            .await
            .map_err(|e| RepositoryError::Connection(format!("{}: {e}", self.path.display())))?;

        debug!(path = %self.path.display(), count = books.len(), "Wrote reading list");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, Weekday};
    use pretty_assertions::assert_eq;
    use reading_core::{ReadingDays, deadline_timestamp};

    use super::*;

    fn entry(cover_id: &str) -> StoredBook {
        StoredBook {
            title: "Middlemarch".to_string(),
            author: "George Eliot".to_string(),
            year: "1871".to_string(),
            cover_id: cover_id.to_string(),
            number_of_pages: 880,
            deadline: deadline_timestamp(NaiveDate::from_ymd_opt(2025, 9, 1).unwrap()),
            pages_per_day: 12,
            reading_days: ReadingDays::from_weekdays([Weekday::Mon, Weekday::Thu]),
        }
    }

    #[tokio::test]
    async fn missing_file_is_empty_list() {
        let dir = tempfile::tempdir().unwrap();
        let repo = JsonFileRepository::new(dir.path().join("books.json"));

        assert_eq!(repo.load_books().await, Ok(Vec::new()));
    }

    #[tokio::test]
    async fn save_then_load_round_trips_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let repo = JsonFileRepository::new(dir.path().join("books.json"));
        let books = vec![entry("5"), entry("1"), entry("3")];

        repo.save_books(&books).await.unwrap();

        assert_eq!(repo.load_books().await.unwrap(), books);
        assert!(!repo.temp_path().exists());
    }

    #[tokio::test]
    async fn reads_list_written_by_the_mobile_app() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("books.json");
        std::fs::write(
            &path,
            r#"[{"title":"Dune","author":"Frank Herbert","year":"1965","cover_id":"",
                "numberOfPages":412,"deadline":"2025-03-21T05:00:00.000Z","ppd":35,
                "readingDays":{"Monday":true,"Tuesday":false,"Wednesday":false,
                "Thursday":false,"Friday":false,"Saturday":false,"Sunday":true}}]"#,
        )
        .unwrap();

        let books = JsonFileRepository::new(&path).load_books().await.unwrap();

        assert_eq!(books.len(), 1);
        assert_eq!(books[0].pages_per_day, 35);
        assert_eq!(books[0].deadline_date(), NaiveDate::from_ymd_opt(2025, 3, 21).unwrap());
    }

    #[tokio::test]
    async fn malformed_file_is_database_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("books.json");
        std::fs::write(&path, "{not json").unwrap();

        let result = JsonFileRepository::new(&path).load_books().await;

        assert!(matches!(result, Err(RepositoryError::Database(_))));
    }
}
