use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reading_core::{BookRepository, ReadingDays, RepositoryError, StoredBook};
use sqlx::Row;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use tracing::debug;

pub struct SqliteRepository {
    pool: SqlitePool,
}

impl SqliteRepository {
    pub async fn new(database_url: &str) -> Result<Self> {
        let pool = SqlitePool::connect(database_url)
            .await
            .with_context(|| format!("Failed to connect to database: {}", database_url))?;
        Ok(Self { pool })
    }

    /// Connect with explicit options. In-memory databases are limited to a
    /// single connection that is never recycled, since each SQLite
    /// connection would otherwise see its own empty database.
    pub async fn connect_with(
        options: SqliteConnectOptions,
        in_memory: bool,
    ) -> Result<Self> {
        let mut pool_options = SqlitePoolOptions::new();
        if in_memory {
            pool_options = pool_options
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None);
        }
        let pool = pool_options
            .connect_with(options)
            .await
            .context("Failed to open SQLite database")?;
        Ok(Self { pool })
    }

    pub async fn new_with_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .context("Failed to run database migrations")?;
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

fn db_error(e: sqlx::Error) -> RepositoryError {
    RepositoryError::Database(e.to_string())
}

fn row_to_stored_book(row: &SqliteRow) -> Result<StoredBook, RepositoryError> {
    let number_of_pages: i64 = row.try_get("number_of_pages").map_err(db_error)?;
    let pages_per_day: i64 = row.try_get("pages_per_day").map_err(db_error)?;
    let reading_days: i64 = row.try_get("reading_days").map_err(db_error)?;

    Ok(StoredBook {
        title: row.try_get("title").map_err(db_error)?,
        author: row.try_get("author").map_err(db_error)?,
        year: row.try_get("year").map_err(db_error)?,
        cover_id: row.try_get("cover_id").map_err(db_error)?,
        number_of_pages: u32::try_from(number_of_pages).map_err(|_| {
            RepositoryError::Database(format!("invalid number_of_pages: {number_of_pages}"))
        })?,
        deadline: row
            .try_get::<DateTime<Utc>, _>("deadline")
            .map_err(|e| RepositoryError::Database(format!("Failed to get deadline: {}", e)))?,
        pages_per_day: u32::try_from(pages_per_day).map_err(|_| {
            RepositoryError::Database(format!("invalid pages_per_day: {pages_per_day}"))
        })?,
        reading_days: u8::try_from(reading_days)
            .map(ReadingDays::from_bits)
            .map_err(|_| {
                RepositoryError::Database(format!("invalid reading_days: {reading_days}"))
            })?,
    })
}

#[async_trait]
impl BookRepository for SqliteRepository {
    async fn load_books(&self) -> Result<Vec<StoredBook>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT title, author, year, cover_id, number_of_pages, deadline,
                    pages_per_day, reading_days
             FROM stored_books
             ORDER BY position",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;

        rows.iter().map(row_to_stored_book).collect()
    }

    async fn save_books(&self, books: &[StoredBook]) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await.map_err(db_error)?;

        sqlx::query("DELETE FROM stored_books")
            .execute(&mut *tx)
            .await
            .map_err(db_error)?;

        for (position, book) in books.iter().enumerate() {
            sqlx::query(
                "INSERT INTO stored_books (
                    position, title, author, year, cover_id, number_of_pages,
                    deadline, pages_per_day, reading_days
                ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(position as i64)
            .bind(&book.title)
            .bind(&book.author)
            .bind(&book.year)
            .bind(&book.cover_id)
            .bind(i64::from(book.number_of_pages))
            .bind(book.deadline)
            .bind(i64::from(book.pages_per_day))
            .bind(i64::from(book.reading_days.to_bits()))
            .execute(&mut *tx)
            .await
            .map_err(db_error)?;
        }

        tx.commit().await.map_err(db_error)?;
        debug!(count = books.len(), "Wrote reading list");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, Weekday};
    use pretty_assertions::assert_eq;
    use reading_core::deadline_timestamp;

    use super::*;

    async fn setup_test_db() -> SqliteRepository {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .expect("Failed to create in-memory database");

        let repo = SqliteRepository::new_with_pool(pool).await;
        repo.run_migrations()
            .await
            .expect("Failed to run migrations");
        repo
    }

    fn entry(
        title: &str,
        cover_id: &str,
    ) -> StoredBook {
        StoredBook {
            title: title.to_string(),
            author: "Jane Austen".to_string(),
            year: "1815".to_string(),
            cover_id: cover_id.to_string(),
            number_of_pages: 474,
            deadline: deadline_timestamp(NaiveDate::from_ymd_opt(2025, 5, 30).unwrap()),
            pages_per_day: 20,
            reading_days: ReadingDays::from_weekdays([Weekday::Tue, Weekday::Sun]),
        }
    }

    #[tokio::test]
    async fn empty_database_has_no_books() {
        let repo = setup_test_db().await;

        assert_eq!(repo.load_books().await, Ok(Vec::new()));
    }

    #[tokio::test]
    async fn save_then_load_preserves_fields_and_order() {
        let repo = setup_test_db().await;
        let books = vec![entry("Persuasion", "9"), entry("Emma", "3"), entry("Emma", "3")];

        repo.save_books(&books).await.unwrap();

        assert_eq!(repo.load_books().await.unwrap(), books);
    }

    #[tokio::test]
    async fn save_replaces_previous_list() {
        let repo = setup_test_db().await;
        repo.save_books(&[entry("Persuasion", "9"), entry("Emma", "3")])
            .await
            .unwrap();

        repo.save_books(&[entry("Emma", "3")]).await.unwrap();

        let titles: Vec<String> = repo
            .load_books()
            .await
            .unwrap()
            .into_iter()
            .map(|b| b.title)
            .collect();
        assert_eq!(titles, vec!["Emma"]);
    }

    #[tokio::test]
    async fn corrupt_row_is_a_database_error() {
        let repo = setup_test_db().await;
        sqlx::query(
            "INSERT INTO stored_books (
                position, title, author, year, cover_id, number_of_pages,
                deadline, pages_per_day, reading_days
            ) VALUES (0, 't', 'a', 'y', 'c', 10, 'not a date', 5, 1)",
        )
        .execute(repo.pool())
        .await
        .expect("Failed to insert corrupt row");

        let result = repo.load_books().await;

        assert!(matches!(result, Err(RepositoryError::Database(_))));
    }
}
