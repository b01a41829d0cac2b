use async_trait::async_trait;
use thiserror::Error;

use crate::models::StoredBook;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("Record not found")]
    NotFound,

    #[error("Database error: {0}")]
    Database(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Storage for the reading list.
///
/// The list is ordered and is always read and written as a whole; there is
/// no per-entry update.
#[async_trait]
pub trait BookRepository: Send + Sync {
    /// Every saved entry in list order. An empty store yields an empty list.
    async fn load_books(&self) -> Result<Vec<StoredBook>, RepositoryError>;

    /// Replaces the stored list with `books`, keeping their order.
    async fn save_books(&self, books: &[StoredBook]) -> Result<(), RepositoryError>;
}
