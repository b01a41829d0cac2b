use std::str::FromStr;

use async_trait::async_trait;
use reading_core::db::repository::{BookRepository, RepositoryError};
use reading_core::db::{DbConfig, RepositoryFactory};
use sqlx::sqlite::SqliteConnectOptions;
use tracing::info;

use crate::repository::SqliteRepository;

const MEMORY: &str = ":memory:";

/// Turns a connection string into connect options.
///
/// * `":memory:"` or `"sqlite::memory:"`: ephemeral database.
/// * `"sqlite:..."` URLs are parsed as-is.
/// * Anything else is a file path, created if missing.
fn connect_options(connection_string: &str) -> Result<(SqliteConnectOptions, bool), sqlx::Error> {
    if connection_string == MEMORY || connection_string == "sqlite::memory:" {
        return Ok((SqliteConnectOptions::from_str("sqlite::memory:")?, true));
    }
    if connection_string.starts_with("sqlite:") {
        let options = SqliteConnectOptions::from_str(connection_string)?.create_if_missing(true);
        return Ok((options, false));
    }
    let options = SqliteConnectOptions::new()
        .filename(connection_string)
        .create_if_missing(true);
    Ok((options, false))
}

/// [`RepositoryFactory`] for SQLite.
///
/// ```rust,no_run
/// use reading_core::db::RepositoryRegistry;
/// use reading_db_sqlite::SqliteRepositoryFactory;
///
/// let mut registry = RepositoryRegistry::new();
/// registry.register(Box::new(SqliteRepositoryFactory));
/// ```
pub struct SqliteRepositoryFactory;

#[async_trait]
impl RepositoryFactory for SqliteRepositoryFactory {
    fn backend_name(&self) -> &'static str {
        "sqlite"
    }

    /// Opens `config.connection_string` (a file path, a `sqlite:` URL or
    /// `":memory:"`) and applies pending migrations.
    async fn create(
        &self,
        config: &DbConfig,
    ) -> Result<Box<dyn BookRepository>, RepositoryError> {
        let (options, in_memory) = connect_options(&config.connection_string)
            .map_err(|e| RepositoryError::Configuration(e.to_string()))?;
        let repo = SqliteRepository::connect_with(options, in_memory)
            .await
            .map_err(|e| RepositoryError::Connection(format!("{e:#}")))?;
        repo.run_migrations()
            .await
            .map_err(|e| RepositoryError::Database(format!("{e:#}")))?;
        info!(path = %config.connection_string, "Opened SQLite reading list");
        Ok(Box::new(repo))
    }
}
