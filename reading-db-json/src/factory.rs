use async_trait::async_trait;
use reading_core::db::repository::{BookRepository, RepositoryError};
use reading_core::db::{DbConfig, RepositoryFactory};
use tracing::info;

use crate::repository::JsonFileRepository;

/// [`RepositoryFactory`] for the `"json"` backend. The connection string is
/// the file path.
pub struct JsonRepositoryFactory;

#[async_trait]
impl RepositoryFactory for JsonRepositoryFactory {
    fn backend_name(&self) -> &'static str {
        "json"
    }

    async fn create(
        &self,
        config: &DbConfig,
    ) -> Result<Box<dyn BookRepository>, RepositoryError> {
        let path = config.connection_string.trim();
        if path.is_empty() || path == ":memory:" {
            return Err(RepositoryError::Configuration(format!(
                "json backend needs a file path, got '{}'",
                config.connection_string
            )));
        }
        info!(path, "Using JSON reading list");
        Ok(Box::new(JsonFileRepository::new(path)))
    }
}
