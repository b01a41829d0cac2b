pub mod calculations;
pub mod db;
pub mod input;
pub mod models;
pub mod search;
pub mod shelf;
pub mod wizard;

pub use db::repository::{BookRepository, RepositoryError};
pub use models::*;
