//! Reading list stored as a single JSON array.
//!
//! The file holds the same list the mobile app kept in its key-value store,
//! so an exported list can be opened directly.

pub mod factory;
pub mod repository;

pub use factory::JsonRepositoryFactory;
pub use repository::JsonFileRepository;
