//! SQLite storage for fiscal-year tax rule tables.

pub mod decimal;
pub mod factory;
pub mod repository;

pub use factory::SqliteRepositoryFactory;
pub use repository::SqliteRulesRepository;
