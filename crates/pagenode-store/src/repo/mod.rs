//! Repository layer persisting the page tree to SQLite

pub mod hydration;
pub mod rows;
pub mod sqlite_repo;

pub use hydration::load_store;
pub use sqlite_repo::SqliteRepo;
