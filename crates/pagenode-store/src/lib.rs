//! pagenode store - SQLite persistence for the page tree
//!
//! Provides:
//! - SQLite schema with a checksummed migrations framework
//! - `SqliteRepo`, a `Repository` whose commits are single transactions
//! - Hydration of a whole database into the in-memory `Store`

pub mod db;
pub mod errors;
pub mod migrations;
pub mod repo;

pub use errors::Result;
pub use repo::SqliteRepo;
