//! Schema migrations
//!
//! Embedded SQL files, each applied once and pinned by a SHA-256 checksum.

mod checksums;
mod embedded;
mod runner;

pub use runner::{applied_migrations, apply_migrations};
