//! Migration runner
//!
//! Each embedded migration is applied once, in its own transaction, and
//! recorded in `schema_version` with the checksum of its SQL. On every open
//! the recorded history is compared with the embedded list: an edited
//! migration or one this binary does not know about stops the open.

use std::collections::HashMap;

use crate::errors::{checksum_mismatch, from_rusqlite, migration_error, Result};
use crate::migrations::checksums::compute_checksum;
use crate::migrations::embedded::{get_migrations, Migration};
use rusqlite::Connection;

const CREATE_SCHEMA_VERSION: &str = "CREATE TABLE IF NOT EXISTS schema_version (
    id INTEGER PRIMARY KEY,
    migration_id TEXT NOT NULL UNIQUE,
    applied_at INTEGER NOT NULL,
    checksum TEXT NOT NULL
)";

/// Apply all pending migrations to the database
pub fn apply_migrations(conn: &mut Connection) -> Result<()> {
    conn.execute(CREATE_SCHEMA_VERSION, [])
        .map_err(from_rusqlite)?;

    let migrations = get_migrations();
    let recorded = recorded_checksums(conn)?;

    if let Some(unknown) = recorded
        .keys()
        .find(|id| !migrations.iter().any(|m| m.id == id.as_str()))
    {
        return Err(migration_error(
            unknown,
            "recorded in the database but not embedded in this build",
        ));
    }

    for migration in &migrations {
        let checksum = compute_checksum(migration.sql);
        match recorded.get(migration.id) {
            Some(stored) if *stored == checksum => {}
            Some(stored) => return Err(checksum_mismatch(migration.id, stored, &checksum)),
            None => apply_one(conn, migration, &checksum)?,
        }
    }

    Ok(())
}

/// Ids of the migrations recorded in `schema_version`, in application order
pub fn applied_migrations(conn: &Connection) -> Result<Vec<String>> {
    let mut stmt = conn
        .prepare("SELECT migration_id FROM schema_version ORDER BY id")
        .map_err(from_rusqlite)?;
    let ids = stmt
        .query_map([], |row| row.get(0))
        .map_err(from_rusqlite)?
        .collect::<std::result::Result<Vec<String>, _>>()
        .map_err(from_rusqlite)?;
    Ok(ids)
}

fn recorded_checksums(conn: &Connection) -> Result<HashMap<String, String>> {
    let mut stmt = conn
        .prepare("SELECT migration_id, checksum FROM schema_version")
        .map_err(from_rusqlite)?;
    let rows = stmt
        .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))
        .map_err(from_rusqlite)?
        .collect::<std::result::Result<HashMap<String, String>, _>>()
        .map_err(from_rusqlite)?;
    Ok(rows)
}

fn apply_one(conn: &mut Connection, migration: &Migration, checksum: &str) -> Result<()> {
    let tx = conn.transaction().map_err(from_rusqlite)?;

    tx.execute_batch(migration.sql)
        .map_err(|e| migration_error(migration.id, &e.to_string()))?;
    tx.execute(
        "INSERT INTO schema_version (migration_id, applied_at, checksum) VALUES (?1, ?2, ?3)",
        rusqlite::params![migration.id, chrono::Utc::now().timestamp(), checksum],
    )
    .map_err(from_rusqlite)?;

    tx.commit().map_err(from_rusqlite)?;
    tracing::debug!(migration_id = migration.id, "migration applied");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn migrated() -> Connection {
        let mut conn = Connection::open_in_memory().unwrap();
        apply_migrations(&mut conn).unwrap();
        conn
    }

    #[test]
    fn test_apply_records_each_migration() {
        let conn = migrated();
        assert_eq!(applied_migrations(&conn).unwrap(), vec!["001_initial_schema"]);
    }

    #[test]
    fn test_tampered_checksum_is_reported() {
        let mut conn = migrated();
        conn.execute(
            "UPDATE schema_version SET checksum = 'deadbeef' WHERE migration_id = '001_initial_schema'",
            [],
        )
        .unwrap();

        let err = apply_migrations(&mut conn).unwrap_err();
        assert!(err.message().contains("Checksum mismatch"));
    }

    #[test]
    fn test_unknown_recorded_migration_is_reported() {
        let mut conn = migrated();
        conn.execute(
            "INSERT INTO schema_version (migration_id, applied_at, checksum) VALUES ('999_future', 0, 'x')",
            [],
        )
        .unwrap();

        let err = apply_migrations(&mut conn).unwrap_err();
        assert!(err.message().contains("999_future"));
    }
}
