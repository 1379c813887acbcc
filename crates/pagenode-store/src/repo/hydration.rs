//! Hydration layer - loads the whole database into an in-memory Store
//!
//! Rows are read in id order so the resulting Store, and anything derived
//! from iterating it, is deterministic.

use crate::errors::{from_rusqlite, Result};
use crate::repo::rows::{
    node_from_row, payload_from_row, translation_from_row, version_from_row, NODE_COLUMNS,
    PAYLOAD_COLUMNS, TRANSLATION_COLUMNS, VERSION_COLUMNS,
};
use pagenode_core::Store;
use rusqlite::{Connection, Row};

fn load_all<T>(
    conn: &Connection,
    table: &str,
    columns: &str,
    map: fn(&Row<'_>) -> rusqlite::Result<T>,
) -> Result<Vec<T>> {
    let sql = format!("SELECT {} FROM {} ORDER BY id", columns, table);
    let mut stmt = conn.prepare(&sql).map_err(from_rusqlite)?;
    let rows = stmt
        .query_map([], map)
        .map_err(from_rusqlite)?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(from_rusqlite)?;
    Ok(rows)
}

/// Load every node, translation, version and payload into a new Store
pub fn load_store(conn: &Connection) -> Result<Store> {
    let mut store = Store::new();

    for payload in load_all(conn, "payloads", PAYLOAD_COLUMNS, payload_from_row)? {
        store.insert_payload(payload);
    }
    for node in load_all(conn, "nodes", NODE_COLUMNS, node_from_row)? {
        store.insert_node(node);
    }
    for version in load_all(conn, "node_versions", VERSION_COLUMNS, version_from_row)? {
        store.insert_version(version);
    }
    for translation in load_all(
        conn,
        "node_translations",
        TRANSLATION_COLUMNS,
        translation_from_row,
    )? {
        store.insert_translation(translation);
    }

    tracing::debug!(
        nodes = store.list_all_nodes().len(),
        versions = store.list_versions().len(),
        "store hydrated"
    );
    Ok(store)
}
