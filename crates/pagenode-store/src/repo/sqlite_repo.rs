//! SQLite repository implementation
//!
//! Implements the core `Repository` contract on a single connection. Every
//! `commit` runs in one transaction; foreign keys are deferred so records of
//! a change set may reference each other in any order.

use crate::db;
use crate::errors::{from_rusqlite, from_serde_json, Result};
use crate::migrations::apply_migrations;
use crate::repo::rows::{
    node_from_row, payload_from_row, to_micros, translation_from_row, version_from_row,
    NODE_COLUMNS, PAYLOAD_COLUMNS, TRANSLATION_COLUMNS, VERSION_COLUMNS,
};
use pagenode_core::model::{
    EntityKind, Node, NodeId, NodeTranslation, Payload, PayloadId, TranslationId, Version,
    VersionId,
};
use pagenode_core::{ChangeSet, PageNodeError, Repository, Store};
use rusqlite::{Connection, OptionalExtension, Transaction};
use std::path::Path;

/// SQLite-backed repository
pub struct SqliteRepo {
    conn: Connection,
}

impl SqliteRepo {
    /// Open (or create) a database file and bring its schema up to date
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = db::open(path)?;
        Self::from_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = db::open_in_memory()?;
        Self::from_connection(conn)
    }

    /// Wrap an existing connection, configuring it and applying migrations
    pub fn from_connection(mut conn: Connection) -> Result<Self> {
        db::configure(&conn)?;
        apply_migrations(&mut conn)?;
        Ok(Self { conn })
    }

    /// Load every record into an in-memory `Store`
    pub fn hydrate(&self) -> Result<Store> {
        super::hydration::load_store(&self.conn)
    }

    fn query_one<T>(
        &self,
        sql: &str,
        id: u64,
        map: fn(&rusqlite::Row<'_>) -> rusqlite::Result<T>,
    ) -> Result<Option<T>> {
        self.conn
            .query_row(sql, [id], map)
            .optional()
            .map_err(from_rusqlite)
    }

    fn query_many<T>(
        &self,
        sql: &str,
        params: impl rusqlite::Params,
        map: fn(&rusqlite::Row<'_>) -> rusqlite::Result<T>,
    ) -> Result<Vec<T>> {
        let mut stmt = self.conn.prepare(sql).map_err(from_rusqlite)?;
        let rows = stmt
            .query_map(params, map)
            .map_err(from_rusqlite)?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(from_rusqlite)?;
        Ok(rows)
    }

    fn allocate(&mut self, kind: EntityKind) -> Result<u64> {
        self.conn
            .execute(
                "INSERT INTO id_sequences (kind, value) VALUES (?1, 1)
                 ON CONFLICT(kind) DO UPDATE SET value = value + 1",
                [kind.as_str()],
            )
            .map_err(from_rusqlite)?;

        self.conn
            .query_row(
                "SELECT value FROM id_sequences WHERE kind = ?1",
                [kind.as_str()],
                |row| row.get(0),
            )
            .map_err(from_rusqlite)
    }

    fn write(&mut self, changes: &ChangeSet) -> std::result::Result<(), PageNodeError> {
        let tx = self.conn.transaction().map_err(from_rusqlite)?;

        for payload in &changes.payloads {
            persist_payload_tx(&tx, payload)?;
        }
        for node in &changes.nodes {
            persist_node_tx(&tx, node)?;
        }
        for version in &changes.versions {
            persist_version_tx(&tx, version)?;
        }
        for translation in &changes.translations {
            ensure_locale_free(&tx, translation)?;
            persist_translation_tx(&tx, translation)?;
        }

        // Deferred foreign keys are checked here; failure rolls back on drop
        tx.commit().map_err(from_rusqlite)?;
        Ok(())
    }
}

/// The in-memory store reports a second translation for a locale as a
/// domain error; do the same instead of surfacing the UNIQUE violation.
fn ensure_locale_free(
    tx: &Transaction<'_>,
    translation: &NodeTranslation,
) -> std::result::Result<(), PageNodeError> {
    let clash: Option<u64> = tx
        .query_row(
            "SELECT id FROM node_translations WHERE node_id = ?1 AND locale = ?2 AND id != ?3",
            rusqlite::params![translation.node_id.get(), translation.locale, translation.id.get()],
            |row| row.get(0),
        )
        .optional()
        .map_err(from_rusqlite)?;

    match clash {
        Some(_) => Err(PageNodeError::TranslationAlreadyExists {
            node_id: translation.node_id,
            locale: translation.locale.clone(),
        }),
        None => Ok(()),
    }
}

fn persist_node_tx(tx: &Transaction<'_>, node: &Node) -> Result<()> {
    tx.execute(
        "INSERT INTO nodes (id, parent_id, ref_type, deleted, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)
         ON CONFLICT(id) DO UPDATE SET
            parent_id = excluded.parent_id,
            ref_type = excluded.ref_type,
            deleted = excluded.deleted,
            updated_at = excluded.updated_at",
        rusqlite::params![
            node.id.get(),
            node.parent_id.map(NodeId::get),
            node.ref_type,
            node.deleted,
            to_micros(node.created_at),
            to_micros(node.updated_at),
        ],
    )
    .map_err(from_rusqlite)?;

    Ok(())
}

fn persist_translation_tx(tx: &Transaction<'_>, translation: &NodeTranslation) -> Result<()> {
    tx.execute(
        "INSERT INTO node_translations (id, node_id, locale, title, slug, online,
            public_version_id, draft_version_id, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
         ON CONFLICT(id) DO UPDATE SET
            title = excluded.title,
            slug = excluded.slug,
            online = excluded.online,
            public_version_id = excluded.public_version_id,
            draft_version_id = excluded.draft_version_id,
            updated_at = excluded.updated_at",
        rusqlite::params![
            translation.id.get(),
            translation.node_id.get(),
            translation.locale,
            translation.title,
            translation.slug,
            translation.online,
            translation.public_version_id.map(VersionId::get),
            translation.draft_version_id.map(VersionId::get),
            to_micros(translation.created_at),
            to_micros(translation.updated_at),
        ],
    )
    .map_err(from_rusqlite)?;

    Ok(())
}

// created_at is rewritten on conflict: the role swap re-dates the swapped version
fn persist_version_tx(tx: &Transaction<'_>, version: &Version) -> Result<()> {
    tx.execute(
        "INSERT INTO node_versions (id, translation_id, version_type, payload_id, owner,
            origin_id, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
         ON CONFLICT(id) DO UPDATE SET
            version_type = excluded.version_type,
            payload_id = excluded.payload_id,
            owner = excluded.owner,
            origin_id = excluded.origin_id,
            created_at = excluded.created_at,
            updated_at = excluded.updated_at",
        rusqlite::params![
            version.id.get(),
            version.translation_id.get(),
            version.version_type.as_str(),
            version.payload_id.get(),
            version.owner,
            version.origin_id.map(VersionId::get),
            to_micros(version.created_at),
            to_micros(version.updated_at),
        ],
    )
    .map_err(from_rusqlite)?;

    Ok(())
}

fn persist_payload_tx(tx: &Transaction<'_>, payload: &Payload) -> Result<()> {
    let content = serde_json::to_string(&payload.content).map_err(from_serde_json)?;

    tx.execute(
        "INSERT INTO payloads (id, ref_type, title, structure_node, content)
         VALUES (?1, ?2, ?3, ?4, ?5)
         ON CONFLICT(id) DO UPDATE SET
            ref_type = excluded.ref_type,
            title = excluded.title,
            structure_node = excluded.structure_node,
            content = excluded.content",
        rusqlite::params![
            payload.id.get(),
            payload.ref_type,
            payload.title,
            payload.structure_node,
            content,
        ],
    )
    .map_err(from_rusqlite)?;

    Ok(())
}

impl Repository for SqliteRepo {
    fn next_id(&mut self, kind: EntityKind) -> pagenode_core::Result<u64> {
        Ok(self.allocate(kind)?)
    }

    fn find_node(&self, id: NodeId) -> pagenode_core::Result<Option<Node>> {
        let sql = format!("SELECT {} FROM nodes WHERE id = ?1", NODE_COLUMNS);
        Ok(self.query_one(&sql, id.get(), node_from_row)?)
    }

    fn children_of(&self, id: NodeId) -> pagenode_core::Result<Vec<Node>> {
        let sql = format!(
            "SELECT {} FROM nodes WHERE parent_id = ?1 ORDER BY id",
            NODE_COLUMNS
        );
        Ok(self.query_many(&sql, [id.get()], node_from_row)?)
    }

    fn find_translation(&self, id: TranslationId) -> pagenode_core::Result<Option<NodeTranslation>> {
        let sql = format!(
            "SELECT {} FROM node_translations WHERE id = ?1",
            TRANSLATION_COLUMNS
        );
        Ok(self.query_one(&sql, id.get(), translation_from_row)?)
    }

    fn find_translation_for(
        &self,
        node_id: NodeId,
        locale: &str,
    ) -> pagenode_core::Result<Option<NodeTranslation>> {
        let sql = format!(
            "SELECT {} FROM node_translations WHERE node_id = ?1 AND locale = ?2",
            TRANSLATION_COLUMNS
        );
        let found = self
            .conn
            .query_row(
                &sql,
                rusqlite::params![node_id.get(), locale],
                translation_from_row,
            )
            .optional()
            .map_err(from_rusqlite)?;
        Ok(found)
    }

    fn translations_for(&self, node_id: NodeId) -> pagenode_core::Result<Vec<NodeTranslation>> {
        let sql = format!(
            "SELECT {} FROM node_translations WHERE node_id = ?1 ORDER BY locale",
            TRANSLATION_COLUMNS
        );
        Ok(self.query_many(&sql, [node_id.get()], translation_from_row)?)
    }

    fn find_version(&self, id: VersionId) -> pagenode_core::Result<Option<Version>> {
        let sql = format!("SELECT {} FROM node_versions WHERE id = ?1", VERSION_COLUMNS);
        Ok(self.query_one(&sql, id.get(), version_from_row)?)
    }

    fn versions_for(&self, translation_id: TranslationId) -> pagenode_core::Result<Vec<Version>> {
        let sql = format!(
            "SELECT {} FROM node_versions WHERE translation_id = ?1 ORDER BY created_at, id",
            VERSION_COLUMNS
        );
        Ok(self.query_many(&sql, [translation_id.get()], version_from_row)?)
    }

    fn find_payload(&self, id: PayloadId) -> pagenode_core::Result<Option<Payload>> {
        let sql = format!("SELECT {} FROM payloads WHERE id = ?1", PAYLOAD_COLUMNS);
        Ok(self.query_one(&sql, id.get(), payload_from_row)?)
    }

    fn commit(&mut self, changes: ChangeSet) -> pagenode_core::Result<()> {
        if changes.is_empty() {
            return Ok(());
        }
        let records = changes.len();
        self.write(&changes)?;
        tracing::debug!(records, "change set committed");
        Ok(())
    }
}
