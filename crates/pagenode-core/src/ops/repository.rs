//! Persistence collaborator contract
//!
//! The engine never owns entity lifetime: it reads through a [`Repository`],
//! builds a [`ChangeSet`] and hands it back in a single `commit`, which
//! implementations must apply atomically.

use crate::errors::{PageNodeError, Result};
use crate::model::{
    EntityKind, Node, NodeId, NodeTranslation, Payload, PayloadId, TranslationId, Version,
    VersionId,
};

/// Records to upsert in one atomic commit
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChangeSet {
    pub nodes: Vec<Node>,
    pub translations: Vec<NodeTranslation>,
    pub versions: Vec<Version>,
    pub payloads: Vec<Payload>,
}

impl ChangeSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stage a node; a later put for the same id replaces the earlier one
    pub fn put_node(&mut self, node: Node) -> &mut Self {
        self.nodes.retain(|n| n.id != node.id);
        self.nodes.push(node);
        self
    }

    pub fn put_translation(&mut self, translation: NodeTranslation) -> &mut Self {
        self.translations.retain(|t| t.id != translation.id);
        self.translations.push(translation);
        self
    }

    pub fn put_version(&mut self, version: Version) -> &mut Self {
        self.versions.retain(|v| v.id != version.id);
        self.versions.push(version);
        self
    }

    pub fn put_payload(&mut self, payload: Payload) -> &mut Self {
        self.payloads.retain(|p| p.id != payload.id);
        self.payloads.push(payload);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
            && self.translations.is_empty()
            && self.versions.is_empty()
            && self.payloads.is_empty()
    }

    /// Total number of staged records
    pub fn len(&self) -> usize {
        self.nodes.len() + self.translations.len() + self.versions.len() + self.payloads.len()
    }
}

/// Store contract consumed by the versioning engine and page operations
///
/// Lookups return owned values so that both in-memory and SQL-backed
/// implementations fit. `find_*` methods return `None` for absent records;
/// the provided `get_*` methods turn absence into typed errors.
pub trait Repository {
    /// Allocate the next id in the sequence for `kind`
    ///
    /// # Errors
    ///
    /// Returns `Persistence` if the sequence cannot be advanced.
    fn next_id(&mut self, kind: EntityKind) -> Result<u64>;

    /// Look up a node, including soft-deleted ones
    ///
    /// # Errors
    ///
    /// Returns `Persistence` on storage failure.
    fn find_node(&self, id: NodeId) -> Result<Option<Node>>;

    /// Direct children of a node (deleted ones included), ordered by id
    ///
    /// # Errors
    ///
    /// Returns `Persistence` on storage failure.
    fn children_of(&self, id: NodeId) -> Result<Vec<Node>>;

    /// # Errors
    ///
    /// Returns `Persistence` on storage failure.
    fn find_translation(&self, id: TranslationId) -> Result<Option<NodeTranslation>>;

    /// Translation of `node_id` for `locale`, if any
    ///
    /// # Errors
    ///
    /// Returns `Persistence` on storage failure.
    fn find_translation_for(&self, node_id: NodeId, locale: &str)
        -> Result<Option<NodeTranslation>>;

    /// All translations of a node, ordered by locale
    ///
    /// # Errors
    ///
    /// Returns `Persistence` on storage failure.
    fn translations_for(&self, node_id: NodeId) -> Result<Vec<NodeTranslation>>;

    /// # Errors
    ///
    /// Returns `Persistence` on storage failure.
    fn find_version(&self, id: VersionId) -> Result<Option<Version>>;

    /// All versions of a translation, ordered by `created_at` then id
    ///
    /// # Errors
    ///
    /// Returns `Persistence` on storage failure.
    fn versions_for(&self, translation_id: TranslationId) -> Result<Vec<Version>>;

    /// # Errors
    ///
    /// Returns `Persistence` on storage failure.
    fn find_payload(&self, id: PayloadId) -> Result<Option<Payload>>;

    /// Upsert every record of `changes` atomically
    ///
    /// # Errors
    ///
    /// Returns `Persistence` if any record cannot be written; in that case
    /// none of the records are visible afterwards.
    fn commit(&mut self, changes: ChangeSet) -> Result<()>;

    /// Get a live node
    ///
    /// # Errors
    ///
    /// Returns `NodeNotFound` if absent, or `NodeDeleted` if tombstoned.
    fn get_node(&self, id: NodeId) -> Result<Node> {
        let node = self
            .find_node(id)?
            .ok_or(PageNodeError::NodeNotFound { node_id: id })?;
        if node.deleted {
            return Err(PageNodeError::NodeDeleted { node_id: id });
        }
        Ok(node)
    }

    /// # Errors
    ///
    /// Returns `TranslationNotFound` if absent.
    fn get_translation(&self, id: TranslationId) -> Result<NodeTranslation> {
        self.find_translation(id)?
            .ok_or(PageNodeError::TranslationNotFound { translation_id: id })
    }

    /// # Errors
    ///
    /// Returns `NoTranslationForLocale` if the node is not translated.
    fn get_translation_for(&self, node_id: NodeId, locale: &str) -> Result<NodeTranslation> {
        self.find_translation_for(node_id, locale)?
            .ok_or_else(|| PageNodeError::NoTranslationForLocale {
                node_id,
                locale: locale.to_string(),
            })
    }

    /// # Errors
    ///
    /// Returns `VersionNotFound` if absent.
    fn get_version(&self, id: VersionId) -> Result<Version> {
        self.find_version(id)?
            .ok_or(PageNodeError::VersionNotFound { version_id: id })
    }

    /// # Errors
    ///
    /// Returns `PayloadNotFound` if absent.
    fn get_payload(&self, id: PayloadId) -> Result<Payload> {
        self.find_payload(id)?
            .ok_or(PageNodeError::PayloadNotFound { payload_id: id })
    }

    /// Current public version of a translation
    ///
    /// # Errors
    ///
    /// Returns `MissingPublicVersion` if the slot is empty or dangling, and
    /// `SlotReferencesForeignVersion` if it points into another translation.
    fn get_public_version(&self, translation: &NodeTranslation) -> Result<Version> {
        let missing = || PageNodeError::MissingPublicVersion {
            translation_id: translation.id,
        };
        let id = translation.public_version_id.ok_or_else(missing)?;
        let version = self.find_version(id)?.ok_or_else(missing)?;
        if version.translation_id != translation.id {
            return Err(PageNodeError::SlotReferencesForeignVersion {
                translation_id: translation.id,
                version_id: id,
            });
        }
        Ok(version)
    }

    /// Current draft version of a translation, if the draft slot is set
    ///
    /// # Errors
    ///
    /// Returns `VersionNotFound` if the slot is dangling, and
    /// `SlotReferencesForeignVersion` if it points into another translation.
    fn get_draft_version(&self, translation: &NodeTranslation) -> Result<Option<Version>> {
        let Some(id) = translation.draft_version_id else {
            return Ok(None);
        };
        let version = self.get_version(id)?;
        if version.translation_id != translation.id {
            return Err(PageNodeError::SlotReferencesForeignVersion {
                translation_id: translation.id,
                version_id: id,
            });
        }
        Ok(Some(version))
    }
}
