use std::collections::{BTreeMap, HashMap};

use crate::errors::{PageNodeError, Result};
use crate::model::{
    EntityKind, Node, NodeId, NodeTranslation, Payload, PayloadId, TranslationId, Version,
    VersionId,
};

use super::repository::{ChangeSet, Repository};

/// In-memory repository
///
/// BTreeMap-backed so iteration order is deterministic. Not thread-safe:
/// designed for single-threaded, request-scoped use, tests, and as the
/// hydration target of the SQLite store.
#[derive(Debug, Clone, Default)]
pub struct Store {
    pub(crate) nodes: BTreeMap<NodeId, Node>,
    pub(crate) translations: BTreeMap<TranslationId, NodeTranslation>,
    pub(crate) versions: BTreeMap<VersionId, Version>,
    pub(crate) payloads: BTreeMap<PayloadId, Payload>,
    sequences: HashMap<EntityKind, u64>,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    /// List all live (non-deleted) nodes
    pub fn list_nodes(&self) -> Vec<&Node> {
        self.nodes.values().filter(|n| !n.deleted).collect()
    }

    /// List every node, tombstoned ones included
    pub fn list_all_nodes(&self) -> Vec<&Node> {
        self.nodes.values().collect()
    }

    pub fn list_translations(&self) -> Vec<&NodeTranslation> {
        self.translations.values().collect()
    }

    pub fn list_versions(&self) -> Vec<&Version> {
        self.versions.values().collect()
    }

    /// Insert a node directly, bypassing commit validation
    ///
    /// Used by hydration and test helpers. Keeps the node sequence ahead of
    /// the inserted id.
    pub fn insert_node(&mut self, node: Node) {
        self.bump_sequence(EntityKind::Node, node.id.get());
        self.nodes.insert(node.id, node);
    }

    pub fn insert_translation(&mut self, translation: NodeTranslation) {
        self.bump_sequence(EntityKind::Translation, translation.id.get());
        self.translations.insert(translation.id, translation);
    }

    pub fn insert_version(&mut self, version: Version) {
        self.bump_sequence(EntityKind::Version, version.id.get());
        self.versions.insert(version.id, version);
    }

    pub fn insert_payload(&mut self, payload: Payload) {
        self.bump_sequence(EntityKind::Payload, payload.id.get());
        self.payloads.insert(payload.id, payload);
    }

    fn bump_sequence(&mut self, kind: EntityKind, id: u64) {
        let seq = self.sequences.entry(kind).or_insert(0);
        if *seq < id {
            *seq = id;
        }
    }

    /// Check that every reference in `changes` resolves, either to a stored
    /// record or to one staged alongside it
    fn validate(&self, changes: &ChangeSet) -> Result<()> {
        let node_known = |id: NodeId| {
            self.nodes.contains_key(&id) || changes.nodes.iter().any(|n| n.id == id)
        };
        let translation_known = |id: TranslationId| {
            self.translations.contains_key(&id) || changes.translations.iter().any(|t| t.id == id)
        };
        let version_known = |id: VersionId| {
            self.versions.contains_key(&id) || changes.versions.iter().any(|v| v.id == id)
        };
        let payload_known = |id: PayloadId| {
            self.payloads.contains_key(&id) || changes.payloads.iter().any(|p| p.id == id)
        };

        for node in &changes.nodes {
            if let Some(parent) = node.parent_id {
                if !node_known(parent) {
                    return Err(dangling("node", node.id.get(), "parent", parent.get()));
                }
            }
        }

        for tr in &changes.translations {
            if !node_known(tr.node_id) {
                return Err(dangling("translation", tr.id.get(), "node", tr.node_id.get()));
            }
            // (node, locale) uniqueness
            let clash = self
                .translations
                .values()
                .chain(changes.translations.iter())
                .any(|other| {
                    other.id != tr.id && other.node_id == tr.node_id && other.locale == tr.locale
                });
            if clash {
                return Err(PageNodeError::TranslationAlreadyExists {
                    node_id: tr.node_id,
                    locale: tr.locale.clone(),
                });
            }
            for slot in [tr.public_version_id, tr.draft_version_id].into_iter().flatten() {
                if !version_known(slot) {
                    return Err(dangling("translation", tr.id.get(), "version", slot.get()));
                }
            }
        }

        for version in &changes.versions {
            if !translation_known(version.translation_id) {
                return Err(dangling(
                    "version",
                    version.id.get(),
                    "translation",
                    version.translation_id.get(),
                ));
            }
            if !payload_known(version.payload_id) {
                return Err(dangling(
                    "version",
                    version.id.get(),
                    "payload",
                    version.payload_id.get(),
                ));
            }
            if let Some(origin) = version.origin_id {
                if !version_known(origin) {
                    return Err(dangling("version", version.id.get(), "origin", origin.get()));
                }
            }
        }

        Ok(())
    }
}

fn dangling(entity: &str, id: u64, reference: &str, target: u64) -> PageNodeError {
    PageNodeError::Persistence {
        message: format!("{} {} references unknown {} {}", entity, id, reference, target),
    }
}

impl Repository for Store {
    fn next_id(&mut self, kind: EntityKind) -> Result<u64> {
        let seq = self.sequences.entry(kind).or_insert(0);
        *seq += 1;
        Ok(*seq)
    }

    fn find_node(&self, id: NodeId) -> Result<Option<Node>> {
        Ok(self.nodes.get(&id).cloned())
    }

    fn children_of(&self, id: NodeId) -> Result<Vec<Node>> {
        Ok(self
            .nodes
            .values()
            .filter(|n| n.parent_id == Some(id))
            .cloned()
            .collect())
    }

    fn find_translation(&self, id: TranslationId) -> Result<Option<NodeTranslation>> {
        Ok(self.translations.get(&id).cloned())
    }

    fn find_translation_for(
        &self,
        node_id: NodeId,
        locale: &str,
    ) -> Result<Option<NodeTranslation>> {
        Ok(self
            .translations
            .values()
            .find(|t| t.node_id == node_id && t.locale == locale)
            .cloned())
    }

    fn translations_for(&self, node_id: NodeId) -> Result<Vec<NodeTranslation>> {
        let mut found: Vec<NodeTranslation> = self
            .translations
            .values()
            .filter(|t| t.node_id == node_id)
            .cloned()
            .collect();
        found.sort_by(|a, b| a.locale.cmp(&b.locale));
        Ok(found)
    }

    fn find_version(&self, id: VersionId) -> Result<Option<Version>> {
        Ok(self.versions.get(&id).cloned())
    }

    fn versions_for(&self, translation_id: TranslationId) -> Result<Vec<Version>> {
        let mut found: Vec<Version> = self
            .versions
            .values()
            .filter(|v| v.translation_id == translation_id)
            .cloned()
            .collect();
        found.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(found)
    }

    fn find_payload(&self, id: PayloadId) -> Result<Option<Payload>> {
        Ok(self.payloads.get(&id).cloned())
    }

    fn commit(&mut self, changes: ChangeSet) -> Result<()> {
        // Validate everything first: a rejected change set leaves no trace
        self.validate(&changes)?;

        for payload in changes.payloads {
            self.insert_payload(payload);
        }
        for node in changes.nodes {
            self.insert_node(node);
        }
        for version in changes.versions {
            self.insert_version(version);
        }
        for translation in changes.translations {
            self.insert_translation(translation);
        }
        Ok(())
    }
}
