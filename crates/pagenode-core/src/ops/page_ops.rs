//! Page administration operations
//!
//! Each function is one admin action on a node in a given locale, built on
//! the [`VersioningEngine`] and a [`Repository`]. Authorization and
//! lifecycle logging belong to the command boundary, not here.

use serde_json::Value;

use super::{ChangeSet, Repository};
use crate::errors::{PageNodeError, Result};
use crate::events::{dispatch_post, dispatch_pre, NodeEvent, NodeEventKind};
use crate::model::{
    slugify, EntityKind, Node, NodeId, NodeTranslation, Payload, PayloadId, TranslationId,
    Version, VersionId, VersionType,
};
use crate::traversal::parents_have_translation;
use crate::versioning::VersioningEngine;

/// Input for [`create_page`]
#[derive(Debug, Clone, PartialEq)]
pub struct NewPage {
    /// `None` creates a root node
    pub parent_id: Option<NodeId>,
    pub locale: String,
    pub ref_type: String,
    /// Blank or absent titles fall back to the configured default title
    pub title: Option<String>,
    pub structure_node: bool,
    pub content: Value,
}

impl NewPage {
    pub fn new(locale: impl Into<String>, ref_type: impl Into<String>) -> Self {
        Self {
            parent_id: None,
            locale: locale.into(),
            ref_type: ref_type.into(),
            title: None,
            structure_node: false,
            content: Value::Null,
        }
    }

    pub fn under(mut self, parent_id: NodeId) -> Self {
        self.parent_id = Some(parent_id);
        self
    }

    pub fn titled(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn structure(mut self) -> Self {
        self.structure_node = true;
        self
    }

    pub fn with_content(mut self, content: Value) -> Self {
        self.content = content;
        self
    }
}

/// Records created for a new page or a new translation
#[derive(Debug, Clone, PartialEq)]
pub struct CreatedPage {
    pub node: Node,
    pub translation: NodeTranslation,
    pub version: Version,
}

/// Submitted edit form
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EditRequest {
    pub title: Option<String>,
    pub content: Option<Value>,
    /// Always start a new draft from the public version
    pub save_as_draft: bool,
    /// Publish the edited version once saved
    pub save_and_publish: bool,
}

/// Result of [`commit_edit`]
#[derive(Debug, Clone, PartialEq)]
pub struct EditOutcome {
    /// Version holding the edit (the new public version after a publish)
    pub version: Version,
    /// Whether the caller is left on the draft
    pub draft: bool,
}

/// What an editor sees for a node in one locale
#[derive(Debug, Clone, PartialEq)]
pub enum PageView {
    Translated {
        node: Node,
        translation: NodeTranslation,
        public: Version,
        draft: Option<Version>,
        payload: Payload,
    },
    /// No translation yet for the locale
    Untranslated {
        node: Node,
        /// Locales the page can be copied from
        available_locales: Vec<String>,
        /// Whether every ancestor is translated, a precondition for copying
        can_copy: bool,
    },
}

/// Add a page
///
/// # Arguments
/// * `engine` - Engine supplying clock, user, config and events
/// * `repo` - Repository to read from and commit to
/// * `page` - Parent, locale, reference type, title and initial content
///
/// # Returns
/// The new node with its offline translation and initial public version
///
/// # Errors
/// * `InvalidLocale` - If the locale is blank
/// * `NodeNotFound` / `NodeDeleted` - If the parent is not live
/// * `NoTranslationForLocale` - If the parent is not translated in the locale
/// * `MissingPublicVersion` - If the parent translation has no public version
pub fn create_page(
    engine: &VersioningEngine,
    repo: &mut dyn Repository,
    page: NewPage,
) -> Result<CreatedPage> {
    validate_locale(&page.locale)?;

    if let Some(parent_id) = page.parent_id {
        repo.get_node(parent_id)?;
        let parent_translation = repo.get_translation_for(parent_id, &page.locale)?;
        repo.get_public_version(&parent_translation)?;
    }

    let title = page
        .title
        .filter(|t| !t.trim().is_empty())
        .unwrap_or_else(|| engine.config().default_title.clone());

    let now = engine.now();
    let node = Node::new(
        NodeId(repo.next_id(EntityKind::Node)?),
        page.parent_id,
        page.ref_type.clone(),
        now,
    );
    let payload = Payload::new(
        PayloadId(repo.next_id(EntityKind::Payload)?),
        page.ref_type,
        title,
    )
    .with_structure_node(page.structure_node)
    .with_content(page.content);

    let (translation, version) = new_translation(engine, repo, &node, &page.locale, &payload)?;

    let mut changes = ChangeSet::new();
    changes
        .put_node(node.clone())
        .put_payload(payload)
        .put_version(version.clone())
        .put_translation(translation.clone());
    repo.commit(changes)?;

    tracing::debug!(
        node_id = node.id.get(),
        parent_id = node.parent_id.map(|id| id.get()),
        locale = %translation.locale,
        "page created"
    );
    dispatch_post(
        engine.events(),
        NodeEvent::new(NodeEventKind::AddNode, node.id)
            .with_translation(translation.id)
            .with_version(version.id)
            .with_payload(version.payload_id),
    );

    Ok(CreatedPage {
        node,
        translation,
        version,
    })
}

/// Translate a node into `locale` with an empty page
///
/// The payload has the node's reference type and the default title.
///
/// # Errors
/// * `NodeNotFound` / `NodeDeleted` - If the node is not live
/// * `TranslationAlreadyExists` - If the locale is already translated
pub fn create_empty_translation(
    engine: &VersioningEngine,
    repo: &mut dyn Repository,
    node_id: NodeId,
    locale: &str,
) -> Result<CreatedPage> {
    validate_locale(locale)?;
    let node = repo.get_node(node_id)?;
    ensure_untranslated(repo, node_id, locale)?;

    let payload = Payload::new(
        PayloadId(repo.next_id(EntityKind::Payload)?),
        node.ref_type.clone(),
        engine.config().default_title.clone(),
    );
    let (translation, version) = new_translation(engine, repo, &node, locale, &payload)?;

    let mut changes = ChangeSet::new();
    changes
        .put_payload(payload)
        .put_version(version.clone())
        .put_translation(translation.clone());
    repo.commit(changes)?;

    tracing::debug!(node_id = node_id.get(), locale, "empty translation created");
    Ok(CreatedPage {
        node,
        translation,
        version,
    })
}

/// Translate a node into `locale` by copying another locale's public page
///
/// # Errors
/// * `NodeNotFound` / `NodeDeleted` - If the node is not live
/// * `TranslationAlreadyExists` - If `locale` is already translated
/// * `NoTranslationForLocale` - If `source_locale` is not translated
/// * `MissingPublicVersion` - If the source translation has no public version
pub fn copy_from_other_language(
    engine: &VersioningEngine,
    repo: &mut dyn Repository,
    node_id: NodeId,
    locale: &str,
    source_locale: &str,
) -> Result<CreatedPage> {
    validate_locale(locale)?;
    let node = repo.get_node(node_id)?;
    ensure_untranslated(repo, node_id, locale)?;

    let source = repo.get_translation_for(node_id, source_locale)?;
    let source_public = repo.get_public_version(&source)?;
    let payload = engine.clone_payload(repo, source_public.payload_id)?;
    let (translation, version) = new_translation(engine, repo, &node, locale, &payload)?;

    let mut changes = ChangeSet::new();
    changes
        .put_payload(payload)
        .put_version(version.clone())
        .put_translation(translation.clone());
    repo.commit(changes)?;

    tracing::debug!(
        node_id = node_id.get(),
        locale,
        source_locale,
        "translation copied"
    );
    dispatch_post(
        engine.events(),
        NodeEvent::new(NodeEventKind::CopyPageTranslation, node_id)
            .with_translation(translation.id)
            .with_version(version.id)
            .with_payload(version.payload_id),
    );

    Ok(CreatedPage {
        node,
        translation,
        version,
    })
}

/// Save an edit to the public version or the draft
///
/// The active version is resolved, checkpointed if stale, then receives
/// the edit. With `save_and_publish` the edited version is promoted and
/// the translation goes online.
///
/// # Errors
/// * `NodeNotFound` / `NodeDeleted` / `NoTranslationForLocale` - Lookup
/// * `InvalidTitle` - If a blank title is submitted
/// * `EventVetoed` - If the pre-persist sink refuses the edit. The edit
///   itself is not written, but a draft materialized or a checkpoint taken
///   while resolving the active version is already committed and stays.
/// * `MissingPublicVersion` - If the translation has no public version
pub fn commit_edit(
    engine: &VersioningEngine,
    repo: &mut dyn Repository,
    node_id: NodeId,
    locale: &str,
    want_draft: bool,
    edit: EditRequest,
) -> Result<EditOutcome> {
    if let Some(title) = &edit.title {
        if title.trim().is_empty() {
            return Err(PageNodeError::InvalidTitle {
                reason: "Title cannot be empty or whitespace-only".to_string(),
            });
        }
    }

    let translation = translation_for(repo, node_id, locale)?;
    let active =
        engine.resolve_active_version(repo, translation.id, want_draft, edit.save_as_draft)?;
    let mut draft = active.draft;
    let mut version = engine.refresh_if_stale(repo, translation.id, active.version.id)?;

    // Reload: resolution and refresh may have moved the slots
    let translation = repo.get_translation(translation.id)?;
    let mut payload = repo.get_payload(version.payload_id)?;
    let event = |kind, version: &Version| {
        NodeEvent::new(kind, node_id)
            .with_translation(translation.id)
            .with_version(version.id)
            .with_payload(version.payload_id)
    };

    dispatch_pre(engine.events(), event(NodeEventKind::PrePersist, &version))?;

    if let Some(title) = edit.title {
        payload.title = title;
    }
    if let Some(content) = edit.content {
        payload.content = content;
    }

    let now = engine.now();
    let mut updated = translation.clone();
    updated.title = payload.title.clone();
    if payload.structure_node {
        updated.slug = String::new();
    }
    updated.updated_at = now;
    version.updated_at = now;

    let mut changes = ChangeSet::new();
    changes
        .put_payload(payload)
        .put_version(version.clone())
        .put_translation(updated);
    repo.commit(changes)?;

    if edit.save_and_publish {
        draft = false;
        version = engine.promote_to_public(repo, translation.id, version.id, true)?;
    }

    tracing::debug!(
        node_id = node_id.get(),
        translation_id = translation.id.get(),
        version_id = version.id.get(),
        draft,
        "edit saved"
    );
    dispatch_post(engine.events(), event(NodeEventKind::PostPersist, &version));

    Ok(EditOutcome { version, draft })
}

/// # Errors
/// * `NodeNotFound` / `NodeDeleted` / `NoTranslationForLocale` - Lookup
/// * `EventVetoed` - If the pre-publish sink refuses
pub fn publish(
    engine: &VersioningEngine,
    repo: &mut dyn Repository,
    node_id: NodeId,
    locale: &str,
) -> Result<NodeTranslation> {
    let translation = translation_for(repo, node_id, locale)?;
    engine.set_online(repo, translation.id, true)
}

/// # Errors
/// * `NodeNotFound` / `NodeDeleted` / `NoTranslationForLocale` - Lookup
/// * `EventVetoed` - If the pre-unpublish sink refuses
pub fn unpublish(
    engine: &VersioningEngine,
    repo: &mut dyn Repository,
    node_id: NodeId,
    locale: &str,
) -> Result<NodeTranslation> {
    let translation = translation_for(repo, node_id, locale)?;
    engine.set_online(repo, translation.id, false)
}

/// Soft-delete a page and everything below it
///
/// # Returns
/// Ids of the deleted nodes, in marking order
///
/// # Errors
/// * `NodeNotFound` / `NodeDeleted` / `NoTranslationForLocale` - Lookup
/// * `EventVetoed` - If any pre-delete sink refuses
pub fn delete(
    engine: &VersioningEngine,
    repo: &mut dyn Repository,
    node_id: NodeId,
    locale: &str,
) -> Result<Vec<NodeId>> {
    translation_for(repo, node_id, locale)?;
    engine.cascade_soft_delete(repo, node_id, locale)
}

/// Parse a version identifier received as text
///
/// # Errors
/// * `MissingVersionId` - If absent or blank
/// * `InvalidVersionId` - If not a non-negative integer
pub fn parse_version_id(raw: Option<&str>) -> Result<VersionId> {
    let raw = raw.map(str::trim).unwrap_or_default();
    if raw.is_empty() {
        return Err(PageNodeError::MissingVersionId);
    }
    raw.parse::<u64>()
        .map(VersionId)
        .map_err(|_| PageNodeError::InvalidVersionId {
            raw: raw.to_string(),
        })
}

/// Restore an earlier version as the new draft
///
/// # Errors
/// * `MissingVersionId` / `InvalidVersionId` - If `raw_version_id` is unusable
/// * `VersionNotFound` - If no such version exists
/// * `VersionNotInTranslation` - If it belongs to another translation
pub fn revert(
    engine: &VersioningEngine,
    repo: &mut dyn Repository,
    node_id: NodeId,
    locale: &str,
    raw_version_id: Option<&str>,
) -> Result<Version> {
    let version_id = parse_version_id(raw_version_id)?;
    let translation = translation_for(repo, node_id, locale)?;
    engine.revert(repo, translation.id, version_id)
}

/// Every version of the node's translation, oldest first
///
/// # Errors
/// * `NodeNotFound` / `NodeDeleted` / `NoTranslationForLocale` - Lookup
pub fn version_history(
    repo: &dyn Repository,
    node_id: NodeId,
    locale: &str,
) -> Result<Vec<Version>> {
    let translation = translation_for(repo, node_id, locale)?;
    repo.versions_for(translation.id)
}

/// # Errors
/// * `NodeNotFound` / `NodeDeleted` - If the node is not live
/// * `MissingPublicVersion` - If the translation has no public version
pub fn show_page(repo: &dyn Repository, node_id: NodeId, locale: &str) -> Result<PageView> {
    let node = repo.get_node(node_id)?;

    match repo.find_translation_for(node_id, locale)? {
        Some(translation) => {
            let public = repo.get_public_version(&translation)?;
            let draft = repo.get_draft_version(&translation)?;
            let shown = draft.as_ref().unwrap_or(&public);
            let payload = repo.get_payload(shown.payload_id)?;
            Ok(PageView::Translated {
                node,
                translation,
                public,
                draft,
                payload,
            })
        }
        None => {
            let available_locales = repo
                .translations_for(node_id)?
                .into_iter()
                .map(|t| t.locale)
                .collect();
            let can_copy = parents_have_translation(repo, node_id, locale)?;
            Ok(PageView::Untranslated {
                node,
                available_locales,
                can_copy,
            })
        }
    }
}

/// Translation of a live node
///
/// # Errors
/// * `NodeNotFound` / `NodeDeleted` - If the node is not live
/// * `NoTranslationForLocale` - If the node is not translated in `locale`
pub fn translation_for(
    repo: &dyn Repository,
    node_id: NodeId,
    locale: &str,
) -> Result<NodeTranslation> {
    repo.get_node(node_id)?;
    repo.get_translation_for(node_id, locale)
}

fn validate_locale(locale: &str) -> Result<()> {
    let valid = !locale.is_empty()
        && locale
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if !valid {
        return Err(PageNodeError::InvalidLocale {
            locale: locale.to_string(),
        });
    }
    Ok(())
}

fn ensure_untranslated(repo: &dyn Repository, node_id: NodeId, locale: &str) -> Result<()> {
    if repo.find_translation_for(node_id, locale)?.is_some() {
        return Err(PageNodeError::TranslationAlreadyExists {
            node_id,
            locale: locale.to_string(),
        });
    }
    Ok(())
}

/// Offline translation of `node` whose public slot is a fresh version of
/// `payload`
fn new_translation(
    engine: &VersioningEngine,
    repo: &mut dyn Repository,
    node: &Node,
    locale: &str,
    payload: &Payload,
) -> Result<(NodeTranslation, Version)> {
    let now = engine.now();
    let translation_id = TranslationId(repo.next_id(EntityKind::Translation)?);
    let version = Version::new(
        VersionId(repo.next_id(EntityKind::Version)?),
        translation_id,
        VersionType::Public,
        payload.id,
        engine.user(),
        None,
        now,
        now,
    );

    let mut translation =
        NodeTranslation::new(translation_id, node.id, locale, payload.title.clone(), now);
    if !payload.structure_node {
        translation.slug = slugify(&payload.title);
    }
    translation.public_version_id = Some(version.id);
    Ok((translation, version))
}
