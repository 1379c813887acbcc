use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use super::{ActiveVersion, VersionState};
use crate::clock::{Clock, SystemClock};
use crate::cloner::{Cloner, DeepCloner};
use crate::config::EngineConfig;
use crate::errors::{PageNodeError, Result};
use crate::events::{
    dispatch_post, dispatch_pre, EventSink, NodeEvent, NodeEventKind, NoopEventSink,
};
use crate::model::{
    EntityKind, NodeId, NodeTranslation, Payload, PayloadId, TranslationId, Version, VersionId,
    VersionType,
};
use crate::ops::{ChangeSet, Repository};

/// Drives the public/draft version pair of each translation
///
/// The engine holds its collaborators but no entity state: every operation
/// reads what it needs through the [`Repository`] it is handed and writes
/// back with exactly one `commit`. Events are dispatched after the commit,
/// except pre-events, which run before anything is written and may veto.
#[derive(Clone)]
pub struct VersioningEngine {
    config: EngineConfig,
    clock: Arc<dyn Clock>,
    cloner: Arc<dyn Cloner>,
    events: Arc<dyn EventSink>,
    user: String,
}

impl std::fmt::Debug for VersioningEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VersioningEngine")
            .field("config", &self.config)
            .field("user", &self.user)
            .finish_non_exhaustive()
    }
}

impl VersioningEngine {
    /// Engine with the system clock, the field-copying cloner, no event sink
    /// and the `system` user
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            clock: Arc::new(SystemClock),
            cloner: Arc::new(DeepCloner),
            events: Arc::new(NoopEventSink),
            user: "system".to_string(),
        }
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    pub fn with_cloner(mut self, cloner: impl Cloner + 'static) -> Self {
        self.cloner = Arc::new(cloner);
        self
    }

    pub fn with_events(mut self, events: impl EventSink + 'static) -> Self {
        self.events = Arc::new(events);
        self
    }

    /// Acting user, recorded as owner of every version created
    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = user.into();
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn user(&self) -> &str {
        &self.user
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub(crate) fn events(&self) -> &dyn EventSink {
        self.events.as_ref()
    }

    pub fn state(&self, translation: &NodeTranslation) -> VersionState {
        VersionState::of(translation)
    }

    /// Pick the version an edit session works on
    ///
    /// - `want_draft = false, save_as_draft = true`: a new draft is always
    ///   materialized from the public version
    /// - `want_draft = true` without a draft: one is materialized
    /// - `want_draft = true` with a draft: the draft
    /// - otherwise: the public version
    ///
    /// # Errors
    ///
    /// `TranslationNotFound`, or `MissingPublicVersion` if the translation
    /// has no usable public version.
    pub fn resolve_active_version(
        &self,
        repo: &mut dyn Repository,
        translation_id: TranslationId,
        want_draft: bool,
        save_as_draft: bool,
    ) -> Result<ActiveVersion> {
        let translation = repo.get_translation(translation_id)?;
        let public = repo.get_public_version(&translation)?;
        let draft = repo.get_draft_version(&translation)?;

        let active = match draft {
            _ if !want_draft && save_as_draft => ActiveVersion {
                version: self.materialize_draft(repo, translation_id, public.id)?,
                draft: true,
            },
            None if want_draft => ActiveVersion {
                version: self.materialize_draft(repo, translation_id, public.id)?,
                draft: true,
            },
            Some(draft) if want_draft => ActiveVersion {
                version: draft,
                draft: true,
            },
            _ => ActiveVersion {
                version: public,
                draft: false,
            },
        };

        tracing::debug!(
            translation_id = translation_id.get(),
            version_id = active.version.id.get(),
            draft = active.draft,
            "active version resolved"
        );
        Ok(active)
    }

    /// Role swap: turn `version_id` into the translation's draft
    ///
    /// The version being edited keeps its id and payload and becomes the
    /// draft. A checkpoint copy of its payload becomes the new public
    /// version, inheriting the edited version's origin and creation time.
    ///
    /// | record  | type   | origin         | created      | updated |
    /// |---------|--------|----------------|--------------|---------|
    /// | new `N` | public | `V.origin`     | `V.created`  | now     |
    /// | `V`     | draft  | `N`            | now          | now     |
    ///
    /// # Errors
    ///
    /// Lookup errors, `VersionNotInTranslation`, `MissingPublicVersion`,
    /// or whatever the cloner or the commit report.
    pub fn materialize_draft(
        &self,
        repo: &mut dyn Repository,
        translation_id: TranslationId,
        version_id: VersionId,
    ) -> Result<Version> {
        let now = self.now();
        let mut translation = repo.get_translation(translation_id)?;
        repo.get_public_version(&translation)?;
        let mut version = self.version_of(repo, &translation, version_id)?;

        let checkpoint_payload = self.clone_payload(repo, version.payload_id)?;
        let checkpoint = Version::new(
            VersionId(repo.next_id(EntityKind::Version)?),
            translation.id,
            VersionType::Public,
            checkpoint_payload.id,
            self.user.clone(),
            version.origin_id,
            version.created_at,
            now,
        );

        version.version_type = VersionType::Draft;
        version.origin_id = Some(checkpoint.id);
        version.created_at = now;
        version.updated_at = now;

        translation.public_version_id = Some(checkpoint.id);
        translation.draft_version_id = Some(version.id);
        translation.updated_at = now;

        let mut changes = ChangeSet::new();
        changes
            .put_payload(checkpoint_payload)
            .put_version(checkpoint.clone())
            .put_version(version.clone())
            .put_translation(translation.clone());
        repo.commit(changes)?;

        tracing::debug!(
            translation_id = translation.id.get(),
            draft_version_id = version.id.get(),
            public_version_id = checkpoint.id.get(),
            "draft materialized"
        );
        dispatch_post(
            self.events(),
            NodeEvent::new(NodeEventKind::DraftCreated, translation.node_id)
                .with_translation(translation.id)
                .with_version(version.id)
                .with_payload(version.payload_id),
        );
        Ok(version)
    }

    /// Copy `version_id` into a new public version
    ///
    /// The translation title follows the copied payload. `online` is set
    /// when `publish` is true and left alone otherwise. Promoting the draft
    /// consumes it: the draft slot is cleared.
    ///
    /// # Errors
    ///
    /// Lookup errors, `VersionNotInTranslation`, `MissingPublicVersion`,
    /// or whatever the cloner or the commit report.
    pub fn promote_to_public(
        &self,
        repo: &mut dyn Repository,
        translation_id: TranslationId,
        version_id: VersionId,
        publish: bool,
    ) -> Result<Version> {
        let now = self.now();
        let mut translation = repo.get_translation(translation_id)?;
        repo.get_public_version(&translation)?;
        let current = self.version_of(repo, &translation, version_id)?;

        let payload = self.clone_payload(repo, current.payload_id)?;
        let public = Version::new(
            VersionId(repo.next_id(EntityKind::Version)?),
            translation.id,
            VersionType::Public,
            payload.id,
            self.user.clone(),
            Some(current.id),
            now,
            now,
        );

        translation.public_version_id = Some(public.id);
        translation.title = payload.title.clone();
        if publish {
            translation.online = true;
        }
        if translation.is_draft(current.id) {
            translation.draft_version_id = None;
        }
        translation.updated_at = now;

        let mut changes = ChangeSet::new();
        changes
            .put_payload(payload)
            .put_version(public.clone())
            .put_translation(translation.clone());
        repo.commit(changes)?;

        tracing::debug!(
            translation_id = translation.id.get(),
            from_version_id = current.id.get(),
            public_version_id = public.id.get(),
            publish,
            "public version created"
        );
        dispatch_post(
            self.events(),
            NodeEvent::new(NodeEventKind::PublicVersionCreated, translation.node_id)
                .with_translation(translation.id)
                .with_version(public.id)
                .with_payload(public.payload_id),
        );
        Ok(public)
    }

    /// Checkpoint `version_id` if it has not been updated within the
    /// staleness timeout
    ///
    /// A stale public version is copied into a new public version without
    /// publishing; a stale draft goes through the role swap. A fresh
    /// version is returned unchanged with nothing written. The returned
    /// version is always fresh, so a second call is a no-op.
    ///
    /// # Errors
    ///
    /// As for [`promote_to_public`](Self::promote_to_public) and
    /// [`materialize_draft`](Self::materialize_draft).
    pub fn refresh_if_stale(
        &self,
        repo: &mut dyn Repository,
        translation_id: TranslationId,
        version_id: VersionId,
    ) -> Result<Version> {
        let translation = repo.get_translation(translation_id)?;
        repo.get_public_version(&translation)?;
        let version = self.version_of(repo, &translation, version_id)?;

        if !self.is_stale(&version) {
            return Ok(version);
        }

        tracing::debug!(
            translation_id = translation.id.get(),
            version_id = version.id.get(),
            updated_at = %version.updated_at,
            "version is stale"
        );
        if translation.is_public(version.id) {
            self.promote_to_public(repo, translation_id, version.id, false)
        } else {
            self.materialize_draft(repo, translation_id, version.id)
        }
    }

    /// Whether `version` was last updated at least one timeout ago
    pub fn is_stale(&self, version: &Version) -> bool {
        self.now() - version.updated_at >= self.config.staleness_timeout()
    }

    /// Restore `target_id` as a new draft
    ///
    /// The target's payload is copied into a new draft whose origin is the
    /// target. The public slot is never touched.
    ///
    /// # Errors
    ///
    /// `VersionNotFound` for an unknown target, `VersionNotInTranslation`
    /// for a target of another translation, `MissingPublicVersion`, or
    /// whatever the cloner or the commit report.
    pub fn revert(
        &self,
        repo: &mut dyn Repository,
        translation_id: TranslationId,
        target_id: VersionId,
    ) -> Result<Version> {
        let now = self.now();
        let target = repo.get_version(target_id)?;
        let mut translation = repo.get_translation(translation_id)?;
        repo.get_public_version(&translation)?;
        ensure_in_translation(&target, &translation)?;

        let payload = self.clone_payload(repo, target.payload_id)?;
        let draft = Version::new(
            VersionId(repo.next_id(EntityKind::Version)?),
            translation.id,
            VersionType::Draft,
            payload.id,
            self.user.clone(),
            Some(target.id),
            now,
            now,
        );

        translation.draft_version_id = Some(draft.id);
        translation.title = payload.title.clone();
        translation.updated_at = now;

        let mut changes = ChangeSet::new();
        changes
            .put_payload(payload)
            .put_version(draft.clone())
            .put_translation(translation.clone());
        repo.commit(changes)?;

        tracing::debug!(
            translation_id = translation.id.get(),
            target_version_id = target.id.get(),
            draft_version_id = draft.id.get(),
            "reverted"
        );
        dispatch_post(
            self.events(),
            NodeEvent::new(NodeEventKind::Reverted, translation.node_id)
                .with_translation(translation.id)
                .with_version(draft.id)
                .with_payload(draft.payload_id),
        );
        Ok(draft)
    }

    /// Publish or unpublish a translation
    ///
    /// # Errors
    ///
    /// `EventVetoed` if the pre-event sink refuses (nothing is written),
    /// lookup errors, `MissingPublicVersion`, or a commit failure.
    pub fn set_online(
        &self,
        repo: &mut dyn Repository,
        translation_id: TranslationId,
        online: bool,
    ) -> Result<NodeTranslation> {
        let translation = repo.get_translation(translation_id)?;
        let public = repo.get_public_version(&translation)?;

        let (pre, post) = if online {
            (NodeEventKind::PrePublish, NodeEventKind::PostPublish)
        } else {
            (NodeEventKind::PreUnpublish, NodeEventKind::PostUnpublish)
        };
        let event = |kind| {
            NodeEvent::new(kind, translation.node_id)
                .with_translation(translation.id)
                .with_version(public.id)
                .with_payload(public.payload_id)
        };

        dispatch_pre(self.events(), event(pre))?;

        let mut updated = translation.clone();
        updated.online = online;
        updated.updated_at = self.now();
        let mut changes = ChangeSet::new();
        changes.put_translation(updated.clone());
        repo.commit(changes)?;

        tracing::debug!(translation_id = updated.id.get(), online, "online flag set");
        dispatch_post(self.events(), event(post));
        Ok(updated)
    }

    /// Soft-delete `node_id` and its whole subtree
    ///
    /// Pre-events run during the traversal: `PreDelete(root)`, then for each
    /// child in id order `PreDelete(child)` followed by its own subtree.
    /// Every mark is then written in a single commit. Only after that commit
    /// do post-events fire: each child's `PostDelete` in traversal order
    /// (a node after its whole subtree), then `PostDelete(root)`. Children
    /// already deleted are skipped. Returns the marked ids in marking order.
    ///
    /// # Errors
    ///
    /// `NodeNotFound`/`NodeDeleted` for the root, `EventVetoed` from any
    /// pre-event (nothing is written and no post-event fires), `NodeCycle`
    /// if the subtree loops back on itself, or a commit failure.
    pub fn cascade_soft_delete(
        &self,
        repo: &mut dyn Repository,
        node_id: NodeId,
        locale: &str,
    ) -> Result<Vec<NodeId>> {
        let now = self.now();
        let mut root = repo.get_node(node_id)?;

        let pre = self.delete_event(&*repo, NodeEventKind::PreDelete, node_id, locale)?;
        dispatch_pre(self.events(), pre)?;

        let mut cascade = Cascade {
            now,
            locale,
            visited: HashSet::from([root.id]),
            marked: vec![root.id],
            changes: ChangeSet::new(),
            post_events: Vec::new(),
        };
        root.mark_deleted(now);
        cascade.changes.put_node(root);

        self.delete_children(&*repo, node_id, &mut cascade)?;

        let post = self.delete_event(&*repo, NodeEventKind::PostDelete, node_id, locale)?;
        let Cascade {
            marked,
            changes,
            post_events,
            ..
        } = cascade;
        repo.commit(changes)?;

        tracing::debug!(node_id = node_id.get(), count = marked.len(), "subtree deleted");
        for event in post_events {
            dispatch_post(self.events(), event);
        }
        dispatch_post(self.events(), post);
        Ok(marked)
    }

    fn delete_children(
        &self,
        repo: &dyn Repository,
        parent_id: NodeId,
        cascade: &mut Cascade<'_>,
    ) -> Result<()> {
        for mut child in repo.children_of(parent_id)? {
            if child.is_deleted() {
                continue;
            }
            if !cascade.visited.insert(child.id) {
                return Err(PageNodeError::NodeCycle { node_id: child.id });
            }

            dispatch_pre(
                self.events(),
                self.delete_event(repo, NodeEventKind::PreDelete, child.id, cascade.locale)?,
            )?;

            let child_id = child.id;
            child.mark_deleted(cascade.now);
            cascade.changes.put_node(child);
            cascade.marked.push(child_id);

            self.delete_children(repo, child_id, cascade)?;

            // Held back until the marks are committed
            let post =
                self.delete_event(repo, NodeEventKind::PostDelete, child_id, cascade.locale)?;
            cascade.post_events.push(post);
        }
        Ok(())
    }

    /// Delete event carrying the node's translation in `locale` when it has one
    fn delete_event(
        &self,
        repo: &dyn Repository,
        kind: NodeEventKind,
        node_id: NodeId,
        locale: &str,
    ) -> Result<NodeEvent> {
        let mut event = NodeEvent::new(kind, node_id);
        if let Some(translation) = repo.find_translation_for(node_id, locale)? {
            event = event.with_translation(translation.id);
            if let Some(public_id) = translation.public_version_id {
                event = event.with_version(public_id);
            }
        }
        Ok(event)
    }

    /// Load `version_id` and check it belongs to `translation`
    fn version_of(
        &self,
        repo: &dyn Repository,
        translation: &NodeTranslation,
        version_id: VersionId,
    ) -> Result<Version> {
        let version = repo.get_version(version_id)?;
        ensure_in_translation(&version, translation)?;
        Ok(version)
    }

    /// Deep-clone a stored payload under a freshly allocated id
    pub(crate) fn clone_payload(
        &self,
        repo: &mut dyn Repository,
        payload_id: PayloadId,
    ) -> Result<Payload> {
        let payload = repo.get_payload(payload_id)?;
        let new_id = PayloadId(repo.next_id(EntityKind::Payload)?);
        self.cloner.deep_clone(&payload, new_id)
    }
}

fn ensure_in_translation(version: &Version, translation: &NodeTranslation) -> Result<()> {
    if version.translation_id != translation.id {
        return Err(PageNodeError::VersionNotInTranslation {
            version_id: version.id,
            translation_id: translation.id,
        });
    }
    Ok(())
}

/// Traversal state of one `cascade_soft_delete`
struct Cascade<'a> {
    now: DateTime<Utc>,
    locale: &'a str,
    visited: HashSet<NodeId>,
    marked: Vec<NodeId>,
    changes: ChangeSet,
    post_events: Vec<NodeEvent>,
}
