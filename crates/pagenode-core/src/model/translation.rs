use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::{NodeId, TranslationId, VersionId};

/// NodeTranslation - one per (node, locale)
///
/// Holds the two version slots of the versioning state machine:
/// - `public_version_id`: the current public version (always set once created)
/// - `draft_version_id`: the pending draft, if any
///
/// Older versions stay in the store with their type tag; only these slots say
/// which versions are current.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeTranslation {
    pub id: TranslationId,
    pub node_id: NodeId,
    pub locale: String,
    pub title: String,

    /// URL slug; empty for structure nodes
    pub slug: String,

    /// Published/visible flag, orthogonal to the draft/public split
    pub online: bool,

    pub public_version_id: Option<VersionId>,
    pub draft_version_id: Option<VersionId>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl NodeTranslation {
    /// Create an offline translation with empty version slots
    pub fn new(
        id: TranslationId,
        node_id: NodeId,
        locale: impl Into<String>,
        title: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            node_id,
            locale: locale.into(),
            title: title.into(),
            slug: String::new(),
            online: false,
            public_version_id: None,
            draft_version_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn has_draft(&self) -> bool {
        self.draft_version_id.is_some()
    }

    /// Whether `version_id` occupies the public slot
    pub fn is_public(&self, version_id: VersionId) -> bool {
        self.public_version_id == Some(version_id)
    }

    /// Whether `version_id` occupies the draft slot
    pub fn is_draft(&self, version_id: VersionId) -> bool {
        self.draft_version_id == Some(version_id)
    }
}

/// Derive a URL slug from a title
///
/// Lowercases ASCII alphanumerics and collapses every other run of characters
/// into a single `-`.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_dash = false;
    for c in title.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }
    slug
}
