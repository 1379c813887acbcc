use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::NodeId;

/// Node - a position in the page tree
///
/// A node carries no content of its own. Content lives in per-locale
/// translations and their versions; the node only knows where it sits in the
/// tree and what kind of content it points to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,

    /// Parent node (None for top-level nodes)
    pub parent_id: Option<NodeId>,

    /// Reference-type tag: which kind of content payload this node holds
    pub ref_type: String,

    /// Soft-delete tombstone, cascaded to all descendants
    pub deleted: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Node {
    /// Create a live node at `now`
    pub fn new(
        id: NodeId,
        parent_id: Option<NodeId>,
        ref_type: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            parent_id,
            ref_type: ref_type.into(),
            deleted: false,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted
    }

    /// Set the tombstone
    pub fn mark_deleted(&mut self, now: DateTime<Utc>) {
        self.deleted = true;
        self.updated_at = now;
    }
}
