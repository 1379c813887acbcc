//! Command inventory for the node administration boundary
//!
//! Every admin action is a [`Command`] processed by [`crate::apply::apply`].

use serde_json::Value;

use crate::model::{NodeId, NodeTranslation, Version};
use crate::ops::page_ops::{CreatedPage, EditOutcome, PageView};
use crate::policy::Permission;

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Add a page, under `parent_id` or as a new root
    AddPage {
        parent_id: Option<NodeId>,
        locale: String,
        ref_type: String,
        title: Option<String>,
        structure_node: bool,
        content: Value,
    },

    /// Translate a node with an empty page
    CreateEmptyPage { node_id: NodeId, locale: String },

    /// Translate a node by copying another locale
    CopyFromOtherLanguage {
        node_id: NodeId,
        locale: String,
        source_locale: String,
    },

    /// Save an edit to the public version (`draft = false`) or the draft
    Edit {
        node_id: NodeId,
        locale: String,
        draft: bool,
        title: Option<String>,
        content: Option<Value>,
        save_as_draft: bool,
        save_and_publish: bool,
    },

    Publish { node_id: NodeId, locale: String },

    Unpublish { node_id: NodeId, locale: String },

    /// Soft-delete a node and its subtree
    Delete { node_id: NodeId, locale: String },

    /// Restore a version as the new draft; the id arrives as raw text
    Revert {
        node_id: NodeId,
        locale: String,
        version_id: Option<String>,
    },

    /// Version history of a translation
    History { node_id: NodeId, locale: String },

    /// Current state of a page in one locale
    Show { node_id: NodeId, locale: String },
}

impl Command {
    /// Operation name used in lifecycle logs
    pub fn op_name(&self) -> &'static str {
        match self {
            Command::AddPage { .. } => "page_add",
            Command::CreateEmptyPage { .. } => "page_create_empty",
            Command::CopyFromOtherLanguage { .. } => "page_copy_from_other_language",
            Command::Edit { .. } => "page_edit",
            Command::Publish { .. } => "page_publish",
            Command::Unpublish { .. } => "page_unpublish",
            Command::Delete { .. } => "page_delete",
            Command::Revert { .. } => "page_revert",
            Command::History { .. } => "page_history",
            Command::Show { .. } => "page_show",
        }
    }

    /// Node whose permission is checked: the parent for `AddPage`, the
    /// target node otherwise. `None` when adding a root page.
    pub fn guarded_node(&self) -> Option<NodeId> {
        match self {
            Command::AddPage { parent_id, .. } => *parent_id,
            Command::CreateEmptyPage { node_id, .. }
            | Command::CopyFromOtherLanguage { node_id, .. }
            | Command::Edit { node_id, .. }
            | Command::Publish { node_id, .. }
            | Command::Unpublish { node_id, .. }
            | Command::Delete { node_id, .. }
            | Command::Revert { node_id, .. }
            | Command::History { node_id, .. }
            | Command::Show { node_id, .. } => Some(*node_id),
        }
    }

    pub fn required_permission(&self) -> Permission {
        match self {
            Command::AddPage { .. }
            | Command::CreateEmptyPage { .. }
            | Command::CopyFromOtherLanguage { .. }
            | Command::Edit { .. }
            | Command::Revert { .. } => Permission::Edit,
            Command::Publish { .. } => Permission::Publish,
            Command::Unpublish { .. } => Permission::Unpublish,
            Command::Delete { .. } => Permission::Delete,
            Command::History { .. } | Command::Show { .. } => Permission::View,
        }
    }
}

/// What a successfully applied command produced
#[derive(Debug, Clone, PartialEq)]
pub enum CommandOutcome {
    Created(CreatedPage),
    Edited(EditOutcome),
    OnlineChanged(NodeTranslation),
    Deleted(Vec<NodeId>),
    Reverted(Version),
    History(Vec<Version>),
    Page(Box<PageView>),
}
