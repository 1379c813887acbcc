use serde::{Deserialize, Serialize};

use super::ids::PayloadId;

/// Content payload snapshot referenced by a version
///
/// The engine only reads `title` and `structure_node`; `content` is opaque
/// and copied as-is when a payload is cloned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payload {
    pub id: PayloadId,

    /// Same tag as the owning node's `ref_type`
    pub ref_type: String,

    pub title: String,

    /// Structure nodes group pages but are not addressable (no slug)
    pub structure_node: bool,

    pub content: serde_json::Value,
}

impl Payload {
    pub fn new(id: PayloadId, ref_type: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id,
            ref_type: ref_type.into(),
            title: title.into(),
            structure_node: false,
            content: serde_json::Value::Null,
        }
    }

    pub fn with_structure_node(mut self, structure_node: bool) -> Self {
        self.structure_node = structure_node;
        self
    }

    pub fn with_content(mut self, content: serde_json::Value) -> Self {
        self.content = content;
        self
    }
}
