use std::collections::HashSet;

use crate::errors::{PageNodeError, Result};
use crate::model::NodeId;
use crate::ops::Repository;

/// Root-to-node chain of ids, ending with `node_id` itself
///
/// Follows parent pointers upward and reverses the result.
///
/// # Errors
/// * `NodeNotFound` / `NodeDeleted` - If the starting node is not live
/// * `ParentChainBroken` - If a parent pointer references a missing node
/// * `NodeCycle` - If the parent chain loops
pub fn ancestors(repo: &dyn Repository, node_id: NodeId) -> Result<Vec<NodeId>> {
    repo.get_node(node_id)?;

    let mut path = Vec::new();
    let mut seen = HashSet::new();
    let mut current = Some(node_id);

    while let Some(id) = current {
        if !seen.insert(id) {
            return Err(PageNodeError::NodeCycle { node_id: id });
        }
        path.push(id);

        let node = repo
            .find_node(id)?
            .ok_or(PageNodeError::ParentChainBroken { node_id: id })?;
        current = node.parent_id;
    }

    path.reverse();
    Ok(path)
}

/// Whether every ancestor of `node_id` is translated into `locale`
///
/// True for root nodes. A page can only be translated (or copied from
/// another language) when this holds.
///
/// # Errors
/// As for [`ancestors`].
pub fn parents_have_translation(
    repo: &dyn Repository,
    node_id: NodeId,
    locale: &str,
) -> Result<bool> {
    let chain = ancestors(repo, node_id)?;
    for id in chain.iter().take(chain.len().saturating_sub(1)) {
        if repo.find_translation_for(*id, locale)?.is_none() {
            return Ok(false);
        }
    }
    Ok(true)
}
