use std::collections::HashSet;

use crate::errors::{PageNodeError, Result};
use crate::model::{NodeId, TranslationId, Version};
use crate::ops::Repository;

/// Check the version-slot and origin-chain invariants of one translation
///
/// - the public slot is set and points at a version of this translation
/// - the draft slot, when set, points at a version of this translation
///   other than the public one
/// - every origin chain ends: no loops, no dangling origins
///
/// Creation times are not compared along origin chains: the role swap
/// re-dates the version it turns into a draft, so versions derived from it
/// before the swap can predate their origin.
///
/// # Errors
///
/// The first violation found, as an `InvariantViolation`-kind error.
pub fn validate_translation(repo: &dyn Repository, translation_id: TranslationId) -> Result<()> {
    let translation = repo.get_translation(translation_id)?;
    let public = repo.get_public_version(&translation)?;

    if let Some(draft) = repo.get_draft_version(&translation)? {
        if draft.id == public.id {
            return Err(PageNodeError::DraftEqualsPublic {
                translation_id,
                version_id: draft.id,
            });
        }
    }

    for version in repo.versions_for(translation_id)? {
        check_origin_chain(repo, &version)?;
    }
    Ok(())
}

fn check_origin_chain(repo: &dyn Repository, start: &Version) -> Result<()> {
    let mut seen = HashSet::from([start.id]);
    let mut current = start.origin_id;

    while let Some(origin_id) = current {
        let broken = || PageNodeError::OriginChainBroken {
            version_id: start.id,
        };
        if !seen.insert(origin_id) {
            return Err(broken());
        }
        current = repo.find_version(origin_id)?.ok_or_else(broken)?.origin_id;
    }
    Ok(())
}

/// Live nodes below `node_id`, sorted by id
///
/// Below a deleted node the result must be empty.
///
/// # Errors
///
/// `NodeCycle` if the subtree loops back on itself.
pub fn live_descendants(repo: &dyn Repository, node_id: NodeId) -> Result<Vec<NodeId>> {
    let mut found = Vec::new();
    let mut seen = HashSet::from([node_id]);
    let mut stack = vec![node_id];

    while let Some(id) = stack.pop() {
        for child in repo.children_of(id)? {
            if !seen.insert(child.id) {
                return Err(PageNodeError::NodeCycle { node_id: child.id });
            }
            if !child.deleted {
                found.push(child.id);
            }
            stack.push(child.id);
        }
    }

    found.sort();
    Ok(found)
}
