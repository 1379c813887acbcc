#![allow(clippy::unwrap_used, clippy::expect_used)]

/// Scenario 06: soft-deleting a subtree.
mod common;

use common::Harness;
use pagenode_core::errors::ExErrorKind;
use pagenode_core::events::RecordingEventSink;
use pagenode_core::ops::page_ops;
use pagenode_core::rules::live_descendants;
use pagenode_core::NodeEventKind::{PostDelete, PreDelete};
use pagenode_core::{EventSink, NodeEvent, NodeId, PageNodeError, Repository};

/// Vetoes the pre-delete event of one node
struct VetoDeleteOf(NodeId);

impl EventSink for VetoDeleteOf {
    fn notify(&self, event: &NodeEvent) -> pagenode_core::Result<()> {
        if event.kind == PreDelete && event.node_id == self.0 {
            return Err(PageNodeError::EventVetoed {
                event: event.kind.as_str().to_string(),
                reason: "node is locked".to_string(),
            });
        }
        Ok(())
    }
}

/// Records every event and vetoes the pre-delete event of one node
struct RecordingVetoOf {
    locked: NodeId,
    seen: RecordingEventSink,
}

impl EventSink for RecordingVetoOf {
    fn notify(&self, event: &NodeEvent) -> pagenode_core::Result<()> {
        self.seen.notify(event)?;
        VetoDeleteOf(self.locked).notify(event)
    }
}

#[test]
fn test_scenario_06_cascade_marks_subtree_in_event_order() {
    // GIVEN root -> child -> grandchild
    let mut h = Harness::new();
    let root = h.root_page("Root");
    let child = h.child_page(root, "Child");
    let grandchild = h.child_page(child, "Grandchild");

    // WHEN deleting the root
    let deleted = page_ops::delete(&h.engine, &mut h.store, root, "en").unwrap();

    // THEN all three are marked, root first
    assert_eq!(deleted, vec![root, child, grandchild]);
    for id in [root, child, grandchild] {
        let node = h.store.find_node(id).unwrap().unwrap();
        assert!(node.deleted);
        assert_eq!(node.updated_at, common::t0());
    }

    // AND events follow the depth-first order
    assert_eq!(
        h.events.sequence(),
        vec![
            (PreDelete, root),
            (PreDelete, child),
            (PreDelete, grandchild),
            (PostDelete, grandchild),
            (PostDelete, child),
            (PostDelete, root),
        ]
    );
    assert!(live_descendants(&h.store, root).unwrap().is_empty());
}

#[test]
fn test_scenario_06_delete_events_carry_translation() {
    let mut h = Harness::new();
    let root = h.root_page("Root");
    let tr = h.translation(root);

    page_ops::delete(&h.engine, &mut h.store, root, "en").unwrap();

    let events = h.events.events();
    assert_eq!(events.len(), 2);
    assert!(events.iter().all(|e| e.translation_id == Some(tr.id)));
    assert!(events.iter().all(|e| e.version_id == tr.public_version_id));
}

#[test]
fn test_scenario_06_siblings_are_visited_in_id_order() {
    let mut h = Harness::new();
    let root = h.root_page("Root");
    let a = h.child_page(root, "A");
    let b = h.child_page(root, "B");

    let deleted = h.engine.cascade_soft_delete(&mut h.store, root, "en").unwrap();

    assert_eq!(deleted, vec![root, a, b]);
    assert_eq!(
        h.events.sequence(),
        vec![
            (PreDelete, root),
            (PreDelete, a),
            (PreDelete, b),
            (PostDelete, a),
            (PostDelete, b),
            (PostDelete, root),
        ]
    );
}

#[test]
fn test_scenario_06_already_deleted_child_is_skipped() {
    // GIVEN a root whose child was deleted earlier
    let mut h = Harness::new();
    let root = h.root_page("Root");
    let gone = h.child_page(root, "Gone");
    let kept = h.child_page(root, "Kept");
    page_ops::delete(&h.engine, &mut h.store, gone, "en").unwrap();
    let gone_deleted_at = h.store.find_node(gone).unwrap().unwrap().updated_at;
    h.events.clear();
    h.clock.advance_secs(60);

    // WHEN deleting the root
    let deleted = page_ops::delete(&h.engine, &mut h.store, root, "en").unwrap();

    // THEN the earlier deletion is left alone
    assert_eq!(deleted, vec![root, kept]);
    assert!(!h.events.sequence().iter().any(|(_, id)| *id == gone));
    assert_eq!(
        h.store.find_node(gone).unwrap().unwrap().updated_at,
        gone_deleted_at
    );
}

#[test]
fn test_scenario_06_vetoed_child_aborts_whole_delete() {
    // GIVEN root -> child -> grandchild and a sink that locks the grandchild
    let mut h = Harness::new();
    let root = h.root_page("Root");
    let child = h.child_page(root, "Child");
    let grandchild = h.child_page(child, "Grandchild");
    let engine = h.engine.clone().with_events(VetoDeleteOf(grandchild));

    // WHEN deleting the root
    let err = page_ops::delete(&engine, &mut h.store, root, "en").unwrap_err();

    // THEN the veto surfaces and no node was marked
    assert_eq!(err.kind(), ExErrorKind::PolicyDenied);
    for id in [root, child, grandchild] {
        assert!(!h.store.find_node(id).unwrap().unwrap().deleted);
    }
}

#[test]
fn test_scenario_06_vetoed_sibling_fires_no_post_delete() {
    // GIVEN root -> A, root -> B and a sink that locks B
    let mut h = Harness::new();
    let root = h.root_page("Root");
    let a = h.child_page(root, "A");
    let b = h.child_page(root, "B");
    let seen = RecordingEventSink::new();
    let engine = h.engine.clone().with_events(RecordingVetoOf {
        locked: b,
        seen: seen.clone(),
    });

    // WHEN deleting the root
    let err = page_ops::delete(&engine, &mut h.store, root, "en").unwrap_err();

    // THEN nothing is marked and no sink heard of a deletion
    assert_eq!(err.kind(), ExErrorKind::PolicyDenied);
    for id in [root, a, b] {
        assert!(!h.store.find_node(id).unwrap().unwrap().deleted);
    }
    assert_eq!(
        seen.sequence(),
        vec![(PreDelete, root), (PreDelete, a), (PreDelete, b)]
    );
}

#[test]
fn test_scenario_06_deleting_twice_reports_deleted() {
    let mut h = Harness::new();
    let root = h.root_page("Root");
    page_ops::delete(&h.engine, &mut h.store, root, "en").unwrap();

    let err = page_ops::delete(&h.engine, &mut h.store, root, "en").unwrap_err();

    assert!(matches!(err, PageNodeError::NodeDeleted { .. }));
    assert_eq!(err.kind(), ExErrorKind::Deleted);
}

#[test]
fn test_scenario_06_deleted_parent_cannot_get_children() {
    let mut h = Harness::new();
    let root = h.root_page("Root");
    page_ops::delete(&h.engine, &mut h.store, root, "en").unwrap();

    let err = page_ops::create_page(
        &h.engine,
        &mut h.store,
        page_ops::NewPage::new("en", "page").under(root),
    )
    .unwrap_err();

    assert_eq!(err.kind(), ExErrorKind::Deleted);
}
