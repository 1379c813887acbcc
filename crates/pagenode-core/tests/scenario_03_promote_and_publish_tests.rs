#![allow(clippy::unwrap_used, clippy::expect_used)]

/// Scenario 03: promotion to public and the online flag.
mod common;

use common::Harness;
use pagenode_core::errors::ExErrorKind;
use pagenode_core::events::DenyAllEventSink;
use pagenode_core::ops::page_ops;
use pagenode_core::{
    EventSink, NodeEvent, NodeEventKind, PageNodeError, Repository, VersionType,
};

/// Accepts pre-events and fails every other event
struct FailingPostSink;

impl EventSink for FailingPostSink {
    fn notify(&self, event: &NodeEvent) -> pagenode_core::Result<()> {
        if event.kind.is_pre() {
            Ok(())
        } else {
            Err(PageNodeError::Internal {
                message: "listener crashed".to_string(),
            })
        }
    }
}

#[test]
fn test_scenario_03_promote_with_publish_sets_online() {
    // GIVEN an offline page
    let mut h = Harness::new();
    let node = h.root_page("Home");
    let tr = h.translation(node);
    assert!(!tr.online);
    h.clock.advance_secs(5);

    // WHEN promoting the public version with publish
    let public = h
        .engine
        .promote_to_public(&mut h.store, tr.id, tr.public_version_id.unwrap(), true)
        .unwrap();

    // THEN a new public version exists and the page is online
    let tr_after = h.translation(node);
    assert_eq!(tr_after.public_version_id, Some(public.id));
    assert!(tr_after.online);
    assert_eq!(public.origin_id, tr.public_version_id);
    assert_eq!(public.version_type, VersionType::Public);
    assert_eq!(public.owner, "editor");
    assert_eq!(h.events.kinds(), vec![NodeEventKind::PublicVersionCreated]);
}

#[test]
fn test_scenario_03_promote_without_publish_keeps_online_flag() {
    // GIVEN an online page
    let mut h = Harness::new();
    let node = h.root_page("Home");
    let tr = page_ops::publish(&h.engine, &mut h.store, node, "en").unwrap();
    assert!(tr.online);

    // WHEN promoting without publish
    h.engine
        .promote_to_public(&mut h.store, tr.id, tr.public_version_id.unwrap(), false)
        .unwrap();

    // THEN the page stays online
    assert!(h.translation(node).online);

    // AND promoting an offline page without publish keeps it offline
    let tr = page_ops::unpublish(&h.engine, &mut h.store, node, "en").unwrap();
    h.engine
        .promote_to_public(&mut h.store, tr.id, tr.public_version_id.unwrap(), false)
        .unwrap();
    assert!(!h.translation(node).online);
}

#[test]
fn test_scenario_03_promote_takes_title_from_payload() {
    // GIVEN a draft whose payload title was changed
    let mut h = Harness::new();
    let node = h.root_page("Home");
    let tr = h.translation(node);
    let draft = h
        .engine
        .materialize_draft(&mut h.store, tr.id, tr.public_version_id.unwrap())
        .unwrap();
    let mut payload = h.store.get_payload(draft.payload_id).unwrap();
    payload.title = "Welcome".to_string();
    h.store.insert_payload(payload);

    // WHEN the draft is promoted
    h.engine
        .promote_to_public(&mut h.store, tr.id, draft.id, false)
        .unwrap();

    // THEN the translation title follows the payload and the draft is consumed
    let tr = h.translation(node);
    assert_eq!(tr.title, "Welcome");
    assert!(!tr.has_draft());
}

#[test]
fn test_scenario_03_set_online_dispatches_pre_and_post() {
    let mut h = Harness::new();
    let node = h.root_page("Home");

    page_ops::publish(&h.engine, &mut h.store, node, "en").unwrap();
    page_ops::unpublish(&h.engine, &mut h.store, node, "en").unwrap();

    assert_eq!(
        h.events.kinds(),
        vec![
            NodeEventKind::PrePublish,
            NodeEventKind::PostPublish,
            NodeEventKind::PreUnpublish,
            NodeEventKind::PostUnpublish,
        ]
    );
    assert!(!h.translation(node).online);
}

#[test]
fn test_scenario_03_vetoed_publish_writes_nothing() {
    // GIVEN an offline page and an engine whose sink vetoes everything
    let mut h = Harness::new();
    let node = h.root_page("Home");
    let before = h.store.clone();
    let engine = h.engine.clone().with_events(DenyAllEventSink);

    // WHEN publishing
    let err = page_ops::publish(&engine, &mut h.store, node, "en").unwrap_err();

    // THEN the veto surfaces and the store is unchanged
    assert!(matches!(err, PageNodeError::EventVetoed { .. }));
    assert_eq!(err.kind(), ExErrorKind::PolicyDenied);
    assert_eq!(h.translation(node), before.get_translation_for(node, "en").unwrap());
    assert!(!h.translation(node).online);
}

#[test]
fn test_scenario_03_failing_post_event_is_ignored() {
    // GIVEN an engine whose sink fails on notification events
    let mut h = Harness::new();
    let node = h.root_page("Home");
    let engine = h.engine.clone().with_events(FailingPostSink);

    // WHEN publishing
    let tr = page_ops::publish(&engine, &mut h.store, node, "en").unwrap();

    // THEN the operation still succeeds and its write is kept
    assert!(tr.online);
    assert!(h.translation(node).online);
}
