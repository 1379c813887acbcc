#![allow(clippy::unwrap_used, clippy::expect_used)]

/// Scenario 01: draft materialization swaps the roles of the edited version
/// and its checkpoint copy.
mod common;

use common::{t0, Harness};
use pagenode_core::rules::validate_translation;
use pagenode_core::{NodeEventKind, Repository, VersionState, VersionType};

#[test]
fn test_scenario_01_materialize_then_resolve_returns_new_draft() {
    // GIVEN a page with only a public version
    let mut h = Harness::new();
    let node = h.root_page("Home");
    let tr = h.translation(node);
    let original_public = tr.public_version_id.unwrap();
    h.clock.advance_secs(60);

    // WHEN materializing a draft from the public version
    let draft = h
        .engine
        .materialize_draft(&mut h.store, tr.id, original_public)
        .unwrap();

    // THEN resolving the draft returns exactly that version
    let active = h
        .engine
        .resolve_active_version(&mut h.store, tr.id, true, false)
        .unwrap();
    assert!(active.draft);
    assert_eq!(active.version.id, draft.id);

    // AND the edited version became the draft, keeping its id
    assert_eq!(draft.id, original_public);
    assert_eq!(draft.version_type, VersionType::Draft);

    // AND the public slot now references the cloned checkpoint
    let tr = h.translation(node);
    let public = h.store.get_public_version(&tr).unwrap();
    assert_ne!(public.id, original_public);
    assert_eq!(public.version_type, VersionType::Public);
    assert_eq!(public.created_at, t0());
    assert_eq!(draft.origin_id, Some(public.id));
    assert_eq!(h.engine.state(&tr), VersionState::DraftPending);

    // AND the checkpoint has its own payload with the same content
    let public_payload = h.store.get_payload(public.payload_id).unwrap();
    let draft_payload = h.store.get_payload(draft.payload_id).unwrap();
    assert_ne!(public_payload.id, draft_payload.id);
    assert_eq!(public_payload.title, draft_payload.title);

    validate_translation(&h.store, tr.id).unwrap();
    assert_eq!(h.events.kinds(), vec![NodeEventKind::DraftCreated]);
}

#[test]
fn test_scenario_01_materialize_is_a_single_commit_of_four_records() {
    // GIVEN a page
    let mut h = Harness::new();
    let node = h.root_page("Home");
    let tr = h.translation(node);
    let versions_before = h.store.list_versions().len();

    // WHEN materializing a draft
    h.engine
        .materialize_draft(&mut h.store, tr.id, tr.public_version_id.unwrap())
        .unwrap();

    // THEN exactly one version was added (the checkpoint)
    assert_eq!(h.store.list_versions().len(), versions_before + 1);
}

#[test]
fn test_scenario_01_materialize_from_draft_promotes_draft_content() {
    // GIVEN a page with a pending draft holding edited content
    let mut h = Harness::new();
    let node = h.root_page("Home");
    let tr = h.translation(node);
    let draft = h
        .engine
        .materialize_draft(&mut h.store, tr.id, tr.public_version_id.unwrap())
        .unwrap();
    let mut payload = h.store.get_payload(draft.payload_id).unwrap();
    payload.title = "Home (draft)".to_string();
    h.store.insert_payload(payload);

    // WHEN the draft itself goes through the role swap
    let again = h
        .engine
        .materialize_draft(&mut h.store, tr.id, draft.id)
        .unwrap();

    // THEN the draft keeps its identity and the new public copy carries
    // the draft's content
    assert_eq!(again.id, draft.id);
    let tr = h.translation(node);
    let public = h.store.get_public_version(&tr).unwrap();
    let public_payload = h.store.get_payload(public.payload_id).unwrap();
    assert_eq!(public_payload.title, "Home (draft)");
    validate_translation(&h.store, tr.id).unwrap();
}
