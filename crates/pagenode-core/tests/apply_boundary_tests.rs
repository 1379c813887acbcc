#![allow(clippy::unwrap_used, clippy::expect_used)]

//! Tests for the `apply()` command boundary: authorization, dispatch and
//! lifecycle logging.

mod common;

use common::Harness;
use pagenode_core::core_types::{RequestContext, RequestId};
use pagenode_core::errors::ExErrorKind;
use pagenode_core::logging_facility::init_test_capture;
use pagenode_core::ops::page_ops::PageView;
use pagenode_core::{
    apply, AllowAllAuthorizer, Command, CommandOutcome, DenyAllAuthorizer, PageNodeError,
    Repository,
};
use serde_json::json;

fn ctx(request_id: &str) -> RequestContext {
    RequestContext::new("alice").with_request_id(RequestId::from_string(request_id.to_string()))
}

fn add_root(title: &str) -> Command {
    Command::AddPage {
        parent_id: None,
        locale: "en".to_string(),
        ref_type: "page".to_string(),
        title: Some(title.to_string()),
        structure_node: false,
        content: json!({"body": "hello"}),
    }
}

#[test]
fn test_apply_add_page_records_acting_user() {
    let h = Harness::new();
    let mut store = h.store.clone();

    let outcome = apply(
        &h.engine,
        &mut store,
        &AllowAllAuthorizer,
        &ctx("req-add"),
        add_root("Home"),
    )
    .unwrap();

    let CommandOutcome::Created(created) = outcome else {
        panic!("expected Created, got {:?}", outcome);
    };
    assert_eq!(created.version.owner, "alice");
    assert_eq!(created.translation.slug, "home");
    assert!(!created.translation.online);
}

#[test]
fn test_apply_denied_command_writes_nothing() {
    // GIVEN a page and an authorizer that refuses everything
    let mut h = Harness::new();
    let node = h.root_page("Home");
    let before = h.store.clone();

    // WHEN trying to publish it
    let err = apply(
        &h.engine,
        &mut h.store,
        &DenyAllAuthorizer,
        &ctx("req-deny"),
        Command::Publish {
            node_id: node,
            locale: "en".to_string(),
        },
    )
    .unwrap_err();

    // THEN permission is denied and nothing changed
    assert!(matches!(err, PageNodeError::PermissionDenied { .. }));
    assert_eq!(err.kind(), ExErrorKind::PermissionDenied);
    assert_eq!(
        h.store.get_translation_for(node, "en").unwrap(),
        before.get_translation_for(node, "en").unwrap()
    );
    assert!(h.events.events().is_empty());
}

#[test]
fn test_apply_add_root_page_needs_no_permission_check() {
    let h = Harness::new();
    let mut store = h.store.clone();

    let outcome = apply(
        &h.engine,
        &mut store,
        &DenyAllAuthorizer,
        &ctx("req-root"),
        add_root("Home"),
    );

    assert!(outcome.is_ok());
}

#[test]
fn test_apply_add_child_is_guarded_by_parent() {
    let mut h = Harness::new();
    let root = h.root_page("Home");

    let err = apply(
        &h.engine,
        &mut h.store,
        &DenyAllAuthorizer,
        &ctx("req-child"),
        Command::AddPage {
            parent_id: Some(root),
            locale: "en".to_string(),
            ref_type: "page".to_string(),
            title: None,
            structure_node: false,
            content: json!(null),
        },
    )
    .unwrap_err();

    assert_eq!(err.kind(), ExErrorKind::PermissionDenied);
    assert_eq!(h.store.list_nodes().len(), 1);
}

#[test]
fn test_apply_edit_then_show_returns_draft_payload() {
    // GIVEN a page
    let mut h = Harness::new();
    let node = h.root_page("Home");

    // WHEN saving an edit as a draft
    let outcome = apply(
        &h.engine,
        &mut h.store,
        &AllowAllAuthorizer,
        &ctx("req-edit"),
        Command::Edit {
            node_id: node,
            locale: "en".to_string(),
            draft: true,
            title: Some("Home (draft)".to_string()),
            content: None,
            save_as_draft: false,
            save_and_publish: false,
        },
    )
    .unwrap();
    assert!(matches!(outcome, CommandOutcome::Edited(ref e) if e.draft));

    // THEN show displays the draft content next to the public version
    let shown = apply(
        &h.engine,
        &mut h.store,
        &AllowAllAuthorizer,
        &ctx("req-show"),
        Command::Show {
            node_id: node,
            locale: "en".to_string(),
        },
    )
    .unwrap();
    let CommandOutcome::Page(view) = shown else {
        panic!("expected Page");
    };
    match *view {
        PageView::Translated {
            public,
            draft,
            payload,
            ..
        } => {
            let draft = draft.expect("draft");
            assert_ne!(draft.id, public.id);
            assert_eq!(payload.title, "Home (draft)");
        }
        other => panic!("expected translated view, got {:?}", other),
    }
}

#[test]
fn test_apply_history_lists_versions_oldest_first() {
    let mut h = Harness::new();
    let node = h.root_page("Home");
    h.clock.advance_secs(10);
    apply(
        &h.engine,
        &mut h.store,
        &AllowAllAuthorizer,
        &ctx("req-history-edit"),
        Command::Edit {
            node_id: node,
            locale: "en".to_string(),
            draft: false,
            title: None,
            content: None,
            save_as_draft: true,
            save_and_publish: false,
        },
    )
    .unwrap();

    let outcome = apply(
        &h.engine,
        &mut h.store,
        &AllowAllAuthorizer,
        &ctx("req-history"),
        Command::History {
            node_id: node,
            locale: "en".to_string(),
        },
    )
    .unwrap();

    let CommandOutcome::History(versions) = outcome else {
        panic!("expected History");
    };
    assert_eq!(versions.len(), 2);
    assert!(versions[0].created_at <= versions[1].created_at);
}

// ========== Lifecycle logging ==========

#[test]
fn test_apply_logs_start_and_end() {
    let capture = init_test_capture();
    let h = Harness::new();
    let mut store = h.store.clone();

    apply(
        &h.engine,
        &mut store,
        &AllowAllAuthorizer,
        &ctx("req-log-ok"),
        add_root("Logged"),
    )
    .unwrap();

    let mine: Vec<_> = capture
        .events_for_request("req-log-ok")
        .into_iter()
        .filter(|e| e.op.as_deref() == Some("page_add"))
        .collect();
    assert!(mine.iter().any(|e| e.event.as_deref() == Some("start")
        && e.field("user") == Some("alice")));
    let end = mine
        .iter()
        .find(|e| e.event.as_deref() == Some("end"))
        .expect("end event");
    assert!(end.field("duration_ms").is_some());
    assert!(!mine.iter().any(|e| e.event.as_deref() == Some("end_error")));
}

#[test]
fn test_apply_logs_end_error_with_code() {
    let capture = init_test_capture();
    let mut h = Harness::new();
    let node = h.root_page("Home");

    let err = apply(
        &h.engine,
        &mut h.store,
        &AllowAllAuthorizer,
        &ctx("req-log-revert"),
        Command::Revert {
            node_id: node,
            locale: "en".to_string(),
            version_id: Some("abc".to_string()),
        },
    )
    .unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::InvalidArgument);

    let errors: Vec<_> = capture
        .events_for_op("page_revert")
        .into_iter()
        .filter(|e| {
            e.field("request_id") == Some("req-log-revert")
                && e.event.as_deref() == Some("end_error")
        })
        .collect();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].level, tracing::Level::ERROR);
    assert_eq!(errors[0].field("err_code"), Some("ERR_INVALID_ARGUMENT"));
    assert_eq!(errors[0].field("err_kind"), Some("InvalidArgument"));
}

#[test]
fn test_apply_logs_denied_permission() {
    let capture = init_test_capture();
    let mut h = Harness::new();
    let node = h.root_page("Home");

    apply(
        &h.engine,
        &mut h.store,
        &DenyAllAuthorizer,
        &ctx("req-log-deny"),
        Command::Delete {
            node_id: node,
            locale: "en".to_string(),
        },
    )
    .unwrap_err();

    let count = capture.count_events(|e| {
        e.op.as_deref() == Some("page_delete")
            && e.field("request_id") == Some("req-log-deny")
            && e.field("err_code") == Some("ERR_PERMISSION_DENIED")
    });
    assert_eq!(count, 1);
}
