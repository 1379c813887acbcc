//! Functional-boundary apply function
//!
//! `apply()` is the single entry point for admin actions. It binds the
//! engine to the acting user, checks the permission the action needs, runs
//! the page operation and owns lifecycle logging:
//!
//! - `log_op_start!` at entry
//! - `log_op_end!` on success
//! - `log_op_error!` on failure
//!
//! Lower layers (engine, page operations, store) only use `tracing::debug!`.
//!
//! ```
//! use pagenode_core::apply::apply;
//! use pagenode_core::commands::{Command, CommandOutcome};
//! use pagenode_core::config::EngineConfig;
//! use pagenode_core::core_types::RequestContext;
//! use pagenode_core::policy::AllowAllAuthorizer;
//! use pagenode_core::{Store, VersioningEngine};
//!
//! let engine = VersioningEngine::new(EngineConfig::default());
//! let mut store = Store::new();
//! let cmd = Command::AddPage {
//!     parent_id: None,
//!     locale: "en".to_string(),
//!     ref_type: "page".to_string(),
//!     title: Some("Home".to_string()),
//!     structure_node: false,
//!     content: serde_json::Value::Null,
//! };
//!
//! let outcome = apply(&engine, &mut store, &AllowAllAuthorizer, &RequestContext::new("alice"), cmd)
//!     .unwrap();
//! assert!(matches!(outcome, CommandOutcome::Created(_)));
//! ```

use std::time::Instant;

use pagenode_core_types::RequestContext;

use crate::commands::{Command, CommandOutcome};
use crate::errors::Result;
use crate::ops::page_ops::{self, EditRequest, NewPage};
use crate::ops::Repository;
use crate::policy::Authorizer;
use crate::versioning::VersioningEngine;
use crate::{log_op_end, log_op_error, log_op_start};

/// Apply `cmd` on behalf of `ctx.user`
///
/// # Errors
///
/// `PermissionDenied` if the authorizer refuses (nothing is written), or
/// whatever the page operation reports.
pub fn apply(
    engine: &VersioningEngine,
    repo: &mut dyn Repository,
    authorizer: &dyn Authorizer,
    ctx: &RequestContext,
    cmd: Command,
) -> Result<CommandOutcome> {
    let op = cmd.op_name();
    let node_id = cmd.guarded_node().map(|id| id.get());
    log_op_start!(
        op,
        request_id = ctx.request_id.as_str(),
        user = ctx.user.as_str(),
        node_id = node_id
    );
    let start = Instant::now();

    let outcome = apply_impl(engine, repo, authorizer, ctx, cmd).map_err(|e| {
        log_op_error!(
            op,
            e.clone(),
            duration_ms = start.elapsed().as_millis() as u64,
            request_id = ctx.request_id.as_str(),
            node_id = node_id
        );
        e
    })?;

    log_op_end!(
        op,
        duration_ms = start.elapsed().as_millis() as u64,
        request_id = ctx.request_id.as_str(),
        node_id = node_id
    );
    Ok(outcome)
}

fn apply_impl(
    engine: &VersioningEngine,
    repo: &mut dyn Repository,
    authorizer: &dyn Authorizer,
    ctx: &RequestContext,
    cmd: Command,
) -> Result<CommandOutcome> {
    if let Some(node_id) = cmd.guarded_node() {
        let node = repo.get_node(node_id)?;
        authorizer.check(cmd.required_permission(), &node)?;
    }

    let engine = engine.clone().with_user(ctx.user.clone());

    match cmd {
        Command::AddPage {
            parent_id,
            locale,
            ref_type,
            title,
            structure_node,
            content,
        } => {
            let page = NewPage {
                parent_id,
                locale,
                ref_type,
                title,
                structure_node,
                content,
            };
            page_ops::create_page(&engine, repo, page).map(CommandOutcome::Created)
        }

        Command::CreateEmptyPage { node_id, locale } => {
            page_ops::create_empty_translation(&engine, repo, node_id, &locale)
                .map(CommandOutcome::Created)
        }

        Command::CopyFromOtherLanguage {
            node_id,
            locale,
            source_locale,
        } => page_ops::copy_from_other_language(&engine, repo, node_id, &locale, &source_locale)
            .map(CommandOutcome::Created),

        Command::Edit {
            node_id,
            locale,
            draft,
            title,
            content,
            save_as_draft,
            save_and_publish,
        } => {
            let edit = EditRequest {
                title,
                content,
                save_as_draft,
                save_and_publish,
            };
            page_ops::commit_edit(&engine, repo, node_id, &locale, draft, edit)
                .map(CommandOutcome::Edited)
        }

        Command::Publish { node_id, locale } => {
            page_ops::publish(&engine, repo, node_id, &locale).map(CommandOutcome::OnlineChanged)
        }

        Command::Unpublish { node_id, locale } => {
            page_ops::unpublish(&engine, repo, node_id, &locale)
                .map(CommandOutcome::OnlineChanged)
        }

        Command::Delete { node_id, locale } => {
            page_ops::delete(&engine, repo, node_id, &locale).map(CommandOutcome::Deleted)
        }

        Command::Revert {
            node_id,
            locale,
            version_id,
        } => page_ops::revert(&engine, repo, node_id, &locale, version_id.as_deref())
            .map(CommandOutcome::Reverted),

        Command::History { node_id, locale } => {
            page_ops::version_history(repo, node_id, &locale).map(CommandOutcome::History)
        }

        Command::Show { node_id, locale } => page_ops::show_page(repo, node_id, &locale)
            .map(|view| CommandOutcome::Page(Box::new(view))),
    }
}
