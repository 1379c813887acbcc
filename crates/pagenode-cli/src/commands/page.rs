//! Page administration subcommands

use clap::Args;
use pagenode_core::ops::page_ops::{CreatedPage, PageView};
use pagenode_core::{Command, CommandOutcome, NodeId, Version};
use serde_json::Value;

use super::{CliResult, GlobalArgs, Session};

#[derive(Debug, Args)]
pub struct PageArgs {
    pub node_id: u64,

    #[arg(long)]
    pub locale: Option<String>,
}

#[derive(Debug, Args)]
pub struct AddArgs {
    /// Parent node; omit to add a root page
    #[arg(long)]
    pub parent: Option<u64>,

    #[arg(long)]
    pub title: Option<String>,

    #[arg(long)]
    pub locale: Option<String>,

    #[arg(long, default_value = "page")]
    pub ref_type: String,

    /// Group pages without making the node addressable
    #[arg(long)]
    pub structure: bool,

    /// Initial content as JSON
    #[arg(long)]
    pub content: Option<String>,
}

#[derive(Debug, Args)]
pub struct TranslateArgs {
    pub node_id: u64,

    /// Locale to create
    #[arg(long)]
    pub locale: String,
}

#[derive(Debug, Args)]
pub struct CopyArgs {
    pub node_id: u64,

    /// Locale to create
    #[arg(long)]
    pub locale: String,

    /// Locale to copy the public content from
    #[arg(long)]
    pub from: String,
}

#[derive(Debug, Args)]
pub struct EditArgs {
    pub node_id: u64,

    #[arg(long)]
    pub locale: Option<String>,

    #[arg(long)]
    pub title: Option<String>,

    /// New content as JSON
    #[arg(long)]
    pub content: Option<String>,

    /// Edit the draft, creating one if needed
    #[arg(long)]
    pub draft: bool,

    /// Always start a new draft from the public version
    #[arg(long, conflicts_with = "draft")]
    pub save_as_draft: bool,

    /// Publish the edited version once saved
    #[arg(long)]
    pub publish: bool,
}

#[derive(Debug, Args)]
pub struct RevertArgs {
    pub node_id: u64,

    /// Version to restore
    pub version_id: String,

    #[arg(long)]
    pub locale: Option<String>,
}

fn parse_content(raw: Option<&str>) -> CliResult<Option<Value>> {
    raw.map(serde_json::from_str::<Value>)
        .transpose()
        .map_err(|e| format!("--content is not valid JSON: {}", e).into())
}

fn print_created(label: &str, created: &CreatedPage) {
    println!("{}:", label);
    println!("  node_id: {}", created.node.id);
    println!("  locale: {}", created.translation.locale);
    println!("  title: {}", created.translation.title);
    println!("  version_id: {}", created.version.id);
}

fn print_version(version: &Version) {
    println!(
        "  {} {} owner={} origin={} created={}",
        version.id,
        version.version_type,
        version.owner,
        version
            .origin_id
            .map(|id| id.to_string())
            .unwrap_or_else(|| "-".to_string()),
        version.created_at.to_rfc3339(),
    );
}

fn unexpected(outcome: &CommandOutcome) -> Box<dyn std::error::Error> {
    format!("unexpected command outcome: {:?}", outcome).into()
}

pub fn execute_add(global: &GlobalArgs, args: AddArgs) -> CliResult<()> {
    let mut session = Session::open(global)?;
    let content = parse_content(args.content.as_deref())?.unwrap_or(Value::Null);
    let cmd = Command::AddPage {
        parent_id: args.parent.map(NodeId),
        locale: session.locale(args.locale),
        ref_type: args.ref_type,
        title: args.title,
        structure_node: args.structure,
        content,
    };

    match session.run(cmd)? {
        CommandOutcome::Created(created) => print_created("Page added", &created),
        other => return Err(unexpected(&other)),
    }
    Ok(())
}

pub fn execute_create_empty(global: &GlobalArgs, args: TranslateArgs) -> CliResult<()> {
    let mut session = Session::open(global)?;
    let cmd = Command::CreateEmptyPage {
        node_id: NodeId(args.node_id),
        locale: args.locale,
    };

    match session.run(cmd)? {
        CommandOutcome::Created(created) => print_created("Translation created", &created),
        other => return Err(unexpected(&other)),
    }
    Ok(())
}

pub fn execute_copy(global: &GlobalArgs, args: CopyArgs) -> CliResult<()> {
    let mut session = Session::open(global)?;
    let cmd = Command::CopyFromOtherLanguage {
        node_id: NodeId(args.node_id),
        locale: args.locale,
        source_locale: args.from,
    };

    match session.run(cmd)? {
        CommandOutcome::Created(created) => print_created("Translation copied", &created),
        other => return Err(unexpected(&other)),
    }
    Ok(())
}

pub fn execute_edit(global: &GlobalArgs, args: EditArgs) -> CliResult<()> {
    let mut session = Session::open(global)?;
    let cmd = Command::Edit {
        node_id: NodeId(args.node_id),
        locale: session.locale(args.locale),
        draft: args.draft,
        title: args.title,
        content: parse_content(args.content.as_deref())?,
        save_as_draft: args.save_as_draft,
        save_and_publish: args.publish,
    };

    match session.run(cmd)? {
        CommandOutcome::Edited(outcome) => {
            println!("Edit saved:");
            println!("  version_id: {}", outcome.version.id);
            println!("  draft: {}", outcome.draft);
        }
        other => return Err(unexpected(&other)),
    }
    Ok(())
}

pub fn execute_publish(global: &GlobalArgs, args: PageArgs, online: bool) -> CliResult<()> {
    let mut session = Session::open(global)?;
    let node_id = NodeId(args.node_id);
    let locale = session.locale(args.locale);
    let cmd = if online {
        Command::Publish { node_id, locale }
    } else {
        Command::Unpublish { node_id, locale }
    };

    match session.run(cmd)? {
        CommandOutcome::OnlineChanged(translation) => {
            println!(
                "Page {} ({}) is {}",
                translation.node_id,
                translation.locale,
                if translation.online { "online" } else { "offline" }
            );
        }
        other => return Err(unexpected(&other)),
    }
    Ok(())
}

pub fn execute_delete(global: &GlobalArgs, args: PageArgs) -> CliResult<()> {
    let mut session = Session::open(global)?;
    let cmd = Command::Delete {
        node_id: NodeId(args.node_id),
        locale: session.locale(args.locale),
    };

    match session.run(cmd)? {
        CommandOutcome::Deleted(ids) => {
            let ids: Vec<String> = ids.iter().map(|id| id.to_string()).collect();
            println!("Deleted {} node(s): {}", ids.len(), ids.join(", "));
        }
        other => return Err(unexpected(&other)),
    }
    Ok(())
}

pub fn execute_revert(global: &GlobalArgs, args: RevertArgs) -> CliResult<()> {
    let mut session = Session::open(global)?;
    let cmd = Command::Revert {
        node_id: NodeId(args.node_id),
        locale: session.locale(args.locale),
        version_id: Some(args.version_id),
    };

    match session.run(cmd)? {
        CommandOutcome::Reverted(draft) => {
            println!("Reverted:");
            println!("  draft_version_id: {}", draft.id);
            println!(
                "  origin_id: {}",
                draft.origin_id.map(|id| id.to_string()).unwrap_or_default()
            );
        }
        other => return Err(unexpected(&other)),
    }
    Ok(())
}

pub fn execute_versions(global: &GlobalArgs, args: PageArgs) -> CliResult<()> {
    let mut session = Session::open(global)?;
    let cmd = Command::History {
        node_id: NodeId(args.node_id),
        locale: session.locale(args.locale),
    };

    match session.run(cmd)? {
        CommandOutcome::History(versions) => {
            println!("Versions:");
            for version in &versions {
                print_version(version);
            }
        }
        other => return Err(unexpected(&other)),
    }
    Ok(())
}

pub fn execute_show(global: &GlobalArgs, args: PageArgs) -> CliResult<()> {
    let mut session = Session::open(global)?;
    let locale = session.locale(args.locale);
    let cmd = Command::Show {
        node_id: NodeId(args.node_id),
        locale: locale.clone(),
    };

    let view = match session.run(cmd)? {
        CommandOutcome::Page(view) => *view,
        other => return Err(unexpected(&other)),
    };

    match view {
        PageView::Translated {
            node,
            translation,
            public,
            draft,
            payload,
        } => {
            println!("Page {} ({}):", node.id, translation.locale);
            println!("  title: {}", translation.title);
            println!("  slug: {}", translation.slug);
            println!("  online: {}", translation.online);
            println!("  public_version_id: {}", public.id);
            if let Some(draft) = draft {
                println!("  draft_version_id: {}", draft.id);
            }
            println!("  content: {}", payload.content);
        }
        PageView::Untranslated {
            node,
            available_locales,
            can_copy,
        } => {
            println!("Page {} has no {} translation", node.id, locale);
            println!("  available: {}", available_locales.join(", "));
            println!("  can_copy: {}", can_copy);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_content() {
        assert_eq!(parse_content(None).unwrap(), None);
        assert_eq!(
            parse_content(Some(r#"{"body": "hi"}"#)).unwrap(),
            Some(serde_json::json!({"body": "hi"}))
        );
        assert!(parse_content(Some("{not json")).is_err());
    }
}
