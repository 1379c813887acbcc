//! Database lifecycle subcommands

use pagenode_core::rules::validate_translation;

use super::{open_repo, CliResult, GlobalArgs};

pub fn execute_init(global: &GlobalArgs) -> CliResult<()> {
    open_repo(&global.db)?;
    println!("Initialized database at {}", global.db.display());
    Ok(())
}

/// Hydrate the database and validate every translation
///
/// Reports each broken translation and fails if any was found.
pub fn execute_check(global: &GlobalArgs) -> CliResult<()> {
    let repo = open_repo(&global.db)?;
    let store = repo.hydrate()?;

    let translations = store.list_translations();
    let mut failures = 0usize;
    for translation in &translations {
        if let Err(e) = validate_translation(&store, translation.id) {
            failures += 1;
            println!(
                "  node {} ({}): {}",
                translation.node_id, translation.locale, e
            );
        }
    }
    tracing::debug!(translations = translations.len(), failures, "check finished");

    if failures > 0 {
        return Err(format!("{} translation(s) failed validation", failures).into());
    }
    println!(
        "Checked {} translation(s) across {} live node(s): OK",
        translations.len(),
        store.list_nodes().len()
    );
    Ok(())
}
