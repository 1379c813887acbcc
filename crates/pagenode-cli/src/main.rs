//! pagenode CLI
//!
//! Page tree administration against a SQLite database

use clap::{Parser, Subcommand};

mod commands;

use commands::GlobalArgs;

#[derive(Debug, Parser)]
#[command(name = "pagenode")]
#[command(about = "pagenode - versioned page tree administration", long_about = None)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Create the database and apply migrations
    Init,
    /// Add a root page or a child page
    Add(commands::page::AddArgs),
    /// Translate a page with an empty page
    CreateEmpty(commands::page::TranslateArgs),
    /// Translate a page by copying another locale
    Copy(commands::page::CopyArgs),
    /// Save an edit to the public version or the draft
    Edit(commands::page::EditArgs),
    /// Put a page online
    Publish(commands::page::PageArgs),
    /// Take a page offline
    Unpublish(commands::page::PageArgs),
    /// Soft-delete a page and its subtree
    Delete(commands::page::PageArgs),
    /// Restore an earlier version as the draft
    Revert(commands::page::RevertArgs),
    /// List the versions of a page
    Versions(commands::page::PageArgs),
    /// Show a page in one locale
    Show(commands::page::PageArgs),
    /// Validate version slots and origin chains of every translation
    Check,
}

fn main() {
    let cli = Cli::parse();
    commands::init_logging(&cli.global);

    let global = cli.global;
    let result = match cli.command {
        Commands::Init => commands::check::execute_init(&global),
        Commands::Add(args) => commands::page::execute_add(&global, args),
        Commands::CreateEmpty(args) => commands::page::execute_create_empty(&global, args),
        Commands::Copy(args) => commands::page::execute_copy(&global, args),
        Commands::Edit(args) => commands::page::execute_edit(&global, args),
        Commands::Publish(args) => commands::page::execute_publish(&global, args, true),
        Commands::Unpublish(args) => commands::page::execute_publish(&global, args, false),
        Commands::Delete(args) => commands::page::execute_delete(&global, args),
        Commands::Revert(args) => commands::page::execute_revert(&global, args),
        Commands::Versions(args) => commands::page::execute_versions(&global, args),
        Commands::Show(args) => commands::page::execute_show(&global, args),
        Commands::Check => commands::check::execute_check(&global),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
