//! Subcommand implementations and the session they share

pub mod check;
pub mod page;

use std::path::{Path, PathBuf};

use clap::Args;
use pagenode_core::core_types::RequestContext;
use pagenode_core::events::TracingEventSink;
use pagenode_core::logging_facility::{self, Profile};
use pagenode_core::{
    apply, AllowAllAuthorizer, Command, CommandOutcome, EngineConfig, VersioningEngine,
};
use pagenode_store::SqliteRepo;

pub type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

#[derive(Debug, Args)]
pub struct GlobalArgs {
    /// SQLite database file
    #[arg(long, global = true, default_value = ".pagenode/store.db")]
    pub db: PathBuf,

    /// TOML engine configuration
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Acting user, recorded as version owner
    #[arg(long, global = true, default_value = "admin")]
    pub user: String,

    /// Emit JSON log lines instead of human-readable ones
    #[arg(long, global = true)]
    pub json_logs: bool,
}

pub fn init_logging(global: &GlobalArgs) {
    let profile = if global.json_logs {
        Profile::Production
    } else {
        Profile::Development
    };
    logging_facility::init(profile);
}

/// `.env`, then the `--config` file, then `PAGENODE_*` overrides
pub fn load_config(global: &GlobalArgs) -> CliResult<EngineConfig> {
    // A missing .env is not an error
    dotenvy::dotenv().ok();

    let mut config = match &global.config {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };
    config.apply_env_overrides()?;
    Ok(config)
}

pub fn open_repo(path: &Path) -> CliResult<SqliteRepo> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)?;
    }
    Ok(SqliteRepo::open(path)?)
}

/// Open database, engine and request context for one invocation
pub struct Session {
    pub repo: SqliteRepo,
    pub engine: VersioningEngine,
    pub config: EngineConfig,
    pub ctx: RequestContext,
}

impl Session {
    pub fn open(global: &GlobalArgs) -> CliResult<Self> {
        let config = load_config(global)?;
        let repo = open_repo(&global.db)?;
        let engine = VersioningEngine::new(config.clone()).with_events(TracingEventSink);
        Ok(Self {
            repo,
            engine,
            config,
            ctx: RequestContext::new(global.user.clone()),
        })
    }

    /// Locale argument, or the configured default
    pub fn locale(&self, locale: Option<String>) -> String {
        locale.unwrap_or_else(|| self.config.default_locale.clone())
    }

    pub fn run(&mut self, cmd: Command) -> CliResult<CommandOutcome> {
        let outcome = apply(
            &self.engine,
            &mut self.repo,
            &AllowAllAuthorizer,
            &self.ctx,
            cmd,
        )?;
        Ok(outcome)
    }
}
