//! Console entry point for the projects tracker.
//!
//! # Responsibility
//! - Resolve store/logging configuration from flags and environment.
//! - Run the interactive menu on stdin/stdout until the user quits.

mod input;
mod menu;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use log::info;
use menu::ProjectsMenu;
use projects_core::{
    core_version, init_from_config, LogConfig, ProjectService, SqliteProjectRepository,
    StoreConfig,
};
use std::io;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "projects",
    about = "Menu-driven tracker for DIY projects",
    version
)]
struct Cli {
    /// SQLite database file. Overrides PROJECTS_DB_PATH.
    #[arg(long)]
    db_path: Option<PathBuf>,
    /// Log level: trace, debug, info, warn or error. Overrides PROJECTS_LOG_LEVEL.
    #[arg(long)]
    log_level: Option<String>,
    /// Absolute directory for rotating log files. Overrides PROJECTS_LOG_DIR.
    #[arg(long)]
    log_dir: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let store = match cli.db_path {
        Some(path) => StoreConfig::new(path),
        None => StoreConfig::from_env().context("failed to read store configuration")?,
    };

    let mut log_config = LogConfig::from_env().context("failed to read logging configuration")?;
    let level_requested = cli.log_level.is_some();
    if let Some(level) = cli.log_level {
        log_config.level = level;
    }
    if let Some(log_dir) = cli.log_dir {
        log_config.log_dir = Some(log_dir);
    }
    let file_logging = init_from_config(&log_config)
        .map_err(|err| anyhow!(err))
        .context("failed to initialize logging")?;
    if level_requested && !file_logging {
        eprintln!("--log-level has no effect without --log-dir or PROJECTS_LOG_DIR");
    }

    info!(
        "event=cli_start module=cli status=ok core_version={} db_path={}",
        core_version(),
        store.db_path().display()
    );

    let service = ProjectService::new(SqliteProjectRepository::new(store));
    let stdin = io::stdin();
    let mut menu = ProjectsMenu::new(service, stdin.lock(), io::stdout());
    menu.run().context("console I/O failed")?;

    info!("event=cli_exit module=cli status=ok");
    Ok(())
}
