//! Store and logging configuration resolved from the hosting environment.
//!
//! # Responsibility
//! - Resolve where the projects database lives.
//! - Resolve optional file-logging settings.
//!
//! # Invariants
//! - A configured value is never blank; blank values are rejected, not
//!   silently replaced by defaults.

use crate::db::{open_db, DbResult};
use crate::logging::default_log_level;
use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

pub const DB_PATH_ENV: &str = "PROJECTS_DB_PATH";
pub const LOG_LEVEL_ENV: &str = "PROJECTS_LOG_LEVEL";
pub const LOG_DIR_ENV: &str = "PROJECTS_LOG_DIR";

const DEFAULT_DB_FILE_NAME: &str = "projects.sqlite3";

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The named variable is set but holds only whitespace.
    EmptyValue(&'static str),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyValue(name) => write!(f, "configuration value `{name}` cannot be empty"),
        }
    }
}

impl Error for ConfigError {}

/// Location of the projects database. Produces a fresh connection on demand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    db_path: PathBuf,
}

impl StoreConfig {
    pub fn new(db_path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: db_path.into(),
        }
    }

    /// Reads `PROJECTS_DB_PATH`, falling back to `projects.sqlite3` in the
    /// working directory.
    pub fn from_env() -> ConfigResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> ConfigResult<Self> {
        let db_path = match non_blank(DB_PATH_ENV, lookup(DB_PATH_ENV))? {
            Some(value) => PathBuf::from(value),
            None => PathBuf::from(DEFAULT_DB_FILE_NAME),
        };
        Ok(Self { db_path })
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    /// Opens a connection with pragmas and schema applied.
    pub fn open(&self) -> DbResult<Connection> {
        open_db(&self.db_path)
    }
}

/// File-logging settings. Logging stays disabled when no directory is set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    pub level: String,
    pub log_dir: Option<PathBuf>,
}

impl LogConfig {
    /// Reads `PROJECTS_LOG_LEVEL` and `PROJECTS_LOG_DIR`.
    pub fn from_env() -> ConfigResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> ConfigResult<Self> {
        let level = non_blank(LOG_LEVEL_ENV, lookup(LOG_LEVEL_ENV))?
            .unwrap_or_else(|| default_log_level().to_string());
        let log_dir = non_blank(LOG_DIR_ENV, lookup(LOG_DIR_ENV))?.map(PathBuf::from);
        Ok(Self { level, log_dir })
    }
}

fn non_blank(name: &'static str, value: Option<String>) -> ConfigResult<Option<String>> {
    match value {
        Some(raw) if raw.trim().is_empty() => Err(ConfigError::EmptyValue(name)),
        Some(raw) => Ok(Some(raw.trim().to_string())),
        None => Ok(None),
    }
}
