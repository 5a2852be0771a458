//! Core logic for the DIY projects tracker.
//! Record access, not-found translation, and store/logging bootstrap live here;
//! the console menu lives in `projects_cli`.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::{ConfigError, LogConfig, StoreConfig};
pub use logging::{default_log_level, init_from_config, init_logging, logging_status};
pub use model::project::{
    to_fixed_scale, Category, Material, NewProject, Project, ProjectId, Step, DECIMAL_SCALE,
};
pub use repo::project_repo::{ProjectRepository, RepoError, RepoResult, SqliteProjectRepository};
pub use service::project_service::{ProjectService, ProjectServiceError, ServiceResult};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
