//! Project use-case service.
//!
//! # Invariants
//! - Every call is a single repository call; no business rules beyond
//!   existence checks live here.
//! - `get_project`, `update_project` and `remove_project` fail with
//!   `ProjectNotFound` instead of returning empty results.

use crate::model::project::{NewProject, Project, ProjectId};
use crate::repo::project_repo::{ProjectRepository, RepoError};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ServiceResult<T> = Result<T, ProjectServiceError>;

/// Service error for project use-cases.
#[derive(Debug)]
pub enum ProjectServiceError {
    /// No project row has this id.
    ProjectNotFound(ProjectId),
    /// Persistence-layer failure, already rolled back.
    Repo(RepoError),
}

impl Display for ProjectServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ProjectNotFound(project_id) => {
                write!(f, "project with ID={project_id} does not exist.")
            }
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ProjectServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            Self::ProjectNotFound(_) => None,
        }
    }
}

impl From<RepoError> for ProjectServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

pub struct ProjectService<R: ProjectRepository> {
    repo: R,
}

impl<R: ProjectRepository> ProjectService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Stores a new project and returns it with its generated id.
    pub fn add_project(&self, project: NewProject) -> ServiceResult<Project> {
        Ok(self.repo.insert_project(project)?)
    }

    /// All projects by name, without materials/steps/categories.
    pub fn list_projects(&self) -> ServiceResult<Vec<Project>> {
        Ok(self.repo.fetch_all_projects()?)
    }

    /// One project with its materials, steps and categories.
    pub fn get_project(&self, project_id: ProjectId) -> ServiceResult<Project> {
        self.repo
            .fetch_project_by_id(project_id)?
            .ok_or(ProjectServiceError::ProjectNotFound(project_id))
    }

    /// Full-field update; all five mutable fields are rewritten.
    pub fn update_project(&self, project: &Project) -> ServiceResult<()> {
        if !self.repo.update_project(project)? {
            return Err(ProjectServiceError::ProjectNotFound(project.project_id));
        }
        Ok(())
    }

    pub fn remove_project(&self, project_id: ProjectId) -> ServiceResult<()> {
        if !self.repo.delete_project(project_id)? {
            return Err(ProjectServiceError::ProjectNotFound(project_id));
        }
        Ok(())
    }
}
