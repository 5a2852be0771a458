//! Project repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Map `project` rows (and joined child rows) to domain records.
//! - Own transaction boundaries for every read and write.
//!
//! # Invariants
//! - Each call opens its own connection and releases it on every exit path.
//! - A failure inside a transaction is rolled back before it is returned.
//! - `fetch_all_projects` never loads child collections.
//! - Absence is reported as `None`/`false`, never as an error.

use crate::config::StoreConfig;
use crate::db::DbError;
use crate::model::project::{
    to_fixed_scale, Category, Material, NewProject, Project, ProjectId, Step,
};
use log::{debug, error, warn};
use rusqlite::types::ValueRef;
use rusqlite::{params, Connection, Row, Transaction};
use rust_decimal::Decimal;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

const PROJECT_SELECT_SQL: &str = "SELECT
    project_id,
    project_name,
    estimated_hours,
    actual_hours,
    difficulty,
    notes
FROM project";

pub type RepoResult<T> = Result<T, RepoError>;

/// Failure of a repository operation. Any enclosing transaction has already
/// been rolled back when this is returned.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted project data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::InvalidData(_) => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Data access contract for projects.
pub trait ProjectRepository {
    /// Loads one project with its materials, steps and categories.
    fn fetch_project_by_id(&self, project_id: ProjectId) -> RepoResult<Option<Project>>;
    /// Loads every project ordered by name, without children.
    fn fetch_all_projects(&self) -> RepoResult<Vec<Project>>;
    /// Inserts the five mutable fields and returns the record with its id.
    fn insert_project(&self, project: NewProject) -> RepoResult<Project>;
    /// Rewrites all mutable fields. `false` when no row has this id.
    fn update_project(&self, project: &Project) -> RepoResult<bool>;
    /// `false` when no row has this id.
    fn delete_project(&self, project_id: ProjectId) -> RepoResult<bool>;
}

/// SQLite-backed project repository. Holds only configuration; connections
/// live for the duration of one call.
#[derive(Debug, Clone)]
pub struct SqliteProjectRepository {
    config: StoreConfig,
}

impl SqliteProjectRepository {
    pub fn new(config: StoreConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    fn connect(&self) -> RepoResult<Connection> {
        Ok(self.config.open()?)
    }
}

impl ProjectRepository for SqliteProjectRepository {
    fn fetch_project_by_id(&self, project_id: ProjectId) -> RepoResult<Option<Project>> {
        let mut conn = self.connect()?;
        let project = in_transaction(&mut conn, "fetch_project_by_id", |tx| {
            let Some(mut project) = load_project_row(tx, project_id)? else {
                return Ok(None);
            };
            project.materials = load_materials(tx, project_id)?;
            project.steps = load_steps(tx, project_id)?;
            project.categories = load_categories(tx, project_id)?;
            Ok(Some(project))
        })?;

        debug!(
            "event=project_fetch module=repo status=ok project_id={} found={}",
            project_id,
            project.is_some()
        );
        Ok(project)
    }

    fn fetch_all_projects(&self) -> RepoResult<Vec<Project>> {
        let mut conn = self.connect()?;
        let projects = in_transaction(&mut conn, "fetch_all_projects", |tx| {
            let mut stmt = tx.prepare(&format!(
                "{PROJECT_SELECT_SQL} ORDER BY project_name COLLATE NOCASE ASC, project_id ASC;"
            ))?;
            let mut rows = stmt.query([])?;
            let mut projects = Vec::new();
            while let Some(row) = rows.next()? {
                projects.push(parse_project_row(row)?);
            }
            Ok(projects)
        })?;

        debug!(
            "event=project_list module=repo status=ok count={}",
            projects.len()
        );
        Ok(projects)
    }

    fn insert_project(&self, project: NewProject) -> RepoResult<Project> {
        let mut conn = self.connect()?;
        let project_id = in_transaction(&mut conn, "insert_project", |tx| {
            tx.execute(
                "INSERT INTO project (
                    project_name,
                    estimated_hours,
                    actual_hours,
                    difficulty,
                    notes
                ) VALUES (?1, ?2, ?3, ?4, ?5);",
                params![
                    project.project_name.as_str(),
                    decimal_to_db(project.estimated_hours),
                    decimal_to_db(project.actual_hours),
                    project.difficulty,
                    project.notes.as_deref(),
                ],
            )?;
            Ok(tx.last_insert_rowid())
        })?;

        debug!(
            "event=project_insert module=repo status=ok project_id={}",
            project_id
        );
        Ok(project.into_project(project_id))
    }

    fn update_project(&self, project: &Project) -> RepoResult<bool> {
        let mut conn = self.connect()?;
        let changed = in_transaction(&mut conn, "update_project", |tx| {
            let changed = tx.execute(
                "UPDATE project
                 SET
                    project_name = ?1,
                    estimated_hours = ?2,
                    actual_hours = ?3,
                    difficulty = ?4,
                    notes = ?5
                 WHERE project_id = ?6;",
                params![
                    project.project_name.as_str(),
                    decimal_to_db(project.estimated_hours),
                    decimal_to_db(project.actual_hours),
                    project.difficulty,
                    project.notes.as_deref(),
                    project.project_id,
                ],
            )?;
            Ok(changed)
        })?;

        debug!(
            "event=project_update module=repo status=ok project_id={} changed={}",
            project.project_id, changed
        );
        Ok(changed == 1)
    }

    fn delete_project(&self, project_id: ProjectId) -> RepoResult<bool> {
        let mut conn = self.connect()?;
        let changed = in_transaction(&mut conn, "delete_project", |tx| {
            Ok(tx.execute(
                "DELETE FROM project WHERE project_id = ?1;",
                [project_id],
            )?)
        })?;

        debug!(
            "event=project_delete module=repo status=ok project_id={} changed={}",
            project_id, changed
        );
        Ok(changed == 1)
    }
}

/// Runs `body` inside one transaction: commit on `Ok`, explicit rollback on
/// `Err`. The original error is returned even when the rollback also fails.
fn in_transaction<T>(
    conn: &mut Connection,
    operation: &'static str,
    body: impl FnOnce(&Transaction<'_>) -> RepoResult<T>,
) -> RepoResult<T> {
    let tx = conn.transaction()?;
    let outcome = body(&tx);

    match outcome {
        Ok(value) => {
            tx.commit()?;
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = tx.rollback() {
                warn!(
                    "event=project_tx module=repo status=error operation={} error_code=rollback_failed error={}",
                    operation, rollback_err
                );
            }
            error!(
                "event=project_tx module=repo status=rollback operation={} error={}",
                operation, err
            );
            Err(err)
        }
    }
}

fn load_project_row(tx: &Transaction<'_>, project_id: ProjectId) -> RepoResult<Option<Project>> {
    let mut stmt = tx.prepare(&format!("{PROJECT_SELECT_SQL} WHERE project_id = ?1;"))?;
    let mut rows = stmt.query([project_id])?;
    match rows.next()? {
        Some(row) => Ok(Some(parse_project_row(row)?)),
        None => Ok(None),
    }
}

fn load_materials(tx: &Transaction<'_>, project_id: ProjectId) -> RepoResult<Vec<Material>> {
    let mut stmt = tx.prepare(
        "SELECT material_id, project_id, material_name, num_required, cost
         FROM material
         WHERE project_id = ?1
         ORDER BY material_id ASC;",
    )?;
    let mut rows = stmt.query([project_id])?;
    let mut materials = Vec::new();
    while let Some(row) = rows.next()? {
        materials.push(Material {
            material_id: row.get("material_id")?,
            project_id: row.get("project_id")?,
            material_name: row.get("material_name")?,
            num_required: row.get("num_required")?,
            cost: read_decimal(row, "material", "cost")?,
        });
    }
    Ok(materials)
}

fn load_steps(tx: &Transaction<'_>, project_id: ProjectId) -> RepoResult<Vec<Step>> {
    let mut stmt = tx.prepare(
        "SELECT step_id, project_id, step_text, step_order
         FROM step
         WHERE project_id = ?1
         ORDER BY step_order ASC, step_id ASC;",
    )?;
    let mut rows = stmt.query([project_id])?;
    let mut steps = Vec::new();
    while let Some(row) = rows.next()? {
        steps.push(Step {
            step_id: row.get("step_id")?,
            project_id: row.get("project_id")?,
            step_text: row.get("step_text")?,
            step_order: row.get("step_order")?,
        });
    }
    Ok(steps)
}

fn load_categories(tx: &Transaction<'_>, project_id: ProjectId) -> RepoResult<Vec<Category>> {
    let mut stmt = tx.prepare(
        "SELECT c.category_id, c.category_name
         FROM category c
         INNER JOIN project_category pc ON pc.category_id = c.category_id
         WHERE pc.project_id = ?1
         ORDER BY c.category_id ASC;",
    )?;
    let mut rows = stmt.query([project_id])?;
    let mut categories = Vec::new();
    while let Some(row) = rows.next()? {
        categories.push(Category {
            category_id: row.get("category_id")?,
            category_name: row.get("category_name")?,
        });
    }
    Ok(categories)
}

fn parse_project_row(row: &Row<'_>) -> RepoResult<Project> {
    Ok(Project {
        project_id: row.get("project_id")?,
        project_name: row.get("project_name")?,
        estimated_hours: read_decimal(row, "project", "estimated_hours")?.unwrap_or_default(),
        actual_hours: read_decimal(row, "project", "actual_hours")?.unwrap_or_default(),
        difficulty: row.get::<_, Option<i32>>("difficulty")?.unwrap_or_default(),
        notes: row.get("notes")?,
        materials: Vec::new(),
        steps: Vec::new(),
        categories: Vec::new(),
    })
}

fn decimal_to_db(value: Decimal) -> String {
    to_fixed_scale(value).to_string()
}

/// Reads a fixed-point column. Values written by this crate are TEXT; rows
/// inserted by other tools may carry INTEGER or REAL storage.
fn read_decimal(row: &Row<'_>, table: &str, column: &str) -> RepoResult<Option<Decimal>> {
    let value = match row.get_ref(column)? {
        ValueRef::Null => return Ok(None),
        ValueRef::Integer(value) => Decimal::from(value),
        ValueRef::Real(value) => Decimal::try_from(value).map_err(|_| {
            RepoError::InvalidData(format!("invalid decimal `{value}` in {table}.{column}"))
        })?,
        ValueRef::Text(bytes) => {
            let text = String::from_utf8_lossy(bytes);
            Decimal::from_str(text.trim()).map_err(|_| {
                RepoError::InvalidData(format!("invalid decimal `{text}` in {table}.{column}"))
            })?
        }
        ValueRef::Blob(_) => {
            return Err(RepoError::InvalidData(format!(
                "unexpected blob in {table}.{column}"
            )));
        }
    };
    Ok(Some(to_fixed_scale(value)))
}
