//! Numbered console menu over the project service.
//!
//! # Invariants
//! - Empty input at the selection prompt ends the loop.
//! - Input, not-found and store failures are reported and the loop goes on;
//!   only console I/O failures end it early.
//! - The current project is always a full detail fetch, or `None`.

use crate::input::{required, InputError, Prompter};
use log::{info, warn};
use projects_core::{
    NewProject, Project, ProjectId, ProjectRepository, ProjectService, ProjectServiceError,
};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io::{self, BufRead, Write};

const OPERATIONS: &[&str] = &[
    "1) Add a project",
    "2) List projects",
    "3) Select a project",
    "4) Update project details",
    "5) Delete a project",
];

#[derive(Debug)]
pub enum MenuError {
    Input(InputError),
    Service(ProjectServiceError),
}

impl Display for MenuError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Input(err) => write!(f, "{err}"),
            Self::Service(err) => write!(f, "{err}"),
        }
    }
}

impl Error for MenuError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Input(err) => Some(err),
            Self::Service(err) => Some(err),
        }
    }
}

impl From<InputError> for MenuError {
    fn from(value: InputError) -> Self {
        Self::Input(value)
    }
}

impl From<ProjectServiceError> for MenuError {
    fn from(value: ProjectServiceError) -> Self {
        Self::Service(value)
    }
}

impl From<io::Error> for MenuError {
    fn from(value: io::Error) -> Self {
        Self::Input(InputError::Io(value))
    }
}

type MenuResult<T> = Result<T, MenuError>;

enum Flow {
    Continue,
    Exit,
}

pub struct ProjectsMenu<R: ProjectRepository, In, Out> {
    service: ProjectService<R>,
    prompter: Prompter<In, Out>,
    current: Option<Project>,
}

impl<R: ProjectRepository, In: BufRead, Out: Write> ProjectsMenu<R, In, Out> {
    pub fn new(service: ProjectService<R>, input: In, output: Out) -> Self {
        Self {
            service,
            prompter: Prompter::new(input, output),
            current: None,
        }
    }

    #[cfg(test)]
    pub fn current_project(&self) -> Option<&Project> {
        self.current.as_ref()
    }

    #[cfg(test)]
    pub fn into_output(self) -> Out {
        self.prompter.into_output()
    }

    /// Processes selections until the user enters nothing.
    pub fn run(&mut self) -> io::Result<()> {
        loop {
            match self.process_selection() {
                Ok(Flow::Continue) => {}
                Ok(Flow::Exit) => {
                    writeln!(self.prompter.output(), "\nExiting the menu.")?;
                    return Ok(());
                }
                Err(MenuError::Input(InputError::Io(err))) => return Err(err),
                Err(err) => {
                    warn!(
                        "event=menu_action module=cli status=error error={}",
                        err
                    );
                    writeln!(self.prompter.output(), "\nError: {err} Try again.")?;
                }
            }
        }
    }

    fn process_selection(&mut self) -> MenuResult<Flow> {
        self.print_operations()?;
        let Some(selection) = self.prompter.read_number::<i64>("Enter a menu selection")? else {
            return Ok(Flow::Exit);
        };

        match selection {
            1 => self.create_project()?,
            2 => self.list_projects()?,
            3 => self.select_project()?,
            4 => self.update_project_details()?,
            5 => self.delete_project()?,
            other => writeln!(
                self.prompter.output(),
                "\n{other} is not a valid selection. Try again."
            )?,
        }
        Ok(Flow::Continue)
    }

    fn print_operations(&mut self) -> MenuResult<()> {
        let out = self.prompter.output();
        writeln!(
            out,
            "\nThese are the available selections. Press the Enter key to quit:"
        )?;
        for line in OPERATIONS {
            writeln!(out, "   {line}")?;
        }
        match &self.current {
            Some(project) => writeln!(out, "\nYou are working with project: {project}")?,
            None => writeln!(out, "\nYou are not working with a project.")?,
        }
        Ok(())
    }

    fn create_project(&mut self) -> MenuResult<()> {
        let project_name = required(
            self.prompter.read_string("Enter the project name")?,
            "project name",
        )?;
        let estimated_hours = required(
            self.prompter.read_decimal("Enter the estimated hours")?,
            "estimated hours",
        )?;
        let actual_hours = required(
            self.prompter.read_decimal("Enter the actual hours")?,
            "actual hours",
        )?;
        let difficulty = required(
            self.prompter
                .read_number::<i32>("Enter the project difficulty (1-5)")?,
            "difficulty",
        )?;
        let notes = self.prompter.read_string("Enter the project notes")?;

        let project = self.service.add_project(NewProject {
            project_name,
            estimated_hours,
            actual_hours,
            difficulty,
            notes,
        })?;
        info!(
            "event=menu_action module=cli status=ok action=add project_id={}",
            project.project_id
        );
        writeln!(
            self.prompter.output(),
            "You have successfully created project: {project}"
        )?;
        Ok(())
    }

    fn list_projects(&mut self) -> MenuResult<()> {
        let projects = self.service.list_projects()?;
        let out = self.prompter.output();
        writeln!(out, "\nProjects:")?;
        for project in &projects {
            writeln!(out, "   {}: {}", project.project_id, project.project_name)?;
        }
        Ok(())
    }

    fn select_project(&mut self) -> MenuResult<()> {
        self.list_projects()?;
        let project_id = self.read_project_id("Enter a project ID to select a project")?;

        self.current = None;
        let project = self.service.get_project(project_id)?;
        write_project_details(self.prompter.output(), &project)?;
        self.current = Some(project);
        Ok(())
    }

    fn update_project_details(&mut self) -> MenuResult<()> {
        let Some(current) = self.current.clone() else {
            writeln!(self.prompter.output(), "\nPlease select a project.")?;
            return Ok(());
        };

        let project_name = self
            .prompter
            .read_string(&format!("Enter the project name [{}]", current.project_name))?;
        let estimated_hours = self.prompter.read_decimal(&format!(
            "Enter the project estimated hours [{}]",
            current.estimated_hours
        ))?;
        let actual_hours = self.prompter.read_decimal(&format!(
            "Enter the project actual hours [{}]",
            current.actual_hours
        ))?;
        let difficulty = self.prompter.read_number::<i32>(&format!(
            "Enter the project difficulty [{}]",
            current.difficulty
        ))?;
        let notes = self.prompter.read_string(&format!(
            "Enter the project notes [{}]",
            current.notes.as_deref().unwrap_or("")
        ))?;

        let updated = Project {
            project_name: project_name.unwrap_or(current.project_name),
            estimated_hours: estimated_hours.unwrap_or(current.estimated_hours),
            actual_hours: actual_hours.unwrap_or(current.actual_hours),
            difficulty: difficulty.unwrap_or(current.difficulty),
            notes: notes.or(current.notes),
            ..current
        };

        self.service.update_project(&updated)?;
        info!(
            "event=menu_action module=cli status=ok action=update project_id={}",
            updated.project_id
        );
        self.current = Some(self.service.get_project(updated.project_id)?);
        Ok(())
    }

    fn delete_project(&mut self) -> MenuResult<()> {
        self.list_projects()?;
        let project_id = self.read_project_id("Enter the project ID to delete")?;

        self.service.remove_project(project_id)?;
        info!(
            "event=menu_action module=cli status=ok action=delete project_id={}",
            project_id
        );
        writeln!(
            self.prompter.output(),
            "Project ID={project_id} was deleted."
        )?;

        if self
            .current
            .as_ref()
            .is_some_and(|project| project.project_id == project_id)
        {
            self.current = None;
        }
        Ok(())
    }

    fn read_project_id(&mut self, prompt: &str) -> MenuResult<ProjectId> {
        Ok(required(
            self.prompter.read_number::<ProjectId>(prompt)?,
            "project ID",
        )?)
    }
}

fn write_project_details(out: &mut impl Write, project: &Project) -> io::Result<()> {
    writeln!(out, "\nProject ID={}", project.project_id)?;
    writeln!(out, "   Name: {}", project.project_name)?;
    writeln!(out, "   Estimated hours: {}", project.estimated_hours)?;
    writeln!(out, "   Actual hours: {}", project.actual_hours)?;
    writeln!(out, "   Difficulty: {}", project.difficulty)?;
    writeln!(out, "   Notes: {}", project.notes.as_deref().unwrap_or(""))?;

    writeln!(out, "   Materials:")?;
    for material in &project.materials {
        let cost = material
            .cost
            .map(|cost| cost.to_string())
            .unwrap_or_default();
        writeln!(
            out,
            "      {} x{} {}",
            material.material_name,
            material.num_required.unwrap_or(0),
            cost
        )?;
    }
    writeln!(out, "   Steps:")?;
    for step in &project.steps {
        writeln!(out, "      {}. {}", step.step_order, step.step_text)?;
    }
    writeln!(out, "   Categories:")?;
    for category in &project.categories {
        writeln!(out, "      {}", category.category_name)?;
    }
    Ok(())
}
