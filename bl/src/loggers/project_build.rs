//! Project task tracker
//!
//! Same shape as [`BuildTracker`](super::BuildTracker), scoped to the tasks
//! of one project build: `project-metadata` announces the tasks,
//! `project-status` reports each task starting and ending.

use tracing::debug;

use crate::context::LogContext;
use crate::error::{Error, Result};
use crate::events::{Event, TaskStatusKind};
use crate::level::Level;

use super::logger::Logger;

/// Reports the progress of the tasks within one project build
pub struct ProjectTaskTracker {
    logger: Logger,
    project_name: String,
    project_type: String,
    tasks: Option<Vec<String>>,
}

impl ProjectTaskTracker {
    pub fn new(ctx: &LogContext, module_name: &str, project_name: &str, project_type: &str) -> Result<Self> {
        debug!(%module_name, %project_name, %project_type, "ProjectTaskTracker::new: called");
        if project_name.is_empty() {
            return Err(Error::InvalidArgument(
                "ProjectTaskTracker: missing project name".to_string(),
            ));
        }
        if project_type.is_empty() {
            return Err(Error::InvalidArgument(
                "ProjectTaskTracker: missing project type".to_string(),
            ));
        }
        Ok(Self {
            logger: Logger::new(ctx, module_name)?.for_project(project_name, project_type),
            project_name: project_name.to_string(),
            project_type: project_type.to_string(),
            tasks: None,
        })
    }

    /// Logger whose messages carry this project's name and type
    pub fn logger(&self) -> &Logger {
        &self.logger
    }

    /// Logger whose messages additionally carry a task name
    pub fn task_logger(&self, task_name: &str) -> Logger {
        self.logger.for_task(task_name)
    }

    pub fn project_name(&self) -> &str {
        &self.project_name
    }

    pub fn project_type(&self) -> &str {
        &self.project_type
    }

    /// Tasks announced by the last [`set_tasks`](Self::set_tasks)
    pub fn tasks(&self) -> &[String] {
        self.tasks.as_deref().unwrap_or_default()
    }

    /// Announce the tasks this project build will run (may be empty)
    pub fn set_tasks<I, S>(&mut self, tasks: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let tasks: Vec<String> = tasks.into_iter().map(Into::into).collect();
        debug!(project_name = %self.project_name, ?tasks, "ProjectTaskTracker::set_tasks: called");
        self.tasks = Some(tasks.clone());
        self.logger.emit(&Event::ProjectMetadata {
            project_name: self.project_name.clone(),
            project_type: self.project_type.clone(),
            tasks_to_run: tasks,
        })?;
        Ok(())
    }

    pub fn start_task(&self, task_name: &str) -> Result<()> {
        self.report(
            task_name,
            TaskStatusKind::Start,
            Level::Info,
            format!("{}: Running task {task_name}...", self.project_name),
        )
    }

    pub fn end_task(&self, task_name: &str) -> Result<()> {
        self.report(
            task_name,
            TaskStatusKind::End,
            Level::Verbose,
            format!("{}: Finished task {task_name}", self.project_name),
        )
    }

    fn report(&self, task_name: &str, status: TaskStatusKind, level: Level, fallback: String) -> Result<()> {
        debug!(project_name = %self.project_name, %task_name, %status, "ProjectTaskTracker::report");
        if !self.tasks().iter().any(|t| t == task_name) {
            return Err(Error::UnknownTask {
                project: self.project_name.clone(),
                task: task_name.to_string(),
            });
        }
        let observed = self.logger.emit(&Event::ProjectStatus {
            level,
            project_name: self.project_name.clone(),
            project_type: self.project_type.clone(),
            task_name: task_name.to_string(),
            status,
        })?;
        if !observed {
            self.logger.write_direct(level, &fallback)?;
        }
        Ok(())
    }
}
