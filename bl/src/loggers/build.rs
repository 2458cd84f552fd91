//! Build tracker
//!
//! Announces the projects of a build run (`build-metadata`) and each
//! project's build phase (`build-status`). The tracker keeps its own copy of
//! the project list and rejects projects it never announced, independently of
//! whatever a presenter might know.

use tracing::debug;

use crate::context::LogContext;
use crate::error::{Error, Result};
use crate::events::{BuildStatusKind, Event};
use crate::level::Level;

use super::logger::Logger;

/// Reports the progress of a multi-project build
pub struct BuildTracker {
    logger: Logger,
    projects: Option<Vec<String>>,
}

impl BuildTracker {
    pub fn new(ctx: &LogContext, module_name: &str) -> Result<Self> {
        debug!(%module_name, "BuildTracker::new: called");
        Ok(Self {
            logger: Logger::new(ctx, module_name)?,
            projects: None,
        })
    }

    /// Logger for plain messages from the same module
    pub fn logger(&self) -> &Logger {
        &self.logger
    }

    /// Projects announced by the last [`set_projects`](Self::set_projects)
    pub fn projects(&self) -> &[String] {
        self.projects.as_deref().unwrap_or_default()
    }

    /// Announce the projects taking part in this build
    pub fn set_projects<I, S>(&mut self, projects: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let projects: Vec<String> = projects.into_iter().map(Into::into).collect();
        debug!(?projects, "BuildTracker::set_projects: called");
        if projects.is_empty() {
            return Err(Error::InvalidArgument(
                "BuildTracker::set_projects: missing or empty projects list".to_string(),
            ));
        }
        self.projects = Some(projects.clone());
        self.logger.emit(&Event::BuildMetadata {
            projects_to_build: projects,
        })?;
        Ok(())
    }

    pub fn start_project_build(&self, project_name: &str, project_type: &str) -> Result<()> {
        self.report(
            "start_project_build",
            project_name,
            project_type,
            BuildStatusKind::Start,
            Level::Info,
            format!("Building {project_type} project {project_name}..."),
        )
    }

    pub fn end_project_build(&self, project_name: &str, project_type: &str) -> Result<()> {
        self.report(
            "end_project_build",
            project_name,
            project_type,
            BuildStatusKind::End,
            Level::Verbose,
            format!("Finished building {project_type} project {project_name}"),
        )
    }

    pub fn skip_project_build(&self, project_name: &str, project_type: &str) -> Result<()> {
        self.report(
            "skip_project_build",
            project_name,
            project_type,
            BuildStatusKind::Skip,
            Level::Info,
            format!("Skipping build of {project_type} project {project_name}"),
        )
    }

    fn report(
        &self,
        operation: &str,
        project_name: &str,
        project_type: &str,
        status: BuildStatusKind,
        level: Level,
        fallback: String,
    ) -> Result<()> {
        debug!(%operation, %project_name, %project_type, %status, "BuildTracker::report");
        if !self.projects().iter().any(|p| p == project_name) {
            return Err(Error::UnknownProject(project_name.to_string()));
        }
        if project_type.is_empty() {
            return Err(Error::InvalidArgument(format!(
                "BuildTracker::{operation}: missing project type"
            )));
        }
        let observed = self.logger.emit(&Event::BuildStatus {
            level,
            project_name: project_name.to_string(),
            project_type: project_type.to_string(),
            status,
        })?;
        if !observed {
            self.logger.write_direct(level, &fallback)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventName;
    use crate::level::LevelRegistry;
    use crate::testing::MemoryOutput;
    use std::sync::{Arc, Mutex};

    fn context() -> (LogContext, MemoryOutput) {
        let output = MemoryOutput::new();
        let ctx = LogContext::new(LevelRegistry::new(), Arc::new(output.clone()));
        (ctx, output)
    }

    fn capture(ctx: &LogContext, name: EventName) -> Arc<Mutex<Vec<Event>>> {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        ctx.bus().subscribe(name, move |event| {
            sink.lock().unwrap().push(event.clone());
            Ok(())
        });
        events
    }

    #[test]
    fn test_set_projects_publishes_metadata() {
        let (ctx, _) = context();
        let events = capture(&ctx, EventName::BuildMetadata);
        let mut tracker = BuildTracker::new(&ctx, "build").unwrap();

        tracker.set_projects(["project.a", "project.b"]).unwrap();

        assert_eq!(tracker.projects(), ["project.a", "project.b"]);
        assert_eq!(
            *events.lock().unwrap(),
            vec![Event::BuildMetadata {
                projects_to_build: vec!["project.a".to_string(), "project.b".to_string()]
            }]
        );
    }

    #[test]
    fn test_set_projects_rejects_empty_list() {
        let (ctx, _) = context();
        let mut tracker = BuildTracker::new(&ctx, "build").unwrap();
        let err = tracker.set_projects(Vec::<String>::new()).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }

    #[test]
    fn test_unknown_project_is_rejected() {
        let (ctx, _) = context();
        let mut tracker = BuildTracker::new(&ctx, "build").unwrap();
        assert!(matches!(
            tracker.start_project_build("project.a", "application"),
            Err(Error::UnknownProject(_))
        ));

        tracker.set_projects(["project.a"]).unwrap();
        let err = tracker.skip_project_build("project.b", "application").unwrap_err();
        assert_eq!(err.to_string(), "Unknown project project.b");
    }

    #[test]
    fn test_missing_project_type_is_rejected() {
        let (ctx, _) = context();
        let mut tracker = BuildTracker::new(&ctx, "build").unwrap();
        tracker.set_projects(["project.a"]).unwrap();
        assert!(matches!(
            tracker.end_project_build("project.a", ""),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_status_events_carry_level() {
        let (ctx, output) = context();
        let events = capture(&ctx, EventName::BuildStatus);
        let mut tracker = BuildTracker::new(&ctx, "build").unwrap();
        tracker.set_projects(["project.a"]).unwrap();

        tracker.start_project_build("project.a", "application").unwrap();
        tracker.end_project_build("project.a", "application").unwrap();

        let events = events.lock().unwrap();
        assert_eq!(
            events[0],
            Event::BuildStatus {
                level: Level::Info,
                project_name: "project.a".to_string(),
                project_type: "application".to_string(),
                status: BuildStatusKind::Start,
            }
        );
        assert!(matches!(
            events[1],
            Event::BuildStatus {
                level: Level::Verbose,
                status: BuildStatusKind::End,
                ..
            }
        ));
        assert!(output.lines().is_empty());
    }

    #[test]
    fn test_direct_output_without_subscribers() {
        let (ctx, output) = context();
        let mut tracker = BuildTracker::new(&ctx, "build").unwrap();
        tracker.set_projects(["p", "q"]).unwrap();

        tracker.start_project_build("p", "type").unwrap();
        tracker.end_project_build("p", "type").unwrap();
        tracker.skip_project_build("q", "type").unwrap();

        assert_eq!(
            output.lines(),
            vec!["[info] Building type project p...", "[info] Skipping build of type project q"]
        );

        ctx.set_level("verbose").unwrap();
        tracker.end_project_build("p", "type").unwrap();
        assert_eq!(output.lines()[2], "[verbose] Finished building type project p");
    }
}
