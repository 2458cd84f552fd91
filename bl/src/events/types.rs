//! Event types for build logging
//!
//! These events are the whole vocabulary between producers and presenters:
//! - Log messages (`log`)
//! - Build lifecycle (`build-metadata`, `build-status`)
//! - Project task lifecycle (`project-metadata`, `project-status`)
//! - Presenter shutdown (`stop-signal`)

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::level::Level;

/// Name under which an event is published and subscribed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventName {
    Log,
    BuildMetadata,
    BuildStatus,
    ProjectMetadata,
    ProjectStatus,
    StopSignal,
}

impl EventName {
    /// Every event name, in subscription order
    pub const ALL: [EventName; 6] = [
        EventName::Log,
        EventName::BuildMetadata,
        EventName::ProjectMetadata,
        EventName::BuildStatus,
        EventName::ProjectStatus,
        EventName::StopSignal,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Log => "log",
            Self::BuildMetadata => "build-metadata",
            Self::BuildStatus => "build-status",
            Self::ProjectMetadata => "project-metadata",
            Self::ProjectStatus => "project-status",
            Self::StopSignal => "stop-signal",
        }
    }
}

impl fmt::Display for EventName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Core event enum - one variant per event name
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Event {
    /// A leveled log message
    Log(LogEvent),
    /// The set of projects taking part in a build
    BuildMetadata { projects_to_build: Vec<String> },
    /// A project build changed phase
    BuildStatus {
        level: Level,
        project_name: String,
        project_type: String,
        status: BuildStatusKind,
    },
    /// The set of tasks a project build will run
    ProjectMetadata {
        project_name: String,
        project_type: String,
        tasks_to_run: Vec<String>,
    },
    /// A task within a project build changed phase
    ProjectStatus {
        level: Level,
        project_name: String,
        project_type: String,
        task_name: String,
        status: TaskStatusKind,
    },
    /// Ask every presenter to detach
    StopSignal,
}

impl Event {
    /// The name this event is published under
    pub fn name(&self) -> EventName {
        match self {
            Event::Log(_) => EventName::Log,
            Event::BuildMetadata { .. } => EventName::BuildMetadata,
            Event::BuildStatus { .. } => EventName::BuildStatus,
            Event::ProjectMetadata { .. } => EventName::ProjectMetadata,
            Event::ProjectStatus { .. } => EventName::ProjectStatus,
            Event::StopSignal => EventName::StopSignal,
        }
    }

    /// The project this event refers to, if any
    pub fn project_name(&self) -> Option<&str> {
        match self {
            Event::Log(log) => log.project_name.as_deref(),
            Event::BuildStatus { project_name, .. }
            | Event::ProjectMetadata { project_name, .. }
            | Event::ProjectStatus { project_name, .. } => Some(project_name),
            Event::BuildMetadata { .. } | Event::StopSignal => None,
        }
    }
}

/// Payload of a `log` event
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEvent {
    pub level: Level,
    pub message: String,
    pub module_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_name: Option<String>,
}

impl LogEvent {
    /// Log event without project or task context
    pub fn new(level: Level, module_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            module_name: module_name.into(),
            project_name: None,
            project_type: None,
            task_name: None,
        }
    }
}

/// Status carried by a `build-status` event
///
/// Unrecognised values are kept verbatim so that newer producers can talk to
/// older presenters.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum BuildStatusKind {
    Start,
    End,
    Skip,
    Unknown(String),
}

impl BuildStatusKind {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Start => "project-build-start",
            Self::End => "project-build-end",
            Self::Skip => "project-build-skip",
            Self::Unknown(other) => other,
        }
    }
}

impl From<String> for BuildStatusKind {
    fn from(value: String) -> Self {
        match value.as_str() {
            "project-build-start" => Self::Start,
            "project-build-end" => Self::End,
            "project-build-skip" => Self::Skip,
            _ => Self::Unknown(value),
        }
    }
}

impl From<BuildStatusKind> for String {
    fn from(value: BuildStatusKind) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for BuildStatusKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status carried by a `project-status` event
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TaskStatusKind {
    Start,
    End,
    Unknown(String),
}

impl TaskStatusKind {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Start => "task-start",
            Self::End => "task-end",
            Self::Unknown(other) => other,
        }
    }
}

impl From<String> for TaskStatusKind {
    fn from(value: String) -> Self {
        match value.as_str() {
            "task-start" => Self::Start,
            "task-end" => Self::End,
            _ => Self::Unknown(value),
        }
    }
}

impl From<TaskStatusKind> for String {
    fn from(value: TaskStatusKind) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for TaskStatusKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_names() {
        assert_eq!(Event::StopSignal.name(), EventName::StopSignal);
        assert_eq!(
            Event::BuildMetadata {
                projects_to_build: vec![]
            }
            .name()
            .to_string(),
            "build-metadata"
        );
    }

    #[test]
    fn test_unknown_status_is_preserved() {
        let status = BuildStatusKind::from("project-build-pause".to_string());
        assert_eq!(status, BuildStatusKind::Unknown("project-build-pause".to_string()));
        assert_eq!(status.to_string(), "project-build-pause");
        assert_eq!(TaskStatusKind::from("task-end".to_string()), TaskStatusKind::End);
    }

    #[test]
    fn test_status_event_wire_shape() {
        let event: Event = serde_json::from_value(serde_json::json!({
            "type": "build-status",
            "level": "info",
            "project_name": "project.a",
            "project_type": "application",
            "status": "project-build-retry"
        }))
        .unwrap();

        assert_eq!(event.project_name(), Some("project.a"));
        match event {
            Event::BuildStatus { level, status, .. } => {
                assert_eq!(level, Level::Info);
                assert_eq!(status, BuildStatusKind::Unknown("project-build-retry".to_string()));
            }
            _ => panic!("Expected BuildStatus event"),
        }
    }
}
