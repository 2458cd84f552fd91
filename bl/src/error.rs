//! Error types for the logging facade
//!
//! Every failure is raised synchronously where it is detected. Presenter-side
//! validation errors travel back through [`EventBus::publish`](crate::events::EventBus::publish)
//! to whichever producer published the offending event.

use std::fmt;

use thiserror::Error;

/// Which prior phase made a lifecycle event illegal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Conflict {
    /// The project or task was already started
    AlreadyStarted,
    /// The project build was already skipped
    AlreadySkipped,
    /// The project build or task execution already ended
    AlreadyEnded,
    /// An end event arrived without a preceding start
    NotStarted,
}

impl fmt::Display for Conflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlreadyStarted => write!(f, "already started"),
            Self::AlreadySkipped => write!(f, "already skipped"),
            Self::AlreadyEnded => write!(f, "already ended"),
            Self::NotStarted => write!(f, "not started yet"),
        }
    }
}

/// Errors from logging, tracking and presenting
#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Unknown log level \"{0}\"")]
    UnknownLevel(String),

    #[error("Unknown project {0}")]
    UnknownProject(String),

    #[error("Unknown task {task} for project {project}")]
    UnknownTask { project: String, task: String },

    #[error("Unexpected {event} event for {subject}: {conflict}")]
    InvalidTransition {
        event: &'static str,
        subject: String,
        conflict: Conflict,
    },

    #[error("Failed to write to output: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to install log bridge: {0}")]
    Bridge(#[from] log::SetLoggerError),
}

impl Error {
    /// The conflicting prior phase, if this is a transition error
    pub fn conflict(&self) -> Option<Conflict> {
        match self {
            Self::InvalidTransition { conflict, .. } => Some(*conflict),
            _ => None,
        }
    }
}

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;
