//! Producers: plain loggers and build/task trackers

mod build;
mod logger;
mod project_build;

pub use build::BuildTracker;
pub use logger::{Logger, Scope};
pub use project_build::ProjectTaskTracker;
