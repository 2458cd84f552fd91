//! Shared logging context
//!
//! A [`LogContext`] bundles the three collaborators every component needs:
//! the event bus, the level threshold and the output stream. It is cheap to
//! clone; clones share all three.

use std::sync::Arc;

use tracing::debug;

use crate::error::Result;
use crate::events::{Event, EventBus};
use crate::level::{Level, LevelRegistry};
use crate::loggers::{BuildTracker, Logger, ProjectTaskTracker};
use crate::output::{Output, StderrOutput};

#[derive(Clone)]
pub struct LogContext {
    bus: Arc<EventBus>,
    levels: LevelRegistry,
    output: Arc<dyn Output>,
}

impl LogContext {
    /// Context with a fresh event bus
    pub fn new(levels: LevelRegistry, output: Arc<dyn Output>) -> Self {
        debug!("LogContext::new: called");
        Self {
            bus: Arc::new(EventBus::new()),
            levels,
            output,
        }
    }

    /// Context sharing an existing event bus
    pub fn with_bus(bus: Arc<EventBus>, levels: LevelRegistry, output: Arc<dyn Output>) -> Self {
        Self { bus, levels, output }
    }

    /// Threshold from the environment, output to stderr
    pub fn from_env() -> Self {
        Self::new(LevelRegistry::from_env(), Arc::new(StderrOutput::new()))
    }

    pub fn bus(&self) -> &Arc<EventBus> {
        &self.bus
    }

    pub fn levels(&self) -> &LevelRegistry {
        &self.levels
    }

    pub fn output(&self) -> &Arc<dyn Output> {
        &self.output
    }

    /// Publish an event, returning whether anyone listened
    pub fn publish(&self, event: &Event) -> Result<bool> {
        self.bus.publish(event)
    }

    /// Logger for a module, e.g. `builder:tasks:minify`
    pub fn logger(&self, module_name: &str) -> Result<Logger> {
        Logger::new(self, module_name)
    }

    /// Tracker for a multi-project build
    pub fn build_tracker(&self, module_name: &str) -> Result<BuildTracker> {
        BuildTracker::new(self, module_name)
    }

    /// Tracker for the tasks of one project build
    pub fn project_task_tracker(
        &self,
        module_name: &str,
        project_name: &str,
        project_type: &str,
    ) -> Result<ProjectTaskTracker> {
        ProjectTaskTracker::new(self, module_name, project_name, project_type)
    }

    pub fn is_level_enabled(&self, name: &str) -> Result<bool> {
        self.levels.is_level_enabled(name)
    }

    pub fn set_level(&self, name: &str) -> Result<()> {
        self.levels.set_level(name)
    }

    pub fn level(&self) -> Result<Level> {
        self.levels.level()
    }
}

impl Default for LogContext {
    fn default() -> Self {
        Self::from_env()
    }
}
