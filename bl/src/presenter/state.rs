//! Presenter-side model of a build run
//!
//! Projects live in an arena keyed by name; each project owns a nested arena
//! of its tasks. Entries are always looked up by name and never removed, so
//! start indices stay unique for the lifetime of a build set.

use std::collections::HashMap;

use tracing::debug;

use crate::error::Conflict;

/// Lifecycle of a project build
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProjectPhase {
    #[default]
    NotStarted,
    Started,
    Skipped,
    Ended,
}

impl ProjectPhase {
    pub fn start(self) -> Result<Self, Conflict> {
        match self {
            Self::NotStarted => Ok(Self::Started),
            Self::Started => Err(Conflict::AlreadyStarted),
            Self::Skipped => Err(Conflict::AlreadySkipped),
            Self::Ended => Err(Conflict::AlreadyEnded),
        }
    }

    pub fn end(self) -> Result<Self, Conflict> {
        match self {
            Self::Started => Ok(Self::Ended),
            Self::NotStarted => Err(Conflict::NotStarted),
            Self::Skipped => Err(Conflict::AlreadySkipped),
            Self::Ended => Err(Conflict::AlreadyEnded),
        }
    }

    pub fn skip(self) -> Result<Self, Conflict> {
        match self {
            Self::NotStarted => Ok(Self::Skipped),
            Self::Started => Err(Conflict::AlreadyStarted),
            Self::Skipped => Err(Conflict::AlreadySkipped),
            Self::Ended => Err(Conflict::AlreadyEnded),
        }
    }

    /// Skipped and Ended accept no further events
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Skipped | Self::Ended)
    }
}

/// Lifecycle of a task execution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TaskPhase {
    #[default]
    NotStarted,
    Started,
    Ended,
}

impl TaskPhase {
    pub fn start(self) -> Result<Self, Conflict> {
        match self {
            Self::NotStarted => Ok(Self::Started),
            Self::Started => Err(Conflict::AlreadyStarted),
            Self::Ended => Err(Conflict::AlreadyEnded),
        }
    }

    pub fn end(self) -> Result<Self, Conflict> {
        match self {
            Self::Started => Ok(Self::Ended),
            Self::NotStarted => Err(Conflict::NotStarted),
            Self::Ended => Err(Conflict::AlreadyEnded),
        }
    }
}

/// Entry that receives a display position when it starts
pub trait StartIndexed {
    fn start_index(&self) -> Option<usize>;
}

/// Insertion-ordered collection keyed by name
#[derive(Debug, Clone)]
pub struct Arena<T> {
    items: Vec<T>,
    keys: HashMap<String, usize>,
}

impl<T> Default for Arena<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            keys: HashMap::new(),
        }
    }
}

impl<T> Arena<T> {
    /// Insert unless the name is already present; returns whether inserted
    pub fn insert_with(&mut self, name: &str, create: impl FnOnce() -> T) -> bool {
        if self.keys.contains_key(name) {
            return false;
        }
        self.keys.insert(name.to_string(), self.items.len());
        self.items.push(create());
        true
    }

    pub fn get(&self, name: &str) -> Option<&T> {
        self.keys.get(name).map(|&i| &self.items[i])
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut T> {
        self.keys.get(name).map(|&i| &mut self.items[i])
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }
}

impl<T: StartIndexed> Arena<T> {
    /// One past the largest start index handed out so far
    pub fn next_start_index(&self) -> usize {
        self.items.iter().filter_map(StartIndexed::start_index).max().unwrap_or(0) + 1
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskState {
    pub name: String,
    pub phase: TaskPhase,
    pub start_index: Option<usize>,
}

impl StartIndexed for TaskState {
    fn start_index(&self) -> Option<usize> {
        self.start_index
    }
}

pub type TaskSet = Arena<TaskState>;

#[derive(Debug, Clone)]
pub struct ProjectState {
    pub name: String,
    /// Learned from the first status or metadata event naming a type
    pub project_type: Option<String>,
    pub phase: ProjectPhase,
    pub start_index: Option<usize>,
    pub tasks: TaskSet,
}

impl ProjectState {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            project_type: None,
            phase: ProjectPhase::NotStarted,
            start_index: None,
            tasks: TaskSet::default(),
        }
    }

    /// Register tasks not yet known; returns how many were added
    pub fn register_tasks<S: AsRef<str>>(&mut self, tasks: &[S]) -> usize {
        tasks
            .iter()
            .filter(|task| {
                let name = task.as_ref();
                self.tasks.insert_with(name, || TaskState {
                    name: name.to_string(),
                    phase: TaskPhase::NotStarted,
                    start_index: None,
                })
            })
            .count()
    }

    pub fn task(&self, name: &str) -> Option<&TaskState> {
        self.tasks.get(name)
    }
}

impl StartIndexed for ProjectState {
    fn start_index(&self) -> Option<usize> {
        self.start_index
    }
}

/// All projects registered for one build run
pub type BuildSet = Arena<ProjectState>;

impl BuildSet {
    /// Register projects not yet known; returns how many were added
    pub fn register_projects<S: AsRef<str>>(&mut self, projects: &[S]) -> usize {
        let added = projects
            .iter()
            .filter(|project| {
                let name = project.as_ref();
                self.insert_with(name, || ProjectState::new(name))
            })
            .count();
        debug!(added, total = self.len(), "BuildSet::register_projects");
        added
    }

    /// Number of tasks across every project
    pub fn task_count(&self) -> usize {
        self.iter().map(|p| p.tasks.len()).sum()
    }
}

/// Completion metric derived from a build set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProgressModel {
    pub total_units: u64,
    pub completed_units: u64,
    /// Units one project contributes on top of its tasks
    pub project_weight: u64,
}

impl ProgressModel {
    /// Recompute the total; a project weighs as much as there are projects
    pub fn recompute_total(&mut self, build: &BuildSet) {
        let projects = build.len() as u64;
        self.project_weight = projects;
        self.total_units = self.project_weight * projects + build.task_count() as u64;
        debug!(
            total_units = self.total_units,
            completed_units = self.completed_units,
            "ProgressModel::recompute_total"
        );
    }

    /// Completed share in `0.0..=1.0`
    pub fn fraction(&self) -> f64 {
        if self.total_units == 0 {
            return 0.0;
        }
        self.completed_units as f64 / self.total_units as f64
    }

    pub fn is_complete(&self) -> bool {
        self.total_units > 0 && self.completed_units >= self.total_units
    }
}
