//! Progress presenter
//!
//! The presenter is the single consumer of the event bus. It rebuilds a
//! global view of the build purely from events: which projects exist, which
//! phase each project and task is in, and how far along the build is. Every
//! accepted event is rendered as one line, either through the live progress
//! indicator or straight to the output stream.
//!
//! Validation failures (unknown project or task, illegal transitions) are
//! returned from the handler and therefore surface at the `publish` call of
//! whichever producer sent the event. State is only touched once an event has
//! been validated and its threshold gating resolved.

mod indicator;
mod render;
mod state;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, info};

use crate::context::LogContext;
use crate::error::{Conflict, Error, Result};
use crate::events::{BuildStatusKind, Event, EventName, LogEvent, SubscriptionId, TaskStatusKind};
use crate::level::Level;

pub use indicator::{BoxedIndicator, IndicatorPhase, IndicatorSlot};
pub use state::{
    Arena, BuildSet, ProgressModel, ProjectPhase, ProjectState, StartIndexed, TaskPhase, TaskSet, TaskState,
};

#[derive(Default)]
struct PresenterState {
    build: BuildSet,
    progress: ProgressModel,
    indicator: IndicatorSlot,
}

struct Inner {
    ctx: LogContext,
    state: Mutex<PresenterState>,
    subscriptions: Mutex<Vec<SubscriptionId>>,
    show_progress: AtomicBool,
}

/// Renders build progress from the event stream
///
/// Clones share the same state and subscriptions.
#[derive(Clone)]
pub struct ProgressPresenter {
    inner: Arc<Inner>,
}

impl ProgressPresenter {
    /// Create a detached presenter; call [`enable`](Self::enable) to attach it
    pub fn new(ctx: &LogContext) -> Self {
        debug!("ProgressPresenter::new: called");
        Self {
            inner: Arc::new(Inner {
                ctx: ctx.clone(),
                state: Mutex::new(PresenterState::default()),
                subscriptions: Mutex::new(Vec::new()),
                show_progress: AtomicBool::new(true),
            }),
        }
    }

    /// Create a presenter and attach it to the context's bus
    pub fn init(ctx: &LogContext) -> Self {
        let presenter = Self::new(ctx);
        presenter.enable();
        presenter
    }

    /// Ask every presenter attached to the context's bus to detach
    pub fn stop(ctx: &LogContext) -> Result<bool> {
        info!("ProgressPresenter::stop: publishing stop signal");
        ctx.publish(&Event::StopSignal)
    }

    /// Subscribe to every event name; enabling twice is a no-op
    pub fn enable(&self) {
        let mut subscriptions = self.inner.lock_subscriptions();
        if !subscriptions.is_empty() {
            debug!("ProgressPresenter::enable: already enabled");
            return;
        }
        for name in EventName::ALL {
            let inner = Arc::clone(&self.inner);
            let id = self.inner.ctx.bus().subscribe(name, move |event| inner.handle(event));
            subscriptions.push(id);
        }
        debug!(count = subscriptions.len(), "ProgressPresenter::enable: subscribed");
    }

    /// Detach from the bus and drain the indicator
    pub fn disable(&self) {
        self.inner.disable();
    }

    pub fn is_enabled(&self) -> bool {
        !self.inner.lock_subscriptions().is_empty()
    }

    /// Allow or forbid the live progress indicator
    pub fn set_show_progress(&self, show: bool) {
        debug!(show, "ProgressPresenter::set_show_progress: called");
        self.inner.show_progress.store(show, Ordering::SeqCst);
        if !show {
            self.inner.lock_state().indicator.clear();
        }
    }

    /// Forget every project and drain the indicator, ready for a new build
    pub fn reset(&self) {
        debug!("ProgressPresenter::reset: called");
        let mut state = self.inner.lock_state();
        state.indicator.clear();
        state.build = BuildSet::default();
        state.progress = ProgressModel::default();
    }

    /// Feed one event directly, bypassing the bus
    pub fn handle(&self, event: &Event) -> Result<()> {
        self.inner.handle(event)
    }

    /// Current completion metric
    pub fn progress(&self) -> ProgressModel {
        self.inner.lock_state().progress
    }

    /// Snapshot of every known project
    pub fn build_set(&self) -> BuildSet {
        self.inner.lock_state().build.clone()
    }

    /// Snapshot of one project
    pub fn project(&self, name: &str) -> Option<ProjectState> {
        self.inner.lock_state().build.get(name).cloned()
    }

    pub fn indicator_phase(&self) -> IndicatorPhase {
        self.inner.lock_state().indicator.phase()
    }
}

/// Threshold-dependent decisions for one event
///
/// Resolved before any state is committed, so a threshold that fails to
/// parse rejects the event without moving the presenter.
#[derive(Debug, Clone, Copy)]
struct Gate {
    level: Level,
    line: bool,
    indicator: bool,
}

impl Inner {
    fn lock_state(&self) -> MutexGuard<'_, PresenterState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_subscriptions(&self) -> MutexGuard<'_, Vec<SubscriptionId>> {
        self.subscriptions.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn disable(&self) {
        let ids = std::mem::take(&mut *self.lock_subscriptions());
        for id in &ids {
            self.ctx.bus().unsubscribe(*id);
        }
        let mut state = self.lock_state();
        let drained = state.indicator.clear();
        debug!(
            unsubscribed = ids.len(),
            drained,
            lifetime_drained = state.indicator.drained(),
            "ProgressPresenter::disable"
        );
    }

    fn handle(&self, event: &Event) -> Result<()> {
        match event {
            Event::Log(log) => self.on_log(log),
            Event::BuildMetadata { projects_to_build } => self.on_build_metadata(projects_to_build),
            Event::BuildStatus {
                level,
                project_name,
                project_type,
                status,
            } => self.on_build_status(*level, project_name, project_type, status),
            Event::ProjectMetadata {
                project_name,
                project_type,
                tasks_to_run,
            } => self.on_project_metadata(project_name, project_type, tasks_to_run),
            Event::ProjectStatus {
                level,
                project_name,
                project_type,
                task_name,
                status,
            } => self.on_project_status(*level, project_name, project_type, task_name, status),
            Event::StopSignal => {
                debug!("ProgressPresenter: stop signal received");
                self.disable();
                Ok(())
            }
        }
    }

    fn on_log(&self, log: &LogEvent) -> Result<()> {
        let gate = self.gate(log.level)?;
        let mut state = self.lock_state();
        let output = self.ctx.output().as_ref();
        let label = render::scope_label(
            output,
            &log.module_name,
            log.project_name.as_deref(),
            log.project_type.as_deref(),
            log.task_name.as_deref(),
        );
        self.write(&mut state, gate, &format!("{label} {}", log.message))
    }

    fn on_build_metadata(&self, projects: &[String]) -> Result<()> {
        debug!(?projects, "ProgressPresenter::on_build_metadata");
        let allowed = self.indicator_allowed()?;
        let mut state = self.lock_state();
        let state = &mut *state;
        state.build.register_projects(projects);
        state.progress.recompute_total(&state.build);
        self.sync_total(state, allowed);
        Ok(())
    }

    fn on_project_metadata(&self, project_name: &str, project_type: &str, tasks: &[String]) -> Result<()> {
        debug!(%project_name, ?tasks, "ProgressPresenter::on_project_metadata");
        let mut state = self.lock_state();
        let state = &mut *state;
        let project = state
            .build
            .get_mut(project_name)
            .ok_or_else(|| Error::UnknownProject(project_name.to_string()))?;
        let allowed = self.indicator_allowed()?;

        project.project_type = Some(project_type.to_string());
        project.register_tasks(tasks);
        state.progress.recompute_total(&state.build);
        self.sync_total(state, allowed);
        Ok(())
    }

    fn on_build_status(
        &self,
        level: Level,
        project_name: &str,
        project_type: &str,
        status: &BuildStatusKind,
    ) -> Result<()> {
        debug!(%project_name, %status, "ProgressPresenter::on_build_status");
        let output = self.ctx.output().as_ref();
        let mut state = self.lock_state();
        let state = &mut *state;
        let next_index = state.build.next_start_index();
        let project_count = state.build.len();
        let weight = state.progress.project_weight;

        let project = state
            .build
            .get_mut(project_name)
            .ok_or_else(|| Error::UnknownProject(project_name.to_string()))?;
        let (event, transition) = match status {
            BuildStatusKind::Start => ("project-build-start", project.phase.start()),
            BuildStatusKind::End => ("project-build-end", project.phase.end()),
            BuildStatusKind::Skip => ("project-build-skip", project.phase.skip()),
            BuildStatusKind::Unknown(other) => {
                let gate = self.gate(Level::Verbose)?;
                let text = format!("Received unknown build-status {other} for project {project_name}");
                return self.write(state, gate, &text);
            }
        };
        let phase = transition.map_err(|conflict| invalid(event, format!("project {project_name}"), conflict))?;
        let gate = self.gate(level)?;

        project.phase = phase;
        project.project_type = Some(project_type.to_string());
        if !matches!(status, BuildStatusKind::End) && project.start_index.is_none() {
            project.start_index = Some(next_index);
        }
        let index = project.start_index.unwrap_or(next_index);
        let task_count = project.tasks.len() as u64;
        debug!(%project_name, ?phase, terminal = phase.is_terminal(), index, "ProgressPresenter: project transition");

        let message = match status {
            BuildStatusKind::Start => {
                let text = render::indicator_message(project_type, project_name);
                if let Some(indicator) = self.indicator(&mut state.indicator, state.progress, gate.indicator) {
                    indicator.set_message(&text);
                }
                render::project_started(output, project_type, project_name)
            }
            BuildStatusKind::End => {
                self.complete(state, weight, gate.indicator);
                render::project_ended(output, project_type, project_name)
            }
            _ => {
                self.complete(state, weight + task_count, gate.indicator);
                render::project_skipped(output, project_type, project_name)
            }
        };
        let position = render::project_position(output, index, project_count);
        self.write(state, gate, &format!("{position}: {message}"))
    }

    fn on_project_status(
        &self,
        level: Level,
        project_name: &str,
        project_type: &str,
        task_name: &str,
        status: &TaskStatusKind,
    ) -> Result<()> {
        debug!(%project_name, %task_name, %status, "ProgressPresenter::on_project_status");
        let output = self.ctx.output().as_ref();
        let mut state = self.lock_state();
        let state = &mut *state;

        let project = state
            .build
            .get_mut(project_name)
            .ok_or_else(|| Error::UnknownProject(project_name.to_string()))?;
        let next_index = project.tasks.next_start_index();
        let task_count = project.tasks.len();
        let task = project.tasks.get_mut(task_name).ok_or_else(|| Error::UnknownTask {
            project: project_name.to_string(),
            task: task_name.to_string(),
        })?;
        let (event, transition) = match status {
            TaskStatusKind::Start => ("task-start", task.phase.start()),
            TaskStatusKind::End => ("task-end", task.phase.end()),
            TaskStatusKind::Unknown(other) => {
                let gate = self.gate(Level::Verbose)?;
                let text = format!("Received unknown project-build-status {other} for project {project_name}");
                return self.write(state, gate, &text);
            }
        };
        let phase = transition.map_err(|conflict| {
            invalid(event, format!("task {task_name} of project {project_name}"), conflict)
        })?;
        let gate = self.gate(level)?;
        let verbose = self.ctx.levels().is_enabled(Level::Verbose)?;

        task.phase = phase;
        let index = *task.start_index.get_or_insert(next_index);
        project.project_type = Some(project_type.to_string());

        let message = match status {
            TaskStatusKind::End => {
                self.complete(state, 1, gate.indicator);
                render::task_ended(output, task_name)
            }
            _ => render::task_started(output, task_name),
        };
        let position = if verbose {
            format!("{} ", render::task_position(output, index, task_count))
        } else {
            String::new()
        };
        let project_label = render::scope_label(output, project_name, None, None, None);
        self.write(state, gate, &format!("{project_label} {position}{message}"))
    }

    /// Add completed units, advancing the indicator and draining it at parity
    fn complete(&self, state: &mut PresenterState, units: u64, allowed: bool) {
        if let Some(indicator) = self.indicator(&mut state.indicator, state.progress, allowed) {
            indicator.increment(units);
        }
        state.progress.completed_units += units;
        debug!(units, fraction = state.progress.fraction(), "ProgressPresenter::complete");
        if state.indicator.drain_if_complete() {
            debug!(
                completed_units = state.progress.completed_units,
                "ProgressPresenter: indicator reached parity, next render recreates it"
            );
        }
    }

    /// Bring a live indicator's total in line with the model
    fn sync_total(&self, state: &mut PresenterState, allowed: bool) {
        let total = state.progress.total_units;
        if let Some(indicator) = self.indicator(&mut state.indicator, state.progress, allowed) {
            if indicator.total() != total {
                indicator.set_total(total);
            }
        }
    }

    /// Resolve line and indicator gating for an event at `level`
    fn gate(&self, level: Level) -> Result<Gate> {
        let line = level.accepts_messages() && self.ctx.levels().is_enabled(level)?;
        Ok(Gate {
            level,
            line,
            indicator: self.indicator_allowed()?,
        })
    }

    fn indicator_allowed(&self) -> Result<bool> {
        let levels = self.ctx.levels();
        Ok(self.show_progress.load(Ordering::SeqCst)
            && self.ctx.output().is_terminal()
            && !levels.is_enabled(Level::Verbose)?
            && levels.level()? != Level::Silent)
    }

    /// The indicator to render through
    ///
    /// Acknowledges a pending drain first. A new indicator is only created,
    /// from `progress`, while the build still has outstanding units. When the
    /// indicator is not `allowed` any live one is cleared.
    fn indicator<'a>(
        &self,
        slot: &'a mut IndicatorSlot,
        progress: ProgressModel,
        allowed: bool,
    ) -> Option<&'a mut BoxedIndicator> {
        if slot.on_drained() {
            debug!("ProgressPresenter: previous indicator drained");
        }
        if !allowed {
            slot.clear();
            return None;
        }
        if progress.total_units == 0 || progress.is_complete() {
            return slot.active_mut();
        }
        let output = self.ctx.output();
        Some(slot.get_or_create(|| {
            output.progress_indicator(progress.total_units, progress.completed_units)
        }))
    }

    /// Write one line when the gate lets it through
    fn write(&self, state: &mut PresenterState, gate: Gate, text: &str) -> Result<()> {
        if !gate.line {
            return Ok(());
        }
        let line = render::line(self.ctx.output().as_ref(), gate.level, text);
        match self.indicator(&mut state.indicator, state.progress, gate.indicator) {
            Some(indicator) => indicator.println(&line),
            None => self.ctx.output().write_line(&line)?,
        }
        Ok(())
    }
}

fn invalid(event: &'static str, subject: String, conflict: Conflict) -> Error {
    Error::InvalidTransition {
        event,
        subject,
        conflict,
    }
}
