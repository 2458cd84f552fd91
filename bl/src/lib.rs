//! buildlog - structured logging with build progress tracking
//!
//! Producers emit leveled messages and build lifecycle events onto an
//! in-process event bus. A [`ProgressPresenter`] consumes them, tracks every
//! project and task through its lifecycle, validates that transitions are
//! legal and renders ordered lines, optionally with a live progress bar.
//! When no presenter is attached, producers write straight to the output
//! stream.
//!
//! # Core Concepts
//!
//! - **Fire and forget**: producers never see presenter state, only errors
//!   returned from `publish`
//! - **Check then set**: an illegal event never mutates presenter state
//! - **Forward compatible**: unknown status values are reported, not rejected
//! - **Threshold at render time**: level gating reads the threshold when a
//!   line is written
//!
//! # Modules
//!
//! - [`level`] - Levels and the shared threshold
//! - [`events`] - Event types and the synchronous event bus
//! - [`loggers`] - Logger, BuildTracker and ProjectTaskTracker
//! - [`presenter`] - Progress presenter state machine
//! - [`output`] - Output streams and progress indicators
//! - [`bridge`] - Adapter for the `log` crate
//! - [`config`] - Configuration types and loading
//! - [`cli`] - Command-line interface

pub mod bridge;
pub mod cli;
pub mod config;
pub mod context;
pub mod error;
pub mod events;
pub mod format;
pub mod level;
pub mod loggers;
pub mod output;
pub mod presenter;
pub mod testing;

// Re-export commonly used types
pub use config::{ColorMode, Config};
pub use context::LogContext;
pub use error::{Conflict, Error, Result};
pub use events::{BuildStatusKind, Event, EventBus, EventName, LogEvent, SubscriptionId, TaskStatusKind};
pub use format::{Message, MessagePart, inspect};
pub use level::{DEFAULT_LEVEL, LEVEL_ENV_VAR, Level, LevelRegistry};
pub use loggers::{BuildTracker, Logger, ProjectTaskTracker, Scope};
pub use output::{BarIndicator, Output, ProgressIndicator, StderrOutput};
pub use presenter::{ProgressModel, ProgressPresenter, ProjectPhase, TaskPhase};
