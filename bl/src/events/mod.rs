//! Event bus connecting producers to presenters
//!
//! Producers ([`Logger`](crate::Logger), [`BuildTracker`](crate::BuildTracker),
//! [`ProjectTaskTracker`](crate::ProjectTaskTracker)) publish fire-and-forget.
//! Presenters subscribe per event name and rebuild their view purely from the
//! event stream.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────┐  ┌──────────────┐  ┌────────────────────┐
//! │  Logger  │  │ BuildTracker │  │ ProjectTaskTracker │
//! └────┬─────┘  └──────┬───────┘  └─────────┬──────────┘
//!      │ log           │ build-metadata     │ project-metadata
//!      │               │ build-status       │ project-status
//!      ↓               ↓                    ↓
//! ┌─────────────────────────────────────────────────────┐
//! │                      EVENT BUS                      │
//! │        (synchronous, per-name subscriptions)        │
//! └─────────────────────────┬───────────────────────────┘
//!                           ↓
//!                 ┌───────────────────┐
//!                 │ ProgressPresenter │ → output stream / progress bar
//!                 └───────────────────┘
//! ```
//!
//! When `publish` reports that nobody listened, producers write their message
//! straight to the output stream instead.

mod bus;
mod types;

pub use bus::{EventBus, Handler, SubscriptionId, create_event_bus};
pub use types::{BuildStatusKind, Event, EventName, LogEvent, TaskStatusKind};
