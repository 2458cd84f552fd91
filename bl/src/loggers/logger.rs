//! Standard logger
//!
//! Turns a leveled message into a `log` event on the bus. When nobody is
//! subscribed, the message is written straight to the output stream instead,
//! provided its level passes the threshold.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::context::LogContext;
use crate::error::{Error, Result};
use crate::events::{Event, LogEvent};
use crate::format::Message;
use crate::level::Level;

/// Characters allowed in module names
static MODULE_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9a-zA-Z\-_:@./]+$").expect("module name pattern is valid"));

/// Project and task a logger reports for
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Scope {
    pub project_name: Option<String>,
    pub project_type: Option<String>,
    pub task_name: Option<String>,
}

impl Scope {
    /// Label used by the direct fallback: `type name` or `type name - task`
    fn fallback_label(&self) -> Option<String> {
        let (Some(name), Some(kind)) = (&self.project_name, &self.project_type) else {
            return None;
        };
        Some(match &self.task_name {
            Some(task) => format!("{kind} {name} - {task}"),
            None => format!("{kind} {name}"),
        })
    }
}

/// Emits leveled messages for one module
#[derive(Clone)]
pub struct Logger {
    ctx: LogContext,
    module_name: String,
    scope: Scope,
}

impl std::fmt::Debug for Logger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Logger")
            .field("module_name", &self.module_name)
            .field("scope", &self.scope)
            .finish_non_exhaustive()
    }
}

impl Logger {
    /// Create a logger; the module name may only contain `[0-9a-zA-Z-_:@./]`
    pub fn new(ctx: &LogContext, module_name: &str) -> Result<Self> {
        debug!(%module_name, "Logger::new: called");
        if module_name.is_empty() {
            return Err(Error::InvalidArgument("Missing module name".to_string()));
        }
        if !MODULE_NAME.is_match(module_name) {
            return Err(Error::InvalidArgument(format!("Invalid module name: {module_name}")));
        }
        Ok(Self {
            ctx: ctx.clone(),
            module_name: module_name.to_string(),
            scope: Scope::default(),
        })
    }

    /// Same module, reporting for a project
    pub fn for_project(&self, project_name: &str, project_type: &str) -> Self {
        let mut logger = self.clone();
        logger.scope = Scope {
            project_name: Some(project_name.to_string()),
            project_type: Some(project_type.to_string()),
            task_name: None,
        };
        logger
    }

    /// Same module and project, reporting for a task
    pub fn for_task(&self, task_name: &str) -> Self {
        let mut logger = self.clone();
        logger.scope.task_name = Some(task_name.to_string());
        logger
    }

    pub fn module_name(&self) -> &str {
        &self.module_name
    }

    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    pub fn context(&self) -> &LogContext {
        &self.ctx
    }

    /// Whether messages at `level` currently pass the threshold
    pub fn is_level_enabled(&self, level: Level) -> Result<bool> {
        self.ctx.levels().is_enabled(level)
    }

    /// Emit a message; `silent` never emits anything
    pub fn log(&self, level: Level, message: impl Into<Message>) -> Result<()> {
        if !level.accepts_messages() {
            debug!(module_name = %self.module_name, "Logger::log: silent level, dropping message");
            return Ok(());
        }
        let message = message.into().render();
        let event = Event::Log(LogEvent {
            level,
            message: message.clone(),
            module_name: self.module_name.clone(),
            project_name: self.scope.project_name.clone(),
            project_type: self.scope.project_type.clone(),
            task_name: self.scope.task_name.clone(),
        });
        if !self.emit(&event)? {
            let label = self.scope.fallback_label().unwrap_or_else(|| self.module_name.clone());
            self.write_direct(level, &format!("{label}: {message}"))?;
        }
        Ok(())
    }

    pub fn silly(&self, message: impl Into<Message>) -> Result<()> {
        self.log(Level::Silly, message)
    }

    pub fn verbose(&self, message: impl Into<Message>) -> Result<()> {
        self.log(Level::Verbose, message)
    }

    pub fn perf(&self, message: impl Into<Message>) -> Result<()> {
        self.log(Level::Perf, message)
    }

    pub fn info(&self, message: impl Into<Message>) -> Result<()> {
        self.log(Level::Info, message)
    }

    pub fn warn(&self, message: impl Into<Message>) -> Result<()> {
        self.log(Level::Warn, message)
    }

    pub fn error(&self, message: impl Into<Message>) -> Result<()> {
        self.log(Level::Error, message)
    }

    /// Publish an event, returning whether anyone listened
    pub(crate) fn emit(&self, event: &Event) -> Result<bool> {
        debug!(module_name = %self.module_name, event = %event.name(), "Logger::emit");
        self.ctx.publish(event)
    }

    /// Fallback output: `[level] text`, subject to the threshold
    pub(crate) fn write_direct(&self, level: Level, text: &str) -> Result<()> {
        if self.is_level_enabled(level)? {
            self.ctx.output().write_line(&format!("[{level}] {text}"))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventName;
    use crate::format::MessagePart;
    use crate::level::LevelRegistry;
    use crate::testing::MemoryOutput;
    use std::sync::{Arc, Mutex};

    fn context() -> (LogContext, MemoryOutput) {
        let output = MemoryOutput::new();
        let ctx = LogContext::new(LevelRegistry::new(), Arc::new(output.clone()));
        (ctx, output)
    }

    fn capture(ctx: &LogContext) -> Arc<Mutex<Vec<LogEvent>>> {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        ctx.bus().subscribe(EventName::Log, move |event| {
            if let Event::Log(log) = event {
                sink.lock().unwrap().push(log.clone());
            }
            Ok(())
        });
        events
    }

    #[test]
    fn test_module_name_validation() {
        let (ctx, _) = context();
        assert!(Logger::new(&ctx, "builder:tasks/minify@1.0_x-y.z").is_ok());
        assert!(matches!(Logger::new(&ctx, ""), Err(Error::InvalidArgument(_))));
        let err = Logger::new(&ctx, "my module").unwrap_err();
        assert_eq!(err.to_string(), "Invalid argument: Invalid module name: my module");
    }

    #[test]
    fn test_log_publishes_event_when_observed() {
        let (ctx, output) = context();
        let events = capture(&ctx);
        let logger = Logger::new(&ctx, "my:module").unwrap();

        logger.info("Message 1").unwrap();
        logger
            .verbose([MessagePart::from("count"), MessagePart::value(&2)])
            .unwrap();

        let events = events.lock().unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0], LogEvent::new(Level::Info, "my:module", "Message 1"));
        assert_eq!(events[1].level, Level::Verbose);
        assert_eq!(events[1].message, "count 2");
        assert!(output.lines().is_empty());
    }

    #[test]
    fn test_log_falls_back_to_output_when_unobserved() {
        let (ctx, output) = context();
        let logger = Logger::new(&ctx, "my:module").unwrap();

        logger.info("Message 1").unwrap();
        logger.verbose("hidden below threshold").unwrap();
        logger.error(serde_json::json!({"code": 1})).unwrap();

        assert_eq!(
            output.lines(),
            vec!["[info] my:module: Message 1", "[error] my:module: { code: 1 }"]
        );
    }

    #[test]
    fn test_silent_level_never_emits() {
        let (ctx, output) = context();
        let events = capture(&ctx);
        ctx.set_level("silly").unwrap();
        let logger = Logger::new(&ctx, "my:module").unwrap();

        logger.log(Level::Silent, "nothing").unwrap();

        assert!(events.lock().unwrap().is_empty());
        assert!(output.lines().is_empty());
    }

    #[test]
    fn test_scoped_loggers_carry_context_fields() {
        let (ctx, output) = context();
        let logger = Logger::new(&ctx, "build").unwrap().for_project("project.a", "library");
        logger.warn("careful").unwrap();
        logger.for_task("minify").info("done").unwrap();

        assert_eq!(
            output.lines(),
            vec![
                "[warn] library project.a: careful",
                "[info] library project.a - minify: done"
            ]
        );

        let events = capture(&ctx);
        logger.for_task("minify").info("observed").unwrap();
        let events = events.lock().unwrap();
        assert_eq!(events[0].project_name.as_deref(), Some("project.a"));
        assert_eq!(events[0].project_type.as_deref(), Some("library"));
        assert_eq!(events[0].task_name.as_deref(), Some("minify"));
    }

    #[test]
    fn test_fallback_uses_threshold_at_call_time() {
        let (ctx, output) = context();
        let logger = Logger::new(&ctx, "my:module").unwrap();
        logger.perf("too early").unwrap();
        ctx.set_level("perf").unwrap();
        logger.perf("now visible").unwrap();
        assert_eq!(output.lines(), vec!["[perf] my:module: now visible"]);
    }
}
