//! Bridge from the `log` crate
//!
//! Libraries that log through the `log` facade end up on the same event bus
//! as everything else once [`install`] has been called. The record target
//! becomes the module name, with characters a module name may not contain
//! replaced by `_`.

use log::{LevelFilter, Metadata, Record};
use tracing::{debug, warn};

use crate::context::LogContext;
use crate::error::Result;
use crate::level::Level;
use crate::loggers::Logger;

/// Module name used when a record has no usable target
const FALLBACK_MODULE: &str = "log";

/// `log::Log` implementation forwarding records as `log` events
pub struct LogBridge {
    ctx: LogContext,
}

impl LogBridge {
    pub fn new(ctx: &LogContext) -> Self {
        Self { ctx: ctx.clone() }
    }
}

/// Map a `log` level onto the facade's levels
pub fn map_level(level: log::Level) -> Level {
    match level {
        log::Level::Trace => Level::Silly,
        log::Level::Debug => Level::Verbose,
        log::Level::Info => Level::Info,
        log::Level::Warn => Level::Warn,
        log::Level::Error => Level::Error,
    }
}

/// Turn a record target such as `hyper::proto` into a valid module name
pub fn module_name(target: &str) -> String {
    let name: String = target
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || "-_:@./".contains(c) {
                c
            } else {
                '_'
            }
        })
        .collect();
    if name.is_empty() { FALLBACK_MODULE.to_string() } else { name }
}

impl log::Log for LogBridge {
    fn enabled(&self, metadata: &Metadata) -> bool {
        self.ctx.levels().is_enabled(map_level(metadata.level())).unwrap_or(false)
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let result = Logger::new(&self.ctx, &module_name(record.target()))
            .and_then(|logger| logger.log(map_level(record.level()), record.args().to_string()));
        if let Err(e) = result {
            warn!(target_name = record.target(), error = %e, "LogBridge::log: dropped record");
        }
    }

    fn flush(&self) {}
}

/// Install the bridge as the process-wide `log` logger
pub fn install(ctx: &LogContext) -> Result<()> {
    debug!("bridge::install: called");
    log::set_boxed_logger(Box::new(LogBridge::new(ctx)))?;
    log::set_max_level(LevelFilter::Trace);
    Ok(())
}
