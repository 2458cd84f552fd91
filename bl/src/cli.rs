//! CLI command definitions and subcommands

use std::path::PathBuf;
use std::str::FromStr;

use clap::{Parser, Subcommand};
use tracing::debug;

use crate::config::ColorMode;
use crate::level::Level;

/// Project type used when `--project` names none
pub const DEFAULT_PROJECT_TYPE: &str = "application";

/// bl - structured build logging
#[derive(Debug, Parser)]
#[command(
    name = "bl",
    about = "Structured logging with build progress tracking",
    version = env!("CARGO_PKG_VERSION"),
    after_help = after_help()
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, help = "Path to config file")]
    pub config: Option<PathBuf>,

    /// Threshold level (silly, verbose, perf, info, warn, error, silent)
    #[arg(
        short = 'l',
        long = "log-level",
        global = true,
        help = "Threshold level (silly, verbose, perf, info, warn, error, silent)"
    )]
    pub log_level: Option<String>,

    /// Never show a progress bar
    #[arg(long, global = true)]
    pub no_progress: bool,

    /// When to color output
    #[arg(long, global = true, value_enum)]
    pub color: Option<ColorMode>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// List levels and whether the threshold enables them
    Levels,

    /// Emit one message
    Log {
        /// Message level
        level: Level,

        /// Module name, e.g. builder:tasks:minify
        module: String,

        /// Message words, joined with spaces
        #[arg(required = true)]
        message: Vec<String>,

        /// Do not attach a presenter; the message is written directly
        #[arg(long)]
        unobserved: bool,
    },

    /// Run a simulated multi-project build
    Simulate {
        /// Project to build, as NAME or NAME:TYPE
        #[arg(short, long = "project", value_name = "NAME[:TYPE]", required = true)]
        projects: Vec<ProjectArg>,

        /// Tasks per project
        #[arg(short, long, default_value_t = 3)]
        tasks: usize,

        /// Project to skip instead of build
        #[arg(long)]
        skip: Vec<String>,

        /// Pause after each task, in milliseconds
        #[arg(long, default_value_t = 0)]
        delay_ms: u64,

        /// Do not attach a presenter; status lines are written directly
        #[arg(long)]
        unobserved: bool,
    },
}

/// A `--project` argument
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectArg {
    pub name: String,
    pub project_type: String,
}

impl FromStr for ProjectArg {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, project_type) = match s.split_once(':') {
            Some((name, kind)) => (name, kind),
            None => (s, DEFAULT_PROJECT_TYPE),
        };
        if name.is_empty() {
            return Err(format!("missing project name in '{s}'"));
        }
        if project_type.is_empty() {
            return Err(format!("missing project type in '{s}'"));
        }
        Ok(Self {
            name: name.to_string(),
            project_type: project_type.to_string(),
        })
    }
}

/// Where the binary writes its own diagnostics
pub fn get_log_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("buildlog")
        .join("logs")
        .join("bl.log")
}

/// Help footer naming the diagnostics file
pub fn after_help() -> String {
    let path = get_log_path();
    debug!(path = %path.display(), "after_help: called");
    format!("Diagnostics are written to {}\nSet RUST_LOG to change their verbosity.", path.display())
}
