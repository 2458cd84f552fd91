//! bl - structured build logging
//!
//! CLI entry point for emitting messages and watching simulated builds.

use std::fs;
use std::io;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use clap::Parser;
use crossterm::tty::IsTty;
use eyre::{Context, Result};
use tracing::{debug, info};

use buildlog::cli::{Cli, Command, ProjectArg, get_log_path};
use buildlog::config::Config;
use buildlog::{Level, LogContext, ProgressPresenter, StderrOutput, bridge};

/// Module name the simulated build reports under
const SIMULATE_MODULE: &str = "bl:simulate";

fn setup_logging() -> Result<()> {
    let log_path = get_log_path();
    if let Some(log_dir) = log_path.parent() {
        fs::create_dir_all(log_dir).context("Failed to create log directory")?;
    }
    let log_file = fs::File::create(&log_path).context("Failed to create log file")?;

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    let subscriber = tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_ansi(false)
        .with_env_filter(filter)
        .finish();
    // `log` records reach the bridge, never a LogTracer
    tracing::subscriber::set_global_default(subscriber).context("Failed to set tracing subscriber")?;

    info!("Logging initialized ({})", log_path.display());
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging().context("Failed to setup logging")?;

    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;

    // Threshold priority: CLI > config > environment > info
    let levels = config.level_registry(cli.log_level.as_deref());
    let threshold = levels.level().context("Invalid log level")?;

    let colors = cli.color.unwrap_or(config.color).enabled(io::stderr().is_tty());
    colored::control::set_override(colors);

    let ctx = LogContext::new(levels, Arc::new(StderrOutput::with_colors(colors)));
    bridge::install(&ctx).context("Failed to install log bridge")?;
    let show_progress = config.progress && !cli.no_progress;
    info!(%threshold, colors, show_progress, "bl: starting");

    debug!(command = ?cli.command, "main: dispatching command");
    match cli.command {
        Command::Levels => {
            debug!("main: matched Levels command");
            cmd_levels(&ctx)
        }
        Command::Log {
            level,
            module,
            message,
            unobserved,
        } => {
            debug!(%level, %module, unobserved, "main: matched Log command");
            let presenter = attach(&ctx, unobserved, show_progress);
            ctx.logger(&module)?.log(level, message.join(" "))?;
            detach(&ctx, presenter)
        }
        Command::Simulate {
            projects,
            tasks,
            skip,
            delay_ms,
            unobserved,
        } => {
            debug!(?projects, tasks, ?skip, delay_ms, unobserved, "main: matched Simulate command");
            let presenter = attach(&ctx, unobserved, show_progress);
            cmd_simulate(&ctx, &projects, tasks, &skip, Duration::from_millis(delay_ms))?;
            detach(&ctx, presenter)
        }
    }
}

fn attach(ctx: &LogContext, unobserved: bool, show_progress: bool) -> Option<ProgressPresenter> {
    if unobserved {
        debug!("attach: running without presenter");
        return None;
    }
    let presenter = ProgressPresenter::init(ctx);
    presenter.set_show_progress(show_progress);
    Some(presenter)
}

fn detach(ctx: &LogContext, presenter: Option<ProgressPresenter>) -> Result<()> {
    if presenter.is_some() {
        ProgressPresenter::stop(ctx).context("Failed to stop presenter")?;
    }
    Ok(())
}

fn cmd_levels(ctx: &LogContext) -> Result<()> {
    let threshold = ctx.level()?;
    for level in Level::ALL {
        let marker = if level.is_enabled(threshold) { "*" } else { " " };
        println!("{marker} {level}");
    }
    Ok(())
}

fn cmd_simulate(
    ctx: &LogContext,
    projects: &[ProjectArg],
    tasks: usize,
    skip: &[String],
    delay: Duration,
) -> Result<()> {
    let mut build = ctx.build_tracker(SIMULATE_MODULE)?;
    build
        .set_projects(projects.iter().map(|p| p.name.clone()))
        .context("Failed to announce projects")?;

    for project in projects {
        if skip.contains(&project.name) {
            build.skip_project_build(&project.name, &project.project_type)?;
            continue;
        }

        let mut tracker = ctx.project_task_tracker(SIMULATE_MODULE, &project.name, &project.project_type)?;
        let task_names: Vec<String> = (1..=tasks).map(|i| format!("task-{i}")).collect();
        tracker.set_tasks(task_names.clone())?;

        build.start_project_build(&project.name, &project.project_type)?;
        for task in &task_names {
            tracker.start_task(task)?;
            if !delay.is_zero() {
                thread::sleep(delay);
            }
            tracker.task_logger(task).verbose(format!("{task} done"))?;
            tracker.end_task(task)?;
        }
        build.end_project_build(&project.name, &project.project_type)?;
    }
    Ok(())
}
