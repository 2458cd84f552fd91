//! Line rendering for the presenter

use colored::Colorize;

use crate::level::Level;
use crate::output::{Output, bold, paint};

pub const POINTER: &str = "❯";
pub const POINTER_SMALL: &str = "›";
pub const TICK: &str = "✔";

/// Short, colored level tag starting every rendered line
pub fn level_prefix(output: &dyn Output, level: Level) -> String {
    match level {
        Level::Silly => paint(output, "silly", |t| t.reversed()),
        Level::Verbose => paint(output, "verb", |t| t.cyan()),
        Level::Perf => paint(output, "perf", |t| t.red().on_yellow()),
        Level::Info => paint(output, "info", |t| t.green()),
        Level::Warn => paint(output, "warn", |t| t.yellow()),
        Level::Error => paint(output, "error", |t| t.white().on_red()),
        Level::Silent => "silent".to_string(),
    }
}

/// `<prefix> <text>`
pub fn line(output: &dyn Output, level: Level, text: &str) -> String {
    format!("{} {text}", level_prefix(output, level))
}

/// Scope label of a log message: the module, or `type name [task]`
pub fn scope_label(
    output: &dyn Output,
    module_name: &str,
    project_name: Option<&str>,
    project_type: Option<&str>,
    task_name: Option<&str>,
) -> String {
    let label = match (project_name, project_type) {
        (Some(name), Some(kind)) => {
            let mut label = format!("{kind} {}", bold(output, name));
            if let Some(task) = task_name {
                label.push(' ');
                label.push_str(task);
            }
            label
        }
        _ => module_name.to_string(),
    };
    paint(output, &label, |t| t.blue())
}

pub fn project_position(output: &dyn Output, index: usize, count: usize) -> String {
    paint(output, &format!("Project {index} of {count}"), |t| t.bright_black())
}

pub fn task_position(output: &dyn Output, index: usize, count: usize) -> String {
    paint(output, &format!("Task {index} of {count}"), |t| t.bright_black())
}

pub fn project_started(output: &dyn Output, project_type: &str, project_name: &str) -> String {
    format!(
        "{} Building {project_type} project {}...",
        paint(output, POINTER, |t| t.blue()),
        bold(output, project_name)
    )
}

pub fn project_ended(output: &dyn Output, project_type: &str, project_name: &str) -> String {
    format!(
        "{} Finished building {project_type} project {}",
        paint(output, TICK, |t| t.green()),
        bold(output, project_name)
    )
}

pub fn project_skipped(output: &dyn Output, project_type: &str, project_name: &str) -> String {
    format!(
        "{} Skipping build of {project_type} project {}",
        paint(output, TICK, |t| t.yellow()),
        bold(output, project_name)
    )
}

pub fn task_started(output: &dyn Output, task_name: &str) -> String {
    format!(
        "{} Running task {}...",
        paint(output, POINTER_SMALL, |t| t.blue()),
        bold(output, task_name)
    )
}

pub fn task_ended(output: &dyn Output, task_name: &str) -> String {
    format!(
        "{} Finished task {}",
        paint(output, TICK, |t| t.green()),
        bold(output, task_name)
    )
}

/// Plain message shown next to the bar while a project builds
pub fn indicator_message(project_type: &str, project_name: &str) -> String {
    format!("{POINTER} Building {project_type} project {project_name}...")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MemoryOutput;

    #[test]
    fn test_plain_rendering() {
        let output = MemoryOutput::new();
        assert_eq!(line(&output, Level::Verbose, "x"), "verb x");
        assert_eq!(
            project_ended(&output, "application", "project.a"),
            "✔ Finished building application project project.a"
        );
        assert_eq!(task_started(&output, "minify"), "› Running task minify...");
        assert_eq!(project_position(&output, 2, 3), "Project 2 of 3");
    }

    #[test]
    fn test_scope_label() {
        let output = MemoryOutput::new();
        assert_eq!(scope_label(&output, "my:module", None, None, None), "my:module");
        assert_eq!(
            scope_label(&output, "m", Some("project.a"), Some("library"), Some("minify")),
            "library project.a minify"
        );
        assert_eq!(scope_label(&output, "m", Some("project.a"), None, None), "m");
    }

    #[test]
    fn test_colored_prefix() {
        colored::control::set_override(true);
        let output = MemoryOutput::new().with_colors();
        let prefix = level_prefix(&output, Level::Error);
        assert!(prefix.starts_with("\u{1b}["));
        assert!(prefix.contains("error"));
    }
}
