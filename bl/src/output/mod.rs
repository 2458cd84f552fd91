//! Output stream abstraction
//!
//! Everything user-visible goes through an [`Output`]: direct fallback lines
//! from producers, rendered lines from the presenter, and the live progress
//! bar. The process default is [`StderrOutput`];
//! [`MemoryOutput`](crate::testing::MemoryOutput) captures lines in tests.

mod progress;

use std::io::{self, Write};

use colored::{ColoredString, Colorize};
use crossterm::tty::IsTty;
use tracing::debug;

pub use progress::{BarIndicator, ProgressIndicator};

/// A diagnostic output stream
pub trait Output: Send + Sync {
    /// Write one line; the newline is appended by the implementation
    fn write_line(&self, line: &str) -> io::Result<()>;

    /// Whether the stream is an interactive terminal
    fn is_terminal(&self) -> bool;

    /// Whether lines may contain ANSI colors
    fn colors(&self) -> bool {
        false
    }

    /// Create a progress indicator drawing to this stream
    fn progress_indicator(&self, total: u64, completed: u64) -> Box<dyn ProgressIndicator>;
}

/// Apply a color to `text` only when the output supports colors
pub fn paint(output: &dyn Output, text: &str, style: impl FnOnce(&str) -> ColoredString) -> String {
    if output.colors() {
        style(text).to_string()
    } else {
        text.to_string()
    }
}

/// Bold shorthand used for project and task names
pub fn bold(output: &dyn Output, text: &str) -> String {
    paint(output, text, |t| t.bold())
}

/// The process's standard error stream
#[derive(Debug, Clone)]
pub struct StderrOutput {
    colors: bool,
}

impl StderrOutput {
    /// Stderr with colors when it is a terminal
    pub fn new() -> Self {
        let colors = io::stderr().is_tty();
        debug!(colors, "StderrOutput::new: called");
        Self { colors }
    }

    /// Stderr with colors forced on or off
    pub fn with_colors(colors: bool) -> Self {
        debug!(colors, "StderrOutput::with_colors: called");
        Self { colors }
    }
}

impl Default for StderrOutput {
    fn default() -> Self {
        Self::new()
    }
}

impl Output for StderrOutput {
    fn write_line(&self, line: &str) -> io::Result<()> {
        let mut stderr = io::stderr().lock();
        writeln!(stderr, "{line}")
    }

    fn is_terminal(&self) -> bool {
        io::stderr().is_tty()
    }

    fn colors(&self) -> bool {
        self.colors
    }

    fn progress_indicator(&self, total: u64, completed: u64) -> Box<dyn ProgressIndicator> {
        Box::new(BarIndicator::stderr(total, completed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MemoryOutput;

    #[test]
    fn test_paint_without_colors_is_plain() {
        let output = MemoryOutput::new();
        assert_eq!(paint(&output, "info", |t| t.green()), "info");
        assert_eq!(bold(&output, "project.a"), "project.a");
    }

    #[test]
    fn test_paint_with_colors_adds_escape_codes() {
        colored::control::set_override(true);
        let output = MemoryOutput::new().with_colors();
        let painted = paint(&output, "info", |t| t.green());
        assert!(painted.contains("\u{1b}["));
        assert!(painted.contains("info"));
    }
}
