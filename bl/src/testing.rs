//! Test support: an in-memory output stream
//!
//! [`MemoryOutput`] records every line written to it. When it pretends to be
//! a terminal, the indicators it hands out buffer their lines and only append
//! them to the captured output when finished, which makes the ordering of
//! indicator-mediated lines observable.

use std::io;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::output::{Output, ProgressIndicator};

#[derive(Debug, Default)]
struct Captured {
    lines: Vec<String>,
    indicators_created: usize,
    indicators_finished: usize,
    messages: Vec<String>,
    progress: Vec<(u64, u64)>,
}

/// Output stream that captures lines in memory
#[derive(Debug, Clone, Default)]
pub struct MemoryOutput {
    captured: Arc<Mutex<Captured>>,
    terminal: bool,
    colors: bool,
}

impl MemoryOutput {
    /// Non-interactive capture (no progress indicator will be shown)
    pub fn new() -> Self {
        Self::default()
    }

    /// Capture that reports itself as an interactive terminal
    pub fn terminal() -> Self {
        Self {
            terminal: true,
            ..Self::default()
        }
    }

    /// Enable colored lines
    pub fn with_colors(mut self) -> Self {
        self.colors = true;
        self
    }

    fn captured(&self) -> MutexGuard<'_, Captured> {
        self.captured.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// All lines written so far
    pub fn lines(&self) -> Vec<String> {
        self.captured().lines.clone()
    }

    /// All lines written so far, clearing the capture
    pub fn take_lines(&self) -> Vec<String> {
        std::mem::take(&mut self.captured().lines)
    }

    /// Number of progress indicators created
    pub fn indicators_created(&self) -> usize {
        self.captured().indicators_created
    }

    /// Number of progress indicators finished
    pub fn indicators_finished(&self) -> usize {
        self.captured().indicators_finished
    }

    /// Messages shown on indicators
    pub fn indicator_messages(&self) -> Vec<String> {
        self.captured().messages.clone()
    }

    /// Every (position, total) pair any indicator went through
    pub fn indicator_progress(&self) -> Vec<(u64, u64)> {
        self.captured().progress.clone()
    }
}

impl Output for MemoryOutput {
    fn write_line(&self, line: &str) -> io::Result<()> {
        self.captured().lines.push(line.to_string());
        Ok(())
    }

    fn is_terminal(&self) -> bool {
        self.terminal
    }

    fn colors(&self) -> bool {
        self.colors
    }

    fn progress_indicator(&self, total: u64, completed: u64) -> Box<dyn ProgressIndicator> {
        let mut captured = self.captured();
        captured.indicators_created += 1;
        captured.progress.push((completed, total));
        Box::new(RecordingIndicator {
            captured: Arc::clone(&self.captured),
            total,
            position: completed,
            buffered: Vec::new(),
            finished: false,
        })
    }
}

/// Indicator that buffers its lines until finished
struct RecordingIndicator {
    captured: Arc<Mutex<Captured>>,
    total: u64,
    position: u64,
    buffered: Vec<String>,
    finished: bool,
}

impl RecordingIndicator {
    fn record_progress(&self) {
        let mut captured = self.captured.lock().unwrap_or_else(PoisonError::into_inner);
        captured.progress.push((self.position, self.total));
    }
}

impl ProgressIndicator for RecordingIndicator {
    fn set_total(&mut self, total: u64) {
        self.total = total;
        self.record_progress();
    }

    fn increment(&mut self, delta: u64) {
        self.position += delta;
        self.record_progress();
    }

    fn set_message(&mut self, message: &str) {
        let mut captured = self.captured.lock().unwrap_or_else(PoisonError::into_inner);
        captured.messages.push(message.to_string());
    }

    fn println(&mut self, line: &str) {
        self.buffered.push(line.to_string());
    }

    fn position(&self) -> u64 {
        self.position
    }

    fn total(&self) -> u64 {
        self.total
    }

    fn finish(&mut self) {
        if self.finished {
            return;
        }
        self.finished = true;
        let mut captured = self.captured.lock().unwrap_or_else(PoisonError::into_inner);
        captured.lines.append(&mut self.buffered);
        captured.indicators_finished += 1;
    }
}
