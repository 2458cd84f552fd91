//! Live progress indicator
//!
//! While an indicator is active it owns the terminal: every line has to go
//! through [`ProgressIndicator::println`] so it lands above the bar instead of
//! being overdrawn. [`ProgressIndicator::finish`] flushes anything still
//! buffered before handing the stream back.

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use tracing::{debug, warn};

/// Redraw rate; also bounds how late a line printed through the bar appears
const REFRESH_HZ: u8 = 120;

/// Width of the bar in characters
const BAR_WIDTH: usize = 20;

/// A progress display with its own completed/total counters
pub trait ProgressIndicator: Send {
    fn set_total(&mut self, total: u64);

    fn increment(&mut self, delta: u64);

    fn set_message(&mut self, message: &str);

    /// Print a line above the indicator
    fn println(&mut self, line: &str);

    fn position(&self) -> u64;

    fn total(&self) -> u64;

    /// Flush buffered lines, remove the indicator and release the stream
    fn finish(&mut self);

    /// Whether the counters have reached parity
    fn is_complete(&self) -> bool {
        self.total() > 0 && self.position() >= self.total()
    }
}

/// Terminal progress bar backed by indicatif
pub struct BarIndicator {
    bar: ProgressBar,
}

impl BarIndicator {
    /// Bar drawing to stderr, starting at `completed` of `total`
    pub fn stderr(total: u64, completed: u64) -> Self {
        debug!(total, completed, "BarIndicator::stderr: called");
        let bar = ProgressBar::with_draw_target(Some(total), ProgressDrawTarget::stderr_with_hz(REFRESH_HZ));
        let template = format!("{{bar:{BAR_WIDTH}}} {{msg}}");
        let style = match ProgressStyle::with_template(&template) {
            Ok(style) => style,
            Err(e) => {
                warn!(error = %e, "BarIndicator::stderr: invalid template, using default style");
                ProgressStyle::default_bar()
            }
        };
        bar.set_style(style.progress_chars("■░"));
        bar.set_position(completed);
        Self { bar }
    }
}

impl ProgressIndicator for BarIndicator {
    fn set_total(&mut self, total: u64) {
        self.bar.set_length(total);
    }

    fn increment(&mut self, delta: u64) {
        self.bar.inc(delta);
    }

    fn set_message(&mut self, message: &str) {
        self.bar.set_message(message.to_string());
    }

    fn println(&mut self, line: &str) {
        self.bar.println(line);
    }

    fn position(&self) -> u64 {
        self.bar.position()
    }

    fn total(&self) -> u64 {
        self.bar.length().unwrap_or(0)
    }

    fn finish(&mut self) {
        debug!(position = self.position(), total = self.total(), "BarIndicator::finish");
        self.bar.finish_and_clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bar_counters() {
        let mut bar = BarIndicator {
            bar: ProgressBar::with_draw_target(Some(4), ProgressDrawTarget::hidden()),
        };
        assert!(!bar.is_complete());
        bar.increment(2);
        bar.set_total(3);
        assert_eq!(bar.position(), 2);
        assert_eq!(bar.total(), 3);
        bar.increment(1);
        assert!(bar.is_complete());
        bar.finish();
    }
}
