//! Local display sink
//!
//! Terminal renderer standing in for the device panel. Renders status lines
//! with a severity color, an uptime column, and a textual progress bar.
//! Consecutive identical lines are suppressed to keep the output readable.

use crate::report::{ReportSink, Severity, SinkError};
use std::time::Instant;

/// Width of the textual progress bar in characters
const BAR_WIDTH: usize = 20;

/// ANSI color for a severity hint
fn severity_color(severity: Severity) -> &'static str {
    match severity {
        Severity::Info => "\x1b[36m",    // cyan
        Severity::Busy => "\x1b[33m",    // yellow
        Severity::Success => "\x1b[32m", // green
        Severity::Warning => "\x1b[33m", // yellow
        Severity::Error => "\x1b[31m",   // red
    }
}

const RESET: &str = "\x1b[0m";

/// Render a textual progress bar like `[########............] 42%`
pub(crate) fn format_bar(current: usize, total: usize) -> String {
    let total = total.max(1);
    let filled = (BAR_WIDTH * current.min(total)) / total;
    let percent = (current.min(total) * 100) / total;
    format!(
        "[{}{}] {:>3}%",
        "#".repeat(filled),
        ".".repeat(BAR_WIDTH - filled),
        percent
    )
}

/// Terminal status display
pub struct DisplaySink {
    started: Instant,
    last_line: String,
}

impl DisplaySink {
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
            last_line: String::new(),
        }
    }

    /// Print a line unless it repeats the previous one
    fn emit(&mut self, line: String) {
        if line != self.last_line {
            println!("{}", line);
            self.last_line = line;
        }
    }
}

impl Default for DisplaySink {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportSink for DisplaySink {
    fn name(&self) -> &'static str {
        "display"
    }

    fn present(&mut self, main: &str, sub: &str, severity: Severity) -> Result<(), SinkError> {
        let uptime = self.started.elapsed().as_secs();
        let color = severity_color(severity);
        let line = if sub.is_empty() {
            format!("[{:>5}s] {}{}{}", uptime, color, main, RESET)
        } else {
            format!("[{:>5}s] {}{}{} - {}", uptime, color, main, RESET, sub)
        };
        self.emit(line);
        Ok(())
    }

    fn progress(&mut self, current: usize, total: usize, label: &str) -> Result<(), SinkError> {
        let uptime = self.started.elapsed().as_secs();
        let line = format!(
            "[{:>5}s] {} {} ({}/{})",
            uptime,
            format_bar(current, total),
            label,
            current,
            total
        );
        self.emit(line);
        Ok(())
    }

    fn publish(&mut self, message: &str) -> Result<(), SinkError> {
        // Published messages belong to the notification channel; the display
        // only mirrors them at debug level for diagnostics.
        tracing::debug!(target: "toneprobe::display", %message, "Published");
        Ok(())
    }
}
