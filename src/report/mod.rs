//! Status and result reporting
//!
//! Two sinks are composed, not alternatives: a local display
//! ([`display::DisplaySink`]) and a wireless notification channel
//! ([`notify::NotifySink`]). The [`Reporter`] fans every update out to both;
//! a sink failure (for example, no wireless peer connected) is logged and
//! swallowed, never surfaced to the driver loop.

pub mod display;
pub mod notify;

use std::time::{Duration, Instant};
use thiserror::Error;

/// Default minimum interval between forwarded progress updates
const DEFAULT_PROGRESS_INTERVAL: Duration = Duration::from_millis(50);

/// Errors a sink can report. None of them abort the driver.
#[derive(Error, Debug)]
pub enum SinkError {
    #[error("no peer connected")]
    NotConnected,

    #[error("notification channel full")]
    ChannelFull,

    #[error("notification channel closed")]
    ChannelClosed,
}

/// Semantic severity hint attached to status updates
///
/// Sinks map this to their own rendering (the display to a color, the
/// notification channel to a message prefix).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Neutral information
    Info,
    /// An operation is in progress
    Busy,
    /// A step or check completed
    Success,
    /// Degraded but continuing
    Warning,
    /// A step failed
    Error,
}

/// An output destination for status, progress, and result text
pub trait ReportSink {
    /// Sink name for log output
    fn name(&self) -> &'static str;

    /// Present a status: main line, detail line, severity hint
    fn present(&mut self, main: &str, sub: &str, severity: Severity) -> Result<(), SinkError>;

    /// Report fill progress for the labeled step
    fn progress(&mut self, current: usize, total: usize, label: &str) -> Result<(), SinkError>;

    /// Publish a free-form message
    fn publish(&mut self, message: &str) -> Result<(), SinkError>;
}

/// Minimum-interval gate for progress updates
///
/// Replaces the firmware-style fixed display delays with an explicit check,
/// so cadence is enforced without sleeping and is testable with synthetic
/// instants.
#[derive(Debug)]
pub struct ProgressPacer {
    min_interval: Duration,
    last: Option<Instant>,
}

impl ProgressPacer {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last: None,
        }
    }

    /// Returns true (and arms the gate) if `min_interval` has passed since
    /// the last permitted update. The first call always permits.
    pub fn permit(&mut self, now: Instant) -> bool {
        match self.last {
            Some(last) if now.duration_since(last) < self.min_interval => false,
            _ => {
                self.last = Some(now);
                true
            }
        }
    }

    pub fn reset(&mut self) {
        self.last = None;
    }
}

/// Fan-out over all configured sinks
///
/// Sink failures are logged at warn level and otherwise ignored; the driver
/// never sees them.
pub struct Reporter {
    sinks: Vec<Box<dyn ReportSink>>,
    pacer: ProgressPacer,
}

impl Reporter {
    pub fn new(sinks: Vec<Box<dyn ReportSink>>) -> Self {
        Self {
            sinks,
            pacer: ProgressPacer::new(DEFAULT_PROGRESS_INTERVAL),
        }
    }

    /// Override the minimum progress interval (tests use `Duration::ZERO`)
    pub fn with_pacing(mut self, min_interval: Duration) -> Self {
        self.pacer = ProgressPacer::new(min_interval);
        self
    }

    /// Present a status on every sink
    pub fn present(&mut self, main: &str, sub: &str, severity: Severity) {
        for sink in &mut self.sinks {
            if let Err(e) = sink.present(main, sub, severity) {
                tracing::warn!(sink = sink.name(), error = %e, "Status present failed");
            }
        }
    }

    /// Forward a progress update, rate-limited by the pacer
    ///
    /// The final update (`current == total`) always goes out so completion
    /// is never dropped.
    pub fn progress(&mut self, current: usize, total: usize, label: &str) {
        if current < total && !self.pacer.permit(Instant::now()) {
            return;
        }
        for sink in &mut self.sinks {
            if let Err(e) = sink.progress(current, total, label) {
                tracing::warn!(sink = sink.name(), error = %e, "Progress update failed");
            }
        }
    }

    /// Publish a message on every sink
    pub fn publish(&mut self, message: &str) {
        for sink in &mut self.sinks {
            if let Err(e) = sink.publish(message) {
                tracing::warn!(sink = sink.name(), error = %e, "Publish failed");
            }
        }
    }
}
