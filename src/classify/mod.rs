//! Classification engine boundary
//!
//! The engine itself is an opaque, pre-trained component; this module only
//! defines the contract it is consumed through. The engine reads audio
//! exclusively via [`SignalWindow`](crate::audio::adapter::SignalWindow) and
//! returns a ranked label set plus timing metadata. Errors propagate to the
//! driver and are not retried here.
//!
//! - Best-class reduction lives in [`reducer`]
//! - A small stand-in engine for the shipped binary lives in [`heuristic`]

pub mod heuristic;
pub mod reducer;

use crate::audio::adapter::SignalWindow;
use thiserror::Error;

/// Errors reported by a classification engine
#[derive(Error, Debug)]
pub enum ClassifyError {
    #[error("classification engine failed: {0}")]
    Engine(String),

    #[error("signal window too short: {actual} samples, need {required}")]
    WindowTooShort { actual: usize, required: usize },
}

/// One labeled confidence from the engine
#[derive(Debug, Clone)]
pub struct Score {
    pub label: String,
    /// Confidence in `[0, 1]`. The set is not guaranteed to sum to 1.
    pub confidence: f32,
}

/// Stage durations reported by the engine
#[derive(Debug, Clone, Copy, Default)]
pub struct Timing {
    pub dsp_ms: u64,
    pub classification_ms: u64,
    pub anomaly_ms: u64,
}

/// Ranked result set for one window
#[derive(Debug, Clone, Default)]
pub struct Classification {
    /// Label/confidence pairs in model order (count fixed by the model)
    pub scores: Vec<Score>,
    pub timing: Timing,
    /// Optional anomaly score, if the model computes one
    pub anomaly: Option<f32>,
}

/// The boundary every classification engine is consumed through
///
/// Deterministic given identical signal content and model; may take a
/// bounded but variable time, reported via [`Timing`].
pub trait Classifier {
    fn classify(&mut self, window: &SignalWindow) -> Result<Classification, ClassifyError>;

    /// Human-readable engine name for status output
    fn name(&self) -> &'static str;
}
