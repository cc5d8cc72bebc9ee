//! Per-cycle progress state
//!
//! Owned and mutated only by the driver; sinks receive clones, never a
//! reference.

/// Sentinel label before any classification has completed
pub const NO_RESULT_LABEL: &str = "None";

/// Snapshot of where the current cycle stands
#[derive(Debug, Clone)]
pub struct CycleState {
    current_step: usize,
    total_steps: usize,
    last_label: String,
    last_confidence: f32,
}

impl CycleState {
    pub fn new(total_steps: usize) -> Self {
        Self {
            current_step: 0,
            total_steps,
            last_label: NO_RESULT_LABEL.to_string(),
            last_confidence: 0.0,
        }
    }

    /// Zero-based index of the step about to run (or just run)
    pub fn current_step(&self) -> usize {
        self.current_step
    }

    pub fn total_steps(&self) -> usize {
        self.total_steps
    }

    /// Most recently completed classification label
    pub fn last_label(&self) -> &str {
        &self.last_label
    }

    pub fn last_confidence(&self) -> f32 {
        self.last_confidence
    }

    /// Record the reduced result of the step that just classified
    pub fn record_result(&mut self, label: &str, confidence: f32) {
        self.last_label = label.to_string();
        self.last_confidence = confidence;
    }

    /// Advance to the next step, capped at `total_steps`
    pub fn advance(&mut self) {
        if self.current_step < self.total_steps {
            self.current_step += 1;
        }
    }

    /// Whether every step of the cycle has run
    pub fn is_complete(&self) -> bool {
        self.current_step == self.total_steps
    }

    /// Reset to the start-of-cycle sentinels
    pub fn reset(&mut self) {
        self.current_step = 0;
        self.last_label = NO_RESULT_LABEL.to_string();
        self.last_confidence = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_sentinels() {
        let state = CycleState::new(6);
        assert_eq!(state.current_step(), 0);
        assert_eq!(state.total_steps(), 6);
        assert_eq!(state.last_label(), NO_RESULT_LABEL);
        assert_eq!(state.last_confidence(), 0.0);
        assert!(!state.is_complete());
    }

    #[test]
    fn test_advance_caps_at_total() {
        let mut state = CycleState::new(2);
        state.advance();
        state.advance();
        assert!(state.is_complete());
        state.advance();
        assert_eq!(state.current_step(), 2, "Step index never exceeds total");
    }

    #[test]
    fn test_record_and_reset() {
        let mut state = CycleState::new(6);
        state.record_result("440Hz Sine", 0.92);
        state.advance();
        assert_eq!(state.last_label(), "440Hz Sine");
        assert_eq!(state.last_confidence(), 0.92);

        state.reset();
        assert_eq!(state.current_step(), 0);
        assert_eq!(state.last_label(), NO_RESULT_LABEL);
        assert_eq!(state.last_confidence(), 0.0);
    }
}
