//! Cycle driver state machine
//!
//! Orchestrates one full test cycle: for each signal kind in the fixed
//! sequence, acquire -> classify -> reduce -> report, then advance. Error
//! containment per step:
//! - allocation failure at construction is fatal (terminal `Halted` phase,
//!   no acquisition is ever attempted)
//! - a hardware read failure yields a partial window that is still
//!   classified (the cleared tail reads as silence)
//! - a classification failure skips result reporting for that step only
//! - sink failures never reach the driver at all
//!
//! The connection lifecycle is polled once per loop iteration, between
//! steps, never mid-step.

use crate::audio::buffer::SampleBuffer;
use crate::audio::signal::SignalKind;
use crate::audio::source::{CaptureError, SignalProducer};
use crate::classify::{reducer, Classifier};
use crate::cycle::state::CycleState;
use crate::report::notify::{ConnectionEdge, ConnectionWatch};
use crate::report::{Reporter, Severity};
use crate::SignalWindow;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// Sleep per iteration of the halted safe state
const HALTED_IDLE_INTERVAL: Duration = Duration::from_millis(200);

/// Driver phase within one step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Acquiring,
    Classifying,
    Reporting,
    CycleComplete,
    /// Terminal: allocation failed, no further steps are accepted
    Halted,
}

/// Top-level controller sequencing capture, classification, and reporting
pub struct CycleDriver {
    producer: Box<dyn SignalProducer>,
    classifier: Box<dyn Classifier>,
    reporter: Reporter,
    buffer: Option<SampleBuffer>,
    sequence: Vec<SignalKind>,
    state: CycleState,
    phase: Phase,
    connection: Option<ConnectionWatch>,
}

impl CycleDriver {
    /// Build the driver, allocating the sample window
    ///
    /// Allocation failure is fatal: it is surfaced through the reporter and
    /// the driver starts in the terminal `Halted` phase, accepting no
    /// steps. It never operates on an undersized window.
    pub fn new(
        window_samples: usize,
        producer: Box<dyn SignalProducer>,
        classifier: Box<dyn Classifier>,
        mut reporter: Reporter,
        connection: Option<ConnectionWatch>,
    ) -> Self {
        let sequence = SignalKind::SEQUENCE.to_vec();
        let state = CycleState::new(sequence.len());

        reporter.present(
            "Allocating Memory",
            &format!("{} bytes needed", window_samples.saturating_mul(2)),
            Severity::Busy,
        );

        let (buffer, phase) = match SampleBuffer::allocate(window_samples) {
            Ok(buffer) => {
                reporter.present(
                    "Memory OK",
                    &format!("{} byte window allocated", buffer.size_bytes()),
                    Severity::Success,
                );
                (Some(buffer), Phase::Idle)
            }
            Err(e) => {
                tracing::error!(error = %e, "Sample window allocation failed, halting");
                reporter.present("Memory Error!", "Not enough heap space", Severity::Error);
                reporter.publish("ERROR: Memory allocation failed!");
                (None, Phase::Halted)
            }
        };

        Self {
            producer,
            classifier,
            reporter,
            buffer,
            sequence,
            state,
            phase,
            connection,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_halted(&self) -> bool {
        self.phase == Phase::Halted
    }

    /// Snapshot of the cycle progress state
    pub fn state(&self) -> CycleState {
        self.state.clone()
    }

    /// React to connection lifecycle edges. Called between steps only.
    fn poll_connection(&mut self) {
        let edge = self.connection.as_mut().and_then(ConnectionWatch::poll);
        match edge {
            Some(ConnectionEdge::Connected) => {
                self.reporter
                    .present("Client Connected", "", Severity::Success);
            }
            Some(ConnectionEdge::Disconnected) => {
                self.reporter.present(
                    "Client Disconnected",
                    "restarting advertising",
                    Severity::Error,
                );
            }
            None => {}
        }
    }

    /// Run one full test step
    ///
    /// Returns `false` only from the halted state; every per-step error is
    /// contained and reported, and the machine proceeds.
    pub fn run_step(&mut self) -> bool {
        if self.phase == Phase::Halted {
            return false;
        }
        let Some(kind) = self.sequence.get(self.state.current_step()).copied() else {
            // Defensive reset if the step index ever drifts past the sequence
            self.state.reset();
            return true;
        };

        // Idle -> Acquiring
        self.phase = Phase::Acquiring;
        self.reporter.present(
            "Prepare to Record",
            &format!(
                "Step {} of {}: {}",
                self.state.current_step() + 1,
                self.state.total_steps(),
                kind.label()
            ),
            Severity::Info,
        );
        self.reporter
            .publish(&format!("Starting step: {}", kind.label()));

        let Some(buffer) = self.buffer.as_mut() else {
            self.phase = Phase::Halted;
            return false;
        };
        buffer.clear();

        self.reporter
            .present("Recording...", "Filling sample window", Severity::Busy);

        let captured = match self.producer.fill(buffer, kind, &mut self.reporter) {
            Ok(written) => {
                self.reporter.present(
                    "Recording Complete",
                    &format!("{} samples captured", written),
                    Severity::Success,
                );
                written
            }
            Err(CaptureError::HardwareRead { written, reason }) => {
                // Partial window: tail was cleared, so classify what we got
                tracing::warn!(written, %reason, "Hardware read failed, using partial window");
                self.reporter.present(
                    "Read Error",
                    &format!("{} samples usable, tail silent", written),
                    Severity::Warning,
                );
                self.reporter.publish(&format!(
                    "ERROR: hardware read failed after {} samples",
                    written
                ));
                written
            }
            Err(e) => {
                // Nothing usable this step; report and move on
                tracing::warn!(error = %e, "Capture failed, skipping step");
                self.reporter
                    .present("Capture Error", &e.to_string(), Severity::Error);
                self.reporter.publish(&format!("ERROR: capture failed ({})", e));
                self.finish_step();
                return true;
            }
        };

        // Acquiring -> Classifying
        self.phase = Phase::Classifying;
        self.reporter
            .present("Classifying...", "Processing recorded audio", Severity::Busy);

        let window = SignalWindow::new(&*buffer);
        let outcome = self.classifier.classify(&window);

        // Classifying -> Reporting
        self.phase = Phase::Reporting;
        match outcome {
            Ok(result) => {
                let (label, confidence) = reducer::best_class(&result);
                self.state.record_result(&label, confidence);

                self.reporter.present(
                    &label,
                    &format!("{:.1}% confidence", confidence * 100.0),
                    Severity::Success,
                );
                self.reporter.publish(&format!(
                    "Result: {} ({:.1}%)",
                    label,
                    confidence * 100.0
                ));

                // Full per-label breakdown on the notification channel
                for score in &result.scores {
                    self.reporter.publish(&format!(
                        "{}: {:.1}%",
                        score.label,
                        score.confidence * 100.0
                    ));
                }

                let timing = format!(
                    "DSP: {}ms, Class: {}ms",
                    result.timing.dsp_ms, result.timing.classification_ms
                );
                self.reporter.present("Timing Info", &timing, Severity::Info);
                self.reporter.publish(&format!("Timing - {}", timing));

                tracing::info!(
                    step = self.state.current_step(),
                    label = %label,
                    confidence,
                    captured,
                    "Step classified"
                );
            }
            Err(e) => {
                // Non-fatal: skip result reporting, continue the cycle
                tracing::warn!(error = %e, step = self.state.current_step(), "Classification failed");
                self.reporter
                    .present("Error!", "Classification failed", Severity::Error);
                self.reporter
                    .publish(&format!("ERROR: classification failed ({})", e));
            }
        }

        self.finish_step();
        true
    }

    /// Advance the step counter; wrap up the cycle when the sequence ends
    fn finish_step(&mut self) {
        self.state.advance();
        if self.state.is_complete() {
            self.phase = Phase::CycleComplete;
            self.reporter
                .present("Cycle Complete!", "All tests finished", Severity::Success);
            self.reporter.publish("Test cycle completed - restarting");
            self.state.reset();
        }
        self.phase = Phase::Idle;
    }

    /// Run one full cycle (every step in the sequence)
    ///
    /// Returns `false` if the driver is halted.
    pub fn run_cycle(&mut self) -> bool {
        for _ in 0..self.state.total_steps() {
            if !self.run_step() {
                return false;
            }
        }
        true
    }

    /// Drive cycles until `running` clears
    ///
    /// A halted driver presents its safe state and idles; it never attempts
    /// acquisition.
    pub fn run(&mut self, running: &AtomicBool) {
        if self.phase == Phase::Halted {
            self.reporter.present(
                "Halted",
                "allocation failed - acquisition disabled",
                Severity::Error,
            );
            while running.load(Ordering::SeqCst) {
                std::thread::sleep(HALTED_IDLE_INTERVAL);
            }
            return;
        }

        while running.load(Ordering::SeqCst) {
            self.poll_connection();
            if !self.run_step() {
                break;
            }
        }
    }
}
