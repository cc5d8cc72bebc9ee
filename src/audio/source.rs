//! Signal producers filling the sample window
//!
//! Two producers implement the same fill contract: [`SyntheticSource`]
//! evaluates one of the fixed test waveforms, [`MicrophoneSource`] drains a
//! cpal capture stream through a lock-free ring buffer. Both work in chunks
//! and emit bounded-cadence progress through the reporter, so the UX is
//! identical whichever is configured.

use crate::audio::buffer::SampleBuffer;
use crate::audio::signal::{SignalKind, WaveformGenerator};
use crate::report::Reporter;
use crate::{CHUNK_SAMPLES, PROGRESS_UPDATES};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{SampleRate, StreamConfig};
use ringbuf::traits::{Consumer, Producer, Split};
use ringbuf::HeapRb;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;

/// Capture ring capacity in samples (~4 seconds at 16 kHz)
const MIC_RING_SAMPLES: usize = 65536;

/// How long the fill loop tolerates an empty ring before declaring the
/// stream stalled
const MIC_STALL_TIMEOUT: Duration = Duration::from_secs(2);

/// Sleep between polls of an empty capture ring
const MIC_POLL_INTERVAL: Duration = Duration::from_millis(5);

/// Errors that can occur while producing a window
#[derive(Error, Debug)]
pub enum CaptureError {
    /// The hardware read failed mid-fill. The window is usable up to
    /// `written`; the remainder reads as silence.
    #[error("hardware read failed after {written} samples: {reason}")]
    HardwareRead { written: usize, reason: String },

    #[error("no input device available")]
    NoDevice,

    #[error("failed to open input stream: {0}")]
    StreamOpen(String),

    #[error("microphone stream not started")]
    NotStarted,
}

/// A source that can fill the sample window for one test step
pub trait SignalProducer {
    /// Fill the window for one test step
    ///
    /// Returns the number of samples written (the full capacity on
    /// success). A [`CaptureError::HardwareRead`] carries the count of
    /// valid samples already written; callers may classify that partial
    /// window since the cleared tail reads as silence.
    fn fill(
        &mut self,
        buffer: &mut SampleBuffer,
        kind: SignalKind,
        reporter: &mut Reporter,
    ) -> Result<usize, CaptureError>;

    /// Human-readable source description for status output
    fn describe(&self) -> String;
}

/// Progress cadence in samples (~20 updates over one fill)
fn progress_interval(total: usize) -> usize {
    (total / PROGRESS_UPDATES).max(1)
}

/// Deterministic waveform producer
///
/// Generation never fails; it still reports progress at the same cadence as
/// the microphone path.
#[derive(Debug)]
pub struct SyntheticSource {
    sample_rate: u32,
}

impl SyntheticSource {
    pub fn new(sample_rate: u32) -> Self {
        Self { sample_rate }
    }
}

impl SignalProducer for SyntheticSource {
    fn fill(
        &mut self,
        buffer: &mut SampleBuffer,
        kind: SignalKind,
        reporter: &mut Reporter,
    ) -> Result<usize, CaptureError> {
        let total = buffer.capacity();
        let interval = progress_interval(total);
        let mut generator = WaveformGenerator::new(kind, self.sample_rate, total);

        let mut written = 0usize;
        let mut last_bucket = 0usize;
        while written < total {
            let chunk_end = (written + CHUNK_SAMPLES).min(total);
            for i in written..chunk_end {
                buffer.write(i, generator.sample(i));
            }
            written = chunk_end;

            // At most one progress update per chunk
            let bucket = written / interval;
            if bucket > last_bucket || written == total {
                last_bucket = bucket;
                reporter.progress(written, total, kind.label());
            }
        }

        Ok(written)
    }

    fn describe(&self) -> String {
        format!("synthetic waveforms @ {} Hz", self.sample_rate)
    }
}

/// Live microphone producer
///
/// The cpal callback pushes native 32-bit samples into a lock-free SPSC
/// ring; [`SignalProducer::fill`] drains it in chunks, converting to 16-bit
/// range with a fixed right shift (the mic's data sits in the upper bits).
/// The fill blocks the calling context, which is fine: the device does
/// nothing else while sampling.
pub struct MicrophoneSource {
    device_name: Option<String>,
    sample_rate: u32,
    stream: Option<cpal::Stream>,
    consumer: Option<ringbuf::HeapCons<i32>>,
    failed: Arc<AtomicBool>,
    chunk: Vec<i32>,
}

impl MicrophoneSource {
    /// Create an unopened microphone source
    ///
    /// `device_name` of `None` selects the default input device.
    pub fn new(device_name: Option<String>, sample_rate: u32) -> Self {
        Self {
            device_name,
            sample_rate,
            stream: None,
            consumer: None,
            failed: Arc::new(AtomicBool::new(false)),
            chunk: vec![0i32; CHUNK_SAMPLES],
        }
    }

    /// Open and start the capture stream
    pub fn open(&mut self) -> Result<(), CaptureError> {
        let host = cpal::default_host();

        let device = match &self.device_name {
            Some(name) => host
                .input_devices()
                .map_err(|e| CaptureError::StreamOpen(e.to_string()))?
                .find(|d| d.name().map(|n| &n == name).unwrap_or(false))
                .ok_or(CaptureError::NoDevice)?,
            None => host.default_input_device().ok_or(CaptureError::NoDevice)?,
        };

        let config = StreamConfig {
            channels: 1,
            sample_rate: SampleRate(self.sample_rate),
            buffer_size: cpal::BufferSize::Default,
        };

        let ring = HeapRb::<i32>::new(MIC_RING_SAMPLES);
        let (mut producer, consumer) = ring.split();

        let failed = Arc::clone(&self.failed);
        failed.store(false, Ordering::Relaxed);

        let stream = device
            .build_input_stream(
                &config,
                move |data: &[i32], _: &cpal::InputCallbackInfo| {
                    for &sample in data {
                        // Overruns drop samples; the fill loop reports the
                        // shortfall as a stall if it persists
                        let _ = producer.try_push(sample);
                    }
                },
                move |err| {
                    tracing::error!(error = %err, "Input stream error");
                    failed.store(true, Ordering::Relaxed);
                },
                None,
            )
            .map_err(|e| CaptureError::StreamOpen(e.to_string()))?;

        stream
            .play()
            .map_err(|e| CaptureError::StreamOpen(e.to_string()))?;

        tracing::info!(
            device = device.name().unwrap_or_else(|_| "unknown".into()),
            sample_rate = self.sample_rate,
            "Microphone stream started"
        );

        self.stream = Some(stream);
        self.consumer = Some(consumer);
        Ok(())
    }

    /// Stop the capture stream
    pub fn close(&mut self) {
        self.stream = None;
        self.consumer = None;
    }

    /// Whether the capture stream is currently open
    pub fn is_open(&self) -> bool {
        self.stream.is_some()
    }
}

impl SignalProducer for MicrophoneSource {
    fn fill(
        &mut self,
        buffer: &mut SampleBuffer,
        _kind: SignalKind,
        reporter: &mut Reporter,
    ) -> Result<usize, CaptureError> {
        let consumer = self.consumer.as_mut().ok_or(CaptureError::NotStarted)?;

        let total = buffer.capacity();
        let interval = progress_interval(total);

        // Discard audio captured before this step started
        while consumer.pop_slice(&mut self.chunk) > 0 {}

        let mut written = 0usize;
        let mut last_bucket = 0usize;
        let mut last_data = Instant::now();

        while written < total {
            if self.failed.load(Ordering::Relaxed) {
                return Err(CaptureError::HardwareRead {
                    written,
                    reason: "input stream reported an error".into(),
                });
            }

            let want = CHUNK_SAMPLES.min(total - written);
            let read = consumer.pop_slice(&mut self.chunk[..want]);
            if read == 0 {
                if last_data.elapsed() > MIC_STALL_TIMEOUT {
                    return Err(CaptureError::HardwareRead {
                        written,
                        reason: "capture stream stalled".into(),
                    });
                }
                std::thread::sleep(MIC_POLL_INTERVAL);
                continue;
            }
            last_data = Instant::now();

            for &native in &self.chunk[..read] {
                // Mic data occupies the upper bits of the 32-bit word
                buffer.write(written, (native >> 16) as i16);
                written += 1;
            }

            let bucket = written / interval;
            if bucket > last_bucket || written == total {
                last_bucket = bucket;
                reporter.progress(written, total, "Live Microphone");
            }
        }

        Ok(written)
    }

    fn describe(&self) -> String {
        format!(
            "microphone ({}) @ {} Hz",
            self.device_name.as_deref().unwrap_or("default input"),
            self.sample_rate
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::Reporter;

    fn quiet_reporter() -> Reporter {
        Reporter::new(Vec::new()).with_pacing(Duration::ZERO)
    }

    #[test]
    fn test_synthetic_fill_completes() {
        let mut buffer = SampleBuffer::allocate(48000).unwrap();
        let mut source = SyntheticSource::new(16000);
        let mut reporter = quiet_reporter();

        let written = source
            .fill(&mut buffer, SignalKind::Sine, &mut reporter)
            .unwrap();
        assert_eq!(written, 48000);
    }

    #[test]
    fn test_synthetic_fill_matches_generator() {
        let mut buffer = SampleBuffer::allocate(4096).unwrap();
        let mut source = SyntheticSource::new(16000);
        let mut reporter = quiet_reporter();
        source
            .fill(&mut buffer, SignalKind::Chirp, &mut reporter)
            .unwrap();

        let mut generator = WaveformGenerator::new(SignalKind::Chirp, 16000, 4096);
        for i in 0..4096 {
            assert_eq!(buffer.read(i), generator.sample(i), "Mismatch at {}", i);
        }
    }

    #[test]
    fn test_synthetic_fill_is_idempotent() {
        let mut first = SampleBuffer::allocate(8192).unwrap();
        let mut second = SampleBuffer::allocate(8192).unwrap();
        let mut source = SyntheticSource::new(16000);
        let mut reporter = quiet_reporter();

        source
            .fill(&mut first, SignalKind::Noise, &mut reporter)
            .unwrap();
        source
            .fill(&mut second, SignalKind::Noise, &mut reporter)
            .unwrap();
        assert_eq!(first.as_slice(), second.as_slice());
    }

    #[test]
    fn test_progress_interval_bounds() {
        assert_eq!(progress_interval(48000), 2400);
        assert_eq!(progress_interval(10), 1, "Interval never reaches zero");
    }

    #[test]
    fn test_mic_fill_without_open_fails() {
        let mut buffer = SampleBuffer::allocate(1024).unwrap();
        let mut source = MicrophoneSource::new(None, 16000);
        let mut reporter = quiet_reporter();

        let result = source.fill(&mut buffer, SignalKind::Sine, &mut reporter);
        assert!(matches!(result, Err(CaptureError::NotStarted)));
    }

    #[test]
    fn test_describe() {
        let synthetic = SyntheticSource::new(16000);
        assert!(synthetic.describe().contains("16000"));

        let mic = MicrophoneSource::new(Some("INMP441".into()), 16000);
        assert!(mic.describe().contains("INMP441"));
    }
}
