//! Synthetic test waveform generation
//!
//! Six deterministic signal kinds exercised in a fixed order each test
//! cycle. Every kind except noise is a closed-form function of the sample
//! index, so regenerating a window with identical parameters is
//! bit-identical. Noise uses a seeded LCG PRNG and is therefore also
//! reproducible from a fresh generator, but only its amplitude bounds are
//! contractual.

use std::f64::consts::TAU;

/// Sine test tone frequency in Hz
const SINE_HZ: f64 = 440.0;

/// Sine amplitude (50% of full scale)
const SINE_AMPLITUDE: f64 = 16383.0;

/// Noise amplitude bound (30% of full scale)
const NOISE_AMPLITUDE: i32 = 9830;

/// Chirp sweep start frequency in Hz
const CHIRP_START_HZ: f64 = 200.0;

/// Chirp sweep span in Hz (200 -> 2200 over the full window)
const CHIRP_SPAN_HZ: f64 = 2000.0;

/// Chirp amplitude (40% of full scale)
const CHIRP_AMPLITUDE: f64 = 13107.0;

/// Square wave frequency in Hz
const SQUARE_HZ: f64 = 100.0;

/// Square wave amplitude (30% of full scale)
const SQUARE_AMPLITUDE: i16 = 9830;

/// Impulse train click rate in clicks per second
const IMPULSE_RATE_HZ: u32 = 10;

/// Impulse amplitude (80% of full scale)
const IMPULSE_AMPLITUDE: i16 = 26214;

/// One of the fixed test waveforms
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalKind {
    /// 440 Hz sine at 50% amplitude
    Sine,
    /// Uniform white noise bounded to 30% amplitude
    Noise,
    /// 200 -> 2200 Hz linear sweep at 40% amplitude
    Chirp,
    /// 100 Hz square wave at 30% amplitude
    Square,
    /// 10 clicks/sec impulse train at 80% amplitude
    Impulse,
    /// All zeros
    Silence,
}

impl SignalKind {
    /// The fixed test-step order for one cycle
    pub const SEQUENCE: [SignalKind; 6] = [
        SignalKind::Sine,
        SignalKind::Noise,
        SignalKind::Chirp,
        SignalKind::Square,
        SignalKind::Impulse,
        SignalKind::Silence,
    ];

    /// Human-readable step name for status output
    pub fn label(&self) -> &'static str {
        match self {
            SignalKind::Sine => "440Hz Sine",
            SignalKind::Noise => "White Noise",
            SignalKind::Chirp => "Chirp Sweep",
            SignalKind::Square => "100Hz Square",
            SignalKind::Impulse => "Impulse Train",
            SignalKind::Silence => "Silence",
        }
    }
}

/// Generator for one synthetic window
///
/// Constructed fresh per fill; `sample(i)` evaluates the waveform at sample
/// index `i`. Only the noise kind carries state (the PRNG seed), and that
/// seed is fixed at construction so two fresh generators produce identical
/// output when sampled in the same order.
///
/// # Example
/// ```
/// use toneprobe::audio::signal::{SignalKind, WaveformGenerator};
///
/// let mut gen = WaveformGenerator::new(SignalKind::Square, 16000, 48000);
/// assert_eq!(gen.sample(40), 9830); // quarter period into a 100 Hz cycle
/// ```
#[derive(Debug)]
pub struct WaveformGenerator {
    kind: SignalKind,
    sample_rate: u32,
    total_samples: usize,
    noise_seed: u32,
}

impl WaveformGenerator {
    /// Create a generator for one window of `total_samples` at `sample_rate`
    pub fn new(kind: SignalKind, sample_rate: u32, total_samples: usize) -> Self {
        Self {
            kind,
            sample_rate,
            total_samples,
            noise_seed: 0xDEADBEEF,
        }
    }

    /// Evaluate the waveform at sample index `i`
    pub fn sample(&mut self, i: usize) -> i16 {
        let fs = f64::from(self.sample_rate);
        match self.kind {
            SignalKind::Sine => {
                let phase = TAU * SINE_HZ * i as f64 / fs;
                (phase.sin() * SINE_AMPLITUDE).round() as i16
            }
            SignalKind::Noise => self.next_noise(),
            SignalKind::Chirp => {
                let t = i as f64 / fs;
                let window_secs = self.total_samples as f64 / fs;
                // Instantaneous frequency sweeps linearly over the window
                let freq = CHIRP_START_HZ + CHIRP_SPAN_HZ * t / window_secs;
                ((TAU * freq * t).sin() * CHIRP_AMPLITUDE).round() as i16
            }
            SignalKind::Square => {
                let phase = TAU * SQUARE_HZ * i as f64 / fs;
                if phase.sin() > 0.0 {
                    SQUARE_AMPLITUDE
                } else {
                    -SQUARE_AMPLITUDE
                }
            }
            SignalKind::Impulse => {
                let interval = (self.sample_rate / IMPULSE_RATE_HZ).max(1) as usize;
                if i % interval == 0 {
                    IMPULSE_AMPLITUDE
                } else {
                    0
                }
            }
            SignalKind::Silence => 0,
        }
    }

    /// Generate a single noise sample using an LCG PRNG
    ///
    /// Same generator family as glibc's rand; good enough for a bounded
    /// test noise source and fully reproducible per seed.
    fn next_noise(&mut self) -> i16 {
        self.noise_seed = self
            .noise_seed
            .wrapping_mul(1103515245)
            .wrapping_add(12345);
        let bits = (self.noise_seed >> 16) & 0x7FFF;
        let span = (2 * NOISE_AMPLITUDE + 1) as u32;
        ((bits % span) as i32 - NOISE_AMPLITUDE) as i16
    }

    /// Reset generator state (the noise seed) to its initial value
    pub fn reset(&mut self) {
        self.noise_seed = 0xDEADBEEF;
    }

    /// Signal kind this generator evaluates
    pub fn kind(&self) -> SignalKind {
        self.kind
    }

    /// Configured sample rate in Hz
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }
}
