//! Toneprobe - audio classification test bench
//!
//! Acquires a fixed-duration audio window from a microphone (or a synthetic
//! waveform generator), feeds it to a pull-based classification engine, and
//! reports each step's outcome through a local display and a wireless
//! notification channel, cycling through a fixed sequence of test signals.

pub mod audio;
pub mod classify;
pub mod config;
pub mod cycle;
pub mod report;

pub use audio::adapter::SignalWindow;
pub use audio::buffer::SampleBuffer;
pub use audio::signal::SignalKind;
pub use cycle::driver::CycleDriver;

/// Application version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default capture sample rate (the model's native rate)
pub const DEFAULT_SAMPLE_RATE: u32 = 16000;

/// Classification window length in seconds
pub const DEFAULT_WINDOW_SECS: u32 = 3;

/// Samples per classification window at the default rate
pub const WINDOW_SAMPLES: usize = DEFAULT_SAMPLE_RATE as usize * DEFAULT_WINDOW_SECS as usize;

/// Samples processed per chunk during a window fill
pub const CHUNK_SAMPLES: usize = 1024;

/// Target number of progress updates over one full window fill
pub const PROGRESS_UPDATES: usize = 20;
