//! Persistent application configuration
//!
//! Stores the signal source selection, capture device, sample rate, and
//! window length in a JSON file at `<data_dir>/toneprobe/config.json`.
//! Any load error falls back to defaults.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

fn default_sample_rate() -> u32 {
    crate::DEFAULT_SAMPLE_RATE
}

fn default_window_secs() -> u32 {
    crate::DEFAULT_WINDOW_SECS
}

fn default_source() -> SourceKind {
    SourceKind::Synthetic
}

/// Which producer fills the sample window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// Deterministic test waveforms
    Synthetic,
    /// Live microphone capture
    Microphone,
}

/// Persistent application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Signal source selection
    #[serde(default = "default_source")]
    pub source: SourceKind,
    /// Capture device name (None = default input)
    #[serde(default)]
    pub device: Option<String>,
    /// Sample rate in Hz
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,
    /// Classification window length in seconds
    #[serde(default = "default_window_secs")]
    pub window_secs: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            source: default_source(),
            device: None,
            sample_rate: default_sample_rate(),
            window_secs: default_window_secs(),
        }
    }
}

impl AppConfig {
    /// Config file path: `<data_dir>/toneprobe/config.json`
    pub fn path() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("toneprobe")
            .join("config.json")
    }

    /// Window length in samples at the configured rate
    pub fn window_samples(&self) -> usize {
        self.sample_rate as usize * self.window_secs as usize
    }

    /// Load config from disk, falling back to defaults on any error
    pub fn load() -> Self {
        let path = Self::path();
        match std::fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(config) => {
                    tracing::info!(path = %path.display(), "Loaded config from disk");
                    config
                }
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Failed to parse config, using defaults");
                    Self::default()
                }
            },
            Err(_) => {
                tracing::info!(path = %path.display(), "No config file found, using defaults");
                Self::default()
            }
        }
    }

    /// Save config to disk, creating parent directories if needed
    pub fn save(&self, path: &std::path::Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        tracing::info!(path = %path.display(), "Config saved to disk");
        Ok(())
    }
}
