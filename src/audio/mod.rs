//! Audio acquisition module
//!
//! This module contains everything between the signal source and the
//! classifier boundary:
//! - Fixed-capacity sample window ([`buffer`])
//! - Synthetic test waveform generation ([`signal`])
//! - Microphone and synthetic producers ([`source`])
//! - Pull-based adapter exposing the window to the classifier ([`adapter`])

pub mod adapter;
pub mod buffer;
pub mod signal;
pub mod source;
