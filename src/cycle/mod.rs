//! Test-cycle sequencing
//!
//! One sequential control loop: for each signal kind in the fixed sequence,
//! acquire a window, classify it, report the outcome, advance. After the
//! last step the state resets and the cycle repeats indefinitely.

pub mod driver;
pub mod state;
