//! Fixed-capacity sample window
//!
//! The window is allocated once at startup for the model's required length,
//! reused (overwritten in place) every test step, and never resized. Reads
//! past the window are silence, which is what makes a partially filled
//! window safe to classify.

use thiserror::Error;

/// Errors that can occur when allocating the sample window
#[derive(Error, Debug)]
pub enum AllocationError {
    #[error("failed to allocate sample window of {requested} samples: {source}")]
    OutOfMemory {
        requested: usize,
        #[source]
        source: std::collections::TryReserveError,
    },
}

/// Fixed-capacity store of signed 16-bit audio samples
///
/// Sole owner of the memory window being classified. One producer writes it
/// and one adapter reads it per test step, strictly non-overlapping in time.
///
/// # Example
/// ```
/// use toneprobe::audio::buffer::SampleBuffer;
///
/// let mut buffer = SampleBuffer::allocate(1024).unwrap();
/// buffer.write(0, 1000);
/// assert_eq!(buffer.read(0), 1000);
/// assert_eq!(buffer.read(5000), 0); // past the window reads as silence
/// ```
#[derive(Debug)]
pub struct SampleBuffer {
    samples: Vec<i16>,
}

impl SampleBuffer {
    /// Allocate a zeroed window of `capacity` samples
    ///
    /// Uses fallible allocation: an allocation failure is reported to the
    /// caller instead of aborting, so the driver can surface it and halt.
    pub fn allocate(capacity: usize) -> Result<Self, AllocationError> {
        let mut samples = Vec::new();
        samples
            .try_reserve_exact(capacity)
            .map_err(|source| AllocationError::OutOfMemory {
                requested: capacity,
                source,
            })?;
        samples.resize(capacity, 0);
        Ok(Self { samples })
    }

    /// Window length in samples
    pub fn capacity(&self) -> usize {
        self.samples.len()
    }

    /// Window size in bytes, for startup status output
    pub fn size_bytes(&self) -> usize {
        self.samples.len() * std::mem::size_of::<i16>()
    }

    /// Write one sample
    ///
    /// Returns `false` for an out-of-range index; the window is never grown.
    pub fn write(&mut self, index: usize, value: i16) -> bool {
        match self.samples.get_mut(index) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    /// Read one sample. Indices past the window read as silence (zero).
    pub fn read(&self, index: usize) -> i16 {
        self.samples.get(index).copied().unwrap_or(0)
    }

    /// Zero the whole window
    ///
    /// The driver clears before every fill so an aborted fill leaves the
    /// unwritten tail readable as silence.
    pub fn clear(&mut self) {
        self.samples.fill(0);
    }

    /// View the raw window
    pub fn as_slice(&self) -> &[i16] {
        &self.samples
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocate() {
        let buffer = SampleBuffer::allocate(48000).unwrap();
        assert_eq!(buffer.capacity(), 48000);
        assert_eq!(buffer.size_bytes(), 96000);
    }

    #[test]
    fn test_allocate_zeroed() {
        let buffer = SampleBuffer::allocate(256).unwrap();
        assert!(buffer.as_slice().iter().all(|&s| s == 0));
    }

    #[test]
    fn test_allocation_failure() {
        // Capacity overflow is reported, not panicked
        let result = SampleBuffer::allocate(usize::MAX);
        assert!(matches!(
            result,
            Err(AllocationError::OutOfMemory { requested, .. }) if requested == usize::MAX
        ));
    }

    #[test]
    fn test_write_read() {
        let mut buffer = SampleBuffer::allocate(16).unwrap();
        assert!(buffer.write(0, i16::MAX));
        assert!(buffer.write(15, i16::MIN));
        assert_eq!(buffer.read(0), i16::MAX);
        assert_eq!(buffer.read(15), i16::MIN);
    }

    #[test]
    fn test_write_out_of_range_rejected() {
        let mut buffer = SampleBuffer::allocate(16).unwrap();
        assert!(!buffer.write(16, 1234));
        assert_eq!(buffer.capacity(), 16, "Window must never grow");
    }

    #[test]
    fn test_read_past_capacity_is_silence() {
        let buffer = SampleBuffer::allocate(16).unwrap();
        assert_eq!(buffer.read(16), 0);
        assert_eq!(buffer.read(usize::MAX), 0);
    }

    #[test]
    fn test_clear() {
        let mut buffer = SampleBuffer::allocate(16).unwrap();
        buffer.write(3, -42);
        buffer.clear();
        assert_eq!(buffer.read(3), 0);
    }
}
