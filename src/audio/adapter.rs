//! Pull-based adapter between the sample window and the classifier
//!
//! The classification engine never touches the raw buffer; it pulls
//! normalized float spans through [`SignalWindow::get`], which zero-fills
//! any range past the window.

use crate::audio::buffer::SampleBuffer;

/// Full-scale divisor mapping i16 samples into `[-1.0, 1.0]`
const FULL_SCALE: f32 = 32767.0;

/// Offset-addressable float view over one sample window
///
/// Stateless beyond the borrow of the current buffer; constructed fresh per
/// classification call. Pure and reentrant.
///
/// # Example
/// ```
/// use toneprobe::audio::adapter::SignalWindow;
/// use toneprobe::audio::buffer::SampleBuffer;
///
/// let mut buffer = SampleBuffer::allocate(8).unwrap();
/// buffer.write(0, 32767);
/// let window = SignalWindow::new(&buffer);
/// let mut out = [0.0f32; 4];
/// window.get(0, &mut out);
/// assert!((out[0] - 1.0).abs() < 1e-6);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct SignalWindow<'a> {
    buffer: &'a SampleBuffer,
    total_length: usize,
}

impl<'a> SignalWindow<'a> {
    /// Create a view over the whole buffer
    pub fn new(buffer: &'a SampleBuffer) -> Self {
        Self {
            total_length: buffer.capacity(),
            buffer,
        }
    }

    /// Declared window length in samples
    pub fn total_length(&self) -> usize {
        self.total_length
    }

    /// Fill `out` with normalized samples starting at `offset`
    ///
    /// Writes exactly `out.len()` values. Positions at or past
    /// `total_length` are written as `0.0`; everything else is the buffer
    /// sample scaled by 1/32767.
    pub fn get(&self, offset: usize, out: &mut [f32]) {
        for (j, slot) in out.iter_mut().enumerate() {
            let index = offset.saturating_add(j);
            *slot = if index < self.total_length {
                f32::from(self.buffer.read(index)) / FULL_SCALE
            } else {
                0.0
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn window_of(values: &[i16]) -> SampleBuffer {
        let mut buffer = SampleBuffer::allocate(values.len()).unwrap();
        for (i, &v) in values.iter().enumerate() {
            buffer.write(i, v);
        }
        buffer
    }

    #[test]
    fn test_normalization() {
        let buffer = window_of(&[32767, -32767, 16384, 0]);
        let window = SignalWindow::new(&buffer);
        let mut out = [0.0f32; 4];
        window.get(0, &mut out);
        assert_relative_eq!(out[0], 1.0, epsilon = 1e-6);
        assert_relative_eq!(out[1], -1.0, epsilon = 1e-6);
        assert_relative_eq!(out[2], 0.5, epsilon = 1e-3);
        assert_relative_eq!(out[3], 0.0);
    }

    #[test]
    fn test_zero_fill_past_window() {
        let buffer = window_of(&[1000, 2000]);
        let window = SignalWindow::new(&buffer);
        let mut out = [9.9f32; 5];
        window.get(0, &mut out);
        assert!(out[0] != 0.0 && out[1] != 0.0);
        assert_eq!(&out[2..], &[0.0, 0.0, 0.0], "Tail must be exactly zero");
    }

    #[test]
    fn test_offset_reads() {
        let buffer = window_of(&[0, 0, 0, 32767]);
        let window = SignalWindow::new(&buffer);
        let mut out = [0.0f32; 2];
        window.get(3, &mut out);
        assert_relative_eq!(out[0], 1.0, epsilon = 1e-6);
        assert_eq!(out[1], 0.0);
    }

    #[test]
    fn test_offset_entirely_past_window() {
        let buffer = window_of(&[1, 2, 3]);
        let window = SignalWindow::new(&buffer);
        let mut out = [1.0f32; 8];
        window.get(100, &mut out);
        assert!(out.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_values_within_unit_range() {
        let buffer = window_of(&[i16::MAX, i16::MIN, 12345, -12345]);
        let window = SignalWindow::new(&buffer);
        let mut out = [0.0f32; 4];
        window.get(0, &mut out);
        for (i, &v) in out.iter().enumerate() {
            // i16::MIN normalizes slightly below -1.0 by one LSB; the
            // producers never write it, but the adapter still bounds it.
            assert!(
                (-1.0001..=1.0).contains(&v),
                "Sample {} out of range: {}",
                i,
                v
            );
        }
    }
}
