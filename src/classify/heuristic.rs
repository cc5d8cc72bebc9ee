//! Stand-in classification engine for the shipped binary
//!
//! Discriminates the six test waveforms from cheap time-domain features
//! (RMS energy, crest factor, zero-crossing rate). It exists so the binary
//! has a working engine behind the [`Classifier`] boundary until a trained
//! model is linked; swapping in a real engine touches nothing outside this
//! file.

use crate::audio::adapter::SignalWindow;
use crate::audio::signal::SignalKind;
use crate::classify::{Classification, Classifier, ClassifyError, Score, Timing};
use crate::CHUNK_SAMPLES;
use std::time::Instant;

/// RMS below this is silence
const SILENCE_RMS: f32 = 1e-4;

/// Crest factor (peak/RMS) above this is an impulse train
const IMPULSE_CREST: f32 = 4.0;

/// Zero-crossing rate above this is broadband noise (the chirp sweep tops
/// out near 0.28 at 16 kHz; noise sits near 0.5)
const NOISE_ZCR: f32 = 0.4;

/// Crest factor below this is a square wave (ideal square has crest 1.0)
const SQUARE_CREST: f32 = 1.2;

/// Zero-crossing rate separating the chirp sweep from the 440 Hz sine
const CHIRP_ZCR: f32 = 0.09;

/// Confidence assigned to the matched kind / the remaining kinds
const MATCH_CONFIDENCE: f32 = 0.92;
const REST_CONFIDENCE: f32 = 0.016;

/// Time-domain feature summary of one window
#[derive(Debug, Clone, Copy)]
struct Features {
    rms: f32,
    crest: f32,
    zcr: f32,
}

/// Zero-crossing-rate / energy discriminator over the six test kinds
pub struct HeuristicClassifier {
    chunk: Vec<f32>,
}

impl HeuristicClassifier {
    pub fn new() -> Self {
        Self {
            chunk: vec![0.0f32; CHUNK_SAMPLES],
        }
    }

    /// Single pass over the window through the pull adapter
    fn measure(&mut self, window: &SignalWindow) -> Features {
        let total = window.total_length();
        let mut sum_sq = 0.0f64;
        let mut peak = 0.0f32;
        let mut crossings = 0usize;
        let mut previous = 0.0f32;

        let mut offset = 0usize;
        while offset < total {
            let len = self.chunk.len().min(total - offset);
            window.get(offset, &mut self.chunk[..len]);
            for &sample in &self.chunk[..len] {
                sum_sq += f64::from(sample) * f64::from(sample);
                if sample.abs() > peak {
                    peak = sample.abs();
                }
                if (previous > 0.0 && sample < 0.0) || (previous < 0.0 && sample > 0.0) {
                    crossings += 1;
                }
                if sample != 0.0 {
                    previous = sample;
                }
            }
            offset += len;
        }

        let rms = (sum_sq / total as f64).sqrt() as f32;
        Features {
            rms,
            crest: if rms > 0.0 { peak / rms } else { 0.0 },
            zcr: crossings as f32 / total as f32,
        }
    }

    fn decide(features: Features) -> SignalKind {
        if features.rms < SILENCE_RMS {
            SignalKind::Silence
        } else if features.crest > IMPULSE_CREST {
            SignalKind::Impulse
        } else if features.zcr > NOISE_ZCR {
            SignalKind::Noise
        } else if features.crest < SQUARE_CREST {
            SignalKind::Square
        } else if features.zcr > CHIRP_ZCR {
            SignalKind::Chirp
        } else {
            SignalKind::Sine
        }
    }
}

impl Default for HeuristicClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Classifier for HeuristicClassifier {
    fn classify(&mut self, window: &SignalWindow) -> Result<Classification, ClassifyError> {
        if window.total_length() == 0 {
            return Err(ClassifyError::WindowTooShort {
                actual: 0,
                required: 1,
            });
        }

        let started = Instant::now();
        let features = self.measure(window);
        let dsp_ms = started.elapsed().as_millis() as u64;

        let matched = Self::decide(features);
        let scores = SignalKind::SEQUENCE
            .iter()
            .map(|kind| Score {
                label: kind.label().to_string(),
                confidence: if *kind == matched {
                    MATCH_CONFIDENCE
                } else {
                    REST_CONFIDENCE
                },
            })
            .collect();

        tracing::debug!(
            rms = features.rms,
            crest = features.crest,
            zcr = features.zcr,
            matched = matched.label(),
            "Heuristic features"
        );

        Ok(Classification {
            scores,
            timing: Timing {
                dsp_ms,
                classification_ms: started.elapsed().as_millis() as u64 - dsp_ms,
                anomaly_ms: 0,
            },
            anomaly: None,
        })
    }

    fn name(&self) -> &'static str {
        "heuristic (time-domain stand-in)"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::buffer::SampleBuffer;
    use crate::audio::signal::WaveformGenerator;
    use crate::classify::reducer::best_class;

    fn window_of(kind: SignalKind) -> SampleBuffer {
        let mut buffer = SampleBuffer::allocate(16000).unwrap();
        let mut generator = WaveformGenerator::new(kind, 16000, 16000);
        for i in 0..16000 {
            buffer.write(i, generator.sample(i));
        }
        buffer
    }

    #[test]
    fn test_recognizes_each_kind() {
        let mut classifier = HeuristicClassifier::new();
        for kind in SignalKind::SEQUENCE {
            let buffer = window_of(kind);
            let result = classifier.classify(&SignalWindow::new(&buffer)).unwrap();
            let (label, confidence) = best_class(&result);
            assert_eq!(label, kind.label(), "Misclassified {:?}", kind);
            assert!(confidence > 0.5);
        }
    }

    #[test]
    fn test_score_count_is_fixed() {
        let mut classifier = HeuristicClassifier::new();
        let buffer = window_of(SignalKind::Sine);
        let result = classifier.classify(&SignalWindow::new(&buffer)).unwrap();
        assert_eq!(result.scores.len(), SignalKind::SEQUENCE.len());
    }

    #[test]
    fn test_empty_window_rejected() {
        let mut classifier = HeuristicClassifier::new();
        let buffer = SampleBuffer::allocate(0).unwrap();
        let result = classifier.classify(&SignalWindow::new(&buffer));
        assert!(matches!(
            result,
            Err(ClassifyError::WindowTooShort { actual: 0, .. })
        ));
    }

    #[test]
    fn test_deterministic() {
        let mut classifier = HeuristicClassifier::new();
        let buffer = window_of(SignalKind::Chirp);
        let a = classifier.classify(&SignalWindow::new(&buffer)).unwrap();
        let b = classifier.classify(&SignalWindow::new(&buffer)).unwrap();
        let (label_a, conf_a) = best_class(&a);
        let (label_b, conf_b) = best_class(&b);
        assert_eq!(label_a, label_b);
        assert_eq!(conf_a, conf_b);
    }
}
