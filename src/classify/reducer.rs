//! Best-class selection over a ranked result set

use crate::classify::Classification;

/// Label reported when no score beats zero confidence
pub const UNKNOWN_LABEL: &str = "Unknown";

/// Select the best-confidence label from a classification result
///
/// Linear scan with a strictly-greater comparison, so the first label
/// encountered among exact ties wins. An all-zero result set reports
/// `("Unknown", 0.0)` deterministically. No side effects.
pub fn best_class(result: &Classification) -> (String, f32) {
    let mut best_label = UNKNOWN_LABEL.to_string();
    let mut best_confidence = 0.0f32;

    for score in &result.scores {
        if score.confidence > best_confidence {
            best_confidence = score.confidence;
            best_label = score.label.clone();
        }
    }

    (best_label, best_confidence)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::Score;

    fn result_of(pairs: &[(&str, f32)]) -> Classification {
        Classification {
            scores: pairs
                .iter()
                .map(|(label, confidence)| Score {
                    label: label.to_string(),
                    confidence: *confidence,
                })
                .collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_picks_highest() {
        let result = result_of(&[("sine", 0.2), ("noise", 0.7), ("chirp", 0.1)]);
        let (label, confidence) = best_class(&result);
        assert_eq!(label, "noise");
        assert_eq!(confidence, 0.7);
    }

    #[test]
    fn test_all_zero_reports_sentinel() {
        let result = result_of(&[("a", 0.0), ("b", 0.0)]);
        assert_eq!(best_class(&result), (UNKNOWN_LABEL.to_string(), 0.0));
    }

    #[test]
    fn test_empty_reports_sentinel() {
        let result = Classification::default();
        assert_eq!(best_class(&result), (UNKNOWN_LABEL.to_string(), 0.0));
    }

    #[test]
    fn test_ties_keep_first_seen() {
        let result = result_of(&[("A", 0.5), ("B", 0.5), ("C", 0.3)]);
        let (label, confidence) = best_class(&result);
        assert_eq!(label, "A", "First-seen label wins exact ties");
        assert_eq!(confidence, 0.5);
    }

    #[test]
    fn test_no_mutation() {
        let result = result_of(&[("x", 0.4)]);
        best_class(&result);
        best_class(&result);
        assert_eq!(result.scores.len(), 1);
        assert_eq!(result.scores[0].confidence, 0.4);
    }
}
