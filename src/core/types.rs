//! Core type definitions for kernel machines

/// Training sample pairing an opaque input with an integer label
///
/// Labels are +1/-1 for binary classifiers and arbitrary small integers for
/// multiclass training. Density estimators ignore labels entirely and consume
/// bare inputs instead.
#[derive(Clone, Debug, PartialEq)]
pub struct Sample<T> {
    /// Opaque input payload (dense vector, index, ...)
    pub input: T,
    /// Class label
    pub label: i32,
}

impl<T> Sample<T> {
    /// Create a new labeled sample
    pub fn new(input: T, label: i32) -> Self {
        Self { input, label }
    }
}

/// Prediction result containing label and decision value
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prediction {
    /// Predicted class label
    pub label: i32,
    /// Raw decision function value
    pub decision_value: f64,
}

impl Prediction {
    /// Create a new prediction
    pub fn new(label: i32, decision_value: f64) -> Self {
        Self {
            label,
            decision_value,
        }
    }

    /// Get confidence as absolute value of decision value
    pub fn confidence(&self) -> f64 {
        self.decision_value.abs()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample() {
        let sample = Sample::new(vec![1.0, 2.0], 1);
        assert_eq!(sample.label, 1);
        assert_eq!(sample.input, vec![1.0, 2.0]);
    }

    #[test]
    fn test_prediction() {
        let pred = Prediction::new(1, 2.5);
        assert_eq!(pred.label, 1);
        assert_eq!(pred.decision_value, 2.5);
        assert_eq!(pred.confidence(), 2.5);

        let neg_pred = Prediction::new(-1, -1.8);
        assert_eq!(neg_pred.confidence(), 1.8);
    }
}
