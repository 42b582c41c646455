//! Core traits implemented by trained models
//!
//! Evaluation harnesses and downstream consumers only ever see these three
//! interfaces: a binary decision function, a multiclass predictor, and a
//! density value. Training happens on the concrete fitter types, which hand
//! back an implementation of the matching trait.

use crate::core::Prediction;

/// Trained binary classifier
pub trait Classifier<T>: Send + Sync {
    /// Raw decision value for an input (sign encodes the class)
    fn decision_function(&self, input: &T) -> f64;

    /// Predict a single input
    fn predict(&self, input: &T) -> Prediction {
        let value = self.decision_function(input);
        let label = if value >= 0.0 { 1 } else { -1 };
        Prediction::new(label, value)
    }
}

/// Trained multiclass classifier
pub trait MulticlassClassifier<T>: Send + Sync {
    /// Predict the class label of an input
    fn predict(&self, input: &T) -> i32;
}

/// Trained density estimator
pub trait DensityFunction<T>: Send + Sync {
    /// Estimated (unnormalized) density at an input
    fn value_of(&self, input: &T) -> f64;
}
