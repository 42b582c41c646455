//! Binary hinge-loss SVM trained by stochastic dual coordinate ascent
//!
//! The labeled sibling of the one-class coordinate solver: each visit applies
//! the closed-form update
//!
//! ```text
//! alpha_i <- clamp(alpha_i + (1 - y_i * z_i) / K(i, i), 0, C),
//! z_i = sum_j alpha_j y_j K(i, j)
//! ```
//!
//! over a freshly shuffled order per epoch. The trained machine keeps only
//! the support vectors and their signed weights; the decision function is
//! the usual kernel expansion without a bias term.

use crate::core::{Classifier, KernelMachineError, Result, Sample};
use crate::kernel::Kernel;
use crate::linalg::vector;
use log::debug;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::sync::Arc;

/// Weights below this are not kept as support vectors
const SUPPORT_THRESHOLD: f64 = 1e-12;

/// Configuration for the binary SDCA solver
#[derive(Debug, Clone)]
pub struct SdcaSvmConfig {
    /// Regularization parameter (upper bound for alpha)
    pub c: f64,
    /// Number of full passes over the data
    pub epochs: usize,
    /// Seed for the per-epoch shuffles
    pub seed: u64,
}

impl Default for SdcaSvmConfig {
    fn default() -> Self {
        Self {
            c: 1.0,
            epochs: 10,
            seed: 42,
        }
    }
}

/// Binary SVM solver using stochastic dual coordinate ascent
pub struct SdcaSvm<K> {
    kernel: Arc<K>,
    config: SdcaSvmConfig,
}

impl<K> SdcaSvm<K> {
    /// Create a solver with the given kernel and configuration
    pub fn new(kernel: K, config: SdcaSvmConfig) -> Self {
        Self {
            kernel: Arc::new(kernel),
            config,
        }
    }

    /// Create a solver with the default configuration
    pub fn with_kernel(kernel: K) -> Self {
        Self::new(kernel, SdcaSvmConfig::default())
    }

    pub(crate) fn from_shared(kernel: Arc<K>, config: SdcaSvmConfig) -> Self {
        Self { kernel, config }
    }

    /// Get the solver configuration
    pub fn config(&self) -> &SdcaSvmConfig {
        &self.config
    }

    /// Train on labeled samples (labels must be +1 or -1)
    pub fn fit<T>(&self, samples: &[Sample<T>]) -> Result<TrainedSdcaSvm<T, K>>
    where
        T: Clone + Sync,
        K: Kernel<T>,
    {
        if samples.is_empty() {
            return Err(KernelMachineError::EmptyDataset);
        }
        for sample in samples {
            if sample.label != 1 && sample.label != -1 {
                return Err(KernelMachineError::InvalidLabel(sample.label));
            }
        }

        let n = samples.len();
        let inputs: Vec<T> = samples.iter().map(|s| s.input.clone()).collect();
        let labels: Vec<f64> = samples.iter().map(|s| s.label as f64).collect();
        let gram = self.kernel.gram_matrix(&inputs);

        let mut alpha = vec![0.0; n];
        let mut alpha_y = vec![0.0; n];
        let mut rng = StdRng::seed_from_u64(self.config.seed);
        let mut order: Vec<usize> = (0..n).collect();

        for epoch in 0..self.config.epochs {
            order.shuffle(&mut rng);
            for &i in &order {
                let k_ii = gram[(i, i)];
                if k_ii <= f64::EPSILON {
                    continue;
                }
                let z = vector::dot(gram.row(i), &alpha_y);
                alpha[i] = (alpha[i] + (1.0 - labels[i] * z) / k_ii).clamp(0.0, self.config.c);
                alpha_y[i] = alpha[i] * labels[i];
            }
            debug!(
                "sdca svm epoch {}/{}: active weights {}",
                epoch + 1,
                self.config.epochs,
                alpha.iter().filter(|&&a| a > SUPPORT_THRESHOLD).count()
            );
        }

        let mut support = Vec::new();
        let mut support_alpha_y = Vec::new();
        for (i, sample) in samples.iter().enumerate() {
            if alpha[i] > SUPPORT_THRESHOLD {
                support.push(sample.clone());
                support_alpha_y.push(alpha_y[i]);
            }
        }

        Ok(TrainedSdcaSvm {
            kernel: Arc::clone(&self.kernel),
            support,
            alpha_y: support_alpha_y,
        })
    }
}

/// Trained binary SDCA machine
pub struct TrainedSdcaSvm<T, K> {
    kernel: Arc<K>,
    support: Vec<Sample<T>>,
    alpha_y: Vec<f64>,
}

impl<T, K: Kernel<T>> TrainedSdcaSvm<T, K> {
    /// Decision value `sum_i alpha_i y_i K(x_i, x)`
    pub fn decision_function(&self, input: &T) -> f64 {
        self.support
            .iter()
            .zip(self.alpha_y.iter())
            .map(|(sv, ay)| ay * self.kernel.similarity(&sv.input, input))
            .sum()
    }

    /// Support vectors kept after training
    pub fn support_vectors(&self) -> &[Sample<T>] {
        &self.support
    }

    /// Signed dual weights (alpha_i * y_i), one per support vector
    pub fn alpha_y(&self) -> &[f64] {
        &self.alpha_y
    }

    /// Number of support vectors
    pub fn n_support_vectors(&self) -> usize {
        self.support.len()
    }

    /// The kernel the machine was trained with
    pub fn kernel(&self) -> &K {
        &self.kernel
    }
}

impl<T: Send + Sync, K: Kernel<T>> Classifier<T> for TrainedSdcaSvm<T, K> {
    fn decision_function(&self, input: &T) -> f64 {
        TrainedSdcaSvm::decision_function(self, input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::LinearKernel;

    fn separable_samples() -> Vec<Sample<Vec<f64>>> {
        vec![
            Sample::new(vec![2.0, 0.5], 1),
            Sample::new(vec![1.5, 1.0], 1),
            Sample::new(vec![2.2, -0.3], 1),
            Sample::new(vec![-2.0, -0.5], -1),
            Sample::new(vec![-1.5, -1.0], -1),
            Sample::new(vec![-2.2, 0.3], -1),
        ]
    }

    #[test]
    fn test_sdca_svm_empty_dataset() {
        let solver = SdcaSvm::with_kernel(LinearKernel::new());
        let samples: Vec<Sample<Vec<f64>>> = vec![];
        assert!(matches!(
            solver.fit(&samples),
            Err(KernelMachineError::EmptyDataset)
        ));
    }

    #[test]
    fn test_sdca_svm_invalid_label() {
        let solver = SdcaSvm::with_kernel(LinearKernel::new());
        let samples = vec![Sample::new(vec![1.0], 3)];
        assert!(matches!(
            solver.fit(&samples),
            Err(KernelMachineError::InvalidLabel(3))
        ));
    }

    #[test]
    fn test_sdca_svm_separates_training_data() {
        let solver = SdcaSvm::with_kernel(LinearKernel::new());
        let samples = separable_samples();
        let model = solver.fit(&samples).unwrap();

        assert!(model.n_support_vectors() > 0);
        for sample in &samples {
            let margin = sample.label as f64 * model.decision_function(&sample.input);
            assert!(margin > 0.0, "margin {} for label {}", margin, sample.label);
        }
    }

    #[test]
    fn test_sdca_svm_predict_through_trait() {
        let solver = SdcaSvm::with_kernel(LinearKernel::new());
        let model = solver.fit(&separable_samples()).unwrap();

        let prediction = model.predict(&vec![1.8, 0.2]);
        assert_eq!(prediction.label, 1);
        assert!(prediction.confidence() > 0.0);
    }

    #[test]
    fn test_sdca_svm_weights_bounded_by_c() {
        let config = SdcaSvmConfig {
            c: 0.25,
            ..Default::default()
        };
        let solver = SdcaSvm::new(LinearKernel::new(), config);
        let model = solver.fit(&separable_samples()).unwrap();

        for &ay in model.alpha_y() {
            assert!(ay.abs() <= 0.25 + 1e-12);
        }
    }

    #[test]
    fn test_sdca_svm_is_seeded() {
        let samples = separable_samples();
        let a = SdcaSvm::with_kernel(LinearKernel::new()).fit(&samples).unwrap();
        let b = SdcaSvm::with_kernel(LinearKernel::new()).fit(&samples).unwrap();
        assert_eq!(a.alpha_y(), b.alpha_y());
    }
}
