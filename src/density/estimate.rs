//! Trained kernel density expansion
//!
//! Every kernel-based density fitter in this module produces the same
//! artifact: a weight per stored sample, evaluated as the kernel expansion
//! f(x) = sum_i alpha_i * K(x_i, x). Evaluation costs one kernel call per
//! stored sample, the natural price of a non-parametric estimator.

use crate::core::DensityFunction;
use crate::kernel::Kernel;
use std::sync::Arc;

/// Kernel expansion density produced by the density fitters
pub struct KernelDensity<T, K> {
    kernel: Arc<K>,
    samples: Vec<T>,
    alpha: Vec<f64>,
}

impl<T, K: Kernel<T>> KernelDensity<T, K> {
    pub(crate) fn new(kernel: Arc<K>, samples: Vec<T>, alpha: Vec<f64>) -> Self {
        debug_assert_eq!(samples.len(), alpha.len());
        Self {
            kernel,
            samples,
            alpha,
        }
    }

    /// Evaluate the expansion at an input
    pub fn value_of(&self, input: &T) -> f64 {
        self.samples
            .iter()
            .zip(self.alpha.iter())
            .map(|(sample, alpha)| alpha * self.kernel.similarity(sample, input))
            .sum()
    }

    /// Dual weights, one per stored sample
    pub fn alpha(&self) -> &[f64] {
        &self.alpha
    }

    /// Stored training samples
    pub fn samples(&self) -> &[T] {
        &self.samples
    }

    /// Number of samples with non-negligible weight
    pub fn support_size(&self) -> usize {
        self.alpha.iter().filter(|&&a| a.abs() > 1e-12).count()
    }
}

impl<T: Send + Sync, K: Kernel<T>> DensityFunction<T> for KernelDensity<T, K> {
    fn value_of(&self, input: &T) -> f64 {
        KernelDensity::value_of(self, input)
    }
}
