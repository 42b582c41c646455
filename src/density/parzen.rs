//! Parzen window density estimation
//!
//! The simplest kernel density estimator: every training sample carries the
//! same weight 1/n. There is nothing to optimize; fitting just stores the
//! samples.

use crate::core::{KernelMachineError, Result};
use crate::density::KernelDensity;
use crate::kernel::Kernel;
use std::sync::Arc;

/// Parzen window density estimator
pub struct ParzenDensity<K> {
    kernel: Arc<K>,
}

impl<K> ParzenDensity<K> {
    /// Create a Parzen estimator over the given kernel
    pub fn new(kernel: K) -> Self {
        Self {
            kernel: Arc::new(kernel),
        }
    }

    /// Fit the estimator by storing the samples with uniform weights
    pub fn fit<T: Clone>(&self, samples: &[T]) -> Result<KernelDensity<T, K>>
    where
        K: Kernel<T>,
    {
        if samples.is_empty() {
            return Err(KernelMachineError::EmptyDataset);
        }
        let weight = 1.0 / samples.len() as f64;
        Ok(KernelDensity::new(
            Arc::clone(&self.kernel),
            samples.to_vec(),
            vec![weight; samples.len()],
        ))
    }
}
