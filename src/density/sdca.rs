//! One-class stochastic dual coordinate ascent density estimation
//!
//! Each sweep visits every sample in a freshly shuffled order and applies the
//! closed-form coordinate update
//!
//! ```text
//! alpha_i <- clamp(alpha_i + (1 - z_i) / K(i, i), 0, C),   z_i = sum_j alpha_j K(i, j)
//! ```
//!
//! with the box C = 1/n. The re-shuffling every epoch is part of the
//! algorithm, not a nicety: cyclic visiting orders converge measurably worse.
//! There is no convergence test; the epoch budget is the only stop condition.

use crate::core::{KernelMachineError, Result};
use crate::density::KernelDensity;
use crate::kernel::Kernel;
use crate::linalg::vector;
use log::debug;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::sync::Arc;

/// Configuration for the SDCA density solver
#[derive(Debug, Clone)]
pub struct SdcaDensityConfig {
    /// Number of full passes over the data
    pub epochs: usize,
    /// Seed for the per-epoch shuffles
    pub seed: u64,
}

impl Default for SdcaDensityConfig {
    fn default() -> Self {
        Self {
            epochs: 100,
            seed: 42,
        }
    }
}

/// Stochastic coordinate-ascent density estimator
pub struct SdcaDensity<K> {
    kernel: Arc<K>,
    config: SdcaDensityConfig,
}

impl<K> SdcaDensity<K> {
    /// Create a solver with the given kernel and configuration
    pub fn new(kernel: K, config: SdcaDensityConfig) -> Self {
        Self {
            kernel: Arc::new(kernel),
            config,
        }
    }

    /// Create a solver with the default configuration
    pub fn with_kernel(kernel: K) -> Self {
        Self::new(kernel, SdcaDensityConfig::default())
    }

    /// Get the solver configuration
    pub fn config(&self) -> &SdcaDensityConfig {
        &self.config
    }

    /// Fit the density on unlabeled samples
    pub fn fit<T>(&self, samples: &[T]) -> Result<KernelDensity<T, K>>
    where
        T: Clone + Sync,
        K: Kernel<T>,
    {
        if samples.is_empty() {
            return Err(KernelMachineError::EmptyDataset);
        }

        let n = samples.len();
        let c = 1.0 / n as f64;
        let gram = self.kernel.gram_matrix(samples);
        let mut alpha = vec![0.0; n];
        let mut rng = StdRng::seed_from_u64(self.config.seed);
        let mut order: Vec<usize> = (0..n).collect();

        for epoch in 0..self.config.epochs {
            order.shuffle(&mut rng);
            for &i in &order {
                let k_ii = gram[(i, i)];
                if k_ii <= f64::EPSILON {
                    continue;
                }
                let z = vector::dot(gram.row(i), &alpha);
                alpha[i] = (alpha[i] + (1.0 - z) / k_ii).clamp(0.0, c);
            }
            debug!(
                "sdca density epoch {}/{}: weight mass {:.6}",
                epoch + 1,
                self.config.epochs,
                alpha.iter().sum::<f64>()
            );
        }

        Ok(KernelDensity::new(
            Arc::clone(&self.kernel),
            samples.to_vec(),
            alpha,
        ))
    }
}
