//! Pairwise SMO-style density estimation
//!
//! One-class dual solver over the box [0, C] with the total weight mass
//! fixed at 1 by initialization; every pairwise step conserves the sum of
//! the two weights it touches. The solver keeps a gradient cache
//! `g_i = sum_j alpha_j K(i, j) - 1` that is refreshed incrementally in O(n)
//! after every accepted step, and evaluates the kernel on demand through an
//! LRU cache instead of materializing the Gram matrix.
//!
//! Working-set selection follows the classic two-loop structure: sweeps
//! alternate between examining all samples and only the non-bound ones,
//! and each KKT violator searches for a partner in three escalating passes.

use crate::cache::KernelCache;
use crate::core::{KernelMachineError, Result};
use crate::density::KernelDensity;
use crate::kernel::Kernel;
use log::{debug, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;

/// Configuration for the pairwise SMO density solver
#[derive(Debug, Clone)]
pub struct SmoDensityConfig {
    /// One-class parameter in (0, 1]; the box is [0, 1 / (nu * n)]
    pub nu: f64,
    /// KKT violation tolerance
    pub tolerance: f64,
    /// Numerical slack for bound membership and the step no-op guard
    pub epsilon: f64,
    /// Hard cap on optimization sweeps
    pub max_iterations: usize,
    /// Kernel cache budget in bytes
    pub cache_size: usize,
    /// Seed for the randomized partner sweeps
    pub seed: u64,
}

impl Default for SmoDensityConfig {
    fn default() -> Self {
        Self {
            nu: 0.5,
            tolerance: 1e-3,
            epsilon: 1e-8,
            max_iterations: 1_000_000,
            cache_size: 100_000_000, // 100MB
            seed: 42,
        }
    }
}

/// SMO-style pairwise density estimator
pub struct SmoDensity<K> {
    kernel: Arc<K>,
    config: SmoDensityConfig,
}

impl<K> SmoDensity<K> {
    /// Create a solver with the given kernel and configuration
    pub fn new(kernel: K, config: SmoDensityConfig) -> Self {
        Self {
            kernel: Arc::new(kernel),
            config,
        }
    }

    /// Create a solver with the default configuration
    pub fn with_kernel(kernel: K) -> Self {
        Self::new(kernel, SmoDensityConfig::default())
    }

    /// Get the solver configuration
    pub fn config(&self) -> &SmoDensityConfig {
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
        if !(self.config.nu > 0.0 && self.config.nu <= 1.0) {
            return Err(KernelMachineError::InvalidParameter(format!(
                "nu must lie in (0, 1], got {}",
                self.config.nu
            )));
        }

        let n = samples.len();
        let uniform = 1.0 / n as f64;
        let mut state = SmoState {
            kernel: self.kernel.as_ref(),
            samples,
            cache: KernelCache::with_memory_limit(self.config.cache_size),
            diag: Vec::with_capacity(n),
            alpha: vec![uniform; n],
            gradient: vec![0.0; n],
            c: 1.0 / (self.config.nu * n as f64),
            tolerance: self.config.tolerance,
            epsilon: self.config.epsilon,
            rng: StdRng::seed_from_u64(self.config.seed),
        };
        for i in 0..n {
            state.diag.push(self.kernel.self_similarity(&samples[i]));
        }
        // the uniform start makes one full pass over the kernel unavoidable;
        // every later refresh is incremental
        for i in 0..n {
            let mut g = -1.0;
            for j in 0..n {
                g += uniform * state.kernel_value(i, j);
            }
            state.gradient[i] = g;
        }

        let mut examine_all = true;
        let mut num_changed = 0;
        let mut sweeps = 0;

        while (num_changed > 0 || examine_all) && sweeps < self.config.max_iterations {
            num_changed = 0;
            if examine_all {
                for i in 0..n {
                    if state.examine(i) {
                        num_changed += 1;
                    }
                }
            } else {
                for i in 0..n {
                    if state.is_non_bound(i) && state.examine(i) {
                        num_changed += 1;
                    }
                }
            }

            if examine_all {
                examine_all = false;
            } else if num_changed == 0 {
                examine_all = true;
            }
            sweeps += 1;
        }

        if sweeps >= self.config.max_iterations {
            warn!(
                "SMO density solver hit the {} sweep cap; returning best effort",
                self.config.max_iterations
            );
        } else {
            debug!(
                "SMO density solver finished after {} sweeps (cache hit rate {:.2})",
                sweeps,
                state.cache.hit_rate()
            );
        }

        Ok(KernelDensity::new(
            Arc::clone(&self.kernel),
            samples.to_vec(),
            state.alpha,
        ))
    }
}

/// Mutable solver state shared by the examine/optimize steps
struct SmoState<'a, T, K: Kernel<T>> {
    kernel: &'a K,
    samples: &'a [T],
    cache: KernelCache,
    diag: Vec<f64>,
    alpha: Vec<f64>,
    gradient: Vec<f64>,
    c: f64,
    tolerance: f64,
    epsilon: f64,
    rng: StdRng,
}

impl<'a, T, K: Kernel<T>> SmoState<'a, T, K> {
    /// Kernel value through the LRU cache (diagonal is precomputed)
    fn kernel_value(&mut self, i: usize, j: usize) -> f64 {
        if i == j {
            return self.diag[i];
        }
        if let Some(value) = self.cache.get(i, j) {
            return value;
        }
        let value = self.kernel.similarity(&self.samples[i], &self.samples[j]);
        self.cache.put(i, j, value);
        value
    }

    fn is_non_bound(&self, i: usize) -> bool {
        self.alpha[i] > self.epsilon && self.alpha[i] < self.c - self.epsilon
    }

    /// Check KKT conditions for `i1` and try to optimize it against a
    /// partner found in three escalating passes.
    fn examine(&mut self, i1: usize) -> bool {
        let g1 = self.gradient[i1];
        let a1 = self.alpha[i1];
        let violates = (g1 < -self.tolerance && a1 < self.c - self.epsilon)
            || (g1 > self.tolerance && a1 > self.epsilon);
        if !violates {
            return false;
        }

        let n = self.samples.len();

        // pass 1: the non-bound partner with the largest gradient gap
        let mut best: Option<usize> = None;
        let mut best_gap = 0.0;
        for i2 in 0..n {
            if i2 == i1 || !self.is_non_bound(i2) {
                continue;
            }
            let gap = (g1 - self.gradient[i2]).abs();
            if gap > best_gap {
                best_gap = gap;
                best = Some(i2);
            }
        }
        if let Some(i2) = best {
            if self.optimize(i1, i2) {
                return true;
            }
        }

        // pass 2: randomized sweep over the non-bound samples
        let start = self.rng.gen_range(0..n);
        for offset in 0..n {
            let i2 = (start + offset) % n;
            if i2 != i1 && self.is_non_bound(i2) && self.optimize(i1, i2) {
                return true;
            }
        }

        // pass 3: randomized sweep over all samples
        let start = self.rng.gen_range(0..n);
        for offset in 0..n {
            let i2 = (start + offset) % n;
            if i2 != i1 && self.optimize(i1, i2) {
                return true;
            }
        }

        false
    }

    /// Analytic two-variable step under `alpha_1 + alpha_2 = const` and the
    /// box [0, C]. Returns whether the step was accepted.
    fn optimize(&mut self, i1: usize, i2: usize) -> bool {
        if i1 == i2 {
            return false;
        }

        let a1 = self.alpha[i1];
        let a2 = self.alpha[i2];
        let total = a1 + a2;
        let low = (total - self.c).max(0.0);
        let high = total.min(self.c);
        if low >= high {
            return false;
        }

        let k11 = self.diag[i1];
        let k22 = self.diag[i2];
        let k12 = self.kernel_value(i1, i2);
        let eta = 2.0 * k12 - k11 - k22;
        let slope = self.gradient[i1] - self.gradient[i2];

        let a2_new = if eta < 0.0 {
            (a2 - slope / eta).clamp(low, high)
        } else {
            // degenerate 2x2 sub-kernel: compare the objective at the ends
            let t_low = low - a2;
            let t_high = high - a2;
            let obj_low = slope * t_low + 0.5 * eta * t_low * t_low;
            let obj_high = slope * t_high + 0.5 * eta * t_high * t_high;
            if obj_low > obj_high + self.epsilon {
                low
            } else if obj_high > obj_low + self.epsilon {
                high
            } else {
                return false;
            }
        };

        if (a2_new - a2).abs() < self.epsilon * (a2_new + a2 + self.epsilon) {
            return false;
        }
        let a1_new = total - a2_new;

        // O(n) incremental refresh of the gradient cache
        let d1 = a1_new - a1;
        let d2 = a2_new - a2;
        for k in 0..self.samples.len() {
            let k1 = self.kernel_value(i1, k);
            let k2 = self.kernel_value(i2, k);
            self.gradient[k] += d1 * k1 + d2 * k2;
        }

        self.alpha[i1] = a1_new;
        self.alpha[i2] = a2_new;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::{GaussianKernel, LinearKernel};

    #[test]
    fn test_smo_density_empty_dataset() {
        let solver = SmoDensity::with_kernel(GaussianKernel::new(1.0));
        let samples: Vec<Vec<f64>> = vec![];
        assert!(matches!(
            solver.fit(&samples),
            Err(KernelMachineError::EmptyDataset)
        ));
    }

    #[test]
    fn test_smo_density_invalid_nu() {
        let config = SmoDensityConfig {
            nu: 0.0,
            ..Default::default()
        };
        let solver = SmoDensity::new(GaussianKernel::new(1.0), config);
        assert!(matches!(
            solver.fit(&[vec![1.0]]),
            Err(KernelMachineError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_smo_density_mass_and_box_invariants() {
        let solver = SmoDensity::with_kernel(GaussianKernel::new(1.0));
        let samples: Vec<Vec<f64>> = (0..24)
            .map(|i| vec![(i as f64 * 0.37).sin(), (i as f64 * 0.61).cos()])
            .collect();
        let density = solver.fit(&samples).unwrap();

        let c = 1.0 / (0.5 * samples.len() as f64);
        let mass: f64 = density.alpha().iter().sum();
        assert!((mass - 1.0).abs() < 1e-9, "weight mass drifted to {}", mass);
        for &a in density.alpha() {
            assert!((-1e-12..=c + 1e-12).contains(&a), "alpha {} outside box", a);
        }
    }

    #[test]
    fn test_smo_density_peaks_on_data() {
        let solver = SmoDensity::with_kernel(GaussianKernel::new(1.0));
        let samples: Vec<Vec<f64>> = (0..18).map(|i| vec![(i % 6) as f64 * 0.2]).collect();
        let density = solver.fit(&samples).unwrap();

        assert!(density.value_of(&vec![0.5]) > density.value_of(&vec![7.0]));
    }

    #[test]
    fn test_smo_density_degenerate_kernel_terminates() {
        // identical samples under a linear kernel give eta = 0 everywhere
        let solver = SmoDensity::with_kernel(LinearKernel::new());
        let samples: Vec<Vec<f64>> = vec![vec![1.0, 1.0]; 10];
        let density = solver.fit(&samples).unwrap();

        let mass: f64 = density.alpha().iter().sum();
        assert!((mass - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_smo_density_is_seeded() {
        let samples: Vec<Vec<f64>> = (0..16)
            .map(|i| vec![(i as f64 * 0.7).sin(), (i as f64 * 0.3).cos()])
            .collect();

        let a = SmoDensity::with_kernel(GaussianKernel::new(0.8))
            .fit(&samples)
            .unwrap();
        let b = SmoDensity::with_kernel(GaussianKernel::new(0.8))
            .fit(&samples)
            .unwrap();
        assert_eq!(a.alpha(), b.alpha());
    }
}
