//! Nystrom kernel approximation
//!
//! Eigendecomposes the Gram matrix of a landmark subset and maps any input
//! to the low-dimensional feature vector
//! `phi(x)_l = sum_i U[i][l] * K(x_i, x) / sqrt(lambda_l)`, so that
//! `phi(x) . phi(y)` approximates `K(x, y)` at the cost of one kernel
//! evaluation per landmark instead of per training sample.
//!
//! Landmarks are either drawn uniformly or grown greedily: sample a random
//! candidate pool, score each candidate by how badly the current model
//! reconstructs its true kernel values, and keep the worst offender.

use crate::core::{KernelMachineError, Result};
use crate::kernel::Kernel;
use crate::linalg::vector;
use log::debug;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::sync::Arc;

/// Eigenvalues at or below this are dropped from the feature map
const COMPONENT_FLOOR: f64 = 1e-9;

/// How many landmarks the active-selection loop seeds before growing
const ACTIVE_SEED_COUNT: usize = 2;

/// Fitted Nystrom feature map
pub struct Nystrom<T, K> {
    kernel: Arc<K>,
    landmarks: Vec<T>,
    /// Feature axes over the landmarks, prescaled by `1 / sqrt(lambda)`
    axes: Vec<Vec<f64>>,
}

impl<T, K: Kernel<T>> Nystrom<T, K> {
    /// Fit on a uniformly sampled landmark subset
    pub fn fit(kernel: K, samples: &[T], landmarks: usize, seed: u64) -> Result<Self>
    where
        T: Clone + Sync,
    {
        validate_subset(samples.len(), landmarks)?;
        let mut rng = StdRng::seed_from_u64(seed);
        let mut indices: Vec<usize> = (0..samples.len()).collect();
        indices.shuffle(&mut rng);
        let chosen: Vec<T> = indices
            .into_iter()
            .take(landmarks)
            .map(|i| samples[i].clone())
            .collect();
        Self::fit_on_landmarks(Arc::new(kernel), chosen)
    }

    /// Fit with greedy active landmark selection
    ///
    /// Grows the subset one landmark at a time: each round scores a random
    /// pool of `pool_size` remaining samples by the squared reconstruction
    /// error of their kernel values against the current landmarks and keeps
    /// the worst-reconstructed candidate. A worst-case-reduction heuristic,
    /// not an optimal subset.
    pub fn fit_active(
        kernel: K,
        samples: &[T],
        landmarks: usize,
        pool_size: usize,
        seed: u64,
    ) -> Result<Self>
    where
        T: Clone + Sync,
    {
        validate_subset(samples.len(), landmarks)?;
        if pool_size == 0 {
            return Err(KernelMachineError::InvalidParameter(
                "active selection pool must not be empty".to_string(),
            ));
        }

        let kernel = Arc::new(kernel);
        let mut rng = StdRng::seed_from_u64(seed);
        let mut remaining: Vec<usize> = (0..samples.len()).collect();
        remaining.shuffle(&mut rng);

        let seed_count = ACTIVE_SEED_COUNT.min(landmarks);
        let mut chosen: Vec<usize> = remaining.split_off(remaining.len() - seed_count);

        while chosen.len() < landmarks {
            let landmarks_so_far: Vec<T> = chosen.iter().map(|&i| samples[i].clone()).collect();
            let current = Self::fit_on_landmarks(Arc::clone(&kernel), landmarks_so_far)?;

            remaining.shuffle(&mut rng);
            let pool = &remaining[..pool_size.min(remaining.len())];
            let mut worst = pool[0];
            let mut worst_error = f64::NEG_INFINITY;
            for &candidate in pool {
                let error = current.reconstruction_error(&samples[candidate]);
                if error > worst_error {
                    worst_error = error;
                    worst = candidate;
                }
            }
            debug!(
                "active nystrom: landmark {}/{} picked with error {:.3e}",
                chosen.len() + 1,
                landmarks,
                worst_error
            );

            remaining.retain(|&i| i != worst);
            chosen.push(worst);
        }

        let landmarks: Vec<T> = chosen.into_iter().map(|i| samples[i].clone()).collect();
        Self::fit_on_landmarks(kernel, landmarks)
    }

    /// Eigendecompose the landmark Gram matrix and build the feature axes
    fn fit_on_landmarks(kernel: Arc<K>, landmarks: Vec<T>) -> Result<Self>
    where
        T: Sync,
    {
        let gram = kernel.gram_matrix(&landmarks);
        let eig = gram.eigen_symmetric()?;

        let m = landmarks.len();
        let mut axes = Vec::new();
        for l in eig.sorted_indices() {
            let lambda = eig.eigenvalues[l];
            if lambda <= COMPONENT_FLOOR {
                continue;
            }
            let scale = 1.0 / lambda.sqrt();
            axes.push((0..m).map(|i| scale * eig.eigenvectors[(i, l)]).collect());
        }

        Ok(Self {
            kernel,
            landmarks,
            axes,
        })
    }

    /// Map an input into the approximation space
    ///
    /// Costs one kernel evaluation per landmark.
    pub fn project(&self, input: &T) -> Vec<f64> {
        let k_col: Vec<f64> = self
            .landmarks
            .iter()
            .map(|l| self.kernel.similarity(l, input))
            .collect();
        self.axes
            .iter()
            .map(|axis| vector::dot(axis, &k_col))
            .collect()
    }

    /// Approximate kernel value as a dot product of two projections
    pub fn approximate_similarity(&self, a: &T, b: &T) -> f64 {
        vector::dot(&self.project(a), &self.project(b))
    }

    /// Squared reconstruction error of an input's kernel values against the
    /// landmarks
    fn reconstruction_error(&self, input: &T) -> f64 {
        self.landmarks
            .iter()
            .map(|l| {
                let truth = self.kernel.similarity(l, input);
                let approx = self.approximate_similarity(l, input);
                (truth - approx) * (truth - approx)
            })
            .sum()
    }

    /// Number of kept feature dimensions
    pub fn dimension(&self) -> usize {
        self.axes.len()
    }

    /// The landmark samples
    pub fn landmarks(&self) -> &[T] {
        &self.landmarks
    }
}

fn validate_subset(n_samples: usize, landmarks: usize) -> Result<()> {
    if n_samples == 0 {
        return Err(KernelMachineError::EmptyDataset);
    }
    if landmarks == 0 || landmarks > n_samples {
        return Err(KernelMachineError::InvalidParameter(format!(
            "landmark count {} must lie in [1, {}]",
            landmarks, n_samples
        )));
    }
    Ok(())
}
