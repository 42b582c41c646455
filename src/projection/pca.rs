//! Linear principal component analysis
//!
//! Classic PCA over dense samples: empirical mean, covariance (rows computed
//! in parallel), symmetric eigendecomposition, components sorted by
//! descending variance. Both a raw projection and a whitened one are
//! exposed; zero-variance directions whiten to 0 instead of dividing by a
//! vanishing eigenvalue.

use crate::core::{KernelMachineError, Result};
use crate::linalg::{vector, Matrix};
use rayon::prelude::*;

/// Variance below this counts as a zero-variance direction
const VARIANCE_FLOOR: f64 = 1e-12;

/// Fitted principal component basis
pub struct Pca {
    mean: Vec<f64>,
    /// Principal axes, one per row, sorted by descending eigenvalue
    axes: Vec<Vec<f64>>,
    /// Eigenvalues matching `axes`
    eigenvalues: Vec<f64>,
}

impl Pca {
    /// Fit the component basis on dense samples
    pub fn fit(samples: &[Vec<f64>]) -> Result<Self> {
        if samples.is_empty() {
            return Err(KernelMachineError::EmptyDataset);
        }
        let dim = samples[0].len();
        for s in samples {
            if s.len() != dim {
                return Err(KernelMachineError::DimensionMismatch {
                    expected: dim,
                    actual: s.len(),
                });
            }
        }

        let n = samples.len() as f64;
        let mean = vector::mean(samples);
        let centered: Vec<Vec<f64>> = samples.iter().map(|x| vector::subtract(x, &mean)).collect();

        // covariance rows are independent: parallel map, then the barrier
        let rows: Vec<Vec<f64>> = (0..dim)
            .into_par_iter()
            .map(|a| {
                (0..dim)
                    .map(|b| centered.iter().map(|x| x[a] * x[b]).sum::<f64>() / n)
                    .collect()
            })
            .collect();
        let covariance = Matrix::from_rows(rows)?;

        let eig = covariance.eigen_symmetric()?;
        let order = eig.sorted_indices();
        let axes: Vec<Vec<f64>> = order
            .iter()
            .map(|&l| (0..dim).map(|i| eig.eigenvectors[(i, l)]).collect())
            .collect();
        let eigenvalues: Vec<f64> = order.iter().map(|&l| eig.eigenvalues[l]).collect();

        Ok(Self {
            mean,
            axes,
            eigenvalues,
        })
    }

    /// Raw projection `Q^t (x - mean)`
    pub fn project(&self, x: &[f64]) -> Vec<f64> {
        let centered = vector::subtract(x, &self.mean);
        self.axes
            .iter()
            .map(|axis| vector::dot(axis, &centered))
            .collect()
    }

    /// Whitened projection: each component scaled by `1 / sqrt(lambda)`,
    /// zero-variance directions mapped to 0
    pub fn project_whitened(&self, x: &[f64]) -> Vec<f64> {
        let centered = vector::subtract(x, &self.mean);
        self.axes
            .iter()
            .zip(self.eigenvalues.iter())
            .map(|(axis, &lambda)| {
                if lambda > VARIANCE_FLOOR {
                    vector::dot(axis, &centered) / lambda.sqrt()
                } else {
                    0.0
                }
            })
            .collect()
    }

    /// Empirical mean of the training data
    pub fn mean(&self) -> &[f64] {
        &self.mean
    }

    /// Principal axes, one per row, sorted by descending variance
    pub fn components(&self) -> &[Vec<f64>] {
        &self.axes
    }

    /// Variances along the principal axes, descending
    pub fn eigenvalues(&self) -> &[f64] {
        &self.eigenvalues
    }
}
