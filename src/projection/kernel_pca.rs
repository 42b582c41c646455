//! Kernel principal component analysis
//!
//! Centers the Gram matrix in feature space, eigendecomposes it, and keeps
//! the components with non-vanishing eigenvalue. Out-of-sample projection
//! evaluates the kernel against every stored training sample, centers the
//! resulting column with the stored means, and whitens by `1 / sqrt(lambda)`.

use crate::core::{KernelMachineError, Result};
use crate::kernel::Kernel;
use crate::linalg::Matrix;
use std::sync::Arc;

/// Eigenvalues at or below this are treated as the centering null space and
/// dropped.
const COMPONENT_FLOOR: f64 = 1e-9;

/// Fitted kernel principal component basis
pub struct KernelPca<T, K> {
    kernel: Arc<K>,
    samples: Vec<T>,
    row_means: Vec<f64>,
    total_mean: f64,
    /// Kept eigenvector coefficients, one row per component over the samples
    axes: Vec<Vec<f64>>,
    eigenvalues: Vec<f64>,
}

impl<T, K: Kernel<T>> KernelPca<T, K> {
    /// Fit the basis on training samples, which are stored for later
    /// out-of-sample projections
    pub fn fit(kernel: K, samples: Vec<T>) -> Result<Self>
    where
        T: Sync,
    {
        if samples.is_empty() {
            return Err(KernelMachineError::EmptyDataset);
        }

        let kernel = Arc::new(kernel);
        let n = samples.len();
        let gram = kernel.gram_matrix(&samples);

        let row_means: Vec<f64> = (0..n)
            .map(|i| gram.row(i).iter().sum::<f64>() / n as f64)
            .collect();
        let total_mean = row_means.iter().sum::<f64>() / n as f64;

        let mut centered = Matrix::zeros(n, n);
        for i in 0..n {
            for j in 0..n {
                centered[(i, j)] = gram[(i, j)] - row_means[i] - row_means[j] + total_mean;
            }
        }
        // the centering arithmetic is symmetric but rounds asymmetrically
        for i in 0..n {
            for j in (i + 1)..n {
                let v = 0.5 * (centered[(i, j)] + centered[(j, i)]);
                centered[(i, j)] = v;
                centered[(j, i)] = v;
            }
        }

        let eig = centered.eigen_symmetric()?;
        let mut axes = Vec::new();
        let mut eigenvalues = Vec::new();
        for l in eig.sorted_indices() {
            let lambda = eig.eigenvalues[l];
            if lambda <= COMPONENT_FLOOR {
                continue;
            }
            axes.push((0..n).map(|i| eig.eigenvectors[(i, l)]).collect());
            eigenvalues.push(lambda);
        }

        Ok(Self {
            kernel,
            samples,
            row_means,
            total_mean,
            axes,
            eigenvalues,
        })
    }

    /// Project an input onto the kept components
    ///
    /// Costs one kernel evaluation per stored training sample.
    pub fn project(&self, input: &T) -> Vec<f64> {
        let n = self.samples.len();
        let k_col: Vec<f64> = self
            .samples
            .iter()
            .map(|s| self.kernel.similarity(s, input))
            .collect();
        let k_mean = k_col.iter().sum::<f64>() / n as f64;
        let centered: Vec<f64> = (0..n)
            .map(|i| k_col[i] - k_mean - self.row_means[i] + self.total_mean)
            .collect();

        self.axes
            .iter()
            .zip(self.eigenvalues.iter())
            .map(|(axis, &lambda)| {
                let raw: f64 = axis.iter().zip(centered.iter()).map(|(a, k)| a * k).sum();
                raw / lambda.sqrt()
            })
            .collect()
    }

    /// Number of kept components
    pub fn dimension(&self) -> usize {
        self.axes.len()
    }

    /// Eigenvalues of the kept components, descending
    pub fn eigenvalues(&self) -> &[f64] {
        &self.eigenvalues
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::GaussianKernel;
    use crate::linalg::vector;

    fn line_samples() -> Vec<Vec<f64>> {
        (0..10).map(|i| vec![i as f64 * 0.5]).collect()
    }

    #[test]
    fn test_kernel_pca_empty_dataset() {
        let samples: Vec<Vec<f64>> = vec![];
        assert!(matches!(
            KernelPca::fit(GaussianKernel::new(0.5), samples),
            Err(KernelMachineError::EmptyDataset)
        ));
    }

    #[test]
    fn test_kernel_pca_drops_null_space() {
        let kpca = KernelPca::fit(GaussianKernel::new(0.5), line_samples()).unwrap();
        // centering always eats at least one direction
        assert!(kpca.dimension() < line_samples().len());
        assert!(kpca.dimension() > 0);
        for w in kpca.eigenvalues().windows(2) {
            assert!(w[0] >= w[1]);
        }
    }

    #[test]
    fn test_kernel_pca_projections_reproduce_centered_gram() {
        let samples = line_samples();
        let kernel = GaussianKernel::new(0.5);
        let kpca = KernelPca::fit(kernel, samples.clone()).unwrap();

        // with whitening, projected dot products recover the centered Gram
        let gram = GaussianKernel::new(0.5).gram_matrix(&samples);
        let n = samples.len();
        let row_means: Vec<f64> = (0..n)
            .map(|i| gram.row(i).iter().sum::<f64>() / n as f64)
            .collect();
        let total: f64 = row_means.iter().sum::<f64>() / n as f64;

        for i in 0..n {
            for j in 0..n {
                let expected = gram[(i, j)] - row_means[i] - row_means[j] + total;
                let actual = vector::dot(&kpca.project(&samples[i]), &kpca.project(&samples[j]));
                assert!(
                    (expected - actual).abs() < 1e-6,
                    "centered K[{}][{}] = {} but projections give {}",
                    i,
                    j,
                    expected,
                    actual
                );
            }
        }
    }

    #[test]
    fn test_kernel_pca_projection_is_deterministic() {
        let kpca = KernelPca::fit(GaussianKernel::new(0.5), line_samples()).unwrap();
        let x = vec![1.3];
        assert_eq!(kpca.project(&x), kpca.project(&x));
    }
}
