//! Kernel trait definition
//!
//! A kernel K(x, y) must satisfy Mercer's condition for the dual solvers to
//! behave; the trait itself only promises a pairwise similarity. The sample
//! payload is an opaque type parameter, so the same machinery runs on dense
//! vectors, precomputed indices, or anything else a kernel knows how to
//! compare.

use crate::linalg::Matrix;
use rayon::prelude::*;

/// Pairwise similarity function over an opaque sample type
pub trait Kernel<T>: Send + Sync {
    /// Compute the kernel value K(a, b)
    fn similarity(&self, a: &T, b: &T) -> f64;

    /// Compute the self-similarity K(a, a)
    ///
    /// Kernels with a constant diagonal (e.g. Gaussian) override this.
    fn self_similarity(&self, a: &T) -> f64 {
        self.similarity(a, a)
    }

    /// Compute the full Gram matrix over a list of samples
    ///
    /// Rows of the upper triangle are computed in parallel and mirrored
    /// after the join; a panic in any worker aborts the whole computation.
    fn gram_matrix(&self, samples: &[T]) -> Matrix
    where
        Self: Sized,
        T: Sync,
    {
        let n = samples.len();
        let rows: Vec<Vec<f64>> = (0..n)
            .into_par_iter()
            .map(|i| {
                (i..n)
                    .map(|j| self.similarity(&samples[i], &samples[j]))
                    .collect()
            })
            .collect();

        let mut gram = Matrix::zeros(n, n);
        for (i, row) in rows.iter().enumerate() {
            for (offset, &value) in row.iter().enumerate() {
                let j = i + offset;
                gram[(i, j)] = value;
                gram[(j, i)] = value;
            }
        }
        gram
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::LinearKernel;

    #[test]
    fn test_gram_matrix_is_symmetric() {
        let kernel = LinearKernel::new();
        let samples = vec![
            vec![1.0, 0.0],
            vec![0.0, 2.0],
            vec![1.0, 1.0],
            vec![-1.0, 3.0],
        ];

        let gram = kernel.gram_matrix(&samples);
        assert_eq!(gram.rows(), 4);
        assert!(gram.is_symmetric());
        assert_eq!(gram[(0, 0)], 1.0);
        assert_eq!(gram[(0, 2)], 1.0);
        assert_eq!(gram[(1, 3)], 6.0);
    }

    #[test]
    fn test_default_self_similarity() {
        let kernel = LinearKernel::new();
        let x = vec![2.0, 3.0];
        assert_eq!(kernel.self_similarity(&x), 13.0);
    }
}
