//! Matrix-backed kernel over sample indices
//!
//! Useful when similarities come from an external source (a file, another
//! process) or when the same Gram matrix is reused across several trainings.
//! Samples are plain indices into the backing matrix.

use crate::core::{KernelMachineError, Result};
use crate::kernel::Kernel;
use crate::linalg::Matrix;

/// Kernel backed by a precomputed symmetric similarity matrix
#[derive(Debug, Clone)]
pub struct PrecomputedKernel {
    matrix: Matrix,
}

impl PrecomputedKernel {
    /// Wrap a symmetric similarity matrix
    ///
    /// Rejects non-square and non-symmetric input up front; the dual solvers
    /// assume symmetry and would misbehave silently otherwise.
    pub fn new(matrix: Matrix) -> Result<Self> {
        if !matrix.is_square() {
            return Err(KernelMachineError::NonSquareMatrix {
                rows: matrix.rows(),
                cols: matrix.cols(),
            });
        }
        if !matrix.is_symmetric() {
            return Err(KernelMachineError::InvalidParameter(
                "Precomputed kernel matrix must be symmetric".to_string(),
            ));
        }
        Ok(Self { matrix })
    }

    /// Number of samples the backing matrix covers
    pub fn len(&self) -> usize {
        self.matrix.rows()
    }

    /// Whether the backing matrix is empty
    pub fn is_empty(&self) -> bool {
        self.matrix.rows() == 0
    }
}

impl Kernel<usize> for PrecomputedKernel {
    fn similarity(&self, a: &usize, b: &usize) -> f64 {
        self.matrix[(*a, *b)]
    }
}
