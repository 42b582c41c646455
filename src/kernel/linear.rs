//! Linear kernel implementation

use crate::kernel::Kernel;
use crate::linalg::vector;

/// Linear kernel: K(x, y) = x^T * y
///
/// The simplest kernel function, computing the dot product between two dense
/// vectors.
#[derive(Debug, Clone, Copy, Default)]
pub struct LinearKernel;

impl LinearKernel {
    /// Create a new linear kernel
    pub fn new() -> Self {
        Self
    }
}

impl Kernel<Vec<f64>> for LinearKernel {
    fn similarity(&self, a: &Vec<f64>, b: &Vec<f64>) -> f64 {
        vector::dot(a, b)
    }

    fn self_similarity(&self, a: &Vec<f64>) -> f64 {
        vector::norm_squared(a)
    }
}
