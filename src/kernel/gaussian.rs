//! Gaussian (RBF) kernel implementation
//!
//! K(x, y) = exp(-gamma * ||x - y||^2). The gamma parameter controls the
//! reach of each training example: high gamma keeps the influence local, low
//! gamma spreads it out.

use crate::kernel::Kernel;

/// Gaussian radial basis function kernel: K(x, y) = exp(-gamma * ||x - y||^2)
#[derive(Debug, Clone, Copy)]
pub struct GaussianKernel {
    gamma: f64,
}

impl GaussianKernel {
    /// Create a new Gaussian kernel with the given gamma
    ///
    /// # Panics
    /// Panics if gamma is not positive.
    pub fn new(gamma: f64) -> Self {
        assert!(gamma > 0.0, "Gamma must be positive, got: {}", gamma);
        Self { gamma }
    }

    /// Gaussian kernel with gamma = 1 / n_features
    ///
    /// A common default that scales inversely with dimensionality.
    pub fn with_auto_gamma(n_features: usize) -> Self {
        assert!(n_features > 0, "Number of features must be positive");
        Self::new(1.0 / n_features as f64)
    }

    /// Gaussian kernel parameterized by the bandwidth sigma,
    /// gamma = 1 / (2 * sigma^2)
    pub fn with_bandwidth(sigma: f64) -> Self {
        assert!(sigma > 0.0, "Bandwidth must be positive, got: {}", sigma);
        Self::new(1.0 / (2.0 * sigma * sigma))
    }

    /// Get the gamma parameter
    pub fn gamma(&self) -> f64 {
        self.gamma
    }
}

impl Default for GaussianKernel {
    /// Default Gaussian kernel with gamma = 1.0
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl Kernel<Vec<f64>> for GaussianKernel {
    fn similarity(&self, a: &Vec<f64>, b: &Vec<f64>) -> f64 {
        let squared_distance: f64 = a
            .iter()
            .zip(b.iter())
            .map(|(x, y)| (x - y) * (x - y))
            .sum();
        (-self.gamma * squared_distance).exp()
    }

    fn self_similarity(&self, _a: &Vec<f64>) -> f64 {
        1.0
    }
}
