//! Gaussian mixture density estimation via expectation-maximization
//!
//! Full-covariance mixture with a ridge term on every covariance update.
//! Component precisions and normalizers come from the symmetric
//! eigendecomposition, so near-singular covariances degrade to pseudo-inverse
//! precisions instead of blowing up.

use crate::core::{DensityFunction, KernelMachineError, Result};
use crate::linalg::{vector, Matrix};
use log::debug;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// Eigenvalues at or below this are excluded from precisions and floored in
/// determinants.
const COVARIANCE_FLOOR: f64 = 1e-12;

/// Configuration for the EM mixture fitter
#[derive(Debug, Clone)]
pub struct GaussianMixtureConfig {
    /// Number of mixture components
    pub components: usize,
    /// Maximum EM iterations
    pub max_iterations: usize,
    /// Relative log-likelihood improvement below which EM stops
    pub tolerance: f64,
    /// Ridge added to every covariance diagonal
    pub ridge: f64,
    /// Seed for the initial mean selection
    pub seed: u64,
}

impl Default for GaussianMixtureConfig {
    fn default() -> Self {
        Self {
            components: 2,
            max_iterations: 100,
            tolerance: 1e-6,
            ridge: 1e-6,
            seed: 42,
        }
    }
}

/// EM fitter for Gaussian mixture densities
pub struct GaussianMixtureModel {
    config: GaussianMixtureConfig,
}

/// One fitted mixture component
struct Component {
    weight: f64,
    mean: Vec<f64>,
    precision: Matrix,
    /// 1 / sqrt((2 pi)^p * det(covariance))
    normalizer: f64,
}

/// Trained Gaussian mixture density
pub struct GaussianMixture {
    components: Vec<Component>,
}

impl GaussianMixtureModel {
    /// Create a fitter with the given configuration
    pub fn new(config: GaussianMixtureConfig) -> Self {
        Self { config }
    }

    /// Create a fitter with `components` mixture components and defaults
    /// everywhere else
    pub fn with_components(components: usize) -> Self {
        Self::new(GaussianMixtureConfig {
            components,
            ..Default::default()
        })
    }

    /// Get the fitter configuration
    pub fn config(&self) -> &GaussianMixtureConfig {
        &self.config
    }

    /// Fit the mixture on dense samples
    pub fn fit(&self, samples: &[Vec<f64>]) -> Result<GaussianMixture> {
        if samples.is_empty() {
            return Err(KernelMachineError::EmptyDataset);
        }
        let k = self.config.components;
        if k == 0 || k > samples.len() {
            return Err(KernelMachineError::InvalidParameter(format!(
                "component count {} must lie in [1, {}]",
                k,
                samples.len()
            )));
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

        let n = samples.len();
        let mut rng = StdRng::seed_from_u64(self.config.seed);

        // means start on k distinct samples, covariances on the global one
        let mut indices: Vec<usize> = (0..n).collect();
        indices.shuffle(&mut rng);
        let global_mean = vector::mean(samples);
        let global_cov = covariance(samples, &global_mean, self.config.ridge);

        let mut components = Vec::with_capacity(k);
        for &idx in indices.iter().take(k) {
            components.push(build_component(
                1.0 / k as f64,
                samples[idx].clone(),
                &global_cov,
            )?);
        }

        let mut responsibilities = vec![vec![0.0; k]; n];
        let mut prev_log_likelihood = f64::NEG_INFINITY;

        for iteration in 0..self.config.max_iterations {
            // E step
            let mut log_likelihood = 0.0;
            for (i, x) in samples.iter().enumerate() {
                let mut total = 0.0;
                for (c, component) in components.iter().enumerate() {
                    let p = component.weight * component.density(x);
                    responsibilities[i][c] = p;
                    total += p;
                }
                if total > f64::MIN_POSITIVE {
                    for r in responsibilities[i].iter_mut() {
                        *r /= total;
                    }
                    log_likelihood += total.ln();
                } else {
                    // all components underflowed; spread the sample evenly
                    for r in responsibilities[i].iter_mut() {
                        *r = 1.0 / k as f64;
                    }
                }
            }

            // M step
            for c in 0..k {
                let mass: f64 = responsibilities.iter().map(|r| r[c]).sum();
                if mass <= f64::MIN_POSITIVE {
                    continue;
                }
                let mut mean = vec![0.0; dim];
                for (x, r) in samples.iter().zip(responsibilities.iter()) {
                    vector::axpy(&mut mean, r[c], x);
                }
                vector::scale(&mut mean, 1.0 / mass);

                let mut cov = Matrix::zeros(dim, dim);
                for (x, r) in samples.iter().zip(responsibilities.iter()) {
                    let centered = vector::subtract(x, &mean);
                    let w = r[c] / mass;
                    for a in 0..dim {
                        let wa = w * centered[a];
                        for b in 0..dim {
                            cov[(a, b)] += wa * centered[b];
                        }
                    }
                }
                for d in 0..dim {
                    cov[(d, d)] += self.config.ridge;
                }

                components[c] = build_component(mass / n as f64, mean, &cov)?;
            }

            let improvement = log_likelihood - prev_log_likelihood;
            debug!(
                "gmm iteration {}: log-likelihood {:.6} (gain {:.3e})",
                iteration, log_likelihood, improvement
            );
            if improvement.abs() < self.config.tolerance * log_likelihood.abs().max(1.0) {
                break;
            }
            prev_log_likelihood = log_likelihood;
        }

        Ok(GaussianMixture { components })
    }
}

impl Component {
    /// Gaussian density of this component at `x`
    fn density(&self, x: &[f64]) -> f64 {
        let centered = vector::subtract(x, &self.mean);
        let px = self
            .precision
            .multiply_vec(&centered)
            .expect("precision matches component dimension");
        let quadratic = vector::dot(&centered, &px);
        self.normalizer * (-0.5 * quadratic).exp()
    }
}

/// Build a component from its covariance: one eigendecomposition yields both
/// the (pseudo-)precision and the determinant for the normalizer.
fn build_component(weight: f64, mean: Vec<f64>, covariance: &Matrix) -> Result<Component> {
    let dim = mean.len();
    let eig = covariance.eigen_symmetric()?;

    let mut det = 1.0;
    let mut precision = Matrix::zeros(dim, dim);
    for l in 0..dim {
        let lambda = eig.eigenvalues[l];
        det *= lambda.max(COVARIANCE_FLOOR);
        if lambda <= COVARIANCE_FLOOR {
            continue;
        }
        let w = 1.0 / lambda;
        for i in 0..dim {
            let qi = w * eig.eigenvectors[(i, l)];
            if qi == 0.0 {
                continue;
            }
            for j in 0..dim {
                precision[(i, j)] += qi * eig.eigenvectors[(j, l)];
            }
        }
    }

    let normalizer = 1.0 / ((2.0 * std::f64::consts::PI).powi(dim as i32) * det).sqrt();
    Ok(Component {
        weight,
        mean,
        precision,
        normalizer,
    })
}

/// Sample covariance around `mean` with a ridge on the diagonal
fn covariance(samples: &[Vec<f64>], mean: &[f64], ridge: f64) -> Matrix {
    let dim = mean.len();
    let n = samples.len() as f64;
    let mut cov = Matrix::zeros(dim, dim);
    for x in samples {
        let centered = vector::subtract(x, mean);
        for a in 0..dim {
            let ca = centered[a] / n;
            for b in 0..dim {
                cov[(a, b)] += ca * centered[b];
            }
        }
    }
    for d in 0..dim {
        cov[(d, d)] += ridge;
    }
    cov
}

impl GaussianMixture {
    /// Mixture weights, one per component
    pub fn weights(&self) -> Vec<f64> {
        self.components.iter().map(|c| c.weight).collect()
    }

    /// Component means
    pub fn means(&self) -> Vec<&[f64]> {
        self.components.iter().map(|c| c.mean.as_slice()).collect()
    }

    /// Evaluate the mixture density at an input
    pub fn value_of(&self, x: &[f64]) -> f64 {
        self.components
            .iter()
            .map(|c| c.weight * c.density(x))
            .sum()
    }
}

impl DensityFunction<Vec<f64>> for GaussianMixture {
    fn value_of(&self, input: &Vec<f64>) -> f64 {
        GaussianMixture::value_of(self, input)
    }
}
