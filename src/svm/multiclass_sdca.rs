//! Multiclass SVM trained by stochastic dual coordinate ascent
//!
//! One weight per sample and class, under the structural constraint that the
//! non-true class weights stay at or below zero and the true class weight
//! equals their negated sum, so every row sums to zero. A sample whose true
//! class already ranks strictly first is skipped without any gradient work.
//! Otherwise each violating class takes a Newton step against the sample's
//! Gram row, clipped at zero, with a proportional shrink whenever the true
//! class would exceed its budget C.
//!
//! The row-sum invariant is verified after every update; a violation aborts
//! training, since continuing would silently corrupt the decision function.

use crate::core::{KernelMachineError, MulticlassClassifier, Result, Sample};
use crate::kernel::Kernel;
use log::debug;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::sync::Arc;

/// Tolerance for the per-row zero-sum invariant
const ROW_SUM_TOLERANCE: f64 = 1e-10;

/// Configuration for the multiclass SDCA solver
#[derive(Debug, Clone)]
pub struct MulticlassSdcaConfig {
    /// Per-sample budget for the true class weight
    pub c: f64,
    /// Epoch multiplier; the solver runs `epochs * n_classes` shuffled passes
    pub epochs: usize,
    /// Seed for the per-epoch shuffles
    pub seed: u64,
}

impl Default for MulticlassSdcaConfig {
    fn default() -> Self {
        Self {
            c: 1.0,
            epochs: 10,
            seed: 42,
        }
    }
}

/// Multiclass SDCA solver
pub struct MulticlassSdca<K> {
    kernel: Arc<K>,
    config: MulticlassSdcaConfig,
}

impl<K> MulticlassSdca<K> {
    /// Create a solver with the given kernel and configuration
    pub fn new(kernel: K, config: MulticlassSdcaConfig) -> Self {
        Self {
            kernel: Arc::new(kernel),
            config,
        }
    }

    /// Create a solver with the default configuration
    pub fn with_kernel(kernel: K) -> Self {
        Self::new(kernel, MulticlassSdcaConfig::default())
    }

    /// Get the solver configuration
    pub fn config(&self) -> &MulticlassSdcaConfig {
        &self.config
    }

    /// Train on labeled samples with arbitrary integer class labels
    pub fn fit<T>(&self, samples: &[Sample<T>]) -> Result<TrainedMulticlassSdca<T, K>>
    where
        T: Clone + Sync,
        K: Kernel<T>,
    {
        if samples.is_empty() {
            return Err(KernelMachineError::EmptyDataset);
        }

        let mut classes: Vec<i32> = samples.iter().map(|s| s.label).collect();
        classes.sort_unstable();
        classes.dedup();
        let n_classes = classes.len();

        let n = samples.len();
        let inputs: Vec<T> = samples.iter().map(|s| s.input.clone()).collect();
        let class_of: Vec<usize> = samples
            .iter()
            .map(|s| classes.binary_search(&s.label).expect("label was collected"))
            .collect();
        let gram = self.kernel.gram_matrix(&inputs);

        let mut alpha = vec![vec![0.0; n_classes]; n];
        let mut rng = StdRng::seed_from_u64(self.config.seed);
        let mut order: Vec<usize> = (0..n).collect();

        let total_epochs = self.config.epochs * n_classes;
        for epoch in 0..total_epochs {
            order.shuffle(&mut rng);
            for &i in &order {
                self.update_sample(i, class_of[i], gram.row(i), &mut alpha)?;
            }
            debug!("multiclass sdca epoch {}/{}", epoch + 1, total_epochs);
        }

        Ok(TrainedMulticlassSdca {
            kernel: Arc::clone(&self.kernel),
            samples: inputs,
            alpha,
            classes,
        })
    }

    /// Dual update for one sample against its Gram row
    fn update_sample(
        &self,
        i: usize,
        true_class: usize,
        row: &[f64],
        alpha: &mut [Vec<f64>],
    ) -> Result<()> {
        let n_classes = alpha[0].len();
        let k_ii = row[i];
        if k_ii <= f64::EPSILON {
            return Ok(());
        }

        // scores for every class against the current dual state
        let mut scores = vec![0.0; n_classes];
        for (j, &k_ij) in row.iter().enumerate() {
            if k_ij == 0.0 {
                continue;
            }
            for (c, score) in scores.iter_mut().enumerate() {
                *score += alpha[j][c] * k_ij;
            }
        }

        // nothing to do when the true class already ranks strictly first
        let best_other = scores
            .iter()
            .enumerate()
            .filter(|&(c, _)| c != true_class)
            .map(|(_, &s)| s)
            .fold(f64::NEG_INFINITY, f64::max);
        if scores[true_class] > best_other {
            return Ok(());
        }

        // Newton step per non-true class on the margin violation, kept at or
        // below zero
        let mut updated = alpha[i].clone();
        for c in 0..n_classes {
            if c == true_class {
                continue;
            }
            let violation = scores[c] + 1.0 - scores[true_class];
            updated[c] = (alpha[i][c] - violation / (2.0 * k_ii)).min(0.0);
        }

        // the true class absorbs the negated sum; shrink everyone
        // proportionally if that would blow the budget
        let mut mass: f64 = -updated
            .iter()
            .enumerate()
            .filter(|&(c, _)| c != true_class)
            .map(|(_, &a)| a)
            .sum::<f64>();
        if mass > self.config.c {
            let shrink = self.config.c / mass;
            for (c, a) in updated.iter_mut().enumerate() {
                if c != true_class {
                    *a *= shrink;
                }
            }
            mass = self.config.c;
        }
        updated[true_class] = mass;

        let row_sum: f64 = updated.iter().sum();
        if row_sum.abs() > ROW_SUM_TOLERANCE {
            return Err(KernelMachineError::DualInvariantViolation {
                sample: i,
                sum: row_sum,
            });
        }

        alpha[i] = updated;
        Ok(())
    }
}

/// Trained multiclass SDCA machine
pub struct TrainedMulticlassSdca<T, K> {
    kernel: Arc<K>,
    samples: Vec<T>,
    alpha: Vec<Vec<f64>>,
    classes: Vec<i32>,
}

impl<T, K: Kernel<T>> TrainedMulticlassSdca<T, K> {
    /// Per-class kernel expansion scores for an input
    pub fn class_scores(&self, input: &T) -> Vec<(i32, f64)> {
        let mut scores = vec![0.0; self.classes.len()];
        for (sample, weights) in self.samples.iter().zip(self.alpha.iter()) {
            let k = self.kernel.similarity(sample, input);
            if k == 0.0 {
                continue;
            }
            for (score, &w) in scores.iter_mut().zip(weights.iter()) {
                *score += w * k;
            }
        }
        self.classes.iter().copied().zip(scores).collect()
    }

    /// Observed class labels, sorted
    pub fn classes(&self) -> &[i32] {
        &self.classes
    }

    /// Dual weight matrix, one row per training sample
    pub fn alpha(&self) -> &[Vec<f64>] {
        &self.alpha
    }
}

impl<T: Send + Sync, K: Kernel<T>> MulticlassClassifier<T> for TrainedMulticlassSdca<T, K> {
    fn predict(&self, input: &T) -> i32 {
        self.class_scores(input)
            .into_iter()
            .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
            .map(|(label, _)| label)
            .expect("trained model has at least one class")
    }
}
