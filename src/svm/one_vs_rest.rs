//! One-vs-rest multiclass reduction
//!
//! Trains one binary SDCA machine per observed class, in parallel; each
//! sub-problem relabels the class of interest +1 and everything else -1.
//! Prediction takes the class whose machine reports the highest decision
//! value. The per-class trainings are independent, so this is a plain
//! parallel map with a barrier; any failed training aborts the whole fit.

use crate::core::{KernelMachineError, MulticlassClassifier, Result, Sample};
use crate::kernel::Kernel;
use crate::svm::{SdcaSvm, SdcaSvmConfig, TrainedSdcaSvm};
use log::debug;
use rayon::prelude::*;
use std::sync::Arc;

/// One-vs-rest trainer over binary SDCA machines
pub struct OneVsRest<K> {
    kernel: Arc<K>,
    config: SdcaSvmConfig,
}

impl<K> OneVsRest<K> {
    /// Create a trainer with the given kernel and per-machine configuration
    pub fn new(kernel: K, config: SdcaSvmConfig) -> Self {
        Self {
            kernel: Arc::new(kernel),
            config,
        }
    }

    /// Create a trainer with the default per-machine configuration
    pub fn with_kernel(kernel: K) -> Self {
        Self::new(kernel, SdcaSvmConfig::default())
    }

    /// Train one binary machine per observed class label
    pub fn fit<T>(&self, samples: &[Sample<T>]) -> Result<TrainedOneVsRest<T, K>>
    where
        T: Clone + Send + Sync,
        K: Kernel<T>,
    {
        if samples.is_empty() {
            return Err(KernelMachineError::EmptyDataset);
        }

        let mut classes: Vec<i32> = samples.iter().map(|s| s.label).collect();
        classes.sort_unstable();
        classes.dedup();
        debug!("one-vs-rest training over {} classes", classes.len());

        let machines: Vec<TrainedSdcaSvm<T, K>> = classes
            .par_iter()
            .map(|&class| {
                let relabeled: Vec<Sample<T>> = samples
                    .iter()
                    .map(|s| {
                        Sample::new(s.input.clone(), if s.label == class { 1 } else { -1 })
                    })
                    .collect();
                let solver = SdcaSvm::from_shared(Arc::clone(&self.kernel), self.config.clone());
                solver.fit(&relabeled)
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(TrainedOneVsRest { classes, machines })
    }
}

/// Trained one-vs-rest ensemble
pub struct TrainedOneVsRest<T, K> {
    classes: Vec<i32>,
    machines: Vec<TrainedSdcaSvm<T, K>>,
}

impl<T, K: Kernel<T>> TrainedOneVsRest<T, K> {
    /// Decision value of every per-class machine for an input
    pub fn class_scores(&self, input: &T) -> Vec<(i32, f64)> {
        self.classes
            .iter()
            .zip(self.machines.iter())
            .map(|(&class, machine)| (class, machine.decision_function(input)))
            .collect()
    }

    /// Observed class labels, sorted
    pub fn classes(&self) -> &[i32] {
        &self.classes
    }

    /// Per-class binary machines, aligned with `classes`
    pub fn machines(&self) -> &[TrainedSdcaSvm<T, K>] {
        &self.machines
    }
}

impl<T: Send + Sync, K: Kernel<T>> MulticlassClassifier<T> for TrainedOneVsRest<T, K> {
    fn predict(&self, input: &T) -> i32 {
        self.class_scores(input)
            .into_iter()
            .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
            .map(|(label, _)| label)
            .expect("trained ensemble has at least one class")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::GaussianKernel;

    fn four_cluster_samples() -> Vec<Sample<Vec<f64>>> {
        let centers = [[0.0, 0.0], [6.0, 0.0], [0.0, 6.0], [6.0, 6.0]];
        let mut samples = Vec::new();
        for (label, center) in centers.iter().enumerate() {
            for i in 0..6 {
                let jitter = (i as f64) * 0.08;
                samples.push(Sample::new(
                    vec![center[0] + jitter, center[1] - jitter],
                    label as i32,
                ));
            }
        }
        samples
    }

    #[test]
    fn test_one_vs_rest_empty_dataset() {
        let trainer = OneVsRest::with_kernel(GaussianKernel::new(0.5));
        let samples: Vec<Sample<Vec<f64>>> = vec![];
        assert!(matches!(
            trainer.fit(&samples),
            Err(KernelMachineError::EmptyDataset)
        ));
    }

    #[test]
    fn test_one_vs_rest_trains_one_machine_per_class() {
        let trainer = OneVsRest::with_kernel(GaussianKernel::new(0.5));
        let model = trainer.fit(&four_cluster_samples()).unwrap();
        assert_eq!(model.classes(), &[0, 1, 2, 3]);
        assert_eq!(model.machines().len(), 4);
    }

    #[test]
    fn test_one_vs_rest_recovers_training_labels() {
        let trainer = OneVsRest::with_kernel(GaussianKernel::new(0.5));
        let samples = four_cluster_samples();
        let model = trainer.fit(&samples).unwrap();

        for sample in &samples {
            assert_eq!(model.predict(&sample.input), sample.label);
        }
    }

    #[test]
    fn test_one_vs_rest_scores_are_aligned() {
        let trainer = OneVsRest::with_kernel(GaussianKernel::new(0.5));
        let model = trainer.fit(&four_cluster_samples()).unwrap();

        let scores = model.class_scores(&vec![6.0, 6.0]);
        assert_eq!(scores.len(), 4);
        let best = scores
            .iter()
            .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap())
            .unwrap();
        assert_eq!(best.0, 3);
    }
}
