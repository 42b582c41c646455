//! Model serialization and persistence
//!
//! Saves trained binary kernel machines as versioned JSON: the support
//! vectors, their signed dual weights, a typed kernel descriptor and a bit
//! of metadata. Restoring rebuilds the kernel from the descriptor and hands
//! back a ready-to-predict model.

use crate::core::{Classifier, KernelMachineError, Result};
use crate::kernel::{GaussianKernel, Kernel, LinearKernel, PolynomialKernel};
use crate::svm::TrainedSdcaSvm;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

/// Typed description of a serializable kernel
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub enum KernelDescriptor {
    Linear,
    Gaussian { gamma: f64 },
    Polynomial { degree: u32, gamma: f64, coef0: f64 },
}

impl KernelDescriptor {
    /// Rebuild the concrete kernel this descriptor names
    pub fn instantiate(&self) -> Box<dyn Kernel<Vec<f64>>> {
        match *self {
            KernelDescriptor::Linear => Box::new(LinearKernel::new()),
            KernelDescriptor::Gaussian { gamma } => Box::new(GaussianKernel::new(gamma)),
            KernelDescriptor::Polynomial {
                degree,
                gamma,
                coef0,
            } => Box::new(PolynomialKernel::new(degree, gamma, coef0)),
        }
    }
}

/// Kernels that know how to describe themselves for persistence
pub trait DescribableKernel {
    fn descriptor(&self) -> KernelDescriptor;
}

impl DescribableKernel for LinearKernel {
    fn descriptor(&self) -> KernelDescriptor {
        KernelDescriptor::Linear
    }
}

impl DescribableKernel for GaussianKernel {
    fn descriptor(&self) -> KernelDescriptor {
        KernelDescriptor::Gaussian {
            gamma: self.gamma(),
        }
    }
}

impl DescribableKernel for PolynomialKernel {
    fn descriptor(&self) -> KernelDescriptor {
        KernelDescriptor::Polynomial {
            degree: self.degree,
            gamma: self.gamma,
            coef0: self.coef0,
        }
    }
}

/// Serializable representation of a trained binary machine
#[derive(Serialize, Deserialize)]
pub struct SerializableModel {
    /// Kernel descriptor
    pub kernel: KernelDescriptor,
    /// Support vector inputs
    pub support_vectors: Vec<Vec<f64>>,
    /// Signed dual weights (alpha_i * y_i), aligned with `support_vectors`
    pub alpha_y: Vec<f64>,
    /// Model metadata
    pub metadata: ModelMetadata,
}

/// Metadata for tracking and validation
#[derive(Serialize, Deserialize)]
pub struct ModelMetadata {
    /// Library version used to create the model
    pub library_version: String,
    /// Number of support vectors
    pub n_support_vectors: usize,
    /// Creation timestamp (RFC 3339)
    pub created_at: String,
}

impl SerializableModel {
    /// Capture a trained machine for persistence
    pub fn from_trained<K>(model: &TrainedSdcaSvm<Vec<f64>, K>) -> Self
    where
        K: Kernel<Vec<f64>> + DescribableKernel,
    {
        Self {
            kernel: model.kernel().descriptor(),
            support_vectors: model
                .support_vectors()
                .iter()
                .map(|s| s.input.clone())
                .collect(),
            alpha_y: model.alpha_y().to_vec(),
            metadata: ModelMetadata {
                library_version: crate::VERSION.to_string(),
                n_support_vectors: model.n_support_vectors(),
                created_at: chrono::Utc::now().to_rfc3339(),
            },
        }
    }

    /// Save the model as pretty-printed JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path)?;
        serde_json::to_writer_pretty(BufWriter::new(file), self)
            .map_err(|e| KernelMachineError::ParseError(format!("serialization failed: {}", e)))
    }

    /// Load a model from a JSON file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        let model: SerializableModel = serde_json::from_reader(BufReader::new(file))
            .map_err(|e| KernelMachineError::ParseError(format!("deserialization failed: {}", e)))?;
        if model.support_vectors.len() != model.alpha_y.len() {
            return Err(KernelMachineError::InvalidFormat(format!(
                "{} support vectors but {} weights",
                model.support_vectors.len(),
                model.alpha_y.len()
            )));
        }
        Ok(model)
    }

    /// Rebuild a ready-to-predict model
    pub fn restore(&self) -> RestoredModel {
        RestoredModel {
            kernel: self.kernel.instantiate(),
            support_vectors: self.support_vectors.clone(),
            alpha_y: self.alpha_y.clone(),
        }
    }
}

/// Binary machine rebuilt from a saved model
pub struct RestoredModel {
    kernel: Box<dyn Kernel<Vec<f64>>>,
    support_vectors: Vec<Vec<f64>>,
    alpha_y: Vec<f64>,
}

impl RestoredModel {
    /// Decision value `sum_i alpha_i y_i K(x_i, x)`
    pub fn decision_function(&self, input: &Vec<f64>) -> f64 {
        self.support_vectors
            .iter()
            .zip(self.alpha_y.iter())
            .map(|(sv, ay)| ay * self.kernel.similarity(sv, input))
            .sum()
    }

    /// Number of support vectors
    pub fn n_support_vectors(&self) -> usize {
        self.support_vectors.len()
    }
}

impl Classifier<Vec<f64>> for RestoredModel {
    fn decision_function(&self, input: &Vec<f64>) -> f64 {
        RestoredModel::decision_function(self, input)
    }
}

/// Convenience: persist a trained machine in one call
pub fn save_model<K, P>(model: &TrainedSdcaSvm<Vec<f64>, K>, path: P) -> Result<()>
where
    K: Kernel<Vec<f64>> + DescribableKernel,
    P: AsRef<Path>,
{
    SerializableModel::from_trained(model).save(path)
}

/// Convenience: load and rebuild a model in one call
pub fn load_model<P: AsRef<Path>>(path: P) -> Result<RestoredModel> {
    Ok(SerializableModel::load(path)?.restore())
}
