//! Rust implementation of kernel machines
//!
//! Kernel-based classifiers, density estimators and spectral projections
//! over pluggable similarity functions. The numerical core is a dense
//! symmetric eigendecomposition (QR-iteration and cyclic Jacobi rotations)
//! and a family of box-constrained dual coordinate-ascent solvers.

pub mod cache;
pub mod core;
pub mod data;
pub mod density;
pub mod kernel;
pub mod linalg;
pub mod persistence;
pub mod projection;
pub mod svm;

// Re-export main types for convenience
pub use crate::cache::{CacheStats, KernelCache};
pub use crate::core::traits::*;
pub use crate::core::types::*;
pub use crate::core::{KernelMachineError, Result};
pub use crate::data::{ArffDataset, CsvDataset, LibSvmDataset};
pub use crate::density::{
    GaussianMixture, GaussianMixtureModel, KernelDensity, ParzenDensity, SdcaDensity, SmoDensity,
};
pub use crate::kernel::{
    GaussianKernel, Kernel, LinearKernel, PolynomialKernel, PrecomputedKernel,
    WeightedProductKernel, WeightedSumKernel,
};
pub use crate::linalg::{EigenDecomposition, Matrix};
pub use crate::projection::{KernelPca, Nystrom, Pca};
pub use crate::svm::{MulticlassSdca, OneVsRest, SdcaSvm, TrainedSdcaSvm};

// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
