//! Error types for kernel machine training and linear algebra

use thiserror::Error;

#[derive(Error, Debug)]
pub enum KernelMachineError {
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Matrix is not square: {rows}x{cols}")]
    NonSquareMatrix { rows: usize, cols: usize },

    #[error("Matrix is not symmetric at ({row}, {col})")]
    NonSymmetricMatrix { row: usize, col: usize },

    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Empty dataset")]
    EmptyDataset,

    #[error("Invalid label: expected -1 or +1, got {0}")]
    InvalidLabel(i32),

    #[error("Optimization failed: {0}")]
    OptimizationError(String),

    #[error("Dual variable row for sample {sample} sums to {sum:e} instead of 0")]
    DualInvariantViolation { sample: usize, sum: f64 },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Invalid format: {0}")]
    InvalidFormat(String),
}

pub type Result<T> = std::result::Result<T, KernelMachineError>;
