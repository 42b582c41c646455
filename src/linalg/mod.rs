//! Dense linear algebra: vector primitives, matrices, QR decomposition and
//! symmetric eigendecomposition

pub mod matrix;
pub mod vector;

pub use self::matrix::{EigenDecomposition, Matrix};
