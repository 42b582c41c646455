//! Kernel functions and combinators

pub mod combinators;
pub mod gaussian;
pub mod linear;
pub mod polynomial;
pub mod precomputed;
pub mod traits;

pub use self::combinators::{WeightedProductKernel, WeightedSumKernel};
pub use self::gaussian::GaussianKernel;
pub use self::linear::LinearKernel;
pub use self::polynomial::PolynomialKernel;
pub use self::precomputed::PrecomputedKernel;
pub use self::traits::Kernel;
