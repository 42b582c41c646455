//! Dimensionality reduction built on the symmetric eigendecomposition

pub mod kernel_pca;
pub mod nystrom;
pub mod pca;

pub use self::kernel_pca::KernelPca;
pub use self::nystrom::Nystrom;
pub use self::pca::Pca;
