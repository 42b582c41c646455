//! Density estimators over kernels and Gaussian mixtures

pub mod estimate;
pub mod gmm;
pub mod parzen;
pub mod sdca;
pub mod smo;

pub use self::estimate::KernelDensity;
pub use self::gmm::{GaussianMixture, GaussianMixtureConfig, GaussianMixtureModel};
pub use self::parzen::ParzenDensity;
pub use self::sdca::{SdcaDensity, SdcaDensityConfig};
pub use self::smo::{SmoDensity, SmoDensityConfig};
