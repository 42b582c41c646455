//! SVM solvers: binary and multiclass dual coordinate ascent

pub mod multiclass_sdca;
pub mod one_vs_rest;
pub mod sdca;

pub use self::multiclass_sdca::{MulticlassSdca, MulticlassSdcaConfig, TrainedMulticlassSdca};
pub use self::one_vs_rest::{OneVsRest, TrainedOneVsRest};
pub use self::sdca::{SdcaSvm, SdcaSvmConfig, TrainedSdcaSvm};
