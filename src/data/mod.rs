//! Data loading for common dataset formats
//!
//! Every importer produces dense labeled samples; the core treats them as an
//! opaque list. The binary fvec format carries no labels and ships a helper
//! to attach them.

pub mod arff;
pub mod csv;
pub mod fvec;
pub mod libsvm;

pub use self::arff::ArffDataset;
pub use self::csv::CsvDataset;
pub use self::fvec::{label_vectors, parse_fvec, read_fvec, write_fvec};
pub use self::libsvm::LibSvmDataset;
