//! Uncertainty propagation: sources, sensitivity maps, and the real and
//! complex uncertain value cores.

pub mod complex;
pub mod real;
pub mod sensitivity;
pub mod source;

pub use complex::UncertainComplex;
pub use real::UncertainValue;
pub use sensitivity::SensitivityMap;
pub use source::{SourceId, SourceRegistry};
