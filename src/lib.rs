//! Uncertain quantities with units.
//!
//! Values carry a central estimate, a sensitivity map over independent
//! measurement sources, and a unit. Arithmetic propagates uncertainty to
//! first order (GUM), tracks correlation between derived results, and
//! enforces dimensional consistency through the unit algebra.
//!
//! ```
//! use sigma_units::{Quantity, SourceRegistry, SiUnits};
//!
//! let si = SiUnits::new();
//! let mut reg = SourceRegistry::new();
//!
//! let distance = Quantity::new(&mut reg, 100.0, 0.5, si.metre.clone());
//! let time = Quantity::new(&mut reg, 9.58, 0.02, si.second.clone());
//! let speed = distance.try_div(&time).unwrap();
//!
//! assert_eq!(speed.unit().to_string(), "m/s");
//! assert!(speed.uncertainty(&reg) > 0.0);
//! ```

pub mod error;
pub mod numeric;
pub mod ops;
pub mod quantity;
pub mod uncertain;
pub mod units;

pub use error::QuantityError;
pub use numeric::Rational;
pub use ops::{BinaryOp, UnaryOp};
pub use quantity::{Quantity, UncertainScalar};
pub use uncertain::{SensitivityMap, SourceId, SourceRegistry, UncertainComplex, UncertainValue};
pub use units::{BaseDimension, Dimension, SiUnits, Unit};
