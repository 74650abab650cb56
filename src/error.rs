//! The closed error taxonomy surfaced by the quantity engine.
//!
//! Every failure is raised synchronously at the offending operation; the
//! core never logs or swallows errors. Non-finite numeric results are not
//! errors: they propagate as ordinary floats.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum QuantityError {
    /// Two dimensions disagree where they must match (add, subtract,
    /// compare, convert at the dimension level).
    #[error("dimension mismatch: expected {expected}, found {found}")]
    Dimension { expected: String, found: String },

    /// Two units disagree where they must be compatible. Same meaning as
    /// `Dimension`, reported at the unit-symbol level.
    #[error("incompatible units: {left} is not compatible with {right}")]
    Unit { left: String, right: String },

    /// An operation argument is structurally invalid, e.g. a dimensioned
    /// quantity fed to a transcendental function, or an uncertain exponent
    /// over a dimensioned base.
    #[error("domain error: {reason}")]
    Domain { reason: String },
}

impl QuantityError {
    pub(crate) fn domain(reason: impl Into<String>) -> Self {
        QuantityError::Domain {
            reason: reason.into(),
        }
    }
}
