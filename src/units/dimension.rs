//! The dimension algebra: physical dimensionality as an exponent vector
//! over the seven SI base dimensions.

use crate::error::QuantityError;
use crate::numeric::Rational;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The seven base dimensions, in storage order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BaseDimension {
    Length,
    Mass,
    Time,
    Current,
    Temperature,
    Amount,
    LuminousIntensity,
}

pub(crate) const BASE_COUNT: usize = 7;

/// Display symbols for the base dimensions (ISO 80000 style, ASCII).
const BASE_SYMBOLS: [&str; BASE_COUNT] = ["L", "M", "T", "I", "Th", "N", "J"];

/// A physical dimension: one rational exponent per base dimension.
///
/// Two dimensions are equal iff all exponents are equal. Instances are
/// immutable; the algebra operations return fresh values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Dimension {
    exponents: [Rational; BASE_COUNT],
}

impl Dimension {
    /// The dimensionless marker: every exponent zero.
    pub fn none() -> Self {
        Self::default()
    }

    /// The dimension of a single base, exponent one.
    pub fn base(base: BaseDimension) -> Self {
        let mut exponents = [Rational::ZERO; BASE_COUNT];
        exponents[base as usize] = Rational::ONE;
        Self { exponents }
    }

    pub fn exponent(&self, base: BaseDimension) -> Rational {
        self.exponents[base as usize]
    }

    pub fn is_dimensionless(&self) -> bool {
        self.exponents.iter().all(|e| e.is_zero())
    }

    /// Elementwise exponent sum.
    pub fn multiply(&self, other: &Dimension) -> Dimension {
        let mut exponents = [Rational::ZERO; BASE_COUNT];
        for i in 0..BASE_COUNT {
            exponents[i] = self.exponents[i].add(&other.exponents[i]);
        }
        Dimension { exponents }
    }

    /// Elementwise exponent difference.
    pub fn divide(&self, other: &Dimension) -> Dimension {
        let mut exponents = [Rational::ZERO; BASE_COUNT];
        for i in 0..BASE_COUNT {
            exponents[i] = self.exponents[i].sub(&other.exponents[i]);
        }
        Dimension { exponents }
    }

    /// Elementwise scale by a rational exponent. Roots of dimensions are
    /// representable because exponents are rational.
    pub fn pow(&self, n: Rational) -> Dimension {
        let mut exponents = [Rational::ZERO; BASE_COUNT];
        for i in 0..BASE_COUNT {
            exponents[i] = self.exponents[i].mul(&n);
        }
        Dimension { exponents }
    }

    pub fn is_compatible(&self, other: &Dimension) -> bool {
        self == other
    }

    pub fn check_compatible(&self, other: &Dimension) -> Result<(), QuantityError> {
        if self.is_compatible(other) {
            Ok(())
        } else {
            Err(QuantityError::Dimension {
                expected: self.to_string(),
                found: other.to_string(),
            })
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let terms: Vec<(&str, Rational)> = BASE_SYMBOLS
            .iter()
            .zip(self.exponents.iter())
            .filter(|(_, e)| !e.is_zero())
            .map(|(s, e)| (*s, *e))
            .collect();
        write!(f, "{}", super::format_terms(&terms))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn base_dimensions_are_distinct() {
        let length = Dimension::base(BaseDimension::Length);
        let mass = Dimension::base(BaseDimension::Mass);
        assert!(!length.is_compatible(&mass));
        assert!(length.check_compatible(&mass).is_err());
        assert!(length.is_compatible(&length));
    }

    #[test]
    fn multiply_and_divide_are_inverse() {
        let length = Dimension::base(BaseDimension::Length);
        let time = Dimension::base(BaseDimension::Time);
        let speed = length.divide(&time);
        assert_eq!(speed.multiply(&time), length);
        assert_eq!(speed.exponent(BaseDimension::Time), Rational::integer(-1));
    }

    #[test]
    fn self_division_is_dimensionless() {
        let mass = Dimension::base(BaseDimension::Mass);
        assert!(mass.divide(&mass).is_dimensionless());
    }

    #[test]
    fn rational_roots_are_exact() {
        let length = Dimension::base(BaseDimension::Length);
        let area = length.pow(Rational::integer(2));
        let root = area.pow(Rational::new(1, 2));
        assert_eq!(root, length);
    }

    #[rstest]
    #[case(Dimension::none(), "1")]
    #[case(Dimension::base(BaseDimension::Length), "L")]
    #[case(
        Dimension::base(BaseDimension::Length).divide(&Dimension::base(BaseDimension::Time).pow(Rational::integer(2))),
        "L/T^2"
    )]
    fn display(#[case] dim: Dimension, #[case] expected: &str) {
        assert_eq!(dim.to_string(), expected);
    }
}
