//! The unit algebra: a unit is a dimension plus a positive conversion
//! factor relative to the canonical (SI-coherent) unit of that dimension,
//! plus a composable display symbol.

use crate::error::QuantityError;
use crate::numeric::Rational;
use crate::units::dimension::{BaseDimension, Dimension};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A scaled instance of a dimension.
///
/// Invariant: `1 of this unit == factor × 1 canonical unit` of the same
/// dimension, with `factor > 0`. Immutable; the algebra operations return
/// fresh values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Unit {
    dim: Dimension,
    factor: f64,
    // Display symbols with their exponents, e.g. {"kg": 1, "m": 1, "s": -2}.
    symbol: BTreeMap<String, Rational>,
}

impl Unit {
    /// The neutral dimensionless unit.
    pub fn one() -> Self {
        Self {
            dim: Dimension::none(),
            factor: 1.0,
            symbol: BTreeMap::new(),
        }
    }

    /// A canonical base unit (factor one) for the given base dimension.
    pub fn base(symbol: &str, base: BaseDimension) -> Self {
        Self {
            dim: Dimension::base(base),
            factor: 1.0,
            symbol: BTreeMap::from([(symbol.to_string(), Rational::ONE)]),
        }
    }

    /// A named alias for an existing unit: same dimension and factor, a
    /// fresh symbol (e.g. `N` for `kg*m/s^2`).
    pub fn alternate(symbol: &str, parent: &Unit) -> Self {
        Self {
            dim: parent.dim,
            factor: parent.factor,
            symbol: BTreeMap::from([(symbol.to_string(), Rational::ONE)]),
        }
    }

    /// A rescaled named unit (e.g. `km` = 1000 × `m`). `scale` must be
    /// positive; non-positive scales are clamped away by the caller's
    /// contract and asserted in debug builds.
    pub fn scaled(symbol: &str, scale: f64, parent: &Unit) -> Self {
        debug_assert!(scale > 0.0);
        Self {
            dim: parent.dim,
            factor: scale * parent.factor,
            symbol: BTreeMap::from([(symbol.to_string(), Rational::ONE)]),
        }
    }

    pub fn dimension(&self) -> &Dimension {
        &self.dim
    }

    pub fn factor(&self) -> f64 {
        self.factor
    }

    pub fn is_dimensionless(&self) -> bool {
        self.dim.is_dimensionless()
    }

    fn merge_symbols(
        lhs: &BTreeMap<String, Rational>,
        rhs: &BTreeMap<String, Rational>,
        sign: i32,
    ) -> BTreeMap<String, Rational> {
        let mut out = lhs.clone();
        let sign = Rational::integer(sign);
        for (sym, exp) in rhs {
            let entry = out.entry(sym.clone()).or_default();
            *entry = entry.add(&exp.mul(&sign));
            if entry.is_zero() {
                out.remove(sym);
            }
        }
        out
    }

    /// Product: dimensions and symbols combine, factors multiply.
    pub fn multiply(&self, other: &Unit) -> Unit {
        Unit {
            dim: self.dim.multiply(&other.dim),
            factor: self.factor * other.factor,
            symbol: Self::merge_symbols(&self.symbol, &other.symbol, 1),
        }
    }

    /// Quotient: dimensions and symbols subtract, factors divide.
    pub fn divide(&self, other: &Unit) -> Unit {
        Unit {
            dim: self.dim.divide(&other.dim),
            factor: self.factor / other.factor,
            symbol: Self::merge_symbols(&self.symbol, &other.symbol, -1),
        }
    }

    /// Raises the unit to a rational power. Rational exponents are exact
    /// on the dimension vector; the factor is scaled through `powf`.
    pub fn pow(&self, n: Rational) -> Unit {
        if n.is_zero() {
            return Unit::one();
        }
        let symbol = self
            .symbol
            .iter()
            .map(|(s, e)| (s.clone(), e.mul(&n)))
            .collect();
        Unit {
            dim: self.dim.pow(n),
            factor: self.factor.powf(n.as_f64()),
            symbol,
        }
    }

    /// Square root, `unit^(1/2)`.
    pub fn sqrt(&self) -> Unit {
        self.pow(Rational::new(1, 2))
    }

    pub fn is_compatible(&self, other: &Unit) -> bool {
        self.dim.is_compatible(&other.dim)
    }

    /// Fails with a `Unit` error naming both symbols when the dimensions
    /// differ. Invoked before addition, subtraction, comparison, and
    /// conversion between quantities.
    pub fn check_compatible(&self, other: &Unit) -> Result<(), QuantityError> {
        if self.is_compatible(other) {
            Ok(())
        } else {
            Err(QuantityError::Unit {
                left: self.to_string(),
                right: other.to_string(),
            })
        }
    }

    /// Expresses a value of this unit in the canonical unit of its
    /// dimension.
    pub fn to_canonical(&self, value: f64) -> f64 {
        value * self.factor
    }

    /// Expresses a canonical value in this unit.
    pub fn from_canonical(&self, value: f64) -> f64 {
        value / self.factor
    }

    /// The multiplier converting values of `self` into values of `other`.
    pub fn conversion_to(&self, other: &Unit) -> Result<f64, QuantityError> {
        self.check_compatible(other)?;
        Ok(self.factor / other.factor)
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let terms: Vec<(&str, Rational)> = self
            .symbol
            .iter()
            .map(|(s, e)| (s.as_str(), *e))
            .collect();
        write!(f, "{}", super::format_terms(&terms))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;

    fn metre() -> Unit {
        Unit::base("m", BaseDimension::Length)
    }

    fn second() -> Unit {
        Unit::base("s", BaseDimension::Time)
    }

    #[test]
    fn composition_tracks_dimension_factor_and_symbol() {
        let km = Unit::scaled("km", 1000.0, &metre());
        let speed = km.divide(&second());
        assert_eq!(speed.to_string(), "km/s");
        assert_relative_eq!(speed.factor(), 1000.0);
        assert_eq!(speed.dimension(), metre().divide(&second()).dimension());
    }

    #[test]
    fn symbol_cancellation() {
        let m = metre();
        let area = m.multiply(&m);
        assert_eq!(area.to_string(), "m^2");
        assert_eq!(area.divide(&m).to_string(), "m");
        assert_eq!(m.divide(&m).to_string(), "1");
        assert!(m.divide(&m).is_dimensionless());
    }

    #[test]
    fn incompatible_units_name_both_symbols() {
        let kg = Unit::base("kg", BaseDimension::Mass);
        let err = metre().check_compatible(&kg).unwrap_err();
        assert_eq!(
            err,
            QuantityError::Unit {
                left: "m".into(),
                right: "kg".into()
            }
        );
    }

    #[rstest]
    #[case(1.0)]
    #[case(0.25)]
    #[case(-3.5)]
    fn canonical_round_trip(#[case] v: f64) {
        let km = Unit::scaled("km", 1000.0, &metre());
        assert_relative_eq!(km.from_canonical(km.to_canonical(v)), v);
        // km -> canonical -> km is a no-op.
        assert_relative_eq!(km.to_canonical(v), v * 1000.0);
    }

    #[test]
    fn rational_power_keeps_roots_exact() {
        let m = metre();
        let root = m.multiply(&m).sqrt();
        assert_eq!(root.dimension(), m.dimension());
        assert_eq!(root.to_string(), "m");
        assert_eq!(m.sqrt().to_string(), "m^1/2");
    }

    #[test]
    fn conversion_factor_composition() {
        let km = Unit::scaled("km", 1000.0, &metre());
        let mm = Unit::scaled("mm", 0.001, &metre());
        assert_relative_eq!(km.conversion_to(&mm).unwrap(), 1.0e6);
        assert!(km.conversion_to(&second()).is_err());
    }

    #[test]
    fn serde_round_trip() {
        let n = Unit::base("kg", BaseDimension::Mass)
            .multiply(&metre())
            .divide(&second().pow(Rational::integer(2)));
        let json = serde_json::to_string(&n).unwrap();
        let back: Unit = serde_json::from_str(&json).unwrap();
        assert_eq!(back, n);
        assert_eq!(back.to_string(), "kg*m/s^2");
    }
}
