//! Quantities: an uncertain scalar tagged with a unit.
//!
//! Every operation goes through the dispatch layer for its unit rule,
//! converts operands where the rule demands it, then delegates to the
//! real or complex uncertain core. Mixed real/complex arithmetic promotes
//! the real operand to a complex one with an exact zero imaginary part.

use crate::error::QuantityError;
use crate::numeric::Rational;
use crate::ops::{BinaryOp, UnaryOp, UnaryUnitRule, UnitRule};
use crate::uncertain::{SourceRegistry, UncertainComplex, UncertainValue};
use crate::units::Unit;
use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::ops;

/// The numeric payload of a quantity, real or complex.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum UncertainScalar {
    Real(UncertainValue),
    Complex(UncertainComplex),
}

impl UncertainScalar {
    fn scale(&self, k: f64) -> UncertainScalar {
        match self {
            UncertainScalar::Real(v) => UncertainScalar::Real(v.scale(k)),
            UncertainScalar::Complex(z) => UncertainScalar::Complex(z.scale(k)),
        }
    }

    fn neg(&self) -> UncertainScalar {
        match self {
            UncertainScalar::Real(v) => UncertainScalar::Real(v.neg()),
            UncertainScalar::Complex(z) => UncertainScalar::Complex(z.neg()),
        }
    }

    fn to_complex(&self) -> UncertainComplex {
        match self {
            UncertainScalar::Real(v) => UncertainComplex::from_real(v),
            UncertainScalar::Complex(z) => z.clone(),
        }
    }
}

/// An uncertain scalar with a unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quantity {
    value: UncertainScalar,
    unit: Unit,
}

impl Quantity {
    /// A gaussian measurement: central value and standard uncertainty,
    /// both expressed in `unit`.
    pub fn new(registry: &mut SourceRegistry, value: f64, sigma: f64, unit: Unit) -> Self {
        Self {
            value: UncertainScalar::Real(UncertainValue::gaussian(registry, value, sigma)),
            unit,
        }
    }

    /// A value with no uncertainty.
    pub fn exact(value: f64, unit: Unit) -> Self {
        Self {
            value: UncertainScalar::Real(UncertainValue::exact(value)),
            unit,
        }
    }

    /// A measurement quantified as a uniform distribution of the given
    /// half-width.
    pub fn uniform(registry: &mut SourceRegistry, value: f64, halfwidth: f64, unit: Unit) -> Self {
        Self {
            value: UncertainScalar::Real(UncertainValue::uniform(registry, value, halfwidth)),
            unit,
        }
    }

    /// A measurement quantified as a triangular distribution of the given
    /// half-width.
    pub fn triangular(
        registry: &mut SourceRegistry,
        value: f64,
        halfwidth: f64,
        unit: Unit,
    ) -> Self {
        Self {
            value: UncertainScalar::Real(UncertainValue::triangular(registry, value, halfwidth)),
            unit,
        }
    }

    /// A complex measurement with independent gaussian uncertainty on
    /// each channel.
    pub fn complex(
        registry: &mut SourceRegistry,
        value: Complex64,
        sigma_re: f64,
        sigma_im: f64,
        unit: Unit,
    ) -> Self {
        Self {
            value: UncertainScalar::Complex(UncertainComplex::gaussian(
                registry, value, sigma_re, sigma_im,
            )),
            unit,
        }
    }

    pub fn from_uncertain(value: UncertainValue, unit: Unit) -> Self {
        Self {
            value: UncertainScalar::Real(value),
            unit,
        }
    }

    pub fn from_complex(value: UncertainComplex, unit: Unit) -> Self {
        Self {
            value: UncertainScalar::Complex(value),
            unit,
        }
    }

    pub fn unit(&self) -> &Unit {
        &self.unit
    }

    pub fn scalar(&self) -> &UncertainScalar {
        &self.value
    }

    pub fn is_complex(&self) -> bool {
        matches!(self.value, UncertainScalar::Complex(_))
    }

    /// The central value expressed in this quantity's own unit. For a
    /// complex quantity this is the real part.
    pub fn value(&self) -> f64 {
        match &self.value {
            UncertainScalar::Real(v) => v.value(),
            UncertainScalar::Complex(z) => z.value().re,
        }
    }

    /// The central value as a complex number.
    pub fn complex_value(&self) -> Complex64 {
        match &self.value {
            UncertainScalar::Real(v) => Complex64::new(v.value(), 0.0),
            UncertainScalar::Complex(z) => z.value(),
        }
    }

    fn as_real(&self, op: &str) -> Result<&UncertainValue, QuantityError> {
        match &self.value {
            UncertainScalar::Real(v) => Ok(v),
            UncertainScalar::Complex(_) => Err(QuantityError::domain(format!(
                "{op} is not defined for complex values"
            ))),
        }
    }

    fn require_dimensionless(&self, op: &str) -> Result<(), QuantityError> {
        if self.unit.is_dimensionless() {
            Ok(())
        } else {
            Err(QuantityError::domain(format!(
                "{op} requires a dimensionless operand, found {}",
                self.unit
            )))
        }
    }

    /// Total variance; for a complex quantity, the sum over both
    /// channels.
    pub fn variance(&self, registry: &SourceRegistry) -> f64 {
        match &self.value {
            UncertainScalar::Real(v) => v.variance(registry),
            UncertainScalar::Complex(z) => z.variance_re(registry) + z.variance_im(registry),
        }
    }

    /// Combined standard uncertainty, in this quantity's own unit.
    pub fn uncertainty(&self, registry: &SourceRegistry) -> f64 {
        self.variance(registry).sqrt()
    }

    /// Covariance between two real quantities, computed on canonical
    /// values so mixed units compare meaningfully.
    pub fn covariance(
        &self,
        other: &Quantity,
        registry: &SourceRegistry,
    ) -> Result<f64, QuantityError> {
        let a = self.as_real("covariance")?.scale(self.unit.factor());
        let b = other.as_real("covariance")?.scale(other.unit.factor());
        Ok(a.covariance(&b, registry))
    }

    /// Welch-Satterthwaite effective degrees of freedom.
    pub fn dof_effective(&self, registry: &SourceRegistry) -> Result<f64, QuantityError> {
        Ok(self.as_real("effective dof")?.dof_effective(registry))
    }

    /// Applies a binary operation, enforcing its unit rule.
    pub fn apply_binary(
        op: BinaryOp,
        lhs: &Quantity,
        rhs: &Quantity,
    ) -> Result<Quantity, QuantityError> {
        let desc = op.descriptor();
        let (left, right, unit) = match desc.unit {
            UnitRule::Same => {
                // Result carries the left unit; the right value converts.
                let k = rhs.unit.conversion_to(&lhs.unit)?;
                (lhs.value.clone(), rhs.value.scale(k), lhs.unit.clone())
            }
            UnitRule::Multiply => (
                lhs.value.clone(),
                rhs.value.clone(),
                lhs.unit.multiply(&rhs.unit),
            ),
            UnitRule::Divide => (
                lhs.value.clone(),
                rhs.value.clone(),
                lhs.unit.divide(&rhs.unit),
            ),
            UnitRule::Dimensionless => {
                lhs.require_dimensionless(desc.symbol)?;
                rhs.require_dimensionless(desc.symbol)?;
                (
                    lhs.value.scale(lhs.unit.factor()),
                    rhs.value.scale(rhs.unit.factor()),
                    Unit::one(),
                )
            }
        };
        let value = match (&left, &right) {
            (UncertainScalar::Real(a), UncertainScalar::Real(b)) => {
                UncertainScalar::Real(UncertainValue::apply_binary(op, a, b))
            }
            _ => {
                let a = left.to_complex();
                let b = right.to_complex();
                let out = match op {
                    BinaryOp::Add => a.add(&b),
                    BinaryOp::Sub => a.sub(&b),
                    BinaryOp::Mul => a.mul(&b),
                    BinaryOp::Div => a.div(&b),
                    _ => {
                        return Err(QuantityError::domain(format!(
                            "{} is not defined for complex values",
                            desc.symbol
                        )))
                    }
                };
                UncertainScalar::Complex(out)
            }
        };
        Ok(Quantity { value, unit })
    }

    /// Applies a unary operation, enforcing its unit rule.
    pub fn apply_unary(op: UnaryOp, operand: &Quantity) -> Result<Quantity, QuantityError> {
        let desc = op.descriptor();
        let (scalar, unit) = match desc.unit {
            UnaryUnitRule::Same => (operand.value.clone(), operand.unit.clone()),
            UnaryUnitRule::Dimensionless => {
                operand.require_dimensionless(desc.symbol)?;
                // Scaled dimensionless units feed canonical values in.
                (operand.value.scale(operand.unit.factor()), Unit::one())
            }
            UnaryUnitRule::Sqrt => (operand.value.clone(), operand.unit.sqrt()),
        };
        let value = match &scalar {
            UncertainScalar::Real(v) => UncertainScalar::Real(UncertainValue::apply_unary(op, v)),
            UncertainScalar::Complex(z) => {
                let out = match op {
                    UnaryOp::Neg => z.neg(),
                    UnaryOp::Sqrt => z.sqrt(),
                    UnaryOp::Exp => z.exp(),
                    UnaryOp::Ln => z.ln(),
                    _ => {
                        return Err(QuantityError::domain(format!(
                            "{} is not defined for complex values",
                            desc.symbol
                        )))
                    }
                };
                UncertainScalar::Complex(out)
            }
        };
        Ok(Quantity { value, unit })
    }

    pub fn try_add(&self, other: &Quantity) -> Result<Quantity, QuantityError> {
        Self::apply_binary(BinaryOp::Add, self, other)
    }

    pub fn try_sub(&self, other: &Quantity) -> Result<Quantity, QuantityError> {
        Self::apply_binary(BinaryOp::Sub, self, other)
    }

    pub fn try_mul(&self, other: &Quantity) -> Result<Quantity, QuantityError> {
        Self::apply_binary(BinaryOp::Mul, self, other)
    }

    pub fn try_div(&self, other: &Quantity) -> Result<Quantity, QuantityError> {
        Self::apply_binary(BinaryOp::Div, self, other)
    }

    pub fn try_atan2(&self, other: &Quantity) -> Result<Quantity, QuantityError> {
        Self::apply_binary(BinaryOp::Atan2, self, other)
    }

    pub fn try_hypot(&self, other: &Quantity) -> Result<Quantity, QuantityError> {
        Self::apply_binary(BinaryOp::Hypot, self, other)
    }

    pub fn abs(&self) -> Result<Quantity, QuantityError> {
        Self::apply_unary(UnaryOp::Abs, self)
    }

    pub fn sin(&self) -> Result<Quantity, QuantityError> {
        Self::apply_unary(UnaryOp::Sin, self)
    }

    pub fn cos(&self) -> Result<Quantity, QuantityError> {
        Self::apply_unary(UnaryOp::Cos, self)
    }

    pub fn tan(&self) -> Result<Quantity, QuantityError> {
        Self::apply_unary(UnaryOp::Tan, self)
    }

    pub fn asin(&self) -> Result<Quantity, QuantityError> {
        Self::apply_unary(UnaryOp::ArcSin, self)
    }

    pub fn acos(&self) -> Result<Quantity, QuantityError> {
        Self::apply_unary(UnaryOp::ArcCos, self)
    }

    pub fn atan(&self) -> Result<Quantity, QuantityError> {
        Self::apply_unary(UnaryOp::ArcTan, self)
    }

    pub fn sinh(&self) -> Result<Quantity, QuantityError> {
        Self::apply_unary(UnaryOp::Sinh, self)
    }

    pub fn cosh(&self) -> Result<Quantity, QuantityError> {
        Self::apply_unary(UnaryOp::Cosh, self)
    }

    pub fn tanh(&self) -> Result<Quantity, QuantityError> {
        Self::apply_unary(UnaryOp::Tanh, self)
    }

    pub fn asinh(&self) -> Result<Quantity, QuantityError> {
        Self::apply_unary(UnaryOp::ArcSinh, self)
    }

    pub fn acosh(&self) -> Result<Quantity, QuantityError> {
        Self::apply_unary(UnaryOp::ArcCosh, self)
    }

    pub fn atanh(&self) -> Result<Quantity, QuantityError> {
        Self::apply_unary(UnaryOp::ArcTanh, self)
    }

    pub fn exp(&self) -> Result<Quantity, QuantityError> {
        Self::apply_unary(UnaryOp::Exp, self)
    }

    pub fn ln(&self) -> Result<Quantity, QuantityError> {
        Self::apply_unary(UnaryOp::Ln, self)
    }

    pub fn log2(&self) -> Result<Quantity, QuantityError> {
        Self::apply_unary(UnaryOp::Log2, self)
    }

    pub fn log10(&self) -> Result<Quantity, QuantityError> {
        Self::apply_unary(UnaryOp::Log10, self)
    }

    pub fn sqrt(&self) -> Result<Quantity, QuantityError> {
        Self::apply_unary(UnaryOp::Sqrt, self)
    }

    /// Raises to an exact rational power. The unit exponents stay exact;
    /// the central value goes through `powf`.
    pub fn pow(&self, n: Rational) -> Quantity {
        let value = match &self.value {
            UncertainScalar::Real(v) => UncertainScalar::Real(v.powf(n.as_f64())),
            UncertainScalar::Complex(z) => UncertainScalar::Complex(z.powf(n.as_f64())),
        };
        Quantity {
            value,
            unit: self.unit.pow(n),
        }
    }

    /// Raises to an exact integer power.
    pub fn powi(&self, n: i32) -> Quantity {
        let value = match &self.value {
            UncertainScalar::Real(v) => UncertainScalar::Real(v.powi(n)),
            UncertainScalar::Complex(z) => UncertainScalar::Complex(z.powi(n)),
        };
        Quantity {
            value,
            unit: self.unit.pow(Rational::integer(n)),
        }
    }

    /// Raises to an uncertain exponent. The exponent must be
    /// dimensionless; a dimensioned base additionally requires an exact
    /// integer exponent so the result unit stays well defined.
    pub fn try_pow(&self, exponent: &Quantity) -> Result<Quantity, QuantityError> {
        if !exponent.unit.is_dimensionless() {
            return Err(QuantityError::Dimension {
                expected: "1".to_string(),
                found: exponent.unit.to_string(),
            });
        }
        let exp = exponent.as_real("pow exponent")?.scale(exponent.unit.factor());
        let base = self.as_real("pow")?;

        if self.unit.is_dimensionless() {
            let canonical = base.scale(self.unit.factor());
            return Ok(Quantity {
                value: UncertainScalar::Real(canonical.pow(&exp)?),
                unit: Unit::one(),
            });
        }
        if !exp.deps().is_empty() {
            return Err(QuantityError::domain(
                "a dimensioned base requires an exact exponent",
            ));
        }
        let n = exp.value();
        if n.fract() != 0.0 || n.abs() > f64::from(i32::MAX) {
            return Err(QuantityError::domain(
                "a dimensioned base requires an integer exponent",
            ));
        }
        Ok(self.powi(n as i32))
    }

    /// Re-expresses this quantity in a compatible unit. Value and
    /// sensitivities rescale together.
    pub fn to_unit(&self, unit: &Unit) -> Result<Quantity, QuantityError> {
        let k = self.unit.conversion_to(unit)?;
        Ok(Quantity {
            value: self.value.scale(k),
            unit: unit.clone(),
        })
    }

    /// The central value expressed in the canonical unit of its
    /// dimension. For a complex quantity this is the real part.
    pub fn canonical_value(&self) -> f64 {
        self.value() * self.unit.factor()
    }

    /// The central value expressed in a compatible unit.
    pub fn value_in(&self, unit: &Unit) -> Result<f64, QuantityError> {
        let k = self.unit.conversion_to(unit)?;
        Ok(self.as_real("value_in")?.value() * k)
    }

    /// Orders two compatible real quantities by canonical central value.
    pub fn try_cmp(&self, other: &Quantity) -> Result<Ordering, QuantityError> {
        self.unit.check_compatible(&other.unit)?;
        let a = self.as_real("comparison")?.value() * self.unit.factor();
        let b = other.as_real("comparison")?.value() * other.unit.factor();
        a.partial_cmp(&b)
            .ok_or_else(|| QuantityError::domain("cannot order non-finite values"))
    }

    /// Absolute value of a real quantity, modulus of a complex one. Keeps
    /// the unit.
    pub fn magnitude(&self) -> Quantity {
        let value = match &self.value {
            UncertainScalar::Real(v) => UncertainScalar::Real(v.abs()),
            UncertainScalar::Complex(z) => UncertainScalar::Real(z.magnitude()),
        };
        Quantity {
            value,
            unit: self.unit.clone(),
        }
    }

    /// The argument, as a dimensionless quantity. Zero or pi for a real
    /// quantity.
    pub fn phase(&self) -> Quantity {
        match &self.value {
            UncertainScalar::Real(v) => {
                let angle = if v.value() < 0.0 { std::f64::consts::PI } else { 0.0 };
                Quantity::exact(angle, Unit::one())
            }
            UncertainScalar::Complex(z) => Quantity {
                value: UncertainScalar::Real(z.phase()),
                unit: Unit::one(),
            },
        }
    }

    pub fn conj(&self) -> Quantity {
        let value = match &self.value {
            UncertainScalar::Real(v) => UncertainScalar::Real(v.clone()),
            UncertainScalar::Complex(z) => UncertainScalar::Complex(z.conj()),
        };
        Quantity {
            value,
            unit: self.unit.clone(),
        }
    }

    /// The real part, keeping the unit.
    pub fn re(&self) -> Quantity {
        let value = match &self.value {
            UncertainScalar::Real(v) => UncertainScalar::Real(v.clone()),
            UncertainScalar::Complex(z) => UncertainScalar::Real(z.re()),
        };
        Quantity {
            value,
            unit: self.unit.clone(),
        }
    }

    /// The imaginary part, keeping the unit.
    pub fn im(&self) -> Quantity {
        let value = match &self.value {
            UncertainScalar::Real(_) => UncertainScalar::Real(UncertainValue::exact(0.0)),
            UncertainScalar::Complex(z) => UncertainScalar::Real(z.im()),
        };
        Quantity {
            value,
            unit: self.unit.clone(),
        }
    }

    /// `"value ± uncertainty symbol"`, with the symbol omitted when the
    /// unit is the neutral one.
    pub fn describe(&self, registry: &SourceRegistry) -> String {
        let mut out = match &self.value {
            UncertainScalar::Real(v) => {
                format!("{} ± {}", v.value(), self.uncertainty(registry))
            }
            UncertainScalar::Complex(z) => format!(
                "{} ± ({}, {})",
                z.value(),
                z.variance_re(registry).sqrt(),
                z.variance_im(registry).sqrt()
            ),
        };
        let unit = self.unit.to_string();
        if unit != "1" {
            out.push(' ');
            out.push_str(&unit);
        }
        out
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            UncertainScalar::Real(v) => write!(f, "{}", v.value())?,
            UncertainScalar::Complex(z) => write!(f, "{}", z.value())?,
        }
        let unit = self.unit.to_string();
        if unit != "1" {
            write!(f, " {}", unit)?;
        }
        Ok(())
    }
}

impl ops::Add for &Quantity {
    type Output = Result<Quantity, QuantityError>;

    fn add(self, rhs: &Quantity) -> Self::Output {
        self.try_add(rhs)
    }
}

impl ops::Sub for &Quantity {
    type Output = Result<Quantity, QuantityError>;

    fn sub(self, rhs: &Quantity) -> Self::Output {
        self.try_sub(rhs)
    }
}

impl ops::Mul for &Quantity {
    type Output = Result<Quantity, QuantityError>;

    fn mul(self, rhs: &Quantity) -> Self::Output {
        self.try_mul(rhs)
    }
}

impl ops::Div for &Quantity {
    type Output = Result<Quantity, QuantityError>;

    fn div(self, rhs: &Quantity) -> Self::Output {
        self.try_div(rhs)
    }
}

impl ops::Neg for &Quantity {
    type Output = Quantity;

    fn neg(self) -> Quantity {
        Quantity {
            value: self.value.neg(),
            unit: self.unit.clone(),
        }
    }
}
