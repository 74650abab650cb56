//! The real-valued uncertain value core.
//!
//! Every operation computes the new central value, looks up the
//! closed-form partial derivatives from the dispatch layer, and builds
//! the result's sensitivity map as the linear combination of the operand
//! maps. Values are immutable; each operation returns a fresh instance.

use crate::error::QuantityError;
use crate::ops::{BinaryOp, UnaryOp};
use crate::uncertain::sensitivity::SensitivityMap;
use crate::uncertain::source::{SourceId, SourceRegistry};
use serde::{Deserialize, Serialize};

const SQRT_3: f64 = 1.732_050_807_568_877_2;
const SQRT_6: f64 = 2.449_489_742_783_178;

/// A central value with its propagated sensitivity map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UncertainValue {
    value: f64,
    deps: SensitivityMap,
}

impl UncertainValue {
    /// A value with no uncertainty at all.
    pub fn exact(value: f64) -> Self {
        Self {
            value,
            deps: SensitivityMap::empty(),
        }
    }

    /// A root measurement quantified as a gaussian: `sigma` is the
    /// standard uncertainty, registered as variance `sigma^2`.
    pub fn gaussian(registry: &mut SourceRegistry, value: f64, sigma: f64) -> Self {
        Self::with_variance(registry, value, sigma * sigma)
    }

    /// A root measurement quantified as a uniform distribution of the
    /// given half-width, `sigma = a / sqrt(3)`.
    pub fn uniform(registry: &mut SourceRegistry, value: f64, halfwidth: f64) -> Self {
        let sigma = halfwidth / SQRT_3;
        Self::with_variance(registry, value, sigma * sigma)
    }

    /// A root measurement quantified as a triangular distribution of the
    /// given half-width, `sigma = a / sqrt(6)`.
    pub fn triangular(registry: &mut SourceRegistry, value: f64, halfwidth: f64) -> Self {
        let sigma = halfwidth / SQRT_6;
        Self::with_variance(registry, value, sigma * sigma)
    }

    /// A root measurement with an explicit variance.
    pub fn with_variance(registry: &mut SourceRegistry, value: f64, variance: f64) -> Self {
        let source = registry.new_source(variance);
        Self {
            value,
            deps: SensitivityMap::singleton(source),
        }
    }

    /// A root measurement with an assigned number of degrees of freedom.
    pub fn gaussian_with_dof(
        registry: &mut SourceRegistry,
        value: f64,
        sigma: f64,
        dof: f64,
    ) -> Self {
        let source = registry.new_source_with_dof(sigma * sigma, dof);
        Self {
            value,
            deps: SensitivityMap::singleton(source),
        }
    }

    pub(crate) fn from_parts(value: f64, deps: SensitivityMap) -> Self {
        Self { value, deps }
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub(crate) fn deps(&self) -> &SensitivityMap {
        &self.deps
    }

    /// The source this value was measured as, if it is an unmodified root
    /// measurement (a singleton map with coefficient one).
    pub fn source(&self) -> Option<SourceId> {
        let mut it = self.deps.iter();
        match (it.next(), it.next()) {
            (Some((s, c)), None) if c == 1.0 => Some(s),
            _ => None,
        }
    }

    pub fn variance(&self, registry: &SourceRegistry) -> f64 {
        self.deps.variance(registry)
    }

    /// Combined standard uncertainty, the square root of the variance.
    pub fn uncertainty(&self, registry: &SourceRegistry) -> f64 {
        self.variance(registry).sqrt()
    }

    pub fn covariance(&self, other: &UncertainValue, registry: &SourceRegistry) -> f64 {
        self.deps.covariance(&other.deps, registry)
    }

    /// Effective degrees of freedom by the Welch-Satterthwaite formula.
    /// Infinite when every contributing source has infinite dof; zero when
    /// any contributing source has zero dof (its denominator term blows
    /// up).
    pub fn dof_effective(&self, registry: &SourceRegistry) -> f64 {
        let variance = self.variance(registry);
        let mut denom = 0.0;
        for (source, coeff) in self.deps.iter() {
            let dof = registry.dof(source);
            if dof == 0.0 {
                return 0.0;
            }
            if dof.is_infinite() {
                continue;
            }
            let contrib = coeff * coeff * registry.variance(source);
            denom += contrib * contrib / dof;
        }
        if denom == 0.0 {
            f64::INFINITY
        } else {
            variance * variance / denom
        }
    }

    /// Applies a binary operation from the dispatch table.
    pub fn apply_binary(op: BinaryOp, a: &UncertainValue, b: &UncertainValue) -> UncertainValue {
        let desc = op.descriptor();
        let (da, db) = (desc.partials)(a.value, b.value);
        UncertainValue {
            value: (desc.value)(a.value, b.value),
            deps: SensitivityMap::combine(da, &a.deps, db, &b.deps),
        }
    }

    /// Applies a unary operation from the dispatch table.
    pub fn apply_unary(op: UnaryOp, a: &UncertainValue) -> UncertainValue {
        let desc = op.descriptor();
        UncertainValue {
            value: (desc.value)(a.value),
            deps: a.deps.scale((desc.derivative)(a.value)),
        }
    }

    pub fn add(&self, other: &UncertainValue) -> UncertainValue {
        Self::apply_binary(BinaryOp::Add, self, other)
    }

    pub fn sub(&self, other: &UncertainValue) -> UncertainValue {
        Self::apply_binary(BinaryOp::Sub, self, other)
    }

    pub fn mul(&self, other: &UncertainValue) -> UncertainValue {
        Self::apply_binary(BinaryOp::Mul, self, other)
    }

    pub fn div(&self, other: &UncertainValue) -> UncertainValue {
        Self::apply_binary(BinaryOp::Div, self, other)
    }

    pub fn neg(&self) -> UncertainValue {
        Self::apply_unary(UnaryOp::Neg, self)
    }

    pub fn abs(&self) -> UncertainValue {
        Self::apply_unary(UnaryOp::Abs, self)
    }

    pub fn atan2(&self, other: &UncertainValue) -> UncertainValue {
        Self::apply_binary(BinaryOp::Atan2, self, other)
    }

    pub fn hypot(&self, other: &UncertainValue) -> UncertainValue {
        Self::apply_binary(BinaryOp::Hypot, self, other)
    }

    /// Rescales value and sensitivities by an exact constant (unit
    /// conversion).
    pub fn scale(&self, k: f64) -> UncertainValue {
        UncertainValue {
            value: self.value * k,
            deps: self.deps.scale(k),
        }
    }

    /// Integer power with constant exponent, `d/dx x^n = n x^(n-1)`.
    pub fn powi(&self, n: i32) -> UncertainValue {
        if n == 0 {
            return UncertainValue::exact(1.0);
        }
        // n - 1 overflows at i32::MIN; powf is exact for integral exponents.
        let derivative = f64::from(n) * self.value.powf(f64::from(n) - 1.0);
        UncertainValue {
            value: self.value.powi(n),
            deps: self.deps.scale(derivative),
        }
    }

    /// Real power with constant exponent.
    pub fn powf(&self, n: f64) -> UncertainValue {
        UncertainValue {
            value: self.value.powf(n),
            deps: self.deps.scale(n * self.value.powf(n - 1.0)),
        }
    }

    /// Power with an uncertain exponent,
    /// `d/dy x^y = x^y ln(x)`. The `ln` term only exists when the
    /// exponent actually carries uncertainty, and then requires a
    /// positive base.
    pub fn pow(&self, exponent: &UncertainValue) -> Result<UncertainValue, QuantityError> {
        if exponent.deps.is_empty() {
            return Ok(self.powf(exponent.value));
        }
        if self.value <= 0.0 {
            return Err(QuantityError::domain(
                "uncertain exponent requires a positive base",
            ));
        }
        let value = self.value.powf(exponent.value);
        let d_base = exponent.value * self.value.powf(exponent.value - 1.0);
        let d_exp = value * self.value.ln();
        Ok(UncertainValue {
            value,
            deps: SensitivityMap::combine(d_base, &self.deps, d_exp, &exponent.deps),
        })
    }

    pub fn sin(&self) -> UncertainValue {
        Self::apply_unary(UnaryOp::Sin, self)
    }

    pub fn cos(&self) -> UncertainValue {
        Self::apply_unary(UnaryOp::Cos, self)
    }

    pub fn tan(&self) -> UncertainValue {
        Self::apply_unary(UnaryOp::Tan, self)
    }

    pub fn asin(&self) -> UncertainValue {
        Self::apply_unary(UnaryOp::ArcSin, self)
    }

    pub fn acos(&self) -> UncertainValue {
        Self::apply_unary(UnaryOp::ArcCos, self)
    }

    pub fn atan(&self) -> UncertainValue {
        Self::apply_unary(UnaryOp::ArcTan, self)
    }

    pub fn sinh(&self) -> UncertainValue {
        Self::apply_unary(UnaryOp::Sinh, self)
    }

    pub fn cosh(&self) -> UncertainValue {
        Self::apply_unary(UnaryOp::Cosh, self)
    }

    pub fn tanh(&self) -> UncertainValue {
        Self::apply_unary(UnaryOp::Tanh, self)
    }

    pub fn asinh(&self) -> UncertainValue {
        Self::apply_unary(UnaryOp::ArcSinh, self)
    }

    pub fn acosh(&self) -> UncertainValue {
        Self::apply_unary(UnaryOp::ArcCosh, self)
    }

    pub fn atanh(&self) -> UncertainValue {
        Self::apply_unary(UnaryOp::ArcTanh, self)
    }

    pub fn exp(&self) -> UncertainValue {
        Self::apply_unary(UnaryOp::Exp, self)
    }

    pub fn ln(&self) -> UncertainValue {
        Self::apply_unary(UnaryOp::Ln, self)
    }

    pub fn log2(&self) -> UncertainValue {
        Self::apply_unary(UnaryOp::Log2, self)
    }

    pub fn log10(&self) -> UncertainValue {
        Self::apply_unary(UnaryOp::Log10, self)
    }

    pub fn sqrt(&self) -> UncertainValue {
        Self::apply_unary(UnaryOp::Sqrt, self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;

    #[test]
    fn self_subtraction_has_exactly_zero_uncertainty() {
        let mut reg = SourceRegistry::new();
        let x = UncertainValue::gaussian(&mut reg, 5.0, 0.3);
        let d = x.sub(&x);
        assert_relative_eq!(d.value(), 0.0);
        assert_relative_eq!(d.uncertainty(&reg), 0.0);
        assert!(d.deps().is_empty());
    }

    #[test]
    fn independent_variances_add() {
        let mut reg = SourceRegistry::new();
        let x = UncertainValue::gaussian(&mut reg, 1.0, 0.1);
        let y = UncertainValue::gaussian(&mut reg, 2.0, 0.2);
        let s = x.add(&y);
        assert_relative_eq!(s.value(), 3.0);
        assert_relative_eq!(s.variance(&reg), 0.01 + 0.04, max_relative = 1e-12);
    }

    #[test]
    fn product_rule_first_order() {
        let mut reg = SourceRegistry::new();
        let x = UncertainValue::gaussian(&mut reg, 2.0, 0.1);
        let y = UncertainValue::gaussian(&mut reg, 3.0, 0.2);
        let p = x.mul(&y);
        assert_relative_eq!(p.value(), 6.0);
        // (3*0.1)^2 + (2*0.2)^2 = 0.09 + 0.16 = 0.25
        assert_relative_eq!(p.variance(&reg), 0.25, max_relative = 1e-12);
    }

    #[test]
    fn quotient_partials() {
        let mut reg = SourceRegistry::new();
        let x = UncertainValue::gaussian(&mut reg, 6.0, 0.3);
        let y = UncertainValue::gaussian(&mut reg, 2.0, 0.1);
        let q = x.div(&y);
        assert_relative_eq!(q.value(), 3.0);
        // (0.3/2)^2 + (6*0.1/4)^2
        let expected = (0.3 / 2.0_f64).powi(2) + (6.0 * 0.1 / 4.0_f64).powi(2);
        assert_relative_eq!(q.variance(&reg), expected, max_relative = 1e-12);
    }

    #[test]
    fn correlated_quotient_cancels() {
        let mut reg = SourceRegistry::new();
        let x = UncertainValue::gaussian(&mut reg, 4.0, 0.4);
        let r = x.div(&x);
        assert_relative_eq!(r.value(), 1.0);
        // d(x/x) = 1/x - x/x^2 = 0 for every source.
        assert_relative_eq!(r.uncertainty(&reg), 0.0);
    }

    #[test]
    fn division_by_zero_propagates_non_finite() {
        let mut reg = SourceRegistry::new();
        let x = UncertainValue::gaussian(&mut reg, 1.0, 0.1);
        let zero = UncertainValue::exact(0.0);
        let q = x.div(&zero);
        assert!(q.value().is_infinite());
    }

    #[rstest]
    #[case(0.5)]
    #[case(1.2)]
    fn sin_derivative_scales_sigma(#[case] x0: f64) {
        let mut reg = SourceRegistry::new();
        let x = UncertainValue::gaussian(&mut reg, x0, 0.01);
        let s = x.sin();
        assert_relative_eq!(s.value(), x0.sin());
        assert_relative_eq!(
            s.uncertainty(&reg),
            x0.cos().abs() * 0.01,
            max_relative = 1e-12
        );
    }

    #[test]
    fn powi_uses_power_rule() {
        let mut reg = SourceRegistry::new();
        let x = UncertainValue::gaussian(&mut reg, 3.0, 0.1);
        let sq = x.powi(2);
        assert_relative_eq!(sq.value(), 9.0);
        assert_relative_eq!(sq.uncertainty(&reg), 0.6, max_relative = 1e-12);
    }

    #[test]
    fn powi_extreme_negative_exponent_does_not_overflow() {
        let mut reg = SourceRegistry::new();
        let x = UncertainValue::gaussian(&mut reg, 2.0, 0.1);
        let tiny = x.powi(i32::MIN);
        // 2^(i32::MIN) underflows to zero; so does the derivative.
        assert_relative_eq!(tiny.value(), 0.0);
        assert!(tiny.variance(&reg).is_finite());

        let inv_sq = x.powi(-2);
        assert_relative_eq!(inv_sq.value(), 0.25);
        // |d/dx x^-2| = 2/8 = 0.25
        assert_relative_eq!(inv_sq.uncertainty(&reg), 0.025, max_relative = 1e-12);
    }

    #[rstest]
    #[case(0.25)]
    #[case(0.75)]
    fn atanh_undoes_tanh(#[case] x0: f64) {
        let mut reg = SourceRegistry::new();
        let x = UncertainValue::gaussian(&mut reg, x0, 0.01);
        let back = x.tanh().atanh();
        assert_relative_eq!(back.value(), x0, max_relative = 1e-12);
        // The derivatives are reciprocal, so the variance round-trips.
        assert_relative_eq!(back.variance(&reg), x.variance(&reg), max_relative = 1e-9);
    }

    #[test]
    fn asinh_and_acosh_scale_sigma_by_the_derivative() {
        let mut reg = SourceRegistry::new();
        let x = UncertainValue::gaussian(&mut reg, 2.0, 0.1);
        let s = x.asinh();
        assert_relative_eq!(s.value(), 2.0_f64.asinh());
        assert_relative_eq!(
            s.uncertainty(&reg),
            0.1 / 5.0_f64.sqrt(),
            max_relative = 1e-12
        );
        let c = x.acosh();
        assert_relative_eq!(c.value(), 2.0_f64.acosh());
        assert_relative_eq!(
            c.uncertainty(&reg),
            0.1 / 3.0_f64.sqrt(),
            max_relative = 1e-12
        );
    }

    #[test]
    fn pow_with_exact_exponent_skips_log_term() {
        let mut reg = SourceRegistry::new();
        // Negative base is fine when the exponent carries no uncertainty.
        let x = UncertainValue::gaussian(&mut reg, -2.0, 0.1);
        let cube = x.pow(&UncertainValue::exact(3.0)).unwrap();
        assert_relative_eq!(cube.value(), -8.0);
        assert_relative_eq!(cube.uncertainty(&reg), 12.0 * 0.1, max_relative = 1e-12);
    }

    #[test]
    fn pow_with_uncertain_exponent_needs_positive_base() {
        let mut reg = SourceRegistry::new();
        let base = UncertainValue::gaussian(&mut reg, -2.0, 0.1);
        let exp = UncertainValue::gaussian(&mut reg, 2.0, 0.1);
        assert!(matches!(
            base.pow(&exp),
            Err(QuantityError::Domain { .. })
        ));
    }

    #[test]
    fn uniform_and_triangular_widths() {
        let mut reg = SourceRegistry::new();
        let u = UncertainValue::uniform(&mut reg, 0.0, 3.0);
        let t = UncertainValue::triangular(&mut reg, 0.0, 3.0);
        assert_relative_eq!(u.uncertainty(&reg), 3.0 / 3.0_f64.sqrt());
        assert_relative_eq!(t.uncertainty(&reg), 3.0 / 6.0_f64.sqrt());
    }

    #[test]
    fn covariance_of_shared_expression() {
        let mut reg = SourceRegistry::new();
        let x = UncertainValue::gaussian(&mut reg, 2.0, 0.5);
        let y = UncertainValue::gaussian(&mut reg, 1.0, 0.5);
        let a = x.add(&y);
        let b = x.sub(&y);
        // cov(a, b) = var(x) - var(y) = 0
        assert_relative_eq!(a.covariance(&b, &reg), 0.0);
        // cov(a, x) = var(x)
        assert_relative_eq!(a.covariance(&x, &reg), 0.25);
    }

    #[test]
    fn welch_satterthwaite_effective_dof() {
        let mut reg = SourceRegistry::new();
        let x = UncertainValue::gaussian_with_dof(&mut reg, 1.0, 1.0, 10.0);
        let y = UncertainValue::gaussian_with_dof(&mut reg, 1.0, 1.0, 10.0);
        let s = x.add(&y);
        // (1+1)^2 / (1/10 + 1/10) = 20
        assert_relative_eq!(s.dof_effective(&reg), 20.0, max_relative = 1e-12);

        let exact = UncertainValue::gaussian(&mut reg, 1.0, 1.0);
        assert!(exact.dof_effective(&reg).is_infinite());
    }

    #[test]
    fn zero_dof_source_collapses_effective_dof() {
        let mut reg = SourceRegistry::new();
        let x = UncertainValue::gaussian_with_dof(&mut reg, 1.0, 1.0, 10.0);
        let y = UncertainValue::gaussian_with_dof(&mut reg, 1.0, 1.0, 0.0);
        let s = x.add(&y);
        // A zero-dof term drives the denominator to infinity.
        assert_relative_eq!(s.dof_effective(&reg), 0.0);
    }
}
