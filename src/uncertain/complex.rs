//! The complex-valued uncertain value: two correlated real channels.
//!
//! The real and imaginary parts each carry their own sensitivity map over
//! the same source registry, so the coupling introduced by complex
//! arithmetic (a product mixes both channels) propagates exactly into the
//! derived magnitude and phase.

use crate::uncertain::real::UncertainValue;
use crate::uncertain::sensitivity::SensitivityMap;
use crate::uncertain::source::SourceRegistry;
use num_complex::Complex64;
use serde::{Deserialize, Serialize};

/// A complex central value with per-channel sensitivity maps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UncertainComplex {
    value: Complex64,
    re_deps: SensitivityMap,
    im_deps: SensitivityMap,
}

impl UncertainComplex {
    pub fn exact(value: Complex64) -> Self {
        Self {
            value,
            re_deps: SensitivityMap::empty(),
            im_deps: SensitivityMap::empty(),
        }
    }

    /// A root complex measurement with independent gaussian uncertainty
    /// on each channel.
    pub fn gaussian(
        registry: &mut SourceRegistry,
        value: Complex64,
        sigma_re: f64,
        sigma_im: f64,
    ) -> Self {
        let re = registry.new_source(sigma_re * sigma_re);
        let im = registry.new_source(sigma_im * sigma_im);
        Self {
            value,
            re_deps: SensitivityMap::singleton(re),
            im_deps: SensitivityMap::singleton(im),
        }
    }

    /// Builds a complex value from two real uncertain channels. The
    /// channels may share sources; correlation is preserved.
    pub fn from_parts(re: &UncertainValue, im: &UncertainValue) -> Self {
        Self {
            value: Complex64::new(re.value(), im.value()),
            re_deps: re.deps().clone(),
            im_deps: im.deps().clone(),
        }
    }

    /// Promotes a real uncertain value to a complex one with an exact
    /// zero imaginary part.
    pub fn from_real(re: &UncertainValue) -> Self {
        Self {
            value: Complex64::new(re.value(), 0.0),
            re_deps: re.deps().clone(),
            im_deps: SensitivityMap::empty(),
        }
    }

    pub fn value(&self) -> Complex64 {
        self.value
    }

    /// The real channel as an uncertain value.
    pub fn re(&self) -> UncertainValue {
        UncertainValue::from_parts(self.value.re, self.re_deps.clone())
    }

    /// The imaginary channel as an uncertain value.
    pub fn im(&self) -> UncertainValue {
        UncertainValue::from_parts(self.value.im, self.im_deps.clone())
    }

    pub fn variance_re(&self, registry: &SourceRegistry) -> f64 {
        self.re_deps.variance(registry)
    }

    pub fn variance_im(&self, registry: &SourceRegistry) -> f64 {
        self.im_deps.variance(registry)
    }

    pub fn add(&self, other: &UncertainComplex) -> UncertainComplex {
        UncertainComplex {
            value: self.value + other.value,
            re_deps: SensitivityMap::combine(1.0, &self.re_deps, 1.0, &other.re_deps),
            im_deps: SensitivityMap::combine(1.0, &self.im_deps, 1.0, &other.im_deps),
        }
    }

    pub fn sub(&self, other: &UncertainComplex) -> UncertainComplex {
        UncertainComplex {
            value: self.value - other.value,
            re_deps: SensitivityMap::combine(1.0, &self.re_deps, -1.0, &other.re_deps),
            im_deps: SensitivityMap::combine(1.0, &self.im_deps, -1.0, &other.im_deps),
        }
    }

    /// `(a+bi)(c+di)`: re = ac - bd, im = ad + bc, with the four partials
    /// per channel chained through the operand maps.
    pub fn mul(&self, other: &UncertainComplex) -> UncertainComplex {
        let (a, b) = (self.value.re, self.value.im);
        let (c, d) = (other.value.re, other.value.im);
        let re_deps = SensitivityMap::combine(
            1.0,
            &SensitivityMap::combine(c, &self.re_deps, -d, &self.im_deps),
            1.0,
            &SensitivityMap::combine(a, &other.re_deps, -b, &other.im_deps),
        );
        let im_deps = SensitivityMap::combine(
            1.0,
            &SensitivityMap::combine(d, &self.re_deps, c, &self.im_deps),
            1.0,
            &SensitivityMap::combine(b, &other.re_deps, a, &other.im_deps),
        );
        UncertainComplex {
            value: self.value * other.value,
            re_deps,
            im_deps,
        }
    }

    /// Complex quotient with closed-form channel partials. A zero
    /// denominator yields non-finite floats, as in real division.
    pub fn div(&self, other: &UncertainComplex) -> UncertainComplex {
        let (a, b) = (self.value.re, self.value.im);
        let (c, d) = (other.value.re, other.value.im);
        let den = c * c + d * d;
        let value = self.value / other.value;
        let (re, im) = (value.re, value.im);

        // re = (ac + bd)/den, im = (bc - ad)/den
        let re_deps = SensitivityMap::combine(
            1.0,
            &SensitivityMap::combine(c / den, &self.re_deps, d / den, &self.im_deps),
            1.0,
            &SensitivityMap::combine(
                (a - 2.0 * c * re) / den,
                &other.re_deps,
                (b - 2.0 * d * re) / den,
                &other.im_deps,
            ),
        );
        let im_deps = SensitivityMap::combine(
            1.0,
            &SensitivityMap::combine(-d / den, &self.re_deps, c / den, &self.im_deps),
            1.0,
            &SensitivityMap::combine(
                (b - 2.0 * c * im) / den,
                &other.re_deps,
                (-a - 2.0 * d * im) / den,
                &other.im_deps,
            ),
        );
        UncertainComplex {
            value,
            re_deps,
            im_deps,
        }
    }

    pub fn neg(&self) -> UncertainComplex {
        UncertainComplex {
            value: -self.value,
            re_deps: self.re_deps.scale(-1.0),
            im_deps: self.im_deps.scale(-1.0),
        }
    }

    pub fn conj(&self) -> UncertainComplex {
        UncertainComplex {
            value: self.value.conj(),
            re_deps: self.re_deps.clone(),
            im_deps: self.im_deps.scale(-1.0),
        }
    }

    /// Rescales both channels by an exact real constant (unit
    /// conversion).
    pub fn scale(&self, k: f64) -> UncertainComplex {
        UncertainComplex {
            value: self.value * k,
            re_deps: self.re_deps.scale(k),
            im_deps: self.im_deps.scale(k),
        }
    }

    /// Chain rule for a holomorphic function: with `f'(z) = p + qi`, the
    /// Cauchy-Riemann equations give the channel jacobian
    /// `[[p, -q], [q, p]]`.
    fn holomorphic(&self, value: Complex64, derivative: Complex64) -> UncertainComplex {
        let (p, q) = (derivative.re, derivative.im);
        UncertainComplex {
            value,
            re_deps: SensitivityMap::combine(p, &self.re_deps, -q, &self.im_deps),
            im_deps: SensitivityMap::combine(q, &self.re_deps, p, &self.im_deps),
        }
    }

    /// Integer power with constant exponent.
    pub fn powi(&self, n: i32) -> UncertainComplex {
        if n == 0 {
            return UncertainComplex::exact(Complex64::new(1.0, 0.0));
        }
        self.holomorphic(self.value.powi(n), self.value.powi(n - 1) * f64::from(n))
    }

    /// Real power with constant exponent, on the principal branch.
    pub fn powf(&self, n: f64) -> UncertainComplex {
        self.holomorphic(self.value.powf(n), self.value.powf(n - 1.0) * n)
    }

    /// Principal square root.
    pub fn sqrt(&self) -> UncertainComplex {
        let root = self.value.sqrt();
        self.holomorphic(root, Complex64::new(1.0, 0.0) / (root * 2.0))
    }

    pub fn exp(&self) -> UncertainComplex {
        let e = self.value.exp();
        self.holomorphic(e, e)
    }

    /// Principal branch logarithm.
    pub fn ln(&self) -> UncertainComplex {
        self.holomorphic(self.value.ln(), self.value.inv())
    }

    /// `|z| = sqrt(a^2 + b^2)` with partials `a/|z|`, `b/|z|` blending
    /// both channel maps into one real value.
    pub fn magnitude(&self) -> UncertainValue {
        let m = self.value.norm();
        UncertainValue::from_parts(
            m,
            SensitivityMap::combine(
                self.value.re / m,
                &self.re_deps,
                self.value.im / m,
                &self.im_deps,
            ),
        )
    }

    /// `arg z = atan2(b, a)` with partials `-b/|z|^2`, `a/|z|^2`.
    pub fn phase(&self) -> UncertainValue {
        let (a, b) = (self.value.re, self.value.im);
        let n2 = a * a + b * b;
        UncertainValue::from_parts(
            self.value.arg(),
            SensitivityMap::combine(-b / n2, &self.re_deps, a / n2, &self.im_deps),
        )
    }
}
