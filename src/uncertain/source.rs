//! The correlation tracker: identity allocation and second-moment data
//! for independent measurement sources.
//!
//! A `SourceId` is an opaque handle; all combination logic lives in the
//! sensitivity maps. The registry itself only stores, per source, the
//! variance, the degrees of freedom, and any pairwise correlation
//! coefficients assigned by the caller.

use serde::{Deserialize, Serialize};

/// Opaque identity of one independently measured quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SourceId(u32);

impl SourceId {
    #[inline(always)]
    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

/// Registry of measurement sources.
///
/// Write-once per source: allocation fixes the variance and the degrees of
/// freedom. Correlation coefficients may be declared between distinct
/// sources; autocorrelation is fixed at one and cannot be overridden.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourceRegistry {
    variances: Vec<f64>,
    dofs: Vec<f64>,
    // Flat, symmetric-by-construction list; kept small and serializable.
    correlations: Vec<(SourceId, SourceId, f64)>,
}

impl SourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.variances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variances.is_empty()
    }

    /// Allocates a fresh source with the given variance and infinite
    /// degrees of freedom.
    pub fn new_source(&mut self, variance: f64) -> SourceId {
        self.new_source_with_dof(variance, f64::INFINITY)
    }

    /// Allocates a fresh source with the given variance and an assigned
    /// number of degrees of freedom.
    pub fn new_source_with_dof(&mut self, variance: f64, dof: f64) -> SourceId {
        let id = SourceId(self.variances.len() as u32);
        self.variances.push(variance);
        self.dofs.push(dof);
        id
    }

    pub fn variance(&self, source: SourceId) -> f64 {
        self.variances.get(source.index()).copied().unwrap_or(0.0)
    }

    pub fn standard_uncertainty(&self, source: SourceId) -> f64 {
        self.variance(source).sqrt()
    }

    pub fn dof(&self, source: SourceId) -> f64 {
        self.dofs
            .get(source.index())
            .copied()
            .unwrap_or(f64::INFINITY)
    }

    /// True when no cross-correlations have been declared; the variance
    /// quadratic form then reduces to its diagonal.
    pub fn is_uncorrelated(&self) -> bool {
        self.correlations.is_empty()
    }

    /// Declares the correlation coefficient `r(a, b)`. Symmetry is
    /// implied; declaring `a == b` has no effect.
    pub fn set_correlation(&mut self, a: SourceId, b: SourceId, r: f64) {
        if a == b {
            return;
        }
        for entry in self.correlations.iter_mut() {
            if (entry.0 == a && entry.1 == b) || (entry.0 == b && entry.1 == a) {
                entry.2 = r;
                return;
            }
        }
        self.correlations.push((a, b, r));
    }

    /// The correlation coefficient `r(a, b)`: one for `a == b`, zero if
    /// never declared.
    pub fn correlation(&self, a: SourceId, b: SourceId) -> f64 {
        if a == b {
            return 1.0;
        }
        self.correlations
            .iter()
            .find(|(x, y, _)| (*x == a && *y == b) || (*x == b && *y == a))
            .map(|(_, _, r)| *r)
            .unwrap_or(0.0)
    }

    /// Covariance between two sources, `r(a,b) * sigma_a * sigma_b`.
    pub fn covariance(&self, a: SourceId, b: SourceId) -> f64 {
        if a == b {
            return self.variance(a);
        }
        let r = self.correlation(a, b);
        if r == 0.0 {
            0.0
        } else {
            r * self.standard_uncertainty(a) * self.standard_uncertainty(b)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn allocation_and_lookup() {
        let mut reg = SourceRegistry::new();
        let a = reg.new_source(0.04);
        let b = reg.new_source_with_dof(0.25, 9.0);
        assert_ne!(a, b);
        assert_relative_eq!(reg.variance(a), 0.04);
        assert_relative_eq!(reg.standard_uncertainty(a), 0.2);
        assert_relative_eq!(reg.dof(b), 9.0);
        assert!(reg.dof(a).is_infinite());
    }

    #[test]
    fn correlation_is_symmetric_with_fixed_diagonal() {
        let mut reg = SourceRegistry::new();
        let a = reg.new_source(1.0);
        let b = reg.new_source(4.0);
        assert_relative_eq!(reg.correlation(a, a), 1.0);
        assert_relative_eq!(reg.correlation(a, b), 0.0);

        reg.set_correlation(a, b, 0.5);
        assert_relative_eq!(reg.correlation(b, a), 0.5);
        assert_relative_eq!(reg.covariance(a, b), 0.5 * 1.0 * 2.0);

        // Autocorrelation cannot be overridden.
        reg.set_correlation(a, a, 0.0);
        assert_relative_eq!(reg.correlation(a, a), 1.0);
    }

    #[test]
    fn serde_round_trip() {
        let mut reg = SourceRegistry::new();
        let a = reg.new_source(0.01);
        let b = reg.new_source(0.09);
        reg.set_correlation(a, b, -0.25);

        let json = serde_json::to_string(&reg).unwrap();
        let back: SourceRegistry = serde_json::from_str(&json).unwrap();
        assert_eq!(back.len(), 2);
        assert_relative_eq!(back.variance(b), 0.09);
        assert_relative_eq!(back.correlation(a, b), -0.25);
    }
}
