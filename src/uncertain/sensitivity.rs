//! Sensitivity maps: the partial derivative of a derived value with
//! respect to every independent source it depends on.
//!
//! Maps are immutable; every arithmetic operation produces a new map as a
//! linear combination of its operands' maps. Coefficients that cancel to
//! exactly zero are dropped, which is what makes `x - x` carry no
//! uncertainty at all rather than a noisy near-zero.

use crate::uncertain::source::{SourceId, SourceRegistry};
use serde::{Deserialize, Serialize};
use smallvec::{smallvec, SmallVec};

/// Partial-derivative coefficients keyed by source, sorted by `SourceId`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SensitivityMap {
    entries: SmallVec<[(SourceId, f64); 4]>,
}

impl SensitivityMap {
    /// The empty map: an exact value with no uncertainty.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The map of a root measurement: coefficient one on its own source.
    pub fn singleton(source: SourceId) -> Self {
        Self {
            entries: smallvec![(source, 1.0)],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn coefficient(&self, source: SourceId) -> f64 {
        self.entries
            .binary_search_by_key(&source, |(s, _)| *s)
            .map(|i| self.entries[i].1)
            .unwrap_or(0.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (SourceId, f64)> + '_ {
        self.entries.iter().copied()
    }

    /// `wa * a + wb * b`, merging entries for shared sources. This is the
    /// chain rule for a binary operation whose partials are `wa` and `wb`.
    pub fn combine(wa: f64, a: &SensitivityMap, wb: f64, b: &SensitivityMap) -> SensitivityMap {
        let mut entries = SmallVec::new();
        let (mut i, mut j) = (0, 0);
        while i < a.entries.len() || j < b.entries.len() {
            let take_a = match (a.entries.get(i), b.entries.get(j)) {
                (Some((sa, _)), Some((sb, _))) => {
                    if sa == sb {
                        // Shared source: contributions sum, not quadrature.
                        let coeff = wa * a.entries[i].1 + wb * b.entries[j].1;
                        if coeff != 0.0 {
                            entries.push((*sa, coeff));
                        }
                        i += 1;
                        j += 1;
                        continue;
                    }
                    sa < sb
                }
                (Some(_), None) => true,
                (None, _) => false,
            };
            if take_a {
                let (s, c) = a.entries[i];
                let coeff = wa * c;
                if coeff != 0.0 {
                    entries.push((s, coeff));
                }
                i += 1;
            } else {
                let (s, c) = b.entries[j];
                let coeff = wb * c;
                if coeff != 0.0 {
                    entries.push((s, coeff));
                }
                j += 1;
            }
        }
        SensitivityMap { entries }
    }

    /// `w * self`, the chain rule for a unary operation.
    pub fn scale(&self, w: f64) -> SensitivityMap {
        if w == 0.0 {
            return SensitivityMap::empty();
        }
        SensitivityMap {
            entries: self.entries.iter().map(|(s, c)| (*s, w * c)).collect(),
        }
    }

    /// Total variance: the quadratic form of this map against the source
    /// second moments, `sum_ij c_i c_j r(s_i, s_j) sigma_i sigma_j`.
    pub fn variance(&self, registry: &SourceRegistry) -> f64 {
        if registry.is_uncorrelated() {
            return self
                .entries
                .iter()
                .map(|(s, c)| c * c * registry.variance(*s))
                .sum();
        }
        let mut total = 0.0;
        for (si, ci) in self.iter() {
            for (sj, cj) in self.iter() {
                total += ci * cj * registry.covariance(si, sj);
            }
        }
        total
    }

    /// Covariance between two derived values,
    /// `sum_ij a_i b_j cov(s_i, s_j)`.
    pub fn covariance(&self, other: &SensitivityMap, registry: &SourceRegistry) -> f64 {
        if registry.is_uncorrelated() {
            // Only sources present in both maps contribute.
            return self
                .iter()
                .map(|(s, c)| c * other.coefficient(s) * registry.variance(s))
                .sum();
        }
        let mut total = 0.0;
        for (si, ci) in self.iter() {
            for (sj, cj) in other.iter() {
                total += ci * cj * registry.covariance(si, sj);
            }
        }
        total
    }
}
