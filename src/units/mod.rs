//! Unit and dimension algebra.

pub mod dimension;
pub mod si;
pub mod unit;

pub use dimension::{BaseDimension, Dimension};
pub use si::SiUnits;
pub use unit::Unit;

use crate::numeric::Rational;

/// Formats a set of (symbol, exponent) terms in canonical form:
/// positive exponents joined by `*`, negative ones behind a single `/`,
/// alphabetical order, `^` only for exponents other than one.
/// An empty term set renders as `1`.
pub(crate) fn format_terms(terms: &[(&str, Rational)]) -> String {
    let (num, den): (Vec<_>, Vec<_>) = terms
        .iter()
        .filter(|(_, e)| !e.is_zero())
        .partition(|(_, e)| *e > Rational::ZERO);

    let fmt = |mut terms: Vec<&(&str, Rational)>| -> String {
        if terms.is_empty() {
            return "1".to_string();
        }
        terms.sort_by(|a, b| a.0.cmp(b.0));
        terms
            .into_iter()
            .map(|(s, e)| {
                let mag = if *e < Rational::ZERO { e.neg() } else { *e };
                if mag == Rational::ONE {
                    (*s).to_string()
                } else {
                    format!("{}^{}", s, mag)
                }
            })
            .collect::<Vec<_>>()
            .join("*")
    };

    let num_str = fmt(num);
    let den_str = fmt(den);

    if den_str == "1" {
        num_str
    } else {
        format!("{}/{}", num_str, den_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_formatting() {
        let half = Rational::new(1, 2);
        assert_eq!(format_terms(&[]), "1");
        assert_eq!(format_terms(&[("m", Rational::ONE)]), "m");
        assert_eq!(
            format_terms(&[
                ("s", Rational::integer(-2)),
                ("m", Rational::ONE),
                ("kg", Rational::ONE),
            ]),
            "kg*m/s^2"
        );
        assert_eq!(format_terms(&[("m", half)]), "m^1/2");
        assert_eq!(format_terms(&[("s", Rational::integer(-1))]), "1/s");
    }
}
