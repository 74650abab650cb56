//! The SI unit provider.
//!
//! An explicit, immutable value constructed once at startup and passed to
//! whatever needs named units, never ambient state. The derived set
//! follows NIST 330; alternate units keep the coherent factor under a
//! fresh symbol (`N`, `J`, ...), scaled units carry a conversion factor
//! (`km`, `h`, ...).

use crate::numeric::Rational;
use crate::units::dimension::BaseDimension;
use crate::units::unit::Unit;

/// The canonical SI units plus common scaled conveniences.
#[derive(Debug, Clone)]
pub struct SiUnits {
    pub one: Unit,

    // Base units
    pub metre: Unit,
    pub kilogram: Unit,
    pub second: Unit,
    pub ampere: Unit,
    pub kelvin: Unit,
    pub mole: Unit,
    pub candela: Unit,

    // Derived units with special symbols
    pub radian: Unit,
    pub steradian: Unit,
    pub hertz: Unit,
    pub newton: Unit,
    pub pascal: Unit,
    pub joule: Unit,
    pub watt: Unit,
    pub coulomb: Unit,
    pub volt: Unit,
    pub ohm: Unit,
    pub farad: Unit,
    pub siemens: Unit,
    pub weber: Unit,
    pub tesla: Unit,
    pub henry: Unit,
    pub lumen: Unit,
    pub lux: Unit,
    pub becquerel: Unit,
    pub gray: Unit,
    pub sievert: Unit,
    pub katal: Unit,

    // Scaled conveniences
    pub kilometre: Unit,
    pub millimetre: Unit,
    pub gram: Unit,
    pub minute: Unit,
    pub hour: Unit,
}

impl SiUnits {
    pub fn new() -> Self {
        let one = Unit::one();
        let metre = Unit::base("m", BaseDimension::Length);
        let kilogram = Unit::base("kg", BaseDimension::Mass);
        let second = Unit::base("s", BaseDimension::Time);
        let ampere = Unit::base("A", BaseDimension::Current);
        let kelvin = Unit::base("K", BaseDimension::Temperature);
        let mole = Unit::base("mol", BaseDimension::Amount);
        let candela = Unit::base("cd", BaseDimension::LuminousIntensity);

        // The radian and steradian are aliases of the neutral unit: the
        // canonical form of m/m cancels, per NIST 330.
        let radian = Unit::alternate("rad", &one);
        let steradian = Unit::alternate("sr", &one);

        let per_second = one.divide(&second);
        let hertz = Unit::alternate("Hz", &per_second);
        let newton = Unit::alternate(
            "N",
            &kilogram
                .multiply(&metre)
                .divide(&second.pow(Rational::integer(2))),
        );
        let pascal = Unit::alternate("Pa", &newton.divide(&metre.pow(Rational::integer(2))));
        let joule = Unit::alternate("J", &newton.multiply(&metre));
        let watt = Unit::alternate("W", &joule.divide(&second));
        let coulomb = Unit::alternate("C", &ampere.multiply(&second));
        let volt = Unit::alternate("V", &watt.divide(&ampere));
        let ohm = Unit::alternate("Ohm", &volt.divide(&ampere));
        let farad = Unit::alternate("F", &coulomb.divide(&volt));
        let siemens = Unit::alternate("S", &ampere.divide(&volt));
        let weber = Unit::alternate("Wb", &volt.multiply(&second));
        let tesla = Unit::alternate("T", &weber.divide(&metre.pow(Rational::integer(2))));
        let henry = Unit::alternate("H", &weber.divide(&ampere));
        let lumen = Unit::alternate("lm", &candela.multiply(&steradian));
        let lux = Unit::alternate("lx", &lumen.divide(&metre.pow(Rational::integer(2))));
        let becquerel = Unit::alternate("Bq", &per_second);
        let gray = Unit::alternate("Gy", &joule.divide(&kilogram));
        let sievert = Unit::alternate("Sv", &joule.divide(&kilogram));
        let katal = Unit::alternate("kat", &mole.divide(&second));

        let kilometre = Unit::scaled("km", 1000.0, &metre);
        let millimetre = Unit::scaled("mm", 0.001, &metre);
        let gram = Unit::scaled("g", 0.001, &kilogram);
        let minute = Unit::scaled("min", 60.0, &second);
        let hour = Unit::scaled("h", 3600.0, &second);

        Self {
            one,
            metre,
            kilogram,
            second,
            ampere,
            kelvin,
            mole,
            candela,
            radian,
            steradian,
            hertz,
            newton,
            pascal,
            joule,
            watt,
            coulomb,
            volt,
            ohm,
            farad,
            siemens,
            weber,
            tesla,
            henry,
            lumen,
            lux,
            becquerel,
            gray,
            sievert,
            katal,
            kilometre,
            millimetre,
            gram,
            minute,
            hour,
        }
    }
}

impl Default for SiUnits {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn derived_units_have_coherent_factors() {
        let si = SiUnits::new();
        assert_relative_eq!(si.newton.factor(), 1.0);
        assert_relative_eq!(si.volt.factor(), 1.0);
        assert_relative_eq!(si.kilometre.factor(), 1000.0);
        assert_relative_eq!(si.hour.factor(), 3600.0);
    }

    #[test]
    fn newton_matches_its_base_expansion() {
        let si = SiUnits::new();
        let expanded = si
            .kilogram
            .multiply(&si.metre)
            .divide(&si.second.pow(Rational::integer(2)));
        assert!(si.newton.is_compatible(&expanded));
        assert_eq!(si.newton.to_string(), "N");
        assert_eq!(expanded.to_string(), "kg*m/s^2");
    }

    #[test]
    fn radian_is_dimensionless() {
        let si = SiUnits::new();
        assert!(si.radian.is_dimensionless());
        assert!(si.radian.is_compatible(&si.one));
    }

    #[test]
    fn joule_per_kilogram_units_agree() {
        let si = SiUnits::new();
        assert!(si.gray.is_compatible(&si.sievert));
        assert!(si.gray.is_compatible(&si.joule.divide(&si.kilogram)));
    }
}
