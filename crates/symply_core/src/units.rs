//! SI dimensions and units.
//!
//! A [`Dimension`] is the vector of exponents over the seven SI base
//! dimensions. A [`Unit`] pairs a dimension with the factor that converts a
//! value in that unit to SI base units (kilometer: length, 1000).

use crate::engine::{self, Ast, BinaryOp};
use crate::error::{Error, Result};
use num_rational::Rational32;
use num_traits::{CheckedAdd, CheckedMul};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;
use std::ops::{Div, Mul};

const BASE_COUNT: usize = 7;

const BASE_NAMES: [&str; BASE_COUNT] = [
    "length",
    "mass",
    "time",
    "current",
    "temperature",
    "amount_of_substance",
    "luminous_intensity",
];

/// Exponents of the SI base dimensions: length, mass, time, current,
/// temperature, amount of substance, luminous intensity.
///
/// Exponents are rational so that `sqrt(length^2)` stays expressible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dimension {
    exponents: [Rational32; BASE_COUNT],
}

impl Dimension {
    pub const DIMENSIONLESS: Dimension = Dimension::from_integers([0, 0, 0, 0, 0, 0, 0]);

    pub const LENGTH: Dimension = Dimension::from_integers([1, 0, 0, 0, 0, 0, 0]);
    pub const MASS: Dimension = Dimension::from_integers([0, 1, 0, 0, 0, 0, 0]);
    pub const TIME: Dimension = Dimension::from_integers([0, 0, 1, 0, 0, 0, 0]);
    pub const CURRENT: Dimension = Dimension::from_integers([0, 0, 0, 1, 0, 0, 0]);
    pub const TEMPERATURE: Dimension = Dimension::from_integers([0, 0, 0, 0, 1, 0, 0]);
    pub const AMOUNT_OF_SUBSTANCE: Dimension = Dimension::from_integers([0, 0, 0, 0, 0, 1, 0]);
    pub const LUMINOUS_INTENSITY: Dimension = Dimension::from_integers([0, 0, 0, 0, 0, 0, 1]);

    pub const AREA: Dimension = Dimension::from_integers([2, 0, 0, 0, 0, 0, 0]);
    pub const VOLUME: Dimension = Dimension::from_integers([3, 0, 0, 0, 0, 0, 0]);
    pub const VELOCITY: Dimension = Dimension::from_integers([1, 0, -1, 0, 0, 0, 0]);
    pub const ACCELERATION: Dimension = Dimension::from_integers([1, 0, -2, 0, 0, 0, 0]);
    pub const FREQUENCY: Dimension = Dimension::from_integers([0, 0, -1, 0, 0, 0, 0]);
    pub const DENSITY: Dimension = Dimension::from_integers([-3, 1, 0, 0, 0, 0, 0]);
    pub const FORCE: Dimension = Dimension::from_integers([1, 1, -2, 0, 0, 0, 0]);
    pub const ENERGY: Dimension = Dimension::from_integers([2, 1, -2, 0, 0, 0, 0]);
    pub const POWER: Dimension = Dimension::from_integers([2, 1, -3, 0, 0, 0, 0]);
    pub const MOMENT_OF_INERTIA: Dimension = Dimension::from_integers([2, 1, 0, 0, 0, 0, 0]);
    pub const CHARGE: Dimension = Dimension::from_integers([0, 0, 1, 1, 0, 0, 0]);
    pub const VOLTAGE: Dimension = Dimension::from_integers([2, 1, -3, -1, 0, 0, 0]);
    pub const RESISTANCE: Dimension = Dimension::from_integers([2, 1, -3, -2, 0, 0, 0]);

    const fn from_integers(e: [i32; BASE_COUNT]) -> Self {
        Self {
            exponents: [
                Rational32::new_raw(e[0], 1),
                Rational32::new_raw(e[1], 1),
                Rational32::new_raw(e[2], 1),
                Rational32::new_raw(e[3], 1),
                Rational32::new_raw(e[4], 1),
                Rational32::new_raw(e[5], 1),
                Rational32::new_raw(e[6], 1),
            ],
        }
    }

    pub fn exponents(&self) -> &[Rational32; BASE_COUNT] {
        &self.exponents
    }

    pub fn is_dimensionless(&self) -> bool {
        self.exponents.iter().all(|e| *e == Rational32::from_integer(0))
    }

    pub fn pow(self, exponent: Rational32) -> Self {
        let mut exponents = self.exponents;
        for e in exponents.iter_mut() {
            *e *= exponent;
        }
        Self { exponents }
    }

    pub fn powi(self, exponent: i32) -> Self {
        self.pow(Rational32::from_integer(exponent))
    }

    /// `pow` that returns `None` instead of overflowing an exponent.
    pub fn checked_pow(self, exponent: Rational32) -> Option<Self> {
        let mut exponents = self.exponents;
        for e in exponents.iter_mut() {
            *e = e.checked_mul(&exponent)?;
        }
        Some(Self { exponents })
    }

    pub fn checked_mul(self, rhs: Dimension) -> Option<Self> {
        let mut exponents = self.exponents;
        for (e, r) in exponents.iter_mut().zip(rhs.exponents) {
            *e = e.checked_add(&r)?;
        }
        Some(Self { exponents })
    }

    pub fn checked_div(self, rhs: Dimension) -> Option<Self> {
        self.checked_mul(rhs.checked_pow(Rational32::from_integer(-1))?)
    }
}

impl Mul for Dimension {
    type Output = Dimension;
    fn mul(self, rhs: Dimension) -> Dimension {
        let mut exponents = self.exponents;
        for (e, r) in exponents.iter_mut().zip(rhs.exponents) {
            *e += r;
        }
        Dimension { exponents }
    }
}

impl Div for Dimension {
    type Output = Dimension;
    fn div(self, rhs: Dimension) -> Dimension {
        self * rhs.powi(-1)
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_dimensionless() {
            return write!(f, "dimensionless");
        }
        let mut first = true;
        for (name, e) in BASE_NAMES.iter().zip(self.exponents.iter()) {
            if *e.numer() == 0 {
                continue;
            }
            if !first {
                write!(f, "*")?;
            }
            first = false;
            if e.is_integer() {
                match e.to_integer() {
                    1 => write!(f, "{name}")?,
                    n => write!(f, "{name}^{n}")?,
                }
            } else {
                write!(f, "{name}^({e})")?;
            }
        }
        Ok(())
    }
}

/// A named unit: its dimension and the factor converting one of it to SI base units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Unit {
    name: Cow<'static, str>,
    dimension: Dimension,
    scale: f64,
}

macro_rules! unit {
    ($const_name:ident, $name:literal, $dimension:ident, $scale:expr) => {
        pub const $const_name: Unit = Unit {
            name: Cow::Borrowed($name),
            dimension: Dimension::$dimension,
            scale: $scale,
        };
    };
}

impl Unit {
    unit!(ONE, "1", DIMENSIONLESS, 1.0);
    unit!(PERCENT, "percent", DIMENSIONLESS, 0.01);
    unit!(RADIAN, "radian", DIMENSIONLESS, 1.0);

    unit!(METER, "meter", LENGTH, 1.0);
    unit!(KILOMETER, "kilometer", LENGTH, 1000.0);
    unit!(CENTIMETER, "centimeter", LENGTH, 0.01);
    unit!(MILLIMETER, "millimeter", LENGTH, 0.001);

    unit!(KILOGRAM, "kilogram", MASS, 1.0);
    unit!(GRAM, "gram", MASS, 0.001);
    unit!(TONNE, "tonne", MASS, 1000.0);

    unit!(SECOND, "second", TIME, 1.0);
    unit!(MILLISECOND, "millisecond", TIME, 0.001);
    unit!(MINUTE, "minute", TIME, 60.0);
    unit!(HOUR, "hour", TIME, 3600.0);

    unit!(AMPERE, "ampere", CURRENT, 1.0);
    unit!(KELVIN, "kelvin", TEMPERATURE, 1.0);
    unit!(MOLE, "mole", AMOUNT_OF_SUBSTANCE, 1.0);
    unit!(CANDELA, "candela", LUMINOUS_INTENSITY, 1.0);

    unit!(LITER, "liter", VOLUME, 0.001);
    unit!(HERTZ, "hertz", FREQUENCY, 1.0);
    unit!(KILOHERTZ, "kilohertz", FREQUENCY, 1000.0);
    unit!(NEWTON, "newton", FORCE, 1.0);
    unit!(JOULE, "joule", ENERGY, 1.0);
    unit!(WATT, "watt", POWER, 1.0);
    unit!(COULOMB, "coulomb", CHARGE, 1.0);
    unit!(VOLT, "volt", VOLTAGE, 1.0);
    unit!(OHM, "ohm", RESISTANCE, 1.0);

    pub fn new(name: impl Into<String>, dimension: Dimension, scale: f64) -> Self {
        Self {
            name: Cow::Owned(name.into()),
            dimension,
            scale,
        }
    }

    /// A dimensionless pure number, used when unit expressions carry factors (`1000*m`).
    pub fn scalar(value: f64) -> Self {
        Self::new(format!("{value}"), Dimension::DIMENSIONLESS, value)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dimension(&self) -> Dimension {
        self.dimension
    }

    /// Size of one of this unit in SI base units.
    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn powi(&self, exponent: i32) -> Unit {
        Unit::new(
            format!("{}^{}", wrap_compound(&self.name), exponent),
            self.dimension.powi(exponent),
            self.scale.powi(exponent),
        )
    }

    /// Parses unit text such as `km/h`, `kg*m^2` or `m*s^-2`.
    pub fn parse(text: &str) -> Result<Unit> {
        let ast = engine::parse(text)?;
        Unit::from_ast(&ast)
    }

    fn from_ast(ast: &Ast) -> Result<Unit> {
        let overflow = || Error::Parse("unit exponents overflow".to_string());
        match ast {
            Ast::Number(value) => Ok(Unit::scalar(*value)),
            Ast::Identifier(name) => lookup_unit(name),
            Ast::Binary(left, BinaryOp::Mul, right) => {
                let (left, right) = (Unit::from_ast(left)?, Unit::from_ast(right)?);
                left.dimension.checked_mul(right.dimension).ok_or_else(overflow)?;
                Ok(&left * &right)
            }
            Ast::Binary(left, BinaryOp::Div, right) => {
                let (left, right) = (Unit::from_ast(left)?, Unit::from_ast(right)?);
                left.dimension.checked_div(right.dimension).ok_or_else(overflow)?;
                Ok(&left / &right)
            }
            Ast::Binary(left, BinaryOp::Pow, right) => {
                let exponent = right
                    .constant()
                    .filter(|e| e.fract() == 0.0)
                    .ok_or_else(|| Error::Parse("unit exponents must be integers".to_string()))?;
                if exponent.abs() > f64::from(i32::MAX) {
                    return Err(overflow());
                }
                let exponent = exponent as i32;
                let base = Unit::from_ast(left)?;
                base.dimension
                    .checked_pow(Rational32::from_integer(exponent))
                    .ok_or_else(overflow)?;
                Ok(base.powi(exponent))
            }
            Ast::Negate(_) | Ast::Call(..) | Ast::Binary(..) => Err(Error::Parse(
                "unit expressions may only multiply, divide and raise to integer powers"
                    .to_string(),
            )),
        }
    }
}

fn wrap_compound(name: &str) -> Cow<'_, str> {
    if name.contains(['*', '/', '^']) {
        Cow::Owned(format!("({name})"))
    } else {
        Cow::Borrowed(name)
    }
}

impl Mul for &Unit {
    type Output = Unit;
    fn mul(self, rhs: &Unit) -> Unit {
        Unit::new(
            format!("{}*{}", self.name, wrap_compound(&rhs.name)),
            self.dimension * rhs.dimension,
            self.scale * rhs.scale,
        )
    }
}

impl Mul for Unit {
    type Output = Unit;
    fn mul(self, rhs: Unit) -> Unit {
        &self * &rhs
    }
}

impl Div for &Unit {
    type Output = Unit;
    fn div(self, rhs: &Unit) -> Unit {
        Unit::new(
            format!("{}/{}", self.name, wrap_compound(&rhs.name)),
            self.dimension / rhs.dimension,
            self.scale / rhs.scale,
        )
    }
}

impl Div for Unit {
    type Output = Unit;
    fn div(self, rhs: Unit) -> Unit {
        &self / &rhs
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Resolves a unit by its symbol or its full name.
pub fn lookup_unit(name: &str) -> Result<Unit> {
    let unit = match name {
        "1" | "one" => Unit::ONE,
        "percent" | "%" => Unit::PERCENT,
        "rad" | "radian" => Unit::RADIAN,
        "m" | "meter" | "metre" => Unit::METER,
        "km" | "kilometer" => Unit::KILOMETER,
        "cm" | "centimeter" => Unit::CENTIMETER,
        "mm" | "millimeter" => Unit::MILLIMETER,
        "kg" | "kilogram" => Unit::KILOGRAM,
        "g" | "gram" => Unit::GRAM,
        "t" | "tonne" => Unit::TONNE,
        "s" | "second" => Unit::SECOND,
        "ms" | "millisecond" => Unit::MILLISECOND,
        "min" | "minute" => Unit::MINUTE,
        "h" | "hour" => Unit::HOUR,
        "A" | "ampere" => Unit::AMPERE,
        "K" | "kelvin" => Unit::KELVIN,
        "mol" | "mole" => Unit::MOLE,
        "cd" | "candela" => Unit::CANDELA,
        "L" | "l" | "liter" => Unit::LITER,
        "Hz" | "hertz" => Unit::HERTZ,
        "kHz" | "kilohertz" => Unit::KILOHERTZ,
        "N" | "newton" => Unit::NEWTON,
        "J" | "joule" => Unit::JOULE,
        "W" | "watt" => Unit::WATT,
        "C" | "coulomb" => Unit::COULOMB,
        "V" | "volt" => Unit::VOLT,
        "ohm" | "Ω" => Unit::OHM,
        _ => return Err(Error::UnknownUnit(name.to_string())),
    };
    Ok(unit)
}

#[cfg(test)]
mod tests {
    use super::{lookup_unit, Dimension, Unit};
    use crate::error::Error;
    use num_rational::Rational32;

    #[test]
    fn derived_dimensions_compose() {
        assert_eq!(Dimension::LENGTH / Dimension::TIME, Dimension::VELOCITY);
        assert_eq!(
            Dimension::MASS * Dimension::LENGTH.powi(2),
            Dimension::MOMENT_OF_INERTIA
        );
        assert_eq!(Dimension::FORCE * Dimension::LENGTH, Dimension::ENERGY);
        assert_eq!(Dimension::VOLTAGE / Dimension::CURRENT, Dimension::RESISTANCE);
        assert!((Dimension::FREQUENCY * Dimension::TIME).is_dimensionless());
    }

    #[test]
    fn rational_powers_round_trip() {
        let root = Dimension::AREA.pow(Rational32::new(1, 2));
        assert_eq!(root, Dimension::LENGTH);
        let odd = Dimension::LENGTH.pow(Rational32::new(1, 2));
        assert_eq!(odd.powi(2), Dimension::LENGTH);
    }

    #[test]
    fn display_lists_nonzero_exponents() {
        assert_eq!(Dimension::MOMENT_OF_INERTIA.to_string(), "length^2*mass");
        assert_eq!(Dimension::VELOCITY.to_string(), "length*time^-1");
        assert_eq!(Dimension::DIMENSIONLESS.to_string(), "dimensionless");
        assert_eq!(
            Dimension::LENGTH.pow(Rational32::new(1, 2)).to_string(),
            "length^(1/2)"
        );
    }

    #[test]
    fn composite_units_scale_and_name() {
        let kmh = Unit::KILOMETER / Unit::HOUR;
        assert_eq!(kmh.dimension(), Dimension::VELOCITY);
        assert!((kmh.scale() - 1000.0 / 3600.0).abs() < 1e-15);
        assert_eq!(kmh.name(), "kilometer/hour");

        let inertia = Unit::KILOGRAM * Unit::METER.powi(2);
        assert_eq!(inertia.dimension(), Dimension::MOMENT_OF_INERTIA);
        assert_eq!(inertia.name(), "kilogram*meter^2");
    }

    #[test]
    fn parse_unit_text() {
        let kmh = Unit::parse("km/h").expect("km/h should parse");
        assert_eq!(kmh.dimension(), Dimension::VELOCITY);
        assert!((kmh.scale() - 1.0 / 3.6).abs() < 1e-12);

        let accel = Unit::parse("m*s^-2").expect("m*s^-2 should parse");
        assert_eq!(accel.dimension(), Dimension::ACCELERATION);

        let scaled = Unit::parse("1000*m").expect("scaled unit should parse");
        assert_eq!(scaled.dimension(), Dimension::LENGTH);
        assert_eq!(scaled.scale(), 1000.0);
    }

    #[test]
    fn parse_rejects_overflowing_exponents() {
        for text in ["(m^2)^3000000000", "(m^2)^2000000000", "m^2000000000*m^2000000000"] {
            assert_eq!(
                Unit::parse(text),
                Err(Error::Parse("unit exponents overflow".to_string())),
                "{text}"
            );
        }
        assert_eq!(
            Dimension::LENGTH.checked_pow(Rational32::from_integer(3)),
            Some(Dimension::VOLUME)
        );
    }

    #[test]
    fn parse_rejects_unknown_and_additive_units() {
        assert_eq!(
            Unit::parse("furlong"),
            Err(Error::UnknownUnit("furlong".to_string()))
        );
        assert!(matches!(Unit::parse("m + s"), Err(Error::Parse(_))));
        assert!(matches!(Unit::parse("m^0.5"), Err(Error::Parse(_))));
    }

    #[test]
    fn lookup_accepts_symbols_and_names() {
        assert_eq!(lookup_unit("Hz"), Ok(Unit::HERTZ));
        assert_eq!(lookup_unit("hertz"), Ok(Unit::HERTZ));
        assert_eq!(lookup_unit("C").map(|u| u.dimension()), Ok(Dimension::CHARGE));
    }
}
