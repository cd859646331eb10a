//! Dimensioned values.

use crate::error::{Error, Result};
use crate::units::{Dimension, Unit};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Div, Mul};

/// A named value tagged with a physical dimension.
///
/// The value is stored in SI base units (the "scale factor"); [`convert_to`]
/// expresses it in any unit of the same dimension.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quantity {
    name: String,
    dimension: Dimension,
    value: f64,
}

impl Quantity {
    /// Declares a quantity of `dimension` with a zero value.
    pub fn new(name: impl Into<String>, dimension: Dimension) -> Self {
        Self {
            name: name.into(),
            dimension,
            value: 0.0,
        }
    }

    /// A quantity whose dimension is taken from `unit`: `Quantity::of("m", 5.0, &Unit::KILOGRAM)`.
    pub fn of(name: impl Into<String>, value: f64, unit: &Unit) -> Self {
        Self {
            name: name.into(),
            dimension: unit.dimension(),
            value: value * unit.scale(),
        }
    }

    /// A quantity from a value already expressed in SI base units.
    pub fn from_si(name: impl Into<String>, dimension: Dimension, value: f64) -> Self {
        Self {
            name: name.into(),
            dimension,
            value,
        }
    }

    pub fn dimensionless(name: impl Into<String>, value: f64) -> Self {
        Self {
            name: name.into(),
            dimension: Dimension::DIMENSIONLESS,
            value,
        }
    }

    /// Assigns `value` measured in `unit`; the unit must match the declared dimension.
    pub fn with_scale_factor(mut self, value: f64, unit: &Unit) -> Result<Self> {
        if unit.dimension() != self.dimension {
            return Err(Error::units(
                format!("scale factor of `{}`", self.name),
                self.dimension,
                unit.dimension(),
            ));
        }
        self.value = value * unit.scale();
        Ok(self)
    }

    /// Assigns a bare SI number. Only dimensionless quantities take arbitrary
    /// numbers; zero is accepted for every dimension.
    pub fn with_value(mut self, value: f64) -> Result<Self> {
        if value != 0.0 && !self.dimension.is_dimensionless() {
            return Err(Error::units(
                format!("scale factor of `{}`", self.name),
                self.dimension,
                Dimension::DIMENSIONLESS,
            ));
        }
        self.value = value;
        Ok(self)
    }

    pub fn renamed(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dimension(&self) -> Dimension {
        self.dimension
    }

    /// Value in SI base units.
    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn is_equivalent_dimension(&self, dimension: &Dimension) -> bool {
        self.dimension == *dimension
    }

    /// Fails with a units error naming `context` unless the dimension matches.
    pub fn expect_dimension(&self, expected: Dimension, context: &str) -> Result<()> {
        if self.is_equivalent_dimension(&expected) {
            Ok(())
        } else {
            Err(Error::units(context, expected, self.dimension))
        }
    }

    pub fn try_add(&self, other: &Quantity) -> Result<Quantity> {
        other.expect_dimension(self.dimension, &format!("{} + {}", self.name, other.name))?;
        Ok(Quantity {
            name: format!("{} + {}", self.name, other.name),
            dimension: self.dimension,
            value: self.value + other.value,
        })
    }

    pub fn try_sub(&self, other: &Quantity) -> Result<Quantity> {
        other.expect_dimension(self.dimension, &format!("{} - {}", self.name, other.name))?;
        Ok(Quantity {
            name: format!("{} - {}", self.name, other.name),
            dimension: self.dimension,
            value: self.value - other.value,
        })
    }
}

impl Mul for &Quantity {
    type Output = Quantity;
    fn mul(self, rhs: &Quantity) -> Quantity {
        Quantity {
            name: format!("{}*{}", self.name, rhs.name),
            dimension: self.dimension * rhs.dimension,
            value: self.value * rhs.value,
        }
    }
}

impl Div for &Quantity {
    type Output = Quantity;
    fn div(self, rhs: &Quantity) -> Quantity {
        Quantity {
            name: format!("{}/{}", self.name, rhs.name),
            dimension: self.dimension / rhs.dimension,
            value: self.value / rhs.value,
        }
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {} ({})", self.name, self.value, self.dimension)
    }
}

/// Expresses `quantity` in `unit`.
pub fn convert_to(quantity: &Quantity, unit: &Unit) -> Result<f64> {
    quantity.expect_dimension(
        unit.dimension(),
        &format!("conversion of `{}` to {}", quantity.name, unit),
    )?;
    Ok(quantity.value / unit.scale())
}

/// Formats `value` rounded to `digits` significant figures (`35.650485` at 3 is `35.7`).
pub fn format_significant(value: f64, digits: u32) -> String {
    if value == 0.0 || !value.is_finite() {
        return format!("{value}");
    }
    let magnitude = value.abs().log10().floor() as i32;
    let decimals = (digits as i32 - 1 - magnitude).max(0) as usize;
    let factor = 10f64.powi(magnitude + 1 - digits as i32);
    format!("{:.*}", decimals, (value / factor).round() * factor)
}

#[cfg(test)]
mod tests {
    use super::{convert_to, format_significant, Quantity};
    use crate::error::Error;
    use crate::units::{Dimension, Unit};
    use approx::assert_relative_eq;

    #[test]
    fn formats_significant_figures() {
        assert_eq!(format_significant(35.650485, 3), "35.7");
        assert_eq!(format_significant(-35.650485, 3), "-35.7");
        assert_eq!(format_significant(45.0, 3), "45.0");
        assert_eq!(format_significant(0.00123456, 2), "0.0012");
        assert_eq!(format_significant(123456.0, 3), "123000");
        assert_eq!(format_significant(0.0, 3), "0");
    }

    #[test]
    fn scale_factor_is_stored_in_si() {
        let v = Quantity::new("v", Dimension::VELOCITY)
            .with_scale_factor(36.0, &(Unit::KILOMETER / Unit::HOUR))
            .expect("velocity");
        assert_relative_eq!(v.value(), 10.0, max_relative = 1e-12);
    }

    #[test]
    fn scale_factor_rejects_wrong_unit() {
        let result = Quantity::new("m", Dimension::MASS).with_scale_factor(1.0, &Unit::COULOMB);
        match result {
            Err(Error::Units { expected, found, .. }) => {
                assert_eq!(expected, Dimension::MASS);
                assert_eq!(found, Dimension::CHARGE);
            }
            other => panic!("expected a units error, got {other:?}"),
        }
    }

    #[test]
    fn bare_values_only_for_zero_or_dimensionless() {
        assert!(Quantity::new("v0", Dimension::VELOCITY).with_value(0.0).is_ok());
        assert!(Quantity::new("v", Dimension::VELOCITY).with_value(3.0).is_err());
        let ratio = Quantity::new("k", Dimension::DIMENSIONLESS)
            .with_value(0.5)
            .expect("dimensionless");
        assert_eq!(ratio.value(), 0.5);
    }

    #[test]
    fn convert_to_target_unit() {
        let d = Quantity::of("d", 2.5, &Unit::KILOMETER);
        assert_relative_eq!(convert_to(&d, &Unit::METER).expect("meters"), 2500.0);
        assert!(matches!(
            convert_to(&d, &Unit::SECOND),
            Err(Error::Units { .. })
        ));
    }

    #[test]
    fn arithmetic_tracks_dimensions() {
        let d = Quantity::of("d", 100.0, &Unit::METER);
        let t = Quantity::of("t", 20.0, &Unit::SECOND);
        let v = &d / &t;
        assert_eq!(v.dimension(), Dimension::VELOCITY);
        assert_eq!(v.value(), 5.0);

        let sum = d.try_add(&Quantity::of("e", 1.0, &Unit::KILOMETER)).expect("sum");
        assert_eq!(sum.value(), 1100.0);
        assert!(d.try_sub(&t).is_err());
    }
}
