//! Moment of inertia of a point mass about an axis: `I = m * R^2`.
//!
//! `R` is the distance from the particle to the axis of rotation.
//!
//! A raw number is not a quantity and does not compile:
//!
//! ```compile_fail
//! use symply_core::definitions::moment_of_inertia_is_mass_times_squared_radius as inertia;
//! use symply_core::{Quantity, Unit};
//!
//! let radius = Quantity::of("R", 3.0, &Unit::METER);
//! inertia::calculate_moment_of_inertia(100.0, &radius);
//! ```

use crate::equation::Equation;
use crate::error::Result;
use crate::expr::Expr;
use crate::quantity::Quantity;
use crate::symbols::Symbol;
use crate::units::{Dimension, Unit};

pub fn moment_of_inertia() -> Symbol {
    Symbol::new("I", Dimension::MOMENT_OF_INERTIA)
}

pub fn mass() -> Symbol {
    Symbol::new("m", Dimension::MASS)
}

pub fn radius() -> Symbol {
    Symbol::new("R", Dimension::LENGTH)
}

pub fn definition() -> Equation {
    Equation::new(
        "moment_of_inertia_is_mass_times_squared_radius",
        moment_of_inertia(),
        Expr::from(mass()) * Expr::from(radius()).powi(2),
    )
}

/// SI unit the defined quantity is expressed in: kg*m^2.
pub fn definition_units_si() -> Unit {
    Unit::KILOGRAM * Unit::METER.powi(2)
}

pub fn calculate_moment_of_inertia(mass_: &Quantity, radius_: &Quantity) -> Result<Quantity> {
    definition().evaluate(
        &moment_of_inertia(),
        &[(&mass(), mass_), (&radius(), radius_)],
    )
}

#[cfg(test)]
mod tests {
    use super::{calculate_moment_of_inertia, definition, definition_units_si};
    use crate::error::Error;
    use crate::quantity::{convert_to, Quantity};
    use crate::units::{Dimension, Unit};
    use approx::assert_relative_eq;

    fn test_args() -> (Quantity, Quantity) {
        let m = Quantity::new("m", Dimension::MASS)
            .with_scale_factor(5.0, &Unit::KILOGRAM)
            .expect("mass");
        let r = Quantity::new("R", Dimension::LENGTH)
            .with_scale_factor(3.0, &Unit::METER)
            .expect("radius");
        (m, r)
    }

    fn charge() -> Quantity {
        Quantity::new("q", Dimension::CHARGE)
            .with_scale_factor(1.0, &Unit::COULOMB)
            .expect("charge")
    }

    #[test]
    fn basic_moment_of_inertia() {
        let (m, r) = test_args();
        let result = calculate_moment_of_inertia(&m, &r).expect("moment of inertia");
        assert!(result.is_equivalent_dimension(&(Dimension::MASS * Dimension::LENGTH.powi(2))));
        let value = convert_to(&result, &definition_units_si()).expect("kg*m^2");
        assert_relative_eq!(value, 45.0, max_relative = 0.01);
    }

    #[test]
    fn inertia_with_bad_mass() {
        let (_, r) = test_args();
        let result = calculate_moment_of_inertia(&charge(), &r);
        assert!(matches!(result, Err(Error::Units { .. })));
    }

    #[test]
    fn inertia_with_bad_radius() {
        let (m, _) = test_args();
        let result = calculate_moment_of_inertia(&m, &charge());
        assert!(matches!(result, Err(Error::Units { .. })));
    }

    #[test]
    fn definition_is_dimensionally_consistent() {
        assert_eq!(
            definition().check_dimensions(),
            Ok(Dimension::MOMENT_OF_INERTIA)
        );
    }
}
