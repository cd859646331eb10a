//! Density of a homogeneous body: `rho = m / V`.

use crate::equation::Equation;
use crate::error::Result;
use crate::expr::Expr;
use crate::quantity::Quantity;
use crate::symbols::Symbol;
use crate::units::Dimension;

pub fn density() -> Symbol {
    Symbol::new("rho", Dimension::DENSITY)
}

pub fn mass() -> Symbol {
    Symbol::new("m", Dimension::MASS)
}

pub fn volume() -> Symbol {
    Symbol::new("V", Dimension::VOLUME)
}

pub fn definition() -> Equation {
    Equation::new(
        "density_is_mass_per_volume",
        density(),
        Expr::from(mass()) / Expr::from(volume()),
    )
}

pub fn calculate_density(mass_: &Quantity, volume_: &Quantity) -> Result<Quantity> {
    definition().evaluate(&density(), &[(&mass(), mass_), (&volume(), volume_)])
}

#[cfg(test)]
mod tests {
    use super::calculate_density;
    use crate::quantity::{convert_to, Quantity};
    use crate::units::{Dimension, Unit};
    use approx::assert_relative_eq;

    #[test]
    fn density_of_water() {
        let m = Quantity::of("m", 2.0, &Unit::KILOGRAM);
        let v = Quantity::of("V", 2.0, &Unit::LITER);
        let rho = calculate_density(&m, &v).expect("density");
        assert_eq!(rho.dimension(), Dimension::DENSITY);
        let grams_per_cm3 = convert_to(&rho, &(Unit::GRAM / Unit::CENTIMETER.powi(3)))
            .expect("g/cm^3");
        assert_relative_eq!(grams_per_cm3, 1.0, max_relative = 1e-12);
    }

    #[test]
    fn rejects_area_as_volume() {
        let m = Quantity::of("m", 2.0, &Unit::KILOGRAM);
        let a = Quantity::of("A", 2.0, &Unit::METER.powi(2));
        assert!(calculate_density(&m, &a).is_err());
    }
}
