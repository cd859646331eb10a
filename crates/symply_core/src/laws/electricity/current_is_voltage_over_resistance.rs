//! Ohm's law for a conductor: `I = U / R`.

use crate::equation::Equation;
use crate::error::Result;
use crate::expr::Expr;
use crate::quantity::Quantity;
use crate::symbols::Symbol;
use crate::units::Dimension;

pub fn current() -> Symbol {
    Symbol::new("I", Dimension::CURRENT)
}

pub fn voltage() -> Symbol {
    Symbol::new("U", Dimension::VOLTAGE)
}

pub fn resistance() -> Symbol {
    Symbol::new("R", Dimension::RESISTANCE)
}

pub fn law() -> Equation {
    Equation::new(
        "current_is_voltage_over_resistance",
        current(),
        Expr::from(voltage()) / Expr::from(resistance()),
    )
}

pub fn calculate_current(voltage_: &Quantity, resistance_: &Quantity) -> Result<Quantity> {
    law().evaluate(&current(), &[(&voltage(), voltage_), (&resistance(), resistance_)])
}

#[cfg(test)]
mod tests {
    use super::{calculate_current, current, law, resistance, voltage};
    use crate::quantity::Quantity;
    use crate::units::{Dimension, Unit};
    use approx::assert_relative_eq;

    #[test]
    fn current_through_resistor() {
        let u = Quantity::of("U", 12.0, &Unit::VOLT);
        let r = Quantity::of("R", 4.0, &Unit::OHM);
        let i = calculate_current(&u, &r).expect("current");
        assert_eq!(i.dimension(), Dimension::CURRENT);
        assert_relative_eq!(i.value(), 3.0);
    }

    #[test]
    fn resistance_from_voltage_and_current() {
        let u = Quantity::of("U", 230.0, &Unit::VOLT);
        let i = Quantity::of("I", 2.0, &Unit::AMPERE);
        let r = law()
            .evaluate(&resistance(), &[(&voltage(), &u), (&current(), &i)])
            .expect("resistance");
        assert_eq!(r.dimension(), Dimension::RESISTANCE);
        assert_relative_eq!(r.value(), 115.0, max_relative = 1e-12);
    }
}
