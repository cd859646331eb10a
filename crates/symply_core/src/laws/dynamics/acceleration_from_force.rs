//! Newton's second law: `a = F / m`.

use crate::equation::Equation;
use crate::error::Result;
use crate::expr::Expr;
use crate::quantity::Quantity;
use crate::symbols::Symbol;
use crate::units::Dimension;

pub fn acceleration() -> Symbol {
    Symbol::new("a", Dimension::ACCELERATION)
}

pub fn force() -> Symbol {
    Symbol::new("F", Dimension::FORCE)
}

pub fn mass() -> Symbol {
    Symbol::new("m", Dimension::MASS)
}

pub fn law() -> Equation {
    Equation::new(
        "acceleration_from_force",
        acceleration(),
        Expr::from(force()) / Expr::from(mass()),
    )
}

pub fn calculate_acceleration(force_: &Quantity, mass_: &Quantity) -> Result<Quantity> {
    law().evaluate(&acceleration(), &[(&force(), force_), (&mass(), mass_)])
}
