//! Wavelength of a periodic wave: `lambda = c / f`.

use crate::equation::Equation;
use crate::error::Result;
use crate::expr::Expr;
use crate::quantity::Quantity;
use crate::symbols::Symbol;
use crate::units::Dimension;

pub fn wavelength() -> Symbol {
    Symbol::new("lambda", Dimension::LENGTH)
}

pub fn wave_speed() -> Symbol {
    Symbol::new("c", Dimension::VELOCITY)
}

pub fn frequency() -> Symbol {
    Symbol::new("f", Dimension::FREQUENCY)
}

pub fn law() -> Equation {
    Equation::new(
        "wavelength_from_wave_speed_and_frequency",
        wavelength(),
        Expr::from(wave_speed()) / Expr::from(frequency()),
    )
}

pub fn calculate_wavelength(wave_speed_: &Quantity, frequency_: &Quantity) -> Result<Quantity> {
    law().evaluate(
        &wavelength(),
        &[(&wave_speed(), wave_speed_), (&frequency(), frequency_)],
    )
}
