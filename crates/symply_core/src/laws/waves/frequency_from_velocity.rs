//! Doppler effect for a source and an observer moving along the line joining them.
//!
//! `f_o = f_s * (c - v_o) / (c + v_s)`
//!
//! where `f_s` is the frequency the source emits, `f_o` the frequency the
//! observer measures and `c` the speed of the wave in the medium. Both
//! velocities are measured relative to the medium and are positive when the
//! body moves away from the other one, negative when it approaches.
//!
//! Valid for speeds below the wave speed.

use crate::equation::Equation;
use crate::error::Result;
use crate::expr::Expr;
use crate::quantity::Quantity;
use crate::symbols::Symbol;
use crate::units::Dimension;

pub fn observed_frequency() -> Symbol {
    Symbol::new("f_o", Dimension::FREQUENCY)
}

pub fn real_frequency() -> Symbol {
    Symbol::new("f_s", Dimension::FREQUENCY)
}

pub fn wave_velocity() -> Symbol {
    Symbol::new("c", Dimension::VELOCITY)
}

pub fn source_velocity() -> Symbol {
    Symbol::new("v_s", Dimension::VELOCITY)
}

pub fn observer_velocity() -> Symbol {
    Symbol::new("v_o", Dimension::VELOCITY)
}

pub fn law() -> Equation {
    let c = Expr::from(wave_velocity());
    Equation::new(
        "frequency_from_velocity",
        observed_frequency(),
        Expr::from(real_frequency()) * (c.clone() - Expr::from(observer_velocity()))
            / (c + Expr::from(source_velocity())),
    )
}

pub fn calculate_observed_frequency(
    real_frequency_: &Quantity,
    wave_velocity_: &Quantity,
    source_velocity_: &Quantity,
    observer_velocity_: &Quantity,
) -> Result<Quantity> {
    law().evaluate(
        &observed_frequency(),
        &[
            (&real_frequency(), real_frequency_),
            (&wave_velocity(), wave_velocity_),
            (&source_velocity(), source_velocity_),
            (&observer_velocity(), observer_velocity_),
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::{
        calculate_observed_frequency, law, observed_frequency, observer_velocity,
        real_frequency, source_velocity, wave_velocity,
    };
    use crate::equation::{expr_to_quantity, solve};
    use crate::error::Error;
    use crate::expr::Expr;
    use crate::quantity::{convert_to, Quantity};
    use crate::units::{Dimension, Unit};
    use approx::assert_relative_eq;

    fn mps(name: &str, value: f64) -> Quantity {
        Quantity::of(name, value, &(Unit::METER / Unit::SECOND))
    }

    #[test]
    fn approaching_source_raises_frequency() {
        let f = calculate_observed_frequency(
            &Quantity::of("f", 440.0, &Unit::HERTZ),
            &mps("c", 340.0),
            &mps("v_s", -20.0),
            &mps("v_o", 0.0),
        )
        .expect("observed frequency");
        assert_relative_eq!(f.value(), 440.0 * 340.0 / 320.0, max_relative = 1e-12);
    }

    #[test]
    fn receding_observer_lowers_frequency() {
        let f = calculate_observed_frequency(
            &Quantity::of("f", 1.0, &Unit::KILOHERTZ),
            &mps("c", 340.0),
            &mps("v_s", 0.0),
            &mps("v_o", 34.0),
        )
        .expect("observed frequency");
        assert_relative_eq!(f.value(), 900.0, max_relative = 1e-12);
    }

    #[test]
    fn solve_for_source_velocity() {
        let solutions = solve(&law(), &source_velocity()).expect("isolate v_s");
        let applied = solutions[0].subs([
            (&observed_frequency(), Expr::from(Quantity::of("f_o", 41.2, &Unit::KILOHERTZ))),
            (&real_frequency(), Expr::from(Quantity::of("f_s", 40.0, &Unit::KILOHERTZ))),
            (&wave_velocity(), Expr::from(mps("c", 340.0))),
            (&observer_velocity(), Expr::from(mps("v_o", 0.0))),
        ]);
        let velocity = expr_to_quantity(&applied, "v").expect("velocity");
        assert_eq!(velocity.dimension(), Dimension::VELOCITY);
        let kmh = convert_to(&velocity, &(Unit::KILOMETER / Unit::HOUR)).expect("km/h");
        assert_relative_eq!(kmh, (40.0 * 340.0 / 41.2 - 340.0) * 3.6, max_relative = 1e-9);
        assert!(kmh < 0.0);
    }

    #[test]
    fn rejects_frequency_as_velocity() {
        let f = Quantity::of("f", 1.0, &Unit::HERTZ);
        let result = calculate_observed_frequency(&f, &f, &mps("v_s", 0.0), &mps("v_o", 0.0));
        assert!(matches!(result, Err(Error::Units { .. })));
    }
}
