//! Average speed: `v = s / t`.

use crate::equation::Equation;
use crate::error::Result;
use crate::expr::Expr;
use crate::quantity::Quantity;
use crate::symbols::Symbol;
use crate::units::Dimension;

pub fn speed() -> Symbol {
    Symbol::new("v", Dimension::VELOCITY)
}

pub fn distance() -> Symbol {
    Symbol::new("s", Dimension::LENGTH)
}

pub fn time() -> Symbol {
    Symbol::new("t", Dimension::TIME)
}

pub fn definition() -> Equation {
    Equation::new(
        "speed_is_distance_over_time",
        speed(),
        Expr::from(distance()) / Expr::from(time()),
    )
}

pub fn calculate_speed(distance_: &Quantity, time_: &Quantity) -> Result<Quantity> {
    definition().evaluate(&speed(), &[(&distance(), distance_), (&time(), time_)])
}

#[cfg(test)]
mod tests {
    use super::{calculate_speed, definition, distance, speed, time};
    use crate::error::Error;
    use crate::quantity::{convert_to, Quantity};
    use crate::units::Unit;
    use approx::assert_relative_eq;

    #[test]
    fn speed_of_runner() {
        let d = Quantity::of("d", 10.0, &Unit::KILOMETER);
        let t = Quantity::of("t", 50.0, &Unit::MINUTE);
        let v = calculate_speed(&d, &t).expect("speed");
        let kmh = convert_to(&v, &(Unit::KILOMETER / Unit::HOUR)).expect("km/h");
        assert_relative_eq!(kmh, 12.0, max_relative = 1e-12);
    }

    #[test]
    fn time_from_speed_and_distance() {
        let d = Quantity::of("d", 100.0, &Unit::METER);
        let v = Quantity::of("v", 4.0, &(Unit::METER / Unit::SECOND));
        let t = definition()
            .evaluate(&time(), &[(&distance(), &d), (&speed(), &v)])
            .expect("time");
        assert_relative_eq!(t.value(), 25.0, max_relative = 1e-12);
    }

    #[test]
    fn rejects_swapped_arguments() {
        let d = Quantity::of("d", 10.0, &Unit::METER);
        let t = Quantity::of("t", 2.0, &Unit::SECOND);
        assert!(matches!(calculate_speed(&t, &d), Err(Error::Units { .. })));
    }
}
