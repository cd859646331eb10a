use approx::assert_relative_eq;
use symply_core::definitions::moment_of_inertia_is_mass_times_squared_radius as inertia;
use symply_core::laws::waves::frequency_from_velocity as doppler;
use symply_core::{
    catalog, convert_to, expr_to_quantity, solve, Dimension, Equation, Error, Expr, Quantity,
    SolveSettings, Symbol, Unit,
};

fn velocity(name: &str, value: f64) -> Quantity {
    Quantity::new(name, Dimension::VELOCITY)
        .with_scale_factor(value, &(Unit::METER / Unit::SECOND))
        .expect("velocity")
}

fn frequency(name: &str, hertz: f64) -> Quantity {
    Quantity::new(name, Dimension::FREQUENCY)
        .with_scale_factor(hertz, &Unit::HERTZ)
        .expect("frequency")
}

#[test]
fn moment_of_inertia_of_spinning_particle() {
    let m = Quantity::of("m", 5.0, &Unit::KILOGRAM);
    let r = Quantity::of("R", 3.0, &Unit::METER);
    let result = inertia::calculate_moment_of_inertia(&m, &r).expect("moment of inertia");
    assert_eq!(result.dimension(), Dimension::MASS * Dimension::LENGTH.powi(2));
    let value = convert_to(&result, &inertia::definition_units_si()).expect("kg*m^2");
    assert_relative_eq!(value, 45.0, max_relative = 0.01);
}

#[test]
fn charge_is_not_mass_or_radius() {
    let q = Quantity::of("q", 1.0, &Unit::COULOMB);
    let m = Quantity::of("m", 5.0, &Unit::KILOGRAM);
    let r = Quantity::of("R", 3.0, &Unit::METER);
    assert!(matches!(
        inertia::calculate_moment_of_inertia(&q, &r),
        Err(Error::Units { .. })
    ));
    assert!(matches!(
        inertia::calculate_moment_of_inertia(&m, &q),
        Err(Error::Units { .. })
    ));
}

#[test]
fn radius_from_moment_of_inertia_takes_principal_root() {
    let i = Quantity::of("I", 45.0, &inertia::definition_units_si());
    let m = Quantity::of("m", 5.0, &Unit::KILOGRAM);
    let r = inertia::definition()
        .evaluate(
            &inertia::radius(),
            &[(&inertia::moment_of_inertia(), &i), (&inertia::mass(), &m)],
        )
        .expect("radius");
    assert_eq!(r.dimension(), Dimension::LENGTH);
    assert_relative_eq!(r.value(), 3.0, max_relative = 1e-12);
}

#[test]
fn doppler_radar_detects_approaching_object() {
    let solution = solve(&doppler::law(), &doppler::source_velocity())
        .expect("isolate source velocity")
        .remove(0);
    let applied = solution.subs([
        (&doppler::observed_frequency(), Expr::from(frequency("signal", 41200.0))),
        (&doppler::real_frequency(), Expr::from(frequency("emitter", 40000.0))),
        (&doppler::wave_velocity(), Expr::from(velocity("sound", 340.0))),
        (&doppler::observer_velocity(), Expr::from(velocity("radar", 0.0))),
    ]);
    let result = expr_to_quantity(&applied, "result_velocity").expect("velocity");
    let kmh = convert_to(&result, &(Unit::KILOMETER / Unit::HOUR)).expect("km/h");
    assert_relative_eq!(kmh, -35.650_485, max_relative = 1e-6);
}

#[test]
fn doppler_numeric_and_symbolic_agree() {
    let law = doppler::law();
    let f_o = frequency("signal", 41200.0);
    let f_s = frequency("emitter", 40000.0);
    let c = velocity("sound", 340.0);
    let v_o = velocity("radar", 0.0);
    let bindings = [
        (&doppler::observed_frequency(), &f_o),
        (&doppler::real_frequency(), &f_s),
        (&doppler::wave_velocity(), &c),
        (&doppler::observer_velocity(), &v_o),
    ];
    let symbolic = law
        .evaluate(&doppler::source_velocity(), &bindings)
        .expect("symbolic");
    let numeric = law
        .solve_numeric(&doppler::source_velocity(), &bindings, &SolveSettings::default())
        .expect("numeric");
    assert_relative_eq!(symbolic.value(), numeric.value(), max_relative = 1e-9);
}

#[test]
fn every_catalog_law_round_trips_through_its_symbols() {
    for entry in catalog::all() {
        let law = (entry.build)();
        let symbols = law.symbols();
        let (target, inputs) = symbols.split_first().expect("law has symbols");
        let quantities: Vec<Quantity> = inputs
            .iter()
            .map(|s| Quantity::from_si(s.name(), s.dimension(), 2.0))
            .collect();
        let bindings: Vec<(&Symbol, &Quantity)> = inputs.iter().zip(quantities.iter()).collect();
        let result = law.evaluate(target, &bindings).expect(entry.name);
        assert_eq!(result.dimension(), target.dimension(), "{}", entry.name);
        assert!(result.value().is_finite(), "{}", entry.name);
    }
}

#[test]
fn parsed_law_matches_builder() {
    let v = Symbol::new("v", Dimension::VELOCITY);
    let s = Symbol::new("s", Dimension::LENGTH);
    let t = Symbol::new("t", Dimension::TIME);
    let rhs = Expr::parse("s / t", &[s.clone(), t.clone()]).expect("parse");
    let law = Equation::new("speed", &v, rhs);
    assert_eq!(law.check_dimensions(), Ok(Dimension::VELOCITY));

    let bad = Equation::new(
        "broken",
        &v,
        Expr::parse("s * t", &[s, t]).expect("parse"),
    );
    assert!(matches!(bad.check_dimensions(), Err(Error::Units { .. })));
}
