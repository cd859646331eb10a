//! Doppler radar.
//!
//! A radar emits a wave of known frequency and receives the wave reflected by
//! a moving object, shifted by the Doppler effect. Radars may use ultrasound,
//! radio or infrared waves. Here an ultrasonic radar at rest in air emits
//! 40 kHz and receives the echo at 41.2 kHz; solving the Doppler law for the
//! source velocity gives the object's speed.
//!
//! Run with `cargo run --example irrelative_doppler`.

use anyhow::{Context, Result};
use symply_core::laws::waves::frequency_from_velocity as doppler_law;
use symply_core::{
    convert_to, expr_to_quantity, format_significant, solve, Dimension, Expr, Quantity, Unit,
};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let sound_velocity = Quantity::new("sound_velocity", Dimension::VELOCITY)
        .with_scale_factor(340.0, &(Unit::METER / Unit::SECOND))?;
    // The radar is at rest relative to the air.
    let zero_velocity = Quantity::new("zero_velocity", Dimension::VELOCITY).with_value(0.0)?;
    let emitter_frequency = Quantity::new("emitter_frequency", Dimension::FREQUENCY)
        .with_scale_factor(40000.0, &Unit::HERTZ)?;
    let signal_frequency = Quantity::new("signal_frequency", Dimension::FREQUENCY)
        .with_scale_factor(41200.0, &Unit::HERTZ)?;

    let solution = solve(&doppler_law::law(), &doppler_law::source_velocity())?
        .into_iter()
        .next()
        .context("Doppler law has no solution for the source velocity")?;

    let applied_solution = solution.subs([
        (&doppler_law::observed_frequency(), Expr::from(&signal_frequency)),
        (&doppler_law::real_frequency(), Expr::from(&emitter_frequency)),
        (&doppler_law::wave_velocity(), Expr::from(&sound_velocity)),
        (&doppler_law::observer_velocity(), Expr::from(&zero_velocity)),
    ]);

    let result_velocity = expr_to_quantity(&applied_solution, "result_velocity")?;
    let result = convert_to(&result_velocity, &(Unit::KILOMETER / Unit::HOUR))?;

    if result < 0.0 {
        println!(
            "Object is moving towards radar with {} km/h velocity",
            format_significant(-result, 3)
        );
    } else if result == 0.0 {
        println!("Object is not moving");
    } else {
        println!(
            "Object is moving away from radar with {} km/h velocity",
            format_significant(result, 3)
        );
    }
    Ok(())
}
