//! A particle of 5 kg spins around an axle 3 m away.
//!
//! Run with `cargo run --example moment_of_inertia`.

use anyhow::Result;
use symply_core::definitions::moment_of_inertia_is_mass_times_squared_radius as inertia;
use symply_core::{convert_to, Dimension, Quantity, Unit};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mass = Quantity::new("m", Dimension::MASS).with_scale_factor(5.0, &Unit::KILOGRAM)?;
    let radius = Quantity::new("R", Dimension::LENGTH).with_scale_factor(3.0, &Unit::METER)?;

    let result = inertia::calculate_moment_of_inertia(&mass, &radius)?;
    let units = inertia::definition_units_si();
    println!(
        "Moment of inertia of the particle is {:.2} {}",
        convert_to(&result, &units)?,
        units
    );
    Ok(())
}
