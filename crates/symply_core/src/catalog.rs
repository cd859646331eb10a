//! Every law in the crate, addressable by name.

use crate::definitions::{
    density_is_mass_per_volume, moment_of_inertia_is_mass_times_squared_radius,
    speed_is_distance_over_time,
};
use crate::equation::Equation;
use crate::laws::dynamics::acceleration_from_force;
use crate::laws::electricity::current_is_voltage_over_resistance;
use crate::laws::waves::{frequency_from_velocity, wavelength_from_wave_speed_and_frequency};

/// A catalog entry: the law's name and its constructor.
#[derive(Debug, Clone, Copy)]
pub struct LawEntry {
    pub name: &'static str,
    pub build: fn() -> Equation,
}

static LAWS: &[LawEntry] = &[
    LawEntry {
        name: "density_is_mass_per_volume",
        build: density_is_mass_per_volume::definition,
    },
    LawEntry {
        name: "moment_of_inertia_is_mass_times_squared_radius",
        build: moment_of_inertia_is_mass_times_squared_radius::definition,
    },
    LawEntry {
        name: "speed_is_distance_over_time",
        build: speed_is_distance_over_time::definition,
    },
    LawEntry {
        name: "acceleration_from_force",
        build: acceleration_from_force::law,
    },
    LawEntry {
        name: "current_is_voltage_over_resistance",
        build: current_is_voltage_over_resistance::law,
    },
    LawEntry {
        name: "frequency_from_velocity",
        build: frequency_from_velocity::law,
    },
    LawEntry {
        name: "wavelength_from_wave_speed_and_frequency",
        build: wavelength_from_wave_speed_and_frequency::law,
    },
];

pub fn all() -> &'static [LawEntry] {
    LAWS
}

pub fn find(name: &str) -> Option<Equation> {
    LAWS.iter()
        .find(|entry| entry.name == name)
        .map(|entry| (entry.build)())
}
