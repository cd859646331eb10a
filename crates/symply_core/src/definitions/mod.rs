//! Definitions: laws that introduce a quantity in terms of others.

pub mod density_is_mass_per_volume;
pub mod moment_of_inertia_is_mass_times_squared_radius;
pub mod speed_is_distance_over_time;
