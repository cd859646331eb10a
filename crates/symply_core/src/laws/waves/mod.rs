pub mod frequency_from_velocity;
pub mod wavelength_from_wave_speed_and_frequency;
