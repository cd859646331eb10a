pub mod acceleration_from_force;
