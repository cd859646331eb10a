pub mod current_is_voltage_over_resistance;
