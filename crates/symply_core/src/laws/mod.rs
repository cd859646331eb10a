//! Physical laws grouped by field.

pub mod dynamics;
pub mod electricity;
pub mod waves;
