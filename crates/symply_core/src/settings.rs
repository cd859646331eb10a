use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Newton iteration settings for numeric solving.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolveSettings {
    pub max_steps: usize,
    pub damping: f64,
    /// Relative tolerance on each residual, scaled by the larger side of its equation.
    pub tolerance: f64,
    /// Absolute floor on each residual, in SI units. Lets `f(x) = 0` converge.
    pub absolute_tolerance: f64,
    /// Starting value (SI units) for every unknown.
    pub initial_guess: f64,
}

impl Default for SolveSettings {
    fn default() -> Self {
        Self {
            max_steps: 25,
            damping: 1.0,
            tolerance: 1e-12,
            absolute_tolerance: 1e-12,
            initial_guess: 1.0,
        }
    }
}

impl SolveSettings {
    pub fn validate(&self) -> Result<()> {
        if self.max_steps == 0 {
            return Err(Error::InvalidSettings(
                "max_steps must be greater than zero.".to_string(),
            ));
        }
        if !(self.damping > 0.0 && self.damping <= 1.0) {
            return Err(Error::InvalidSettings(
                "damping must be in (0, 1].".to_string(),
            ));
        }
        if !(self.tolerance > 0.0) {
            return Err(Error::InvalidSettings(
                "tolerance must be positive.".to_string(),
            ));
        }
        if !(self.absolute_tolerance >= 0.0) {
            return Err(Error::InvalidSettings(
                "absolute_tolerance must be non-negative.".to_string(),
            ));
        }
        if !self.initial_guess.is_finite() {
            return Err(Error::InvalidSettings(
                "initial_guess must be finite.".to_string(),
            ));
        }
        Ok(())
    }
}
