use crate::units::Dimension;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A named placeholder for a physical quantity in a law.
///
/// Two symbols are the same symbol when both name and dimension match.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Symbol {
    name: String,
    dimension: Dimension,
}

impl Symbol {
    pub fn new(name: impl Into<String>, dimension: Dimension) -> Self {
        Self {
            name: name.into(),
            dimension,
        }
    }

    pub fn dimensionless(name: impl Into<String>) -> Self {
        Self::new(name, Dimension::DIMENSIONLESS)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dimension(&self) -> Dimension {
        self.dimension
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
