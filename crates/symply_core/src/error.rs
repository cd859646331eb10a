use crate::units::Dimension;
use thiserror::Error;

/// Errors raised while building, solving or evaluating laws.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// A quantity or sub-expression has the wrong physical dimension.
    #[error("units error in {context}: expected dimension {expected}, found {found}")]
    Units {
        context: String,
        expected: Dimension,
        found: Dimension,
    },
    #[error("unknown unit `{0}`")]
    UnknownUnit(String),
    #[error("parse error: {0}")]
    Parse(String),
    #[error("symbol `{0}` has no value")]
    UnboundSymbol(String),
    #[error("exponent `{0}` of a dimensioned base must be a constant")]
    SymbolicExponent(String),
    #[error("dimension exponents overflow in `{0}`")]
    ExponentOverflow(String),
    #[error("law `{law}` has no solution for `{symbol}`")]
    NoSolution { law: String, symbol: String },
    #[error("`{0}` cannot be isolated symbolically")]
    NotIsolatable(String),
    #[error("Newton solver failed to converge in {steps} steps (‖r(x)‖ = {residual}).")]
    DidNotConverge { steps: usize, residual: f64 },
    #[error("need one equation per unknown, got {equations} equations for {unknowns} unknowns")]
    Underdetermined { equations: usize, unknowns: usize },
    #[error("invalid solve settings: {0}")]
    InvalidSettings(String),
    #[error("Jacobian is singular.")]
    Singular,
    #[error("malformed bytecode: stack underflow")]
    MalformedBytecode,
}

impl Error {
    pub fn units(context: impl Into<String>, expected: Dimension, found: Dimension) -> Self {
        Error::Units {
            context: context.into(),
            expected,
            found,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
