use num_traits::{One, Zero};
use std::fmt::Debug;
use std::ops::{Add, Div, Mul, Neg, Sub};

/// A trait for types the bytecode VM can evaluate expressions over.
/// Implemented for `f64` and for the forward-mode `Dual` number, which lets the
/// same compiled residual produce values and derivatives.
pub trait Scalar:
    Copy
    + Debug
    + Zero
    + One
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
    + Neg<Output = Self>
    + 'static
{
    /// Lifts a plain constant (zero derivative).
    fn constant(value: f64) -> Self;
    /// The real part.
    fn value(self) -> f64;
    fn powf(self, exponent: Self) -> Self;
    fn sin(self) -> Self;
    fn cos(self) -> Self;
    fn tan(self) -> Self;
    fn exp(self) -> Self;
    fn ln(self) -> Self;
    fn sqrt(self) -> Self;
    fn abs(self) -> Self;
    /// `-1`, `0` or `1`, with zero derivative.
    fn signum(self) -> Self;
}

impl Scalar for f64 {
    fn constant(value: f64) -> Self {
        value
    }
    fn value(self) -> f64 {
        self
    }
    fn powf(self, exponent: Self) -> Self {
        f64::powf(self, exponent)
    }
    fn sin(self) -> Self {
        f64::sin(self)
    }
    fn cos(self) -> Self {
        f64::cos(self)
    }
    fn tan(self) -> Self {
        f64::tan(self)
    }
    fn exp(self) -> Self {
        f64::exp(self)
    }
    fn ln(self) -> Self {
        f64::ln(self)
    }
    fn sqrt(self) -> Self {
        f64::sqrt(self)
    }
    fn abs(self) -> Self {
        f64::abs(self)
    }
    fn signum(self) -> Self {
        if self == 0.0 {
            0.0
        } else {
            f64::signum(self)
        }
    }
}

/// A square system of residual equations `r(x) = 0`.
pub trait Residuals {
    /// Number of unknowns (and of equations).
    fn dimension(&self) -> usize;

    /// Evaluates the residuals at `x` into `out`.
    /// Also returns a scale per equation used for relative convergence tests;
    /// `scales` may be left untouched by systems that have no natural scale.
    fn apply<T: Scalar>(&self, x: &[T], out: &mut [T], scales: &mut [f64]) -> crate::Result<()>;
}
