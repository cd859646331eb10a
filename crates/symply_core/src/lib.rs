//! The `symply_core` crate is a catalog of physics laws written as symbolic
//! equations over dimensioned quantities.
//!
//! Key components:
//! - **Units**: SI `Dimension`s, `Unit`s with scale factors, and `Quantity` values.
//! - **Expressions**: an `Expr` tree with substitution and dimensional inference,
//!   compiled to bytecode for numeric evaluation over `f64` or `Dual` numbers.
//! - **Equations**: `Equation`, symbolic isolation of one unknown, and Newton
//!   solving for everything else.
//! - **Laws**: `definitions` and `laws` modules, each with a `calculate_*` helper,
//!   listed in `catalog`.

pub mod autodiff;
pub mod catalog;
pub mod definitions;
pub mod engine;
pub mod equation;
pub mod error;
pub mod expr;
pub mod laws;
pub mod quantity;
pub mod settings;
pub mod sum_array;
pub mod symbols;
pub mod traits;
pub mod units;

pub use equation::{expr_to_quantity, solve, solve_system, Equation};
pub use error::{Error, Result};
pub use expr::{Expr, Function};
pub use quantity::{convert_to, format_significant, Quantity};
pub use settings::SolveSettings;
pub use sum_array::SumArray;
pub use symbols::Symbol;
pub use units::{Dimension, Unit};
