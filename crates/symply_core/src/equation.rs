//! Laws as symbolic equalities, and solving them.
//!
//! [`solve`] isolates an unknown that occurs once by inverting the operations
//! around it. Anything else is handed to [`solve_system`], a Newton iteration
//! whose Jacobian comes from dual numbers run through the same compiled
//! bytecode as the residuals.

use crate::autodiff::Dual;
use crate::engine::{Bytecode, Compiler, Vm};
use crate::error::{Error, Result};
use crate::expr::{Expr, Function};
use crate::quantity::Quantity;
use crate::settings::SolveSettings;
use crate::symbols::Symbol;
use crate::traits::{Residuals, Scalar};
use crate::units::Dimension;
use nalgebra::{DMatrix, DVector};
use std::fmt;
use tracing::{debug, trace};

/// A named symbolic equality `lhs = rhs`.
#[derive(Debug, Clone, PartialEq)]
pub struct Equation {
    name: String,
    lhs: Expr,
    rhs: Expr,
}

impl Equation {
    pub fn new(name: impl Into<String>, lhs: impl Into<Expr>, rhs: impl Into<Expr>) -> Self {
        Self {
            name: name.into(),
            lhs: lhs.into(),
            rhs: rhs.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn lhs(&self) -> &Expr {
        &self.lhs
    }

    pub fn rhs(&self) -> &Expr {
        &self.rhs
    }

    /// `lhs - rhs`
    pub fn residual(&self) -> Expr {
        self.lhs.clone() - self.rhs.clone()
    }

    pub fn symbols(&self) -> Vec<Symbol> {
        self.residual().free_symbols()
    }

    /// Both sides must share a dimension; returns it. A literal zero side
    /// matches any dimension.
    pub fn check_dimensions(&self) -> Result<Dimension> {
        let lhs = self.lhs.dimension()?;
        let rhs = self.rhs.dimension()?;
        if lhs == rhs || self.rhs.is_zero() {
            Ok(lhs)
        } else if self.lhs.is_zero() {
            Ok(rhs)
        } else {
            Err(Error::units(format!("law `{}`", self.name), lhs, rhs))
        }
    }

    pub fn subs<'a, I, E>(&self, bindings: I) -> Equation
    where
        I: IntoIterator<Item = (&'a Symbol, E)>,
        E: Into<Expr>,
    {
        let substitutions: Vec<(&Symbol, Expr)> = bindings
            .into_iter()
            .map(|(symbol, value)| (symbol, value.into()))
            .collect();
        Equation {
            name: self.name.clone(),
            lhs: self.lhs.subs(substitutions.iter().map(|(s, e)| (*s, e.clone()))),
            rhs: self.rhs.subs(substitutions.iter().map(|(s, e)| (*s, e.clone()))),
        }
    }

    /// Computes `target` from quantities bound to the remaining symbols.
    ///
    /// Every bound quantity must have its symbol's dimension. The law is solved
    /// symbolically when possible and numerically otherwise; for laws with
    /// several roots the principal (first) one is returned.
    pub fn evaluate(&self, target: &Symbol, bindings: &[(&Symbol, &Quantity)]) -> Result<Quantity> {
        self.evaluate_with(target, bindings, &SolveSettings::default())
    }

    /// [`Equation::evaluate`] with explicit settings for the numeric fallback.
    /// Laws that isolate symbolically ignore `settings`.
    pub fn evaluate_with(
        &self,
        target: &Symbol,
        bindings: &[(&Symbol, &Quantity)],
        settings: &SolveSettings,
    ) -> Result<Quantity> {
        check_bindings(&self.name, bindings)?;
        let result = match solve(self, target) {
            Ok(solutions) => {
                let solution = solutions.into_iter().next().ok_or_else(|| Error::NoSolution {
                    law: self.name.clone(),
                    symbol: target.name().to_string(),
                })?;
                let applied = solution.subs(bindings.iter().map(|(s, q)| (*s, Expr::from(*q))));
                expr_to_quantity(&applied, target.name())?
            }
            Err(Error::NotIsolatable(_)) => self.solve_numeric(target, bindings, settings)?,
            Err(err) => return Err(err),
        };
        result.expect_dimension(
            target.dimension(),
            &format!("`{}` computed from {}", target.name(), self.name),
        )?;
        Ok(result)
    }

    /// Solves for one unknown with Newton iteration.
    pub fn solve_numeric(
        &self,
        unknown: &Symbol,
        bindings: &[(&Symbol, &Quantity)],
        settings: &SolveSettings,
    ) -> Result<Quantity> {
        let mut solved = solve_system(
            std::slice::from_ref(self),
            std::slice::from_ref(unknown),
            bindings,
            settings,
        )?;
        solved.pop().ok_or_else(|| Error::NoSolution {
            law: self.name.clone(),
            symbol: unknown.name().to_string(),
        })
    }
}

impl fmt::Display for Equation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {}", self.lhs, self.rhs)
    }
}

fn check_bindings(law: &str, bindings: &[(&Symbol, &Quantity)]) -> Result<()> {
    for (symbol, quantity) in bindings {
        quantity.expect_dimension(
            symbol.dimension(),
            &format!("argument `{}` of {}", symbol.name(), law),
        )?;
    }
    Ok(())
}

/// Isolates `unknown`, returning every branch (principal root first).
pub fn solve(equation: &Equation, unknown: &Symbol) -> Result<Vec<Expr>> {
    let solutions = match (
        equation.lhs.occurrences(unknown),
        equation.rhs.occurrences(unknown),
    ) {
        (0, 0) => {
            return Err(Error::NoSolution {
                law: equation.name.clone(),
                symbol: unknown.name().to_string(),
            })
        }
        (1, 0) => isolate(&equation.lhs, vec![equation.rhs.clone()], unknown)?,
        (0, 1) => isolate(&equation.rhs, vec![equation.lhs.clone()], unknown)?,
        _ => return Err(Error::NotIsolatable(unknown.name().to_string())),
    };
    debug!(
        law = equation.name.as_str(),
        symbol = unknown.name(),
        branches = solutions.len(),
        "isolated symbol"
    );
    Ok(solutions)
}

/// Splits `items` into the one containing `unknown` and the rest combined by `combine`.
fn split_off<'a>(
    items: &'a [Expr],
    unknown: &Symbol,
    combine: fn(Vec<Expr>) -> Expr,
) -> Option<(&'a Expr, Option<Expr>)> {
    let idx = items.iter().position(|item| item.contains(unknown))?;
    let mut rest: Vec<Expr> = items.to_vec();
    rest.remove(idx);
    let rest = match rest.len() {
        0 => None,
        1 => rest.pop(),
        _ => Some(combine(rest)),
    };
    Some((&items[idx], rest))
}

fn isolate(side: &Expr, values: Vec<Expr>, unknown: &Symbol) -> Result<Vec<Expr>> {
    let stuck = || Error::NotIsolatable(unknown.name().to_string());
    match side {
        Expr::Symbol(symbol) if symbol == unknown => Ok(values),
        Expr::Neg(inner) => isolate(inner, values.into_iter().map(|v| -v).collect(), unknown),
        Expr::Add(terms) => {
            let (target, rest) = split_off(terms, unknown, Expr::Add).ok_or_else(stuck)?;
            let values = match rest {
                Some(rest) => values.into_iter().map(|v| v - rest.clone()).collect(),
                None => values,
            };
            isolate(target, values, unknown)
        }
        Expr::SumArray(array) => {
            isolate(&Expr::Add(array.args().to_vec()), values, unknown)
        }
        Expr::Mul(factors) => {
            let (target, rest) = split_off(factors, unknown, Expr::Mul).ok_or_else(stuck)?;
            let values = match rest {
                Some(rest) => values.into_iter().map(|v| v / rest.clone()).collect(),
                None => values,
            };
            isolate(target, values, unknown)
        }
        Expr::Pow(base, exponent) if base.contains(unknown) => {
            let values = match exponent.as_ref() {
                Expr::Number(n) if *n == 0.0 => return Err(stuck()),
                Expr::Number(n) if n.fract() == 0.0 && (n / 2.0).fract() == 0.0 => values
                    .into_iter()
                    .flat_map(|v| {
                        let root = v.pow(1.0 / n);
                        [root.clone(), -root]
                    })
                    .collect(),
                // Real odd root: sign(v) * |v|^(1/n).
                Expr::Number(n) if n.fract() == 0.0 && n.abs() != 1.0 => values
                    .into_iter()
                    .map(|v| {
                        Expr::call(Function::Sign, v.clone())
                            * Expr::call(Function::Abs, v).pow(1.0 / n)
                    })
                    .collect(),
                Expr::Number(n) => values.into_iter().map(|v| v.pow(1.0 / n)).collect(),
                other => values
                    .into_iter()
                    .map(|v| v.pow(Expr::from(1.0) / other.clone()))
                    .collect(),
            };
            isolate(base, values, unknown)
        }
        Expr::Pow(base, exponent) => {
            let values = values
                .into_iter()
                .map(|v| v.ln() / base.as_ref().clone().ln())
                .collect();
            isolate(exponent, values, unknown)
        }
        Expr::Call(function, arg) => {
            let values = match function {
                Function::Exp => values.into_iter().map(Expr::ln).collect(),
                Function::Ln => values.into_iter().map(Expr::exp).collect(),
                Function::Sqrt => values.into_iter().map(|v| v.powi(2)).collect(),
                Function::Abs => values.into_iter().flat_map(|v| [v.clone(), -v]).collect(),
                Function::Sin | Function::Cos | Function::Tan | Function::Sign => {
                    return Err(stuck())
                }
            };
            isolate(arg, values, unknown)
        }
        Expr::Symbol(_) | Expr::Number(_) | Expr::Quantity(_) => Err(stuck()),
    }
}

/// Evaluates a fully substituted expression into a dimensioned quantity.
pub fn expr_to_quantity(expr: &Expr, name: impl Into<String>) -> Result<Quantity> {
    if let Some(symbol) = expr.free_symbols().first() {
        return Err(Error::UnboundSymbol(symbol.name().to_string()));
    }
    let dimension = expr.dimension()?;
    let value = expr.evalf()?;
    Ok(Quantity::from_si(name, dimension, value))
}

/// Compiled `lhs - rhs` residuals of a set of equations over their unknowns.
pub struct EquationSystem {
    sides: Vec<(Bytecode, Bytecode)>,
}

impl EquationSystem {
    /// Compiles the equations; every symbol left after substitution must be an unknown.
    pub fn compile(equations: &[Equation], unknowns: &[Symbol]) -> Result<Self> {
        let compiler = Compiler::new(unknowns);
        let sides = equations
            .iter()
            .map(|eq| Ok((compiler.compile(&eq.lhs)?, compiler.compile(&eq.rhs)?)))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { sides })
    }
}

impl Residuals for EquationSystem {
    fn dimension(&self) -> usize {
        self.sides.len()
    }

    fn apply<T: Scalar>(&self, x: &[T], out: &mut [T], scales: &mut [f64]) -> Result<()> {
        let mut stack = Vec::with_capacity(32);
        for (i, (lhs, rhs)) in self.sides.iter().enumerate() {
            let l = Vm::execute(lhs, x, &mut stack)?;
            let r = Vm::execute(rhs, x, &mut stack)?;
            out[i] = l - r;
            scales[i] = l.value().abs().max(r.value().abs());
        }
        Ok(())
    }
}

/// Solves `equations` for `unknowns` (SI values), with the other symbols bound.
pub fn solve_system(
    equations: &[Equation],
    unknowns: &[Symbol],
    bindings: &[(&Symbol, &Quantity)],
    settings: &SolveSettings,
) -> Result<Vec<Quantity>> {
    if equations.is_empty() || equations.len() != unknowns.len() {
        return Err(Error::Underdetermined {
            equations: equations.len(),
            unknowns: unknowns.len(),
        });
    }
    for equation in equations {
        check_bindings(&equation.name, bindings)?;
    }

    let substituted: Vec<Equation> = equations
        .iter()
        .map(|eq| eq.subs(bindings.iter().map(|(s, q)| (*s, Expr::from(*q)))))
        .collect();
    for equation in &substituted {
        equation.check_dimensions()?;
    }

    let system = EquationSystem::compile(&substituted, unknowns)?;
    let guess = vec![settings.initial_guess; unknowns.len()];
    let outcome = newton(&system, &guess, settings)?;

    Ok(unknowns
        .iter()
        .zip(outcome.state)
        .map(|(symbol, value)| Quantity::from_si(symbol.name(), symbol.dimension(), value))
        .collect())
}

/// Result of a converged Newton iteration.
#[derive(Debug, Clone, PartialEq)]
pub struct NewtonOutcome {
    pub state: Vec<f64>,
    pub residual_norm: f64,
    pub iterations: usize,
}

/// Damped Newton iteration on `system` from `initial_guess`.
///
/// Converged when every residual is within `tolerance` of the larger side of
/// its equation, plus `absolute_tolerance`.
pub fn newton<S: Residuals>(
    system: &S,
    initial_guess: &[f64],
    settings: &SolveSettings,
) -> Result<NewtonOutcome> {
    settings.validate()?;
    let dim = system.dimension();
    if initial_guess.len() != dim {
        return Err(Error::InvalidSettings(format!(
            "Initial guess dimension mismatch. Expected {}, got {}.",
            dim,
            initial_guess.len()
        )));
    }

    let mut state = initial_guess.to_vec();
    let mut residual = vec![0.0; dim];
    let mut scales = vec![0.0; dim];
    system.apply(&state, &mut residual, &mut scales)?;
    let mut iterations = 0usize;

    loop {
        if converged(&residual, &scales, settings) {
            break;
        }

        if iterations >= settings.max_steps {
            return Err(Error::DidNotConverge {
                steps: settings.max_steps,
                residual: l2_norm(&residual),
            });
        }

        let jacobian = compute_jacobian(system, &state)?;
        let delta = solve_linear_system(dim, &jacobian, &residual)?;

        for i in 0..dim {
            state[i] -= settings.damping * delta[i];
        }

        iterations += 1;
        system.apply(&state, &mut residual, &mut scales)?;
        trace!(iteration = iterations, residual = l2_norm(&residual), "newton step");
    }

    let residual_norm = l2_norm(&residual);
    debug!(iterations, residual_norm, "newton converged");
    Ok(NewtonOutcome {
        state,
        residual_norm,
        iterations,
    })
}

fn converged(residual: &[f64], scales: &[f64], settings: &SolveSettings) -> bool {
    residual
        .iter()
        .zip(scales)
        .all(|(r, scale)| r.abs() <= settings.tolerance * scale + settings.absolute_tolerance)
}

fn compute_jacobian<S: Residuals>(system: &S, state: &[f64]) -> Result<Vec<f64>> {
    let dim = system.dimension();
    let mut jacobian = vec![0.0; dim * dim];
    let mut dual_state = vec![Dual::new(0.0, 0.0); dim];
    let mut dual_out = vec![Dual::new(0.0, 0.0); dim];
    let mut scratch = vec![0.0; dim];

    for j in 0..dim {
        for i in 0..dim {
            dual_state[i] = Dual::new(state[i], if i == j { 1.0 } else { 0.0 });
        }
        system.apply(&dual_state, &mut dual_out, &mut scratch)?;
        for i in 0..dim {
            jacobian[i * dim + j] = dual_out[i].eps;
        }
    }

    Ok(jacobian)
}

fn solve_linear_system(dim: usize, jacobian: &[f64], residual: &[f64]) -> Result<Vec<f64>> {
    let j_matrix = DMatrix::from_row_slice(dim, dim, jacobian);
    let rhs = DVector::from_column_slice(residual);
    j_matrix
        .lu()
        .solve(&rhs)
        .map(|v| v.iter().cloned().collect())
        .ok_or(Error::Singular)
}

fn l2_norm(values: &[f64]) -> f64 {
    values.iter().map(|v| v * v).sum::<f64>().sqrt()
}
