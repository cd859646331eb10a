//! Symbolic expression tree over symbols, quantities and numbers.

use crate::engine::{self, Ast, BinaryOp, Compiler, Vm};
use crate::error::{Error, Result};
use crate::quantity::Quantity;
use crate::sum_array::SumArray;
use crate::symbols::Symbol;
use crate::units::Dimension;
use num_rational::Rational32;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Sub};

/// Elementary functions understood by the parser and the VM.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Function {
    Sin,
    Cos,
    Tan,
    Exp,
    Ln,
    Sqrt,
    Abs,
    Sign,
}

impl Function {
    pub fn name(self) -> &'static str {
        match self {
            Function::Sin => "sin",
            Function::Cos => "cos",
            Function::Tan => "tan",
            Function::Exp => "exp",
            Function::Ln => "ln",
            Function::Sqrt => "sqrt",
            Function::Abs => "abs",
            Function::Sign => "sign",
        }
    }

    pub fn from_name(name: &str) -> Option<Function> {
        let function = match name {
            "sin" => Function::Sin,
            "cos" => Function::Cos,
            "tan" => Function::Tan,
            "exp" => Function::Exp,
            "ln" | "log" => Function::Ln,
            "sqrt" => Function::Sqrt,
            "abs" => Function::Abs,
            "sign" => Function::Sign,
            _ => return None,
        };
        Some(function)
    }
}

/// Expression node.
///
/// Subtraction is stored as a sum with a negated term and division as a
/// product with a `^-1` factor, so only sums, products and powers need
/// inverting when solving.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Number(f64),
    Symbol(Symbol),
    Quantity(Quantity),
    Add(Vec<Expr>),
    Mul(Vec<Expr>),
    Pow(Box<Expr>, Box<Expr>),
    Neg(Box<Expr>),
    Call(Function, Box<Expr>),
    SumArray(SumArray),
}

impl Expr {
    pub fn pow(self, exponent: impl Into<Expr>) -> Expr {
        Expr::Pow(Box::new(self), Box::new(exponent.into()))
    }

    pub fn powi(self, exponent: i32) -> Expr {
        self.pow(f64::from(exponent))
    }

    pub fn call(function: Function, arg: impl Into<Expr>) -> Expr {
        Expr::Call(function, Box::new(arg.into()))
    }

    pub fn sqrt(self) -> Expr {
        Expr::call(Function::Sqrt, self)
    }

    pub fn exp(self) -> Expr {
        Expr::call(Function::Exp, self)
    }

    pub fn ln(self) -> Expr {
        Expr::call(Function::Ln, self)
    }

    /// Parses `text`, resolving identifiers against `symbols` (then `pi`).
    pub fn parse(text: &str, symbols: &[Symbol]) -> Result<Expr> {
        let ast = engine::parse(text)?;
        Expr::from_ast(&ast, symbols)
    }

    fn from_ast(ast: &Ast, symbols: &[Symbol]) -> Result<Expr> {
        let expr = match ast {
            Ast::Number(n) => Expr::Number(*n),
            Ast::Identifier(name) => match symbols.iter().find(|s| s.name() == name) {
                Some(symbol) => Expr::Symbol(symbol.clone()),
                None if name == "pi" => Expr::Number(std::f64::consts::PI),
                None => return Err(Error::Parse(format!("unknown identifier `{name}`"))),
            },
            Ast::Negate(operand) => -Expr::from_ast(operand, symbols)?,
            Ast::Call(name, arg) => {
                let function = Function::from_name(name)
                    .ok_or_else(|| Error::Parse(format!("unknown function `{name}`")))?;
                Expr::call(function, Expr::from_ast(arg, symbols)?)
            }
            Ast::Binary(left, op, right) => {
                let left = Expr::from_ast(left, symbols)?;
                let right = Expr::from_ast(right, symbols)?;
                match op {
                    BinaryOp::Add => left + right,
                    BinaryOp::Sub => left - right,
                    BinaryOp::Mul => left * right,
                    BinaryOp::Div => left / right,
                    BinaryOp::Pow => left.pow(right),
                }
            }
        };
        Ok(expr)
    }

    /// Replaces symbols by the bound expressions. Unbound symbols stay.
    pub fn subs<'a, I, E>(&self, bindings: I) -> Expr
    where
        I: IntoIterator<Item = (&'a Symbol, E)>,
        E: Into<Expr>,
    {
        let map: HashMap<&Symbol, Expr> = bindings
            .into_iter()
            .map(|(symbol, value)| (symbol, value.into()))
            .collect();
        self.subs_map(&map)
    }

    pub(crate) fn subs_map(&self, map: &HashMap<&Symbol, Expr>) -> Expr {
        match self {
            Expr::Symbol(symbol) => map.get(symbol).cloned().unwrap_or_else(|| self.clone()),
            Expr::Number(_) | Expr::Quantity(_) => self.clone(),
            Expr::Add(terms) => Expr::Add(terms.iter().map(|t| t.subs_map(map)).collect()),
            Expr::Mul(factors) => Expr::Mul(factors.iter().map(|f| f.subs_map(map)).collect()),
            Expr::SumArray(array) => Expr::SumArray(array.map(|arg| arg.subs_map(map))),
            Expr::Pow(base, exponent) => Expr::Pow(
                Box::new(base.subs_map(map)),
                Box::new(exponent.subs_map(map)),
            ),
            Expr::Neg(operand) => Expr::Neg(Box::new(operand.subs_map(map))),
            Expr::Call(function, arg) => Expr::Call(*function, Box::new(arg.subs_map(map))),
        }
    }

    /// A literal zero, which adds to and equals quantities of any dimension.
    pub fn is_zero(&self) -> bool {
        matches!(self, Expr::Number(n) if *n == 0.0)
    }

    /// Direct children of this node.
    pub fn args(&self) -> Vec<&Expr> {
        match self {
            Expr::Number(_) | Expr::Symbol(_) | Expr::Quantity(_) => Vec::new(),
            Expr::Add(items) | Expr::Mul(items) => items.iter().collect(),
            Expr::SumArray(array) => array.args().iter().collect(),
            Expr::Pow(base, exponent) => vec![base.as_ref(), exponent.as_ref()],
            Expr::Neg(operand) | Expr::Call(_, operand) => vec![operand.as_ref()],
        }
    }

    /// How many times `symbol` appears in the tree.
    pub fn occurrences(&self, symbol: &Symbol) -> usize {
        match self {
            Expr::Symbol(s) => usize::from(s == symbol),
            _ => self.args().iter().map(|arg| arg.occurrences(symbol)).sum(),
        }
    }

    pub fn contains(&self, symbol: &Symbol) -> bool {
        self.occurrences(symbol) > 0
    }

    /// Symbols left in the tree, in order of first appearance.
    pub fn free_symbols(&self) -> Vec<Symbol> {
        let mut found = Vec::new();
        self.collect_symbols(&mut found);
        found
    }

    fn collect_symbols(&self, found: &mut Vec<Symbol>) {
        if let Expr::Symbol(symbol) = self {
            if !found.contains(symbol) {
                found.push(symbol.clone());
            }
            return;
        }
        for arg in self.args() {
            arg.collect_symbols(found);
        }
    }

    /// Infers the physical dimension, checking that sums add like with like
    /// and that exponents and function arguments are dimensionless.
    pub fn dimension(&self) -> Result<Dimension> {
        match self {
            Expr::Number(_) => Ok(Dimension::DIMENSIONLESS),
            Expr::Symbol(symbol) => Ok(symbol.dimension()),
            Expr::Quantity(quantity) => Ok(quantity.dimension()),
            Expr::Add(terms) => self.sum_dimension(terms),
            Expr::SumArray(array) => self.sum_dimension(array.args()),
            Expr::Mul(factors) => factors.iter().try_fold(Dimension::DIMENSIONLESS, |acc, f| {
                acc.checked_mul(f.dimension()?)
                    .ok_or_else(|| Error::ExponentOverflow(self.to_string()))
            }),
            Expr::Neg(operand) => operand.dimension(),
            Expr::Pow(base, exponent) => {
                let exponent_dimension = exponent.dimension()?;
                if !exponent_dimension.is_dimensionless() {
                    return Err(Error::units(
                        format!("exponent of `{self}`"),
                        Dimension::DIMENSIONLESS,
                        exponent_dimension,
                    ));
                }
                let base_dimension = base.dimension()?;
                if base_dimension.is_dimensionless() {
                    return Ok(Dimension::DIMENSIONLESS);
                }
                let value = exponent
                    .evalf()
                    .map_err(|_| Error::SymbolicExponent(exponent.to_string()))?;
                if !value.is_finite() {
                    return Err(Error::SymbolicExponent(exponent.to_string()));
                }
                Rational32::approximate_float(value)
                    .and_then(|ratio| base_dimension.checked_pow(ratio))
                    .ok_or_else(|| Error::ExponentOverflow(self.to_string()))
            }
            Expr::Call(function, arg) => {
                let arg_dimension = arg.dimension()?;
                match function {
                    Function::Sqrt => arg_dimension
                        .checked_pow(Rational32::new(1, 2))
                        .ok_or_else(|| Error::ExponentOverflow(self.to_string())),
                    Function::Abs => Ok(arg_dimension),
                    Function::Sign => Ok(Dimension::DIMENSIONLESS),
                    _ if arg_dimension.is_dimensionless() => Ok(Dimension::DIMENSIONLESS),
                    _ => Err(Error::units(
                        format!("argument of `{self}`"),
                        Dimension::DIMENSIONLESS,
                        arg_dimension,
                    )),
                }
            }
        }
    }

    fn sum_dimension(&self, terms: &[Expr]) -> Result<Dimension> {
        let mut expected: Option<Dimension> = None;
        for term in terms.iter().filter(|term| !term.is_zero()) {
            let found = term.dimension()?;
            match expected {
                None => expected = Some(found),
                Some(dimension) if dimension == found => {}
                Some(dimension) => {
                    return Err(Error::units(format!("sum `{self}`"), dimension, found));
                }
            }
        }
        Ok(expected.unwrap_or(Dimension::DIMENSIONLESS))
    }

    /// Numeric value in SI units. Fails if any symbol is still free.
    pub fn evalf(&self) -> Result<f64> {
        let code = Compiler::new(&[]).compile(self)?;
        let mut stack = Vec::with_capacity(16);
        Vm::execute(&code, &[], &mut stack)
    }

    fn precedence(&self) -> u8 {
        match self {
            Expr::Add(_) => 1,
            Expr::Neg(_) => 2,
            Expr::Number(n) if *n < 0.0 => 2,
            Expr::Mul(_) => 3,
            Expr::Pow(..) => 4,
            _ => 5,
        }
    }

    fn fmt_operand(&self, f: &mut fmt::Formatter<'_>, min_precedence: u8) -> fmt::Result {
        if self.precedence() < min_precedence {
            write!(f, "({self})")
        } else {
            write!(f, "{self}")
        }
    }
}

fn reciprocal_base(expr: &Expr) -> Option<&Expr> {
    match expr {
        Expr::Pow(base, exponent) if **exponent == Expr::Number(-1.0) => Some(base.as_ref()),
        _ => None,
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Number(n) => write!(f, "{n}"),
            Expr::Symbol(symbol) => write!(f, "{symbol}"),
            Expr::Quantity(quantity) => f.write_str(quantity.name()),
            Expr::Add(terms) => {
                for (i, term) in terms.iter().enumerate() {
                    match (i, term) {
                        (0, _) => term.fmt_operand(f, 1)?,
                        (_, Expr::Neg(inner)) => {
                            write!(f, " - ")?;
                            inner.fmt_operand(f, 2)?;
                        }
                        _ => {
                            write!(f, " + ")?;
                            term.fmt_operand(f, 2)?;
                        }
                    }
                }
                Ok(())
            }
            Expr::Mul(factors) => {
                let (denominators, numerators): (Vec<&Expr>, Vec<&Expr>) =
                    factors.iter().partition(|x| reciprocal_base(x).is_some());
                if numerators.is_empty() {
                    write!(f, "1")?;
                }
                for (i, factor) in numerators.iter().enumerate() {
                    if i > 0 {
                        write!(f, "*")?;
                    }
                    factor.fmt_operand(f, 3)?;
                }
                for factor in denominators.iter().filter_map(|x| reciprocal_base(x)) {
                    write!(f, "/")?;
                    factor.fmt_operand(f, 4)?;
                }
                Ok(())
            }
            Expr::Pow(base, exponent) => {
                base.fmt_operand(f, 5)?;
                write!(f, "^")?;
                exponent.fmt_operand(f, 5)
            }
            Expr::Neg(operand) => {
                write!(f, "-")?;
                operand.fmt_operand(f, 3)
            }
            Expr::Call(function, arg) => write!(f, "{}({arg})", function.name()),
            Expr::SumArray(array) => write!(f, "{array}"),
        }
    }
}

impl From<f64> for Expr {
    fn from(value: f64) -> Self {
        Expr::Number(value)
    }
}

impl From<Symbol> for Expr {
    fn from(symbol: Symbol) -> Self {
        Expr::Symbol(symbol)
    }
}

impl From<&Symbol> for Expr {
    fn from(symbol: &Symbol) -> Self {
        Expr::Symbol(symbol.clone())
    }
}

impl From<Quantity> for Expr {
    fn from(quantity: Quantity) -> Self {
        Expr::Quantity(quantity)
    }
}

impl From<&Quantity> for Expr {
    fn from(quantity: &Quantity) -> Self {
        Expr::Quantity(quantity.clone())
    }
}

impl From<SumArray> for Expr {
    fn from(array: SumArray) -> Self {
        Expr::SumArray(array)
    }
}

impl Add for Expr {
    type Output = Expr;
    fn add(self, rhs: Expr) -> Expr {
        let mut terms = match self {
            Expr::Add(terms) => terms,
            other => vec![other],
        };
        match rhs {
            Expr::Add(more) => terms.extend(more),
            other => terms.push(other),
        }
        Expr::Add(terms)
    }
}

impl Sub for Expr {
    type Output = Expr;
    fn sub(self, rhs: Expr) -> Expr {
        self + (-rhs)
    }
}

impl Mul for Expr {
    type Output = Expr;
    fn mul(self, rhs: Expr) -> Expr {
        let mut factors = match self {
            Expr::Mul(factors) => factors,
            other => vec![other],
        };
        match rhs {
            Expr::Mul(more) => factors.extend(more),
            other => factors.push(other),
        }
        Expr::Mul(factors)
    }
}

impl Div for Expr {
    type Output = Expr;
    fn div(self, rhs: Expr) -> Expr {
        self * rhs.powi(-1)
    }
}

impl Neg for Expr {
    type Output = Expr;
    fn neg(self) -> Expr {
        match self {
            Expr::Neg(inner) => *inner,
            Expr::Number(n) => Expr::Number(-n),
            other => Expr::Neg(Box::new(other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Expr, Function};
    use crate::error::Error;
    use crate::quantity::Quantity;
    use crate::symbols::Symbol;
    use crate::units::{Dimension, Unit};
    use approx::assert_relative_eq;

    fn symbols() -> (Symbol, Symbol, Symbol) {
        (
            Symbol::new("s", Dimension::LENGTH),
            Symbol::new("t", Dimension::TIME),
            Symbol::new("m", Dimension::MASS),
        )
    }

    #[test]
    fn operators_flatten_sums_and_products() {
        let (s, t, m) = symbols();
        let sum = Expr::from(&s) + Expr::from(&t) + Expr::from(&m);
        assert!(matches!(&sum, Expr::Add(terms) if terms.len() == 3));
        let product = Expr::from(&s) * Expr::from(&t) / Expr::from(&m);
        assert!(matches!(&product, Expr::Mul(factors) if factors.len() == 3));
        assert_eq!(-(-Expr::from(&s)), Expr::from(&s));
    }

    #[test]
    fn display_reads_like_infix() {
        let (s, t, m) = symbols();
        let expr = Expr::from(&m) * (Expr::from(&s) - Expr::from(&t)).powi(2) / Expr::from(&t);
        assert_eq!(expr.to_string(), "m*(s - t)^2/t");
        assert_eq!((Expr::from(1.0) / Expr::from(&t)).to_string(), "1/t");
        assert_eq!(Expr::call(Function::Sin, Expr::from(&s)).to_string(), "sin(s)");
    }

    #[test]
    fn dimension_of_products_and_powers() {
        let (s, t, m) = symbols();
        let momentum = Expr::from(&m) * Expr::from(&s) / Expr::from(&t);
        assert_eq!(
            momentum.dimension().expect("dimension"),
            Dimension::MASS * Dimension::VELOCITY
        );
        let root = (Expr::from(&s) * Expr::from(&s)).sqrt();
        assert_eq!(root.dimension().expect("dimension"), Dimension::LENGTH);
    }

    #[test]
    fn dimension_rejects_mismatched_sum() {
        let (s, t, _) = symbols();
        let bad = Expr::from(&s) + Expr::from(&t);
        match bad.dimension() {
            Err(Error::Units { expected, found, .. }) => {
                assert_eq!(expected, Dimension::LENGTH);
                assert_eq!(found, Dimension::TIME);
            }
            other => panic!("expected units error, got {other:?}"),
        }
        let zero_plus = Expr::from(0.0) + Expr::from(&s);
        assert_eq!(zero_plus.dimension(), Ok(Dimension::LENGTH));
    }

    #[test]
    fn dimension_rejects_dimensioned_function_argument() {
        let (_, t, _) = symbols();
        let bad = Expr::from(&t).exp();
        assert!(matches!(bad.dimension(), Err(Error::Units { .. })));
    }

    #[test]
    fn symbolic_exponent_of_dimensioned_base() {
        let (s, _, _) = symbols();
        let k = Symbol::dimensionless("k");
        let expr = Expr::from(&s).pow(Expr::from(&k));
        assert_eq!(
            expr.dimension(),
            Err(Error::SymbolicExponent("k".to_string()))
        );
    }

    #[test]
    fn overflowing_exponents_are_errors() {
        let (s, t, _) = symbols();
        let expr = Expr::parse("(s^2)^2000000000", &[s.clone()]).expect("parse");
        assert!(matches!(expr.dimension(), Err(Error::ExponentOverflow(_))));

        let expr = Expr::parse("t^2000000000*t^2000000000", &[t]).expect("parse");
        assert!(matches!(expr.dimension(), Err(Error::ExponentOverflow(_))));

        let expr = Expr::parse("s^1e12", &[s]).expect("parse");
        assert!(matches!(expr.dimension(), Err(Error::ExponentOverflow(_))));
    }

    #[test]
    fn subs_and_evalf() {
        let (s, t, _) = symbols();
        let speed = Expr::from(&s) / Expr::from(&t);
        assert_eq!(
            speed.evalf(),
            Err(Error::UnboundSymbol("s".to_string()))
        );
        let distance = Quantity::of("d", 3.0, &Unit::KILOMETER);
        let applied = speed.subs([
            (&s, Expr::from(&distance)),
            (&t, Expr::from(&Quantity::of("dt", 10.0, &Unit::MINUTE))),
        ]);
        assert!(applied.free_symbols().is_empty());
        assert_relative_eq!(applied.evalf().expect("value"), 5.0, max_relative = 1e-12);
        assert_eq!(applied.dimension(), Ok(Dimension::VELOCITY));
    }

    #[test]
    fn parse_resolves_symbols_and_constants() {
        let (s, t, _) = symbols();
        let expr = Expr::parse("2*pi*s/t", &[s.clone(), t.clone()]).expect("parse");
        assert_eq!(expr.free_symbols(), vec![s.clone(), t.clone()]);
        assert_eq!(expr.occurrences(&s), 1);
        assert!(matches!(
            Expr::parse("2*x", &[s.clone()]),
            Err(Error::Parse(_))
        ));
        assert!(matches!(
            Expr::parse("foo(s)", &[s]),
            Err(Error::Parse(_))
        ));
    }
}
