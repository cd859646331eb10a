//! Unevaluated sum over an array of terms.

use crate::expr::Expr;
use crate::symbols::Symbol;
use std::fmt;

/// An item of a possibly nested array handed to [`SumArray::new`].
#[derive(Debug, Clone, PartialEq)]
pub enum ArrayItem {
    Term(Expr),
    Nested(Vec<ArrayItem>),
}

impl From<Expr> for ArrayItem {
    fn from(expr: Expr) -> Self {
        ArrayItem::Term(expr)
    }
}

impl<T: Into<ArrayItem>> From<Vec<T>> for ArrayItem {
    fn from(items: Vec<T>) -> Self {
        ArrayItem::Nested(items.into_iter().map(Into::into).collect())
    }
}

/// Sum of its arguments, kept unevaluated until [`SumArray::doit`].
///
/// Nested arrays are flattened on construction at every depth, so
/// `SumArray::new([a, [b, [c]]])` has arguments `a, b, c`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SumArray {
    args: Vec<Expr>,
}

impl SumArray {
    pub fn new<I, T>(items: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<ArrayItem>,
    {
        let mut args = Vec::new();
        for item in items {
            flatten_into(item.into(), &mut args);
        }
        Self { args }
    }

    pub fn args(&self) -> &[Expr] {
        &self.args
    }

    pub fn len(&self) -> usize {
        self.args.len()
    }

    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }

    /// Evaluates into an ordinary sum. An empty array sums to zero.
    pub fn doit(&self) -> Expr {
        self.args
            .iter()
            .cloned()
            .reduce(|acc, term| acc + term)
            .unwrap_or(Expr::Number(0.0))
    }

    /// Series expansion is not supported for unevaluated sums.
    pub fn nseries(&self, _variable: &Symbol, _order: usize) -> Option<Expr> {
        None
    }

    pub(crate) fn map(&self, f: impl FnMut(&Expr) -> Expr) -> SumArray {
        SumArray {
            args: self.args.iter().map(f).collect(),
        }
    }
}

fn flatten_into(item: ArrayItem, out: &mut Vec<Expr>) {
    match item {
        ArrayItem::Term(expr) => out.push(expr),
        ArrayItem::Nested(items) => {
            for nested in items {
                flatten_into(nested, out);
            }
        }
    }
}

impl fmt::Display for SumArray {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SumArray(")?;
        for (i, arg) in self.args.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{arg}")?;
        }
        write!(f, ")")
    }
}
