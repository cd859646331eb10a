use crate::error::{Error, Result};
use crate::expr::{Expr, Function};
use crate::symbols::Symbol;
use crate::traits::Scalar;

/// OpCodes for the Stack-based Virtual Machine.
/// The VM operates on a stack of `Scalar` values (f64 or Dual).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OpCode {
    /// Pushes a constant `f64` value onto the stack.
    LoadConst(f64),
    /// Pushes the value of an unknown (by index into the compiler's unknown list).
    LoadVar(usize),
    /// Pops top two values (b, a), pushes (a + b).
    Add,
    /// Pops top two values (b, a), pushes (a * b).
    Mul,
    /// Pops top two values (b, a), pushes (a ^ b).
    Pow,
    /// Pops top value (a), pushes -a.
    Neg,
    /// Pops top value (a), pushes f(a).
    Call(Function),
}

/// Represents a compiled sequence of operations.
#[derive(Debug, Clone, Default)]
pub struct Bytecode {
    pub ops: Vec<OpCode>,
}

/// Stack-based Virtual Machine for evaluating expressions.
///
/// The VM is stateless; `execute` takes the bytecode, the current values of
/// the unknowns and a scratch stack, and returns the value left on the stack.
pub struct Vm;

impl Vm {
    pub fn execute<T: Scalar>(bytecode: &Bytecode, vars: &[T], stack: &mut Vec<T>) -> Result<T> {
        stack.clear();

        for op in &bytecode.ops {
            match op {
                OpCode::LoadConst(val) => stack.push(T::constant(*val)),
                OpCode::LoadVar(idx) => {
                    let value = vars.get(*idx).copied().ok_or(Error::MalformedBytecode)?;
                    stack.push(value);
                }
                OpCode::Add => binary(stack, |a, b| a + b)?,
                OpCode::Mul => binary(stack, |a, b| a * b)?,
                OpCode::Pow => binary(stack, |a, b| a.powf(b))?,
                OpCode::Neg => unary(stack, |a| -a)?,
                OpCode::Call(function) => unary(stack, |a| apply_function(*function, a))?,
            }
        }

        let result = stack.pop().ok_or(Error::MalformedBytecode)?;
        if stack.is_empty() {
            Ok(result)
        } else {
            Err(Error::MalformedBytecode)
        }
    }
}

fn binary<T: Scalar>(stack: &mut Vec<T>, op: impl FnOnce(T, T) -> T) -> Result<()> {
    let b = stack.pop().ok_or(Error::MalformedBytecode)?;
    let a = stack.pop().ok_or(Error::MalformedBytecode)?;
    stack.push(op(a, b));
    Ok(())
}

fn unary<T: Scalar>(stack: &mut Vec<T>, op: impl FnOnce(T) -> T) -> Result<()> {
    let a = stack.pop().ok_or(Error::MalformedBytecode)?;
    stack.push(op(a));
    Ok(())
}

fn apply_function<T: Scalar>(function: Function, a: T) -> T {
    match function {
        Function::Sin => a.sin(),
        Function::Cos => a.cos(),
        Function::Tan => a.tan(),
        Function::Exp => a.exp(),
        Function::Ln => a.ln(),
        Function::Sqrt => a.sqrt(),
        Function::Abs => a.abs(),
        Function::Sign => a.signum(),
    }
}

/// Compiles an `Expr` into `Bytecode`.
/// Symbols listed as unknowns become `LoadVar`; quantities and numbers are
/// folded to their SI values. Any other symbol is unbound.
pub struct Compiler<'a> {
    unknowns: &'a [Symbol],
}

impl<'a> Compiler<'a> {
    pub fn new(unknowns: &'a [Symbol]) -> Self {
        Self { unknowns }
    }

    pub fn compile(&self, expr: &Expr) -> Result<Bytecode> {
        let mut ops = Vec::new();
        self.compile_recursive(expr, &mut ops)?;
        Ok(Bytecode { ops })
    }

    fn compile_recursive(&self, expr: &Expr, ops: &mut Vec<OpCode>) -> Result<()> {
        match expr {
            Expr::Number(n) => ops.push(OpCode::LoadConst(*n)),
            Expr::Quantity(q) => ops.push(OpCode::LoadConst(q.value())),
            Expr::Symbol(symbol) => {
                let idx = self
                    .unknowns
                    .iter()
                    .position(|s| s == symbol)
                    .ok_or_else(|| Error::UnboundSymbol(symbol.name().to_string()))?;
                ops.push(OpCode::LoadVar(idx));
            }
            Expr::Add(terms) => self.compile_chain(terms, 0.0, OpCode::Add, ops)?,
            Expr::Mul(factors) => self.compile_chain(factors, 1.0, OpCode::Mul, ops)?,
            Expr::SumArray(array) => self.compile_chain(array.args(), 0.0, OpCode::Add, ops)?,
            Expr::Pow(base, exponent) => {
                self.compile_recursive(base, ops)?;
                self.compile_recursive(exponent, ops)?;
                ops.push(OpCode::Pow);
            }
            Expr::Neg(operand) => {
                self.compile_recursive(operand, ops)?;
                ops.push(OpCode::Neg);
            }
            Expr::Call(function, arg) => {
                self.compile_recursive(arg, ops)?;
                ops.push(OpCode::Call(*function));
            }
        }
        Ok(())
    }

    fn compile_chain(
        &self,
        items: &[Expr],
        identity: f64,
        op: OpCode,
        ops: &mut Vec<OpCode>,
    ) -> Result<()> {
        let Some((first, rest)) = items.split_first() else {
            ops.push(OpCode::LoadConst(identity));
            return Ok(());
        };
        self.compile_recursive(first, ops)?;
        for item in rest {
            self.compile_recursive(item, ops)?;
            ops.push(op);
        }
        Ok(())
    }
}

// --- AST & Parser ---

/// Binary operators of the surface syntax.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
}

/// Untyped syntax tree. Identifiers are resolved later: against symbols for
/// expressions, against the unit catalog for unit text.
#[derive(Debug, Clone, PartialEq)]
pub enum Ast {
    Number(f64),
    Identifier(String),
    Binary(Box<Ast>, BinaryOp, Box<Ast>),
    Negate(Box<Ast>),
    Call(String, Box<Ast>),
}

impl Ast {
    /// The value of a purely numeric subtree (`2`, `-2`).
    pub fn constant(&self) -> Option<f64> {
        match self {
            Ast::Number(n) => Some(*n),
            Ast::Negate(inner) => inner.constant().map(|v| -v),
            _ => None,
        }
    }
}

/// Parses a string expression into an AST.
pub fn parse(input: &str) -> Result<Ast> {
    let tokens = tokenize(input)?;
    let mut parser = Parser { tokens, pos: 0 };
    let ast = parser.parse_expression()?;
    match parser.peek() {
        None => Ok(ast),
        Some(token) => Err(Error::Parse(format!("unexpected trailing {token:?}"))),
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(f64),
    Identifier(String),
    Plus,
    Minus,
    Star,
    Slash,
    Caret,
    LParen,
    RParen,
}

fn tokenize(input: &str) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut chars = input.chars().peekable();

    while let Some(&c) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
        } else if c.is_ascii_digit() || c == '.' {
            let mut num_str = String::new();
            while let Some(&d) = chars.peek() {
                let exponent_sign = (d == '-' || d == '+') && num_str.ends_with(['e', 'E']);
                if d.is_ascii_digit() || d == '.' || d == 'e' || d == 'E' || exponent_sign {
                    num_str.push(d);
                    chars.next();
                } else {
                    break;
                }
            }
            let value = num_str
                .parse()
                .map_err(|_| Error::Parse(format!("invalid number `{num_str}`")))?;
            tokens.push(Token::Number(value));
        } else if c.is_alphabetic() || c == '_' {
            let mut ident = String::new();
            while let Some(&d) = chars.peek() {
                if d.is_alphanumeric() || d == '_' {
                    ident.push(d);
                    chars.next();
                } else {
                    break;
                }
            }
            tokens.push(Token::Identifier(ident));
        } else {
            let token = match c {
                '+' => Token::Plus,
                '-' => Token::Minus,
                '*' => Token::Star,
                '/' => Token::Slash,
                '^' => Token::Caret,
                '(' => Token::LParen,
                ')' => Token::RParen,
                other => return Err(Error::Parse(format!("unexpected character `{other}`"))),
            };
            tokens.push(token);
            chars.next();
        }
    }
    Ok(tokens)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn consume(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn expect_rparen(&mut self) -> Result<()> {
        match self.consume() {
            Some(Token::RParen) => Ok(()),
            _ => Err(Error::Parse("expected ')'".to_string())),
        }
    }

    fn parse_expression(&mut self) -> Result<Ast> {
        let mut left = self.parse_term()?;

        loop {
            let op = match self.peek() {
                Some(Token::Plus) => BinaryOp::Add,
                Some(Token::Minus) => BinaryOp::Sub,
                _ => break,
            };
            self.consume();
            let right = self.parse_term()?;
            left = Ast::Binary(Box::new(left), op, Box::new(right));
        }
        Ok(left)
    }

    fn parse_term(&mut self) -> Result<Ast> {
        let mut left = self.parse_unary()?;

        loop {
            let op = match self.peek() {
                Some(Token::Star) => BinaryOp::Mul,
                Some(Token::Slash) => BinaryOp::Div,
                _ => break,
            };
            self.consume();
            let right = self.parse_unary()?;
            left = Ast::Binary(Box::new(left), op, Box::new(right));
        }
        Ok(left)
    }

    // Unary minus binds looser than `^`: `-x^2` is `-(x^2)`.
    fn parse_unary(&mut self) -> Result<Ast> {
        if let Some(Token::Minus) = self.peek() {
            self.consume();
            let operand = self.parse_unary()?;
            return Ok(Ast::Negate(Box::new(operand)));
        }
        self.parse_power()
    }

    // Right associative: `a^b^c` is `a^(b^c)`.
    fn parse_power(&mut self) -> Result<Ast> {
        let base = self.parse_primary()?;
        if let Some(Token::Caret) = self.peek() {
            self.consume();
            let exponent = self.parse_unary()?;
            return Ok(Ast::Binary(Box::new(base), BinaryOp::Pow, Box::new(exponent)));
        }
        Ok(base)
    }

    fn parse_primary(&mut self) -> Result<Ast> {
        match self.consume() {
            Some(Token::Number(n)) => Ok(Ast::Number(n)),
            Some(Token::Identifier(name)) => {
                if let Some(Token::LParen) = self.peek() {
                    self.consume();
                    let arg = self.parse_expression()?;
                    self.expect_rparen()?;
                    Ok(Ast::Call(name, Box::new(arg)))
                } else {
                    Ok(Ast::Identifier(name))
                }
            }
            Some(Token::LParen) => {
                let expr = self.parse_expression()?;
                self.expect_rparen()?;
                Ok(expr)
            }
            Some(token) => Err(Error::Parse(format!("unexpected {token:?}"))),
            None => Err(Error::Parse("unexpected end of input".to_string())),
        }
    }
}
