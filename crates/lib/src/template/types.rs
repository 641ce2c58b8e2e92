use std::fmt;

use thiserror::Error;

/// A parsed template: literal text interleaved with interpolations.
#[derive(Debug, Clone, PartialEq)]
pub struct Template {
  pub parts: Vec<Part>,
}

/// A segment of parsed text.
#[derive(Debug, Clone, PartialEq)]
pub enum Part {
  /// Literal text, already unescaped.
  Literal(String),

  /// A `${ ... }` interpolation.
  Interpolation(Expr),
}

/// An expression inside an interpolation.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
  Int(i64),
  Float(f64),

  /// A quoted string, which may itself contain interpolations.
  Str(Vec<Part>),

  /// A variable reference resolved against the scope.
  Var(String),

  /// A call into the function table.
  Call { name: String, args: Vec<Expr> },

  Neg(Box<Expr>),

  Binary {
    op: BinaryOp,
    lhs: Box<Expr>,
    rhs: Box<Expr>,
  },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
  Add,
  Sub,
  Mul,
  Div,
  Mod,
}

impl BinaryOp {
  pub fn symbol(self) -> char {
    match self {
      BinaryOp::Add => '+',
      BinaryOp::Sub => '-',
      BinaryOp::Mul => '*',
      BinaryOp::Div => '/',
      BinaryOp::Mod => '%',
    }
  }
}

/// A runtime value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
  String(String),
  Int(i64),
  Float(f64),
  List(Vec<Value>),
}

impl Value {
  pub fn type_name(&self) -> &'static str {
    match self {
      Value::String(_) => "string",
      Value::Int(_) => "int",
      Value::Float(_) => "float",
      Value::List(_) => "list",
    }
  }

  /// Convert to the text written into the rendered output.
  pub fn to_output_string(&self) -> Result<String, TemplateError> {
    match self {
      Value::String(s) => Ok(s.clone()),
      Value::Int(i) => Ok(i.to_string()),
      Value::Float(f) => Ok(f.to_string()),
      Value::List(_) => Err(TemplateError::NotStringCoercible(self.type_name())),
    }
  }
}

impl From<String> for Value {
  fn from(s: String) -> Self {
    Value::String(s)
  }
}

impl From<&str> for Value {
  fn from(s: &str) -> Self {
    Value::String(s.to_string())
  }
}

impl From<i64> for Value {
  fn from(i: i64) -> Self {
    Value::Int(i)
  }
}

impl From<f64> for Value {
  fn from(f: f64) -> Self {
    Value::Float(f)
  }
}

/// Errors that can occur while parsing or evaluating a template.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TemplateError {
  #[error("unclosed interpolation starting at offset {0}")]
  Unclosed(usize),

  #[error("empty interpolation at offset {0}")]
  Empty(usize),

  #[error("unterminated string literal starting at offset {0}")]
  UnterminatedString(usize),

  #[error("invalid escape sequence '\\{ch}' at offset {pos}")]
  InvalidEscape { ch: char, pos: usize },

  #[error("unexpected character '{ch}' at offset {pos}")]
  UnexpectedChar { ch: char, pos: usize },

  #[error("expression nested too deeply at offset {pos} (limit {limit})")]
  TooDeep { pos: usize, limit: usize },

  #[error("unexpected end of expression")]
  UnexpectedEnd,

  #[error("invalid number literal '{literal}' at offset {pos}")]
  InvalidNumber { literal: String, pos: usize },

  #[error("unknown variable accessed: {0}")]
  UndefinedVariable(String),

  #[error("unknown function called: {0}")]
  UnknownFunction(String),

  #[error("{name}: expected {expected} argument(s), got {got}")]
  Arity { name: String, expected: Arity, got: usize },

  #[error("operator '{op}' cannot use {found} value {value:?} as a number")]
  TypeMismatch { op: char, found: &'static str, value: String },

  #[error("division by zero")]
  DivisionByZero,

  #[error("integer overflow evaluating '{0}'")]
  Overflow(char),

  #[error("expression result of type {0} cannot be converted to a string")]
  NotStringCoercible(&'static str),

  #[error("{name}: {message}")]
  Function { name: String, message: String },
}

/// How many arguments a function accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
  Exact(usize),
  AtLeast(usize),
}

impl Arity {
  pub fn accepts(self, count: usize) -> bool {
    match self {
      Arity::Exact(n) => count == n,
      Arity::AtLeast(n) => count >= n,
    }
  }
}

impl fmt::Display for Arity {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Arity::Exact(n) => write!(f, "{}", n),
      Arity::AtLeast(n) => write!(f, "at least {}", n),
    }
  }
}
