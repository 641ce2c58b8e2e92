//! Template parsing.
//!
//! # Syntax
//!
//! - `${ expr }` - interpolate the value of `expr`
//! - `$${` - a literal `${`
//!
//! Any other `$` passes through unchanged, so shell variables like `$HOME`
//! need no escaping.
//!
//! # Expressions
//!
//! ```text
//! expr    := term (('+' | '-') term)*
//! term    := unary (('*' | '/' | '%') unary)*
//! unary   := '-' unary | primary
//! primary := INT | FLOAT | STRING | IDENT | IDENT '(' args? ')' | '(' expr ')'
//! ```
//!
//! String literals accept `\"`, `\\`, `\n`, `\r`, `\t` and may contain nested
//! interpolations.

use super::types::{BinaryOp, Expr, Part, Template, TemplateError};
use crate::consts::MAX_EXPR_DEPTH;

/// Parse template text into a [`Template`].
///
/// # Errors
///
/// Returns an error if an interpolation is unclosed, empty, holds a
/// malformed expression, or nests deeper than [`MAX_EXPR_DEPTH`]. Offsets in
/// errors are byte offsets into `input`.
pub fn parse(input: &str) -> Result<Template, TemplateError> {
  let mut parser = Parser {
    src: input,
    pos: 0,
    depth: 0,
  };
  let parts = parser.parse_parts(Context::TopLevel)?;
  Ok(Template { parts })
}

/// Where a run of literal text ends.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Context {
  /// Runs to end of input.
  TopLevel,
  /// Runs to the closing quote; the offset is the opening quote.
  Quoted(usize),
}

struct Parser<'a> {
  src: &'a str,
  pos: usize,
  /// Nesting of the expression being parsed. Bounds the recursion here and
  /// the depth of the tree the evaluator later walks.
  depth: usize,
}

impl Parser<'_> {
  fn rest(&self) -> &str {
    &self.src[self.pos..]
  }

  fn peek(&self) -> Option<char> {
    self.rest().chars().next()
  }

  fn bump(&mut self) -> Option<char> {
    let ch = self.peek()?;
    self.pos += ch.len_utf8();
    Some(ch)
  }

  fn skip_whitespace(&mut self) {
    while let Some(ch) = self.peek() {
      if !ch.is_whitespace() {
        break;
      }
      self.pos += ch.len_utf8();
    }
  }

  fn descend(&mut self) -> Result<(), TemplateError> {
    self.depth += 1;
    if self.depth > MAX_EXPR_DEPTH {
      return Err(TemplateError::TooDeep {
        pos: self.pos,
        limit: MAX_EXPR_DEPTH,
      });
    }
    Ok(())
  }

  fn unexpected(&self) -> TemplateError {
    match self.peek() {
      Some(ch) => TemplateError::UnexpectedChar { ch, pos: self.pos },
      None => TemplateError::UnexpectedEnd,
    }
  }

  fn parse_parts(&mut self, ctx: Context) -> Result<Vec<Part>, TemplateError> {
    let mut parts = Vec::new();
    let mut literal = String::new();

    loop {
      let rest = self.rest();

      if rest.starts_with("$${") {
        // Escaped: $${ -> ${ (literal)
        literal.push_str("${");
        self.pos += 3;
        continue;
      }

      if rest.starts_with("${") {
        let start = self.pos;
        self.pos += 2;

        if !literal.is_empty() {
          parts.push(Part::Literal(std::mem::take(&mut literal)));
        }

        let expr = self.parse_interpolation(start)?;
        parts.push(Part::Interpolation(expr));
        continue;
      }

      match (ctx, self.bump()) {
        (Context::TopLevel, None) => break,
        (Context::Quoted(open), None) => return Err(TemplateError::UnterminatedString(open)),
        (Context::Quoted(_), Some('"')) => break,
        (Context::Quoted(_), Some('\\')) => {
          let escape_pos = self.pos - 1;
          let escaped = match self.bump() {
            Some('"') => '"',
            Some('\\') => '\\',
            Some('n') => '\n',
            Some('r') => '\r',
            Some('t') => '\t',
            Some(ch) => return Err(TemplateError::InvalidEscape { ch, pos: escape_pos }),
            None => return Err(TemplateError::UnexpectedEnd),
          };
          literal.push(escaped);
        }
        (_, Some(ch)) => literal.push(ch),
      }
    }

    if !literal.is_empty() {
      parts.push(Part::Literal(literal));
    }

    Ok(parts)
  }

  /// Parse the body of `${ ... }`; `start` is the offset of the `$`.
  fn parse_interpolation(&mut self, start: usize) -> Result<Expr, TemplateError> {
    self.skip_whitespace();
    match self.peek() {
      None => return Err(TemplateError::Unclosed(start)),
      Some('}') => return Err(TemplateError::Empty(start)),
      Some(_) => {}
    }

    let expr = self.parse_expr().map_err(|e| match e {
      TemplateError::UnexpectedEnd => TemplateError::Unclosed(start),
      other => other,
    })?;

    self.skip_whitespace();
    match self.bump() {
      Some('}') => Ok(expr),
      None => Err(TemplateError::Unclosed(start)),
      Some(ch) => Err(TemplateError::UnexpectedChar {
        ch,
        pos: self.pos - ch.len_utf8(),
      }),
    }
  }

  // Each operator in a chain adds a level: the tree is left-deep.
  fn parse_expr(&mut self) -> Result<Expr, TemplateError> {
    let entry_depth = self.depth;
    self.descend()?;
    let mut lhs = self.parse_term()?;
    loop {
      self.skip_whitespace();
      let op = match self.peek() {
        Some('+') => BinaryOp::Add,
        Some('-') => BinaryOp::Sub,
        _ => {
          self.depth = entry_depth;
          return Ok(lhs);
        }
      };
      self.bump();
      self.descend()?;
      let rhs = self.parse_term()?;
      lhs = Expr::Binary {
        op,
        lhs: Box::new(lhs),
        rhs: Box::new(rhs),
      };
    }
  }

  fn parse_term(&mut self) -> Result<Expr, TemplateError> {
    let entry_depth = self.depth;
    let mut lhs = self.parse_unary()?;
    loop {
      self.skip_whitespace();
      let op = match self.peek() {
        Some('*') => BinaryOp::Mul,
        Some('/') => BinaryOp::Div,
        Some('%') => BinaryOp::Mod,
        _ => {
          self.depth = entry_depth;
          return Ok(lhs);
        }
      };
      self.bump();
      self.descend()?;
      let rhs = self.parse_unary()?;
      lhs = Expr::Binary {
        op,
        lhs: Box::new(lhs),
        rhs: Box::new(rhs),
      };
    }
  }

  fn parse_unary(&mut self) -> Result<Expr, TemplateError> {
    self.skip_whitespace();
    if self.peek() == Some('-') {
      self.bump();
      self.descend()?;
      let operand = self.parse_unary()?;
      self.depth -= 1;
      return Ok(Expr::Neg(Box::new(operand)));
    }
    self.parse_primary()
  }

  fn parse_primary(&mut self) -> Result<Expr, TemplateError> {
    self.skip_whitespace();
    match self.peek() {
      Some(ch) if ch.is_ascii_digit() => self.parse_number(),
      Some(ch) if ch.is_ascii_alphabetic() || ch == '_' => self.parse_ident_or_call(),
      Some('"') => {
        let open = self.pos;
        self.bump();
        let parts = self.parse_parts(Context::Quoted(open))?;
        Ok(Expr::Str(parts))
      }
      Some('(') => {
        self.bump();
        let inner = self.parse_expr()?;
        self.skip_whitespace();
        if self.peek() != Some(')') {
          return Err(self.unexpected());
        }
        self.bump();
        Ok(inner)
      }
      _ => Err(self.unexpected()),
    }
  }

  fn parse_number(&mut self) -> Result<Expr, TemplateError> {
    let start = self.pos;
    self.consume_digits();

    let mut is_float = false;
    let rest = self.rest();
    if rest.starts_with('.') && rest[1..].starts_with(|c: char| c.is_ascii_digit()) {
      is_float = true;
      self.bump();
      self.consume_digits();
    }

    let literal = &self.src[start..self.pos];
    let invalid = || TemplateError::InvalidNumber {
      literal: literal.to_string(),
      pos: start,
    };

    if is_float {
      literal.parse::<f64>().map(Expr::Float).map_err(|_| invalid())
    } else {
      literal.parse::<i64>().map(Expr::Int).map_err(|_| invalid())
    }
  }

  fn consume_digits(&mut self) {
    while self.peek().is_some_and(|c| c.is_ascii_digit()) {
      self.bump();
    }
  }

  fn parse_ident_or_call(&mut self) -> Result<Expr, TemplateError> {
    let start = self.pos;
    while self
      .peek()
      .is_some_and(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.')
    {
      self.bump();
    }
    let name = self.src[start..self.pos].to_string();

    self.skip_whitespace();
    if self.peek() != Some('(') {
      return Ok(Expr::Var(name));
    }
    self.bump();

    let mut args = Vec::new();
    self.skip_whitespace();
    if self.peek() == Some(')') {
      self.bump();
      return Ok(Expr::Call { name, args });
    }

    loop {
      args.push(self.parse_expr()?);
      self.skip_whitespace();
      match self.bump() {
        Some(',') => continue,
        Some(')') => break,
        Some(ch) => {
          return Err(TemplateError::UnexpectedChar {
            ch,
            pos: self.pos - ch.len_utf8(),
          });
        }
        None => return Err(TemplateError::UnexpectedEnd),
      }
    }

    Ok(Expr::Call { name, args })
  }
}
