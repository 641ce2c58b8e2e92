//! Template evaluation.

use super::funcs::FuncTable;
use super::types::{BinaryOp, Expr, Part, Template, TemplateError, Value};
use crate::vars::VariableScope;

/// Everything an expression can see while it is evaluated.
#[derive(Clone, Copy)]
pub struct EvalContext<'a> {
  pub vars: &'a VariableScope,
  pub funcs: &'a FuncTable,
}

impl<'a> EvalContext<'a> {
  pub fn new(vars: &'a VariableScope, funcs: &'a FuncTable) -> Self {
    Self { vars, funcs }
  }
}

/// Evaluate a parsed template to its output text.
pub fn evaluate(template: &Template, ctx: &EvalContext<'_>) -> Result<String, TemplateError> {
  eval_parts(&template.parts, ctx)
}

fn eval_parts(parts: &[Part], ctx: &EvalContext<'_>) -> Result<String, TemplateError> {
  let mut out = String::new();
  for part in parts {
    match part {
      Part::Literal(s) => out.push_str(s),
      Part::Interpolation(expr) => out.push_str(&eval_expr(expr, ctx)?.to_output_string()?),
    }
  }
  Ok(out)
}

pub(crate) fn eval_expr(expr: &Expr, ctx: &EvalContext<'_>) -> Result<Value, TemplateError> {
  match expr {
    Expr::Int(i) => Ok(Value::Int(*i)),
    Expr::Float(f) => Ok(Value::Float(*f)),
    Expr::Str(parts) => Ok(Value::String(eval_parts(parts, ctx)?)),
    Expr::Var(name) => ctx
      .vars
      .get(name)
      .map(Value::from)
      .ok_or_else(|| TemplateError::UndefinedVariable(name.clone())),
    Expr::Call { name, args } => {
      let func = ctx
        .funcs
        .get(name)
        .ok_or_else(|| TemplateError::UnknownFunction(name.clone()))?;
      if !func.arity().accepts(args.len()) {
        return Err(TemplateError::Arity {
          name: name.clone(),
          expected: func.arity(),
          got: args.len(),
        });
      }
      let values = args
        .iter()
        .map(|arg| eval_expr(arg, ctx))
        .collect::<Result<Vec<_>, _>>()?;
      func.call(&values).map_err(|message| TemplateError::Function {
        name: name.clone(),
        message,
      })
    }
    Expr::Neg(operand) => match to_number('-', eval_expr(operand, ctx)?)? {
      Number::Int(i) => i.checked_neg().map(Value::Int).ok_or(TemplateError::Overflow('-')),
      Number::Float(f) => Ok(Value::Float(-f)),
    },
    Expr::Binary { op, lhs, rhs } => {
      let lhs = to_number(op.symbol(), eval_expr(lhs, ctx)?)?;
      let rhs = to_number(op.symbol(), eval_expr(rhs, ctx)?)?;
      arithmetic(*op, lhs, rhs)
    }
  }
}

#[derive(Debug, Clone, Copy)]
pub(crate) enum Number {
  Int(i64),
  Float(f64),
}

impl Number {
  pub(crate) fn as_f64(self) -> f64 {
    match self {
      Number::Int(i) => i as f64,
      Number::Float(f) => f,
    }
  }
}

/// Interpret a value as a number. Strings are converted implicitly, trying an
/// integer first and then a float.
pub(crate) fn to_number(op: char, value: Value) -> Result<Number, TemplateError> {
  match value {
    Value::Int(i) => Ok(Number::Int(i)),
    Value::Float(f) => Ok(Number::Float(f)),
    Value::String(s) => {
      if let Ok(i) = s.parse::<i64>() {
        Ok(Number::Int(i))
      } else if let Ok(f) = s.parse::<f64>() {
        Ok(Number::Float(f))
      } else {
        Err(TemplateError::TypeMismatch {
          op,
          found: "string",
          value: s,
        })
      }
    }
    Value::List(_) => Err(TemplateError::TypeMismatch {
      op,
      found: "list",
      value: "[...]".to_string(),
    }),
  }
}

fn arithmetic(op: BinaryOp, lhs: Number, rhs: Number) -> Result<Value, TemplateError> {
  match (lhs, rhs) {
    (Number::Int(a), Number::Int(b)) => {
      let result = match op {
        BinaryOp::Add => a.checked_add(b),
        BinaryOp::Sub => a.checked_sub(b),
        BinaryOp::Mul => a.checked_mul(b),
        BinaryOp::Div | BinaryOp::Mod if b == 0 => return Err(TemplateError::DivisionByZero),
        BinaryOp::Div => a.checked_div(b),
        BinaryOp::Mod => a.checked_rem(b),
      };
      result.map(Value::Int).ok_or(TemplateError::Overflow(op.symbol()))
    }
    (a, b) => {
      let (a, b) = (a.as_f64(), b.as_f64());
      let result = match op {
        BinaryOp::Add => a + b,
        BinaryOp::Sub => a - b,
        BinaryOp::Mul => a * b,
        BinaryOp::Div | BinaryOp::Mod if b == 0.0 => return Err(TemplateError::DivisionByZero),
        BinaryOp::Div => a / b,
        BinaryOp::Mod => a % b,
      };
      Ok(Value::Float(result))
    }
  }
}
