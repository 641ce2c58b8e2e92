//! Function table for template expressions.
//!
//! Functions are looked up by name in an explicit [`FuncTable`] passed to the
//! evaluator. Callers can start from [`FuncTable::builtins`], register their
//! own, or remove entries to restrict what templates may call.

use std::collections::BTreeMap;
use std::fmt;

use sha2::{Digest, Sha256};

use super::eval::{Number, to_number};
use super::types::{Arity, Value};

/// Signature of a template function. Errors are plain messages; the evaluator
/// attaches the function name.
pub type FuncBody = dyn Fn(&[Value]) -> Result<Value, String> + Send + Sync;

/// A callable registered in a [`FuncTable`].
pub struct Func {
  arity: Arity,
  body: Box<FuncBody>,
}

impl Func {
  pub fn new(arity: Arity, body: impl Fn(&[Value]) -> Result<Value, String> + Send + Sync + 'static) -> Self {
    Self {
      arity,
      body: Box::new(body),
    }
  }

  pub fn arity(&self) -> Arity {
    self.arity
  }

  /// Invoke the body. Argument counts the arity rejects never reach it.
  pub fn call(&self, args: &[Value]) -> Result<Value, String> {
    if !self.arity.accepts(args.len()) {
      return Err(format!("expected {} argument(s), got {}", self.arity, args.len()));
    }
    (self.body)(args)
  }
}

impl fmt::Debug for Func {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Func").field("arity", &self.arity).finish_non_exhaustive()
  }
}

/// Named functions available to expressions.
#[derive(Debug, Default)]
pub struct FuncTable {
  funcs: BTreeMap<String, Func>,
}

impl FuncTable {
  /// An empty table. Templates may still use variables and arithmetic.
  pub fn new() -> Self {
    Self::default()
  }

  /// The standard set of string, list and numeric helpers.
  pub fn builtins() -> Self {
    let mut table = Self::new();
    table.register("upper", Arity::Exact(1), |args| Ok(str_arg(args, 0)?.to_uppercase().into()));
    table.register("lower", Arity::Exact(1), |args| Ok(str_arg(args, 0)?.to_lowercase().into()));
    table.register("title", Arity::Exact(1), |args| Ok(title_case(&str_arg(args, 0)?).into()));
    table.register("trimspace", Arity::Exact(1), |args| {
      Ok(str_arg(args, 0)?.trim().into())
    });
    table.register("chomp", Arity::Exact(1), |args| {
      Ok(str_arg(args, 0)?.trim_end_matches(['\r', '\n']).into())
    });
    table.register("replace", Arity::Exact(3), |args| {
      let (s, from, to) = (str_arg(args, 0)?, str_arg(args, 1)?, str_arg(args, 2)?);
      if from.is_empty() {
        return Err("search string must not be empty".to_string());
      }
      Ok(s.replace(&from, &to).into())
    });
    table.register("substr", Arity::Exact(3), substr);
    table.register("split", Arity::Exact(2), |args| {
      let (sep, s) = (str_arg(args, 0)?, str_arg(args, 1)?);
      if sep.is_empty() {
        return Err("separator must not be empty".to_string());
      }
      Ok(Value::List(s.split(sep.as_str()).map(Value::from).collect()))
    });
    table.register("join", Arity::AtLeast(2), |args| {
      let sep = str_arg(args, 0)?;
      let mut items = Vec::new();
      for i in 1..args.len() {
        for item in list_arg(args, i)? {
          items.push(item.to_output_string().map_err(|e| e.to_string())?);
        }
      }
      Ok(items.join(&sep).into())
    });
    table.register("concat", Arity::AtLeast(1), |args| {
      let mut items = Vec::new();
      for i in 0..args.len() {
        items.extend(list_arg(args, i)?.iter().cloned());
      }
      Ok(Value::List(items))
    });
    table.register("length", Arity::Exact(1), |args| {
      let len = match arg(args, 0)? {
        Value::List(items) => items.len(),
        other => other.to_output_string().map_err(|e| e.to_string())?.chars().count(),
      };
      Ok(Value::Int(len as i64))
    });
    table.register("element", Arity::Exact(2), |args| {
      let items = list_arg(args, 0)?;
      if items.is_empty() {
        return Err("cannot take an element of an empty list".to_string());
      }
      let index = int_arg(args, 1)?;
      if index < 0 {
        return Err(format!("index must not be negative, got {index}"));
      }
      Ok(items[index as usize % items.len()].clone())
    });
    table.register("min", Arity::AtLeast(1), |args| fold_numbers(args, f64::min, i64::min));
    table.register("max", Arity::AtLeast(1), |args| fold_numbers(args, f64::max, i64::max));
    table.register("abs", Arity::Exact(1), |args| match num_arg(args, 0)? {
      Number::Int(i) => i.checked_abs().map(Value::Int).ok_or_else(|| "integer overflow".to_string()),
      Number::Float(f) => Ok(Value::Float(f.abs())),
    });
    table.register("ceil", Arity::Exact(1), |args| round_with(args, f64::ceil));
    table.register("floor", Arity::Exact(1), |args| round_with(args, f64::floor));
    table.register("sha256", Arity::Exact(1), |args| {
      let digest = Sha256::digest(str_arg(args, 0)?.as_bytes());
      Ok(hex::encode(digest).into())
    });
    table.register("format", Arity::AtLeast(1), format);
    table
  }

  /// Add or replace a function.
  pub fn register(
    &mut self,
    name: impl Into<String>,
    arity: Arity,
    body: impl Fn(&[Value]) -> Result<Value, String> + Send + Sync + 'static,
  ) -> &mut Self {
    self.funcs.insert(name.into(), Func::new(arity, body));
    self
  }

  /// Remove a function, returning whether it was present.
  pub fn remove(&mut self, name: &str) -> bool {
    self.funcs.remove(name).is_some()
  }

  pub fn get(&self, name: &str) -> Option<&Func> {
    self.funcs.get(name)
  }

  pub fn contains(&self, name: &str) -> bool {
    self.funcs.contains_key(name)
  }

  pub fn names(&self) -> impl Iterator<Item = &str> {
    self.funcs.keys().map(String::as_str)
  }
}

fn arg(args: &[Value], index: usize) -> Result<&Value, String> {
  args.get(index).ok_or_else(|| format!("missing argument {}", index + 1))
}

fn str_arg(args: &[Value], index: usize) -> Result<String, String> {
  arg(args, index)?.to_output_string().map_err(|e| e.to_string())
}

fn num_arg(args: &[Value], index: usize) -> Result<Number, String> {
  let value = arg(args, index)?;
  to_number(',', value.clone())
    .map_err(|_| format!("argument {} must be a number, got {}", index + 1, value.type_name()))
}

fn int_arg(args: &[Value], index: usize) -> Result<i64, String> {
  match num_arg(args, index)? {
    Number::Int(i) => Ok(i),
    Number::Float(f) => Err(format!("argument {} must be an integer, got {}", index + 1, f)),
  }
}

fn list_arg(args: &[Value], index: usize) -> Result<&[Value], String> {
  match arg(args, index)? {
    Value::List(items) => Ok(items),
    other => Err(format!("argument {} must be a list, got {}", index + 1, other.type_name())),
  }
}

fn title_case(s: &str) -> String {
  let mut out = String::with_capacity(s.len());
  let mut at_word_start = true;
  for ch in s.chars() {
    if at_word_start {
      out.extend(ch.to_uppercase());
    } else {
      out.push(ch);
    }
    at_word_start = !ch.is_alphanumeric();
  }
  out
}

/// `substr(string, offset, length)`: a negative offset counts from the end,
/// a length of -1 takes the rest of the string.
fn substr(args: &[Value]) -> Result<Value, String> {
  let chars: Vec<char> = str_arg(args, 0)?.chars().collect();
  let len = chars.len() as i64;
  let mut offset = int_arg(args, 1)?;
  let length = int_arg(args, 2)?;

  if offset < 0 {
    offset += len;
  }
  if offset < 0 || offset > len {
    return Err(format!("offset {} is out of range for a string of length {}", offset, len));
  }

  let end = match length {
    -1 => len,
    n if n < 0 => return Err(format!("length must be -1 or greater, got {}", n)),
    n => offset.saturating_add(n),
  };
  if end > len {
    return Err(format!("offset {} + length {} exceeds string length {}", offset, length, len));
  }

  Ok(chars[offset as usize..end as usize].iter().collect::<String>().into())
}

fn fold_numbers(args: &[Value], float_op: fn(f64, f64) -> f64, int_op: fn(i64, i64) -> i64) -> Result<Value, String> {
  let numbers = (0..args.len()).map(|i| num_arg(args, i)).collect::<Result<Vec<_>, _>>()?;

  if numbers.iter().all(|n| matches!(n, Number::Int(_))) {
    let ints = numbers.iter().map(|n| match n {
      Number::Int(i) => *i,
      Number::Float(f) => *f as i64,
    });
    return ints.reduce(int_op).map(Value::Int).ok_or_else(|| "no arguments".to_string());
  }

  numbers
    .iter()
    .map(|n| n.as_f64())
    .reduce(float_op)
    .map(Value::Float)
    .ok_or_else(|| "no arguments".to_string())
}

fn round_with(args: &[Value], round: fn(f64) -> f64) -> Result<Value, String> {
  match num_arg(args, 0)? {
    Number::Int(i) => Ok(Value::Int(i)),
    Number::Float(f) => {
      let rounded = round(f);
      if !rounded.is_finite() || rounded < i64::MIN as f64 || rounded > i64::MAX as f64 {
        return Err(format!("{} is out of integer range", f));
      }
      Ok(Value::Int(rounded as i64))
    }
  }
}

/// `format(spec, args...)` with `%s`, `%v`, `%d` and `%%` verbs.
fn format(args: &[Value]) -> Result<Value, String> {
  let spec = str_arg(args, 0)?;
  let mut out = String::new();
  let mut next = 1;
  let mut chars = spec.chars();

  while let Some(ch) = chars.next() {
    if ch != '%' {
      out.push(ch);
      continue;
    }
    let verb = chars.next().ok_or_else(|| "format string ends with '%'".to_string())?;
    if verb == '%' {
      out.push('%');
      continue;
    }
    if next >= args.len() {
      return Err(format!("not enough arguments for format string {:?}", spec));
    }
    match verb {
      's' | 'v' => out.push_str(&str_arg(args, next)?),
      'd' => out.push_str(&int_arg(args, next)?.to_string()),
      other => return Err(format!("unsupported format verb '%{}'", other)),
    }
    next += 1;
  }

  if next < args.len() {
    return Err(format!(
      "too many arguments for format string {:?}: {} unused",
      spec,
      args.len() - next
    ));
  }

  Ok(out.into())
}
