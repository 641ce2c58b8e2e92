use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Untyped variables as supplied by the caller, before validation.
pub type RawVars = BTreeMap<String, serde_json::Value>;

/// Category of a value that cannot be used as a template variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarKind {
  List,
  Map,
  Null,
}

impl VarKind {
  pub fn as_str(self) -> &'static str {
    match self {
      VarKind::List => "list",
      VarKind::Map => "map",
      VarKind::Null => "null",
    }
  }
}

/// A variable rejected during validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BadVar {
  pub key: String,
  pub kind: VarKind,
}

impl fmt::Display for BadVar {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{} ({})", self.key, self.kind.as_str())
  }
}

fn join_bad_vars(vars: &[BadVar]) -> String {
  vars.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ")
}

/// Errors raised while collecting or validating variables.
#[derive(Debug, thiserror::Error)]
pub enum VarsError {
  /// One or more values are composite. Lists every offending key, not just the first.
  #[error("vars: cannot contain non-primitives; bad keys: {}", join_bad_vars(.0))]
  NonPrimitive(Vec<BadVar>),

  #[error("failed to read var file {}: {source}", .path.display())]
  ReadFile {
    path: std::path::PathBuf,
    source: std::io::Error,
  },

  #[error("failed to parse var file {}: {source}", .path.display())]
  ParseFile {
    path: std::path::PathBuf,
    source: serde_json::Error,
  },

  #[error("var file {} must contain a JSON object", .path.display())]
  NotAnObject { path: std::path::PathBuf },

  #[error("invalid variable assignment '{0}': expected NAME=VALUE")]
  InvalidAssignment(String),
}

/// A flat mapping from variable name to string value.
///
/// Ordered by name so that anything derived from it (debug output, JSON) is
/// stable across runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariableScope(BTreeMap<String, String>);

impl VariableScope {
  pub fn new() -> Self {
    Self::default()
  }

  /// Validate raw values and build a scope from them.
  ///
  /// Strings are taken as-is, numbers and booleans use their JSON text. Lists,
  /// maps and nulls are collected and reported together.
  pub fn from_raw(raw: &RawVars) -> Result<Self, VarsError> {
    let mut scope = BTreeMap::new();
    let mut bad = Vec::new();

    for (key, value) in raw {
      let kind = match value {
        serde_json::Value::String(s) => {
          scope.insert(key.clone(), s.clone());
          continue;
        }
        serde_json::Value::Number(n) => {
          scope.insert(key.clone(), n.to_string());
          continue;
        }
        serde_json::Value::Bool(b) => {
          scope.insert(key.clone(), b.to_string());
          continue;
        }
        serde_json::Value::Array(_) => VarKind::List,
        serde_json::Value::Object(_) => VarKind::Map,
        serde_json::Value::Null => VarKind::Null,
      };
      bad.push(BadVar { key: key.clone(), kind });
    }

    if !bad.is_empty() {
      return Err(VarsError::NonPrimitive(bad));
    }

    Ok(Self(scope))
  }

  pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) -> Option<String> {
    self.0.insert(name.into(), value.into())
  }

  pub fn get(&self, name: &str) -> Option<&str> {
    self.0.get(name).map(String::as_str)
  }

  pub fn len(&self) -> usize {
    self.0.len()
  }

  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }

  pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
    self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
  }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for VariableScope {
  fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
    Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
  }
}
