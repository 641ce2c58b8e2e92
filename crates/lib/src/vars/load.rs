//! Variable sources.
//!
//! Variables are layered, later sources override earlier ones:
//!
//! 1. `TARPLATE_VAR_<name>` environment variables
//! 2. JSON var files, in the order given
//! 3. `NAME=VALUE` assignments, in the order given

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::types::{RawVars, VariableScope, VarsError};
use crate::consts::VAR_ENV_PREFIX;

/// Read a JSON object of variables from disk.
///
/// Values are not validated here; composites surface later in
/// [`VariableScope::from_raw`] together with every other offending key.
pub fn load_var_file(path: &Path) -> Result<RawVars, VarsError> {
  let content = fs::read_to_string(path).map_err(|source| VarsError::ReadFile {
    path: path.to_path_buf(),
    source,
  })?;

  let value: serde_json::Value = serde_json::from_str(&content).map_err(|source| VarsError::ParseFile {
    path: path.to_path_buf(),
    source,
  })?;

  match value {
    serde_json::Value::Object(map) => Ok(map.into_iter().collect()),
    _ => Err(VarsError::NotAnObject {
      path: path.to_path_buf(),
    }),
  }
}

/// Split a `NAME=VALUE` assignment. The value may itself contain `=`.
pub fn parse_assignment(assignment: &str) -> Result<(String, String), VarsError> {
  match assignment.split_once('=') {
    Some((name, value)) if !name.trim().is_empty() => Ok((name.trim().to_string(), value.to_string())),
    _ => Err(VarsError::InvalidAssignment(assignment.to_string())),
  }
}

/// Collect `TARPLATE_VAR_*` variables from the process environment.
///
/// Entries whose name or value is not valid Unicode are skipped.
pub fn vars_from_env() -> RawVars {
  std::env::vars_os()
    .filter_map(|(key, value)| {
      let key = key.into_string().ok()?;
      let name = key.strip_prefix(VAR_ENV_PREFIX)?;
      if name.is_empty() {
        return None;
      }
      let value = value.into_string().ok()?;
      Some((name.to_string(), serde_json::Value::String(value)))
    })
    .collect()
}

/// Every place a caller can supply variables from.
#[derive(Debug, Clone, Default)]
pub struct VarSources {
  /// JSON files holding a single object of variables.
  pub files: Vec<PathBuf>,
  /// `NAME=VALUE` assignments.
  pub assignments: Vec<String>,
  /// Whether to read `TARPLATE_VAR_*` from the environment.
  pub env: bool,
}

impl VarSources {
  /// Merge all sources and validate the result into a scope.
  pub fn resolve(&self) -> Result<VariableScope, VarsError> {
    let mut merged = if self.env { vars_from_env() } else { RawVars::new() };
    let from_env = merged.len();

    for file in &self.files {
      let vars = load_var_file(file)?;
      debug!(path = ?file, count = vars.len(), "loaded var file");
      merged.extend(vars);
    }

    for assignment in &self.assignments {
      let (name, value) = parse_assignment(assignment)?;
      merged.insert(name, serde_json::Value::String(value));
    }

    debug!(
      from_env,
      files = self.files.len(),
      assignments = self.assignments.len(),
      total = merged.len(),
      "resolved variables"
    );

    VariableScope::from_raw(&merged)
  }
}
