mod eval;
mod id;
mod render;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use tracing::debug;

use tarplate_lib::VariableScope;
use tarplate_lib::vars::load::VarSources;

pub use eval::cmd_eval;
pub use id::cmd_id;
pub use render::cmd_render;

/// Template variable flags shared by every subcommand.
///
/// Later sources win: `TARPLATE_VAR_*` environment variables, then
/// `--var-file` files, then `--var` assignments.
#[derive(Debug, Clone, Default, Args)]
pub struct VarArgs {
  /// Set a template variable (repeatable)
  #[arg(long = "var", value_name = "NAME=VALUE")]
  pub assignments: Vec<String>,

  /// Load template variables from a JSON object file (repeatable)
  #[arg(long = "var-file", value_name = "PATH")]
  pub files: Vec<PathBuf>,

  /// Ignore TARPLATE_VAR_* environment variables
  #[arg(long)]
  pub no_env: bool,
}

impl VarArgs {
  pub fn scope(&self) -> Result<VariableScope> {
    let sources = VarSources {
      files: self.files.clone(),
      assignments: self.assignments.clone(),
      env: !self.no_env,
    };
    let scope = sources.resolve().context("Failed to load template variables")?;
    debug!(count = scope.len(), "template variables ready");
    Ok(scope)
  }
}
