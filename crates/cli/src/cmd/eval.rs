//! Implementation of the `tarplate eval` command.
//!
//! Renders a single file with the same evaluator the archive builder uses,
//! which is handy for checking a template before archiving a whole tree.

use std::fs;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};

use tarplate_lib::template::render;

use super::VarArgs;

pub fn cmd_eval(file: &Path, vars: &VarArgs) -> Result<()> {
  let scope = vars.scope()?;

  let text = fs::read_to_string(file).with_context(|| format!("Failed to read template: {}", file.display()))?;
  let rendered = render(&text, &scope).with_context(|| format!("Failed to render {}", file.display()))?;

  let mut out = std::io::stdout().lock();
  out.write_all(rendered.as_bytes()).context("Failed to write output")?;
  Ok(())
}
