use std::path::Path;

use anyhow::{Context, Result};

use tarplate_lib::Archiver;

use super::VarArgs;

pub fn cmd_id(source: &Path, vars: &VarArgs) -> Result<()> {
  let scope = vars.scope()?;
  let rendered = Archiver::new()
    .render_dir(source, &scope)
    .with_context(|| format!("Failed to build archive from {}", source.display()))?;

  println!("{}", rendered.identity);
  Ok(())
}
