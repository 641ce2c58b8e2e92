//! Implementation of the `tarplate render` command.
//!
//! Builds the archive for a source directory, optionally persists it, and
//! reports its identity.

use std::fs;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};

use tarplate_lib::Archiver;

use super::VarArgs;
use crate::output::{OutputFormat, format_bytes, print_json, print_stat, print_success, print_warning};

pub fn cmd_render(
  source: &Path,
  vars: &VarArgs,
  output: Option<&Path>,
  stdout: bool,
  parallel: bool,
  format: OutputFormat,
) -> Result<()> {
  let scope = vars.scope()?;

  let rendered = Archiver::new()
    .parallel(parallel)
    .render_dir(source, &scope)
    .with_context(|| format!("Failed to build archive from {}", source.display()))?;

  if stdout {
    let mut out = std::io::stdout().lock();
    out.write_all(&rendered.bytes).context("Failed to write archive to stdout")?;
    out.flush().context("Failed to write archive to stdout")?;
    eprintln!("{}", rendered.identity);
    return Ok(());
  }

  if let Some(path) = output {
    fs::write(path, &rendered.bytes).with_context(|| format!("Failed to write archive: {}", path.display()))?;
  }

  if format.is_json() {
    let json_output = serde_json::json!({
      "id": &rendered.identity,
      "size": rendered.bytes.len(),
      "files": rendered.files,
      "directories": rendered.directories,
      "output": output.map(|p| p.display().to_string()),
    });
    print_json(&json_output)?;
    return Ok(());
  }

  if rendered.files == 0 && rendered.directories == 0 {
    print_warning(&format!("{} is empty; the archive has no entries", source.display()));
  }

  print_success(&format!("Rendered {} ({})", source.display(), rendered.identity.short()));
  print_stat("Id", rendered.identity.as_str());
  print_stat("Size", &format_bytes(rendered.bytes.len() as u64));
  print_stat("Files", &rendered.files.to_string());
  print_stat("Directories", &rendered.directories.to_string());
  if let Some(path) = output {
    print_stat("Output", &path.display().to_string());
  }

  Ok(())
}
