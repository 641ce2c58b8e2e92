//! Archive construction.
//!
//! Walks a source tree, renders every file through the template engine and
//! writes the results into a tar stream in traversal order. The output is
//! all-or-nothing: any traversal or render failure, or a cancellation,
//! discards whatever was written.
//!
//! # Submodules
//!
//! - [`header`] - normalized per-entry tar headers

pub mod header;

use std::io;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::cancel::CancelToken;
use crate::template::{EvalContext, FuncTable, TemplateError, render_with};
use crate::util::hash::{ContentHash, hash_bytes};
use crate::vars::VariableScope;
use crate::walk::{EntryKind, TreeEntry, WalkError, walk};

pub use header::ArchiveHeader;

/// Errors that abort an archive build.
#[derive(Debug, thiserror::Error)]
pub enum ArchiveError {
  #[error("traversal failed: {0}")]
  Traversal(#[from] WalkError),

  #[error("failed to render {}: {source}", .path.display())]
  Render { path: PathBuf, source: TemplateError },

  #[error("cannot render {}: content is not valid UTF-8", .path.display())]
  InvalidUtf8 { path: PathBuf },

  #[error("failed to write archive entry {path}: {source}")]
  Write { path: String, source: io::Error },

  #[error("failed to finish archive: {0}")]
  Finish(#[source] io::Error),

  #[error("archive build cancelled")]
  Cancelled,
}

/// A finished archive and its identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedArchive {
  pub bytes: Vec<u8>,
  pub identity: ContentHash,
  pub files: usize,
  pub directories: usize,
}

/// Builds archives from source trees.
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use tarplate_lib::archive::Archiver;
/// use tarplate_lib::vars::VariableScope;
///
/// let vars: VariableScope = [("bar", "bar")].into_iter().collect();
/// let rendered = Archiver::new().render_dir(Path::new("templates"), &vars)?;
/// println!("{} ({} bytes)", rendered.identity, rendered.bytes.len());
/// # Ok::<(), tarplate_lib::archive::ArchiveError>(())
/// ```
#[derive(Debug)]
pub struct Archiver {
  funcs: FuncTable,
  cancel: Option<CancelToken>,
  parallel: bool,
}

impl Default for Archiver {
  fn default() -> Self {
    Self {
      funcs: FuncTable::builtins(),
      cancel: None,
      parallel: false,
    }
  }
}

impl Archiver {
  /// An archiver with the built-in function table, sequential rendering and
  /// no cancellation.
  pub fn new() -> Self {
    Self::default()
  }

  /// Replace the function table available to templates.
  pub fn with_funcs(mut self, funcs: FuncTable) -> Self {
    self.funcs = funcs;
    self
  }

  /// Observe `token` between entries.
  pub fn with_cancel(mut self, token: CancelToken) -> Self {
    self.cancel = Some(token);
    self
  }

  /// Render files on the rayon pool. Records are still written in traversal order.
  pub fn parallel(mut self, enabled: bool) -> Self {
    self.parallel = enabled;
    self
  }

  /// Build the archive bytes for `root`.
  pub fn build(&self, root: &Path, vars: &VariableScope) -> Result<Vec<u8>, ArchiveError> {
    Ok(self.build_counted(root, vars)?.0)
  }

  /// Build the archive and derive its identity.
  pub fn render_dir(&self, root: &Path, vars: &VariableScope) -> Result<RenderedArchive, ArchiveError> {
    let (bytes, files, directories) = self.build_counted(root, vars)?;
    let identity = hash_bytes(&bytes);

    info!(
      root = %root.display(),
      id = %identity,
      size = bytes.len(),
      files,
      directories,
      "archive built"
    );

    Ok(RenderedArchive {
      bytes,
      identity,
      files,
      directories,
    })
  }

  fn build_counted(&self, root: &Path, vars: &VariableScope) -> Result<(Vec<u8>, usize, usize), ArchiveError> {
    let ctx = EvalContext::new(vars, &self.funcs);
    let mut writer = ArchiveWriter::new();

    if self.parallel {
      // A walk error stays in place so an earlier render failure still wins.
      let entries: Vec<Result<TreeEntry, WalkError>> = walk(root)?.collect();
      let rendered: Vec<Option<Result<String, ArchiveError>>> = entries
        .par_iter()
        .map(|entry| match entry {
          Ok(entry) if entry.kind() == EntryKind::File => {
            Some(self.check_cancelled().and_then(|_| render_entry(entry, &ctx)))
          }
          _ => None,
        })
        .collect();

      for (entry, content) in entries.into_iter().zip(rendered) {
        self.check_cancelled()?;
        let entry = entry?;
        writer.append(&entry, content.transpose()?)?;
      }
    } else {
      for entry in walk(root)? {
        self.check_cancelled()?;
        let entry = entry?;
        let content = match entry.kind() {
          EntryKind::Directory => None,
          EntryKind::File => Some(render_entry(&entry, &ctx)?),
        };
        writer.append(&entry, content)?;
      }
    }

    self.check_cancelled()?;
    writer.finish()
  }

  fn check_cancelled(&self) -> Result<(), ArchiveError> {
    match &self.cancel {
      Some(token) if token.is_cancelled() => {
        warn!("archive build cancelled, discarding partial output");
        Err(ArchiveError::Cancelled)
      }
      _ => Ok(()),
    }
  }
}

/// Build the archive for `root` with default settings.
pub fn build(root: &Path, vars: &VariableScope) -> Result<Vec<u8>, ArchiveError> {
  Archiver::new().build(root, vars)
}

/// Read a file entry once and render it.
fn render_entry(entry: &TreeEntry, ctx: &EvalContext<'_>) -> Result<String, ArchiveError> {
  let raw = entry.read()?;
  let text = String::from_utf8(raw).map_err(|_| ArchiveError::InvalidUtf8 {
    path: entry.path().to_path_buf(),
  })?;
  render_with(&text, ctx).map_err(|source| ArchiveError::Render {
    path: entry.path().to_path_buf(),
    source,
  })
}

/// Tar stream plus record counts.
struct ArchiveWriter {
  builder: tar::Builder<Vec<u8>>,
  files: usize,
  directories: usize,
}

impl ArchiveWriter {
  fn new() -> Self {
    Self {
      builder: tar::Builder::new(Vec::new()),
      files: 0,
      directories: 0,
    }
  }

  /// Append a record. `content` is `None` for directories.
  fn append(&mut self, entry: &TreeEntry, content: Option<String>) -> Result<(), ArchiveError> {
    let data = content.unwrap_or_default();
    let header = ArchiveHeader::new(entry, data.len());
    let mut tar_header = header.to_tar();

    self
      .builder
      .append_data(&mut tar_header, &header.path, data.as_bytes())
      .map_err(|source| ArchiveError::Write {
        path: header.path.clone(),
        source,
      })?;

    match header.kind {
      EntryKind::Directory => self.directories += 1,
      EntryKind::File => self.files += 1,
    }
    debug!(path = %header.path, size = header.size, "archived entry");
    Ok(())
  }

  /// Write the end-of-archive marker and hand back the bytes.
  fn finish(self) -> Result<(Vec<u8>, usize, usize), ArchiveError> {
    let bytes = self.builder.into_inner().map_err(ArchiveError::Finish)?;
    Ok((bytes, self.files, self.directories))
  }
}
