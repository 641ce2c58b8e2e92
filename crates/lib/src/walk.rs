//! Deterministic directory traversal.
//!
//! Entries are produced depth first, siblings sorted by file name, so the
//! order never depends on how the filesystem happens to list a directory.
//! The root itself is not emitted.

use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use walkdir::WalkDir;

/// What kind of node an entry is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
  Directory,
  File,
}

/// One node discovered during traversal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeEntry {
  rel_path: String,
  kind: EntryKind,
  path: PathBuf,
}

impl TreeEntry {
  /// Path relative to the walk root, `/`-separated on every platform.
  pub fn rel_path(&self) -> &str {
    &self.rel_path
  }

  pub fn kind(&self) -> EntryKind {
    self.kind
  }

  /// Path on disk.
  pub fn path(&self) -> &Path {
    &self.path
  }

  /// Read the raw bytes of a file entry.
  pub fn read(&self) -> Result<Vec<u8>, WalkError> {
    fs::read(&self.path).map_err(|source| WalkError::Io {
      path: self.path.clone(),
      source,
    })
  }
}

/// Errors raised while walking a source tree.
#[derive(Debug, thiserror::Error)]
pub enum WalkError {
  #[error("cannot access source directory {}: {source}", .path.display())]
  Root { path: PathBuf, source: io::Error },

  #[error("source path {} is not a directory", .path.display())]
  NotADirectory { path: PathBuf },

  #[error("failed to read {}: {source}", .path.display())]
  Io { path: PathBuf, source: io::Error },

  #[error("unsupported file type at {}", .path.display())]
  Unsupported { path: PathBuf },

  #[error("path is not valid UTF-8: {}", .path.display())]
  InvalidName { path: PathBuf },
}

impl WalkError {
  /// The path the failure is about.
  pub fn path(&self) -> &Path {
    match self {
      WalkError::Root { path, .. }
      | WalkError::NotADirectory { path }
      | WalkError::Io { path, .. }
      | WalkError::Unsupported { path }
      | WalkError::InvalidName { path } => path,
    }
  }
}

/// A single pass over a source tree.
///
/// Finite and not restartable: call [`walk`] again for another pass. After
/// the first error the iterator yields nothing more.
pub struct Walk {
  root: PathBuf,
  inner: walkdir::IntoIter,
  failed: bool,
}

/// Start walking the directory at `root`.
///
/// Symlinks are followed, so a link to a file contributes the target's bytes
/// and a dangling link is an error.
pub fn walk(root: &Path) -> Result<Walk, WalkError> {
  let metadata = fs::metadata(root).map_err(|source| WalkError::Root {
    path: root.to_path_buf(),
    source,
  })?;
  if !metadata.is_dir() {
    return Err(WalkError::NotADirectory {
      path: root.to_path_buf(),
    });
  }

  let inner = WalkDir::new(root)
    .follow_links(true)
    .min_depth(1)
    .sort_by_file_name()
    .into_iter();

  Ok(Walk {
    root: root.to_path_buf(),
    inner,
    failed: false,
  })
}

impl Walk {
  fn classify(&self, entry: walkdir::DirEntry) -> Result<TreeEntry, WalkError> {
    let path = entry.path().to_path_buf();
    let rel_path = relative_path(&self.root, &path)?;

    let file_type = entry.file_type();
    let kind = if file_type.is_dir() {
      EntryKind::Directory
    } else if file_type.is_file() {
      EntryKind::File
    } else {
      return Err(WalkError::Unsupported { path });
    };

    Ok(TreeEntry { rel_path, kind, path })
  }
}

impl Iterator for Walk {
  type Item = Result<TreeEntry, WalkError>;

  fn next(&mut self) -> Option<Self::Item> {
    if self.failed {
      return None;
    }

    let result = match self.inner.next()? {
      Ok(entry) => self.classify(entry),
      Err(err) => {
        let path = err.path().map(Path::to_path_buf).unwrap_or_else(|| self.root.clone());
        Err(WalkError::Io {
          path,
          source: io::Error::from(err),
        })
      }
    };

    self.failed = result.is_err();
    Some(result)
  }
}

/// Join the components of `path` below `root` with `/`.
fn relative_path(root: &Path, path: &Path) -> Result<String, WalkError> {
  let invalid = || WalkError::InvalidName {
    path: path.to_path_buf(),
  };

  let rel = path.strip_prefix(root).map_err(|_| invalid())?;
  let mut parts = Vec::new();
  for component in rel.components() {
    match component {
      Component::Normal(name) => parts.push(name.to_str().ok_or_else(invalid)?),
      _ => return Err(invalid()),
    }
  }
  Ok(parts.join("/"))
}
