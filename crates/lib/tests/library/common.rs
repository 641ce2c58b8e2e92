//! Shared helpers for library tests.

use std::fs;
use std::io::Read;
use std::path::Path;

use tempfile::TempDir;

use tarplate_lib::VariableScope;

/// Write `files` (relative path, content) into a fresh temp directory.
pub fn tree(files: &[(&str, &str)]) -> TempDir {
  let temp = TempDir::new().unwrap();
  write_files(temp.path(), files);
  temp
}

pub fn write_files(root: &Path, files: &[(&str, &str)]) {
  for (name, content) in files {
    let path = root.join(name);
    if let Some(parent) = path.parent() {
      fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, content).unwrap();
  }
}

pub fn scope(pairs: &[(&str, &str)]) -> VariableScope {
  pairs.iter().copied().collect()
}

/// A decoded archive record.
#[derive(Debug, PartialEq, Eq)]
pub struct Record {
  pub path: String,
  pub is_dir: bool,
  pub content: String,
}

/// Decode every record of an archive, in order.
pub fn records(bytes: &[u8]) -> Vec<Record> {
  let mut archive = tar::Archive::new(bytes);
  archive
    .entries()
    .unwrap()
    .map(|entry| {
      let mut entry = entry.unwrap();
      let path = entry.path().unwrap().to_string_lossy().to_string();
      let is_dir = entry.header().entry_type().is_dir();
      let mut content = String::new();
      entry.read_to_string(&mut content).unwrap();
      Record { path, is_dir, content }
    })
    .collect()
}

pub fn file(path: &str, content: &str) -> Record {
  Record {
    path: path.to_string(),
    is_dir: false,
    content: content.to_string(),
  }
}

pub fn dir(path: &str) -> Record {
  Record {
    path: path.to_string(),
    is_dir: true,
    content: String::new(),
  }
}
