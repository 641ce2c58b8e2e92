//! Normalized tar headers.
//!
//! Only the path, the entry kind and the rendered size come from the source
//! tree. Everything the host could influence (timestamps, ownership, source
//! permissions) is fixed, so identical trees produce identical headers on any
//! machine.

use tar::{EntryType, Header};

use crate::consts::{DEFAULT_DIR_MODE, DEFAULT_FILE_MODE, HEADER_EPOCH};
use crate::walk::{EntryKind, TreeEntry};

/// Metadata written ahead of each archive record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveHeader {
  pub path: String,
  pub kind: EntryKind,
  pub size: u64,
  pub mode: u32,
}

impl ArchiveHeader {
  /// Header for `entry` whose rendered content is `rendered_len` bytes.
  ///
  /// The length must be taken after rendering; directories ignore it.
  pub fn new(entry: &TreeEntry, rendered_len: usize) -> Self {
    match entry.kind() {
      EntryKind::Directory => Self::directory(entry.rel_path()),
      EntryKind::File => Self::file(entry.rel_path(), rendered_len as u64),
    }
  }

  pub fn directory(path: &str) -> Self {
    Self {
      path: path.to_string(),
      kind: EntryKind::Directory,
      size: 0,
      mode: DEFAULT_DIR_MODE,
    }
  }

  pub fn file(path: &str, size: u64) -> Self {
    Self {
      path: path.to_string(),
      kind: EntryKind::File,
      size,
      mode: DEFAULT_FILE_MODE,
    }
  }

  /// Build the tar header. The path and checksum are filled in when the
  /// record is appended.
  pub fn to_tar(&self) -> Header {
    let mut header = Header::new_gnu();
    header.set_entry_type(match self.kind {
      EntryKind::Directory => EntryType::Directory,
      EntryKind::File => EntryType::Regular,
    });
    header.set_size(self.size);
    header.set_mode(self.mode);
    header.set_mtime(HEADER_EPOCH);
    header.set_uid(0);
    header.set_gid(0);
    // user and group names stay zeroed from new_gnu
    if let Some(gnu) = header.as_gnu_mut() {
      gnu.set_atime(HEADER_EPOCH);
      gnu.set_ctime(HEADER_EPOCH);
    }
    header
  }
}
