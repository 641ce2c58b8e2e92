//! tarplate-lib: deterministic, templated directory archives
//!
//! This crate turns a directory tree into a single tar archive whose files
//! have been rendered through a small `${ ... }` template language:
//! - `vars`: validated, string-only template variables and where they come from
//! - `template`: the interpolation language and its function table
//! - `walk`: sorted, platform-independent directory traversal
//! - `archive`: normalized headers and the archive builder
//! - `util::hash`: the content identity of a finished archive
//!
//! The same tree and the same variables always produce the same bytes, and
//! therefore the same identity.

pub mod archive;
pub mod cancel;
pub mod consts;
pub mod template;
pub mod util;
pub mod vars;
pub mod walk;

pub use archive::{ArchiveError, Archiver, RenderedArchive, build};
pub use util::hash::{ContentHash, hash_bytes};
pub use vars::VariableScope;
