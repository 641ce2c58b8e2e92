//! Template variables.
//!
//! Raw variables arrive dynamically typed (JSON values from var files, strings
//! from the command line or environment). [`VariableScope::from_raw`] is the
//! boundary where they become a flat string map; lists and maps are rejected
//! there, so nothing downstream ever sees a composite value.
//!
//! # Submodules
//!
//! - [`load`] - var files, `NAME=VALUE` assignments and environment lookup

pub mod load;
mod types;

pub use types::*;
