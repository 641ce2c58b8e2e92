//! Fixed values that shape archive bytes and configuration lookup.

/// Permission bits written for every regular file record.
pub const DEFAULT_FILE_MODE: u32 = 0o600;

/// Permission bits written for every directory record.
pub const DEFAULT_DIR_MODE: u32 = 0o755;

/// Timestamp (seconds since the Unix epoch) written for mtime, atime and ctime.
pub const HEADER_EPOCH: u64 = 0;

/// Environment variables with this prefix contribute template variables.
///
/// `TARPLATE_VAR_region=eu-west-1` defines `region`.
pub const VAR_ENV_PREFIX: &str = "TARPLATE_VAR_";

/// Number of hex characters shown for an abbreviated identity.
pub const SHORT_HASH_LEN: usize = 12;

/// Deepest expression nesting a template may use: parentheses, unary minus,
/// chained operators and nested interpolations all count.
pub const MAX_EXPR_DEPTH: usize = 256;
