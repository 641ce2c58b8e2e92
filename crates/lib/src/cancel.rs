//! Cooperative cancellation for archive builds.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// A cloneable flag the caller flips to abort an in-flight build.
///
/// The builder checks it between entries. Once observed, the build returns
/// [`ArchiveError::Cancelled`](crate::archive::ArchiveError::Cancelled) and
/// drops whatever it had written so far.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
  pub fn new() -> Self {
    Self::default()
  }

  /// Request cancellation. Every clone of this token observes it.
  pub fn cancel(&self) {
    self.0.store(true, Ordering::SeqCst);
  }

  pub fn is_cancelled(&self) -> bool {
    self.0.load(Ordering::SeqCst)
  }
}
