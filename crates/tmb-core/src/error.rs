//! Error types for `tmb-core`.

use thiserror::Error;

/// Coarse classification shared by every crate in the workspace.
///
/// Callers branch on this instead of matching backend-specific variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
  /// Empty, absent or unparsable payload, or a non-integer scalar filter.
  /// Always detected before the store is touched.
  InvalidInput,
  /// A lookup or join produced no row.
  NotFound,
  /// The underlying store failed or returned an unexpected shape.
  DataAccess,
}

#[derive(Debug, Error)]
pub enum Error {
  #[error("invalid input: {0}")]
  InvalidInput(String),
}

impl Error {
  pub fn kind(&self) -> ErrorKind {
    match self {
      Error::InvalidInput(_) => ErrorKind::InvalidInput,
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
