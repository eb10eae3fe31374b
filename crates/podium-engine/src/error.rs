//! Error type for `podium-engine`.

use thiserror::Error;

/// An error from a derivation or recomputation operation.
#[derive(Debug, Error)]
pub enum Error {
  /// Domain-level rejection: unknown registry entry or out-of-range
  /// parameter, detected before any query runs.
  #[error(transparent)]
  Domain(#[from] podium_core::Error),

  /// The storage backend failed.
  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  pub(crate) fn store(
    e: impl std::error::Error + Send + Sync + 'static,
  ) -> Self {
    Self::Store(Box::new(e))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
