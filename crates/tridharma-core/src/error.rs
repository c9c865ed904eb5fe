//! Error taxonomy shared by every layer above the store.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// Missing, malformed, or expired credentials.
  #[error("unauthenticated")]
  Unauthenticated,

  /// Authenticated, but the role may not perform the operation.
  #[error("forbidden")]
  Forbidden,

  /// Reserved; no access-layer operation produces it yet.
  #[error("not found: {0}")]
  NotFound(String),

  #[error("validation error: {0}")]
  Validation(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

impl Error {
  /// Box a backend error into [`Error::Store`].
  pub fn store<E>(err: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Store(Box::new(err))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
