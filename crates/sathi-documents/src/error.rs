//! Error type for `sathi-documents`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// No backend: missing configuration or a client that could not be built.
  #[error("document store unavailable: {0}")]
  Unavailable(String),

  #[error("{0} is not configured")]
  MissingSetting(&'static str),

  /// A call on an available backend failed.
  #[error("document backend error: {0}")]
  Backend(#[source] Box<dyn std::error::Error + Send + Sync>),

  #[error("invalid document: {0}")]
  Document(#[from] sathi_core::Error),

  #[error("configuration error: {0}")]
  Config(#[from] config::ConfigError),

  #[error("local store error: {0}")]
  Local(#[from] sathi_store_sqlite::Error),
}

impl Error {
  pub(crate) fn backend<E>(e: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Backend(Box::new(e))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
