//! [`Backend`]: the concrete document backend chosen at startup.

use sathi_core::{
  document::{CorpusEntry, Document, DocumentPreview},
  store::DocumentBackend,
};
use sathi_store_remote::RemoteStore;
use sathi_store_sqlite::SqliteStore;
use thiserror::Error;

/// Either the remote store or, when the document fallback is enabled and the
/// remote store is not configured, the local SQLite store.
#[derive(Clone)]
pub enum Backend {
  Remote(RemoteStore),
  Local(SqliteStore),
}

impl Backend {
  pub fn name(&self) -> &'static str {
    match self {
      Self::Remote(_) => "remote",
      Self::Local(_) => "local",
    }
  }
}

#[derive(Debug, Error)]
pub enum BackendError {
  #[error("remote store: {0}")]
  Remote(#[from] sathi_store_remote::Error),

  #[error("local store: {0}")]
  Local(#[from] sathi_store_sqlite::Error),
}

impl DocumentBackend for Backend {
  type Error = BackendError;

  async fn upsert(&self, doc: &Document) -> Result<(), BackendError> {
    match self {
      Self::Remote(s) => Ok(s.upsert(doc).await?),
      Self::Local(s) => Ok(s.upsert(doc).await?),
    }
  }

  async fn list_recent(&self) -> Result<Vec<DocumentPreview>, BackendError> {
    match self {
      Self::Remote(s) => Ok(s.list_recent().await?),
      Self::Local(s) => Ok(s.list_recent().await?),
    }
  }

  async fn get(&self, id: &str) -> Result<Option<Document>, BackendError> {
    match self {
      Self::Remote(s) => Ok(s.get(id).await?),
      Self::Local(s) => Ok(s.get(id).await?),
    }
  }

  async fn delete(&self, id: &str) -> Result<(), BackendError> {
    match self {
      Self::Remote(s) => Ok(s.delete(id).await?),
      Self::Local(s) => Ok(s.delete(id).await?),
    }
  }

  async fn corpus(&self) -> Result<Vec<CorpusEntry>, BackendError> {
    match self {
      Self::Remote(s) => Ok(s.corpus().await?),
      Self::Local(s) => Ok(s.corpus().await?),
    }
  }
}
