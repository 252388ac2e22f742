//! [`DocumentStore`]: CRUD over document records with graceful degradation.
//!
//! The public operations never fail: an unavailable or failing backend turns
//! into `false`, an empty list or `None`, and a `warn!` event carrying the
//! operation name, the document id and the cause. [`DocumentStore::lookup`]
//! is the one strict read for callers that need to tell "not found" from
//! "store unreachable".

use std::sync::Arc;

use chrono::Utc;
use sathi_core::{
  document::{CorpusEntry, DocumentDetail, DocumentPreview, NewDocument},
  store::DocumentBackend,
};

use crate::{ConnectionManager, Error, Result};

/// Document CRUD over the backend held by a [`ConnectionManager`].
///
/// Cloning is cheap; the manager is shared.
pub struct DocumentStore<B> {
  connection: Arc<ConnectionManager<B>>,
}

impl<B> Clone for DocumentStore<B> {
  fn clone(&self) -> Self { Self { connection: Arc::clone(&self.connection) } }
}

impl<B: DocumentBackend> DocumentStore<B> {
  pub fn new(connection: Arc<ConnectionManager<B>>) -> Self { Self { connection } }

  pub fn connection(&self) -> &ConnectionManager<B> { &self.connection }

  // ── Writes ────────────────────────────────────────────────────────────────

  /// Insert or fully replace the document with `input.id`. Fills in the
  /// upload date and file type when absent. Returns `false` if the id is
  /// blank, the store is unavailable, or the write fails.
  pub async fn save(&self, input: NewDocument) -> bool {
    let id = input.id.clone();
    match self.try_save(input).await {
      Ok(()) => {
        tracing::info!(operation = "save", id = %id, "document saved");
        true
      }
      Err(e) => {
        tracing::warn!(operation = "save", id = %id, error = %e, "document not saved");
        false
      }
    }
  }

  async fn try_save(&self, input: NewDocument) -> Result<()> {
    let doc = input.into_document(Utc::now())?;
    let backend = self.connection.require()?;
    backend.upsert(&doc).await.map_err(Error::backend)
  }

  /// Delete the document with `id` if present. Returns `true` when the id
  /// did not exist; `false` only when the store is unavailable or the call
  /// fails.
  pub async fn delete(&self, id: &str) -> bool {
    let outcome = match self.connection.require() {
      Ok(backend) => backend.delete(id).await.map_err(Error::backend),
      Err(e) => Err(e),
    };
    match outcome {
      Ok(()) => {
        tracing::info!(operation = "delete", id, "document deleted");
        true
      }
      Err(e) => {
        tracing::warn!(operation = "delete", id, error = %e, "document not deleted");
        false
      }
    }
  }

  // ── Reads ─────────────────────────────────────────────────────────────────

  /// Previews of every document, most recently uploaded first. Empty when
  /// the store is unavailable or the read fails.
  pub async fn list(&self) -> Vec<DocumentPreview> {
    match self.try_list().await {
      Ok(previews) => previews,
      Err(e) => {
        tracing::warn!(operation = "list", error = %e, "could not list documents");
        Vec::new()
      }
    }
  }

  async fn try_list(&self) -> Result<Vec<DocumentPreview>> {
    let backend = self.connection.require()?;
    backend.list_recent().await.map_err(Error::backend)
  }

  /// The full document with `id`. `None` both when no such document exists
  /// and when the store cannot be read; use [`DocumentStore::lookup`] to
  /// tell the two apart.
  pub async fn get_by_id(&self, id: &str) -> Option<DocumentDetail> {
    match self.lookup(id).await {
      Ok(detail) => detail,
      Err(e) => {
        tracing::warn!(operation = "get", id, error = %e, "could not read document");
        None
      }
    }
  }

  /// The full document with `id`: `Ok(None)` when it does not exist,
  /// [`Error::Unavailable`] when there is no backend, [`Error::Backend`] when
  /// the read fails.
  pub async fn lookup(&self, id: &str) -> Result<Option<DocumentDetail>> {
    let backend = self.connection.require()?;
    let doc = backend.get(id).await.map_err(Error::backend)?;
    Ok(doc.map(|doc| doc.into_detail()))
  }

  /// Id, filename and text of every document. Empty when the store is
  /// unavailable or the read fails.
  pub async fn corpus(&self) -> Vec<CorpusEntry> {
    let outcome = match self.connection.require() {
      Ok(backend) => backend.corpus().await.map_err(Error::backend),
      Err(e) => Err(e),
    };
    outcome.unwrap_or_else(|e| {
      tracing::warn!(operation = "corpus", error = %e, "could not read corpus");
      Vec::new()
    })
  }
}
