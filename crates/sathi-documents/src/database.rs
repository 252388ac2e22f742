//! [`Database`]: startup wiring of the whole layer.

use std::sync::Arc;

use sathi_store_remote::RemoteStore;
use sathi_store_sqlite::SqliteStore;

use crate::{
  Backend, ConnectionManager, DocumentStore, Error, Result, Settings, SimilarityIndex,
};

/// Everything built from [`Settings`] at process startup.
///
/// `local` always holds the legacy grievance and workflow tables. Documents
/// go to the remote store when it is configured; otherwise to `local` if
/// `local_document_fallback` is set, and nowhere if it is not.
pub struct Database {
  pub connection: Arc<ConnectionManager<Backend>>,
  pub local:      SqliteStore,
  pub documents:  DocumentStore<Backend>,
  pub similarity: SimilarityIndex<Backend>,
}

impl Database {
  /// Open the local store, connect the document backend and build the
  /// document store and similarity index on top of it.
  pub async fn open(settings: &Settings) -> Result<Self> {
    let local = SqliteStore::open(&settings.local_store_path).await?;

    let fallback = settings.local_document_fallback.then(|| local.clone());
    let settings = settings.clone();

    let connection = Arc::new(ConnectionManager::lazy(move || {
      let primary = settings
        .remote_config()
        .and_then(|cfg| RemoteStore::connect(cfg).map_err(Error::backend));
      match (primary, &fallback) {
        (Ok(store), _) => Ok(Backend::Remote(store)),
        (Err(e), Some(local)) => {
          tracing::warn!(error = %e, "remote store unavailable, documents use the local store");
          Ok(Backend::Local(local.clone()))
        }
        (Err(e), None) => Err(e),
      }
    }));

    if let Some(backend) = connection.client() {
      tracing::info!(backend = backend.name(), "document storage ready");
    }

    let documents = DocumentStore::new(Arc::clone(&connection));
    let similarity = SimilarityIndex::new(documents.clone());

    Ok(Self { connection, local, documents, similarity })
  }
}
