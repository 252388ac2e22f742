//! The `DocumentBackend` trait.
//!
//! The trait is implemented by storage backends (`sathi-store-remote`,
//! `sathi-store-sqlite`). The document layer in `sathi-documents` depends on
//! this abstraction, not on any concrete backend.

use std::future::Future;

use crate::document::{CorpusEntry, Document, DocumentPreview};

/// Abstraction over a store holding the `documents` table.
///
/// Backends report every failure as `Self::Error`; turning those into
/// degraded results is the caller's business.
pub trait DocumentBackend: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Insert `doc`, or replace every field of the record with the same id.
  fn upsert<'a>(
    &'a self,
    doc: &'a Document,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// Previews of all documents, most recently uploaded first. A row whose
  /// upload date cannot be parsed is skipped with a warning; summary and
  /// metadata are not decoded at all.
  fn list_recent(
    &self,
  ) -> impl Future<Output = Result<Vec<DocumentPreview>, Self::Error>> + Send + '_;

  /// Retrieve a document by id. Returns `None` if not found.
  fn get<'a>(
    &'a self,
    id: &'a str,
  ) -> impl Future<Output = Result<Option<Document>, Self::Error>> + Send + 'a;

  /// Delete the document with `id` if present. Deleting an absent id is not
  /// an error.
  fn delete<'a>(
    &'a self,
    id: &'a str,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// Id, filename and text of every document, for duplicate screening.
  fn corpus(
    &self,
  ) -> impl Future<Output = Result<Vec<CorpusEntry>, Self::Error>> + Send + '_;
}
