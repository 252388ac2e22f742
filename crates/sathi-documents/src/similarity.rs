//! [`SimilarityIndex`]: duplicate screening over the document corpus.

use sathi_core::{
  similarity::{DEFAULT_THRESHOLD, SimilarMatch, comparable_tokens, score_candidates},
  store::DocumentBackend,
};

use crate::DocumentStore;

/// Finds stored documents whose vocabulary overlaps a candidate text.
///
/// Every call reads and scores the full corpus, which keeps it suitable for
/// small collections only.
pub struct SimilarityIndex<B> {
  documents: DocumentStore<B>,
}

impl<B> Clone for SimilarityIndex<B> {
  fn clone(&self) -> Self { Self { documents: self.documents.clone() } }
}

impl<B: DocumentBackend> SimilarityIndex<B> {
  pub fn new(documents: DocumentStore<B>) -> Self { Self { documents } }

  /// Up to five stored documents scoring at least `threshold` (a Jaccard
  /// score in `0.0..=1.0`) against `candidate`, best first. Empty when the
  /// candidate has fewer than ten distinct words or the store is
  /// unavailable.
  pub async fn find_similar(&self, candidate: &str, threshold: f64) -> Vec<SimilarMatch> {
    if comparable_tokens(candidate).is_none() {
      return Vec::new();
    }

    let corpus = self.documents.corpus().await;
    let matches = score_candidates(candidate, &corpus, threshold);
    tracing::debug!(
      operation = "find_similar",
      scanned = corpus.len(),
      matched = matches.len(),
      threshold,
      "duplicate screening done"
    );
    matches
  }

  /// [`SimilarityIndex::find_similar`] at [`DEFAULT_THRESHOLD`].
  pub async fn find_similar_default(&self, candidate: &str) -> Vec<SimilarMatch> {
    self.find_similar(candidate, DEFAULT_THRESHOLD).await
  }
}
