//! Bag-of-words duplicate scoring.
//!
//! Texts are compared as sets of case-folded whitespace tokens using Jaccard
//! similarity. It is a cheap, explainable heuristic for spotting re-submitted
//! documents, not a semantic measure. Every query scores the whole corpus;
//! there is no index.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::document::CorpusEntry;

/// Score at or above which a stored document counts as a likely duplicate.
pub const DEFAULT_THRESHOLD: f64 = 0.7;

/// Texts with fewer distinct tokens than this are never compared.
pub const MIN_DISTINCT_TOKENS: usize = 10;

/// Upper bound on the number of matches returned.
pub const MAX_MATCHES: usize = 5;

/// Reported in place of a missing filename.
pub const UNKNOWN_FILENAME: &str = "Unknown";

/// A stored document that overlaps the candidate text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarMatch {
  pub id:         String,
  pub filename:   String,
  /// Percentage in `0.0..=100.0`, rounded to one decimal place.
  pub similarity: f64,
}

/// The distinct lower-cased whitespace tokens of `text`.
pub fn token_set(text: &str) -> HashSet<String> {
  text.split_whitespace().map(str::to_lowercase).collect()
}

/// [`token_set`], or `None` when the text is too short to compare.
pub fn comparable_tokens(text: &str) -> Option<HashSet<String>> {
  let tokens = token_set(text);
  (tokens.len() >= MIN_DISTINCT_TOKENS).then_some(tokens)
}

/// `|a ∩ b| / |a ∪ b|`, or 0.0 when both sets are empty.
pub fn jaccard(a: &HashSet<String>, b: &HashSet<String>) -> f64 {
  let intersection = a.intersection(b).count();
  let union = a.len() + b.len() - intersection;
  if union == 0 {
    0.0
  } else {
    intersection as f64 / union as f64
  }
}

/// A score in `0.0..=1.0` as a percentage with one decimal place.
pub fn to_percent(score: f64) -> f64 { (score * 1000.0).round() / 10.0 }

/// Score `candidate` against every entry of `corpus` and return the best
/// [`MAX_MATCHES`] entries scoring at least `threshold`, highest first.
///
/// The sort is stable on the unrounded score, so entries with equal scores
/// keep their corpus order.
pub fn score_candidates<'a>(
  candidate: &str,
  corpus: impl IntoIterator<Item = &'a CorpusEntry>,
  threshold: f64,
) -> Vec<SimilarMatch> {
  let Some(wanted) = comparable_tokens(candidate) else {
    return Vec::new();
  };

  let mut scored: Vec<(f64, &CorpusEntry)> = corpus
    .into_iter()
    .filter_map(|entry| {
      let tokens = comparable_tokens(&entry.text)?;
      let score = jaccard(&wanted, &tokens);
      (score >= threshold).then_some((score, entry))
    })
    .collect();

  scored.sort_by(|a, b| b.0.total_cmp(&a.0));

  scored
    .into_iter()
    .take(MAX_MATCHES)
    .map(|(score, entry)| SimilarMatch {
      id:         entry.id.clone(),
      filename:   entry
        .filename
        .as_deref()
        .filter(|name| !name.is_empty())
        .unwrap_or(UNKNOWN_FILENAME)
        .to_owned(),
      similarity: to_percent(score),
    })
    .collect()
}
