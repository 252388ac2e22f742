//! Document records: the unit of storage for ingested files.
//!
//! A document is keyed by a caller-chosen string id. Writes are upserts: a
//! second save with the same id replaces every field of the stored record.
//! There is no versioning and no soft delete.

use std::{collections::BTreeMap, path::Path};

use chrono::{DateTime, SubsecRound as _, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{Error, Result};

/// Number of characters kept in [`DocumentPreview::text_preview`].
pub const PREVIEW_CHARS: usize = 300;

/// Appended to a preview that was cut short.
pub const ELLIPSIS: &str = "...";

/// Stored timestamps keep microseconds.
const STORED_SUBSEC_DIGITS: u16 = 6;

// ─── FieldMap ────────────────────────────────────────────────────────────────

/// A structured key/value map attached to a document (its summary or its
/// metadata). Always a JSON object on the wire; anything else is rejected
/// when decoding.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldMap(BTreeMap<String, Value>);

impl FieldMap {
  pub fn new() -> Self { Self::default() }

  pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
    self.0.insert(key.into(), value.into());
  }

  pub fn get(&self, key: &str) -> Option<&Value> { self.0.get(key) }

  pub fn len(&self) -> usize { self.0.len() }

  pub fn is_empty(&self) -> bool { self.0.is_empty() }

  pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
    self.0.iter()
  }

  /// Encode as compact JSON for a `*_json` column.
  pub fn to_json(&self) -> Result<String> { Ok(serde_json::to_string(&self.0)?) }

  /// Decode a `*_json` column. Blank text and JSON `null` decode to an empty
  /// map; any other non-object value is an error naming `column`.
  pub fn from_json(column: &'static str, raw: &str) -> Result<Self> {
    if raw.trim().is_empty() {
      return Ok(Self::default());
    }
    match serde_json::from_str::<Value>(raw)? {
      Value::Null => Ok(Self::default()),
      Value::Object(map) => Ok(Self(map.into_iter().collect())),
      _ => Err(Error::NotAnObject { column }),
    }
  }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for FieldMap {
  fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
    Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
  }
}

// ─── NewDocument ─────────────────────────────────────────────────────────────

/// Input to a save. `upload_date` and `file_type` are filled in by
/// [`NewDocument::into_document`] when absent.
#[derive(Debug, Clone)]
pub struct NewDocument {
  pub id:          String,
  pub filename:    String,
  pub file_path:   String,
  pub ocr_text:    String,
  pub file_type:   Option<String>,
  pub file_size:   u64,
  pub upload_date: Option<DateTime<Utc>>,
  pub summary:     FieldMap,
  pub metadata:    FieldMap,
}

impl NewDocument {
  /// Convenience constructor with all optional fields set to their defaults.
  pub fn new(
    id: impl Into<String>,
    filename: impl Into<String>,
    ocr_text: impl Into<String>,
  ) -> Self {
    Self {
      id:          id.into(),
      filename:    filename.into(),
      file_path:   String::new(),
      ocr_text:    ocr_text.into(),
      file_type:   None,
      file_size:   0,
      upload_date: None,
      summary:     FieldMap::default(),
      metadata:    FieldMap::default(),
    }
  }

  /// Resolve defaults and produce the record to store. `now` is used when no
  /// upload date was supplied. The upload date is cut to microseconds, the
  /// precision it is stored with.
  pub fn into_document(self, now: DateTime<Utc>) -> Result<Document> {
    if self.id.trim().is_empty() {
      return Err(Error::EmptyId);
    }
    let file_type = self
      .file_type
      .unwrap_or_else(|| derive_file_type(&self.filename));
    Ok(Document {
      id: self.id,
      filename: self.filename,
      file_path: self.file_path,
      upload_date: self.upload_date.unwrap_or(now).trunc_subsecs(STORED_SUBSEC_DIGITS),
      file_type,
      file_size: self.file_size,
      ocr_text: self.ocr_text,
      summary: self.summary,
      metadata: self.metadata,
    })
  }
}

/// The lower-cased extension of `filename` with its leading dot (`".pdf"`),
/// or an empty string when there is none.
pub fn derive_file_type(filename: &str) -> String {
  Path::new(filename)
    .extension()
    .map(|ext| format!(".{}", ext.to_string_lossy().to_lowercase()))
    .unwrap_or_default()
}

// ─── Document ────────────────────────────────────────────────────────────────

/// A stored document with every field resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
  pub id:          String,
  pub filename:    String,
  pub file_path:   String,
  pub upload_date: DateTime<Utc>,
  pub file_type:   String,
  pub file_size:   u64,
  pub ocr_text:    String,
  pub summary:     FieldMap,
  pub metadata:    FieldMap,
}

impl Document {
  pub fn word_count(&self) -> usize { word_count(&self.ocr_text) }

  /// The filename, or the id when the filename is empty.
  pub fn title(&self) -> &str {
    if self.filename.is_empty() { &self.id } else { &self.filename }
  }

  pub fn preview(&self) -> DocumentPreview {
    DocumentPreview {
      id:           self.id.clone(),
      filename:     self.filename.clone(),
      file_path:    self.file_path.clone(),
      upload_date:  self.upload_date,
      file_type:    self.file_type.clone(),
      file_size:    self.file_size,
      text_preview: text_preview(&self.ocr_text),
      word_count:   self.word_count(),
      title:        self.title().to_owned(),
    }
  }

  pub fn into_detail(self) -> DocumentDetail {
    let word_count = self.word_count();
    let title = self.title().to_owned();
    DocumentDetail {
      id: self.id,
      filename: self.filename,
      file_path: self.file_path,
      upload_date: self.upload_date,
      file_type: self.file_type,
      file_size: self.file_size,
      full_text: self.ocr_text,
      word_count,
      title,
      summary: self.summary,
      metadata: self.metadata,
    }
  }
}

/// Number of whitespace-delimited tokens in `text`.
pub fn word_count(text: &str) -> usize { text.split_whitespace().count() }

/// `text` unchanged if it fits in [`PREVIEW_CHARS`] characters, otherwise its
/// first [`PREVIEW_CHARS`] characters followed by [`ELLIPSIS`].
pub fn text_preview(text: &str) -> String {
  match text.char_indices().nth(PREVIEW_CHARS) {
    Some((cut, _)) => format!("{}{ELLIPSIS}", &text[..cut]),
    None => text.to_owned(),
  }
}

// ─── Read models ─────────────────────────────────────────────────────────────

/// The list projection of a document: no full text, no summary or metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentPreview {
  pub id:           String,
  pub filename:     String,
  pub file_path:    String,
  pub upload_date:  DateTime<Utc>,
  pub file_type:    String,
  pub file_size:    u64,
  pub text_preview: String,
  pub word_count:   usize,
  pub title:        String,
}

/// The detail view of a document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentDetail {
  pub id:          String,
  pub filename:    String,
  pub file_path:   String,
  pub upload_date: DateTime<Utc>,
  pub file_type:   String,
  pub file_size:   u64,
  pub full_text:   String,
  pub word_count:  usize,
  pub title:       String,
  pub summary:     FieldMap,
  pub metadata:    FieldMap,
}

/// The narrow projection read by the duplicate matcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorpusEntry {
  pub id:       String,
  pub filename: Option<String>,
  pub text:     String,
}
