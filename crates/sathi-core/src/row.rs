//! The storage row shared by every document backend.
//!
//! Both the remote table and the local SQLite table use the same nine
//! columns. Timestamps are RFC 3339 UTC strings with fixed microsecond
//! precision, so ordering by the text column orders by time. Summary and
//! metadata are stored as compact JSON objects.

use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::{
  Error, Result,
  document::{CorpusEntry, Document, DocumentPreview, FieldMap},
};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Parse an RFC 3339 timestamp. A timestamp without an offset, as written by
/// older ingesters, is read as UTC.
pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
    return Ok(dt.with_timezone(&Utc));
  }
  NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
    .map(|naive| naive.and_utc())
    .map_err(|e| Error::DateParse(format!("{s:?}: {e}")))
}

// ─── DocumentRow ─────────────────────────────────────────────────────────────

/// One row of the `documents` table. Every column except `id` is nullable on
/// the remote side, so reads tolerate missing values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentRow {
  pub id:            String,
  #[serde(default)]
  pub filename:      Option<String>,
  #[serde(default)]
  pub file_path:     Option<String>,
  #[serde(default)]
  pub upload_date:   Option<String>,
  #[serde(default)]
  pub file_type:     Option<String>,
  #[serde(default)]
  pub file_size:     Option<i64>,
  #[serde(default)]
  pub ocr_text:      Option<String>,
  #[serde(default)]
  pub summary_json:  Option<String>,
  #[serde(default)]
  pub metadata_json: Option<String>,
}

impl DocumentRow {
  pub fn from_document(doc: &Document) -> Result<Self> {
    Ok(Self {
      id:            doc.id.clone(),
      filename:      Some(doc.filename.clone()),
      file_path:     Some(doc.file_path.clone()),
      upload_date:   Some(encode_dt(doc.upload_date)),
      file_type:     Some(doc.file_type.clone()),
      file_size:     Some(
        i64::try_from(doc.file_size).map_err(|_| Error::FileSizeOverflow(doc.file_size))?,
      ),
      ocr_text:      Some(doc.ocr_text.clone()),
      summary_json:  Some(doc.summary.to_json()?),
      metadata_json: Some(doc.metadata.to_json()?),
    })
  }

  /// Decode into a [`Document`]. A missing upload date decodes as the Unix
  /// epoch so the record sorts last; a negative size decodes as zero.
  pub fn into_document(mut self) -> Result<Document> {
    let summary = decode_fields("summary_json", self.summary_json.take())?;
    let metadata = decode_fields("metadata_json", self.metadata_json.take())?;
    Ok(Document { summary, metadata, ..self.into_bare()? })
  }

  /// Decode the list projection. Summary and metadata are never parsed, so
  /// only an unreadable upload date fails.
  pub fn into_preview(self) -> Result<DocumentPreview> {
    Ok(self.into_bare()?.preview())
  }

  fn into_bare(self) -> Result<Document> {
    let upload_date = match self.upload_date.as_deref() {
      Some(s) if !s.is_empty() => decode_dt(s)?,
      _ => DateTime::<Utc>::UNIX_EPOCH,
    };
    Ok(Document {
      id: self.id,
      filename: self.filename.unwrap_or_default(),
      file_path: self.file_path.unwrap_or_default(),
      upload_date,
      file_type: self.file_type.unwrap_or_default(),
      file_size: self
        .file_size
        .and_then(|n| u64::try_from(n).ok())
        .unwrap_or(0),
      ocr_text: self.ocr_text.unwrap_or_default(),
      summary: FieldMap::default(),
      metadata: FieldMap::default(),
    })
  }
}

fn decode_fields(column: &'static str, raw: Option<String>) -> Result<FieldMap> {
  raw
    .map(|raw| FieldMap::from_json(column, &raw))
    .transpose()
    .map(Option::unwrap_or_default)
}

// ─── CorpusRow ───────────────────────────────────────────────────────────────

/// The three columns the duplicate matcher reads.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CorpusRow {
  pub id:       String,
  #[serde(default)]
  pub filename: Option<String>,
  #[serde(default)]
  pub ocr_text: Option<String>,
}

impl From<CorpusRow> for CorpusEntry {
  fn from(row: CorpusRow) -> Self {
    Self {
      id:       row.id,
      filename: row.filename,
      text:     row.ocr_text.unwrap_or_default(),
    }
  }
}
