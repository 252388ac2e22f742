//! [`SqliteStore`]: the SQLite implementation of [`DocumentBackend`].

use std::path::Path;

use rusqlite::OptionalExtension as _;
use sathi_core::{
  document::{CorpusEntry, Document, DocumentPreview},
  row::{CorpusRow, DocumentRow},
  store::DocumentBackend,
};

use crate::{Result, schema::SCHEMA};

const DOCUMENT_COLUMNS: &str = "id, filename, file_path, upload_date, file_type, \
  file_size, ocr_text, summary_json, metadata_json";

/// [`DOCUMENT_COLUMNS`] with summary and metadata left unread.
const PREVIEW_COLUMNS: &str = "id, filename, file_path, upload_date, file_type, \
  file_size, ocr_text, NULL, NULL";

fn document_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<DocumentRow> {
  Ok(DocumentRow {
    id:            row.get(0)?,
    filename:      row.get(1)?,
    file_path:     row.get(2)?,
    upload_date:   row.get(3)?,
    file_type:     row.get(4)?,
    file_size:     row.get(5)?,
    ocr_text:      row.get(6)?,
    summary_json:  row.get(7)?,
    metadata_json: row.get(8)?,
  })
}

fn readable_preview(row: DocumentRow) -> Option<DocumentPreview> {
  let id = row.id.clone();
  row
    .into_preview()
    .inspect_err(|e| {
      tracing::warn!(id = %id, error = %e, "skipping unreadable document row");
    })
    .ok()
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// The local store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  pub(crate) conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path`, creating missing parent
  /// directories, and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
      tokio::fs::create_dir_all(parent).await?;
    }
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    tracing::debug!(path = %path.display(), "opened local store");
    Ok(store)
  }

  /// Open an in-memory store, for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Number of rows in the `documents` table.
  pub async fn document_count(&self) -> Result<usize> {
    let count: i64 = self
      .conn
      .call(|conn| {
        Ok(conn.query_row("SELECT COUNT(*) FROM documents", [], |r| r.get(0))?)
      })
      .await?;
    Ok(usize::try_from(count).unwrap_or(0))
  }
}

// ─── DocumentBackend impl ────────────────────────────────────────────────────

impl DocumentBackend for SqliteStore {
  type Error = crate::Error;

  async fn upsert(&self, doc: &Document) -> Result<()> {
    let row = DocumentRow::from_document(doc)?;

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT OR REPLACE INTO documents (
             id, filename, file_path, upload_date, file_type,
             file_size, ocr_text, summary_json, metadata_json
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
          rusqlite::params![
            row.id,
            row.filename,
            row.file_path,
            row.upload_date,
            row.file_type,
            row.file_size,
            row.ocr_text,
            row.summary_json,
            row.metadata_json,
          ],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn list_recent(&self) -> Result<Vec<DocumentPreview>> {
    let rows: Vec<DocumentRow> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {PREVIEW_COLUMNS} FROM documents ORDER BY upload_date DESC"
        ))?;
        let rows = stmt
          .query_map([], document_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    Ok(rows.into_iter().filter_map(readable_preview).collect())
  }

  async fn get(&self, id: &str) -> Result<Option<Document>> {
    let id = id.to_owned();

    let row: Option<DocumentRow> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {DOCUMENT_COLUMNS} FROM documents WHERE id = ?1"),
              rusqlite::params![id],
              document_row,
            )
            .optional()?,
        )
      })
      .await?;

    Ok(row.map(DocumentRow::into_document).transpose()?)
  }

  async fn delete(&self, id: &str) -> Result<()> {
    let id = id.to_owned();

    self
      .conn
      .call(move |conn| {
        conn.execute("DELETE FROM documents WHERE id = ?1", rusqlite::params![id])?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn corpus(&self) -> Result<Vec<CorpusEntry>> {
    let rows: Vec<CorpusRow> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT id, filename, ocr_text FROM documents ORDER BY upload_date DESC",
        )?;
        let rows = stmt
          .query_map([], |row| {
            Ok(CorpusRow {
              id:       row.get(0)?,
              filename: row.get(1)?,
              ocr_text: row.get(2)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    Ok(rows.into_iter().map(CorpusEntry::from).collect())
  }
}
