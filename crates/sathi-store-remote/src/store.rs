//! [`RemoteStore`]: the PostgREST implementation of [`DocumentBackend`].

use std::time::Duration;

use reqwest::{
  Client, RequestBuilder, Response, Url,
  header::{AUTHORIZATION, HeaderMap, HeaderValue},
};
use sathi_core::{
  document::{CorpusEntry, Document, DocumentPreview},
  row::{CorpusRow, DocumentRow},
  store::DocumentBackend,
};

use crate::{Error, Result};

const TABLE_PATH: &str = "/rest/v1/documents";

/// Every column except summary and metadata, which previews never show.
const PREVIEW_SELECT: &str = "id,filename,file_path,upload_date,file_type,file_size,ocr_text";

/// Ask PostgREST to merge on the primary key instead of failing on conflict.
const UPSERT_PREFERENCE: &str = "resolution=merge-duplicates,return=minimal";

/// Connection settings for the remote store.
#[derive(Debug, Clone)]
pub struct RemoteConfig {
  /// Project URL, e.g. `https://abc.supabase.co`.
  pub endpoint: String,
  /// Service or anon key; sent as both `apikey` and bearer token.
  pub api_key:  String,
}

/// Async HTTP client for the remote `documents` table.
///
/// Cheap to clone; the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct RemoteStore {
  client: Client,
  table:  String,
}

impl std::fmt::Debug for RemoteStore {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("RemoteStore").field("table", &self.table).finish()
  }
}

impl RemoteStore {
  /// Build a client for `config`. No request is made; an unreachable
  /// endpoint only shows up on the first operation.
  pub fn connect(config: RemoteConfig) -> Result<Self> {
    let endpoint = Url::parse(config.endpoint.trim()).map_err(|e| {
      Error::InvalidEndpoint { endpoint: config.endpoint.clone(), reason: e.to_string() }
    })?;
    if !matches!(endpoint.scheme(), "http" | "https") {
      return Err(Error::InvalidEndpoint {
        endpoint: config.endpoint,
        reason:   "scheme must be http or https".into(),
      });
    }

    let mut apikey = HeaderValue::from_str(&config.api_key)?;
    apikey.set_sensitive(true);
    let mut bearer = HeaderValue::from_str(&format!("Bearer {}", config.api_key))?;
    bearer.set_sensitive(true);

    let mut headers = HeaderMap::new();
    headers.insert("apikey", apikey);
    headers.insert(AUTHORIZATION, bearer);

    let client = Client::builder()
      .timeout(Duration::from_secs(30))
      .default_headers(headers)
      .build()?;

    Ok(Self {
      client,
      table: format!("{}{TABLE_PATH}", endpoint.as_str().trim_end_matches('/')),
    })
  }

  /// Send `req` and turn a non-2xx status into [`Error::Status`].
  async fn send(operation: &'static str, req: RequestBuilder) -> Result<Response> {
    let resp = req.send().await?;
    let status = resp.status();
    if status.is_success() {
      return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    tracing::debug!(operation, %status, "remote store rejected request");
    Err(Error::Status { operation, status, body })
  }
}

// ─── DocumentBackend impl ────────────────────────────────────────────────────

impl DocumentBackend for RemoteStore {
  type Error = Error;

  /// `POST /rest/v1/documents?on_conflict=id`
  async fn upsert(&self, doc: &Document) -> Result<()> {
    let rows = [DocumentRow::from_document(doc)?];
    Self::send(
      "upsert",
      self
        .client
        .post(&self.table)
        .query(&[("on_conflict", "id")])
        .header("Prefer", UPSERT_PREFERENCE)
        .json(&rows),
    )
    .await?;
    Ok(())
  }

  /// `GET /rest/v1/documents?select=<preview columns>&order=upload_date.desc`
  async fn list_recent(&self) -> Result<Vec<DocumentPreview>> {
    let rows: Vec<DocumentRow> = Self::send(
      "list",
      self
        .client
        .get(&self.table)
        .query(&[("select", PREVIEW_SELECT), ("order", "upload_date.desc")]),
    )
    .await?
    .json()
    .await?;

    Ok(
      rows
        .into_iter()
        .filter_map(|row| {
          let id = row.id.clone();
          row
            .into_preview()
            .inspect_err(|e| {
              tracing::warn!(id = %id, error = %e, "skipping unreadable document row");
            })
            .ok()
        })
        .collect(),
    )
  }

  /// `GET /rest/v1/documents?select=*&id=eq.<id>`
  async fn get(&self, id: &str) -> Result<Option<Document>> {
    let filter = format!("eq.{id}");
    let rows: Vec<DocumentRow> = Self::send(
      "get",
      self
        .client
        .get(&self.table)
        .query(&[("select", "*"), ("id", filter.as_str())]),
    )
    .await?
    .json()
    .await?;

    Ok(rows.into_iter().next().map(DocumentRow::into_document).transpose()?)
  }

  /// `DELETE /rest/v1/documents?id=eq.<id>`
  ///
  /// PostgREST answers 204 whether or not a row matched.
  async fn delete(&self, id: &str) -> Result<()> {
    Self::send(
      "delete",
      self
        .client
        .delete(&self.table)
        .query(&[("id", format!("eq.{id}"))]),
    )
    .await?;
    Ok(())
  }

  /// `GET /rest/v1/documents?select=id,filename,ocr_text&order=upload_date.desc`
  async fn corpus(&self) -> Result<Vec<CorpusEntry>> {
    let rows: Vec<CorpusRow> = Self::send(
      "corpus",
      self
        .client
        .get(&self.table)
        .query(&[("select", "id,filename,ocr_text"), ("order", "upload_date.desc")]),
    )
    .await?
    .json()
    .await?;

    Ok(rows.into_iter().map(CorpusEntry::from).collect())
  }
}
