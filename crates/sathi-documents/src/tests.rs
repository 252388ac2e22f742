//! Tests for the document layer against the in-memory SQLite backend.

use std::{
  io,
  sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
  },
};

use chrono::{DateTime, TimeZone, Utc};
use sathi_core::{
  document::{CorpusEntry, Document, DocumentPreview, NewDocument},
  legacy::{NewGrievance, NewWorkflow, NewWorkflowStep},
  store::DocumentBackend,
};
use sathi_store_sqlite::SqliteStore;
use serde_json::json;

use crate::{
  Backend, ConnectionManager, Database, DocumentStore, Error, Settings, SimilarityIndex,
};

const LETTER: &str = "To the District Collector, the applicant requests correction \
  of the land record for survey number 114 in the village of Rampur";

async fn local() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

async fn documents() -> (DocumentStore<SqliteStore>, SqliteStore) {
  let store = local().await;
  let connection = Arc::new(ConnectionManager::ready(store.clone()));
  (DocumentStore::new(connection), store)
}

fn unavailable() -> DocumentStore<SqliteStore> {
  DocumentStore::new(Arc::new(ConnectionManager::unavailable(
    "SUPABASE_URL is not configured",
  )))
}

fn at(day: u32) -> DateTime<Utc> { Utc.with_ymd_and_hms(2024, 4, day, 10, 0, 0).unwrap() }

fn new_document(id: &str, text: &str) -> NewDocument {
  let mut input = NewDocument::new(id, format!("{id}.pdf"), text);
  input.file_path = format!("uploads/{id}.pdf");
  input.file_size = 2048;
  input
}

/// A backend whose every call fails, as a reachable but broken remote would.
struct BrokenBackend;

impl DocumentBackend for BrokenBackend {
  type Error = io::Error;

  async fn upsert(&self, _doc: &Document) -> io::Result<()> {
    Err(io::Error::other("connection reset"))
  }

  async fn list_recent(&self) -> io::Result<Vec<DocumentPreview>> {
    Err(io::Error::other("connection reset"))
  }

  async fn get(&self, _id: &str) -> io::Result<Option<Document>> {
    Err(io::Error::other("connection reset"))
  }

  async fn delete(&self, _id: &str) -> io::Result<()> {
    Err(io::Error::other("connection reset"))
  }

  async fn corpus(&self) -> io::Result<Vec<CorpusEntry>> {
    Err(io::Error::other("connection reset"))
  }
}

// ─── ConnectionManager ───────────────────────────────────────────────────────

#[test]
fn lazy_connection_is_built_once_under_contention() {
  let calls = Arc::new(AtomicUsize::new(0));
  let counter = Arc::clone(&calls);
  let manager = ConnectionManager::lazy(move || {
    counter.fetch_add(1, Ordering::SeqCst);
    std::thread::sleep(std::time::Duration::from_millis(20));
    Ok(42_u32)
  });

  std::thread::scope(|scope| {
    for _ in 0..8 {
      scope.spawn(|| assert_eq!(manager.client().as_deref(), Some(&42)));
    }
  });
  assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn failed_connection_is_cached_and_reported() {
  let calls = Arc::new(AtomicUsize::new(0));
  let counter = Arc::clone(&calls);
  let manager: ConnectionManager<u32> = ConnectionManager::lazy(move || {
    counter.fetch_add(1, Ordering::SeqCst);
    Err(Error::MissingSetting("SUPABASE_KEY"))
  });

  assert!(!manager.connect_now());
  assert!(manager.client().is_none());
  let err = manager.require().unwrap_err();
  assert!(matches!(err, Error::Unavailable(reason) if reason.contains("SUPABASE_KEY")));
  assert_eq!(calls.load(Ordering::SeqCst), 1);
}

// ─── DocumentStore ───────────────────────────────────────────────────────────

#[tokio::test]
async fn save_then_get_by_id_roundtrips() {
  let (docs, _) = documents().await;
  let text = "alpha beta gamma delta epsilon";

  let mut input = new_document("d1", text);
  input.summary = [("language", json!("en"))].into_iter().collect();
  assert!(docs.save(input).await);

  let detail = docs.get_by_id("d1").await.expect("saved document");
  assert_eq!(detail.full_text, text);
  assert_eq!(detail.word_count, 5);
  assert_eq!(detail.title, "d1.pdf");
  assert_eq!(detail.file_type, ".pdf");
  assert_eq!(detail.summary.get("language"), Some(&json!("en")));
  assert!(detail.metadata.is_empty());
}

#[tokio::test]
async fn save_is_an_idempotent_upsert() {
  let (docs, store) = documents().await;
  let mut input = new_document("d1", LETTER);
  input.upload_date = Some(at(1));

  assert!(docs.save(input.clone()).await);
  assert!(docs.save(input.clone()).await);

  assert_eq!(store.document_count().await.unwrap(), 1);
  let stored = store.get("d1").await.unwrap().unwrap();
  assert_eq!(stored, input.into_document(Utc::now()).unwrap());
}

#[tokio::test]
async fn supplied_upload_date_survives_roundtrip() {
  let (docs, _) = documents().await;
  let mut input = new_document("d1", LETTER);
  input.upload_date = Some(Utc.timestamp_opt(1_712_000_000, 123_456_789).unwrap());
  assert!(docs.save(input.clone()).await);
  assert!(docs.save(input).await);

  let detail = docs.get_by_id("d1").await.unwrap();
  assert_eq!(detail.upload_date, Utc.timestamp_opt(1_712_000_000, 123_456_000).unwrap());
  assert_eq!(docs.list().await[0].upload_date, detail.upload_date);
}

#[tokio::test]
async fn resave_overwrites_the_whole_record() {
  let (docs, _) = documents().await;
  assert!(docs.save(new_document("d1", "first text")).await);

  let mut second = NewDocument::new("d1", "", "second text");
  second.file_type = Some(".txt".into());
  assert!(docs.save(second).await);

  let detail = docs.get_by_id("d1").await.unwrap();
  assert_eq!(detail.full_text, "second text");
  assert_eq!(detail.filename, "");
  assert_eq!(detail.file_path, "");
  assert_eq!(detail.file_size, 0);
  assert_eq!(detail.title, "d1");
}

#[tokio::test]
async fn save_assigns_upload_date_when_absent() {
  let (docs, _) = documents().await;
  let before = Utc::now() - chrono::Duration::seconds(1);
  assert!(docs.save(new_document("d1", "text")).await);

  let detail = docs.get_by_id("d1").await.unwrap();
  assert!(detail.upload_date >= before);
  assert!(detail.upload_date <= Utc::now());
}

#[tokio::test]
async fn save_rejects_blank_id() {
  let (docs, store) = documents().await;
  assert!(!docs.save(new_document("", "text")).await);
  assert_eq!(store.document_count().await.unwrap(), 0);
}

#[tokio::test]
async fn list_is_newest_first_with_previews() {
  let (docs, _) = documents().await;
  let mut a = new_document("a", &"z".repeat(305));
  a.upload_date = Some(at(1));
  let mut b = new_document("b", "short text here");
  b.upload_date = Some(at(2));
  assert!(docs.save(a).await);
  assert!(docs.save(b).await);

  let list = docs.list().await;
  assert_eq!(list.len(), 2);
  assert_eq!(list[0].id, "b");
  assert_eq!(list[0].text_preview, "short text here");
  assert_eq!(list[0].word_count, 3);
  assert_eq!(list[1].text_preview, format!("{}...", "z".repeat(300)));
  assert_eq!(list[1].word_count, 1);
}

#[tokio::test]
async fn get_by_id_missing_is_none_but_lookup_says_why() {
  let (docs, _) = documents().await;
  assert!(docs.get_by_id("nope").await.is_none());
  assert!(matches!(docs.lookup("nope").await, Ok(None)));

  let down = unavailable();
  assert!(down.get_by_id("nope").await.is_none());
  assert!(matches!(down.lookup("nope").await, Err(Error::Unavailable(_))));
}

#[tokio::test]
async fn delete_missing_id_succeeds_and_changes_nothing() {
  let (docs, store) = documents().await;
  assert!(docs.save(new_document("d1", "text")).await);

  assert!(docs.delete("missing-id").await);
  assert_eq!(store.document_count().await.unwrap(), 1);

  assert!(docs.delete("d1").await);
  assert!(docs.get_by_id("d1").await.is_none());
}

#[tokio::test]
async fn unavailable_store_degrades_every_operation() {
  let docs = unavailable();

  assert!(!docs.save(new_document("d1", LETTER)).await);
  assert!(docs.list().await.is_empty());
  assert!(docs.get_by_id("d1").await.is_none());
  assert!(!docs.delete("d1").await);
  assert!(docs.corpus().await.is_empty());

  let index = SimilarityIndex::new(docs);
  assert!(index.find_similar_default(LETTER).await.is_empty());
}

#[tokio::test]
async fn failing_backend_degrades_every_operation() {
  let docs = DocumentStore::new(Arc::new(ConnectionManager::ready(BrokenBackend)));

  assert!(!docs.save(new_document("d1", LETTER)).await);
  assert!(docs.list().await.is_empty());
  assert!(docs.get_by_id("d1").await.is_none());
  assert!(matches!(docs.lookup("d1").await, Err(Error::Backend(_))));
  assert!(!docs.delete("d1").await);

  let index = SimilarityIndex::new(docs);
  assert!(index.find_similar(LETTER, 0.0).await.is_empty());
}

// ─── SimilarityIndex ─────────────────────────────────────────────────────────

#[tokio::test]
async fn resubmitted_letter_is_flagged() {
  let (docs, _) = documents().await;
  let mut original = new_document("orig", LETTER);
  original.upload_date = Some(at(1));
  assert!(docs.save(original).await);
  let mut unrelated = new_document(
    "other",
    "Minutes of the panchayat meeting held on Monday about drainage works and budget",
  );
  unrelated.upload_date = Some(at(2));
  assert!(docs.save(unrelated).await);

  let index = SimilarityIndex::new(docs);
  let matches = index.find_similar_default(&LETTER.to_uppercase()).await;

  assert_eq!(matches.len(), 1);
  assert_eq!(matches[0].id, "orig");
  assert_eq!(matches[0].filename, "orig.pdf");
  assert_eq!(matches[0].similarity, 100.0);
}

#[tokio::test]
async fn short_candidates_and_documents_never_match() {
  let (docs, _) = documents().await;
  assert!(docs.save(new_document("tiny", "land record correction")).await);
  assert!(docs.save(new_document("full", LETTER)).await);

  let index = SimilarityIndex::new(docs);
  assert!(index.find_similar("land record correction", 0.0).await.is_empty());
  assert!(index.find_similar("", 0.0).await.is_empty());

  let ids: Vec<String> = index
    .find_similar(LETTER, 0.0)
    .await
    .into_iter()
    .map(|m| m.id)
    .collect();
  assert_eq!(ids, ["full"]);
}

#[tokio::test]
async fn empty_corpus_has_no_matches() {
  let (docs, _) = documents().await;
  let index = SimilarityIndex::new(docs);
  assert!(index.find_similar(LETTER, 0.0).await.is_empty());
}

// ─── Settings ────────────────────────────────────────────────────────────────

#[test]
fn settings_defaults() {
  let settings = Settings::from_toml("").unwrap();
  assert_eq!(settings.local_store_path, std::path::PathBuf::from("data/digifest.db"));
  assert!(!settings.local_document_fallback);
  assert!(matches!(
    settings.remote_config(),
    Err(Error::MissingSetting("SUPABASE_URL"))
  ));
}

#[test]
fn blank_remote_settings_count_as_missing() {
  let settings = Settings::from_toml(
    r#"
    supabase_url = "https://example.supabase.co"
    supabase_key = "   "
    "#,
  )
  .unwrap();
  assert!(matches!(
    settings.remote_config(),
    Err(Error::MissingSetting("SUPABASE_KEY"))
  ));
}

#[test]
fn remote_settings_are_trimmed() {
  let settings = Settings::from_toml(
    r#"
    supabase_url = " https://example.supabase.co "
    supabase_key = "service-key"
    local_document_fallback = true
    "#,
  )
  .unwrap();
  let remote = settings.remote_config().unwrap();
  assert_eq!(remote.endpoint, "https://example.supabase.co");
  assert_eq!(remote.api_key, "service-key");
  assert!(settings.local_document_fallback);
}

#[test]
fn settings_load_reads_a_toml_file() {
  let dir = tempfile::tempdir().unwrap();
  let path = dir.path().join("sathi.toml");
  let store_path = dir.path().join("local.db");
  std::fs::write(
    &path,
    format!("local_store_path = {:?}\nlocal_document_fallback = true\n", store_path),
  )
  .unwrap();

  let settings = Settings::load(Some(path.as_path())).unwrap();
  assert_eq!(settings.local_store_path, store_path);
  assert!(settings.local_document_fallback);
}

fn env(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
  pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
}

#[test]
fn settings_read_only_scoped_variables() {
  let settings = Settings::load_from(
    None,
    env(&[
      ("LOCAL_STORE_PATH", "/elsewhere/other.db"),
      ("LOCAL_DOCUMENT_FALLBACK", "true"),
      ("SUPABASE_URL", "https://example.supabase.co"),
      ("SUPABASE_KEY", "service-key"),
      ("SUPABASE_ANON", "ignored"),
    ]),
  )
  .unwrap();

  assert_eq!(settings.local_store_path, std::path::PathBuf::from("data/digifest.db"));
  assert!(!settings.local_document_fallback);
  assert_eq!(settings.supabase_url.as_deref(), Some("https://example.supabase.co"));
  assert_eq!(settings.supabase_key.as_deref(), Some("service-key"));
}

#[test]
fn prefixed_variables_override_the_file() {
  let dir = tempfile::tempdir().unwrap();
  let path = dir.path().join("sathi.toml");
  std::fs::write(&path, "local_store_path = \"from-file.db\"\n").unwrap();

  let settings = Settings::load_from(
    Some(path.as_path()),
    env(&[
      ("SATHI_LOCAL_STORE_PATH", "from-env.db"),
      ("SATHI_LOCAL_DOCUMENT_FALLBACK", "true"),
    ]),
  )
  .unwrap();
  assert_eq!(settings.local_store_path, std::path::PathBuf::from("from-env.db"));
  assert!(settings.local_document_fallback);
}

// ─── Database ────────────────────────────────────────────────────────────────

fn offline_settings(dir: &tempfile::TempDir, fallback: bool) -> Settings {
  Settings {
    local_store_path: dir.path().join("data").join("digifest.db"),
    local_document_fallback: fallback,
    ..Settings::default()
  }
}

#[tokio::test]
async fn offline_database_keeps_legacy_entities_working() {
  let dir = tempfile::tempdir().unwrap();
  let db = Database::open(&offline_settings(&dir, false)).await.unwrap();

  assert!(!db.connection.is_available());
  assert!(!db.documents.save(new_document("d1", LETTER)).await);
  assert!(db.documents.get_by_id("d1").await.is_none());
  assert!(!db.documents.delete("d1").await);
  assert!(db.similarity.find_similar_default(LETTER).await.is_empty());

  let grievance = db
    .local
    .save_grievance(NewGrievance::new("Pension not credited"))
    .await
    .unwrap();
  assert_eq!(grievance.status, "pending");

  db.local.save_workflow(NewWorkflow::new("d1")).await.unwrap();
  db.local
    .add_workflow_step("d1", NewWorkflowStep::new("received"))
    .await
    .unwrap();
  assert_eq!(db.local.workflow_steps("d1").await.unwrap().len(), 1);
}

#[tokio::test]
async fn document_fallback_persists_locally() {
  let dir = tempfile::tempdir().unwrap();
  let db = Database::open(&offline_settings(&dir, true)).await.unwrap();

  assert!(matches!(db.connection.client().as_deref(), Some(Backend::Local(_))));
  assert!(db.documents.save(new_document("d1", LETTER)).await);
  assert_eq!(db.local.document_count().await.unwrap(), 1);

  let matches = db.similarity.find_similar_default(LETTER).await;
  assert_eq!(matches.len(), 1);
  assert_eq!(matches[0].id, "d1");
}

#[tokio::test]
async fn configured_remote_is_preferred() {
  let dir = tempfile::tempdir().unwrap();
  let settings = Settings {
    supabase_url: Some("https://example.supabase.co".into()),
    supabase_key: Some("service-key".into()),
    ..offline_settings(&dir, true)
  };
  let db = Database::open(&settings).await.unwrap();

  let backend = db.connection.client().expect("remote backend");
  assert_eq!(backend.name(), "remote");
}
