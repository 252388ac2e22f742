//! SQL schema for the local SQLite store.
//!
//! Executed on every open. Foreign keys are enabled per connection so that
//! deleting a workflow removes its steps.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS grievances (
    id             TEXT PRIMARY KEY,
    subject        TEXT NOT NULL,
    details        TEXT,
    priority       TEXT DEFAULT 'normal',
    status         TEXT DEFAULT 'pending',
    submitted_date TEXT,
    due_date       TEXT,             -- YYYY-MM-DD
    resolved_date  TEXT,
    department     TEXT,
    citizen_name   TEXT,
    contact        TEXT,
    source_doc_id  TEXT,
    updates_json   TEXT              -- JSON array of GrievanceUpdate
);

CREATE TABLE IF NOT EXISTS workflows (
    doc_id              TEXT PRIMARY KEY,
    title               TEXT,
    current_status      TEXT,
    created_at          TEXT,
    updated_at          TEXT,
    priority            TEXT,
    expected_completion TEXT         -- YYYY-MM-DD
);

CREATE TABLE IF NOT EXISTS workflow_steps (
    id        INTEGER PRIMARY KEY AUTOINCREMENT,
    doc_id    TEXT NOT NULL,
    status    TEXT NOT NULL,
    timestamp TEXT,
    officer   TEXT,
    remarks   TEXT,
    FOREIGN KEY (doc_id) REFERENCES workflows (doc_id) ON DELETE CASCADE
);

-- Only written when the document fallback is enabled.
CREATE TABLE IF NOT EXISTS documents (
    id            TEXT PRIMARY KEY,
    filename      TEXT,
    file_path     TEXT,
    upload_date   TEXT,              -- RFC 3339 UTC, fixed precision
    file_type     TEXT,
    file_size     INTEGER,
    ocr_text      TEXT,
    summary_json  TEXT,
    metadata_json TEXT
);

CREATE INDEX IF NOT EXISTS workflow_steps_doc_idx  ON workflow_steps(doc_id);
CREATE INDEX IF NOT EXISTS documents_uploaded_idx  ON documents(upload_date);
";
