//! Error type for `sathi-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] sathi_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("io error: {0}")]
  Io(#[from] std::io::Error),

  #[error("date parse error: {0}")]
  DateParse(String),

  #[error("grievance not found: {0}")]
  GrievanceNotFound(String),

  #[error("workflow not found: {0}")]
  WorkflowNotFound(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
