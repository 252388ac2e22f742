//! Error types for `sathi-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("document id must not be empty")]
  EmptyId,

  #[error("{column} does not hold a JSON object")]
  NotAnObject { column: &'static str },

  #[error("file size {0} does not fit a signed 64-bit column")]
  FileSizeOverflow(u64),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
