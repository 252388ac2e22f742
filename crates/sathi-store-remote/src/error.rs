//! Error type for `sathi-store-remote`.

use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("invalid endpoint {endpoint:?}: {reason}")]
  InvalidEndpoint { endpoint: String, reason: String },

  #[error("api key is not a valid header value")]
  InvalidKey(#[from] reqwest::header::InvalidHeaderValue),

  #[error("http error: {0}")]
  Http(#[from] reqwest::Error),

  #[error("{operation} → {status}: {body}")]
  Status {
    operation: &'static str,
    status:    StatusCode,
    body:      String,
  },

  #[error("row error: {0}")]
  Row(#[from] sathi_core::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
