//! Document persistence and duplicate screening for eFile Sathi.
//!
//! [`ConnectionManager`] owns the handle to the document backend and reports
//! whether it is available. [`DocumentStore`] layers CRUD over it and turns
//! every backend failure into a degraded result (`false`, empty, `None`)
//! plus a log event. [`SimilarityIndex`] scans the store's corpus for likely
//! duplicates of a candidate text.
//!
//! [`Database::open`] wires all of it from [`Settings`] at process startup.

mod backend;
mod connection;
mod database;
mod documents;
mod settings;
mod similarity;

pub mod error;

pub use backend::{Backend, BackendError};
pub use connection::ConnectionManager;
pub use database::Database;
pub use documents::DocumentStore;
pub use error::{Error, Result};
pub use settings::Settings;
pub use similarity::SimilarityIndex;

#[cfg(test)]
mod tests;
