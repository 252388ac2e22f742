//! Embedded SQLite store for eFile Sathi.
//!
//! Holds the legacy grievance and workflow tables, and can also serve the
//! `documents` table when the remote store is unreachable and the document
//! fallback is enabled. Wraps [`tokio_rusqlite`] so all database access runs
//! on a dedicated thread without blocking the async runtime.

mod encode;
mod legacy;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;
