//! Remote document store for eFile Sathi.
//!
//! Talks to the `documents` table of a hosted Postgres through its PostgREST
//! endpoint (the Supabase REST surface). Auth, retries and schema management
//! are out of scope: the table is expected to exist.

mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::{RemoteConfig, RemoteStore};
