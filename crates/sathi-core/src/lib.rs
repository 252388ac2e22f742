//! Core types and trait definitions for the eFile Sathi document layer.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! Storage backends implement [`store::DocumentBackend`]; the matcher math in
//! [`similarity`] works on plain text so it can be tested without a store.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod document;
pub mod error;
pub mod legacy;
pub mod row;
pub mod similarity;
pub mod store;

pub use error::{Error, Result};
