//! # lexis-memory
//!
//! Persistent preference store for Lexis (SQLite-backed). Only the active
//! language survives across sessions; catalogs are rebuilt on every start.

pub mod store;

pub use store::{Store, ACTIVE_LANGUAGE_KEY};
