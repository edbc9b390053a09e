//! # lexis-core
//!
//! Core types, traits, configuration, and error handling for Lexis.

pub mod config;
pub mod error;
pub mod fragment;
pub mod language;
pub mod traits;

pub use config::shellexpand;
pub use fragment::FragmentTree;
pub use language::{LanguageCode, DEFAULT_LANGUAGE};
