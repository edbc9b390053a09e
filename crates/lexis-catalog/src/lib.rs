//! # lexis-catalog
//!
//! Turns per-feature translation fragments into a sealed, per-language
//! catalog plus a registry of named bundles, and resolves dotted keys against
//! both with a default-language fallback.

mod contribution;
mod coverage;
mod loader;
mod localizer;
mod merger;
mod pipeline;
mod registry;
pub mod rules;

// Re-export public API. All consumers use `lexis_catalog::*` paths.
pub use contribution::Contribution;
pub use coverage::{CoverageReport, LanguageCoverage};
pub use lexis_core::config::{BundleDecl, Rule};
pub use loader::{DirLoader, MemoryLoader};
pub use localizer::Localizer;
pub use merger::{CatalogBuilder, CatalogPhase, MergedCatalog};
pub use pipeline::{BuildOptions, Pipeline, PipelinePlan};
pub use registry::{BundleEntry, BundleRegistry};
