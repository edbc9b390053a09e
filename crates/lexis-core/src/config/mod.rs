mod defaults;
mod pipeline;


pub use pipeline::*;

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::LexisError;
use defaults::*;

/// Top-level Lexis configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub lexis: LexisConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub memory: MemoryConfig,
    /// Ordered merge steps; declaration order is merge order.
    #[serde(default)]
    pub pipeline: Vec<Rule>,
    /// Fragments that are additionally registered as named bundles.
    #[serde(default)]
    pub bundles: Vec<BundleDecl>,
}

/// General settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LexisConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for LexisConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            log_level: default_log_level(),
        }
    }
}

/// Catalog construction settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Fallback language for every lookup.
    #[serde(default = "default_language")]
    pub default_language: String,
    /// Root of the `{language}/{path}.json` fragment tree.
    #[serde(default = "default_fragments_dir")]
    pub fragments_dir: String,
    /// Child name promoted to the bare root key by `promoteRoot` steps.
    #[serde(default = "default_title_key")]
    pub title_key: String,
    /// Log overwrites between different contributions at warn instead of trace.
    #[serde(default)]
    pub warn_on_collision: bool,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            default_language: default_language(),
            fragments_dir: default_fragments_dir(),
            title_key: default_title_key(),
            warn_on_collision: false,
        }
    }
}

/// Preference store config.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryConfig {
    #[serde(default = "default_db_path")]
    pub db_path: String,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
        }
    }
}

/// Expand `~` to home directory.
pub fn shellexpand(path: &str) -> String {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = std::env::var_os("HOME") {
            return format!("{}/{rest}", home.to_string_lossy());
        }
    }
    path.to_string()
}

/// Load configuration from a TOML file.
///
/// Falls back to defaults if the file does not exist.
pub fn load(path: &str) -> Result<Config, LexisError> {
    let path = Path::new(path);
    if !path.exists() {
        tracing::info!(
            "Config file not found at {}, using defaults",
            path.display()
        );
        return Ok(Config::default());
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| LexisError::Config(format!("failed to read {}: {}", path.display(), e)))?;

    parse(&content)
}

/// Parse configuration from TOML text and check the declared bundles.
pub fn parse(content: &str) -> Result<Config, LexisError> {
    let config: Config = toml::from_str(content)
        .map_err(|e| LexisError::Config(format!("failed to parse config: {}", e)))?;

    if config.catalog.default_language.trim().is_empty() {
        return Err(LexisError::Config(
            "catalog.default_language must not be empty".to_string(),
        ));
    }

    if let Some(decl) = config.bundles.iter().find(|b| b.name.trim().is_empty()) {
        return Err(LexisError::Config(format!(
            "bundle declared for source '{}' has an empty name",
            decl.source
        )));
    }

    Ok(config)
}
