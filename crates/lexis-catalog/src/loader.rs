//! Fragment loaders.

use indexmap::IndexMap;
use lexis_core::traits::{FragmentLoader, FragmentSet};
use lexis_core::{shellexpand, FragmentTree, LanguageCode};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Loads `{root}/{language}/{path}.json`.
///
/// Every sub-directory of `root` is a language. Files are discovered
/// recursively and keyed by their path relative to the language directory,
/// without extension and with `/` separators (`orders/list`). A file that
/// cannot be read or is not a JSON object loads as `{}`.
#[derive(Debug, Clone)]
pub struct DirLoader {
    root: PathBuf,
}

impl DirLoader {
    pub fn new(root: &str) -> Self {
        Self {
            root: PathBuf::from(shellexpand(root)),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl FragmentLoader for DirLoader {
    fn name(&self) -> &str {
        "dir"
    }

    fn languages(&self) -> Vec<LanguageCode> {
        let entries = match std::fs::read_dir(&self.root) {
            Ok(e) => e,
            Err(e) => {
                warn!("loader: cannot read {}: {e}", self.root.display());
                return Vec::new();
            }
        };

        let mut languages: Vec<LanguageCode> = entries
            .flatten()
            .filter(|entry| entry.path().is_dir())
            .filter_map(|entry| entry.file_name().to_str().map(str::to_string))
            .filter(|name| !name.starts_with('.'))
            .collect();
        languages.sort();
        languages
    }

    fn load(&self, language: &str) -> FragmentSet {
        let base = self.root.join(language);
        let mut files = Vec::new();
        collect_json_files(&base, &mut files);
        files.sort();

        let mut set = FragmentSet::new();
        for file in files {
            let Some(path) = fragment_path(&base, &file) else {
                continue;
            };
            set.insert(path, read_fragment(&file));
        }
        debug!("loader: {} fragments for '{language}'", set.len());
        set
    }
}

fn collect_json_files(dir: &Path, out: &mut Vec<PathBuf>) {
    let entries = match std::fs::read_dir(dir) {
        Ok(e) => e,
        Err(_) => return,
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_json_files(&path, out);
        } else if path.extension().and_then(|e| e.to_str()) == Some("json") {
            out.push(path);
        }
    }
}

/// `{base}/orders/list.json` → `orders/list`.
fn fragment_path(base: &Path, file: &Path) -> Option<String> {
    let relative = file.strip_prefix(base).ok()?.with_extension("");
    let segments: Vec<&str> = relative
        .components()
        .filter_map(|c| c.as_os_str().to_str())
        .collect();
    if segments.is_empty() {
        return None;
    }
    Some(segments.join("/"))
}

/// Read one fragment file. Any failure yields `{}`.
fn read_fragment(file: &Path) -> FragmentTree {
    let content = match std::fs::read_to_string(file) {
        Ok(c) => c,
        Err(e) => {
            warn!("loader: failed to read {}: {e}", file.display());
            return FragmentTree::empty();
        }
    };
    match serde_json::from_str::<Value>(&content) {
        Ok(value @ Value::Object(_)) => FragmentTree::from_json(value),
        Ok(_) => {
            warn!("loader: {} is not a JSON object, using {{}}", file.display());
            FragmentTree::empty()
        }
        Err(e) => {
            warn!("loader: invalid JSON in {}: {e}", file.display());
            FragmentTree::empty()
        }
    }
}

/// In-memory loader: `{language: {path: tree}}`.
#[derive(Debug, Clone, Default)]
pub struct MemoryLoader {
    fragments: IndexMap<LanguageCode, FragmentSet>,
}

impl MemoryLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) one fragment.
    pub fn with(mut self, language: &str, path: &str, tree: impl Into<FragmentTree>) -> Self {
        self.insert(language, path, tree);
        self
    }

    pub fn insert(&mut self, language: &str, path: &str, tree: impl Into<FragmentTree>) {
        self.fragments
            .entry(language.to_string())
            .or_default()
            .insert(path, tree.into());
    }

    /// Make a language known without supplying any fragment.
    pub fn with_language(mut self, language: &str) -> Self {
        self.fragments.entry(language.to_string()).or_default();
        self
    }
}

impl FragmentLoader for MemoryLoader {
    fn name(&self) -> &str {
        "memory"
    }

    fn languages(&self) -> Vec<LanguageCode> {
        self.fragments.keys().cloned().collect()
    }

    fn load(&self, language: &str) -> FragmentSet {
        self.fragments.get(language).cloned().unwrap_or_default()
    }
}
