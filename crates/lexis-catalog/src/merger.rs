//! Catalog merging.
//!
//! A [`CatalogBuilder`] accumulates contributions per language with
//! last-writer-wins semantics and is consumed by [`CatalogBuilder::seal`]
//! into an immutable [`MergedCatalog`]. Overwrites never fail; they are only
//! logged.

use indexmap::IndexMap;
use lexis_core::{FragmentTree, LanguageCode};
use serde_json::Value;
use tracing::{debug, trace, warn};

use crate::contribution::Contribution;

/// Lifecycle phase of a catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogPhase {
    /// No contribution applied yet.
    Empty,
    /// Contributions are being applied.
    Accumulating,
    /// Read-only.
    Sealed,
}

#[derive(Debug, Clone)]
struct Slot {
    value: FragmentTree,
    origin: String,
}

/// Mutable, per-language accumulator.
#[derive(Debug, Default)]
pub struct CatalogBuilder {
    languages: IndexMap<LanguageCode, IndexMap<String, Slot>>,
    applied: usize,
    warn_on_collision: bool,
}

impl CatalogBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Log overwrites between different contributions at warn level.
    pub fn warn_on_collision(mut self, enabled: bool) -> Self {
        self.warn_on_collision = enabled;
        self
    }

    pub fn phase(&self) -> CatalogPhase {
        if self.applied == 0 {
            CatalogPhase::Empty
        } else {
            CatalogPhase::Accumulating
        }
    }

    /// Make `language` known to the catalog even if nothing is contributed.
    pub fn ensure_language(&mut self, language: &str) {
        if !self.languages.contains_key(language) {
            self.languages.insert(language.to_string(), IndexMap::new());
        }
    }

    /// Shallow-merge a contribution into `language`. Later values win.
    pub fn apply(&mut self, language: &str, contribution: Contribution) {
        self.ensure_language(language);
        self.applied += 1;
        let warn_on_collision = self.warn_on_collision;
        let Some(table) = self.languages.get_mut(language) else {
            return;
        };
        let (label, promoted, entries) = contribution.into_parts();

        for (key, value) in entries {
            if let Some(prev) = table.get(&key) {
                if prev.value.is_map() != value.is_map() && !promoted {
                    warn!(
                        "catalog[{language}]: type mismatch for '{key}' ({} replaced by {})",
                        prev.origin, label
                    );
                } else if prev.origin != label && prev.value != value {
                    if warn_on_collision {
                        warn!(
                            "catalog[{language}]: '{key}' from {} overwritten by {}",
                            prev.origin, label
                        );
                    } else {
                        trace!(
                            "catalog[{language}]: '{key}' from {} overwritten by {}",
                            prev.origin,
                            label
                        );
                    }
                }
            }
            table.insert(
                key,
                Slot {
                    value,
                    origin: label.clone(),
                },
            );
        }
    }

    /// Finish accumulation. The builder is consumed; the catalog has no
    /// mutation API.
    pub fn seal(self) -> MergedCatalog {
        let languages = self
            .languages
            .into_iter()
            .map(|(lang, table)| {
                let flat = table
                    .into_iter()
                    .map(|(key, slot)| (key, slot.value))
                    .collect();
                (lang, flat)
            })
            .collect();
        MergedCatalog { languages }
    }
}

/// Sealed, read-only catalog: one flat dictionary per language.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MergedCatalog {
    languages: IndexMap<LanguageCode, IndexMap<String, FragmentTree>>,
}

impl MergedCatalog {
    /// A sealed catalog with no languages.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> CatalogPhase {
        CatalogPhase::Sealed
    }

    pub fn languages(&self) -> impl Iterator<Item = &str> {
        self.languages.keys().map(String::as_str)
    }

    pub fn has_language(&self, language: &str) -> bool {
        self.languages.contains_key(language)
    }

    /// Value stored for `key`, walking into opaque sub-trees when `key`
    /// extends a stored object-valued key.
    ///
    /// The exact key wins; otherwise the longest stored prefix holding an
    /// object is walked with the remaining segments.
    pub fn get_tree(&self, language: &str, key: &str) -> Option<&FragmentTree> {
        let table = self.languages.get(language)?;
        if let Some(value) = table.get(key) {
            return Some(value);
        }
        key.rmatch_indices('.').find_map(|(idx, _)| {
            let (prefix, rest) = (&key[..idx], &key[idx + 1..]);
            match table.get(prefix) {
                Some(tree) if tree.is_map() => tree.walk(rest),
                _ => None,
            }
        })
    }

    /// Leaf string for `key` in `language`.
    pub fn get(&self, language: &str, key: &str) -> Option<&str> {
        match self.get_tree(language, key)? {
            FragmentTree::Text(text) => Some(text),
            FragmentTree::Map(_) => {
                debug!("catalog[{language}]: '{key}' is an object, not a leaf");
                None
            }
        }
    }

    pub fn contains_key(&self, language: &str, key: &str) -> bool {
        self.languages
            .get(language)
            .is_some_and(|t| t.contains_key(key))
    }

    /// Stored keys of `language` in merge order.
    pub fn keys<'a>(&'a self, language: &str) -> impl Iterator<Item = &'a str> + 'a {
        self.languages
            .get(language)
            .into_iter()
            .flat_map(|t| t.keys().map(String::as_str))
    }

    /// Number of stored keys for `language`.
    pub fn len(&self, language: &str) -> usize {
        self.languages.get(language).map_or(0, IndexMap::len)
    }

    /// Whether no language holds any key.
    pub fn is_empty(&self) -> bool {
        self.languages.values().all(IndexMap::is_empty)
    }

    /// Ordered JSON dump of one language, `Null` for unknown languages.
    pub fn to_json(&self, language: &str) -> Value {
        match self.languages.get(language) {
            Some(table) => Value::Object(
                table
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
            None => Value::Null,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contribution(label: &str, pairs: &[(&str, &str)]) -> Contribution {
        let mut c = Contribution::new(label);
        for (k, v) in pairs {
            c.insert(*k, FragmentTree::text(*v));
        }
        c
    }

    #[test]
    fn test_phase_transitions() {
        let mut builder = CatalogBuilder::new();
        assert_eq!(builder.phase(), CatalogPhase::Empty);
        builder.apply("en", contribution("a", &[("k", "v")]));
        assert_eq!(builder.phase(), CatalogPhase::Accumulating);
        let catalog = builder.seal();
        assert_eq!(catalog.phase(), CatalogPhase::Sealed);
    }

    #[test]
    fn test_last_writer_wins() {
        let mut builder = CatalogBuilder::new();
        builder.apply("en", contribution("c1", &[("title", "First"), ("only1", "x")]));
        builder.apply("en", contribution("c2", &[("title", "Second")]));
        let catalog = builder.seal();
        assert_eq!(catalog.get("en", "title"), Some("Second"));
        assert_eq!(catalog.get("en", "only1"), Some("x"));
    }

    #[test]
    fn test_last_writer_wins_with_collision_warnings() {
        let mut builder = CatalogBuilder::new().warn_on_collision(true);
        builder.apply("en", contribution("c1", &[("k", "1")]));
        builder.apply("en", contribution("c2", &[("k", "2")]));
        assert_eq!(builder.seal().get("en", "k"), Some("2"));
    }

    #[test]
    fn test_languages_are_independent() {
        let mut builder = CatalogBuilder::new();
        builder.apply("en", contribution("c", &[("k", "Hello")]));
        builder.apply("fr", contribution("c", &[("k", "Bonjour")]));
        let catalog = builder.seal();
        assert_eq!(catalog.get("en", "k"), Some("Hello"));
        assert_eq!(catalog.get("fr", "k"), Some("Bonjour"));
        assert_eq!(catalog.get("de", "k"), None);
    }

    #[test]
    fn test_ensure_language_without_contributions() {
        let mut builder = CatalogBuilder::new();
        builder.ensure_language("fr");
        assert_eq!(builder.phase(), CatalogPhase::Empty);
        let catalog = builder.seal();
        assert!(catalog.has_language("fr"));
        assert_eq!(catalog.len("fr"), 0);
        assert!(catalog.is_empty());
    }

    #[test]
    fn test_type_mismatch_is_overwritten_not_fatal() {
        let mut builder = CatalogBuilder::new();
        let mut c1 = Contribution::new("c1");
        c1.insert(
            "offers",
            FragmentTree::from_json(serde_json::json!({"title": "Offers"})),
        );
        builder.apply("en", c1);
        builder.apply("en", contribution("c2", &[("offers", "Flat")]));
        let catalog = builder.seal();
        assert_eq!(catalog.get("en", "offers"), Some("Flat"));
    }

    #[test]
    fn test_lookup_walks_opaque_subtrees() {
        let mut builder = CatalogBuilder::new();
        let mut c = Contribution::new("c");
        c.insert(
            "offers",
            FragmentTree::from_json(serde_json::json!({"list": {"empty": "No offers"}})),
        );
        c.insert("offers.list.empty", FragmentTree::text("Exact wins"));
        builder.apply("en", c);
        let catalog = builder.seal();
        assert_eq!(catalog.get("en", "offers.list.empty"), Some("Exact wins"));
        assert_eq!(catalog.get("en", "offers.list"), None);
        assert!(catalog.get_tree("en", "offers.list").is_some());
        assert_eq!(catalog.get("en", "offers.missing"), None);
    }

    #[test]
    fn test_lookup_prefers_longest_prefix() {
        let mut builder = CatalogBuilder::new();
        let mut c = Contribution::new("c");
        c.insert(
            "a",
            FragmentTree::from_json(serde_json::json!({"b": {"c": "from a"}})),
        );
        c.insert(
            "a.b",
            FragmentTree::from_json(serde_json::json!({"c": "from a.b"})),
        );
        builder.apply("en", c);
        assert_eq!(builder.seal().get("en", "a.b.c"), Some("from a.b"));
    }

    #[test]
    fn test_keys_and_dump_keep_merge_order() {
        let mut builder = CatalogBuilder::new();
        builder.apply("en", contribution("c1", &[("z", "1"), ("a", "2")]));
        builder.apply("en", contribution("c2", &[("m", "3"), ("z", "4")]));
        let catalog = builder.seal();
        let keys: Vec<&str> = catalog.keys("en").collect();
        assert_eq!(keys, vec!["z", "a", "m"]);
        assert_eq!(
            catalog.to_json("en"),
            serde_json::json!({"z": "4", "a": "2", "m": "3"})
        );
        assert_eq!(catalog.to_json("xx"), Value::Null);
    }
}
