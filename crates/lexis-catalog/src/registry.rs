//! Named bundles: nested dictionaries looked up by `(language, name)`.

use indexmap::IndexMap;
use lexis_core::error::LexisError;
use lexis_core::language::validate_language;
use lexis_core::{FragmentTree, LanguageCode};
use tracing::debug;

/// A stored bundle tree and the deep-merge flag of its latest registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleEntry {
    pub tree: FragmentTree,
    pub deep_merge: bool,
}

/// Table `(language, bundle name) → tree`.
///
/// Registrations for different names never depend on each other's order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BundleRegistry {
    bundles: IndexMap<LanguageCode, IndexMap<String, BundleEntry>>,
}

impl BundleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `tree` under `(language, name)`.
    ///
    /// A first registration stores the tree verbatim. Afterwards `deep_merge`
    /// merges recursively into the stored tree (incoming leaves win, absent
    /// keys keep their value) and `!deep_merge` replaces it. Registering the
    /// same tree twice leaves the registry unchanged.
    ///
    /// A blank bundle name or language is a programming error and is
    /// rejected.
    pub fn register(
        &mut self,
        language: &str,
        name: &str,
        tree: FragmentTree,
        deep_merge: bool,
    ) -> Result<(), LexisError> {
        if name.trim().is_empty() {
            return Err(LexisError::InvalidRegistration(format!(
                "bundle name must not be empty (language '{language}')"
            )));
        }
        let language = validate_language(language)?;

        let per_language = self.bundles.entry(language.to_string()).or_default();
        match per_language.get_mut(name) {
            Some(entry) if deep_merge => {
                debug!("bundle[{language}/{name}]: deep merge");
                entry.tree.deep_merge(tree);
                entry.deep_merge = true;
            }
            Some(entry) => {
                debug!("bundle[{language}/{name}]: replaced");
                entry.tree = tree;
                entry.deep_merge = false;
            }
            None => {
                debug!("bundle[{language}/{name}]: registered");
                per_language.insert(name.to_string(), BundleEntry { tree, deep_merge });
            }
        }
        Ok(())
    }

    pub fn get(&self, language: &str, name: &str) -> Option<&FragmentTree> {
        self.entry(language, name).map(|e| &e.tree)
    }

    pub fn entry(&self, language: &str, name: &str) -> Option<&BundleEntry> {
        self.bundles.get(language)?.get(name)
    }

    pub fn contains(&self, language: &str, name: &str) -> bool {
        self.entry(language, name).is_some()
    }

    /// Deep-merge flag recorded by the latest registration.
    pub fn deep_merge_flag(&self, language: &str, name: &str) -> Option<bool> {
        self.entry(language, name).map(|e| e.deep_merge)
    }

    /// Leaf string at dotted `key` inside a bundle.
    pub fn lookup(&self, language: &str, name: &str, key: &str) -> Option<&str> {
        self.get(language, name)?.walk(key)?.as_text()
    }

    /// Bundle names registered for `language`, in registration order.
    pub fn bundle_names(&self, language: &str) -> Vec<&str> {
        self.bundles
            .get(language)
            .map(|m| m.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// Total number of `(language, name)` entries.
    pub fn len(&self) -> usize {
        self.bundles.values().map(IndexMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn tree(value: serde_json::Value) -> FragmentTree {
        FragmentTree::from_json(value)
    }

    #[test]
    fn test_first_registration_is_verbatim() {
        let mut reg = BundleRegistry::new();
        reg.register("en", "orders", tree(json!({"a": "1"})), true)
            .unwrap();
        assert_eq!(reg.get("en", "orders"), Some(&tree(json!({"a": "1"}))));
        assert_eq!(reg.deep_merge_flag("en", "orders"), Some(true));
    }

    #[test]
    fn test_deep_merge_independent_keys() {
        let mut reg = BundleRegistry::new();
        reg.register("en", "b", tree(json!({"a": "1"})), true).unwrap();
        reg.register("en", "b", tree(json!({"b": "2"})), true).unwrap();
        assert_eq!(reg.get("en", "b"), Some(&tree(json!({"a": "1", "b": "2"}))));
    }

    #[test]
    fn test_deep_merge_same_key_overwrites() {
        let mut reg = BundleRegistry::new();
        reg.register("en", "b", tree(json!({"a": "1"})), true).unwrap();
        reg.register("en", "b", tree(json!({"a": "2"})), true).unwrap();
        assert_eq!(reg.get("en", "b"), Some(&tree(json!({"a": "2"}))));
    }

    #[test]
    fn test_deep_merge_nested_and_absent_values() {
        let mut reg = BundleRegistry::new();
        reg.register("en", "b", tree(json!({"s": {"x": "1", "y": "2"}})), true)
            .unwrap();
        reg.register("en", "b", tree(json!({"s": {"x": null, "y": "3"}})), true)
            .unwrap();
        assert_eq!(
            reg.get("en", "b"),
            Some(&tree(json!({"s": {"x": "1", "y": "3"}})))
        );
    }

    #[test]
    fn test_replace_without_deep_merge() {
        let mut reg = BundleRegistry::new();
        reg.register("en", "b", tree(json!({"a": "1", "b": "2"})), true)
            .unwrap();
        reg.register("en", "b", tree(json!({"c": "3"})), false).unwrap();
        assert_eq!(reg.get("en", "b"), Some(&tree(json!({"c": "3"}))));
        assert_eq!(reg.deep_merge_flag("en", "b"), Some(false));
    }

    #[test]
    fn test_identical_registration_is_idempotent() {
        let input = tree(json!({"a": {"b": "1"}, "c": "2"}));
        for deep in [true, false] {
            let mut reg = BundleRegistry::new();
            reg.register("en", "x", input.clone(), deep).unwrap();
            let once = reg.clone();
            reg.register("en", "x", input.clone(), deep).unwrap();
            assert_eq!(reg, once);
        }
    }

    #[test]
    fn test_empty_name_is_rejected() {
        let mut reg = BundleRegistry::new();
        let err = reg
            .register("en", "", tree(json!({"a": "1"})), true)
            .unwrap_err();
        assert!(matches!(err, LexisError::InvalidRegistration(_)));
        assert!(reg
            .register("en", "   ", tree(json!({})), false)
            .is_err());
        assert!(reg.is_empty());
    }

    #[test]
    fn test_empty_language_is_rejected() {
        let mut reg = BundleRegistry::new();
        assert!(reg.register("", "orders", tree(json!({})), true).is_err());
    }

    #[test]
    fn test_bundles_are_independent_of_order() {
        let mut first = BundleRegistry::new();
        first.register("en", "a", tree(json!({"k": "A"})), true).unwrap();
        first.register("en", "b", tree(json!({"k": "B"})), true).unwrap();

        let mut second = BundleRegistry::new();
        second.register("en", "b", tree(json!({"k": "B"})), true).unwrap();
        second.register("en", "a", tree(json!({"k": "A"})), true).unwrap();

        for name in ["a", "b"] {
            assert_eq!(first.get("en", name), second.get("en", name));
        }
    }

    #[test]
    fn test_lookup_walks_dotted_key() {
        let mut reg = BundleRegistry::new();
        reg.register("en", "orders", tree(json!({"list": {"empty": "None"}})), true)
            .unwrap();
        assert_eq!(reg.lookup("en", "orders", "list.empty"), Some("None"));
        assert_eq!(reg.lookup("en", "orders", "list"), None);
        assert_eq!(reg.lookup("en", "orders", "nope"), None);
        assert_eq!(reg.lookup("fr", "orders", "list.empty"), None);
        assert_eq!(reg.bundle_names("en"), vec!["orders"]);
        assert!(reg.bundle_names("fr").is_empty());
        assert_eq!(reg.len(), 1);
    }
}
