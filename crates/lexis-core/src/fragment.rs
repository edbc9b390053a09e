//! Fragment trees: the raw, nested translation data a feature supplies.
//!
//! A tree is either a leaf string or an ordered mapping from string keys to
//! sub-trees. Insertion order is preserved so dumps are deterministic, but no
//! merge step depends on it.

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

/// Ordered mapping used for every nested level of a fragment tree.
pub type FragmentMap = IndexMap<String, FragmentTree>;

/// A nested translation tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FragmentTree {
    /// A translated string.
    Text(String),
    /// A nested mapping.
    Map(FragmentMap),
}

impl Default for FragmentTree {
    fn default() -> Self {
        Self::empty()
    }
}

impl FragmentTree {
    /// The empty mapping `{}`, substituted for every missing source.
    pub fn empty() -> Self {
        Self::Map(FragmentMap::new())
    }

    /// Build a leaf.
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    /// Convert JSON into a tree without ever failing.
    ///
    /// Numbers and booleans become their string form, arrays become their
    /// JSON text, and `null` is treated as an absent value. Each coercion is
    /// logged with the dotted path of the value. A `null` or non-object root
    /// yields `{}` for null and the coerced leaf otherwise.
    pub fn from_json(value: Value) -> Self {
        convert(value, "").unwrap_or_else(Self::empty)
    }

    /// Render the tree back to JSON, preserving key order.
    pub fn to_json(&self) -> Value {
        match self {
            Self::Text(s) => Value::String(s.clone()),
            Self::Map(map) => Value::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            Self::Map(_) => None,
        }
    }

    pub fn as_map(&self) -> Option<&FragmentMap> {
        match self {
            Self::Map(map) => Some(map),
            Self::Text(_) => None,
        }
    }

    pub fn is_map(&self) -> bool {
        matches!(self, Self::Map(_))
    }

    /// Direct child of a mapping. `None` for leaves.
    pub fn get(&self, key: &str) -> Option<&FragmentTree> {
        self.as_map().and_then(|m| m.get(key))
    }

    /// Walk a dotted key (`"a.b.c"`) through nested mappings.
    ///
    /// An empty key addresses the tree itself.
    pub fn walk(&self, dotted: &str) -> Option<&FragmentTree> {
        if dotted.is_empty() {
            return Some(self);
        }
        dotted
            .split('.')
            .try_fold(self, |node, segment| node.get(segment))
    }

    /// Recursively merge `incoming` into `self`.
    ///
    /// Where both sides hold mappings the merge recurses; anywhere else the
    /// incoming value replaces the existing one. Keys absent from `incoming`
    /// keep their existing value.
    pub fn deep_merge(&mut self, incoming: FragmentTree) {
        match (self, incoming) {
            (Self::Map(existing), Self::Map(incoming)) => {
                for (key, value) in incoming {
                    let recurse =
                        value.is_map() && existing.get(&key).is_some_and(FragmentTree::is_map);
                    match existing.get_mut(&key) {
                        Some(current) if recurse => current.deep_merge(value),
                        _ => {
                            existing.insert(key, value);
                        }
                    };
                }
            }
            (this, incoming) => *this = incoming,
        }
    }

    /// Number of leaf strings in the tree.
    pub fn leaf_count(&self) -> usize {
        match self {
            Self::Text(_) => 1,
            Self::Map(map) => map.values().map(FragmentTree::leaf_count).sum(),
        }
    }
}

impl From<Value> for FragmentTree {
    fn from(value: Value) -> Self {
        Self::from_json(value)
    }
}

impl From<&str> for FragmentTree {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for FragmentTree {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl<'de> Deserialize<'de> for FragmentTree {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(Self::from_json)
    }
}

fn child_path(parent: &str, key: &str) -> String {
    if parent.is_empty() {
        key.to_string()
    } else {
        format!("{parent}.{key}")
    }
}

fn convert(value: Value, path: &str) -> Option<FragmentTree> {
    match value {
        Value::String(s) => Some(FragmentTree::Text(s)),
        Value::Object(obj) => {
            let mut map = FragmentMap::with_capacity(obj.len());
            for (key, child) in obj {
                let child_at = child_path(path, &key);
                if let Some(tree) = convert(child, &child_at) {
                    map.insert(key, tree);
                }
            }
            Some(FragmentTree::Map(map))
        }
        Value::Null => {
            debug!("fragment: null value at '{path}' treated as absent");
            None
        }
        Value::Bool(b) => {
            warn!("fragment: boolean at '{path}' coerced to string");
            Some(FragmentTree::Text(b.to_string()))
        }
        Value::Number(n) => {
            warn!("fragment: number at '{path}' coerced to string");
            Some(FragmentTree::Text(n.to_string()))
        }
        Value::Array(items) => {
            warn!("fragment: array at '{path}' coerced to its JSON text");
            Some(FragmentTree::Text(Value::Array(items).to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_json_keeps_strings_and_objects() {
        let tree = FragmentTree::from_json(json!({"a": "A", "b": {"c": "C"}}));
        assert_eq!(tree.walk("a").and_then(FragmentTree::as_text), Some("A"));
        assert_eq!(tree.walk("b.c").and_then(FragmentTree::as_text), Some("C"));
    }

    #[test]
    fn test_from_json_coerces_scalars() {
        let tree = FragmentTree::from_json(json!({"n": 3, "flag": true, "list": ["x", 1]}));
        assert_eq!(tree.get("n"), Some(&FragmentTree::text("3")));
        assert_eq!(tree.get("flag"), Some(&FragmentTree::text("true")));
        assert_eq!(tree.get("list"), Some(&FragmentTree::text(r#"["x",1]"#)));
    }

    #[test]
    fn test_from_json_drops_null() {
        let tree = FragmentTree::from_json(json!({"gone": null, "kept": "yes"}));
        let map = tree.as_map().unwrap();
        assert_eq!(map.len(), 1);
        assert!(map.contains_key("kept"));
    }

    #[test]
    fn test_from_json_null_root_is_empty() {
        assert_eq!(FragmentTree::from_json(Value::Null), FragmentTree::empty());
    }

    #[test]
    fn test_from_json_preserves_order() {
        let tree = FragmentTree::from_json(json!({"z": "1", "a": "2", "m": "3"}));
        let keys: Vec<&str> = tree.as_map().unwrap().keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["z", "a", "m"]);
    }

    #[test]
    fn test_walk_stops_at_leaf() {
        let tree = FragmentTree::from_json(json!({"a": "A"}));
        assert!(tree.walk("a.b").is_none());
        assert!(tree.walk("missing").is_none());
        assert_eq!(tree.walk(""), Some(&tree));
    }

    #[test]
    fn test_deep_merge_independent_keys() {
        let mut tree = FragmentTree::from_json(json!({"a": "1"}));
        tree.deep_merge(FragmentTree::from_json(json!({"b": "2"})));
        assert_eq!(tree, FragmentTree::from_json(json!({"a": "1", "b": "2"})));
    }

    #[test]
    fn test_deep_merge_overwrites_leaf() {
        let mut tree = FragmentTree::from_json(json!({"a": "1"}));
        tree.deep_merge(FragmentTree::from_json(json!({"a": "2"})));
        assert_eq!(tree, FragmentTree::from_json(json!({"a": "2"})));
    }

    #[test]
    fn test_deep_merge_recurses() {
        let mut tree = FragmentTree::from_json(json!({"s": {"x": "1", "y": "2"}}));
        tree.deep_merge(FragmentTree::from_json(json!({"s": {"y": "3", "z": "4"}})));
        assert_eq!(
            tree,
            FragmentTree::from_json(json!({"s": {"x": "1", "y": "3", "z": "4"}}))
        );
    }

    #[test]
    fn test_deep_merge_null_keeps_existing() {
        let mut tree = FragmentTree::from_json(json!({"a": "1", "b": "2"}));
        tree.deep_merge(FragmentTree::from_json(json!({"a": null, "b": "3"})));
        assert_eq!(tree, FragmentTree::from_json(json!({"a": "1", "b": "3"})));
    }

    #[test]
    fn test_deep_merge_idempotent() {
        let incoming = FragmentTree::from_json(json!({"a": {"b": "1"}, "c": "2"}));
        let mut tree = incoming.clone();
        tree.deep_merge(incoming.clone());
        assert_eq!(tree, incoming);
    }

    #[test]
    fn test_deserialize_is_lenient() {
        let tree: FragmentTree = serde_json::from_str(r#"{"a": 1, "b": {"c": "x"}}"#).unwrap();
        assert_eq!(tree.walk("a"), Some(&FragmentTree::text("1")));
        assert_eq!(tree.leaf_count(), 2);
    }

    #[test]
    fn test_to_json_round_trips_shape() {
        let value = json!({"b": "B", "a": {"c": "C"}});
        assert_eq!(FragmentTree::from_json(value.clone()).to_json(), value);
    }
}
