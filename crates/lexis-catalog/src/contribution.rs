//! Flat key→value output of one transform rule.

use indexmap::IndexMap;
use lexis_core::FragmentTree;

/// A flat mapping from resolved (possibly dotted) key to value.
///
/// Values are leaves except where a rule passes an object through as an
/// opaque sub-tree. A contribution is consumed by the merge step that
/// applies it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Contribution {
    label: String,
    entries: IndexMap<String, FragmentTree>,
    promoted: bool,
}

impl Contribution {
    /// An empty contribution tagged with a diagnostic label.
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            entries: IndexMap::new(),
            promoted: false,
        }
    }

    /// Mark this contribution as carrying root-title promotions, which may
    /// replace an object-valued key with a leaf without a mismatch warning.
    pub(crate) fn promoted(mut self) -> Self {
        self.promoted = true;
        self
    }

    pub fn is_promoted(&self) -> bool {
        self.promoted
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Insert or overwrite a key. Later inserts win.
    pub fn insert(&mut self, key: impl Into<String>, value: FragmentTree) {
        self.entries.insert(key.into(), value);
    }

    pub fn get(&self, key: &str) -> Option<&FragmentTree> {
        self.entries.get(key)
    }

    /// Leaf value for `key`, if it is a string.
    pub fn text(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(FragmentTree::as_text)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Split into `(label, promoted, entries)` for the merger.
    pub(crate) fn into_parts(self) -> (String, bool, IndexMap<String, FragmentTree>) {
        (self.label, self.promoted, self.entries)
    }
}
