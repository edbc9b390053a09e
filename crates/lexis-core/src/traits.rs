use crate::fragment::FragmentTree;
use crate::language::LanguageCode;
use indexmap::IndexMap;
use std::sync::OnceLock;
use tracing::debug;

/// Where translation data comes from.
///
/// Every discovery mechanism (a directory of JSON files, an embedded table,
/// a test fixture) implements this trait so the pipeline never cares how
/// fragments were found. Loading is total: a fragment that cannot be read
/// is simply absent from the returned set.
pub trait FragmentLoader: Send + Sync {
    /// Human-readable loader name, used in logs.
    fn name(&self) -> &str;

    /// Languages this loader can supply fragments for.
    fn languages(&self) -> Vec<LanguageCode>;

    /// Every fragment available for `language`, keyed by path.
    fn load(&self, language: &str) -> FragmentSet;
}

/// The fragments of one language, keyed by path (e.g. `"orders/list"`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FragmentSet {
    fragments: IndexMap<String, FragmentTree>,
}

impl FragmentSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: impl Into<String>, tree: FragmentTree) {
        self.fragments.insert(path.into(), tree);
    }

    /// Look up a fragment, substituting `{}` when it is missing.
    pub fn get(&self, path: &str) -> &FragmentTree {
        static EMPTY: OnceLock<FragmentTree> = OnceLock::new();
        match self.fragments.get(path) {
            Some(tree) => tree,
            None => {
                debug!("fragment '{path}' missing, using empty mapping");
                EMPTY.get_or_init(FragmentTree::empty)
            }
        }
    }

    pub fn contains(&self, path: &str) -> bool {
        self.fragments.contains_key(path)
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.fragments.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }
}

impl FromIterator<(String, FragmentTree)> for FragmentSet {
    fn from_iter<I: IntoIterator<Item = (String, FragmentTree)>>(iter: I) -> Self {
        Self {
            fragments: iter.into_iter().collect(),
        }
    }
}
