use serde::{Deserialize, Serialize};

use super::defaults::default_true;

/// One merge step: which fragments to read and how to turn them into keys.
///
/// Declared as `[[pipeline]]` tables with a `kind` tag:
///
/// ```toml
/// [[pipeline]]
/// kind = "dotted"
/// root = "scheduling"
/// sources = ["scheduling"]
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Rule {
    /// Shallow-union the top-level keys of every source.
    Passthrough { sources: Vec<String> },
    /// Expand `root`'s children to `root.child` keys, one level deep.
    Dotted { root: String, sources: Vec<String> },
    /// Copy top-level string values; skip top-level objects.
    FlattenScalars { sources: Vec<String> },
    /// Expand `root`'s children and promote its title child to the bare `root` key.
    PromoteRoot {
        root: String,
        sources: Vec<String>,
        /// Overrides `catalog.title_key` for this step.
        #[serde(default)]
        title_key: Option<String>,
    },
}

impl Rule {
    /// Fragment paths this step reads, in order.
    pub fn sources(&self) -> &[String] {
        match self {
            Self::Passthrough { sources }
            | Self::Dotted { sources, .. }
            | Self::FlattenScalars { sources }
            | Self::PromoteRoot { sources, .. } => sources,
        }
    }

    /// Tag name as written in config.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Passthrough { .. } => "passthrough",
            Self::Dotted { .. } => "dotted",
            Self::FlattenScalars { .. } => "flattenScalars",
            Self::PromoteRoot { .. } => "promoteRoot",
        }
    }

    /// Short description for diagnostics, e.g. `dotted(scheduling)[scheduling]`.
    pub fn label(&self) -> String {
        let sources = self.sources().join(",");
        match self {
            Self::Dotted { root, .. } | Self::PromoteRoot { root, .. } => {
                format!("{}({root})[{sources}]", self.kind())
            }
            _ => format!("{}[{sources}]", self.kind()),
        }
    }
}

/// A fragment registered as a named bundle in every language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BundleDecl {
    /// Bundle name used by lookups.
    pub name: String,
    /// Fragment path supplying the bundle tree.
    pub source: String,
    /// Merge into an existing bundle of the same name instead of replacing it.
    #[serde(default = "default_true")]
    pub deep_merge: bool,
}
