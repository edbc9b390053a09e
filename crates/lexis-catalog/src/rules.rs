//! Transform rules: fragment trees in, flat contributions out.
//!
//! All rules are pure and total. An absent source is an empty mapping, a
//! source whose shape does not fit the rule contributes nothing.

use lexis_core::config::Rule;
use lexis_core::traits::FragmentSet;
use lexis_core::FragmentTree;
use tracing::debug;

use crate::contribution::Contribution;

/// Output of one rule invocation.
///
/// `titles` is only produced by root promotion; the pipeline applies it after
/// every other contribution of the same pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RuleOutput {
    pub contribution: Contribution,
    pub titles: Option<Contribution>,
}

/// Run a configured rule against one language's fragments.
pub fn apply(rule: &Rule, fragments: &FragmentSet, default_title_key: &str) -> RuleOutput {
    let trees: Vec<&FragmentTree> = rule.sources().iter().map(|s| fragments.get(s)).collect();
    let label = rule.label();
    match rule {
        Rule::Passthrough { .. } => RuleOutput {
            contribution: passthrough(&label, &trees),
            titles: None,
        },
        Rule::Dotted { root, .. } => RuleOutput {
            contribution: dotted(&label, root, &trees),
            titles: None,
        },
        Rule::FlattenScalars { .. } => RuleOutput {
            contribution: flatten_scalars(&label, &trees),
            titles: None,
        },
        Rule::PromoteRoot {
            root, title_key, ..
        } => {
            let title_key = title_key.as_deref().unwrap_or(default_title_key);
            let (children, titles) = promote_root(&label, root, title_key, &trees);
            RuleOutput {
                contribution: children,
                titles: Some(titles),
            }
        }
    }
}

/// Shallow-union every tree's top-level keys. Objects stay opaque sub-trees.
pub fn passthrough(label: &str, trees: &[&FragmentTree]) -> Contribution {
    let mut out = Contribution::new(label);
    for tree in trees {
        let Some(map) = tree.as_map() else {
            debug!("{label}: leaf source skipped");
            continue;
        };
        for (key, value) in map {
            out.insert(key.clone(), value.clone());
        }
    }
    out
}

/// Expand `root`'s children to `root.child` keys, one level deep.
///
/// Child objects pass through unflattened under their dotted key. A tree
/// with no object under `root` contributes nothing.
pub fn dotted(label: &str, root: &str, trees: &[&FragmentTree]) -> Contribution {
    let mut out = Contribution::new(label);
    for tree in trees {
        match tree.get(root) {
            Some(FragmentTree::Map(children)) => {
                for (key, value) in children {
                    out.insert(format!("{root}.{key}"), value.clone());
                }
            }
            Some(FragmentTree::Text(_)) => {
                debug!("{label}: '{root}' is a leaf, nothing to expand");
            }
            None => {}
        }
    }
    out
}

/// Copy top-level string values. Top-level objects are skipped; they are
/// exposed by a companion `dotted` step over the same sources.
pub fn flatten_scalars(label: &str, trees: &[&FragmentTree]) -> Contribution {
    let mut out = Contribution::new(label);
    for tree in trees {
        let Some(map) = tree.as_map() else {
            continue;
        };
        for (key, value) in map {
            if let FragmentTree::Text(text) = value {
                out.insert(key.clone(), FragmentTree::text(text.as_str()));
            }
        }
    }
    out
}

/// Deep-merge the trees, expand `root`'s children to dotted keys and promote
/// its `title_key` child to the bare `root` key.
///
/// Returns `(children, titles)`. `titles` holds at most the single bare key
/// and is flagged as a promotion.
pub fn promote_root(
    label: &str,
    root: &str,
    title_key: &str,
    trees: &[&FragmentTree],
) -> (Contribution, Contribution) {
    let mut merged = FragmentTree::empty();
    for tree in trees {
        if tree.is_map() {
            merged.deep_merge((*tree).clone());
        }
    }

    let children = dotted(label, root, &[&merged]);

    let mut titles = Contribution::new(format!("{label}:title")).promoted();
    if let Some(title) = merged
        .get(root)
        .and_then(|section| section.get(title_key))
        .and_then(FragmentTree::as_text)
    {
        titles.insert(root, FragmentTree::text(title));
    }

    (children, titles)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn tree(value: serde_json::Value) -> FragmentTree {
        FragmentTree::from_json(value)
    }

    #[test]
    fn test_passthrough_keeps_objects_opaque() {
        let a = tree(json!({"save": "Save", "offers": {"title": "Offers"}}));
        let out = passthrough("p", &[&a]);
        assert_eq!(out.text("save"), Some("Save"));
        assert_eq!(out.get("offers"), Some(&tree(json!({"title": "Offers"}))));
        assert!(!out.contains_key("offers.title"));
    }

    #[test]
    fn test_passthrough_later_source_wins_shallow() {
        let a = tree(json!({"x": "A", "s": {"k": "1", "j": "2"}}));
        let b = tree(json!({"x": "B", "s": {"k": "3"}}));
        let out = passthrough("p", &[&a, &b]);
        assert_eq!(out.text("x"), Some("B"));
        // Shallow: the whole sub-tree is replaced, not merged.
        assert_eq!(out.get("s"), Some(&tree(json!({"k": "3"}))));
    }

    #[test]
    fn test_dotted_expands_one_level() {
        let src = tree(json!({"scheduling": {"today": "Today"}}));
        let out = dotted("d", "scheduling", &[&src]);
        assert_eq!(out.len(), 1);
        assert_eq!(out.text("scheduling.today"), Some("Today"));
        assert!(!out.contains_key("today"));
    }

    #[test]
    fn test_dotted_passes_nested_objects_through() {
        let src = tree(json!({"r": {"deep": {"a": "A"}, "flat": "F"}}));
        let out = dotted("d", "r", &[&src]);
        assert_eq!(out.get("r.deep"), Some(&tree(json!({"a": "A"}))));
        assert_eq!(out.text("r.flat"), Some("F"));
        assert!(!out.contains_key("r.deep.a"));
    }

    #[test]
    fn test_dotted_missing_or_leaf_root_contributes_nothing() {
        let leaf = tree(json!({"r": "just a string"}));
        let other = tree(json!({"x": "X"}));
        assert!(dotted("d", "r", &[&leaf, &other]).is_empty());
    }

    #[test]
    fn test_flatten_scalars_skips_objects() {
        let a = tree(json!({"name": "Name", "section": {"k": "v"}}));
        let b = tree(json!({"email": "Email"}));
        let out = flatten_scalars("f", &[&a, &b]);
        assert_eq!(out.len(), 2);
        assert_eq!(out.text("name"), Some("Name"));
        assert_eq!(out.text("email"), Some("Email"));
        assert!(!out.contains_key("section"));
    }

    #[test]
    fn test_promote_root_emits_children_and_title() {
        let src = tree(json!({"dispatcher": {"title": "Dispatcher", "foo": "Bar"}}));
        let (children, titles) = promote_root("pr", "dispatcher", "title", &[&src]);
        assert_eq!(children.text("dispatcher.foo"), Some("Bar"));
        assert_eq!(children.text("dispatcher.title"), Some("Dispatcher"));
        assert_eq!(titles.text("dispatcher"), Some("Dispatcher"));
        assert!(titles.is_promoted());
        assert!(!children.is_promoted());
    }

    #[test]
    fn test_promote_root_without_title() {
        let src = tree(json!({"dispatcher": {"foo": "Bar"}}));
        let (children, titles) = promote_root("pr", "dispatcher", "title", &[&src]);
        assert_eq!(children.len(), 1);
        assert!(titles.is_empty());
    }

    #[test]
    fn test_promote_root_object_title_is_not_promoted() {
        let src = tree(json!({"dispatcher": {"title": {"short": "D"}}}));
        let (_, titles) = promote_root("pr", "dispatcher", "title", &[&src]);
        assert!(titles.is_empty());
    }

    #[test]
    fn test_promote_root_deep_merges_sources() {
        let a = tree(json!({"d": {"title": "Old", "a": "A"}}));
        let b = tree(json!({"d": {"title": "New", "b": "B"}}));
        let (children, titles) = promote_root("pr", "d", "title", &[&a, &b]);
        assert_eq!(children.text("d.a"), Some("A"));
        assert_eq!(children.text("d.b"), Some("B"));
        assert_eq!(titles.text("d"), Some("New"));
    }

    #[test]
    fn test_apply_treats_missing_sources_as_empty() {
        let fragments = FragmentSet::new();
        let rules = [
            Rule::Passthrough {
                sources: vec!["nope".into()],
            },
            Rule::Dotted {
                root: "r".into(),
                sources: vec!["nope".into()],
            },
            Rule::FlattenScalars {
                sources: vec!["nope".into()],
            },
            Rule::PromoteRoot {
                root: "r".into(),
                sources: vec!["nope".into()],
                title_key: None,
            },
        ];
        for rule in &rules {
            let out = apply(rule, &fragments, "title");
            assert!(out.contribution.is_empty(), "{} should be empty", rule.kind());
            assert!(out.titles.map_or(true, |t| t.is_empty()));
        }
    }

    #[test]
    fn test_apply_uses_step_title_key_override() {
        let mut fragments = FragmentSet::new();
        fragments.insert("d", tree(json!({"d": {"label": "Label", "title": "Title"}})));
        let rule = Rule::PromoteRoot {
            root: "d".into(),
            sources: vec!["d".into()],
            title_key: Some("label".into()),
        };
        let out = apply(&rule, &fragments, "title");
        assert_eq!(out.titles.unwrap().text("d"), Some("Label"));
    }
}
