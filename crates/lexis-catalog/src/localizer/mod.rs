//! Resolution facade: the one entry point display code talks to.
//!
//! Lookups try the requested bundle, then the merged catalog, first in the
//! requested language and then in the default language. A total miss returns
//! the key itself, so missing translations degrade to visible keys instead
//! of blanks or panics.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use lexis_core::error::LexisError;
use lexis_core::language::validate_language;
use lexis_core::traits::FragmentLoader;
use lexis_core::{FragmentTree, LanguageCode};
use tracing::{debug, info};

use crate::merger::MergedCatalog;
use crate::pipeline::Pipeline;
use crate::registry::BundleRegistry;

/// Sealed catalog + bundle registry + active language.
///
/// The catalog is swapped wholesale on rebuild; each bundle registration is
/// applied under a write lock so readers never see a half-merged tree.
#[derive(Debug)]
pub struct Localizer {
    catalog: RwLock<Arc<MergedCatalog>>,
    bundles: RwLock<BundleRegistry>,
    active: RwLock<LanguageCode>,
    default_language: LanguageCode,
}

impl Localizer {
    /// Wrap an already built catalog and registry.
    pub fn new(catalog: MergedCatalog, bundles: BundleRegistry, default_language: &str) -> Self {
        Self {
            catalog: RwLock::new(Arc::new(catalog)),
            bundles: RwLock::new(bundles),
            active: RwLock::new(default_language.to_string()),
            default_language: default_language.to_string(),
        }
    }

    /// A localizer with nothing loaded; every lookup returns its key.
    pub fn empty(default_language: &str) -> Self {
        Self::new(MergedCatalog::empty(), BundleRegistry::new(), default_language)
    }

    /// Run `pipeline` against `loader` and wrap the result.
    pub fn build(
        pipeline: &Pipeline,
        loader: &dyn FragmentLoader,
        default_language: &str,
    ) -> Result<Self, LexisError> {
        let default_language = validate_language(default_language)?;
        let (catalog, bundles) = pipeline.build(loader)?;
        Ok(Self::new(catalog, bundles, default_language))
    }

    pub fn default_language(&self) -> &str {
        &self.default_language
    }

    /// Current catalog snapshot.
    pub fn catalog(&self) -> Arc<MergedCatalog> {
        Arc::clone(&read(&self.catalog))
    }

    /// Replace the catalog after a rebuild. Bundles are left untouched.
    pub fn replace_catalog(&self, catalog: MergedCatalog) {
        *write(&self.catalog) = Arc::new(catalog);
        info!("localizer: catalog replaced");
    }

    /// Register a bundle at runtime. See [`BundleRegistry::register`].
    pub fn add_bundle(
        &self,
        language: &str,
        name: &str,
        tree: FragmentTree,
        overwrite_deep: bool,
    ) -> Result<(), LexisError> {
        write(&self.bundles).register(language, name, tree, overwrite_deep)
    }

    /// Bundle names registered for `language`.
    pub fn bundle_names(&self, language: &str) -> Vec<String> {
        read(&self.bundles)
            .bundle_names(language)
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    /// Copy of the bundle tree stored under `(language, name)`.
    pub fn bundle(&self, language: &str, name: &str) -> Option<FragmentTree> {
        read(&self.bundles).get(language, name).cloned()
    }

    pub fn set_active_language(&self, language: &str) -> Result<(), LexisError> {
        let language = validate_language(language)?;
        *write(&self.active) = language.to_string();
        debug!("localizer: active language set to '{language}'");
        Ok(())
    }

    pub fn active_language(&self) -> LanguageCode {
        read(&self.active).clone()
    }

    /// Like [`Localizer::resolve`] but reports a total miss as `None`.
    pub fn lookup(&self, language: &str, bundle: Option<&str>, key: &str) -> Option<String> {
        let catalog = self.catalog();
        let bundles = read(&self.bundles);

        let mut chain = vec![language];
        if language != self.default_language {
            chain.push(&self.default_language);
        }

        for lang in chain {
            if let Some(name) = bundle {
                if let Some(text) = bundles.lookup(lang, name, key) {
                    return Some(text.to_string());
                }
            }
            if let Some(text) = catalog.get(lang, key) {
                if lang != language {
                    debug!("'{key}' missing in '{language}', using '{lang}'");
                }
                return Some(text.to_string());
            }
        }
        None
    }

    /// Resolve `key` for display. Never fails: a total miss returns `key`.
    pub fn resolve(&self, language: &str, bundle: Option<&str>, key: &str) -> String {
        self.lookup(language, bundle, key).unwrap_or_else(|| {
            debug!("missing translation '{key}' ({language}, bundle {bundle:?})");
            key.to_string()
        })
    }

    /// Resolve in the active language.
    pub fn t(&self, bundle: Option<&str>, key: &str) -> String {
        let language = self.active_language();
        self.resolve(&language, bundle, key)
    }

    /// Resolve, then substitute `{name}` placeholders from `args`.
    ///
    /// Substitution is a single pass; unknown placeholders are left as-is.
    pub fn format(
        &self,
        language: &str,
        bundle: Option<&str>,
        key: &str,
        args: &[(&str, &str)],
    ) -> String {
        interpolate(&self.resolve(language, bundle, key), args)
    }
}

fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

/// Replace `{name}` tokens in one pass.
fn interpolate(template: &str, args: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let Some(close) = after.find('}') else {
            out.push_str(&rest[open..]);
            return out;
        };
        let name = &after[..close];
        match args.iter().find(|(k, _)| *k == name) {
            Some((_, value)) => out.push_str(value),
            None => {
                out.push('{');
                out.push_str(name);
                out.push('}');
            }
        }
        rest = &after[close + 1..];
    }
    out.push_str(rest);
    out
}
