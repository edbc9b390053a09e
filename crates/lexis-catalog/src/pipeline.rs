//! Data-driven pipeline: an ordered list of rule steps plus bundle
//! declarations, run against a fragment loader.

use lexis_core::config::{BundleDecl, CatalogConfig, Config, Rule};
use lexis_core::error::LexisError;
use lexis_core::traits::FragmentLoader;
use tracing::info;

use crate::merger::{CatalogBuilder, MergedCatalog};
use crate::registry::BundleRegistry;
use crate::rules;

/// What to merge and which fragments to expose as bundles.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PipelinePlan {
    /// Merge steps; declaration order is merge order.
    pub steps: Vec<Rule>,
    pub bundles: Vec<BundleDecl>,
}

impl PipelinePlan {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &Config) -> Self {
        Self {
            steps: config.pipeline.clone(),
            bundles: config.bundles.clone(),
        }
    }

    pub fn step(mut self, rule: Rule) -> Self {
        self.steps.push(rule);
        self
    }

    pub fn bundle(mut self, name: &str, source: &str, deep_merge: bool) -> Self {
        self.bundles.push(BundleDecl {
            name: name.to_string(),
            source: source.to_string(),
            deep_merge,
        });
        self
    }
}

/// Build-time knobs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOptions {
    /// Default title child for `promoteRoot` steps.
    pub title_key: String,
    pub warn_on_collision: bool,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            title_key: "title".to_string(),
            warn_on_collision: false,
        }
    }
}

impl From<&CatalogConfig> for BuildOptions {
    fn from(config: &CatalogConfig) -> Self {
        Self {
            title_key: config.title_key.clone(),
            warn_on_collision: config.warn_on_collision,
        }
    }
}

/// Runs a [`PipelinePlan`].
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    plan: PipelinePlan,
    options: BuildOptions,
}

impl Pipeline {
    pub fn new(plan: PipelinePlan, options: BuildOptions) -> Self {
        Self { plan, options }
    }

    pub fn plan(&self) -> &PipelinePlan {
        &self.plan
    }

    /// Build the sealed catalog and the bundle registry for every language
    /// the loader knows.
    ///
    /// Per language, steps are applied in declaration order, then every
    /// root title promoted by a `promoteRoot` step is applied last so it
    /// wins over a same-named scalar from any other step. Content problems
    /// never fail the build; only a bundle declared with a blank name does.
    pub fn build(
        &self,
        loader: &dyn FragmentLoader,
    ) -> Result<(MergedCatalog, BundleRegistry), LexisError> {
        if let Some(decl) = self.plan.bundles.iter().find(|b| b.name.trim().is_empty()) {
            return Err(LexisError::InvalidRegistration(format!(
                "bundle for source '{}' has an empty name",
                decl.source
            )));
        }

        let mut builder = CatalogBuilder::new().warn_on_collision(self.options.warn_on_collision);
        let mut registry = BundleRegistry::new();
        let languages = loader.languages();

        for language in &languages {
            let fragments = loader.load(language);
            builder.ensure_language(language);

            let mut titles = Vec::new();
            for step in &self.plan.steps {
                let out = rules::apply(step, &fragments, &self.options.title_key);
                builder.apply(language, out.contribution);
                titles.extend(out.titles);
            }
            for title in titles {
                builder.apply(language, title);
            }

            for decl in &self.plan.bundles {
                registry.register(
                    language,
                    &decl.name,
                    fragments.get(&decl.source).clone(),
                    decl.deep_merge,
                )?;
            }
        }

        let catalog = builder.seal();
        info!(
            "pipeline: {} language(s) from {} loader, {} step(s), {} bundle(s)",
            languages.len(),
            loader.name(),
            self.plan.steps.len(),
            registry.len()
        );
        Ok((catalog, registry))
    }
}
