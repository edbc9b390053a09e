//! CLI command handlers. Each returns the text to print.

use lexis_catalog::{BuildOptions, DirLoader, Localizer, Pipeline, PipelinePlan};
use lexis_core::config::Config;
use lexis_memory::Store;
use std::fmt::Write as _;

/// Build the localizer described by `cfg` from its fragment directory.
pub fn build_localizer(cfg: &Config) -> anyhow::Result<Localizer> {
    let loader = DirLoader::new(&cfg.catalog.fragments_dir);
    let pipeline = Pipeline::new(
        PipelinePlan::from_config(cfg),
        BuildOptions::from(&cfg.catalog),
    );
    Ok(Localizer::build(
        &pipeline,
        &loader,
        &cfg.catalog.default_language,
    )?)
}

/// Apply the persisted active language (if any) and return the one in effect.
pub async fn load_active_language(localizer: &Localizer, store: &Store) -> anyhow::Result<String> {
    if let Some(lang) = store.active_language().await? {
        localizer.set_active_language(&lang)?;
    }
    Ok(localizer.active_language())
}

/// Parse a `name=value` placeholder argument.
pub fn parse_arg(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((name, value)) if !name.trim().is_empty() => {
            Ok((name.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected name=value, got '{raw}'")),
    }
}

pub fn resolve(
    localizer: &Localizer,
    lang: &str,
    bundle: Option<&str>,
    key: &str,
    args: &[(String, String)],
) -> String {
    if args.is_empty() {
        return localizer.resolve(lang, bundle, key);
    }
    let args: Vec<(&str, &str)> = args
        .iter()
        .map(|(k, v)| (k.as_str(), v.as_str()))
        .collect();
    localizer.format(lang, bundle, key, &args)
}

pub fn dump(localizer: &Localizer, lang: &str) -> anyhow::Result<String> {
    let catalog = localizer.catalog();
    if !catalog.has_language(lang) {
        anyhow::bail!("no fragments loaded for language '{lang}'");
    }
    Ok(serde_json::to_string_pretty(&catalog.to_json(lang))?)
}

pub fn bundles(localizer: &Localizer, lang: &str) -> String {
    let names = localizer.bundle_names(lang);
    if names.is_empty() {
        return format!("No bundles registered for '{lang}'.");
    }
    names.join("\n")
}

pub fn coverage(localizer: &Localizer) -> String {
    let report = localizer.catalog().coverage(localizer.default_language());
    let mut out = format!(
        "Coverage against '{}' ({} keys)\n",
        report.reference, report.reference_keys
    );
    if report.languages.is_empty() {
        out.push_str("No other languages loaded.");
        return out;
    }
    for lang in &report.languages {
        let _ = writeln!(
            out,
            "\n{}: {:.1}% ({} missing, {} extra)",
            lang.language,
            lang.percent(),
            lang.missing.len(),
            lang.extra
        );
        for key in &lang.missing {
            let _ = writeln!(out, "  - {key}");
        }
    }
    out.trim_end().to_string()
}

pub fn status(cfg: &Config, config_path: &str, localizer: &Localizer) -> String {
    let catalog = localizer.catalog();
    let mut out = String::from("Lexis — Status\n\n");
    let _ = writeln!(out, "Config: {config_path}");
    let _ = writeln!(out, "Fragments: {}", cfg.catalog.fragments_dir);
    let _ = writeln!(out, "Default language: {}", localizer.default_language());
    let _ = writeln!(out, "Pipeline steps: {}", cfg.pipeline.len());
    let _ = writeln!(out, "Bundle declarations: {}", cfg.bundles.len());
    out.push('\n');

    let languages: Vec<&str> = catalog.languages().collect();
    if languages.is_empty() {
        out.push_str("  no languages loaded");
        return out;
    }
    for lang in languages {
        let _ = writeln!(
            out,
            "  {lang}: {} keys, {} bundles",
            catalog.len(lang),
            localizer.bundle_names(lang).len()
        );
    }
    out.trim_end().to_string()
}
