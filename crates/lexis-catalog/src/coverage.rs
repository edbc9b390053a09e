//! Translation coverage relative to a reference language.

use std::collections::BTreeSet;

use crate::merger::MergedCatalog;

/// Coverage of one language against the reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageCoverage {
    pub language: String,
    /// Keys present in the reference language but not here, sorted.
    pub missing: Vec<String>,
    /// Number of keys present here but not in the reference.
    pub extra: usize,
    /// Number of reference keys this language provides.
    pub translated: usize,
}

impl LanguageCoverage {
    /// Share of reference keys provided, in percent. 100 for an empty reference.
    pub fn percent(&self) -> f64 {
        let total = self.translated + self.missing.len();
        if total == 0 {
            100.0
        } else {
            self.translated as f64 * 100.0 / total as f64
        }
    }
}

/// Coverage of every non-reference language.
#[derive(Debug, Clone, PartialEq)]
pub struct CoverageReport {
    pub reference: String,
    pub reference_keys: usize,
    pub languages: Vec<LanguageCoverage>,
}

impl CoverageReport {
    /// Whether every language provides every reference key.
    pub fn is_complete(&self) -> bool {
        self.languages.iter().all(|l| l.missing.is_empty())
    }
}

impl MergedCatalog {
    /// Compare every language's key set with `reference`'s.
    pub fn coverage(&self, reference: &str) -> CoverageReport {
        let reference_keys: BTreeSet<&str> = self.keys(reference).collect();
        let languages = self
            .languages()
            .filter(|lang| *lang != reference)
            .map(|lang| {
                let keys: BTreeSet<&str> = self.keys(lang).collect();
                let missing: Vec<String> = reference_keys
                    .difference(&keys)
                    .map(|k| k.to_string())
                    .collect();
                LanguageCoverage {
                    language: lang.to_string(),
                    translated: reference_keys.len() - missing.len(),
                    missing,
                    extra: keys.difference(&reference_keys).count(),
                }
            })
            .collect();

        CoverageReport {
            reference: reference.to_string(),
            reference_keys: reference_keys.len(),
            languages,
        }
    }
}
