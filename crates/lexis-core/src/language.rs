//! Language codes.
//!
//! Codes are opaque strings (`"en"`, `"fr"`, `"pt-BR"`). The only structure
//! Lexis relies on is the default language every lookup falls back to.

use crate::error::LexisError;

/// Opaque language identifier.
pub type LanguageCode = String;

/// Fallback target for every lookup that misses in the requested language.
pub const DEFAULT_LANGUAGE: &str = "en";

/// Reject blank language codes at the API boundary.
///
/// Returns the trimmed code on success.
pub fn validate_language(code: &str) -> Result<&str, LexisError> {
    let trimmed = code.trim();
    if trimmed.is_empty() {
        return Err(LexisError::InvalidRegistration(
            "language code must not be empty".to_string(),
        ));
    }
    Ok(trimmed)
}
