use thiserror::Error;

/// Top-level error type for Lexis.
///
/// Content problems (missing fragments, malformed leaves, unknown keys) are
/// recovered where they happen and never show up here. Only API misuse and
/// I/O at the outer boundary are surfaced as errors.
#[derive(Debug, Error)]
pub enum LexisError {
    /// A bundle registration was rejected (empty bundle name or language).
    #[error("invalid registration: {0}")]
    InvalidRegistration(String),

    /// Configuration error.
    #[error("config error: {0}")]
    Config(String),

    /// Preference store error.
    #[error("memory error: {0}")]
    Memory(String),

    /// I/O error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
